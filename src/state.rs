//! Observable state holder shared by every model.
//!
//! A model keeps its records inside an [`Observable`]. Views call
//! [`Observable::subscribe`] and get a `watch::Receiver` that is woken after
//! each replacement. The value is always swapped before receivers are
//! notified, so a woken receiver never sees the old state.

use std::sync::Arc;

use tokio::sync::watch;

/// Cloneable handle to a watched value.
///
/// Clones share the same underlying value; mutating through one handle is
/// visible through every other handle and every receiver.
#[derive(Debug)]
pub struct Observable<T> {
    tx: Arc<watch::Sender<T>>,
}

impl<T> Clone for Observable<T> {
    fn clone(&self) -> Self {
        Self { tx: Arc::clone(&self.tx) }
    }
}

impl<T> Observable<T> {
    pub fn new(initial: T) -> Self {
        Self {
            tx: Arc::new(watch::Sender::new(initial)),
        }
    }

    /// Run `f` against the current value without cloning it.
    pub fn with<R>(&self, f: impl FnOnce(&T) -> R) -> R {
        f(&self.tx.borrow())
    }

    /// Receiver that observes every later change.
    pub fn subscribe(&self) -> watch::Receiver<T> {
        self.tx.subscribe()
    }

    /// Replace the value and notify subscribers.
    pub fn set(&self, value: T) {
        self.tx.send_replace(value);
    }

    /// Modify the value in place and notify subscribers.
    pub fn update(&self, f: impl FnOnce(&mut T)) {
        self.tx.send_modify(f);
    }

    /// Modify the value and notify only when `f` reports a change.
    pub fn update_if(&self, f: impl FnOnce(&mut T) -> bool) -> bool {
        self.tx.send_if_modified(f)
    }

    /// Number of live receivers.
    pub fn subscriber_count(&self) -> usize {
        self.tx.receiver_count()
    }
}

impl<T: Clone> Observable<T> {
    /// Clone of the current value.
    pub fn get(&self) -> T {
        self.tx.borrow().clone()
    }
}

impl<T: Default> Default for Observable<T> {
    fn default() -> Self {
        Self::new(T::default())
    }
}
