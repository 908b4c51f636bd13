//! Dark/light theme preference.

use std::collections::BTreeSet;
use std::sync::{Arc, Mutex};

use tokio::sync::watch;
use tracing::{debug, warn};

use crate::storage::{Storage, THEME_KEY};
use crate::state::Observable;

/// Presentation class toggled on the root element for dark mode.
pub const DARK_CLASS: &str = "dark";

/// Class list of the root presentation element.
#[derive(Debug, Default)]
pub struct ClassList {
    classes: Mutex<BTreeSet<String>>,
}

impl ClassList {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&self, class: &str) {
        self.lock().insert(class.to_string());
    }

    pub fn remove(&self, class: &str) {
        self.lock().remove(class);
    }

    pub fn contains(&self, class: &str) -> bool {
        self.lock().contains(class)
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, BTreeSet<String>> {
        self.classes.lock().unwrap_or_else(|e| e.into_inner())
    }
}

/// Theme preference backed by local storage.
pub struct ThemeModel {
    is_dark: Observable<bool>,
    storage: Arc<dyn Storage>,
    root: Arc<ClassList>,
    system_prefers_dark: bool,
}

impl ThemeModel {
    /// `system_prefers_dark` is the platform hint used when nothing is stored.
    pub fn new(storage: Arc<dyn Storage>, root: Arc<ClassList>, system_prefers_dark: bool) -> Self {
        let model = Self {
            is_dark: Observable::new(false),
            storage,
            root,
            system_prefers_dark,
        };
        model.is_dark.set(model.resolve());
        model
    }

    pub fn is_dark(&self) -> bool {
        self.is_dark.get()
    }

    pub fn subscribe(&self) -> watch::Receiver<bool> {
        self.is_dark.subscribe()
    }

    /// Re-read the stored preference and apply it. Safe to call repeatedly.
    pub fn init(&self) {
        let dark = self.resolve();
        self.apply(dark);
        self.is_dark.set(dark);
        debug!("Theme initialized: {}", if dark { "dark" } else { "light" });
    }

    /// Flip the theme, persist it, and return the new value.
    pub fn toggle(&self) -> bool {
        let dark = !self.is_dark.get();
        let value = if dark { "dark" } else { "light" };
        if let Err(e) = self.storage.set(THEME_KEY, value) {
            warn!("Failed to persist theme: {}", e);
        }
        self.apply(dark);
        self.is_dark.set(dark);
        debug!("Theme toggled to {}", value);
        dark
    }

    fn resolve(&self) -> bool {
        match self.storage.get(THEME_KEY) {
            Some(saved) => saved == "dark",
            None => self.system_prefers_dark,
        }
    }

    fn apply(&self, dark: bool) {
        if dark {
            self.root.add(DARK_CLASS);
        } else {
            self.root.remove(DARK_CLASS);
        }
    }
}
