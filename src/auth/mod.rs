//! Session user state over a pluggable authentication backend.
//!
//! [`AuthModel`] never returns errors to its callers. Failures are logged and
//! stored in [`AuthState::error`] as user-facing text.

pub mod demo;
pub mod provider;

use std::future::Future;
use std::sync::{Arc, Mutex};

use tokio::sync::{broadcast, watch};
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

use crate::config::{AuthConfig, AuthMode};
use crate::error::Result;
use crate::models::{Role, User};
use crate::state::Observable;
use crate::storage::Storage;

pub use demo::DemoAuth;
pub use provider::ProviderAuth;

/// Snapshot of the authentication state.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthState {
    pub user: Option<User>,
    pub is_loading: bool,
    pub error: Option<String>,
}

impl Default for AuthState {
    fn default() -> Self {
        Self {
            user: None,
            is_loading: true,
            error: None,
        }
    }
}

/// Session change pushed by a backend outside of a direct call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionEvent {
    SignedIn(User),
    SignedOut,
    UserUpdated(User),
    TokenRefreshed,
}

/// Authentication backend.
pub trait AuthBackend: Send + Sync + 'static {
    /// Load a session left over from an earlier run.
    fn restore(&self) -> impl Future<Output = Result<Option<User>>> + Send;

    fn sign_in(&self, email: &str, password: &str) -> impl Future<Output = Result<User>> + Send;

    fn sign_up(&self, email: &str, password: &str, name: &str) -> impl Future<Output = Result<User>> + Send;

    fn sign_out(&self) -> impl Future<Output = Result<()>> + Send;

    /// Stream of session changes, if the backend produces any.
    fn session_events(&self) -> Option<broadcast::Receiver<SessionEvent>>;
}

/// Backend selected from configuration at startup.
pub enum Backend {
    Demo(DemoAuth),
    Provider(ProviderAuth),
}

impl Backend {
    pub fn from_config(config: &AuthConfig, storage: Arc<dyn Storage>) -> Result<Self> {
        match config.mode {
            AuthMode::Demo => Ok(Self::Demo(DemoAuth::new(
                storage,
                std::time::Duration::from_millis(config.login_delay_ms),
                config.dev_mode,
            ))),
            AuthMode::Provider => Ok(Self::Provider(ProviderAuth::new(&config.provider, storage)?)),
        }
    }
}

impl AuthBackend for Backend {
    async fn restore(&self) -> Result<Option<User>> {
        match self {
            Self::Demo(b) => b.restore().await,
            Self::Provider(b) => b.restore().await,
        }
    }

    async fn sign_in(&self, email: &str, password: &str) -> Result<User> {
        match self {
            Self::Demo(b) => b.sign_in(email, password).await,
            Self::Provider(b) => b.sign_in(email, password).await,
        }
    }

    async fn sign_up(&self, email: &str, password: &str, name: &str) -> Result<User> {
        match self {
            Self::Demo(b) => b.sign_up(email, password, name).await,
            Self::Provider(b) => b.sign_up(email, password, name).await,
        }
    }

    async fn sign_out(&self) -> Result<()> {
        match self {
            Self::Demo(b) => b.sign_out().await,
            Self::Provider(b) => b.sign_out().await,
        }
    }

    fn session_events(&self) -> Option<broadcast::Receiver<SessionEvent>> {
        match self {
            Self::Demo(b) => b.session_events(),
            Self::Provider(b) => b.session_events(),
        }
    }
}

/// User signed in automatically in development mode.
pub fn dev_user() -> User {
    User {
        id: "dev-user-001".to_string(),
        email: "dev@radioanalysis.local".to_string(),
        name: "Dev User".to_string(),
        role: Role::Admin,
        avatar: None,
    }
}

pub struct AuthModel<B = Backend> {
    state: Observable<AuthState>,
    backend: Arc<B>,
    dev_mode: bool,
    listener: Mutex<Option<JoinHandle<()>>>,
}

impl<B: AuthBackend> AuthModel<B> {
    pub fn new(backend: B, dev_mode: bool) -> Self {
        Self {
            state: Observable::default(),
            backend: Arc::new(backend),
            dev_mode,
            listener: Mutex::new(None),
        }
    }

    pub fn state(&self) -> AuthState {
        self.state.get()
    }

    pub fn subscribe(&self) -> watch::Receiver<AuthState> {
        self.state.subscribe()
    }

    pub fn current_user(&self) -> Option<User> {
        self.state.with(|s| s.user.clone())
    }

    pub fn is_authenticated(&self) -> bool {
        self.state.with(|s| s.user.is_some())
    }

    pub fn is_loading(&self) -> bool {
        self.state.with(|s| s.is_loading)
    }

    pub fn error(&self) -> Option<String> {
        self.state.with(|s| s.error.clone())
    }

    /// Restore the previous session and start following backend events.
    ///
    /// Must run inside a Tokio runtime. Calling it again re-restores the
    /// session but never starts a second listener.
    pub async fn init(&self) {
        if self.dev_mode {
            info!("Dev mode: signing in as dev user");
            self.set_user(Some(dev_user()));
        } else {
            match self.backend.restore().await {
                Ok(user) => {
                    debug!("Session restored: {}", user.as_ref().map_or("none", |u| u.email.as_str()));
                    self.set_user(user);
                }
                Err(e) => {
                    warn!("Failed to restore session: {}", e);
                    self.state.update(|s| {
                        s.user = None;
                        s.is_loading = false;
                        s.error = Some(e.user_message());
                    });
                }
            }
        }

        self.start_listener();
    }

    /// Sign in with email and password. Returns whether it succeeded.
    pub async fn login(&self, email: &str, password: &str) -> bool {
        self.begin();
        let result = self.backend.sign_in(email, password).await;
        self.finish("Login", result)
    }

    /// Create an account and sign in. Returns whether it succeeded.
    pub async fn register(&self, email: &str, password: &str, name: &str) -> bool {
        self.begin();
        let result = self.backend.sign_up(email, password, name).await;
        self.finish("Registration", result)
    }

    pub async fn logout(&self) {
        if let Err(e) = self.backend.sign_out().await {
            warn!("Sign out failed: {}", e);
        }
        info!("Signed out");
        self.set_user(None);
    }

    pub fn clear_error(&self) {
        self.state.update_if(|s| s.error.take().is_some());
    }

    /// Force the dev user regardless of backend.
    pub fn dev_login(&self) {
        info!("Dev login");
        self.set_user(Some(dev_user()));
    }

    fn begin(&self) {
        self.state.update(|s| {
            s.is_loading = true;
            s.error = None;
        });
    }

    fn finish(&self, action: &str, result: Result<User>) -> bool {
        match result {
            Ok(user) => {
                info!("{} succeeded for {}", action, user.email);
                self.set_user(Some(user));
                true
            }
            Err(e) => {
                warn!("{} failed: {}", action, e);
                let mut message = e.user_message();
                if message.trim().is_empty() {
                    message = format!("{action} failed");
                }
                self.state.update(|s| {
                    s.user = None;
                    s.is_loading = false;
                    s.error = Some(message);
                });
                false
            }
        }
    }

    fn set_user(&self, user: Option<User>) {
        self.state.update(|s| {
            s.user = user;
            s.is_loading = false;
        });
    }

    fn start_listener(&self) {
        let mut guard = self.listener.lock().unwrap_or_else(|e| e.into_inner());
        if guard.is_some() {
            return;
        }
        let Some(mut events) = self.backend.session_events() else {
            return;
        };

        let state = self.state.clone();
        *guard = Some(tokio::spawn(async move {
            loop {
                match events.recv().await {
                    Ok(event) => apply_event(&state, event),
                    Err(broadcast::error::RecvError::Lagged(skipped)) => {
                        warn!("Missed {} session events", skipped);
                    }
                    Err(broadcast::error::RecvError::Closed) => break,
                }
            }
            debug!("Session event stream closed");
        }));
    }
}

fn apply_event(state: &Observable<AuthState>, event: SessionEvent) {
    debug!("Session event: {:?}", event);
    match event {
        SessionEvent::SignedIn(user) | SessionEvent::UserUpdated(user) => state.update(|s| {
            s.user = Some(user);
            s.is_loading = false;
        }),
        SessionEvent::SignedOut => state.update(|s| {
            s.user = None;
            s.is_loading = false;
        }),
        SessionEvent::TokenRefreshed => {}
    }
}
