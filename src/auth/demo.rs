//! Built-in demo accounts, no network involved.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::broadcast;
use tracing::{debug, warn};

use super::{AuthBackend, SessionEvent};
use crate::error::{AppError, Result};
use crate::models::{Role, User};
use crate::storage::{AUTH_USER_KEY, Storage};

struct DemoAccount {
    id: &'static str,
    email: &'static str,
    password: &'static str,
    name: &'static str,
    role: Role,
}

const ACCOUNTS: &[DemoAccount] = &[
    DemoAccount {
        id: "user-001",
        email: "admin@radioanalysis.com",
        password: "admin123",
        name: "Pablo Lebed",
        role: Role::Admin,
    },
    DemoAccount {
        id: "user-002",
        email: "analyst@radioanalysis.com",
        password: "analyst123",
        name: "Sarah Chen",
        role: Role::Analyst,
    },
];

/// Demo backend checking credentials against a fixed account list.
///
/// The signed-in user is kept in storage under `auth_user`, except in dev
/// mode where nothing is persisted.
pub struct DemoAuth {
    storage: Arc<dyn Storage>,
    delay: Duration,
    dev_mode: bool,
}

impl DemoAuth {
    pub fn new(storage: Arc<dyn Storage>, delay: Duration, dev_mode: bool) -> Self {
        Self {
            storage,
            delay,
            dev_mode,
        }
    }
}

impl AuthBackend for DemoAuth {
    async fn restore(&self) -> Result<Option<User>> {
        let Some(raw) = self.storage.get(AUTH_USER_KEY) else {
            return Ok(None);
        };

        match serde_json::from_str::<User>(&raw) {
            Ok(user) => Ok(Some(user)),
            Err(e) => {
                warn!("Discarding malformed stored user: {}", e);
                if let Err(e) = self.storage.remove(AUTH_USER_KEY) {
                    warn!("Failed to clear stored user: {}", e);
                }
                Ok(None)
            }
        }
    }

    async fn sign_in(&self, email: &str, password: &str) -> Result<User> {
        if !self.delay.is_zero() {
            tokio::time::sleep(self.delay).await;
        }

        let account = ACCOUNTS
            .iter()
            .find(|a| a.email == email && a.password == password)
            .ok_or_else(|| AppError::auth("Invalid email or password"))?;

        let user = User {
            id: account.id.to_string(),
            email: account.email.to_string(),
            name: account.name.to_string(),
            role: account.role,
            avatar: None,
        };

        if !self.dev_mode {
            let json = serde_json::to_string(&user)?;
            if let Err(e) = self.storage.set(AUTH_USER_KEY, &json) {
                warn!("Failed to persist session: {}", e);
            }
        }
        debug!("Demo sign-in: {}", user.email);
        Ok(user)
    }

    async fn sign_up(&self, _email: &str, _password: &str, _name: &str) -> Result<User> {
        Err(AppError::Unsupported(
            "Registration is not available with demo accounts".to_string(),
        ))
    }

    async fn sign_out(&self) -> Result<()> {
        self.storage.remove(AUTH_USER_KEY)
    }

    fn session_events(&self) -> Option<broadcast::Receiver<SessionEvent>> {
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::MemoryStorage;

    fn backend(storage: Arc<MemoryStorage>) -> DemoAuth {
        DemoAuth::new(storage, Duration::ZERO, false)
    }

    #[tokio::test]
    async fn test_analyst_account() {
        let auth = backend(Arc::new(MemoryStorage::new()));
        let user = auth.sign_in("analyst@radioanalysis.com", "analyst123").await.unwrap();
        assert_eq!(user.id, "user-002");
        assert_eq!(user.name, "Sarah Chen");
        assert_eq!(user.role, Role::Analyst);
    }

    #[tokio::test]
    async fn test_unknown_account_rejected() {
        let auth = backend(Arc::new(MemoryStorage::new()));
        let err = auth.sign_in("nobody@radioanalysis.com", "admin123").await.unwrap_err();
        assert_eq!(err.user_message(), "Invalid email or password");
    }

    #[tokio::test]
    async fn test_malformed_stored_user_is_dropped() {
        let storage = Arc::new(MemoryStorage::new());
        storage.set(AUTH_USER_KEY, "{not json").unwrap();

        let auth = backend(storage.clone());
        assert_eq!(auth.restore().await.unwrap(), None);
        assert_eq!(storage.get(AUTH_USER_KEY), None);
    }

    /// Storage that can be read but never written.
    struct ReadOnlyStorage(String);

    impl Storage for ReadOnlyStorage {
        fn get(&self, _key: &str) -> Option<String> {
            Some(self.0.clone())
        }

        fn set(&self, _key: &str, _value: &str) -> Result<()> {
            Err(AppError::storage("read-only"))
        }

        fn remove(&self, _key: &str) -> Result<()> {
            Err(AppError::storage("read-only"))
        }
    }

    #[tokio::test]
    async fn test_malformed_user_is_no_session_even_if_clear_fails() {
        let storage = Arc::new(ReadOnlyStorage("{not json".to_string()));
        let auth = DemoAuth::new(storage, Duration::ZERO, false);
        assert_eq!(auth.restore().await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_sign_in_waits_for_delay() {
        let auth = DemoAuth::new(Arc::new(MemoryStorage::new()), Duration::from_millis(20), false);
        let started = tokio::time::Instant::now();
        auth.sign_in("admin@radioanalysis.com", "admin123").await.unwrap();
        assert!(started.elapsed() >= Duration::from_millis(20));
    }
}
