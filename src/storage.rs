//! Local key/value storage for session and preference data.
//!
//! Keys in use:
//! - `auth_user`: serialized [`User`](crate::models::User) of the demo backend
//! - `theme`: `"dark"` or `"light"`
//! - `provider_session`: identity provider tokens

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use crate::error::{AppError, Result};

/// Storage key for the persisted demo session user.
pub const AUTH_USER_KEY: &str = "auth_user";
/// Storage key for the theme preference.
pub const THEME_KEY: &str = "theme";
/// Storage key for identity provider tokens.
pub const PROVIDER_SESSION_KEY: &str = "provider_session";

/// String key/value store.
///
/// Reads never fail: a missing or unreadable entry is simply absent.
pub trait Storage: Send + Sync {
    /// Get the value stored under `key`.
    fn get(&self, key: &str) -> Option<String>;

    /// Store `value` under `key`, replacing any previous value.
    fn set(&self, key: &str, value: &str) -> Result<()>;

    /// Remove `key`. Removing a missing key is not an error.
    fn remove(&self, key: &str) -> Result<()>;
}

/// Volatile storage, used for tests and `--dev` runs.
#[derive(Debug, Default)]
pub struct MemoryStorage {
    entries: Mutex<BTreeMap<String, String>>,
}

impl MemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }
}

impl Storage for MemoryStorage {
    fn get(&self, key: &str) -> Option<String> {
        lock(&self.entries).get(key).cloned()
    }

    fn set(&self, key: &str, value: &str) -> Result<()> {
        lock(&self.entries).insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<()> {
        lock(&self.entries).remove(key);
        Ok(())
    }
}

/// Storage persisted as a JSON object in a single file.
///
/// The file is loaded once on open and rewritten on every change. A change
/// that fails to reach the file is not kept in memory either.
#[derive(Debug)]
pub struct FileStorage {
    path: PathBuf,
    entries: Mutex<BTreeMap<String, String>>,
}

impl FileStorage {
    /// File name used inside the data directory.
    pub const FILE_NAME: &'static str = "storage.json";

    /// Open (or start) the storage file at `path`.
    ///
    /// A corrupt file is logged and treated as empty; it will be overwritten
    /// on the next write.
    pub fn open(path: impl Into<PathBuf>) -> Result<Self> {
        let path = path.into();
        let entries = if path.exists() {
            let content = std::fs::read_to_string(&path)?;
            match serde_json::from_str::<BTreeMap<String, String>>(&content) {
                Ok(entries) => entries,
                Err(e) => {
                    tracing::warn!("Ignoring unreadable storage file {:?}: {}", path, e);
                    BTreeMap::new()
                }
            }
        } else {
            BTreeMap::new()
        };

        Ok(Self {
            path,
            entries: Mutex::new(entries),
        })
    }

    /// Open `storage.json` inside `dir`, creating the directory if needed.
    pub fn open_in(dir: &Path) -> Result<Self> {
        std::fs::create_dir_all(dir)?;
        Self::open(dir.join(Self::FILE_NAME))
    }

    /// Location of the backing file.
    pub fn path(&self) -> &Path {
        &self.path
    }

    fn flush(&self, entries: &BTreeMap<String, String>) -> Result<()> {
        let content = serde_json::to_string_pretty(entries)
            .map_err(|e| AppError::storage(format!("Failed to serialize storage: {e}")))?;
        std::fs::write(&self.path, content)?;
        Ok(())
    }
}

impl Storage for FileStorage {
    fn get(&self, key: &str) -> Option<String> {
        lock(&self.entries).get(key).cloned()
    }

    fn set(&self, key: &str, value: &str) -> Result<()> {
        let mut entries = lock(&self.entries);
        let mut next = entries.clone();
        next.insert(key.to_string(), value.to_string());
        self.flush(&next)?;
        *entries = next;
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<()> {
        let mut entries = lock(&self.entries);
        if !entries.contains_key(key) {
            return Ok(());
        }
        let mut next = entries.clone();
        next.remove(key);
        self.flush(&next)?;
        *entries = next;
        Ok(())
    }
}

fn lock<T>(mutex: &Mutex<T>) -> std::sync::MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(|e| e.into_inner())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_memory_storage_roundtrip() {
        let storage = MemoryStorage::new();
        assert_eq!(storage.get(THEME_KEY), None);

        storage.set(THEME_KEY, "dark").unwrap();
        assert_eq!(storage.get(THEME_KEY).as_deref(), Some("dark"));

        storage.remove(THEME_KEY).unwrap();
        assert_eq!(storage.get(THEME_KEY), None);
        storage.remove(THEME_KEY).unwrap();
    }

    #[test]
    fn test_file_storage_persists_across_opens() {
        let dir = TempDir::new().unwrap();
        {
            let storage = FileStorage::open_in(dir.path()).unwrap();
            storage.set(THEME_KEY, "light").unwrap();
            storage.set(AUTH_USER_KEY, "{}").unwrap();
            storage.remove(AUTH_USER_KEY).unwrap();
        }

        let reopened = FileStorage::open_in(dir.path()).unwrap();
        assert_eq!(reopened.get(THEME_KEY).as_deref(), Some("light"));
        assert_eq!(reopened.get(AUTH_USER_KEY), None);
    }

    #[test]
    fn test_failed_write_leaves_entries_unchanged() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("storage.json");
        let storage = FileStorage::open(&path).unwrap();
        storage.set(THEME_KEY, "light").unwrap();

        // Replace the file with a directory so the next write fails.
        std::fs::remove_file(&path).unwrap();
        std::fs::create_dir(&path).unwrap();

        assert!(storage.set(THEME_KEY, "dark").is_err());
        assert_eq!(storage.get(THEME_KEY).as_deref(), Some("light"));
        assert!(storage.remove(THEME_KEY).is_err());
        assert_eq!(storage.get(THEME_KEY).as_deref(), Some("light"));
    }

    #[test]
    fn test_file_storage_ignores_corrupt_file() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join(FileStorage::FILE_NAME);
        std::fs::write(&path, "not json").unwrap();

        let storage = FileStorage::open(&path).unwrap();
        assert_eq!(storage.get(THEME_KEY), None);

        storage.set(THEME_KEY, "dark").unwrap();
        let content = std::fs::read_to_string(&path).unwrap();
        assert!(content.contains("\"theme\": \"dark\""));
    }
}
