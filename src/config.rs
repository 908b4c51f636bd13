//! Configuration management module.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Configuration load result.
#[derive(Debug)]
pub enum ConfigLoadResult {
    /// Config loaded successfully.
    Loaded(AppConfig),
    /// Config file missing (first run).
    Missing,
    /// Config file exists but invalid.
    Invalid(ConfigError),
}

/// Configuration errors.
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    Read(#[from] std::io::Error),

    #[error("Failed to parse config: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Failed to serialize config: {0}")]
    Serialize(#[from] toml::ser::Error),

    #[error("Validation failed: {0}")]
    Validation(String),
}

/// Main application configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub auth: AuthConfig,
    pub storage: StorageConfig,
    pub export: ExportConfig,
    pub booking: BookingConfig,
    pub ui: UiConfig,
    pub logging: LoggingConfig,
}

/// Which authentication backend to use.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AuthMode {
    /// Built-in demo accounts.
    #[default]
    Demo,
    /// External identity provider.
    Provider,
}

/// Authentication settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AuthConfig {
    pub mode: AuthMode,
    /// Sign in as the dev user automatically.
    pub dev_mode: bool,
    /// Artificial delay before demo credentials are checked.
    pub login_delay_ms: u64,
    pub provider: ProviderConfig,
}

/// Identity provider endpoint.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ProviderConfig {
    pub url: String,
    pub anon_key: String,
    /// HTTP timeout in seconds (default: 30).
    pub timeout_secs: u64,
}

/// Local storage location.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct StorageConfig {
    /// Directory holding `storage.json`; the platform data dir when unset.
    pub dir: Option<PathBuf>,
}

/// Export destination.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ExportConfig {
    /// Directory CSV files are written to; the current directory when unset.
    pub dir: Option<PathBuf>,
}

/// Opening hours used to cut a day into booking slots.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct BookingConfig {
    pub day_start_hour: u32,
    pub day_end_hour: u32,
    pub slot_minutes: u32,
}

/// UI preferences.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct UiConfig {
    /// Platform dark-mode hint, used when no theme has been saved.
    pub prefer_dark: bool,
}

/// Logging settings.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Also write a daily rolling log file into the data directory.
    pub file: bool,
}

impl AppConfig {
    /// Get config file path (platform config directory).
    pub fn default_path() -> PathBuf {
        project_dirs()
            .map(|dirs| dirs.config_dir().to_path_buf())
            .unwrap_or_else(|| PathBuf::from("."))
            .join("config.toml")
    }

    /// Directory for local storage and log files.
    pub fn data_dir(&self) -> PathBuf {
        self.storage.dir.clone().unwrap_or_else(|| {
            project_dirs()
                .map(|dirs| dirs.data_dir().to_path_buf())
                .unwrap_or_else(|| PathBuf::from("."))
        })
    }

    /// Directory exported files are written to.
    pub fn export_dir(&self) -> PathBuf {
        self.export.dir.clone().unwrap_or_else(|| PathBuf::from("."))
    }

    /// Attempt to load config with detailed result.
    pub fn try_load(path: &Path) -> ConfigLoadResult {
        if !path.exists() {
            return ConfigLoadResult::Missing;
        }

        match std::fs::read_to_string(path) {
            Ok(content) => match toml::from_str::<AppConfig>(&content) {
                Ok(config) => match config.validate() {
                    Ok(()) => ConfigLoadResult::Loaded(config),
                    Err(e) => ConfigLoadResult::Invalid(e),
                },
                Err(e) => ConfigLoadResult::Invalid(ConfigError::Parse(e)),
            },
            Err(e) => ConfigLoadResult::Invalid(ConfigError::Read(e)),
        }
    }

    /// Validate configuration values.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.auth.mode == AuthMode::Provider {
            let url = self.auth.provider.url.trim();
            if url.is_empty() {
                return Err(ConfigError::Validation(
                    "Provider URL is required when auth mode is 'provider'".to_string(),
                ));
            }
            if !url.starts_with("http") {
                return Err(ConfigError::Validation(
                    "Provider URL must start with http:// or https://".to_string(),
                ));
            }
            if self.auth.provider.anon_key.trim().is_empty() {
                return Err(ConfigError::Validation("Provider anon key cannot be empty".to_string()));
            }
            if self.auth.provider.timeout_secs < 1 {
                return Err(ConfigError::Validation(
                    "Provider timeout must be at least 1 second".to_string(),
                ));
            }
        }
        if self.auth.login_delay_ms > 10_000 {
            return Err(ConfigError::Validation("Login delay cannot exceed 10 seconds".to_string()));
        }
        if self.booking.day_end_hour > 23 {
            return Err(ConfigError::Validation("Day end hour cannot exceed 23".to_string()));
        }
        if self.booking.day_start_hour >= self.booking.day_end_hour {
            return Err(ConfigError::Validation(
                "Day start hour must be before day end hour".to_string(),
            ));
        }
        if self.booking.slot_minutes < 5 {
            return Err(ConfigError::Validation("Slot length must be at least 5 minutes".to_string()));
        }
        if self.booking.slot_minutes > 24 * 60 {
            return Err(ConfigError::Validation("Slot length cannot exceed one day".to_string()));
        }
        Ok(())
    }

    /// Save configuration to file.
    pub fn save(&self, path: &Path) -> Result<(), ConfigError> {
        let content = toml::to_string_pretty(self)?;
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(path, content)?;
        Ok(())
    }
}

fn project_dirs() -> Option<directories::ProjectDirs> {
    directories::ProjectDirs::from("org", "TheLab", "thelab")
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            mode: AuthMode::Demo,
            dev_mode: false,
            login_delay_ms: 800,
            provider: ProviderConfig::default(),
        }
    }
}

impl Default for BookingConfig {
    fn default() -> Self {
        Self {
            day_start_hour: 8,
            day_end_hour: 18,
            slot_minutes: 60,
        }
    }
}

impl Default for ProviderConfig {
    fn default() -> Self {
        Self {
            url: String::new(),
            anon_key: String::new(),
            timeout_secs: 30,
        }
    }
}

impl ProviderConfig {
    pub fn timeout(&self) -> std::time::Duration {
        std::time::Duration::from_secs(self.timeout_secs)
    }
}
