//! Error types and handling.

use thiserror::Error;

/// Application-wide error type
#[derive(Error, Debug)]
pub enum AppError {
    /// HTTP request to the identity provider failed
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// JSON (de)serialization failed
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// File I/O error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Authentication rejected or provider error
    #[error("Authentication error: {0}")]
    Auth(String),

    /// Configuration error
    #[error("Config error: {0}")]
    Config(String),

    /// Local storage error
    #[error("Storage error: {0}")]
    Storage(String),

    /// CSV/PDF export error
    #[error("Export error: {0}")]
    Export(String),

    /// Validation error
    #[error("Validation error: {0}")]
    Validation(String),

    /// Record not found
    #[error("Not found: {0}")]
    NotFound(String),

    /// Feature exists in the interface but is not implemented
    #[error("Unsupported: {0}")]
    Unsupported(String),
}

/// Result type alias for AppError
pub type Result<T> = std::result::Result<T, AppError>;

impl AppError {
    /// Create an auth error with message
    pub fn auth(msg: impl Into<String>) -> Self {
        Self::Auth(msg.into())
    }

    /// Create a config error with message
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }

    /// Create a storage error with message
    pub fn storage(msg: impl Into<String>) -> Self {
        Self::Storage(msg.into())
    }

    /// Create an export error with message
    pub fn export(msg: impl Into<String>) -> Self {
        Self::Export(msg.into())
    }

    /// Create a validation error with message
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    /// Create a not found error with message
    pub fn not_found(msg: impl Into<String>) -> Self {
        Self::NotFound(msg.into())
    }

    /// Message suitable for showing to the user as-is.
    ///
    /// Auth and unsupported errors already carry user-facing text, so the
    /// category prefix is dropped for them.
    pub fn user_message(&self) -> String {
        match self {
            Self::Auth(msg) | Self::Unsupported(msg) => msg.clone(),
            other => other.to_string(),
        }
    }
}
