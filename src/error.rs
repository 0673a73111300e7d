//! Error types for the `itrack` binary and its HTTP/SQLite layers.

use issuetrack_lib::TrackerError;
use thiserror::Error;

/// Primary error type outside the domain library.
#[derive(Error, Debug)]
pub enum AppError {
    /// Domain or store error from `issuetrack-lib`.
    #[error(transparent)]
    Tracker(#[from] TrackerError),

    /// `SQLite` error while opening or preparing the database.
    #[error("SQLite error: {0}")]
    Sqlite(#[from] rusqlite::Error),

    /// Invalid configuration value or unsupported connection string.
    #[error("Configuration error: {0}")]
    Config(String),

    /// Logging subscriber could not be installed.
    #[error("Logging error: {0}")]
    Logging(String),

    /// File system or socket I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// YAML config file could not be parsed.
    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    /// JSON serialization error.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl AppError {
    #[must_use]
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config(message.into())
    }
}

/// Result type using `AppError`.
pub type Result<T> = std::result::Result<T, AppError>;
