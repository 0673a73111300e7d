//! Error types for `issuetrack-lib`.

use std::path::PathBuf;
use thiserror::Error;

/// Primary error type for issuetrack-lib operations.
#[derive(Error, Debug)]
pub enum TrackerError {
    // === Issue Errors ===
    /// No issue carries the given identifier.
    #[error("Issue not found: {id}")]
    IssueNotFound { id: String },

    /// Identifier is not a well-formed issue id (24 lowercase hex characters).
    #[error("Invalid issue ID format: {id}")]
    InvalidId { id: String },

    /// Attempted to insert an issue with an ID that already exists.
    #[error("Issue ID collision: {id}")]
    IdCollision { id: String },

    // === Validation Errors ===
    /// One or more of `issue_title`, `issue_text`, `created_by` is absent or empty.
    #[error("Required field(s) missing: {fields:?}")]
    MissingRequired { fields: Vec<&'static str> },

    // === JSONL Errors ===
    /// Failed to parse a line in the JSONL file.
    #[error("JSONL parse error at line {line}: {reason}")]
    JsonlParse { line: usize, reason: String },

    // === Storage Errors ===
    /// Backend failure not covered by a more specific variant.
    #[error("Storage error: {0}")]
    Storage(String),

    /// File not found at the specified path.
    #[error("File not found: {0}")]
    FileNotFound(PathBuf),

    // === I/O Errors ===
    /// File system I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON serialization/deserialization error.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl TrackerError {
    /// True when the target record is absent or its identifier was rejected
    /// before lookup. Everything else is an infrastructure fault.
    #[must_use]
    pub const fn is_not_found_like(&self) -> bool {
        matches!(self, Self::IssueNotFound { .. } | Self::InvalidId { .. })
    }
}

/// Result type using `TrackerError`.
pub type Result<T> = std::result::Result<T, TrackerError>;
