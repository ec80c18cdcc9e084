//! Error types for session record import/export.

use thiserror::Error;

/// Errors that can occur while reading or writing session records.
#[derive(Error, Debug)]
pub enum FormatError {
    /// I/O error during file operations
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON serialization error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// ZIP archive error
    #[error("ZIP error: {0}")]
    Zip(#[from] zip::result::ZipError),

    /// Import data missing or mistyping a required field. Nothing was applied.
    #[error("Malformed record: {message}")]
    MalformedRecord {
        /// Description of the first problem found
        message: String,
    },
}

impl FormatError {
    /// Create a malformed record error with a message.
    pub fn malformed(message: impl Into<String>) -> Self {
        Self::MalformedRecord {
            message: message.into(),
        }
    }

    /// Malformed record error for a bad field of annotation `index`.
    pub fn malformed_entry(index: usize, message: impl std::fmt::Display) -> Self {
        Self::malformed(format!("annotations[{}]: {}", index, message))
    }

    pub fn is_malformed(&self) -> bool {
        matches!(self, Self::MalformedRecord { .. })
    }
}
