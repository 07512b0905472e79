//! Error types for kc core operations.
//!
//! This module defines the error hierarchy for all core operations.
//! Errors are descriptive at the core level; the CLI layer maps these
//! to user-friendly messages and exit codes.
//!
//! Line-level parse failures in the event log never surface here: a
//! malformed record is skipped and logged, and the read continues.

use thiserror::Error;

/// Result type alias for kc operations.
pub type Result<T> = std::result::Result<T, KcError>;

/// Core error type for kc operations.
#[derive(Debug, Error)]
pub enum KcError {
    /// Malformed identifier or rejected value
    #[error("Validation error: {0}")]
    Validation(String),

    /// Invalid caller input (empty content, bad arguments)
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// Logical key absent from the projected state
    #[error("Not found: {0}")]
    NotFound(String),

    /// The credential provider holds no master password
    #[error("Master password not found; run `kc init` first")]
    MasterKeyNotFound,

    /// Wrong master password, or a corrupt/tampered token
    #[error("Encryption error: {0}")]
    Crypto(String),

    /// Credential provider failure
    #[error("Credential store error: {0}")]
    Credential(String),

    /// I/O error
    #[error("I/O error: {source}")]
    Io {
        #[from]
        source: std::io::Error,
    },

    /// JSON serialization error while writing records
    #[error("JSON error: {source}")]
    Json {
        #[from]
        source: serde_json::Error,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_io_error_converts() {
        let err: KcError = std::io::Error::new(std::io::ErrorKind::Other, "disk gone").into();
        assert!(matches!(err, KcError::Io { .. }));
        assert!(err.to_string().contains("disk gone"));
    }
}
