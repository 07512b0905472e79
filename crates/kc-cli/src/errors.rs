//! CLI error types for structured error handling.
//!
//! This module provides typed errors that map to specific exit codes,
//! enabling consistent error handling across the CLI. Core errors are
//! classified here too, so every failure leaves through one path.

use std::fmt;

use kc_core::KcError;

use crate::constants::exit_codes;

/// CLI-specific errors with associated exit codes.
#[derive(Debug)]
pub enum CliError {
    /// Resource not found (secret, store, master password)
    NotFound { message: String, hint: String },

    /// Authentication failed (wrong master password, tampered secret)
    AuthFailed {
        message: String,
        hint: Option<String>,
    },

    /// Invalid user input
    InvalidInput(String),

    /// One or more secrets failed the integrity check
    IntegrityFailed(String),

    /// Anything else
    Failed(String),
}

impl fmt::Display for CliError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CliError::NotFound { message, hint } => {
                write!(f, "{}\n{}", message, hint)
            }
            CliError::AuthFailed { message, hint } => {
                if let Some(h) = hint {
                    write!(f, "{}\n{}", message, h)
                } else {
                    write!(f, "{}", message)
                }
            }
            CliError::InvalidInput(message)
            | CliError::IntegrityFailed(message)
            | CliError::Failed(message) => write!(f, "{}", message),
        }
    }
}

impl std::error::Error for CliError {}

impl CliError {
    /// Create a NotFound error with message and hint.
    pub fn not_found(message: impl Into<String>, hint: impl Into<String>) -> Self {
        CliError::NotFound {
            message: message.into(),
            hint: hint.into(),
        }
    }

    /// Create an AuthFailed error with message and hint.
    pub fn auth_failed_with_hint(message: impl Into<String>, hint: impl Into<String>) -> Self {
        CliError::AuthFailed {
            message: message.into(),
            hint: Some(hint.into()),
        }
    }

    /// Create an InvalidInput error.
    pub fn invalid_input(message: impl Into<String>) -> Self {
        CliError::InvalidInput(message.into())
    }

    /// Classify an error bubbled up from a command handler.
    pub fn from_anyhow(err: anyhow::Error) -> Self {
        let err = match err.downcast::<CliError>() {
            Ok(cli_err) => return cli_err,
            Err(err) => err,
        };
        match err.downcast::<KcError>() {
            Ok(core_err) => core_err.into(),
            Err(err) => CliError::Failed(format!("{:#}", err)),
        }
    }

    /// Get the exit code for this error.
    pub fn exit_code(&self) -> i32 {
        match self {
            CliError::NotFound { .. } => exit_codes::NOT_FOUND,
            CliError::AuthFailed { .. } => exit_codes::AUTH_FAILED,
            CliError::InvalidInput(_) => exit_codes::INVALID_INPUT,
            CliError::IntegrityFailed(_) => exit_codes::INTEGRITY_FAILED,
            CliError::Failed(_) => exit_codes::FAILURE,
        }
    }

    /// Print error message to stderr and exit with appropriate code.
    pub fn exit(&self) -> ! {
        eprintln!("Error: {}", self);
        std::process::exit(self.exit_code())
    }
}

impl From<KcError> for CliError {
    fn from(err: KcError) -> Self {
        match err {
            KcError::NotFound(id) => CliError::not_found(
                format!("Secret not found: {}", id),
                "Hint: Run `kc list` to see stored secrets.",
            ),
            KcError::MasterKeyNotFound => CliError::not_found(
                "No master password found in the credential store",
                "Hint: Run `kc init` to set one.",
            ),
            KcError::Crypto(message) => CliError::auth_failed_with_hint(
                message,
                "Hint: The master password may have changed since this secret was saved.",
            ),
            KcError::Validation(message) | KcError::InvalidInput(message) => {
                CliError::InvalidInput(message)
            }
            other => CliError::Failed(other.to_string()),
        }
    }
}
