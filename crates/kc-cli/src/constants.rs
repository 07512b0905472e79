//! Constants used throughout the CLI.

/// Exit codes for the CLI.
///
/// These follow common Unix conventions:
/// - 0: Success
/// - 1: General error (I/O, credential backend, anything unclassified)
/// - 2: Misuse of shell command (reserved by shells, used by clap)
/// - 3+: Application-specific errors
pub mod exit_codes {
    /// General failure.
    pub const FAILURE: i32 = 1;

    /// Resource not found (secret, store, master password).
    pub const NOT_FOUND: i32 = 3;

    /// Invalid user input or arguments.
    pub const INVALID_INPUT: i32 = 4;

    /// Authentication failed (wrong master password, tampered secret).
    pub const AUTH_FAILED: i32 = 5;

    /// Integrity check failed.
    pub const INTEGRITY_FAILED: i32 = 6;
}

/// Environment variables read by the CLI.
pub mod env {
    /// Store log path override (also bound to `--store`).
    pub const STORE: &str = "KC_STORE";

    /// Credential backend override (also bound to `--credentials`).
    pub const CREDENTIALS: &str = "KC_CREDENTIALS";

    /// Keyfile path override (also bound to `--keyfile`).
    pub const KEYFILE: &str = "KC_KEYFILE";

    /// Config file path override.
    pub const CONFIG: &str = "KC_CONFIG";

    /// Master password for non-interactive `init`.
    pub const PASSWORD: &str = "KC_PASSWORD";

    /// Tracing filter directives.
    pub const LOG: &str = "KC_LOG";
}

/// Filter used when `KC_LOG` is unset or invalid.
pub const DEFAULT_LOG_FILTER: &str = "warn";

/// Name of the application directory under the XDG base directories.
pub const APP_DIR: &str = "kc";
