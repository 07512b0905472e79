//! Master password validation.
//!
//! Enforced once, when `init` stores a new master password.

use crate::error::{KcError, Result};

/// Minimum master password length in characters.
const MIN_PASSWORD_LENGTH: usize = 8;

/// Validate that a master password meets minimum requirements.
///
/// # Requirements
///
/// - Not empty or only whitespace
/// - At least 8 characters long
///
/// # Examples
///
/// ```
/// use kc_core::crypto::validate_passphrase;
///
/// assert!(validate_passphrase("my-secure-password-123").is_ok());
/// assert!(validate_passphrase("short").is_err());
/// ```
pub fn validate_passphrase(password: &str) -> Result<()> {
    if password.trim().is_empty() {
        return Err(KcError::Validation(
            "Master password cannot be empty".to_string(),
        ));
    }

    let length = password.chars().count();
    if length < MIN_PASSWORD_LENGTH {
        return Err(KcError::Validation(format!(
            "Master password must be at least {} characters (got {})",
            MIN_PASSWORD_LENGTH, length
        )));
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_valid_password() {
        assert!(validate_passphrase("my-secure-password-123").is_ok());
        assert!(validate_passphrase("longer password with spaces and symbols!@#").is_ok());
    }

    #[test]
    fn test_password_too_short() {
        let result = validate_passphrase("short");
        assert!(result
            .unwrap_err()
            .to_string()
            .contains("at least 8 characters"));
    }

    #[test]
    fn test_password_empty() {
        assert!(validate_passphrase("").is_err());
        assert!(validate_passphrase("   ").is_err());
        assert!(validate_passphrase("\n\t").is_err());
    }

    #[test]
    fn test_length_counts_characters_not_bytes() {
        // 4 characters, 8 bytes
        assert!(validate_passphrase("éééé").is_err());
        assert!(validate_passphrase("12345678").is_ok());
    }
}
