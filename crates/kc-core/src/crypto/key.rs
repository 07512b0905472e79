//! Key derivation using Argon2id.
//!
//! This module stretches the master password into per-token encryption keys
//! using the Argon2id algorithm, which is memory-hard and resistant to
//! GPU-based attacks. Every token carries its own salt, so every token gets
//! its own key.

use argon2::Argon2;
use zeroize::ZeroizeOnDrop;

use crate::error::{KcError, Result};

/// Argon2id memory cost: 64 MB (64 * 1024 KB).
const ARGON2_MEMORY_KB: u32 = 64 * 1024;

/// Argon2id lanes. Derivation stays on the calling thread.
const ARGON2_PARALLELISM: u32 = 1;

/// Minimum accepted salt length in bytes.
pub const MIN_SALT_LENGTH: usize = 16;

/// A cryptographic key derived from the master password.
///
/// Key material is zeroized from memory when dropped.
#[derive(ZeroizeOnDrop)]
pub struct DerivedKey {
    key: Vec<u8>,
}

impl DerivedKey {
    /// Get a reference to the raw key bytes.
    ///
    /// # Security
    ///
    /// Avoid storing or logging this value. Use only for immediate encryption operations.
    pub fn as_bytes(&self) -> &[u8] {
        &self.key
    }

    pub fn len(&self) -> usize {
        self.key.len()
    }

    pub fn is_empty(&self) -> bool {
        self.key.is_empty()
    }
}

impl std::fmt::Debug for DerivedKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DerivedKey")
            .field("key", &"[REDACTED]")
            .finish()
    }
}

/// Derive an encryption key from a password using Argon2id.
///
/// # Arguments
///
/// * `password` - The master password
/// * `salt` - Random salt, at least 16 bytes, unique per token
/// * `iterations` - Argon2 time cost
/// * `key_length` - Length of the derived key in bytes
///
/// # Security
///
/// - Same password + salt + parameters always produces the same key
/// - Memory-hard: requires ~64MB RAM per derivation
/// - The cost is the store's brute-force throttle; callers pass a fixed
///   constant and never lower it
///
/// # Examples
///
/// ```
/// use kc_core::crypto::derive_key;
///
/// let salt = b"unique-salt-per-token";
/// let key = derive_key(b"my-password", salt, 3, 32).unwrap();
/// assert_eq!(key.as_bytes().len(), 32);
/// ```
pub fn derive_key(
    password: &[u8],
    salt: &[u8],
    iterations: u32,
    key_length: usize,
) -> Result<DerivedKey> {
    if password.is_empty() {
        return Err(KcError::InvalidInput(
            "Password cannot be empty".to_string(),
        ));
    }

    if salt.len() < MIN_SALT_LENGTH {
        return Err(KcError::InvalidInput(format!(
            "Salt must be at least {} bytes",
            MIN_SALT_LENGTH
        )));
    }

    let params = argon2::Params::new(
        ARGON2_MEMORY_KB,
        iterations,
        ARGON2_PARALLELISM,
        Some(key_length),
    )
    .map_err(|e| KcError::Crypto(format!("Failed to create Argon2 params: {}", e)))?;

    let argon2 = Argon2::new(argon2::Algorithm::Argon2id, argon2::Version::V0x13, params);

    let mut key = vec![0u8; key_length];
    argon2
        .hash_password_into(password, salt, &mut key)
        .map_err(|e| KcError::Crypto(format!("Key derivation failed: {}", e)))?;

    Ok(DerivedKey { key })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_key_derivation_deterministic() {
        let salt = b"unique-salt-1234567890123456";

        let key1 = derive_key(b"test-password", salt, 3, 32).unwrap();
        let key2 = derive_key(b"test-password", salt, 3, 32).unwrap();

        assert_eq!(key1.as_bytes(), key2.as_bytes());
    }

    #[test]
    fn test_different_salt_different_key() {
        let key1 = derive_key(b"test-password", b"salt1-1234567890123456", 3, 32).unwrap();
        let key2 = derive_key(b"test-password", b"salt2-1234567890123456", 3, 32).unwrap();

        assert_ne!(key1.as_bytes(), key2.as_bytes());
    }

    #[test]
    fn test_different_password_different_key() {
        let salt = b"fixed-salt-123456789012345";

        let key1 = derive_key(b"password-one", salt, 3, 32).unwrap();
        let key2 = derive_key(b"password-two", salt, 3, 32).unwrap();

        assert_ne!(key1.as_bytes(), key2.as_bytes());
    }

    #[test]
    fn test_iterations_change_key() {
        let salt = b"fixed-salt-123456789012345";

        let key1 = derive_key(b"password", salt, 3, 32).unwrap();
        let key2 = derive_key(b"password", salt, 4, 32).unwrap();

        assert_ne!(key1.as_bytes(), key2.as_bytes());
    }

    #[test]
    fn test_requested_length_honoured() {
        let salt = b"salt-1234567890123456";

        assert_eq!(derive_key(b"password", salt, 3, 16).unwrap().len(), 16);
        assert_eq!(derive_key(b"password", salt, 3, 32).unwrap().len(), 32);
    }

    #[test]
    fn test_empty_password_rejected() {
        let result = derive_key(b"", b"salt-1234567890123456", 3, 32);
        assert!(result
            .unwrap_err()
            .to_string()
            .contains("Password cannot be empty"));
    }

    #[test]
    fn test_short_salt_rejected() {
        let result = derive_key(b"test-password", b"short", 3, 32);
        assert!(result
            .unwrap_err()
            .to_string()
            .contains("Salt must be at least 16 bytes"));
    }

    #[test]
    fn test_derived_key_debug_redacts() {
        let key = derive_key(b"test-password", b"salt-1234567890123456", 3, 32).unwrap();

        let debug_output = format!("{:?}", key);
        assert!(debug_output.contains("REDACTED"));

        let key_hex = hex::encode(&key.as_bytes()[..4]);
        assert!(!debug_output.contains(&key_hex));
    }
}
