//! Authenticated encryption of single secret values.
//!
//! Each value is sealed with AES-256-GCM under a key derived from the master
//! password and a fresh random salt. The salt, nonce and ciphertext travel
//! together in an [`EncryptedToken`], which is self-describing: nothing else
//! is needed to decrypt it besides the password.

use aes_gcm::aead::{Aead, KeyInit};
use aes_gcm::{Aes256Gcm, Nonce};
use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use rand::RngCore;
use serde::{Deserialize, Serialize};
use zeroize::Zeroizing;

use super::key::derive_key;
use crate::error::{KcError, Result};

/// Salt length in bytes.
pub const SALT_LENGTH: usize = 16;

/// Nonce length in bytes (96 bits for AES-GCM).
pub const NONCE_LENGTH: usize = 12;

/// Key length in bytes (256 bits for AES-256).
pub const KEY_LENGTH: usize = 32;

/// Argon2id time cost used for every token. Never lowered.
pub const KDF_ITERATIONS: u32 = 3;

/// A sealed value: `{salt, iv, data}`, each field base64 in JSON form.
///
/// `data` is the GCM ciphertext with its 16-byte authentication tag appended.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EncryptedToken {
    #[serde(with = "b64")]
    pub salt: Vec<u8>,
    #[serde(with = "b64")]
    pub iv: Vec<u8>,
    #[serde(with = "b64")]
    pub data: Vec<u8>,
}

impl EncryptedToken {
    /// Encode the token as the opaque string stored in a log record's `val`.
    pub fn encode(&self) -> Result<String> {
        let json = serde_json::to_vec(self)?;
        Ok(STANDARD.encode(json))
    }

    /// Decode an opaque `val` string back into a token.
    ///
    /// # Errors
    ///
    /// Returns `KcError::Crypto` if the string is not a structurally valid token.
    pub fn decode(value: &str) -> Result<Self> {
        let json = STANDARD
            .decode(value.trim())
            .map_err(|e| KcError::Crypto(format!("Token is not valid base64: {}", e)))?;
        let token: EncryptedToken = serde_json::from_slice(&json)
            .map_err(|e| KcError::Crypto(format!("Token is malformed: {}", e)))?;
        token.check_shape()?;
        Ok(token)
    }

    fn check_shape(&self) -> Result<()> {
        if self.salt.len() != SALT_LENGTH {
            return Err(KcError::Crypto(format!(
                "Token salt must be {} bytes, got {}",
                SALT_LENGTH,
                self.salt.len()
            )));
        }
        if self.iv.len() != NONCE_LENGTH {
            return Err(KcError::Crypto(format!(
                "Token nonce must be {} bytes, got {}",
                NONCE_LENGTH,
                self.iv.len()
            )));
        }
        Ok(())
    }
}

/// Encrypt `plaintext` under `password`.
///
/// A fresh salt and nonce are drawn for every call, so encrypting the same
/// plaintext twice never yields the same token.
///
/// # Examples
///
/// ```
/// use kc_core::crypto::{decrypt, encrypt};
///
/// let token = encrypt(b"secret data", b"my-secure-password").unwrap();
/// let plaintext = decrypt(&token, b"my-secure-password").unwrap();
/// assert_eq!(plaintext.as_slice(), b"secret data");
/// ```
pub fn encrypt(plaintext: &[u8], password: &[u8]) -> Result<EncryptedToken> {
    let mut salt = vec![0u8; SALT_LENGTH];
    rand::thread_rng().fill_bytes(&mut salt);

    let mut iv = vec![0u8; NONCE_LENGTH];
    rand::thread_rng().fill_bytes(&mut iv);

    let key = derive_key(password, &salt, KDF_ITERATIONS, KEY_LENGTH)?;
    let cipher = Aes256Gcm::new_from_slice(key.as_bytes())
        .map_err(|e| KcError::Crypto(format!("Failed to create cipher: {}", e)))?;

    let data = cipher
        .encrypt(Nonce::from_slice(&iv), plaintext)
        .map_err(|e| KcError::Crypto(format!("Encryption failed: {}", e)))?;

    Ok(EncryptedToken { salt, iv, data })
}

/// Decrypt a token with `password`.
///
/// # Errors
///
/// Returns `KcError::Crypto` if:
/// - The password is wrong
/// - The token was tampered with or truncated
/// - The salt or nonce has the wrong length
/// - The password is empty
pub fn decrypt(token: &EncryptedToken, password: &[u8]) -> Result<Zeroizing<Vec<u8>>> {
    token.check_shape()?;
    if password.is_empty() {
        return Err(KcError::Crypto(
            "Decryption failed: master password is empty".to_string(),
        ));
    }

    let key = derive_key(password, &token.salt, KDF_ITERATIONS, KEY_LENGTH)?;
    let cipher = Aes256Gcm::new_from_slice(key.as_bytes())
        .map_err(|e| KcError::Crypto(format!("Failed to create cipher: {}", e)))?;

    let plaintext = cipher
        .decrypt(Nonce::from_slice(&token.iv), token.data.as_slice())
        .map_err(|_| {
            KcError::Crypto("Decryption failed: wrong master password or corrupted data".to_string())
        })?;

    Ok(Zeroizing::new(plaintext))
}

mod b64 {
    use base64::engine::general_purpose::STANDARD;
    use base64::Engine;
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(bytes: &[u8], serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&STANDARD.encode(bytes))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Vec<u8>, D::Error> {
        let encoded = String::deserialize(deserializer)?;
        STANDARD
            .decode(encoded.as_bytes())
            .map_err(serde::de::Error::custom)
    }
}
