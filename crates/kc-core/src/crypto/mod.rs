//! Cryptographic operations for kc.
//!
//! This module provides encryption and key derivation services using
//! well-audited libraries:
//! - **Argon2id**: Memory-hard key derivation function
//! - **AES-256-GCM**: Authenticated encryption; wrong passwords and
//!   tampered tokens are detected, never decrypted into garbage
//!
//! ## Security Model
//!
//! - One master password, held by the credential provider, never in the log
//! - A fresh salt and nonce per sealed value
//! - Key material zeroized from memory on drop
//!
//! ## Threat Model
//!
//! We defend against:
//! - Theft or leakage of the synchronized log file
//! - Offline brute-force attacks on the master password
//!
//! We do NOT defend against:
//! - Compromised OS / keylogger
//! - Access to an unlocked keychain session

pub mod cipher;
pub mod key;
pub mod passphrase;

pub use cipher::{decrypt, encrypt, EncryptedToken};
pub use key::{derive_key, DerivedKey};
pub use passphrase::validate_passphrase;
