//! Credential provider capability.
//!
//! The master password never lives in the log. It is held by an external
//! provider (the OS keychain, a keyfile, or memory in tests) addressed by a
//! `(service, account)` pair. The store only ever uses [`SERVICE`] and
//! [`ACCOUNT`].

use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard};

use zeroize::Zeroizing;

use crate::error::{KcError, Result};

/// Service name under which the master password is stored.
pub const SERVICE: &str = "kc";

/// Account name under which the master password is stored.
pub const ACCOUNT: &str = "master-password";

/// Secure storage for a single secret per `(service, account)`.
pub trait CredentialProvider {
    /// Fetch the stored secret, `None` when nothing is stored.
    fn get(&self, service: &str, account: &str) -> Result<Option<Zeroizing<Vec<u8>>>>;

    /// Store `secret`, replacing any previous value.
    fn set(&self, service: &str, account: &str, secret: &[u8]) -> Result<()>;

    /// Remove the stored secret. Returns whether one existed.
    fn delete(&self, service: &str, account: &str) -> Result<bool>;
}

impl<T: CredentialProvider + ?Sized> CredentialProvider for &T {
    fn get(&self, service: &str, account: &str) -> Result<Option<Zeroizing<Vec<u8>>>> {
        (**self).get(service, account)
    }

    fn set(&self, service: &str, account: &str, secret: &[u8]) -> Result<()> {
        (**self).set(service, account, secret)
    }

    fn delete(&self, service: &str, account: &str) -> Result<bool> {
        (**self).delete(service, account)
    }
}

impl<T: CredentialProvider + ?Sized> CredentialProvider for Box<T> {
    fn get(&self, service: &str, account: &str) -> Result<Option<Zeroizing<Vec<u8>>>> {
        (**self).get(service, account)
    }

    fn set(&self, service: &str, account: &str, secret: &[u8]) -> Result<()> {
        (**self).set(service, account, secret)
    }

    fn delete(&self, service: &str, account: &str) -> Result<bool> {
        (**self).delete(service, account)
    }
}

/// In-process provider. Nothing survives the process.
#[derive(Debug, Default)]
pub struct MemoryCredentials {
    secrets: Mutex<HashMap<(String, String), Zeroizing<Vec<u8>>>>,
}

impl MemoryCredentials {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> Result<MutexGuard<'_, HashMap<(String, String), Zeroizing<Vec<u8>>>>> {
        self.secrets
            .lock()
            .map_err(|_| KcError::Credential("in-memory credential map poisoned".to_string()))
    }
}

impl CredentialProvider for MemoryCredentials {
    fn get(&self, service: &str, account: &str) -> Result<Option<Zeroizing<Vec<u8>>>> {
        let secrets = self.lock()?;
        Ok(secrets
            .get(&(service.to_string(), account.to_string()))
            .map(|secret| Zeroizing::new(secret.to_vec())))
    }

    fn set(&self, service: &str, account: &str, secret: &[u8]) -> Result<()> {
        self.lock()?.insert(
            (service.to_string(), account.to_string()),
            Zeroizing::new(secret.to_vec()),
        );
        Ok(())
    }

    fn delete(&self, service: &str, account: &str) -> Result<bool> {
        Ok(self
            .lock()?
            .remove(&(service.to_string(), account.to_string()))
            .is_some())
    }
}
