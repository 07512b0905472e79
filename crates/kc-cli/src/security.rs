//! Credential providers backed by the platform.

use std::fs::{self, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};

use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use serde::{Deserialize, Serialize};
use zeroize::Zeroizing;

use kc_core::{CredentialProvider, KcError};

/// Master password in the OS keychain.
#[derive(Debug, Default)]
pub struct KeychainCredentials;

impl KeychainCredentials {
    pub fn new() -> Self {
        Self
    }
}

impl CredentialProvider for KeychainCredentials {
    fn get(&self, service: &str, account: &str) -> kc_core::Result<Option<Zeroizing<Vec<u8>>>> {
        let entry = keychain_entry(service, account)?;
        match entry.get_password() {
            Ok(value) => Ok(Some(Zeroizing::new(Zeroizing::new(value).as_bytes().to_vec()))),
            Err(keyring::Error::NoEntry) => Ok(None),
            Err(err) => Err(KcError::Credential(format!("Keychain read failed: {}", err))),
        }
    }

    fn set(&self, service: &str, account: &str, secret: &[u8]) -> kc_core::Result<()> {
        // The keychain API only stores strings.
        let value = std::str::from_utf8(secret).map_err(|_| {
            KcError::Credential("Keychain can only store UTF-8 master passwords".to_string())
        })?;
        keychain_entry(service, account)?
            .set_password(value)
            .map_err(|e| KcError::Credential(format!("Keychain write failed: {}", e)))
    }

    fn delete(&self, service: &str, account: &str) -> kc_core::Result<bool> {
        match keychain_entry(service, account)?.delete_password() {
            Ok(()) => Ok(true),
            Err(keyring::Error::NoEntry) => Ok(false),
            Err(err) => Err(KcError::Credential(format!(
                "Keychain delete failed: {}",
                err
            ))),
        }
    }
}

fn keychain_entry(service: &str, account: &str) -> kc_core::Result<keyring::Entry> {
    keyring::Entry::new(service, account)
        .map_err(|e| KcError::Credential(format!("Keychain entry failed: {}", e)))
}

/// Master password in an owner-only file.
///
/// The file holds one credential as JSON:
/// `{"service":"kc","account":"master-password","secret":"<base64>"}`.
#[derive(Debug, Clone)]
pub struct KeyfileCredentials {
    path: PathBuf,
}

#[derive(Serialize, Deserialize)]
struct KeyfileRecord {
    service: String,
    account: String,
    secret: String,
}

impl KeyfileCredentials {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    fn read_record(&self) -> kc_core::Result<Option<KeyfileRecord>> {
        let contents = match fs::read(&self.path) {
            Ok(contents) => Zeroizing::new(contents),
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => return Ok(None),
            Err(err) => {
                return Err(KcError::Credential(format!(
                    "Failed to read keyfile {}: {}",
                    self.path.display(),
                    err
                )))
            }
        };
        serde_json::from_slice(&contents).map(Some).map_err(|e| {
            KcError::Credential(format!(
                "Keyfile {} is corrupt: {}",
                self.path.display(),
                e
            ))
        })
    }
}

impl CredentialProvider for KeyfileCredentials {
    fn get(&self, service: &str, account: &str) -> kc_core::Result<Option<Zeroizing<Vec<u8>>>> {
        let Some(record) = self.read_record()? else {
            return Ok(None);
        };
        if record.service != service || record.account != account {
            return Ok(None);
        }
        let secret = Zeroizing::new(record.secret);
        STANDARD
            .decode(secret.as_bytes())
            .map(|bytes| Some(Zeroizing::new(bytes)))
            .map_err(|e| KcError::Credential(format!("Keyfile secret is not base64: {}", e)))
    }

    fn set(&self, service: &str, account: &str, secret: &[u8]) -> kc_core::Result<()> {
        let record = KeyfileRecord {
            service: service.to_string(),
            account: account.to_string(),
            secret: STANDARD.encode(secret),
        };
        let contents = Zeroizing::new(serde_json::to_vec(&record)?);

        write_owner_only(&self.path, &contents).map_err(|e| {
            KcError::Credential(format!(
                "Failed to write keyfile {}: {}",
                self.path.display(),
                e
            ))
        })
    }

    fn delete(&self, service: &str, account: &str) -> kc_core::Result<bool> {
        let Some(record) = self.read_record()? else {
            return Ok(false);
        };
        if record.service != service || record.account != account {
            return Ok(false);
        }
        fs::remove_file(&self.path).map_err(|e| {
            KcError::Credential(format!(
                "Failed to remove keyfile {}: {}",
                self.path.display(),
                e
            ))
        })?;
        Ok(true)
    }
}

fn write_owner_only(path: &Path, contents: &[u8]) -> std::io::Result<()> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent)?;
        }
    }

    let mut options = OpenOptions::new();
    options.write(true).create(true).truncate(true);
    #[cfg(unix)]
    {
        use std::os::unix::fs::OpenOptionsExt;
        options.mode(0o600);
    }
    let mut file = options.open(path)?;
    file.write_all(contents)?;
    file.sync_all()?;

    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        let mut perms = fs::metadata(path)?.permissions();
        perms.set_mode(0o600);
        fs::set_permissions(path, perms)?;
    }
    Ok(())
}
