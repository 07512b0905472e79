//! The secret store facade.
//!
//! Composes the crypto, log, merge and projection layers into the
//! operations the CLI exposes. Read paths merge conflicted copies first,
//! then replay the log; write paths encrypt and append.
//!
//! ## Per-key lifecycle
//!
//! Each `namespace:key` is either absent or present. `save` makes it
//! present, `delete` makes it absent again, and a later `save` brings it
//! back. Nothing is terminal.
//!
//! ## Locking
//!
//! Every operation holds an exclusive advisory lock on `<log>.lock` so two
//! local processes cannot interleave a merge with an append. Devices that
//! only meet through file sync are still reconciled optimistically: the
//! later timestamp wins on the next merge.

use std::fs::{File, OpenOptions};
use std::path::{Path, PathBuf};

use fs2::FileExt;
use serde::Serialize;
use tracing::{debug, warn};
use zeroize::Zeroizing;

use crate::credentials::{CredentialProvider, ACCOUNT, SERVICE};
use crate::crypto::{decrypt, encrypt, validate_passphrase, EncryptedToken};
use crate::error::{KcError, Result};
use crate::event::{now_millis, Event, SecretId};
use crate::fs::ensure_parent_dir;
use crate::log::EventLog;
use crate::merge::ConflictMerger;
use crate::projector::{project, CurrentState};

/// Outcome of [`SecretStore::check`].
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct CheckReport {
    /// Parseable events after merging
    pub events: usize,
    /// Lines dropped as malformed
    pub skipped_lines: usize,
    /// Live secrets in the projected state
    pub live: usize,
    /// Live secrets the current master password cannot decrypt
    pub undecryptable: Vec<String>,
}

impl CheckReport {
    pub fn is_healthy(&self) -> bool {
        self.undecryptable.is_empty()
    }
}

/// Encrypted secret store backed by one event log file.
pub struct SecretStore<C: CredentialProvider> {
    log: EventLog,
    lock_path: PathBuf,
    credentials: C,
}

impl<C: CredentialProvider> SecretStore<C> {
    /// Open the store at `path`. Nothing is touched on disk until an
    /// operation runs.
    pub fn open(path: impl Into<PathBuf>, credentials: C) -> Self {
        let log = EventLog::new(path);
        let lock_path = lock_path_for(log.path());
        Self {
            log,
            lock_path,
            credentials,
        }
    }

    pub fn log(&self) -> &EventLog {
        &self.log
    }

    pub fn credentials(&self) -> &C {
        &self.credentials
    }

    /// Whether the credential provider holds a master password.
    pub fn is_initialized(&self) -> Result<bool> {
        Ok(self.credentials.get(SERVICE, ACCOUNT)?.is_some())
    }

    /// Store a new master password and make sure the log exists.
    ///
    /// Any previous master password is discarded. Secrets encrypted under it
    /// stay in the log but no longer decrypt.
    pub fn init(&self, password: &str) -> Result<()> {
        validate_passphrase(password)?;

        let _lock = StoreLock::acquire(&self.lock_path)?;
        if self.credentials.delete(SERVICE, ACCOUNT)? {
            debug!("discarded previous master password");
        }
        self.credentials.set(SERVICE, ACCOUNT, password.as_bytes())?;
        self.log.ensure_exists()?;
        debug!(path = %self.log.path().display(), "initialized store");
        Ok(())
    }

    /// Encrypt `content` and record it as the current value of `id`.
    pub fn save(&self, id: &SecretId, content: &[u8]) -> Result<()> {
        let password = self.master_password()?;
        let token = encrypt(content, &password)?.encode()?;

        let _lock = StoreLock::acquire(&self.lock_path)?;
        let ts = self.next_timestamp()?;
        self.log.append(&Event::set(ts, id, token))
    }

    /// Decrypt the current value of `id`.
    pub fn load(&self, id: &SecretId) -> Result<Zeroizing<Vec<u8>>> {
        let state = {
            let _lock = StoreLock::acquire(&self.lock_path)?;
            self.project_merged()?
        };

        let entry = state
            .get(id)
            .ok_or_else(|| KcError::NotFound(id.to_string()))?;
        let token = EncryptedToken::decode(&entry.value_token)?;
        let password = self.master_password()?;
        decrypt(&token, &password)
    }

    /// Record a tombstone for `id`. Fails with `NotFound` if it is not live.
    pub fn delete(&self, id: &SecretId) -> Result<()> {
        let _lock = StoreLock::acquire(&self.lock_path)?;
        let state = self.project_merged()?;
        if !state.contains(id) {
            return Err(KcError::NotFound(id.to_string()));
        }

        let ts = self.next_timestamp()?;
        self.log.append(&Event::delete(ts, id))
    }

    /// Live identifiers in ascending order, optionally prefix-filtered.
    pub fn list(&self, prefix: Option<&str>) -> Result<Vec<String>> {
        let _lock = StoreLock::acquire(&self.lock_path)?;
        Ok(self.project_merged()?.ids(prefix))
    }

    /// Every event recorded for `id`, in log order, tombstones included.
    pub fn history(&self, id: &SecretId) -> Result<Vec<Event>> {
        let _lock = StoreLock::acquire(&self.lock_path)?;
        self.merge()?;
        Ok(self
            .log
            .read_all()?
            .into_iter()
            .filter(|event| event.applies_to(id))
            .collect())
    }

    /// The full projected state after merging.
    pub fn state(&self) -> Result<CurrentState> {
        let _lock = StoreLock::acquire(&self.lock_path)?;
        self.project_merged()
    }

    /// Merge, replay, and try to decrypt every live secret.
    pub fn check(&self) -> Result<CheckReport> {
        let _lock = StoreLock::acquire(&self.lock_path)?;
        self.merge()?;
        let read = self.log.read_report()?;
        let state = project(&read.events);
        let password = self.master_password()?;

        let mut undecryptable = Vec::new();
        for (id, entry) in state.iter() {
            let decrypted = EncryptedToken::decode(&entry.value_token)
                .and_then(|token| decrypt(&token, &password));
            if let Err(err) = decrypted {
                warn!(id = %id, error = %err, "secret does not decrypt");
                undecryptable.push(id.clone());
            }
        }

        Ok(CheckReport {
            events: read.events.len(),
            skipped_lines: read.skipped,
            live: state.len(),
            undecryptable,
        })
    }

    fn merge(&self) -> Result<()> {
        ConflictMerger::new(&self.log).merge()?;
        Ok(())
    }

    fn project_merged(&self) -> Result<CurrentState> {
        self.merge()?;
        Ok(project(&self.log.read_all()?))
    }

    fn master_password(&self) -> Result<Zeroizing<Vec<u8>>> {
        self.credentials
            .get(SERVICE, ACCOUNT)?
            .ok_or(KcError::MasterKeyNotFound)
    }

    /// Now, unless this replica already holds a later timestamp.
    fn next_timestamp(&self) -> Result<chrono::DateTime<chrono::Utc>> {
        let now = now_millis();
        Ok(match self.log.last_timestamp()? {
            Some(last) if last > now => last,
            _ => now,
        })
    }
}

fn lock_path_for(log_path: &Path) -> PathBuf {
    let name = log_path
        .file_name()
        .map(|name| name.to_string_lossy().to_string())
        .unwrap_or_else(|| "kc".to_string());
    log_path.with_file_name(format!("{}.lock", name))
}

/// Exclusive advisory lock, released on drop.
struct StoreLock {
    file: File,
}

impl StoreLock {
    fn acquire(path: &Path) -> Result<Self> {
        ensure_parent_dir(path)?;
        let file = OpenOptions::new()
            .create(true)
            .read(true)
            .write(true)
            .open(path)?;
        FileExt::lock_exclusive(&file)?;
        Ok(Self { file })
    }
}

impl Drop for StoreLock {
    fn drop(&mut self) {
        let _ = FileExt::unlock(&self.file);
    }
}
