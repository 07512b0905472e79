//! Application context for the kc CLI.
//!
//! Provides a unified context that combines CLI arguments with the
//! lazily-loaded config file.

use std::path::PathBuf;

use once_cell::unsync::OnceCell;
use tracing::debug;

use kc_core::{CredentialProvider, SecretStore};

use crate::cli::Cli;
use crate::config::{read_config, CredentialBackend, KcConfig};
use crate::security::{KeychainCredentials, KeyfileCredentials};

use super::resolver::{
    resolve_backend, resolve_config_path, resolve_keyfile_path, resolve_store_path,
};

/// Credential provider chosen at runtime.
pub type DynCredentials = Box<dyn CredentialProvider>;

/// Application context that bundles CLI args with configuration.
///
/// This avoids repeatedly loading config and threading multiple parameters
/// through handler functions.
pub struct AppContext<'a> {
    cli: &'a Cli,
    config: OnceCell<Option<KcConfig>>,
}

impl<'a> AppContext<'a> {
    /// Create a new application context from CLI arguments.
    pub fn new(cli: &'a Cli) -> Self {
        Self {
            cli,
            config: OnceCell::new(),
        }
    }

    /// Check if quiet mode is enabled.
    pub fn quiet(&self) -> bool {
        self.cli.quiet
    }

    /// The config file, loaded lazily. `None` when no config file exists.
    pub fn config(&self) -> anyhow::Result<Option<&KcConfig>> {
        let config = self.config.get_or_try_init(|| {
            let path = resolve_config_path()?;
            if !path.exists() {
                debug!(path = %path.display(), "no config file");
                return Ok::<_, anyhow::Error>(None);
            }
            read_config(&path).map(Some)
        })?;
        Ok(config.as_ref())
    }

    /// Path of the store's event log.
    pub fn store_path(&self) -> anyhow::Result<PathBuf> {
        resolve_store_path(self.cli.store.as_deref(), self.config()?)
    }

    /// Selected credential backend.
    pub fn backend(&self) -> anyhow::Result<CredentialBackend> {
        Ok(resolve_backend(self.cli.credentials, self.config()?))
    }

    /// Keyfile path, meaningful for the keyfile backend.
    pub fn keyfile_path(&self) -> anyhow::Result<PathBuf> {
        resolve_keyfile_path(self.cli.keyfile.as_deref(), self.config()?)
    }

    /// Build the credential provider for the selected backend.
    pub fn credentials(&self) -> anyhow::Result<DynCredentials> {
        Ok(match self.backend()? {
            CredentialBackend::Keychain => Box::new(KeychainCredentials::new()),
            CredentialBackend::Keyfile => Box::new(KeyfileCredentials::new(self.keyfile_path()?)),
        })
    }

    /// Open the store with the configured path and credentials.
    pub fn open_store(&self) -> anyhow::Result<SecretStore<DynCredentials>> {
        let path = self.store_path()?;
        debug!(path = %path.display(), "opening store");
        Ok(SecretStore::open(path, self.credentials()?))
    }
}
