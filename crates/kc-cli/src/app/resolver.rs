//! Path and backend resolution.
//!
//! Precedence is always: command-line flag (or its environment variable),
//! then the config file, then the XDG default.

use std::path::{Path, PathBuf};

use crate::config::{
    default_config_path, default_keyfile_path, default_store_path, CredentialBackend, KcConfig,
};
use crate::constants::env;

/// Resolve the config file path, checking KC_CONFIG env var first.
pub fn resolve_config_path() -> anyhow::Result<PathBuf> {
    if let Ok(value) = std::env::var(env::CONFIG) {
        if !value.trim().is_empty() {
            return Ok(PathBuf::from(value));
        }
    }
    default_config_path()
}

/// Resolve the store's log path.
pub fn resolve_store_path(flag: Option<&str>, config: Option<&KcConfig>) -> anyhow::Result<PathBuf> {
    if let Some(path) = non_empty(flag) {
        return Ok(PathBuf::from(path));
    }
    if let Some(path) = non_empty(config.and_then(|c| c.store.path.as_deref())) {
        return Ok(PathBuf::from(path));
    }
    default_store_path()
}

/// Resolve the credential backend. Defaults to the OS keychain.
pub fn resolve_backend(
    flag: Option<CredentialBackend>,
    config: Option<&KcConfig>,
) -> CredentialBackend {
    flag.or_else(|| config.and_then(|c| c.credentials.backend))
        .unwrap_or_default()
}

/// Resolve the keyfile path for the keyfile backend.
pub fn resolve_keyfile_path(
    flag: Option<&str>,
    config: Option<&KcConfig>,
) -> anyhow::Result<PathBuf> {
    if let Some(path) = non_empty(flag) {
        return Ok(PathBuf::from(path));
    }
    if let Some(path) = non_empty(config.and_then(|c| c.credentials.keyfile.as_deref())) {
        return Ok(PathBuf::from(path));
    }
    default_keyfile_path()
}

/// Error message when the store's log file is missing.
pub fn missing_store_message(path: &Path) -> String {
    format!(
        "No kc store found at {}\n\nRun:\n  kc init\n\nOr specify a store path:\n  KC_STORE=/path/to/secrets.log kc init",
        path.display()
    )
}

fn non_empty(value: Option<&str>) -> Option<&str> {
    value.filter(|v| !v.trim().is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config(store: Option<&str>, backend: Option<CredentialBackend>, keyfile: Option<&str>) -> KcConfig {
        let mut config = KcConfig::default();
        config.store.path = store.map(String::from);
        config.credentials.backend = backend;
        config.credentials.keyfile = keyfile.map(String::from);
        config
    }

    #[test]
    fn test_store_flag_beats_config() {
        let config = config(Some("/config/secrets.log"), None, None);

        let path = resolve_store_path(Some("/flag/secrets.log"), Some(&config)).unwrap();
        assert_eq!(path, PathBuf::from("/flag/secrets.log"));

        let path = resolve_store_path(None, Some(&config)).unwrap();
        assert_eq!(path, PathBuf::from("/config/secrets.log"));

        let path = resolve_store_path(Some("  "), Some(&config)).unwrap();
        assert_eq!(path, PathBuf::from("/config/secrets.log"));
    }

    #[test]
    fn test_backend_precedence() {
        let keyfile = config(None, Some(CredentialBackend::Keyfile), None);

        assert_eq!(resolve_backend(None, None), CredentialBackend::Keychain);
        assert_eq!(resolve_backend(None, Some(&keyfile)), CredentialBackend::Keyfile);
        assert_eq!(
            resolve_backend(Some(CredentialBackend::Keychain), Some(&keyfile)),
            CredentialBackend::Keychain
        );
    }

    #[test]
    fn test_keyfile_precedence() {
        let config = config(None, None, Some("/config/master.key"));

        assert_eq!(
            resolve_keyfile_path(Some("/flag/master.key"), Some(&config)).unwrap(),
            PathBuf::from("/flag/master.key")
        );
        assert_eq!(
            resolve_keyfile_path(None, Some(&config)).unwrap(),
            PathBuf::from("/config/master.key")
        );
    }

    #[test]
    fn test_missing_store_message_mentions_init() {
        let message = missing_store_message(Path::new("/nowhere/secrets.log"));
        assert!(message.contains("/nowhere/secrets.log"));
        assert!(message.contains("kc init"));
    }
}
