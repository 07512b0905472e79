use std::path::{Path, PathBuf};

use crate::app::{resolve_config_path, AppContext};
use crate::config::{write_config, CredentialBackend, KcConfig};
use crate::helpers::prompt_init_password;

pub fn handle_init(ctx: &AppContext) -> anyhow::Result<()> {
    let store = ctx.open_store()?;
    let config_path = resolve_config_path()?;

    if store.is_initialized()? && store.log().exists() && !store.state()?.is_empty() {
        eprintln!(
            "Warning: a master password is already set. Existing secrets only decrypt if you enter the same password again."
        );
    }

    let password = prompt_init_password()?;
    store.init(&password)?;

    let config_written = if config_path.exists() {
        false
    } else {
        let backend = ctx.backend()?;
        let keyfile = match backend {
            CredentialBackend::Keyfile => Some(absolute(&ctx.keyfile_path()?)?),
            CredentialBackend::Keychain => None,
        };
        let config = KcConfig::new(&absolute(store.log().path())?, backend, keyfile.as_deref());
        write_config(&config_path, &config)?;
        true
    };

    if !ctx.quiet() {
        println!("Initialized kc store at {}", store.log().path().display());
        if config_written {
            println!("Config written to {}", config_path.display());
        }
        println!();
        println!("Next: printf %s \"$TOKEN\" | kc save env:myproject");
    }

    Ok(())
}

fn absolute(path: &Path) -> anyhow::Result<PathBuf> {
    if path.is_absolute() {
        return Ok(path.to_path_buf());
    }
    Ok(std::env::current_dir()?.join(path))
}
