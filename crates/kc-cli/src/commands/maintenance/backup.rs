use std::io::IsTerminal;
use std::path::Path;
use std::time::{SystemTime, UNIX_EPOCH};

use kc_core::fs::rename_with_fallback;

use crate::app::AppContext;
use crate::cli::BackupArgs;
use crate::commands::secrets::require_store;

pub fn handle_backup(ctx: &AppContext, args: &BackupArgs) -> anyhow::Result<()> {
    let store = ctx.open_store()?;
    require_store(&store)?;

    if std::io::stdin().is_terminal() && !ctx.quiet() {
        let proceed = dialoguer::Confirm::new()
            .with_prompt(format!("Back up store to {}?", args.destination))
            .default(true)
            .interact()?;
        if !proceed {
            return Err(anyhow::anyhow!("Backup cancelled"));
        }
    }

    // Conflicted copies are folded in first; the backup is a single log.
    store.state()?;

    let bytes = backup_atomic_copy(store.log().path(), Path::new(&args.destination))?;
    if !ctx.quiet() {
        println!("Backed up store to {} ({} bytes)", args.destination, bytes);
    }
    Ok(())
}

fn backup_atomic_copy(source: &Path, destination: &Path) -> anyhow::Result<u64> {
    let parent = match destination.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };
    std::fs::create_dir_all(parent).map_err(|e| {
        anyhow::anyhow!(
            "Failed to create backup directory {}: {}",
            parent.display(),
            e
        )
    })?;

    let nanos = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map_err(|e| anyhow::anyhow!("System time error: {}", e))?
        .as_nanos();
    let temp_path = parent.join(format!(".kc-backup-{}.tmp", nanos));

    let bytes = std::fs::copy(source, &temp_path).map_err(|e| {
        anyhow::anyhow!(
            "Failed to copy store from {} to {}: {}",
            source.display(),
            destination.display(),
            e
        )
    })?;

    rename_with_fallback(&temp_path, destination)?;
    Ok(bytes)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_backup_atomic_copy() {
        let dir = tempfile::tempdir().unwrap();
        let source = dir.path().join("secrets.log");
        std::fs::write(&source, b"{\"line\":1}\n").unwrap();
        let destination = dir.path().join("backups").join("secrets.bak");

        let bytes = backup_atomic_copy(&source, &destination).unwrap();

        assert_eq!(bytes, 11);
        assert_eq!(std::fs::read(&destination).unwrap(), b"{\"line\":1}\n");
        let leftovers: Vec<_> = std::fs::read_dir(dir.path().join("backups"))
            .unwrap()
            .filter_map(|entry| entry.ok())
            .filter(|entry| entry.file_name().to_string_lossy().ends_with(".tmp"))
            .collect();
        assert!(leftovers.is_empty());
    }

    #[test]
    fn test_backup_overwrites_existing() {
        let dir = tempfile::tempdir().unwrap();
        let source = dir.path().join("secrets.log");
        let destination = dir.path().join("secrets.bak");
        std::fs::write(&source, b"new\n").unwrap();
        std::fs::write(&destination, b"old\n").unwrap();

        backup_atomic_copy(&source, &destination).unwrap();

        assert_eq!(std::fs::read(&destination).unwrap(), b"new\n");
    }
}
