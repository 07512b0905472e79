use std::fs;
use std::path::Path;

use kc_core::credentials::{CredentialProvider, ACCOUNT, SERVICE};
use kc_core::{KcError, MemoryCredentials, SecretId, SecretStore};

const PASSWORD: &str = "shared-master-password";

fn id(value: &str) -> SecretId {
    value.parse().expect("identifier should parse")
}

fn device(root: &Path) -> SecretStore<MemoryCredentials> {
    let store = SecretStore::open(root.join("secrets.log"), MemoryCredentials::new());
    store.init(PASSWORD).expect("init should succeed");
    store
}

/// Play the sync tool: the remote copy lands next to the local log.
fn sync_conflict(from: &Path, to_dir: &Path, name: &str) {
    fs::copy(from, to_dir.join(name)).expect("copy should succeed");
}

#[test]
fn test_offline_edits_from_two_devices_converge() {
    let laptop_dir = tempfile::tempdir().expect("tempdir should succeed");
    let desktop_dir = tempfile::tempdir().expect("tempdir should succeed");
    let laptop = device(laptop_dir.path());
    let desktop = device(desktop_dir.path());

    laptop.save(&id("env:api"), b"laptop-key").expect("save should succeed");
    desktop.save(&id("token:github"), b"gh-token").expect("save should succeed");

    sync_conflict(
        desktop.log().path(),
        laptop_dir.path(),
        "secrets (desktop's conflicted copy 2024-01-02).log",
    );

    assert_eq!(
        laptop.list(None).expect("list should succeed"),
        vec!["env:api", "token:github"]
    );
    assert_eq!(
        laptop
            .load(&id("token:github"))
            .expect("load should succeed")
            .as_slice(),
        b"gh-token"
    );

    let leftovers: Vec<_> = fs::read_dir(laptop_dir.path())
        .expect("read_dir should succeed")
        .filter_map(|entry| entry.ok())
        .map(|entry| entry.file_name().to_string_lossy().to_string())
        .filter(|name| name.contains("conflicted"))
        .collect();
    assert!(leftovers.is_empty(), "siblings left behind: {:?}", leftovers);
}

#[test]
fn test_remote_delete_wins_when_later() {
    let laptop_dir = tempfile::tempdir().expect("tempdir should succeed");
    let desktop_dir = tempfile::tempdir().expect("tempdir should succeed");
    let laptop = device(laptop_dir.path());

    laptop.save(&id("env:db"), b"v1").expect("save should succeed");
    fs::copy(laptop.log().path(), desktop_dir.path().join("secrets.log"))
        .expect("copy should succeed");
    let desktop = device(desktop_dir.path());

    desktop.delete(&id("env:db")).expect("delete should succeed");
    sync_conflict(desktop.log().path(), laptop_dir.path(), "secrets 2.log");

    assert!(matches!(laptop.load(&id("env:db")), Err(KcError::NotFound(_))));
    assert!(laptop.list(None).expect("list should succeed").is_empty());
}

#[test]
fn test_duplicate_events_after_interrupted_merge_are_harmless() {
    let dir = tempfile::tempdir().expect("tempdir should succeed");
    let store = device(dir.path());
    store.save(&id("env:a"), b"alpha").expect("save should succeed");
    store.delete(&id("env:a")).expect("delete should succeed");
    store.save(&id("env:b"), b"bravo").expect("save should succeed");

    // A sibling already folded into the primary but never deleted.
    sync_conflict(
        store.log().path(),
        dir.path(),
        "secrets.sync-conflict-20240102-101010-ABCDEFG.log",
    );

    assert_eq!(store.list(None).expect("list should succeed"), vec!["env:b"]);
    assert_eq!(store.log().read_all().expect("read should succeed").len(), 6);
}

#[test]
fn test_device_without_master_password() {
    let dir = tempfile::tempdir().expect("tempdir should succeed");
    let seeded = device(dir.path());
    seeded.save(&id("env:a"), b"alpha").expect("save should succeed");

    let credentials = MemoryCredentials::new();
    let fresh = SecretStore::open(dir.path().join("secrets.log"), &credentials);

    assert_eq!(fresh.list(None).expect("list should succeed"), vec!["env:a"]);
    assert!(matches!(
        fresh.load(&id("env:a")),
        Err(KcError::MasterKeyNotFound)
    ));

    credentials
        .set(SERVICE, ACCOUNT, PASSWORD.as_bytes())
        .expect("set should succeed");
    assert_eq!(
        fresh.load(&id("env:a")).expect("load should succeed").as_slice(),
        b"alpha"
    );
}
