use std::io::Write;
use std::path::PathBuf;
use std::process::{Command, Output, Stdio};

use tempfile::TempDir;

const PASSWORD: &str = "test-master-password-123";

fn bin() -> PathBuf {
    PathBuf::from(env!("CARGO_BIN_EXE_kc"))
}

/// Isolated HOME/XDG directories and a keyfile credential backend.
struct Sandbox {
    root: TempDir,
}

impl Sandbox {
    fn new() -> Self {
        let root = tempfile::tempdir().expect("tempdir should succeed");
        for dir in ["home", "config", "data"] {
            std::fs::create_dir_all(root.path().join(dir)).expect("create dir");
        }
        Self { root }
    }

    fn config_home(&self) -> PathBuf {
        self.root.path().join("config")
    }

    fn data_home(&self) -> PathBuf {
        self.root.path().join("data")
    }

    fn keyfile(&self) -> PathBuf {
        self.config_home().join("kc").join("master.key")
    }

    fn store_path(&self) -> PathBuf {
        self.data_home().join("kc").join("secrets.log")
    }

    fn config_path(&self) -> PathBuf {
        self.config_home().join("kc").join("config.toml")
    }

    fn command(&self, args: &[&str]) -> Command {
        let mut cmd = Command::new(bin());
        cmd.args(args)
            .env("HOME", self.root.path().join("home"))
            .env("XDG_CONFIG_HOME", self.config_home())
            .env("XDG_DATA_HOME", self.data_home())
            .env("KC_CREDENTIALS", "keyfile")
            .env("KC_KEYFILE", self.keyfile())
            .env_remove("KC_STORE")
            .env_remove("KC_CONFIG")
            .env_remove("KC_PASSWORD")
            .env_remove("KC_LOG");
        cmd
    }

    fn run(&self, args: &[&str]) -> Output {
        self.command(args)
            .stdin(Stdio::null())
            .output()
            .expect("kc should run")
    }

    fn run_with_stdin(&self, args: &[&str], input: &[u8]) -> Output {
        let mut child = self
            .command(args)
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .spawn()
            .expect("kc should spawn");
        let mut stdin = child.stdin.take().expect("stdin should be piped");
        // kc may reject its arguments and exit before reading stdin.
        let _ = stdin.write_all(input);
        drop(stdin);
        child.wait_with_output().expect("kc should finish")
    }

    fn init(&self) {
        let output = self
            .command(&["init"])
            .env("KC_PASSWORD", PASSWORD)
            .stdin(Stdio::null())
            .output()
            .expect("kc should run");
        assert_success(&output);
    }

    fn save(&self, id: &str, value: &[u8]) {
        assert_success(&self.run_with_stdin(&["save", id], value));
    }
}

fn assert_success(output: &Output) {
    assert!(
        output.status.success(),
        "expected success, got {:?}\nstdout: {}\nstderr: {}",
        output.status.code(),
        String::from_utf8_lossy(&output.stdout),
        String::from_utf8_lossy(&output.stderr)
    );
}

fn assert_exit(output: &Output, code: i32) {
    assert_eq!(
        output.status.code(),
        Some(code),
        "stdout: {}\nstderr: {}",
        String::from_utf8_lossy(&output.stdout),
        String::from_utf8_lossy(&output.stderr)
    );
}

fn stdout_lines(output: &Output) -> Vec<String> {
    String::from_utf8_lossy(&output.stdout)
        .lines()
        .map(String::from)
        .collect()
}

#[test]
fn test_init_creates_store_config_and_keyfile() {
    let sandbox = Sandbox::new();
    sandbox.init();

    assert!(sandbox.store_path().is_file());
    assert!(sandbox.keyfile().is_file());

    let config = std::fs::read_to_string(sandbox.config_path()).expect("config written");
    assert!(config.contains("backend = \"keyfile\""));
    assert!(config.contains(&sandbox.store_path().to_string_lossy().to_string()));

    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        let mode = std::fs::metadata(sandbox.keyfile())
            .expect("keyfile metadata")
            .permissions()
            .mode();
        assert_eq!(mode & 0o777, 0o600);
    }
}

#[test]
fn test_init_without_password_or_tty_fails() {
    let sandbox = Sandbox::new();
    let output = sandbox.run(&["init"]);

    assert_exit(&output, 4);
    assert!(!sandbox.keyfile().exists());
}

#[test]
fn test_init_rejects_short_password() {
    let sandbox = Sandbox::new();
    let output = sandbox
        .command(&["init"])
        .env("KC_PASSWORD", "short")
        .stdin(Stdio::null())
        .output()
        .expect("kc should run");

    assert_exit(&output, 4);
}

#[test]
fn test_save_load_round_trip_is_verbatim() {
    let sandbox = Sandbox::new();
    sandbox.init();

    sandbox.save("env:myproject", b"API_KEY=abc123\nDEBUG=1\n");
    let output = sandbox.run(&["load", "env:myproject"]);

    assert_success(&output);
    assert_eq!(output.stdout, b"API_KEY=abc123\nDEBUG=1\n");
}

#[test]
fn test_log_never_contains_plaintext() {
    let sandbox = Sandbox::new();
    sandbox.init();
    sandbox.save("token:github", b"ghp_supersecretvalue");

    let log = std::fs::read_to_string(sandbox.store_path()).expect("read log");
    assert!(!log.contains("ghp_supersecretvalue"));
    assert!(log.contains("\"ns\":\"token\""));
    assert!(log.contains("\"key\":\"github\""));
}

#[test]
fn test_end_to_end_list_delete_load() {
    let sandbox = Sandbox::new();
    sandbox.init();
    sandbox.save("env:a", b"alpha");
    sandbox.save("env:b", b"bravo");
    assert_success(&sandbox.run(&["delete", "env:a"]));

    let list = sandbox.run(&["list"]);
    assert_success(&list);
    assert_eq!(stdout_lines(&list), vec!["env:b"]);

    assert_exit(&sandbox.run(&["load", "env:a"]), 3);

    let load = sandbox.run(&["load", "env:b"]);
    assert_success(&load);
    assert_eq!(load.stdout, b"bravo");
}

#[test]
fn test_list_prefix_and_json() {
    let sandbox = Sandbox::new();
    sandbox.init();
    for id in ["token:github", "env:zeta", "env:alpha"] {
        sandbox.save(id, b"x");
    }

    let all = sandbox.run(&["list"]);
    assert_eq!(
        stdout_lines(&all),
        vec!["env:alpha", "env:zeta", "token:github"]
    );

    let filtered = sandbox.run(&["list", "env:", "--json"]);
    assert_success(&filtered);
    let ids: Vec<String> = serde_json::from_slice(&filtered.stdout).expect("valid json");
    assert_eq!(ids, vec!["env:alpha", "env:zeta"]);
}

#[test]
fn test_invalid_identifier_is_invalid_input() {
    let sandbox = Sandbox::new();
    sandbox.init();

    assert_exit(&sandbox.run_with_stdin(&["save", "noseparator"], b"x"), 4);
    assert_exit(&sandbox.run_with_stdin(&["save", "Env:x"], b"x"), 4);
    assert_exit(&sandbox.run(&["load", "env:"]), 4);
}

#[test]
fn test_save_empty_stdin_is_invalid_input() {
    let sandbox = Sandbox::new();
    sandbox.init();

    assert_exit(&sandbox.run_with_stdin(&["save", "env:a"], b""), 4);
    assert_eq!(
        std::fs::read(sandbox.store_path()).expect("read log"),
        Vec::<u8>::new()
    );
}

#[test]
fn test_save_before_init_is_not_found() {
    let sandbox = Sandbox::new();
    let output = sandbox.run_with_stdin(&["save", "env:a"], b"value");

    assert_exit(&output, 3);
    assert!(String::from_utf8_lossy(&output.stderr).contains("kc init"));
}

#[test]
fn test_commands_on_missing_store_are_not_found() {
    let sandbox = Sandbox::new();

    assert_exit(&sandbox.run(&["list"]), 3);
    assert_exit(&sandbox.run(&["load", "env:a"]), 3);
    assert_exit(&sandbox.run(&["delete", "env:a"]), 3);
}

#[test]
fn test_delete_missing_secret_is_not_found() {
    let sandbox = Sandbox::new();
    sandbox.init();

    assert_exit(&sandbox.run(&["delete", "env:ghost"]), 3);
}

#[test]
fn test_history_shows_tombstones() {
    let sandbox = Sandbox::new();
    sandbox.init();
    sandbox.save("env:a", b"one");
    assert_success(&sandbox.run(&["delete", "env:a"]));
    sandbox.save("env:a", b"two");

    let output = sandbox.run(&["history", "env:a", "--json"]);
    assert_success(&output);
    let events: Vec<serde_json::Value> = serde_json::from_slice(&output.stdout).expect("json");
    let ops: Vec<&str> = events
        .iter()
        .map(|event| event["op"].as_str().expect("op"))
        .collect();
    assert_eq!(ops, vec!["set", "delete", "set"]);

    assert_exit(&sandbox.run(&["history", "env:never"]), 3);
}

#[test]
fn test_check_passes_then_fails_after_password_change() {
    let sandbox = Sandbox::new();
    sandbox.init();
    sandbox.save("env:a", b"alpha");

    let ok = sandbox.run(&["check"]);
    assert_success(&ok);
    assert!(String::from_utf8_lossy(&ok.stdout).contains("Integrity check: OK"));

    let reinit = sandbox
        .command(&["init"])
        .env("KC_PASSWORD", "another-master-password")
        .stdin(Stdio::null())
        .output()
        .expect("kc should run");
    assert_success(&reinit);
    assert!(String::from_utf8_lossy(&reinit.stderr).contains("Warning"));

    let failed = sandbox.run(&["check"]);
    assert_exit(&failed, 6);
    assert!(String::from_utf8_lossy(&failed.stdout).contains("env:a"));

    assert_exit(&sandbox.run(&["load", "env:a"]), 5);
}

#[test]
fn test_conflicted_copy_is_merged_on_read() {
    let sandbox = Sandbox::new();
    sandbox.init();
    sandbox.save("env:local", b"here");

    // A second replica written with the same master password.
    let replica_dir = tempfile::tempdir().expect("tempdir");
    let replica = replica_dir.path().join("secrets.log");
    let replica_arg = replica.to_string_lossy().to_string();
    assert_success(&sandbox.run_with_stdin(
        &["save", "env:remote", "--store", &replica_arg],
        b"there",
    ));

    let sibling = sandbox
        .store_path()
        .with_file_name("secrets (laptop's conflicted copy 2024-01-02).log");
    std::fs::copy(&replica, &sibling).expect("copy replica");

    let list = sandbox.run(&["list"]);
    assert_success(&list);
    assert_eq!(stdout_lines(&list), vec!["env:local", "env:remote"]);
    assert!(!sibling.exists());

    let load = sandbox.run(&["load", "env:remote"]);
    assert_eq!(load.stdout, b"there");
}

#[test]
fn test_store_flag_overrides_config() {
    let sandbox = Sandbox::new();
    sandbox.init();

    let other = sandbox.root.path().join("elsewhere").join("vault.log");
    let other_arg = other.to_string_lossy().to_string();
    assert_success(&sandbox.run_with_stdin(&["save", "env:x", "--store", &other_arg], b"v"));

    assert!(other.is_file());
    let default_list = sandbox.run(&["list"]);
    assert!(stdout_lines(&default_list).is_empty());

    let other_list = sandbox.run(&["list", "--store", &other_arg]);
    assert_eq!(stdout_lines(&other_list), vec!["env:x"]);
}

#[test]
fn test_backup_copies_log() {
    let sandbox = Sandbox::new();
    sandbox.init();
    sandbox.save("env:a", b"alpha");

    let destination = sandbox.root.path().join("backups").join("secrets.bak");
    let destination_arg = destination.to_string_lossy().to_string();
    let output = sandbox.run(&["backup", &destination_arg]);

    assert_success(&output);
    assert_eq!(
        std::fs::read(&destination).expect("backup exists"),
        std::fs::read(sandbox.store_path()).expect("log exists")
    );
}

#[test]
fn test_completions() {
    let sandbox = Sandbox::new();
    let output = sandbox.run(&["completions", "bash"]);

    assert_success(&output);
    assert!(String::from_utf8_lossy(&output.stdout).contains("kc"));
}

#[test]
fn test_quiet_suppresses_confirmation() {
    let sandbox = Sandbox::new();
    sandbox.init();

    let output = sandbox.run_with_stdin(&["save", "env:a", "-q"], b"alpha");
    assert_success(&output);
    assert!(output.stdout.is_empty());
}
