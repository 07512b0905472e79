use clap::{Args, Parser, Subcommand};
use clap_complete::Shell;

use kc_core::VERSION;

use crate::config::CredentialBackend;
use crate::constants::env;

/// kc - An encrypted secret store that survives file sync
#[derive(Parser)]
#[command(name = "kc")]
#[command(author, version = VERSION, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Path to the store's event log
    #[arg(short, long, global = true, env = env::STORE)]
    pub store: Option<String>,

    /// Where the master password is kept
    #[arg(long, global = true, value_enum, env = env::CREDENTIALS)]
    pub credentials: Option<CredentialBackend>,

    /// Keyfile path for the keyfile credential backend
    #[arg(long, global = true, env = env::KEYFILE)]
    pub keyfile: Option<String>,

    #[command(subcommand)]
    pub command: Option<Commands>,

    /// Quiet mode (minimal output)
    #[arg(short, long, global = true)]
    pub quiet: bool,
}

/// Arguments for commands addressing one secret
#[derive(Args)]
pub struct SecretArgs {
    /// Secret identifier, `<namespace>:<name>` (e.g. env:myproject)
    #[arg(value_name = "NAMESPACE:KEY")]
    pub id: String,
}

/// Arguments for the `list` command
#[derive(Args)]
pub struct ListArgs {
    /// Only show identifiers starting with this prefix (e.g. `env:`)
    #[arg(value_name = "PREFIX")]
    pub prefix: Option<String>,

    /// Output as JSON
    #[arg(long)]
    pub json: bool,
}

/// Arguments for the `history` command
#[derive(Args)]
pub struct HistoryArgs {
    /// Secret identifier, `<namespace>:<name>`
    #[arg(value_name = "NAMESPACE:KEY")]
    pub id: String,

    /// Output as JSON
    #[arg(long)]
    pub json: bool,
}

/// Arguments for the `check` command
#[derive(Args)]
pub struct CheckArgs {
    /// Output as JSON
    #[arg(long)]
    pub json: bool,
}

/// Arguments for the `backup` command
#[derive(Args)]
pub struct BackupArgs {
    /// Destination path
    #[arg(value_name = "DEST")]
    pub destination: String,
}

/// Arguments for the `completions` command
#[derive(Args)]
pub struct CompletionsArgs {
    /// Shell to generate completions for
    #[arg(value_name = "SHELL")]
    pub shell: Shell,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Set the master password and create the store
    Init,

    /// Save a secret read from stdin
    Save(SecretArgs),

    /// Print a secret to stdout
    Load(SecretArgs),

    /// Delete a secret
    Delete(SecretArgs),

    /// List secret identifiers
    List(ListArgs),

    /// Show when a secret was set and deleted
    History(HistoryArgs),

    /// Verify every live secret decrypts
    Check(CheckArgs),

    /// Backup the store's event log
    Backup(BackupArgs),

    /// Generate shell completions
    Completions(CompletionsArgs),
}
