//! kc CLI - An encrypted secret store that survives file sync
//!
//! This is the command-line interface for kc. It is a thin layer over
//! `kc-core`: argument parsing, stdin/stdout plumbing and exit codes.

mod app;
mod cli;
mod commands;
mod config;
mod constants;
mod errors;
mod helpers;
mod output;
mod security;

use clap::Parser;
use kc_core::VERSION;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{fmt, EnvFilter};

use crate::app::AppContext;
use crate::cli::{Cli, Commands};
use crate::commands::{init, maintenance, misc, secrets};
use crate::constants::{env, DEFAULT_LOG_FILTER};
use crate::errors::CliError;

fn main() {
    let cli = Cli::parse();
    init_tracing();
    let ctx = AppContext::new(&cli);

    if let Err(e) = run(&ctx, &cli) {
        CliError::from_anyhow(e).exit();
    }
}

/// Diagnostics go to stderr so `kc load` output stays clean.
fn init_tracing() {
    let filter = EnvFilter::try_from_env(env::LOG)
        .unwrap_or_else(|_| EnvFilter::new(DEFAULT_LOG_FILTER));
    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().with_writer(std::io::stderr).with_target(false))
        .init();
}

fn run(ctx: &AppContext, cli: &Cli) -> anyhow::Result<()> {
    match &cli.command {
        Some(Commands::Init) => {
            init::handle_init(ctx)?;
        }
        Some(Commands::Save(args)) => {
            secrets::handle_save(ctx, args)?;
        }
        Some(Commands::Load(args)) => {
            secrets::handle_load(ctx, args)?;
        }
        Some(Commands::Delete(args)) => {
            secrets::handle_delete(ctx, args)?;
        }
        Some(Commands::List(args)) => {
            secrets::handle_list(ctx, args)?;
        }
        Some(Commands::History(args)) => {
            secrets::handle_history(ctx, args)?;
        }
        Some(Commands::Check(args)) => {
            maintenance::handle_check(ctx, args)?;
        }
        Some(Commands::Backup(args)) => {
            maintenance::handle_backup(ctx, args)?;
        }
        Some(Commands::Completions(args)) => {
            misc::handle_completions(args)?;
        }
        None => {
            println!("kc v{}", VERSION);
            println!("\nQuickstart:");
            println!("  kc init");
            println!("  printf %s \"$TOKEN\" | kc save env:myproject");
            println!("  kc load env:myproject");
            println!("  kc list env:");
            println!("\nRun `kc --help` for full usage.");
        }
    }

    Ok(())
}
