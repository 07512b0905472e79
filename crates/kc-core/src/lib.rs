//! # kc Core
//!
//! Core library for kc - a local, encrypted secret store that survives being
//! synced between devices by tools it does not control.
//!
//! Secrets are never kept as a key/value table. Every change is appended to
//! a log as a timestamped event, and the current state is whatever replaying
//! that log produces. When a sync tool leaves conflicted copies of the log
//! next to it, they are merged back in before the next read.
//!
//! ## Architecture
//!
//! - **crypto**: Argon2id key derivation and AES-256-GCM tokens
//! - **event**: Identifiers and the on-disk event record
//! - **log**: Append-only JSONL event log
//! - **merge**: Discovery and merging of conflicted copies
//! - **projector**: Replay of events into current state
//! - **credentials**: Where the master password lives
//! - **store**: The facade tying the above together

pub mod credentials;
pub mod crypto;
pub mod error;
pub mod event;
pub mod fs;
pub mod log;
pub mod merge;
pub mod projector;
pub mod store;

pub use credentials::{CredentialProvider, MemoryCredentials};
pub use error::{KcError, Result};
pub use event::{Event, Operation, SecretId};
pub use log::EventLog;
pub use merge::{ConflictMerger, MergeReport};
pub use projector::{project, CurrentState, StateEntry};
pub use store::{CheckReport, SecretStore};

/// Core version information
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
