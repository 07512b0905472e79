//! Application-level utilities for the kc CLI.
//!
//! This module provides:
//! - Application context for unified CLI + config handling
//! - Resolution of the store path and credential backend

mod context;
mod resolver;

// Re-export public API
pub use context::AppContext;
pub use resolver::{missing_store_message, resolve_config_path};
