//! Input helper functions for the CLI.
//!
//! This module provides utilities for:
//! - Master password prompting (`input`)
//! - Reading secret content from stdin (`input`)
//! - Identifier parsing (`parsing`)

mod input;
mod parsing;

// Re-export public API
pub use input::{prompt_init_password, read_secret_stdin};
pub use parsing::parse_secret_id;
