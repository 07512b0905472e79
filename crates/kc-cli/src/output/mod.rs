//! Output formatting helpers for the CLI.
//!
//! This module provides formatting utilities for displaying secret
//! identifiers, histories and check reports as JSON or text.

mod json;
mod text;

// Re-export public API
pub use json::{check_json, history_json, ids_json};
pub use text::{check_lines, history_table};
