//! Argument parsing helpers.

use kc_core::SecretId;

use crate::errors::CliError;

/// Parse a `namespace:key` argument, reporting failures as invalid input.
pub fn parse_secret_id(value: &str) -> Result<SecretId, CliError> {
    value.parse::<SecretId>().map_err(CliError::from)
}
