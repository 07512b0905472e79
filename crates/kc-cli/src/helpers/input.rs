//! Password prompting and stdin reading.

use std::io::{self, IsTerminal, Read};

use dialoguer::Password;
use zeroize::Zeroizing;

use crate::constants::env;
use crate::errors::CliError;

/// Master password for `init`: KC_PASSWORD if set, else a confirmed prompt.
pub fn prompt_init_password() -> anyhow::Result<Zeroizing<String>> {
    if let Ok(value) = std::env::var(env::PASSWORD) {
        if !value.trim().is_empty() {
            return Ok(Zeroizing::new(value));
        }
    }
    if !io::stdin().is_terminal() {
        return Err(CliError::invalid_input(
            "No master password provided and no TTY available. Set KC_PASSWORD.",
        )
        .into());
    }
    Password::new()
        .with_prompt("Master password")
        .with_confirmation("Confirm master password", "Passwords do not match")
        .interact()
        .map(Zeroizing::new)
        .map_err(|e| anyhow::anyhow!("Failed to read master password: {}", e))
}

/// Read the whole secret from stdin. Refuses a terminal and empty input.
pub fn read_secret_stdin() -> anyhow::Result<Zeroizing<Vec<u8>>> {
    let stdin = io::stdin();
    let is_terminal = stdin.is_terminal();
    read_secret(stdin.lock(), is_terminal)
}

fn read_secret(mut reader: impl Read, is_terminal: bool) -> anyhow::Result<Zeroizing<Vec<u8>>> {
    if is_terminal {
        return Err(CliError::invalid_input(
            "No input on stdin. Pipe the secret in, e.g.:\n  printf %s \"$TOKEN\" | kc save env:myproject",
        )
        .into());
    }

    let mut content = Zeroizing::new(Vec::new());
    reader
        .read_to_end(&mut content)
        .map_err(|e| anyhow::anyhow!("Failed to read stdin: {}", e))?;
    if content.is_empty() {
        return Err(CliError::invalid_input("Refusing to save an empty secret").into());
    }
    Ok(content)
}
