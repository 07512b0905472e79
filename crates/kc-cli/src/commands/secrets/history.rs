use std::io::IsTerminal;

use crate::app::AppContext;
use crate::cli::HistoryArgs;
use crate::commands::secrets::require_store;
use crate::errors::CliError;
use crate::helpers::parse_secret_id;
use crate::output::{history_json, history_table};

pub fn handle_history(ctx: &AppContext, args: &HistoryArgs) -> anyhow::Result<()> {
    let id = parse_secret_id(&args.id)?;
    let store = ctx.open_store()?;
    require_store(&store)?;

    let events = store.history(&id)?;
    if events.is_empty() {
        return Err(CliError::not_found(
            format!("No history for {}", id),
            "Hint: Run `kc list` to see stored secrets.",
        )
        .into());
    }

    if args.json {
        println!("{}", serde_json::to_string_pretty(&history_json(&events))?);
    } else {
        println!("{}", history_table(&events, std::io::stdout().is_terminal()));
    }
    Ok(())
}
