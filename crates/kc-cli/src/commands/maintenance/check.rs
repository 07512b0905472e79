use crate::app::AppContext;
use crate::cli::CheckArgs;
use crate::commands::secrets::require_store;
use crate::errors::CliError;
use crate::output::{check_json, check_lines};

pub fn handle_check(ctx: &AppContext, args: &CheckArgs) -> anyhow::Result<()> {
    let store = ctx.open_store()?;
    require_store(&store)?;

    let report = store.check()?;

    if args.json {
        println!("{}", serde_json::to_string_pretty(&check_json(&report))?);
    } else if !ctx.quiet() || !report.is_healthy() {
        for line in check_lines(&report) {
            println!("{}", line);
        }
    }

    if !report.is_healthy() {
        return Err(CliError::IntegrityFailed(format!(
            "Integrity check failed: {} secret(s) do not decrypt with the current master password\nHint: Re-run `kc init` with the password they were saved under, or delete them.",
            report.undecryptable.len()
        ))
        .into());
    }
    Ok(())
}
