use std::io::Write;

use crate::app::AppContext;
use crate::cli::SecretArgs;
use crate::commands::secrets::require_store;
use crate::helpers::parse_secret_id;

pub fn handle_load(ctx: &AppContext, args: &SecretArgs) -> anyhow::Result<()> {
    let id = parse_secret_id(&args.id)?;
    let store = ctx.open_store()?;
    require_store(&store)?;

    let secret = store.load(&id)?;

    // Written verbatim: no trailing newline is added.
    let mut stdout = std::io::stdout().lock();
    stdout.write_all(&secret)?;
    stdout.flush()?;
    Ok(())
}
