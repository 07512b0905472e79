use crate::app::AppContext;
use crate::cli::ListArgs;
use crate::commands::secrets::require_store;
use crate::output::ids_json;

pub fn handle_list(ctx: &AppContext, args: &ListArgs) -> anyhow::Result<()> {
    let store = ctx.open_store()?;
    require_store(&store)?;

    let ids = store.list(args.prefix.as_deref())?;

    if args.json {
        println!("{}", serde_json::to_string_pretty(&ids_json(&ids))?);
        return Ok(());
    }
    for id in &ids {
        println!("{}", id);
    }
    if ids.is_empty() && !ctx.quiet() {
        eprintln!("No secrets found.");
    }
    Ok(())
}
