use crate::app::AppContext;
use crate::cli::SecretArgs;
use crate::commands::secrets::require_store;
use crate::helpers::parse_secret_id;

pub fn handle_delete(ctx: &AppContext, args: &SecretArgs) -> anyhow::Result<()> {
    let id = parse_secret_id(&args.id)?;
    let store = ctx.open_store()?;
    require_store(&store)?;

    store.delete(&id)?;

    if !ctx.quiet() {
        println!("Deleted {}", id);
    }
    Ok(())
}
