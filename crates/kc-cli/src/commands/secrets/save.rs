use crate::app::AppContext;
use crate::cli::SecretArgs;
use crate::helpers::{parse_secret_id, read_secret_stdin};

pub fn handle_save(ctx: &AppContext, args: &SecretArgs) -> anyhow::Result<()> {
    let id = parse_secret_id(&args.id)?;
    let content = read_secret_stdin()?;

    let store = ctx.open_store()?;
    store.save(&id, &content)?;

    if !ctx.quiet() {
        println!("Saved {}", id);
    }
    Ok(())
}
