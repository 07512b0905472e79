pub mod delete;
pub mod history;
pub mod list;
pub mod load;
pub mod save;

pub use delete::handle_delete;
pub use history::handle_history;
pub use list::handle_list;
pub use load::handle_load;
pub use save::handle_save;

use kc_core::{CredentialProvider, SecretStore};

use crate::app::missing_store_message;
use crate::errors::CliError;

/// Fail with "not found" when the store's log does not exist yet.
pub(crate) fn require_store<C: CredentialProvider>(store: &SecretStore<C>) -> anyhow::Result<()> {
    if store.log().exists() {
        return Ok(());
    }
    Err(CliError::not_found(
        missing_store_message(store.log().path()),
        "Hint: Pass --store or set KC_STORE if the store lives elsewhere.",
    )
    .into())
}
