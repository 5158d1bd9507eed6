use crate::cli::actions::{server, Action};
use anyhow::Result;

/// Run an [`Action`] to completion.
///
/// # Errors
///
/// Returns whatever the selected action returns.
pub async fn execute(action: Action) -> Result<()> {
    match action {
        Action::Server(args) => server::execute(args).await,
    }
}
