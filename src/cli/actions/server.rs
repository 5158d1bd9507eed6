use crate::{
    api,
    auth::{token::TokenKey, AuthConfig},
    cli::telemetry,
};
use anyhow::{Context, Result};
use secrecy::SecretString;
use tracing::info;

#[derive(Debug)]
pub struct Args {
    pub port: u16,
    pub dsn: String,
    pub token_secret: SecretString,
    pub token_ttl_seconds: u64,
    pub frontend_base_url: String,
    pub default_avatar_url: String,
}

/// Execute the server action.
/// # Errors
/// Returns an error if the signing key is rejected, the database is unreachable, or the server fails to start.
pub async fn execute(args: Args) -> Result<()> {
    let token_key = TokenKey::new(args.token_secret).context("Invalid token signing key")?;

    let auth_config = AuthConfig::new(args.frontend_base_url)
        .with_token_ttl_seconds(args.token_ttl_seconds)
        .with_default_avatar_url(args.default_avatar_url);

    info!(
        port = args.port,
        token_ttl_seconds = auth_config.token_ttl_seconds(),
        frontend_base_url = auth_config.frontend_base_url(),
        "starting server"
    );

    let result = api::new(args.port, args.dsn, auth_config, token_key).await;

    telemetry::shutdown_tracer();

    result
}
