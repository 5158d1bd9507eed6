use anyhow::{Context, Result};
use clap::{Arg, ArgMatches, Command};
use secrecy::SecretString;

use crate::auth::{state::DEFAULT_AVATAR_URL, token::DEFAULT_TOKEN_TTL_SECONDS};

pub const ARG_TOKEN_SECRET: &str = "token-secret";
pub const ARG_TOKEN_TTL_SECONDS: &str = "token-ttl-seconds";
pub const ARG_FRONTEND_BASE_URL: &str = "frontend-base-url";
pub const ARG_DEFAULT_AVATAR_URL: &str = "default-avatar-url";

#[must_use]
pub fn with_args(command: Command) -> Command {
    command
        .arg(
            Arg::new(ARG_TOKEN_SECRET)
                .long(ARG_TOKEN_SECRET)
                .help("Secret used to sign identity tokens (at least 32 bytes)")
                .env("BLOGAUTH_TOKEN_SECRET")
                .hide_env_values(true)
                .required(true),
        )
        .arg(
            Arg::new(ARG_TOKEN_TTL_SECONDS)
                .long(ARG_TOKEN_TTL_SECONDS)
                .help("Identity token validity window in seconds")
                .env("BLOGAUTH_TOKEN_TTL_SECONDS")
                .default_value("604800")
                .value_parser(clap::value_parser!(u64).range(1..)),
        )
        .arg(
            Arg::new(ARG_FRONTEND_BASE_URL)
                .long(ARG_FRONTEND_BASE_URL)
                .help("Frontend base URL, used as the allowed CORS origin")
                .env("BLOGAUTH_FRONTEND_BASE_URL")
                .default_value("http://localhost:8080"),
        )
        .arg(
            Arg::new(ARG_DEFAULT_AVATAR_URL)
                .long(ARG_DEFAULT_AVATAR_URL)
                .help("Avatar assigned to new accounts")
                .env("BLOGAUTH_DEFAULT_AVATAR_URL")
                .default_value(DEFAULT_AVATAR_URL),
        )
}

#[derive(Debug)]
pub struct Options {
    pub token_secret: SecretString,
    pub token_ttl_seconds: u64,
    pub frontend_base_url: String,
    pub default_avatar_url: String,
}

impl Options {
    /// # Errors
    ///
    /// Returns an error if a required argument is missing.
    pub fn parse(matches: &ArgMatches) -> Result<Self> {
        let token_secret = matches
            .get_one::<String>(ARG_TOKEN_SECRET)
            .cloned()
            .map(SecretString::from)
            .context("missing required argument: --token-secret")?;
        let token_ttl_seconds = matches
            .get_one::<u64>(ARG_TOKEN_TTL_SECONDS)
            .copied()
            .unwrap_or(DEFAULT_TOKEN_TTL_SECONDS);
        let frontend_base_url = matches
            .get_one::<String>(ARG_FRONTEND_BASE_URL)
            .cloned()
            .context("missing required argument: --frontend-base-url")?;
        let default_avatar_url = matches
            .get_one::<String>(ARG_DEFAULT_AVATAR_URL)
            .cloned()
            .unwrap_or_else(|| DEFAULT_AVATAR_URL.to_string());

        Ok(Self {
            token_secret,
            token_ttl_seconds,
            frontend_base_url,
            default_avatar_url,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use secrecy::ExposeSecret;

    fn command() -> Command {
        with_args(Command::new("blogauth"))
    }

    #[test]
    fn defaults_apply() -> Result<()> {
        temp_env::with_vars(
            [
                ("BLOGAUTH_TOKEN_TTL_SECONDS", None::<&str>),
                ("BLOGAUTH_FRONTEND_BASE_URL", None::<&str>),
                ("BLOGAUTH_DEFAULT_AVATAR_URL", None::<&str>),
            ],
            || {
                let matches = command().try_get_matches_from([
                    "blogauth",
                    "--token-secret",
                    "0123456789abcdef0123456789abcdef",
                ])?;
                let options = Options::parse(&matches)?;
                assert_eq!(
                    options.token_secret.expose_secret(),
                    "0123456789abcdef0123456789abcdef"
                );
                assert_eq!(options.token_ttl_seconds, 604_800);
                assert_eq!(options.frontend_base_url, "http://localhost:8080");
                assert_eq!(options.default_avatar_url, DEFAULT_AVATAR_URL);
                Ok(())
            },
        )
    }

    #[test]
    fn env_overrides() -> Result<()> {
        temp_env::with_vars(
            [
                ("BLOGAUTH_TOKEN_SECRET", Some("ffffffffffffffffffffffffffffffff")),
                ("BLOGAUTH_TOKEN_TTL_SECONDS", Some("3600")),
                ("BLOGAUTH_FRONTEND_BASE_URL", Some("https://blog.example.com")),
                (
                    "BLOGAUTH_DEFAULT_AVATAR_URL",
                    Some("https://cdn.example.com/a.png"),
                ),
            ],
            || {
                let matches = command().try_get_matches_from(["blogauth"])?;
                let options = Options::parse(&matches)?;
                assert_eq!(
                    options.token_secret.expose_secret(),
                    "ffffffffffffffffffffffffffffffff"
                );
                assert_eq!(options.token_ttl_seconds, 3600);
                assert_eq!(options.frontend_base_url, "https://blog.example.com");
                assert_eq!(options.default_avatar_url, "https://cdn.example.com/a.png");
                Ok(())
            },
        )
    }

    #[test]
    fn token_secret_is_required() {
        temp_env::with_vars([("BLOGAUTH_TOKEN_SECRET", None::<&str>)], || {
            let result = command().try_get_matches_from(["blogauth"]);
            assert_eq!(
                result.map_err(|e| e.kind()).err(),
                Some(clap::error::ErrorKind::MissingRequiredArgument)
            );
        });
    }

    #[test]
    fn zero_ttl_is_rejected() {
        let result = command().try_get_matches_from([
            "blogauth",
            "--token-secret",
            "0123456789abcdef0123456789abcdef",
            "--token-ttl-seconds",
            "0",
        ]);
        assert!(result.is_err());
    }

    #[test]
    fn options_debug_redacts_secret() -> Result<()> {
        let matches = command().try_get_matches_from([
            "blogauth",
            "--token-secret",
            "0123456789abcdef0123456789abcdef",
        ])?;
        let options = Options::parse(&matches)?;
        assert!(!format!("{options:?}").contains("0123456789abcdef"));
        Ok(())
    }
}
