//! Auth state and configuration.

use std::sync::Arc;
use std::time::Duration;

use super::{
    authority::TokenAuthority,
    credential::CredentialRegistry,
    session::Sessions,
    token::{KeyError, TokenCodec, TokenKey, DEFAULT_TOKEN_TTL_SECONDS},
};
use crate::directory::UserDirectory;

const DEFAULT_FRONTEND_BASE_URL: &str = "http://localhost:8080";
pub const DEFAULT_AVATAR_URL: &str = "https://baomidou.com/img/logo.svg";

#[derive(Clone, Debug)]
pub struct AuthConfig {
    frontend_base_url: String,
    token_ttl_seconds: u64,
    default_avatar_url: String,
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self::new(DEFAULT_FRONTEND_BASE_URL.to_string())
    }
}

impl AuthConfig {
    #[must_use]
    pub fn new(frontend_base_url: String) -> Self {
        Self {
            // CORS origins never carry a trailing slash
            frontend_base_url: frontend_base_url.trim_end_matches('/').to_string(),
            token_ttl_seconds: DEFAULT_TOKEN_TTL_SECONDS,
            default_avatar_url: DEFAULT_AVATAR_URL.to_string(),
        }
    }

    #[must_use]
    pub fn with_token_ttl_seconds(mut self, seconds: u64) -> Self {
        self.token_ttl_seconds = seconds;
        self
    }

    #[must_use]
    pub fn with_default_avatar_url(mut self, url: String) -> Self {
        self.default_avatar_url = url;
        self
    }

    #[must_use]
    pub fn frontend_base_url(&self) -> &str {
        &self.frontend_base_url
    }

    #[must_use]
    pub fn token_ttl_seconds(&self) -> u64 {
        self.token_ttl_seconds
    }

    #[must_use]
    pub fn default_avatar_url(&self) -> &str {
        &self.default_avatar_url
    }
}

/// Read-only state shared by every request.
pub struct AuthState {
    config: AuthConfig,
    directory: Arc<dyn UserDirectory>,
    codec: TokenCodec,
    registry: CredentialRegistry,
    sessions: Sessions,
}

impl AuthState {
    /// Build the codec, authority and session service from one signing key.
    ///
    /// # Errors
    ///
    /// Returns [`KeyError`] if the key cannot seed the MAC.
    pub fn new(
        config: AuthConfig,
        key: &TokenKey,
        directory: Arc<dyn UserDirectory>,
    ) -> Result<Self, KeyError> {
        let codec = TokenCodec::new(key, Duration::from_secs(config.token_ttl_seconds()))?;
        let authority = TokenAuthority::new(codec.clone(), directory.clone());
        let registry = CredentialRegistry::new().with_handler(Arc::new(authority));
        let sessions = Sessions::new(
            directory.clone(),
            codec.clone(),
            config.default_avatar_url().to_string(),
        );

        Ok(Self {
            config,
            directory,
            codec,
            registry,
            sessions,
        })
    }

    #[must_use]
    pub fn config(&self) -> &AuthConfig {
        &self.config
    }

    #[must_use]
    pub fn directory(&self) -> &dyn UserDirectory {
        self.directory.as_ref()
    }

    #[must_use]
    pub fn codec(&self) -> &TokenCodec {
        &self.codec
    }

    #[must_use]
    pub fn registry(&self) -> &CredentialRegistry {
        &self.registry
    }

    #[must_use]
    pub fn sessions(&self) -> &Sessions {
        &self.sessions
    }
}

impl std::fmt::Debug for AuthState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AuthState")
            .field("config", &self.config)
            .field("codec", &self.codec)
            .field("registry", &self.registry)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::directory::InMemoryDirectory;
    use secrecy::SecretString;

    #[test]
    fn config_defaults() {
        let config = AuthConfig::default();
        assert_eq!(config.frontend_base_url(), "http://localhost:8080");
        assert_eq!(config.token_ttl_seconds(), 604_800);
        assert_eq!(config.default_avatar_url(), DEFAULT_AVATAR_URL);
    }

    #[test]
    fn config_builder_overrides() {
        let config = AuthConfig::new("https://blog.example.com/".to_string())
            .with_token_ttl_seconds(60)
            .with_default_avatar_url("https://cdn.example.com/a.png".to_string());
        assert_eq!(config.frontend_base_url(), "https://blog.example.com");
        assert_eq!(config.token_ttl_seconds(), 60);
        assert_eq!(config.default_avatar_url(), "https://cdn.example.com/a.png");
    }

    #[test]
    fn state_uses_configured_ttl() -> anyhow::Result<()> {
        let key = TokenKey::new(SecretString::from(
            "0123456789abcdef0123456789abcdef".to_string(),
        ))?;
        let state = AuthState::new(
            AuthConfig::default().with_token_ttl_seconds(120),
            &key,
            Arc::new(InMemoryDirectory::new()),
        )?;
        assert_eq!(state.codec().ttl_seconds(), 120);
        assert!(format!("{state:?}").contains("token"));
        Ok(())
    }
}
