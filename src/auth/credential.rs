//! Credential kinds and handler dispatch.
//!
//! The `Authorization` header is classified once into a [`Credential`]; the
//! [`CredentialRegistry`] then hands it to the first handler that declares
//! support for that kind. Unknown kinds are rejected instead of being fed to a
//! handler that would misread them.

use async_trait::async_trait;
use axum::http::{header::AUTHORIZATION, HeaderMap};
use std::sync::Arc;
use tracing::debug;

use super::{AuthError, Principal};

/// Credential shapes the service can tell apart.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum CredentialKind {
    /// Signed identity token, raw or with a `Bearer` scheme.
    Token,
    /// Any other scheme (e.g. `Basic`).
    Unrecognized,
}

#[derive(Clone, Eq, PartialEq)]
pub enum Credential {
    Token(String),
    Unrecognized { scheme: String },
}

impl std::fmt::Debug for Credential {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Token(_) => f.write_str("Token(***)"),
            Self::Unrecognized { scheme } => f
                .debug_struct("Unrecognized")
                .field("scheme", scheme)
                .finish(),
        }
    }
}

impl Credential {
    /// Read and classify the `Authorization` header; `None` if absent or blank.
    ///
    /// Bytes outside visible ASCII are kept (lossily) so the value is still
    /// classified and rejected as a bad credential rather than a missing one.
    #[must_use]
    pub fn from_headers(headers: &HeaderMap) -> Option<Self> {
        let value = headers.get(AUTHORIZATION)?;
        match value.to_str() {
            Ok(value) => Self::classify(value),
            Err(_) => Self::classify(&String::from_utf8_lossy(value.as_bytes())),
        }
    }

    /// Classify a raw header value.
    #[must_use]
    pub fn classify(value: &str) -> Option<Self> {
        let trimmed = value.trim();
        if trimmed.is_empty() || trimmed.eq_ignore_ascii_case("bearer") {
            return None;
        }

        match trimmed.split_once(char::is_whitespace) {
            None => Some(Self::Token(trimmed.to_string())),
            Some((scheme, rest)) if scheme.eq_ignore_ascii_case("bearer") => {
                let token = rest.trim();
                if token.is_empty() {
                    None
                } else {
                    Some(Self::Token(token.to_string()))
                }
            }
            Some((scheme, _)) => Some(Self::Unrecognized {
                scheme: scheme.to_string(),
            }),
        }
    }

    #[must_use]
    pub const fn kind(&self) -> CredentialKind {
        match self {
            Self::Token(_) => CredentialKind::Token,
            Self::Unrecognized { .. } => CredentialKind::Unrecognized,
        }
    }
}

/// Something that can turn one kind of credential into a principal.
#[async_trait]
pub trait CredentialHandler: Send + Sync {
    fn name(&self) -> &'static str;

    fn supports(&self, kind: CredentialKind) -> bool;

    async fn authenticate(&self, credential: &Credential) -> Result<Principal, AuthError>;
}

#[derive(Clone, Default)]
pub struct CredentialRegistry {
    handlers: Vec<Arc<dyn CredentialHandler>>,
}

impl CredentialRegistry {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with_handler(mut self, handler: Arc<dyn CredentialHandler>) -> Self {
        self.handlers.push(handler);
        self
    }

    /// Dispatch a credential to the first supporting handler.
    ///
    /// # Errors
    ///
    /// [`AuthError::MissingCredential`] when nothing was presented,
    /// [`AuthError::UnsupportedCredential`] when no handler accepts the kind,
    /// otherwise whatever the selected handler returns.
    pub async fn authenticate(
        &self,
        credential: Option<&Credential>,
    ) -> Result<Principal, AuthError> {
        let credential = credential.ok_or(AuthError::MissingCredential)?;
        let kind = credential.kind();
        let handler = self
            .handlers
            .iter()
            .find(|handler| handler.supports(kind))
            .ok_or(AuthError::UnsupportedCredential)?;

        debug!(handler = handler.name(), ?kind, "dispatching credential");
        handler.authenticate(credential).await
    }
}

impl std::fmt::Debug for CredentialRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let names: Vec<&str> = self.handlers.iter().map(|h| h.name()).collect();
        f.debug_struct("CredentialRegistry")
            .field("handlers", &names)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::directory::AccountStatus;
    use axum::http::HeaderValue;

    #[test]
    fn classify_raw_and_bearer_tokens() {
        assert_eq!(
            Credential::classify("aaa.bbb.ccc"),
            Some(Credential::Token("aaa.bbb.ccc".to_string()))
        );
        assert_eq!(
            Credential::classify("Bearer aaa.bbb.ccc"),
            Some(Credential::Token("aaa.bbb.ccc".to_string()))
        );
        assert_eq!(
            Credential::classify("  bearer   aaa.bbb.ccc "),
            Some(Credential::Token("aaa.bbb.ccc".to_string()))
        );
    }

    #[test]
    fn classify_other_schemes_as_unrecognized() {
        assert_eq!(
            Credential::classify("Basic dXNlcjpwYXNz"),
            Some(Credential::Unrecognized {
                scheme: "Basic".to_string()
            })
        );
    }

    #[test]
    fn classify_blank_values_as_missing() {
        assert_eq!(Credential::classify(""), None);
        assert_eq!(Credential::classify("   "), None);
        assert_eq!(Credential::classify("Bearer "), None);
        assert_eq!(Credential::classify("bearer"), None);
        assert_eq!(Credential::classify(" BEARER \t"), None);
    }

    #[test]
    fn from_headers_keeps_non_ascii_values() {
        let mut headers = HeaderMap::new();
        headers.insert(
            AUTHORIZATION,
            HeaderValue::from_bytes(b"caf\xe9.token").unwrap(),
        );
        assert_eq!(
            Credential::from_headers(&headers).map(|c| c.kind()),
            Some(CredentialKind::Token)
        );

        headers.insert(
            AUTHORIZATION,
            HeaderValue::from_bytes(b"Basic \xff\xfe").unwrap(),
        );
        assert_eq!(
            Credential::from_headers(&headers).map(|c| c.kind()),
            Some(CredentialKind::Unrecognized)
        );
    }

    #[test]
    fn from_headers_reads_authorization() {
        let mut headers = HeaderMap::new();
        assert_eq!(Credential::from_headers(&headers), None);

        headers.insert(AUTHORIZATION, HeaderValue::from_static("aaa.bbb.ccc"));
        assert_eq!(
            Credential::from_headers(&headers).map(|c| c.kind()),
            Some(CredentialKind::Token)
        );
    }

    #[test]
    fn debug_hides_token_value() {
        let credential = Credential::Token("secret.token.value".to_string());
        assert!(!format!("{credential:?}").contains("secret"));
    }

    struct FixedHandler;

    #[async_trait]
    impl CredentialHandler for FixedHandler {
        fn name(&self) -> &'static str {
            "fixed"
        }

        fn supports(&self, kind: CredentialKind) -> bool {
            kind == CredentialKind::Token
        }

        async fn authenticate(&self, _credential: &Credential) -> Result<Principal, AuthError> {
            Ok(Principal {
                id: 1,
                username: "fixed".to_string(),
                status: AccountStatus::Active,
            })
        }
    }

    #[tokio::test]
    async fn registry_dispatches_by_kind() {
        let registry = CredentialRegistry::new().with_handler(Arc::new(FixedHandler));

        let token = Credential::Token("aaa.bbb.ccc".to_string());
        let principal = registry.authenticate(Some(&token)).await;
        assert_eq!(principal.map(|p| p.username).ok(), Some("fixed".to_string()));

        let basic = Credential::Unrecognized {
            scheme: "Basic".to_string(),
        };
        assert!(matches!(
            registry.authenticate(Some(&basic)).await,
            Err(AuthError::UnsupportedCredential)
        ));

        assert!(matches!(
            registry.authenticate(None).await,
            Err(AuthError::MissingCredential)
        ));
    }

    #[tokio::test]
    async fn empty_registry_supports_nothing() {
        let registry = CredentialRegistry::new();
        let token = Credential::Token("aaa.bbb.ccc".to_string());
        assert!(matches!(
            registry.authenticate(Some(&token)).await,
            Err(AuthError::UnsupportedCredential)
        ));
    }
}
