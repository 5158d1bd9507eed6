//! Token authority: resolves identity tokens into principals.
//!
//! Flow: parse the token (signature + expiry), load the subject's account,
//! refuse locked accounts, project the rest into a [`Principal`]. Nothing is
//! cached; every protected request goes through the full chain.

use async_trait::async_trait;
use std::sync::Arc;
use tracing::{debug, instrument, warn};

use super::{
    credential::{Credential, CredentialHandler, CredentialKind},
    token::TokenCodec,
    AuthError, Principal,
};
use crate::directory::{AccountStatus, UserDirectory};

pub struct TokenAuthority {
    codec: TokenCodec,
    directory: Arc<dyn UserDirectory>,
}

impl TokenAuthority {
    #[must_use]
    pub fn new(codec: TokenCodec, directory: Arc<dyn UserDirectory>) -> Self {
        Self { codec, directory }
    }

    /// Resolve a raw token into a principal.
    ///
    /// # Errors
    ///
    /// Token failures (`MalformedToken`, `InvalidSignature`, `Expired`) are
    /// returned unchanged; a missing subject yields `UnknownAccount` and a
    /// locked one `AccountLocked`.
    #[instrument(skip_all)]
    pub async fn resolve(&self, token: &str) -> Result<Principal, AuthError> {
        let claims = self.codec.parse(token).map_err(|err| {
            debug!("token rejected: {err}");
            AuthError::from(err)
        })?;

        let Some(account) = self.directory.find_by_id(claims.subject).await? else {
            warn!(subject = claims.subject, "token subject has no account");
            return Err(AuthError::UnknownAccount);
        };

        if account.status == AccountStatus::Locked {
            warn!(account_id = account.id, "locked account presented a token");
            return Err(AuthError::AccountLocked);
        }

        Ok(Principal::from(&account))
    }
}

#[async_trait]
impl CredentialHandler for TokenAuthority {
    fn name(&self) -> &'static str {
        "token"
    }

    fn supports(&self, kind: CredentialKind) -> bool {
        kind == CredentialKind::Token
    }

    async fn authenticate(&self, credential: &Credential) -> Result<Principal, AuthError> {
        match credential {
            Credential::Token(token) => self.resolve(token).await,
            Credential::Unrecognized { .. } => Err(AuthError::UnsupportedCredential),
        }
    }
}

impl std::fmt::Debug for TokenAuthority {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TokenAuthority")
            .field("codec", &self.codec)
            .finish_non_exhaustive()
    }
}
