//! Authenticated principal extraction.
//!
//! Protected handlers call [`require_auth`] and pass the returned
//! [`Principal`] on explicitly; there is no ambient "current user".

use axum::http::HeaderMap;
use serde::Serialize;
use utoipa::ToSchema;

use super::{credential::Credential, AuthError, AuthState};
use crate::directory::{Account, AccountStatus};

/// Identity derived from a validated token.
#[derive(ToSchema, Serialize, Clone, Debug, Eq, PartialEq)]
pub struct Principal {
    pub id: i64,
    pub username: String,
    pub status: AccountStatus,
}

impl From<&Account> for Principal {
    fn from(account: &Account) -> Self {
        Self {
            id: account.id,
            username: account.username.clone(),
            status: account.status,
        }
    }
}

/// Resolve the request's `Authorization` header into a principal.
///
/// # Errors
///
/// Returns the [`AuthError`] produced by credential dispatch.
pub async fn require_auth(headers: &HeaderMap, state: &AuthState) -> Result<Principal, AuthError> {
    let credential = Credential::from_headers(headers);
    state.registry().authenticate(credential.as_ref()).await
}
