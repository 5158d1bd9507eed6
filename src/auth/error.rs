use thiserror::Error;

use super::token::TokenError;
use crate::directory::DirectoryError;

/// Failures surfaced by the authentication core.
///
/// Each variant maps to a distinct user-facing message; token and account
/// failures are kept apart so callers can tell "expired" from "locked" from
/// "malformed".
#[derive(Debug, Error)]
pub enum AuthError {
    #[error("{0}")]
    Validation(String),
    #[error("incorrect password")]
    BadCredentials,
    #[error("account not found")]
    AccountNotFound,
    #[error("username already exists")]
    UsernameTaken,
    #[error("account is locked")]
    AccountLocked,
    #[error("missing authorization token")]
    MissingCredential,
    #[error("unsupported authorization credential")]
    UnsupportedCredential,
    #[error("malformed token")]
    MalformedToken,
    #[error("invalid token signature")]
    InvalidSignature,
    #[error("token expired")]
    Expired,
    #[error("account does not exist")]
    UnknownAccount,
    #[error("user directory error")]
    Directory(#[from] DirectoryError),
    #[error("internal error: {0}")]
    Internal(String),
}

impl AuthError {
    /// Stable machine-readable identifier for the error kind.
    #[must_use]
    pub const fn kind(&self) -> &'static str {
        match self {
            Self::Validation(_) => "validation_error",
            Self::BadCredentials => "bad_credentials",
            Self::AccountNotFound => "account_not_found",
            Self::UsernameTaken => "username_taken",
            Self::AccountLocked => "account_locked",
            Self::MissingCredential => "missing_credential",
            Self::UnsupportedCredential => "unsupported_credential",
            Self::MalformedToken => "malformed_token",
            Self::InvalidSignature => "invalid_signature",
            Self::Expired => "expired",
            Self::UnknownAccount => "unknown_account",
            Self::Directory(_) | Self::Internal(_) => "internal_error",
        }
    }
}

impl From<TokenError> for AuthError {
    fn from(err: TokenError) -> Self {
        match err {
            TokenError::Malformed => Self::MalformedToken,
            TokenError::InvalidSignature => Self::InvalidSignature,
            TokenError::Expired => Self::Expired,
            TokenError::Encode(err) => Self::Internal(err.to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn token_errors_keep_their_kind() {
        assert!(matches!(
            AuthError::from(TokenError::Malformed),
            AuthError::MalformedToken
        ));
        assert!(matches!(
            AuthError::from(TokenError::InvalidSignature),
            AuthError::InvalidSignature
        ));
        assert!(matches!(
            AuthError::from(TokenError::Expired),
            AuthError::Expired
        ));
    }

    #[test]
    fn directory_conflict_is_wrapped_not_swallowed() {
        let err = AuthError::from(DirectoryError::Conflict);
        assert_eq!(err.kind(), "internal_error");
        assert!(matches!(
            err,
            AuthError::Directory(DirectoryError::Conflict)
        ));
    }
}
