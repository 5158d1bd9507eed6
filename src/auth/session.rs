//! Login, logout and sign-up.
//!
//! Flow Overview:
//! - Login: look the account up by username, verify the password, issue a token
//!   for the account id and hand back the public profile.
//! - Logout: consume the caller's principal. Tokens are stateless and are not
//!   revoked; a token that is still valid keeps authenticating until it expires.
//! - Sign-up: reject taken usernames, hash the password and save an ACTIVE
//!   account with the default avatar. No token is issued.
//!
//! Request validation (non-blank fields, email syntax) runs in the transport
//! layer through [`Credentials::validate`] and [`SignUp::validate`] before any
//! of these operations is reached.

use regex::Regex;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use time::OffsetDateTime;
use tracing::{debug, info, instrument};
use utoipa::ToSchema;

use super::{
    password::{hash_password, verify_password},
    token::TokenCodec,
    AuthError, Principal,
};
use crate::directory::{Account, AccountStatus, DirectoryError, NewAccount, UserDirectory};

#[derive(ToSchema, Serialize, Deserialize, Clone)]
pub struct Credentials {
    pub username: String,
    pub password: String,
}

impl std::fmt::Debug for Credentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Credentials")
            .field("username", &self.username)
            .field("password", &"***")
            .finish()
    }
}

impl Credentials {
    /// # Errors
    ///
    /// Returns [`AuthError::Validation`] if a field is blank.
    pub fn validate(&self) -> Result<(), AuthError> {
        require_non_blank("username", &self.username)?;
        require_non_blank("password", &self.password)
    }
}

#[derive(ToSchema, Serialize, Deserialize, Clone)]
pub struct SignUp {
    pub username: String,
    pub password: String,
    pub email: String,
}

impl std::fmt::Debug for SignUp {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SignUp")
            .field("username", &self.username)
            .field("password", &"***")
            .field("email", &self.email)
            .finish()
    }
}

impl SignUp {
    /// # Errors
    ///
    /// Returns [`AuthError::Validation`] if a field is blank or the email is
    /// not syntactically valid.
    pub fn validate(&self) -> Result<(), AuthError> {
        require_non_blank("username", &self.username)?;
        require_non_blank("password", &self.password)?;
        require_non_blank("email", &self.email)?;
        if !valid_email(self.email.trim()) {
            return Err(AuthError::Validation("invalid email".to_string()));
        }
        Ok(())
    }
}

/// Profile fields safe to return to the client.
#[derive(ToSchema, Serialize, Deserialize, Clone, Debug, Eq, PartialEq)]
pub struct PublicProfile {
    pub id: i64,
    pub username: String,
    pub avatar: String,
    pub email: String,
}

impl From<&Account> for PublicProfile {
    fn from(account: &Account) -> Self {
        Self {
            id: account.id,
            username: account.username.clone(),
            avatar: account.avatar.clone(),
            email: account.email.clone(),
        }
    }
}

#[derive(Clone, Debug)]
pub struct LoginOutcome {
    pub token: String,
    pub profile: PublicProfile,
}

pub struct Sessions {
    directory: Arc<dyn UserDirectory>,
    codec: TokenCodec,
    default_avatar_url: String,
}

impl Sessions {
    #[must_use]
    pub fn new(
        directory: Arc<dyn UserDirectory>,
        codec: TokenCodec,
        default_avatar_url: String,
    ) -> Self {
        Self {
            directory,
            codec,
            default_avatar_url,
        }
    }

    /// Exchange a username and password for a token and profile.
    ///
    /// # Errors
    ///
    /// [`AuthError::AccountNotFound`] for an unknown username,
    /// [`AuthError::BadCredentials`] for a wrong password.
    #[instrument(skip_all, fields(username = %credentials.username))]
    pub async fn login(&self, credentials: &Credentials) -> Result<LoginOutcome, AuthError> {
        let account = self
            .directory
            .find_by_username(&credentials.username)
            .await?
            .ok_or(AuthError::AccountNotFound)?;

        if !verify_password(&credentials.password, &account.password_hash) {
            debug!(account_id = account.id, "password mismatch");
            return Err(AuthError::BadCredentials);
        }

        let token = self.codec.issue(account.id)?;
        info!(account_id = account.id, "login succeeded");

        Ok(LoginOutcome {
            token,
            profile: PublicProfile::from(&account),
        })
    }

    /// End the caller's session. Nothing is revoked server-side.
    #[instrument(skip_all, fields(account_id = principal.id))]
    pub fn logout(&self, principal: Principal) {
        info!(username = %principal.username, "logout");
    }

    /// Register a new ACTIVE account.
    ///
    /// # Errors
    ///
    /// [`AuthError::UsernameTaken`] if the username exists, including when a
    /// concurrent sign-up wins the race at the directory.
    #[instrument(skip_all, fields(username = %request.username))]
    pub async fn sign_up(&self, request: &SignUp) -> Result<Account, AuthError> {
        if self
            .directory
            .find_by_username(&request.username)
            .await?
            .is_some()
        {
            return Err(AuthError::UsernameTaken);
        }

        let account = NewAccount {
            username: request.username.clone(),
            password_hash: hash_password(&request.password)?,
            email: request.email.trim().to_string(),
            status: AccountStatus::Active,
            avatar: self.default_avatar_url.clone(),
            created_at: OffsetDateTime::now_utc(),
        };

        let saved = self.directory.save(account).await.map_err(|err| match err {
            DirectoryError::Conflict => AuthError::UsernameTaken,
            other => AuthError::Directory(other),
        })?;
        info!(account_id = saved.id, "account created");
        Ok(saved)
    }
}

impl std::fmt::Debug for Sessions {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Sessions")
            .field("codec", &self.codec)
            .field("default_avatar_url", &self.default_avatar_url)
            .finish_non_exhaustive()
    }
}

fn require_non_blank(field: &str, value: &str) -> Result<(), AuthError> {
    if value.trim().is_empty() {
        return Err(AuthError::Validation(format!("{field} must not be blank")));
    }
    Ok(())
}

fn valid_email(email: &str) -> bool {
    Regex::new(r"^[^@\s]+@[^@\s]+\.[^@\s]+$").is_ok_and(|regex| regex.is_match(email))
}
