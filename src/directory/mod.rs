//! User directory: the persistence collaborator that owns account records.
//!
//! The authentication core only reads accounts (login, token resolution) and
//! creates them at sign-up. Usernames are unique; the directory enforces that
//! constraint itself and reports violations as [`DirectoryError::Conflict`],
//! so concurrent sign-ups racing on one username cannot both succeed.

mod memory;
mod postgres;

pub use memory::InMemoryDirectory;
pub use postgres::PgUserDirectory;

use async_trait::async_trait;
use serde::Serialize;
use thiserror::Error;
use time::OffsetDateTime;
use utoipa::ToSchema;

/// Account status as stored by the directory.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Serialize, ToSchema)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum AccountStatus {
    Active,
    Locked,
}

impl AccountStatus {
    const ACTIVE_CODE: i32 = 0;
    const LOCKED_CODE: i32 = -1;

    /// Storage code for this status.
    #[must_use]
    pub const fn code(self) -> i32 {
        match self {
            Self::Active => Self::ACTIVE_CODE,
            Self::Locked => Self::LOCKED_CODE,
        }
    }

    /// Map a storage code back to a status; unknown codes are rejected.
    #[must_use]
    pub const fn from_code(code: i32) -> Option<Self> {
        match code {
            Self::ACTIVE_CODE => Some(Self::Active),
            Self::LOCKED_CODE => Some(Self::Locked),
            _ => None,
        }
    }
}

/// A persisted account.
#[derive(Clone, Debug)]
pub struct Account {
    pub id: i64,
    pub username: String,
    pub password_hash: String,
    pub email: String,
    pub status: AccountStatus,
    pub avatar: String,
    pub created_at: OffsetDateTime,
}

/// Account fields supplied at sign-up; the directory assigns the id.
#[derive(Clone, Debug)]
pub struct NewAccount {
    pub username: String,
    pub password_hash: String,
    pub email: String,
    pub status: AccountStatus,
    pub avatar: String,
    pub created_at: OffsetDateTime,
}

#[derive(Debug, Error)]
pub enum DirectoryError {
    /// A uniqueness constraint rejected the write.
    #[error("account already exists")]
    Conflict,
    #[error("invalid account status code: {0}")]
    InvalidStatus(i32),
    #[error("directory backend error")]
    Backend(#[source] anyhow::Error),
}

/// Lookup and persistence of accounts.
#[async_trait]
pub trait UserDirectory: Send + Sync {
    async fn find_by_username(&self, username: &str) -> Result<Option<Account>, DirectoryError>;

    async fn find_by_id(&self, id: i64) -> Result<Option<Account>, DirectoryError>;

    /// Persist a new account, returning it with its assigned id.
    ///
    /// # Errors
    ///
    /// Returns [`DirectoryError::Conflict`] if the username is already taken.
    async fn save(&self, account: NewAccount) -> Result<Account, DirectoryError>;

    /// Liveness probe used by `/health`.
    async fn ping(&self) -> Result<(), DirectoryError> {
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::AccountStatus;

    #[test]
    fn status_codes_round_trip() {
        assert_eq!(AccountStatus::Active.code(), 0);
        assert_eq!(AccountStatus::Locked.code(), -1);
        assert_eq!(AccountStatus::from_code(0), Some(AccountStatus::Active));
        assert_eq!(AccountStatus::from_code(-1), Some(AccountStatus::Locked));
        assert_eq!(AccountStatus::from_code(7), None);
    }

    #[test]
    fn status_serializes_uppercase() {
        let value = serde_json::to_value(AccountStatus::Locked).ok();
        assert_eq!(value, Some(serde_json::json!("LOCKED")));
    }
}
