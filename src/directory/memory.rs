//! In-memory user directory for tests and local development.

use async_trait::async_trait;
use std::collections::HashMap;
use tokio::sync::RwLock;

use super::{Account, AccountStatus, DirectoryError, NewAccount, UserDirectory};

#[derive(Debug, Default)]
struct Accounts {
    next_id: i64,
    by_id: HashMap<i64, Account>,
}

/// Directory backed by a map; enforces username uniqueness like the SQL schema.
#[derive(Debug, Default)]
pub struct InMemoryDirectory {
    accounts: RwLock<Accounts>,
}

impl InMemoryDirectory {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored accounts.
    pub async fn len(&self) -> usize {
        self.accounts.read().await.by_id.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }

    /// Administrative status change (e.g. locking an account).
    ///
    /// Returns `false` when no account has the given id.
    pub async fn set_status(&self, id: i64, status: AccountStatus) -> bool {
        let mut accounts = self.accounts.write().await;
        match accounts.by_id.get_mut(&id) {
            Some(account) => {
                account.status = status;
                true
            }
            None => false,
        }
    }
}

#[async_trait]
impl UserDirectory for InMemoryDirectory {
    async fn find_by_username(&self, username: &str) -> Result<Option<Account>, DirectoryError> {
        let accounts = self.accounts.read().await;
        Ok(accounts
            .by_id
            .values()
            .find(|account| account.username == username)
            .cloned())
    }

    async fn find_by_id(&self, id: i64) -> Result<Option<Account>, DirectoryError> {
        Ok(self.accounts.read().await.by_id.get(&id).cloned())
    }

    async fn save(&self, account: NewAccount) -> Result<Account, DirectoryError> {
        // Check and insert under one write lock so duplicate usernames cannot race in.
        let mut accounts = self.accounts.write().await;
        if accounts
            .by_id
            .values()
            .any(|existing| existing.username == account.username)
        {
            return Err(DirectoryError::Conflict);
        }

        accounts.next_id += 1;
        let stored = Account {
            id: accounts.next_id,
            username: account.username,
            password_hash: account.password_hash,
            email: account.email,
            status: account.status,
            avatar: account.avatar,
            created_at: account.created_at,
        };
        accounts.by_id.insert(stored.id, stored.clone());
        Ok(stored)
    }
}
