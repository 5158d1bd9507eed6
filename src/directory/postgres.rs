//! PostgreSQL-backed user directory (`users` table, see `sql/schema.sql`).

use anyhow::Context;
use async_trait::async_trait;
use sqlx::{postgres::PgRow, Connection, PgPool, Row};
use tracing::{info_span, Instrument};

use super::{Account, AccountStatus, DirectoryError, NewAccount, UserDirectory};

const SELECT_COLUMNS: &str = "id, username, password, email, status, avatar, created";

#[derive(Clone, Debug)]
pub struct PgUserDirectory {
    pool: PgPool,
}

impl PgUserDirectory {
    #[must_use]
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl UserDirectory for PgUserDirectory {
    async fn find_by_username(&self, username: &str) -> Result<Option<Account>, DirectoryError> {
        let query = format!("SELECT {SELECT_COLUMNS} FROM users WHERE username = $1");
        let span = select_span(&query);
        let row = sqlx::query(&query)
            .bind(username)
            .fetch_optional(&self.pool)
            .instrument(span)
            .await
            .context("failed to lookup account by username")
            .map_err(DirectoryError::Backend)?;

        row.as_ref().map(account_from_row).transpose()
    }

    async fn find_by_id(&self, id: i64) -> Result<Option<Account>, DirectoryError> {
        let query = format!("SELECT {SELECT_COLUMNS} FROM users WHERE id = $1");
        let span = select_span(&query);
        let row = sqlx::query(&query)
            .bind(id)
            .fetch_optional(&self.pool)
            .instrument(span)
            .await
            .context("failed to lookup account by id")
            .map_err(DirectoryError::Backend)?;

        row.as_ref().map(account_from_row).transpose()
    }

    async fn save(&self, account: NewAccount) -> Result<Account, DirectoryError> {
        let query = r"
            INSERT INTO users
                (username, password, email, status, avatar, created)
            VALUES ($1, $2, $3, $4, $5, $6)
            RETURNING id
        ";
        let span = info_span!(
            "db.query",
            db.system = "postgresql",
            db.operation = "INSERT",
            db.statement = query
        );
        let result = sqlx::query(query)
            .bind(&account.username)
            .bind(&account.password_hash)
            .bind(&account.email)
            .bind(account.status.code())
            .bind(&account.avatar)
            .bind(account.created_at)
            .fetch_one(&self.pool)
            .instrument(span)
            .await;

        let row = match result {
            Ok(row) => row,
            Err(err) if is_unique_violation(&err) => return Err(DirectoryError::Conflict),
            Err(err) => {
                return Err(DirectoryError::Backend(
                    anyhow::Error::new(err).context("failed to insert account"),
                ))
            }
        };

        let id: i64 = row
            .try_get("id")
            .context("missing id in insert result")
            .map_err(DirectoryError::Backend)?;

        Ok(Account {
            id,
            username: account.username,
            password_hash: account.password_hash,
            email: account.email,
            status: account.status,
            avatar: account.avatar,
            created_at: account.created_at,
        })
    }

    async fn ping(&self) -> Result<(), DirectoryError> {
        let acquire_span = info_span!(
            "db.acquire",
            db.system = "postgresql",
            db.operation = "ACQUIRE"
        );
        let mut conn = self
            .pool
            .acquire()
            .instrument(acquire_span)
            .await
            .context("failed to acquire database connection")
            .map_err(DirectoryError::Backend)?;

        let ping_span = info_span!("db.ping", db.system = "postgresql", db.operation = "PING");
        conn.ping()
            .instrument(ping_span)
            .await
            .context("failed to ping database")
            .map_err(DirectoryError::Backend)
    }
}

fn select_span(query: &str) -> tracing::Span {
    info_span!(
        "db.query",
        db.system = "postgresql",
        db.operation = "SELECT",
        db.statement = query
    )
}

fn account_from_row(row: &PgRow) -> Result<Account, DirectoryError> {
    let decode = |err: sqlx::Error| {
        DirectoryError::Backend(anyhow::Error::new(err).context("failed to decode account row"))
    };

    let code: i32 = row.try_get("status").map_err(decode)?;
    let status = AccountStatus::from_code(code).ok_or(DirectoryError::InvalidStatus(code))?;

    Ok(Account {
        id: row.try_get("id").map_err(decode)?,
        username: row.try_get("username").map_err(decode)?,
        password_hash: row.try_get("password").map_err(decode)?,
        email: row.try_get("email").map_err(decode)?,
        status,
        avatar: row.try_get("avatar").map_err(decode)?,
        created_at: row.try_get("created").map_err(decode)?,
    })
}

/// SQLSTATE 23505 is `unique_violation`.
fn is_unique_violation(err: &sqlx::Error) -> bool {
    match err {
        sqlx::Error::Database(db_err) => db_err.code().is_some_and(|code| code.as_ref() == "23505"),
        _ => false,
    }
}

#[cfg(test)]
mod tests {
    use super::is_unique_violation;
    use sqlx::error::{DatabaseError, ErrorKind};
    use std::borrow::Cow;
    use std::error::Error as StdError;
    use std::fmt;

    #[derive(Debug)]
    struct TestDbError {
        code: Option<&'static str>,
    }

    impl fmt::Display for TestDbError {
        fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
            write!(f, "test database error")
        }
    }

    impl StdError for TestDbError {}

    impl DatabaseError for TestDbError {
        fn message(&self) -> &'static str {
            "test database error"
        }

        fn code(&self) -> Option<Cow<'_, str>> {
            self.code.map(Cow::Borrowed)
        }

        fn as_error(&self) -> &(dyn StdError + Send + Sync + 'static) {
            self
        }

        fn as_error_mut(&mut self) -> &mut (dyn StdError + Send + Sync + 'static) {
            self
        }

        fn into_error(self: Box<Self>) -> Box<dyn StdError + Send + Sync + 'static> {
            self
        }

        fn kind(&self) -> ErrorKind {
            ErrorKind::UniqueViolation
        }
    }

    #[test]
    fn unique_violation_matches_sqlstate() {
        let err = sqlx::Error::Database(Box::new(TestDbError {
            code: Some("23505"),
        }));
        assert!(is_unique_violation(&err));

        let err = sqlx::Error::Database(Box::new(TestDbError {
            code: Some("99999"),
        }));
        assert!(!is_unique_violation(&err));

        assert!(!is_unique_violation(&sqlx::Error::RowNotFound));
    }
}
