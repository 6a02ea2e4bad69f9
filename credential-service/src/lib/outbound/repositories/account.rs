use async_trait::async_trait;
use chrono::DateTime;
use chrono::Utc;
use sqlx::postgres::PgRow;
use sqlx::PgPool;
use sqlx::Row;
use uuid::Uuid;

use crate::account::errors::AccountError;
use crate::domain::account::models::Account;
use crate::domain::account::models::AccountId;
use crate::domain::account::models::Role;
use crate::domain::account::models::Username;
use crate::domain::account::ports::AccountRepository;

const USERNAME_UNIQUE_CONSTRAINT: &str = "accounts_username_key";

pub struct PostgresAccountRepository {
    pool: PgPool,
}

impl PostgresAccountRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

fn account_from_row(row: &PgRow) -> Result<Account, AccountError> {
    let id: Uuid = row.try_get("id").map_err(database_error)?;
    let username: String = row.try_get("username").map_err(database_error)?;
    let password_hash: String = row.try_get("password_hash").map_err(database_error)?;
    let role: String = row.try_get("role").map_err(database_error)?;
    let is_active: bool = row.try_get("is_active").map_err(database_error)?;
    let version: i64 = row.try_get("version").map_err(database_error)?;
    let created_at: DateTime<Utc> = row.try_get("created_at").map_err(database_error)?;

    Ok(Account {
        id: AccountId(id),
        username: Username::new(username)?,
        password_hash,
        role: role.parse::<Role>()?,
        is_active,
        version,
        created_at,
    })
}

fn database_error(e: sqlx::Error) -> AccountError {
    AccountError::DatabaseError(e.to_string())
}

/// Map a write failure, translating the username unique constraint.
fn write_error(e: sqlx::Error, username: &Username) -> AccountError {
    if let Some(db_err) = e.as_database_error() {
        if db_err.is_unique_violation() && db_err.constraint() == Some(USERNAME_UNIQUE_CONSTRAINT)
        {
            return AccountError::UsernameAlreadyExists(username.to_string());
        }
    }
    database_error(e)
}

#[async_trait]
impl AccountRepository for PostgresAccountRepository {
    async fn create(&self, account: Account) -> Result<Account, AccountError> {
        sqlx::query(
            r#"
            INSERT INTO accounts (id, username, password_hash, role, is_active, version, created_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            "#,
        )
        .bind(account.id.0)
        .bind(account.username.as_str())
        .bind(&account.password_hash)
        .bind(account.role.as_str())
        .bind(account.is_active)
        .bind(account.version)
        .bind(account.created_at)
        .execute(&self.pool)
        .await
        .map_err(|e| write_error(e, &account.username))?;

        Ok(account)
    }

    async fn find_by_id(&self, id: &AccountId) -> Result<Option<Account>, AccountError> {
        let row = sqlx::query(
            r#"
            SELECT id, username, password_hash, role, is_active, version, created_at
            FROM accounts
            WHERE id = $1
            "#,
        )
        .bind(id.0)
        .fetch_optional(&self.pool)
        .await
        .map_err(database_error)?;

        row.as_ref().map(account_from_row).transpose()
    }

    async fn find_by_username(
        &self,
        username: &Username,
    ) -> Result<Option<Account>, AccountError> {
        let row = sqlx::query(
            r#"
            SELECT id, username, password_hash, role, is_active, version, created_at
            FROM accounts
            WHERE username = $1
            "#,
        )
        .bind(username.as_str())
        .fetch_optional(&self.pool)
        .await
        .map_err(database_error)?;

        row.as_ref().map(account_from_row).transpose()
    }

    async fn update(&self, mut account: Account) -> Result<Account, AccountError> {
        let result = sqlx::query(
            r#"
            UPDATE accounts
            SET username = $2, password_hash = $3, is_active = $4, version = version + 1
            WHERE id = $1 AND version = $5
            "#,
        )
        .bind(account.id.0)
        .bind(account.username.as_str())
        .bind(&account.password_hash)
        .bind(account.is_active)
        .bind(account.version)
        .execute(&self.pool)
        .await
        .map_err(|e| write_error(e, &account.username))?;

        if result.rows_affected() == 0 {
            let exists = sqlx::query("SELECT 1 FROM accounts WHERE id = $1")
                .bind(account.id.0)
                .fetch_optional(&self.pool)
                .await
                .map_err(database_error)?
                .is_some();

            return Err(if exists {
                AccountError::Conflict(account.id.to_string())
            } else {
                AccountError::NotFound(account.id.to_string())
            });
        }

        account.version += 1;
        Ok(account)
    }
}

#[cfg(test)]
mod tests {
    use std::error::Error as StdError;
    use std::fmt;

    use sqlx::error::DatabaseError;
    use sqlx::error::ErrorKind;

    use super::*;

    /// Stand-in for a driver error carrying a constraint violation.
    #[derive(Debug)]
    struct ConstraintViolation {
        kind: fn() -> ErrorKind,
        constraint: &'static str,
    }

    impl fmt::Display for ConstraintViolation {
        fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
            write!(f, "constraint \"{}\" violated", self.constraint)
        }
    }

    impl StdError for ConstraintViolation {}

    impl DatabaseError for ConstraintViolation {
        fn message(&self) -> &str {
            "constraint violated"
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

        fn constraint(&self) -> Option<&str> {
            Some(self.constraint)
        }

        fn kind(&self) -> ErrorKind {
            (self.kind)()
        }
    }

    fn violation(kind: fn() -> ErrorKind, constraint: &'static str) -> sqlx::Error {
        sqlx::Error::Database(Box::new(ConstraintViolation { kind, constraint }))
    }

    fn username() -> Username {
        Username::new("ada.lovelace".to_string()).unwrap()
    }

    #[test]
    fn test_username_unique_violation_maps_to_already_exists() {
        let error = write_error(
            violation(|| ErrorKind::UniqueViolation, USERNAME_UNIQUE_CONSTRAINT),
            &username(),
        );

        assert_eq!(
            error,
            AccountError::UsernameAlreadyExists("ada.lovelace".to_string())
        );
    }

    #[test]
    fn test_other_unique_violation_is_a_database_error() {
        let error = write_error(
            violation(|| ErrorKind::UniqueViolation, "accounts_pkey"),
            &username(),
        );

        assert!(matches!(error, AccountError::DatabaseError(_)));
    }

    #[test]
    fn test_other_violation_on_username_constraint_is_a_database_error() {
        let error = write_error(
            violation(|| ErrorKind::CheckViolation, USERNAME_UNIQUE_CONSTRAINT),
            &username(),
        );

        assert!(matches!(error, AccountError::DatabaseError(_)));
    }

    #[test]
    fn test_non_database_error_is_a_database_error() {
        let error = write_error(sqlx::Error::RowNotFound, &username());

        assert!(matches!(error, AccountError::DatabaseError(_)));
    }
}
