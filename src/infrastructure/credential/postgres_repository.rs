//! PostgreSQL credential repository implementation
//!
//! Expects the table below to exist:
//!
//! ```sql
//! CREATE TABLE credentials (
//!     id            BIGSERIAL PRIMARY KEY,
//!     username      TEXT NOT NULL UNIQUE,
//!     password_hash TEXT NOT NULL,
//!     created_at    TIMESTAMPTZ NOT NULL DEFAULT NOW()
//! );
//! ```

use std::future::Future;
use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::postgres::PgRow;
use sqlx::{PgPool, Row};

use crate::domain::credential::{Credential, CredentialId, CredentialRepository, NewCredential};
use crate::domain::DomainError;

/// PostgreSQL implementation of CredentialRepository
///
/// Username uniqueness is enforced by the table's `UNIQUE` constraint.
/// Every call is bounded by `query_timeout`.
#[derive(Debug, Clone)]
pub struct PostgresCredentialRepository {
    pool: PgPool,
    query_timeout: Duration,
}

impl PostgresCredentialRepository {
    /// Create a new repository with the given connection pool
    pub fn new(pool: PgPool, query_timeout: Duration) -> Self {
        Self {
            pool,
            query_timeout,
        }
    }

    async fn bounded<T, F>(&self, operation: &str, query: F) -> Result<T, DomainError>
    where
        F: Future<Output = Result<T, sqlx::Error>>,
    {
        match tokio::time::timeout(self.query_timeout, query).await {
            Ok(result) => result.map_err(|e| map_sqlx_error(operation, e)),
            Err(_) => Err(DomainError::store_unavailable(format!(
                "{} timed out after {}ms",
                operation,
                self.query_timeout.as_millis()
            ))),
        }
    }
}

#[async_trait]
impl CredentialRepository for PostgresCredentialRepository {
    async fn get(&self, id: CredentialId) -> Result<Option<Credential>, DomainError> {
        let row = self
            .bounded(
                "Get credential",
                sqlx::query(
                    r#"
                    SELECT id, username, password_hash, created_at
                    FROM credentials
                    WHERE id = $1
                    "#,
                )
                .bind(id.value())
                .fetch_optional(&self.pool),
            )
            .await?;

        row.as_ref().map(row_to_credential).transpose()
    }

    async fn find_by_username(&self, username: &str) -> Result<Option<Credential>, DomainError> {
        let row = self
            .bounded(
                "Find credential by username",
                sqlx::query(
                    r#"
                    SELECT id, username, password_hash, created_at
                    FROM credentials
                    WHERE username = $1
                    "#,
                )
                .bind(username)
                .fetch_optional(&self.pool),
            )
            .await?;

        row.as_ref().map(row_to_credential).transpose()
    }

    async fn create(&self, credential: NewCredential) -> Result<Credential, DomainError> {
        let row = self
            .bounded(
                "Create credential",
                sqlx::query(
                    r#"
                    INSERT INTO credentials (username, password_hash)
                    VALUES ($1, $2)
                    RETURNING id, username, password_hash, created_at
                    "#,
                )
                .bind(&credential.username)
                .bind(&credential.password_hash)
                .fetch_one(&self.pool),
            )
            .await
            .map_err(|e| match e {
                DomainError::AlreadyExists { .. } => DomainError::already_exists(format!(
                    "Username '{}' already exists",
                    credential.username
                )),
                other => other,
            })?;

        row_to_credential(&row)
    }

    async fn count(&self) -> Result<usize, DomainError> {
        let count: i64 = self
            .bounded(
                "Count credentials",
                sqlx::query_scalar("SELECT COUNT(*) FROM credentials").fetch_one(&self.pool),
            )
            .await?;

        Ok(count as usize)
    }

    async fn health_check(&self) -> Result<(), DomainError> {
        let _: i32 = self
            .bounded(
                "Health check",
                sqlx::query_scalar("SELECT 1").fetch_one(&self.pool),
            )
            .await?;

        Ok(())
    }
}

fn row_to_credential(row: &PgRow) -> Result<Credential, DomainError> {
    let decode = |e: sqlx::Error| DomainError::internal(format!("Invalid credential row: {}", e));

    let id: i64 = row.try_get("id").map_err(decode)?;
    let username: String = row.try_get("username").map_err(decode)?;
    let password_hash: String = row.try_get("password_hash").map_err(decode)?;
    let created_at: DateTime<Utc> = row.try_get("created_at").map_err(decode)?;

    Ok(Credential::restore(
        CredentialId::new(id),
        username,
        password_hash,
        created_at,
    ))
}

fn map_sqlx_error(operation: &str, error: sqlx::Error) -> DomainError {
    match &error {
        sqlx::Error::Database(db) if db.is_unique_violation() => {
            DomainError::already_exists("Username already exists")
        }
        sqlx::Error::ColumnNotFound(_)
        | sqlx::Error::ColumnDecode { .. }
        | sqlx::Error::ColumnIndexOutOfBounds { .. }
        | sqlx::Error::TypeNotFound { .. }
        | sqlx::Error::Decode(_) => {
            DomainError::internal(format!("{} failed: {}", operation, error))
        }
        _ => DomainError::store_unavailable(format!("{} failed: {}", operation, error)),
    }
}
