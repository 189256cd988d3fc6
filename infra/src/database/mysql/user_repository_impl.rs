//! MySQL implementation of the UserRepository trait.
//!
//! Token uniqueness is enforced by the `uk_users_authorization_token` index;
//! a write rejected by it surfaces as `TokenError::TokenCollision`.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::mysql::MySqlRow;
use sqlx::{MySqlPool, Row};

use tv_core::domain::entities::user::UserRecord;
use tv_core::errors::{DomainError, TokenError};
use tv_core::repositories::UserRepository;

/// Name of the unique index over stored tokens
const TOKEN_INDEX: &str = "uk_users_authorization_token";

/// MySQL implementation of UserRepository
pub struct MySqlUserRepository {
    /// Database connection pool
    pool: MySqlPool,
}

impl MySqlUserRepository {
    /// Create a new MySQL user repository
    pub fn new(pool: MySqlPool) -> Self {
        Self { pool }
    }

    /// Convert a database row to a UserRecord
    fn row_to_user(row: &MySqlRow) -> Result<UserRecord, DomainError> {
        Ok(UserRecord {
            id: row
                .try_get("id")
                .map_err(|e| DomainError::Internal { message: format!("Failed to get id: {}", e) })?,
            authorization_token: row.try_get("authorization_token").map_err(|e| {
                DomainError::Internal {
                    message: format!("Failed to get authorization_token: {}", e),
                }
            })?,
            created_at: row.try_get::<DateTime<Utc>, _>("created_at").map_err(|e| {
                DomainError::Internal {
                    message: format!("Failed to get created_at: {}", e),
                }
            })?,
            updated_at: row.try_get::<DateTime<Utc>, _>("updated_at").map_err(|e| {
                DomainError::Internal {
                    message: format!("Failed to get updated_at: {}", e),
                }
            })?,
        })
    }

    async fn fetch_one_where(
        &self,
        column: &str,
        value: &str,
    ) -> Result<Option<UserRecord>, DomainError> {
        let query = format!(
            "SELECT id, authorization_token, created_at, updated_at FROM users WHERE {} = ? LIMIT 1",
            column
        );

        let row = sqlx::query(&query)
            .bind(value)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| directory_error("Database query failed", e))?;

        row.as_ref().map(Self::row_to_user).transpose()
    }

    async fn exists(&self, id: &str) -> Result<bool, DomainError> {
        let row = sqlx::query("SELECT COUNT(*) AS count FROM users WHERE id = ?")
            .bind(id)
            .fetch_one(&self.pool)
            .await
            .map_err(|e| directory_error("Database query failed", e))?;

        let count: i64 = row
            .try_get("count")
            .map_err(|e| DomainError::Internal { message: format!("Failed to get count: {}", e) })?;

        Ok(count > 0)
    }
}

#[async_trait]
impl UserRepository for MySqlUserRepository {
    async fn find_by_id(&self, id: &str) -> Result<Option<UserRecord>, DomainError> {
        self.fetch_one_where("id", id).await
    }

    async fn find_by_authorization_token(
        &self,
        token: &str,
    ) -> Result<Option<UserRecord>, DomainError> {
        self.fetch_one_where("authorization_token", token).await
    }

    async fn create(&self, user: UserRecord) -> Result<UserRecord, DomainError> {
        let query = r#"
            INSERT INTO users (id, authorization_token, created_at, updated_at)
            VALUES (?, ?, ?, ?)
        "#;

        sqlx::query(query)
            .bind(&user.id)
            .bind(user.stored_token())
            .bind(user.created_at)
            .bind(user.updated_at)
            .execute(&self.pool)
            .await
            .map_err(|e| match duplicate_key(&e) {
                Some(key) if key.contains(TOKEN_INDEX) => TokenError::TokenCollision.into(),
                Some(_) => DomainError::Validation {
                    message: format!("User {} already exists", user.id),
                },
                None => directory_error("Failed to create user", e),
            })?;

        tracing::debug!(user_id = %user.id, "Created user record");

        Ok(user)
    }

    async fn update_authorization_token(&self, id: &str, token: &str) -> Result<(), DomainError> {
        let result = sqlx::query(
            "UPDATE users SET authorization_token = ?, updated_at = ? WHERE id = ?",
        )
        .bind(token)
        .bind(Utc::now())
        .bind(id)
        .execute(&self.pool)
        .await
        .map_err(|e| match duplicate_key(&e) {
            Some(_) => TokenError::TokenCollision.into(),
            None => directory_error("Failed to update authorization token", e),
        })?;

        if result.rows_affected() == 0 && !self.exists(id).await? {
            return Err(TokenError::UserNotFound {
                user_id: id.to_string(),
            }
            .into());
        }

        Ok(())
    }
}

/// Message of a unique-key violation, if that is what `error` is
fn duplicate_key(error: &sqlx::Error) -> Option<String> {
    match error {
        sqlx::Error::Database(db_error) if db_error.is_unique_violation() => {
            Some(db_error.message().to_string())
        }
        _ => None,
    }
}

fn directory_error(context: &str, error: sqlx::Error) -> DomainError {
    tracing::error!(error = %error, "{}", context);
    DomainError::Directory {
        message: format!("{}: {}", context, error),
    }
}
