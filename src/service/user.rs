//! User Service
//!
//! Credential store operations: every call is a single statement keyed on
//! the unique username, committed immediately.

use async_trait::async_trait;
use sqlx::PgPool;
use thiserror::Error;

use crate::models::user::UserRecord;
use crate::utils::error::AppError;

/// Custom error types for the user service
#[derive(Error, Debug)]
pub enum UserServiceError {
    /// User with the specified username was not found
    #[error("User not found")]
    UserNotFound,

    /// Attempted to create a user with a username that already exists
    #[error("Account already exist")]
    UsernameAlreadyExists,

    /// Database operation failed
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),
}

impl From<UserServiceError> for AppError {
    fn from(err: UserServiceError) -> Self {
        match err {
            UserServiceError::UserNotFound => AppError::NotFound("User not found".to_string()),
            UserServiceError::UsernameAlreadyExists => {
                AppError::Conflict("Account already exist".to_string())
            }
            UserServiceError::Database(e) => AppError::Database(e),
        }
    }
}

/// Result type for user service operations
pub type UserServiceResult<T> = Result<T, UserServiceError>;

/// Storage operations over user records.
///
/// Dyn-compatible so handlers can run against an in-memory store in tests.
#[async_trait]
pub trait UserStore: Send + Sync {
    /// Look up a user by username; `None` when no such account exists
    async fn find_by_username(&self, username: &str) -> UserServiceResult<Option<UserRecord>>;

    /// Create an unconfirmed account with an optional default avatar
    async fn create(
        &self,
        username: &str,
        password_hash: &str,
        avatar: Option<&str>,
    ) -> UserServiceResult<UserRecord>;

    /// Flip the confirmed flag; idempotent once confirmed
    async fn set_confirmed(&self, username: &str) -> UserServiceResult<()>;

    /// Replace the stored avatar URL and return the updated record
    async fn set_avatar(&self, username: &str, url: &str) -> UserServiceResult<UserRecord>;

    /// Replace the stored refresh token; `None` revokes it
    async fn set_refresh_token(
        &self,
        username: &str,
        refresh_token: Option<&str>,
    ) -> UserServiceResult<()>;
}

const USER_COLUMNS: &str =
    "id, username, password_hash, refresh_token, confirmed, avatar, created_at, updated_at";

/// Persistence layer for user records
#[derive(Clone)]
pub struct UserService {
    db_pool: PgPool,
}

impl UserService {
    /// Creates a new UserService backed by the given connection pool
    pub fn new(db_pool: PgPool) -> Self {
        Self { db_pool }
    }
}

#[async_trait]
impl UserStore for UserService {
    async fn find_by_username(&self, username: &str) -> UserServiceResult<Option<UserRecord>> {
        let user = sqlx::query_as::<_, UserRecord>(&format!(
            "SELECT {USER_COLUMNS} FROM users WHERE username = $1"
        ))
        .bind(username)
        .fetch_optional(&self.db_pool)
        .await?;

        Ok(user)
    }

    async fn create(
        &self,
        username: &str,
        password_hash: &str,
        avatar: Option<&str>,
    ) -> UserServiceResult<UserRecord> {
        let user = sqlx::query_as::<_, UserRecord>(&format!(
            "INSERT INTO users (username, password_hash, avatar)
             VALUES ($1, $2, $3)
             RETURNING {USER_COLUMNS}"
        ))
        .bind(username)
        .bind(password_hash)
        .bind(avatar)
        .fetch_one(&self.db_pool)
        .await
        .map_err(|e| match e {
            sqlx::Error::Database(db_err) if db_err.constraint() == Some("users_username_key") => {
                UserServiceError::UsernameAlreadyExists
            }
            _ => UserServiceError::Database(e),
        })?;

        Ok(user)
    }

    async fn set_confirmed(&self, username: &str) -> UserServiceResult<()> {
        let result = sqlx::query(
            "UPDATE users SET confirmed = TRUE, updated_at = NOW() WHERE username = $1",
        )
        .bind(username)
        .execute(&self.db_pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(UserServiceError::UserNotFound);
        }

        Ok(())
    }

    async fn set_avatar(&self, username: &str, url: &str) -> UserServiceResult<UserRecord> {
        let user = sqlx::query_as::<_, UserRecord>(&format!(
            "UPDATE users SET avatar = $2, updated_at = NOW()
             WHERE username = $1
             RETURNING {USER_COLUMNS}"
        ))
        .bind(username)
        .bind(url)
        .fetch_optional(&self.db_pool)
        .await?
        .ok_or(UserServiceError::UserNotFound)?;

        Ok(user)
    }

    async fn set_refresh_token(
        &self,
        username: &str,
        refresh_token: Option<&str>,
    ) -> UserServiceResult<()> {
        let result = sqlx::query(
            "UPDATE users SET refresh_token = $2, updated_at = NOW() WHERE username = $1",
        )
        .bind(username)
        .bind(refresh_token)
        .execute(&self.db_pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(UserServiceError::UserNotFound);
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::StatusCode;
    use axum::response::IntoResponse;

    #[test]
    fn test_duplicate_username_maps_to_conflict() {
        let app_error: AppError = UserServiceError::UsernameAlreadyExists.into();
        assert_eq!(app_error.into_response().status(), StatusCode::CONFLICT);
    }

    #[test]
    fn test_missing_user_maps_to_not_found() {
        let app_error: AppError = UserServiceError::UserNotFound.into();
        assert_eq!(app_error.into_response().status(), StatusCode::NOT_FOUND);
    }
}
