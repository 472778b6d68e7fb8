//! User Model
//!
//! Core user data structures and type definitions.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// User representation for external API responses and the session cache
///
/// Never carries the password hash or the stored refresh token. Snapshots of
/// this struct are what get serialized into the short-TTL session cache.
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct User {
    /// Unique identifier for the user
    pub id: Uuid,

    /// Login name; always an email address
    pub username: String,

    /// Whether the user's email address has been confirmed
    pub confirmed: bool,

    /// Optional URL to the user's avatar image
    pub avatar: Option<String>,

    /// Timestamp when the account was created
    pub created_at: DateTime<Utc>,

    /// Timestamp when the account was last modified
    pub updated_at: DateTime<Utc>,
}

/// Internal user representation including credentials
///
/// Used for database operations that need the password hash or the stored
/// refresh token. Never exposed in API responses.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct UserRecord {
    pub id: Uuid,
    pub username: String,

    /// bcrypt hashed password
    pub password_hash: String,

    /// Currently valid refresh token, if any (single active token per user)
    pub refresh_token: Option<String>,

    pub confirmed: bool,
    pub avatar: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<UserRecord> for User {
    /// Strip credentials before anything leaves the service layer.
    fn from(record: UserRecord) -> Self {
        User {
            id: record.id,
            username: record.username,
            confirmed: record.confirmed,
            avatar: record.avatar,
            created_at: record.created_at,
            updated_at: record.updated_at,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_user_record_conversion() {
        let record = UserRecord {
            id: Uuid::new_v4(),
            username: "smith@example.com".to_string(),
            password_hash: "hashed_password".to_string(),
            refresh_token: Some("stored_refresh_token".to_string()),
            confirmed: false,
            avatar: Some("https://example.com/avatar.jpg".to_string()),
            created_at: Utc::now(),
            updated_at: Utc::now(),
        };

        let user: User = record.into();

        assert_eq!(user.username, "smith@example.com");
        assert!(!user.confirmed);
        assert_eq!(
            user.avatar,
            Some("https://example.com/avatar.jpg".to_string())
        );
    }

    #[test]
    fn test_user_snapshot_round_trip() {
        let user = User {
            id: Uuid::new_v4(),
            username: "smith@example.com".to_string(),
            confirmed: true,
            avatar: None,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        };

        let json = serde_json::to_string(&user).unwrap();
        let restored: User = serde_json::from_str(&json).unwrap();
        assert_eq!(restored.id, user.id);
        assert_eq!(restored.username, user.username);
        assert!(restored.confirmed);
    }
}
