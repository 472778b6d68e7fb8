//! Contact Model
//!
//! Contact records owned by exactly one user.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A single contact entry
///
/// The owning `user_id` is kept for internal scoping but never serialized
/// into API responses.
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct Contact {
    /// Unique identifier, generated by the database
    pub id: i64,

    /// Owning user; every repository query filters on this
    #[serde(skip_serializing)]
    pub user_id: Uuid,

    /// First name
    pub name: String,

    /// Last name
    pub lastname: String,

    /// Contact's email address
    pub email: String,

    /// Contact's phone number
    pub phone: String,

    /// Calendar date of birth
    pub birthday: NaiveDate,

    /// Optional free-text note
    pub additional: Option<String>,

    /// Timestamp when the contact was created
    pub created_at: DateTime<Utc>,

    /// Timestamp when the contact was last modified
    pub updated_at: DateTime<Utc>,
}
