//! Contact Service
//!
//! Per-user scoped CRUD and query operations over contact records. Every
//! statement filters on the owning user id, so a contact owned by another
//! user is indistinguishable from one that does not exist.

use async_trait::async_trait;
use chrono::{Datelike, Duration, Local, NaiveDate};
use sqlx::PgPool;
use thiserror::Error;
use uuid::Uuid;

use crate::models::{Contact, ContactPayload};
use crate::utils::error::AppError;

/// Custom error types for the contact service
#[derive(Error, Debug)]
pub enum ContactServiceError {
    /// Contact missing or owned by another user
    #[error("Contact not found")]
    ContactNotFound,

    /// Database operation failed
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),
}

impl From<ContactServiceError> for AppError {
    fn from(err: ContactServiceError) -> Self {
        match err {
            ContactServiceError::ContactNotFound => {
                AppError::NotFound("Contact not found".to_string())
            }
            ContactServiceError::Database(e) => AppError::Database(e),
        }
    }
}

/// Result type for contact service operations
pub type ContactServiceResult<T> = Result<T, ContactServiceError>;

/// Storage operations over a user's contacts.
///
/// Every operation is scoped to the owning user id; a contact owned by
/// another user must surface as [`ContactServiceError::ContactNotFound`].
/// Dyn-compatible so handlers can run against an in-memory store in tests.
#[async_trait]
pub trait ContactStore: Send + Sync {
    /// Paginated listing in storage default order
    async fn list(&self, user_id: Uuid, skip: i64, limit: i64)
        -> ContactServiceResult<Vec<Contact>>;

    /// Fetch a single contact if it exists and belongs to the caller
    async fn get(&self, user_id: Uuid, contact_id: i64) -> ContactServiceResult<Contact>;

    /// Insert a new contact and return it with its generated id
    async fn create(&self, user_id: Uuid, payload: &ContactPayload)
        -> ContactServiceResult<Contact>;

    /// Full replace of all fields if the contact is found and owned
    async fn update(
        &self,
        user_id: Uuid,
        contact_id: i64,
        payload: &ContactPayload,
    ) -> ContactServiceResult<Contact>;

    /// Delete the contact if it is found and owned; returns the deleted row
    async fn remove(&self, user_id: Uuid, contact_id: i64) -> ContactServiceResult<Contact>;

    /// Contacts whose birthday falls within the next seven days, inclusive
    async fn upcoming_birthdays(&self, user_id: Uuid) -> ContactServiceResult<Vec<Contact>>;

    /// Case-insensitive substring search on name, lastname, or email
    async fn search(&self, user_id: Uuid, query: &str) -> ContactServiceResult<Vec<Contact>>;
}

const CONTACT_COLUMNS: &str =
    "id, user_id, name, lastname, email, phone, birthday, additional, created_at, updated_at";

/// Number of days ahead the birthday lookup covers, endpoint inclusive
const BIRTHDAY_WINDOW_DAYS: i64 = 7;

/// Repository for per-user contact records
#[derive(Clone)]
pub struct ContactService {
    db_pool: PgPool,
}

impl ContactService {
    /// Creates a new ContactService backed by the given connection pool
    pub fn new(db_pool: PgPool) -> Self {
        Self { db_pool }
    }
}

#[async_trait]
impl ContactStore for ContactService {
    async fn list(
        &self,
        user_id: Uuid,
        skip: i64,
        limit: i64,
    ) -> ContactServiceResult<Vec<Contact>> {
        let contacts = sqlx::query_as::<_, Contact>(&format!(
            "SELECT {CONTACT_COLUMNS} FROM contacts WHERE user_id = $1 OFFSET $2 LIMIT $3"
        ))
        .bind(user_id)
        .bind(skip.max(0))
        .bind(limit.clamp(0, 1000))
        .fetch_all(&self.db_pool)
        .await?;

        Ok(contacts)
    }

    async fn get(&self, user_id: Uuid, contact_id: i64) -> ContactServiceResult<Contact> {
        let contact = sqlx::query_as::<_, Contact>(&format!(
            "SELECT {CONTACT_COLUMNS} FROM contacts WHERE id = $1 AND user_id = $2"
        ))
        .bind(contact_id)
        .bind(user_id)
        .fetch_optional(&self.db_pool)
        .await?
        .ok_or(ContactServiceError::ContactNotFound)?;

        Ok(contact)
    }

    async fn create(
        &self,
        user_id: Uuid,
        payload: &ContactPayload,
    ) -> ContactServiceResult<Contact> {
        let contact = sqlx::query_as::<_, Contact>(&format!(
            "INSERT INTO contacts (user_id, name, lastname, email, phone, birthday, additional)
             VALUES ($1, $2, $3, $4, $5, $6, $7)
             RETURNING {CONTACT_COLUMNS}"
        ))
        .bind(user_id)
        .bind(&payload.name)
        .bind(&payload.lastname)
        .bind(&payload.email)
        .bind(&payload.phone)
        .bind(payload.birthday)
        .bind(&payload.additional)
        .fetch_one(&self.db_pool)
        .await?;

        Ok(contact)
    }

    async fn update(
        &self,
        user_id: Uuid,
        contact_id: i64,
        payload: &ContactPayload,
    ) -> ContactServiceResult<Contact> {
        let contact = sqlx::query_as::<_, Contact>(&format!(
            "UPDATE contacts
             SET name = $3, lastname = $4, email = $5, phone = $6, birthday = $7,
                 additional = $8, updated_at = NOW()
             WHERE id = $1 AND user_id = $2
             RETURNING {CONTACT_COLUMNS}"
        ))
        .bind(contact_id)
        .bind(user_id)
        .bind(&payload.name)
        .bind(&payload.lastname)
        .bind(&payload.email)
        .bind(&payload.phone)
        .bind(payload.birthday)
        .bind(&payload.additional)
        .fetch_optional(&self.db_pool)
        .await?
        .ok_or(ContactServiceError::ContactNotFound)?;

        Ok(contact)
    }

    async fn remove(&self, user_id: Uuid, contact_id: i64) -> ContactServiceResult<Contact> {
        let contact = sqlx::query_as::<_, Contact>(&format!(
            "DELETE FROM contacts WHERE id = $1 AND user_id = $2 RETURNING {CONTACT_COLUMNS}"
        ))
        .bind(contact_id)
        .bind(user_id)
        .fetch_optional(&self.db_pool)
        .await?
        .ok_or(ContactServiceError::ContactNotFound)?;

        Ok(contact)
    }

    /// Birthdays are projected into the current year for the comparison, so
    /// the window does not wrap across the year boundary: in the last week
    /// of December, early-January birthdays are not reported.
    async fn upcoming_birthdays(&self, user_id: Uuid) -> ContactServiceResult<Vec<Contact>> {
        let contacts = sqlx::query_as::<_, Contact>(&format!(
            "SELECT {CONTACT_COLUMNS} FROM contacts WHERE user_id = $1"
        ))
        .bind(user_id)
        .fetch_all(&self.db_pool)
        .await?;

        let today = Local::now().date_naive();
        Ok(contacts
            .into_iter()
            .filter(|c| birthday_in_window(c.birthday, today))
            .collect())
    }

    async fn search(&self, user_id: Uuid, query: &str) -> ContactServiceResult<Vec<Contact>> {
        let pattern = format!("%{}%", query);

        let contacts = sqlx::query_as::<_, Contact>(&format!(
            "SELECT {CONTACT_COLUMNS} FROM contacts
             WHERE user_id = $1
               AND (name ILIKE $2 OR lastname ILIKE $2 OR email ILIKE $2)"
        ))
        .bind(user_id)
        .bind(&pattern)
        .fetch_all(&self.db_pool)
        .await?;

        Ok(contacts)
    }
}

/// Whether a birthday, projected into `today`'s year, falls within
/// `[today, today + 7 days]` inclusive.
///
/// Feb 29 birthdays are skipped in non-leap years.
pub(crate) fn birthday_in_window(birthday: NaiveDate, today: NaiveDate) -> bool {
    let window_end = today + Duration::days(BIRTHDAY_WINDOW_DAYS);
    match birthday.with_year(today.year()) {
        Some(projected) => projected >= today && projected <= window_end,
        None => false,
    }
}
