//! In-memory storage doubles for handler tests.
//!
//! Implement the storage traits over plain maps so the request flows can be
//! exercised without PostgreSQL or Redis.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use chrono::{Local, Utc};
use uuid::Uuid;

use crate::config::AuthConfig;
use crate::models::{Contact, ContactPayload, User};
use crate::models::user::UserRecord;
use crate::service::contacts::{
    birthday_in_window, ContactServiceError, ContactServiceResult, ContactStore,
};
use crate::service::user::{UserServiceError, UserServiceResult, UserStore};
use crate::service::{RequestLimiter, TokenService, UserCache};
use crate::utils::error::AppResult;

use super::handlers::AppState;

/// Map-backed user store keyed by username
#[derive(Default)]
pub(crate) struct InMemoryUsers {
    records: Mutex<HashMap<String, UserRecord>>,
}

#[async_trait]
impl UserStore for InMemoryUsers {
    async fn find_by_username(&self, username: &str) -> UserServiceResult<Option<UserRecord>> {
        Ok(self.records.lock().unwrap().get(username).cloned())
    }

    async fn create(
        &self,
        username: &str,
        password_hash: &str,
        avatar: Option<&str>,
    ) -> UserServiceResult<UserRecord> {
        let mut records = self.records.lock().unwrap();
        if records.contains_key(username) {
            return Err(UserServiceError::UsernameAlreadyExists);
        }

        let record = UserRecord {
            id: Uuid::new_v4(),
            username: username.to_string(),
            password_hash: password_hash.to_string(),
            refresh_token: None,
            confirmed: false,
            avatar: avatar.map(str::to_string),
            created_at: Utc::now(),
            updated_at: Utc::now(),
        };
        records.insert(username.to_string(), record.clone());
        Ok(record)
    }

    async fn set_confirmed(&self, username: &str) -> UserServiceResult<()> {
        let mut records = self.records.lock().unwrap();
        let record = records
            .get_mut(username)
            .ok_or(UserServiceError::UserNotFound)?;
        record.confirmed = true;
        Ok(())
    }

    async fn set_avatar(&self, username: &str, url: &str) -> UserServiceResult<UserRecord> {
        let mut records = self.records.lock().unwrap();
        let record = records
            .get_mut(username)
            .ok_or(UserServiceError::UserNotFound)?;
        record.avatar = Some(url.to_string());
        Ok(record.clone())
    }

    async fn set_refresh_token(
        &self,
        username: &str,
        refresh_token: Option<&str>,
    ) -> UserServiceResult<()> {
        let mut records = self.records.lock().unwrap();
        let record = records
            .get_mut(username)
            .ok_or(UserServiceError::UserNotFound)?;
        record.refresh_token = refresh_token.map(str::to_string);
        Ok(())
    }
}

/// Map-backed contact store with the same owner scoping as the SQL queries
#[derive(Default)]
pub(crate) struct InMemoryContacts {
    inner: Mutex<(i64, HashMap<i64, Contact>)>,
}

impl InMemoryContacts {
    fn owned(contact: Option<&Contact>, user_id: Uuid) -> ContactServiceResult<Contact> {
        contact
            .filter(|c| c.user_id == user_id)
            .cloned()
            .ok_or(ContactServiceError::ContactNotFound)
    }
}

#[async_trait]
impl ContactStore for InMemoryContacts {
    async fn list(
        &self,
        user_id: Uuid,
        skip: i64,
        limit: i64,
    ) -> ContactServiceResult<Vec<Contact>> {
        let inner = self.inner.lock().unwrap();
        let mut contacts: Vec<Contact> = inner
            .1
            .values()
            .filter(|c| c.user_id == user_id)
            .cloned()
            .collect();
        contacts.sort_by_key(|c| c.id);
        Ok(contacts
            .into_iter()
            .skip(skip.max(0) as usize)
            .take(limit.max(0) as usize)
            .collect())
    }

    async fn get(&self, user_id: Uuid, contact_id: i64) -> ContactServiceResult<Contact> {
        let inner = self.inner.lock().unwrap();
        Self::owned(inner.1.get(&contact_id), user_id)
    }

    async fn create(
        &self,
        user_id: Uuid,
        payload: &ContactPayload,
    ) -> ContactServiceResult<Contact> {
        let mut inner = self.inner.lock().unwrap();
        inner.0 += 1;
        let contact = Contact {
            id: inner.0,
            user_id,
            name: payload.name.clone(),
            lastname: payload.lastname.clone(),
            email: payload.email.clone(),
            phone: payload.phone.clone(),
            birthday: payload.birthday,
            additional: payload.additional.clone(),
            created_at: Utc::now(),
            updated_at: Utc::now(),
        };
        inner.1.insert(contact.id, contact.clone());
        Ok(contact)
    }

    async fn update(
        &self,
        user_id: Uuid,
        contact_id: i64,
        payload: &ContactPayload,
    ) -> ContactServiceResult<Contact> {
        let mut inner = self.inner.lock().unwrap();
        let existing = Self::owned(inner.1.get(&contact_id), user_id)?;
        let contact = Contact {
            name: payload.name.clone(),
            lastname: payload.lastname.clone(),
            email: payload.email.clone(),
            phone: payload.phone.clone(),
            birthday: payload.birthday,
            additional: payload.additional.clone(),
            updated_at: Utc::now(),
            ..existing
        };
        inner.1.insert(contact_id, contact.clone());
        Ok(contact)
    }

    async fn remove(&self, user_id: Uuid, contact_id: i64) -> ContactServiceResult<Contact> {
        let mut inner = self.inner.lock().unwrap();
        Self::owned(inner.1.get(&contact_id), user_id)?;
        Ok(inner.1.remove(&contact_id).unwrap())
    }

    async fn upcoming_birthdays(&self, user_id: Uuid) -> ContactServiceResult<Vec<Contact>> {
        let today = Local::now().date_naive();
        let inner = self.inner.lock().unwrap();
        Ok(inner
            .1
            .values()
            .filter(|c| c.user_id == user_id && birthday_in_window(c.birthday, today))
            .cloned()
            .collect())
    }

    async fn search(&self, user_id: Uuid, query: &str) -> ContactServiceResult<Vec<Contact>> {
        let needle = query.to_lowercase();
        let inner = self.inner.lock().unwrap();
        Ok(inner
            .1
            .values()
            .filter(|c| {
                c.user_id == user_id
                    && (c.name.to_lowercase().contains(&needle)
                        || c.lastname.to_lowercase().contains(&needle)
                        || c.email.to_lowercase().contains(&needle))
            })
            .cloned()
            .collect())
    }
}

/// Cache that always loads through the user store
pub(crate) struct PassthroughCache;

#[async_trait]
impl UserCache for PassthroughCache {
    async fn resolve(&self, username: &str, users: &dyn UserStore) -> AppResult<Option<User>> {
        Ok(users.find_by_username(username).await?.map(User::from))
    }

    async fn invalidate(&self, _username: &str) {}
}

/// Limiter that admits every request
pub(crate) struct Unlimited;

#[async_trait]
impl RequestLimiter for Unlimited {
    async fn check(&self, _client_key: &str, _route: &str) -> AppResult<()> {
        Ok(())
    }
}

/// Application state wired entirely from in-memory doubles
pub(crate) fn test_state() -> AppState {
    AppState {
        users: Arc::new(InMemoryUsers::default()),
        contacts: Arc::new(InMemoryContacts::default()),
        tokens: Arc::new(TokenService::new(&AuthConfig {
            secret: "test_secret_key".to_string(),
            access_token_expires_minutes: 15,
            refresh_token_expires_days: 7,
            email_token_expires_days: 7,
        })),
        session_cache: Arc::new(PassthroughCache),
        rate_limiter: Arc::new(Unlimited),
        mailer: None,
        media: None,
        base_url: "http://localhost:8000".to_string(),
    }
}
