//! Contact Handlers
//!
//! CRUD, birthday lookup, and search endpoints over the caller's contacts.
//! Every operation is scoped to the authenticated user; contacts owned by
//! someone else surface as not-found.

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Extension, Json,
};
use validator::Validate;

use crate::models::{Contact, ContactPayload, ListQuery, SearchQuery};
use crate::service::ContactStore;
use crate::utils::error::{AppError, AppResult};

use super::handlers::AppState;
use super::middleware::CurrentUser;

/// List the caller's contacts with offset/limit pagination
pub async fn list_contacts(
    State(state): State<AppState>,
    Extension(CurrentUser(user)): Extension<CurrentUser>,
    Query(query): Query<ListQuery>,
) -> AppResult<Json<Vec<Contact>>> {
    let contacts = state.contacts.list(user.id, query.skip, query.limit).await?;
    Ok(Json(contacts))
}

/// Create a contact for the caller
pub async fn create_contact(
    State(state): State<AppState>,
    Extension(CurrentUser(user)): Extension<CurrentUser>,
    Json(payload): Json<ContactPayload>,
) -> AppResult<(StatusCode, Json<Contact>)> {
    payload
        .validate()
        .map_err(|e| AppError::Validation(format!("Invalid contact data: {}", e)))?;

    let contact = state.contacts.create(user.id, &payload).await?;
    Ok((StatusCode::CREATED, Json(contact)))
}

/// Fetch a single contact by id
pub async fn get_contact(
    State(state): State<AppState>,
    Extension(CurrentUser(user)): Extension<CurrentUser>,
    Path(contact_id): Path<i64>,
) -> AppResult<Json<Contact>> {
    let contact = state.contacts.get(user.id, contact_id).await?;
    Ok(Json(contact))
}

/// Fully replace a contact's fields
pub async fn update_contact(
    State(state): State<AppState>,
    Extension(CurrentUser(user)): Extension<CurrentUser>,
    Path(contact_id): Path<i64>,
    Json(payload): Json<ContactPayload>,
) -> AppResult<Json<Contact>> {
    payload
        .validate()
        .map_err(|e| AppError::Validation(format!("Invalid contact data: {}", e)))?;

    let contact = state.contacts.update(user.id, contact_id, &payload).await?;
    Ok(Json(contact))
}

/// Delete a contact; responds with the removed record
pub async fn remove_contact(
    State(state): State<AppState>,
    Extension(CurrentUser(user)): Extension<CurrentUser>,
    Path(contact_id): Path<i64>,
) -> AppResult<Json<Contact>> {
    let contact = state.contacts.remove(user.id, contact_id).await?;
    Ok(Json(contact))
}

/// Contacts with a birthday in the next seven days, inclusive
pub async fn upcoming_birthdays(
    State(state): State<AppState>,
    Extension(CurrentUser(user)): Extension<CurrentUser>,
) -> AppResult<Json<Vec<Contact>>> {
    let contacts = state.contacts.upcoming_birthdays(user.id).await?;
    Ok(Json(contacts))
}

/// Case-insensitive substring search on name, lastname, or email
pub async fn search_contacts(
    State(state): State<AppState>,
    Extension(CurrentUser(user)): Extension<CurrentUser>,
    Query(query): Query<SearchQuery>,
) -> AppResult<Json<Vec<Contact>>> {
    let contacts = state.contacts.search(user.id, &query.q).await?;
    Ok(Json(contacts))
}
