//! HTTP Request Handlers
//!
//! Axum handlers for the auth endpoints and the health banner, plus the
//! shared application state.

use std::sync::Arc;

use axum::{
    extract::{Path, State},
    http::{HeaderMap, StatusCode},
    Form, Json,
};
use log::warn;
use serde_json::{json, Value};
use validator::Validate;

use crate::{
    models::{
        LoginForm, MessageResponse, RequestEmail, SignupRequest, SignupResponse, TokenPair,
        TokenScope, User,
    },
    service::{
        ContactStore, EmailService, MediaStorage, RequestLimiter, TokenService, UserCache,
        UserStore,
    },
    utils::{
        error::{AppError, AppResult},
        security::{gravatar_url, hash_password, verify_password},
        validation::normalize_email,
    },
    VERSION,
};

use super::middleware::bearer_token;

/// Application state shared across handlers and middleware
#[derive(Clone)]
pub struct AppState {
    pub users: Arc<dyn UserStore>,
    pub contacts: Arc<dyn ContactStore>,
    pub tokens: Arc<TokenService>,
    pub session_cache: Arc<dyn UserCache>,
    pub rate_limiter: Arc<dyn RequestLimiter>,
    /// Absent when SMTP is not configured; confirmation mail is then skipped
    pub mailer: Option<Arc<EmailService>>,
    /// Absent when the image host is not configured
    pub media: Option<Arc<MediaStorage>>,
    /// Public base URL used in confirmation links
    pub base_url: String,
}

/// Service banner
pub async fn health_check() -> Json<Value> {
    Json(json!({
        "message": "Contacts service is running",
        "version": VERSION,
    }))
}

/// Create a new account and dispatch the confirmation email.
///
/// The email send is detached from the request: it runs after the response
/// is returned and its failure is logged, never surfaced.
pub async fn signup(
    State(state): State<AppState>,
    Json(request): Json<SignupRequest>,
) -> AppResult<(StatusCode, Json<SignupResponse>)> {
    request
        .validate()
        .map_err(|e| AppError::Validation(format!("Invalid signup data: {}", e)))?;

    let username = normalize_email(&request.username);

    if state.users.find_by_username(&username).await?.is_some() {
        return Err(AppError::Conflict("Account already exist".to_string()));
    }

    // Best-effort default avatar; the account is created either way
    let avatar = Some(gravatar_url(&username));

    let password_hash = hash_password(&request.password)?;
    let record = state
        .users
        .create(&username, &password_hash, avatar.as_deref())
        .await?;

    dispatch_confirmation_email(&state, &username);

    let response = SignupResponse {
        user: User::from(record),
        detail: "User successfully created. Check your email for confirmation.".to_string(),
    };

    Ok((StatusCode::CREATED, Json(response)))
}

/// Log in with username and password (form payload).
///
/// Failure reasons are distinguished for caller diagnostics: unknown user,
/// unconfirmed email, and wrong password each get their own message.
pub async fn login(
    State(state): State<AppState>,
    Form(form): Form<LoginForm>,
) -> AppResult<Json<TokenPair>> {
    let username = normalize_email(&form.username);

    let user = state
        .users
        .find_by_username(&username)
        .await?
        .ok_or_else(|| AppError::Authentication("Invalid username".to_string()))?;

    if !user.confirmed {
        return Err(AppError::Authentication("Email not confirmed".to_string()));
    }

    if !verify_password(&form.password, &user.password_hash)? {
        return Err(AppError::Authentication("Invalid password".to_string()));
    }

    let pair = issue_token_pair(&state, &username).await?;
    Ok(Json(pair))
}

/// Exchange a refresh token for a new access/refresh pair.
///
/// The presented token must match the single refresh token stored on the
/// user row; a mismatch revokes the stored token and fails.
pub async fn refresh_token(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> AppResult<Json<TokenPair>> {
    let token = bearer_token(&headers)?;
    let username = state.tokens.validate(token, TokenScope::Refresh)?;

    let user = state
        .users
        .find_by_username(&username)
        .await?
        .ok_or_else(|| AppError::Authentication("Could not validate credentials".to_string()))?;

    if user.refresh_token.as_deref() != Some(token) {
        state.users.set_refresh_token(&username, None).await?;
        return Err(AppError::Authentication(
            "Invalid refresh token".to_string(),
        ));
    }

    let pair = issue_token_pair(&state, &username).await?;
    Ok(Json(pair))
}

/// Consume an email-verify token and confirm the address.
///
/// Confirming twice is a no-op success.
pub async fn confirmed_email(
    State(state): State<AppState>,
    Path(token): Path<String>,
) -> AppResult<Json<MessageResponse>> {
    let email = state
        .tokens
        .validate(&token, TokenScope::EmailVerify)
        .map_err(|_| {
            AppError::Validation("Invalid token for email verification".to_string())
        })?;

    let user = state
        .users
        .find_by_username(&email)
        .await?
        .ok_or_else(|| AppError::BadRequest("Verification error".to_string()))?;

    if user.confirmed {
        return Ok(Json(MessageResponse::new("Your email is already confirmed")));
    }

    state.users.set_confirmed(&email).await?;
    state.session_cache.invalidate(&email).await;

    Ok(Json(MessageResponse::new("Email confirmed")))
}

/// Re-send the confirmation email for an unconfirmed account.
///
/// The response does not reveal whether the address is registered.
pub async fn request_email(
    State(state): State<AppState>,
    Json(request): Json<RequestEmail>,
) -> AppResult<Json<MessageResponse>> {
    request
        .validate()
        .map_err(|e| AppError::Validation(format!("Invalid email: {}", e)))?;

    let email = normalize_email(&request.email);

    match state.users.find_by_username(&email).await? {
        Some(user) if user.confirmed => {
            return Ok(Json(MessageResponse::new("Your email is already confirmed")));
        }
        Some(_) => dispatch_confirmation_email(&state, &email),
        None => {}
    }

    Ok(Json(MessageResponse::new("Check your email for confirmation.")))
}

/// Issue a fresh token pair and persist the refresh token on the user row
async fn issue_token_pair(state: &AppState, username: &str) -> AppResult<TokenPair> {
    let access = state.tokens.issue_access_token(username)?;
    let refresh = state.tokens.issue_refresh_token(username)?;

    state
        .users
        .set_refresh_token(username, Some(&refresh))
        .await?;

    Ok(TokenPair::new(access, refresh))
}

/// Spawn the fire-and-forget confirmation email send.
///
/// Runs after the response is returned; failure is logged, never retried.
fn dispatch_confirmation_email(state: &AppState, username: &str) {
    let Some(mailer) = state.mailer.clone() else {
        warn!("SMTP not configured, skipping confirmation email for {}", username);
        return;
    };

    let token = match state.tokens.issue_email_token(username) {
        Ok(token) => token,
        Err(e) => {
            warn!("Failed to issue email token for {}: {}", username, e);
            return;
        }
    };

    let username = username.to_string();
    let base_url = state.base_url.clone();
    tokio::spawn(async move {
        if let Err(e) = mailer
            .send_confirmation_email(&username, &base_url, &token)
            .await
        {
            warn!("Confirmation email to {} failed: {}", username, e);
        }
    });
}
