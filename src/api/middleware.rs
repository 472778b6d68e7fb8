//! Request Middleware
//!
//! Bearer-token authentication and fixed-window rate limiting applied to
//! the protected contact/user routes.

use axum::{
    extract::{ConnectInfo, Request, State},
    http::{header::AUTHORIZATION, HeaderMap},
    middleware::Next,
    response::Response,
};
use std::net::SocketAddr;

use crate::models::{TokenScope, User};
use crate::service::{RequestLimiter, UserCache};
use crate::utils::error::AppError;

use super::handlers::AppState;

/// Extension type carrying the authenticated user through the request
#[derive(Debug, Clone)]
pub struct CurrentUser(pub User);

/// Extract the token from a `Bearer` Authorization header
pub fn bearer_token(headers: &HeaderMap) -> Result<&str, AppError> {
    let auth_header = headers
        .get(AUTHORIZATION)
        .and_then(|header| header.to_str().ok())
        .ok_or_else(|| AppError::Authentication("Missing Authorization header".into()))?;

    auth_header
        .strip_prefix("Bearer ")
        .ok_or_else(|| AppError::Authentication("Invalid Authorization header format".into()))
}

/// Authentication middleware for protected routes.
///
/// Validates the bearer access token, resolves the acting user through the
/// session cache (database on miss), and stores the user in request
/// extensions for the handlers.
pub async fn auth_middleware(
    State(state): State<AppState>,
    headers: HeaderMap,
    mut request: Request,
    next: Next,
) -> Result<Response, AppError> {
    let token = bearer_token(&headers)?;

    let username = state
        .tokens
        .validate(token, TokenScope::Access)
        .map_err(|_| AppError::Authentication("Could not validate credentials".into()))?;

    let user = state
        .session_cache
        .resolve(&username, state.users.as_ref())
        .await?
        .ok_or_else(|| AppError::Authentication("Could not validate credentials".into()))?;

    request.extensions_mut().insert(CurrentUser(user));

    Ok(next.run(request).await)
}

/// Fixed-window rate limiting middleware, keyed by client IP and route.
///
/// Runs before authentication so excess traffic is dropped without any
/// database work.
pub async fn rate_limit_middleware(
    State(state): State<AppState>,
    request: Request,
    next: Next,
) -> Result<Response, AppError> {
    let client_key = client_key(&request);
    let route = request.uri().path().to_string();

    state.rate_limiter.check(&client_key, &route).await?;

    Ok(next.run(request).await)
}

/// Client identity for rate limiting: X-Forwarded-For when present (the
/// service normally sits behind a proxy), else the peer address.
fn client_key(request: &Request) -> String {
    if let Some(forwarded) = request
        .headers()
        .get("x-forwarded-for")
        .and_then(|v| v.to_str().ok())
    {
        if let Some(first) = forwarded.split(',').next() {
            let first = first.trim();
            if !first.is_empty() {
                return first.to_string();
            }
        }
    }

    request
        .extensions()
        .get::<ConnectInfo<SocketAddr>>()
        .map(|info| info.0.ip().to_string())
        .unwrap_or_else(|| "unknown".to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::{
        body::Body,
        http::{HeaderValue, Method, Request},
    };
    use chrono::Utc;
    use uuid::Uuid;

    fn test_user() -> User {
        User {
            id: Uuid::new_v4(),
            username: "smith@example.com".to_string(),
            confirmed: true,
            avatar: None,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    #[test]
    fn test_bearer_token_missing_header() {
        let headers = HeaderMap::new();
        assert!(matches!(
            bearer_token(&headers),
            Err(AppError::Authentication(_))
        ));
    }

    #[test]
    fn test_bearer_token_wrong_scheme() {
        let mut headers = HeaderMap::new();
        headers.insert(AUTHORIZATION, HeaderValue::from_static("Basic abc123"));
        assert!(matches!(
            bearer_token(&headers),
            Err(AppError::Authentication(_))
        ));
    }

    #[test]
    fn test_bearer_token_extracts_token() {
        let mut headers = HeaderMap::new();
        headers.insert(AUTHORIZATION, HeaderValue::from_static("Bearer the-token"));
        assert_eq!(bearer_token(&headers).unwrap(), "the-token");
    }

    #[test]
    fn test_current_user_round_trips_through_extensions() {
        let user = test_user();
        let mut request = Request::builder()
            .method(Method::GET)
            .uri("/test")
            .body(Body::empty())
            .unwrap();

        request.extensions_mut().insert(CurrentUser(user.clone()));

        let CurrentUser(extracted) = request.extensions().get::<CurrentUser>().unwrap();
        assert_eq!(extracted.id, user.id);
        assert_eq!(extracted.username, user.username);
    }

    #[test]
    fn test_client_key_prefers_forwarded_header() {
        let request = Request::builder()
            .method(Method::GET)
            .uri("/api/contacts/")
            .header("x-forwarded-for", "203.0.113.9, 10.0.0.1")
            .body(Body::empty())
            .unwrap();

        assert_eq!(client_key(&request), "203.0.113.9");
    }

    #[test]
    fn test_client_key_unknown_without_peer_info() {
        let request = Request::builder()
            .method(Method::GET)
            .uri("/api/contacts/")
            .body(Body::empty())
            .unwrap();

        assert_eq!(client_key(&request), "unknown");
    }
}
