//! Error Handling Utilities
//!
//! Application-wide error types and their HTTP response mapping.

use axum::{
    http::{header::RETRY_AFTER, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use std::fmt;
use thiserror::Error;

/// Main application error type that can represent errors from any feature
#[derive(Error, Debug)]
pub enum AppError {
    /// Database-related errors
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    /// Redis cache / counting store errors
    #[error("Cache error: {0}")]
    Cache(#[from] redis::RedisError),

    /// Validation errors for user input
    #[error("Validation error: {0}")]
    Validation(String),

    /// Malformed or unusable request outside schema validation
    #[error("Bad request: {0}")]
    BadRequest(String),

    /// Authentication and authorization errors (bad credentials, bad or
    /// expired token, unconfirmed email)
    #[error("Authentication error: {0}")]
    Authentication(String),

    /// Resource not found errors; also covers ownership-masked lookups
    #[error("Resource not found: {0}")]
    NotFound(String),

    /// Conflict errors (e.g. duplicate username)
    #[error("Conflict: {0}")]
    Conflict(String),

    /// Fixed-window rate limit exceeded; carries seconds until the window rolls
    #[error("Rate limit exceeded, retry in {retry_after}s")]
    RateLimited { retry_after: u64 },

    /// External service errors (image host, SMTP)
    #[error("External service error: {0}")]
    ExternalService(String),

    /// Generic internal server errors
    #[error("Internal server error: {0}")]
    Internal(String),

    /// Configuration errors
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// Password hashing errors
    #[error("Password hashing error: {0}")]
    Hashing(#[from] bcrypt::BcryptError),
}

/// Standard error response structure for API endpoints
#[derive(Serialize, Debug)]
pub struct ErrorResponse {
    pub error: String,
    pub message: String,
}

impl ErrorResponse {
    pub fn new(error: &str, message: &str) -> Self {
        Self {
            error: error.to_string(),
            message: message.to_string(),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, error_code, message) = match self {
            AppError::Database(_) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                "DATABASE_ERROR",
                "A database error occurred".to_string(),
            ),
            AppError::Cache(_) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                "CACHE_ERROR",
                "A cache error occurred".to_string(),
            ),
            AppError::Validation(msg) => {
                (StatusCode::UNPROCESSABLE_ENTITY, "VALIDATION_ERROR", msg)
            }
            AppError::BadRequest(msg) => (StatusCode::BAD_REQUEST, "BAD_REQUEST", msg),
            AppError::Authentication(msg) => {
                (StatusCode::UNAUTHORIZED, "AUTHENTICATION_ERROR", msg)
            }
            AppError::NotFound(msg) => (StatusCode::NOT_FOUND, "NOT_FOUND", msg),
            AppError::Conflict(msg) => (StatusCode::CONFLICT, "CONFLICT", msg),
            AppError::RateLimited { retry_after } => {
                let body = ErrorResponse::new(
                    "RATE_LIMIT_EXCEEDED",
                    "No more than 10 requests per minute",
                );
                return (
                    StatusCode::TOO_MANY_REQUESTS,
                    [(RETRY_AFTER, retry_after.to_string())],
                    Json(body),
                )
                    .into_response();
            }
            AppError::ExternalService(_) => (
                StatusCode::BAD_GATEWAY,
                "EXTERNAL_SERVICE_ERROR",
                "External service unavailable".to_string(),
            ),
            AppError::Internal(_) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                "INTERNAL_ERROR",
                "An internal server error occurred".to_string(),
            ),
            AppError::Configuration(_) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                "CONFIGURATION_ERROR",
                "Server configuration error".to_string(),
            ),
            AppError::Hashing(_) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                "HASHING_ERROR",
                "Password hashing error".to_string(),
            ),
        };

        let error_response = ErrorResponse::new(error_code, &message);
        (status, Json(error_response)).into_response()
    }
}

/// Result type alias for operations that can return AppError
pub type AppResult<T> = Result<T, AppError>;

/// Helper trait for converting other error types to AppError
pub trait IntoAppError<T> {
    fn into_app_error(self, context: &str) -> AppResult<T>;
}

impl<T, E> IntoAppError<T> for Result<T, E>
where
    E: fmt::Display,
{
    fn into_app_error(self, context: &str) -> AppResult<T> {
        self.map_err(|e| AppError::Internal(format!("{}: {}", context, e)))
    }
}
