//! Contacts Service Library
//!
//! A personal-contacts management API: signup/login with email
//! confirmation, JWT-based sessions with purpose-tagged tokens, per-user
//! contacts CRUD with birthday lookups and text search, and avatar upload
//! to an external image host.
//!
//! # Features
//!
//! - **Authentication**: bcrypt-hashed passwords, access/refresh token
//!   pairs, single active refresh token per user
//! - **Email confirmation**: signed email-verify tokens delivered by a
//!   fire-and-forget SMTP dispatch
//! - **Per-user contacts**: every repository query is scoped to the owning
//!   user; foreign contacts are indistinguishable from missing ones
//! - **Rate limiting**: Redis-backed fixed window counters on all
//!   protected routes
//! - **Session cache**: short-TTL Redis snapshots of resolved users
//!
//! # Quick Start
//!
//! ```rust,no_run
//! use contacts_service::{
//!     api::{create_routes, AppState},
//!     config::AppConfig,
//! };
//!
//! # async fn run() -> Result<(), Box<dyn std::error::Error>> {
//! let config = AppConfig::from_env()?;
//! config.validate()?;
//! // ... build pools, services, and state, then:
//! // let app = create_routes(state);
//! # Ok(())
//! # }
//! ```

/// HTTP API layer with handlers, middleware, and routing
pub mod api;

/// Configuration management for all service settings
pub mod config;

/// Database connection management and configuration
pub mod database;

/// Data models and request/response structures
pub mod models;

/// Business logic: tokens, users, contacts, cache, rate limiting, mail
pub mod service;

/// Shared utilities for security, validation, and error handling
pub mod utils;

// Re-export commonly used types for convenient access
pub use api::{create_routes, AppState, CurrentUser};
pub use config::{AppConfig, AuthConfig, RateLimitConfig, ServerConfig};
pub use database::{DatabaseConfig, DatabasePool};
pub use models::{
    auth::{Claims, TokenPair, TokenScope},
    contact::Contact,
    requests::{ContactPayload, ListQuery, SearchQuery, SignupRequest},
    user::User,
};
pub use service::{
    ContactService, ContactStore, EmailService, MediaStorage, RateLimiter, RequestLimiter,
    SessionCache, TokenService, UserCache, UserService, UserStore,
};
pub use utils::error::{AppError, AppResult, ErrorResponse};

/// Library version from Cargo.toml
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
