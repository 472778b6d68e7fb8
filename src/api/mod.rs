//! API Layer
//!
//! HTTP API endpoints, middleware, and request handling for the contacts
//! service.

pub mod contact_handlers;
pub mod handlers;
pub mod middleware;
pub mod routes;
pub mod user_handlers;

#[cfg(test)]
pub(crate) mod test_doubles;

// Re-export commonly used types
pub use handlers::AppState;
pub use middleware::{auth_middleware, rate_limit_middleware, CurrentUser};
pub use routes::create_routes;
