//! Service Layer
//!
//! Business logic and data access layer for the contacts service.

pub mod cache;
pub mod contacts;
pub mod email;
pub mod media;
pub mod rate_limit;
pub mod token;
pub mod user;

// Re-export services and their storage traits
pub use cache::{SessionCache, UserCache};
pub use contacts::{ContactService, ContactStore};
pub use email::EmailService;
pub use media::MediaStorage;
pub use rate_limit::{RateLimiter, RequestLimiter};
pub use token::{TokenError, TokenService};
pub use user::{UserService, UserStore};
