//! Data Models Module
//!
//! This module contains all data structures used throughout the contacts
//! service: user and contact entities, token claims, and request/response
//! payloads with their validation rules.

pub mod auth;
pub mod contact;
pub mod requests;
pub mod user;

// Re-export commonly used types
pub use auth::{Claims, TokenPair, TokenScope};
pub use contact::Contact;
pub use requests::*;
pub use user::{User, UserRecord};
