//! Security Utilities
//!
//! Password hashing and the gravatar default-avatar derivation.

use bcrypt::{hash, verify, DEFAULT_COST};
use md5::{Digest, Md5};

/// Default bcrypt cost for password hashing
pub const DEFAULT_BCRYPT_COST: u32 = DEFAULT_COST;

/// Hash a password using bcrypt
pub fn hash_password(password: &str) -> Result<String, bcrypt::BcryptError> {
    hash_password_with_cost(password, DEFAULT_BCRYPT_COST)
}

/// Hash a password with custom bcrypt cost
pub fn hash_password_with_cost(password: &str, cost: u32) -> Result<String, bcrypt::BcryptError> {
    hash(password, cost)
}

/// Verify a password against its hash
pub fn verify_password(password: &str, hash: &str) -> Result<bool, bcrypt::BcryptError> {
    verify(password, hash)
}

/// Derive the gravatar URL for an email address.
///
/// Gravatar keys images by the MD5 of the trimmed, lowercased address. Used
/// as the best-effort default avatar at signup.
pub fn gravatar_url(email: &str) -> String {
    let normalized = email.trim().to_lowercase();
    let digest = Md5::digest(normalized.as_bytes());
    format!("https://www.gravatar.com/avatar/{:x}", digest)
}
