//! Authentication Models
//!
//! Claim sets and token payloads for the JWT-based session handling.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Purpose tag carried in every token's `scope` claim
///
/// A token is only accepted where its purpose matches what the endpoint
/// expects; a refresh token presented as an access token is rejected.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TokenScope {
    /// Short-lived credential authorizing API calls
    #[serde(rename = "access_token")]
    Access,

    /// Longer-lived credential exchanged for a new access/refresh pair
    #[serde(rename = "refresh_token")]
    Refresh,

    /// Single-purpose token proving control of an email address
    #[serde(rename = "email_token")]
    EmailVerify,
}

impl TokenScope {
    pub fn as_str(&self) -> &'static str {
        match self {
            TokenScope::Access => "access_token",
            TokenScope::Refresh => "refresh_token",
            TokenScope::EmailVerify => "email_token",
        }
    }
}

/// Signed claim set shared by all token purposes
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    /// Subject: the user's username (email)
    pub sub: String,

    /// Issued-at, seconds since epoch
    pub iat: i64,

    /// Expiry, seconds since epoch
    pub exp: i64,

    /// Purpose tag
    pub scope: TokenScope,
}

impl Claims {
    pub fn new(subject: &str, scope: TokenScope, issued_at: DateTime<Utc>, expires_at: DateTime<Utc>) -> Self {
        Self {
            sub: subject.to_string(),
            iat: issued_at.timestamp(),
            exp: expires_at.timestamp(),
            scope,
        }
    }
}

/// JWT token pair returned on login and refresh
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TokenPair {
    /// Short-lived access token for API authentication
    pub access_token: String,

    /// Long-lived refresh token for obtaining new pairs
    pub refresh_token: String,

    /// Token type (always "bearer")
    pub token_type: String,
}

impl TokenPair {
    pub fn new(access_token: String, refresh_token: String) -> Self {
        Self {
            access_token,
            refresh_token,
            token_type: "bearer".to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    #[test]
    fn test_scope_serialization() {
        assert_eq!(
            serde_json::to_string(&TokenScope::Access).unwrap(),
            "\"access_token\""
        );
        assert_eq!(
            serde_json::to_string(&TokenScope::Refresh).unwrap(),
            "\"refresh_token\""
        );
        assert_eq!(
            serde_json::to_string(&TokenScope::EmailVerify).unwrap(),
            "\"email_token\""
        );
    }

    #[test]
    fn test_claims_timestamps() {
        let now = Utc::now();
        let claims = Claims::new(
            "smith@example.com",
            TokenScope::Access,
            now,
            now + Duration::minutes(15),
        );
        assert_eq!(claims.exp - claims.iat, 15 * 60);
        assert_eq!(claims.scope, TokenScope::Access);
    }

    #[test]
    fn test_token_pair_type() {
        let pair = TokenPair::new("a".to_string(), "r".to_string());
        assert_eq!(pair.token_type, "bearer");
    }
}
