//! Token Service
//!
//! Issues and validates the signed, expiring tokens used for sessions and
//! email confirmation. All purposes share one HS256 secret, injected via
//! [`AuthConfig`] rather than held as process-wide state.

use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use thiserror::Error;

use crate::config::AuthConfig;
use crate::models::{Claims, TokenScope};
use crate::utils::error::AppError;

/// Token validation failures
#[derive(Error, Debug)]
pub enum TokenError {
    /// Signature or expiry check failed
    #[error("Invalid token: {0}")]
    Invalid(String),

    /// Decoded purpose tag does not match what the caller expects
    #[error("Invalid scope for token: expected {expected}, got {actual}")]
    WrongPurpose {
        expected: &'static str,
        actual: &'static str,
    },

    /// Token could not be signed
    #[error("Token generation failed: {0}")]
    Generation(String),
}

impl From<TokenError> for AppError {
    fn from(err: TokenError) -> Self {
        match err {
            TokenError::Invalid(_) => {
                AppError::Authentication("Could not validate credentials".to_string())
            }
            TokenError::WrongPurpose { .. } => {
                AppError::Authentication("Invalid scope for token".to_string())
            }
            TokenError::Generation(msg) => AppError::Internal(msg),
        }
    }
}

/// Issues and validates purpose-tagged JWTs
#[derive(Clone)]
pub struct TokenService {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    access_expires_in: Duration,
    refresh_expires_in: Duration,
    email_expires_in: Duration,
}

impl TokenService {
    /// Create a token service from the injected auth configuration
    pub fn new(config: &AuthConfig) -> Self {
        Self {
            encoding_key: EncodingKey::from_secret(config.secret.as_bytes()),
            decoding_key: DecodingKey::from_secret(config.secret.as_bytes()),
            access_expires_in: Duration::minutes(config.access_token_expires_minutes),
            refresh_expires_in: Duration::days(config.refresh_token_expires_days),
            email_expires_in: Duration::days(config.email_token_expires_days),
        }
    }

    /// Issue a signed token for `subject` with the given purpose and lifetime
    pub fn issue(
        &self,
        subject: &str,
        scope: TokenScope,
        expires_in: Duration,
    ) -> Result<String, TokenError> {
        let now = Utc::now();
        let claims = Claims::new(subject, scope, now, now + expires_in);
        encode(&Header::new(Algorithm::HS256), &claims, &self.encoding_key)
            .map_err(|e| TokenError::Generation(e.to_string()))
    }

    /// Issue a short-lived access token
    pub fn issue_access_token(&self, subject: &str) -> Result<String, TokenError> {
        self.issue(subject, TokenScope::Access, self.access_expires_in)
    }

    /// Issue a refresh token
    pub fn issue_refresh_token(&self, subject: &str) -> Result<String, TokenError> {
        self.issue(subject, TokenScope::Refresh, self.refresh_expires_in)
    }

    /// Issue an email-confirmation token
    pub fn issue_email_token(&self, subject: &str) -> Result<String, TokenError> {
        self.issue(subject, TokenScope::EmailVerify, self.email_expires_in)
    }

    /// Validate a token and return its subject.
    ///
    /// Fails with [`TokenError::Invalid`] on a bad signature or expiry, and
    /// with [`TokenError::WrongPurpose`] when the decoded scope does not
    /// match `expected_scope`.
    pub fn validate(&self, token: &str, expected_scope: TokenScope) -> Result<String, TokenError> {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.leeway = 0;
        validation.validate_aud = false;

        let claims = decode::<Claims>(token, &self.decoding_key, &validation)
            .map(|data| data.claims)
            .map_err(|e| TokenError::Invalid(e.to_string()))?;

        if claims.scope != expected_scope {
            return Err(TokenError::WrongPurpose {
                expected: expected_scope.as_str(),
                actual: claims.scope.as_str(),
            });
        }

        Ok(claims.sub)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_service() -> TokenService {
        TokenService::new(&AuthConfig {
            secret: "test_secret_key".to_string(),
            access_token_expires_minutes: 15,
            refresh_token_expires_days: 7,
            email_token_expires_days: 7,
        })
    }

    #[test]
    fn test_issue_and_validate_all_scopes() {
        let service = test_service();

        let access = service.issue_access_token("smith@example.com").unwrap();
        assert_eq!(
            service.validate(&access, TokenScope::Access).unwrap(),
            "smith@example.com"
        );

        let refresh = service.issue_refresh_token("smith@example.com").unwrap();
        assert_eq!(
            service.validate(&refresh, TokenScope::Refresh).unwrap(),
            "smith@example.com"
        );

        let email = service.issue_email_token("smith@example.com").unwrap();
        assert_eq!(
            service.validate(&email, TokenScope::EmailVerify).unwrap(),
            "smith@example.com"
        );
    }

    #[test]
    fn test_purpose_cross_use_is_rejected() {
        let service = test_service();

        let refresh = service.issue_refresh_token("smith@example.com").unwrap();
        assert!(matches!(
            service.validate(&refresh, TokenScope::Access),
            Err(TokenError::WrongPurpose { .. })
        ));

        let access = service.issue_access_token("smith@example.com").unwrap();
        assert!(matches!(
            service.validate(&access, TokenScope::Refresh),
            Err(TokenError::WrongPurpose { .. })
        ));

        assert!(matches!(
            service.validate(&access, TokenScope::EmailVerify),
            Err(TokenError::WrongPurpose { .. })
        ));
    }

    #[test]
    fn test_expired_token_is_rejected() {
        let service = test_service();
        let expired = service
            .issue("smith@example.com", TokenScope::Access, Duration::minutes(-5))
            .unwrap();

        assert!(matches!(
            service.validate(&expired, TokenScope::Access),
            Err(TokenError::Invalid(_))
        ));
    }

    #[test]
    fn test_foreign_signature_is_rejected() {
        let service = test_service();
        let other = TokenService::new(&AuthConfig {
            secret: "a_different_secret".to_string(),
            access_token_expires_minutes: 15,
            refresh_token_expires_days: 7,
            email_token_expires_days: 7,
        });

        let token = other.issue_access_token("smith@example.com").unwrap();
        assert!(matches!(
            service.validate(&token, TokenScope::Access),
            Err(TokenError::Invalid(_))
        ));
    }

    #[test]
    fn test_garbage_token_is_rejected() {
        let service = test_service();
        assert!(matches!(
            service.validate("not.a.token", TokenScope::Access),
            Err(TokenError::Invalid(_))
        ));
    }
}
