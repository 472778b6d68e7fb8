//! Request and Response Models
//!
//! Data structures for API request and response payloads with validation.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::models::user::User;
use crate::utils::validation::{email_validator, phone_validator};

/// Request payload for creating a new account
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct SignupRequest {
    /// Login name; must be email shaped
    #[validate(
        length(max = 100, message = "Username must be at most 100 characters"),
        custom(function = email_validator)
    )]
    pub username: String,

    /// Plain-text password, hashed before storage
    #[validate(length(
        min = 6,
        max = 128,
        message = "Password must be between 6 and 128 characters"
    ))]
    pub password: String,
}

/// Form payload for login (`application/x-www-form-urlencoded`)
#[derive(Debug, Clone, Deserialize)]
pub struct LoginForm {
    pub username: String,
    pub password: String,
}

/// Request payload for re-sending the confirmation email
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct RequestEmail {
    #[validate(custom(function = email_validator))]
    pub email: String,
}

/// Request payload for creating or fully replacing a contact
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct ContactPayload {
    /// First name
    #[validate(length(min = 1, max = 50, message = "Name must be 1-50 characters"))]
    pub name: String,

    /// Last name
    #[validate(length(min = 1, max = 50, message = "Lastname must be 1-50 characters"))]
    pub lastname: String,

    /// Contact's email address
    #[validate(
        length(max = 50, message = "Email must be at most 50 characters"),
        custom(function = email_validator)
    )]
    pub email: String,

    /// Contact's phone number
    #[validate(
        length(max = 50, message = "Phone must be at most 50 characters"),
        custom(function = phone_validator)
    )]
    pub phone: String,

    /// Calendar date of birth
    pub birthday: NaiveDate,

    /// Optional free-text note
    #[validate(length(max = 150, message = "Additional info must be at most 150 characters"))]
    pub additional: Option<String>,
}

/// Query parameters for paginated contact listing
#[derive(Debug, Clone, Deserialize)]
pub struct ListQuery {
    /// Number of contacts to skip
    #[serde(default)]
    pub skip: i64,

    /// Maximum number of contacts to return
    #[serde(default = "default_limit")]
    pub limit: i64,
}

fn default_limit() -> i64 {
    100
}

/// Query parameters for contact text search
#[derive(Debug, Clone, Deserialize)]
pub struct SearchQuery {
    /// Case-insensitive substring matched against name, lastname, and email
    pub q: String,
}

/// Response payload for successful signup
#[derive(Debug, Serialize)]
pub struct SignupResponse {
    pub user: User,
    pub detail: String,
}

/// Generic message response used by the confirmation endpoints
#[derive(Debug, Serialize)]
pub struct MessageResponse {
    pub message: String,
}

impl MessageResponse {
    pub fn new(message: &str) -> Self {
        Self {
            message: message.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_signup_request_validation() {
        let valid = SignupRequest {
            username: "smith@example.com".to_string(),
            password: "SecurePass123".to_string(),
        };
        assert!(valid.validate().is_ok());

        let bad_email = SignupRequest {
            username: "not-an-email".to_string(),
            password: "SecurePass123".to_string(),
        };
        assert!(bad_email.validate().is_err());

        let short_password = SignupRequest {
            username: "smith@example.com".to_string(),
            password: "abc".to_string(),
        };
        assert!(short_password.validate().is_err());
    }

    #[test]
    fn test_contact_payload_validation() {
        let valid = ContactPayload {
            name: "John".to_string(),
            lastname: "Smith".to_string(),
            email: "smith@example.com".to_string(),
            phone: "9876543210".to_string(),
            birthday: NaiveDate::from_ymd_opt(2000, 2, 3).unwrap(),
            additional: Some("Unknown man".to_string()),
        };
        assert!(valid.validate().is_ok());

        let mut too_long = valid.clone();
        too_long.additional = Some("x".repeat(151));
        assert!(too_long.validate().is_err());

        let mut empty_name = valid.clone();
        empty_name.name = String::new();
        assert!(empty_name.validate().is_err());

        let mut bad_phone = valid;
        bad_phone.phone = "not a phone".to_string();
        assert!(bad_phone.validate().is_err());
    }

    #[test]
    fn test_list_query_defaults() {
        let query: ListQuery = serde_json::from_str("{}").unwrap();
        assert_eq!(query.skip, 0);
        assert_eq!(query.limit, 100);
    }
}
