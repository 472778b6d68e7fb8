//! Configuration Module
//!
//! Centralized, environment-driven configuration for the contacts service.
//! The token secret and algorithm live here and are handed to the token
//! service explicitly; nothing security-relevant is process-global.

use crate::database::DatabaseConfig;

/// Environment variable helpers
pub mod env {
    use std::env;

    /// Get environment variable as string with default
    pub fn get_string(key: &str, default: &str) -> String {
        env::var(key).unwrap_or_else(|_| default.to_string())
    }

    /// Get environment variable as u16 with default
    pub fn get_u16(key: &str, default: u16) -> u16 {
        env::var(key)
            .ok()
            .and_then(|v| v.parse().ok())
            .unwrap_or(default)
    }

    /// Get environment variable as u32 with default
    pub fn get_u32(key: &str, default: u32) -> u32 {
        env::var(key)
            .ok()
            .and_then(|v| v.parse().ok())
            .unwrap_or(default)
    }

    /// Get environment variable as u64 with default
    pub fn get_u64(key: &str, default: u64) -> u64 {
        env::var(key)
            .ok()
            .and_then(|v| v.parse().ok())
            .unwrap_or(default)
    }

    /// Get environment variable as i64 with default
    pub fn get_i64(key: &str, default: i64) -> i64 {
        env::var(key)
            .ok()
            .and_then(|v| v.parse().ok())
            .unwrap_or(default)
    }

    /// Check if environment variable is set
    pub fn is_set(key: &str) -> bool {
        env::var(key).is_ok()
    }

    /// Get required environment variable or fail with a readable message
    pub fn get_required(key: &str) -> Result<String, String> {
        env::var(key).map_err(|_| format!("Required environment variable {} is not set", key))
    }
}

/// Application configuration combining all service configurations
#[derive(Debug, Clone)]
pub struct AppConfig {
    /// HTTP server configuration
    pub server: ServerConfig,

    /// PostgreSQL configuration
    pub database: DatabaseConfig,

    /// Redis configuration (session cache + rate limiter backend)
    pub redis: RedisConfig,

    /// Token signing configuration
    pub auth: AuthConfig,

    /// Fixed-window rate limiting configuration
    pub rate_limit: RateLimitConfig,

    /// SMTP configuration; confirmation mail is skipped when absent
    pub mail: Option<MailConfig>,

    /// Image host configuration; avatar upload is rejected when absent
    pub media: Option<MediaConfig>,
}

/// Server configuration
#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    pub log_level: String,
    /// Public base URL used in confirmation email links
    pub base_url: String,
}

/// Redis configuration
#[derive(Debug, Clone)]
pub struct RedisConfig {
    pub url: String,
}

/// Token signing configuration, injected into the token service
#[derive(Debug, Clone)]
pub struct AuthConfig {
    /// Shared HS256 signing secret for all token purposes
    pub secret: String,
    /// Access token lifetime in minutes
    pub access_token_expires_minutes: i64,
    /// Refresh token lifetime in days
    pub refresh_token_expires_days: i64,
    /// Email-verify token lifetime in days
    pub email_token_expires_days: i64,
}

/// Fixed-window rate limiting configuration
#[derive(Debug, Clone)]
pub struct RateLimitConfig {
    /// Maximum requests per window and key
    pub max_requests: u32,
    /// Window length in seconds
    pub window_seconds: u64,
}

/// SMTP configuration for the notification dispatcher
#[derive(Debug, Clone)]
pub struct MailConfig {
    pub smtp_host: String,
    pub smtp_port: u16,
    pub smtp_username: String,
    pub smtp_password: String,
    pub from_name: String,
    pub from_email: String,
}

/// Image host configuration for avatar uploads
#[derive(Debug, Clone)]
pub struct MediaConfig {
    /// Upload endpoint, e.g. https://api.cloudinary.com/v1_1/<cloud>/image/upload
    pub upload_url: String,
    /// Unsigned upload preset name
    pub upload_preset: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        let host = env::get_string("SERVER_HOST", "0.0.0.0");
        let port = env::get_u16("SERVER_PORT", 8000);
        Self {
            base_url: env::get_string("APP_BASE_URL", &format!("http://{}:{}", host, port)),
            log_level: env::get_string("LOG_LEVEL", "info"),
            host,
            port,
        }
    }
}

impl Default for RateLimitConfig {
    fn default() -> Self {
        Self {
            max_requests: env::get_u32("RATE_LIMIT_MAX_REQUESTS", 10),
            window_seconds: env::get_u64("RATE_LIMIT_WINDOW_SECONDS", 60),
        }
    }
}

impl AuthConfig {
    fn from_env() -> Result<Self, String> {
        Ok(Self {
            secret: env::get_required("SECRET_KEY")?,
            access_token_expires_minutes: env::get_i64("ACCESS_TOKEN_EXPIRES_MINUTES", 15),
            refresh_token_expires_days: env::get_i64("REFRESH_TOKEN_EXPIRES_DAYS", 7),
            email_token_expires_days: env::get_i64("EMAIL_TOKEN_EXPIRES_DAYS", 7),
        })
    }
}

impl RedisConfig {
    fn from_env() -> Self {
        Self {
            url: env::get_string("REDIS_URL", "redis://127.0.0.1:6379/0"),
        }
    }
}

impl MailConfig {
    pub fn from_env() -> Option<Self> {
        if !env::is_set("SMTP_HOST") {
            return None;
        }

        Some(Self {
            smtp_host: env::get_string("SMTP_HOST", "localhost"),
            smtp_port: env::get_u16("SMTP_PORT", 587),
            smtp_username: env::get_string("SMTP_USERNAME", ""),
            smtp_password: env::get_string("SMTP_PASSWORD", ""),
            from_name: env::get_string("SMTP_FROM_NAME", "Your assistant"),
            from_email: env::get_string("SMTP_FROM_EMAIL", "noreply@localhost"),
        })
    }
}

impl MediaConfig {
    pub fn from_env() -> Option<Self> {
        if !env::is_set("MEDIA_UPLOAD_URL") {
            return None;
        }

        Some(Self {
            upload_url: env::get_string("MEDIA_UPLOAD_URL", ""),
            upload_preset: env::get_string("MEDIA_UPLOAD_PRESET", "avatars"),
        })
    }
}

impl AppConfig {
    /// Load complete application configuration from the environment
    pub fn from_env() -> Result<Self, String> {
        Ok(Self {
            server: ServerConfig::default(),
            database: DatabaseConfig::from_env()?,
            redis: RedisConfig::from_env(),
            auth: AuthConfig::from_env()?,
            rate_limit: RateLimitConfig::default(),
            mail: MailConfig::from_env(),
            media: MediaConfig::from_env(),
        })
    }

    /// Validate the loaded configuration
    pub fn validate(&self) -> Result<(), String> {
        if self.server.port == 0 {
            return Err("Server port must be greater than 0".into());
        }

        if self.auth.secret.is_empty() {
            return Err("SECRET_KEY cannot be empty".into());
        }

        if self.auth.access_token_expires_minutes <= 0
            || self.auth.refresh_token_expires_days <= 0
            || self.auth.email_token_expires_days <= 0
        {
            return Err("Token lifetimes must be positive".into());
        }

        if self.rate_limit.max_requests == 0 || self.rate_limit.window_seconds == 0 {
            return Err("Rate limit window and request count must be positive".into());
        }

        Ok(())
    }
}
