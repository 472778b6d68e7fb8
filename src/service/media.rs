//! Media Storage
//!
//! Uploads avatar images to an external image host (Cloudinary-style
//! unsigned upload endpoint) and returns the hosted URL.

use reqwest::multipart::{Form, Part};
use serde::Deserialize;

use crate::config::MediaConfig;
use crate::utils::error::{AppError, AppResult};

/// Image host client for avatar uploads
pub struct MediaStorage {
    client: reqwest::Client,
    config: MediaConfig,
}

/// Relevant slice of the image host's upload response
#[derive(Debug, Deserialize)]
struct UploadResponse {
    secure_url: String,
}

impl MediaStorage {
    /// Create a media storage client from image host configuration
    pub fn new(config: MediaConfig) -> Self {
        Self {
            client: reqwest::Client::new(),
            config,
        }
    }

    /// Upload image bytes under a deterministic public id.
    ///
    /// The public id is derived from the username so re-uploads overwrite
    /// the previous avatar instead of accumulating.
    pub async fn upload_avatar(&self, bytes: Vec<u8>, username: &str) -> AppResult<String> {
        let part = Part::bytes(bytes).file_name("avatar");
        let form = Form::new()
            .part("file", part)
            .text("upload_preset", self.config.upload_preset.clone())
            .text("public_id", public_id(username));

        let response = self
            .client
            .post(&self.config.upload_url)
            .multipart(form)
            .send()
            .await
            .map_err(|e| AppError::ExternalService(format!("Avatar upload failed: {}", e)))?;

        if !response.status().is_success() {
            return Err(AppError::ExternalService(format!(
                "Avatar upload rejected with status {}",
                response.status()
            )));
        }

        let body: UploadResponse = response
            .json()
            .await
            .map_err(|e| AppError::ExternalService(format!("Malformed upload response: {}", e)))?;

        Ok(body.secure_url)
    }
}

fn public_id(username: &str) -> String {
    format!("api/{}", username)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_public_id_is_stable_per_user() {
        assert_eq!(public_id("smith@example.com"), "api/smith@example.com");
        assert_eq!(public_id("smith@example.com"), public_id("smith@example.com"));
    }

    #[test]
    fn test_upload_response_parsing() {
        let json = r#"{"secure_url": "https://img.example.com/api/smith.jpg", "version": 3}"#;
        let parsed: UploadResponse = serde_json::from_str(json).unwrap();
        assert_eq!(parsed.secure_url, "https://img.example.com/api/smith.jpg");
    }
}
