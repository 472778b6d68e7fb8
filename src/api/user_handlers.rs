//! User Profile Handlers
//!
//! The caller's own profile and avatar upload.

use axum::{extract::Multipart, extract::State, Extension, Json};

use crate::models::User;
use crate::service::{UserCache, UserStore};
use crate::utils::error::{AppError, AppResult};

use super::handlers::AppState;
use super::middleware::CurrentUser;

/// Return the caller's profile
pub async fn me(Extension(CurrentUser(user)): Extension<CurrentUser>) -> Json<User> {
    Json(user)
}

/// Upload a new avatar image and persist the hosted URL.
///
/// The file goes to the external image host; its `secure_url` replaces the
/// stored avatar, and the session cache entry is dropped so the change is
/// visible immediately.
pub async fn update_avatar(
    State(state): State<AppState>,
    Extension(CurrentUser(user)): Extension<CurrentUser>,
    mut multipart: Multipart,
) -> AppResult<Json<User>> {
    let media = state
        .media
        .clone()
        .ok_or_else(|| AppError::Configuration("Image hosting is not configured".to_string()))?;

    let bytes = read_avatar_bytes(&mut multipart).await?;

    let url = media.upload_avatar(bytes, &user.username).await?;

    let record = state.users.set_avatar(&user.username, &url).await?;
    state.session_cache.invalidate(&user.username).await;

    Ok(Json(User::from(record)))
}

/// Pull the bytes of the `file` part out of the upload form.
///
/// Only the field named `file` is accepted; unrelated form fields are
/// skipped rather than mistaken for the image.
async fn read_avatar_bytes(multipart: &mut Multipart) -> AppResult<Vec<u8>> {
    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| AppError::BadRequest(format!("Malformed multipart body: {}", e)))?
    {
        if field.name() != Some("file") {
            continue;
        }

        let bytes = field
            .bytes()
            .await
            .map_err(|e| AppError::BadRequest(format!("Failed to read upload: {}", e)))?;
        if !bytes.is_empty() {
            return Ok(bytes.to_vec());
        }
    }

    Err(AppError::BadRequest("Missing file upload".to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::Body;
    use axum::extract::FromRequest;
    use axum::http::Request;

    const BOUNDARY: &str = "test-boundary";

    async fn multipart_from(parts: &[(&str, &str)]) -> Multipart {
        let mut body = String::new();
        for (name, value) in parts {
            body.push_str(&format!(
                "--{BOUNDARY}\r\nContent-Disposition: form-data; name=\"{name}\"\r\n\r\n{value}\r\n"
            ));
        }
        body.push_str(&format!("--{BOUNDARY}--\r\n"));

        let request = Request::builder()
            .header(
                "content-type",
                format!("multipart/form-data; boundary={BOUNDARY}"),
            )
            .body(Body::from(body))
            .unwrap();

        Multipart::from_request(request, &()).await.unwrap()
    }

    #[tokio::test]
    async fn test_only_the_file_field_is_accepted() {
        let mut multipart =
            multipart_from(&[("note", "not an image"), ("file", "image-bytes")]).await;

        let bytes = read_avatar_bytes(&mut multipart).await.unwrap();
        assert_eq!(bytes, b"image-bytes");
    }

    #[tokio::test]
    async fn test_unrelated_fields_alone_are_not_an_upload() {
        let mut multipart = multipart_from(&[("note", "not an image")]).await;

        assert!(matches!(
            read_avatar_bytes(&mut multipart).await,
            Err(AppError::BadRequest(_))
        ));
    }
}
