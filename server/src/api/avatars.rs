//! Avatar endpoints
//!
//! `POST /users/{user_id}/avatar` takes a multipart form with the file in the
//! `avatar` field. `GET /users/{user_id}/avatar` returns the raw bytes.

use crate::app::AppState;
use crate::config::{AVATAR_FORM_FIELD, DEFAULT_CONTENT_TYPE};
use crate::database::Blob;
use crate::error::{AppError, Result};
use crate::services::Upload;
use axum::extract::{Multipart, Path, State};
use axum::http::header::{self, HeaderMap, HeaderValue};
use axum::response::{IntoResponse, Response};
use axum::Json;

/// Upload a user's avatar
pub async fn upload_avatar(
    State(state): State<AppState>,
    Path(user_id): Path<String>,
    mut multipart: Multipart,
) -> Result<Json<Blob>> {
    let upload = read_file_field(&mut multipart, AVATAR_FORM_FIELD)
        .await?
        .ok_or_else(|| AppError::MissingFile(AVATAR_FORM_FIELD.to_string()))?;

    let blob = state.avatars.upload(&user_id, upload).await?;
    Ok(Json(blob))
}

/// Serve a user's avatar with its recorded content type
pub async fn fetch_avatar(
    State(state): State<AppState>,
    Path(user_id): Path<String>,
) -> Result<Response> {
    let stored = state.avatars.fetch(&user_id).await?;

    let mut headers = HeaderMap::new();
    let content_type = HeaderValue::from_str(&stored.blob.content_type)
        .unwrap_or_else(|_| HeaderValue::from_static(DEFAULT_CONTENT_TYPE));
    headers.insert(header::CONTENT_TYPE, content_type);
    if let Ok(etag) = HeaderValue::from_str(&format!("\"{}\"", stored.blob.checksum)) {
        headers.insert(header::ETAG, etag);
    }

    Ok((headers, stored.data).into_response())
}

/// Pull the first file part named `field_name` out of a multipart body.
/// Other parts, and a matching part without a filename, are skipped.
async fn read_file_field(multipart: &mut Multipart, field_name: &str) -> Result<Option<Upload>> {
    while let Some(field) = multipart.next_field().await? {
        if field.name() != Some(field_name) {
            continue;
        }
        let Some(filename) = field.file_name().map(str::to_owned) else {
            tracing::debug!("Skipping `{}` part without a filename", field_name);
            continue;
        };
        let content_type = field.content_type().map(str::to_owned);
        let data = field.bytes().await?;

        return Ok(Some(Upload {
            filename,
            content_type,
            data: data.to_vec(),
        }));
    }

    Ok(None)
}
