//! Error types for the avatars service
//!
//! All errors use thiserror for structured error handling.
//! Each variant maps onto exactly one HTTP status in `IntoResponse`.

use axum::extract::multipart::MultipartError;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum AppError {
    #[error("No file uploaded in field `{0}`")]
    MissingFile(String),

    #[error("Malformed multipart body: {0}")]
    Multipart(#[from] MultipartError),

    #[error("Could not write blob {key}: {source}")]
    Write {
        key: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Invalid storage key: {0:?}")]
    InvalidKey(String),

    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("No {name} attached to {record}")]
    AttachmentNotFound { record: String, name: String },

    #[error("Blob content not found: {0}")]
    BlobNotFound(String),

    #[error("Checksum could not be computed for blob {0}")]
    ChecksumUnavailable(String),

    #[error("Checksum mismatch for blob {key}: expected {expected}, got {actual}")]
    Integrity {
        key: String,
        expected: String,
        actual: String,
    },

    #[error("Configuration error: {0}")]
    Config(String),
}

impl AppError {
    pub fn status(&self) -> StatusCode {
        match self {
            Self::MissingFile(_) => StatusCode::BAD_REQUEST,
            Self::Multipart(e) => e.status(),
            Self::AttachmentNotFound { .. } => StatusCode::NOT_FOUND,
            Self::Write { .. }
            | Self::InvalidKey(_)
            | Self::Database(_)
            | Self::Io(_)
            | Self::BlobNotFound(_)
            | Self::ChecksumUnavailable(_)
            | Self::Integrity { .. }
            | Self::Config(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status();
        let message = self.to_string();

        if status.is_server_error() {
            tracing::error!(status = %status, "{}", message);
        } else {
            tracing::debug!(status = %status, "{}", message);
        }

        let body = serde_json::json!({ "error": message });
        (status, axum::Json(body)).into_response()
    }
}

pub type Result<T> = std::result::Result<T, AppError>;
