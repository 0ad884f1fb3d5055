//! Liveness endpoint

use axum::response::IntoResponse;
use axum::Json;

/// Liveness check
pub async fn health() -> impl IntoResponse {
    Json(serde_json::json!({ "status": "ok" }))
}
