//! HTTP API
//!
//! Thin axum layer over the services. Handlers translate requests into
//! service calls; `AppError` decides the response status.

pub mod avatars;
pub mod health;

use crate::app::AppState;
use axum::extract::DefaultBodyLimit;
use axum::routing::get;
use axum::Router;
use tower_http::trace::TraceLayer;

/// Build the application router
pub fn router(state: AppState) -> Router {
    let body_limit = state.max_upload_bytes;

    Router::new()
        .route("/health", get(health::health))
        .route(
            "/users/{user_id}/avatar",
            get(avatars::fetch_avatar).post(avatars::upload_avatar),
        )
        .layer(DefaultBodyLimit::max(body_limit))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
