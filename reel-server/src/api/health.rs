//! Health check endpoint

use axum::{routing::get, Json, Router};
use reel_common::api::HealthResponse;

use crate::AppState;

/// GET /health
///
/// Does not touch the video store.
pub async fn health_check() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok".to_string(),
        module: "reel-server".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
    })
}

/// Build health check routes
pub fn health_routes() -> Router<AppState> {
    Router::new().route("/health", get(health_check))
}
