//! reel-server library - video catalog service
//!
//! Resource API layer over the video entity store, which in turn borrows the
//! process-wide store connection for each request.

use axum::response::{IntoResponse, Response};
use axum::Router;
use std::any::Any;
use std::sync::Arc;
use tower_http::catch_panic::CatchPanicLayer;
use tower_http::cors::{self, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing::error;

pub mod api;
pub mod db;

use db::{StoreConnection, VideoStore};

/// Application state shared across HTTP handlers
#[derive(Clone)]
pub struct AppState {
    pub store: VideoStore,
}

impl AppState {
    /// Create new application state
    pub fn new(store: VideoStore) -> Self {
        Self { store }
    }

    /// State backed by a shared store connection
    pub fn with_connection(connections: Arc<StoreConnection>) -> Self {
        Self::new(VideoStore::new(connections))
    }
}

/// Build application router
pub fn build_router(state: AppState) -> Router {
    use axum::routing::{get, post};

    let resources = Router::new()
        .route("/resources", get(api::list_videos).post(api::create_video))
        .route(
            "/resources/:id",
            get(api::get_video)
                .put(api::update_video)
                .delete(api::delete_video),
        )
        .route(
            "/resources/:id/like",
            post(api::like_video).delete(api::unlike_video),
        );

    Router::new()
        .merge(resources)
        .merge(api::health_routes())
        .with_state(state)
        .layer(CatchPanicLayer::custom(panic_response))
        .layer(
            CorsLayer::new()
                .allow_origin(cors::Any)
                .allow_methods(cors::Any)
                .allow_headers(cors::Any),
        )
        .layer(TraceLayer::new_for_http())
}

fn panic_response(_panic: Box<dyn Any + Send + 'static>) -> Response {
    error!("Request handler panicked");
    api::ApiError::Internal("Internal server error").into_response()
}
