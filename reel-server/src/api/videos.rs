//! Video resource handlers
//!
//! | Route                        | Success                     |
//! |------------------------------|-----------------------------|
//! | GET    /resources            | 200 array of records        |
//! | POST   /resources            | 200 created record          |
//! | GET    /resources/:id        | 200 record                  |
//! | PUT    /resources/:id        | 200 updated record          |
//! | DELETE /resources/:id        | 200 `{"success": true}`     |
//! | POST   /resources/:id/like   | 200 record, likes + 1       |
//! | DELETE /resources/:id/like   | 200 record, likes - 1 (>=0) |

use crate::api::ApiError;
use crate::AppState;
use axum::{
    body::Bytes,
    extract::{rejection::QueryRejection, Path, Query, State},
    Json,
};
use reel_common::api::{DeleteResponse, ListQuery};
use reel_common::{NewVideo, VideoPatch, VideoRecord};
use serde::de::DeserializeOwned;
use tracing::debug;

/// Parse a JSON body regardless of content type
fn parse_body<T: DeserializeOwned>(body: &Bytes) -> Result<T, ApiError> {
    serde_json::from_slice(body).map_err(|e| {
        debug!(error = %e, "Rejected request body");
        ApiError::MalformedBody
    })
}

/// GET /resources
pub async fn list_videos(
    State(state): State<AppState>,
    query: Result<Query<ListQuery>, QueryRejection>,
) -> Result<Json<Vec<VideoRecord>>, ApiError> {
    let Query(query) = query.map_err(|e| {
        debug!(error = %e, "Rejected list query");
        ApiError::InvalidQuery
    })?;

    let videos = state
        .store
        .list(&query)
        .await
        .map_err(|e| ApiError::from_store(e, "Failed to fetch videos"))?;

    Ok(Json(videos))
}

/// POST /resources
pub async fn create_video(
    State(state): State<AppState>,
    body: Bytes,
) -> Result<Json<VideoRecord>, ApiError> {
    let new_video: NewVideo = parse_body(&body)?;

    let video = state
        .store
        .create(new_video)
        .await
        .map_err(|e| ApiError::from_store(e, "Failed to create video"))?;

    Ok(Json(video))
}

/// GET /resources/:id
pub async fn get_video(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<VideoRecord>, ApiError> {
    let video = state
        .store
        .find_by_id(&id)
        .await
        .map_err(|e| ApiError::from_store(e, "Failed to fetch video"))?;

    Ok(Json(video))
}

/// PUT /resources/:id
pub async fn update_video(
    State(state): State<AppState>,
    Path(id): Path<String>,
    body: Bytes,
) -> Result<Json<VideoRecord>, ApiError> {
    let patch: VideoPatch = parse_body(&body)?;

    let video = state
        .store
        .update(&id, patch)
        .await
        .map_err(|e| ApiError::from_store(e, "Failed to update video"))?;

    Ok(Json(video))
}

/// DELETE /resources/:id
pub async fn delete_video(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<DeleteResponse>, ApiError> {
    state
        .store
        .delete(&id)
        .await
        .map_err(|e| ApiError::from_store(e, "Failed to delete video"))?;

    Ok(Json(DeleteResponse { success: true }))
}

/// POST /resources/:id/like
pub async fn like_video(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<VideoRecord>, ApiError> {
    let video = state
        .store
        .like(&id)
        .await
        .map_err(|e| ApiError::from_store(e, "Failed to like video"))?;

    Ok(Json(video))
}

/// DELETE /resources/:id/like
pub async fn unlike_video(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<VideoRecord>, ApiError> {
    let video = state
        .store
        .unlike(&id)
        .await
        .map_err(|e| ApiError::from_store(e, "Failed to unlike video"))?;

    Ok(Json(video))
}
