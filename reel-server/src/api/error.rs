//! HTTP error responses
//!
//! Every failure is rendered as `{"error": message}` with its status code.
//! Internal failures are logged here and reduced to a generic message.

use crate::db::StoreError;
use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use reel_common::api::ErrorResponse;
use reel_common::ValidationError;
use tracing::error;

/// API error types
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    #[error("Invalid video ID")]
    InvalidId,

    #[error("Video not found")]
    NotFound,

    #[error("{0}")]
    Validation(ValidationError),

    #[error("Invalid request body")]
    MalformedBody,

    #[error("Invalid query parameters")]
    InvalidQuery,

    /// Generic failure message shown to the client
    #[error("{0}")]
    Internal(&'static str),
}

impl ApiError {
    /// Map a store outcome, using `failure` as the message for server errors
    pub fn from_store(err: StoreError, failure: &'static str) -> Self {
        match err {
            StoreError::InvalidId(_) => ApiError::InvalidId,
            StoreError::NotFound(_) => ApiError::NotFound,
            StoreError::Validation(e) => ApiError::Validation(e),
            StoreError::Unavailable(cause) => {
                error!(%cause, "{}: video store unavailable", failure);
                ApiError::Internal(failure)
            }
            StoreError::Database(e) => {
                error!(error = %e, "{}", failure);
                ApiError::Internal(failure)
            }
        }
    }

    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::InvalidId
            | ApiError::Validation(_)
            | ApiError::MalformedBody
            | ApiError::InvalidQuery => StatusCode::BAD_REQUEST,
            ApiError::NotFound => StatusCode::NOT_FOUND,
            ApiError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        (status, Json(ErrorResponse::new(self.to_string()))).into_response()
    }
}
