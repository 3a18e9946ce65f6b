//! reel-client - typed access to the reel-server resource API
//!
//! One method per resource operation. Every failure, whatever its status
//! code or cause, surfaces as a [`ClientError`] carrying a displayable
//! message, so callers only decide whether to show it.

use reel_common::api::{DeleteResponse, ErrorResponse, HealthResponse, ListQuery};
use reel_common::{NewVideo, VideoPatch, VideoRecord};
use reqwest::{RequestBuilder, Response};
use serde::de::DeserializeOwned;
use std::time::Duration;
use thiserror::Error;
use tracing::debug;

pub mod feed;

pub use feed::Feed;

const USER_AGENT: &str = concat!("reel-client/", env!("CARGO_PKG_VERSION"));
const REQUEST_TIMEOUT_SECS: u64 = 30;

/// Single error type for all client operations
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{message}")]
pub struct ClientError {
    pub message: String,
}

impl ClientError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

impl From<reqwest::Error> for ClientError {
    fn from(err: reqwest::Error) -> Self {
        ClientError::new(err.to_string())
    }
}

pub type Result<T> = std::result::Result<T, ClientError>;

/// HTTP client for a reel-server instance
#[derive(Clone)]
pub struct VideoClient {
    http_client: reqwest::Client,
    base_url: String,
}

impl VideoClient {
    /// Client for the server at `base_url`, e.g. `http://127.0.0.1:5780`
    pub fn new(base_url: impl Into<String>) -> Result<Self> {
        let http_client = reqwest::Client::builder()
            .user_agent(USER_AGENT)
            .timeout(Duration::from_secs(REQUEST_TIMEOUT_SECS))
            .build()?;

        Ok(Self::with_http_client(http_client, base_url))
    }

    /// Client reusing an existing reqwest client
    pub fn with_http_client(http_client: reqwest::Client, base_url: impl Into<String>) -> Self {
        let base_url = base_url.into().trim_end_matches('/').to_string();
        Self {
            http_client,
            base_url,
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn resources_url(&self) -> String {
        format!("{}/resources", self.base_url)
    }

    fn resource_url(&self, id: &str) -> String {
        format!("{}/resources/{}", self.base_url, id)
    }

    /// Catalog listing; `ListQuery::default()` returns everything newest first
    pub async fn list_videos(&self, query: &ListQuery) -> Result<Vec<VideoRecord>> {
        let request = self.http_client.get(self.resources_url()).query(query);
        self.send(request, "Failed to fetch videos").await
    }

    pub async fn get_video(&self, id: &str) -> Result<VideoRecord> {
        let request = self.http_client.get(self.resource_url(id));
        self.send(request, "Failed to fetch video").await
    }

    pub async fn create_video(&self, video: &NewVideo) -> Result<VideoRecord> {
        let request = self.http_client.post(self.resources_url()).json(video);
        self.send(request, "Failed to create video").await
    }

    /// Partial update; only the fields set on `patch` are sent
    pub async fn update_video(&self, id: &str, patch: &VideoPatch) -> Result<VideoRecord> {
        let request = self.http_client.put(self.resource_url(id)).json(patch);
        self.send(request, "Failed to update video").await
    }

    pub async fn delete_video(&self, id: &str) -> Result<DeleteResponse> {
        let request = self.http_client.delete(self.resource_url(id));
        self.send(request, "Failed to delete video").await
    }

    pub async fn like_video(&self, id: &str) -> Result<VideoRecord> {
        let url = format!("{}/like", self.resource_url(id));
        self.send(self.http_client.post(url), "Failed to like video").await
    }

    pub async fn unlike_video(&self, id: &str) -> Result<VideoRecord> {
        let url = format!("{}/like", self.resource_url(id));
        self.send(self.http_client.delete(url), "Failed to unlike video").await
    }

    pub async fn health(&self) -> Result<HealthResponse> {
        let request = self.http_client.get(format!("{}/health", self.base_url));
        self.send(request, "Health check failed").await
    }

    /// Whole catalog as a navigable feed
    pub async fn feed(&self) -> Result<Feed> {
        Ok(Feed::new(self.list_videos(&ListQuery::default()).await?))
    }

    async fn send<T: DeserializeOwned>(
        &self,
        request: RequestBuilder,
        default_message: &str,
    ) -> Result<T> {
        let response = request.send().await?;
        let response = check_status(response, default_message).await?;
        Ok(response.json().await?)
    }
}

/// Turn a non-success response into its envelope message
async fn check_status(response: Response, default_message: &str) -> Result<Response> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }

    let body = response.json::<ErrorResponse>().await.unwrap_or_default();
    debug!(status = status.as_u16(), error = %body.error, "Request failed");

    if body.error.is_empty() {
        Err(ClientError::new(default_message))
    } else {
        Err(ClientError::new(body.error))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_client_creation() {
        let client = VideoClient::new("http://127.0.0.1:5780/").unwrap();
        assert_eq!(client.base_url(), "http://127.0.0.1:5780");
        assert_eq!(
            client.resource_url("507f1f77bcf86cd799439011"),
            "http://127.0.0.1:5780/resources/507f1f77bcf86cd799439011"
        );
    }

    #[test]
    fn test_error_displays_message_only() {
        let err = ClientError::new("Video not found");
        assert_eq!(err.to_string(), "Video not found");
    }
}
