//! HTTP API handlers for reel-server

pub mod error;
pub mod health;
pub mod videos;

pub use error::ApiError;
pub use health::health_routes;
pub use videos::{
    create_video, delete_video, get_video, like_video, list_videos, unlike_video, update_video,
};
