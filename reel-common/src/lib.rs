//! # Reel Common Library
//!
//! Shared code for the reel video catalog crates:
//! - Video record model and field validation
//! - Video identifiers
//! - API request/response envelope types
//! - Bootstrap configuration loading

pub mod api;
pub mod config;
pub mod error;
pub mod id;
pub mod models;

pub use error::{Error, Result};
pub use id::{InvalidVideoId, VideoId};
pub use models::{NewVideo, Transformation, ValidationError, VideoPatch, VideoRecord};
