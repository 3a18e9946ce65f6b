//! Common error types for reel

use thiserror::Error;

/// Common result type for reel operations
pub type Result<T> = std::result::Result<T, Error>;

/// Common error types shared by the reel crates
#[derive(Error, Debug)]
pub enum Error {
    /// Configuration loading or validation error
    #[error("Configuration error: {0}")]
    Config(String),
}
