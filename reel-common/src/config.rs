//! Bootstrap configuration loading
//!
//! Database URL resolution priority order:
//! 1. Command-line argument (highest priority)
//! 2. Environment variable
//! 3. TOML config file
//!
//! There is no compiled default for the database URL. Serving without a
//! configured store is a startup error.

use crate::{Error, Result};
use serde::Deserialize;
use std::path::{Path, PathBuf};
use tracing::{info, warn};

/// Environment variable naming the data-store endpoint
pub const DATABASE_URL_ENV: &str = "REEL_DATABASE_URL";

/// Bootstrap configuration loaded from TOML file
#[derive(Debug, Clone, Deserialize)]
pub struct TomlConfig {
    /// sqlx SQLite URL of the video store (e.g. `sqlite://videos.db`)
    #[serde(default)]
    pub database_url: Option<String>,

    /// HTTP server port
    #[serde(default = "default_port")]
    pub port: u16,

    /// HTTP bind address
    #[serde(default = "default_bind")]
    pub bind: String,

    /// Store connection pool size
    #[serde(default = "default_max_connections")]
    pub max_connections: u32,

    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Logging configuration
#[derive(Debug, Clone, Deserialize)]
pub struct LoggingConfig {
    /// Log level (trace, debug, info, warn, error)
    #[serde(default = "default_log_level")]
    pub level: String,
}

fn default_port() -> u16 {
    5780
}

fn default_bind() -> String {
    "127.0.0.1".to_string()
}

fn default_max_connections() -> u32 {
    10
}

fn default_log_level() -> String {
    "info".to_string()
}

impl Default for TomlConfig {
    fn default() -> Self {
        Self {
            database_url: None,
            port: default_port(),
            bind: default_bind(),
            max_connections: default_max_connections(),
            logging: LoggingConfig::default(),
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
        }
    }
}

impl TomlConfig {
    /// Parse configuration from TOML text
    pub fn from_toml_str(content: &str) -> Result<Self> {
        toml::from_str(content).map_err(|e| Error::Config(format!("Invalid TOML: {}", e)))
    }

    /// Load configuration from a TOML file
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| Error::Config(format!("Cannot read {}: {}", path.display(), e)))?;
        Self::from_toml_str(&content)
    }

    /// Load an explicitly requested file, or the platform default file if present
    ///
    /// A missing default file is not an error: defaults are used instead.
    pub fn load_or_default(explicit: Option<&Path>) -> Result<Self> {
        if let Some(path) = explicit {
            return Self::load(path);
        }

        match default_config_path() {
            Some(path) if path.exists() => {
                info!("Loading configuration from {}", path.display());
                Self::load(&path)
            }
            _ => {
                warn!("No configuration file found, using defaults");
                Ok(Self::default())
            }
        }
    }
}

/// Platform configuration file path (`~/.config/reel/config.toml` on Linux)
pub fn default_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|d| d.join("reel").join("config.toml"))
}

/// Resolve the data-store endpoint
///
/// Blank values are treated as absent at every tier.
pub fn resolve_database_url(
    cli_arg: Option<&str>,
    env_var_name: &str,
    config: &TomlConfig,
) -> Result<String> {
    // Priority 1: Command-line argument
    if let Some(url) = non_blank(cli_arg) {
        return Ok(url.to_string());
    }

    // Priority 2: Environment variable
    if let Ok(url) = std::env::var(env_var_name) {
        if let Some(url) = non_blank(Some(&url)) {
            return Ok(url.to_string());
        }
    }

    // Priority 3: TOML config file
    if let Some(url) = non_blank(config.database_url.as_deref()) {
        return Ok(url.to_string());
    }

    Err(Error::Config(format!(
        "No database URL configured: pass --database-url, set {}, or add database_url to the config file",
        env_var_name
    )))
}

fn non_blank(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|v| !v.is_empty())
}
