//! Configuration loading and resolution
//!
//! Settings resolve in priority order:
//! 1. Command-line argument (highest priority)
//! 2. Environment variable
//! 3. TOML config file
//! 4. Compiled default (fallback)
//!
//! Tiers 1 and 2 are both collected by the binary's clap parser and arrive
//! here as [`ConfigOverrides`].

use crate::{Error, Result};
use serde::Deserialize;
use std::path::{Path, PathBuf};
use tracing::{info, warn};

/// Default HTTP port
pub const DEFAULT_PORT: u16 = 3001;

/// Default bind host
pub const DEFAULT_HOST: &str = "127.0.0.1";

/// Default CORS origin (the client's dev server)
pub const DEFAULT_CORS_ORIGIN: &str = "http://localhost:5173";

/// Default tracing filter directive
pub const DEFAULT_LOG_LEVEL: &str = "gymlog_api=info,tower_http=info";

/// Optional TOML configuration file contents
#[derive(Debug, Clone, Default, Deserialize, PartialEq)]
#[serde(default)]
pub struct TomlConfig {
    pub database_url: Option<String>,
    pub cors_origin: Option<String>,
    pub port: Option<u16>,
    pub host: Option<String>,
    pub log_level: Option<String>,
    pub static_dir: Option<PathBuf>,
}

/// Values supplied on the command line or through the environment
#[derive(Debug, Clone, Default)]
pub struct ConfigOverrides {
    pub database_url: Option<String>,
    pub cors_origin: Option<String>,
    pub port: Option<u16>,
    pub host: Option<String>,
    pub static_dir: Option<PathBuf>,
}

/// Fully resolved server configuration
#[derive(Debug, Clone, PartialEq)]
pub struct ServerConfig {
    pub database_url: String,
    pub cors_origin: String,
    pub port: u16,
    pub host: String,
    pub log_level: String,
    /// Directory holding the built single-page client, served at `/`
    pub static_dir: Option<PathBuf>,
}

impl ServerConfig {
    /// Merge overrides over the TOML file over compiled defaults
    pub fn resolve(overrides: ConfigOverrides, file: Option<TomlConfig>) -> Self {
        let file = file.unwrap_or_default();

        Self {
            database_url: overrides
                .database_url
                .or(file.database_url)
                .unwrap_or_else(default_database_url),
            cors_origin: overrides
                .cors_origin
                .or(file.cors_origin)
                .unwrap_or_else(|| DEFAULT_CORS_ORIGIN.to_string()),
            port: overrides.port.or(file.port).unwrap_or(DEFAULT_PORT),
            host: overrides
                .host
                .or(file.host)
                .unwrap_or_else(|| DEFAULT_HOST.to_string()),
            log_level: file
                .log_level
                .unwrap_or_else(|| DEFAULT_LOG_LEVEL.to_string()),
            static_dir: overrides.static_dir.or(file.static_dir),
        }
    }

    /// Socket address string for the listener
    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

/// Parse TOML configuration text
pub fn parse_toml_config(content: &str) -> Result<TomlConfig> {
    toml::from_str(content).map_err(|e| Error::Config(e.to_string()))
}

/// Load the TOML config file if present
///
/// A missing file is normal and yields `None`. A file that cannot be read or
/// parsed is logged and ignored so the service still starts on defaults.
pub fn load_toml_config(path: &Path) -> Option<TomlConfig> {
    if !path.exists() {
        info!("No config file at {} (using defaults)", path.display());
        return None;
    }

    let content = match std::fs::read_to_string(path) {
        Ok(content) => content,
        Err(e) => {
            warn!("Failed to read config file {}: {}", path.display(), e);
            return None;
        }
    };

    match parse_toml_config(&content) {
        Ok(config) => {
            info!("Loaded config file {}", path.display());
            Some(config)
        }
        Err(e) => {
            warn!("Ignoring malformed config file {}: {}", path.display(), e);
            None
        }
    }
}

/// Platform config file location: `<config dir>/gymlog/config.toml`
pub fn default_config_path() -> PathBuf {
    dirs::config_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("gymlog")
        .join("config.toml")
}

/// Platform data folder: `<local data dir>/gymlog`
pub fn default_data_folder() -> PathBuf {
    dirs::data_local_dir()
        .map(|d| d.join("gymlog"))
        .unwrap_or_else(|| PathBuf::from("./gymlog_data"))
}

/// Default SQLite database URL inside the platform data folder
pub fn default_database_url() -> String {
    format!(
        "sqlite://{}",
        default_data_folder().join("gymlog.db").display()
    )
}
