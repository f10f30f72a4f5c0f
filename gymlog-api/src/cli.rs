//! Command-line arguments
//!
//! Every flag can also come from its environment variable; clap applies the
//! flag-over-env precedence. The TOML file and compiled defaults are merged
//! afterwards by [`ServerConfig::resolve`](gymlog_common::config::ServerConfig::resolve).

use clap::Parser;
use gymlog_common::config::{default_config_path, ConfigOverrides};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "gymlog-api")]
#[command(about = "Workout tracker REST API")]
#[command(version)]
pub struct Args {
    /// SQLite database URL (sqlite://path or sqlite::memory:)
    #[arg(long, env = "DATABASE_URL")]
    pub database_url: Option<String>,

    /// Allowed CORS origin(s), comma-separated; "*" allows any
    #[arg(long, env = "CORS_ORIGIN")]
    pub cors_origin: Option<String>,

    /// Port to listen on
    #[arg(short, long, env = "PORT")]
    pub port: Option<u16>,

    /// Address to bind
    #[arg(long, env = "GYMLOG_HOST")]
    pub host: Option<String>,

    /// Path to the TOML config file
    #[arg(short, long, env = "GYMLOG_CONFIG")]
    pub config: Option<PathBuf>,

    /// Directory of the built web client to serve at /
    #[arg(long, env = "GYMLOG_STATIC_DIR")]
    pub static_dir: Option<PathBuf>,
}

impl Args {
    pub fn overrides(&self) -> ConfigOverrides {
        ConfigOverrides {
            database_url: self.database_url.clone(),
            cors_origin: self.cors_origin.clone(),
            port: self.port,
            host: self.host.clone(),
            static_dir: self.static_dir.clone(),
        }
    }

    /// Explicit config path, else the platform default
    pub fn config_path(&self) -> PathBuf {
        self.config.clone().unwrap_or_else(default_config_path)
    }
}
