//! gymlog-api - workout tracker REST service
//!
//! Resolves configuration (flags, environment, TOML file, defaults), opens
//! the SQLite database, and serves the JSON API.

use anyhow::{Context, Result};
use clap::Parser;
use gymlog_common::config::{load_toml_config, ServerConfig, DEFAULT_LOG_LEVEL};
use gymlog_common::db::init_database;
use gymlog_api::cli::Args;
use gymlog_api::{server, AppState};
use tracing::{error, info, warn};
use tracing_subscriber::{layer::SubscriberExt, reload, util::SubscriberInitExt, EnvFilter};

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    // RUST_LOG wins; otherwise the config file's log_level is applied once read
    let from_env = EnvFilter::try_from_default_env().ok();
    let env_filter_set = from_env.is_some();
    let (filter, filter_handle) =
        reload::Layer::new(from_env.unwrap_or_else(|| EnvFilter::new(DEFAULT_LOG_LEVEL)));

    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer())
        .init();

    // Build identification first, before any database delay
    info!(
        "Starting gymlog-api v{} [{}] built {} ({})",
        env!("CARGO_PKG_VERSION"),
        env!("GIT_HASH"),
        env!("BUILD_TIMESTAMP"),
        env!("BUILD_PROFILE")
    );

    let config_path = args.config_path();
    let file_config = load_toml_config(&config_path);
    let config = ServerConfig::resolve(args.overrides(), file_config);

    if !env_filter_set && config.log_level != DEFAULT_LOG_LEVEL {
        match EnvFilter::try_new(&config.log_level) {
            Ok(filter) => {
                filter_handle
                    .reload(filter)
                    .context("Failed to apply log level")?;
                info!("Log level: {}", config.log_level);
            }
            Err(e) => warn!("Ignoring invalid log_level '{}': {}", config.log_level, e),
        }
    }

    info!("Database: {}", config.database_url);
    let pool = match init_database(&config.database_url).await {
        Ok(pool) => {
            info!("✓ Database ready");
            pool
        }
        Err(e) => {
            error!("Failed to open database: {}", e);
            return Err(e).context("Failed to initialize database");
        }
    };

    info!("CORS origin: {}", config.cors_origin);
    let app = server::build_app(AppState::new(pool), &config)
        .context("Failed to build application")?;

    server::run(app, &config).await.context("Server error")?;
    Ok(())
}
