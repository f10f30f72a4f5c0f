//! HTTP server setup
//!
//! Wraps the API router with CORS, request tracing and the optional static
//! client, then serves it until Ctrl+C or SIGTERM.

use axum::http::{header, HeaderValue, Method};
use axum::Router;
use gymlog_common::config::ServerConfig;
use gymlog_common::{Error, Result};
use std::path::Path;
use tokio::signal;
use tower_http::cors::{AllowOrigin, CorsLayer};
use tower_http::services::{ServeDir, ServeFile};
use tower_http::trace::TraceLayer;
use tracing::{error, info};

use crate::{build_router, AppState};

/// CORS policy for the configured origin(s)
///
/// `*` allows any origin; otherwise a comma-separated list of exact origins.
pub fn cors_layer(origins: &str) -> Result<CorsLayer> {
    let allow_origin = if origins.trim() == "*" {
        AllowOrigin::any()
    } else {
        let parsed = origins
            .split(',')
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(|s| {
                HeaderValue::from_str(s)
                    .map_err(|_| Error::Config(format!("invalid CORS origin '{}'", s)))
            })
            .collect::<Result<Vec<_>>>()?;

        if parsed.is_empty() {
            return Err(Error::Config("no CORS origin configured".to_string()));
        }
        AllowOrigin::list(parsed)
    };

    Ok(CorsLayer::new()
        .allow_origin(allow_origin)
        .allow_headers([header::CONTENT_TYPE, header::ACCEPT])
        .allow_methods([
            Method::GET,
            Method::POST,
            Method::PUT,
            Method::DELETE,
            Method::OPTIONS,
        ]))
}

/// Serve a built single-page client, falling back to its `index.html`
fn with_static_client(router: Router, dir: &Path) -> Router {
    let index = dir.join("index.html");
    router.fallback_service(ServeDir::new(dir).fallback(ServeFile::new(index)))
}

/// Full application: API routes plus configured layers
pub fn build_app(state: AppState, config: &ServerConfig) -> Result<Router> {
    let mut app = build_router(state);

    if let Some(dir) = &config.static_dir {
        info!("Serving web client from {}", dir.display());
        app = with_static_client(app, dir);
    }

    Ok(app
        .layer(cors_layer(&config.cors_origin)?)
        .layer(TraceLayer::new_for_http()))
}

/// Bind and serve until a shutdown signal arrives
pub async fn run(app: Router, config: &ServerConfig) -> Result<()> {
    let addr = config.bind_addr();
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    info!("gymlog-api listening on http://{}", addr);
    info!("Health check: http://{}/health", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("Server shutdown complete");
    Ok(())
}

/// Graceful shutdown signal handler
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            error!("Failed to install Ctrl+C handler: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut stream) => {
                stream.recv().await;
            }
            Err(e) => {
                error!("Failed to install SIGTERM handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            info!("Received Ctrl+C, shutting down");
        },
        _ = terminate => {
            info!("Received terminate signal, shutting down");
        },
    }
}
