//! gymlog-api library - workout tracker REST service
//!
//! JSON API over SQLite for exercises, workout templates, plans, sessions,
//! logged sets and a date-keyed calendar.

use axum::{routing::get, Router};
use sqlx::SqlitePool;

pub mod api;
pub mod cli;
pub mod db;
pub mod error;
pub mod server;
pub mod tsv;

/// Application state shared across HTTP handlers
#[derive(Clone)]
pub struct AppState {
    /// Database connection pool
    pub db: SqlitePool,
}

impl AppState {
    pub fn new(db: SqlitePool) -> Self {
        Self { db }
    }
}

/// Build the API router
///
/// Cross-cutting layers (CORS, request tracing, static client) are added by
/// [`server::build_app`].
pub fn build_router(state: AppState) -> Router {
    Router::new()
        .merge(api::health_routes())
        .route("/api/buildinfo", get(api::get_build_info))
        .merge(api::exercise_routes())
        .merge(api::workout_routes())
        .merge(api::plan_routes())
        .merge(api::session_routes())
        .merge(api::calendar_routes())
        .with_state(state)
}
