//! HTTP API handlers for gymlog-api
//!
//! One module per resource, each exposing a `*_routes()` builder merged by
//! [`crate::build_router`]. Shared request validation lives here.

pub mod buildinfo;
pub mod calendar;
pub mod exercises;
pub mod extract;
pub mod health;
pub mod import;
pub mod plans;
pub mod sessions;
pub mod workouts;

pub use buildinfo::get_build_info;
pub use calendar::calendar_routes;
pub use exercises::exercise_routes;
pub use extract::{ApiJson, ApiPath, ApiQuery};
pub use health::health_routes;
pub use plans::plan_routes;
pub use sessions::session_routes;
pub use workouts::workout_routes;

use crate::error::{ApiError, ApiResult};
use chrono::NaiveDate;
use gymlog_common::time::parse_optional_date;
use sqlx::{Sqlite, SqlitePool, Transaction};

/// Default targets for a new link
pub const DEFAULT_TARGET_SETS: i64 = 3;
pub const DEFAULT_TARGET_REPS: i64 = 10;

/// Start a write transaction holding SQLite's write lock from the outset
///
/// A deferred `BEGIN` that reads first fails with SQLITE_BUSY when another
/// writer commits before its lock upgrade; `busy_timeout` cannot retry that.
pub(crate) async fn begin_write(pool: &SqlitePool) -> ApiResult<Transaction<'static, Sqlite>> {
    Ok(pool.begin_with("BEGIN IMMEDIATE").await?)
}

/// Trimmed, non-empty name
pub(crate) fn require_name(value: &str, what: &str) -> ApiResult<String> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(ApiError::BadRequest(format!("{} name must not be empty", what)));
    }
    Ok(trimmed.to_string())
}

/// Trimmed free text; blank becomes `None`
pub(crate) fn clean_text(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

pub(crate) fn check_targets(target_sets: i64, target_reps: i64) -> ApiResult<()> {
    if target_sets < 1 || target_reps < 1 {
        return Err(ApiError::BadRequest(format!(
            "targets must be at least 1 (got {} sets x {} reps)",
            target_sets, target_reps
        )));
    }
    Ok(())
}

pub(crate) fn check_weight(weight: Option<f64>, what: &str) -> ApiResult<()> {
    match weight {
        Some(w) if !w.is_finite() || w < 0.0 => Err(ApiError::BadRequest(format!(
            "{} must be a non-negative number",
            what
        ))),
        _ => Ok(()),
    }
}

/// Optional `YYYY-MM-DD` from a body or query field
pub(crate) fn optional_date(value: Option<&str>) -> ApiResult<Option<NaiveDate>> {
    Ok(parse_optional_date(value)?)
}

/// Resolve a `limit` query parameter against a default and a ceiling
pub(crate) fn clamp_limit(limit: Option<i64>, default: i64, max: i64) -> ApiResult<i64> {
    match limit {
        None => Ok(default),
        Some(n) if n < 1 => Err(ApiError::BadRequest(format!(
            "limit must be at least 1 (got {})",
            n
        ))),
        Some(n) => Ok(n.min(max)),
    }
}
