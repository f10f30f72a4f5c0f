//! Exercise catalogue endpoints

use axum::{
    extract::State,
    http::StatusCode,
    routing::get,
    Json, Router,
};
use chrono::NaiveDate;
use gymlog_common::db::{Exercise, ExerciseSet};
use serde::{Deserialize, Serialize};
use tracing::info;

use super::{begin_write, clamp_limit, clean_text, require_name, ApiJson, ApiPath, ApiQuery};
use crate::db::exercises as queries;
use crate::error::ApiResult;
use crate::AppState;

const DEFAULT_HISTORY_LIMIT: i64 = 10;
const MAX_HISTORY_LIMIT: i64 = 100;

/// Body for create and update
#[derive(Debug, Deserialize)]
pub struct ExerciseRequest {
    pub name: String,
    #[serde(default)]
    pub muscle_group: Option<String>,
    #[serde(default)]
    pub notes: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct HistoryQuery {
    pub limit: Option<i64>,
}

/// One past session in which the exercise was logged
#[derive(Debug, Serialize)]
pub struct HistoryEntry {
    pub session_id: i64,
    pub performed_on: NaiveDate,
    pub sets: Vec<ExerciseSet>,
}

#[derive(Debug, Serialize)]
pub struct ExerciseHistory {
    pub exercise: Exercise,
    pub sessions: Vec<HistoryEntry>,
}

/// GET /api/exercises
pub async fn list_exercises(State(state): State<AppState>) -> ApiResult<Json<Vec<Exercise>>> {
    Ok(Json(queries::list_exercises(&state.db).await?))
}

/// POST /api/exercises
pub async fn create_exercise(
    State(state): State<AppState>,
    ApiJson(req): ApiJson<ExerciseRequest>,
) -> ApiResult<(StatusCode, Json<Exercise>)> {
    let name = require_name(&req.name, "exercise")?;
    let muscle_group = clean_text(req.muscle_group);
    let notes = clean_text(req.notes);

    let exercise = queries::insert_exercise(
        &state.db,
        &name,
        muscle_group.as_deref(),
        notes.as_deref(),
    )
    .await?;

    info!("Created exercise {} '{}'", exercise.id, exercise.name);
    Ok((StatusCode::CREATED, Json(exercise)))
}

/// GET /api/exercises/:id
pub async fn get_exercise(
    State(state): State<AppState>,
    ApiPath(id): ApiPath<i64>,
) -> ApiResult<Json<Exercise>> {
    Ok(Json(queries::get_exercise(&state.db, id).await?))
}

/// PUT /api/exercises/:id
pub async fn update_exercise(
    State(state): State<AppState>,
    ApiPath(id): ApiPath<i64>,
    ApiJson(req): ApiJson<ExerciseRequest>,
) -> ApiResult<Json<Exercise>> {
    let name = require_name(&req.name, "exercise")?;
    let muscle_group = clean_text(req.muscle_group);
    let notes = clean_text(req.notes);

    let exercise = queries::update_exercise(
        &state.db,
        id,
        &name,
        muscle_group.as_deref(),
        notes.as_deref(),
    )
    .await?;

    info!("Updated exercise {}", id);
    Ok(Json(exercise))
}

/// DELETE /api/exercises/:id
///
/// Refused with 409 while any template, plan or logged set uses it.
pub async fn delete_exercise(
    State(state): State<AppState>,
    ApiPath(id): ApiPath<i64>,
) -> ApiResult<StatusCode> {
    let mut tx = begin_write(&state.db).await?;
    queries::delete_exercise(&mut tx, id).await?;
    tx.commit().await?;

    info!("Deleted exercise {}", id);
    Ok(StatusCode::NO_CONTENT)
}

/// GET /api/exercises/:id/history?limit=
///
/// Most recent sessions containing the exercise, newest first, each with its
/// sets. The runner shows these as "last time".
pub async fn exercise_history(
    State(state): State<AppState>,
    ApiPath(id): ApiPath<i64>,
    ApiQuery(query): ApiQuery<HistoryQuery>,
) -> ApiResult<Json<ExerciseHistory>> {
    let limit = clamp_limit(query.limit, DEFAULT_HISTORY_LIMIT, MAX_HISTORY_LIMIT)?;

    let mut conn = state.db.acquire().await?;
    let exercise = queries::get_exercise(&mut *conn, id).await?;

    let mut sessions = Vec::new();
    for (session_id, performed_on) in queries::recent_session_ids(&mut conn, id, limit).await? {
        let sets = queries::sets_for_session_exercise(&mut *conn, session_id, id).await?;
        sessions.push(HistoryEntry {
            session_id,
            performed_on,
            sets,
        });
    }

    Ok(Json(ExerciseHistory { exercise, sessions }))
}

/// Build exercise routes
pub fn exercise_routes() -> Router<AppState> {
    Router::new()
        .route("/api/exercises", get(list_exercises).post(create_exercise))
        .route(
            "/api/exercises/:id",
            get(get_exercise).put(update_exercise).delete(delete_exercise),
        )
        .route("/api/exercises/:id/history", get(exercise_history))
}
