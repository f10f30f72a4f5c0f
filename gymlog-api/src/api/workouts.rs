//! Workout template ("workout") endpoints
//!
//! A template is a reusable, ordered list of exercises with target sets and
//! reps. Every write that touches links runs in one transaction and returns
//! the full detail so the editor can re-render without a second request.

use axum::{
    extract::State,
    http::StatusCode,
    routing::{get, post, put},
    Json, Router,
};
use gymlog_common::db::{TemplateExercise, TemplateSummary, WorkoutTemplate};
use serde::{Deserialize, Serialize};
use sqlx::SqliteConnection;
use std::collections::HashSet;
use tracing::info;

use super::{
    begin_write, check_targets, clean_text, require_name, ApiJson, ApiPath, DEFAULT_TARGET_REPS,
    DEFAULT_TARGET_SETS,
};
use crate::db::ordering::{self, Direction, LinkTable};
use crate::db::templates as queries;
use crate::error::{ApiError, ApiResult};
use crate::AppState;

#[derive(Debug, Deserialize)]
pub struct LinkRequest {
    pub exercise_id: i64,
    #[serde(default)]
    pub target_sets: Option<i64>,
    #[serde(default)]
    pub target_reps: Option<i64>,
}

impl LinkRequest {
    fn targets(&self) -> ApiResult<(i64, i64)> {
        let sets = self.target_sets.unwrap_or(DEFAULT_TARGET_SETS);
        let reps = self.target_reps.unwrap_or(DEFAULT_TARGET_REPS);
        check_targets(sets, reps)?;
        Ok((sets, reps))
    }
}

#[derive(Debug, Deserialize)]
pub struct CreateWorkoutRequest {
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub exercises: Vec<LinkRequest>,
}

#[derive(Debug, Deserialize)]
pub struct UpdateWorkoutRequest {
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct TargetsRequest {
    pub target_sets: i64,
    pub target_reps: i64,
}

#[derive(Debug, Deserialize)]
pub struct MoveRequest {
    pub direction: Direction,
}

/// Template with its links in `sort_order`
#[derive(Debug, Serialize)]
pub struct WorkoutDetail {
    #[serde(flatten)]
    pub template: WorkoutTemplate,
    pub exercises: Vec<TemplateExercise>,
}

async fn load_detail(conn: &mut SqliteConnection, id: i64) -> ApiResult<WorkoutDetail> {
    let template = queries::get_template(&mut *conn, id).await?;
    let exercises = queries::template_exercises(&mut *conn, id).await?;
    Ok(WorkoutDetail {
        template,
        exercises,
    })
}

/// GET /api/workouts
pub async fn list_workouts(
    State(state): State<AppState>,
) -> ApiResult<Json<Vec<TemplateSummary>>> {
    Ok(Json(queries::list_templates(&state.db).await?))
}

/// POST /api/workouts
pub async fn create_workout(
    State(state): State<AppState>,
    ApiJson(req): ApiJson<CreateWorkoutRequest>,
) -> ApiResult<(StatusCode, Json<WorkoutDetail>)> {
    let name = require_name(&req.name, "workout")?;
    let description = clean_text(req.description);

    let mut seen = HashSet::new();
    let mut links = Vec::with_capacity(req.exercises.len());
    for link in &req.exercises {
        if !seen.insert(link.exercise_id) {
            return Err(ApiError::BadRequest(format!(
                "exercise {} listed more than once",
                link.exercise_id
            )));
        }
        let (sets, reps) = link.targets()?;
        links.push((link.exercise_id, sets, reps));
    }

    let mut tx = begin_write(&state.db).await?;
    let template = queries::insert_template(&mut *tx, &name, description.as_deref()).await?;
    for (exercise_id, sets, reps) in links {
        queries::add_template_exercise(&mut tx, template.id, exercise_id, sets, reps).await?;
    }
    let detail = load_detail(&mut tx, template.id).await?;
    tx.commit().await?;

    info!(
        "Created workout {} '{}' with {} exercise(s)",
        detail.template.id,
        detail.template.name,
        detail.exercises.len()
    );
    Ok((StatusCode::CREATED, Json(detail)))
}

/// GET /api/workouts/:id
pub async fn get_workout(
    State(state): State<AppState>,
    ApiPath(id): ApiPath<i64>,
) -> ApiResult<Json<WorkoutDetail>> {
    let mut conn = state.db.acquire().await?;
    Ok(Json(load_detail(&mut conn, id).await?))
}

/// PUT /api/workouts/:id
pub async fn update_workout(
    State(state): State<AppState>,
    ApiPath(id): ApiPath<i64>,
    ApiJson(req): ApiJson<UpdateWorkoutRequest>,
) -> ApiResult<Json<WorkoutDetail>> {
    let name = require_name(&req.name, "workout")?;
    let description = clean_text(req.description);

    let mut tx = begin_write(&state.db).await?;
    queries::update_template(&mut *tx, id, &name, description.as_deref()).await?;
    let detail = load_detail(&mut tx, id).await?;
    tx.commit().await?;

    info!("Updated workout {}", id);
    Ok(Json(detail))
}

/// DELETE /api/workouts/:id
pub async fn delete_workout(
    State(state): State<AppState>,
    ApiPath(id): ApiPath<i64>,
) -> ApiResult<StatusCode> {
    let mut tx = begin_write(&state.db).await?;
    queries::delete_template(&mut tx, id).await?;
    tx.commit().await?;

    info!("Deleted workout {}", id);
    Ok(StatusCode::NO_CONTENT)
}

/// POST /api/workouts/:id/exercises
pub async fn add_workout_exercise(
    State(state): State<AppState>,
    ApiPath(id): ApiPath<i64>,
    ApiJson(req): ApiJson<LinkRequest>,
) -> ApiResult<(StatusCode, Json<WorkoutDetail>)> {
    let (sets, reps) = req.targets()?;

    let mut tx = begin_write(&state.db).await?;
    queries::add_template_exercise(&mut tx, id, req.exercise_id, sets, reps).await?;
    let detail = load_detail(&mut tx, id).await?;
    tx.commit().await?;

    info!("Added exercise {} to workout {}", req.exercise_id, id);
    Ok((StatusCode::CREATED, Json(detail)))
}

/// PUT /api/workouts/:id/exercises/:exercise_id
pub async fn update_workout_exercise(
    State(state): State<AppState>,
    ApiPath((id, exercise_id)): ApiPath<(i64, i64)>,
    ApiJson(req): ApiJson<TargetsRequest>,
) -> ApiResult<Json<WorkoutDetail>> {
    check_targets(req.target_sets, req.target_reps)?;

    let mut tx = begin_write(&state.db).await?;
    queries::update_template_exercise(&mut *tx, id, exercise_id, req.target_sets, req.target_reps)
        .await?;
    let detail = load_detail(&mut tx, id).await?;
    tx.commit().await?;

    Ok(Json(detail))
}

/// DELETE /api/workouts/:id/exercises/:exercise_id
pub async fn remove_workout_exercise(
    State(state): State<AppState>,
    ApiPath((id, exercise_id)): ApiPath<(i64, i64)>,
) -> ApiResult<Json<WorkoutDetail>> {
    let mut tx = begin_write(&state.db).await?;
    queries::get_template(&mut *tx, id).await?;
    ordering::remove_link(&mut tx, LinkTable::Template, id, exercise_id).await?;
    let detail = load_detail(&mut tx, id).await?;
    tx.commit().await?;

    info!("Removed exercise {} from workout {}", exercise_id, id);
    Ok(Json(detail))
}

/// POST /api/workouts/:id/exercises/:exercise_id/move
pub async fn move_workout_exercise(
    State(state): State<AppState>,
    ApiPath((id, exercise_id)): ApiPath<(i64, i64)>,
    ApiJson(req): ApiJson<MoveRequest>,
) -> ApiResult<Json<WorkoutDetail>> {
    let mut tx = begin_write(&state.db).await?;
    queries::get_template(&mut *tx, id).await?;
    ordering::move_link(&mut tx, LinkTable::Template, id, exercise_id, req.direction).await?;
    let detail = load_detail(&mut tx, id).await?;
    tx.commit().await?;

    Ok(Json(detail))
}

/// Build workout template routes
pub fn workout_routes() -> Router<AppState> {
    Router::new()
        .route("/api/workouts", get(list_workouts).post(create_workout))
        .route(
            "/api/workouts/:id",
            get(get_workout).put(update_workout).delete(delete_workout),
        )
        .route("/api/workouts/:id/exercises", post(add_workout_exercise))
        .route(
            "/api/workouts/:id/exercises/:exercise_id",
            put(update_workout_exercise).delete(remove_workout_exercise),
        )
        .route(
            "/api/workouts/:id/exercises/:exercise_id/move",
            post(move_workout_exercise),
        )
}
