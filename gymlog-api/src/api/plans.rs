//! Workout plan endpoints
//!
//! A plan is derived from a template and may then diverge: its links carry
//! their own targets and an optional target weight.

use axum::{
    extract::State,
    http::StatusCode,
    routing::{get, post, put},
    Json, Router,
};
use gymlog_common::db::{PlanExercise, PlanSummary, WorkoutPlan};
use serde::{Deserialize, Serialize};
use sqlx::SqliteConnection;
use tracing::info;

use super::{
    begin_write, check_targets, check_weight, clean_text, optional_date, require_name, ApiJson,
    ApiPath, DEFAULT_TARGET_REPS, DEFAULT_TARGET_SETS,
};
use crate::db::ordering::{self, Direction, LinkTable};
use crate::db::plans as queries;
use crate::db::templates::get_template;
use crate::error::ApiResult;
use crate::AppState;

#[derive(Debug, Deserialize)]
pub struct CreatePlanRequest {
    pub template_id: i64,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub planned_for: Option<String>,
    #[serde(default)]
    pub notes: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct UpdatePlanRequest {
    pub name: String,
    #[serde(default)]
    pub planned_for: Option<String>,
    #[serde(default)]
    pub notes: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct PlanLinkRequest {
    pub exercise_id: i64,
    #[serde(default)]
    pub target_sets: Option<i64>,
    #[serde(default)]
    pub target_reps: Option<i64>,
    #[serde(default)]
    pub target_weight: Option<f64>,
}

#[derive(Debug, Deserialize)]
pub struct PlanTargetsRequest {
    pub target_sets: i64,
    pub target_reps: i64,
    #[serde(default)]
    pub target_weight: Option<f64>,
}

#[derive(Debug, Deserialize)]
pub struct MoveRequest {
    pub direction: Direction,
}

#[derive(Debug, Serialize)]
pub struct PlanDetail {
    #[serde(flatten)]
    pub plan: WorkoutPlan,
    pub template_name: String,
    pub exercises: Vec<PlanExercise>,
}

async fn load_detail(conn: &mut SqliteConnection, id: i64) -> ApiResult<PlanDetail> {
    let plan = queries::get_plan(&mut *conn, id).await?;
    let template = get_template(&mut *conn, plan.template_id).await?;
    let exercises = queries::plan_exercises(&mut *conn, id).await?;
    Ok(PlanDetail {
        plan,
        template_name: template.name,
        exercises,
    })
}

/// GET /api/plans
pub async fn list_plans(State(state): State<AppState>) -> ApiResult<Json<Vec<PlanSummary>>> {
    Ok(Json(queries::list_plans(&state.db).await?))
}

/// POST /api/plans
pub async fn create_plan(
    State(state): State<AppState>,
    ApiJson(req): ApiJson<CreatePlanRequest>,
) -> ApiResult<(StatusCode, Json<PlanDetail>)> {
    let name = match req.name.as_deref() {
        Some(name) => Some(require_name(name, "plan")?),
        None => None,
    };
    let planned_for = optional_date(req.planned_for.as_deref())?;
    let notes = clean_text(req.notes);

    let mut tx = begin_write(&state.db).await?;
    let plan = queries::create_plan_from_template(
        &mut tx,
        req.template_id,
        name.as_deref(),
        planned_for,
        notes.as_deref(),
    )
    .await?;
    let detail = load_detail(&mut tx, plan.id).await?;
    tx.commit().await?;

    info!(
        "Created plan {} '{}' from workout {}",
        detail.plan.id, detail.plan.name, detail.plan.template_id
    );
    Ok((StatusCode::CREATED, Json(detail)))
}

/// GET /api/plans/:id
pub async fn get_plan(
    State(state): State<AppState>,
    ApiPath(id): ApiPath<i64>,
) -> ApiResult<Json<PlanDetail>> {
    let mut conn = state.db.acquire().await?;
    Ok(Json(load_detail(&mut conn, id).await?))
}

/// PUT /api/plans/:id
pub async fn update_plan(
    State(state): State<AppState>,
    ApiPath(id): ApiPath<i64>,
    ApiJson(req): ApiJson<UpdatePlanRequest>,
) -> ApiResult<Json<PlanDetail>> {
    let name = require_name(&req.name, "plan")?;
    let planned_for = optional_date(req.planned_for.as_deref())?;
    let notes = clean_text(req.notes);

    let mut tx = begin_write(&state.db).await?;
    queries::update_plan(&mut *tx, id, &name, planned_for, notes.as_deref()).await?;
    let detail = load_detail(&mut tx, id).await?;
    tx.commit().await?;

    info!("Updated plan {}", id);
    Ok(Json(detail))
}

/// DELETE /api/plans/:id
///
/// Sessions survive with `plan_id` cleared; calendar rows go with the plan.
pub async fn delete_plan(
    State(state): State<AppState>,
    ApiPath(id): ApiPath<i64>,
) -> ApiResult<StatusCode> {
    let mut tx = begin_write(&state.db).await?;
    queries::delete_plan(&mut tx, id).await?;
    tx.commit().await?;

    info!("Deleted plan {}", id);
    Ok(StatusCode::NO_CONTENT)
}

/// POST /api/plans/:id/exercises
pub async fn add_plan_exercise(
    State(state): State<AppState>,
    ApiPath(id): ApiPath<i64>,
    ApiJson(req): ApiJson<PlanLinkRequest>,
) -> ApiResult<(StatusCode, Json<PlanDetail>)> {
    let sets = req.target_sets.unwrap_or(DEFAULT_TARGET_SETS);
    let reps = req.target_reps.unwrap_or(DEFAULT_TARGET_REPS);
    check_targets(sets, reps)?;
    check_weight(req.target_weight, "target_weight")?;

    let mut tx = begin_write(&state.db).await?;
    queries::add_plan_exercise(&mut tx, id, req.exercise_id, sets, reps, req.target_weight)
        .await?;
    let detail = load_detail(&mut tx, id).await?;
    tx.commit().await?;

    info!("Added exercise {} to plan {}", req.exercise_id, id);
    Ok((StatusCode::CREATED, Json(detail)))
}

/// PUT /api/plans/:id/exercises/:exercise_id
pub async fn update_plan_exercise(
    State(state): State<AppState>,
    ApiPath((id, exercise_id)): ApiPath<(i64, i64)>,
    ApiJson(req): ApiJson<PlanTargetsRequest>,
) -> ApiResult<Json<PlanDetail>> {
    check_targets(req.target_sets, req.target_reps)?;
    check_weight(req.target_weight, "target_weight")?;

    let mut tx = begin_write(&state.db).await?;
    queries::update_plan_exercise(
        &mut *tx,
        id,
        exercise_id,
        req.target_sets,
        req.target_reps,
        req.target_weight,
    )
    .await?;
    let detail = load_detail(&mut tx, id).await?;
    tx.commit().await?;

    Ok(Json(detail))
}

/// DELETE /api/plans/:id/exercises/:exercise_id
pub async fn remove_plan_exercise(
    State(state): State<AppState>,
    ApiPath((id, exercise_id)): ApiPath<(i64, i64)>,
) -> ApiResult<Json<PlanDetail>> {
    let mut tx = begin_write(&state.db).await?;
    queries::get_plan(&mut *tx, id).await?;
    ordering::remove_link(&mut tx, LinkTable::Plan, id, exercise_id).await?;
    let detail = load_detail(&mut tx, id).await?;
    tx.commit().await?;

    info!("Removed exercise {} from plan {}", exercise_id, id);
    Ok(Json(detail))
}

/// POST /api/plans/:id/exercises/:exercise_id/move
pub async fn move_plan_exercise(
    State(state): State<AppState>,
    ApiPath((id, exercise_id)): ApiPath<(i64, i64)>,
    ApiJson(req): ApiJson<MoveRequest>,
) -> ApiResult<Json<PlanDetail>> {
    let mut tx = begin_write(&state.db).await?;
    queries::get_plan(&mut *tx, id).await?;
    ordering::move_link(&mut tx, LinkTable::Plan, id, exercise_id, req.direction).await?;
    let detail = load_detail(&mut tx, id).await?;
    tx.commit().await?;

    Ok(Json(detail))
}

/// Build plan routes, including TSV import
pub fn plan_routes() -> Router<AppState> {
    Router::new()
        .route("/api/plans", get(list_plans).post(create_plan))
        .route("/api/plans/import", post(super::import::import_plans))
        .route(
            "/api/plans/:id",
            get(get_plan).put(update_plan).delete(delete_plan),
        )
        .route("/api/plans/:id/exercises", post(add_plan_exercise))
        .route(
            "/api/plans/:id/exercises/:exercise_id",
            put(update_plan_exercise).delete(remove_plan_exercise),
        )
        .route(
            "/api/plans/:id/exercises/:exercise_id/move",
            post(move_plan_exercise),
        )
}
