//! Workout session and set logging endpoints

use axum::{
    extract::State,
    http::StatusCode,
    routing::{get, put},
    Json, Router,
};
use chrono::NaiveDate;
use gymlog_common::db::{ExerciseSet, SessionSummary, WorkoutSession};
use gymlog_common::time::today;
use serde::{Deserialize, Serialize};
use sqlx::SqliteConnection;
use std::collections::HashSet;
use tracing::info;

use super::{begin_write, clamp_limit, clean_text, optional_date, ApiJson, ApiPath, ApiQuery};
use crate::db::plans::{find_plan, get_plan};
use crate::db::sessions::{self as queries, SetInput};
use crate::db::templates::{find_template, get_template};
use crate::error::{ApiError, ApiResult};
use crate::AppState;

const DEFAULT_LIST_LIMIT: i64 = 50;
const MAX_LIST_LIMIT: i64 = 500;

/// Upper bound on sets logged for one exercise in one session
pub const MAX_SETS_PER_EXERCISE: usize = 50;

#[derive(Debug, Deserialize)]
pub struct SessionQuery {
    pub from: Option<String>,
    pub to: Option<String>,
    pub limit: Option<i64>,
}

#[derive(Debug, Deserialize)]
pub struct CreateSessionRequest {
    #[serde(default)]
    pub template_id: Option<i64>,
    #[serde(default)]
    pub plan_id: Option<i64>,
    #[serde(default)]
    pub performed_on: Option<String>,
    #[serde(default)]
    pub notes: Option<String>,
}

/// Partial update; absent fields keep their value, `notes: ""` clears
#[derive(Debug, Deserialize)]
pub struct UpdateSessionRequest {
    #[serde(default)]
    pub performed_on: Option<String>,
    #[serde(default)]
    pub notes: Option<String>,
    #[serde(default)]
    pub completed: Option<bool>,
}

#[derive(Debug, Deserialize)]
pub struct ReplaceSetsRequest {
    pub sets: Vec<SetInput>,
}

#[derive(Debug, Serialize)]
pub struct LoggedSet {
    pub set_number: i64,
    pub reps: i64,
    pub weight: Option<f64>,
}

#[derive(Debug, Serialize)]
pub struct SessionExercise {
    pub exercise_id: i64,
    pub name: String,
    pub sets: Vec<LoggedSet>,
}

#[derive(Debug, Serialize)]
pub struct SessionDetail {
    #[serde(flatten)]
    pub session: WorkoutSession,
    pub template_name: Option<String>,
    pub plan_name: Option<String>,
    pub exercises: Vec<SessionExercise>,
}

/// Planned exercises first in plan (or template) order, then anything else
/// that was logged, by name
async fn load_detail(conn: &mut SqliteConnection, id: i64) -> ApiResult<SessionDetail> {
    let session = queries::get_session(&mut *conn, id).await?;

    let template_name = match session.template_id {
        Some(template_id) => find_template(&mut *conn, template_id).await?.map(|t| t.name),
        None => None,
    };
    let plan_name = match session.plan_id {
        Some(plan_id) => find_plan(&mut *conn, plan_id).await?.map(|p| p.name),
        None => None,
    };

    let mut order = queries::planned_exercise_order(conn, &session).await?;
    let planned: HashSet<i64> = order.iter().map(|(id, _)| *id).collect();
    order.extend(
        queries::logged_exercise_names(conn, id)
            .await?
            .into_iter()
            .filter(|(exercise_id, _)| !planned.contains(exercise_id)),
    );

    let sets = queries::session_sets(&mut *conn, id).await?;
    let exercises = order
        .into_iter()
        .map(|(exercise_id, name)| SessionExercise {
            exercise_id,
            name,
            sets: sets
                .iter()
                .filter(|s| s.exercise_id == exercise_id)
                .map(|s| LoggedSet {
                    set_number: s.set_number,
                    reps: s.reps,
                    weight: s.weight,
                })
                .collect(),
        })
        .collect();

    Ok(SessionDetail {
        session,
        template_name,
        plan_name,
        exercises,
    })
}

fn validate_sets(sets: &[SetInput]) -> ApiResult<()> {
    if sets.len() > MAX_SETS_PER_EXERCISE {
        return Err(ApiError::BadRequest(format!(
            "at most {} sets per exercise (got {})",
            MAX_SETS_PER_EXERCISE,
            sets.len()
        )));
    }
    for (index, set) in sets.iter().enumerate() {
        if set.reps < 0 {
            return Err(ApiError::BadRequest(format!(
                "set {}: reps must not be negative",
                index + 1
            )));
        }
        if matches!(set.weight, Some(w) if !w.is_finite() || w < 0.0) {
            return Err(ApiError::BadRequest(format!(
                "set {}: weight must be a non-negative number",
                index + 1
            )));
        }
    }
    Ok(())
}

/// GET /api/sessions?from=&to=&limit=
pub async fn list_sessions(
    State(state): State<AppState>,
    ApiQuery(query): ApiQuery<SessionQuery>,
) -> ApiResult<Json<Vec<SessionSummary>>> {
    let from = optional_date(query.from.as_deref())?;
    let to = optional_date(query.to.as_deref())?;
    if let (Some(from), Some(to)) = (from, to) {
        if from > to {
            return Err(ApiError::BadRequest(format!(
                "from ({}) is after to ({})",
                from, to
            )));
        }
    }
    let limit = clamp_limit(query.limit, DEFAULT_LIST_LIMIT, MAX_LIST_LIMIT)?;

    Ok(Json(queries::list_sessions(&state.db, from, to, limit).await?))
}

/// POST /api/sessions
///
/// A plan determines the template; an explicit template that disagrees with
/// the plan's is rejected. The date defaults to the plan's date, else today.
pub async fn create_session(
    State(state): State<AppState>,
    ApiJson(req): ApiJson<CreateSessionRequest>,
) -> ApiResult<(StatusCode, Json<SessionDetail>)> {
    let performed_on = optional_date(req.performed_on.as_deref())?;
    let notes = clean_text(req.notes);

    let mut tx = begin_write(&state.db).await?;

    let (template_id, default_date): (i64, Option<NaiveDate>) = match (req.plan_id, req.template_id)
    {
        (Some(plan_id), explicit) => {
            let plan = get_plan(&mut *tx, plan_id).await?;
            if let Some(template_id) = explicit.filter(|t| *t != plan.template_id) {
                return Err(ApiError::BadRequest(format!(
                    "plan {} belongs to workout {}, not {}",
                    plan_id, plan.template_id, template_id
                )));
            }
            (plan.template_id, plan.planned_for)
        }
        (None, Some(template_id)) => {
            get_template(&mut *tx, template_id).await?;
            (template_id, None)
        }
        (None, None) => {
            return Err(ApiError::BadRequest(
                "a session needs a template_id or a plan_id".to_string(),
            ))
        }
    };

    let performed_on = performed_on.or(default_date).unwrap_or_else(today);
    let session = queries::insert_session(
        &mut *tx,
        Some(template_id),
        req.plan_id,
        performed_on,
        notes.as_deref(),
    )
    .await?;
    let detail = load_detail(&mut tx, session.id).await?;
    tx.commit().await?;

    info!(
        "Started session {} for workout {} on {}",
        detail.session.id, template_id, performed_on
    );
    Ok((StatusCode::CREATED, Json(detail)))
}

/// GET /api/sessions/:id
pub async fn get_session(
    State(state): State<AppState>,
    ApiPath(id): ApiPath<i64>,
) -> ApiResult<Json<SessionDetail>> {
    let mut conn = state.db.acquire().await?;
    Ok(Json(load_detail(&mut conn, id).await?))
}

/// PUT /api/sessions/:id
pub async fn update_session(
    State(state): State<AppState>,
    ApiPath(id): ApiPath<i64>,
    ApiJson(req): ApiJson<UpdateSessionRequest>,
) -> ApiResult<Json<SessionDetail>> {
    let performed_on = optional_date(req.performed_on.as_deref())?;

    let mut tx = begin_write(&state.db).await?;
    let existing = queries::get_session(&mut *tx, id).await?;

    let notes = match req.notes {
        Some(notes) => clean_text(Some(notes)),
        None => existing.notes,
    };
    queries::update_session(
        &mut *tx,
        id,
        performed_on.unwrap_or(existing.performed_on),
        notes.as_deref(),
        req.completed.unwrap_or(existing.completed),
    )
    .await?;
    let detail = load_detail(&mut tx, id).await?;
    tx.commit().await?;

    info!("Updated session {}", id);
    Ok(Json(detail))
}

/// DELETE /api/sessions/:id
pub async fn delete_session(
    State(state): State<AppState>,
    ApiPath(id): ApiPath<i64>,
) -> ApiResult<StatusCode> {
    let mut tx = begin_write(&state.db).await?;
    queries::delete_session(&mut tx, id).await?;
    tx.commit().await?;

    info!("Deleted session {}", id);
    Ok(StatusCode::NO_CONTENT)
}

/// GET /api/sessions/:id/sets
pub async fn list_session_sets(
    State(state): State<AppState>,
    ApiPath(id): ApiPath<i64>,
) -> ApiResult<Json<Vec<ExerciseSet>>> {
    let mut conn = state.db.acquire().await?;
    queries::get_session(&mut *conn, id).await?;
    Ok(Json(queries::session_sets(&mut *conn, id).await?))
}

/// PUT /api/sessions/:id/exercises/:exercise_id/sets
///
/// Replaces every set of the exercise in the session. An empty list clears.
pub async fn replace_sets(
    State(state): State<AppState>,
    ApiPath((id, exercise_id)): ApiPath<(i64, i64)>,
    ApiJson(req): ApiJson<ReplaceSetsRequest>,
) -> ApiResult<Json<Vec<ExerciseSet>>> {
    validate_sets(&req.sets)?;

    let mut tx = begin_write(&state.db).await?;
    let sets = queries::replace_sets(&mut tx, id, exercise_id, &req.sets).await?;
    tx.commit().await?;

    info!(
        "Logged {} set(s) of exercise {} in session {}",
        sets.len(),
        exercise_id,
        id
    );
    Ok(Json(sets))
}

/// Build session routes
pub fn session_routes() -> Router<AppState> {
    Router::new()
        .route("/api/sessions", get(list_sessions).post(create_session))
        .route(
            "/api/sessions/:id",
            get(get_session).put(update_session).delete(delete_session),
        )
        .route("/api/sessions/:id/sets", get(list_session_sets))
        .route(
            "/api/sessions/:id/exercises/:exercise_id/sets",
            put(replace_sets),
        )
}

#[cfg(test)]
mod tests {
    use super::*;

    fn set(reps: i64, weight: Option<f64>) -> SetInput {
        SetInput { reps, weight }
    }

    #[test]
    fn test_validate_sets() {
        assert!(validate_sets(&[]).is_ok());
        assert!(validate_sets(&[set(0, None), set(8, Some(0.0))]).is_ok());
        assert!(validate_sets(&[set(-1, None)]).is_err());
        assert!(validate_sets(&[set(5, Some(-10.0))]).is_err());

        let too_many = vec![set(5, None); MAX_SETS_PER_EXERCISE + 1];
        assert!(validate_sets(&too_many).is_err());
        assert!(validate_sets(&too_many[..MAX_SETS_PER_EXERCISE]).is_ok());
    }
}
