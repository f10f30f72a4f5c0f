//! Calendar endpoints
//!
//! The calendar maps a date to at most one plan. The week view always
//! returns Monday through Sunday, filling unscheduled days with `null`.

use axum::{
    extract::State,
    http::StatusCode,
    routing::{get, put},
    Json, Router,
};
use chrono::NaiveDate;
use gymlog_common::db::CalendarEntry;
use gymlog_common::time::{days_inclusive, parse_date, today, week_bounds, week_days, weekday_name};
use serde::{Deserialize, Serialize};
use tracing::info;

use super::{begin_write, clean_text, optional_date, ApiJson, ApiPath, ApiQuery};
use crate::db::calendar as queries;
use crate::error::{ApiError, ApiResult};
use crate::AppState;

/// Longest range the range query will return
pub const MAX_RANGE_DAYS: i64 = 366;

#[derive(Debug, Deserialize)]
pub struct WeekQuery {
    pub date: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct RangeQuery {
    pub from: String,
    pub to: String,
}

#[derive(Debug, Deserialize)]
pub struct ScheduleRequest {
    pub plan_id: i64,
    #[serde(default)]
    pub notes: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct ScheduledPlan {
    pub id: i64,
    pub name: String,
    pub template_name: String,
}

#[derive(Debug, Serialize)]
pub struct CalendarDay {
    pub date: NaiveDate,
    pub weekday: &'static str,
    pub plan: Option<ScheduledPlan>,
    pub notes: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct CalendarWeek {
    pub week_start: NaiveDate,
    pub week_end: NaiveDate,
    pub days: Vec<CalendarDay>,
}

/// Lay entries onto the seven days of the week containing `date`
fn build_week(date: NaiveDate, entries: Vec<CalendarEntry>) -> CalendarWeek {
    let (week_start, week_end) = week_bounds(date);

    let days = week_days(date)
        .into_iter()
        .map(|day| {
            let entry = entries.iter().find(|e| e.date == day);
            CalendarDay {
                date: day,
                weekday: weekday_name(day),
                plan: entry.map(|e| ScheduledPlan {
                    id: e.plan_id,
                    name: e.plan_name.clone(),
                    template_name: e.template_name.clone(),
                }),
                notes: entry.and_then(|e| e.notes.clone()),
            }
        })
        .collect();

    CalendarWeek {
        week_start,
        week_end,
        days,
    }
}

/// GET /api/calendar?date=
pub async fn get_week(
    State(state): State<AppState>,
    ApiQuery(query): ApiQuery<WeekQuery>,
) -> ApiResult<Json<CalendarWeek>> {
    let date = optional_date(query.date.as_deref())?.unwrap_or_else(today);
    let (start, end) = week_bounds(date);
    let entries = queries::entries_between(&state.db, start, end).await?;
    Ok(Json(build_week(date, entries)))
}

/// GET /api/calendar/range?from=&to=
pub async fn get_range(
    State(state): State<AppState>,
    ApiQuery(query): ApiQuery<RangeQuery>,
) -> ApiResult<Json<Vec<CalendarEntry>>> {
    let from = parse_date(&query.from)?;
    let to = parse_date(&query.to)?;
    if from > to {
        return Err(ApiError::BadRequest(format!(
            "from ({}) is after to ({})",
            from, to
        )));
    }
    if days_inclusive(from, to) > MAX_RANGE_DAYS {
        return Err(ApiError::BadRequest(format!(
            "range spans more than {} days",
            MAX_RANGE_DAYS
        )));
    }

    Ok(Json(queries::entries_between(&state.db, from, to).await?))
}

/// PUT /api/calendar/:date
pub async fn schedule(
    State(state): State<AppState>,
    ApiPath(date): ApiPath<String>,
    ApiJson(req): ApiJson<ScheduleRequest>,
) -> ApiResult<Json<CalendarEntry>> {
    let date = parse_date(&date)?;
    let notes = clean_text(req.notes);

    let mut tx = begin_write(&state.db).await?;
    let entry = queries::schedule_plan(&mut tx, date, req.plan_id, notes.as_deref()).await?;
    tx.commit().await?;

    info!("Scheduled plan {} on {}", req.plan_id, date);
    Ok(Json(entry))
}

/// DELETE /api/calendar/:date
pub async fn unschedule(
    State(state): State<AppState>,
    ApiPath(date): ApiPath<String>,
) -> ApiResult<StatusCode> {
    let date = parse_date(&date)?;
    queries::delete_entry(&state.db, date).await?;

    info!("Cleared calendar for {}", date);
    Ok(StatusCode::NO_CONTENT)
}

/// Build calendar routes
pub fn calendar_routes() -> Router<AppState> {
    Router::new()
        .route("/api/calendar", get(get_week))
        .route("/api/calendar/range", get(get_range))
        .route("/api/calendar/:date", put(schedule).delete(unschedule))
}
