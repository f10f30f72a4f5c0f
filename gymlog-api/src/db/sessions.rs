//! Workout session and logged set queries

use super::exercises::get_exercise;
use chrono::NaiveDate;
use gymlog_common::db::{ExerciseSet, SessionSummary, WorkoutSession};
use gymlog_common::{Error, Result};
use serde::Deserialize;
use sqlx::{Executor, Sqlite, SqliteConnection};

const SESSION_COLUMNS: &str = "id, template_id, plan_id, performed_on, notes, completed, created_at";
const SET_COLUMNS: &str = "id, session_id, exercise_id, set_number, reps, weight, created_at";

/// One set in a replace request, numbered by position
#[derive(Debug, Clone, Copy, Deserialize, PartialEq)]
pub struct SetInput {
    pub reps: i64,
    #[serde(default)]
    pub weight: Option<f64>,
}

/// Session history, newest first, optionally bounded by date
pub async fn list_sessions<'e, E>(
    executor: E,
    from: Option<NaiveDate>,
    to: Option<NaiveDate>,
    limit: i64,
) -> Result<Vec<SessionSummary>>
where
    E: Executor<'e, Database = Sqlite>,
{
    Ok(sqlx::query_as(
        r#"
        SELECT s.id, s.template_id, t.name AS template_name, s.plan_id, p.name AS plan_name,
               s.performed_on, s.notes, s.completed,
               (SELECT COUNT(*) FROM exercise_sets es WHERE es.session_id = s.id) AS set_count
        FROM workout_sessions s
        LEFT JOIN workout_templates t ON t.id = s.template_id
        LEFT JOIN workout_plans p ON p.id = s.plan_id
        WHERE (?1 IS NULL OR s.performed_on >= ?1)
          AND (?2 IS NULL OR s.performed_on <= ?2)
        ORDER BY s.performed_on DESC, s.id DESC
        LIMIT ?3
        "#,
    )
    .bind(from)
    .bind(to)
    .bind(limit)
    .fetch_all(executor)
    .await?)
}

pub async fn find_session<'e, E>(executor: E, id: i64) -> Result<Option<WorkoutSession>>
where
    E: Executor<'e, Database = Sqlite>,
{
    let sql = format!("SELECT {} FROM workout_sessions WHERE id = ?", SESSION_COLUMNS);
    Ok(sqlx::query_as(&sql).bind(id).fetch_optional(executor).await?)
}

pub async fn get_session<'e, E>(executor: E, id: i64) -> Result<WorkoutSession>
where
    E: Executor<'e, Database = Sqlite>,
{
    find_session(executor, id)
        .await?
        .ok_or_else(|| Error::NotFound(format!("session {} not found", id)))
}

pub async fn insert_session<'e, E>(
    executor: E,
    template_id: Option<i64>,
    plan_id: Option<i64>,
    performed_on: NaiveDate,
    notes: Option<&str>,
) -> Result<WorkoutSession>
where
    E: Executor<'e, Database = Sqlite>,
{
    let sql = format!(
        "INSERT INTO workout_sessions (template_id, plan_id, performed_on, notes) VALUES (?, ?, ?, ?) RETURNING {}",
        SESSION_COLUMNS
    );
    Ok(sqlx::query_as(&sql)
        .bind(template_id)
        .bind(plan_id)
        .bind(performed_on)
        .bind(notes)
        .fetch_one(executor)
        .await?)
}

pub async fn update_session<'e, E>(
    executor: E,
    id: i64,
    performed_on: NaiveDate,
    notes: Option<&str>,
    completed: bool,
) -> Result<WorkoutSession>
where
    E: Executor<'e, Database = Sqlite>,
{
    let sql = format!(
        "UPDATE workout_sessions SET performed_on = ?, notes = ?, completed = ? WHERE id = ? RETURNING {}",
        SESSION_COLUMNS
    );
    let updated: Option<WorkoutSession> = sqlx::query_as(&sql)
        .bind(performed_on)
        .bind(notes)
        .bind(completed)
        .bind(id)
        .fetch_optional(executor)
        .await?;
    updated.ok_or_else(|| Error::NotFound(format!("session {} not found", id)))
}

pub async fn delete_session(conn: &mut SqliteConnection, id: i64) -> Result<()> {
    get_session(&mut *conn, id).await?;

    sqlx::query("DELETE FROM exercise_sets WHERE session_id = ?")
        .bind(id)
        .execute(&mut *conn)
        .await?;
    sqlx::query("DELETE FROM workout_sessions WHERE id = ?")
        .bind(id)
        .execute(&mut *conn)
        .await?;
    Ok(())
}

/// Every logged set of a session, by exercise then set number
pub async fn session_sets<'e, E>(executor: E, session_id: i64) -> Result<Vec<ExerciseSet>>
where
    E: Executor<'e, Database = Sqlite>,
{
    let sql = format!(
        "SELECT {} FROM exercise_sets WHERE session_id = ? ORDER BY exercise_id, set_number",
        SET_COLUMNS
    );
    Ok(sqlx::query_as(&sql).bind(session_id).fetch_all(executor).await?)
}

/// Exercises the session was meant to cover, in planned order
///
/// Uses the plan's links when the session has a plan, otherwise the
/// template's links. Returns `(exercise_id, name)` pairs.
pub async fn planned_exercise_order(
    conn: &mut SqliteConnection,
    session: &WorkoutSession,
) -> Result<Vec<(i64, String)>> {
    if let Some(plan_id) = session.plan_id {
        return Ok(sqlx::query_as(
            r#"
            SELECT pe.exercise_id, e.name
            FROM workout_plan_exercises pe JOIN exercises e ON e.id = pe.exercise_id
            WHERE pe.plan_id = ?
            ORDER BY pe.sort_order, pe.id
            "#,
        )
        .bind(plan_id)
        .fetch_all(&mut *conn)
        .await?);
    }

    if let Some(template_id) = session.template_id {
        return Ok(sqlx::query_as(
            r#"
            SELECT te.exercise_id, e.name
            FROM workout_template_exercises te JOIN exercises e ON e.id = te.exercise_id
            WHERE te.template_id = ?
            ORDER BY te.sort_order, te.id
            "#,
        )
        .bind(template_id)
        .fetch_all(&mut *conn)
        .await?);
    }

    Ok(Vec::new())
}

/// Names of exercises logged in a session
pub async fn logged_exercise_names(
    conn: &mut SqliteConnection,
    session_id: i64,
) -> Result<Vec<(i64, String)>> {
    Ok(sqlx::query_as(
        r#"
        SELECT DISTINCT es.exercise_id, e.name
        FROM exercise_sets es JOIN exercises e ON e.id = es.exercise_id
        WHERE es.session_id = ?
        ORDER BY e.name COLLATE NOCASE
        "#,
    )
    .bind(session_id)
    .fetch_all(&mut *conn)
    .await?)
}

/// Replace every set of one exercise in one session
///
/// Delete-all-then-insert; the caller owns the transaction. Set numbers are
/// assigned 1..N in input order. An empty input clears the exercise.
pub async fn replace_sets(
    conn: &mut SqliteConnection,
    session_id: i64,
    exercise_id: i64,
    sets: &[SetInput],
) -> Result<Vec<ExerciseSet>> {
    get_session(&mut *conn, session_id).await?;
    get_exercise(&mut *conn, exercise_id).await?;

    sqlx::query("DELETE FROM exercise_sets WHERE session_id = ? AND exercise_id = ?")
        .bind(session_id)
        .bind(exercise_id)
        .execute(&mut *conn)
        .await?;

    for (set_number, set) in (1_i64..).zip(sets) {
        sqlx::query(
            r#"
            INSERT INTO exercise_sets (session_id, exercise_id, set_number, reps, weight)
            VALUES (?, ?, ?, ?, ?)
            "#,
        )
        .bind(session_id)
        .bind(exercise_id)
        .bind(set_number)
        .bind(set.reps)
        .bind(set.weight)
        .execute(&mut *conn)
        .await?;
    }

    super::exercises::sets_for_session_exercise(&mut *conn, session_id, exercise_id).await
}
