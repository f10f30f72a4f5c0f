//! Workout plan queries

use super::exercises::get_exercise;
use super::ordering::{link_sort_order, next_sort_order, LinkTable};
use super::templates::get_template;
use chrono::NaiveDate;
use gymlog_common::db::{PlanExercise, PlanSummary, WorkoutPlan};
use gymlog_common::{Error, Result};
use sqlx::{Executor, Sqlite, SqliteConnection};
use tracing::debug;

const PLAN_COLUMNS: &str = "id, template_id, name, planned_for, notes, created_at";

/// All plans: dated plans first by date, then undated by id
pub async fn list_plans<'e, E>(executor: E) -> Result<Vec<PlanSummary>>
where
    E: Executor<'e, Database = Sqlite>,
{
    Ok(sqlx::query_as(
        r#"
        SELECT p.id, p.template_id, t.name AS template_name, p.name, p.planned_for,
               p.notes, p.created_at,
               (SELECT COUNT(*) FROM workout_plan_exercises pe WHERE pe.plan_id = p.id)
                   AS exercise_count
        FROM workout_plans p
        JOIN workout_templates t ON t.id = p.template_id
        ORDER BY p.planned_for IS NULL, p.planned_for, p.id
        "#,
    )
    .fetch_all(executor)
    .await?)
}

pub async fn find_plan<'e, E>(executor: E, id: i64) -> Result<Option<WorkoutPlan>>
where
    E: Executor<'e, Database = Sqlite>,
{
    let sql = format!("SELECT {} FROM workout_plans WHERE id = ?", PLAN_COLUMNS);
    Ok(sqlx::query_as(&sql).bind(id).fetch_optional(executor).await?)
}

pub async fn get_plan<'e, E>(executor: E, id: i64) -> Result<WorkoutPlan>
where
    E: Executor<'e, Database = Sqlite>,
{
    find_plan(executor, id)
        .await?
        .ok_or_else(|| Error::NotFound(format!("plan {} not found", id)))
}

/// Links of one plan in `sort_order`
pub async fn plan_exercises<'e, E>(executor: E, plan_id: i64) -> Result<Vec<PlanExercise>>
where
    E: Executor<'e, Database = Sqlite>,
{
    Ok(sqlx::query_as(
        r#"
        SELECT pe.exercise_id, e.name, pe.sort_order, pe.target_sets, pe.target_reps,
               pe.target_weight
        FROM workout_plan_exercises pe
        JOIN exercises e ON e.id = pe.exercise_id
        WHERE pe.plan_id = ?
        ORDER BY pe.sort_order, pe.id
        "#,
    )
    .bind(plan_id)
    .fetch_all(executor)
    .await?)
}

/// Insert a bare plan row
pub async fn insert_plan<'e, E>(
    executor: E,
    template_id: i64,
    name: &str,
    planned_for: Option<NaiveDate>,
    notes: Option<&str>,
) -> Result<WorkoutPlan>
where
    E: Executor<'e, Database = Sqlite>,
{
    let sql = format!(
        "INSERT INTO workout_plans (template_id, name, planned_for, notes) VALUES (?, ?, ?, ?) RETURNING {}",
        PLAN_COLUMNS
    );
    Ok(sqlx::query_as(&sql)
        .bind(template_id)
        .bind(name)
        .bind(planned_for)
        .bind(notes)
        .fetch_one(executor)
        .await?)
}

/// Derive a plan from a template
///
/// Copies every template link with its targets and order; weights start
/// unset. The plan name defaults to the template name.
pub async fn create_plan_from_template(
    conn: &mut SqliteConnection,
    template_id: i64,
    name: Option<&str>,
    planned_for: Option<NaiveDate>,
    notes: Option<&str>,
) -> Result<WorkoutPlan> {
    let template = get_template(&mut *conn, template_id).await?;
    let name = name.unwrap_or(&template.name);

    let plan = insert_plan(&mut *conn, template_id, name, planned_for, notes).await?;

    let copied = sqlx::query(
        r#"
        INSERT INTO workout_plan_exercises
            (plan_id, exercise_id, sort_order, target_sets, target_reps)
        SELECT ?, exercise_id, sort_order, target_sets, target_reps
        FROM workout_template_exercises
        WHERE template_id = ?
        ORDER BY sort_order
        "#,
    )
    .bind(plan.id)
    .bind(template_id)
    .execute(&mut *conn)
    .await?;

    debug!(
        "Plan {} derived from workout {} with {} exercise(s)",
        plan.id,
        template_id,
        copied.rows_affected()
    );
    Ok(plan)
}

pub async fn update_plan<'e, E>(
    executor: E,
    id: i64,
    name: &str,
    planned_for: Option<NaiveDate>,
    notes: Option<&str>,
) -> Result<WorkoutPlan>
where
    E: Executor<'e, Database = Sqlite>,
{
    let sql = format!(
        "UPDATE workout_plans SET name = ?, planned_for = ?, notes = ? WHERE id = ? RETURNING {}",
        PLAN_COLUMNS
    );
    let updated: Option<WorkoutPlan> = sqlx::query_as(&sql)
        .bind(name)
        .bind(planned_for)
        .bind(notes)
        .bind(id)
        .fetch_optional(executor)
        .await?;
    updated.ok_or_else(|| Error::NotFound(format!("plan {} not found", id)))
}

/// Insert a plan link at an explicit position
pub async fn insert_plan_link<'e, E>(
    executor: E,
    plan_id: i64,
    exercise_id: i64,
    sort_order: i64,
    target_sets: i64,
    target_reps: i64,
    target_weight: Option<f64>,
) -> Result<()>
where
    E: Executor<'e, Database = Sqlite>,
{
    sqlx::query(
        r#"
        INSERT INTO workout_plan_exercises
            (plan_id, exercise_id, sort_order, target_sets, target_reps, target_weight)
        VALUES (?, ?, ?, ?, ?, ?)
        "#,
    )
    .bind(plan_id)
    .bind(exercise_id)
    .bind(sort_order)
    .bind(target_sets)
    .bind(target_reps)
    .bind(target_weight)
    .execute(executor)
    .await?;
    Ok(())
}

/// Append an exercise to a plan at `sort_order = N + 1`
pub async fn add_plan_exercise(
    conn: &mut SqliteConnection,
    plan_id: i64,
    exercise_id: i64,
    target_sets: i64,
    target_reps: i64,
    target_weight: Option<f64>,
) -> Result<()> {
    get_plan(&mut *conn, plan_id).await?;
    get_exercise(&mut *conn, exercise_id).await?;

    if link_sort_order(conn, LinkTable::Plan, plan_id, exercise_id)
        .await?
        .is_some()
    {
        return Err(Error::Conflict(format!(
            "exercise {} is already part of plan {}",
            exercise_id, plan_id
        )));
    }

    let sort_order = next_sort_order(conn, LinkTable::Plan, plan_id).await?;
    insert_plan_link(
        &mut *conn,
        plan_id,
        exercise_id,
        sort_order,
        target_sets,
        target_reps,
        target_weight,
    )
    .await
}

pub async fn update_plan_exercise<'e, E>(
    executor: E,
    plan_id: i64,
    exercise_id: i64,
    target_sets: i64,
    target_reps: i64,
    target_weight: Option<f64>,
) -> Result<()>
where
    E: Executor<'e, Database = Sqlite>,
{
    let result = sqlx::query(
        r#"
        UPDATE workout_plan_exercises
        SET target_sets = ?, target_reps = ?, target_weight = ?
        WHERE plan_id = ? AND exercise_id = ?
        "#,
    )
    .bind(target_sets)
    .bind(target_reps)
    .bind(target_weight)
    .bind(plan_id)
    .bind(exercise_id)
    .execute(executor)
    .await?;

    if result.rows_affected() == 0 {
        return Err(Error::NotFound(format!(
            "exercise {} is not part of plan {}",
            exercise_id, plan_id
        )));
    }
    Ok(())
}

/// Delete a plan
///
/// Sessions performed from the plan keep their rows with `plan_id` cleared.
/// Calendar entries and plan links are removed with the plan.
pub async fn delete_plan(conn: &mut SqliteConnection, id: i64) -> Result<()> {
    get_plan(&mut *conn, id).await?;

    let detached = sqlx::query("UPDATE workout_sessions SET plan_id = NULL WHERE plan_id = ?")
        .bind(id)
        .execute(&mut *conn)
        .await?;

    sqlx::query("DELETE FROM workout_calendar WHERE plan_id = ?")
        .bind(id)
        .execute(&mut *conn)
        .await?;

    sqlx::query("DELETE FROM workout_plan_exercises WHERE plan_id = ?")
        .bind(id)
        .execute(&mut *conn)
        .await?;

    sqlx::query("DELETE FROM workout_plans WHERE id = ?")
        .bind(id)
        .execute(&mut *conn)
        .await?;

    debug!(
        "Plan {} deleted, {} session(s) detached",
        id,
        detached.rows_affected()
    );
    Ok(())
}
