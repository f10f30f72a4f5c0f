//! Workout template queries

use super::exercises::get_exercise;
use super::ordering::{link_sort_order, next_sort_order, LinkTable};
use gymlog_common::db::{TemplateExercise, TemplateSummary, WorkoutTemplate};
use gymlog_common::{Error, Result};
use sqlx::{Executor, Sqlite, SqliteConnection};

const TEMPLATE_COLUMNS: &str = "id, name, description, created_at";

pub async fn list_templates<'e, E>(executor: E) -> Result<Vec<TemplateSummary>>
where
    E: Executor<'e, Database = Sqlite>,
{
    Ok(sqlx::query_as(
        r#"
        SELECT t.id, t.name, t.description, t.created_at,
               (SELECT COUNT(*) FROM workout_template_exercises te WHERE te.template_id = t.id)
                   AS exercise_count
        FROM workout_templates t
        ORDER BY t.name COLLATE NOCASE, t.id
        "#,
    )
    .fetch_all(executor)
    .await?)
}

pub async fn find_template<'e, E>(executor: E, id: i64) -> Result<Option<WorkoutTemplate>>
where
    E: Executor<'e, Database = Sqlite>,
{
    let sql = format!("SELECT {} FROM workout_templates WHERE id = ?", TEMPLATE_COLUMNS);
    Ok(sqlx::query_as(&sql).bind(id).fetch_optional(executor).await?)
}

pub async fn get_template<'e, E>(executor: E, id: i64) -> Result<WorkoutTemplate>
where
    E: Executor<'e, Database = Sqlite>,
{
    find_template(executor, id)
        .await?
        .ok_or_else(|| Error::NotFound(format!("workout {} not found", id)))
}

/// Case-insensitive lookup by exact name
pub async fn find_template_by_name<'e, E>(executor: E, name: &str) -> Result<Option<WorkoutTemplate>>
where
    E: Executor<'e, Database = Sqlite>,
{
    let sql = format!(
        "SELECT {} FROM workout_templates WHERE name = ? COLLATE NOCASE",
        TEMPLATE_COLUMNS
    );
    Ok(sqlx::query_as(&sql).bind(name).fetch_optional(executor).await?)
}

/// Links of one template in `sort_order`
pub async fn template_exercises<'e, E>(executor: E, template_id: i64) -> Result<Vec<TemplateExercise>>
where
    E: Executor<'e, Database = Sqlite>,
{
    Ok(sqlx::query_as(
        r#"
        SELECT te.exercise_id, e.name, te.sort_order, te.target_sets, te.target_reps
        FROM workout_template_exercises te
        JOIN exercises e ON e.id = te.exercise_id
        WHERE te.template_id = ?
        ORDER BY te.sort_order, te.id
        "#,
    )
    .bind(template_id)
    .fetch_all(executor)
    .await?)
}

pub async fn insert_template<'e, E>(
    executor: E,
    name: &str,
    description: Option<&str>,
) -> Result<WorkoutTemplate>
where
    E: Executor<'e, Database = Sqlite>,
{
    let sql = format!(
        "INSERT INTO workout_templates (name, description) VALUES (?, ?) RETURNING {}",
        TEMPLATE_COLUMNS
    );
    Ok(sqlx::query_as(&sql)
        .bind(name)
        .bind(description)
        .fetch_one(executor)
        .await?)
}

pub async fn update_template<'e, E>(
    executor: E,
    id: i64,
    name: &str,
    description: Option<&str>,
) -> Result<WorkoutTemplate>
where
    E: Executor<'e, Database = Sqlite>,
{
    let sql = format!(
        "UPDATE workout_templates SET name = ?, description = ? WHERE id = ? RETURNING {}",
        TEMPLATE_COLUMNS
    );
    let updated: Option<WorkoutTemplate> = sqlx::query_as(&sql)
        .bind(name)
        .bind(description)
        .bind(id)
        .fetch_optional(executor)
        .await?;
    updated.ok_or_else(|| Error::NotFound(format!("workout {} not found", id)))
}

/// Append an exercise to a template at `sort_order = N + 1`
pub async fn add_template_exercise(
    conn: &mut SqliteConnection,
    template_id: i64,
    exercise_id: i64,
    target_sets: i64,
    target_reps: i64,
) -> Result<()> {
    get_template(&mut *conn, template_id).await?;
    get_exercise(&mut *conn, exercise_id).await?;

    if link_sort_order(conn, LinkTable::Template, template_id, exercise_id)
        .await?
        .is_some()
    {
        return Err(Error::Conflict(format!(
            "exercise {} is already part of workout {}",
            exercise_id, template_id
        )));
    }

    let sort_order = next_sort_order(conn, LinkTable::Template, template_id).await?;
    sqlx::query(
        r#"
        INSERT INTO workout_template_exercises
            (template_id, exercise_id, sort_order, target_sets, target_reps)
        VALUES (?, ?, ?, ?, ?)
        "#,
    )
    .bind(template_id)
    .bind(exercise_id)
    .bind(sort_order)
    .bind(target_sets)
    .bind(target_reps)
    .execute(&mut *conn)
    .await?;

    Ok(())
}

pub async fn update_template_exercise<'e, E>(
    executor: E,
    template_id: i64,
    exercise_id: i64,
    target_sets: i64,
    target_reps: i64,
) -> Result<()>
where
    E: Executor<'e, Database = Sqlite>,
{
    let result = sqlx::query(
        r#"
        UPDATE workout_template_exercises
        SET target_sets = ?, target_reps = ?
        WHERE template_id = ? AND exercise_id = ?
        "#,
    )
    .bind(target_sets)
    .bind(target_reps)
    .bind(template_id)
    .bind(exercise_id)
    .execute(executor)
    .await?;

    if result.rows_affected() == 0 {
        return Err(Error::NotFound(format!(
            "exercise {} is not part of workout {}",
            exercise_id, template_id
        )));
    }
    Ok(())
}

/// Delete a template no plan derives from
///
/// Sessions keep their rows with `template_id` cleared; links cascade.
pub async fn delete_template(conn: &mut SqliteConnection, id: i64) -> Result<()> {
    get_template(&mut *conn, id).await?;

    let plans: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM workout_plans WHERE template_id = ?")
        .bind(id)
        .fetch_one(&mut *conn)
        .await?;
    if plans > 0 {
        return Err(Error::Conflict(format!(
            "workout {} has {} plan(s) derived from it",
            id, plans
        )));
    }

    sqlx::query("UPDATE workout_sessions SET template_id = NULL WHERE template_id = ?")
        .bind(id)
        .execute(&mut *conn)
        .await?;

    sqlx::query("DELETE FROM workout_templates WHERE id = ?")
        .bind(id)
        .execute(&mut *conn)
        .await?;

    Ok(())
}
