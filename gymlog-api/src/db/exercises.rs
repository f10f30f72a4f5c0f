//! Exercise queries

use gymlog_common::db::{Exercise, ExerciseSet};
use gymlog_common::{Error, Result};
use sqlx::{Executor, Sqlite, SqliteConnection};

const EXERCISE_COLUMNS: &str = "id, name, muscle_group, notes, created_at";

/// All exercises, alphabetical
pub async fn list_exercises<'e, E>(executor: E) -> Result<Vec<Exercise>>
where
    E: Executor<'e, Database = Sqlite>,
{
    let sql = format!(
        "SELECT {} FROM exercises ORDER BY name COLLATE NOCASE, id",
        EXERCISE_COLUMNS
    );
    Ok(sqlx::query_as(&sql).fetch_all(executor).await?)
}

pub async fn find_exercise<'e, E>(executor: E, id: i64) -> Result<Option<Exercise>>
where
    E: Executor<'e, Database = Sqlite>,
{
    let sql = format!("SELECT {} FROM exercises WHERE id = ?", EXERCISE_COLUMNS);
    Ok(sqlx::query_as(&sql).bind(id).fetch_optional(executor).await?)
}

pub async fn get_exercise<'e, E>(executor: E, id: i64) -> Result<Exercise>
where
    E: Executor<'e, Database = Sqlite>,
{
    find_exercise(executor, id)
        .await?
        .ok_or_else(|| Error::NotFound(format!("exercise {} not found", id)))
}

/// Case-insensitive lookup by exact name
pub async fn find_exercise_by_name<'e, E>(executor: E, name: &str) -> Result<Option<Exercise>>
where
    E: Executor<'e, Database = Sqlite>,
{
    let sql = format!(
        "SELECT {} FROM exercises WHERE name = ? COLLATE NOCASE",
        EXERCISE_COLUMNS
    );
    Ok(sqlx::query_as(&sql).bind(name).fetch_optional(executor).await?)
}

pub async fn insert_exercise<'e, E>(
    executor: E,
    name: &str,
    muscle_group: Option<&str>,
    notes: Option<&str>,
) -> Result<Exercise>
where
    E: Executor<'e, Database = Sqlite>,
{
    let sql = format!(
        "INSERT INTO exercises (name, muscle_group, notes) VALUES (?, ?, ?) RETURNING {}",
        EXERCISE_COLUMNS
    );
    Ok(sqlx::query_as(&sql)
        .bind(name)
        .bind(muscle_group)
        .bind(notes)
        .fetch_one(executor)
        .await?)
}

pub async fn update_exercise<'e, E>(
    executor: E,
    id: i64,
    name: &str,
    muscle_group: Option<&str>,
    notes: Option<&str>,
) -> Result<Exercise>
where
    E: Executor<'e, Database = Sqlite>,
{
    let sql = format!(
        "UPDATE exercises SET name = ?, muscle_group = ?, notes = ? WHERE id = ? RETURNING {}",
        EXERCISE_COLUMNS
    );
    let updated: Option<Exercise> = sqlx::query_as(&sql)
        .bind(name)
        .bind(muscle_group)
        .bind(notes)
        .bind(id)
        .fetch_optional(executor)
        .await?;
    updated.ok_or_else(|| Error::NotFound(format!("exercise {} not found", id)))
}

/// Number of template links, plan links and logged sets using an exercise
pub async fn exercise_usage(conn: &mut SqliteConnection, id: i64) -> Result<i64> {
    let uses: i64 = sqlx::query_scalar(
        r#"
        SELECT
            (SELECT COUNT(*) FROM workout_template_exercises WHERE exercise_id = ?1)
          + (SELECT COUNT(*) FROM workout_plan_exercises WHERE exercise_id = ?1)
          + (SELECT COUNT(*) FROM exercise_sets WHERE exercise_id = ?1)
        "#,
    )
    .bind(id)
    .fetch_one(&mut *conn)
    .await?;
    Ok(uses)
}

/// Delete an exercise that nothing references
pub async fn delete_exercise(conn: &mut SqliteConnection, id: i64) -> Result<()> {
    get_exercise(&mut *conn, id).await?;

    let uses = exercise_usage(conn, id).await?;
    if uses > 0 {
        return Err(Error::Conflict(format!(
            "exercise {} is used by {} template, plan or set rows",
            id, uses
        )));
    }

    sqlx::query("DELETE FROM exercises WHERE id = ?")
        .bind(id)
        .execute(&mut *conn)
        .await?;
    Ok(())
}

/// Sessions (newest first) in which the exercise was logged, with the
/// session date
pub async fn recent_session_ids(
    conn: &mut SqliteConnection,
    exercise_id: i64,
    limit: i64,
) -> Result<Vec<(i64, chrono::NaiveDate)>> {
    let rows: Vec<(i64, chrono::NaiveDate)> = sqlx::query_as(
        r#"
        SELECT s.id, s.performed_on
        FROM workout_sessions s
        WHERE EXISTS (
            SELECT 1 FROM exercise_sets es
            WHERE es.session_id = s.id AND es.exercise_id = ?
        )
        ORDER BY s.performed_on DESC, s.id DESC
        LIMIT ?
        "#,
    )
    .bind(exercise_id)
    .bind(limit)
    .fetch_all(&mut *conn)
    .await?;
    Ok(rows)
}

/// Logged sets of one exercise within one session, by set number
pub async fn sets_for_session_exercise<'e, E>(
    executor: E,
    session_id: i64,
    exercise_id: i64,
) -> Result<Vec<ExerciseSet>>
where
    E: Executor<'e, Database = Sqlite>,
{
    Ok(sqlx::query_as(
        r#"
        SELECT id, session_id, exercise_id, set_number, reps, weight, created_at
        FROM exercise_sets
        WHERE session_id = ? AND exercise_id = ?
        ORDER BY set_number
        "#,
    )
    .bind(session_id)
    .bind(exercise_id)
    .fetch_all(executor)
    .await?)
}
