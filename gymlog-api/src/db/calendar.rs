//! Date-keyed plan schedule

use super::plans::get_plan;
use chrono::NaiveDate;
use gymlog_common::db::CalendarEntry;
use gymlog_common::{Error, Result};
use sqlx::{Executor, Sqlite, SqliteConnection};

const ENTRY_SELECT: &str = r#"
    SELECT c.date, c.plan_id, p.name AS plan_name, t.name AS template_name, c.notes
    FROM workout_calendar c
    JOIN workout_plans p ON p.id = c.plan_id
    JOIN workout_templates t ON t.id = p.template_id
"#;

/// Entries with `from <= date <= to`, by date
pub async fn entries_between<'e, E>(
    executor: E,
    from: NaiveDate,
    to: NaiveDate,
) -> Result<Vec<CalendarEntry>>
where
    E: Executor<'e, Database = Sqlite>,
{
    let sql = format!("{} WHERE c.date >= ? AND c.date <= ? ORDER BY c.date", ENTRY_SELECT);
    Ok(sqlx::query_as(&sql)
        .bind(from)
        .bind(to)
        .fetch_all(executor)
        .await?)
}

pub async fn find_entry<'e, E>(executor: E, date: NaiveDate) -> Result<Option<CalendarEntry>>
where
    E: Executor<'e, Database = Sqlite>,
{
    let sql = format!("{} WHERE c.date = ?", ENTRY_SELECT);
    Ok(sqlx::query_as(&sql).bind(date).fetch_optional(executor).await?)
}

/// Write one calendar row, replacing whatever was scheduled that day
pub async fn upsert_entry<'e, E>(
    executor: E,
    date: NaiveDate,
    plan_id: i64,
    notes: Option<&str>,
) -> Result<()>
where
    E: Executor<'e, Database = Sqlite>,
{
    sqlx::query(
        r#"
        INSERT INTO workout_calendar (date, plan_id, notes) VALUES (?, ?, ?)
        ON CONFLICT (date) DO UPDATE SET plan_id = excluded.plan_id, notes = excluded.notes
        "#,
    )
    .bind(date)
    .bind(plan_id)
    .bind(notes)
    .execute(executor)
    .await?;
    Ok(())
}

/// Schedule a plan on a date
///
/// An undated plan takes the scheduled date as its `planned_for`.
pub async fn schedule_plan(
    conn: &mut SqliteConnection,
    date: NaiveDate,
    plan_id: i64,
    notes: Option<&str>,
) -> Result<CalendarEntry> {
    get_plan(&mut *conn, plan_id).await?;

    upsert_entry(&mut *conn, date, plan_id, notes).await?;

    sqlx::query("UPDATE workout_plans SET planned_for = ? WHERE id = ? AND planned_for IS NULL")
        .bind(date)
        .bind(plan_id)
        .execute(&mut *conn)
        .await?;

    find_entry(&mut *conn, date)
        .await?
        .ok_or_else(|| Error::Internal(format!("calendar entry for {} vanished", date)))
}

pub async fn delete_entry<'e, E>(executor: E, date: NaiveDate) -> Result<()>
where
    E: Executor<'e, Database = Sqlite>,
{
    let result = sqlx::query("DELETE FROM workout_calendar WHERE date = ?")
        .bind(date)
        .execute(executor)
        .await?;

    if result.rows_affected() == 0 {
        return Err(Error::NotFound(format!("nothing scheduled on {}", date)));
    }
    Ok(())
}
