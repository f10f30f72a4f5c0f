//! Sort-order maintenance for template and plan exercise links
//!
//! Both link tables share the same shape (`owner`, `exercise_id`,
//! `sort_order`), so append, remove, renumber and move are written once
//! against [`LinkTable`]. Callers pass a connection that is already inside a
//! transaction.

use gymlog_common::{Error, Result};
use serde::Deserialize;
use sqlx::SqliteConnection;

/// Which link table an ordering operation targets
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LinkTable {
    Template,
    Plan,
}

impl LinkTable {
    fn table(self) -> &'static str {
        match self {
            LinkTable::Template => "workout_template_exercises",
            LinkTable::Plan => "workout_plan_exercises",
        }
    }

    fn owner_column(self) -> &'static str {
        match self {
            LinkTable::Template => "template_id",
            LinkTable::Plan => "plan_id",
        }
    }

    fn owner_label(self) -> &'static str {
        match self {
            LinkTable::Template => "workout",
            LinkTable::Plan => "plan",
        }
    }
}

/// Direction for a single-step move
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Direction {
    Up,
    Down,
}

/// Sort order for a link appended at the end
pub async fn next_sort_order(
    conn: &mut SqliteConnection,
    table: LinkTable,
    owner_id: i64,
) -> Result<i64> {
    let sql = format!(
        "SELECT COALESCE(MAX(sort_order), 0) + 1 FROM {} WHERE {} = ?",
        table.table(),
        table.owner_column()
    );
    let next: i64 = sqlx::query_scalar(&sql)
        .bind(owner_id)
        .fetch_one(&mut *conn)
        .await?;
    Ok(next)
}

/// Current sort order of one link, if the link exists
pub async fn link_sort_order(
    conn: &mut SqliteConnection,
    table: LinkTable,
    owner_id: i64,
    exercise_id: i64,
) -> Result<Option<i64>> {
    let sql = format!(
        "SELECT sort_order FROM {} WHERE {} = ? AND exercise_id = ?",
        table.table(),
        table.owner_column()
    );
    let order: Option<i64> = sqlx::query_scalar(&sql)
        .bind(owner_id)
        .bind(exercise_id)
        .fetch_optional(&mut *conn)
        .await?;
    Ok(order)
}

/// Rewrite sort orders to exactly 1..N, preserving relative order
///
/// Returns the number of links touched.
pub async fn renumber(conn: &mut SqliteConnection, table: LinkTable, owner_id: i64) -> Result<u64> {
    let select = format!(
        "SELECT id, sort_order FROM {} WHERE {} = ? ORDER BY sort_order, id",
        table.table(),
        table.owner_column()
    );
    let rows: Vec<(i64, i64)> = sqlx::query_as(&select)
        .bind(owner_id)
        .fetch_all(&mut *conn)
        .await?;

    let update = format!("UPDATE {} SET sort_order = ? WHERE id = ?", table.table());
    let mut touched = 0;
    for (expected, (id, current)) in (1_i64..).zip(rows) {
        if current != expected {
            sqlx::query(&update)
                .bind(expected)
                .bind(id)
                .execute(&mut *conn)
                .await?;
            touched += 1;
        }
    }
    Ok(touched)
}

/// Delete one link and close the gap it leaves
pub async fn remove_link(
    conn: &mut SqliteConnection,
    table: LinkTable,
    owner_id: i64,
    exercise_id: i64,
) -> Result<()> {
    let sql = format!(
        "DELETE FROM {} WHERE {} = ? AND exercise_id = ?",
        table.table(),
        table.owner_column()
    );
    let result = sqlx::query(&sql)
        .bind(owner_id)
        .bind(exercise_id)
        .execute(&mut *conn)
        .await?;

    if result.rows_affected() == 0 {
        return Err(not_linked(table, owner_id, exercise_id));
    }

    renumber(conn, table, owner_id).await?;
    Ok(())
}

/// Swap one link with its neighbour in the given direction
///
/// Exactly two `sort_order` values change. Moving the first link up or the
/// last link down is rejected as invalid input.
pub async fn move_link(
    conn: &mut SqliteConnection,
    table: LinkTable,
    owner_id: i64,
    exercise_id: i64,
    direction: Direction,
) -> Result<()> {
    let current = link_sort_order(conn, table, owner_id, exercise_id)
        .await?
        .ok_or_else(|| not_linked(table, owner_id, exercise_id))?;

    let neighbour_sql = match direction {
        Direction::Up => format!(
            "SELECT id, sort_order FROM {} WHERE {} = ? AND sort_order < ? ORDER BY sort_order DESC LIMIT 1",
            table.table(),
            table.owner_column()
        ),
        Direction::Down => format!(
            "SELECT id, sort_order FROM {} WHERE {} = ? AND sort_order > ? ORDER BY sort_order ASC LIMIT 1",
            table.table(),
            table.owner_column()
        ),
    };
    let neighbour: Option<(i64, i64)> = sqlx::query_as(&neighbour_sql)
        .bind(owner_id)
        .bind(current)
        .fetch_optional(&mut *conn)
        .await?;

    let (neighbour_id, neighbour_order) = neighbour.ok_or_else(|| {
        let edge = match direction {
            Direction::Up => "first",
            Direction::Down => "last",
        };
        Error::InvalidInput(format!("exercise {} is already {}", exercise_id, edge))
    })?;

    let set_own = format!(
        "UPDATE {} SET sort_order = ? WHERE {} = ? AND exercise_id = ?",
        table.table(),
        table.owner_column()
    );
    sqlx::query(&set_own)
        .bind(neighbour_order)
        .bind(owner_id)
        .bind(exercise_id)
        .execute(&mut *conn)
        .await?;

    let set_neighbour = format!("UPDATE {} SET sort_order = ? WHERE id = ?", table.table());
    sqlx::query(&set_neighbour)
        .bind(current)
        .bind(neighbour_id)
        .execute(&mut *conn)
        .await?;

    Ok(())
}

fn not_linked(table: LinkTable, owner_id: i64, exercise_id: i64) -> Error {
    Error::NotFound(format!(
        "exercise {} is not part of {} {}",
        exercise_id,
        table.owner_label(),
        owner_id
    ))
}
