//! Database initialization
//!
//! Opens (creating when missing) the SQLite database, applies connection
//! pragmas, creates every table idempotently and runs pending migrations.

use crate::{Error, Result};
use sqlx::sqlite::{SqliteConnectOptions, SqliteJournalMode, SqlitePoolOptions};
use sqlx::SqlitePool;
use std::str::FromStr;
use std::time::Duration;
use tracing::info;

/// Busy timeout applied to every connection
const BUSY_TIMEOUT: Duration = Duration::from_secs(5);

/// Connection pool size for file databases
const MAX_CONNECTIONS: u32 = 10;

/// Initialize database connection and create tables if needed
///
/// Accepts any sqlx SQLite URL, e.g. `sqlite:///var/lib/gymlog/gymlog.db`
/// or `sqlite::memory:`.
pub async fn init_database(database_url: &str) -> Result<SqlitePool> {
    if !database_url.starts_with("sqlite:") {
        return Err(Error::Config(format!(
            "Unsupported database URL '{}': expected a sqlite: URL",
            database_url
        )));
    }

    if is_memory_url(database_url) {
        return init_memory_database().await;
    }

    let options = SqliteConnectOptions::from_str(database_url)
        .map_err(|e| Error::Config(format!("Invalid database URL '{}': {}", database_url, e)))?
        .create_if_missing(true)
        .foreign_keys(true)
        // WAL lets readers proceed while a request transaction writes
        .journal_mode(SqliteJournalMode::Wal)
        .busy_timeout(BUSY_TIMEOUT);

    if let Some(parent) = options.get_filename().parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent)?;
        }
    }

    let newly_created = !options.get_filename().exists();

    let pool = SqlitePoolOptions::new()
        .max_connections(MAX_CONNECTIONS)
        .connect_with(options)
        .await?;

    if newly_created {
        info!("Initialized new database: {}", database_url);
    } else {
        info!("Opened existing database: {}", database_url);
    }

    create_schema(&pool).await?;
    Ok(pool)
}

/// Create an initialized in-memory database
///
/// Every SQLite in-memory connection is its own database, so the pool is
/// pinned to a single connection that is never recycled.
pub async fn init_memory_database() -> Result<SqlitePool> {
    let options = SqliteConnectOptions::from_str("sqlite::memory:")?
        .foreign_keys(true)
        .busy_timeout(BUSY_TIMEOUT);

    let pool = SqlitePoolOptions::new()
        .max_connections(1)
        .min_connections(1)
        .idle_timeout(None)
        .max_lifetime(None)
        .connect_with(options)
        .await?;

    create_schema(&pool).await?;
    Ok(pool)
}

fn is_memory_url(database_url: &str) -> bool {
    database_url.contains(":memory:") || database_url.contains("mode=memory")
}

/// Create all tables then run versioned migrations
async fn create_schema(pool: &SqlitePool) -> Result<()> {
    // Run table creation (idempotent - safe to call multiple times)
    create_schema_version_table(pool).await?;
    create_exercises_table(pool).await?;
    create_workout_templates_table(pool).await?;
    create_workout_template_exercises_table(pool).await?;
    create_workout_plans_table(pool).await?;
    create_workout_plan_exercises_table(pool).await?;
    create_workout_sessions_table(pool).await?;
    create_exercise_sets_table(pool).await?;
    create_workout_calendar_table(pool).await?;

    crate::db::migrations::run_migrations(pool).await?;
    Ok(())
}

async fn create_schema_version_table(pool: &SqlitePool) -> Result<()> {
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS schema_version (
            version INTEGER PRIMARY KEY,
            applied_at TEXT NOT NULL DEFAULT CURRENT_TIMESTAMP
        )
        "#,
    )
    .execute(pool)
    .await?;

    Ok(())
}

async fn create_exercises_table(pool: &SqlitePool) -> Result<()> {
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS exercises (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            name TEXT NOT NULL UNIQUE COLLATE NOCASE,
            muscle_group TEXT,
            notes TEXT,
            created_at TEXT NOT NULL DEFAULT CURRENT_TIMESTAMP
        )
        "#,
    )
    .execute(pool)
    .await?;

    Ok(())
}

async fn create_workout_templates_table(pool: &SqlitePool) -> Result<()> {
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS workout_templates (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            name TEXT NOT NULL UNIQUE COLLATE NOCASE,
            description TEXT,
            created_at TEXT NOT NULL DEFAULT CURRENT_TIMESTAMP
        )
        "#,
    )
    .execute(pool)
    .await?;

    Ok(())
}

/// Template → exercise links
///
/// `sort_order` is kept contiguous 1..N by the API layer; it is not UNIQUE
/// because a swap passes through a transient duplicate.
async fn create_workout_template_exercises_table(pool: &SqlitePool) -> Result<()> {
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS workout_template_exercises (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            template_id INTEGER NOT NULL REFERENCES workout_templates(id) ON DELETE CASCADE,
            exercise_id INTEGER NOT NULL REFERENCES exercises(id),
            sort_order INTEGER NOT NULL CHECK (sort_order >= 1),
            target_sets INTEGER NOT NULL DEFAULT 3 CHECK (target_sets >= 1),
            target_reps INTEGER NOT NULL DEFAULT 10 CHECK (target_reps >= 1),
            UNIQUE (template_id, exercise_id)
        )
        "#,
    )
    .execute(pool)
    .await?;

    Ok(())
}

async fn create_workout_plans_table(pool: &SqlitePool) -> Result<()> {
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS workout_plans (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            template_id INTEGER NOT NULL REFERENCES workout_templates(id),
            name TEXT NOT NULL,
            planned_for TEXT,
            notes TEXT,
            created_at TEXT NOT NULL DEFAULT CURRENT_TIMESTAMP
        )
        "#,
    )
    .execute(pool)
    .await?;

    Ok(())
}

async fn create_workout_plan_exercises_table(pool: &SqlitePool) -> Result<()> {
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS workout_plan_exercises (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            plan_id INTEGER NOT NULL REFERENCES workout_plans(id) ON DELETE CASCADE,
            exercise_id INTEGER NOT NULL REFERENCES exercises(id),
            sort_order INTEGER NOT NULL CHECK (sort_order >= 1),
            target_sets INTEGER NOT NULL DEFAULT 3 CHECK (target_sets >= 1),
            target_reps INTEGER NOT NULL DEFAULT 10 CHECK (target_reps >= 1),
            target_weight REAL CHECK (target_weight IS NULL OR target_weight >= 0),
            UNIQUE (plan_id, exercise_id)
        )
        "#,
    )
    .execute(pool)
    .await?;

    Ok(())
}

/// Sessions keep their row when the source plan or template goes away;
/// the API nulls the reference explicitly inside the delete transaction.
async fn create_workout_sessions_table(pool: &SqlitePool) -> Result<()> {
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS workout_sessions (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            template_id INTEGER REFERENCES workout_templates(id),
            plan_id INTEGER REFERENCES workout_plans(id),
            performed_on TEXT NOT NULL,
            notes TEXT,
            completed INTEGER NOT NULL DEFAULT 0,
            created_at TEXT NOT NULL DEFAULT CURRENT_TIMESTAMP
        )
        "#,
    )
    .execute(pool)
    .await?;

    Ok(())
}

async fn create_exercise_sets_table(pool: &SqlitePool) -> Result<()> {
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS exercise_sets (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            session_id INTEGER NOT NULL REFERENCES workout_sessions(id) ON DELETE CASCADE,
            exercise_id INTEGER NOT NULL REFERENCES exercises(id),
            set_number INTEGER NOT NULL CHECK (set_number >= 1),
            reps INTEGER NOT NULL CHECK (reps >= 0),
            weight REAL CHECK (weight IS NULL OR weight >= 0),
            created_at TEXT NOT NULL DEFAULT CURRENT_TIMESTAMP,
            UNIQUE (session_id, exercise_id, set_number)
        )
        "#,
    )
    .execute(pool)
    .await?;

    Ok(())
}

async fn create_workout_calendar_table(pool: &SqlitePool) -> Result<()> {
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS workout_calendar (
            date TEXT PRIMARY KEY,
            plan_id INTEGER NOT NULL REFERENCES workout_plans(id),
            notes TEXT
        )
        "#,
    )
    .execute(pool)
    .await?;

    Ok(())
}
