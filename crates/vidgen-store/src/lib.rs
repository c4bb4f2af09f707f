//! Relational persistence for jobs, schedules, and credentials.
//!
//! SQLite via sqlx. The schema is applied by [`migrate`], which is
//! idempotent and safe to run on every startup.

pub mod credentials;
pub mod error;
pub mod jobs;
pub mod rows;
pub mod schedules;

use std::str::FromStr;

use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions};
use sqlx::SqlitePool;
use tracing::info;

pub use credentials::CredentialRepository;
pub use error::{StoreError, StoreResult};
pub use jobs::{CompletedMedia, JobRepository};
pub use schedules::ScheduleRepository;

/// Open (creating if missing) the database at `database_url`.
pub async fn connect(database_url: &str) -> StoreResult<SqlitePool> {
    let options = SqliteConnectOptions::from_str(database_url)?.create_if_missing(true);
    let pool = SqlitePoolOptions::new()
        .max_connections(5)
        .connect_with(options)
        .await?;
    info!(database_url, "database connected");
    Ok(pool)
}

/// A private in-memory database, used by tests.
pub async fn connect_memory() -> StoreResult<SqlitePool> {
    // One connection so every query sees the same in-memory database
    let pool = SqlitePoolOptions::new()
        .max_connections(1)
        .connect("sqlite::memory:")
        .await?;
    Ok(pool)
}

/// Apply the schema. Every statement is `IF NOT EXISTS`, so repeated runs
/// are harmless.
pub async fn migrate(pool: &SqlitePool) -> StoreResult<()> {
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS jobs (
            id               TEXT PRIMARY KEY,
            user_id          TEXT NOT NULL,
            prompt           TEXT NOT NULL,
            provider         TEXT NOT NULL,
            provider_job_id  TEXT,
            model            TEXT NOT NULL,
            status           TEXT NOT NULL,
            video_url        TEXT,
            thumbnail_url    TEXT,
            blob_key         TEXT,
            duration_seconds REAL NOT NULL,
            aspect_ratio     TEXT NOT NULL,
            resolution       TEXT,
            cost             REAL,
            error            TEXT,
            created_at       TEXT NOT NULL,
            completed_at     TEXT,
            conversation_id  TEXT,
            message_id       TEXT
        )
        "#,
    )
    .execute(pool)
    .await?;

    sqlx::query("CREATE INDEX IF NOT EXISTS idx_jobs_user_created ON jobs (user_id, created_at)")
        .execute(pool)
        .await?;

    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS schedules (
            id           TEXT PRIMARY KEY,
            name         TEXT NOT NULL,
            prompt       TEXT NOT NULL,
            provider     TEXT NOT NULL,
            model        TEXT NOT NULL,
            aspect_ratio TEXT NOT NULL,
            frequency    TEXT NOT NULL,
            enabled      INTEGER NOT NULL,
            last_run_at  TEXT,
            next_run_at  TEXT NOT NULL,
            total_runs   INTEGER NOT NULL DEFAULT 0,
            max_runs     INTEGER,
            created_at   TEXT NOT NULL,
            updated_at   TEXT NOT NULL
        )
        "#,
    )
    .execute(pool)
    .await?;

    sqlx::query(
        "CREATE INDEX IF NOT EXISTS idx_schedules_due ON schedules (enabled, next_run_at)",
    )
    .execute(pool)
    .await?;

    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS credentials (
            id             TEXT PRIMARY KEY,
            provider       TEXT NOT NULL,
            api_key        TEXT NOT NULL,
            enabled        INTEGER NOT NULL DEFAULT 1,
            video_enabled  INTEGER NOT NULL DEFAULT 1,
            allowed_models TEXT,
            position       INTEGER NOT NULL DEFAULT 0
        )
        "#,
    )
    .execute(pool)
    .await?;

    Ok(())
}
