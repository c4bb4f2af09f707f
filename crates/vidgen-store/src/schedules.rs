//! Schedule persistence.

use chrono::{DateTime, Utc};
use sqlx::SqlitePool;

use vidgen_models::{Schedule, ScheduleId};

use crate::error::{StoreError, StoreResult};
use crate::rows::ScheduleRow;

#[derive(Clone)]
pub struct ScheduleRepository {
    pool: SqlitePool,
}

impl ScheduleRepository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    pub async fn insert(&self, schedule: &Schedule) -> StoreResult<()> {
        sqlx::query(
            r#"
            INSERT INTO schedules (
                id, name, prompt, provider, model, aspect_ratio, frequency,
                enabled, last_run_at, next_run_at, total_runs, max_runs,
                created_at, updated_at
            )
            VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(schedule.id.as_str())
        .bind(&schedule.name)
        .bind(&schedule.prompt)
        .bind(schedule.provider.as_str())
        .bind(&schedule.model)
        .bind(&schedule.aspect_ratio)
        .bind(schedule.frequency.as_str())
        .bind(schedule.enabled)
        .bind(schedule.last_run_at)
        .bind(schedule.next_run_at)
        .bind(schedule.total_runs)
        .bind(schedule.max_runs)
        .bind(schedule.created_at)
        .bind(schedule.updated_at)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    pub async fn find(&self, id: &ScheduleId) -> StoreResult<Option<Schedule>> {
        let row = sqlx::query_as::<_, ScheduleRow>("SELECT * FROM schedules WHERE id = ?")
            .bind(id.as_str())
            .fetch_optional(&self.pool)
            .await?;
        row.map(Schedule::try_from).transpose()
    }

    pub async fn get(&self, id: &ScheduleId) -> StoreResult<Schedule> {
        self.find(id)
            .await?
            .ok_or_else(|| StoreError::not_found("schedules", id.as_str()))
    }

    pub async fn list(&self) -> StoreResult<Vec<Schedule>> {
        let rows =
            sqlx::query_as::<_, ScheduleRow>("SELECT * FROM schedules ORDER BY created_at")
                .fetch_all(&self.pool)
                .await?;
        rows.into_iter().map(Schedule::try_from).collect()
    }

    /// Write back every mutable field. Used by both PATCH edits and run
    /// bookkeeping after a successful submission.
    pub async fn update(&self, schedule: &Schedule) -> StoreResult<()> {
        let result = sqlx::query(
            r#"
            UPDATE schedules
            SET name = ?, prompt = ?, provider = ?, model = ?,
                aspect_ratio = ?, frequency = ?, enabled = ?,
                last_run_at = ?, next_run_at = ?, total_runs = ?,
                max_runs = ?, updated_at = ?
            WHERE id = ?
            "#,
        )
        .bind(&schedule.name)
        .bind(&schedule.prompt)
        .bind(schedule.provider.as_str())
        .bind(&schedule.model)
        .bind(&schedule.aspect_ratio)
        .bind(schedule.frequency.as_str())
        .bind(schedule.enabled)
        .bind(schedule.last_run_at)
        .bind(schedule.next_run_at)
        .bind(schedule.total_runs)
        .bind(schedule.max_runs)
        .bind(schedule.updated_at)
        .bind(schedule.id.as_str())
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(StoreError::not_found("schedules", schedule.id.as_str()));
        }
        Ok(())
    }

    pub async fn delete(&self, id: &ScheduleId) -> StoreResult<()> {
        let result = sqlx::query("DELETE FROM schedules WHERE id = ?")
            .bind(id.as_str())
            .execute(&self.pool)
            .await?;
        if result.rows_affected() == 0 {
            return Err(StoreError::not_found("schedules", id.as_str()));
        }
        Ok(())
    }

    /// Schedules the evaluator should fire now: enabled, due, and not
    /// already at their run cap.
    pub async fn due(&self, now: DateTime<Utc>) -> StoreResult<Vec<Schedule>> {
        let rows = sqlx::query_as::<_, ScheduleRow>(
            r#"
            SELECT * FROM schedules
            WHERE enabled = 1
              AND next_run_at <= ?
              AND (max_runs IS NULL OR total_runs < max_runs)
            ORDER BY next_run_at
            "#,
        )
        .bind(now)
        .fetch_all(&self.pool)
        .await?;
        rows.into_iter().map(Schedule::try_from).collect()
    }
}
