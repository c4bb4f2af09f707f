//! Raw table rows and their conversions into domain types.
//!
//! Enum-ish columns (provider, status, frequency) are stored as their
//! canonical lowercase strings and parsed on the way out; a parse failure
//! surfaces as [`StoreError::Corrupt`] rather than a panic.

use chrono::{DateTime, Utc};
use sqlx::FromRow;

use vidgen_models::{
    Credential, Frequency, Job, JobId, JobStatus, Provider, Schedule, ScheduleId,
};

use crate::error::StoreError;

#[derive(Debug, FromRow)]
pub struct JobRow {
    pub id: String,
    pub user_id: String,
    pub prompt: String,
    pub provider: String,
    pub provider_job_id: Option<String>,
    pub model: String,
    pub status: String,
    pub video_url: Option<String>,
    pub thumbnail_url: Option<String>,
    pub blob_key: Option<String>,
    pub duration_seconds: f64,
    pub aspect_ratio: String,
    pub resolution: Option<String>,
    pub cost: Option<f64>,
    pub error: Option<String>,
    pub created_at: DateTime<Utc>,
    pub completed_at: Option<DateTime<Utc>>,
    pub conversation_id: Option<String>,
    pub message_id: Option<String>,
}

impl TryFrom<JobRow> for Job {
    type Error = StoreError;

    fn try_from(row: JobRow) -> Result<Self, Self::Error> {
        let provider: Provider = row
            .provider
            .parse()
            .map_err(|e| StoreError::corrupt("jobs", format!("{e}")))?;
        let status: JobStatus = row
            .status
            .parse()
            .map_err(|e: String| StoreError::corrupt("jobs", e))?;

        Ok(Job {
            id: JobId::from_string(row.id),
            user_id: row.user_id,
            prompt: row.prompt,
            provider,
            provider_job_id: row.provider_job_id,
            model: row.model,
            status,
            video_url: row.video_url,
            thumbnail_url: row.thumbnail_url,
            blob_key: row.blob_key,
            duration_seconds: row.duration_seconds,
            aspect_ratio: row.aspect_ratio,
            resolution: row.resolution,
            cost: row.cost,
            error: row.error,
            created_at: row.created_at,
            completed_at: row.completed_at,
            conversation_id: row.conversation_id,
            message_id: row.message_id,
        })
    }
}

#[derive(Debug, FromRow)]
pub struct ScheduleRow {
    pub id: String,
    pub name: String,
    pub prompt: String,
    pub provider: String,
    pub model: String,
    pub aspect_ratio: String,
    pub frequency: String,
    pub enabled: bool,
    pub last_run_at: Option<DateTime<Utc>>,
    pub next_run_at: DateTime<Utc>,
    pub total_runs: i64,
    pub max_runs: Option<i64>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl TryFrom<ScheduleRow> for Schedule {
    type Error = StoreError;

    fn try_from(row: ScheduleRow) -> Result<Self, Self::Error> {
        let provider: Provider = row
            .provider
            .parse()
            .map_err(|e| StoreError::corrupt("schedules", format!("{e}")))?;
        let frequency: Frequency = row
            .frequency
            .parse()
            .map_err(|e: String| StoreError::corrupt("schedules", e))?;

        Ok(Schedule {
            id: ScheduleId::from_string(row.id),
            name: row.name,
            prompt: row.prompt,
            provider,
            model: row.model,
            aspect_ratio: row.aspect_ratio,
            frequency,
            enabled: row.enabled,
            last_run_at: row.last_run_at,
            next_run_at: row.next_run_at,
            total_runs: row.total_runs,
            max_runs: row.max_runs,
            created_at: row.created_at,
            updated_at: row.updated_at,
        })
    }
}

#[derive(Debug, FromRow)]
pub struct CredentialRow {
    pub id: String,
    pub provider: String,
    pub api_key: String,
    pub enabled: bool,
    pub video_enabled: bool,
    /// JSON array of model ids, null for "all models"
    pub allowed_models: Option<String>,
}

impl TryFrom<CredentialRow> for Credential {
    type Error = StoreError;

    fn try_from(row: CredentialRow) -> Result<Self, Self::Error> {
        let provider: Provider = row
            .provider
            .parse()
            .map_err(|e| StoreError::corrupt("credentials", format!("{e}")))?;
        let allowed_models = row
            .allowed_models
            .map(|raw| serde_json::from_str::<Vec<String>>(&raw))
            .transpose()
            .map_err(|e| StoreError::corrupt("credentials", e.to_string()))?;

        Ok(Credential {
            id: row.id,
            provider,
            api_key: row.api_key,
            enabled: row.enabled,
            video_enabled: row.video_enabled,
            allowed_models,
        })
    }
}
