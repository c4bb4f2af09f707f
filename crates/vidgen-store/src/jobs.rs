//! Job persistence.
//!
//! Every mutating statement carries a `status NOT IN ('complete','error')`
//! guard, so terminal rows are immutable at the SQL layer no matter how many
//! pollers race over the same job.

use chrono::{DateTime, Utc};
use sqlx::SqlitePool;
use tracing::debug;

use vidgen_models::{Job, JobId, JobStatus};

use crate::error::{StoreError, StoreResult};
use crate::rows::JobRow;

#[derive(Clone)]
pub struct JobRepository {
    pool: SqlitePool,
}

/// Media fields written by the one-shot completion update.
#[derive(Debug, Clone)]
pub struct CompletedMedia {
    pub video_url: String,
    pub thumbnail_url: Option<String>,
    pub blob_key: String,
    pub cost: f64,
    pub completed_at: DateTime<Utc>,
}

impl JobRepository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    pub async fn insert(&self, job: &Job) -> StoreResult<()> {
        sqlx::query(
            r#"
            INSERT INTO jobs (
                id, user_id, prompt, provider, provider_job_id, model, status,
                video_url, thumbnail_url, blob_key, duration_seconds,
                aspect_ratio, resolution, cost, error, created_at,
                completed_at, conversation_id, message_id
            )
            VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(job.id.as_str())
        .bind(&job.user_id)
        .bind(&job.prompt)
        .bind(job.provider.as_str())
        .bind(&job.provider_job_id)
        .bind(&job.model)
        .bind(job.status.as_str())
        .bind(&job.video_url)
        .bind(&job.thumbnail_url)
        .bind(&job.blob_key)
        .bind(job.duration_seconds)
        .bind(&job.aspect_ratio)
        .bind(&job.resolution)
        .bind(job.cost)
        .bind(&job.error)
        .bind(job.created_at)
        .bind(job.completed_at)
        .bind(&job.conversation_id)
        .bind(&job.message_id)
        .execute(&self.pool)
        .await?;

        debug!(job_id = %job.id, status = %job.status, "job persisted");
        Ok(())
    }

    pub async fn find(&self, id: &JobId) -> StoreResult<Option<Job>> {
        let row = sqlx::query_as::<_, JobRow>("SELECT * FROM jobs WHERE id = ?")
            .bind(id.as_str())
            .fetch_optional(&self.pool)
            .await?;
        row.map(Job::try_from).transpose()
    }

    pub async fn get(&self, id: &JobId) -> StoreResult<Job> {
        self.find(id)
            .await?
            .ok_or_else(|| StoreError::not_found("jobs", id.as_str()))
    }

    /// Move a non-terminal job to `generating`. A no-op on terminal rows.
    pub async fn mark_generating(&self, id: &JobId) -> StoreResult<()> {
        sqlx::query(
            "UPDATE jobs SET status = ? WHERE id = ? AND status NOT IN ('complete', 'error')",
        )
        .bind(JobStatus::Generating.as_str())
        .bind(id.as_str())
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    /// The single atomic completion update: status, playback URL, blob key,
    /// cost, and completion time land together or not at all. Returns false
    /// when the row was already terminal (another poller won the race).
    pub async fn complete_with_media(
        &self,
        id: &JobId,
        media: &CompletedMedia,
    ) -> StoreResult<bool> {
        let result = sqlx::query(
            r#"
            UPDATE jobs
            SET status = 'complete',
                video_url = ?,
                thumbnail_url = ?,
                blob_key = ?,
                cost = ?,
                completed_at = ?,
                error = NULL
            WHERE id = ? AND status NOT IN ('complete', 'error')
            "#,
        )
        .bind(&media.video_url)
        .bind(&media.thumbnail_url)
        .bind(&media.blob_key)
        .bind(media.cost)
        .bind(media.completed_at)
        .bind(id.as_str())
        .execute(&self.pool)
        .await?;

        Ok(result.rows_affected() > 0)
    }

    /// Move a non-terminal job to terminal `error`. `completed_at` stays
    /// null: the job never finished. Returns false if already terminal.
    pub async fn fail(&self, id: &JobId, message: &str) -> StoreResult<bool> {
        let result = sqlx::query(
            r#"
            UPDATE jobs
            SET status = 'error', error = ?
            WHERE id = ? AND status NOT IN ('complete', 'error')
            "#,
        )
        .bind(message)
        .bind(id.as_str())
        .execute(&self.pool)
        .await?;

        Ok(result.rows_affected() > 0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{connect_memory, migrate};
    use vidgen_models::{NewJob, Provider};

    async fn repo() -> JobRepository {
        let pool = connect_memory().await.unwrap();
        migrate(&pool).await.unwrap();
        JobRepository::new(pool)
    }

    fn queued_job() -> Job {
        Job::queued(
            NewJob {
                user_id: "user-1".into(),
                prompt: "a red fox in the snow".into(),
                provider: Provider::OpenAi,
                model: "sora-2".into(),
                duration_seconds: 8.0,
                aspect_ratio: "16:9".into(),
                resolution: Some("720p".into()),
                conversation_id: None,
                message_id: None,
            },
            "video_abc123",
        )
    }

    fn media() -> CompletedMedia {
        CompletedMedia {
            video_url: "/media/videos/x.mp4".into(),
            thumbnail_url: None,
            blob_key: "videos/x.mp4".into(),
            cost: 0.8,
            completed_at: Utc::now(),
        }
    }

    #[tokio::test]
    async fn test_insert_and_find_round_trip() {
        let repo = repo().await;
        let job = queued_job();
        repo.insert(&job).await.unwrap();

        let loaded = repo.get(&job.id).await.unwrap();
        assert_eq!(loaded.id, job.id);
        assert_eq!(loaded.status, JobStatus::Queued);
        assert_eq!(loaded.provider, Provider::OpenAi);
        assert_eq!(loaded.provider_job_id.as_deref(), Some("video_abc123"));
        assert!(loaded.cost.is_none());
    }

    #[tokio::test]
    async fn test_find_missing_returns_none() {
        let repo = repo().await;
        let found = repo.find(&JobId::from_string("nope")).await.unwrap();
        assert!(found.is_none());
    }

    #[tokio::test]
    async fn test_completion_is_all_or_nothing() {
        let repo = repo().await;
        let job = queued_job();
        repo.insert(&job).await.unwrap();

        let updated = repo.complete_with_media(&job.id, &media()).await.unwrap();
        assert!(updated);

        let loaded = repo.get(&job.id).await.unwrap();
        assert_eq!(loaded.status, JobStatus::Complete);
        assert_eq!(loaded.cost, Some(0.8));
        assert_eq!(loaded.blob_key.as_deref(), Some("videos/x.mp4"));
        assert!(loaded.completed_at.is_some());
    }

    #[tokio::test]
    async fn test_terminal_rows_are_immutable() {
        let repo = repo().await;
        let job = queued_job();
        repo.insert(&job).await.unwrap();
        repo.fail(&job.id, "render failed").await.unwrap();

        // Losing poller's completion must not resurrect the job
        assert!(!repo.complete_with_media(&job.id, &media()).await.unwrap());
        assert!(!repo.fail(&job.id, "second failure").await.unwrap());
        repo.mark_generating(&job.id).await.unwrap();

        let loaded = repo.get(&job.id).await.unwrap();
        assert_eq!(loaded.status, JobStatus::Error);
        assert_eq!(loaded.error.as_deref(), Some("render failed"));
        assert!(loaded.completed_at.is_none());
    }

    #[tokio::test]
    async fn test_second_completion_loses_the_race() {
        let repo = repo().await;
        let job = queued_job();
        repo.insert(&job).await.unwrap();

        assert!(repo.complete_with_media(&job.id, &media()).await.unwrap());
        let mut second = media();
        second.cost = 99.0;
        assert!(!repo.complete_with_media(&job.id, &second).await.unwrap());

        let loaded = repo.get(&job.id).await.unwrap();
        assert_eq!(loaded.cost, Some(0.8));
    }

    #[tokio::test]
    async fn test_mark_generating_moves_queued_forward() {
        let repo = repo().await;
        let job = queued_job();
        repo.insert(&job).await.unwrap();

        repo.mark_generating(&job.id).await.unwrap();
        let loaded = repo.get(&job.id).await.unwrap();
        assert_eq!(loaded.status, JobStatus::Generating);
    }

    #[tokio::test]
    async fn test_rejected_job_persists_as_terminal_error() {
        let repo = repo().await;
        let job = Job::rejected(
            NewJob {
                user_id: "user-1".into(),
                prompt: "p".into(),
                provider: Provider::WaveSpeed,
                model: "google/veo-3".into(),
                duration_seconds: 5.0,
                aspect_ratio: "16:9".into(),
                resolution: None,
                conversation_id: None,
                message_id: None,
            },
            "prompt violates content policy",
        );
        repo.insert(&job).await.unwrap();

        let loaded = repo.get(&job.id).await.unwrap();
        assert_eq!(loaded.status, JobStatus::Error);
        assert!(loaded.provider_job_id.is_none());
        assert!(loaded.completed_at.is_none());
    }
}
