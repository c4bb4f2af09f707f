//! Shared fixtures for unit tests.

use std::sync::Arc;
use std::time::Duration;

use vidgen_models::{Credential, Job, NewJob, Provider};
use vidgen_providers::{OpenAiAdapter, ProviderRegistry, WaveSpeedAdapter};
use vidgen_storage::{BlobClient, BlobConfig};
use vidgen_store::{CredentialRepository, JobRepository, ScheduleRepository};

use crate::config::ApiConfig;
use crate::state::AppState;

/// In-memory state with every external endpoint (providers and blob
/// storage) pointed at `base_url`, which tests back with a mock server.
pub async fn test_state(base_url: &str) -> AppState {
    let (state, _pool) = test_state_with_pool(base_url).await;
    state
}

/// Like [`test_state`], but hands back the pool so tests can sabotage the
/// schema directly.
pub async fn test_state_with_pool(base_url: &str) -> (AppState, sqlx::SqlitePool) {
    let pool = vidgen_store::connect_memory().await.unwrap();
    vidgen_store::migrate(&pool).await.unwrap();

    let registry = ProviderRegistry::with_adapters(vec![
        Arc::new(OpenAiAdapter::with_base_url(base_url)),
        Arc::new(WaveSpeedAdapter::with_base_url(base_url)),
    ]);

    let blob = BlobClient::new(BlobConfig {
        endpoint_url: base_url.to_string(),
        access_key_id: "test".into(),
        secret_access_key: "test".into(),
        bucket_name: "test-bucket".into(),
        region: "auto".into(),
    });

    let config = ApiConfig {
        poll_interval: Duration::from_millis(10),
        max_transient_poll_failures: 3,
        scheduler_enabled: true,
        ..ApiConfig::default()
    };

    let state = AppState {
        config,
        registry: Arc::new(registry),
        jobs: JobRepository::new(pool.clone()),
        schedules: ScheduleRepository::new(pool.clone()),
        credentials: CredentialRepository::new(pool.clone()),
        blob: Arc::new(blob),
    };
    (state, pool)
}

pub async fn seed_credential(state: &AppState, id: &str, provider: &str, position: i64) {
    let credential = Credential {
        id: id.into(),
        provider: provider.parse().unwrap(),
        api_key: format!("key-{id}"),
        enabled: true,
        video_enabled: true,
        allowed_models: None,
    };
    state.credentials.insert(&credential, position).await.unwrap();
}

/// Persist a queued job as if submission had just accepted it.
pub async fn insert_queued_job(state: &AppState, provider_job_id: &str) -> Job {
    let job = Job::queued(
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
        provider_job_id,
    );
    state.jobs.insert(&job).await.unwrap();
    job
}
