//! Application state.

use std::sync::Arc;

use vidgen_providers::ProviderRegistry;
use vidgen_storage::BlobClient;
use vidgen_store::{CredentialRepository, JobRepository, ScheduleRepository};

use crate::config::ApiConfig;

/// Shared application state.
#[derive(Clone)]
pub struct AppState {
    pub config: ApiConfig,
    pub registry: Arc<ProviderRegistry>,
    pub jobs: JobRepository,
    pub schedules: ScheduleRepository,
    pub credentials: CredentialRepository,
    pub blob: Arc<BlobClient>,
}

impl AppState {
    /// Create new application state.
    pub async fn new(config: ApiConfig) -> Result<Self, Box<dyn std::error::Error>> {
        let pool = vidgen_store::connect(&config.database_url).await?;
        vidgen_store::migrate(&pool).await?;

        // Surface a misconfigured bucket at startup instead of on the
        // first completed job
        let blob = BlobClient::from_env()?;
        blob.check_connectivity().await?;

        Ok(Self {
            config,
            registry: Arc::new(ProviderRegistry::new()),
            jobs: JobRepository::new(pool.clone()),
            schedules: ScheduleRepository::new(pool.clone()),
            credentials: CredentialRepository::new(pool),
            blob: Arc::new(blob),
        })
    }
}

#[cfg(test)]
mod tests {
    use crate::test_support::test_state;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    #[tokio::test]
    async fn test_blob_connectivity_probe_heads_bucket() {
        let server = MockServer::start().await;
        Mock::given(method("HEAD"))
            .and(path("/test-bucket"))
            .respond_with(ResponseTemplate::new(200))
            .mount(&server)
            .await;

        let state = test_state(&server.uri()).await;
        state.blob.check_connectivity().await.unwrap();
    }

    #[tokio::test]
    async fn test_blob_connectivity_probe_reports_missing_bucket() {
        let server = MockServer::start().await;
        Mock::given(method("HEAD"))
            .and(path("/test-bucket"))
            .respond_with(ResponseTemplate::new(404))
            .mount(&server)
            .await;

        let state = test_state(&server.uri()).await;
        assert!(state.blob.check_connectivity().await.is_err());
    }
}
