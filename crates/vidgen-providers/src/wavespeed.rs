//! WaveSpeed-style prediction adapter.
//!
//! Create via `POST /api/v3/{model}`, poll via
//! `GET /api/v3/predictions/{id}/result`. Finished artifacts come back as
//! signed CDN URLs that need no authentication to fetch.

use std::sync::OnceLock;
use std::time::Duration;

use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use vidgen_models::{Credential, ModelDescriptor, ModelKind, Pricing, Provider};

use crate::adapter::{PollSnapshot, PollStatus, ProviderAdapter, SubmitOutcome, SubmitRequest};
use crate::error::{ProviderError, ProviderResult};

const DEFAULT_BASE_URL: &str = "https://api.wavespeed.ai";

/// Documented prompt limit for prediction endpoints.
pub const MAX_PROMPT_LENGTH: usize = 2_000;

const REQUEST_TIMEOUT: Duration = Duration::from_secs(120);

/// Adapter for the WaveSpeed prediction API.
pub struct WaveSpeedAdapter {
    http: Client,
    base_url: String,
}

#[derive(Debug, Serialize)]
struct CreatePredictionRequest<'a> {
    prompt: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    aspect_ratio: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    duration: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    resolution: Option<&'a str>,
}

#[derive(Debug, Deserialize)]
struct Envelope<T> {
    #[serde(default)]
    message: Option<String>,
    data: Option<T>,
}

#[derive(Debug, Deserialize)]
struct Prediction {
    id: String,
    status: String,
    #[serde(default)]
    outputs: Vec<String>,
    #[serde(default)]
    error: Option<String>,
}

impl WaveSpeedAdapter {
    pub fn new() -> Self {
        Self::with_base_url(DEFAULT_BASE_URL)
    }

    /// Point the adapter at a different endpoint (used by tests).
    pub fn with_base_url(base_url: impl Into<String>) -> Self {
        let http = Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()
            .expect("reqwest client");
        Self {
            http,
            base_url: base_url.into().trim_end_matches('/').to_string(),
        }
    }

    fn normalize_status(status: &str) -> PollStatus {
        match status {
            "created" | "queued" => PollStatus::Queued,
            "processing" => PollStatus::Processing,
            "completed" => PollStatus::Complete,
            "failed" => PollStatus::Error,
            other => {
                debug!(status = other, "Unrecognized prediction status, treating as processing");
                PollStatus::Processing
            }
        }
    }
}

impl Default for WaveSpeedAdapter {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait::async_trait]
impl ProviderAdapter for WaveSpeedAdapter {
    fn provider(&self) -> Provider {
        Provider::WaveSpeed
    }

    fn models(&self) -> &[ModelDescriptor] {
        catalog()
    }

    fn max_prompt_length(&self) -> usize {
        MAX_PROMPT_LENGTH
    }

    async fn submit(&self, credential: &Credential, request: &SubmitRequest) -> SubmitOutcome {
        let url = format!("{}/api/v3/{}", self.base_url, request.model);
        let body = CreatePredictionRequest {
            prompt: &request.prompt,
            aspect_ratio: request.aspect_ratio.as_deref(),
            duration: request.duration_seconds,
            resolution: request.resolution.as_deref(),
        };

        let response = match self
            .http
            .post(&url)
            .bearer_auth(&credential.api_key)
            .json(&body)
            .send()
            .await
        {
            Ok(r) => r,
            Err(e) => {
                warn!(model = %request.model, "Prediction submission failed: {e}");
                return SubmitOutcome::Rejected {
                    message: format!("Submission failed: {e}"),
                };
            }
        };

        let status = response.status();
        let text = response.text().await.unwrap_or_default();
        let envelope: Option<Envelope<Prediction>> = serde_json::from_str(&text).ok();

        if !status.is_success() {
            let message = envelope
                .and_then(|e| e.message)
                .unwrap_or_else(|| format!("Provider returned {status}"));
            return SubmitOutcome::Rejected { message };
        }

        match envelope.and_then(|e| e.data) {
            Some(prediction) => SubmitOutcome::Accepted {
                provider_job_id: prediction.id,
                status: Self::normalize_status(&prediction.status),
            },
            None => SubmitOutcome::Rejected {
                message: "Unexpected provider payload: missing prediction data".to_string(),
            },
        }
    }

    async fn poll(
        &self,
        credential: &Credential,
        provider_job_id: &str,
    ) -> ProviderResult<PollSnapshot> {
        let url = format!(
            "{}/api/v3/predictions/{}/result",
            self.base_url, provider_job_id
        );

        let response = self
            .http
            .get(&url)
            .bearer_auth(&credential.api_key)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(ProviderError::Http {
                status: status.as_u16(),
                body,
            });
        }

        let envelope: Envelope<Prediction> = response
            .json()
            .await
            .map_err(|e| ProviderError::unexpected(e.to_string()))?;
        let prediction = envelope
            .data
            .ok_or_else(|| ProviderError::unexpected("missing prediction data"))?;

        let snapshot = match Self::normalize_status(&prediction.status) {
            PollStatus::Complete => PollSnapshot {
                status: PollStatus::Complete,
                video_url: prediction.outputs.first().cloned(),
                thumbnail_url: prediction.outputs.get(1).cloned(),
                duration_seconds: None,
                progress: Some(100),
                error: None,
            },
            PollStatus::Error => PollSnapshot::failed(
                prediction
                    .error
                    .filter(|e| !e.is_empty())
                    .unwrap_or_else(|| "Prediction failed".to_string()),
            ),
            pending => PollSnapshot::pending(pending, None),
        };

        Ok(snapshot)
    }

    async fn download(&self, _credential: &Credential, url: &str) -> ProviderResult<Vec<u8>> {
        // Signed CDN URL; no bearer credential wanted or needed.
        let response = self.http.get(url).send().await?;

        let status = response.status();
        if !status.is_success() {
            return Err(ProviderError::Download(format!(
                "Artifact download returned {status}"
            )));
        }

        Ok(response.bytes().await?.to_vec())
    }
}

/// Static model catalog.
fn catalog() -> &'static [ModelDescriptor] {
    static CATALOG: OnceLock<Vec<ModelDescriptor>> = OnceLock::new();
    CATALOG.get_or_init(|| {
        vec![
            ModelDescriptor {
                id: "wavespeed-ai/wan-2.2/t2v-plus".into(),
                display_name: "Wan 2.2 Text-to-Video Plus".into(),
                kind: ModelKind::TextToVideo,
                supported_durations: vec![5.0, 10.0],
                supported_aspect_ratios: vec!["16:9".into(), "9:16".into(), "1:1".into()],
                supported_resolutions: vec!["480p".into(), "720p".into()],
                valid_sizes: None,
                pricing: Some(
                    Pricing::per_second(0.05).with_resolution_rate("480p", 0.025),
                ),
            },
            ModelDescriptor {
                id: "bytedance/seedance-v1-pro".into(),
                display_name: "Seedance 1.0 Pro".into(),
                kind: ModelKind::TextToVideo,
                supported_durations: vec![4.0, 8.0, 12.0],
                supported_aspect_ratios: vec!["16:9".into(), "9:16".into()],
                supported_resolutions: vec!["480p".into(), "720p".into(), "1080p".into()],
                valid_sizes: None,
                pricing: Some(
                    Pricing::per_second(0.30)
                        .with_resolution_rate("480p", 0.04)
                        .with_resolution_rate("1080p", 0.50),
                ),
            },
            ModelDescriptor {
                id: "google/veo-3".into(),
                display_name: "Veo 3".into(),
                kind: ModelKind::TextToVideo,
                supported_durations: vec![8.0],
                supported_aspect_ratios: vec!["16:9".into()],
                supported_resolutions: vec!["720p".into(), "1080p".into()],
                valid_sizes: None,
                pricing: Some(Pricing::per_generation(3.20)),
            },
        ]
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use wiremock::matchers::{header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn credential() -> Credential {
        Credential {
            id: "c2".into(),
            provider: Provider::WaveSpeed,
            api_key: "ws-test".into(),
            enabled: true,
            video_enabled: true,
            allowed_models: None,
        }
    }

    fn request() -> SubmitRequest {
        SubmitRequest {
            prompt: "timelapse of a city at dusk".into(),
            model: "bytedance/seedance-v1-pro".into(),
            aspect_ratio: Some("16:9".into()),
            duration_seconds: Some(8.0),
            resolution: Some("480p".into()),
        }
    }

    #[tokio::test]
    async fn test_submit_accepted() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/api/v3/bytedance/seedance-v1-pro"))
            .and(header("authorization", "Bearer ws-test"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "code": 200,
                "data": {"id": "pred_9", "status": "created"},
            })))
            .mount(&server)
            .await;

        let adapter = WaveSpeedAdapter::with_base_url(server.uri());
        match adapter.submit(&credential(), &request()).await {
            SubmitOutcome::Accepted {
                provider_job_id,
                status,
            } => {
                assert_eq!(provider_job_id, "pred_9");
                assert_eq!(status, PollStatus::Queued);
            }
            other => panic!("expected acceptance, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_submit_rejection_uses_envelope_message() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/api/v3/bytedance/seedance-v1-pro"))
            .respond_with(ResponseTemplate::new(422).set_body_json(json!({
                "code": 422,
                "message": "prompt too long",
            })))
            .mount(&server)
            .await;

        let adapter = WaveSpeedAdapter::with_base_url(server.uri());
        match adapter.submit(&credential(), &request()).await {
            SubmitOutcome::Rejected { message } => assert_eq!(message, "prompt too long"),
            other => panic!("expected rejection, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_poll_completed_carries_output_url() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/api/v3/predictions/pred_9/result"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "code": 200,
                "data": {
                    "id": "pred_9",
                    "status": "completed",
                    "outputs": ["https://cdn.example.com/pred_9.mp4"],
                },
            })))
            .mount(&server)
            .await;

        let adapter = WaveSpeedAdapter::with_base_url(server.uri());
        let snapshot = adapter.poll(&credential(), "pred_9").await.unwrap();
        assert_eq!(snapshot.status, PollStatus::Complete);
        assert_eq!(
            snapshot.video_url.as_deref(),
            Some("https://cdn.example.com/pred_9.mp4")
        );
    }

    #[tokio::test]
    async fn test_poll_failed_carries_error() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/api/v3/predictions/pred_9/result"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "code": 200,
                "data": {"id": "pred_9", "status": "failed", "error": "NSFW content detected"},
            })))
            .mount(&server)
            .await;

        let adapter = WaveSpeedAdapter::with_base_url(server.uri());
        let snapshot = adapter.poll(&credential(), "pred_9").await.unwrap();
        assert_eq!(snapshot.status, PollStatus::Error);
        assert_eq!(snapshot.error.as_deref(), Some("NSFW content detected"));
    }

    #[tokio::test]
    async fn test_poll_unknown_status_maps_to_processing() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/api/v3/predictions/pred_9/result"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "code": 200,
                "data": {"id": "pred_9", "status": "migrating"},
            })))
            .mount(&server)
            .await;

        let adapter = WaveSpeedAdapter::with_base_url(server.uri());
        let snapshot = adapter.poll(&credential(), "pred_9").await.unwrap();
        assert_eq!(snapshot.status, PollStatus::Processing);
    }

    #[tokio::test]
    async fn test_download_is_unauthenticated() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/outputs/pred_9.mp4"))
            .respond_with(ResponseTemplate::new(200).set_body_bytes(b"mp4-bytes".to_vec()))
            .mount(&server)
            .await;

        let adapter = WaveSpeedAdapter::with_base_url(server.uri());
        let url = format!("{}/outputs/pred_9.mp4", server.uri());
        let bytes = adapter.download(&credential(), &url).await.unwrap();
        assert_eq!(bytes, b"mp4-bytes");
    }
}
