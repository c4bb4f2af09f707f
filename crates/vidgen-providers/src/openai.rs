//! OpenAI-style video generation adapter.
//!
//! Create via `POST /v1/videos`, poll via `GET /v1/videos/{id}`, fetch the
//! artifact via `GET /v1/videos/{id}/content`. All three calls require the
//! credential's bearer key, including the artifact download.

use std::sync::OnceLock;
use std::time::Duration;

use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use vidgen_models::{Credential, ModelDescriptor, ModelKind, Pricing, Provider, SizeTable};

use crate::adapter::{
    resolve_size_token, PollSnapshot, PollStatus, ProviderAdapter, SubmitOutcome, SubmitRequest,
};
use crate::error::{ProviderError, ProviderResult};

const DEFAULT_BASE_URL: &str = "https://api.openai.com";

/// Documented prompt limit for the video endpoint.
pub const MAX_PROMPT_LENGTH: usize = 10_000;

/// Size tokens used when the aspect ratio is not in any model table.
const DEFAULT_SIZES: &[(&str, &str)] = &[("16:9", "1280x720"), ("9:16", "720x1280")];

const REQUEST_TIMEOUT: Duration = Duration::from_secs(120);

/// Adapter for the OpenAI video API.
pub struct OpenAiAdapter {
    http: Client,
    base_url: String,
}

#[derive(Debug, Serialize)]
struct CreateVideoRequest<'a> {
    model: &'a str,
    prompt: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    seconds: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    size: Option<String>,
}

#[derive(Debug, Deserialize)]
struct VideoResource {
    id: String,
    status: String,
    #[serde(default)]
    progress: Option<u8>,
    #[serde(default)]
    seconds: Option<String>,
    #[serde(default)]
    error: Option<ApiErrorBody>,
}

#[derive(Debug, Deserialize)]
struct ApiErrorBody {
    #[serde(default)]
    message: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ApiErrorEnvelope {
    #[serde(default)]
    error: Option<ApiErrorBody>,
}

impl OpenAiAdapter {
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
            "queued" => PollStatus::Queued,
            "in_progress" | "preprocessing" => PollStatus::Processing,
            "completed" => PollStatus::Complete,
            "failed" => PollStatus::Error,
            other => {
                debug!(status = other, "Unrecognized video status, treating as processing");
                PollStatus::Processing
            }
        }
    }

    fn content_url(&self, provider_job_id: &str) -> String {
        format!("{}/v1/videos/{}/content", self.base_url, provider_job_id)
    }

    /// Extract the provider's own error message from a response body, with
    /// a generic fallback for non-JSON bodies.
    fn rejection_message(status: reqwest::StatusCode, body: &str) -> String {
        serde_json::from_str::<ApiErrorEnvelope>(body)
            .ok()
            .and_then(|e| e.error)
            .and_then(|e| e.message)
            .unwrap_or_else(|| format!("Provider returned {status}"))
    }
}

impl Default for OpenAiAdapter {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait::async_trait]
impl ProviderAdapter for OpenAiAdapter {
    fn provider(&self) -> Provider {
        Provider::OpenAi
    }

    fn models(&self) -> &[ModelDescriptor] {
        catalog()
    }

    fn max_prompt_length(&self) -> usize {
        MAX_PROMPT_LENGTH
    }

    async fn submit(&self, credential: &Credential, request: &SubmitRequest) -> SubmitOutcome {
        let url = format!("{}/v1/videos", self.base_url);
        let aspect = request.aspect_ratio.as_deref().unwrap_or("16:9");
        let size = self.find_model(&request.model).map(|model| {
            resolve_size_token(model, aspect, request.resolution.as_deref(), DEFAULT_SIZES)
        });

        let body = CreateVideoRequest {
            model: &request.model,
            prompt: &request.prompt,
            seconds: request
                .duration_seconds
                .map(|d| format!("{}", d.round() as u32)),
            size,
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
                warn!(model = %request.model, "Video submission failed: {e}");
                return SubmitOutcome::Rejected {
                    message: format!("Submission failed: {e}"),
                };
            }
        };

        let status = response.status();
        let text = response.text().await.unwrap_or_default();

        if !status.is_success() {
            return SubmitOutcome::Rejected {
                message: Self::rejection_message(status, &text),
            };
        }

        match serde_json::from_str::<VideoResource>(&text) {
            Ok(video) => SubmitOutcome::Accepted {
                provider_job_id: video.id,
                status: Self::normalize_status(&video.status),
            },
            Err(e) => SubmitOutcome::Rejected {
                message: format!("Unexpected provider payload: {e}"),
            },
        }
    }

    async fn poll(
        &self,
        credential: &Credential,
        provider_job_id: &str,
    ) -> ProviderResult<PollSnapshot> {
        let url = format!("{}/v1/videos/{}", self.base_url, provider_job_id);

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

        let video: VideoResource = response
            .json()
            .await
            .map_err(|e| ProviderError::unexpected(e.to_string()))?;

        let poll_status = Self::normalize_status(&video.status);
        let snapshot = match poll_status {
            PollStatus::Complete => PollSnapshot {
                status: PollStatus::Complete,
                video_url: Some(self.content_url(&video.id)),
                thumbnail_url: None,
                duration_seconds: video.seconds.as_deref().and_then(|s| s.parse().ok()),
                progress: Some(100),
                error: None,
            },
            PollStatus::Error => PollSnapshot::failed(
                video
                    .error
                    .and_then(|e| e.message)
                    .unwrap_or_else(|| "Video generation failed".to_string()),
            ),
            pending => PollSnapshot::pending(pending, video.progress),
        };

        Ok(snapshot)
    }

    async fn download(&self, credential: &Credential, url: &str) -> ProviderResult<Vec<u8>> {
        let response = self
            .http
            .get(url)
            .bearer_auth(&credential.api_key)
            .send()
            .await?;

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
                id: "sora-2".into(),
                display_name: "Sora 2".into(),
                kind: ModelKind::TextToVideo,
                supported_durations: vec![4.0, 8.0, 12.0],
                supported_aspect_ratios: vec!["16:9".into(), "9:16".into()],
                supported_resolutions: vec!["720p".into()],
                valid_sizes: Some(vec![
                    SizeTable::new("16:9", &[("720p", "1280x720")]),
                    SizeTable::new("9:16", &[("720p", "720x1280")]),
                ]),
                pricing: Some(Pricing::per_second(0.10)),
            },
            ModelDescriptor {
                id: "sora-2-pro".into(),
                display_name: "Sora 2 Pro".into(),
                kind: ModelKind::TextToVideo,
                supported_durations: vec![4.0, 8.0, 12.0],
                supported_aspect_ratios: vec!["16:9".into(), "9:16".into()],
                supported_resolutions: vec!["720p".into(), "1080p".into()],
                valid_sizes: Some(vec![
                    SizeTable::new("16:9", &[("720p", "1280x720"), ("1080p", "1792x1024")]),
                    SizeTable::new("9:16", &[("720p", "720x1280"), ("1080p", "1024x1792")]),
                ]),
                pricing: Some(
                    Pricing::per_second(0.30)
                        .with_resolution_rate("720p", 0.30)
                        .with_resolution_rate("1080p", 0.50),
                ),
            },
        ]
    })
}
