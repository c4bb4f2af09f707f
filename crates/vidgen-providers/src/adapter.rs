//! The uniform provider capability set.

use async_trait::async_trait;

use vidgen_models::{Credential, ModelDescriptor, Provider};

use crate::error::ProviderResult;

/// Canonical status vocabulary for provider polls.
///
/// Every adapter normalizes its provider's own vocabulary to this set.
/// Unknown or unexpected provider status strings map to `Processing`, never
/// to `Error`, so an upstream schema drift degrades to "still waiting"
/// rather than a false failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PollStatus {
    Queued,
    Processing,
    Complete,
    Error,
}

impl PollStatus {
    pub fn is_terminal(&self) -> bool {
        matches!(self, PollStatus::Complete | PollStatus::Error)
    }
}

/// A normalized job submission request.
#[derive(Debug, Clone)]
pub struct SubmitRequest {
    pub prompt: String,
    pub model: String,
    pub aspect_ratio: Option<String>,
    pub duration_seconds: Option<f64>,
    pub resolution: Option<String>,
}

/// Outcome of one create-job call.
///
/// Provider-reported business errors (HTTP 4xx/5xx bodies, bad prompts,
/// network failures) come back as `Rejected`; submission is never retried,
/// so there is no transient/terminal distinction to preserve here.
#[derive(Debug, Clone)]
pub enum SubmitOutcome {
    Accepted {
        provider_job_id: String,
        status: PollStatus,
    },
    Rejected {
        message: String,
    },
}

/// One normalized poll response.
#[derive(Debug, Clone)]
pub struct PollSnapshot {
    pub status: PollStatus,
    pub video_url: Option<String>,
    pub thumbnail_url: Option<String>,
    pub duration_seconds: Option<f64>,
    /// Provider-reported progress percentage, when available
    pub progress: Option<u8>,
    pub error: Option<String>,
}

impl PollSnapshot {
    pub fn pending(status: PollStatus, progress: Option<u8>) -> Self {
        Self {
            status,
            video_url: None,
            thumbnail_url: None,
            duration_seconds: None,
            progress,
            error: None,
        }
    }

    pub fn failed(message: impl Into<String>) -> Self {
        Self {
            status: PollStatus::Error,
            video_url: None,
            thumbnail_url: None,
            duration_seconds: None,
            progress: None,
            error: Some(message.into()),
        }
    }
}

/// Per-provider implementation of the generation capability set.
///
/// Adapters perform exactly one outbound call per method and never retry;
/// retry policy belongs to the streaming poller.
#[async_trait]
pub trait ProviderAdapter: Send + Sync {
    /// The provider tag this adapter serves.
    fn provider(&self) -> Provider;

    /// Static model catalog. No network call.
    fn models(&self) -> &[ModelDescriptor];

    /// Longest prompt the provider accepts.
    fn max_prompt_length(&self) -> usize;

    /// Look up one catalog entry by canonical id.
    fn find_model(&self, id: &str) -> Option<&ModelDescriptor> {
        self.models().iter().find(|m| m.id == id)
    }

    /// Submit a create-job call to the provider.
    async fn submit(&self, credential: &Credential, request: &SubmitRequest) -> SubmitOutcome;

    /// Poll a previously submitted job. `Err` means a transient transport
    /// or payload failure; provider-reported render failures come back as
    /// `Ok` with [`PollStatus::Error`].
    async fn poll(
        &self,
        credential: &Credential,
        provider_job_id: &str,
    ) -> ProviderResult<PollSnapshot>;

    /// Fetch the finished artifact bytes.
    async fn download(&self, credential: &Credential, url: &str) -> ProviderResult<Vec<u8>>;
}

/// Resolve a provider size token from `(aspect_ratio, resolution)`.
///
/// Graceful-degradation order, exactly: the exact pair in the model's
/// `valid_sizes`; else the first resolution defined for that aspect ratio;
/// else the adapter's hardcoded `defaults` table (first entry when even the
/// aspect ratio is unknown there).
pub fn resolve_size_token(
    model: &ModelDescriptor,
    aspect_ratio: &str,
    resolution: Option<&str>,
    defaults: &[(&str, &str)],
) -> String {
    if let Some(tables) = &model.valid_sizes {
        if let Some(table) = tables.iter().find(|t| t.aspect_ratio == aspect_ratio) {
            if let Some(resolution) = resolution {
                if let Some((_, token)) = table.sizes.iter().find(|(r, _)| r == resolution) {
                    return token.clone();
                }
            }
            if let Some((_, token)) = table.sizes.first() {
                return token.clone();
            }
        }
    }

    defaults
        .iter()
        .find(|(aspect, _)| *aspect == aspect_ratio)
        .map(|(_, token)| token.to_string())
        .unwrap_or_else(|| defaults[0].1.to_string())
}
