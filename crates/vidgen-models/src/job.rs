//! Generation job definitions.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

/// Unique identifier for a generation job.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct JobId(pub String);

impl JobId {
    /// Generate a new random job ID.
    pub fn new() -> Self {
        Self(Uuid::new_v4().to_string())
    }

    /// Create from an existing string.
    pub fn from_string(s: impl Into<String>) -> Self {
        Self(s.into())
    }

    /// Get the inner string.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Default for JobId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for JobId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// External rendering provider.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Provider {
    /// OpenAI-style video API (create / poll / authenticated download).
    OpenAi,
    /// WaveSpeed-style prediction API (create / poll / signed-URL download).
    WaveSpeed,
}

impl Provider {
    pub fn as_str(&self) -> &'static str {
        match self {
            Provider::OpenAi => "openai",
            Provider::WaveSpeed => "wavespeed",
        }
    }

    /// All known providers, in registry order.
    pub fn all() -> &'static [Provider] {
        &[Provider::OpenAi, Provider::WaveSpeed]
    }
}

impl fmt::Display for Provider {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for Provider {
    type Err = UnknownProvider;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "openai" => Ok(Provider::OpenAi),
            "wavespeed" => Ok(Provider::WaveSpeed),
            other => Err(UnknownProvider(other.to_string())),
        }
    }
}

/// Error returned when parsing an unrecognized provider tag.
#[derive(Debug, Clone, thiserror::Error)]
#[error("unknown provider: {0}")]
pub struct UnknownProvider(pub String);

/// Job lifecycle status.
///
/// Transitions only move forward: `queued -> generating -> {complete, error}`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum JobStatus {
    /// Accepted by the provider, waiting to start
    #[default]
    Queued,
    /// Provider is rendering
    Generating,
    /// Finished; artifact cached and priced
    Complete,
    /// Failed; `error` holds the reason
    Error,
}

impl JobStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            JobStatus::Queued => "queued",
            JobStatus::Generating => "generating",
            JobStatus::Complete => "complete",
            JobStatus::Error => "error",
        }
    }

    /// Check if this is a terminal state (no more transitions permitted).
    pub fn is_terminal(&self) -> bool {
        matches!(self, JobStatus::Complete | JobStatus::Error)
    }
}

impl fmt::Display for JobStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for JobStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "queued" => Ok(JobStatus::Queued),
            "generating" => Ok(JobStatus::Generating),
            "complete" => Ok(JobStatus::Complete),
            "error" => Ok(JobStatus::Error),
            other => Err(format!("unknown job status: {other}")),
        }
    }
}

/// One video rendering attempt.
///
/// Created by submission, mutated only by the poller's completion sequence,
/// never deleted by this core. Serializes in camelCase, which is also the
/// wire projection returned by the API.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Job {
    /// Unique job ID, generated at creation
    pub id: JobId,

    /// Caller identity; used only for the ownership check on streaming
    pub user_id: String,

    /// Generation prompt
    pub prompt: String,

    /// Provider that accepted (or rejected) the job
    pub provider: Provider,

    /// Provider-assigned job ID. Write-once; null until submission succeeds.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub provider_job_id: Option<String>,

    /// Model ID, one advertised by the provider's catalog
    pub model: String,

    /// Lifecycle status
    pub status: JobStatus,

    /// Playback URL. After completion this points at the cached blob path
    /// in preference to the provider's own URL.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub video_url: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub thumbnail_url: Option<String>,

    /// Blob storage key; null until the artifact is cached
    #[serde(skip_serializing_if = "Option::is_none")]
    pub blob_key: Option<String>,

    /// Requested clip duration in seconds
    pub duration_seconds: f64,

    /// Requested aspect ratio, e.g. "16:9"
    pub aspect_ratio: String,

    /// Requested resolution tier, e.g. "720p"
    #[serde(skip_serializing_if = "Option::is_none")]
    pub resolution: Option<String>,

    /// Monetary cost; null until `status = complete`
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cost: Option<f64>,

    /// Error message; set only when `status = error`
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,

    pub created_at: DateTime<Utc>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub completed_at: Option<DateTime<Utc>>,

    /// Opaque back-reference owned by the conversation store; never interpreted
    #[serde(skip_serializing_if = "Option::is_none")]
    pub conversation_id: Option<String>,

    /// Opaque back-reference owned by the conversation store; never interpreted
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message_id: Option<String>,
}

/// Parameters for creating a new job.
#[derive(Debug, Clone)]
pub struct NewJob {
    pub user_id: String,
    pub prompt: String,
    pub provider: Provider,
    pub model: String,
    pub duration_seconds: f64,
    pub aspect_ratio: String,
    pub resolution: Option<String>,
    pub conversation_id: Option<String>,
    pub message_id: Option<String>,
}

impl Job {
    /// Create a `queued` job after a successful provider submission.
    pub fn queued(new: NewJob, provider_job_id: impl Into<String>) -> Self {
        let mut job = Self::base(new);
        job.provider_job_id = Some(provider_job_id.into());
        job.status = JobStatus::Queued;
        job
    }

    /// Create a job persisted directly into terminal `error` state, used
    /// when the provider rejects the create-job call. There is no automatic
    /// resubmission; the caller must resubmit explicitly.
    pub fn rejected(new: NewJob, error: impl Into<String>) -> Self {
        let mut job = Self::base(new);
        job.status = JobStatus::Error;
        job.error = Some(error.into());
        job
    }

    fn base(new: NewJob) -> Self {
        Self {
            id: JobId::new(),
            user_id: new.user_id,
            prompt: new.prompt,
            provider: new.provider,
            provider_job_id: None,
            model: new.model,
            status: JobStatus::Queued,
            video_url: None,
            thumbnail_url: None,
            blob_key: None,
            duration_seconds: new.duration_seconds,
            aspect_ratio: new.aspect_ratio,
            resolution: new.resolution,
            cost: None,
            error: None,
            created_at: Utc::now(),
            completed_at: None,
            conversation_id: new.conversation_id,
            message_id: new.message_id,
        }
    }

    /// Check if the job is in a terminal state.
    pub fn is_terminal(&self) -> bool {
        self.status.is_terminal()
    }
}
