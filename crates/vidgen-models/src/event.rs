//! Streaming progress event schema.
//!
//! One `GenerationEvent` is emitted per poll response on the SSE stream;
//! the last event on any stream carries a terminal status.

use serde::{Deserialize, Serialize};

use crate::job::{Job, JobStatus};

/// A progress event for one generation job.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerationEvent {
    pub status: JobStatus,
    /// Provider-reported progress percentage, when available
    #[serde(skip_serializing_if = "Option::is_none")]
    pub progress: Option<u8>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub video_url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub thumbnail_url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cost: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl GenerationEvent {
    /// Intermediate progress event.
    pub fn progress(status: JobStatus, progress: Option<u8>) -> Self {
        Self {
            status,
            progress,
            video_url: None,
            thumbnail_url: None,
            cost: None,
            error: None,
        }
    }

    /// Terminal error event.
    pub fn error(message: impl Into<String>) -> Self {
        Self {
            status: JobStatus::Error,
            progress: None,
            video_url: None,
            thumbnail_url: None,
            cost: None,
            error: Some(message.into()),
        }
    }

    /// Final event reflecting a persisted job row. Used both for the
    /// completion event and for the instant answer on reconnect.
    pub fn from_job(job: &Job) -> Self {
        Self {
            status: job.status,
            progress: if job.status == JobStatus::Complete {
                Some(100)
            } else {
                None
            },
            video_url: job.video_url.clone(),
            thumbnail_url: job.thumbnail_url.clone(),
            cost: job.cost,
            error: job.error.clone(),
        }
    }

    /// Whether this event closes the stream.
    pub fn is_terminal(&self) -> bool {
        self.status.is_terminal()
    }
}
