//! Provider error types.

use thiserror::Error;

/// Result type for provider operations.
pub type ProviderResult<T> = Result<T, ProviderError>;

/// Errors surfaced by provider adapters.
///
/// These cover transport and payload failures only. Provider-reported
/// business outcomes (a rejected prompt, a failed render) are normalized
/// into [`crate::SubmitOutcome::Rejected`] and
/// [`crate::PollStatus::Error`] instead, so callers never crash on them.
#[derive(Debug, Error)]
pub enum ProviderError {
    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    #[error("Provider returned {status}: {body}")]
    Http { status: u16, body: String },

    #[error("Unexpected provider payload: {0}")]
    UnexpectedPayload(String),

    #[error("Download failed: {0}")]
    Download(String),
}

impl ProviderError {
    pub fn unexpected(msg: impl Into<String>) -> Self {
        Self::UnexpectedPayload(msg.into())
    }
}
