//! Shared job submission path.
//!
//! Both the HTTP handler and the schedule evaluator funnel through
//! [`submit`], so credential resolution, validation, and the
//! persist-even-on-rejection rule behave identically for interactive and
//! scheduled generations.

use tracing::{info, warn};

use vidgen_models::{canonical_model_id, Job, ModelDescriptor, NewJob, Provider};
use vidgen_providers::{ProviderAdapter, SubmitOutcome, SubmitRequest};

use crate::error::{ApiError, ApiResult};
use crate::state::AppState;

/// A normalized submission, after HTTP/schedule specifics are stripped.
#[derive(Debug, Clone)]
pub struct GenerationRequest {
    pub prompt: String,
    pub model: String,
    pub provider: Option<Provider>,
    pub aspect_ratio: String,
    pub duration_seconds: Option<f64>,
    pub resolution: Option<String>,
    pub conversation_id: Option<String>,
    pub message_id: Option<String>,
}

/// Resolve a credential, validate, submit, persist.
///
/// A provider rejection is not an `Err`: the job is persisted in terminal
/// `error` state and returned, so the caller sees the stored outcome.
/// There is no automatic resubmission.
pub async fn submit(state: &AppState, user_id: String, req: GenerationRequest) -> ApiResult<Job> {
    let credentials = state.credentials.list().await?;
    let credential = state
        .registry
        .resolve(&credentials, req.provider)
        .ok_or_else(|| {
            ApiError::ProviderUnavailable(match req.provider {
                Some(p) => format!("no enabled video credential for {p}"),
                None => "no enabled video credential".to_string(),
            })
        })?;

    let adapter = state
        .registry
        .adapter(credential.provider)
        .ok_or_else(|| ApiError::internal("credential resolved to unknown provider"))?;

    // Retired model ids keep working through the alias table
    let model_id = canonical_model_id(&req.model).to_string();
    let allowed = state.registry.models_for(credential);
    let model = allowed
        .iter()
        .find(|m| m.id == model_id)
        .ok_or_else(|| ApiError::bad_request(format!("Unknown or unavailable model: {}", req.model)))?;

    validate(&req, model, adapter.max_prompt_length())?;

    let duration_seconds = req
        .duration_seconds
        .or_else(|| model.supported_durations.first().copied())
        .unwrap_or(5.0);

    let outcome = adapter
        .submit(
            credential,
            &SubmitRequest {
                prompt: req.prompt.clone(),
                model: model_id.clone(),
                aspect_ratio: Some(req.aspect_ratio.clone()),
                duration_seconds: Some(duration_seconds),
                resolution: req.resolution.clone(),
            },
        )
        .await;

    let new = NewJob {
        user_id,
        prompt: req.prompt,
        provider: credential.provider,
        model: model_id,
        duration_seconds,
        aspect_ratio: req.aspect_ratio,
        resolution: req.resolution,
        conversation_id: req.conversation_id,
        message_id: req.message_id,
    };

    let job = match outcome {
        SubmitOutcome::Accepted {
            provider_job_id,
            status,
        } => {
            info!(
                provider = %new.provider,
                model = %new.model,
                %provider_job_id,
                ?status,
                "generation accepted"
            );
            Job::queued(new, provider_job_id)
        }
        SubmitOutcome::Rejected { message } => {
            warn!(provider = %new.provider, model = %new.model, %message, "generation rejected");
            Job::rejected(new, message)
        }
    };

    state.jobs.insert(&job).await?;
    Ok(job)
}

fn validate(
    req: &GenerationRequest,
    model: &ModelDescriptor,
    max_prompt_length: usize,
) -> ApiResult<()> {
    if req.prompt.trim().is_empty() {
        return Err(ApiError::Validation("prompt must not be empty".into()));
    }
    if req.prompt.len() > max_prompt_length {
        return Err(ApiError::Validation(format!(
            "prompt exceeds maximum length of {max_prompt_length} characters"
        )));
    }
    if let Some(duration) = req.duration_seconds {
        if !model.supported_durations.is_empty() && !model.supports_duration(duration) {
            return Err(ApiError::Validation(format!(
                "model {} does not support a duration of {duration}s",
                model.id
            )));
        }
    }
    if let Some(resolution) = &req.resolution {
        if !model.supported_resolutions.is_empty() && !model.supports_resolution(resolution) {
            return Err(ApiError::Validation(format!(
                "model {} does not support {resolution}",
                model.id
            )));
        }
    }
    Ok(())
}
