//! Generation submission, lookup, and streaming.

use std::convert::Infallible;

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::sse::{KeepAlive, Sse};
use axum::Json;
use futures_util::Stream;
use serde::Deserialize;
use validator::Validate;

use vidgen_models::{Job, JobId, Provider};

use crate::error::{ApiError, ApiResult};
use crate::identity::Caller;
use crate::services::poller;
use crate::services::submission::{self, GenerationRequest};
use crate::state::AppState;

#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct SubmitGenerationRequest {
    #[validate(length(min = 1, message = "prompt must not be empty"))]
    pub prompt: String,
    #[validate(length(min = 1, message = "model must not be empty"))]
    pub model: String,
    /// Restrict credential resolution to one provider
    pub provider: Option<String>,
    pub aspect_ratio: Option<String>,
    pub duration_seconds: Option<f64>,
    pub resolution: Option<String>,
    pub conversation_id: Option<String>,
    pub message_id: Option<String>,
}

/// `POST /api/generations`
pub async fn submit_generation(
    State(state): State<AppState>,
    caller: Caller,
    Json(body): Json<SubmitGenerationRequest>,
) -> ApiResult<(StatusCode, Json<Job>)> {
    body.validate()
        .map_err(|e| ApiError::Validation(e.to_string()))?;

    let provider = body
        .provider
        .as_deref()
        .map(|p| p.parse::<Provider>())
        .transpose()
        .map_err(|e| ApiError::bad_request(e.to_string()))?;

    let request = GenerationRequest {
        prompt: body.prompt,
        model: body.model,
        provider,
        aspect_ratio: body.aspect_ratio.unwrap_or_else(|| "16:9".to_string()),
        duration_seconds: body.duration_seconds,
        resolution: body.resolution,
        conversation_id: body.conversation_id,
        message_id: body.message_id,
    };

    let job = submission::submit(&state, caller.0, request).await?;
    Ok((StatusCode::CREATED, Json(job)))
}

/// `GET /api/generations/{id}`
///
/// Same ownership rule as the event stream: only the submitting user may
/// read the row.
pub async fn get_generation(
    State(state): State<AppState>,
    caller: Caller,
    Path(job_id): Path<String>,
) -> ApiResult<Json<Job>> {
    let job = state
        .jobs
        .find(&JobId::from_string(&job_id))
        .await?
        .ok_or_else(|| ApiError::not_found(format!("generation {job_id}")))?;

    if job.user_id != caller.0 {
        return Err(ApiError::forbidden("generation belongs to another user"));
    }
    Ok(Json(job))
}

/// `GET /api/generations/{id}/events`
///
/// SSE stream of progress events, closed by one terminal event. Only the
/// submitting user may attach.
pub async fn stream_generation_events(
    State(state): State<AppState>,
    caller: Caller,
    Path(job_id): Path<String>,
) -> ApiResult<Sse<impl Stream<Item = Result<axum::response::sse::Event, Infallible>>>> {
    let job = state
        .jobs
        .find(&JobId::from_string(&job_id))
        .await?
        .ok_or_else(|| ApiError::not_found(format!("generation {job_id}")))?;

    if job.user_id != caller.0 {
        return Err(ApiError::forbidden("generation belongs to another user"));
    }

    let stream = poller::event_stream(state, job);
    Ok(Sse::new(stream).keep_alive(KeepAlive::default()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{insert_queued_job, test_state};
    use wiremock::MockServer;

    #[tokio::test]
    async fn test_get_generation_returns_own_job() {
        let server = MockServer::start().await;
        let state = test_state(&server.uri()).await;
        let job = insert_queued_job(&state, "video_123").await;

        let Json(fetched) = get_generation(
            State(state),
            Caller("user-1".into()),
            Path(job.id.as_str().to_string()),
        )
        .await
        .unwrap();
        assert_eq!(fetched.id, job.id);
    }

    #[tokio::test]
    async fn test_get_generation_rejects_other_users() {
        let server = MockServer::start().await;
        let state = test_state(&server.uri()).await;
        let job = insert_queued_job(&state, "video_123").await;

        let err = get_generation(
            State(state),
            Caller("someone-else".into()),
            Path(job.id.as_str().to_string()),
        )
        .await
        .unwrap_err();
        assert!(matches!(err, ApiError::Forbidden(_)));
    }
}
