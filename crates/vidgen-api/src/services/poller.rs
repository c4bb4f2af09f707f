//! Streaming poller.
//!
//! One poller runs per SSE connection. Dropping the stream (client
//! disconnect) stops polling immediately; nothing else is watching the
//! job, so the next connection picks up from the stored row. Several
//! concurrent pollers for the same job are safe: terminal rows
//! short-circuit on connect and the completion update is guarded in SQL,
//! so the first writer wins and later writers see a terminal row.

use std::convert::Infallible;

use async_stream::stream;
use axum::response::sse::Event;
use chrono::Utc;
use futures_util::Stream;
use tracing::{error, warn};

use vidgen_models::{Credential, GenerationEvent, Job};
use vidgen_providers::{PollSnapshot, PollStatus, ProviderAdapter};
use vidgen_storage::{public_media_path, video_key};
use vidgen_store::CompletedMedia;

use crate::state::AppState;

fn sse_event(event: &GenerationEvent) -> Event {
    Event::default().json_data(event).unwrap_or_else(|e| {
        error!("failed to encode stream event: {e}");
        Event::default().data("{}")
    })
}

/// Produce the SSE event stream for one job.
pub fn event_stream(state: AppState, job: Job) -> impl Stream<Item = Result<Event, Infallible>> {
    stream! {
        // Terminal on connect: answer from the stored row, one event, no
        // provider call.
        if job.is_terminal() {
            yield Ok(sse_event(&GenerationEvent::from_job(&job)));
            return;
        }

        // A failed credential read is a store blip, not a job failure: the
        // row stays untouched so a reconnect can resume polling. Only a
        // successful read that yields no usable credential is terminal.
        let creds = match state.credentials.list().await {
            Ok(creds) => creds,
            Err(e) => {
                error!(job_id = %job.id, "failed to load credentials: {e}");
                yield Ok(sse_event(&GenerationEvent::error(
                    "Credential lookup failed, reconnect to retry",
                )));
                return;
            }
        };
        let Some(credential) = state.registry.resolve(&creds, Some(job.provider)).cloned() else {
            yield Ok(terminal_failure(&state, &job, "No usable provider credential").await);
            return;
        };
        let Some(adapter) = state.registry.adapter(job.provider).cloned() else {
            yield Ok(terminal_failure(&state, &job, "Provider adapter unavailable").await);
            return;
        };
        let Some(provider_job_id) = job.provider_job_id.clone() else {
            // Submission always records the provider id before the job is
            // visible, so this indicates a corrupted row
            yield Ok(terminal_failure(&state, &job, "Job has no provider job id").await);
            return;
        };

        // Echo the stored state so the client renders immediately
        yield Ok(sse_event(&GenerationEvent::from_job(&job)));

        let mut transient_failures = 0u32;
        loop {
            tokio::time::sleep(state.config.poll_interval).await;

            let snapshot = match adapter.poll(&credential, &provider_job_id).await {
                Ok(snapshot) => {
                    transient_failures = 0;
                    snapshot
                }
                Err(e) => {
                    transient_failures += 1;
                    warn!(
                        job_id = %job.id,
                        provider = %job.provider,
                        %provider_job_id,
                        attempt = transient_failures,
                        "transient poll failure: {e}"
                    );
                    if transient_failures >= state.config.max_transient_poll_failures {
                        let message = format!("Generation status polling failed: {e}");
                        yield Ok(terminal_failure(&state, &job, &message).await);
                        return;
                    }
                    continue;
                }
            };

            match snapshot.status {
                PollStatus::Queued => {
                    yield Ok(sse_event(&GenerationEvent::progress(
                        vidgen_models::JobStatus::Queued,
                        snapshot.progress,
                    )));
                }
                PollStatus::Processing => {
                    if let Err(e) = state.jobs.mark_generating(&job.id).await {
                        error!(job_id = %job.id, "failed to mark job generating: {e}");
                    }
                    yield Ok(sse_event(&GenerationEvent::progress(
                        vidgen_models::JobStatus::Generating,
                        snapshot.progress,
                    )));
                }
                PollStatus::Error => {
                    let message = snapshot
                        .error
                        .unwrap_or_else(|| "Video generation failed".to_string());
                    yield Ok(terminal_failure(&state, &job, &message).await);
                    return;
                }
                PollStatus::Complete => {
                    // Cache, price, persist. Only then tell the client.
                    match finalize(&state, &job, &credential, adapter.as_ref(), &snapshot).await {
                        Ok(event) => {
                            yield Ok(sse_event(&event));
                            return;
                        }
                        Err(e) => {
                            // Job stays non-terminal; the whole sequence is
                            // retried on the next iteration
                            warn!(
                                job_id = %job.id,
                                provider = %job.provider,
                                %provider_job_id,
                                "completion sequence failed, will retry: {e}"
                            );
                        }
                    }
                }
            }
        }
    }
}

/// Persist terminal error state and build the closing event.
/// `completed_at` stays null: the job never finished.
async fn terminal_failure(state: &AppState, job: &Job, message: &str) -> Event {
    if let Err(e) = state.jobs.fail(&job.id, message).await {
        error!(job_id = %job.id, "failed to persist job failure: {e}");
    }
    sse_event(&GenerationEvent::error(message))
}

/// The completion sequence: download the artifact, cache it in blob
/// storage under a deterministic key, compute the cost, and enrich the row
/// in one guarded update. Any failure leaves the row untouched.
async fn finalize(
    state: &AppState,
    job: &Job,
    credential: &Credential,
    adapter: &dyn ProviderAdapter,
    snapshot: &PollSnapshot,
) -> anyhow::Result<GenerationEvent> {
    let source_url = snapshot
        .video_url
        .as_deref()
        .ok_or_else(|| anyhow::anyhow!("provider reported completion without an artifact url"))?;

    let bytes = adapter.download(credential, source_url).await?;
    let key = video_key(job.id.as_str());
    state.blob.upload_bytes(bytes, &key, "video/mp4").await?;

    let duration = snapshot.duration_seconds.unwrap_or(job.duration_seconds);
    let pricing = adapter.find_model(&job.model).and_then(|m| m.pricing.clone());
    let cost = vidgen_models::cost(pricing.as_ref(), duration, job.resolution.as_deref());

    let media = CompletedMedia {
        video_url: public_media_path(&key),
        thumbnail_url: snapshot.thumbnail_url.clone(),
        blob_key: key,
        cost,
        completed_at: Utc::now(),
    };
    state.jobs.complete_with_media(&job.id, &media).await?;

    // Reload so the final event reflects exactly what was stored, even if
    // a concurrent poller's update won
    let stored = state.jobs.get(&job.id).await?;
    Ok(GenerationEvent::from_job(&stored))
}
