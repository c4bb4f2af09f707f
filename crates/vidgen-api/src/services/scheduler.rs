//! Background service evaluating recurring generation schedules.
//!
//! Runs on a fixed interval with at-least-once semantics: ticks that
//! overlap (a slow provider call outlasting the interval, or two
//! processes sharing a database) can double-submit a due schedule. There
//! is no claim step; the window is accepted and documented.

use std::time::Duration;

use chrono::Utc;
use tokio::time::interval;
use tracing::{error, info, warn};

use vidgen_models::{JobStatus, Schedule};

use crate::services::submission::{self, GenerationRequest};
use crate::state::AppState;

/// Identity recorded on jobs created by the evaluator.
pub const SCHEDULER_USER_ID: &str = "scheduler";

/// Recurring-schedule evaluator.
pub struct ScheduleEvaluator {
    state: AppState,
    tick: Duration,
    enabled: bool,
}

impl ScheduleEvaluator {
    pub fn new(state: AppState) -> Self {
        let tick = state.config.scheduler_interval;
        let enabled = state.config.scheduler_enabled;
        Self {
            state,
            tick,
            enabled,
        }
    }

    /// Start the evaluation loop.
    ///
    /// Runs indefinitely and should be spawned as a background task.
    pub async fn run(&self) {
        if !self.enabled {
            info!("Schedule evaluation is disabled");
            return;
        }

        info!("Starting schedule evaluator (interval: {:?})", self.tick);

        let mut ticker = interval(self.tick);

        loop {
            ticker.tick().await;

            if let Err(e) = self.evaluate_once().await {
                error!("Schedule evaluation error: {e}");
            }
        }
    }

    /// Run a single evaluation cycle. Returns the number of schedules that
    /// produced an accepted submission.
    pub async fn evaluate_once(&self) -> anyhow::Result<u32> {
        let now = Utc::now();
        let due = self.state.schedules.due(now).await?;
        if due.is_empty() {
            return Ok(0);
        }

        let mut submitted = 0u32;
        for mut schedule in due {
            match submission::submit(
                &self.state,
                SCHEDULER_USER_ID.to_string(),
                request_for(&schedule),
            )
            .await
            {
                Ok(job) if job.status != JobStatus::Error => {
                    // Bookkeeping moves only on an accepted submission
                    schedule.record_run(now);
                    self.state.schedules.update(&schedule).await?;
                    submitted += 1;
                    info!(
                        schedule_id = %schedule.id,
                        job_id = %job.id,
                        total_runs = schedule.total_runs,
                        "scheduled generation submitted"
                    );
                }
                Ok(job) => {
                    warn!(
                        schedule_id = %schedule.id,
                        job_id = %job.id,
                        error = job.error.as_deref().unwrap_or("unknown"),
                        "scheduled submission rejected; schedule untouched"
                    );
                }
                Err(e) => {
                    warn!(schedule_id = %schedule.id, "scheduled submission failed: {e}");
                }
            }
        }

        Ok(submitted)
    }
}

fn request_for(schedule: &Schedule) -> GenerationRequest {
    GenerationRequest {
        prompt: schedule.prompt.clone(),
        model: schedule.model.clone(),
        provider: Some(schedule.provider),
        aspect_ratio: schedule.aspect_ratio.clone(),
        duration_seconds: None,
        resolution: None,
        conversation_id: None,
        message_id: None,
    }
}
