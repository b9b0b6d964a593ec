//! The submit -> poll -> resolve loop for a single job.
//!
//! [`run_job`] is the one place that talks to [`JobApi`]. It owns the
//! poll ticker and the deadline as locals, so every exit path (result,
//! server error, timeout, cancellation) drops both.

use std::sync::{Arc, OnceLock};

use careerverse_core::job::{JobProgress, JobStatus};
use careerverse_core::types::JobResult;
use tokio::sync::broadcast;
use tokio::time::{Instant, Interval, MissedTickBehavior};
use tokio_util::sync::CancellationToken;

use crate::api::{ApiError, JobApi};
use crate::config::PollerConfig;
use crate::error::JobError;
use crate::events::JobEvent;

/// Where a running job reports its lifecycle.
#[derive(Clone)]
pub(crate) struct Reporter {
    key: String,
    events: Option<broadcast::Sender<JobEvent>>,
}

impl Reporter {
    pub(crate) fn new(key: impl Into<String>, events: Option<broadcast::Sender<JobEvent>>) -> Self {
        Self {
            key: key.into(),
            events,
        }
    }

    pub(crate) fn key(&self) -> &str {
        &self.key
    }

    fn send(&self, event: JobEvent) {
        if let Some(tx) = &self.events {
            // No subscribers is fine.
            let _ = tx.send(event);
        }
    }
}

/// Submit `payload`, then poll until the job reaches a terminal state,
/// the deadline passes, or `cancel` fires.
///
/// `job_id` is filled in once the service has accepted the job.
/// `on_progress` sees every successfully fetched snapshot in poll order,
/// including the terminal one.
pub(crate) async fn run_job<F>(
    api: Arc<dyn JobApi>,
    payload: serde_json::Value,
    config: PollerConfig,
    cancel: CancellationToken,
    job_id: Arc<OnceLock<String>>,
    reporter: Reporter,
    on_progress: F,
) -> Result<JobResult, JobError>
where
    F: FnMut(&JobProgress) + Send,
{
    let outcome = drive(
        api.as_ref(),
        &payload,
        config,
        &cancel,
        &job_id,
        &reporter,
        on_progress,
    )
    .await;

    report_outcome(&reporter, job_id.get().map(String::as_str), &outcome);
    outcome
}

async fn drive<F>(
    api: &dyn JobApi,
    payload: &serde_json::Value,
    config: PollerConfig,
    cancel: &CancellationToken,
    job_id_slot: &OnceLock<String>,
    reporter: &Reporter,
    mut on_progress: F,
) -> Result<JobResult, JobError>
where
    F: FnMut(&JobProgress) + Send,
{
    config.validate()?;

    let started = tokio::select! {
        biased;
        _ = cancel.cancelled() => return Err(JobError::Cancelled { job_id: None }),
        res = api.start(payload) => res,
    };

    let response = started.map_err(|e| JobError::Submission(e.to_string()))?;
    let job_id = response
        .job_id()
        .ok_or_else(|| JobError::Submission("response carried no request id".to_string()))?
        .to_string();
    let _ = job_id_slot.set(job_id.clone());

    tracing::info!(key = reporter.key(), job_id = %job_id, "Job submitted");
    reporter.send(JobEvent::Submitted {
        key: reporter.key.clone(),
        job_id: job_id.clone(),
        at: chrono::Utc::now(),
    });

    let deadline = tokio::time::sleep(config.timeout);
    tokio::pin!(deadline);

    let mut ticker = tokio::time::interval_at(
        Instant::now() + config.poll_interval,
        config.poll_interval,
    );
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

    let mut attempt = 0u32;

    loop {
        tokio::select! {
            biased;
            _ = cancel.cancelled() => {
                return Err(JobError::Cancelled { job_id: Some(job_id) });
            }
            _ = &mut deadline => {
                return Err(JobError::Timeout { job_id, timeout: config.timeout });
            }
            polled = next_snapshot(api, &job_id, &mut ticker) => {
                attempt += 1;
                match polled {
                    Ok(progress) => {
                        tracing::debug!(
                            job_id = %job_id,
                            attempt,
                            status = %progress.status,
                            completed_sections = progress.completed_sections,
                            current_section = progress.current_section,
                            "Job progress",
                        );
                        on_progress(&progress);
                        reporter.send(JobEvent::Progress {
                            key: reporter.key.clone(),
                            job_id: job_id.clone(),
                            progress: progress.clone(),
                        });

                        let status = progress.status;
                        match status {
                            JobStatus::Pending => {}
                            JobStatus::Complete => return Ok(progress.into_result()),
                            JobStatus::Error => {
                                return Err(JobError::JobFailed {
                                    job_id,
                                    detail: progress.error,
                                });
                            }
                        }
                    }
                    Err(e) => {
                        tracing::warn!(
                            job_id = %job_id,
                            attempt,
                            error = %e,
                            "Progress poll failed, retrying on next tick",
                        );
                        reporter.send(JobEvent::PollFailed {
                            key: reporter.key.clone(),
                            job_id: job_id.clone(),
                            attempt,
                            error: e.to_string(),
                        });
                    }
                }
            }
        }
    }
}

/// Wait for the next tick, then fetch one snapshot.
async fn next_snapshot(
    api: &dyn JobApi,
    job_id: &str,
    ticker: &mut Interval,
) -> Result<JobProgress, ApiError> {
    ticker.tick().await;
    api.progress(job_id).await
}

fn report_outcome(
    reporter: &Reporter,
    job_id: Option<&str>,
    outcome: &Result<JobResult, JobError>,
) {
    let key = reporter.key.clone();
    let job_id_field = job_id.unwrap_or("-");

    match outcome {
        Ok(_) => {
            tracing::info!(key = %key, job_id = job_id_field, "Job completed");
            reporter.send(JobEvent::Completed {
                key,
                job_id: job_id_field.to_string(),
                at: chrono::Utc::now(),
            });
        }
        Err(JobError::Timeout { job_id, timeout }) => {
            tracing::warn!(
                key = %key,
                job_id = %job_id,
                timeout_ms = u64::try_from(timeout.as_millis()).unwrap_or(u64::MAX),
                "Job timed out",
            );
            reporter.send(JobEvent::TimedOut {
                key,
                job_id: job_id.clone(),
            });
        }
        Err(JobError::Cancelled { .. }) => {
            tracing::info!(key = %key, job_id = job_id_field, "Job cancelled");
            reporter.send(JobEvent::Cancelled { key });
        }
        Err(e) => {
            tracing::error!(
                key = %key,
                job_id = job_id_field,
                kind = e.kind(),
                error = %e,
                "Job failed",
            );
            reporter.send(JobEvent::Failed {
                key,
                error: e.to_string(),
            });
        }
    }
}
