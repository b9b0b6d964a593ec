//! Drive one roadmap job to completion from the command line.

use std::sync::Arc;

use careerverse_core::job::JobProgress;
use careerverse_core::roadmap::RoadmapFlow;
use careerverse_core::types::JobResult;
use careerverse_jobs::{JobApi, JobPoller, RoadmapApi};

use crate::config::ClientConfig;

/// Submit `payload` to `flow` and wait for the roadmap.
///
/// Ctrl-C cancels the job; the returned error is then
/// [`JobError::Cancelled`](careerverse_jobs::JobError::Cancelled).
pub async fn execute(
    config: &ClientConfig,
    flow: RoadmapFlow,
    payload: serde_json::Value,
) -> anyhow::Result<JobResult> {
    let api = RoadmapApi::new(&config.api_url, flow, config.request_timeout)?;
    tracing::info!(flow = %flow, endpoint = %api.endpoint(), "Submitting roadmap job");

    let poller = JobPoller::new(Arc::new(api) as Arc<dyn JobApi>, config.poller);
    let result =
        run_until_interrupted(&poller, flow.as_str(), payload, tokio::signal::ctrl_c()).await;

    poller.shutdown().await;
    Ok(result?)
}

/// Run the job under `key`, cancelling it when `interrupt` resolves first.
pub async fn run_until_interrupted<I>(
    poller: &JobPoller,
    key: &str,
    payload: serde_json::Value,
    interrupt: I,
) -> Result<JobResult, careerverse_jobs::JobError>
where
    I: std::future::Future,
{
    let job = poller.submit_and_await(key, payload, log_progress);
    tokio::pin!(job);
    tokio::pin!(interrupt);

    // Poll the job first so it is registered before any cancel.
    tokio::select! {
        biased;
        outcome = &mut job => outcome,
        _ = &mut interrupt => {
            tracing::warn!(key, "Interrupted, cancelling job");
            poller.cancel(key).await;
            job.await
        }
    }
}

fn log_progress(progress: &JobProgress) {
    tracing::info!(
        completed = progress.completed_sections,
        current = progress.current_section,
        status = %progress.status,
        "Roadmap progress",
    );
}
