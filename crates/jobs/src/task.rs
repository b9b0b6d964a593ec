//! A single cancellable roadmap job.
//!
//! [`JobTask`] owns one spawned poll loop. Dropping the handle cancels
//! the job; call [`JobTask::wait`] to collect the outcome.

use std::sync::{Arc, OnceLock};

use careerverse_core::job::JobProgress;
use careerverse_core::types::JobResult;
use tokio::task::JoinHandle;
use tokio_util::sync::{CancellationToken, DropGuard};

use crate::api::JobApi;
use crate::config::PollerConfig;
use crate::error::JobError;
use crate::poll::{run_job, Reporter};

/// Handle to one in-flight job.
pub struct JobTask {
    cancel: CancellationToken,
    job_id: Arc<OnceLock<String>>,
    handle: JoinHandle<Result<JobResult, JobError>>,
    /// Cancels the job if the handle is dropped before `wait` returns.
    guard: DropGuard,
}

impl JobTask {
    /// Submit `payload` and start polling on a new tokio task.
    ///
    /// Must be called from within a tokio runtime.
    pub fn spawn<F>(
        api: Arc<dyn JobApi>,
        payload: serde_json::Value,
        config: PollerConfig,
        on_progress: F,
    ) -> Self
    where
        F: FnMut(&JobProgress) + Send + 'static,
    {
        let cancel = CancellationToken::new();
        let job_id = Arc::new(OnceLock::new());

        let handle = tokio::spawn(run_job(
            api,
            payload,
            config,
            cancel.clone(),
            Arc::clone(&job_id),
            Reporter::new("task", None),
            on_progress,
        ));

        Self {
            guard: cancel.clone().drop_guard(),
            cancel,
            job_id,
            handle,
        }
    }

    /// Server-assigned job id, once submission has succeeded.
    pub fn job_id(&self) -> Option<&str> {
        self.job_id.get().map(String::as_str)
    }

    /// Stop polling. The pending [`wait`](Self::wait) resolves with
    /// [`JobError::Cancelled`] unless the job already reached a terminal
    /// state.
    pub fn cancel(&self) {
        self.cancel.cancel();
    }

    /// A token that cancels this job when triggered.
    pub fn cancellation_token(&self) -> CancellationToken {
        self.cancel.clone()
    }

    /// Whether the poll loop has exited.
    pub fn is_finished(&self) -> bool {
        self.handle.is_finished()
    }

    /// Wait for the job to reach a terminal state.
    pub async fn wait(self) -> Result<JobResult, JobError> {
        let JobTask { handle, guard, .. } = self;
        let outcome = match handle.await {
            Ok(outcome) => outcome,
            Err(e) => Err(JobError::Aborted(e.to_string())),
        };
        guard.disarm();
        outcome
    }
}
