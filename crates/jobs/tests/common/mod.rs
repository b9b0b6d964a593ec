use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use careerverse_core::job::JobProgress;
use careerverse_jobs::{ApiError, JobApi, StartResponse};

/// What the fake `start` endpoint answers.
#[allow(dead_code)]
pub enum StartBehavior {
    /// Accept the job under this id.
    Accept(String),
    /// 200 OK without an id.
    MissingId,
    /// Non-2xx response.
    Reject(u16),
}

/// One scripted answer of the fake `progress` endpoint.
#[allow(dead_code)]
pub enum Step {
    Snapshot(JobProgress),
    Fail(u16),
}

/// In-memory [`JobApi`] that replays a fixed script.
///
/// Once the script is exhausted every poll returns a pending snapshot.
pub struct ScriptedApi {
    start: StartBehavior,
    start_delay: Duration,
    steps: Mutex<VecDeque<Step>>,
    start_calls: AtomicUsize,
    progress_calls: AtomicUsize,
    last_payload: Mutex<Option<serde_json::Value>>,
}

#[allow(dead_code)]
impl ScriptedApi {
    pub fn new(start: StartBehavior, steps: Vec<Step>) -> Arc<Self> {
        Arc::new(Self::build(start, Duration::ZERO, steps))
    }

    /// Accept under `job-1` and replay `steps`.
    pub fn accepting(steps: Vec<Step>) -> Arc<Self> {
        Self::new(StartBehavior::Accept("job-1".into()), steps)
    }

    /// Like [`accepting`](Self::accepting) but the `start` call takes
    /// `delay` to answer.
    pub fn slow_start(delay: Duration, steps: Vec<Step>) -> Arc<Self> {
        Arc::new(Self::build(
            StartBehavior::Accept("job-1".into()),
            delay,
            steps,
        ))
    }

    fn build(start: StartBehavior, start_delay: Duration, steps: Vec<Step>) -> Self {
        Self {
            start,
            start_delay,
            steps: Mutex::new(steps.into()),
            start_calls: AtomicUsize::new(0),
            progress_calls: AtomicUsize::new(0),
            last_payload: Mutex::new(None),
        }
    }

    pub fn start_calls(&self) -> usize {
        self.start_calls.load(Ordering::SeqCst)
    }

    pub fn progress_calls(&self) -> usize {
        self.progress_calls.load(Ordering::SeqCst)
    }

    pub fn last_payload(&self) -> Option<serde_json::Value> {
        self.last_payload.lock().unwrap().clone()
    }
}

#[async_trait]
impl JobApi for ScriptedApi {
    async fn start(&self, payload: &serde_json::Value) -> Result<StartResponse, ApiError> {
        self.start_calls.fetch_add(1, Ordering::SeqCst);
        *self.last_payload.lock().unwrap() = Some(payload.clone());

        if !self.start_delay.is_zero() {
            tokio::time::sleep(self.start_delay).await;
        }

        match &self.start {
            StartBehavior::Accept(id) => Ok(StartResponse {
                request_id: Some(id.clone()),
            }),
            StartBehavior::MissingId => Ok(StartResponse::default()),
            StartBehavior::Reject(status) => Err(ApiError::Status {
                status: *status,
                body: "start rejected".into(),
            }),
        }
    }

    async fn progress(&self, _job_id: &str) -> Result<JobProgress, ApiError> {
        let calls = self.progress_calls.fetch_add(1, Ordering::SeqCst) + 1;
        let step = self.steps.lock().unwrap().pop_front();

        match step {
            Some(Step::Snapshot(progress)) => Ok(progress),
            Some(Step::Fail(status)) => Err(ApiError::Status {
                status,
                body: "progress unavailable".into(),
            }),
            None => Ok(JobProgress::pending(calls as u32, calls as u32 + 1)),
        }
    }
}

/// Shared recorder for `on_progress` callbacks.
#[allow(dead_code)]
pub fn progress_recorder() -> (
    Arc<Mutex<Vec<JobProgress>>>,
    impl FnMut(&JobProgress) + Send + 'static,
) {
    let seen = Arc::new(Mutex::new(Vec::new()));
    let sink = Arc::clone(&seen);
    (seen, move |p: &JobProgress| sink.lock().unwrap().push(p.clone()))
}
