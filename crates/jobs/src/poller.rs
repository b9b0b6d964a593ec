//! Single-flight registry of roadmap jobs.
//!
//! [`JobPoller`] runs at most one job per key. A caller that submits
//! while a job with the same key is still in flight joins that job and
//! receives its outcome instead of starting a second one.
//!
//! A job lives as long as someone waits for it: when the last waiting
//! caller drops its future, the job is cancelled.
//!
//! Lifecycle events are broadcast via a [`tokio::sync::broadcast`]
//! channel. Call [`JobPoller::subscribe`] to receive them.

use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, AtomicUsize, Ordering};
use std::sync::{Arc, OnceLock};
use std::time::Duration;

use careerverse_core::job::JobProgress;
use careerverse_core::types::JobResult;
use futures::future::{BoxFuture, FutureExt, Shared};
use tokio::sync::{broadcast, Mutex};
use tokio_util::sync::CancellationToken;

use crate::api::JobApi;
use crate::config::PollerConfig;
use crate::error::JobError;
use crate::events::JobEvent;
use crate::poll::{run_job, Reporter};

/// Broadcast channel capacity for lifecycle events.
const EVENT_CHANNEL_CAPACITY: usize = 256;

/// How long [`JobPoller::shutdown`] waits for each job to wind down.
const SHUTDOWN_GRACE: Duration = Duration::from_secs(5);

type SharedOutcome = Shared<BoxFuture<'static, Result<JobResult, JobError>>>;
type Registry = Arc<Mutex<HashMap<String, InFlight>>>;

/// Internal bookkeeping for one in-flight job.
struct InFlight {
    /// Distinguishes this job from a later one under the same key.
    generation: u64,
    cancel: CancellationToken,
    job_id: Arc<OnceLock<String>>,
    outcome: SharedOutcome,
    /// Callers currently awaiting `outcome`.
    waiters: Arc<AtomicUsize>,
}

/// One caller's claim on an in-flight job.
///
/// Dropping the last unfinished claim cancels the job.
struct Waiter {
    key: String,
    cancel: CancellationToken,
    waiters: Arc<AtomicUsize>,
    finished: bool,
}

impl Waiter {
    /// Release the claim after the outcome was received.
    fn finish(mut self) {
        self.finished = true;
    }
}

impl Drop for Waiter {
    fn drop(&mut self) {
        let last = self.waiters.fetch_sub(1, Ordering::AcqRel) == 1;
        if last && !self.finished && !self.cancel.is_cancelled() {
            tracing::info!(key = %self.key, "No caller is waiting any more, cancelling job");
            self.cancel.cancel();
        }
    }
}

/// Runs roadmap jobs against one API, one job per key at a time.
pub struct JobPoller {
    api: Arc<dyn JobApi>,
    config: PollerConfig,
    in_flight: Registry,
    next_generation: AtomicU64,
    event_tx: broadcast::Sender<JobEvent>,
    /// Master cancellation token -- cancelled during shutdown.
    cancel: CancellationToken,
}

impl JobPoller {
    pub fn new(api: Arc<dyn JobApi>, config: PollerConfig) -> Self {
        let (event_tx, _) = broadcast::channel(EVENT_CHANNEL_CAPACITY);
        Self {
            api,
            config,
            in_flight: Arc::new(Mutex::new(HashMap::new())),
            next_generation: AtomicU64::new(0),
            event_tx,
            cancel: CancellationToken::new(),
        }
    }

    /// Default timing applied by [`submit_and_await`](Self::submit_and_await).
    pub fn config(&self) -> PollerConfig {
        self.config
    }

    /// Subscribe to job lifecycle events.
    pub fn subscribe(&self) -> broadcast::Receiver<JobEvent> {
        self.event_tx.subscribe()
    }

    /// Submit a job under `key` and wait for its result, using the
    /// poller's default timing.
    pub async fn submit_and_await<F>(
        &self,
        key: &str,
        payload: serde_json::Value,
        on_progress: F,
    ) -> Result<JobResult, JobError>
    where
        F: FnMut(&JobProgress) + Send + 'static,
    {
        self.submit_and_await_with(key, payload, self.config, on_progress)
            .await
    }

    /// Submit a job under `key` with explicit timing and wait for its
    /// result.
    ///
    /// If a job with the same key is already in flight, this call joins
    /// it: `payload`, `config` and `on_progress` are ignored and the
    /// existing job's outcome is returned.
    ///
    /// Dropping the returned future before it resolves withdraws this
    /// caller. The job is cancelled once no caller is left.
    pub async fn submit_and_await_with<F>(
        &self,
        key: &str,
        payload: serde_json::Value,
        config: PollerConfig,
        on_progress: F,
    ) -> Result<JobResult, JobError>
    where
        F: FnMut(&JobProgress) + Send + 'static,
    {
        let (outcome, waiter) = self.submit(key, payload, config, on_progress).await;
        let result = outcome.await;
        waiter.finish();
        result
    }

    /// Cancel the in-flight job under `key`.
    ///
    /// Returns `false` if no such job is running.
    pub async fn cancel(&self, key: &str) -> bool {
        match self.in_flight.lock().await.get(key) {
            Some(entry) => {
                tracing::info!(key, "Cancelling job");
                entry.cancel.cancel();
                true
            }
            None => false,
        }
    }

    /// Keys of all jobs currently in flight.
    pub async fn in_flight(&self) -> Vec<String> {
        let mut keys: Vec<String> = self.in_flight.lock().await.keys().cloned().collect();
        keys.sort();
        keys
    }

    /// Server-assigned id of the job under `key`, once submitted.
    pub async fn job_id(&self, key: &str) -> Option<String> {
        self.in_flight
            .lock()
            .await
            .get(key)
            .and_then(|entry| entry.job_id.get().cloned())
    }

    /// Cancel every in-flight job and wait for each to wind down.
    ///
    /// Jobs submitted after shutdown are cancelled immediately.
    pub async fn shutdown(&self) {
        tracing::info!("Shutting down job poller");
        self.cancel.cancel();

        let outcomes: Vec<(String, SharedOutcome)> = self
            .in_flight
            .lock()
            .await
            .iter()
            .map(|(key, entry)| (key.clone(), entry.outcome.clone()))
            .collect();

        for (key, outcome) in outcomes {
            if tokio::time::timeout(SHUTDOWN_GRACE, outcome).await.is_err() {
                tracing::warn!(key = %key, "Job did not stop within grace period");
            }
        }

        tracing::info!("Job poller shut down complete");
    }

    // ---- private helpers ----

    /// Return the outcome of the job under `key`, starting it if needed,
    /// together with this caller's claim on it.
    async fn submit<F>(
        &self,
        key: &str,
        payload: serde_json::Value,
        config: PollerConfig,
        on_progress: F,
    ) -> (SharedOutcome, Waiter)
    where
        F: FnMut(&JobProgress) + Send + 'static,
    {
        // Held across spawn + insert so the task cannot finish and try
        // to deregister before its entry exists.
        let mut in_flight = self.in_flight.lock().await;

        if let Some(existing) = in_flight.get(key) {
            if let Some(joined) = join(key, existing) {
                tracing::debug!(key, "Joining in-flight job");
                return joined;
            }
            // Cancelled or abandoned: replaced below. Its task only
            // removes entries of its own generation.
            tracing::debug!(key, "Replacing cancelled job");
        }

        let generation = self.next_generation.fetch_add(1, Ordering::Relaxed);
        let cancel = self.cancel.child_token();
        let job_id = Arc::new(OnceLock::new());
        let reporter = Reporter::new(key, Some(self.event_tx.clone()));

        let job = run_job(
            Arc::clone(&self.api),
            payload,
            config,
            cancel.clone(),
            Arc::clone(&job_id),
            reporter,
            on_progress,
        );

        let registry = Arc::clone(&self.in_flight);
        let owned_key = key.to_string();
        let handle = tokio::spawn(async move {
            let outcome = job.await;
            deregister(&registry, &owned_key, generation).await;
            outcome
        });

        let registry = Arc::clone(&self.in_flight);
        let owned_key = key.to_string();
        let outcome: SharedOutcome = async move {
            match handle.await {
                Ok(outcome) => outcome,
                Err(e) => {
                    // The task never reached its own deregistration.
                    deregister(&registry, &owned_key, generation).await;
                    Err(JobError::Aborted(e.to_string()))
                }
            }
        }
        .boxed()
        .shared();

        let waiters = Arc::new(AtomicUsize::new(1));
        let waiter = Waiter {
            key: key.to_string(),
            cancel: cancel.clone(),
            waiters: Arc::clone(&waiters),
            finished: false,
        };

        in_flight.insert(
            key.to_string(),
            InFlight {
                generation,
                cancel,
                job_id,
                outcome: outcome.clone(),
                waiters,
            },
        );

        (outcome, waiter)
    }
}

/// Claim a place on `entry` unless it is cancelled or its last waiter
/// has already left.
fn join(key: &str, entry: &InFlight) -> Option<(SharedOutcome, Waiter)> {
    if entry.cancel.is_cancelled() {
        return None;
    }
    entry
        .waiters
        .fetch_update(Ordering::AcqRel, Ordering::Acquire, |n| {
            (n > 0).then_some(n + 1)
        })
        .ok()?;

    Some((
        entry.outcome.clone(),
        Waiter {
            key: key.to_string(),
            cancel: entry.cancel.clone(),
            waiters: Arc::clone(&entry.waiters),
            finished: false,
        },
    ))
}

/// Remove the registry entry for `key` if it still belongs to
/// `generation`.
async fn deregister(registry: &Mutex<HashMap<String, InFlight>>, key: &str, generation: u64) {
    let mut in_flight = registry.lock().await;
    if in_flight
        .get(key)
        .is_some_and(|entry| entry.generation == generation)
    {
        in_flight.remove(key);
    }
}
