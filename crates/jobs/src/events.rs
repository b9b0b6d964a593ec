//! Lifecycle events emitted by the job poller.
//!
//! Published on a [`tokio::sync::broadcast`] channel; subscribe with
//! [`JobPoller::subscribe`](crate::poller::JobPoller::subscribe).

use careerverse_core::job::JobProgress;
use careerverse_core::types::Timestamp;
use serde::Serialize;

/// A state change of one in-flight job, identified by its poller key.
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum JobEvent {
    /// The service accepted the job and assigned it an id.
    Submitted {
        key: String,
        job_id: String,
        at: Timestamp,
    },

    /// A poll returned a snapshot (pending or terminal).
    Progress {
        key: String,
        job_id: String,
        progress: JobProgress,
    },

    /// One poll cycle failed; polling continues.
    PollFailed {
        key: String,
        job_id: String,
        attempt: u32,
        error: String,
    },

    /// The job completed and its result was handed to the caller.
    Completed {
        key: String,
        job_id: String,
        at: Timestamp,
    },

    /// The job ended without a result (submission failure, server error,
    /// abort).
    Failed { key: String, error: String },

    /// The deadline elapsed before completion.
    TimedOut { key: String, job_id: String },

    /// The caller cancelled the job.
    Cancelled { key: String },
}

impl JobEvent {
    /// The poller key the event belongs to.
    pub fn key(&self) -> &str {
        match self {
            Self::Submitted { key, .. }
            | Self::Progress { key, .. }
            | Self::PollFailed { key, .. }
            | Self::Completed { key, .. }
            | Self::Failed { key, .. }
            | Self::TimedOut { key, .. }
            | Self::Cancelled { key } => key,
        }
    }
}
