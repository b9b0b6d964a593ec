//! Terminal failures of a roadmap job.
//!
//! A single poll cycle failing is not an error at this level: it is
//! logged, reported as [`JobEvent::PollFailed`](crate::events::JobEvent)
//! and retried on the next tick.

use std::time::Duration;

/// Why a job did not produce a result.
///
/// `Clone` so that one outcome can be handed to every caller that joined
/// the same in-flight job.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum JobError {
    /// The job could not be started: transport failure, non-2xx
    /// response, or a response without a job id. No poll was issued.
    #[error("Failed to submit job: {0}")]
    Submission(String),

    /// The job did not complete before the deadline.
    #[error("Job {job_id} did not complete within {}ms", timeout.as_millis())]
    Timeout { job_id: String, timeout: Duration },

    /// The service reported the job as failed.
    #[error("Job {job_id} failed: {}", detail.as_deref().unwrap_or("no detail provided"))]
    JobFailed {
        job_id: String,
        detail: Option<String>,
    },

    /// The caller cancelled the job. `job_id` is `None` when cancellation
    /// happened before submission finished.
    #[error("Job {} was cancelled", job_id.as_deref().unwrap_or("<unsubmitted>"))]
    Cancelled { job_id: Option<String> },

    /// The job task ended abnormally (panic or runtime shutdown).
    #[error("Job task aborted: {0}")]
    Aborted(String),

    /// The timing configuration cannot drive a poll loop. Nothing was
    /// submitted.
    #[error("Invalid poller configuration: {0}")]
    InvalidConfig(String),
}

impl JobError {
    /// Short label used in log fields and events.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Submission(_) => "submission",
            Self::Timeout { .. } => "timeout",
            Self::JobFailed { .. } => "job_failed",
            Self::Cancelled { .. } => "cancelled",
            Self::Aborted(_) => "aborted",
            Self::InvalidConfig(_) => "invalid_config",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn job_failed_message_uses_detail() {
        let err = JobError::JobFailed {
            job_id: "r-1".into(),
            detail: Some("quota exceeded".into()),
        };
        assert_eq!(err.to_string(), "Job r-1 failed: quota exceeded");
    }

    #[test]
    fn job_failed_message_without_detail() {
        let err = JobError::JobFailed {
            job_id: "r-1".into(),
            detail: None,
        };
        assert_eq!(err.to_string(), "Job r-1 failed: no detail provided");
    }

    #[test]
    fn timeout_message_reports_millis() {
        let err = JobError::Timeout {
            job_id: "r-9".into(),
            timeout: Duration::from_secs(300),
        };
        assert_eq!(err.to_string(), "Job r-9 did not complete within 300000ms");
        assert_eq!(err.kind(), "timeout");
    }

    #[test]
    fn cancelled_before_submission() {
        let err = JobError::Cancelled { job_id: None };
        assert_eq!(err.to_string(), "Job <unsubmitted> was cancelled");
    }
}
