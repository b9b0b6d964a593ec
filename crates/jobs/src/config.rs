use std::time::Duration;

use crate::error::JobError;

/// Default polling cadence.
pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_millis(300);

/// Default overall deadline for one job (5 minutes).
pub const DEFAULT_JOB_TIMEOUT: Duration = Duration::from_secs(300);

/// Timing parameters for one job.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PollerConfig {
    /// Delay between progress requests. The first request is sent one
    /// interval after submission.
    pub poll_interval: Duration,
    /// Wall-clock budget from the end of submission to completion.
    pub timeout: Duration,
}

impl Default for PollerConfig {
    fn default() -> Self {
        Self {
            poll_interval: DEFAULT_POLL_INTERVAL,
            timeout: DEFAULT_JOB_TIMEOUT,
        }
    }
}

impl PollerConfig {
    pub fn with_poll_interval(mut self, poll_interval: Duration) -> Self {
        self.poll_interval = poll_interval;
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Reject durations the poll loop cannot run with.
    pub fn validate(&self) -> Result<(), JobError> {
        if self.poll_interval.is_zero() {
            return Err(JobError::InvalidConfig(
                "poll interval must be greater than zero".to_string(),
            ));
        }
        if self.timeout.is_zero() {
            return Err(JobError::InvalidConfig(
                "timeout must be greater than zero".to_string(),
            ));
        }
        Ok(())
    }
}
