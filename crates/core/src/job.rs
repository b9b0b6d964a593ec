//! Roadmap job progress model.
//!
//! The remote service owns job state; the client only ever reads
//! [`JobProgress`] snapshots returned by the progress endpoint.

use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// Job status
// ---------------------------------------------------------------------------

/// Status of a remote job as reported in a progress snapshot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum JobStatus {
    /// Still generating sections.
    Pending,
    /// Finished; the snapshot carries the result in `data`.
    Complete,
    /// The server gave up on the job.
    Error,
}

impl JobStatus {
    /// Return the wire representation of a status.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Complete => "complete",
            Self::Error => "error",
        }
    }

    /// Whether no further snapshots are expected after this one.
    pub fn is_terminal(&self) -> bool {
        !matches!(self, Self::Pending)
    }
}

impl std::fmt::Display for JobStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

// ---------------------------------------------------------------------------
// Progress snapshot
// ---------------------------------------------------------------------------

/// One progress snapshot for a job.
///
/// `completed_sections` is expected to grow across polls but the client
/// does not enforce it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct JobProgress {
    #[serde(default)]
    pub completed_sections: u32,
    #[serde(default)]
    pub current_section: u32,
    pub status: JobStatus,
    /// Result payload, present only once `status` is `complete`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data: Option<serde_json::Value>,
    /// Server-supplied failure detail for `status = error`.
    #[serde(default, alias = "message", skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl JobProgress {
    /// A pending snapshot with the given section counters.
    pub fn pending(completed_sections: u32, current_section: u32) -> Self {
        Self {
            completed_sections,
            current_section,
            status: JobStatus::Pending,
            data: None,
            error: None,
        }
    }

    /// A completed snapshot carrying `data`.
    pub fn complete(completed_sections: u32, data: serde_json::Value) -> Self {
        Self {
            completed_sections,
            current_section: completed_sections,
            status: JobStatus::Complete,
            data: Some(data),
            error: None,
        }
    }

    /// A failed snapshot with an optional detail message.
    pub fn failed(completed_sections: u32, error: Option<String>) -> Self {
        Self {
            completed_sections,
            current_section: completed_sections,
            status: JobStatus::Error,
            data: None,
            error,
        }
    }

    /// Move the result payload out of a completed snapshot.
    ///
    /// A `complete` snapshot without `data` yields `Value::Null`.
    pub fn into_result(self) -> serde_json::Value {
        self.data.unwrap_or(serde_json::Value::Null)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_pending_snapshot() {
        let json = r#"{"completedSections":2,"currentSection":3,"status":"pending"}"#;
        let progress: JobProgress = serde_json::from_str(json).unwrap();
        assert_eq!(progress, JobProgress::pending(2, 3));
        assert!(!progress.status.is_terminal());
    }

    #[test]
    fn parse_complete_snapshot_with_data() {
        let json = r#"{"completedSections":5,"currentSection":5,"status":"complete","data":{"roadmap":[1,2]}}"#;
        let progress: JobProgress = serde_json::from_str(json).unwrap();
        assert_eq!(progress.status, JobStatus::Complete);
        assert_eq!(progress.into_result()["roadmap"][1], 2);
    }

    #[test]
    fn complete_without_data_yields_null() {
        let json = r#"{"status":"complete"}"#;
        let progress: JobProgress = serde_json::from_str(json).unwrap();
        assert_eq!(progress.completed_sections, 0);
        assert!(progress.into_result().is_null());
    }

    #[test]
    fn error_detail_accepts_message_alias() {
        let json = r#"{"completedSections":1,"currentSection":2,"status":"error","message":"model overloaded"}"#;
        let progress: JobProgress = serde_json::from_str(json).unwrap();
        assert_eq!(progress.status, JobStatus::Error);
        assert_eq!(progress.error.as_deref(), Some("model overloaded"));
    }

    #[test]
    fn unknown_status_is_rejected() {
        let json = r#"{"completedSections":1,"status":"queued"}"#;
        assert!(serde_json::from_str::<JobProgress>(json).is_err());
    }

    #[test]
    fn serializes_camel_case_and_skips_empty_fields() {
        let value = serde_json::to_value(JobProgress::pending(1, 2)).unwrap();
        assert_eq!(value["completedSections"], 1);
        assert_eq!(value["currentSection"], 2);
        assert_eq!(value["status"], "pending");
        assert!(value.get("data").is_none());
        assert!(value.get("error").is_none());
    }

    #[test]
    fn terminal_statuses() {
        assert!(JobStatus::Complete.is_terminal());
        assert!(JobStatus::Error.is_terminal());
        assert_eq!(JobStatus::Error.to_string(), "error");
    }
}
