/// All timestamps are UTC.
pub type Timestamp = chrono::DateTime<chrono::Utc>;

/// Final payload of a completed job. Opaque to the client.
pub type JobResult = serde_json::Value;
