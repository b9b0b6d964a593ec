//! REST API client for the roadmap job endpoints.
//!
//! Wraps the two calls a roadmap job needs (`POST {base}/start` and
//! `GET {base}/progress/{id}`) using [`reqwest`]. The poller talks to
//! the service through the [`JobApi`] trait so it can be driven by an
//! in-memory implementation in tests.

use std::time::Duration;

use async_trait::async_trait;
use careerverse_core::job::JobProgress;
use careerverse_core::roadmap::RoadmapFlow;
use serde::Deserialize;

/// The remote operations the job poller depends on.
#[async_trait]
pub trait JobApi: Send + Sync + 'static {
    /// Submit a job payload. Returns the raw start response; the caller
    /// decides what a missing id means.
    async fn start(&self, payload: &serde_json::Value) -> Result<StartResponse, ApiError>;

    /// Fetch the current progress snapshot of a job.
    async fn progress(&self, job_id: &str) -> Result<JobProgress, ApiError>;
}

/// Response returned by the `start` endpoint.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StartResponse {
    /// Server-assigned correlation id for the queued job.
    #[serde(default, alias = "jobId")]
    pub request_id: Option<String>,
}

impl StartResponse {
    /// The job id, if the server supplied a non-blank one.
    pub fn job_id(&self) -> Option<&str> {
        self.request_id
            .as_deref()
            .map(str::trim)
            .filter(|id| !id.is_empty())
    }
}

/// Errors from the roadmap REST API layer.
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    /// The HTTP request itself failed (network, DNS, TLS, timeout, body decode).
    #[error("HTTP request failed: {0}")]
    Request(#[from] reqwest::Error),

    /// The service returned a non-2xx status code.
    #[error("Roadmap API error ({status}): {body}")]
    Status {
        /// HTTP status code.
        status: u16,
        /// Raw response body for debugging.
        body: String,
    },
}

/// HTTP client for one roadmap flow on one API host.
pub struct RoadmapApi {
    client: reqwest::Client,
    endpoint: String,
}

impl RoadmapApi {
    /// Create a client for `flow` on the API at `api_url`
    /// (e.g. `http://host:8000`).
    ///
    /// `request_timeout` bounds every individual HTTP call.
    pub fn new(
        api_url: &str,
        flow: RoadmapFlow,
        request_timeout: Duration,
    ) -> Result<Self, ApiError> {
        let client = reqwest::Client::builder()
            .timeout(request_timeout)
            .build()?;
        Ok(Self::with_client(client, api_url, flow))
    }

    /// Create a client reusing an existing [`reqwest::Client`]
    /// (connection pooling across flows).
    pub fn with_client(client: reqwest::Client, api_url: &str, flow: RoadmapFlow) -> Self {
        Self {
            client,
            endpoint: join_endpoint(api_url, flow.base_path()),
        }
    }

    /// Base URL of the flow's endpoints, e.g. `http://host:8000/roadmap/goal`.
    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    // ---- private helpers ----

    /// Ensure the response has a success status code. Returns the
    /// response unchanged on success, or an [`ApiError::Status`]
    /// containing the status and body text on failure.
    async fn ensure_success(response: reqwest::Response) -> Result<reqwest::Response, ApiError> {
        let status = response.status();
        if !status.is_success() {
            let body = response
                .text()
                .await
                .unwrap_or_else(|_| "<unreadable body>".to_string());
            return Err(ApiError::Status {
                status: status.as_u16(),
                body,
            });
        }
        Ok(response)
    }

    /// Parse a successful JSON response body into the expected type.
    async fn parse_response<T: serde::de::DeserializeOwned>(
        response: reqwest::Response,
    ) -> Result<T, ApiError> {
        let response = Self::ensure_success(response).await?;
        Ok(response.json::<T>().await?)
    }
}

#[async_trait]
impl JobApi for RoadmapApi {
    async fn start(&self, payload: &serde_json::Value) -> Result<StartResponse, ApiError> {
        let response = self
            .client
            .post(format!("{}/start", self.endpoint))
            .json(payload)
            .send()
            .await?;

        Self::parse_response(response).await
    }

    async fn progress(&self, job_id: &str) -> Result<JobProgress, ApiError> {
        let response = self
            .client
            .get(format!("{}/progress/{}", self.endpoint, job_id))
            .send()
            .await?;

        Self::parse_response(response).await
    }
}

/// Join an API host URL and a flow path without doubling slashes.
fn join_endpoint(api_url: &str, base_path: &str) -> String {
    format!(
        "{}/{}",
        api_url.trim_end_matches('/'),
        base_path.trim_start_matches('/')
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn endpoint_joins_without_double_slash() {
        assert_eq!(
            join_endpoint("http://localhost:8000/", "/roadmap/goal"),
            "http://localhost:8000/roadmap/goal"
        );
        assert_eq!(
            join_endpoint("http://api.example.com/v1", "/roadmap/stuck"),
            "http://api.example.com/v1/roadmap/stuck"
        );
    }

    #[test]
    fn client_targets_flow_base_path() {
        let api = RoadmapApi::with_client(
            reqwest::Client::new(),
            "http://localhost:8000",
            RoadmapFlow::GoalDiscovery,
        );
        assert_eq!(api.endpoint(), "http://localhost:8000/roadmap/discover");
    }

    #[test]
    fn start_response_reads_request_id() {
        let resp: StartResponse = serde_json::from_str(r#"{"requestId":"r-42"}"#).unwrap();
        assert_eq!(resp.job_id(), Some("r-42"));
    }

    #[test]
    fn start_response_accepts_job_id_alias() {
        let resp: StartResponse = serde_json::from_str(r#"{"jobId":"j-7"}"#).unwrap();
        assert_eq!(resp.job_id(), Some("j-7"));
    }

    #[test]
    fn start_response_without_id() {
        let resp: StartResponse = serde_json::from_str(r#"{"status":"queued"}"#).unwrap();
        assert_eq!(resp.job_id(), None);

        let blank: StartResponse = serde_json::from_str(r#"{"requestId":"  "}"#).unwrap();
        assert_eq!(blank.job_id(), None);
    }
}
