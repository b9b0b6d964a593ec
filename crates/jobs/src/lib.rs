//! Async job poller for CareerVerse roadmap generation.
//!
//! Turns the service's fire-and-forget roadmap jobs into awaitable
//! operations: submit a payload, poll its progress on a fixed interval,
//! and resolve with the final roadmap, a server failure, a timeout, or a
//! cancellation.
//!
//! - [`api`]: HTTP client and the [`JobApi`](api::JobApi) seam.
//! - [`task`]: one cancellable job.
//! - [`poller`]: single-flight registry with lifecycle events.

pub mod api;
pub mod config;
pub mod error;
pub mod events;
mod poll;
pub mod poller;
pub mod task;

pub use api::{ApiError, JobApi, RoadmapApi, StartResponse};
pub use config::PollerConfig;
pub use error::JobError;
pub use events::JobEvent;
pub use poller::JobPoller;
pub use task::JobTask;
