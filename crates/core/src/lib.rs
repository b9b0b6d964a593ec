//! Domain types shared across the CareerVerse roadmap client.
//!
//! Holds the job progress snapshot model, the roadmap flow catalogue and
//! its request payloads, and the [`CoreError`](error::CoreError) type.
//! Nothing in this crate performs I/O.

pub mod error;
pub mod job;
pub mod roadmap;
pub mod types;
