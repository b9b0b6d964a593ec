//! Command-line surface of the `careerverse` binary.
//!
//! Each subcommand maps to one roadmap flow. Free-text fields are
//! trimmed and blank list entries dropped before the request is
//! validated.

use std::path::PathBuf;

use anyhow::Context;
use careerverse_core::roadmap::{
    normalize_list, normalize_optional, GoalClarificationRequest, GoalDiscoveryRequest,
    RoadmapFlow, RoadmapRequest, StuckGoalRequest,
};
use clap::{Parser, Subcommand};

#[derive(Debug, Parser)]
#[command(
    name = "careerverse",
    version,
    about = "Generate CareerVerse roadmaps from the command line"
)]
pub struct Cli {
    /// Roadmap API host (overrides CAREERVERSE_API_URL).
    #[arg(long, global = true)]
    pub api_url: Option<String>,

    /// Delay between progress polls in milliseconds (overrides POLL_INTERVAL_MS).
    #[arg(long, global = true)]
    pub poll_interval_ms: Option<u64>,

    /// Give up after this many seconds (overrides JOB_TIMEOUT_SECS).
    #[arg(long, global = true)]
    pub timeout_secs: Option<u64>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Turn an existing goal into a roadmap.
    Goal {
        /// The goal or exam to prepare for.
        #[arg(long)]
        goal: String,
        /// Where you are today (studies, job, preparation so far).
        #[arg(long = "status")]
        current_status: String,
        #[arg(long)]
        timeline: Option<String>,
        #[arg(long)]
        constraints: Option<String>,
    },

    /// Discover a goal from your interests, then build its roadmap.
    Discover {
        /// An interest; repeat for several.
        #[arg(long = "interest", required = true)]
        interests: Vec<String>,
        /// A strength; repeat for several.
        #[arg(long = "strength")]
        strengths: Vec<String>,
        #[arg(long = "education")]
        education_level: String,
        #[arg(long)]
        preferences: Option<String>,
    },

    /// Diagnose a stalled goal and plan a way forward.
    Stuck {
        #[arg(long)]
        goal: String,
        /// What is holding you back; repeat for several.
        #[arg(long = "blocker", required = true)]
        blockers: Vec<String>,
        #[arg(long = "attempts")]
        attempts_so_far: Option<String>,
        #[arg(long)]
        timeline: Option<String>,
    },

    /// Submit a raw JSON payload file to any flow.
    Run {
        /// One of goal_clarification, goal_discovery, stuck_goal.
        #[arg(long)]
        flow: String,
        /// Path to the JSON request body.
        #[arg(long)]
        payload: PathBuf,
    },
}

impl Command {
    /// Resolve the subcommand into a flow and a validated JSON payload.
    pub async fn into_job(self) -> anyhow::Result<(RoadmapFlow, serde_json::Value)> {
        match self {
            Command::Goal {
                goal,
                current_status,
                timeline,
                constraints,
            } => prepare(GoalClarificationRequest {
                goal: goal.trim().to_string(),
                current_status: current_status.trim().to_string(),
                timeline: normalize_optional(timeline),
                constraints: normalize_optional(constraints),
            }),
            Command::Discover {
                interests,
                strengths,
                education_level,
                preferences,
            } => prepare(GoalDiscoveryRequest {
                interests: normalize_list(interests),
                strengths: normalize_list(strengths),
                education_level: education_level.trim().to_string(),
                preferences: normalize_optional(preferences),
            }),
            Command::Stuck {
                goal,
                blockers,
                attempts_so_far,
                timeline,
            } => prepare(StuckGoalRequest {
                goal: goal.trim().to_string(),
                blockers: normalize_list(blockers),
                attempts_so_far: normalize_optional(attempts_so_far),
                timeline: normalize_optional(timeline),
            }),
            Command::Run { flow, payload } => {
                let flow = RoadmapFlow::parse(&flow)?;
                let raw = tokio::fs::read_to_string(&payload)
                    .await
                    .with_context(|| format!("Failed to read payload: {}", payload.display()))?;
                let value: serde_json::Value = serde_json::from_str(&raw)
                    .with_context(|| format!("Payload is not valid JSON: {}", payload.display()))?;
                if !value.is_object() {
                    anyhow::bail!("Payload must be a JSON object: {}", payload.display());
                }
                Ok((flow, value))
            }
        }
    }
}

fn prepare<R: RoadmapRequest>(request: R) -> anyhow::Result<(RoadmapFlow, serde_json::Value)> {
    let payload = request.to_payload()?;
    Ok((request.flow(), payload))
}
