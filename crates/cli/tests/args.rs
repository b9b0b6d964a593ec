//! Subcommand to job payload conversion.

use assert_matches::assert_matches;
use careerverse_cli::args::{Cli, Command};
use careerverse_core::error::CoreError;
use careerverse_core::roadmap::RoadmapFlow;
use clap::Parser;
use serde_json::json;

fn parse(args: &[&str]) -> Cli {
    let mut argv = vec!["careerverse"];
    argv.extend_from_slice(args);
    Cli::try_parse_from(argv).unwrap()
}

#[tokio::test]
async fn goal_subcommand_builds_clarification_payload() {
    let cli = parse(&[
        "goal",
        "--goal",
        "  Crack GATE  ",
        "--status",
        "Final year B.Tech",
        "--timeline",
        "   ",
    ]);

    let (flow, payload) = cli.command.into_job().await.unwrap();

    assert_eq!(flow, RoadmapFlow::GoalClarification);
    assert_eq!(
        payload,
        json!({"goal": "Crack GATE", "currentStatus": "Final year B.Tech"})
    );
}

#[tokio::test]
async fn discover_drops_blank_interests() {
    let cli = parse(&[
        "discover",
        "--interest",
        "biology",
        "--interest",
        " ",
        "--strength",
        "memory",
        "--education",
        "Class 12",
    ]);

    let (flow, payload) = cli.command.into_job().await.unwrap();

    assert_eq!(flow, RoadmapFlow::GoalDiscovery);
    assert_eq!(payload["interests"], json!(["biology"]));
    assert_eq!(payload["strengths"], json!(["memory"]));
    assert_eq!(payload["educationLevel"], "Class 12");
}

#[tokio::test]
async fn blank_blockers_fail_validation() {
    let cli = parse(&["stuck", "--goal", "NEET", "--blocker", "  "]);

    let err = cli.command.into_job().await.unwrap_err();

    assert_matches!(
        err.downcast_ref::<CoreError>(),
        Some(CoreError::Validation(msg)) if msg.contains("blocker")
    );
}

#[tokio::test]
async fn run_reads_payload_file() {
    let path = std::env::temp_dir().join(format!("careerverse-payload-{}.json", std::process::id()));
    tokio::fs::write(&path, r#"{"goal": "CAT", "currentStatus": "Analyst"}"#)
        .await
        .unwrap();

    let command = Command::Run {
        flow: "goal_clarification".into(),
        payload: path.clone(),
    };
    let (flow, payload) = command.into_job().await.unwrap();
    tokio::fs::remove_file(&path).await.unwrap();

    assert_eq!(flow, RoadmapFlow::GoalClarification);
    assert_eq!(payload["goal"], "CAT");
}

#[tokio::test]
async fn run_rejects_unknown_flow() {
    let command = Command::Run {
        flow: "career_switch".into(),
        payload: "unused.json".into(),
    };

    let err = command.into_job().await.unwrap_err();
    assert!(err.to_string().contains("Unknown roadmap flow"));
}

#[tokio::test]
async fn run_rejects_non_object_payload() {
    let path = std::env::temp_dir().join(format!("careerverse-array-{}.json", std::process::id()));
    tokio::fs::write(&path, "[1, 2, 3]").await.unwrap();

    let command = Command::Run {
        flow: "stuck_goal".into(),
        payload: path.clone(),
    };
    let err = command.into_job().await.unwrap_err();
    tokio::fs::remove_file(&path).await.unwrap();

    assert!(err.to_string().contains("JSON object"));
}
