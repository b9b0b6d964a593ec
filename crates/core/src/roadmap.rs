//! Roadmap generation flows and their request payloads.
//!
//! Each flow is a separate remote job family with its own API base path.
//! Requests are validated here, before submission; the job poller treats
//! the resulting JSON as opaque.

use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::error::CoreError;

// ---------------------------------------------------------------------------
// Flows
// ---------------------------------------------------------------------------

/// The three roadmap generation entry points.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RoadmapFlow {
    /// The user has a goal that needs clarifying into a roadmap.
    GoalClarification,
    /// The user has no goal yet and wants one suggested.
    GoalDiscovery,
    /// The user has a goal but is stuck making progress on it.
    StuckGoal,
}

impl RoadmapFlow {
    pub const ALL: [RoadmapFlow; 3] = [
        RoadmapFlow::GoalClarification,
        RoadmapFlow::GoalDiscovery,
        RoadmapFlow::StuckGoal,
    ];

    /// Return the string representation of a flow.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::GoalClarification => "goal_clarification",
            Self::GoalDiscovery => "goal_discovery",
            Self::StuckGoal => "stuck_goal",
        }
    }

    /// API path under which the flow's `start` and `progress` endpoints live.
    pub fn base_path(&self) -> &'static str {
        match self {
            Self::GoalClarification => "/roadmap/goal",
            Self::GoalDiscovery => "/roadmap/discover",
            Self::StuckGoal => "/roadmap/stuck",
        }
    }

    /// Parse a flow from its string representation.
    pub fn parse(value: &str) -> Result<Self, CoreError> {
        Self::ALL
            .into_iter()
            .find(|flow| flow.as_str() == value)
            .ok_or_else(|| {
                CoreError::Validation(format!(
                    "Unknown roadmap flow '{value}', expected one of: {}",
                    Self::ALL.map(|f| f.as_str()).join(", ")
                ))
            })
    }
}

impl std::fmt::Display for RoadmapFlow {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

// ---------------------------------------------------------------------------
// Requests
// ---------------------------------------------------------------------------

/// A typed request for one of the roadmap flows.
pub trait RoadmapRequest: Serialize + Validate {
    /// The flow this request starts.
    fn flow(&self) -> RoadmapFlow;

    /// Validate the request and convert it into the JSON job payload.
    fn to_payload(&self) -> Result<serde_json::Value, CoreError> {
        self.validate()?;
        serde_json::to_value(self).map_err(|e| CoreError::Internal(e.to_string()))
    }
}

/// Clarify an existing goal into a roadmap.
#[derive(Debug, Clone, Default, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct GoalClarificationRequest {
    #[validate(length(min = 1, message = "goal is required"))]
    pub goal: String,
    #[validate(length(min = 1, message = "current status is required"))]
    pub current_status: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timeline: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub constraints: Option<String>,
}

impl RoadmapRequest for GoalClarificationRequest {
    fn flow(&self) -> RoadmapFlow {
        RoadmapFlow::GoalClarification
    }
}

/// Suggest a goal from interests and background, then build its roadmap.
#[derive(Debug, Clone, Default, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct GoalDiscoveryRequest {
    #[validate(length(min = 1, message = "at least one interest is required"))]
    pub interests: Vec<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub strengths: Vec<String>,
    #[validate(length(min = 1, message = "education level is required"))]
    pub education_level: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub preferences: Option<String>,
}

impl RoadmapRequest for GoalDiscoveryRequest {
    fn flow(&self) -> RoadmapFlow {
        RoadmapFlow::GoalDiscovery
    }
}

/// Diagnose why progress on a goal has stalled and plan a way forward.
#[derive(Debug, Clone, Default, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct StuckGoalRequest {
    #[validate(length(min = 1, message = "goal is required"))]
    pub goal: String,
    #[validate(length(min = 1, message = "at least one blocker is required"))]
    pub blockers: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub attempts_so_far: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timeline: Option<String>,
}

impl RoadmapRequest for StuckGoalRequest {
    fn flow(&self) -> RoadmapFlow {
        RoadmapFlow::StuckGoal
    }
}

/// Trim a free-text form field, mapping blank input to `None`.
pub fn normalize_optional(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

/// Trim every entry of a list field and drop the blank ones.
pub fn normalize_list(values: Vec<String>) -> Vec<String> {
    values
        .into_iter()
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;

    #[test]
    fn flow_round_trips_through_str() {
        for flow in RoadmapFlow::ALL {
            assert_eq!(RoadmapFlow::parse(flow.as_str()).unwrap(), flow);
        }
    }

    #[test]
    fn unknown_flow_lists_alternatives() {
        let err = RoadmapFlow::parse("feed").unwrap_err();
        assert_matches!(err, CoreError::Validation(msg) if msg.contains("stuck_goal"));
    }

    #[test]
    fn base_paths_are_distinct() {
        let paths: std::collections::HashSet<_> =
            RoadmapFlow::ALL.iter().map(|f| f.base_path()).collect();
        assert_eq!(paths.len(), 3);
    }

    #[test]
    fn clarification_payload_is_camel_case() {
        let request = GoalClarificationRequest {
            goal: "Crack the GATE exam".into(),
            current_status: "Final year B.Tech".into(),
            timeline: Some("8 months".into()),
            constraints: None,
        };
        let payload = request.to_payload().unwrap();
        assert_eq!(payload["goal"], "Crack the GATE exam");
        assert_eq!(payload["currentStatus"], "Final year B.Tech");
        assert_eq!(payload["timeline"], "8 months");
        assert!(payload.get("constraints").is_none());
    }

    #[test]
    fn clarification_requires_goal() {
        let request = GoalClarificationRequest {
            current_status: "Working".into(),
            ..Default::default()
        };
        assert_matches!(
            request.to_payload(),
            Err(CoreError::Validation(msg)) if msg.contains("goal is required")
        );
    }

    #[test]
    fn discovery_requires_interests() {
        let request = GoalDiscoveryRequest {
            education_level: "Class 12".into(),
            ..Default::default()
        };
        assert_matches!(
            request.to_payload(),
            Err(CoreError::Validation(msg)) if msg.contains("interest")
        );
    }

    #[test]
    fn stuck_goal_reports_every_missing_field() {
        let err = StuckGoalRequest::default().to_payload().unwrap_err();
        let CoreError::Validation(msg) = err else {
            panic!("expected validation error");
        };
        assert!(msg.contains("blockers"));
        assert!(msg.contains("goal"));
    }

    #[test]
    fn normalize_drops_blank_entries() {
        assert_eq!(
            normalize_list(vec![" maths ".into(), "  ".into(), "art".into()]),
            vec!["maths".to_string(), "art".to_string()]
        );
        assert_eq!(normalize_optional(Some("   ".into())), None);
        assert_eq!(normalize_optional(Some(" 6 months ".into())).as_deref(), Some("6 months"));
    }
}
