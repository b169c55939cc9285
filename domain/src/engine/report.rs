//! Dispatch outcome types

use super::descriptor::AgentDescriptor;
use crate::core::agent_id::AgentId;
use crate::finding::Finding;
use serde::{Deserialize, Serialize};

/// How one agent call ended
#[derive(Debug, Clone, PartialEq)]
pub enum AgentOutcome {
    /// The agent answered within its timeout
    Completed {
        findings: Vec<Finding>,
        elapsed_ms: u64,
    },
    /// The agent did not answer within its timeout (or the outer deadline)
    TimedOut { after_ms: u64 },
    /// The agent returned an error or its task panicked
    Failed { error: String },
}

impl AgentOutcome {
    pub fn completed(findings: Vec<Finding>, elapsed_ms: u64) -> Self {
        AgentOutcome::Completed {
            findings,
            elapsed_ms,
        }
    }

    pub fn timed_out(after_ms: u64) -> Self {
        AgentOutcome::TimedOut { after_ms }
    }

    pub fn failed(error: impl Into<String>) -> Self {
        AgentOutcome::Failed {
            error: error.into(),
        }
    }

    /// Findings contributed to the merge; empty for failed agents
    pub fn findings(&self) -> &[Finding] {
        match self {
            AgentOutcome::Completed { findings, .. } => findings,
            _ => &[],
        }
    }

    pub fn is_completed(&self) -> bool {
        matches!(self, AgentOutcome::Completed { .. })
    }
}

/// One agent's outcome for one analysis, in registration order
#[derive(Debug, Clone, PartialEq)]
pub struct AgentReport {
    pub descriptor: AgentDescriptor,
    pub outcome: AgentOutcome,
}

impl AgentReport {
    pub fn new(descriptor: AgentDescriptor, outcome: AgentOutcome) -> Self {
        Self {
            descriptor,
            outcome,
        }
    }

    pub fn agent_id(&self) -> &AgentId {
        &self.descriptor.id
    }

    pub fn summary(&self) -> AgentRunSummary {
        let status = match &self.outcome {
            AgentOutcome::Completed {
                findings,
                elapsed_ms,
            } => AgentStatus::Completed {
                findings: findings.len(),
                elapsed_ms: *elapsed_ms,
            },
            AgentOutcome::TimedOut { after_ms } => AgentStatus::TimedOut {
                after_ms: *after_ms,
            },
            AgentOutcome::Failed { error } => AgentStatus::Failed {
                error: error.clone(),
            },
        };
        AgentRunSummary {
            agent_id: self.descriptor.id.clone(),
            status,
        }
    }
}

/// Observability record of an agent run, stored on analysis results
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum AgentStatus {
    Completed { findings: usize, elapsed_ms: u64 },
    TimedOut { after_ms: u64 },
    Failed { error: String },
}

impl AgentStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            AgentStatus::Completed { .. } => "completed",
            AgentStatus::TimedOut { .. } => "timed_out",
            AgentStatus::Failed { .. } => "failed",
        }
    }

    pub fn is_success(&self) -> bool {
        matches!(self, AgentStatus::Completed { .. })
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AgentRunSummary {
    pub agent_id: AgentId,
    #[serde(flatten)]
    pub status: AgentStatus,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_failed_outcome_has_no_findings() {
        assert!(AgentOutcome::timed_out(8000).findings().is_empty());
        assert!(AgentOutcome::failed("boom").findings().is_empty());
    }

    #[test]
    fn test_summary_counts_findings() {
        let report = AgentReport::new(
            AgentDescriptor::new("style"),
            AgentOutcome::completed(
                vec![
                    Finding::new("style", "a", "b", 1, 0.5),
                    Finding::new("style", "c", "d", 2, 0.5),
                ],
                12,
            ),
        );
        let summary = report.summary();
        assert_eq!(summary.agent_id.as_str(), "style");
        assert_eq!(
            summary.status,
            AgentStatus::Completed {
                findings: 2,
                elapsed_ms: 12
            }
        );
    }

    #[test]
    fn test_status_serializes_tagged() {
        let summary = AgentRunSummary {
            agent_id: AgentId::new("slow"),
            status: AgentStatus::TimedOut { after_ms: 8000 },
        };
        let value = serde_json::to_value(&summary).unwrap();
        assert_eq!(value["agent_id"], "slow");
        assert_eq!(value["status"], "timed_out");
        assert_eq!(value["after_ms"], 8000);
    }
}
