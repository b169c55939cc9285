//! Analysis result entity

use super::fingerprint::Fingerprint;
use crate::engine::AgentRunSummary;
use crate::finding::ScoredFinding;
use crate::merge::{SeverityBand, group_by_severity};
use crate::weight::WeightSnapshot;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Opaque identifier of one analysis, used to correlate feedback
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AnalysisId(String);

impl AnalysisId {
    /// Generate a fresh id (`an-` followed by 12 hex chars)
    pub fn generate() -> Self {
        let hex = uuid::Uuid::new_v4().simple().to_string();
        Self(format!("an-{}", &hex[..12]))
    }

    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for AnalysisId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for AnalysisId {
    fn from(s: &str) -> Self {
        AnalysisId::new(s)
    }
}

impl From<String> for AnalysisId {
    fn from(s: String) -> Self {
        AnalysisId::new(s)
    }
}

/// Merged output of one analysis
///
/// Every score in `findings` is reproducible from the finding itself and
/// `weights`, the snapshot the merge was computed with.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalysisResult {
    pub analysis_id: AnalysisId,
    pub fingerprint: Fingerprint,
    /// Scored findings, highest severity band first
    pub findings: Vec<ScoredFinding>,
    /// Weight snapshot used for scoring
    pub weights: WeightSnapshot,
    /// Per-agent run status, in registration order
    pub agents: Vec<AgentRunSummary>,
    pub from_cache: bool,
    pub created_at: DateTime<Utc>,
}

impl AnalysisResult {
    /// Findings grouped into the five severity bands, highest first
    pub fn bands(&self) -> Vec<SeverityBand> {
        group_by_severity(&self.findings)
    }

    /// True when every agent completed; only such results are cached
    pub fn is_complete(&self) -> bool {
        self.agents.iter().all(|a| a.status.is_success())
    }

    /// Copy of a cached result served under a new analysis id
    pub fn served_from_cache(&self, analysis_id: AnalysisId) -> Self {
        Self {
            analysis_id,
            from_cache: true,
            ..self.clone()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::agent_id::AgentId;
    use crate::engine::AgentStatus;

    fn result(agents: Vec<AgentRunSummary>) -> AnalysisResult {
        AnalysisResult {
            analysis_id: AnalysisId::new("an-1"),
            fingerprint: Fingerprint::from_hex("abc"),
            findings: vec![],
            weights: WeightSnapshot::new(),
            agents,
            from_cache: false,
            created_at: Utc::now(),
        }
    }

    #[test]
    fn test_generate_shape() {
        let id = AnalysisId::generate();
        assert!(id.as_str().starts_with("an-"));
        assert_eq!(id.as_str().len(), 15);
        assert_ne!(id, AnalysisId::generate());
    }

    #[test]
    fn test_is_complete() {
        let ok = AgentRunSummary {
            agent_id: AgentId::new("a"),
            status: AgentStatus::Completed {
                findings: 0,
                elapsed_ms: 1,
            },
        };
        let slow = AgentRunSummary {
            agent_id: AgentId::new("b"),
            status: AgentStatus::TimedOut { after_ms: 10 },
        };
        assert!(result(vec![ok.clone()]).is_complete());
        assert!(!result(vec![ok, slow]).is_complete());
    }

    #[test]
    fn test_served_from_cache() {
        let original = result(vec![]);
        let hit = original.served_from_cache(AnalysisId::new("an-2"));
        assert!(hit.from_cache);
        assert_eq!(hit.analysis_id.as_str(), "an-2");
        assert_eq!(hit.fingerprint, original.fingerprint);
        assert_eq!(hit.created_at, original.created_at);
    }
}
