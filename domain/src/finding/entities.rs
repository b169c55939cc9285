//! Finding entities

use super::severity::Severity;
use crate::core::agent_id::AgentId;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Position of a finding in the analyzed code (1-based)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Location {
    pub line: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub column: Option<u32>,
}

impl Location {
    pub fn line(line: u32) -> Self {
        Self { line, column: None }
    }

    pub fn with_column(mut self, column: u32) -> Self {
        self.column = Some(column);
        self
    }
}

/// One agent's observation about the analyzed code
///
/// Findings are immutable once produced; the merger derives new values
/// instead of editing them.
///
/// # Example
///
/// ```
/// use council_domain::{Finding, Severity};
///
/// let finding = Finding::new("style", "line-length", "Line exceeds 100 chars", 2, 0.9);
/// assert_eq!(finding.severity(), Severity::INFO);
///
/// // Confidence is clamped into 0.0..=1.0
/// let sure = Finding::new("style", "tabs", "Tab indentation", 3, 1.7);
/// assert_eq!(sure.confidence(), 1.0);
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Finding {
    agent_id: AgentId,
    kind: String,
    message: String,
    severity: Severity,
    confidence: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    location: Option<Location>,
}

impl Finding {
    pub fn new(
        agent_id: impl Into<AgentId>,
        kind: impl Into<String>,
        message: impl Into<String>,
        severity: u8,
        confidence: f64,
    ) -> Self {
        Self {
            agent_id: agent_id.into(),
            kind: kind.into(),
            message: message.into(),
            severity: Severity::new(severity),
            confidence: clamp_confidence(confidence),
            location: None,
        }
    }

    pub fn with_location(mut self, location: Location) -> Self {
        self.location = Some(location);
        self
    }

    /// Copy of this finding attributed to `agent_id` with its severity
    /// capped at `ceiling`.
    ///
    /// Deserialized findings may carry any agent id or severity, so the
    /// merger re-derives both from the registered agent descriptor.
    pub fn attributed(&self, agent_id: &AgentId, ceiling: Severity) -> Self {
        Self {
            agent_id: agent_id.clone(),
            severity: self.severity.capped_at(ceiling),
            confidence: clamp_confidence(self.confidence),
            ..self.clone()
        }
    }

    pub fn agent_id(&self) -> &AgentId {
        &self.agent_id
    }

    pub fn kind(&self) -> &str {
        &self.kind
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    pub fn severity(&self) -> Severity {
        self.severity
    }

    pub fn confidence(&self) -> f64 {
        self.confidence
    }

    pub fn location(&self) -> Option<Location> {
        self.location
    }
}

fn clamp_confidence(confidence: f64) -> f64 {
    if confidence.is_nan() {
        0.0
    } else {
        confidence.clamp(0.0, 1.0)
    }
}

/// Identifier of a scored finding, unique within one analysis
///
/// Built as `<agent_id>-<ordinal>` from the agent's own output order, so the
/// same inputs always yield the same ids.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FindingId(String);

impl FindingId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn for_agent(agent_id: &AgentId, ordinal: usize) -> Self {
        Self(format!("{}-{}", agent_id, ordinal))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for FindingId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for FindingId {
    fn from(s: &str) -> Self {
        FindingId::new(s)
    }
}

impl From<String> for FindingId {
    fn from(s: String) -> Self {
        FindingId::new(s)
    }
}

/// A finding after trust-weighted scoring
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScoredFinding {
    id: FindingId,
    #[serde(flatten)]
    finding: Finding,
    score: f64,
}

impl ScoredFinding {
    pub fn new(id: FindingId, finding: Finding, score: f64) -> Self {
        Self { id, finding, score }
    }

    pub fn id(&self) -> &FindingId {
        &self.id
    }

    pub fn finding(&self) -> &Finding {
        &self.finding
    }

    pub fn agent_id(&self) -> &AgentId {
        self.finding.agent_id()
    }

    pub fn severity(&self) -> Severity {
        self.finding.severity()
    }

    pub fn score(&self) -> f64 {
        self.score
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_confidence_nan_becomes_zero() {
        let finding = Finding::new("a", "k", "m", 3, f64::NAN);
        assert_eq!(finding.confidence(), 0.0);
    }

    #[test]
    fn test_attributed_caps_severity_and_rewrites_agent() {
        let finding = Finding::new("impostor", "k", "m", 5, 0.8);
        let fixed = finding.attributed(&AgentId::new("style"), Severity::WARNING);
        assert_eq!(fixed.agent_id().as_str(), "style");
        assert_eq!(fixed.severity(), Severity::WARNING);
        assert_eq!(fixed.message(), "m");
        // Original is untouched
        assert_eq!(finding.severity(), Severity::CRITICAL);
    }

    #[test]
    fn test_finding_id_for_agent() {
        let id = FindingId::for_agent(&AgentId::new("naming"), 3);
        assert_eq!(id.as_str(), "naming-3");
    }

    #[test]
    fn test_scored_finding_serializes_flat() {
        let scored = ScoredFinding::new(
            FindingId::new("style-0"),
            Finding::new("style", "tabs", "Tab indentation", 3, 0.5)
                .with_location(Location::line(4)),
            0.5,
        );
        let value = serde_json::to_value(&scored).unwrap();
        assert_eq!(value["id"], "style-0");
        assert_eq!(value["agent_id"], "style");
        assert_eq!(value["severity"], 3);
        assert_eq!(value["location"]["line"], 4);
        assert_eq!(value["score"], 0.5);

        let back: ScoredFinding = serde_json::from_value(value).unwrap();
        assert_eq!(back, scored);
    }
}
