//! Suggestion merger
//!
//! # Ordering
//!
//! 1. Severity, highest first (after capping at the agent's ceiling)
//! 2. Score, highest first
//! 3. Agent registration order
//! 4. The agent's own output order

use crate::engine::AgentReport;
use crate::finding::{Finding, FindingId, ScoredFinding, Severity};
use crate::weight::{WeightSnapshot, trust_multiplier};
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;

/// Decimal places kept on scores
const SCORE_PRECISION: f64 = 10_000.0;

/// Findings of one severity, already in merge order
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SeverityBand {
    pub severity: Severity,
    pub findings: Vec<ScoredFinding>,
}

impl SeverityBand {
    pub fn is_empty(&self) -> bool {
        self.findings.is_empty()
    }
}

/// Weighted merge of heterogeneous agent outputs
///
/// # Example
///
/// ```
/// use council_domain::{
///     AgentDescriptor, AgentOutcome, AgentReport, Finding, SuggestionMerger, WeightSnapshot,
/// };
///
/// let reports = vec![
///     AgentReport::new(
///         AgentDescriptor::new("style").with_max_severity(3),
///         AgentOutcome::completed(vec![Finding::new("style", "tabs", "Tabs", 5, 0.8)], 3),
///     ),
///     AgentReport::new(AgentDescriptor::new("slow"), AgentOutcome::timed_out(8000)),
/// ];
/// let weights = WeightSnapshot::new().with_weight("style", 0.5);
///
/// let merged = SuggestionMerger::merge(&reports, &weights);
/// assert_eq!(merged.len(), 1);
/// assert_eq!(merged[0].severity().value(), 3); // capped at the agent ceiling
/// assert_eq!(merged[0].score(), 0.4);
/// ```
pub struct SuggestionMerger;

impl SuggestionMerger {
    /// Merge all completed agents' findings into one ordered list
    pub fn merge(reports: &[AgentReport], weights: &WeightSnapshot) -> Vec<ScoredFinding> {
        let mut ranked: Vec<(usize, usize, ScoredFinding)> = Vec::new();

        for (agent_index, report) in reports.iter().enumerate() {
            let descriptor = &report.descriptor;
            let weight = weights.weight(&descriptor.id);

            for (ordinal, raw) in report.outcome.findings().iter().enumerate() {
                let finding = raw.attributed(&descriptor.id, descriptor.max_severity);
                let score = Self::score(&finding, weight);
                let id = FindingId::for_agent(&descriptor.id, ordinal);
                ranked.push((agent_index, ordinal, ScoredFinding::new(id, finding, score)));
            }
        }

        ranked.sort_by(|(agent_a, ord_a, a), (agent_b, ord_b, b)| {
            b.severity()
                .cmp(&a.severity())
                .then_with(|| compare_score_desc(a.score(), b.score()))
                .then_with(|| agent_a.cmp(agent_b))
                .then_with(|| ord_a.cmp(ord_b))
        });

        ranked.into_iter().map(|(_, _, scored)| scored).collect()
    }

    /// `confidence × trust_multiplier(weight)`, rounded to 4 decimals
    pub fn score(finding: &Finding, weight: f64) -> f64 {
        let raw = finding.confidence() * trust_multiplier(weight);
        (raw * SCORE_PRECISION).round() / SCORE_PRECISION
    }
}

fn compare_score_desc(a: f64, b: f64) -> Ordering {
    b.total_cmp(&a)
}

/// Split merged findings into the five severity bands, highest first
///
/// All five bands are always present so presentation can render a stable
/// layout; empty bands have no findings.
pub fn group_by_severity(findings: &[ScoredFinding]) -> Vec<SeverityBand> {
    Severity::descending()
        .map(|severity| SeverityBand {
            severity,
            findings: findings
                .iter()
                .filter(|f| f.severity() == severity)
                .cloned()
                .collect(),
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::agent_id::AgentId;
    use crate::engine::{AgentDescriptor, AgentOutcome};

    fn completed(id: &str, ceiling: u8, findings: Vec<Finding>) -> AgentReport {
        AgentReport::new(
            AgentDescriptor::new(id).with_max_severity(ceiling),
            AgentOutcome::completed(findings, 1),
        )
    }

    fn finding(agent: &str, severity: u8, confidence: f64) -> Finding {
        Finding::new(agent, "kind", format!("{agent} {severity} {confidence}"), severity, confidence)
    }

    // ==================== Scoring ====================

    #[test]
    fn test_neutral_weight_keeps_confidence() {
        let f = finding("a", 3, 0.7);
        assert_eq!(SuggestionMerger::score(&f, 1.0), 0.7);
    }

    #[test]
    fn test_floor_weight_near_zeroes() {
        let f = finding("a", 3, 0.7);
        assert_eq!(SuggestionMerger::score(&f, 0.1), 0.07);
    }

    #[test]
    fn test_ceiling_weight_doubles() {
        let f = finding("a", 3, 0.45);
        assert_eq!(SuggestionMerger::score(&f, 2.0), 0.9);
    }

    #[test]
    fn test_out_of_domain_weight_is_clamped() {
        let f = finding("a", 3, 0.5);
        assert_eq!(SuggestionMerger::score(&f, 50.0), 1.0);
    }

    // ==================== Ordering ====================

    #[test]
    fn test_orders_by_severity_then_score() {
        let reports = vec![
            completed("a", 5, vec![finding("a", 2, 0.9), finding("a", 5, 0.3)]),
            completed("b", 5, vec![finding("b", 5, 0.8), finding("b", 2, 0.95)]),
        ];
        let merged = SuggestionMerger::merge(&reports, &WeightSnapshot::new());
        let ids: Vec<&str> = merged.iter().map(|f| f.id().as_str()).collect();
        assert_eq!(ids, vec!["b-0", "a-1", "b-1", "a-0"]);
    }

    #[test]
    fn test_weights_reorder_within_band() {
        let reports = vec![
            completed("a", 5, vec![finding("a", 4, 0.6)]),
            completed("b", 5, vec![finding("b", 4, 0.5)]),
        ];
        let weights = WeightSnapshot::new().with_weight("b", 2.0);
        let merged = SuggestionMerger::merge(&reports, &weights);
        assert_eq!(merged[0].agent_id().as_str(), "b");
        assert_eq!(merged[0].score(), 1.0);
        assert_eq!(merged[1].score(), 0.6);
    }

    #[test]
    fn test_ties_break_by_registration_then_output_order() {
        let reports = vec![
            completed("second", 5, vec![finding("second", 3, 0.5)]),
            completed("first", 5, vec![finding("first", 3, 0.5), finding("first", 3, 0.5)]),
        ];
        let merged = SuggestionMerger::merge(&reports, &WeightSnapshot::new());
        let ids: Vec<&str> = merged.iter().map(|f| f.id().as_str()).collect();
        // registration order is report order, not alphabetical
        assert_eq!(ids, vec!["second-0", "first-0", "first-1"]);
    }

    #[test]
    fn test_severity_capped_before_grouping() {
        let reports = vec![completed("docs", 3, vec![finding("docs", 5, 0.9)])];
        let merged = SuggestionMerger::merge(&reports, &WeightSnapshot::new());
        assert_eq!(merged[0].severity(), Severity::WARNING);

        let bands = group_by_severity(&merged);
        assert!(bands[0].is_empty());
        assert_eq!(bands[2].severity, Severity::WARNING);
        assert_eq!(bands[2].findings.len(), 1);
    }

    #[test]
    fn test_failed_agents_contribute_nothing() {
        let reports = vec![
            completed("ok", 5, vec![finding("ok", 1, 0.2)]),
            AgentReport::new(AgentDescriptor::new("slow"), AgentOutcome::timed_out(8000)),
            AgentReport::new(AgentDescriptor::new("broken"), AgentOutcome::failed("boom")),
        ];
        let merged = SuggestionMerger::merge(&reports, &WeightSnapshot::new());
        assert_eq!(merged.len(), 1);
        assert_eq!(merged[0].agent_id(), &AgentId::new("ok"));
    }

    #[test]
    fn test_findings_are_attributed_to_reporting_agent() {
        let reports = vec![completed("real", 5, vec![finding("spoofed", 2, 0.5)])];
        let weights = WeightSnapshot::new()
            .with_weight("real", 0.5)
            .with_weight("spoofed", 2.0);
        let merged = SuggestionMerger::merge(&reports, &weights);
        assert_eq!(merged[0].agent_id().as_str(), "real");
        assert_eq!(merged[0].score(), 0.25);
    }

    // ==================== Determinism ====================

    #[test]
    fn test_merge_is_byte_identical_on_replay() {
        let reports = vec![
            completed("a", 5, vec![finding("a", 3, 0.33), finding("a", 5, 0.71)]),
            completed("b", 4, vec![finding("b", 5, 0.71), finding("b", 1, 0.1)]),
            completed("c", 3, vec![finding("c", 3, 0.33)]),
        ];
        let weights = WeightSnapshot::new()
            .with_weight("a", 1.37)
            .with_weight("b", 0.42);

        let first = serde_json::to_string(&SuggestionMerger::merge(&reports, &weights)).unwrap();
        let second = serde_json::to_string(&SuggestionMerger::merge(&reports, &weights)).unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn test_bands_are_highest_first_and_sorted() {
        let reports = vec![
            completed("a", 5, vec![finding("a", 1, 0.2), finding("a", 4, 0.3)]),
            completed("b", 5, vec![finding("b", 4, 0.9), finding("b", 1, 0.8)]),
        ];
        let merged = SuggestionMerger::merge(&reports, &WeightSnapshot::new());
        let bands = group_by_severity(&merged);

        let severities: Vec<u8> = bands.iter().map(|b| b.severity.value()).collect();
        assert_eq!(severities, vec![5, 4, 3, 2, 1]);
        for band in &bands {
            assert!(band.findings.windows(2).all(|w| w[0].score() >= w[1].score()));
        }
        assert_eq!(bands[1].findings[0].agent_id().as_str(), "b");
        assert_eq!(bands[4].findings[0].agent_id().as_str(), "b");
    }
}
