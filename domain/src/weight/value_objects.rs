//! Weight value objects and the clamp rule

use crate::core::agent_id::AgentId;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Lowest trust an agent can fall to
pub const MIN_WEIGHT: f64 = 0.1;
/// Highest trust an agent can reach
pub const MAX_WEIGHT: f64 = 2.0;
/// Trust of an agent nobody has rated yet
pub const NEUTRAL_WEIGHT: f64 = 1.0;

/// Clamp a weight into `[MIN_WEIGHT, MAX_WEIGHT]`.
///
/// NaN is treated as neutral so a corrupt value can never poison scoring.
pub fn clamp_weight(weight: f64) -> f64 {
    if weight.is_nan() {
        NEUTRAL_WEIGHT
    } else {
        weight.clamp(MIN_WEIGHT, MAX_WEIGHT)
    }
}

/// Multiplier applied to an agent's confidence.
///
/// The weight domain is used directly: neutral trust (1.0) leaves confidence
/// unchanged, the floor (0.1) near-zeroes it and the ceiling (2.0) doubles it.
pub fn trust_multiplier(weight: f64) -> f64 {
    clamp_weight(weight)
}

/// Persisted trust state of one agent
///
/// Owned by the weight store; callers only ever see copies.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AgentWeight {
    pub agent_id: AgentId,
    pub weight: f64,
    pub update_count: u64,
    pub updated_at: DateTime<Utc>,
}

impl AgentWeight {
    /// Fresh record at neutral trust
    pub fn neutral(agent_id: AgentId, now: DateTime<Utc>) -> Self {
        Self {
            agent_id,
            weight: NEUTRAL_WEIGHT,
            update_count: 0,
            updated_at: now,
        }
    }

    /// Record after adding `delta` and clamping
    pub fn with_delta(&self, delta: f64, now: DateTime<Utc>) -> Self {
        Self {
            agent_id: self.agent_id.clone(),
            weight: clamp_weight(self.weight + delta),
            update_count: self.update_count.saturating_add(1),
            updated_at: now,
        }
    }
}

/// Outcome of one applied delta
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WeightUpdate {
    pub agent_id: AgentId,
    pub delta: f64,
    pub before: f64,
    pub after: f64,
    pub update_count: u64,
}

impl WeightUpdate {
    /// True when the clamp absorbed part of the delta
    pub fn was_clamped(&self) -> bool {
        (self.before + self.delta - self.after).abs() > f64::EPSILON
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_clamp_weight_bounds() {
        assert_eq!(clamp_weight(5.0), MAX_WEIGHT);
        assert_eq!(clamp_weight(-1.0), MIN_WEIGHT);
        assert_eq!(clamp_weight(1.3), 1.3);
        assert_eq!(clamp_weight(f64::NAN), NEUTRAL_WEIGHT);
    }

    #[test]
    fn test_trust_multiplier_anchors() {
        assert_eq!(trust_multiplier(NEUTRAL_WEIGHT), 1.0);
        assert_eq!(trust_multiplier(MIN_WEIGHT), 0.1);
        assert_eq!(trust_multiplier(MAX_WEIGHT), 2.0);
    }

    #[test]
    fn test_with_delta_converges_to_ceiling() {
        let now = Utc::now();
        let mut record = AgentWeight {
            agent_id: AgentId::new("style"),
            weight: 1.9,
            update_count: 0,
            updated_at: now,
        };
        for _ in 0..10 {
            record = record.with_delta(0.25, now);
            assert!(record.weight <= MAX_WEIGHT);
        }
        assert_eq!(record.weight, MAX_WEIGHT);
        assert_eq!(record.update_count, 10);
    }

    #[test]
    fn test_with_delta_converges_to_floor() {
        let now = Utc::now();
        let mut record = AgentWeight {
            agent_id: AgentId::new("style"),
            weight: 0.12,
            update_count: 0,
            updated_at: now,
        };
        for _ in 0..10 {
            record = record.with_delta(-0.05, now);
            assert!(record.weight >= MIN_WEIGHT);
        }
        assert_eq!(record.weight, MIN_WEIGHT);
    }

    #[test]
    fn test_was_clamped() {
        let update = WeightUpdate {
            agent_id: AgentId::new("a"),
            delta: 0.25,
            before: 1.9,
            after: 2.0,
            update_count: 1,
        };
        assert!(update.was_clamped());

        let update = WeightUpdate {
            before: 1.0,
            after: 1.25,
            ..update
        };
        assert!(!update.was_clamped());
    }
}
