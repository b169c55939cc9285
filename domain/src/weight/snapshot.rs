//! Point-in-time view of all agent weights

use super::value_objects::{NEUTRAL_WEIGHT, clamp_weight};
use crate::core::agent_id::AgentId;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Read-only mapping from agent id to weight
///
/// Backed by a `BTreeMap` so iteration and serialization order are stable,
/// which keeps recorded snapshots byte-identical across runs. Agents missing
/// from the snapshot read as neutral.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct WeightSnapshot(BTreeMap<AgentId, f64>);

impl WeightSnapshot {
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot with every given agent at neutral trust
    pub fn neutral<'a>(agents: impl IntoIterator<Item = &'a AgentId>) -> Self {
        Self(
            agents
                .into_iter()
                .map(|id| (id.clone(), NEUTRAL_WEIGHT))
                .collect(),
        )
    }

    pub fn with_weight(mut self, agent_id: impl Into<AgentId>, weight: f64) -> Self {
        self.insert(agent_id.into(), weight);
        self
    }

    pub fn insert(&mut self, agent_id: AgentId, weight: f64) {
        self.0.insert(agent_id, clamp_weight(weight));
    }

    /// Weight of `agent_id`, neutral when unknown
    pub fn weight(&self, agent_id: &AgentId) -> f64 {
        self.0.get(agent_id).copied().unwrap_or(NEUTRAL_WEIGHT)
    }

    pub fn contains(&self, agent_id: &AgentId) -> bool {
        self.0.contains_key(agent_id)
    }

    /// Copy of this snapshot restricted to `agents`, filling gaps with neutral
    ///
    /// This is the snapshot recorded on an analysis: exactly the agents that
    /// took part, so replaying the merge needs nothing else.
    pub fn for_agents<'a>(&self, agents: impl IntoIterator<Item = &'a AgentId>) -> Self {
        Self(
            agents
                .into_iter()
                .map(|id| (id.clone(), self.weight(id)))
                .collect(),
        )
    }

    pub fn iter(&self) -> impl Iterator<Item = (&AgentId, f64)> {
        self.0.iter().map(|(id, w)| (id, *w))
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl FromIterator<(AgentId, f64)> for WeightSnapshot {
    fn from_iter<I: IntoIterator<Item = (AgentId, f64)>>(iter: I) -> Self {
        let mut snapshot = WeightSnapshot::new();
        for (id, weight) in iter {
            snapshot.insert(id, weight);
        }
        snapshot
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unknown_agent_reads_neutral() {
        let snapshot = WeightSnapshot::new().with_weight("style", 1.5);
        assert_eq!(snapshot.weight(&AgentId::new("style")), 1.5);
        assert_eq!(snapshot.weight(&AgentId::new("naming")), NEUTRAL_WEIGHT);
    }

    #[test]
    fn test_insert_clamps() {
        let snapshot = WeightSnapshot::new().with_weight("style", 9.0);
        assert_eq!(snapshot.weight(&AgentId::new("style")), 2.0);
    }

    #[test]
    fn test_for_agents_fills_and_restricts() {
        let snapshot = WeightSnapshot::new()
            .with_weight("style", 0.5)
            .with_weight("retired", 1.8);
        let ids = [AgentId::new("style"), AgentId::new("naming")];
        let recorded = snapshot.for_agents(&ids);

        assert_eq!(recorded.len(), 2);
        assert_eq!(recorded.weight(&ids[0]), 0.5);
        assert_eq!(recorded.weight(&ids[1]), NEUTRAL_WEIGHT);
        assert!(!recorded.contains(&AgentId::new("retired")));
    }

    #[test]
    fn test_serialization_order_is_stable() {
        let a = WeightSnapshot::new()
            .with_weight("zeta", 1.0)
            .with_weight("alpha", 0.5);
        let b = WeightSnapshot::new()
            .with_weight("alpha", 0.5)
            .with_weight("zeta", 1.0);
        assert_eq!(
            serde_json::to_string(&a).unwrap(),
            serde_json::to_string(&b).unwrap()
        );
        assert_eq!(serde_json::to_string(&a).unwrap(), r#"{"alpha":0.5,"zeta":1.0}"#);
    }
}
