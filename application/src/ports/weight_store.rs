//! Weight store port
//!
//! The weight store is the single source of truth for agent trust and the
//! only mutable state shared between the request path and the feedback
//! worker. It deliberately offers no plain setter: all mutation goes through
//! [`WeightStore::apply_delta`], an atomic clamped add, so concurrent
//! updates commute and none is lost.

use async_trait::async_trait;
use council_domain::{AgentId, AgentWeight, WeightSnapshot, WeightUpdate};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum WeightStoreError {
    #[error("Contention on agent {agent} after {attempts} attempts")]
    Contention { agent: String, attempts: u32 },

    #[error("Weight store unavailable: {0}")]
    Unavailable(String),

    #[error("Weight store data is corrupt: {0}")]
    Corrupt(String),
}

impl WeightStoreError {
    /// Whether retrying the same operation later may succeed
    pub fn is_transient(&self) -> bool {
        matches!(
            self,
            WeightStoreError::Contention { .. } | WeightStoreError::Unavailable(_)
        )
    }
}

#[async_trait]
pub trait WeightStore: Send + Sync {
    /// Current weight of every known agent
    async fn get_all(&self) -> Result<WeightSnapshot, WeightStoreError>;

    /// Full records (update counts, timestamps) of every known agent
    async fn records(&self) -> Result<Vec<AgentWeight>, WeightStoreError>;

    /// Atomically add `delta` to the agent's weight and clamp into
    /// `[0.1, 2.0]`. Unknown agents start at neutral (1.0).
    async fn apply_delta(
        &self,
        agent_id: &AgentId,
        delta: f64,
    ) -> Result<WeightUpdate, WeightStoreError>;

    /// Forget all learned trust, returning every agent to neutral
    async fn reset(&self) -> Result<(), WeightStoreError>;
}
