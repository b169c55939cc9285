//! RL trainer
//!
//! Turns one validated feedback event into one weight update: compute the
//! bounded reward, apply it to the agent's weight with the store's atomic
//! clamped add, and record the result in the audit trail.

use crate::ports::audit_log::{AuditEvent, NoAuditLog, WeightAuditLog};
use crate::ports::weight_store::{WeightStore, WeightStoreError};
use crate::telemetry;
use council_domain::{FeedbackEvent, RewardEngine, WeightUpdate};
use std::sync::Arc;
use tracing::info;

/// Result of one training step
#[derive(Debug, Clone, PartialEq)]
pub struct TrainingStep {
    pub reward: f64,
    pub update: WeightUpdate,
}

pub struct RlTrainer {
    store: Arc<dyn WeightStore>,
    audit: Arc<dyn WeightAuditLog>,
}

impl RlTrainer {
    pub fn new(store: Arc<dyn WeightStore>) -> Self {
        Self {
            store,
            audit: Arc::new(NoAuditLog),
        }
    }

    pub fn with_audit_log(mut self, audit: Arc<dyn WeightAuditLog>) -> Self {
        self.audit = audit;
        self
    }

    pub fn store(&self) -> &Arc<dyn WeightStore> {
        &self.store
    }

    /// Apply one event's reward to its agent's weight
    pub async fn train(&self, event: &FeedbackEvent) -> Result<TrainingStep, WeightStoreError> {
        let reward = RewardEngine::for_event(event);
        let update = self.store.apply_delta(&event.agent_id, reward).await?;

        info!(
            agent = %update.agent_id,
            reward,
            before = update.before,
            after = update.after,
            clamped = update.was_clamped(),
            "Weight updated"
        );
        telemetry::agent_weight(&update.agent_id, update.after);
        self.audit
            .log(AuditEvent::weight_updated(event, reward, &update));

        Ok(TrainingStep { reward, update })
    }
}
