//! Port for the weight audit trail.
//!
//! Every change to a trust weight is recorded as one typed event. This is
//! separate from `tracing`: tracing carries diagnostics, the audit log is a
//! durable history of how trust evolved.

use council_domain::{FeedbackEvent, WeightUpdate};

/// One change to the weight table
#[derive(Debug, Clone, PartialEq)]
pub enum AuditEvent {
    /// A feedback event moved one agent's weight
    WeightUpdated {
        feedback: FeedbackEvent,
        reward: f64,
        update: WeightUpdate,
    },
    /// Every agent was returned to the neutral weight
    WeightsReset,
}

impl AuditEvent {
    pub fn weight_updated(feedback: &FeedbackEvent, reward: f64, update: &WeightUpdate) -> Self {
        Self::WeightUpdated {
            feedback: feedback.clone(),
            reward,
            update: update.clone(),
        }
    }

    /// Stable name written as the line's `event` field
    pub fn kind(&self) -> &'static str {
        match self {
            AuditEvent::WeightUpdated { .. } => "weight_updated",
            AuditEvent::WeightsReset => "weights_reset",
        }
    }
}

/// Port for writing audit events
///
/// Synchronous and non-fallible: a lost audit line is reported by the
/// adapter but never fails or undoes a weight update.
pub trait WeightAuditLog: Send + Sync {
    fn log(&self, event: AuditEvent);
}

/// No-op implementation for tests and when auditing is disabled
pub struct NoAuditLog;

impl WeightAuditLog for NoAuditLog {
    fn log(&self, _event: AuditEvent) {}
}
