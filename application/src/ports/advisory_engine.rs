//! Advisory engine port
//!
//! Defines the single capability every agent implements. Adding an agent is
//! adding an implementation of [`AdvisoryEngine`]; the dispatcher treats all
//! of them as opaque, possibly slow, possibly failing oracles.

use async_trait::async_trait;
use council_domain::{AgentDescriptor, CodeSample, Finding};
use thiserror::Error;

/// Errors an advisory engine may return
#[derive(Error, Debug)]
pub enum EngineError {
    #[error("Engine unavailable: {0}")]
    Unavailable(String),

    #[error("Input rejected: {0}")]
    Rejected(String),

    #[error("Invalid response: {0}")]
    InvalidResponse(String),

    #[error("Other error: {0}")]
    Other(String),
}

/// An independent component that inspects code and emits findings
#[async_trait]
pub trait AdvisoryEngine: Send + Sync {
    /// Identity, severity ceiling and timeout override of this agent
    fn descriptor(&self) -> &AgentDescriptor;

    /// Evaluate a code sample
    ///
    /// Called once per agent per analysis. The dispatcher enforces the
    /// timeout; implementations do not need their own.
    async fn evaluate(&self, sample: &CodeSample) -> Result<Vec<Finding>, EngineError>;
}
