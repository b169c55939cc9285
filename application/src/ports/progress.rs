//! Dispatch progress port
//!
//! Lets the presentation layer show agents finishing as they finish.

use council_domain::{AgentId, AgentStatus};

/// Callback for progress updates during agent dispatch
pub trait DispatchProgress: Send + Sync {
    /// Called when the fan-out starts
    fn on_dispatch_start(&self, total_agents: usize);

    /// Called as each agent finishes, in completion order
    fn on_agent_complete(&self, agent: &AgentId, status: &AgentStatus);

    /// Called once every agent finished or was abandoned
    fn on_dispatch_complete(&self) {}
}

/// No-op progress notifier for when progress reporting is not needed
pub struct NoProgress;

impl DispatchProgress for NoProgress {
    fn on_dispatch_start(&self, _total_agents: usize) {}
    fn on_agent_complete(&self, _agent: &AgentId, _status: &AgentStatus) {}
}
