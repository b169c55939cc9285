//! Advisory engine descriptors and per-agent dispatch outcomes.
//!
//! The engines themselves are opaque; the domain only knows what each one
//! declares about itself ([`AgentDescriptor`]) and how its call ended
//! ([`AgentOutcome`]).

pub mod descriptor;
pub mod report;

pub use descriptor::AgentDescriptor;
pub use report::{AgentOutcome, AgentReport, AgentRunSummary, AgentStatus};
