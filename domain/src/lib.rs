//! Domain layer for codecouncil
//!
//! This crate contains the core data model and the pure functions of the
//! analysis pipeline. It has no dependencies on infrastructure or
//! presentation concerns and performs no I/O.
//!
//! # Core Concepts
//!
//! ## Council
//!
//! A code sample is handed to several independent advisory engines
//! ("agents"). Each agent returns [`Finding`]s with its own confidence.
//!
//! ## Trust
//!
//! Every agent carries a trust weight in `[0.1, 2.0]`. The
//! [`SuggestionMerger`] scales each finding's confidence by its agent's
//! weight, and user feedback nudges the weights through the
//! [`RewardEngine`].
//!
//! ```text
//! CodeSample ──▶ Fingerprint ──▶ (agents) ──▶ AgentReport[] ─┐
//!                                                           ├─▶ SuggestionMerger ──▶ AnalysisResult
//!                                          WeightSnapshot ──┘
//!
//! FeedbackEvent ──▶ RewardEngine ──▶ delta ──▶ (weight store)
//! ```

pub mod analysis;
pub mod core;
pub mod engine;
pub mod feedback;
pub mod finding;
pub mod merge;
pub mod weight;

// Re-export commonly used types
pub use analysis::{
    AnalysisId, AnalysisResult, CodeSample, DEFAULT_MAX_CODE_BYTES, Fingerprint, Language,
    normalize_code,
};
pub use core::{agent_id::AgentId, error::DomainError};
pub use engine::{AgentDescriptor, AgentOutcome, AgentReport, AgentRunSummary, AgentStatus};
pub use feedback::{
    ACCEPT_MAX, FeedbackEvent, FeedbackValidationError, REJECT_MAX, RewardEngine,
};
pub use finding::{Finding, FindingId, Location, ScoredFinding, Severity};
pub use merge::{SeverityBand, SuggestionMerger, group_by_severity};
pub use weight::{
    AgentWeight, MAX_WEIGHT, MIN_WEIGHT, NEUTRAL_WEIGHT, WeightSnapshot, WeightUpdate,
    clamp_weight, trust_multiplier,
};
