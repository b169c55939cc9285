//! Findings produced by advisory engines.
//!
//! - [`Severity`] — bounded 1..=5 severity scale
//! - [`Finding`] — one raw observation from one agent
//! - [`ScoredFinding`] — a finding after trust-weighted scoring

pub mod entities;
pub mod severity;

pub use entities::{Finding, FindingId, Location, ScoredFinding};
pub use severity::Severity;
