//! Suggestion merging.
//!
//! Combines every agent's findings into one deterministic, trust-weighted
//! ordering. Pure: no I/O, no clocks, no randomness.

pub mod merger;

pub use merger::{SeverityBand, SuggestionMerger, group_by_severity};
