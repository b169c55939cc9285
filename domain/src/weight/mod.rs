//! Agent trust weights.
//!
//! Every agent owns one weight in `[MIN_WEIGHT, MAX_WEIGHT]`, starting at
//! [`NEUTRAL_WEIGHT`]. Weights only move through clamped additive deltas, so
//! any interleaving of the same deltas lands on the same value as long as the
//! bounds are not hit along the way.

pub mod snapshot;
pub mod value_objects;

pub use snapshot::WeightSnapshot;
pub use value_objects::{
    AgentWeight, MAX_WEIGHT, MIN_WEIGHT, NEUTRAL_WEIGHT, WeightUpdate, clamp_weight,
    trust_multiplier,
};
