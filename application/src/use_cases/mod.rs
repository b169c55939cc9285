//! Use cases
//!
//! Application-level operations that orchestrate domain logic.

pub mod dispatch_agents;
pub mod process_feedback;
pub mod run_analysis;
pub mod submit_feedback;
pub mod train_weights;
