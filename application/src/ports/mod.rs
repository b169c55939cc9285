//! Port definitions (interfaces for external adapters)
//!
//! Ports define the contracts that infrastructure adapters must implement.

pub mod advisory_engine;
pub mod audit_log;
pub mod feedback_ledger;
pub mod feedback_queue;
pub mod progress;
pub mod result_cache;
pub mod weight_store;
