//! Application-level configuration.
//!
//! This module provides parameter types that control how use cases behave:
//!
//! - [`DispatchParams`] — per-agent timeout and outer deadline
//! - [`AnalysisParams`] — input limits and cache lifetime
//! - [`WorkerParams`] — feedback worker batching, retries and backoff
//!
//! These are built by the infrastructure config loader; use cases never read
//! files themselves.

pub mod analysis_params;
pub mod dispatch_params;
pub mod worker_params;

pub use analysis_params::AnalysisParams;
pub use dispatch_params::DispatchParams;
pub use worker_params::WorkerParams;
