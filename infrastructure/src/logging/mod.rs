//! Weight audit trail
//!
//! [`JsonlWeightAuditLog`] implements the
//! [`WeightAuditLog`](council_application::WeightAuditLog) port as an
//! append-only JSONL file.

mod audit_trail;

pub use audit_trail::{JsonlWeightAuditLog, SyncPolicy};
