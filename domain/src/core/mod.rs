//! Core domain concepts shared across all subdomains.
//!
//! - [`agent_id::AgentId`] — identifier of a registered advisory engine
//! - [`error::DomainError`] — domain-level validation errors

pub mod agent_id;
pub mod error;
