//! Applied-feedback ledger port
//!
//! Remembers which judgements were already applied to the weight store so a
//! redelivered copy of an applied message is recognized and never counted
//! twice. A judgement is claimed before its update runs; the claim is the
//! only check, so two workers racing on copies of one message cannot both
//! pass it.

use async_trait::async_trait;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum LedgerError {
    #[error("Feedback ledger unavailable: {0}")]
    Unavailable(String),
}

#[async_trait]
pub trait FeedbackLedger: Send + Sync {
    /// Atomically take the judgement with this dedup key
    ///
    /// Returns `false` when it was already applied or another worker holds a
    /// live claim on it.
    async fn claim(&self, key: &str) -> Result<bool, LedgerError>;

    /// Mark a claimed judgement as applied
    async fn commit(&self, key: &str) -> Result<(), LedgerError>;

    /// Drop a claim whose update did not commit, so a redelivery can retry
    async fn release(&self, key: &str) -> Result<(), LedgerError>;
}
