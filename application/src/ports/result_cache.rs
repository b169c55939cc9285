//! Result cache port
//!
//! Key-value store with per-entry expiry, shared by every instance serving
//! analyses. Entries are written whole and never edited; a second `put` for
//! the same fingerprint replaces the first.

use async_trait::async_trait;
use council_domain::{AnalysisResult, Fingerprint};
use std::time::Duration;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum CacheError {
    #[error("Cache unavailable: {0}")]
    Unavailable(String),

    #[error("Cache entry could not be (de)serialized: {0}")]
    Serialization(String),
}

#[async_trait]
pub trait ResultCache: Send + Sync {
    /// Cached result for `fingerprint`, `None` on miss or expiry
    async fn get(&self, fingerprint: &Fingerprint) -> Result<Option<AnalysisResult>, CacheError>;

    /// Store `result` under `fingerprint` for `ttl` (last writer wins)
    async fn put(
        &self,
        fingerprint: &Fingerprint,
        result: &AnalysisResult,
        ttl: Duration,
    ) -> Result<(), CacheError>;
}

/// Cache that never stores anything, for `--no-cache` runs and tests
pub struct NoCache;

#[async_trait]
impl ResultCache for NoCache {
    async fn get(&self, _fingerprint: &Fingerprint) -> Result<Option<AnalysisResult>, CacheError> {
        Ok(None)
    }

    async fn put(
        &self,
        _fingerprint: &Fingerprint,
        _result: &AnalysisResult,
        _ttl: Duration,
    ) -> Result<(), CacheError> {
        Ok(())
    }
}
