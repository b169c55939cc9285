//! In-memory result cache with per-entry expiry
//!
//! Expired entries are dropped lazily on lookup and in bulk by
//! [`InMemoryResultCache::purge_expired`]. When the entry limit is reached
//! the entry closest to expiry is evicted.

use async_trait::async_trait;
use council_application::{CacheError, ResultCache};
use council_domain::{AnalysisResult, Fingerprint};
use std::collections::HashMap;
use std::sync::Mutex;
use std::time::Duration;
use tokio::time::Instant;
use tracing::debug;

/// Default upper bound on cached analyses
const DEFAULT_MAX_ENTRIES: usize = 10_000;

struct Entry {
    result: AnalysisResult,
    expires_at: Instant,
}

pub struct InMemoryResultCache {
    entries: Mutex<HashMap<Fingerprint, Entry>>,
    max_entries: usize,
}

impl Default for InMemoryResultCache {
    fn default() -> Self {
        Self::new()
    }
}

impl InMemoryResultCache {
    pub fn new() -> Self {
        Self {
            entries: Mutex::new(HashMap::new()),
            max_entries: DEFAULT_MAX_ENTRIES,
        }
    }

    pub fn with_max_entries(mut self, max_entries: usize) -> Self {
        self.max_entries = max_entries.max(1);
        self
    }

    fn poisoned() -> CacheError {
        CacheError::Unavailable("cache lock poisoned".to_string())
    }

    /// Live entry count (expired entries not yet purged are included)
    pub fn len(&self) -> usize {
        self.entries.lock().map(|e| e.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Drop every expired entry, returning how many were removed
    pub fn purge_expired(&self) -> usize {
        let now = Instant::now();
        let Ok(mut entries) = self.entries.lock() else {
            return 0;
        };
        let before = entries.len();
        entries.retain(|_, entry| entry.expires_at > now);
        before - entries.len()
    }
}

#[async_trait]
impl ResultCache for InMemoryResultCache {
    async fn get(&self, fingerprint: &Fingerprint) -> Result<Option<AnalysisResult>, CacheError> {
        let mut entries = self.entries.lock().map_err(|_| Self::poisoned())?;
        match entries.get(fingerprint) {
            Some(entry) if entry.expires_at > Instant::now() => Ok(Some(entry.result.clone())),
            Some(_) => {
                debug!(fingerprint = fingerprint.short(), "Cache entry expired");
                entries.remove(fingerprint);
                Ok(None)
            }
            None => Ok(None),
        }
    }

    async fn put(
        &self,
        fingerprint: &Fingerprint,
        result: &AnalysisResult,
        ttl: Duration,
    ) -> Result<(), CacheError> {
        let mut entries = self.entries.lock().map_err(|_| Self::poisoned())?;

        if entries.len() >= self.max_entries && !entries.contains_key(fingerprint) {
            let soonest = entries
                .iter()
                .min_by_key(|(_, entry)| entry.expires_at)
                .map(|(fp, _)| fp.clone());
            if let Some(fp) = soonest {
                entries.remove(&fp);
            }
        }

        entries.insert(
            fingerprint.clone(),
            Entry {
                result: result.clone(),
                expires_at: Instant::now() + ttl,
            },
        );
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use council_domain::{AnalysisId, WeightSnapshot};

    fn result(id: &str, fp: &str) -> AnalysisResult {
        AnalysisResult {
            analysis_id: AnalysisId::new(id),
            fingerprint: Fingerprint::from_hex(fp),
            findings: vec![],
            weights: WeightSnapshot::new(),
            agents: vec![],
            from_cache: false,
            created_at: Utc::now(),
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_entry_expires_after_ttl() {
        let cache = InMemoryResultCache::new();
        let fp = Fingerprint::from_hex("aa");
        cache
            .put(&fp, &result("an-1", "aa"), Duration::from_secs(60))
            .await
            .unwrap();

        tokio::time::advance(Duration::from_secs(59)).await;
        assert!(cache.get(&fp).await.unwrap().is_some());

        tokio::time::advance(Duration::from_secs(2)).await;
        assert!(cache.get(&fp).await.unwrap().is_none());
        assert!(cache.is_empty());
    }

    #[tokio::test]
    async fn test_last_writer_wins() {
        let cache = InMemoryResultCache::new();
        let fp = Fingerprint::from_hex("bb");
        let ttl = Duration::from_secs(60);

        cache.put(&fp, &result("an-1", "bb"), ttl).await.unwrap();
        cache.put(&fp, &result("an-2", "bb"), ttl).await.unwrap();

        let hit = cache.get(&fp).await.unwrap().unwrap();
        assert_eq!(hit.analysis_id.as_str(), "an-2");
        assert_eq!(cache.len(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_capacity_evicts_soonest_expiry() {
        let cache = InMemoryResultCache::new().with_max_entries(2);
        let short = Fingerprint::from_hex("01");
        let long = Fingerprint::from_hex("02");
        let newer = Fingerprint::from_hex("03");

        cache
            .put(&short, &result("an-1", "01"), Duration::from_secs(10))
            .await
            .unwrap();
        cache
            .put(&long, &result("an-2", "02"), Duration::from_secs(1000))
            .await
            .unwrap();
        cache
            .put(&newer, &result("an-3", "03"), Duration::from_secs(100))
            .await
            .unwrap();

        assert!(cache.get(&short).await.unwrap().is_none());
        assert!(cache.get(&long).await.unwrap().is_some());
        assert!(cache.get(&newer).await.unwrap().is_some());
    }

    #[tokio::test(start_paused = true)]
    async fn test_purge_expired() {
        let cache = InMemoryResultCache::new();
        for (i, ttl) in [5u64, 5, 500].iter().enumerate() {
            let fp = Fingerprint::from_hex(format!("{i:02x}"));
            cache
                .put(&fp, &result("an", "x"), Duration::from_secs(*ttl))
                .await
                .unwrap();
        }

        tokio::time::advance(Duration::from_secs(10)).await;
        assert_eq!(cache.purge_expired(), 2);
        assert_eq!(cache.len(), 1);
    }
}
