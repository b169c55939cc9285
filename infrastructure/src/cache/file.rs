//! Result cache persisted as one JSON file per fingerprint
//!
//! Layout: `<dir>/<fingerprint>.json` holding the result and its expiry,
//! plus `<dir>/.lock`. Lookups take the lock shared, writes and removals
//! take it exclusive, so any number of CLI processes can share a directory.

use crate::fs_lock::{FileLock, read_optional, write_atomic};
use async_trait::async_trait;
use chrono::Utc;
use council_application::{CacheError, ResultCache};
use council_domain::{AnalysisResult, Fingerprint};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::{debug, info};

const LOCK_FILE: &str = ".lock";
const ENTRY_EXTENSION: &str = "json";

#[derive(Serialize, Deserialize)]
struct StoredEntry {
    /// Unix ms; the entry is dead from this instant on
    expires_at_ms: i64,
    result: AnalysisResult,
}

impl StoredEntry {
    fn is_live(&self, now_ms: i64) -> bool {
        self.expires_at_ms > now_ms
    }
}

pub struct FileResultCache {
    dir: PathBuf,
}

impl FileResultCache {
    pub fn open(dir: impl Into<PathBuf>) -> Result<Self, CacheError> {
        let dir = dir.into();
        std::fs::create_dir_all(&dir).map_err(|e| unavailable(&dir, e))?;
        info!(dir = %dir.display(), "Opened result cache");
        Ok(Self { dir })
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Delete every expired entry, returning how many were removed
    pub async fn purge_expired(&self) -> Result<usize, CacheError> {
        self.locked(true, |dir| {
            let now = Utc::now().timestamp_millis();
            let mut removed = 0;
            for item in std::fs::read_dir(dir).map_err(|e| unavailable(dir, e))? {
                let path = item.map_err(|e| unavailable(dir, e))?.path();
                if path.extension().and_then(|e| e.to_str()) != Some(ENTRY_EXTENSION) {
                    continue;
                }
                // Unreadable entries are dropped along with expired ones
                let live = read_entry(&path)
                    .ok()
                    .flatten()
                    .is_some_and(|entry| entry.is_live(now));
                if !live {
                    std::fs::remove_file(&path).map_err(|e| unavailable(&path, e))?;
                    removed += 1;
                }
            }
            Ok(removed)
        })
        .await
    }

    fn entry_path(&self, fingerprint: &Fingerprint) -> Result<PathBuf, CacheError> {
        if !fingerprint.is_hex() {
            return Err(CacheError::Serialization(format!(
                "fingerprint {:?} is not a hex digest",
                fingerprint.short()
            )));
        }
        Ok(self
            .dir
            .join(format!("{}.{ENTRY_EXTENSION}", fingerprint.as_str())))
    }

    async fn locked<T, F>(&self, exclusive: bool, op: F) -> Result<T, CacheError>
    where
        T: Send + 'static,
        F: FnOnce(&Path) -> Result<T, CacheError> + Send + 'static,
    {
        let dir = self.dir.clone();
        tokio::task::spawn_blocking(move || {
            let lock_path = dir.join(LOCK_FILE);
            let _lock = FileLock::acquire(&lock_path, exclusive)
                .map_err(|e| unavailable(&lock_path, e))?;
            op(&dir)
        })
        .await
        .map_err(|e| CacheError::Unavailable(format!("cache task failed: {e}")))?
    }
}

fn unavailable(path: &Path, e: std::io::Error) -> CacheError {
    CacheError::Unavailable(format!("{}: {}", path.display(), e))
}

fn read_entry(path: &Path) -> Result<Option<StoredEntry>, CacheError> {
    let Some(content) = read_optional(path).map_err(|e| unavailable(path, e))? else {
        return Ok(None);
    };
    serde_json::from_str(&content)
        .map(Some)
        .map_err(|e| CacheError::Serialization(format!("{}: {}", path.display(), e)))
}

#[async_trait]
impl ResultCache for FileResultCache {
    async fn get(&self, fingerprint: &Fingerprint) -> Result<Option<AnalysisResult>, CacheError> {
        let path = self.entry_path(fingerprint)?;
        let now = Utc::now().timestamp_millis();

        let lookup_path = path.clone();
        let entry = self.locked(false, move |_| read_entry(&lookup_path)).await?;
        match entry {
            Some(entry) if entry.is_live(now) => Ok(Some(entry.result)),
            Some(_) => {
                debug!(fingerprint = fingerprint.short(), "Cache entry expired");
                // Another process may have refreshed it since the read
                self.locked(true, move |_| {
                    let still_expired = read_entry(&path)?.is_some_and(|e| !e.is_live(now));
                    if still_expired {
                        std::fs::remove_file(&path).map_err(|e| unavailable(&path, e))?;
                    }
                    Ok(())
                })
                .await?;
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
        let path = self.entry_path(fingerprint)?;
        let ttl_ms = i64::try_from(ttl.as_millis()).unwrap_or(i64::MAX);
        let entry = StoredEntry {
            expires_at_ms: Utc::now().timestamp_millis().saturating_add(ttl_ms),
            result: result.clone(),
        };
        let content = serde_json::to_vec(&entry)
            .map_err(|e| CacheError::Serialization(e.to_string()))?;

        self.locked(true, move |_| {
            write_atomic(&path, &content).map_err(|e| unavailable(&path, e))
        })
        .await
    }
}
