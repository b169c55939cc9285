//! File-backed weight store
//!
//! The JSON file is the only copy of the weights. Every operation takes a
//! lock on `<file>.lock` (shared for reads, exclusive for updates) and
//! re-reads the file under it, so several stores opened on one path, in one
//! process or many, serialize their read-modify-write cycles and never drop
//! each other's deltas. Updates are written to a temp file and renamed into
//! place; a failed write leaves the previous state intact.

use crate::fs_lock::{FileLock, lock_path_for, read_optional, write_atomic};
use async_trait::async_trait;
use chrono::Utc;
use council_application::{WeightStore, WeightStoreError};
use council_domain::{AgentId, AgentWeight, WeightSnapshot, WeightUpdate};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

type Records = BTreeMap<AgentId, AgentWeight>;

pub struct FileWeightStore {
    path: PathBuf,
    lock_path: PathBuf,
}

impl FileWeightStore {
    /// Open the store at `path`, checking that an existing file is readable
    pub async fn open(path: impl Into<PathBuf>) -> Result<Self, WeightStoreError> {
        let path = path.into();
        let store = Self {
            lock_path: lock_path_for(&path),
            path,
        };

        let agents = store.locked(false, |path| Ok(load(path)?.len())).await?;
        info!(path = %store.path.display(), agents, "Opened weight store");
        Ok(store)
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Run `op` on a blocking thread while holding the file lock
    async fn locked<T, F>(&self, exclusive: bool, op: F) -> Result<T, WeightStoreError>
    where
        T: Send + 'static,
        F: FnOnce(&Path) -> Result<T, WeightStoreError> + Send + 'static,
    {
        let path = self.path.clone();
        let lock_path = self.lock_path.clone();
        tokio::task::spawn_blocking(move || {
            let _lock = FileLock::acquire(&lock_path, exclusive).map_err(unavailable)?;
            op(&path)
        })
        .await
        .map_err(|e| WeightStoreError::Unavailable(format!("join error: {}", e)))?
    }
}

fn unavailable(e: impl std::fmt::Display) -> WeightStoreError {
    WeightStoreError::Unavailable(e.to_string())
}

fn load(path: &Path) -> Result<Records, WeightStoreError> {
    match read_optional(path).map_err(unavailable)? {
        Some(content) => parse(&content),
        None => Ok(BTreeMap::new()),
    }
}

fn parse(content: &str) -> Result<Records, WeightStoreError> {
    if content.trim().is_empty() {
        return Ok(BTreeMap::new());
    }
    let rows: Vec<AgentWeight> =
        serde_json::from_str(content).map_err(|e| WeightStoreError::Corrupt(e.to_string()))?;
    Ok(rows
        .into_iter()
        .map(|mut row| {
            row.weight = council_domain::clamp_weight(row.weight);
            (row.agent_id.clone(), row)
        })
        .collect())
}

fn save(path: &Path, records: &Records) -> Result<(), WeightStoreError> {
    let rows: Vec<&AgentWeight> = records.values().collect();
    let json = serde_json::to_string_pretty(&rows).map_err(unavailable)?;
    write_atomic(path, json.as_bytes()).map_err(unavailable)?;
    debug!(path = %path.display(), agents = rows.len(), "Persisted weights");
    Ok(())
}

#[async_trait]
impl WeightStore for FileWeightStore {
    async fn get_all(&self) -> Result<WeightSnapshot, WeightStoreError> {
        self.locked(false, |path| {
            Ok(load(path)?
                .into_values()
                .map(|r| (r.agent_id, r.weight))
                .collect())
        })
        .await
    }

    async fn records(&self) -> Result<Vec<AgentWeight>, WeightStoreError> {
        self.locked(false, |path| Ok(load(path)?.into_values().collect()))
            .await
    }

    async fn apply_delta(
        &self,
        agent_id: &AgentId,
        delta: f64,
    ) -> Result<WeightUpdate, WeightStoreError> {
        let agent_id = agent_id.clone();
        self.locked(true, move |path| {
            let mut records = load(path)?;
            let now = Utc::now();

            let current = records
                .get(&agent_id)
                .cloned()
                .unwrap_or_else(|| AgentWeight::neutral(agent_id.clone(), now));
            let next = current.with_delta(delta, now);
            records.insert(agent_id.clone(), next.clone());
            save(path, &records)?;

            Ok(WeightUpdate {
                agent_id,
                delta,
                before: current.weight,
                after: next.weight,
                update_count: next.update_count,
            })
        })
        .await
    }

    async fn reset(&self) -> Result<(), WeightStoreError> {
        self.locked(true, |path| save(path, &BTreeMap::new())).await?;
        info!(path = %self.path.display(), "Weights reset to neutral");
        Ok(())
    }
}
