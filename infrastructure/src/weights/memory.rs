//! In-memory weight store
//!
//! Each agent's weight lives in its own `AtomicU64` holding the `f64` bits.
//! An update is a compare-and-swap loop over "read, add, clamp", so
//! concurrent deltas for the same agent serialize on the cell without a
//! lock and none is lost. Deltas for different agents never contend.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use council_application::{WeightStore, WeightStoreError};
use council_domain::{
    AgentId, AgentWeight, NEUTRAL_WEIGHT, WeightSnapshot, WeightUpdate, clamp_weight,
};
use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, RwLock};
use tracing::{debug, warn};

/// Compare-and-swap attempts before reporting contention
const DEFAULT_MAX_ATTEMPTS: u32 = 64;

struct WeightCell {
    bits: AtomicU64,
    update_count: AtomicU64,
    updated_at: Mutex<DateTime<Utc>>,
}

impl WeightCell {
    fn new(weight: f64, now: DateTime<Utc>) -> Self {
        Self {
            bits: AtomicU64::new(clamp_weight(weight).to_bits()),
            update_count: AtomicU64::new(0),
            updated_at: Mutex::new(now),
        }
    }

    fn weight(&self) -> f64 {
        f64::from_bits(self.bits.load(Ordering::Acquire))
    }

    fn record(&self, agent_id: &AgentId) -> AgentWeight {
        let updated_at = self
            .updated_at
            .lock()
            .map(|at| *at)
            .unwrap_or_else(|_| Utc::now());
        AgentWeight {
            agent_id: agent_id.clone(),
            weight: self.weight(),
            update_count: self.update_count.load(Ordering::Acquire),
            updated_at,
        }
    }
}

/// Process-local weight store
pub struct InMemoryWeightStore {
    cells: RwLock<HashMap<AgentId, Arc<WeightCell>>>,
    max_attempts: u32,
}

impl Default for InMemoryWeightStore {
    fn default() -> Self {
        Self::new()
    }
}

impl InMemoryWeightStore {
    pub fn new() -> Self {
        Self {
            cells: RwLock::new(HashMap::new()),
            max_attempts: DEFAULT_MAX_ATTEMPTS,
        }
    }

    /// Store seeded with initial weights (clamped)
    pub fn with_weights(self, weights: &WeightSnapshot) -> Self {
        let now = Utc::now();
        if let Ok(mut cells) = self.cells.write() {
            for (agent_id, weight) in weights.iter() {
                cells.insert(agent_id.clone(), Arc::new(WeightCell::new(weight, now)));
            }
        }
        self
    }

    pub fn with_max_attempts(mut self, attempts: u32) -> Self {
        self.max_attempts = attempts.max(1);
        self
    }

    fn poisoned() -> WeightStoreError {
        WeightStoreError::Unavailable("weight table lock poisoned".to_string())
    }

    /// The agent's cell, created at neutral on first use
    fn cell(&self, agent_id: &AgentId) -> Result<Arc<WeightCell>, WeightStoreError> {
        if let Some(cell) = self.cells.read().map_err(|_| Self::poisoned())?.get(agent_id) {
            return Ok(Arc::clone(cell));
        }
        let mut cells = self.cells.write().map_err(|_| Self::poisoned())?;
        let cell = cells
            .entry(agent_id.clone())
            .or_insert_with(|| Arc::new(WeightCell::new(NEUTRAL_WEIGHT, Utc::now())));
        Ok(Arc::clone(cell))
    }
}

#[async_trait]
impl WeightStore for InMemoryWeightStore {
    async fn get_all(&self) -> Result<WeightSnapshot, WeightStoreError> {
        let cells = self.cells.read().map_err(|_| Self::poisoned())?;
        Ok(cells
            .iter()
            .map(|(id, cell)| (id.clone(), cell.weight()))
            .collect())
    }

    async fn records(&self) -> Result<Vec<AgentWeight>, WeightStoreError> {
        let cells = self.cells.read().map_err(|_| Self::poisoned())?;
        let mut records: Vec<AgentWeight> =
            cells.iter().map(|(id, cell)| cell.record(id)).collect();
        records.sort_by(|a, b| a.agent_id.cmp(&b.agent_id));
        Ok(records)
    }

    async fn apply_delta(
        &self,
        agent_id: &AgentId,
        delta: f64,
    ) -> Result<WeightUpdate, WeightStoreError> {
        let cell = self.cell(agent_id)?;

        for attempt in 1..=self.max_attempts {
            let current = cell.bits.load(Ordering::Acquire);
            let before = f64::from_bits(current);
            let after = clamp_weight(before + delta);

            if cell
                .bits
                .compare_exchange(current, after.to_bits(), Ordering::AcqRel, Ordering::Acquire)
                .is_ok()
            {
                let update_count = cell.update_count.fetch_add(1, Ordering::AcqRel) + 1;
                if let Ok(mut at) = cell.updated_at.lock() {
                    *at = Utc::now();
                }
                if attempt > 1 {
                    debug!(agent = %agent_id, attempt, "Weight CAS succeeded after retry");
                }
                return Ok(WeightUpdate {
                    agent_id: agent_id.clone(),
                    delta,
                    before,
                    after,
                    update_count,
                });
            }

            tokio::task::yield_now().await;
        }

        warn!(agent = %agent_id, attempts = self.max_attempts, "Weight update contention");
        Err(WeightStoreError::Contention {
            agent: agent_id.to_string(),
            attempts: self.max_attempts,
        })
    }

    async fn reset(&self) -> Result<(), WeightStoreError> {
        self.cells.write().map_err(|_| Self::poisoned())?.clear();
        Ok(())
    }
}
