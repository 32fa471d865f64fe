//! Price store holding the latest known record per asset.
//!
//! The store is replaced wholesale on each refresh; readers see either the
//! previous snapshot or the new one, never a partial update.

use cryptowatch_core::PriceRecord;
use std::collections::{HashMap, HashSet};
use std::sync::{Arc, RwLock};

#[derive(Debug, Default)]
struct StoreState {
    /// Records in asset-list order
    records: Vec<PriceRecord>,
    /// Incremented on every replace
    version: u64,
    /// Last replace time in milliseconds
    updated_at_ms: u64,
}

/// Thread-safe store of the most recent price snapshot.
#[derive(Debug, Clone, Default)]
pub struct PriceStore {
    state: Arc<RwLock<StoreState>>,
}

impl PriceStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the whole snapshot. Duplicate asset ids keep their first record.
    /// Returns the new version.
    pub fn replace(&self, records: Vec<PriceRecord>) -> u64 {
        let mut seen = HashSet::new();
        let records: Vec<PriceRecord> = records
            .into_iter()
            .filter(|r| seen.insert(r.asset_id.clone()))
            .collect();

        let mut state = self.state.write().unwrap_or_else(|e| e.into_inner());
        state.records = records;
        state.version += 1;
        state.updated_at_ms = std::time::SystemTime::now()
            .duration_since(std::time::UNIX_EPOCH)
            .map(|d| d.as_millis() as u64)
            .unwrap_or_default();
        state.version
    }

    /// Copy of the current snapshot in insertion order.
    pub fn snapshot(&self) -> Vec<PriceRecord> {
        self.read(|s| s.records.clone())
    }

    /// Current snapshot keyed by asset id.
    pub fn price_map(&self) -> HashMap<String, PriceRecord> {
        self.read(|s| {
            s.records
                .iter()
                .map(|r| (r.asset_id.clone(), r.clone()))
                .collect()
        })
    }

    /// Latest record for one asset.
    pub fn get(&self, asset_id: &str) -> Option<PriceRecord> {
        self.read(|s| s.records.iter().find(|r| r.asset_id == asset_id).cloned())
    }

    /// Number of completed replacements.
    pub fn version(&self) -> u64 {
        self.read(|s| s.version)
    }

    /// Time of the last replacement in milliseconds since the epoch; 0 if never.
    pub fn updated_at_ms(&self) -> u64 {
        self.read(|s| s.updated_at_ms)
    }

    pub fn len(&self) -> usize {
        self.read(|s| s.records.len())
    }

    pub fn is_empty(&self) -> bool {
        self.read(|s| s.records.is_empty())
    }

    fn read<T>(&self, f: impl FnOnce(&StoreState) -> T) -> T {
        let state = self.state.read().unwrap_or_else(|e| e.into_inner());
        f(&state)
    }
}
