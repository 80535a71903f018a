//! Serializable page records and the per-page snapshot cache.

use crate::ledger::Ledger;
use crate::segment::PageKey;
use crate::stroke::Stroke;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use thiserror::Error;

/// Snapshot errors.
#[derive(Debug, Error)]
pub enum SnapshotError {
    #[error("Stroke {0} has no segments")]
    EmptyStroke(usize),
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Result type for snapshot operations.
pub type SnapshotResult<T> = Result<T, SnapshotError>;

/// Persisted form of one page: its strokes in paint order.
///
/// Contributor views are not stored; every segment carries its contributor
/// tag, so they are rebuilt by grouping on load.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PageRecord {
    pub key: PageKey,
    pub width: u32,
    pub height: u32,
    pub strokes: Vec<Stroke>,
}

impl PageRecord {
    pub fn to_json(&self) -> SnapshotResult<String> {
        Ok(serde_json::to_string(self)?)
    }

    pub fn from_json(json: &str) -> SnapshotResult<Self> {
        Ok(serde_json::from_str(json)?)
    }
}

/// Serialized page snapshots, kept until the page changes.
#[derive(Debug, Default)]
pub struct SnapshotCache {
    entries: HashMap<PageKey, String>,
}

impl SnapshotCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Cached JSON for the ledger's page, serializing it on a miss.
    pub fn get_or_serialize(&mut self, ledger: &Ledger) -> SnapshotResult<&str> {
        let key = ledger.key();
        if !self.entries.contains_key(&key) {
            let json = ledger.to_record().to_json()?;
            self.entries.insert(key, json);
        }
        Ok(self.entries[&key].as_str())
    }

    pub fn is_cached(&self, key: PageKey) -> bool {
        self.entries.contains_key(&key)
    }

    pub fn invalidate(&mut self, key: PageKey) {
        if self.entries.remove(&key).is_some() {
            log::debug!("Snapshot for page {} invalidated", key);
        }
    }

    pub fn invalidate_all(&mut self) {
        self.entries.clear();
    }
}
