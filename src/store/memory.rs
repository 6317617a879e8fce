//! In-memory health store.
//!
//! Same contract as the SQLite backend, backed by a Vec behind an RwLock.
//! Used by tests and as the scheduler's session-local fallback view when
//! the durable store is unreachable. Insertion order breaks timestamp ties.

use super::HealthStore;
use crate::domain::HealthRecord;
use crate::error::{FlockrError, Result};
use std::collections::HashMap;
use std::sync::RwLock;

/// Volatile append-only health store.
#[derive(Default)]
pub struct MemoryHealthStore {
    records: RwLock<Vec<HealthRecord>>,
}

impl MemoryHealthStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Total records appended (audit length, all accounts).
    pub fn len(&self) -> usize {
        self.records.read().map(|r| r.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl HealthStore for MemoryHealthStore {
    fn record(&self, record: &HealthRecord) -> Result<()> {
        let mut records = self
            .records
            .write()
            .map_err(|e| FlockrError::Persistence(e.to_string()))?;
        records.push(record.clone());
        Ok(())
    }

    fn latest_by_account(&self) -> Result<HashMap<String, HealthRecord>> {
        let records = self
            .records
            .read()
            .map_err(|e| FlockrError::Persistence(e.to_string()))?;

        let mut latest: HashMap<String, HealthRecord> = HashMap::new();
        for record in records.iter() {
            match latest.get(&record.username) {
                // >= keeps the later-inserted record on timestamp ties
                Some(existing) if record.recorded_at >= existing.recorded_at => {
                    latest.insert(record.username.clone(), record.clone());
                }
                Some(_) => {}
                None => {
                    latest.insert(record.username.clone(), record.clone());
                }
            }
        }
        Ok(latest)
    }

    fn history(&self, username: &str) -> Result<Vec<HealthRecord>> {
        let records = self
            .records
            .read()
            .map_err(|e| FlockrError::Persistence(e.to_string()))?;
        Ok(records
            .iter()
            .filter(|r| r.username == username)
            .cloned()
            .collect())
    }
}
