//! Health store persistence layer.
//!
//! Append-only log of publish outcomes, one row per (account, timestamp).
//! The `HealthStore` trait is the seam: the scheduler only needs append
//! and latest-per-account. Two backends ship:
//! - **SQLite** (`SqliteHealthStore`): durable, the production default
//! - **Memory** (`MemoryHealthStore`): tests and the scheduler's
//!   best-effort fallback view when the durable store is unreachable

mod memory;
mod sqlite;

pub use memory::MemoryHealthStore;
pub use sqlite::SqliteHealthStore;

use crate::domain::{HealthRecord, Outcome, Roster};
use crate::error::{FlockrError, Result};
use log::info;
use std::collections::HashMap;

/// Append/query interface over the durable health log.
pub trait HealthStore: Send + Sync {
    /// Append one record. Fails with `FlockrError::Persistence` if the
    /// backend is unreachable; the scheduler reports and proceeds.
    fn record(&self, record: &HealthRecord) -> Result<()>;

    /// For every account that has ever had a record, its single most
    /// recent record. Equal timestamps tie-break to the later-inserted
    /// row. Point-in-time snapshot, not a live view.
    fn latest_by_account(&self) -> Result<HashMap<String, HealthRecord>>;

    /// Full audit history for one account, oldest first.
    fn history(&self, username: &str) -> Result<Vec<HealthRecord>>;
}

/// Store double standing in for an unreachable backend: every operation
/// fails with a persistence error. Used to exercise the scheduler's
/// degraded path, where posting continues on the session view alone.
pub struct UnavailableHealthStore;

impl HealthStore for UnavailableHealthStore {
    fn record(&self, _record: &HealthRecord) -> Result<()> {
        Err(FlockrError::Persistence("store unreachable".to_string()))
    }

    fn latest_by_account(&self) -> Result<HashMap<String, HealthRecord>> {
        Err(FlockrError::Persistence("store unreachable".to_string()))
    }

    fn history(&self, _username: &str) -> Result<Vec<HealthRecord>> {
        Err(FlockrError::Persistence("store unreachable".to_string()))
    }
}

/// Seed a synthetic success record for every roster account so a fresh
/// deployment starts with a fully-eligible fleet. Returns the number of
/// records written.
pub fn seed_roster(store: &dyn HealthStore, roster: &Roster) -> Result<usize> {
    for account in &roster.accounts {
        store.record(&HealthRecord::now(account.username.clone(), Outcome::Success))?;
        info!("Seeded {} as alive", account.username);
    }
    Ok(roster.accounts.len())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::Account;

    #[test]
    fn test_seed_roster_marks_all_accounts_alive() {
        let store = MemoryHealthStore::new();
        let roster = Roster {
            accounts: vec![Account::new("bot_a"), Account::new("bot_b")],
        };

        let written = seed_roster(&store, &roster).unwrap();
        assert_eq!(written, 2);

        let latest = store.latest_by_account().unwrap();
        assert_eq!(latest.len(), 2);
        assert!(latest.values().all(|r| r.outcome == Outcome::Success));
    }
}
