//! SQLite health store backend.
//!
//! One table, append-only. Timestamps are stored as integer milliseconds
//! since the Unix epoch; the rowid breaks ties between equal timestamps
//! (later insert wins).

use super::HealthStore;
use crate::domain::{HealthRecord, Outcome};
use crate::error::{FlockrError, Result};
use chrono::DateTime;
use rusqlite::{Connection, params};
use std::collections::HashMap;
use std::path::Path;
use std::sync::Mutex;

/// Durable health store backed by a SQLite file.
pub struct SqliteHealthStore {
    db: Mutex<Connection>,
}

impl SqliteHealthStore {
    /// Open or create a health store at the given path.
    pub fn open(path: &Path) -> Result<Self> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let db = Connection::open(path)?;
        Self::init_schema(&db)?;
        Ok(Self { db: Mutex::new(db) })
    }

    /// Open an in-process store with no file backing (tests).
    pub fn open_in_memory() -> Result<Self> {
        let db = Connection::open_in_memory()?;
        Self::init_schema(&db)?;
        Ok(Self { db: Mutex::new(db) })
    }

    fn init_schema(db: &Connection) -> Result<()> {
        db.execute_batch(
            r#"
            CREATE TABLE IF NOT EXISTS health (
                username    TEXT NOT NULL,
                outcome     TEXT NOT NULL,
                recorded_at INTEGER NOT NULL
            );

            CREATE INDEX IF NOT EXISTS idx_health_account
                ON health(username, recorded_at);
            "#,
        )?;
        Ok(())
    }

    fn lock(&self) -> Result<std::sync::MutexGuard<'_, Connection>> {
        self.db
            .lock()
            .map_err(|e| FlockrError::Persistence(format!("store lock poisoned: {}", e)))
    }

    fn row_to_record(username: String, outcome: String, millis: i64) -> Result<HealthRecord> {
        let outcome = Outcome::parse(&outcome)
            .ok_or_else(|| FlockrError::Persistence(format!("unknown outcome in store: {}", outcome)))?;
        let recorded_at = DateTime::from_timestamp_millis(millis)
            .ok_or_else(|| FlockrError::Persistence(format!("bad timestamp in store: {}", millis)))?;
        Ok(HealthRecord {
            username,
            outcome,
            recorded_at,
        })
    }
}

impl HealthStore for SqliteHealthStore {
    fn record(&self, record: &HealthRecord) -> Result<()> {
        let db = self.lock()?;
        db.execute(
            "INSERT INTO health (username, outcome, recorded_at) VALUES (?1, ?2, ?3)",
            params![
                record.username,
                record.outcome.as_str(),
                record.recorded_at.timestamp_millis()
            ],
        )?;
        Ok(())
    }

    fn latest_by_account(&self) -> Result<HashMap<String, HealthRecord>> {
        let db = self.lock()?;
        let mut stmt = db.prepare(
            r#"
            SELECT username, outcome, recorded_at FROM health h
            WHERE rowid = (
                SELECT rowid FROM health
                WHERE username = h.username
                ORDER BY recorded_at DESC, rowid DESC
                LIMIT 1
            )
            "#,
        )?;

        let rows = stmt.query_map([], |row| {
            Ok((
                row.get::<_, String>(0)?,
                row.get::<_, String>(1)?,
                row.get::<_, i64>(2)?,
            ))
        })?;

        let mut latest = HashMap::new();
        for row in rows {
            let (username, outcome, millis) = row?;
            let record = Self::row_to_record(username.clone(), outcome, millis)?;
            latest.insert(username, record);
        }
        Ok(latest)
    }

    fn history(&self, username: &str) -> Result<Vec<HealthRecord>> {
        let db = self.lock()?;
        let mut stmt = db.prepare(
            "SELECT username, outcome, recorded_at FROM health
             WHERE username = ?1
             ORDER BY recorded_at ASC, rowid ASC",
        )?;

        let rows = stmt.query_map(params![username], |row| {
            Ok((
                row.get::<_, String>(0)?,
                row.get::<_, String>(1)?,
                row.get::<_, i64>(2)?,
            ))
        })?;

        let mut records = Vec::new();
        for row in rows {
            let (username, outcome, millis) = row?;
            records.push(Self::row_to_record(username, outcome, millis)?);
        }
        Ok(records)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, Utc};

    #[test]
    fn test_record_and_latest() {
        let store = SqliteHealthStore::open_in_memory().unwrap();
        let record = HealthRecord::now("bot_a", Outcome::Success);
        store.record(&record).unwrap();

        let latest = store.latest_by_account().unwrap();
        assert_eq!(latest.len(), 1);
        assert_eq!(latest["bot_a"].outcome, Outcome::Success);
    }

    #[test]
    fn test_latest_picks_newest_timestamp() {
        let store = SqliteHealthStore::open_in_memory().unwrap();
        let now = Utc::now();
        store
            .record(&HealthRecord::new("bot_a", Outcome::Success, now - Duration::hours(2)))
            .unwrap();
        store
            .record(&HealthRecord::new("bot_a", Outcome::RateLimited, now))
            .unwrap();
        store
            .record(&HealthRecord::new("bot_a", Outcome::ServerError, now - Duration::hours(1)))
            .unwrap();

        let latest = store.latest_by_account().unwrap();
        assert_eq!(latest["bot_a"].outcome, Outcome::RateLimited);
    }

    #[test]
    fn test_equal_timestamps_later_insert_wins() {
        let store = SqliteHealthStore::open_in_memory().unwrap();
        let ts = Utc::now();
        store.record(&HealthRecord::new("bot_a", Outcome::Success, ts)).unwrap();
        store
            .record(&HealthRecord::new("bot_a", Outcome::Forbidden, ts))
            .unwrap();

        let latest = store.latest_by_account().unwrap();
        assert_eq!(latest["bot_a"].outcome, Outcome::Forbidden);
    }

    #[test]
    fn test_duplicate_write_is_idempotent_for_latest() {
        let store = SqliteHealthStore::open_in_memory().unwrap();
        let record = HealthRecord::now("bot_a", Outcome::Success);
        store.record(&record).unwrap();
        store.record(&record).unwrap();

        let latest = store.latest_by_account().unwrap();
        assert_eq!(latest.len(), 1);
        assert_eq!(latest["bot_a"].outcome, Outcome::Success);
        assert_eq!(store.history("bot_a").unwrap().len(), 2);
    }

    #[test]
    fn test_history_ordered_oldest_first() {
        let store = SqliteHealthStore::open_in_memory().unwrap();
        let now = Utc::now();
        store
            .record(&HealthRecord::new("bot_a", Outcome::ServerError, now - Duration::hours(3)))
            .unwrap();
        store
            .record(&HealthRecord::new("bot_a", Outcome::Success, now))
            .unwrap();
        store
            .record(&HealthRecord::new("bot_b", Outcome::Success, now))
            .unwrap();

        let history = store.history("bot_a").unwrap();
        assert_eq!(history.len(), 2);
        assert_eq!(history[0].outcome, Outcome::ServerError);
        assert_eq!(history[1].outcome, Outcome::Success);
    }

    #[test]
    fn test_persists_across_reopen() {
        let dir = tempfile::TempDir::new().unwrap();
        let path = dir.path().join("health.db");

        {
            let store = SqliteHealthStore::open(&path).unwrap();
            store.record(&HealthRecord::now("bot_a", Outcome::Unauthorized)).unwrap();
        }

        let store = SqliteHealthStore::open(&path).unwrap();
        let latest = store.latest_by_account().unwrap();
        assert_eq!(latest["bot_a"].outcome, Outcome::Unauthorized);
    }

    #[test]
    fn test_empty_store() {
        let store = SqliteHealthStore::open_in_memory().unwrap();
        assert!(store.latest_by_account().unwrap().is_empty());
        assert!(store.history("bot_a").unwrap().is_empty());
    }
}
