//! Health records.
//!
//! One record per publish attempt, keyed by (account, timestamp). Records
//! are append-only: never mutated, never deleted. Only the latest record
//! per account drives liveness; older rows are audit history.

use crate::domain::Outcome;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// One append-only health entry for an account.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HealthRecord {
    /// Account this record belongs to
    pub username: String,

    /// Classified result of the attempt
    pub outcome: Outcome,

    /// When the attempt resolved (UTC)
    pub recorded_at: DateTime<Utc>,
}

impl HealthRecord {
    /// Create a record stamped with the given time.
    pub fn new(username: impl Into<String>, outcome: Outcome, recorded_at: DateTime<Utc>) -> Self {
        Self {
            username: username.into(),
            outcome,
            recorded_at,
        }
    }

    /// Create a record stamped now.
    pub fn now(username: impl Into<String>, outcome: Outcome) -> Self {
        Self::new(username, outcome, Utc::now())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_new_sets_fields() {
        let ts = Utc.with_ymd_and_hms(2024, 1, 15, 12, 0, 0).unwrap();
        let record = HealthRecord::new("bot_a", Outcome::RateLimited, ts);
        assert_eq!(record.username, "bot_a");
        assert_eq!(record.outcome, Outcome::RateLimited);
        assert_eq!(record.recorded_at, ts);
    }

    #[test]
    fn test_now_is_recent() {
        let before = Utc::now();
        let record = HealthRecord::now("bot_a", Outcome::Success);
        let after = Utc::now();
        assert!(record.recorded_at >= before);
        assert!(record.recorded_at <= after);
    }

    #[test]
    fn test_serialization_roundtrip() {
        let record = HealthRecord::now("bot_a", Outcome::ServerError);
        let json = serde_json::to_string(&record).unwrap();
        let back: HealthRecord = serde_json::from_str(&json).unwrap();
        assert_eq!(record, back);
    }
}
