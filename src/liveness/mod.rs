//! Liveness classification.
//!
//! Decides which accounts may act this cycle from the latest health
//! snapshot. Pure function of its inputs: no clock reads, no store
//! access, no hidden state.
//!
//! Policy:
//! - no record: eligible (a new account must post on its first cycle)
//! - latest record is success: eligible
//! - latest record is a failure: eligible once `now - recorded_at` has
//!   reached the cooldown (inclusive boundary)

use crate::domain::HealthRecord;
use chrono::{DateTime, Duration, Utc};
use log::debug;
use std::collections::{HashMap, HashSet};

/// Accounts currently permitted to attempt a post.
///
/// A non-positive cooldown means every failed account is retried every
/// cycle; callers validate cooldown sanity at startup.
pub fn eligible_accounts(
    all_accounts: &[String],
    latest_health: &HashMap<String, HealthRecord>,
    now: DateTime<Utc>,
    cooldown: Duration,
) -> HashSet<String> {
    let mut eligible = HashSet::new();

    for username in all_accounts {
        match latest_health.get(username) {
            None => {
                debug!("{}: no health record, assumed alive", username);
                eligible.insert(username.clone());
            }
            Some(record) if record.outcome.is_success() => {
                debug!("{}: last attempt succeeded", username);
                eligible.insert(username.clone());
            }
            Some(record) => {
                let since_failure = now - record.recorded_at;
                if since_failure >= cooldown {
                    debug!(
                        "{}: failed with {} at {}, cooldown elapsed, retrying",
                        username, record.outcome, record.recorded_at
                    );
                    eligible.insert(username.clone());
                } else {
                    debug!(
                        "{}: failed with {} at {}, still cooling down",
                        username, record.outcome, record.recorded_at
                    );
                }
            }
        }
    }

    eligible
}
