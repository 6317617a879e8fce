//! Domain types for Flockr
//!
//! This module contains all core domain types:
//! - Account: one managed posting identity, with an opaque credential bundle
//! - Roster: the immutable account set for a run, loaded once at startup
//! - Outcome: the classified result of one publish attempt
//! - HealthRecord: one append-only (account, timestamp, outcome) entry

pub mod account;
pub mod health;
pub mod outcome;

pub use account::{Account, Roster};
pub use health::HealthRecord;
pub use outcome::Outcome;
