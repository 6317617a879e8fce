//! Flockr - fleet posting scheduler
//!
//! Flockr keeps a fleet of posting accounts at a daily throughput target
//! while skipping rate-limited or dead accounts, spacing posts with
//! randomized delays, and surviving per-account failures without halting
//! the run. Content acquisition and the actual publish call are
//! replaceable collaborators behind traits; the crate owns the
//! scheduling, liveness, pacing, and health persistence.

pub mod config;
pub mod domain;
pub mod error;
pub mod liveness;
pub mod pacing;
pub mod publish;
pub mod scheduler;
pub mod store;

pub use error::{FlockrError, Result};
