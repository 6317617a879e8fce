//! Cycle-boundary backoff policy.
//!
//! Any error escaping a single cycle costs one fixed cooldown before the
//! next attempt. The cooldown is deliberately short relative to the
//! long-pacing sleep: a fault must not also consume a cycle's worth of
//! pacing budget. Consecutive failures are tracked for log context only;
//! the delay does not grow.

use std::time::{Duration, Instant};

/// Fixed-cooldown policy applied when a cycle fails.
#[derive(Debug)]
pub struct CycleBackoff {
    /// Cooldown applied after each failed cycle.
    cooldown: Duration,
    /// Consecutive failed cycles since the last clean one.
    pub consecutive_failures: u32,
    /// Last clean cycle time.
    pub last_success: Option<Instant>,
}

impl CycleBackoff {
    pub fn new(cooldown: Duration) -> Self {
        Self {
            cooldown,
            consecutive_failures: 0,
            last_success: None,
        }
    }

    /// Record a failed cycle and return the cooldown to sleep.
    pub fn record_failure(&mut self) -> Duration {
        self.consecutive_failures += 1;
        tracing::warn!(
            consecutive_failures = self.consecutive_failures,
            cooldown_secs = self.cooldown.as_secs(),
            "Cycle failed, cooling down before retry"
        );
        self.cooldown
    }

    /// Record a clean cycle, resetting the failure streak.
    pub fn record_success(&mut self) {
        self.consecutive_failures = 0;
        self.last_success = Some(Instant::now());
    }

    /// The configured cooldown.
    pub fn cooldown(&self) -> Duration {
        self.cooldown
    }
}

impl Default for CycleBackoff {
    fn default() -> Self {
        Self::new(Duration::from_secs(60))
    }
}
