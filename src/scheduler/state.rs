//! Cycle-local scheduler state.
//!
//! Transient and scheduler-owned: reset on process restart by design.
//! Liveness survives restarts through the health store; the attempt
//! counter does not need to.

/// How a run ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunOutcome {
    /// Daily target reached
    Done,
    /// External stop signal honored
    Stopped,
}

/// What one cycle produced.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CycleResult {
    /// At least one eligible account was processed
    Posted(usize),
    /// No account was eligible; the counter does not advance
    EmptyFleet,
    /// Stop signal observed mid-cycle
    Stopped,
}

/// Counters for the current run.
#[derive(Debug, Default)]
pub struct CycleState {
    /// Cycles started, including empty and failed ones
    pub cycle_count: u64,
    /// Cycles that processed at least one eligible account
    pub attempted: u32,
    /// Daily target for this run
    pub daily_target: u32,
    /// Cycles skipped because no account was eligible
    pub empty_cycles: u64,
    /// Cycles aborted by an error at the cycle boundary
    pub failed_cycles: u64,
}

impl CycleState {
    pub fn new(daily_target: u32) -> Self {
        Self {
            daily_target,
            ..Self::default()
        }
    }

    /// Record the start of a cycle.
    pub fn begin_cycle(&mut self) {
        self.cycle_count += 1;
    }

    /// Record a cycle that processed eligible accounts.
    pub fn completed_cycle(&mut self) {
        self.attempted += 1;
    }

    /// Record a cycle with an empty eligible set.
    pub fn empty_cycle(&mut self) {
        self.empty_cycles += 1;
    }

    /// Record a cycle aborted by an error.
    pub fn failed_cycle(&mut self) {
        self.failed_cycles += 1;
    }

    /// True once the daily target is met.
    pub fn is_done(&self) -> bool {
        self.attempted >= self.daily_target
    }

    /// Cycles still needed to reach the target.
    pub fn remaining(&self) -> u32 {
        self.daily_target.saturating_sub(self.attempted)
    }
}
