//! Cycle scheduler - the fleet control loop.
//!
//! One cycle: snapshot latest health, classify eligibility, shuffle the
//! eligible accounts, fetch one content candidate, then per account sleep
//! the short-pacing delay, publish, and record the outcome. After a full
//! pass the attempt counter advances and the long-pacing sleep runs. The
//! run ends when the counter reaches the daily target (`Done`) or a stop
//! signal arrives (`Stopped`).
//!
//! Accounts within a cycle are processed sequentially on purpose: posts
//! are paced with sleeps between them, and parallelism would defeat that.
//!
//! Failure containment:
//! - API-level publish failures are Outcomes, recorded and consulted by
//!   the classifier next cycle
//! - persistence failures degrade to a session-local in-memory view and
//!   posting continues
//! - anything else escaping a cycle is caught here, logged, and followed
//!   by the fixed backoff cooldown; the counter does not advance

mod backoff;
mod state;

pub use backoff::CycleBackoff;
pub use state::{CycleResult, CycleState, RunOutcome};

use crate::domain::{HealthRecord, Roster};
use crate::error::Result;
use crate::liveness::eligible_accounts;
use crate::pacing;
use crate::publish::{ContentSource, Publisher};
use crate::store::{HealthStore, MemoryHealthStore};
use chrono::Utc;
use log::{error, info, warn};
use rand::seq::SliceRandom;
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::watch;

/// Runtime knobs for one run, constructed at startup and never mutated.
#[derive(Debug, Clone)]
pub struct SchedulerConfig {
    /// Posting cycles to complete before the run is Done
    pub daily_target: u32,
    /// Base short-pacing delay between posts, seconds
    pub short_sleep_secs: u64,
    /// Half-width of the short-pacing jitter, seconds
    pub short_sleep_noise_secs: u64,
    /// Half-width of the long-pacing jitter, seconds
    pub long_sleep_noise_secs: u64,
    /// Minimum elapsed time before re-checking a failed account
    pub liveness_cooldown: chrono::Duration,
    /// Fallback sleep when no account is eligible
    pub empty_fleet_retry: Duration,
    /// Fixed cooldown after a failed cycle
    pub cycle_error_cooldown: Duration,
}

/// The fleet control loop.
pub struct Scheduler {
    config: SchedulerConfig,
    roster: Roster,
    store: Arc<dyn HealthStore>,
    content: Arc<dyn ContentSource>,
    publisher: Arc<dyn Publisher>,
    stop: watch::Receiver<bool>,
    /// Session-local outcomes, the fallback view when the store is down
    session: MemoryHealthStore,
    state: CycleState,
    backoff: CycleBackoff,
}

impl Scheduler {
    pub fn new(
        config: SchedulerConfig,
        roster: Roster,
        store: Arc<dyn HealthStore>,
        content: Arc<dyn ContentSource>,
        publisher: Arc<dyn Publisher>,
        stop: watch::Receiver<bool>,
    ) -> Self {
        let state = CycleState::new(config.daily_target);
        let backoff = CycleBackoff::new(config.cycle_error_cooldown);
        Self {
            config,
            roster,
            store,
            content,
            publisher,
            stop,
            session: MemoryHealthStore::new(),
            state,
            backoff,
        }
    }

    /// Counters for the current run.
    pub fn state(&self) -> &CycleState {
        &self.state
    }

    /// Run cycles until the daily target is met or a stop arrives.
    ///
    /// Errors never escape a cycle: each one is logged, costs the fixed
    /// backoff cooldown, and the loop continues. The scheduler is built
    /// to run unattended for a full day.
    pub async fn run(&mut self) -> RunOutcome {
        info!(
            "Scheduler starting: {} accounts, daily target {}",
            self.roster.len(),
            self.config.daily_target
        );

        loop {
            if *self.stop.borrow() {
                info!("Stop requested, ending run");
                return RunOutcome::Stopped;
            }
            if self.state.is_done() {
                info!(
                    "Daily target met: {} cycles attempted ({} empty, {} failed along the way)",
                    self.state.attempted, self.state.empty_cycles, self.state.failed_cycles
                );
                return RunOutcome::Done;
            }

            self.state.begin_cycle();
            let cycle = self.state.cycle_count;

            match self.run_cycle().await {
                Ok(CycleResult::Posted(count)) => {
                    self.backoff.record_success();
                    info!(
                        "Cycle {} posted from {} accounts ({}/{} toward target)",
                        cycle, count, self.state.attempted, self.config.daily_target
                    );
                }
                Ok(CycleResult::EmptyFleet) => {
                    self.state.empty_cycle();
                    warn!(
                        "Cycle {}: no eligible accounts, retrying in {}s",
                        cycle,
                        self.config.empty_fleet_retry.as_secs()
                    );
                    if !wait_or_stop(&mut self.stop, self.config.empty_fleet_retry).await {
                        return RunOutcome::Stopped;
                    }
                }
                Ok(CycleResult::Stopped) => {
                    info!("Stop requested mid-cycle {}, ending run", cycle);
                    return RunOutcome::Stopped;
                }
                Err(e) => {
                    self.state.failed_cycle();
                    error!("Cycle {} failed: {}", cycle, e);
                    let cooldown = self.backoff.record_failure();
                    if !wait_or_stop(&mut self.stop, cooldown).await {
                        return RunOutcome::Stopped;
                    }
                }
            }
        }
    }

    /// One pass over the eligible fleet.
    async fn run_cycle(&mut self) -> Result<CycleResult> {
        let latest = self.latest_health();
        let usernames = self.roster.usernames();
        let eligible = eligible_accounts(&usernames, &latest, Utc::now(), self.config.liveness_cooldown);

        if eligible.is_empty() {
            return Ok(CycleResult::EmptyFleet);
        }

        // Random order each cycle so no account always posts first
        let mut order: Vec<String> = eligible.into_iter().collect();
        order.shuffle(&mut rand::rng());
        info!("Cycle order: {:?}", order);

        let content = self.content.fetch_candidate().await?;

        for username in &order {
            if *self.stop.borrow() {
                return Ok(CycleResult::Stopped);
            }

            let delay = pacing::short_sleep(
                self.config.short_sleep_secs,
                self.config.short_sleep_noise_secs,
                &mut rand::rng(),
            );
            info!("Short sleep {}s before {} posts", delay.as_secs(), username);
            if !wait_or_stop(&mut self.stop, delay).await {
                return Ok(CycleResult::Stopped);
            }

            let account = match self.roster.get(username) {
                Some(account) => account.clone(),
                None => {
                    // Classifier only sees roster names; this cannot happen
                    warn!("Eligible account {} missing from roster, skipping", username);
                    continue;
                }
            };

            // Transport faults propagate and abort the cycle at the boundary
            let outcome = self.publisher.publish(&account, &content).await?;
            info!("{} publish outcome: {}", username, outcome);
            self.record_outcome(HealthRecord::now(username.clone(), outcome));
        }

        self.state.completed_cycle();
        if self.state.is_done() {
            return Ok(CycleResult::Posted(order.len()));
        }

        let long = pacing::long_sleep(
            self.config.daily_target,
            order.len(),
            self.config.short_sleep_secs,
            self.config.long_sleep_noise_secs,
            &mut rand::rng(),
        )?;
        info!("Long sleep {}s after cycle", long.as_secs());
        if !wait_or_stop(&mut self.stop, long).await {
            return Ok(CycleResult::Stopped);
        }

        Ok(CycleResult::Posted(order.len()))
    }

    /// Latest record per account: the durable store's snapshot overlaid
    /// with this session's outcomes, or the session view alone if the
    /// store is unreachable. A store outage must not stop posting.
    fn latest_health(&self) -> HashMap<String, HealthRecord> {
        let session_view = self.session.latest_by_account().unwrap_or_default();

        match self.store.latest_by_account() {
            Ok(mut latest) => {
                for (username, record) in session_view {
                    match latest.get(&username) {
                        Some(existing) if existing.recorded_at > record.recorded_at => {}
                        _ => {
                            latest.insert(username, record);
                        }
                    }
                }
                latest
            }
            Err(e) => {
                warn!(
                    "Health store read failed ({}), deciding liveness from session view this cycle",
                    e
                );
                session_view
            }
        }
    }

    /// Append an outcome. A failed durable write is reported and the
    /// cycle proceeds; the session view keeps liveness roughly accurate.
    fn record_outcome(&mut self, record: HealthRecord) {
        if let Err(e) = self.session.record(&record) {
            warn!("Session health write failed: {}", e);
        }
        if let Err(e) = self.store.record(&record) {
            warn!(
                "Health write for {} failed ({}), continuing with degraded liveness accuracy",
                record.username, e
            );
        }
    }
}

/// Interruptible sleep: false means a stop arrived before the delay ran out.
///
/// One sleep future for the whole wait, so channel activity (including the
/// sender dropping) never restarts the clock.
async fn wait_or_stop(stop: &mut watch::Receiver<bool>, duration: Duration) -> bool {
    if *stop.borrow() {
        return false;
    }
    let sleep = tokio::time::sleep(duration);
    tokio::pin!(sleep);
    loop {
        tokio::select! {
            _ = &mut sleep => return true,
            changed = stop.changed() => {
                match changed {
                    Ok(()) if *stop.borrow() => return false,
                    // Value unchanged or reset: keep waiting on the same sleep
                    Ok(()) => {}
                    Err(_) => {
                        // Sender gone: a stop can no longer arrive
                        sleep.as_mut().await;
                        return true;
                    }
                }
            }
        }
    }
}
