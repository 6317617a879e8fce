//! Pacing calculator.
//!
//! Two randomized delays keep the fleet at its daily target without a
//! fixed posting rhythm:
//! - **short sleep**: between individual posts within a cycle, uniform
//!   around a configured base
//! - **long sleep**: between cycles, sized so `daily_target` cycles plus
//!   all short sleeps fill the 24h budget
//!
//! All durations are whole seconds. The long sleep rounds up so rounding
//! never pushes the fleet past the daily target.

use crate::error::{FlockrError, Result};
use rand::Rng;
use std::time::Duration;

/// Seconds in the daily budget.
pub const DAILY_BUDGET_SECS: u64 = 60 * 60 * 24;

/// Clamp range used when a short-sleep draw could reach zero or below.
pub const SHORT_SLEEP_CLAMP_MIN_SECS: u64 = 60;
pub const SHORT_SLEEP_CLAMP_MAX_SECS: u64 = 120;

/// Randomized delay before one post, uniform in `[base - jitter, base + jitter]`.
///
/// If the lower bound would be non-positive the draw falls back to the
/// documented 60-120s clamp range instead; a zero sleep defeats pacing.
pub fn short_sleep<R: Rng>(base_secs: u64, jitter_secs: u64, rng: &mut R) -> Duration {
    let (lower, upper) = if base_secs <= jitter_secs {
        (SHORT_SLEEP_CLAMP_MIN_SECS, SHORT_SLEEP_CLAMP_MAX_SECS)
    } else {
        (base_secs - jitter_secs, base_secs + jitter_secs)
    };
    Duration::from_secs(rng.random_range(lower..=upper))
}

/// Base inter-cycle delay in whole seconds, before jitter.
///
/// Reserves the short-sleep time for the whole day
/// (`short_base * daily_target * eligible_count`), then splits the
/// remaining budget across `daily_target` cycles, rounding up.
///
/// Errors instead of panicking when the inputs make the math undefined:
/// zero eligible accounts (the scheduler treats an empty fleet as its own
/// case) or a reservation that meets the whole daily budget.
pub fn long_sleep_base(daily_target: u32, eligible_count: usize, short_base_secs: u64) -> Result<u64> {
    if daily_target == 0 {
        return Err(FlockrError::Pacing("daily target is zero".to_string()));
    }
    if eligible_count == 0 {
        return Err(FlockrError::Pacing(
            "no eligible accounts; empty-fleet cycles do not pace".to_string(),
        ));
    }

    let reservation = short_base_secs * daily_target as u64 * eligible_count as u64;
    if reservation >= DAILY_BUDGET_SECS {
        return Err(FlockrError::Pacing(format!(
            "short-sleep reservation {}s exceeds daily budget of {}s",
            reservation, DAILY_BUDGET_SECS
        )));
    }

    let available = DAILY_BUDGET_SECS - reservation;
    Ok(available.div_ceil(daily_target as u64))
}

/// Randomized inter-cycle delay: the base from [`long_sleep_base`] with
/// independent uniform jitter of up to `noise_secs` either way, clamped
/// at zero.
pub fn long_sleep<R: Rng>(
    daily_target: u32,
    eligible_count: usize,
    short_base_secs: u64,
    noise_secs: u64,
    rng: &mut R,
) -> Result<Duration> {
    let base = long_sleep_base(daily_target, eligible_count, short_base_secs)?;
    let lower = base.saturating_sub(noise_secs);
    let upper = base + noise_secs;
    Ok(Duration::from_secs(rng.random_range(lower..=upper)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_short_sleep_within_bounds() {
        let mut rng = rand::rng();
        for _ in 0..200 {
            let d = short_sleep(90, 30, &mut rng).as_secs();
            assert!((60..=120).contains(&d), "out of bounds: {}", d);
        }
    }

    #[test]
    fn test_short_sleep_zero_jitter_is_exact() {
        let mut rng = rand::rng();
        assert_eq!(short_sleep(45, 0, &mut rng).as_secs(), 45);
    }

    #[test]
    fn test_short_sleep_clamps_nonpositive_lower_bound() {
        let mut rng = rand::rng();
        for _ in 0..200 {
            let d = short_sleep(10, 10, &mut rng).as_secs();
            assert!(
                (SHORT_SLEEP_CLAMP_MIN_SECS..=SHORT_SLEEP_CLAMP_MAX_SECS).contains(&d),
                "clamp not applied: {}",
                d
            );
        }
    }

    #[test]
    fn test_short_sleep_never_zero() {
        let mut rng = rand::rng();
        for _ in 0..200 {
            assert!(short_sleep(0, 100, &mut rng).as_secs() > 0);
        }
    }

    #[test]
    fn test_long_sleep_base_matches_budget_math() {
        // 10 cycles, 3 accounts, 60s short sleeps:
        // reservation = 60 * 10 * 3 = 1800, available = 84600, / 10 = 8460
        assert_eq!(long_sleep_base(10, 3, 60).unwrap(), 8460);
    }

    #[test]
    fn test_long_sleep_base_rounds_up() {
        // reservation = 10 * 7 * 1 = 70, available = 86330, / 7 = 12332.857...
        assert_eq!(long_sleep_base(7, 1, 10).unwrap(), 12333);
    }

    #[test]
    fn test_long_sleep_non_increasing_in_eligible_count() {
        let mut previous = u64::MAX;
        for eligible in 1..=10 {
            let base = long_sleep_base(20, eligible, 60).unwrap();
            assert!(base <= previous, "base grew with more eligible accounts");
            previous = base;
        }
    }

    #[test]
    fn test_long_sleep_zero_eligible_is_defined_error() {
        let err = long_sleep_base(10, 0, 60).unwrap_err();
        assert!(matches!(err, FlockrError::Pacing(_)));
    }

    #[test]
    fn test_long_sleep_zero_target_is_defined_error() {
        assert!(matches!(long_sleep_base(0, 3, 60), Err(FlockrError::Pacing(_))));
    }

    #[test]
    fn test_long_sleep_budget_exhausted_is_defined_error() {
        // 60s * 100 cycles * 20 accounts = 120000s > 86400s
        let err = long_sleep_base(100, 20, 60).unwrap_err();
        assert!(err.to_string().contains("daily budget"));
    }

    #[test]
    fn test_long_sleep_jitter_stays_in_band() {
        let mut rng = rand::rng();
        let base = long_sleep_base(10, 3, 60).unwrap();
        for _ in 0..100 {
            let d = long_sleep(10, 3, 60, 120, &mut rng).unwrap().as_secs();
            assert!(d >= base - 120 && d <= base + 120);
        }
    }

    #[test]
    fn test_long_sleep_jitter_clamps_at_zero() {
        let mut rng = rand::rng();
        // base will be small-ish; jitter larger than base must not underflow
        let base = long_sleep_base(1000, 1, 10).unwrap();
        let d = long_sleep(1000, 1, 10, base + 1000, &mut rng).unwrap();
        assert!(d.as_secs() <= base * 2 + 1000);
    }
}
