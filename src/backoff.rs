//! # Binary Backoff
//!
//! Delay calculation for step retries after an error.
//!
//! ## Overview
//!
//! The delay for exponent `n` is `min_delay * 2^n`, capped at `max_delay`. The
//! calculation is done in `u64` with checked arithmetic: once the doubling no
//! longer fits, the result is the cap. This keeps the sequence monotonic with a
//! flat plateau at `max_delay` for every larger exponent, no matter how large.
//!
//! Settings call this with `retry_count + 1`, so the first retry already waits
//! twice the minimum.

use chrono::{DateTime, Duration, Utc};
use serde::Serialize;

/// Compute `min(min_delay * 2^exponent, max_delay)` without overflow.
///
/// # Examples
///
/// ```rust
/// use workflow_settings::backoff::binary_backoff_delay;
///
/// assert_eq!(binary_backoff_delay(0, 1000, 60_000), 1000);
/// assert_eq!(binary_backoff_delay(1, 1000, 60_000), 2000);
/// assert_eq!(binary_backoff_delay(6, 1000, 60_000), 60_000);
/// assert_eq!(binary_backoff_delay(200, 1000, 60_000), 60_000);
/// ```
pub fn binary_backoff_delay(exponent: u32, min_delay: u64, max_delay: u64) -> u64 {
    1u64.checked_shl(exponent)
        .and_then(|factor| min_delay.checked_mul(factor))
        .map_or(max_delay, |delay| delay.min(max_delay))
}

/// Add a millisecond delay to a timestamp, saturating at the latest representable instant
pub fn deadline_after(now: DateTime<Utc>, delay_ms: u64) -> DateTime<Utc> {
    let delay = Duration::milliseconds(i64::try_from(delay_ms).unwrap_or(i64::MAX));
    now.checked_add_signed(delay)
        .unwrap_or(DateTime::<Utc>::MAX_UTC)
}

/// Floor and ceiling for error backoff, in milliseconds
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct BinaryBackoff {
    pub min_delay_ms: u64,
    pub max_delay_ms: u64,
}

impl BinaryBackoff {
    pub fn new(min_delay_ms: u64, max_delay_ms: u64) -> Self {
        Self {
            min_delay_ms,
            max_delay_ms,
        }
    }

    /// Delay before the next attempt after `retry_count` failed retries
    pub fn delay_for_retry(&self, retry_count: u32) -> u64 {
        binary_backoff_delay(
            retry_count.saturating_add(1),
            self.min_delay_ms,
            self.max_delay_ms,
        )
    }

    /// Absolute time of the next attempt, measured from `now`
    pub fn next_activation(&self, now: DateTime<Utc>, retry_count: u32) -> DateTime<Utc> {
        deadline_after(now, self.delay_for_retry(retry_count))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_exponent_zero_returns_min() {
        assert_eq!(binary_backoff_delay(0, 1000, 1_000_000), 1000);
    }

    #[test]
    fn test_first_retry_doubles_min() {
        let backoff = BinaryBackoff::new(1000, 1_000_000);
        assert_eq!(backoff.delay_for_retry(0), 2000);
        assert_eq!(backoff.delay_for_retry(1), 4000);
        assert_eq!(backoff.delay_for_retry(2), 8000);
    }

    #[test]
    fn test_plateau_at_max() {
        let backoff = BinaryBackoff::new(1000, 1_000_000);
        // 1000 * 2^10 = 1_024_000 > max
        assert_eq!(backoff.delay_for_retry(9), 1_000_000);
        for retry_count in 9..=200 {
            assert_eq!(backoff.delay_for_retry(retry_count), 1_000_000);
        }
    }

    #[test]
    fn test_overflow_clamps_to_max() {
        // 2^63 fits but the product does not
        assert_eq!(binary_backoff_delay(63, 3, u64::MAX - 1), u64::MAX - 1);
        // 2^64 does not fit
        assert_eq!(binary_backoff_delay(64, 1, 500), 500);
        assert_eq!(binary_backoff_delay(u32::MAX, 1, 500), 500);
    }

    #[test]
    fn test_retry_count_saturates() {
        let backoff = BinaryBackoff::new(60_000, 86_400_000);
        assert_eq!(backoff.delay_for_retry(u32::MAX), 86_400_000);
    }

    #[test]
    fn test_zero_min_stays_zero() {
        assert_eq!(binary_backoff_delay(5, 0, 1000), 0);
    }

    #[test]
    fn test_next_activation_adds_delay() {
        let now = Utc.with_ymd_and_hms(2014, 10, 22, 20, 44, 0).unwrap();
        let backoff = BinaryBackoff::new(1000, 1_000_000);

        let activation = backoff.next_activation(now, 0);
        assert_eq!((activation - now).num_milliseconds(), 2000);
    }

    #[test]
    fn test_deadline_after_saturates() {
        let now = Utc.with_ymd_and_hms(2014, 10, 22, 20, 44, 0).unwrap();
        assert_eq!(deadline_after(now, u64::MAX), DateTime::<Utc>::MAX_UTC);
    }
}
