//! Exponential backoff between failed refreshes.

use std::time::Duration;

/// Tracks consecutive failures and yields the delay before the next attempt.
///
/// The `n`-th consecutive failure waits `initial * multiplier^(n-1)`, capped
/// at `max`. A success resets the sequence.
#[derive(Debug, Clone)]
pub struct Backoff {
    initial: Duration,
    max: Duration,
    multiplier: f64,
    failures: u32,
}

impl Backoff {
    /// Creates a backoff with no recorded failures.
    pub const fn new(initial: Duration, max: Duration, multiplier: f64) -> Self {
        Self {
            initial,
            max,
            multiplier,
            failures: 0,
        }
    }

    /// Records a failure and returns how long to wait before retrying.
    pub fn next_delay(&mut self) -> Duration {
        self.failures = self.failures.saturating_add(1);
        let exponent = i32::try_from(self.failures - 1).unwrap_or(i32::MAX);
        let seconds = self.initial.as_secs_f64() * self.multiplier.powi(exponent);

        if seconds.is_nan() || seconds < 0.0 || seconds >= self.max.as_secs_f64() {
            return self.max;
        }
        Duration::try_from_secs_f64(seconds).map_or(self.max, |delay| delay.min(self.max))
    }

    /// Forgets all failures.
    pub fn reset(&mut self) {
        self.failures = 0;
    }

    /// Consecutive failures since the last reset.
    pub const fn failures(&self) -> u32 {
        self.failures
    }
}
