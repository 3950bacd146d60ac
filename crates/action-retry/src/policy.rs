//! Retry policy value object

use crate::errors::InvalidPolicy;
use std::time::Duration;

/// How many times to retry and how long to wait in between.
///
/// Attempt `i` (from 0) that fails with `i < max_retries` is followed by a
/// sleep of `base_delay * 2^i`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    max_retries: u32,
    base_delay: Duration,
}

impl RetryPolicy {
    /// Default number of retries after the first attempt.
    pub const DEFAULT_MAX_RETRIES: u32 = 3;

    /// Default delay before the first retry.
    pub const DEFAULT_BASE_DELAY: Duration = Duration::from_millis(1000);

    pub fn new(max_retries: u32, base_delay: Duration) -> Result<Self, InvalidPolicy> {
        if base_delay.is_zero() {
            return Err(InvalidPolicy::ZeroDelay);
        }
        Ok(Self {
            max_retries,
            base_delay,
        })
    }

    /// Convenience constructor for millisecond configuration values.
    pub fn from_millis(max_retries: u32, base_delay_ms: u64) -> Result<Self, InvalidPolicy> {
        Self::new(max_retries, Duration::from_millis(base_delay_ms))
    }

    pub fn max_retries(&self) -> u32 {
        self.max_retries
    }

    pub fn base_delay(&self) -> Duration {
        self.base_delay
    }

    /// Total attempts including the first one.
    pub fn attempts(&self) -> u64 {
        u64::from(self.max_retries) + 1
    }

    /// Sleep after failed attempt `attempt` (0-based). Saturates on overflow.
    pub fn delay_for(&self, attempt: u32) -> Duration {
        (0..attempt)
            .try_fold(self.base_delay, |delay, _| delay.checked_mul(2))
            .unwrap_or(Duration::MAX)
    }

    /// Sum of every sleep taken when all attempts fail.
    pub fn total_backoff(&self) -> Duration {
        (0..self.max_retries).fold(Duration::ZERO, |acc, i| {
            acc.saturating_add(self.delay_for(i))
        })
    }
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_retries: Self::DEFAULT_MAX_RETRIES,
            base_delay: Self::DEFAULT_BASE_DELAY,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_policy() {
        let policy = RetryPolicy::default();
        assert_eq!(policy.max_retries(), 3);
        assert_eq!(policy.base_delay(), Duration::from_millis(1000));
        assert_eq!(policy.attempts(), 4);
    }

    #[test]
    fn test_zero_delay_rejected() {
        assert_eq!(
            RetryPolicy::new(3, Duration::ZERO).unwrap_err(),
            InvalidPolicy::ZeroDelay
        );
        assert!(RetryPolicy::from_millis(0, 1).is_ok());
    }

    #[test]
    fn test_delay_schedule() {
        let policy = RetryPolicy::from_millis(3, 10).unwrap();
        assert_eq!(policy.delay_for(0), Duration::from_millis(10));
        assert_eq!(policy.delay_for(1), Duration::from_millis(20));
        assert_eq!(policy.delay_for(2), Duration::from_millis(40));
        assert_eq!(policy.total_backoff(), Duration::from_millis(70));
    }

    #[test]
    fn test_delay_saturates() {
        let policy = RetryPolicy::from_millis(u32::MAX, 1000).unwrap();
        assert_eq!(policy.delay_for(10), Duration::from_secs(1024));
        assert_eq!(policy.delay_for(64), Duration::MAX);
        assert_eq!(policy.delay_for(200), Duration::MAX);
    }

    #[test]
    fn test_no_retries_no_backoff() {
        let policy = RetryPolicy::from_millis(0, 500).unwrap();
        assert_eq!(policy.attempts(), 1);
        assert_eq!(policy.total_backoff(), Duration::ZERO);
    }
}
