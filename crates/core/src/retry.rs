//! Retry timing: exponential backoff with jitter, and a requeue policy.

use std::time::Duration;

use rand::Rng;

/// Upper bound of the random jitter added to each backoff, in milliseconds.
const MAX_JITTER_MS: u64 = 3000;

/// Exponent cap so the backoff cannot overflow.
const MAX_EXPONENT: u32 = 16;

/// Exponential backoff with jitter for the given retry count.
///
/// Computes `2^retry_count` seconds plus a uniform jitter in `[0, 3]`
/// seconds, truncated to whole seconds.
pub fn backoff_with_jitter(retry_count: u32) -> Duration {
    let jitter_ms = rand::rng().random_range(0..=MAX_JITTER_MS);
    backoff_from_jitter(retry_count, jitter_ms)
}

fn backoff_from_jitter(retry_count: u32, jitter_ms: u64) -> Duration {
    let base_ms = 1000u64 << retry_count.min(MAX_EXPONENT);
    Duration::from_secs((base_ms + jitter_ms) / 1000)
}

/// Linear delay: `base * attempt`.
pub fn linear_delay(base: Duration, attempt: u32) -> Duration {
    base * attempt
}

/// Outcome of [`RetryPolicy::decide`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RetryDecision {
    /// Requeue the work after `delay`.
    Retry { delay: Duration },
    /// Give up and hand the work to the dead-letter log.
    DeadLetter,
}

/// Bounded retry policy for background work.
#[derive(Debug, Clone, Copy)]
pub struct RetryPolicy {
    /// Number of retries allowed after the first failure.
    pub limit: u32,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self { limit: 3 }
    }
}

impl RetryPolicy {
    /// Decide what to do after the attempt numbered `retry_count` failed.
    ///
    /// `retry_count` starts at 0 for the first attempt.
    pub fn decide(&self, retry_count: u32) -> RetryDecision {
        if retry_count < self.limit {
            RetryDecision::Retry {
                delay: backoff_with_jitter(retry_count),
            }
        } else {
            RetryDecision::DeadLetter
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn backoff_without_jitter_is_power_of_two() {
        assert_eq!(backoff_from_jitter(0, 0), Duration::from_secs(1));
        assert_eq!(backoff_from_jitter(3, 0), Duration::from_secs(8));
    }

    #[test]
    fn jitter_is_truncated_to_whole_seconds() {
        assert_eq!(backoff_from_jitter(1, 2999), Duration::from_secs(4));
        assert_eq!(backoff_from_jitter(1, 3000), Duration::from_secs(5));
    }

    #[test]
    fn random_backoff_stays_in_range() {
        for retry in 0..5 {
            let delay = backoff_with_jitter(retry).as_secs();
            let base = 1u64 << retry;
            assert!(delay >= base && delay <= base + 3, "retry {retry}: {delay}");
        }
    }

    #[test]
    fn huge_retry_count_does_not_overflow() {
        let delay = backoff_from_jitter(u32::MAX, 0);
        assert_eq!(delay, Duration::from_secs(1 << MAX_EXPONENT));
    }

    #[test]
    fn policy_dead_letters_at_limit() {
        let policy = RetryPolicy { limit: 2 };
        assert!(matches!(policy.decide(0), RetryDecision::Retry { .. }));
        assert!(matches!(policy.decide(1), RetryDecision::Retry { .. }));
        assert_eq!(policy.decide(2), RetryDecision::DeadLetter);
    }

    #[test]
    fn linear_delay_scales_with_attempt() {
        assert_eq!(linear_delay(Duration::from_secs(2), 3), Duration::from_secs(6));
    }
}
