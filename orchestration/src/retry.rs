//! Exponential backoff policy for retries on a single chain entry.
//!
//! No delay before the first attempt; doubling (by default) between retries,
//! bounded by a ceiling. Jitter is deterministic so tests stay reproducible.

use std::time::Duration;

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RetryPolicy {
    pub initial_delay_ms: u64,
    pub max_delay_ms: u64,
    pub backoff_multiplier: f64,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            initial_delay_ms: 500,
            max_delay_ms: 30_000,
            backoff_multiplier: 2.0,
        }
    }
}

impl RetryPolicy {
    /// Policy with zero delays, for tests.
    pub fn immediate() -> Self {
        Self {
            initial_delay_ms: 0,
            max_delay_ms: 0,
            backoff_multiplier: 1.0,
        }
    }

    /// Delay to sleep before retry number `attempt` (0-based: the delay
    /// between the first attempt and the second).
    pub fn delay_for(&self, attempt: u32) -> Duration {
        let base = self.initial_delay_ms as f64 * self.backoff_multiplier.powi(attempt as i32);
        let jitter = (base * 0.1 * deterministic_jitter(attempt)) as u64;
        let delay = (base as u64).saturating_add(jitter).min(self.max_delay_ms);
        Duration::from_millis(delay)
    }
}

/// Pseudo-random jitter in [0, 1) derived from the attempt number.
fn deterministic_jitter(attempt: u32) -> f64 {
    let x = attempt.wrapping_mul(2_654_435_761);
    (x % 100) as f64 / 100.0
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn no_delay_when_immediate() {
        let policy = RetryPolicy::immediate();
        assert_eq!(policy.delay_for(0), Duration::ZERO);
        assert_eq!(policy.delay_for(5), Duration::ZERO);
    }

    #[test]
    fn delay_grows_with_attempts() {
        let policy = RetryPolicy::default();
        assert!(policy.delay_for(1) > policy.delay_for(0));
        assert!(policy.delay_for(2) > policy.delay_for(1));
    }

    #[test]
    fn delay_respects_ceiling() {
        let policy = RetryPolicy {
            initial_delay_ms: 500,
            max_delay_ms: 2_000,
            backoff_multiplier: 10.0,
        };
        assert!(policy.delay_for(6) <= Duration::from_millis(2_000));
    }

    #[test]
    fn jitter_is_deterministic() {
        let policy = RetryPolicy::default();
        assert_eq!(policy.delay_for(3), policy.delay_for(3));
    }
}
