//! Retry/backoff policy for outbound API calls.
//!
//! The original scrapers slept a fixed 10 s and retried forever. Here the
//! policy is a value the fetch client is handed: bounded attempts with an
//! exponentially growing delay, after which the failure is surfaced to
//! the caller instead of looping.

use std::time::Duration;

/// Bounded exponential backoff.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Backoff {
  /// Total attempts before giving up, including the first.
  pub max_attempts: u32,
  /// Delay after the first failed attempt.
  pub base_delay:   Duration,
  /// Delay growth factor per subsequent failure.
  pub multiplier:   u32,
}

impl Default for Backoff {
  fn default() -> Self {
    Self {
      max_attempts: 5,
      base_delay:   Duration::from_secs(1),
      multiplier:   2,
    }
  }
}

impl Backoff {
  /// Whether `failures` failed attempts exhaust the policy.
  pub fn exhausted(&self, failures: u32) -> bool {
    failures >= self.max_attempts
  }

  /// Delay to wait after the `failures`-th failed attempt (1-based).
  pub fn delay(&self, failures: u32) -> Duration {
    let exp = failures.saturating_sub(1).min(16);
    self.base_delay * self.multiplier.saturating_pow(exp)
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn delays_grow_exponentially() {
    let b = Backoff {
      max_attempts: 4,
      base_delay:   Duration::from_millis(100),
      multiplier:   2,
    };
    assert_eq!(b.delay(1), Duration::from_millis(100));
    assert_eq!(b.delay(2), Duration::from_millis(200));
    assert_eq!(b.delay(3), Duration::from_millis(400));
  }

  #[test]
  fn exhaustion_counts_all_attempts() {
    let b = Backoff { max_attempts: 3, ..Default::default() };
    assert!(!b.exhausted(2));
    assert!(b.exhausted(3));
  }
}
