//! Retry policy for task execution.

use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Bounded retry budget for a single `run_sequential_tasks` call.
///
/// The policy is an explicit parameter of each run (there is no
/// process-global policy), so different callers can carry different
/// budgets without interfering with each other.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RetryPolicy {
    /// Number of retries after the first attempt. A task is attempted at
    /// most `max_retries + 1` times in total.
    pub max_retries: u32,
    /// Whole seconds to sleep between attempts
    pub interval_secs: u64,
}

impl RetryPolicy {
    /// Creates a retry policy.
    pub fn new(max_retries: u32, interval_secs: u64) -> Self {
        Self {
            max_retries,
            interval_secs,
        }
    }

    /// A policy that never retries.
    pub fn none() -> Self {
        Self::new(0, 0)
    }

    /// Maximum total attempts per task (`max_retries + 1`).
    pub fn max_attempts(&self) -> u32 {
        self.max_retries + 1
    }

    /// The sleep interval between attempts.
    pub fn interval(&self) -> Duration {
        Duration::from_secs(self.interval_secs)
    }
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self::new(2, 5)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_max_attempts() {
        assert_eq!(RetryPolicy::none().max_attempts(), 1);
        assert_eq!(RetryPolicy::new(3, 1).max_attempts(), 4);
    }

    #[test]
    fn test_toml_round_trip() {
        let policy = RetryPolicy::new(1, 30);
        let encoded = toml::to_string(&policy).unwrap();
        let decoded: RetryPolicy = toml::from_str(&encoded).unwrap();
        assert_eq!(policy, decoded);
    }
}
