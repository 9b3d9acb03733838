//! Retry policy for transient failures.
//!
//! RestV1 uses a single knob for both the per-attempt deadline and the pause
//! between attempts: a retryable failure that asks to wait sleeps for exactly
//! one timeout duration. A timeout never waits on top of itself.

use std::time::Duration;

/// What the call loop does after a failed attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Disposition {
    /// Stop and hand the error to the caller.
    Fail,

    /// Try again, optionally sleeping one timeout duration first.
    Retry {
        /// Whether to sleep before the next attempt.
        wait: bool,
    },
}

impl Disposition {
    /// Returns `true` for [`Disposition::Retry`].
    pub fn is_retry(&self) -> bool {
        matches!(self, Disposition::Retry { .. })
    }
}

/// Bounded retry budget shared by every call made through a client.
///
/// # Examples
///
/// ```
/// use restv1::retry::{Disposition, RetryPolicy};
/// use std::time::Duration;
///
/// let policy = RetryPolicy::new(3, Duration::from_secs(5));
///
/// // 5xx and connection failures wait one timeout
/// assert_eq!(
///     policy.delay_after(1, Disposition::Retry { wait: true }),
///     Some(Duration::from_secs(5))
/// );
/// // Timeouts go again right away
/// assert_eq!(
///     policy.delay_after(1, Disposition::Retry { wait: false }),
///     Some(Duration::ZERO)
/// );
/// // Budget exhausted
/// assert_eq!(policy.delay_after(3, Disposition::Retry { wait: true }), None);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    attempts: usize,
    delay: Duration,
}

impl RetryPolicy {
    /// Creates a policy allowing `attempts` tries per call, waiting `delay`
    /// between them when the failure asks for it.
    pub fn new(attempts: usize, delay: Duration) -> Self {
        Self { attempts, delay }
    }

    /// Maximum number of attempts per call.
    pub fn attempts(&self) -> usize {
        self.attempts
    }

    /// Pause inserted before retrying a failure that asks to wait.
    pub fn delay(&self) -> Duration {
        self.delay
    }

    /// Returns the delay before the attempt following `attempt` (1-indexed),
    /// or `None` if the call should stop with the current error.
    pub fn delay_after(&self, attempt: usize, disposition: Disposition) -> Option<Duration> {
        match disposition {
            Disposition::Fail => None,
            Disposition::Retry { .. } if attempt >= self.attempts => None,
            Disposition::Retry { wait: true } => Some(self.delay),
            Disposition::Retry { wait: false } => Some(Duration::ZERO),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_terminal_never_retries() {
        let policy = RetryPolicy::new(5, Duration::from_secs(1));
        assert_eq!(policy.delay_after(1, Disposition::Fail), None);
    }

    #[test]
    fn test_waits_full_delay_until_budget_spent() {
        let policy = RetryPolicy::new(3, Duration::from_millis(250));
        let wait = Disposition::Retry { wait: true };

        assert_eq!(policy.delay_after(1, wait), Some(Duration::from_millis(250)));
        assert_eq!(policy.delay_after(2, wait), Some(Duration::from_millis(250)));
        assert_eq!(policy.delay_after(3, wait), None);
    }

    #[test]
    fn test_single_attempt_budget() {
        let policy = RetryPolicy::new(1, Duration::from_secs(1));
        assert_eq!(policy.delay_after(1, Disposition::Retry { wait: false }), None);
        assert_eq!(policy.delay_after(1, Disposition::Retry { wait: true }), None);
    }

    #[test]
    fn test_no_wait_retry() {
        let policy = RetryPolicy::new(2, Duration::from_secs(1));
        assert_eq!(
            policy.delay_after(1, Disposition::Retry { wait: false }),
            Some(Duration::ZERO)
        );
    }
}
