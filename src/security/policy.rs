//! Windowed throttle arithmetic.
//!
//! Pure read-side computation: the repository counts ledger rows newer than
//! `window_start` (strictly greater, so the window is half-open on the old
//! side) and this policy turns the count into an allow/deny decision. No
//! log entry is ever written from here.

use chrono::{DateTime, Duration, Utc};

#[derive(Debug, Clone, Copy)]
pub struct ThrottlePolicy {
    pub max_attempts: u64,
    pub window_minutes: u64,
}

impl ThrottlePolicy {
    #[must_use]
    pub const fn new(max_attempts: u64, window_minutes: u64) -> Self {
        Self {
            max_attempts,
            window_minutes,
        }
    }

    /// Start of the trailing window ending at `now`.
    #[must_use]
    pub fn window_start(&self, now: DateTime<Utc>) -> DateTime<Utc> {
        now - Duration::minutes(i64::try_from(self.window_minutes).unwrap_or(i64::MAX))
    }

    /// Whether a caller with `attempts` ledger rows inside the window is
    /// limited. Reaching the threshold limits the next attempt.
    #[must_use]
    pub const fn is_limited(&self, attempts: u64) -> bool {
        attempts >= self.max_attempts
    }
}

impl From<&crate::config::ThrottleConfig> for ThrottlePolicy {
    fn from(config: &crate::config::ThrottleConfig) -> Self {
        Self::new(config.max_attempts, config.window_minutes)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_threshold_comparison() {
        let policy = ThrottlePolicy::new(5, 30);

        assert!(!policy.is_limited(0));
        assert!(!policy.is_limited(4));
        assert!(policy.is_limited(5));
        assert!(policy.is_limited(6));
    }

    #[test]
    fn test_window_start() {
        let policy = ThrottlePolicy::new(5, 30);
        let now = Utc.with_ymd_and_hms(2026, 3, 1, 12, 0, 0).unwrap();

        let start = policy.window_start(now);
        assert_eq!(start, Utc.with_ymd_and_hms(2026, 3, 1, 11, 30, 0).unwrap());
    }
}
