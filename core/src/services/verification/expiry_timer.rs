//! Code validity window, checked by cooperative polling

use chrono::{DateTime, Duration, Utc};

/// Longest validity window a code may be given, one day
pub const MAX_CODE_VALIDITY_SECONDS: u64 = 86_400;

/// Detects when the current code has outlived its validity window
///
/// The timer is polled on a fixed interval rather than armed as an exact
/// deadline, so expiry is noticed up to one interval late.
#[derive(Debug, Clone, Copy)]
pub struct SessionExpiryTimer {
    validity: Duration,
    poll_interval: std::time::Duration,
}

impl SessionExpiryTimer {
    /// Windows longer than [`MAX_CODE_VALIDITY_SECONDS`] are clamped to it
    pub fn new(validity_seconds: u64, poll_interval_ms: u64) -> Self {
        let seconds = validity_seconds.min(MAX_CODE_VALIDITY_SECONDS);
        Self {
            validity: Duration::seconds(i64::try_from(seconds).unwrap_or(i64::MAX)),
            poll_interval: std::time::Duration::from_millis(poll_interval_ms),
        }
    }

    /// How often the owner should call [`SessionExpiryTimer::is_expired`]
    pub fn poll_interval(&self) -> std::time::Duration {
        self.poll_interval
    }

    /// Whether a code sent at `code_sent_at` is no longer valid at `now`
    pub fn is_expired(&self, code_sent_at: DateTime<Utc>, now: DateTime<Utc>) -> bool {
        now - code_sent_at >= self.validity
    }

    /// Whole seconds of validity left, zero once expired
    pub fn remaining_seconds(&self, code_sent_at: DateTime<Utc>, now: DateTime<Utc>) -> u64 {
        (self.validity - (now - code_sent_at)).num_seconds().max(0) as u64
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_expires_at_validity_boundary() {
        let timer = SessionExpiryTimer::new(600, 1000);
        let sent = Utc::now();

        assert!(!timer.is_expired(sent, sent + Duration::seconds(599)));
        assert!(timer.is_expired(sent, sent + Duration::seconds(600)));
        assert!(timer.is_expired(sent, sent + Duration::seconds(601)));
    }

    #[test]
    fn test_remaining_seconds() {
        let timer = SessionExpiryTimer::new(600, 1000);
        let sent = Utc::now();

        assert_eq!(timer.remaining_seconds(sent, sent), 600);
        assert_eq!(timer.remaining_seconds(sent, sent + Duration::seconds(590)), 10);
        assert_eq!(timer.remaining_seconds(sent, sent + Duration::seconds(700)), 0);
        assert_eq!(timer.poll_interval(), std::time::Duration::from_secs(1));
    }

    #[test]
    fn test_oversized_window_is_clamped() {
        let timer = SessionExpiryTimer::new(u64::MAX, 1000);
        let sent = Utc::now();

        assert!(!timer.is_expired(sent, sent));
        assert_eq!(timer.remaining_seconds(sent, sent), MAX_CODE_VALIDITY_SECONDS);
    }
}
