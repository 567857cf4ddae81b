//! Refresh Policy
//!
//! Decides when a held token is too close to expiry to use.

use chrono::{DateTime, Utc};
use std::time::Duration;

use crate::types::{TokenState, DEFAULT_REFRESH_THRESHOLD};

/// Proactive refresh rule.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RefreshPolicy {
    threshold: Duration,
}

impl RefreshPolicy {
    pub fn new(threshold: Duration) -> Self {
        Self { threshold }
    }

    pub fn threshold(&self) -> Duration {
        self.threshold
    }

    /// Check if `state` must be replaced before use at `now`.
    ///
    /// True when the remaining lifetime is strictly below the threshold. Tokens
    /// without a reported lifetime are never refreshed.
    pub fn needs_refresh(&self, state: &TokenState, now: DateTime<Utc>) -> bool {
        let threshold_ms = i64::try_from(self.threshold.as_millis()).unwrap_or(i64::MAX);
        state
            .remaining(now)
            .map(|remaining| remaining.num_milliseconds() < threshold_ms)
            .unwrap_or(false)
    }
}

impl Default for RefreshPolicy {
    fn default() -> Self {
        Self::new(DEFAULT_REFRESH_THRESHOLD)
    }
}
