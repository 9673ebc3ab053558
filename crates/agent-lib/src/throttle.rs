//! Notification rate limiting
//!
//! At most one outbound alert per cooldown interval, no matter how many
//! cycles the storm signal stays true. Suppressed signals are dropped, never
//! queued. The check/record split mirrors how dispatch works: `check` gates,
//! and `mark_sent` is called only once the transport has accepted the send,
//! so a failed dispatch does not consume the cooldown.

use chrono::{DateTime, Duration, Utc};

/// Default minimum gap between two dispatched notifications
const DEFAULT_COOLDOWN_SECS: i64 = 600;

/// How far in the past the throttle pretends its last send happened at
/// startup, so the first genuine storm signal fires without waiting.
const COLD_START_BACKDATE_SECS: i64 = 3600;

/// Outcome of a throttle check
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ThrottleDecision {
    /// Cooldown elapsed; the caller may dispatch
    Send,
    /// Within cooldown; the signal is dropped
    Suppressed { elapsed_secs: i64 },
}

/// Rate limiter for outbound storm notifications
#[derive(Debug, Clone)]
pub struct NotificationThrottle {
    cooldown: Duration,
    last_sent: DateTime<Utc>,
}

impl NotificationThrottle {
    /// Create a throttle whose cold-start state allows an immediate send
    pub fn new(now: DateTime<Utc>) -> Self {
        Self {
            cooldown: Duration::seconds(DEFAULT_COOLDOWN_SECS),
            last_sent: now - Duration::seconds(COLD_START_BACKDATE_SECS),
        }
    }

    /// Set a custom cooldown interval
    pub fn with_cooldown(mut self, cooldown: Duration) -> Self {
        self.cooldown = cooldown;
        self
    }

    /// Decide whether a notification may be dispatched at `now`
    pub fn check(&self, now: DateTime<Utc>) -> ThrottleDecision {
        let elapsed = now - self.last_sent;
        if elapsed > self.cooldown {
            ThrottleDecision::Send
        } else {
            ThrottleDecision::Suppressed {
                elapsed_secs: elapsed.num_seconds(),
            }
        }
    }

    /// Record a confirmed dispatch
    pub fn mark_sent(&mut self, now: DateTime<Utc>) {
        self.last_sent = now;
    }

    pub fn cooldown(&self) -> Duration {
        self.cooldown
    }
}
