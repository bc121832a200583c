/*
[INPUT]:  Consecutive failure count of a stream session
[OUTPUT]: Delay before the next connect attempt, idle limit of a live connection
[POS]:    WebSocket layer - reconnect backoff policy
[UPDATE]: When changing reconnect pacing or dead-connection detection
*/

use std::time::Duration;

const DEFAULT_INITIAL_BACKOFF: Duration = Duration::from_secs(1);
const DEFAULT_MAX_BACKOFF: Duration = Duration::from_secs(30);
/// Server pings arrive every ~10s; two missed keepalive windows mean a dead link.
const DEFAULT_IDLE_TIMEOUT: Duration = Duration::from_secs(40);

/// Exponential reconnect backoff. Attempts are unbounded; only the delay is capped.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReconnectPolicy {
    /// Delay before the first retry
    pub initial_backoff: Duration,
    /// Upper bound for the doubling delay
    pub max_backoff: Duration,
    /// Longest silence tolerated on a live connection before it is dropped
    pub idle_timeout: Duration,
}

impl ReconnectPolicy {
    pub fn new(initial_backoff: Duration, max_backoff: Duration) -> Self {
        Self {
            initial_backoff,
            max_backoff: max_backoff.max(initial_backoff),
            idle_timeout: DEFAULT_IDLE_TIMEOUT,
        }
    }

    pub fn with_idle_timeout(mut self, idle_timeout: Duration) -> Self {
        self.idle_timeout = idle_timeout;
        self
    }

    /// No delay between attempts
    pub fn immediate() -> Self {
        Self::new(Duration::ZERO, Duration::ZERO)
    }

    /// `attempt` is 1-based: the number of consecutive failures so far.
    pub fn delay_for_attempt(&self, attempt: u32) -> Duration {
        if attempt == 0 {
            return Duration::ZERO;
        }
        let exp = (attempt - 1).min(31);
        self.initial_backoff
            .saturating_mul(1u32 << exp)
            .min(self.max_backoff)
    }
}

impl Default for ReconnectPolicy {
    fn default() -> Self {
        Self::new(DEFAULT_INITIAL_BACKOFF, DEFAULT_MAX_BACKOFF)
    }
}
