//! Retry policy, backoff math and per-call retry state.
//!
//! Network failures back off polynomially: the n-th consecutive failure
//! waits `n^3.5 + 5` seconds. Rate-limit responses (429) wait until the
//! time named by `Retry-After` and do not count as failures. Every other
//! non-success status is terminal and never reaches this module.

use std::time::Duration;

use chrono::{DateTime, Utc};

use crate::error::Error;

/// Exponent of the network-failure backoff curve.
pub const BACKOFF_EXPONENT: f64 = 3.5;

/// Constant added to every network-failure backoff, in seconds.
pub const BACKOFF_FLOOR_SECS: f64 = 5.0;

/// Wait used when a 429 carries no usable `Retry-After`.
pub const DEFAULT_RATE_LIMIT_WAIT: Duration = Duration::from_secs(30);

/// Configuration for retry behavior.
///
/// The default retries network failures forever and has no deadline, so a
/// call may block indefinitely against a dead or permanently throttled
/// server. Set [`max_network_retries`](Self::max_network_retries) or
/// [`deadline`](Self::deadline) to bound it.
#[derive(Debug, Clone, PartialEq)]
pub struct RetryPolicy {
    /// Maximum consecutive network-failure retries. `None` means unlimited.
    pub max_network_retries: Option<u32>,
    /// Upper bound on the total time one call may spend, measured from its
    /// first attempt. Checked before every wait.
    pub deadline: Option<Duration>,
    /// Wait used for a 429 without a usable `Retry-After` header.
    pub default_rate_limit_wait: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_network_retries: None,
            deadline: None,
            default_rate_limit_wait: DEFAULT_RATE_LIMIT_WAIT,
        }
    }
}

impl RetryPolicy {
    /// Cap the number of network-failure retries.
    pub fn with_max_network_retries(mut self, retries: u32) -> Self {
        self.max_network_retries = Some(retries);
        self
    }

    /// Bound the total time a call may spend retrying.
    pub fn with_deadline(mut self, deadline: Duration) -> Self {
        self.deadline = Some(deadline);
        self
    }
}

/// Backoff before retrying the `attempt`-th consecutive network failure.
///
/// `attempt` is 1-based: the first failure waits `1^3.5 + 5 = 6` seconds.
pub fn backoff_delay(attempt: u32) -> Duration {
    let secs = f64::from(attempt).powf(BACKOFF_EXPONENT) + BACKOFF_FLOOR_SECS;
    Duration::try_from_secs_f64(secs).unwrap_or(Duration::MAX)
}

/// Parse a `Retry-After` header into a wait relative to `now`.
///
/// Accepts an HTTP date (RFC 1123, e.g. `Wed, 21 Oct 2026 07:28:00 GMT`)
/// or a number of seconds. A date in the past yields a zero wait. Returns
/// `None` when the value is neither.
pub fn parse_retry_after(value: &str, now: DateTime<Utc>) -> Option<Duration> {
    let value = value.trim();
    if let Ok(secs) = value.parse::<u64>() {
        return Some(Duration::from_secs(secs));
    }
    let retry_at = DateTime::parse_from_rfc2822(value).ok()?;
    let wait = retry_at.with_timezone(&Utc) - now;
    Some(wait.to_std().unwrap_or(Duration::ZERO))
}

/// Retry bookkeeping for a single call.
#[derive(Debug, Clone)]
pub struct RetryState {
    attempt: u32,
    rate_limited: bool,
    started: DateTime<Utc>,
}

impl RetryState {
    /// Start tracking a call whose first attempt happens at `started`.
    pub fn new(started: DateTime<Utc>) -> Self {
        Self {
            attempt: 0,
            rate_limited: false,
            started,
        }
    }

    /// Consecutive network failures so far.
    pub fn attempt(&self) -> u32 {
        self.attempt
    }

    /// Whether the most recent non-network outcome was a 429.
    pub fn is_rate_limited(&self) -> bool {
        self.rate_limited
    }

    /// Record a network failure and return the wait before the next
    /// attempt, or `None` once the policy's retry cap is used up.
    pub fn on_network_failure(&mut self, policy: &RetryPolicy) -> Option<Duration> {
        if policy
            .max_network_retries
            .is_some_and(|max| self.attempt >= max)
        {
            return None;
        }
        self.attempt += 1;
        Some(backoff_delay(self.attempt))
    }

    /// Record a 429 and return the wait before the next attempt.
    ///
    /// The network attempt counter is left alone.
    pub fn on_rate_limited(
        &mut self,
        policy: &RetryPolicy,
        retry_after: Option<&str>,
        now: DateTime<Utc>,
    ) -> Duration {
        self.rate_limited = true;
        retry_after
            .and_then(|value| parse_retry_after(value, now))
            .unwrap_or(policy.default_rate_limit_wait)
    }

    /// Record a successful response. Returns `true` if this success ended a
    /// run of rate-limited responses.
    pub fn on_success(&mut self) -> bool {
        std::mem::replace(&mut self.rate_limited, false)
    }

    /// Fail if waiting `wait` from `now` would overrun the policy deadline.
    ///
    /// # Errors
    ///
    /// Returns [`Error::DeadlineExceeded`] with the time spent so far.
    pub fn check_deadline(
        &self,
        policy: &RetryPolicy,
        now: DateTime<Utc>,
        wait: Duration,
    ) -> Result<(), Error> {
        let Some(deadline) = policy.deadline else {
            return Ok(());
        };
        let elapsed = (now - self.started).to_std().unwrap_or(Duration::ZERO);
        if elapsed.saturating_add(wait) > deadline {
            return Err(Error::DeadlineExceeded { elapsed });
        }
        Ok(())
    }
}
