//! Timer trait.

use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, Utc};

/// Source of wall-clock time and of the waits between retries.
///
/// Production code uses real time; tests substitute a timer that records
/// the requested waits and returns immediately.
#[async_trait]
pub trait Timer: Send + Sync {
    /// Returns the current UTC time.
    fn now(&self) -> DateTime<Utc>;

    /// Suspend the calling task for `duration`.
    async fn sleep(&self, duration: Duration);
}
