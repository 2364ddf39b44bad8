//! Tokio-backed timer.

use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use till_core::Timer;

/// Real wall-clock time; sleeps suspend only the calling task.
#[derive(Debug, Clone, Copy, Default)]
pub struct TokioTimer;

impl TokioTimer {
    /// Creates a new timer.
    pub const fn new() -> Self {
        Self
    }
}

#[async_trait]
impl Timer for TokioTimer {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }

    async fn sleep(&self, duration: Duration) {
        tokio::time::sleep(duration).await;
    }
}
