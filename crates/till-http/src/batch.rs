//! Per-record mutation loops with failure collection.

use std::future::Future;

use serde::Serialize;
use tracing::{debug, warn};

use till_core::Error;

/// One item of a batch that failed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BatchFailure {
    /// Label identifying the item (usually its id).
    pub item: String,
    /// HTTP status, when the failure came from a response.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<u16>,
    /// Human-readable reason.
    pub reason: String,
}

/// Outcome of a batch of mutations.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct BatchReport {
    /// Items an operation was attempted for.
    pub attempted: usize,
    /// Items whose operation succeeded.
    pub succeeded: usize,
    /// Items whose operation failed, in input order.
    pub failures: Vec<BatchFailure>,
    /// Set when the batch stopped early because the token was rejected.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub aborted: Option<String>,
}

impl BatchReport {
    /// Whether every item succeeded and the batch ran to the end.
    pub fn is_clean(&self) -> bool {
        self.failures.is_empty() && self.aborted.is_none()
    }
}

/// Run `op` for every `(label, item)` pair, one at a time.
///
/// A failed item is recorded and the loop moves on to the next one. The
/// only exception is a 401: every later request would be rejected the
/// same way, so the batch stops and records why in
/// [`BatchReport::aborted`].
pub async fn run_batch<T, R, F, Fut>(
    items: impl IntoIterator<Item = (String, T)>,
    mut op: F,
) -> BatchReport
where
    F: FnMut(T) -> Fut,
    Fut: Future<Output = Result<R, Error>>,
{
    let mut report = BatchReport::default();

    for (label, item) in items {
        report.attempted += 1;
        match op(item).await {
            Ok(_) => {
                report.succeeded += 1;
                debug!(item = %label, "batch item succeeded");
            }
            Err(err) => {
                warn!(item = %label, error = %err, "batch item failed");
                let unauthorized = err.is_unauthorized();
                report.failures.push(BatchFailure {
                    item: label,
                    status: err.status_code(),
                    reason: err.to_string(),
                });
                if unauthorized {
                    report.aborted = Some(err.to_string());
                    break;
                }
            }
        }
    }

    report
}

#[cfg(test)]
mod tests {
    use super::*;
    use till_core::ApiStatusError;

    fn items(n: usize) -> Vec<(String, usize)> {
        (0..n).map(|i| (format!("id-{i}"), i)).collect()
    }

    #[tokio::test]
    async fn failures_are_collected_and_loop_continues() {
        let report = run_batch(items(5), |i| async move {
            if i % 2 == 1 {
                Err(Error::Status(ApiStatusError::NotFound { body: None }))
            } else {
                Ok(i)
            }
        })
        .await;

        assert_eq!(report.attempted, 5);
        assert_eq!(report.succeeded, 3);
        let failed: Vec<&str> = report.failures.iter().map(|f| f.item.as_str()).collect();
        assert_eq!(failed, vec!["id-1", "id-3"]);
        assert_eq!(report.failures[0].status, Some(404));
        assert!(!report.is_clean());
    }

    #[tokio::test]
    async fn unauthorized_stops_the_batch() {
        let report = run_batch(items(5), |i| async move {
            if i == 2 {
                Err(Error::Status(ApiStatusError::Unauthorized { body: None }))
            } else {
                Ok(())
            }
        })
        .await;

        assert_eq!(report.attempted, 3);
        assert_eq!(report.succeeded, 2);
        assert!(report.aborted.as_deref().is_some_and(|r| r.contains("401")));
    }

    #[tokio::test]
    async fn clean_batch() {
        let report = run_batch(items(3), |_| async { Ok::<_, Error>(()) }).await;
        assert!(report.is_clean());
        let json = serde_json::to_value(&report).unwrap();
        assert_eq!(json["succeeded"], 3);
        assert!(json.get("aborted").is_none());
    }
}
