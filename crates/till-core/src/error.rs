//! Error types for the till toolkit.
//!
//! One unified error type with explicit variants for transport failures,
//! classified HTTP statuses, body encoding problems, pagination protocol
//! violations and input validation. Pagination failures are wrapped in
//! [`PartialFetch`] so the records fetched before the failure survive.

use std::time::Duration;

use serde_json::Value;
use thiserror::Error;

use crate::status::ApiStatusError;

/// The unified error type for till operations.
#[derive(Debug, Error)]
pub enum Error {
    /// Network transport failure (connect, timeout, truncated body).
    ///
    /// The retry loop treats these as transient; callers only see one when a
    /// configured retry cap ran out.
    #[error("network error: {0}")]
    Network(#[from] NetworkError),

    /// A terminal, classified HTTP status.
    #[error("API error: {0}")]
    Status(#[from] ApiStatusError),

    /// The request body could not be encoded as JSON.
    #[error("failed to serialize request body: {0}")]
    Serialization(#[source] serde_json::Error),

    /// The response body was not the JSON shape the caller asked for.
    #[error("failed to decode {context}: {source}")]
    Decode {
        context: String,
        #[source]
        source: serde_json::Error,
    },

    /// The server broke a pagination invariant.
    #[error("protocol violation: {reason}")]
    ProtocolViolation { reason: String },

    /// The configured retry deadline would be overrun by the next wait.
    #[error("retry deadline exceeded after {elapsed:?}")]
    DeadlineExceeded { elapsed: Duration },

    /// Input validation errors (domain prefix, base URL, token).
    #[error("invalid input: {0}")]
    InvalidInput(#[from] InvalidInputError),
}

impl Error {
    /// Build a protocol violation error.
    pub fn protocol(reason: impl Into<String>) -> Self {
        Error::ProtocolViolation {
            reason: reason.into(),
        }
    }

    /// Build a decode error with a short description of what was decoded.
    pub fn decode(context: impl Into<String>, source: serde_json::Error) -> Self {
        Error::Decode {
            context: context.into(),
            source,
        }
    }

    /// Whether this error is an authentication failure (HTTP 401).
    pub fn is_unauthorized(&self) -> bool {
        matches!(self, Error::Status(ApiStatusError::Unauthorized { .. }))
    }

    /// The HTTP status code behind this error, if it came from a response.
    pub fn status_code(&self) -> Option<u16> {
        match self {
            Error::Status(status) => Some(status.code()),
            _ => None,
        }
    }
}

/// Transport-level failures.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum NetworkError {
    /// The connection could not be established.
    #[error("connection failed: {message}")]
    Connection { message: String },

    /// The request or response timed out.
    #[error("request timed out: {message}")]
    Timeout { message: String },

    /// The response body could not be read to the end.
    #[error("failed to read response body: {message}")]
    Body { message: String },

    /// Any other HTTP client failure.
    #[error("HTTP error: {message}")]
    Other { message: String },
}

/// Input validation errors.
#[derive(Debug, Error)]
pub enum InvalidInputError {
    /// Invalid store domain prefix.
    #[error("invalid domain prefix '{value}': {reason}")]
    DomainPrefix { value: String, reason: String },

    /// Invalid API base URL.
    #[error("invalid base URL '{value}': {reason}")]
    TenantUrl { value: String, reason: String },

    /// The access token cannot be placed in an HTTP header.
    #[error("invalid access token: {reason}")]
    Token { reason: String },

    /// Generic invalid input.
    #[error("invalid input: {message}")]
    Other { message: String },
}

/// A pagination loop that failed part-way through.
///
/// `records` holds everything accumulated before `source` occurred, in
/// fetch order, so a caller that fetched ten pages and failed on the
/// eleventh can still use the first ten.
#[derive(Debug, Error)]
#[error(
    "fetching {resource} failed after {pages} page(s), {kept} record(s) kept: {source}",
    kept = .records.len()
)]
pub struct PartialFetch {
    /// Resource path that was being paginated.
    pub resource: String,
    /// Records fetched before the failure.
    pub records: Vec<Value>,
    /// Number of pages successfully fetched.
    pub pages: usize,
    /// The terminal error.
    #[source]
    pub source: Error,
}

impl PartialFetch {
    /// Discard the partial records and keep only the error.
    pub fn into_error(self) -> Error {
        self.source
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unauthorized_is_detected() {
        let err = Error::Status(ApiStatusError::Unauthorized { body: None });
        assert!(err.is_unauthorized());
        assert_eq!(err.status_code(), Some(401));
    }

    #[test]
    fn protocol_error_is_not_a_status() {
        let err = Error::protocol("version did not advance");
        assert!(!err.is_unauthorized());
        assert_eq!(err.status_code(), None);
        assert!(err.to_string().contains("version did not advance"));
    }

    #[test]
    fn partial_fetch_reports_kept_records() {
        let partial = PartialFetch {
            resource: "customers".to_string(),
            records: vec![Value::Null, Value::Null],
            pages: 1,
            source: Error::Status(ApiStatusError::NotFound { body: None }),
        };
        let message = partial.to_string();
        assert!(message.contains("customers"));
        assert!(message.contains("2 record(s) kept"));
        assert!(matches!(
            partial.into_error(),
            Error::Status(ApiStatusError::NotFound { .. })
        ));
    }
}
