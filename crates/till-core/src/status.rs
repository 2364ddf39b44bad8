//! HTTP status classification.

use std::fmt;

/// A non-success HTTP status, mapped onto the API's error taxonomy.
///
/// `body` carries a trimmed snippet of the response body when one was sent,
/// since the API usually explains rejected requests there.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ApiStatusError {
    /// 400: the request was malformed or failed validation.
    BadRequest { body: Option<String> },
    /// 401: the token was rejected.
    Unauthorized { body: Option<String> },
    /// 404: the resource does not exist.
    NotFound { body: Option<String> },
    /// 429: rate limited. Retried by the client; surfaced only if retrying
    /// is impossible.
    RateLimited { retry_after: Option<String> },
    /// 5xx. Not retried by the client.
    ServerError { code: u16, body: Option<String> },
    /// Any other status of 300 or above.
    UnknownStatus { code: u16, body: Option<String> },
}

/// Longest body snippet kept on an error.
const BODY_SNIPPET_LEN: usize = 512;

impl ApiStatusError {
    /// The HTTP status code this error was built from.
    pub fn code(&self) -> u16 {
        match self {
            ApiStatusError::BadRequest { .. } => 400,
            ApiStatusError::Unauthorized { .. } => 401,
            ApiStatusError::NotFound { .. } => 404,
            ApiStatusError::RateLimited { .. } => 429,
            ApiStatusError::ServerError { code, .. } | ApiStatusError::UnknownStatus { code, .. } => {
                *code
            }
        }
    }

    /// Attach a response body snippet to this error.
    pub fn with_body(mut self, raw: &[u8]) -> Self {
        let snippet = body_snippet(raw);
        match &mut self {
            ApiStatusError::BadRequest { body }
            | ApiStatusError::Unauthorized { body }
            | ApiStatusError::NotFound { body }
            | ApiStatusError::ServerError { body, .. }
            | ApiStatusError::UnknownStatus { body, .. } => *body = snippet,
            ApiStatusError::RateLimited { .. } => {}
        }
        self
    }

    fn body(&self) -> Option<&str> {
        match self {
            ApiStatusError::BadRequest { body }
            | ApiStatusError::Unauthorized { body }
            | ApiStatusError::NotFound { body }
            | ApiStatusError::ServerError { body, .. }
            | ApiStatusError::UnknownStatus { body, .. } => body.as_deref(),
            ApiStatusError::RateLimited { .. } => None,
        }
    }
}

impl fmt::Display for ApiStatusError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ApiStatusError::BadRequest { .. } => write!(f, "HTTP 400 bad request")?,
            ApiStatusError::Unauthorized { .. } => {
                write!(f, "HTTP 401 unauthorized, check API token")?
            }
            ApiStatusError::NotFound { .. } => write!(f, "HTTP 404 not found")?,
            ApiStatusError::RateLimited { retry_after } => {
                write!(f, "HTTP 429 rate limited")?;
                if let Some(retry_after) = retry_after {
                    write!(f, " (retry after {retry_after})")?;
                }
            }
            ApiStatusError::ServerError { code, .. } => write!(f, "HTTP {code} server error")?,
            ApiStatusError::UnknownStatus { code, .. } => {
                write!(f, "HTTP {code} unexpected status")?
            }
        }
        if let Some(body) = self.body() {
            write!(f, ": {body}")?;
        }
        Ok(())
    }
}

impl std::error::Error for ApiStatusError {}

/// Classify an HTTP status code.
///
/// Anything below 300 is success. Codes outside the 5xx range that have no
/// variant of their own, including out-of-range ones like 999, are
/// [`ApiStatusError::UnknownStatus`]. The result carries no body; use
/// [`ApiStatusError::with_body`] to attach one.
pub fn classify(status: u16) -> Result<(), ApiStatusError> {
    match status {
        s if s < 300 => Ok(()),
        400 => Err(ApiStatusError::BadRequest { body: None }),
        401 => Err(ApiStatusError::Unauthorized { body: None }),
        404 => Err(ApiStatusError::NotFound { body: None }),
        429 => Err(ApiStatusError::RateLimited { retry_after: None }),
        s @ 500..=599 => Err(ApiStatusError::ServerError {
            code: s,
            body: None,
        }),
        s => Err(ApiStatusError::UnknownStatus {
            code: s,
            body: None,
        }),
    }
}

fn body_snippet(raw: &[u8]) -> Option<String> {
    let text = String::from_utf8_lossy(raw);
    let text = text.trim();
    if text.is_empty() {
        return None;
    }
    let mut snippet: String = text.chars().take(BODY_SNIPPET_LEN).collect();
    if snippet.len() < text.len() {
        snippet.push('…');
    }
    Some(snippet)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn classification_table() {
        assert_eq!(classify(200), Ok(()));
        assert_eq!(classify(204), Ok(()));
        assert_eq!(classify(400), Err(ApiStatusError::BadRequest { body: None }));
        assert_eq!(
            classify(401),
            Err(ApiStatusError::Unauthorized { body: None })
        );
        assert_eq!(classify(404), Err(ApiStatusError::NotFound { body: None }));
        assert_eq!(
            classify(429),
            Err(ApiStatusError::RateLimited { retry_after: None })
        );
        assert_eq!(
            classify(500),
            Err(ApiStatusError::ServerError {
                code: 500,
                body: None
            })
        );
        assert_eq!(
            classify(502),
            Err(ApiStatusError::ServerError {
                code: 502,
                body: None
            })
        );
        assert_eq!(
            classify(599),
            Err(ApiStatusError::ServerError {
                code: 599,
                body: None
            })
        );
        assert_eq!(
            classify(999),
            Err(ApiStatusError::UnknownStatus {
                code: 999,
                body: None
            })
        );
    }

    #[test]
    fn redirects_and_other_client_errors_are_unknown() {
        assert_eq!(
            classify(302),
            Err(ApiStatusError::UnknownStatus {
                code: 302,
                body: None
            })
        );
        assert_eq!(
            classify(403),
            Err(ApiStatusError::UnknownStatus {
                code: 403,
                body: None
            })
        );
    }

    #[test]
    fn codes_round_trip() {
        for code in [400, 401, 404, 429, 500, 503, 418] {
            let err = classify(code).unwrap_err();
            assert_eq!(err.code(), code);
        }
    }

    #[test]
    fn rate_limited_message_shows_retry_after() {
        let err = ApiStatusError::RateLimited {
            retry_after: Some("120".to_string()),
        };
        assert_eq!(err.to_string(), "HTTP 429 rate limited (retry after 120)");
        let bare = ApiStatusError::RateLimited { retry_after: None };
        assert_eq!(bare.to_string(), "HTTP 429 rate limited");
    }

    #[test]
    fn unauthorized_message_mentions_token() {
        let err = classify(401).unwrap_err();
        assert!(err.to_string().contains("check API token"));
    }

    #[test]
    fn body_snippet_is_attached_and_trimmed() {
        let err = classify(400)
            .unwrap_err()
            .with_body(b"  {\"error\":\"missing customer_id\"}\n");
        assert_eq!(
            err.to_string(),
            "HTTP 400 bad request: {\"error\":\"missing customer_id\"}"
        );

        let empty = classify(404).unwrap_err().with_body(b"   ");
        assert_eq!(empty, ApiStatusError::NotFound { body: None });
    }

    #[test]
    fn long_bodies_are_truncated() {
        let raw = "x".repeat(BODY_SNIPPET_LEN * 2);
        let err = classify(500).unwrap_err().with_body(raw.as_bytes());
        let shown = err.to_string();
        assert!(shown.ends_with('…'));
        assert!(shown.len() < raw.len());
    }
}
