//! Request construction.

use reqwest::header::{AUTHORIZATION, CONTENT_TYPE, HeaderValue, USER_AGENT as USER_AGENT_HEADER};
use serde::Serialize;
use url::Url;

use till_core::error::InvalidInputError;
use till_core::{AccessToken, ApiRequest, Error, Method};

/// User-Agent sent with every request.
pub const USER_AGENT: &str = concat!("till/", env!("CARGO_PKG_VERSION"));

/// Build a request for `method` on `url`, with an optional JSON body.
///
/// Sets the user agent, `Content-Type: application/json` and the bearer
/// token. No network I/O happens here.
///
/// # Errors
///
/// - [`Error::Serialization`] if `body` cannot be encoded as JSON
/// - [`Error::InvalidInput`] if the URL or token cannot be sent
pub fn build_request<B>(
    method: Method,
    url: &str,
    token: &AccessToken,
    body: Option<&B>,
) -> Result<ApiRequest, Error>
where
    B: Serialize + ?Sized,
{
    Url::parse(url).map_err(|e| InvalidInputError::Other {
        message: format!("request URL '{url}': {e}"),
    })?;

    let body = body
        .map(serde_json::to_vec)
        .transpose()
        .map_err(Error::Serialization)?;

    let authorization = token.bearer();
    HeaderValue::from_str(&authorization).map_err(|_| InvalidInputError::Token {
        reason: "token cannot be sent in an Authorization header".to_string(),
    })?;

    Ok(ApiRequest {
        method,
        url: url.to_string(),
        headers: vec![
            (USER_AGENT_HEADER.as_str().to_string(), USER_AGENT.to_string()),
            (CONTENT_TYPE.as_str().to_string(), "application/json".to_string()),
            (AUTHORIZATION.as_str().to_string(), authorization),
        ],
        body,
    })
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeMap;

    use super::*;
    use serde_json::json;

    const URL: &str = "https://acme.vendhq.com/api/2.0/customers";

    fn token() -> AccessToken {
        AccessToken::new("tok_123").unwrap()
    }

    #[test]
    fn sets_standard_headers() {
        let request = build_request::<()>(Method::Get, URL, &token(), None).unwrap();
        assert_eq!(request.header("user-agent"), Some(USER_AGENT));
        assert_eq!(request.header("content-type"), Some("application/json"));
        assert_eq!(request.header("authorization"), Some("Bearer tok_123"));
        assert_eq!(request.body, None);
    }

    #[test]
    fn serializes_body() {
        let body = json!({"customer_id": "c1", "amount": 12.5});
        let request = build_request(Method::Post, URL, &token(), Some(&body)).unwrap();
        let sent: serde_json::Value = serde_json::from_slice(request.body.as_ref().unwrap()).unwrap();
        assert_eq!(sent, body);
    }

    #[test]
    fn unserializable_body_is_an_error() {
        let mut body = BTreeMap::new();
        body.insert(vec![1u8, 2], "non-string keys cannot be JSON");
        let err = build_request(Method::Post, URL, &token(), Some(&body)).unwrap_err();
        assert!(matches!(err, Error::Serialization(_)));
    }

    #[test]
    fn relative_url_is_rejected() {
        let err = build_request::<()>(Method::Get, "/api/2.0/customers", &token(), None).unwrap_err();
        assert!(matches!(err, Error::InvalidInput(_)));
    }
}
