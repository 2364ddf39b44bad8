//! reqwest-backed transport.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::header::RETRY_AFTER;
use tracing::trace;

use till_core::error::NetworkError;
use till_core::{ApiRequest, Error, Method, RawResponse, Transport};

/// HTTP transport using a shared `reqwest::Client`.
///
/// Every call to [`send`](Transport::send) builds a new `reqwest` request
/// from the [`ApiRequest`], so retries always start from a fresh body.
#[derive(Debug, Clone)]
pub struct ReqwestTransport {
    client: reqwest::Client,
}

impl ReqwestTransport {
    /// Create a transport with no per-request timeout.
    ///
    /// # Errors
    ///
    /// Returns an error if the TLS backend cannot be initialised.
    pub fn new() -> Result<Self, Error> {
        Self::with_timeout(None)
    }

    /// Create a transport whose requests time out after `timeout`.
    ///
    /// A timed-out request is a network failure and is retried like any
    /// other.
    ///
    /// # Errors
    ///
    /// Returns an error if the TLS backend cannot be initialised.
    pub fn with_timeout(timeout: Option<Duration>) -> Result<Self, Error> {
        let mut builder = reqwest::Client::builder();
        if let Some(timeout) = timeout {
            builder = builder.timeout(timeout);
        }
        let client = builder.build().map_err(|e| network_error(&e))?;
        Ok(Self { client })
    }

    /// Wrap an existing `reqwest::Client`.
    pub fn with_client(client: reqwest::Client) -> Self {
        Self { client }
    }

    fn to_reqwest_method(method: Method) -> reqwest::Method {
        match method {
            Method::Get => reqwest::Method::GET,
            Method::Post => reqwest::Method::POST,
            Method::Put => reqwest::Method::PUT,
            Method::Delete => reqwest::Method::DELETE,
        }
    }
}

#[async_trait]
impl Transport for ReqwestTransport {
    async fn send(&self, request: &ApiRequest) -> Result<RawResponse, NetworkError> {
        let mut builder = self
            .client
            .request(Self::to_reqwest_method(request.method), &request.url);
        for (name, value) in &request.headers {
            builder = builder.header(name.as_str(), value.as_str());
        }
        if let Some(body) = &request.body {
            builder = builder.body(body.clone());
        }

        let response = builder.send().await.map_err(|e| network_error(&e))?;

        let status = response.status().as_u16();
        let retry_after = response
            .headers()
            .get(RETRY_AFTER)
            .and_then(|v| v.to_str().ok())
            .map(str::to_string);
        let body = response.bytes().await.map_err(|e| NetworkError::Body {
            message: e.to_string(),
        })?;
        trace!(status, len = body.len(), "response received");

        Ok(RawResponse {
            status,
            retry_after,
            body: body.to_vec(),
        })
    }
}

/// Map a reqwest failure onto the network error taxonomy.
pub(crate) fn network_error(err: &reqwest::Error) -> NetworkError {
    let message = err.to_string();
    if err.is_timeout() {
        NetworkError::Timeout { message }
    } else if err.is_connect() {
        NetworkError::Connection { message }
    } else if err.is_body() || err.is_decode() {
        NetworkError::Body { message }
    } else {
        NetworkError::Other { message }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn transport_creation() {
        assert!(ReqwestTransport::new().is_ok());
        assert!(ReqwestTransport::with_timeout(Some(Duration::from_secs(5))).is_ok());
    }

    #[tokio::test]
    async fn refused_connection_is_a_network_error() {
        // Port 9 (discard) is not listening on loopback in test environments.
        let transport = ReqwestTransport::with_timeout(Some(Duration::from_secs(2))).unwrap();
        let request = ApiRequest {
            method: Method::Get,
            url: "http://127.0.0.1:9/api/2.0/customers".to_string(),
            headers: Vec::new(),
            body: None,
        };
        assert!(transport.send(&request).await.is_err());
    }
}
