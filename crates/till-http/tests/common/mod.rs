//! Shared fixtures for the till-http integration tests.

#![allow(dead_code)]

use std::collections::VecDeque;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, TimeZone, Utc};
use serde_json::{Value, json};
use wiremock::MockServer;

use till_core::error::NetworkError;
use till_core::{
    AccessToken, ApiRequest, Credentials, DomainPrefix, RawResponse, RetryPolicy, TenantUrl,
    Timer, Transport,
};
use till_http::ApiClient;

pub const TEST_TOKEN: &str = "test-token";

pub fn credentials() -> Credentials {
    Credentials::new(
        DomainPrefix::new("acme").unwrap(),
        AccessToken::new(TEST_TOKEN).unwrap(),
    )
}

/// Base URL pointing at a mock server.
pub fn mock_base_url(server: &MockServer) -> TenantUrl {
    TenantUrl::new(format!("http://127.0.0.1:{}", server.address().port())).unwrap()
}

/// Client against a mock server with real transport and real time.
pub fn mock_client(server: &MockServer) -> ApiClient {
    ApiClient::builder(credentials())
        .base_url(mock_base_url(server))
        .build()
        .unwrap()
}

/// Client against a mock server whose waits are recorded, not slept.
pub fn mock_client_with_timer(server: &MockServer, timer: Arc<RecordingTimer>) -> ApiClient {
    ApiClient::builder(credentials())
        .base_url(mock_base_url(server))
        .timer(timer)
        .build()
        .unwrap()
}

/// Client over a scripted transport and a recording timer.
pub fn scripted_client(
    transport: Arc<ScriptedTransport>,
    timer: Arc<RecordingTimer>,
    policy: RetryPolicy,
) -> ApiClient {
    ApiClient::builder(credentials())
        .base_url(TenantUrl::new("https://acme.example.com").unwrap())
        .retry_policy(policy)
        .transport(transport)
        .timer(timer)
        .build()
        .unwrap()
}

/// `count` records with ids `<prefix>-0` .. `<prefix>-<count-1>`.
pub fn records(prefix: &str, count: usize) -> Vec<Value> {
    (0..count)
        .map(|i| json!({"id": format!("{prefix}-{i}"), "name": format!("{prefix} record {i}")}))
        .collect()
}

/// A version-cursor page body.
pub fn versioned_page(data: Vec<Value>, max: u64) -> Value {
    json!({"data": data, "version": {"min": 0, "max": max}})
}

/// A flake-cursor page body.
pub fn flake_page(data: Vec<Value>) -> Value {
    json!({"data": data})
}

/// A fixed point in time for scripted tests.
pub fn epoch() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2026, 10, 21, 7, 28, 0).unwrap()
}

/// Format a time as an HTTP date (`Retry-After` form).
pub fn http_date(at: DateTime<Utc>) -> String {
    at.format("%a, %d %b %Y %H:%M:%S GMT").to_string()
}

/// Virtual clock that records every requested wait and advances itself by
/// that amount instead of sleeping.
#[derive(Debug)]
pub struct RecordingTimer {
    now: Mutex<DateTime<Utc>>,
    sleeps: Mutex<Vec<Duration>>,
}

impl RecordingTimer {
    pub fn new(start: DateTime<Utc>) -> Arc<Self> {
        Arc::new(Self {
            now: Mutex::new(start),
            sleeps: Mutex::new(Vec::new()),
        })
    }

    pub fn sleeps(&self) -> Vec<Duration> {
        self.sleeps.lock().unwrap().clone()
    }
}

#[async_trait]
impl Timer for RecordingTimer {
    fn now(&self) -> DateTime<Utc> {
        *self.now.lock().unwrap()
    }

    async fn sleep(&self, duration: Duration) {
        self.sleeps.lock().unwrap().push(duration);
        let mut now = self.now.lock().unwrap();
        *now += chrono::Duration::from_std(duration).unwrap();
    }
}

/// Transport that replays a fixed script of outcomes and records every
/// request it was asked to send.
#[derive(Debug, Default)]
pub struct ScriptedTransport {
    script: Mutex<VecDeque<Result<RawResponse, NetworkError>>>,
    seen: Mutex<Vec<ApiRequest>>,
}

impl ScriptedTransport {
    pub fn new(script: Vec<Result<RawResponse, NetworkError>>) -> Arc<Self> {
        Arc::new(Self {
            script: Mutex::new(script.into()),
            seen: Mutex::new(Vec::new()),
        })
    }

    pub fn requests(&self) -> Vec<ApiRequest> {
        self.seen.lock().unwrap().clone()
    }
}

#[async_trait]
impl Transport for ScriptedTransport {
    async fn send(&self, request: &ApiRequest) -> Result<RawResponse, NetworkError> {
        self.seen.lock().unwrap().push(request.clone());
        self.script
            .lock()
            .unwrap()
            .pop_front()
            .expect("transport script exhausted")
    }
}

pub fn ok(body: Value) -> Result<RawResponse, NetworkError> {
    Ok(RawResponse::new(200, body.to_string()))
}

pub fn status(code: u16) -> Result<RawResponse, NetworkError> {
    Ok(RawResponse::new(code, ""))
}

pub fn rate_limited(retry_after: Option<&str>) -> Result<RawResponse, NetworkError> {
    Ok(RawResponse {
        status: 429,
        retry_after: retry_after.map(str::to_string),
        body: Vec::new(),
    })
}

pub fn connection_refused() -> Result<RawResponse, NetworkError> {
    Err(NetworkError::Connection {
        message: "connection refused".to_string(),
    })
}
