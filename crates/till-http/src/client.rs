//! API client and its retry loop.

use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json::Value;
use tracing::{debug, info, instrument, warn};
use url::Url;

use till_core::error::InvalidInputError;
use till_core::types::DEFAULT_SERVICE_HOST;
use till_core::{
    ApiRequest, ApiStatusError, Credentials, Error, Method, Result, RetryPolicy, RetryState,
    TenantUrl, Timer, Transport, classify,
};

use crate::endpoints::Endpoint;
use crate::request::build_request;
use crate::timer::TokioTimer;
use crate::transport::ReqwestTransport;

/// Client for one store's API.
///
/// Immutable once built and cheap to clone; clones share the transport.
/// Every call builds its own request and retry state, so one client can
/// serve any number of concurrent fetch loops.
#[derive(Clone)]
pub struct ApiClient {
    inner: Arc<ClientInner>,
}

struct ClientInner {
    credentials: Credentials,
    base: TenantUrl,
    policy: RetryPolicy,
    transport: Arc<dyn Transport>,
    timer: Arc<dyn Timer>,
}

impl ApiClient {
    /// Create a client for `https://<prefix>.vendhq.com` with the default
    /// retry policy.
    ///
    /// # Errors
    ///
    /// Returns an error if the base URL is invalid or the HTTP client
    /// cannot be initialised.
    pub fn new(credentials: Credentials) -> Result<Self> {
        Self::builder(credentials).build()
    }

    /// Start configuring a client.
    pub fn builder(credentials: Credentials) -> ApiClientBuilder {
        ApiClientBuilder::new(credentials)
    }

    /// The credentials this client authenticates with.
    pub fn credentials(&self) -> &Credentials {
        &self.inner.credentials
    }

    /// The tenant base URL.
    pub fn base_url(&self) -> &TenantUrl {
        &self.inner.base
    }

    /// The retry policy applied to every request.
    pub fn retry_policy(&self) -> &RetryPolicy {
        &self.inner.policy
    }

    /// The store's timezone label, if configured.
    pub fn timezone(&self) -> Option<&str> {
        self.inner.credentials.timezone()
    }

    /// Absolute URL of `endpoint`, with its fixed query and `extra`
    /// parameters appended.
    ///
    /// # Errors
    ///
    /// Returns an error if the resulting URL does not parse.
    pub fn url(&self, endpoint: &Endpoint, extra: &[(&str, String)]) -> Result<String> {
        let raw = self.inner.base.api_url(endpoint.version(), endpoint.path());
        let mut url = Url::parse(&raw).map_err(|e| InvalidInputError::Other {
            message: format!("endpoint URL '{raw}': {e}"),
        })?;
        if !endpoint.query().is_empty() || !extra.is_empty() {
            let mut pairs = url.query_pairs_mut();
            for (name, value) in endpoint.query() {
                pairs.append_pair(name, value);
            }
            for (name, value) in extra {
                pairs.append_pair(name, value);
            }
        }
        Ok(url.into())
    }

    /// Send a request, retrying transient failures, and return the body of
    /// the successful response.
    ///
    /// - Network failures back off `attempt^3.5 + 5` seconds and retry.
    /// - 429 waits for `Retry-After` (30 s if missing) and retries without
    ///   counting as a failed attempt.
    /// - Any other status of 300 or above is returned as
    ///   [`Error::Status`]; 5xx responses are not retried here.
    ///
    /// # Errors
    ///
    /// Returns the classified status error, or a network/deadline error
    /// once the retry policy gives up.
    #[instrument(skip(self, request), fields(method = %request.method, url = %request.url))]
    pub async fn execute(&self, request: &ApiRequest) -> Result<Vec<u8>> {
        let policy = &self.inner.policy;
        let timer = &self.inner.timer;
        let mut state = RetryState::new(timer.now());

        loop {
            let wait = match self.inner.transport.send(request).await {
                Err(err) => {
                    let Some(wait) = state.on_network_failure(policy) else {
                        warn!(attempts = state.attempt(), error = %err, "giving up after network failures");
                        return Err(Error::Network(err));
                    };
                    warn!(
                        attempt = state.attempt(),
                        wait_secs = wait.as_secs_f64(),
                        error = %err,
                        "network failure, backing off"
                    );
                    wait
                }
                Ok(response) if response.status == 429 => {
                    let wait = state.on_rate_limited(
                        policy,
                        response.retry_after.as_deref(),
                        timer.now(),
                    );
                    let limited = ApiStatusError::RateLimited {
                        retry_after: response.retry_after.clone(),
                    };
                    warn!(
                        wait_secs = wait.as_secs_f64(),
                        error = %limited,
                        "rate limited, waiting"
                    );
                    wait
                }
                Ok(response) => {
                    classify(response.status).map_err(|e| e.with_body(&response.body))?;
                    if state.on_success() {
                        info!("rate limit cleared");
                    }
                    debug!(status = response.status, len = response.body.len(), "request succeeded");
                    return Ok(response.body);
                }
            };

            state.check_deadline(policy, timer.now(), wait)?;
            timer.sleep(wait).await;
        }
    }

    /// Build and send a request for `endpoint`.
    ///
    /// # Errors
    ///
    /// See [`build_request`] and [`execute`](Self::execute).
    pub async fn send<B>(
        &self,
        method: Method,
        endpoint: &Endpoint,
        extra_query: &[(&str, String)],
        body: Option<&B>,
    ) -> Result<Vec<u8>>
    where
        B: Serialize + ?Sized,
    {
        let url = self.url(endpoint, extra_query)?;
        let request = build_request(method, &url, self.inner.credentials.token(), body)?;
        self.execute(&request).await
    }

    /// GET `endpoint` and decode the body as `T`.
    ///
    /// # Errors
    ///
    /// Request errors, or [`Error::Decode`] if the body is not a `T`.
    #[instrument(skip(self), fields(endpoint = %endpoint))]
    pub async fn get_json<T: DeserializeOwned>(&self, endpoint: &Endpoint) -> Result<T> {
        let body = self.send::<()>(Method::Get, endpoint, &[], None).await?;
        serde_json::from_slice(&body).map_err(|e| Error::decode(endpoint.to_string(), e))
    }

    /// POST a JSON body to `endpoint` and return the decoded response.
    ///
    /// An empty response body is returned as `Value::Null`.
    ///
    /// # Errors
    ///
    /// Request errors, or [`Error::Decode`] if the response is not JSON.
    #[instrument(skip(self, body), fields(endpoint = %endpoint))]
    pub async fn post_json<B>(&self, endpoint: &Endpoint, body: &B) -> Result<Value>
    where
        B: Serialize + ?Sized,
    {
        let response = self.send(Method::Post, endpoint, &[], Some(body)).await?;
        decode_optional(&response, endpoint)
    }

    /// PUT a JSON body to `endpoint` and return the decoded response.
    ///
    /// # Errors
    ///
    /// Request errors, or [`Error::Decode`] if the response is not JSON.
    #[instrument(skip(self, body), fields(endpoint = %endpoint))]
    pub async fn put_json<B>(&self, endpoint: &Endpoint, body: &B) -> Result<Value>
    where
        B: Serialize + ?Sized,
    {
        let response = self.send(Method::Put, endpoint, &[], Some(body)).await?;
        decode_optional(&response, endpoint)
    }

    /// DELETE `endpoint`.
    ///
    /// # Errors
    ///
    /// Request errors.
    #[instrument(skip(self), fields(endpoint = %endpoint))]
    pub async fn delete(&self, endpoint: &Endpoint) -> Result<()> {
        self.send::<()>(Method::Delete, endpoint, &[], None).await?;
        Ok(())
    }
}

fn decode_optional(body: &[u8], endpoint: &Endpoint) -> Result<Value> {
    if body.iter().all(u8::is_ascii_whitespace) {
        return Ok(Value::Null);
    }
    serde_json::from_slice(body).map_err(|e| Error::decode(endpoint.to_string(), e))
}

impl fmt::Debug for ApiClient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ApiClient")
            .field("credentials", &self.inner.credentials)
            .field("base", &self.inner.base)
            .field("policy", &self.inner.policy)
            .finish_non_exhaustive()
    }
}

/// Builder for [`ApiClient`].
pub struct ApiClientBuilder {
    credentials: Credentials,
    service_host: String,
    base_url: Option<TenantUrl>,
    policy: RetryPolicy,
    timeout: Option<Duration>,
    transport: Option<Arc<dyn Transport>>,
    timer: Option<Arc<dyn Timer>>,
}

impl ApiClientBuilder {
    fn new(credentials: Credentials) -> Self {
        Self {
            credentials,
            service_host: DEFAULT_SERVICE_HOST.to_string(),
            base_url: None,
            policy: RetryPolicy::default(),
            timeout: None,
            transport: None,
            timer: None,
        }
    }

    /// Use `https://<prefix>.<host>` instead of the default service host.
    pub fn service_host(mut self, host: impl Into<String>) -> Self {
        self.service_host = host.into();
        self
    }

    /// Use an explicit base URL; the domain prefix is then ignored for
    /// addressing.
    pub fn base_url(mut self, base: TenantUrl) -> Self {
        self.base_url = Some(base);
        self
    }

    /// Replace the retry policy.
    pub fn retry_policy(mut self, policy: RetryPolicy) -> Self {
        self.policy = policy;
        self
    }

    /// Per-request timeout for the default transport.
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    /// Send requests through a custom transport.
    pub fn transport(mut self, transport: Arc<dyn Transport>) -> Self {
        self.transport = Some(transport);
        self
    }

    /// Take time and sleeps from a custom timer.
    pub fn timer(mut self, timer: Arc<dyn Timer>) -> Self {
        self.timer = Some(timer);
        self
    }

    /// Build the client.
    ///
    /// # Errors
    ///
    /// Returns an error if the base URL is invalid or the default transport
    /// cannot be initialised.
    pub fn build(self) -> Result<ApiClient> {
        let base = match self.base_url {
            Some(base) => base,
            None => TenantUrl::for_store(self.credentials.domain_prefix(), &self.service_host)?,
        };
        let transport: Arc<dyn Transport> = match self.transport {
            Some(transport) => transport,
            None => Arc::new(ReqwestTransport::with_timeout(self.timeout)?),
        };
        let timer: Arc<dyn Timer> = match self.timer {
            Some(timer) => timer,
            None => Arc::new(TokioTimer::new()),
        };

        Ok(ApiClient {
            inner: Arc::new(ClientInner {
                credentials: self.credentials,
                base,
                policy: self.policy,
                transport,
                timer,
            }),
        })
    }
}
