//! till-http - HTTP client for the till retail API toolkit.
//!
//! [`ApiClient`] wraps a [`Transport`](till_core::Transport) with the
//! rate-limit-aware retry loop and the two pagination protocols.
//!
//! # Example
//!
//! ```no_run
//! use till_core::{AccessToken, Credentials, DomainPrefix};
//! use till_http::{ApiClient, Endpoint};
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let credentials = Credentials::new(
//!     DomainPrefix::new("acme")?,
//!     AccessToken::new("personal-token")?,
//! );
//! let client = ApiClient::new(credentials)?;
//!
//! let customers = client
//!     .fetch_all_versioned(&Endpoint::v2("customers"))
//!     .await?;
//! println!("{} customers", customers.len());
//! # Ok(())
//! # }
//! ```

mod batch;
mod client;
mod endpoints;
mod paginate;
mod request;
mod timer;
mod transport;

pub use batch::{BatchFailure, BatchReport, run_batch};
pub use client::{ApiClient, ApiClientBuilder};
pub use endpoints::{API_V2, API_V09, Endpoint, Pagination, Resource};
pub use paginate::decode_records;
pub use request::{USER_AGENT, build_request};
pub use timer::TokioTimer;
pub use transport::ReqwestTransport;
