//! till-core - Core types and traits for the till retail API toolkit.
//!
//! Nothing in this crate performs network I/O. It defines the error
//! taxonomy, the status classifier, the retry policy and backoff math,
//! the page envelopes of both pagination protocols, and the two seams
//! ([`Transport`] and [`Timer`]) the HTTP crate plugs into.

pub mod credentials;
pub mod error;
pub mod page;
pub mod retry;
pub mod status;
pub mod traits;
pub mod types;

pub use credentials::{AccessToken, Credentials};
pub use error::{Error, PartialFetch};
pub use page::{FlakePage, VersionRange, VersionedPage};
pub use retry::{RetryPolicy, RetryState};
pub use status::{ApiStatusError, classify};
pub use traits::{ApiRequest, Method, RawResponse, Timer, Transport};
pub use types::{DomainPrefix, TenantUrl};

/// Result type alias using the crate's Error type.
pub type Result<T> = std::result::Result<T, Error>;
