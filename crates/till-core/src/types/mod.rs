//! Validated addressing types.
//!
//! These types enforce their invariants at construction time, so a client
//! can never be built against a malformed tenant address.

mod domain_prefix;
mod tenant_url;

pub use domain_prefix::DomainPrefix;
pub use tenant_url::{DEFAULT_SERVICE_HOST, TenantUrl};
