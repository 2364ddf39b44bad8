//! Tenant base URL type.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use url::Url;

use crate::error::{Error, InvalidInputError};
use crate::types::DomainPrefix;

/// Service host used when only a domain prefix is given.
pub const DEFAULT_SERVICE_HOST: &str = "vendhq.com";

/// A validated API base URL for one tenant.
///
/// Normally derived from a [`DomainPrefix`] and the service host
/// (`https://<prefix>.<host>`). An explicit base URL is accepted too, for
/// proxies and local test servers; it must use HTTPS, or HTTP for localhost.
///
/// # Example
///
/// ```
/// use till_core::{DomainPrefix, TenantUrl};
///
/// let prefix = DomainPrefix::new("acme").unwrap();
/// let base = TenantUrl::for_store(&prefix, "vendhq.com").unwrap();
/// assert_eq!(base.api_url("2.0", "customers"),
///            "https://acme.vendhq.com/api/2.0/customers");
/// ```
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct TenantUrl(Url);

impl TenantUrl {
    /// Create a tenant URL from an explicit base URL.
    ///
    /// # Errors
    ///
    /// Returns an error if the URL is not valid or doesn't meet requirements.
    pub fn new(s: impl AsRef<str>) -> Result<Self, Error> {
        let s = s.as_ref();
        let url = Url::parse(s).map_err(|e| InvalidInputError::TenantUrl {
            value: s.to_string(),
            reason: e.to_string(),
        })?;

        Self::validate(&url, s)?;

        if url.query().is_some() || url.fragment().is_some() {
            return Err(InvalidInputError::TenantUrl {
                value: s.to_string(),
                reason: "must not carry a query or fragment".to_string(),
            }
            .into());
        }

        Ok(Self(url))
    }

    /// Build the base URL for a store on the given service host.
    ///
    /// # Errors
    ///
    /// Returns an error if the resulting URL is invalid (for example a
    /// malformed service host).
    pub fn for_store(prefix: &DomainPrefix, service_host: &str) -> Result<Self, Error> {
        let host = service_host.trim().trim_matches('.');
        if host.is_empty() || host.contains('/') {
            return Err(InvalidInputError::TenantUrl {
                value: service_host.to_string(),
                reason: "service host must be a bare host name".to_string(),
            }
            .into());
        }
        Self::new(format!("https://{}.{}", prefix, host))
    }

    /// Returns the URL of an API resource.
    ///
    /// `version` is the API version path (`2.0`, `0.9`); `resource` may
    /// contain further path segments and may start with `/`.
    pub fn api_url(&self, version: &str, resource: &str) -> String {
        let base = self.0.as_str().trim_end_matches('/');
        let version = version.trim_matches('/');
        let resource = resource.trim_start_matches('/');
        format!("{}/api/{}/{}", base, version, resource)
    }

    /// Returns the base URL as a string.
    pub fn as_str(&self) -> &str {
        self.0.as_str()
    }

    /// Returns the host string.
    pub fn host(&self) -> Option<&str> {
        self.0.host_str()
    }

    fn validate(url: &Url, original: &str) -> Result<(), Error> {
        if url.cannot_be_a_base() {
            return Err(InvalidInputError::TenantUrl {
                value: original.to_string(),
                reason: "must be an absolute URL".to_string(),
            }
            .into());
        }

        let scheme = url.scheme();
        let is_localhost = url
            .host_str()
            .is_some_and(|h| h == "localhost" || h == "127.0.0.1" || h == "[::1]");

        if scheme != "https" && !(scheme == "http" && is_localhost) {
            return Err(InvalidInputError::TenantUrl {
                value: original.to_string(),
                reason: "must use HTTPS (HTTP allowed only for localhost)".to_string(),
            }
            .into());
        }

        if url.host_str().is_none() {
            return Err(InvalidInputError::TenantUrl {
                value: original.to_string(),
                reason: "must have a host".to_string(),
            }
            .into());
        }

        Ok(())
    }
}

impl fmt::Display for TenantUrl {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for TenantUrl {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s)
    }
}

impl Serialize for TenantUrl {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.serialize_str(self.0.as_str())
    }
}

impl<'de> Deserialize<'de> for TenantUrl {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        TenantUrl::new(&s).map_err(serde::de::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn acme() -> DomainPrefix {
        DomainPrefix::new("acme").unwrap()
    }

    #[test]
    fn store_url_construction() {
        let base = TenantUrl::for_store(&acme(), DEFAULT_SERVICE_HOST).unwrap();
        assert_eq!(base.host(), Some("acme.vendhq.com"));
        assert_eq!(
            base.api_url("2.0", "products"),
            "https://acme.vendhq.com/api/2.0/products"
        );
    }

    #[test]
    fn api_url_normalizes_slashes() {
        let base = TenantUrl::new("https://proxy.example.com/").unwrap();
        assert_eq!(
            base.api_url("/0.9/", "/register_sales"),
            "https://proxy.example.com/api/0.9/register_sales"
        );
    }

    #[test]
    fn api_url_keeps_base_path() {
        let base = TenantUrl::new("https://proxy.example.com/retail").unwrap();
        assert_eq!(
            base.api_url("2.0", "users"),
            "https://proxy.example.com/retail/api/2.0/users"
        );
    }

    #[test]
    fn valid_localhost_http() {
        let base = TenantUrl::new("http://127.0.0.1:8080").unwrap();
        assert_eq!(base.host(), Some("127.0.0.1"));
    }

    #[test]
    fn invalid_urls() {
        assert!(TenantUrl::new("http://acme.vendhq.com").is_err());
        assert!(TenantUrl::new("/api/2.0").is_err());
        assert!(TenantUrl::new("https://acme.vendhq.com/?x=1").is_err());
        assert!(TenantUrl::for_store(&acme(), "").is_err());
        assert!(TenantUrl::for_store(&acme(), "vendhq.com/api").is_err());
    }

    #[test]
    fn serde_round_trip_validates() {
        let base: TenantUrl = serde_json::from_str("\"https://acme.vendhq.com\"").unwrap();
        assert_eq!(base.host(), Some("acme.vendhq.com"));
        assert!(serde_json::from_str::<TenantUrl>("\"ftp://acme\"").is_err());
    }
}
