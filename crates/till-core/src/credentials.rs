//! Store credentials and the bearer token type.

use std::fmt;

use crate::error::{Error, InvalidInputError};
use crate::types::DomainPrefix;

/// A personal access token for the retail API.
///
/// # Security
///
/// - Never logged or displayed in Debug output
/// - Treat as opaque; do not parse or inspect
#[derive(Clone, PartialEq, Eq)]
pub struct AccessToken(String);

impl AccessToken {
    /// Create a new access token.
    ///
    /// # Errors
    ///
    /// Returns an error if the token is empty or contains characters that
    /// cannot appear in an HTTP header value.
    pub fn new(token: impl Into<String>) -> Result<Self, Error> {
        let token = token.into();
        let trimmed = token.trim();
        if trimmed.is_empty() {
            return Err(InvalidInputError::Token {
                reason: "token is empty".to_string(),
            }
            .into());
        }
        if trimmed.chars().any(|c| c.is_control() || !c.is_ascii()) {
            return Err(InvalidInputError::Token {
                reason: "token contains non-printable or non-ASCII characters".to_string(),
            }
            .into());
        }
        Ok(Self(trimmed.to_string()))
    }

    /// Returns the token value.
    ///
    /// # Security
    ///
    /// Use only when constructing authorization headers or persisting the
    /// token to the credentials file.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// The `Authorization` header value for this token.
    pub fn bearer(&self) -> String {
        format!("Bearer {}", self.0)
    }
}

// Hide token value in Debug output
impl fmt::Debug for AccessToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("AccessToken").field(&"[REDACTED]").finish()
    }
}

/// Everything needed to talk to one store.
///
/// Holds the tenant's domain prefix, its access token and an optional
/// timezone label used by callers when rendering dates.
///
/// # Example
///
/// ```
/// use till_core::{AccessToken, Credentials, DomainPrefix};
///
/// let creds = Credentials::new(
///     DomainPrefix::new("acme").unwrap(),
///     AccessToken::new("lsxs_pt_abc123").unwrap(),
/// )
/// .with_timezone("Pacific/Auckland");
/// assert_eq!(creds.domain_prefix().as_str(), "acme");
/// assert_eq!(creds.timezone(), Some("Pacific/Auckland"));
/// ```
#[derive(Clone)]
pub struct Credentials {
    domain_prefix: DomainPrefix,
    token: AccessToken,
    timezone: Option<String>,
}

impl Credentials {
    /// Create new credentials.
    pub fn new(domain_prefix: DomainPrefix, token: AccessToken) -> Self {
        Self {
            domain_prefix,
            token,
            timezone: None,
        }
    }

    /// Attach a timezone label (for example `Pacific/Auckland`).
    pub fn with_timezone(mut self, timezone: impl Into<String>) -> Self {
        let timezone = timezone.into();
        self.timezone = (!timezone.trim().is_empty()).then_some(timezone);
        self
    }

    /// Returns the store's domain prefix.
    pub fn domain_prefix(&self) -> &DomainPrefix {
        &self.domain_prefix
    }

    /// Returns the access token.
    pub fn token(&self) -> &AccessToken {
        &self.token
    }

    /// Returns the timezone label, if one was configured.
    pub fn timezone(&self) -> Option<&str> {
        self.timezone.as_deref()
    }
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("domain_prefix", &self.domain_prefix)
            .field("token", &"[REDACTED]")
            .field("timezone", &self.timezone)
            .finish()
    }
}
