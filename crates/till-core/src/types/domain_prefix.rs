//! Store domain prefix type.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::{Error, InvalidInputError};

/// A validated store domain prefix, the `acme` in `acme.vendhq.com`.
///
/// Prefixes are single DNS labels: ASCII letters, digits and `-`, not
/// starting or ending with `-`, at most 63 characters. They are stored
/// lowercase.
///
/// # Example
///
/// ```
/// use till_core::DomainPrefix;
///
/// let prefix = DomainPrefix::new("Acme-Outdoors").unwrap();
/// assert_eq!(prefix.as_str(), "acme-outdoors");
/// assert!(DomainPrefix::new("acme.vendhq.com").is_err());
/// ```
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct DomainPrefix(String);

impl DomainPrefix {
    /// Create a new domain prefix, validating the format.
    ///
    /// # Errors
    ///
    /// Returns an error if the value is not a single DNS label.
    pub fn new(s: impl AsRef<str>) -> Result<Self, Error> {
        let value = s.as_ref().trim().to_ascii_lowercase();
        Self::validate(&value)?;
        Ok(Self(value))
    }

    /// Returns the prefix as a string.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    fn validate(s: &str) -> Result<(), Error> {
        let reason = if s.is_empty() {
            Some("must not be empty")
        } else if s.len() > 63 {
            Some("must be at most 63 characters")
        } else if !s.chars().all(|c| c.is_ascii_alphanumeric() || c == '-') {
            Some("may only contain letters, digits and '-'")
        } else if s.starts_with('-') || s.ends_with('-') {
            Some("must not start or end with '-'")
        } else {
            None
        };

        match reason {
            Some(reason) => Err(InvalidInputError::DomainPrefix {
                value: s.to_string(),
                reason: reason.to_string(),
            }
            .into()),
            None => Ok(()),
        }
    }
}

impl fmt::Display for DomainPrefix {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for DomainPrefix {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s)
    }
}

impl TryFrom<String> for DomainPrefix {
    type Error = Error;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        Self::new(s)
    }
}

impl From<DomainPrefix> for String {
    fn from(prefix: DomainPrefix) -> Self {
        prefix.0
    }
}
