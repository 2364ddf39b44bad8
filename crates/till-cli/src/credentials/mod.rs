//! Credential resolution.
//!
//! Flags and `TILL_*` variables win over the saved file. The saved token is
//! only reused for the store it was saved for.

pub mod storage;

use anyhow::{Context, Result, bail};

use till_core::{AccessToken, Credentials, DomainPrefix, TenantUrl};
use till_http::ApiClient;

use crate::cli::ConnectionArgs;
use storage::StoredCredentials;

/// Credentials plus an optional base URL override.
#[derive(Debug, Clone)]
pub struct Profile {
    pub credentials: Credentials,
    pub base_url: Option<TenantUrl>,
}

impl Profile {
    /// Build a profile from flags alone, as `till login` does.
    pub fn from_flags(args: &ConnectionArgs) -> Result<Self> {
        let prefix = args
            .domain_prefix
            .as_deref()
            .context("--domain-prefix (or TILL_DOMAIN_PREFIX) is required")?;
        let token = args
            .token
            .as_deref()
            .context("--token (or TILL_TOKEN) is required")?;
        Self::parse(prefix, token, args.timezone.as_deref(), args.base_url.as_deref())
    }

    /// Merge flags over the saved credentials.
    pub fn resolve(args: &ConnectionArgs, saved: Option<&StoredCredentials>) -> Result<Self> {
        let prefix = match (&args.domain_prefix, saved) {
            (Some(prefix), _) => prefix.as_str(),
            (None, Some(saved)) => saved.domain_prefix.as_str(),
            (None, None) => bail!(
                "No store configured. Pass --domain-prefix and --token, or run 'till login' first."
            ),
        };

        // Only reuse saved settings for the store they were saved for.
        let saved = saved.filter(|saved| saved.domain_prefix.eq_ignore_ascii_case(prefix.trim()));

        let token = match (&args.token, saved) {
            (Some(token), _) => token.as_str(),
            (None, Some(saved)) => saved.token.as_str(),
            (None, None) => bail!(
                "No token for store '{prefix}'. Pass --token, set TILL_TOKEN or run 'till login'."
            ),
        };
        let timezone = args
            .timezone
            .as_deref()
            .or_else(|| saved.and_then(|s| s.timezone.as_deref()));
        let base_url = args
            .base_url
            .as_deref()
            .or_else(|| saved.and_then(|s| s.base_url.as_deref()));

        Self::parse(prefix, token, timezone, base_url)
    }

    fn parse(
        prefix: &str,
        token: &str,
        timezone: Option<&str>,
        base_url: Option<&str>,
    ) -> Result<Self> {
        let prefix = DomainPrefix::new(prefix).context("Invalid domain prefix")?;
        let token = AccessToken::new(token).context("Invalid access token")?;
        let mut credentials = Credentials::new(prefix, token);
        if let Some(timezone) = timezone {
            credentials = credentials.with_timezone(timezone);
        }
        let base_url = base_url
            .map(TenantUrl::new)
            .transpose()
            .context("Invalid base URL")?;

        Ok(Self {
            credentials,
            base_url,
        })
    }

    /// What `till login` should write for this profile.
    pub fn to_stored(&self) -> StoredCredentials {
        StoredCredentials {
            domain_prefix: self.credentials.domain_prefix().to_string(),
            token: self.credentials.token().as_str().to_string(),
            timezone: self.credentials.timezone().map(str::to_string),
            base_url: self.base_url.as_ref().map(ToString::to_string),
        }
    }

    /// A client for this profile with the retry settings from `args`.
    pub fn client(&self, args: &ConnectionArgs) -> Result<ApiClient> {
        let mut builder =
            ApiClient::builder(self.credentials.clone()).retry_policy(args.retry_policy());
        if let Some(base_url) = &self.base_url {
            builder = builder.base_url(base_url.clone());
        }
        if let Some(timeout) = args.timeout() {
            builder = builder.timeout(timeout);
        }
        builder.build().context("Failed to create API client")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn saved() -> StoredCredentials {
        StoredCredentials {
            domain_prefix: "acme".to_string(),
            token: "saved-token".to_string(),
            timezone: Some("Pacific/Auckland".to_string()),
            base_url: None,
        }
    }

    #[test]
    fn saved_credentials_fill_missing_flags() {
        let profile = Profile::resolve(&ConnectionArgs::default(), Some(&saved())).unwrap();
        assert_eq!(profile.credentials.domain_prefix().as_str(), "acme");
        assert_eq!(profile.credentials.token().as_str(), "saved-token");
        assert_eq!(profile.credentials.timezone(), Some("Pacific/Auckland"));
    }

    #[test]
    fn flags_override_saved_credentials() {
        let args = ConnectionArgs {
            token: Some("flag-token".to_string()),
            timezone: Some("Europe/London".to_string()),
            ..Default::default()
        };
        let profile = Profile::resolve(&args, Some(&saved())).unwrap();
        assert_eq!(profile.credentials.token().as_str(), "flag-token");
        assert_eq!(profile.credentials.timezone(), Some("Europe/London"));
    }

    #[test]
    fn saved_token_is_not_reused_for_another_store() {
        let args = ConnectionArgs {
            domain_prefix: Some("other".to_string()),
            ..Default::default()
        };
        let err = Profile::resolve(&args, Some(&saved())).unwrap_err();
        assert!(err.to_string().contains("No token for store 'other'"));
    }

    #[test]
    fn nothing_configured() {
        let err = Profile::resolve(&ConnectionArgs::default(), None).unwrap_err();
        assert!(err.to_string().contains("till login"));
    }

    #[test]
    fn login_requires_prefix_and_token() {
        let args = ConnectionArgs {
            domain_prefix: Some("acme".to_string()),
            ..Default::default()
        };
        assert!(Profile::from_flags(&args).is_err());
    }

    #[test]
    fn stored_form_round_trips() {
        let args = ConnectionArgs {
            domain_prefix: Some("acme".to_string()),
            token: Some("tok".to_string()),
            base_url: Some("http://127.0.0.1:8080".to_string()),
            ..Default::default()
        };
        let stored = Profile::from_flags(&args).unwrap().to_stored();
        assert_eq!(stored.base_url.as_deref(), Some("http://127.0.0.1:8080/"));
        assert!(stored.timezone.is_none());

        let again = Profile::resolve(&ConnectionArgs::default(), Some(&stored)).unwrap();
        assert_eq!(again.to_stored(), stored);
    }
}
