//! CLI argument definitions.

use std::time::Duration;

use clap::{Args, Parser};

use till_core::RetryPolicy;

use crate::commands::Command;

/// Export and bulk-edit a retail store through its API.
#[derive(Parser, Debug)]
#[command(name = "till")]
#[command(author, version = env!("TILL_VERSION"), about, long_about = None)]
pub struct Cli {
    /// Increase verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Output logs as JSON
    #[arg(long, global = true)]
    pub json_logs: bool,

    #[command(flatten)]
    pub connection: ConnectionArgs,

    #[command(subcommand)]
    pub command: Command,
}

/// Where and how to reach the store. Anything left unset falls back to the
/// credentials saved by `till login`.
#[derive(Args, Debug, Clone, Default)]
pub struct ConnectionArgs {
    /// Store domain prefix (the `acme` in acme.vendhq.com)
    #[arg(long, env = "TILL_DOMAIN_PREFIX", global = true)]
    pub domain_prefix: Option<String>,

    /// Personal access token
    #[arg(long, env = "TILL_TOKEN", global = true, hide_env_values = true)]
    pub token: Option<String>,

    /// Store timezone, e.g. Pacific/Auckland
    #[arg(long, env = "TILL_TIMEZONE", global = true)]
    pub timezone: Option<String>,

    /// Override the store URL (defaults to https://<prefix>.vendhq.com)
    #[arg(long, env = "TILL_BASE_URL", global = true)]
    pub base_url: Option<String>,

    /// Give up after this many consecutive network failures
    #[arg(long, global = true)]
    pub max_retries: Option<u32>,

    /// Give up on a request once retrying it has taken this many seconds
    #[arg(long, global = true)]
    pub deadline_secs: Option<u64>,

    /// Per-request timeout in seconds
    #[arg(long, global = true)]
    pub timeout_secs: Option<u64>,
}

impl ConnectionArgs {
    /// The retry policy these flags describe.
    pub fn retry_policy(&self) -> RetryPolicy {
        let mut policy = RetryPolicy::default();
        if let Some(retries) = self.max_retries {
            policy = policy.with_max_network_retries(retries);
        }
        if let Some(secs) = self.deadline_secs {
            policy = policy.with_deadline(Duration::from_secs(secs));
        }
        policy
    }

    pub fn timeout(&self) -> Option<Duration> {
        self.timeout_secs.map(Duration::from_secs)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn verify_cli() {
        Cli::command().debug_assert();
    }

    #[test]
    fn default_policy_retries_forever() {
        let policy = ConnectionArgs::default().retry_policy();
        assert_eq!(policy, RetryPolicy::default());
    }

    #[test]
    fn flags_tighten_policy() {
        let args = ConnectionArgs {
            max_retries: Some(3),
            deadline_secs: Some(600),
            ..Default::default()
        };
        let policy = args.retry_policy();
        assert_eq!(policy.max_network_retries, Some(3));
        assert_eq!(policy.deadline, Some(Duration::from_secs(600)));
    }
}
