//! Login command implementation.

use anyhow::{Context, Result};
use clap::Args;
use colored::Colorize;

use till_http::Resource;

use crate::cli::ConnectionArgs;
use crate::credentials::{Profile, storage};
use crate::output;

/// Uses the global --domain-prefix, --token, --timezone and --base-url.
#[derive(Args, Debug)]
pub struct LoginArgs {}

pub async fn run(_args: LoginArgs, connection: &ConnectionArgs) -> Result<()> {
    let profile = Profile::from_flags(connection)?;
    let client = profile.client(connection)?;

    eprintln!("{}", "Checking token...".dimmed());

    let outlets = client
        .versioned_page(&Resource::Outlets.endpoint(), 0)
        .await
        .context("Failed to verify token")?;

    let path = storage::save_credentials(&profile.to_stored())
        .context("Failed to save credentials")?;

    output::success("Logged in successfully");
    output::field("Store", client.base_url().as_str());
    output::field("Outlets", &outlets.len().to_string());
    output::field("Saved to", &path.display().to_string());

    Ok(())
}
