//! Whoami command implementation.

use anyhow::Result;
use clap::Args;

use crate::cli::ConnectionArgs;
use crate::credentials::{Profile, storage};
use crate::output;

#[derive(Args, Debug)]
pub struct WhoamiArgs {}

pub fn run(_args: WhoamiArgs, connection: &ConnectionArgs) -> Result<()> {
    let saved = storage::load_credentials()?;
    let profile = Profile::resolve(connection, saved.as_ref())?;
    let client = profile.client(connection)?;

    output::field("Store", profile.credentials.domain_prefix().as_str());
    output::field("URL", client.base_url().as_str());
    output::field("Timezone", client.timezone().unwrap_or("(not set)"));
    output::field("Saved", if saved.is_some() { "yes" } else { "no" });
    output::field("Version", env!("TILL_VERSION"));

    Ok(())
}
