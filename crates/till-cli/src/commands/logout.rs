//! Logout command implementation.

use anyhow::Result;
use clap::Args;

use crate::credentials::storage;
use crate::output;

#[derive(Args, Debug)]
pub struct LogoutArgs {}

pub fn run(_args: LogoutArgs) -> Result<()> {
    if storage::clear_credentials()? {
        output::success("Saved credentials removed");
    } else {
        output::warn("No saved credentials");
    }
    Ok(())
}
