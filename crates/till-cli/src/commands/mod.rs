//! Subcommand implementations.

mod delete;
mod export;
mod login;
mod logout;
mod post;
mod whoami;

use std::path::Path;

use anyhow::{Context, Result};
use clap::Subcommand;

use till_core::{ApiStatusError, Error};
use till_http::{ApiClient, BatchReport};

use crate::cli::ConnectionArgs;
use crate::credentials::{Profile, storage};
use crate::output;

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Verify a token against the store and save it
    Login(login::LoginArgs),

    /// Forget saved credentials
    Logout(logout::LogoutArgs),

    /// Show which store and settings are in effect
    Whoami(whoami::WhoamiArgs),

    /// Download whole collections as JSON lines
    Export(export::ExportArgs),

    /// Delete records listed in a file, one request per id
    Delete(delete::DeleteArgs),

    /// Create records from a JSON array file, one request per record
    Post(post::PostArgs),
}

pub async fn handle(command: Command, connection: ConnectionArgs) -> Result<()> {
    match command {
        Command::Login(args) => login::run(args, &connection).await,
        Command::Logout(args) => logout::run(args),
        Command::Whoami(args) => whoami::run(args, &connection),
        Command::Export(args) => export::run(args, connect(&connection)?).await,
        Command::Delete(args) => delete::run(args, connect(&connection)?).await,
        Command::Post(args) => post::run(args, connect(&connection)?).await,
    }
}

/// Resolve credentials and build the shared client.
fn connect(connection: &ConnectionArgs) -> Result<ApiClient> {
    let saved = storage::load_credentials()?;
    let profile = Profile::resolve(connection, saved.as_ref())?;
    profile.client(connection)
}

/// Print a batch summary, write the report if asked, and fail only when
/// the batch stopped early.
fn finish_batch(what: &str, report: &BatchReport, report_path: Option<&Path>) -> Result<()> {
    if let Some(path) = report_path {
        let json = serde_json::to_string_pretty(report)?;
        std::fs::write(path, json)
            .with_context(|| format!("Failed to write report {}", path.display()))?;
    }

    if report.failures.is_empty() {
        output::success(&format!("{what}: {} of {} succeeded", report.succeeded, report.attempted));
    } else {
        output::warn(&format!(
            "{what}: {} of {} succeeded, {} failed",
            report.succeeded,
            report.attempted,
            report.failures.len()
        ));
        if report_path.is_none() {
            for failure in &report.failures {
                eprintln!("  {}: {}", failure.item, failure.reason);
            }
        }
    }

    if report.aborted.is_some() {
        let err = Error::Status(ApiStatusError::Unauthorized { body: None });
        return Err(anyhow::Error::new(err).context(format!(
            "{what} stopped after {} item(s)",
            report.attempted
        )));
    }

    Ok(())
}
