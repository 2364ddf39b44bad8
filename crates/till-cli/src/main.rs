//! till - export and bulk-edit a retail store through its HTTP API.
//!
//! This is a thin wrapper over `till-http`: it resolves credentials, builds
//! one shared client and hands it to the chosen command.

mod cli;
mod commands;
mod credentials;
mod output;

use std::process::ExitCode;

use clap::Parser;
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

use cli::Cli;

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    init_logging(cli.verbose, cli.json_logs);

    match commands::handle(cli.command, cli.connection).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            report(&err);
            ExitCode::FAILURE
        }
    }
}

/// The single place where a failed command turns into process output.
fn report(err: &anyhow::Error) {
    output::error(&format!("{err:#}"));

    let unauthorized = err
        .chain()
        .filter_map(|cause| cause.downcast_ref::<till_core::Error>())
        .any(till_core::Error::is_unauthorized);
    if unauthorized {
        output::hint("check API token: pass --token, set TILL_TOKEN or run 'till login' again");
    }
}

fn init_logging(verbosity: u8, json: bool) {
    let filter = match verbosity {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter));

    if json {
        tracing_subscriber::registry()
            .with(filter)
            .with(fmt::layer().json().with_writer(std::io::stderr))
            .init();
    } else {
        tracing_subscriber::registry()
            .with(filter)
            .with(fmt::layer().with_target(false).with_writer(std::io::stderr))
            .init();
    }
}
