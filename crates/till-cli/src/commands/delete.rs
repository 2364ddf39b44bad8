//! Delete command implementation.

use std::fs;
use std::path::PathBuf;

use anyhow::{Context, Result, bail};
use clap::Args;

use till_http::{ApiClient, Resource, run_batch};

use super::finish_batch;

#[derive(Args, Debug)]
pub struct DeleteArgs {
    /// Resource the ids belong to, e.g. customers
    pub resource: Resource,

    /// File with one id per line (blank lines and `#` comments are skipped)
    #[arg(long)]
    pub ids_file: PathBuf,

    /// Write a JSON report of the outcome here
    #[arg(long)]
    pub report: Option<PathBuf>,
}

pub async fn run(args: DeleteArgs, client: ApiClient) -> Result<()> {
    let text = fs::read_to_string(&args.ids_file)
        .with_context(|| format!("Failed to read {}", args.ids_file.display()))?;
    let ids = parse_ids(&text);
    if ids.is_empty() {
        bail!("{} lists no ids", args.ids_file.display());
    }

    let endpoint = args.resource.endpoint();
    let report = run_batch(ids.into_iter().map(|id| (id.clone(), id)), |id| {
        let client = client.clone();
        let endpoint = endpoint.join(&id);
        async move { client.delete(&endpoint).await }
    })
    .await;

    finish_batch(
        &format!("delete {}", args.resource),
        &report,
        args.report.as_deref(),
    )
}

fn parse_ids(text: &str) -> Vec<String> {
    text.lines()
        .map(str::trim)
        .filter(|line| !line.is_empty() && !line.starts_with('#'))
        .map(str::to_string)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ids_skip_blanks_and_comments() {
        let ids = parse_ids("# exported 2026-10-01\nc-1\n\n  c-2  \n#c-3\n");
        assert_eq!(ids, vec!["c-1", "c-2"]);
    }
}
