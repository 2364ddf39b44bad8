//! Export command implementation.

use std::collections::HashSet;
use std::fs::{self, File};
use std::io::{self, BufWriter, Write};
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::Args;
use futures_util::stream::{self, StreamExt};
use serde_json::Value;
use tracing::info;

use till_core::PartialFetch;
use till_http::{ApiClient, Resource};

use crate::output;

#[derive(Args, Debug)]
pub struct ExportArgs {
    /// Resources to export: customers, products, suppliers, users, outlets,
    /// registers, sales, gift-cards, store-credits, audit-log
    #[arg(required = true)]
    pub resources: Vec<Resource>,

    /// Directory for `<resource>.jsonl` files (a single resource goes to
    /// stdout when omitted)
    #[arg(long)]
    pub output_dir: Option<PathBuf>,

    /// Write one pretty-printed JSON array per resource instead of JSON lines
    #[arg(long)]
    pub pretty: bool,

    /// How many resources to fetch at once
    #[arg(long, default_value_t = 4, value_parser = clap::value_parser!(u16).range(1..))]
    pub concurrency: u16,
}

pub async fn run(args: ExportArgs, client: ApiClient) -> Result<()> {
    let mut seen = HashSet::new();
    let resources: Vec<Resource> = args
        .resources
        .iter()
        .copied()
        .filter(|resource| seen.insert(*resource))
        .collect();

    let destination = match (&args.output_dir, resources.len()) {
        (None, 1) => None,
        (dir, _) => {
            let dir = dir.clone().unwrap_or_else(|| PathBuf::from("."));
            fs::create_dir_all(&dir)
                .with_context(|| format!("Failed to create {}", dir.display()))?;
            Some(dir)
        }
    };

    let mut results: Vec<(usize, Resource, Result<Vec<Value>, PartialFetch>)> =
        stream::iter(resources.iter().copied().enumerate())
            .map(|(index, resource)| {
                let client = client.clone();
                async move {
                    let fetched = client
                        .fetch_all(&resource.endpoint(), resource.pagination())
                        .await;
                    (index, resource, fetched)
                }
            })
            .buffer_unordered(usize::from(args.concurrency))
            .collect()
            .await;
    results.sort_by_key(|(index, _, _)| *index);

    let mut incomplete = Vec::new();
    for (_, resource, fetched) in results {
        let records: &[Value] = match &fetched {
            Ok(records) => records,
            Err(partial) => &partial.records,
        };
        let count = records.len();

        let written_to = match &destination {
            Some(dir) => {
                let path = export_path(dir, resource, args.pretty);
                let file = File::create(&path)
                    .with_context(|| format!("Failed to create {}", path.display()))?;
                write_records(BufWriter::new(file), records, args.pretty)
                    .with_context(|| format!("Failed to write {}", path.display()))?;
                path.display().to_string()
            }
            None => {
                write_records(io::stdout().lock(), records, args.pretty)?;
                "stdout".to_string()
            }
        };
        info!(%resource, records = count, to = %written_to, "export written");

        match fetched {
            Ok(_) => output::success(&format!("{resource}: {count} records to {written_to}")),
            Err(partial) => {
                output::error(&format!(
                    "{resource}: incomplete, {count} records from {} pages to {written_to}: {}",
                    partial.pages, partial.source
                ));
                incomplete.push(partial);
            }
        }
    }

    let failed = incomplete.len();
    match incomplete.into_iter().next() {
        None => Ok(()),
        Some(first) => Err(anyhow::Error::new(first).context(format!(
            "export incomplete for {failed} of {} resource(s)",
            resources.len()
        ))),
    }
}

fn export_path(dir: &Path, resource: Resource, pretty: bool) -> PathBuf {
    let extension = if pretty { "json" } else { "jsonl" };
    dir.join(format!("{}.{extension}", resource.name()))
}

fn write_records<W: Write>(mut out: W, records: &[Value], pretty: bool) -> Result<()> {
    if pretty {
        serde_json::to_writer_pretty(&mut out, records)?;
        writeln!(out)?;
    } else {
        for record in records {
            serde_json::to_writer(&mut out, record)?;
            writeln!(out)?;
        }
    }
    out.flush()?;
    Ok(())
}
