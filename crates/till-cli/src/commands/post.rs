//! Post command implementation.

use std::fs;
use std::path::PathBuf;

use anyhow::{Context, Result, bail};
use clap::Args;
use serde_json::Value;

use till_http::{ApiClient, Resource, run_batch};

use super::finish_batch;

#[derive(Args, Debug)]
pub struct PostArgs {
    /// Resource to create records in, e.g. customers
    pub resource: Resource,

    /// JSON file holding an array of records
    #[arg(long)]
    pub input: PathBuf,

    /// Write a JSON report of the outcome here
    #[arg(long)]
    pub report: Option<PathBuf>,
}

pub async fn run(args: PostArgs, client: ApiClient) -> Result<()> {
    let text = fs::read_to_string(&args.input)
        .with_context(|| format!("Failed to read {}", args.input.display()))?;
    let records: Vec<Value> = serde_json::from_str(&text)
        .with_context(|| format!("{} is not a JSON array", args.input.display()))?;
    if records.is_empty() {
        bail!("{} holds no records", args.input.display());
    }

    let endpoint = args.resource.endpoint();
    let items = records
        .into_iter()
        .enumerate()
        .map(|(index, record)| (label(index, &record), record));
    let report = run_batch(items, |record| {
        let client = client.clone();
        let endpoint = endpoint.clone();
        async move { client.post_json(&endpoint, &record).await }
    })
    .await;

    finish_batch(
        &format!("post {}", args.resource),
        &report,
        args.report.as_deref(),
    )
}

/// Name a record in the report by its id, handle or name, else its position.
fn label(index: usize, record: &Value) -> String {
    ["id", "handle", "name"]
        .iter()
        .find_map(|key| match record.get(key) {
            Some(Value::String(s)) if !s.is_empty() => Some(s.clone()),
            Some(Value::Number(n)) => Some(n.to_string()),
            _ => None,
        })
        .unwrap_or_else(|| format!("#{index}"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn labels_prefer_identifying_fields() {
        assert_eq!(label(0, &json!({"id": "p-1", "name": "Flat white"})), "p-1");
        assert_eq!(label(1, &json!({"handle": "flat-white"})), "flat-white");
        assert_eq!(label(2, &json!({"price": 4.5})), "#2");
    }
}
