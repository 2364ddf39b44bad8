#![allow(dead_code)]

use std::path::{Path, PathBuf};
use std::process::Output;

use serde_json::{Value, json};
use tokio::process::Command;
use wiremock::MockServer;

pub const TEST_TOKEN: &str = "test-token";

/// Run the CLI binary with an isolated HOME, so saved credentials never
/// leak between tests or from the developer's machine.
pub async fn run_cli(args: &[&str], home: &Path) -> Output {
    let mut cmd = Command::new(env!("CARGO_BIN_EXE_till"));
    cmd.args(args)
        .current_dir(home)
        .env("HOME", home)
        .env("XDG_DATA_HOME", home.join("data"))
        .env("NO_COLOR", "1")
        .env_remove("RUST_LOG");
    for var in ["TILL_DOMAIN_PREFIX", "TILL_TOKEN", "TILL_TIMEZONE", "TILL_BASE_URL"] {
        cmd.env_remove(var);
    }
    cmd.output().await.expect("Failed to execute CLI")
}

/// Run the CLI against `server` with explicit credentials.
pub async fn run_against(server: &MockServer, args: &[&str], home: &Path) -> Output {
    let uri = server.uri();
    let mut full = vec!["--domain-prefix", "acme", "--token", TEST_TOKEN, "--base-url", uri.as_str()];
    full.extend_from_slice(args);
    run_cli(&full, home).await
}

pub fn stdout(output: &Output) -> String {
    String::from_utf8_lossy(&output.stdout).to_string()
}

pub fn stderr(output: &Output) -> String {
    String::from_utf8_lossy(&output.stderr).to_string()
}

pub fn assert_success(output: &Output) {
    assert!(
        output.status.success(),
        "CLI command failed\nstdout: {}\nstderr: {}",
        stdout(output),
        stderr(output)
    );
}

/// Where `till login` saves credentials under the isolated HOME.
pub fn credentials_file(home: &Path) -> PathBuf {
    home.join("data").join("till").join("credentials.json")
}

pub fn records(prefix: &str, count: usize) -> Vec<Value> {
    (0..count)
        .map(|i| json!({"id": format!("{prefix}-{i}")}))
        .collect()
}

pub fn versioned_page(data: Vec<Value>, max: u64) -> Value {
    json!({"data": data, "version": {"min": 0, "max": max}})
}

pub fn lines(text: &str) -> Vec<Value> {
    text.lines()
        .map(|line| serde_json::from_str(line).expect("not a JSON line"))
        .collect()
}
