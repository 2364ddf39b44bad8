//! Saved credentials on disk.

use std::fs;
use std::path::PathBuf;

use anyhow::{Context, Result};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};

#[cfg(unix)]
use std::os::unix::fs::PermissionsExt;

/// What `till login` writes to disk.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoredCredentials {
    pub domain_prefix: String,
    pub token: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timezone: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub base_url: Option<String>,
}

/// Path of the credentials file inside the platform data directory.
pub fn credentials_path() -> Result<PathBuf> {
    let dirs = ProjectDirs::from("", "", "till").context("Could not determine data directory")?;

    let data_dir = dirs.data_dir();
    fs::create_dir_all(data_dir).context("Failed to create data directory")?;

    Ok(data_dir.join("credentials.json"))
}

/// Save credentials, readable only by the current user.
pub fn save_credentials(stored: &StoredCredentials) -> Result<PathBuf> {
    let path = credentials_path()?;
    let json = serde_json::to_string_pretty(stored)?;

    fs::write(&path, &json).context("Failed to write credentials file")?;

    #[cfg(unix)]
    {
        let mut perms = fs::metadata(&path)?.permissions();
        perms.set_mode(0o600);
        fs::set_permissions(&path, perms)?;
    }

    Ok(path)
}

/// Load saved credentials, if any.
pub fn load_credentials() -> Result<Option<StoredCredentials>> {
    let path = credentials_path()?;

    if !path.exists() {
        return Ok(None);
    }

    let json = fs::read_to_string(&path).context("Failed to read credentials file")?;
    let stored = serde_json::from_str(&json)
        .with_context(|| format!("Invalid credentials file {}", path.display()))?;
    Ok(Some(stored))
}

/// Remove saved credentials. Returns whether a file was removed.
pub fn clear_credentials() -> Result<bool> {
    let path = credentials_path()?;

    if !path.exists() {
        return Ok(false);
    }

    fs::remove_file(&path).context("Failed to remove credentials file")?;
    Ok(true)
}
