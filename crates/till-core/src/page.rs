//! Page envelopes and cursor advancement for both pagination protocols.
//!
//! *Version cursor* endpoints answer `{data: [...], version: {min, max}}`;
//! the next page is requested with `after=<max>` and an empty page ends
//! the collection.
//!
//! *Flake cursor* endpoints answer `{data: [...]}`; the next page is
//! requested with `before=<id of the last record>`. Because the boundary
//! record comes back again, a page holding at most one record carries no
//! new data and ends the collection.

use serde::Deserialize;
use serde_json::Value;

use crate::error::Error;

/// `version` block of a version-cursor page.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
pub struct VersionRange {
    #[serde(default)]
    pub min: Option<u64>,
    pub max: u64,
}

/// One page from a version-cursor endpoint.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct VersionedPage {
    #[serde(default)]
    pub data: Option<Vec<Value>>,
    #[serde(default)]
    pub version: Option<VersionRange>,
}

impl VersionedPage {
    /// Number of records on this page.
    pub fn len(&self) -> usize {
        self.data.as_ref().map_or(0, Vec::len)
    }

    /// Whether this page holds no records.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Decide where the next request starts.
    ///
    /// Returns `Ok(None)` when the page is empty (collection exhausted) and
    /// `Ok(Some(max))` when the cursor advanced.
    ///
    /// # Errors
    ///
    /// A non-empty page without a `version` block, or whose `max` does not
    /// exceed `current`, would make the loop spin forever and is reported as
    /// a protocol violation.
    pub fn next_version(&self, current: u64) -> Result<Option<u64>, Error> {
        if self.is_empty() {
            return Ok(None);
        }
        let Some(version) = self.version else {
            return Err(Error::protocol(format!(
                "page of {} record(s) after version {current} has no version block",
                self.len()
            )));
        };
        if version.max <= current {
            return Err(Error::protocol(format!(
                "version cursor did not advance: page of {} record(s) after version {current} reported max {}",
                self.len(),
                version.max
            )));
        }
        Ok(Some(version.max))
    }

    /// Take the page's records.
    pub fn into_records(self) -> Vec<Value> {
        self.data.unwrap_or_default()
    }
}

/// One page from a flake-cursor endpoint.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct FlakePage {
    #[serde(default)]
    pub data: Option<Vec<Value>>,
}

impl FlakePage {
    /// Number of records on this page.
    pub fn len(&self) -> usize {
        self.data.as_ref().map_or(0, Vec::len)
    }

    /// Whether this page holds no records.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Whether this page ends the collection.
    ///
    /// A page of one record is the boundary record of the previous page
    /// repeated, not new data.
    pub fn is_boundary(&self) -> bool {
        self.len() <= 1
    }

    /// Decide the `before` cursor for the next request.
    ///
    /// Returns `Ok(None)` for a boundary page and otherwise the `id` of the
    /// page's last record.
    ///
    /// # Errors
    ///
    /// A last record without a usable `id`, or an id equal to `previous`,
    /// is reported as a protocol violation.
    pub fn next_cursor(&self, previous: &str) -> Result<Option<String>, Error> {
        if self.is_boundary() {
            return Ok(None);
        }
        let last = self.data.as_ref().and_then(|data| data.last());
        let cursor = last.and_then(|record| record.get("id")).and_then(id_string);
        let Some(cursor) = cursor else {
            return Err(Error::protocol(format!(
                "last record of a {}-record page has no usable id",
                self.len()
            )));
        };
        if cursor == previous {
            return Err(Error::protocol(format!(
                "flake cursor did not advance past '{previous}'"
            )));
        }
        Ok(Some(cursor))
    }

    /// Take the page's records.
    pub fn into_records(self) -> Vec<Value> {
        self.data.unwrap_or_default()
    }
}

fn id_string(id: &Value) -> Option<String> {
    match id {
        Value::String(s) if !s.is_empty() => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

/// Pull the array stored under `key` out of a named-array envelope such as
/// `{"register_sales": [...]}`.
///
/// # Errors
///
/// Returns a protocol violation if the body is not an object or `key` is
/// missing or not an array. A `null` value counts as an empty list.
pub fn extract_named(body: Value, key: &str) -> Result<Vec<Value>, Error> {
    let Value::Object(mut map) = body else {
        return Err(Error::protocol(format!(
            "expected an object holding '{key}'"
        )));
    };
    match map.remove(key) {
        Some(Value::Array(items)) => Ok(items),
        Some(Value::Null) => Ok(Vec::new()),
        Some(_) => Err(Error::protocol(format!("'{key}' is not an array"))),
        None => Err(Error::protocol(format!("response has no '{key}' field"))),
    }
}
