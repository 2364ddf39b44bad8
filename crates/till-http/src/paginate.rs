//! Collection fetches over both pagination protocols.

use serde::de::DeserializeOwned;
use serde_json::Value;
use tracing::{debug, instrument};

use till_core::page::extract_named;
use till_core::{Error, FlakePage, Method, PartialFetch, Result, VersionedPage};

use crate::client::ApiClient;
use crate::endpoints::{Endpoint, Pagination};

impl ApiClient {
    /// Fetch one version-cursor page: records with a version above `after`.
    ///
    /// # Errors
    ///
    /// Request errors, or [`Error::Decode`] if the body is not a page.
    pub async fn versioned_page(&self, endpoint: &Endpoint, after: u64) -> Result<VersionedPage> {
        let body = self
            .send::<()>(Method::Get, endpoint, &[("after", after.to_string())], None)
            .await?;
        serde_json::from_slice(&body)
            .map_err(|e| Error::decode(format!("{endpoint} page after version {after}"), e))
    }

    /// Fetch one flake-cursor page: records before `before`, or the first
    /// page when `before` is empty.
    ///
    /// # Errors
    ///
    /// Request errors, or [`Error::Decode`] if the body is not a page.
    pub async fn flake_page(&self, endpoint: &Endpoint, before: &str) -> Result<FlakePage> {
        let query: Vec<(&str, String)> = if before.is_empty() {
            Vec::new()
        } else {
            vec![("before", before.to_string())]
        };
        let body = self
            .send::<()>(Method::Get, endpoint, &query, None)
            .await?;
        serde_json::from_slice(&body)
            .map_err(|e| Error::decode(format!("{endpoint} page before '{before}'"), e))
    }

    /// Fetch a whole version-cursor collection.
    ///
    /// Starts at version 0 and follows `version.max` until an empty page.
    /// Records come back in fetch order, which is not necessarily the
    /// collection's natural order.
    ///
    /// # Errors
    ///
    /// On any terminal error, including a cursor that stops advancing, the
    /// records fetched so far are returned inside the [`PartialFetch`].
    #[instrument(skip(self), fields(endpoint = %endpoint))]
    pub async fn fetch_all_versioned(
        &self,
        endpoint: &Endpoint,
    ) -> std::result::Result<Vec<Value>, PartialFetch> {
        let mut records = Vec::new();
        let mut pages = 0usize;
        let mut version = 0u64;

        loop {
            let step = match self.versioned_page(endpoint, version).await {
                Ok(page) => page.next_version(version).map(|next| (page, next)),
                Err(err) => Err(err),
            };
            let (page, next) = match step {
                Ok(step) => step,
                Err(source) => return Err(partial(endpoint, records, pages, source)),
            };
            let Some(next) = next else {
                break;
            };

            pages += 1;
            debug!(page = pages, records = page.len(), version = next, "fetched page");
            records.extend(page.into_records());
            version = next;
        }

        debug!(pages, total = records.len(), "collection exhausted");
        Ok(records)
    }

    /// Fetch a whole flake-cursor collection.
    ///
    /// Each page asks for records before the last id of the previous page.
    /// A page of at most one record is the boundary record coming back and
    /// ends the fetch without being added.
    ///
    /// # Errors
    ///
    /// On any terminal error the records fetched so far are returned inside
    /// the [`PartialFetch`].
    #[instrument(skip(self), fields(endpoint = %endpoint))]
    pub async fn fetch_all_flake(
        &self,
        endpoint: &Endpoint,
    ) -> std::result::Result<Vec<Value>, PartialFetch> {
        let mut records = Vec::new();
        let mut pages = 0usize;
        let mut cursor = String::new();

        loop {
            let step = match self.flake_page(endpoint, &cursor).await {
                Ok(page) => page.next_cursor(&cursor).map(|next| (page, next)),
                Err(err) => Err(err),
            };
            let (page, next) = match step {
                Ok(step) => step,
                Err(source) => return Err(partial(endpoint, records, pages, source)),
            };
            let Some(next) = next else {
                debug!(boundary_len = page.len(), "reached boundary page");
                break;
            };

            pages += 1;
            debug!(page = pages, records = page.len(), cursor = %next, "fetched page");
            records.extend(page.into_records());
            cursor = next;
        }

        debug!(pages, total = records.len(), "collection exhausted");
        Ok(records)
    }

    /// Fetch a whole collection with the given protocol.
    ///
    /// # Errors
    ///
    /// See [`fetch_all_versioned`](Self::fetch_all_versioned) and
    /// [`fetch_all_flake`](Self::fetch_all_flake).
    pub async fn fetch_all(
        &self,
        endpoint: &Endpoint,
        pagination: Pagination,
    ) -> std::result::Result<Vec<Value>, PartialFetch> {
        match pagination {
            Pagination::Version => self.fetch_all_versioned(endpoint).await,
            Pagination::Flake => self.fetch_all_flake(endpoint).await,
        }
    }

    /// GET a legacy named-array list such as `{"register_sales": [...]}`.
    ///
    /// # Errors
    ///
    /// Request errors, [`Error::Decode`] for non-JSON bodies, or a protocol
    /// violation if `key` is missing.
    #[instrument(skip(self), fields(endpoint = %endpoint))]
    pub async fn get_named_list(&self, endpoint: &Endpoint, key: &str) -> Result<Vec<Value>> {
        let body: Value = self.get_json(endpoint).await?;
        extract_named(body, key)
    }
}

fn partial(endpoint: &Endpoint, records: Vec<Value>, pages: usize, source: Error) -> PartialFetch {
    PartialFetch {
        resource: endpoint.to_string(),
        records,
        pages,
        source,
    }
}

/// Decode raw records into typed values.
///
/// # Errors
///
/// Returns [`Error::Decode`] naming the index of the first record that
/// does not fit `T`.
pub fn decode_records<T: DeserializeOwned>(records: Vec<Value>) -> Result<Vec<T>> {
    records
        .into_iter()
        .enumerate()
        .map(|(i, record)| {
            serde_json::from_value(record).map_err(|e| Error::decode(format!("record {i}"), e))
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::Deserialize;
    use serde_json::json;

    #[derive(Debug, Deserialize, PartialEq)]
    struct Supplier {
        id: String,
        name: Option<String>,
    }

    #[test]
    fn decode_records_into_structs() {
        let suppliers: Vec<Supplier> = decode_records(vec![
            json!({"id": "s1", "name": "Acme Wholesale", "extra": true}),
            json!({"id": "s2", "name": null}),
        ])
        .unwrap();
        assert_eq!(suppliers[1], Supplier { id: "s2".to_string(), name: None });
    }

    #[test]
    fn decode_records_names_the_bad_index() {
        let err = decode_records::<Supplier>(vec![json!({"id": "s1"}), json!({"name": "x"})])
            .unwrap_err();
        assert!(err.to_string().contains("record 1"));
    }
}
