//! HTTP adapter for a JSON-bin style document store.
//!
//! One GET-like "latest value" read and one PUT-like "replace value" write,
//! keyed by a pre-provisioned document id.

use reqwest::{Client, StatusCode};

use super::{DocumentStore, RawDocument};
use crate::config::Config;
use crate::errors::CoreError;
use crate::models::{CatalogDocument, Department};

/// Header carrying the store access key.
const ACCESS_KEY_HEADER: &str = "X-Master-Key";

#[derive(Debug, Clone)]
struct Endpoint {
    document_url: String,
    access_key: Option<String>,
}

/// HTTP-backed document store.
///
/// An unconfigured instance stays usable offline: fetch reports unavailable
/// and write is a warned no-op.
#[derive(Debug, Clone)]
pub struct HttpDocumentStore {
    client: Client,
    endpoint: Option<Endpoint>,
}

impl HttpDocumentStore {
    pub fn new(base_url: &str, doc_id: &str, access_key: Option<String>) -> Self {
        let document_url = format!("{}/{}", base_url.trim_end_matches('/'), doc_id);
        Self {
            client: Client::new(),
            endpoint: Some(Endpoint {
                document_url,
                access_key,
            }),
        }
    }

    /// Build from config. A missing URL or document id yields an
    /// unconfigured store.
    pub fn from_config(config: &Config) -> Self {
        match (&config.store_url, &config.store_doc_id) {
            (Some(url), Some(doc_id)) => Self::new(url, doc_id, config.store_key.clone()),
            _ => {
                tracing::warn!(
                    "Remote store not configured (LABLINK_STORE_URL / LABLINK_STORE_DOC_ID). \
                     Catalog changes will not be shared."
                );
                Self {
                    client: Client::new(),
                    endpoint: None,
                }
            }
        }
    }
}

impl DocumentStore for HttpDocumentStore {
    async fn fetch(&self) -> Result<RawDocument, CoreError> {
        let Some(endpoint) = &self.endpoint else {
            return Err(CoreError::Unconfigured);
        };

        let mut request = self
            .client
            .get(format!("{}/latest", endpoint.document_url));
        if let Some(key) = &endpoint.access_key {
            request = request.header(ACCESS_KEY_HEADER, key);
        }

        let response = request.send().await?;
        let status = response.status();

        if status == StatusCode::NOT_FOUND {
            return Err(CoreError::Transport(
                "Document not found; check the document id".to_string(),
            ));
        }
        if status == StatusCode::UNAUTHORIZED || status == StatusCode::FORBIDDEN {
            return Err(CoreError::Transport(
                "Store authentication rejected; check the access key".to_string(),
            ));
        }
        if !status.is_success() {
            return Err(CoreError::Transport(format!("Fetch failed: {}", status)));
        }

        let document: RawDocument = response.json().await?;
        Ok(unwrap_record(document))
    }

    async fn write(&self, tree: &[Department]) -> Result<(), CoreError> {
        let Some(endpoint) = &self.endpoint else {
            tracing::warn!("Catalog not saved remotely: store is not configured");
            return Ok(());
        };

        let document = CatalogDocument::new(tree.to_vec());
        let mut request = self
            .client
            .put(&endpoint.document_url)
            .json(&document);
        if let Some(key) = &endpoint.access_key {
            request = request.header(ACCESS_KEY_HEADER, key);
        }

        let response = request.send().await?;
        let status = response.status();
        if !status.is_success() {
            return Err(CoreError::Transport(format!("Write failed: {}", status)));
        }

        tracing::debug!("Catalog document written to the remote store");
        Ok(())
    }
}

/// Some providers wrap the stored value in a `{record, metadata}` envelope.
fn unwrap_record(document: RawDocument) -> RawDocument {
    match document {
        RawDocument::Object(mut map) if map.contains_key("record") => {
            map.remove("record").unwrap_or(RawDocument::Null)
        }
        other => other,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_unwrap_record_envelope() {
        let wrapped = json!({"record": [{"id": "dept-1"}], "metadata": {"id": "abc"}});
        assert_eq!(unwrap_record(wrapped), json!([{"id": "dept-1"}]));
    }

    #[test]
    fn test_unwrap_record_passthrough() {
        let bare = json!([{"id": "dept-1"}]);
        assert_eq!(unwrap_record(bare.clone()), bare);
    }

    #[tokio::test]
    async fn test_unconfigured_store_degrades() {
        let store = HttpDocumentStore {
            client: Client::new(),
            endpoint: None,
        };

        assert!(matches!(
            store.fetch().await,
            Err(CoreError::Unconfigured)
        ));
        // Writes are a silent no-op, matching offline use.
        assert!(store.write(&[]).await.is_ok());
    }
}
