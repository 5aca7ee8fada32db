//! Document store adapters.
//!
//! The remote store holds the entire catalog as one JSON document; the local
//! cache is the offline copy of the same document plus per-browser state.

mod cache;
mod http;

pub use cache::*;
pub use http::*;

use std::future::Future;

use crate::errors::CoreError;
use crate::models::Department;

/// Opaque JSON payload fetched from a store, validated by the reconciler.
pub type RawDocument = serde_json::Value;

/// Fetch/replace access to the shared catalog document.
///
/// Every failure is non-fatal to the caller: it reports "unavailable" and the
/// caller falls back to local data.
pub trait DocumentStore {
    /// Fetch the latest document.
    fn fetch(&self) -> impl Future<Output = Result<RawDocument, CoreError>> + Send;

    /// Replace the document with the given tree. There is no partial-update
    /// protocol; every write replaces the whole document.
    fn write(&self, tree: &[Department]) -> impl Future<Output = Result<(), CoreError>> + Send;
}
