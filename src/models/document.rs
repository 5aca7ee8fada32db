//! Root document envelope written to the remote store.

use chrono::Utc;
use serde::{Deserialize, Serialize};

use super::Department;

/// Version of the catalog content shipped with this build. Written alongside
/// the departments array so staleness is an explicit comparison instead of a
/// guess from entity counts.
pub const CATALOG_VERSION: u32 = 1;

/// The full catalog as stored remotely.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CatalogDocument {
    pub catalog_version: u32,
    pub generated_at: String,
    pub departments: Vec<Department>,
}

impl CatalogDocument {
    /// Envelope a tree for writing, stamped with the current version.
    pub fn new(departments: Vec<Department>) -> Self {
        Self {
            catalog_version: CATALOG_VERSION,
            generated_at: Utc::now().to_rfc3339(),
            departments,
        }
    }
}
