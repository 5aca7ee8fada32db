//! Bundled default catalog.
//!
//! The last-resort load source: available with zero connectivity, and the
//! authority for structural metadata (names, codes, titles, objectives,
//! links) during reconciliation. Never authoritative for contributions.

use once_cell::sync::Lazy;

use crate::models::Department;

static DEFAULT_CATALOG_JSON: &str = include_str!("default_catalog.json");

static BUNDLED: Lazy<Vec<Department>> = Lazy::new(|| {
    serde_json::from_str(DEFAULT_CATALOG_JSON).expect("bundled catalog must be valid JSON")
});

/// The bundled catalog, parsed once per process.
pub fn catalog() -> Vec<Department> {
    BUNDLED.clone()
}
