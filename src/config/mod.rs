//! Configuration module for the catalog core.
//!
//! All configuration is loaded from environment variables with sensible defaults.

use std::env;
use std::path::PathBuf;

/// Application configuration loaded from environment variables.
#[derive(Debug, Clone)]
pub struct Config {
    /// Base URL of the remote document store (unset disables remote sync)
    pub store_url: Option<String>,
    /// Pre-provisioned document id holding the catalog
    pub store_doc_id: Option<String>,
    /// Access key sent with every store request
    pub store_key: Option<String>,
    /// Admin key for gated mutations (unset opens the gate in dev mode)
    pub admin_key: Option<String>,
    /// Path to the SQLite cache file (localStorage analog)
    pub cache_path: PathBuf,
    /// Endpoint of the viva question generator (unset disables AI features)
    pub ai_url: Option<String>,
    /// API key for the viva question generator
    pub ai_key: Option<String>,
    /// Quiet window for coalescing remote writes, in milliseconds
    pub debounce_ms: u64,
    /// Log level (trace, debug, info, warn, error)
    pub log_level: String,
}

impl Config {
    /// Load configuration from environment variables.
    pub fn from_env() -> Self {
        dotenvy::dotenv().ok();

        let store_url = env::var("LABLINK_STORE_URL").ok();
        let store_doc_id = env::var("LABLINK_STORE_DOC_ID").ok();
        let store_key = env::var("LABLINK_STORE_KEY").ok();
        let admin_key = env::var("LABLINK_ADMIN_KEY").ok();

        let cache_path = env::var("LABLINK_CACHE_PATH")
            .unwrap_or_else(|_| "./data/lablink.sqlite".to_string())
            .into();

        let ai_url = env::var("LABLINK_AI_URL").ok();
        let ai_key = env::var("LABLINK_AI_KEY").ok();

        let debounce_ms = env::var("LABLINK_DEBOUNCE_MS")
            .map(|v| v.parse().expect("Invalid LABLINK_DEBOUNCE_MS format"))
            .unwrap_or(1500);

        let log_level = env::var("LABLINK_LOG_LEVEL").unwrap_or_else(|_| "info".to_string());

        Self {
            store_url,
            store_doc_id,
            store_key,
            admin_key,
            cache_path,
            ai_url,
            ai_key,
            debounce_ms,
            log_level,
        }
    }
}
