//! Error handling module for the catalog core.
//!
//! Every failure class here is recoverable: callers degrade to the best
//! available local state instead of surfacing a hard error.

/// Application error type.
#[derive(Debug)]
pub enum CoreError {
    /// Remote store unreachable or returned a non-success response
    Transport(String),
    /// Remote document malformed, empty, or otherwise untrustworthy
    Validation(String),
    /// Local cache (SQLite) error
    Cache(String),
    /// JSON encode/decode error
    Serialization(String),
    /// Remote store not configured (no URL/document id)
    Unconfigured,
}

impl CoreError {
    /// Short stable code for log correlation.
    pub fn code(&self) -> &'static str {
        match self {
            CoreError::Transport(_) => "TRANSPORT",
            CoreError::Validation(_) => "VALIDATION",
            CoreError::Cache(_) => "CACHE",
            CoreError::Serialization(_) => "SERIALIZATION",
            CoreError::Unconfigured => "UNCONFIGURED",
        }
    }

    pub fn message(&self) -> String {
        match self {
            CoreError::Transport(msg) => msg.clone(),
            CoreError::Validation(msg) => msg.clone(),
            CoreError::Cache(msg) => msg.clone(),
            CoreError::Serialization(msg) => msg.clone(),
            CoreError::Unconfigured => "remote store is not configured".to_string(),
        }
    }
}

impl std::fmt::Display for CoreError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.code(), self.message())
    }
}

impl std::error::Error for CoreError {}

impl From<sqlx::Error> for CoreError {
    fn from(err: sqlx::Error) -> Self {
        tracing::error!("Cache error: {:?}", err);
        CoreError::Cache(format!("Cache error: {}", err))
    }
}

impl From<reqwest::Error> for CoreError {
    fn from(err: reqwest::Error) -> Self {
        tracing::warn!("Transport error: {:?}", err);
        CoreError::Transport(format!("Transport error: {}", err))
    }
}

impl From<serde_json::Error> for CoreError {
    fn from(err: serde_json::Error) -> Self {
        tracing::error!("JSON error: {:?}", err);
        CoreError::Serialization(format!("JSON error: {}", err))
    }
}
