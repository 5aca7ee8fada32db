//! SQLite-backed local cache.
//!
//! The localStorage analog from the browser app: a single string-keyed table
//! holding the serialized tree, the upvoted-contribution ledger, and the
//! theme preference. Used as the offline copy when the remote store is
//! unavailable.

use std::collections::HashSet;
use std::path::Path;
use std::str::FromStr;

use chrono::Utc;
use sqlx::sqlite::{SqliteConnectOptions, SqlitePool, SqlitePoolOptions};
use sqlx::Row;

use super::RawDocument;
use crate::errors::CoreError;
use crate::models::Department;

/// Cache key for the serialized catalog tree.
const DATA_KEY: &str = "lablink_data";
/// Cache key for the upvoted-contribution id list.
const UPVOTED_KEY: &str = "lablink_upvoted";
/// Cache key for the theme preference.
const THEME_KEY: &str = "lablink_theme";

/// Initialize the cache connection pool and run migrations.
pub async fn init_cache(cache_path: &Path) -> Result<SqlitePool, sqlx::Error> {
    // Ensure the parent directory exists
    if let Some(parent) = cache_path.parent() {
        tokio::fs::create_dir_all(parent).await.ok();
    }

    let db_url = format!("sqlite:{}?mode=rwc", cache_path.display());

    let options = SqliteConnectOptions::from_str(&db_url)?
        .create_if_missing(true)
        .journal_mode(sqlx::sqlite::SqliteJournalMode::Wal)
        .synchronous(sqlx::sqlite::SqliteSynchronous::Normal)
        .busy_timeout(std::time::Duration::from_secs(30));

    let pool = SqlitePoolOptions::new()
        .max_connections(5)
        .connect_with(options)
        .await?;

    run_migrations(&pool).await?;

    Ok(pool)
}

async fn run_migrations(pool: &SqlitePool) -> Result<(), sqlx::Error> {
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS kv (
            key TEXT PRIMARY KEY,
            value TEXT NOT NULL,
            updated_at TEXT NOT NULL
        );
        "#,
    )
    .execute(pool)
    .await?;

    Ok(())
}

/// String-keyed local store.
#[derive(Clone)]
pub struct LocalCache {
    pool: SqlitePool,
}

impl LocalCache {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    async fn get(&self, key: &str) -> Result<Option<String>, CoreError> {
        let row = sqlx::query("SELECT value FROM kv WHERE key = ?")
            .bind(key)
            .fetch_optional(&self.pool)
            .await?;
        Ok(row.map(|r| r.get("value")))
    }

    async fn set(&self, key: &str, value: &str) -> Result<(), CoreError> {
        let now = Utc::now().to_rfc3339();
        sqlx::query(
            "INSERT INTO kv (key, value, updated_at) VALUES (?, ?, ?) \
             ON CONFLICT(key) DO UPDATE SET value = excluded.value, updated_at = excluded.updated_at",
        )
        .bind(key)
        .bind(value)
        .bind(&now)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    /// Load the cached catalog document, if any. Corrupt entries count as
    /// absent so a bad cache never blocks startup.
    pub async fn load_catalog_raw(&self) -> Option<RawDocument> {
        let raw = self.get(DATA_KEY).await.ok().flatten()?;
        match serde_json::from_str(&raw) {
            Ok(document) => Some(document),
            Err(e) => {
                tracing::warn!("Cached catalog is corrupt, ignoring it: {}", e);
                None
            }
        }
    }

    /// Persist the catalog tree.
    pub async fn save_catalog(&self, tree: &[Department]) -> Result<(), CoreError> {
        let json = serde_json::to_string(tree)?;
        self.set(DATA_KEY, &json).await
    }

    /// Contribution ids this identity has already upvoted.
    pub async fn load_upvoted(&self) -> HashSet<String> {
        let Some(raw) = self.get(UPVOTED_KEY).await.ok().flatten() else {
            return HashSet::new();
        };
        match serde_json::from_str::<Vec<String>>(&raw) {
            Ok(ids) => ids.into_iter().collect(),
            Err(e) => {
                tracing::warn!("Upvote ledger is corrupt, resetting it: {}", e);
                HashSet::new()
            }
        }
    }

    /// Persist the upvote ledger. Sorted for a stable stored form.
    pub async fn save_upvoted(&self, ids: &HashSet<String>) -> Result<(), CoreError> {
        let mut list: Vec<&String> = ids.iter().collect();
        list.sort();
        let json = serde_json::to_string(&list)?;
        self.set(UPVOTED_KEY, &json).await
    }

    /// Stored theme preference, if any.
    pub async fn theme(&self) -> Option<String> {
        self.get(THEME_KEY).await.ok().flatten()
    }

    pub async fn set_theme(&self, theme: &str) -> Result<(), CoreError> {
        self.set(THEME_KEY, theme).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    async fn open_cache(dir: &TempDir) -> LocalCache {
        let pool = init_cache(&dir.path().join("cache.sqlite"))
            .await
            .expect("Failed to init cache");
        LocalCache::new(pool)
    }

    #[tokio::test]
    async fn test_catalog_round_trip() {
        let dir = TempDir::new().unwrap();
        let cache = open_cache(&dir).await;

        let tree = crate::fallback::catalog();
        cache.save_catalog(&tree).await.unwrap();

        let raw = cache.load_catalog_raw().await.expect("cached tree");
        let back: Vec<Department> = serde_json::from_value(raw).unwrap();
        assert_eq!(back, tree);
    }

    #[tokio::test]
    async fn test_missing_catalog_is_none() {
        let dir = TempDir::new().unwrap();
        let cache = open_cache(&dir).await;
        assert!(cache.load_catalog_raw().await.is_none());
    }

    #[tokio::test]
    async fn test_corrupt_catalog_is_ignored() {
        let dir = TempDir::new().unwrap();
        let cache = open_cache(&dir).await;
        cache.set(DATA_KEY, "{not json").await.unwrap();
        assert!(cache.load_catalog_raw().await.is_none());
    }

    #[tokio::test]
    async fn test_upvote_ledger_round_trip() {
        let dir = TempDir::new().unwrap();
        let cache = open_cache(&dir).await;

        let mut ids = HashSet::new();
        ids.insert("c-1".to_string());
        ids.insert("c-2".to_string());
        cache.save_upvoted(&ids).await.unwrap();

        assert_eq!(cache.load_upvoted().await, ids);
    }

    #[tokio::test]
    async fn test_theme_round_trip() {
        let dir = TempDir::new().unwrap();
        let cache = open_cache(&dir).await;

        assert!(cache.theme().await.is_none());
        cache.set_theme("dark").await.unwrap();
        assert_eq!(cache.theme().await.as_deref(), Some("dark"));
    }
}
