//! `SQLite`-backed key-value medium.
//!
//! Values live in a single `kv_store` table created by the embedded
//! migrations. Writes are upserts, so each `set` overwrites the whole value.

use crate::error::{Result, StoreError};
use crate::kv::KeyValueStore;
use async_trait::async_trait;
use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions};
use sqlx::{Pool, Sqlite};
use std::path::Path;
use std::str::FromStr;

/// Key-value store on top of an `SQLx` `SQLite` pool.
#[derive(Debug, Clone)]
pub struct SqliteKvStore {
    pool: Pool<Sqlite>,
}

impl SqliteKvStore {
    /// Open (or create) the database file and apply pending migrations.
    ///
    /// # Errors
    /// Returns `StoreError` if:
    /// - The path is not valid UTF-8
    /// - The database file cannot be opened or created
    /// - A migration fails
    pub async fn open(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                tokio::fs::create_dir_all(parent).await?;
            }
        }

        let path_str = path
            .to_str()
            .ok_or_else(|| StoreError::Open("invalid database path: not valid UTF-8".to_string()))?;

        let connect_options = SqliteConnectOptions::from_str(path_str)
            .map_err(|e| StoreError::Open(format!("invalid connection string: {e}")))?
            .create_if_missing(true);

        let pool = SqlitePoolOptions::new()
            .max_connections(5)
            .connect_with(connect_options)
            .await
            .map_err(|e| StoreError::Open(format!("failed to open {path_str}: {e}")))?;

        tracing::info!("Record database opened at {}", path_str);

        Self::from_pool(pool).await
    }

    /// Open a private in-memory database.
    ///
    /// The pool is limited to one connection: every `SQLite` in-memory
    /// connection is its own database.
    pub async fn in_memory() -> Result<Self> {
        let connect_options = SqliteConnectOptions::from_str(":memory:")
            .map_err(|e| StoreError::Open(format!("invalid connection string: {e}")))?;

        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .connect_with(connect_options)
            .await
            .map_err(|e| StoreError::Open(format!("failed to open in-memory database: {e}")))?;

        Self::from_pool(pool).await
    }

    async fn from_pool(pool: Pool<Sqlite>) -> Result<Self> {
        migrate(&pool).await?;
        Ok(Self { pool })
    }

    /// Get a reference to the underlying `SQLx` pool.
    #[must_use]
    pub fn pool(&self) -> &Pool<Sqlite> {
        &self.pool
    }

    /// Close the connection pool gracefully.
    pub async fn close(self) {
        self.pool.close().await;
        tracing::info!("Record database closed");
    }
}

/// Apply the embedded migrations; already-applied ones are skipped.
async fn migrate(pool: &Pool<Sqlite>) -> Result<()> {
    sqlx::migrate!("./migrations")
        .run(pool)
        .await
        .map_err(|e| StoreError::Migration(e.to_string()))?;
    tracing::debug!("kv_store schema up to date");
    Ok(())
}

#[async_trait]
impl KeyValueStore for SqliteKvStore {
    async fn get(&self, key: &str) -> Result<Option<String>> {
        let row: Option<(String,)> = sqlx::query_as(
            r"
            SELECT value
            FROM kv_store
            WHERE key = ?
            ",
        )
        .bind(key)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.map(|(value,)| value))
    }

    async fn set(&self, key: &str, value: &str) -> Result<()> {
        sqlx::query(
            r"
            INSERT INTO kv_store (key, value, updated_at)
            VALUES (?, ?, ?)
            ON CONFLICT(key) DO UPDATE SET
                value = excluded.value,
                updated_at = excluded.updated_at
            ",
        )
        .bind(key)
        .bind(value)
        .bind(chrono::Utc::now().to_rfc3339())
        .execute(&self.pool)
        .await
        .map_err(|e| StoreError::Write {
            key: key.to_string(),
            reason: e.to_string(),
        })?;

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[tokio::test]
    async fn test_schema_has_kv_table_and_migrates_once() {
        let store = SqliteKvStore::in_memory().await.expect("open store");
        migrate(store.pool()).await.expect("second run is a no-op");

        let tables: Vec<String> = sqlx::query_scalar(
            "SELECT name FROM sqlite_master WHERE type = 'table' AND name != '_sqlx_migrations' AND name NOT LIKE 'sqlite_%'",
        )
        .fetch_all(store.pool())
        .await
        .expect("list tables");
        assert_eq!(tables, ["kv_store"]);

        let applied: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM _sqlx_migrations")
            .fetch_one(store.pool())
            .await
            .expect("count migrations");
        assert_eq!(applied, 1);
    }

    #[tokio::test]
    async fn test_set_and_get() {
        let store = SqliteKvStore::in_memory().await.expect("open store");

        store.set("clients", "[]").await.expect("set value");
        let value = store.get("clients").await.expect("get value");
        assert_eq!(value, Some("[]".to_string()));
    }

    #[tokio::test]
    async fn test_get_missing_key() {
        let store = SqliteKvStore::in_memory().await.expect("open store");
        assert_eq!(store.get("does_not_exist").await.expect("get value"), None);
    }

    #[tokio::test]
    async fn test_set_overwrites() {
        let store = SqliteKvStore::in_memory().await.expect("open store");

        store.set("clients", "[1]").await.expect("first write");
        store.set("clients", "[1,2]").await.expect("second write");

        assert_eq!(
            store.get("clients").await.expect("get value"),
            Some("[1,2]".to_string())
        );
    }

    #[tokio::test]
    async fn test_file_survives_reopen() {
        let tmp = TempDir::new().expect("create temp dir");
        let path = tmp.path().join("data").join("consulta.db");

        let store = SqliteKvStore::open(&path).await.expect("open store");
        store.set("clients", "[\"x\"]").await.expect("set value");
        store.close().await;

        let reopened = SqliteKvStore::open(&path).await.expect("reopen store");
        assert_eq!(
            reopened.get("clients").await.expect("get value"),
            Some("[\"x\"]".to_string())
        );
    }
}
