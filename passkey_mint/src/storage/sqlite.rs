use async_trait::async_trait;
use chrono::Utc;
use std::str::FromStr;

use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions};

use super::errors::StorageError;
use super::types::{KeyValueStore, SqliteKvStore};

const KV_TABLE: &str = "kv_store";

impl SqliteKvStore {
    /// Create a store whose pool connects on first use.
    ///
    /// The pool holds a single connection so that `sqlite::memory:` URLs
    /// keep one database for the lifetime of the store.
    pub(crate) fn connect_lazy(url: &str) -> Result<Self, StorageError> {
        let opts = SqliteConnectOptions::from_str(url)?.create_if_missing(true);
        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .connect_lazy_with(opts);
        Ok(Self { pool })
    }
}

#[async_trait]
impl KeyValueStore for SqliteKvStore {
    async fn init(&self) -> Result<(), StorageError> {
        sqlx::query(&format!(
            r#"
            CREATE TABLE IF NOT EXISTS {KV_TABLE} (
                key TEXT PRIMARY KEY NOT NULL,
                value TEXT NOT NULL,
                updated_at TIMESTAMP NOT NULL DEFAULT CURRENT_TIMESTAMP
            )
            "#
        ))
        .execute(&self.pool)
        .await?;

        tracing::debug!("Ensured table {} exists", KV_TABLE);
        Ok(())
    }

    async fn get_item(&self, key: &str) -> Result<Option<String>, StorageError> {
        let value: Option<String> =
            sqlx::query_scalar(&format!("SELECT value FROM {KV_TABLE} WHERE key = ?"))
                .bind(key)
                .fetch_optional(&self.pool)
                .await?;
        Ok(value)
    }

    async fn set_item(&mut self, key: &str, value: String) -> Result<(), StorageError> {
        sqlx::query(&format!(
            r#"
            INSERT INTO {KV_TABLE} (key, value, updated_at) VALUES (?, ?, ?)
            ON CONFLICT(key) DO UPDATE SET value = excluded.value, updated_at = excluded.updated_at
            "#
        ))
        .bind(key)
        .bind(value)
        .bind(Utc::now())
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    async fn remove_item(&mut self, key: &str) -> Result<(), StorageError> {
        sqlx::query(&format!("DELETE FROM {KV_TABLE} WHERE key = ?"))
            .bind(key)
            .execute(&self.pool)
            .await?;
        Ok(())
    }
}
