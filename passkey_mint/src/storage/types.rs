use async_trait::async_trait;
use std::collections::HashMap;

use super::errors::StorageError;

pub(crate) struct InMemoryKvStore {
    pub(super) entry: HashMap<String, String>,
}

pub(crate) struct SqliteKvStore {
    pub(super) pool: sqlx::SqlitePool,
}

/// A string-keyed slot store with the semantics of browser local storage.
#[async_trait]
pub(crate) trait KeyValueStore: Send + Sync + 'static {
    /// Initialize the store. This is called before first use.
    async fn init(&self) -> Result<(), StorageError>;

    /// Read the value of a slot, `None` when it was never written.
    async fn get_item(&self, key: &str) -> Result<Option<String>, StorageError>;

    /// Overwrite the value of a slot.
    async fn set_item(&mut self, key: &str, value: String) -> Result<(), StorageError>;

    /// Remove a slot.
    #[allow(dead_code)] // Used in tests
    async fn remove_item(&mut self, key: &str) -> Result<(), StorageError>;
}
