use async_trait::async_trait;
use std::collections::HashMap;

use super::errors::StorageError;
use super::types::{InMemoryKvStore, KeyValueStore};

impl InMemoryKvStore {
    pub(crate) fn new() -> Self {
        tracing::info!("Creating new in-memory key/value store");
        Self {
            entry: HashMap::new(),
        }
    }
}

#[async_trait]
impl KeyValueStore for InMemoryKvStore {
    async fn init(&self) -> Result<(), StorageError> {
        Ok(()) // Nothing to initialize for in-memory store
    }

    async fn get_item(&self, key: &str) -> Result<Option<String>, StorageError> {
        Ok(self.entry.get(key).cloned())
    }

    async fn set_item(&mut self, key: &str, value: String) -> Result<(), StorageError> {
        self.entry.insert(key.to_string(), value);
        Ok(())
    }

    async fn remove_item(&mut self, key: &str) -> Result<(), StorageError> {
        self.entry.remove(key);
        Ok(())
    }
}
