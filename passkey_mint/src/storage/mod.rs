mod config;
mod errors;
mod memory;
mod sqlite;
mod types;

pub(crate) use config::GENERIC_KV_STORE;
pub(crate) use errors::StorageError;
pub(crate) use types::KeyValueStore;

#[cfg(test)]
pub(crate) use types::InMemoryKvStore;

pub(crate) async fn init() -> Result<(), StorageError> {
    let store = GENERIC_KV_STORE.lock().await;
    store.init().await
}
