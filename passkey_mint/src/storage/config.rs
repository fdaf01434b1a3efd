use std::{env, sync::LazyLock};
use tokio::sync::Mutex;

use super::types::{InMemoryKvStore, KeyValueStore, SqliteKvStore};

/// Passkeys outlive the process unless `memory` is asked for explicitly.
static KV_STORE_TYPE: LazyLock<String> =
    LazyLock::new(|| env::var("KV_STORE_TYPE").unwrap_or_else(|_| "sqlite".to_string()));

static KV_STORE_URL: LazyLock<String> =
    LazyLock::new(|| env::var("KV_STORE_URL").unwrap_or_else(|_| "sqlite:passkeys.db".to_string()));

pub(crate) static GENERIC_KV_STORE: LazyLock<Mutex<Box<dyn KeyValueStore>>> = LazyLock::new(|| {
    let store_type = KV_STORE_TYPE.as_str();
    let store_url = KV_STORE_URL.as_str();

    tracing::info!("Initializing key/value store with type: {}", store_type);

    let store: Box<dyn KeyValueStore> = match store_type {
        "memory" => Box::new(InMemoryKvStore::new()),
        "sqlite" => match SqliteKvStore::connect_lazy(store_url) {
            Ok(store) => Box::new(store),
            Err(e) => {
                tracing::error!("Failed to open SQLite store at {}: {}", store_url, e);
                panic!("Failed to open SQLite store at {store_url}: {e}");
            }
        },
        t => panic!("Unsupported key/value store type: {t}. Supported types are 'memory' and 'sqlite'"),
    };

    Mutex::new(store)
});
