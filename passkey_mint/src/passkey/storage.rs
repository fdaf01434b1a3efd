use crate::config::STORAGE_PASSKEY_LIST_KEY;
use crate::storage::{GENERIC_KV_STORE, KeyValueStore};

use super::errors::PasskeyError;
use super::types::PasskeyArgs;

/// The list of created passkeys, kept as one JSON array in a single storage slot.
pub struct PasskeyStore;

impl PasskeyStore {
    /// Appends a passkey to the stored list.
    pub async fn store_passkey(passkey: PasskeyArgs) -> Result<(), PasskeyError> {
        tracing::debug!("store_passkey is called");
        let mut store = GENERIC_KV_STORE.lock().await;
        store_passkey_in(&mut **store, &STORAGE_PASSKEY_LIST_KEY, passkey).await
    }

    /// Loads every stored passkey, oldest first.
    pub async fn load_passkeys() -> Result<Vec<PasskeyArgs>, PasskeyError> {
        tracing::debug!("load_passkeys is called");
        let store = GENERIC_KV_STORE.lock().await;
        load_passkeys_from(&**store, &STORAGE_PASSKEY_LIST_KEY).await
    }

    /// Finds the stored passkey with the given raw id.
    pub async fn get_passkey_from_raw_id(raw_id: &str) -> Result<PasskeyArgs, PasskeyError> {
        tracing::debug!("get_passkey_from_raw_id is called");
        let store = GENERIC_KV_STORE.lock().await;
        get_passkey_from(&**store, &STORAGE_PASSKEY_LIST_KEY, raw_id).await
    }
}

// Read-modify-write: callers must hold the store lock across the whole call.
async fn store_passkey_in(
    store: &mut dyn KeyValueStore,
    key: &str,
    passkey: PasskeyArgs,
) -> Result<(), PasskeyError> {
    let mut passkeys = load_passkeys_from(store, key).await?;
    passkeys.push(passkey);

    store
        .set_item(key, serde_json::to_string(&passkeys)?)
        .await?;
    Ok(())
}

async fn load_passkeys_from(
    store: &dyn KeyValueStore,
    key: &str,
) -> Result<Vec<PasskeyArgs>, PasskeyError> {
    let passkeys = match store.get_item(key).await? {
        Some(stored) => serde_json::from_str(&stored)?,
        None => Vec::new(),
    };
    Ok(passkeys)
}

async fn get_passkey_from(
    store: &dyn KeyValueStore,
    key: &str,
    raw_id: &str,
) -> Result<PasskeyArgs, PasskeyError> {
    load_passkeys_from(store, key)
        .await?
        .into_iter()
        .find(|passkey| passkey.raw_id == raw_id)
        .ok_or_else(|| PasskeyError::NotFound(format!("No passkey with raw id {raw_id}")))
}
