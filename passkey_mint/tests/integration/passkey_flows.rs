use alloy_primitives::hex;
use async_trait::async_trait;
use passkey_mint::{
    AssertionCredential, AttestationCredential, CredentialCreationOptions,
    CredentialRequestOptions, CredentialsContainer, PasskeyError, PasskeyStore, create_passkey,
};
use serial_test::serial;

use crate::common::{init_test_environment, test_authenticator};

/// A container whose user always dismisses the prompt
struct DismissingContainer;

#[async_trait]
impl CredentialsContainer for DismissingContainer {
    async fn create(
        &self,
        _options: &CredentialCreationOptions,
    ) -> Result<Option<AttestationCredential>, PasskeyError> {
        Ok(None)
    }

    async fn get(
        &self,
        _options: &CredentialRequestOptions,
    ) -> Result<Option<AssertionCredential>, PasskeyError> {
        Ok(None)
    }
}

#[tokio::test]
#[serial]
async fn test_create_store_and_lookup_passkey() {
    init_test_environment();
    passkey_mint::init().await.expect("init");

    // Given a passkey created through the software authenticator
    let authenticator = test_authenticator();
    let passkey = create_passkey(authenticator.as_ref())
        .await
        .expect("passkey creation");

    // Then its coordinates are the authenticator's public key
    let raw_id = hex::decode(&passkey.raw_id).expect("hex raw id");
    assert_eq!(raw_id.len(), 32);
    let public_key = authenticator.public_key(&raw_id).await.expect("key");
    assert_eq!(passkey.coordinates.x.as_slice(), &public_key[1..33]);
    assert_eq!(passkey.coordinates.y.as_slice(), &public_key[33..65]);

    // When storing it
    PasskeyStore::store_passkey(passkey.clone())
        .await
        .expect("store");

    // Then it can be listed and found by raw id
    let passkeys = PasskeyStore::load_passkeys().await.expect("load");
    assert!(passkeys.contains(&passkey));
    assert_eq!(passkeys.last(), Some(&passkey));

    let found = PasskeyStore::get_passkey_from_raw_id(&passkey.raw_id)
        .await
        .expect("lookup");
    assert_eq!(found, passkey);
}

#[tokio::test]
#[serial]
async fn test_passkeys_keep_insertion_order() {
    init_test_environment();
    passkey_mint::init().await.expect("init");

    let authenticator = test_authenticator();
    let first = create_passkey(authenticator.as_ref()).await.unwrap();
    let second = create_passkey(authenticator.as_ref()).await.unwrap();

    PasskeyStore::store_passkey(first.clone()).await.unwrap();
    PasskeyStore::store_passkey(second.clone()).await.unwrap();

    let passkeys = PasskeyStore::load_passkeys().await.unwrap();
    let n = passkeys.len();
    assert!(n >= 2);
    assert_eq!(passkeys[n - 2], first);
    assert_eq!(passkeys[n - 1], second);
}

#[tokio::test]
#[serial]
async fn test_dismissed_creation_fails_with_message() {
    init_test_environment();

    let result = create_passkey(&DismissingContainer).await;

    match result {
        Err(PasskeyError::Creation(message)) => {
            assert_eq!(message, "Passkey creation failed: No credential was returned.")
        }
        other => panic!("Expected creation failure, got {other:?}"),
    }
}

#[tokio::test]
#[serial]
async fn test_lookup_of_unknown_raw_id_fails() {
    init_test_environment();
    passkey_mint::init().await.expect("init");

    let result = PasskeyStore::get_passkey_from_raw_id("00ff00ff").await;

    assert!(matches!(result, Err(PasskeyError::NotFound(_))));
}
