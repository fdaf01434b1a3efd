use async_trait::async_trait;
use ciborium::value::{Integer, Value as CborValue};
use ring::digest;
use ring::rand::SystemRandom;
use ring::signature::{ECDSA_P256_SHA256_ASN1_SIGNING, EcdsaKeyPair, KeyPair};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use tokio::sync::Mutex;

use super::authenticator::CredentialsContainer;
use super::config::ORIGIN;
use super::errors::PasskeyError;
use super::types::{
    AssertionCredential, AttestationCredential, AuthenticatorAssertionResponse,
    AuthenticatorAttestationResponse, COSE_ALG_ES256, CredentialCreationOptions,
    CredentialRequestOptions,
};
use crate::utils::{base64url_decode, base64url_encode, gen_random_bytes};

const FLAG_UP: u8 = 1 << 0;
const FLAG_UV: u8 = 1 << 2;
const FLAG_AT: u8 = 1 << 6;

struct StoredKey {
    rp_id: String,
    pkcs8: Vec<u8>,
    user_handle: Vec<u8>,
    counter: u32,
}

/// Portable form of a credential held by [`SoftwareAuthenticator`].
///
/// Binary fields are base64url encoded. The private key is PKCS#8 and is
/// stored unencrypted, so exported credentials must be treated as secrets.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SoftwareCredential {
    pub raw_id: String,
    pub rp_id: String,
    pub pkcs8: String,
    pub user_handle: String,
    pub counter: u32,
}

/// An in-process platform authenticator holding P-256 keys in memory.
///
/// Produces the same artifacts a browser does: `none` attestation with an
/// EC2 COSE key on creation, DER ECDSA signatures over
/// `authenticatorData || SHA-256(clientDataJSON)` on assertion.
pub struct SoftwareAuthenticator {
    origin: String,
    keys: Mutex<HashMap<Vec<u8>, StoredKey>>,
    rng: SystemRandom,
}

impl SoftwareAuthenticator {
    pub fn new(origin: impl Into<String>) -> Self {
        Self {
            origin: origin.into(),
            keys: Mutex::new(HashMap::new()),
            rng: SystemRandom::new(),
        }
    }

    /// Authenticator bound to the configured `ORIGIN`.
    pub fn from_env() -> Self {
        Self::new(ORIGIN.as_str())
    }

    /// Uncompressed SEC1 public key of a credential this authenticator holds.
    pub async fn public_key(&self, raw_id: &[u8]) -> Option<Vec<u8>> {
        let keys = self.keys.lock().await;
        let stored = keys.get(raw_id)?;
        let key_pair =
            EcdsaKeyPair::from_pkcs8(&ECDSA_P256_SHA256_ASN1_SIGNING, &stored.pkcs8, &self.rng)
                .ok()?;
        Some(key_pair.public_key().as_ref().to_vec())
    }

    /// Snapshot of every credential, for persisting between runs.
    pub async fn export_credentials(&self) -> Vec<SoftwareCredential> {
        let keys = self.keys.lock().await;
        keys.iter()
            .map(|(raw_id, stored)| SoftwareCredential {
                raw_id: base64url_encode(raw_id),
                rp_id: stored.rp_id.clone(),
                pkcs8: base64url_encode(&stored.pkcs8),
                user_handle: base64url_encode(&stored.user_handle),
                counter: stored.counter,
            })
            .collect()
    }

    /// Adds previously exported credentials, replacing any with the same raw id.
    pub async fn import_credentials(
        &self,
        credentials: Vec<SoftwareCredential>,
    ) -> Result<(), PasskeyError> {
        let mut decoded = Vec::with_capacity(credentials.len());
        for credential in credentials {
            let pkcs8 = base64url_decode(&credential.pkcs8)?;
            EcdsaKeyPair::from_pkcs8(&ECDSA_P256_SHA256_ASN1_SIGNING, &pkcs8, &self.rng)
                .map_err(|e| PasskeyError::Crypto(format!("Invalid stored key: {e}")))?;

            decoded.push((
                base64url_decode(&credential.raw_id)?,
                StoredKey {
                    rp_id: credential.rp_id,
                    pkcs8,
                    user_handle: base64url_decode(&credential.user_handle)?,
                    counter: credential.counter,
                },
            ));
        }

        // Nothing is inserted unless every credential decoded
        self.keys.lock().await.extend(decoded);
        Ok(())
    }
}

#[async_trait]
impl CredentialsContainer for SoftwareAuthenticator {
    async fn create(
        &self,
        options: &CredentialCreationOptions,
    ) -> Result<Option<AttestationCredential>, PasskeyError> {
        let supported = options
            .pub_key_cred_params
            .iter()
            .any(|p| p.type_ == "public-key" && p.alg == COSE_ALG_ES256);
        if !supported {
            tracing::warn!(
                "No supported algorithm in {:?}, declining creation",
                options.pub_key_cred_params
            );
            return Ok(None);
        }

        let pkcs8 = EcdsaKeyPair::generate_pkcs8(&ECDSA_P256_SHA256_ASN1_SIGNING, &self.rng)
            .map_err(|_| PasskeyError::Crypto("Failed to generate P-256 key".to_string()))?;
        let key_pair =
            EcdsaKeyPair::from_pkcs8(&ECDSA_P256_SHA256_ASN1_SIGNING, pkcs8.as_ref(), &self.rng)
                .map_err(|e| PasskeyError::Crypto(format!("Failed to load generated key: {e}")))?;

        let raw_id = gen_random_bytes(32)?;
        let cose_key = encode_cose_key(key_pair.public_key().as_ref())?;

        let mut auth_data = authenticator_data(&options.rp.id, FLAG_UP | FLAG_UV | FLAG_AT, 0);
        auth_data.extend_from_slice(&[0u8; 16]); // AAGUID, all zero for "none" attestation
        auth_data.extend_from_slice(&(raw_id.len() as u16).to_be_bytes());
        auth_data.extend_from_slice(&raw_id);
        auth_data.extend_from_slice(&cose_key);

        let attestation_object = CborValue::Map(vec![
            (
                CborValue::Text("fmt".to_string()),
                CborValue::Text("none".to_string()),
            ),
            (CborValue::Text("attStmt".to_string()), CborValue::Map(vec![])),
            (
                CborValue::Text("authData".to_string()),
                CborValue::Bytes(auth_data),
            ),
        ]);
        let mut attestation_bytes = Vec::new();
        ciborium::ser::into_writer(&attestation_object, &mut attestation_bytes).map_err(|e| {
            PasskeyError::Format(format!("Failed to encode attestation object: {e}"))
        })?;

        let client_data_json =
            client_data_json("webauthn.create", &options.challenge, &self.origin)?;

        self.keys.lock().await.insert(
            raw_id.clone(),
            StoredKey {
                rp_id: options.rp.id.clone(),
                pkcs8: pkcs8.as_ref().to_vec(),
                user_handle: options.user.id.clone(),
                counter: 0,
            },
        );

        tracing::debug!("Created software credential for rp {}", options.rp.id);

        Ok(Some(AttestationCredential {
            id: base64url_encode(&raw_id),
            raw_id,
            response: AuthenticatorAttestationResponse {
                client_data_json,
                attestation_object: attestation_bytes,
            },
        }))
    }

    async fn get(
        &self,
        options: &CredentialRequestOptions,
    ) -> Result<Option<AssertionCredential>, PasskeyError> {
        let mut keys = self.keys.lock().await;

        let selected = if options.allow_credentials.is_empty() {
            keys.iter()
                .find(|(_, k)| k.rp_id == options.rp_id)
                .map(|(id, _)| id.clone())
        } else {
            options
                .allow_credentials
                .iter()
                .find(|id| keys.get(*id).is_some_and(|k| k.rp_id == options.rp_id))
                .cloned()
        };

        let Some(raw_id) = selected else {
            tracing::warn!("No matching credential for rp {}", options.rp_id);
            return Ok(None);
        };

        let stored = keys
            .get_mut(&raw_id)
            .ok_or_else(|| PasskeyError::NotFound("Credential vanished".to_string()))?;
        stored.counter = stored
            .counter
            .checked_add(1)
            .ok_or_else(|| PasskeyError::Crypto("Signature counter exhausted".to_string()))?;

        let auth_data = authenticator_data(&options.rp_id, FLAG_UP | FLAG_UV, stored.counter);
        let client_data_json = client_data_json("webauthn.get", &options.challenge, &self.origin)?;

        let client_data_hash = digest::digest(&digest::SHA256, &client_data_json);
        let mut signed_data = auth_data.clone();
        signed_data.extend_from_slice(client_data_hash.as_ref());

        let key_pair =
            EcdsaKeyPair::from_pkcs8(&ECDSA_P256_SHA256_ASN1_SIGNING, &stored.pkcs8, &self.rng)
                .map_err(|e| PasskeyError::Crypto(format!("Failed to load stored key: {e}")))?;
        let signature = key_pair
            .sign(&self.rng, &signed_data)
            .map_err(|_| PasskeyError::Crypto("Failed to sign assertion".to_string()))?;

        Ok(Some(AssertionCredential {
            id: base64url_encode(&raw_id),
            raw_id,
            response: AuthenticatorAssertionResponse {
                client_data_json,
                authenticator_data: auth_data,
                signature: signature.as_ref().to_vec(),
                user_handle: Some(stored.user_handle.clone()),
            },
        }))
    }
}

/// rpIdHash (32) || flags (1) || counter (4, big-endian)
fn authenticator_data(rp_id: &str, flags: u8, counter: u32) -> Vec<u8> {
    let rp_id_hash = digest::digest(&digest::SHA256, rp_id.as_bytes());
    let mut data = Vec::with_capacity(37);
    data.extend_from_slice(rp_id_hash.as_ref());
    data.push(flags);
    data.extend_from_slice(&counter.to_be_bytes());
    data
}

/// Serializes client data with the member order browsers use.
fn client_data_json(type_: &str, challenge: &[u8], origin: &str) -> Result<Vec<u8>, PasskeyError> {
    let origin = serde_json::to_string(origin)?;
    let challenge = base64url_encode(challenge);
    Ok(format!(
        r#"{{"type":"{type_}","challenge":"{challenge}","origin":{origin},"crossOrigin":false}}"#
    )
    .into_bytes())
}

fn encode_cose_key(public_key: &[u8]) -> Result<Vec<u8>, PasskeyError> {
    if public_key.len() != 65 || public_key[0] != 0x04 {
        return Err(PasskeyError::Crypto(
            "Expected an uncompressed P-256 public key".to_string(),
        ));
    }

    let cose_key = CborValue::Map(vec![
        // kty: EC2
        (
            CborValue::Integer(Integer::from(1i64)),
            CborValue::Integer(Integer::from(2i64)),
        ),
        // alg: ES256
        (
            CborValue::Integer(Integer::from(3i64)),
            CborValue::Integer(Integer::from(COSE_ALG_ES256)),
        ),
        // crv: P-256
        (
            CborValue::Integer(Integer::from(-1i64)),
            CborValue::Integer(Integer::from(1i64)),
        ),
        (
            CborValue::Integer(Integer::from(-2i64)),
            CborValue::Bytes(public_key[1..33].to_vec()),
        ),
        (
            CborValue::Integer(Integer::from(-3i64)),
            CborValue::Bytes(public_key[33..65].to_vec()),
        ),
    ]);

    let mut out = Vec::new();
    ciborium::ser::into_writer(&cose_key, &mut out)
        .map_err(|e| PasskeyError::Format(format!("Failed to encode COSE key: {e}")))?;
    Ok(out)
}
