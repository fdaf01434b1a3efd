use alloy_primitives::{Address, B256, hex};
use serde::{Deserialize, Serialize};

use super::errors::PasskeyError;

/// COSE algorithm identifier for ECDSA over P-256 with SHA-256
pub const COSE_ALG_ES256: i64 = -7;

/// A passkey usable as a Safe owner.
///
/// This is the record kept in the passkey list: the raw credential id the
/// authenticator knows the key by, and the affine coordinates of its P-256
/// public key. The signer contract on chain is derived from the coordinates.
#[derive(Clone, Serialize, Deserialize, Debug, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct PasskeyArgs {
    /// Credential raw id, lowercase hex without `0x`
    pub raw_id: String,
    /// Public key coordinates
    pub coordinates: PasskeyCoordinates,
    /// P-256 verifier to use instead of the default one
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub custom_verifier_address: Option<Address>,
}

#[derive(Clone, Copy, Serialize, Deserialize, Debug, PartialEq, Eq)]
pub struct PasskeyCoordinates {
    pub x: B256,
    pub y: B256,
}

impl PasskeyArgs {
    /// Decodes `raw_id` back into the credential id bytes.
    pub fn raw_id_bytes(&self) -> Result<Vec<u8>, PasskeyError> {
        hex::decode(&self.raw_id)
            .map_err(|e| PasskeyError::Format(format!("Invalid raw id hex: {e}")))
    }
}

#[derive(Clone, Debug)]
pub struct RelyingParty {
    pub name: String,
    pub id: String,
}

#[derive(Clone, Debug)]
pub struct PublicKeyCredentialUserEntity {
    pub id: Vec<u8>,
    pub name: String,
    pub display_name: String,
}

#[derive(Clone, Debug, PartialEq)]
pub struct PubKeyCredParam {
    pub type_: String,
    pub alg: i64,
}

/// Parameters of a credential creation ceremony (`navigator.credentials.create`).
#[derive(Clone, Debug)]
pub struct CredentialCreationOptions {
    pub rp: RelyingParty,
    pub user: PublicKeyCredentialUserEntity,
    pub challenge: Vec<u8>,
    pub pub_key_cred_params: Vec<PubKeyCredParam>,
    /// Milliseconds
    pub timeout: u32,
    pub attestation: String,
}

/// Parameters of an assertion ceremony (`navigator.credentials.get`).
#[derive(Clone, Debug)]
pub struct CredentialRequestOptions {
    pub challenge: Vec<u8>,
    pub rp_id: String,
    /// Raw ids of acceptable credentials; empty means any discoverable one
    pub allow_credentials: Vec<Vec<u8>>,
    pub user_verification: String,
    /// Milliseconds
    pub timeout: u32,
}

#[derive(Clone, Debug)]
pub struct AuthenticatorAttestationResponse {
    pub client_data_json: Vec<u8>,
    pub attestation_object: Vec<u8>,
}

/// Credential returned from a creation ceremony.
#[derive(Clone, Debug)]
pub struct AttestationCredential {
    /// base64url of `raw_id`
    pub id: String,
    pub raw_id: Vec<u8>,
    pub response: AuthenticatorAttestationResponse,
}

#[derive(Clone, Debug)]
pub struct AuthenticatorAssertionResponse {
    pub client_data_json: Vec<u8>,
    pub authenticator_data: Vec<u8>,
    /// ASN.1 DER encoded ECDSA signature
    pub signature: Vec<u8>,
    pub user_handle: Option<Vec<u8>>,
}

/// Credential returned from an assertion ceremony.
#[derive(Clone, Debug)]
pub struct AssertionCredential {
    pub id: String,
    pub raw_id: Vec<u8>,
    pub response: AuthenticatorAssertionResponse,
}
