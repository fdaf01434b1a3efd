use alloy_primitives::{B256, hex};
use ciborium::value::{Integer, Value as CborValue};

use super::authenticator::CredentialsContainer;
use super::config::{
    PASSKEY_RP_ID, PASSKEY_RP_NAME, PASSKEY_TIMEOUT, PASSKEY_USER_DISPLAY_NAME,
};
use super::errors::PasskeyError;
use super::types::{
    AttestationCredential, COSE_ALG_ES256, CredentialCreationOptions, PasskeyArgs,
    PasskeyCoordinates, PubKeyCredParam, PublicKeyCredentialUserEntity, RelyingParty,
};
use crate::utils::{base64url_encode, gen_random_bytes};

const NO_CREDENTIAL_RETURNED: &str = "Passkey creation failed: No credential was returned.";

#[derive(Debug)]
struct AttestationObject {
    fmt: String,
    auth_data: Vec<u8>,
}

/// Creates a new passkey through the given credential container.
///
/// The ceremony asks for an ECDSA P-256 key without attestation. The user
/// entity has a fixed display name and a random id.
pub async fn create_passkey<C>(container: &C) -> Result<PasskeyArgs, PasskeyError>
where
    C: CredentialsContainer + ?Sized,
{
    let options = create_registration_options()?;

    let credential = container
        .create(&options)
        .await?
        .ok_or_else(|| PasskeyError::Creation(NO_CREDENTIAL_RETURNED.to_string()))?;

    verify_creation_challenge(&credential, &options.challenge)?;

    let passkey = extract_passkey_data(&credential)?;
    tracing::info!("Created Passkey: {:?}", passkey);

    Ok(passkey)
}

fn create_registration_options() -> Result<CredentialCreationOptions, PasskeyError> {
    let display_name = PASSKEY_USER_DISPLAY_NAME.to_string();

    let options = CredentialCreationOptions {
        rp: RelyingParty {
            name: PASSKEY_RP_NAME.to_string(),
            id: PASSKEY_RP_ID.to_string(),
        },
        user: PublicKeyCredentialUserEntity {
            id: gen_random_bytes(32)?,
            name: display_name.clone(),
            display_name,
        },
        challenge: gen_random_bytes(32)?,
        pub_key_cred_params: vec![PubKeyCredParam {
            type_: "public-key".to_string(),
            alg: COSE_ALG_ES256,
        }],
        timeout: (*PASSKEY_TIMEOUT) * 1000, // Convert seconds to milliseconds
        attestation: "none".to_string(),
    };

    tracing::debug!("Registration options: {:?}", options);

    Ok(options)
}

/// Extracts the raw id and public key coordinates from a freshly created credential.
pub fn extract_passkey_data(
    credential: &AttestationCredential,
) -> Result<PasskeyArgs, PasskeyError> {
    let client_data: serde_json::Value =
        serde_json::from_slice(&credential.response.client_data_json).map_err(|e| {
            PasskeyError::Format(format!("Failed to parse client data JSON: {e}"))
        })?;

    if client_data["type"] != "webauthn.create" {
        tracing::error!("Invalid client data type: {}", client_data["type"]);
        return Err(PasskeyError::ClientData("Invalid type".to_string()));
    }

    let attestation_obj = parse_attestation_object(&credential.response.attestation_object)?;
    tracing::debug!("Attestation format: {}", attestation_obj.fmt);

    let (x, y) = extract_public_key_from_auth_data(&attestation_obj.auth_data)?;

    Ok(PasskeyArgs {
        raw_id: hex::encode(&credential.raw_id),
        coordinates: PasskeyCoordinates { x, y },
        custom_verifier_address: None,
    })
}

fn verify_creation_challenge(
    credential: &AttestationCredential,
    challenge: &[u8],
) -> Result<(), PasskeyError> {
    let client_data: serde_json::Value =
        serde_json::from_slice(&credential.response.client_data_json).map_err(|e| {
            PasskeyError::Format(format!("Failed to parse client data JSON: {e}"))
        })?;

    let expected = base64url_encode(challenge);
    if client_data["challenge"].as_str() != Some(expected.as_str()) {
        tracing::error!(
            "Challenge verification failed: client_data.challenge: {}, expected: {}",
            client_data["challenge"],
            expected
        );
        return Err(PasskeyError::ClientData(
            "Challenge verification failed".to_string(),
        ));
    }

    Ok(())
}

fn parse_attestation_object(attestation_bytes: &[u8]) -> Result<AttestationObject, PasskeyError> {
    let attestation_cbor: CborValue = ciborium::de::from_reader(attestation_bytes)
        .map_err(|e| PasskeyError::Format(format!("Invalid CBOR data: {e}")))?;

    let CborValue::Map(map) = attestation_cbor else {
        return Err(PasskeyError::Format(
            "Invalid attestation format".to_string(),
        ));
    };

    let mut fmt = None;
    let mut auth_data = None;

    for (key, value) in map {
        if let CborValue::Text(k) = key {
            match (k.as_str(), value) {
                ("fmt", CborValue::Text(f)) => fmt = Some(f),
                ("authData", CborValue::Bytes(data)) => auth_data = Some(data),
                _ => {}
            }
        }
    }

    match (fmt, auth_data) {
        (Some(fmt), Some(auth_data)) => Ok(AttestationObject { fmt, auth_data }),
        _ => Err(PasskeyError::Format(
            "Missing required attestation data".to_string(),
        )),
    }
}

fn extract_public_key_from_auth_data(auth_data: &[u8]) -> Result<(B256, B256), PasskeyError> {
    if auth_data.len() < 37 {
        return Err(PasskeyError::AuthenticatorData(
            "Authenticator data too short".to_string(),
        ));
    }

    // Check attested credential data flag
    let flags = auth_data[32];
    if (flags & 0x40) == 0 {
        tracing::error!("No attested credential data present");
        return Err(PasskeyError::AuthenticatorData(
            "No attested credential data present".to_string(),
        ));
    }

    let credential_data = parse_credential_data(auth_data)?;
    let (x_coord, y_coord) = extract_key_coordinates(credential_data)?;

    if x_coord.len() != 32 || y_coord.len() != 32 {
        return Err(PasskeyError::Format(
            "Key coordinates must be 32 bytes".to_string(),
        ));
    }

    Ok((B256::from_slice(&x_coord), B256::from_slice(&y_coord)))
}

fn parse_credential_data(auth_data: &[u8]) -> Result<&[u8], PasskeyError> {
    let mut pos = 37; // Skip RP ID hash (32) + flags (1) + counter (4)

    if auth_data.len() < pos + 18 {
        tracing::error!("Authenticator data too short");
        return Err(PasskeyError::Format(
            "Authenticator data too short".to_string(),
        ));
    }

    pos += 16; // Skip AAGUID

    let cred_id_len = ((auth_data[pos] as usize) << 8) | (auth_data[pos + 1] as usize);
    pos += 2;

    if cred_id_len == 0 || cred_id_len > 1024 {
        tracing::error!("Invalid credential ID length");
        return Err(PasskeyError::Format(
            "Invalid credential ID length".to_string(),
        ));
    }

    if auth_data.len() < pos + cred_id_len {
        tracing::error!("Authenticator data too short for credential ID");
        return Err(PasskeyError::Format(
            "Authenticator data too short for credential ID".to_string(),
        ));
    }

    pos += cred_id_len;

    Ok(&auth_data[pos..])
}

fn extract_key_coordinates(credential_data: &[u8]) -> Result<(Vec<u8>, Vec<u8>), PasskeyError> {
    let public_key_cbor: CborValue = ciborium::de::from_reader(credential_data).map_err(|e| {
        tracing::error!("Invalid public key CBOR: {}", e);
        PasskeyError::Format(format!("Invalid public key CBOR: {e}"))
    })?;

    let CborValue::Map(map) = public_key_cbor else {
        return Err(PasskeyError::Format(
            "Invalid public key format".to_string(),
        ));
    };

    let mut x_coord = None;
    let mut y_coord = None;

    for (key, value) in map {
        if let (CborValue::Integer(i), CborValue::Bytes(bytes)) = (key, value) {
            if i == Integer::from(-2i64) {
                x_coord = Some(bytes);
            } else if i == Integer::from(-3i64) {
                y_coord = Some(bytes);
            }
        }
    }

    match (x_coord, y_coord) {
        (Some(x), Some(y)) => Ok((x, y)),
        _ => Err(PasskeyError::Format(
            "Missing or invalid key coordinates".to_string(),
        )),
    }
}
