use alloy_primitives::{U256, uint};

use super::errors::PasskeyError;
use super::types::AssertionCredential;
use crate::utils::base64url_encode;

/// Order of the P-256 group
const P256_N: U256 =
    uint!(0xFFFFFFFF00000000FFFFFFFFFFFFFFFFBCE6FAADA7179E84F3B9CAC2FC632551_U256);

/// The parts of a WebAuthn assertion an on-chain verifier needs.
///
/// The verifier rebuilds clientDataJSON as
/// `{"type":"webauthn.get","challenge":"<challenge>",<client_data_fields>}`
/// from the message it is asked to verify, so only the fields after the
/// challenge are carried.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct WebAuthnSignatureData {
    pub(crate) authenticator_data: Vec<u8>,
    pub(crate) client_data_fields: String,
    pub(crate) r: U256,
    pub(crate) s: U256,
}

pub(crate) fn parse_assertion(
    credential: &AssertionCredential,
    challenge: &[u8],
) -> Result<WebAuthnSignatureData, PasskeyError> {
    let response = &credential.response;

    if response.authenticator_data.len() < 37 {
        return Err(PasskeyError::AuthenticatorData(
            "Authenticator data too short".to_string(),
        ));
    }

    let client_data_json = std::str::from_utf8(&response.client_data_json)
        .map_err(|e| PasskeyError::Format(format!("Client data is not valid UTF-8: {e}")))?;
    let client_data_fields = extract_client_data_fields(client_data_json, challenge)?;

    let (r, s) = parse_der_signature(&response.signature)?;

    Ok(WebAuthnSignatureData {
        authenticator_data: response.authenticator_data.clone(),
        client_data_fields,
        r,
        s: normalize_s(s),
    })
}

fn extract_client_data_fields(
    client_data_json: &str,
    challenge: &[u8],
) -> Result<String, PasskeyError> {
    let prefix = format!(
        r#"{{"type":"webauthn.get","challenge":"{}","#,
        base64url_encode(challenge)
    );

    let fields = client_data_json
        .strip_prefix(&prefix)
        .and_then(|rest| rest.strip_suffix('}'))
        .ok_or_else(|| {
            tracing::error!("Unexpected client data layout: {}", client_data_json);
            PasskeyError::ClientData(
                "Client data does not start with the expected type and challenge".to_string(),
            )
        })?;

    Ok(fields.to_string())
}

/// Splits an ASN.1 DER `SEQUENCE { INTEGER r, INTEGER s }` into its integers.
fn parse_der_signature(der: &[u8]) -> Result<(U256, U256), PasskeyError> {
    let invalid = |msg: &str| PasskeyError::Format(format!("Invalid DER signature: {msg}"));

    if der.len() < 8 || der[0] != 0x30 {
        return Err(invalid("not a sequence"));
    }
    if der[1] as usize != der.len() - 2 {
        return Err(invalid("sequence length mismatch"));
    }

    let mut pos = 2;
    let read_integer = |pos: &mut usize| -> Result<U256, PasskeyError> {
        if der.get(*pos) != Some(&0x02) {
            return Err(invalid("expected integer"));
        }
        let len = *der.get(*pos + 1).ok_or_else(|| invalid("truncated"))? as usize;
        let start = *pos + 2;
        let end = start + len;
        if len == 0 || end > der.len() {
            return Err(invalid("integer out of bounds"));
        }
        let mut bytes = &der[start..end];
        if bytes.len() > 1 && bytes[0] == 0 {
            bytes = &bytes[1..];
        }
        if bytes.len() > 32 {
            return Err(invalid("integer wider than 256 bits"));
        }
        *pos = end;
        Ok(U256::from_be_slice(bytes))
    };

    let r = read_integer(&mut pos)?;
    let s = read_integer(&mut pos)?;

    if pos != der.len() {
        return Err(invalid("trailing bytes"));
    }

    Ok((r, s))
}

/// Maps `s` into the lower half of the group order.
fn normalize_s(s: U256) -> U256 {
    if s > P256_N >> 1usize { P256_N - s } else { s }
}
