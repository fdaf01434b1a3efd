use alloy_primitives::{Address, B256, Bytes, U256};

use super::types::{SafeOperation, SafeSignature};
use crate::contract::{AbiToken, encode};
use crate::passkey::WebAuthnSignatureData;

/// r (32) | s (32) | v (1)
const STATIC_SIGNATURE_LEN: usize = 65;

const DUMMY_CLIENT_DATA_FIELDS: &str = concat!(
    r#""origin":"http://safe.global","#,
    r#""padding":"This pads the clientDataJSON so that we can leave room for additional implementation specific fields for a more accurate 'preVerificationGas' estimate.""#
);

/// Contract signature carrying a WebAuthn assertion for the signer proxy at `signer`.
///
/// The payload is `abi.encode(bytes authenticatorData, string clientDataFields, uint256 r, uint256 s)`.
pub(crate) fn webauthn_contract_signature(
    signer: Address,
    data: &WebAuthnSignatureData,
) -> SafeSignature {
    let payload = encode(&[
        AbiToken::Bytes(data.authenticator_data.clone()),
        AbiToken::String(data.client_data_fields.clone()),
        AbiToken::Uint(data.r),
        AbiToken::Uint(data.s),
    ]);

    SafeSignature {
        signer,
        data: Bytes::from(payload),
        is_contract_signature: true,
    }
}

/// Placeholder with realistic sizes, used for gas estimation before signing.
pub(crate) fn dummy_webauthn_signature(signer: Address) -> SafeSignature {
    let mut authenticator_data = vec![0xfe; 32];
    authenticator_data.push(0x04);
    authenticator_data.extend_from_slice(&[0xff; 4]);

    webauthn_contract_signature(
        signer,
        &WebAuthnSignatureData {
            authenticator_data,
            client_data_fields: DUMMY_CLIENT_DATA_FIELDS.to_string(),
            r: U256::from_be_bytes([0xec; 32]),
            s: U256::from_be_bytes([0xd5; 32]),
        },
    )
}

/// Concatenates signatures in the layout `Safe.checkSignatures` expects.
///
/// Static parts come first, one 65-byte slot per signer. A contract
/// signature's slot is `signer | offset | 0x00`, pointing at its
/// length-prefixed payload in the dynamic part that follows.
pub(crate) fn build_signature_bytes(signatures: &[&SafeSignature]) -> Vec<u8> {
    let mut static_part = Vec::with_capacity(signatures.len() * STATIC_SIGNATURE_LEN);
    let mut dynamic_part = Vec::new();

    for signature in signatures {
        if signature.is_contract_signature {
            let offset = signatures.len() * STATIC_SIGNATURE_LEN + dynamic_part.len();
            static_part.extend_from_slice(signature.signer.into_word().as_slice());
            static_part.extend_from_slice(B256::from(U256::from(offset)).as_slice());
            static_part.push(0x00);

            dynamic_part.extend_from_slice(B256::from(U256::from(signature.data.len())).as_slice());
            dynamic_part.extend_from_slice(&signature.data);
        } else {
            static_part.extend_from_slice(&signature.data);
        }
    }

    static_part.extend_from_slice(&dynamic_part);
    static_part
}

/// `validAfter (6) | validUntil (6) | signatures`, the user operation signature
/// the 4337 module decodes.
pub(crate) fn user_operation_signature(operation: &SafeOperation) -> Bytes {
    let signatures: Vec<&SafeSignature> = operation.signatures.values().collect();

    let mut out = Vec::new();
    out.extend_from_slice(&uint48_bytes(operation.valid_after));
    out.extend_from_slice(&uint48_bytes(operation.valid_until));
    out.extend_from_slice(&build_signature_bytes(&signatures));
    Bytes::from(out)
}

fn uint48_bytes(value: u64) -> [u8; 6] {
    let bytes = value.to_be_bytes();
    [bytes[2], bytes[3], bytes[4], bytes[5], bytes[6], bytes[7]]
}
