//! Counterfactual Safe deployment: setup data, address prediction and initCode.

use alloy_primitives::{Address, Bytes, U256, keccak256};

use super::multisend::encode_multi_send_call;
use super::types::{MetaTransactionData, OperationType, SafeContracts};
use crate::contract::{AbiToken, encode, encode_call};
use crate::passkey::PasskeyArgs;

pub(crate) const GET_SIGNER_SIGNATURE: &str = "getSigner(uint256,uint256,uint176)";
const CREATE_SIGNER_SIGNATURE: &str = "createSigner(uint256,uint256,uint176)";
const ENABLE_MODULES_SIGNATURE: &str = "enableModules(address[])";
const SETUP_SIGNATURE: &str =
    "setup(address[],uint256,address,bytes,address,address,uint256,address)";
const CREATE_PROXY_SIGNATURE: &str = "createProxyWithNonce(address,bytes,uint256)";
pub(crate) const PROXY_CREATION_CODE_SIGNATURE: &str = "proxyCreationCode()";

/// `(precompile << 160) | verifier`, the packed uint176 the signer factory takes.
pub(crate) fn verifiers(passkey: &PasskeyArgs, contracts: &SafeContracts) -> U256 {
    let verifier = passkey
        .custom_verifier_address
        .unwrap_or(contracts.p256_verifier);
    let precompile = U256::from_be_slice(contracts.p256_precompile.as_slice());
    (precompile << 160usize) | U256::from_be_slice(verifier.as_slice())
}

fn signer_arguments(passkey: &PasskeyArgs, contracts: &SafeContracts) -> [AbiToken; 3] {
    [
        AbiToken::Uint(U256::from_be_bytes(passkey.coordinates.x.0)),
        AbiToken::Uint(U256::from_be_bytes(passkey.coordinates.y.0)),
        AbiToken::Uint(verifiers(passkey, contracts)),
    ]
}

/// Call data for `SafeWebAuthnSignerFactory.getSigner`.
pub(crate) fn get_signer_call(passkey: &PasskeyArgs, contracts: &SafeContracts) -> Bytes {
    encode_call(GET_SIGNER_SIGNATURE, &signer_arguments(passkey, contracts))
}

/// `Safe.setup` call data for a new Safe with the 4337 module enabled and
/// the passkey signer proxy deployed in the same transaction.
pub(crate) fn setup_initializer(
    owners: &[Address],
    threshold: u64,
    passkey: &PasskeyArgs,
    contracts: &SafeContracts,
) -> Bytes {
    let enable_modules = MetaTransactionData {
        to: contracts.safe_module_setup,
        value: U256::ZERO,
        data: encode_call(
            ENABLE_MODULES_SIGNATURE,
            &[AbiToken::AddressArray(vec![contracts.safe_4337_module])],
        ),
        operation: OperationType::DelegateCall,
    };
    let create_signer = MetaTransactionData::call(
        contracts.webauthn_signer_factory,
        U256::ZERO,
        encode_call(CREATE_SIGNER_SIGNATURE, &signer_arguments(passkey, contracts)),
    );

    encode_call(
        SETUP_SIGNATURE,
        &[
            AbiToken::AddressArray(owners.to_vec()),
            AbiToken::Uint(U256::from(threshold)),
            AbiToken::Address(contracts.multi_send),
            AbiToken::Bytes(encode_multi_send_call(&[enable_modules, create_signer]).to_vec()),
            AbiToken::Address(contracts.safe_4337_module),
            AbiToken::Address(Address::ZERO),
            AbiToken::Uint(U256::ZERO),
            AbiToken::Address(Address::ZERO),
        ],
    )
}

/// Address `SafeProxyFactory.createProxyWithNonce` will deploy to.
///
/// `proxy_creation_code` is what the factory's `proxyCreationCode()` returns.
pub(crate) fn predict_safe_address(
    contracts: &SafeContracts,
    initializer: &[u8],
    salt_nonce: U256,
    proxy_creation_code: &[u8],
) -> Address {
    let salt = keccak256(encode(&[
        AbiToken::FixedBytes(keccak256(initializer)),
        AbiToken::Uint(salt_nonce),
    ]));

    let mut deployment_code = proxy_creation_code.to_vec();
    deployment_code.extend_from_slice(contracts.safe_singleton.into_word().as_slice());

    contracts
        .safe_proxy_factory
        .create2(salt, keccak256(&deployment_code))
}

/// `factory | createProxyWithNonce(singleton, initializer, saltNonce)`
pub(crate) fn init_code(contracts: &SafeContracts, initializer: &[u8], salt_nonce: U256) -> Bytes {
    let call = encode_call(
        CREATE_PROXY_SIGNATURE,
        &[
            AbiToken::Address(contracts.safe_singleton),
            AbiToken::Bytes(initializer.to_vec()),
            AbiToken::Uint(salt_nonce),
        ],
    );

    let mut code = contracts.safe_proxy_factory.to_vec();
    code.extend_from_slice(&call);
    Bytes::from(code)
}
