//! passkey_mint - NFT minting from a passkey-owned Safe smart account
//!
//! Passkeys are created through a WebAuthn credentials container and kept in
//! a key/value store. Minting wraps a `safeMint` call in an ERC-4337 user
//! operation, signs it with the passkey and hands it to a bundler, with gas
//! sponsored by a paymaster.

mod config;
mod contract;
mod coordination;
mod passkey;
mod relay;
mod storage;
mod utils;


pub use config::{
    BUNDLER_URL, NFT_ADDRESS, PAYMASTER_ADDRESS, PAYMASTER_URL, RPC_URL, SPONSORSHIP_POLICY_ID,
    STORAGE_PASSKEY_LIST_KEY,
};

pub use contract::{
    AbiToken, ContractError, SAFE_MINT_SIGNATURE, encode, encode_call, encode_safe_mint_data,
    function_selector, get_random_uint256,
};

pub use coordination::{
    CoordinationError, MintSettings, get_mint_receipt, mint_nft, mint_nft_with,
};

pub use passkey::{
    AssertionCredential, AttestationCredential, AuthenticatorAssertionResponse,
    AuthenticatorAttestationResponse, COSE_ALG_ES256, CredentialCreationOptions,
    CredentialRequestOptions, CredentialsContainer, PasskeyArgs, PasskeyCoordinates, PasskeyError,
    PasskeyStore, PubKeyCredParam, PublicKeyCredentialUserEntity, RelyingParty,
    SoftwareAuthenticator, SoftwareCredential, create_passkey, extract_passkey_data,
};

pub use relay::{
    GasEstimate, MetaTransactionData, OperationType, PaymasterOptions, RelayError,
    Safe4337InitOptions, Safe4337Pack, SafeContracts, SafeOperation, SafeOptions, SafeSignature,
    SponsoredUserOperation, TransactionReceipt, UserOperation, UserOperationReceipt,
    get_user_operation_receipt,
};

pub use utils::UtilError;

/// Initialize the passkey store
pub async fn init() -> Result<(), Box<dyn std::error::Error>> {
    passkey::init().await?;
    Ok(())
}
