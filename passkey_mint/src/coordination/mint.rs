use alloy_primitives::{Address, U256};
use std::sync::Arc;

use super::errors::CoordinationError;
use crate::config::{
    BUNDLER_URL, NFT_ADDRESS, PAYMASTER_ADDRESS, PAYMASTER_URL, RPC_URL, SPONSORSHIP_POLICY_ID,
};
use crate::contract::encode_safe_mint_data;
use crate::passkey::{CredentialsContainer, PasskeyArgs};
use crate::relay::{
    MetaTransactionData, PaymasterOptions, Safe4337InitOptions, Safe4337Pack, SafeContracts,
    SafeOptions, UserOperationReceipt, get_user_operation_receipt,
};

/// Endpoints and addresses used by the mint flow.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MintSettings {
    pub rpc_url: String,
    pub bundler_url: String,
    pub paymaster_url: String,
    pub paymaster_address: Address,
    pub nft_address: Address,
    pub sponsorship_policy_id: Option<String>,
    pub contracts: SafeContracts,
}

impl MintSettings {
    /// Settings from the environment. Panics when a required variable is missing.
    pub fn from_env() -> Self {
        Self {
            rpc_url: RPC_URL.clone(),
            bundler_url: BUNDLER_URL.clone(),
            paymaster_url: PAYMASTER_URL.clone(),
            paymaster_address: *PAYMASTER_ADDRESS,
            nft_address: *NFT_ADDRESS,
            sponsorship_policy_id: SPONSORSHIP_POLICY_ID.clone(),
            contracts: SafeContracts::from_env(),
        }
    }
}

/// Mints an NFT to `safe_address`, signed by `passkey` and sponsored by the
/// configured paymaster. Returns the user operation hash.
pub async fn mint_nft(
    authenticator: Arc<dyn CredentialsContainer>,
    passkey: PasskeyArgs,
    safe_address: Address,
) -> Result<String, CoordinationError> {
    mint_nft_with(&MintSettings::from_env(), authenticator, passkey, safe_address).await
}

/// [`mint_nft`] with explicit settings.
pub async fn mint_nft_with(
    settings: &MintSettings,
    authenticator: Arc<dyn CredentialsContainer>,
    passkey: PasskeyArgs,
    safe_address: Address,
) -> Result<String, CoordinationError> {
    tracing::debug!("mint_nft is called for passkey {}", passkey.raw_id);

    let paymaster_options = PaymasterOptions {
        sponsorship_policy_id: settings.sponsorship_policy_id.clone(),
        ..PaymasterOptions::sponsored(settings.paymaster_address, settings.paymaster_url.clone())
    };

    let pack = Safe4337Pack::init(Safe4337InitOptions {
        provider: settings.rpc_url.clone(),
        signer: passkey,
        authenticator,
        bundler_url: settings.bundler_url.clone(),
        paymaster_options: Some(paymaster_options),
        options: SafeOptions::Predicted {
            owners: vec![],
            threshold: 1,
            salt_nonce: U256::ZERO,
        },
        contracts: settings.contracts.clone(),
    })
    .await?;

    let mint_transaction = MetaTransactionData::call(
        settings.nft_address,
        U256::ZERO,
        encode_safe_mint_data(safe_address, None)?,
    );
    let safe_operation = pack.create_transaction(vec![mint_transaction]).await?;

    let signed_safe_operation = pack.sign_safe_operation(safe_operation).await?;
    tracing::info!("Signed SafeOperation: {:#?}", signed_safe_operation);

    let user_operation_hash = pack.execute_transaction(signed_safe_operation).await?;

    Ok(user_operation_hash)
}

/// Receipt of a mint submitted earlier, `None` while it is still pending.
pub async fn get_mint_receipt(
    settings: &MintSettings,
    user_operation_hash: &str,
) -> Result<Option<UserOperationReceipt>, CoordinationError> {
    tracing::debug!("get_mint_receipt is called for {}", user_operation_hash);
    Ok(get_user_operation_receipt(&settings.bundler_url, user_operation_hash).await?)
}
