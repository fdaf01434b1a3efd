use alloy_primitives::{Address, B256, Bytes, U256};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::sync::Arc;

use crate::passkey::{CredentialsContainer, PasskeyArgs};

/// How the Safe executes a transaction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum OperationType {
    Call = 0,
    DelegateCall = 1,
}

/// A transaction to be executed by the Safe.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MetaTransactionData {
    pub to: Address,
    pub value: U256,
    pub data: Bytes,
    pub operation: OperationType,
}

impl MetaTransactionData {
    /// A plain call, the only kind callers usually need.
    pub fn call(to: Address, value: U256, data: Bytes) -> Self {
        Self {
            to,
            value,
            data,
            operation: OperationType::Call,
        }
    }
}

/// ERC-4337 user operation in the EntryPoint v0.6 layout.
///
/// Serializes to the bundler JSON shape: camelCase keys with `0x` hex
/// quantities and byte strings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserOperation {
    pub sender: Address,
    pub nonce: U256,
    pub init_code: Bytes,
    pub call_data: Bytes,
    pub call_gas_limit: U256,
    pub verification_gas_limit: U256,
    pub pre_verification_gas: U256,
    pub max_fee_per_gas: U256,
    pub max_priority_fee_per_gas: U256,
    pub paymaster_and_data: Bytes,
    pub signature: Bytes,
}

/// One owner's signature over a Safe operation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SafeSignature {
    pub signer: Address,
    /// For contract signatures this is the dynamic part only.
    pub data: Bytes,
    pub is_contract_signature: bool,
}

/// A user operation together with the Safe-specific fields it is signed over.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SafeOperation {
    pub user_operation: UserOperation,
    /// uint48 on chain
    pub valid_after: u64,
    /// uint48 on chain, zero means no expiry
    pub valid_until: u64,
    pub entry_point: Address,
    pub module_address: Address,
    pub chain_id: u64,
    /// Keyed by signer; iteration order is the ascending order Safe requires.
    pub signatures: BTreeMap<Address, SafeSignature>,
}

impl SafeOperation {
    pub fn add_signature(&mut self, signature: SafeSignature) {
        self.signatures.insert(signature.signer, signature);
    }

    pub fn safe_address(&self) -> Address {
        self.user_operation.sender
    }
}

/// Gas limits returned by `eth_estimateUserOperationGas`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GasEstimate {
    pub pre_verification_gas: U256,
    pub verification_gas_limit: U256,
    pub call_gas_limit: U256,
}

/// Result of `pm_sponsorUserOperation`.
///
/// Paymasters may leave the gas limits out, in which case the estimates stand.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SponsoredUserOperation {
    pub paymaster_and_data: Bytes,
    #[serde(default)]
    pub pre_verification_gas: Option<U256>,
    #[serde(default)]
    pub verification_gas_limit: Option<U256>,
    #[serde(default)]
    pub call_gas_limit: Option<U256>,
}

/// Transaction receipt embedded in a user operation receipt.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TransactionReceipt {
    pub transaction_hash: B256,
    pub block_number: U256,
    #[serde(default)]
    pub status: Option<U256>,
}

/// Result of `eth_getUserOperationReceipt` once the operation is included.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserOperationReceipt {
    pub user_op_hash: B256,
    pub entry_point: Address,
    pub sender: Address,
    pub nonce: U256,
    #[serde(default)]
    pub paymaster: Option<Address>,
    pub actual_gas_cost: U256,
    pub actual_gas_used: U256,
    pub success: bool,
    #[serde(default)]
    pub reason: Option<String>,
    pub receipt: TransactionReceipt,
}

/// Paymaster settings for a pack.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PaymasterOptions {
    pub is_sponsored: bool,
    pub paymaster_address: Address,
    /// Required when `is_sponsored`
    pub paymaster_url: Option<String>,
    pub sponsorship_policy_id: Option<String>,
    /// ERC-20 the paymaster charges in, when not sponsored
    pub paymaster_token_address: Option<Address>,
    /// Allowance granted to the paymaster before the first transaction
    pub amount_to_approve: Option<U256>,
}

impl PaymasterOptions {
    pub fn sponsored(paymaster_address: Address, paymaster_url: impl Into<String>) -> Self {
        Self {
            is_sponsored: true,
            paymaster_address,
            paymaster_url: Some(paymaster_url.into()),
            sponsorship_policy_id: None,
            paymaster_token_address: None,
            amount_to_approve: None,
        }
    }
}

/// Which Safe the pack operates on.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SafeOptions {
    /// A deployed Safe that already has the 4337 module enabled.
    Existing { safe_address: Address },
    /// A counterfactual Safe owned by the passkey plus `owners`.
    Predicted {
        owners: Vec<Address>,
        threshold: u64,
        salt_nonce: U256,
    },
}

/// Contract addresses the pack depends on.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SafeContracts {
    pub entry_point: Address,
    pub safe_4337_module: Address,
    pub safe_module_setup: Address,
    pub safe_singleton: Address,
    pub safe_proxy_factory: Address,
    pub multi_send: Address,
    pub webauthn_signer_factory: Address,
    pub p256_verifier: Address,
    pub p256_precompile: Address,
}

impl SafeContracts {
    pub fn from_env() -> Self {
        use super::config::*;

        Self {
            entry_point: *ENTRY_POINT_ADDRESS,
            safe_4337_module: *SAFE_4337_MODULE_ADDRESS,
            safe_module_setup: *SAFE_MODULE_SETUP_ADDRESS,
            safe_singleton: *SAFE_SINGLETON_ADDRESS,
            safe_proxy_factory: *SAFE_PROXY_FACTORY_ADDRESS,
            multi_send: *MULTI_SEND_ADDRESS,
            webauthn_signer_factory: *WEBAUTHN_SIGNER_FACTORY_ADDRESS,
            p256_verifier: *P256_VERIFIER_ADDRESS,
            p256_precompile: *P256_PRECOMPILE_ADDRESS,
        }
    }
}

/// Everything `Safe4337Pack::init` needs.
pub struct Safe4337InitOptions {
    /// Node JSON-RPC URL
    pub provider: String,
    /// The passkey that signs operations
    pub signer: PasskeyArgs,
    /// Holds the private key behind `signer`
    pub authenticator: Arc<dyn CredentialsContainer>,
    pub bundler_url: String,
    pub paymaster_options: Option<PaymasterOptions>,
    pub options: SafeOptions,
    pub contracts: SafeContracts,
}
