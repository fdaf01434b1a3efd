use alloy_primitives::{Address, Bytes, U256};
use serde::Deserialize;
use serde_json::json;
use std::collections::BTreeMap;
use std::sync::Arc;
use std::time::Duration;
use tokio::time::Instant;

use super::account::{
    PROXY_CREATION_CODE_SIGNATURE, get_signer_call, init_code, predict_safe_address,
    setup_initializer,
};
use super::config::RECEIPT_POLL_INTERVAL;
use super::errors::RelayError;
use super::multisend::encode_multi_send_call;
use super::rpc::{JsonRpcClient, get_client};
use super::safe_op::safe_operation_hash;
use super::signature::{dummy_webauthn_signature, user_operation_signature, webauthn_contract_signature};
use super::types::{
    GasEstimate, MetaTransactionData, OperationType, PaymasterOptions, Safe4337InitOptions,
    SafeContracts, SafeOperation, SafeOptions, SponsoredUserOperation, UserOperation,
    UserOperationReceipt,
};
use crate::contract::{AbiToken, decode_address, decode_bytes, decode_uint, encode_call};
use crate::passkey::{CredentialsContainer, PasskeyArgs, parse_assertion, request_options_for};

const EXECUTE_USER_OP_SIGNATURE: &str = "executeUserOp(address,uint256,bytes,uint8)";
const GET_NONCE_SIGNATURE: &str = "getNonce(address,uint192)";
const APPROVE_SIGNATURE: &str = "approve(address,uint256)";

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct BlockFees {
    base_fee_per_gas: Option<U256>,
}

/// Builds, signs and submits ERC-4337 user operations for a passkey-owned Safe.
pub struct Safe4337Pack {
    node: JsonRpcClient,
    bundler: JsonRpcClient,
    paymaster: Option<JsonRpcClient>,
    paymaster_options: Option<PaymasterOptions>,
    contracts: SafeContracts,
    chain_id: u64,
    safe_address: Address,
    init_code: Bytes,
    passkey: PasskeyArgs,
    signer_address: Address,
    authenticator: Arc<dyn CredentialsContainer>,
}

impl Safe4337Pack {
    /// Connects to the node and bundler and resolves the Safe the pack acts for.
    pub async fn init(options: Safe4337InitOptions) -> Result<Self, RelayError> {
        let client = get_client()?;
        let node = JsonRpcClient::new(options.provider, client.clone());
        let bundler = JsonRpcClient::new(options.bundler_url, client.clone());
        let contracts = options.contracts;

        let chain_id: U256 = node.request("eth_chainId", json!([])).await?;
        let chain_id = u64::try_from(chain_id)
            .map_err(|_| RelayError::InvalidResponse(format!("Chain id {chain_id} out of range")))?;

        let supported: Vec<Address> = bundler
            .request("eth_supportedEntryPoints", json!([]))
            .await?;
        if !supported.contains(&contracts.entry_point) {
            tracing::error!(
                "Bundler at {} supports {:?}, not {}",
                bundler.url(),
                supported,
                contracts.entry_point
            );
            return Err(RelayError::UnsupportedEntryPoint(contracts.entry_point));
        }

        let paymaster = match &options.paymaster_options {
            Some(paymaster_options) if paymaster_options.is_sponsored => {
                let url = paymaster_options.paymaster_url.clone().ok_or_else(|| {
                    RelayError::Config("A sponsored paymaster needs a paymaster URL".to_string())
                })?;
                Some(JsonRpcClient::new(url, client.clone()))
            }
            _ => None,
        };

        let signer = eth_call(
            &node,
            contracts.webauthn_signer_factory,
            get_signer_call(&options.signer, &contracts),
        )
        .await?;
        let signer_address = decode_address(&signer)?;
        tracing::debug!("Passkey signer address: {}", signer_address);

        let (safe_address, init_code) = match options.options {
            SafeOptions::Existing { safe_address } => (safe_address, Bytes::new()),
            SafeOptions::Predicted {
                owners,
                threshold,
                salt_nonce,
            } => {
                let mut all_owners = vec![signer_address];
                all_owners.extend(owners);
                validate_threshold(threshold, all_owners.len())?;

                let initializer =
                    setup_initializer(&all_owners, threshold, &options.signer, &contracts);
                let creation_code = eth_call(
                    &node,
                    contracts.safe_proxy_factory,
                    encode_call(PROXY_CREATION_CODE_SIGNATURE, &[]),
                )
                .await?;
                let creation_code = decode_bytes(&creation_code)?;
                let safe_address =
                    predict_safe_address(&contracts, &initializer, salt_nonce, &creation_code);

                let code: Bytes = node
                    .request("eth_getCode", json!([safe_address, "latest"]))
                    .await?;
                if code.is_empty() {
                    (safe_address, init_code(&contracts, &initializer, salt_nonce))
                } else {
                    tracing::debug!("Safe {} is already deployed", safe_address);
                    (safe_address, Bytes::new())
                }
            }
        };

        tracing::info!(
            "Safe4337Pack ready for Safe {} on chain {}",
            safe_address,
            chain_id
        );

        Ok(Self {
            node,
            bundler,
            paymaster,
            paymaster_options: options.paymaster_options,
            contracts,
            chain_id,
            safe_address,
            init_code,
            passkey: options.signer,
            signer_address,
            authenticator: options.authenticator,
        })
    }

    pub fn safe_address(&self) -> Address {
        self.safe_address
    }

    pub fn chain_id(&self) -> u64 {
        self.chain_id
    }

    /// Address of the WebAuthn signer proxy that owns the Safe for this passkey.
    pub fn signer_address(&self) -> Address {
        self.signer_address
    }

    /// Whether the next operation deploys the Safe.
    pub fn is_deployment_pending(&self) -> bool {
        !self.init_code.is_empty()
    }

    /// Wraps `transactions` in an unsigned Safe operation with fees, gas
    /// limits and paymaster data filled in.
    pub async fn create_transaction(
        &self,
        transactions: Vec<MetaTransactionData>,
    ) -> Result<SafeOperation, RelayError> {
        let transactions = with_paymaster_approval(transactions, self.paymaster_options.as_ref());
        let call_data = encode_execute_user_op(&transactions, self.contracts.multi_send)?;

        let nonce = self.get_nonce().await?;
        let (max_fee_per_gas, max_priority_fee_per_gas) = self.fee_data().await?;

        let paymaster_and_data = match &self.paymaster_options {
            Some(paymaster_options) if !paymaster_options.is_sponsored => {
                Bytes::copy_from_slice(paymaster_options.paymaster_address.as_slice())
            }
            _ => Bytes::new(),
        };

        let mut operation = SafeOperation {
            user_operation: UserOperation {
                sender: self.safe_address,
                nonce,
                init_code: self.init_code.clone(),
                call_data,
                call_gas_limit: U256::ZERO,
                verification_gas_limit: U256::ZERO,
                pre_verification_gas: U256::ZERO,
                max_fee_per_gas,
                max_priority_fee_per_gas,
                paymaster_and_data,
                signature: Bytes::new(),
            },
            valid_after: 0,
            valid_until: 0,
            entry_point: self.contracts.entry_point,
            module_address: self.contracts.safe_4337_module,
            chain_id: self.chain_id,
            signatures: BTreeMap::new(),
        };

        let mut estimation = operation.clone();
        estimation.add_signature(dummy_webauthn_signature(self.signer_address));
        operation.user_operation.signature = user_operation_signature(&estimation);

        let gas: GasEstimate = self
            .bundler
            .request(
                "eth_estimateUserOperationGas",
                json!([operation.user_operation, self.contracts.entry_point]),
            )
            .await?;
        tracing::debug!("Gas estimate: {:?}", gas);

        operation.user_operation.call_gas_limit = gas.call_gas_limit;
        operation.user_operation.verification_gas_limit = gas.verification_gas_limit;
        operation.user_operation.pre_verification_gas = gas.pre_verification_gas;

        if let Some(paymaster) = &self.paymaster {
            let sponsored = self.sponsor(paymaster, &operation.user_operation).await?;
            let user_op = &mut operation.user_operation;
            user_op.paymaster_and_data = sponsored.paymaster_and_data;
            if let Some(gas) = sponsored.call_gas_limit {
                user_op.call_gas_limit = gas;
            }
            if let Some(gas) = sponsored.verification_gas_limit {
                user_op.verification_gas_limit = gas;
            }
            if let Some(gas) = sponsored.pre_verification_gas {
                user_op.pre_verification_gas = gas;
            }
        }

        operation.user_operation.signature = Bytes::new();
        Ok(operation)
    }

    /// Signs the operation's EIP-712 hash with the passkey and records the signature.
    pub async fn sign_safe_operation(
        &self,
        operation: SafeOperation,
    ) -> Result<SafeOperation, RelayError> {
        let hash = safe_operation_hash(&operation);
        tracing::debug!("Signing SafeOperation {}", hash);

        let request = request_options_for(&self.passkey, hash.as_slice())?;
        let assertion = self.authenticator.get(&request).await?.ok_or_else(|| {
            tracing::error!("Authenticator returned no assertion for {}", self.passkey.raw_id);
            RelayError::Signing("No assertion was returned".to_string())
        })?;

        let signature_data = parse_assertion(&assertion, hash.as_slice())?;

        let mut signed = operation;
        signed.add_signature(webauthn_contract_signature(
            self.signer_address,
            &signature_data,
        ));
        Ok(signed)
    }

    /// Submits a signed operation to the bundler and returns its user operation hash.
    pub async fn execute_transaction(&self, operation: SafeOperation) -> Result<String, RelayError> {
        if operation.signatures.is_empty() {
            return Err(RelayError::Signing(
                "SafeOperation has no signatures".to_string(),
            ));
        }

        let mut user_op = operation.user_operation.clone();
        user_op.signature = user_operation_signature(&operation);

        let hash: String = self
            .bundler
            .request(
                "eth_sendUserOperation",
                json!([user_op, operation.entry_point]),
            )
            .await?;

        tracing::info!("Submitted user operation {}", hash);
        Ok(hash)
    }

    /// `None` until the bundler has seen the operation included.
    pub async fn get_user_operation_receipt(
        &self,
        user_operation_hash: &str,
    ) -> Result<Option<UserOperationReceipt>, RelayError> {
        self.bundler
            .request("eth_getUserOperationReceipt", json!([user_operation_hash]))
            .await
    }

    /// Polls for the receipt until it appears or `timeout` elapses.
    pub async fn wait_for_user_operation_receipt(
        &self,
        user_operation_hash: &str,
        timeout: Duration,
    ) -> Result<UserOperationReceipt, RelayError> {
        let deadline = Instant::now() + timeout;
        loop {
            if let Some(receipt) = self.get_user_operation_receipt(user_operation_hash).await? {
                tracing::info!(
                    "User operation {} included in {}",
                    user_operation_hash,
                    receipt.receipt.transaction_hash
                );
                return Ok(receipt);
            }

            if Instant::now() + *RECEIPT_POLL_INTERVAL > deadline {
                tracing::warn!("No receipt for {} after {:?}", user_operation_hash, timeout);
                return Err(RelayError::Timeout(user_operation_hash.to_string()));
            }
            tokio::time::sleep(*RECEIPT_POLL_INTERVAL).await;
        }
    }

    async fn get_nonce(&self) -> Result<U256, RelayError> {
        let data = encode_call(
            GET_NONCE_SIGNATURE,
            &[AbiToken::Address(self.safe_address), AbiToken::Uint(U256::ZERO)],
        );
        let out = eth_call(&self.node, self.contracts.entry_point, data).await?;
        Ok(decode_uint(&out)?)
    }

    /// `(maxFeePerGas, maxPriorityFeePerGas)` from the latest block.
    async fn fee_data(&self) -> Result<(U256, U256), RelayError> {
        let block: BlockFees = self
            .node
            .request("eth_getBlockByNumber", json!(["latest", false]))
            .await?;
        let base_fee = block.base_fee_per_gas.ok_or_else(|| {
            RelayError::InvalidResponse("Latest block has no baseFeePerGas".to_string())
        })?;
        let priority_fee: U256 = self
            .node
            .request("eth_maxPriorityFeePerGas", json!([]))
            .await?;

        Ok((base_fee * U256::from(2u64) + priority_fee, priority_fee))
    }

    async fn sponsor(
        &self,
        paymaster: &JsonRpcClient,
        user_op: &UserOperation,
    ) -> Result<SponsoredUserOperation, RelayError> {
        let policy = self
            .paymaster_options
            .as_ref()
            .and_then(|options| options.sponsorship_policy_id.as_ref());

        let params = match policy {
            Some(policy) => json!([
                user_op,
                self.contracts.entry_point,
                { "sponsorshipPolicyId": policy }
            ]),
            None => json!([user_op, self.contracts.entry_point]),
        };

        let sponsored: SponsoredUserOperation =
            paymaster.request("pm_sponsorUserOperation", params).await?;
        tracing::debug!("Paymaster sponsored with {}", sponsored.paymaster_and_data);
        Ok(sponsored)
    }
}

/// Looks up a user operation receipt straight from a bundler, without a pack.
pub async fn get_user_operation_receipt(
    bundler_url: &str,
    user_operation_hash: &str,
) -> Result<Option<UserOperationReceipt>, RelayError> {
    let bundler = JsonRpcClient::new(bundler_url, get_client()?);
    bundler
        .request("eth_getUserOperationReceipt", json!([user_operation_hash]))
        .await
}

async fn eth_call(node: &JsonRpcClient, to: Address, data: Bytes) -> Result<Bytes, RelayError> {
    node.request("eth_call", json!([{ "to": to, "data": data }, "latest"]))
        .await
}

fn validate_threshold(threshold: u64, owner_count: usize) -> Result<(), RelayError> {
    if threshold == 0 || threshold > owner_count as u64 {
        return Err(RelayError::Config(format!(
            "Threshold {threshold} must be between 1 and the owner count {owner_count}"
        )));
    }
    Ok(())
}

/// Prepends the ERC-20 allowance an unsponsored token paymaster needs.
fn with_paymaster_approval(
    mut transactions: Vec<MetaTransactionData>,
    paymaster_options: Option<&PaymasterOptions>,
) -> Vec<MetaTransactionData> {
    let Some(options) = paymaster_options.filter(|options| !options.is_sponsored) else {
        return transactions;
    };
    let (Some(token), Some(amount)) = (options.paymaster_token_address, options.amount_to_approve)
    else {
        return transactions;
    };

    let approve = MetaTransactionData::call(
        token,
        U256::ZERO,
        encode_call(
            APPROVE_SIGNATURE,
            &[
                AbiToken::Address(options.paymaster_address),
                AbiToken::Uint(amount),
            ],
        ),
    );
    transactions.insert(0, approve);
    transactions
}

/// `executeUserOp` for one transaction, or a MultiSend delegatecall for several.
fn encode_execute_user_op(
    transactions: &[MetaTransactionData],
    multi_send: Address,
) -> Result<Bytes, RelayError> {
    let (to, value, data, operation) = match transactions {
        [] => {
            return Err(RelayError::Config(
                "At least one transaction is required".to_string(),
            ));
        }
        [single] => (single.to, single.value, single.data.clone(), single.operation),
        many => (
            multi_send,
            U256::ZERO,
            encode_multi_send_call(many),
            OperationType::DelegateCall,
        ),
    };

    Ok(encode_call(
        EXECUTE_USER_OP_SIGNATURE,
        &[
            AbiToken::Address(to),
            AbiToken::Uint(value),
            AbiToken::Bytes(data.to_vec()),
            AbiToken::Uint(U256::from(operation as u8)),
        ],
    ))
}
