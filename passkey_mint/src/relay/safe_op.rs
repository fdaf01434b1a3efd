//! EIP-712 hashing of Safe operations as the Safe4337Module validates them.

use alloy_primitives::{B256, U256, keccak256};

use super::types::SafeOperation;
use crate::contract::{AbiToken, encode};

const DOMAIN_TYPE: &str = "EIP712Domain(uint256 chainId,address verifyingContract)";

const SAFE_OP_TYPE: &str = "SafeOp(address safe,uint256 nonce,bytes initCode,bytes callData,uint256 callGasLimit,uint256 verificationGasLimit,uint256 preVerificationGas,uint256 maxFeePerGas,uint256 maxPriorityFeePerGas,bytes paymasterAndData,uint48 validAfter,uint48 validUntil,address entryPoint)";

pub(crate) fn domain_separator(operation: &SafeOperation) -> B256 {
    keccak256(encode(&[
        AbiToken::FixedBytes(keccak256(DOMAIN_TYPE)),
        AbiToken::Uint(U256::from(operation.chain_id)),
        AbiToken::Address(operation.module_address),
    ]))
}

fn struct_hash(operation: &SafeOperation) -> B256 {
    let user_op = &operation.user_operation;
    keccak256(encode(&[
        AbiToken::FixedBytes(keccak256(SAFE_OP_TYPE)),
        AbiToken::Address(user_op.sender),
        AbiToken::Uint(user_op.nonce),
        AbiToken::FixedBytes(keccak256(&user_op.init_code)),
        AbiToken::FixedBytes(keccak256(&user_op.call_data)),
        AbiToken::Uint(user_op.call_gas_limit),
        AbiToken::Uint(user_op.verification_gas_limit),
        AbiToken::Uint(user_op.pre_verification_gas),
        AbiToken::Uint(user_op.max_fee_per_gas),
        AbiToken::Uint(user_op.max_priority_fee_per_gas),
        AbiToken::FixedBytes(keccak256(&user_op.paymaster_and_data)),
        AbiToken::Uint(U256::from(operation.valid_after)),
        AbiToken::Uint(U256::from(operation.valid_until)),
        AbiToken::Address(operation.entry_point),
    ]))
}

/// `keccak256(0x1901 || domainSeparator || structHash)`, the message owners sign.
pub(crate) fn safe_operation_hash(operation: &SafeOperation) -> B256 {
    let mut message = Vec::with_capacity(2 + 32 + 32);
    message.extend_from_slice(&[0x19, 0x01]);
    message.extend_from_slice(domain_separator(operation).as_slice());
    message.extend_from_slice(struct_hash(operation).as_slice());
    keccak256(message)
}
