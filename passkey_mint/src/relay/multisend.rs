use alloy_primitives::{B256, Bytes, U256};

use super::types::MetaTransactionData;
use crate::contract::{AbiToken, encode_call};

/// Packs transactions the way `MultiSend.multiSend(bytes)` reads them:
/// `operation (1) | to (20) | value (32) | data length (32) | data`.
pub(crate) fn encode_multi_send_data(transactions: &[MetaTransactionData]) -> Vec<u8> {
    let mut packed = Vec::new();
    for tx in transactions {
        packed.push(tx.operation as u8);
        packed.extend_from_slice(tx.to.as_slice());
        packed.extend_from_slice(B256::from(tx.value).as_slice());
        packed.extend_from_slice(B256::from(U256::from(tx.data.len())).as_slice());
        packed.extend_from_slice(&tx.data);
    }
    packed
}

pub(crate) fn encode_multi_send_call(transactions: &[MetaTransactionData]) -> Bytes {
    encode_call(
        "multiSend(bytes)",
        &[AbiToken::Bytes(encode_multi_send_data(transactions))],
    )
}
