//! Minimal Solidity ABI encoding for flat argument lists.

use alloy_primitives::{Address, B256, Bytes, U256, keccak256};

use super::errors::ContractError;

const WORD: usize = 32;

/// A single ABI-encodable argument.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AbiToken {
    Address(Address),
    Uint(U256),
    Bool(bool),
    FixedBytes(B256),
    Bytes(Vec<u8>),
    String(String),
    AddressArray(Vec<Address>),
}

impl AbiToken {
    fn is_dynamic(&self) -> bool {
        matches!(
            self,
            AbiToken::Bytes(_) | AbiToken::String(_) | AbiToken::AddressArray(_)
        )
    }

    fn head_word(&self) -> Option<B256> {
        match self {
            AbiToken::Address(addr) => Some(addr.into_word()),
            AbiToken::Uint(v) => Some(B256::from(*v)),
            AbiToken::Bool(b) => Some(B256::from(U256::from(*b as u8))),
            AbiToken::FixedBytes(b) => Some(*b),
            _ => None,
        }
    }

    fn tail(&self) -> Vec<u8> {
        match self {
            AbiToken::Bytes(data) => encode_packed_bytes(data),
            AbiToken::String(s) => encode_packed_bytes(s.as_bytes()),
            AbiToken::AddressArray(addrs) => {
                let mut out = Vec::with_capacity(WORD * (addrs.len() + 1));
                out.extend_from_slice(B256::from(U256::from(addrs.len())).as_slice());
                for addr in addrs {
                    out.extend_from_slice(addr.into_word().as_slice());
                }
                out
            }
            _ => Vec::new(),
        }
    }
}

/// Length word followed by the data right-padded to a word boundary.
fn encode_packed_bytes(data: &[u8]) -> Vec<u8> {
    let padded = data.len().div_ceil(WORD) * WORD;
    let mut out = Vec::with_capacity(WORD + padded);
    out.extend_from_slice(B256::from(U256::from(data.len())).as_slice());
    out.extend_from_slice(data);
    out.resize(WORD + padded, 0);
    out
}

/// `abi.encode(tokens...)`
pub fn encode(tokens: &[AbiToken]) -> Vec<u8> {
    let head_len = tokens.len() * WORD;
    let mut head = Vec::with_capacity(head_len);
    let mut tail = Vec::new();

    for token in tokens {
        match token.head_word() {
            Some(word) if !token.is_dynamic() => head.extend_from_slice(word.as_slice()),
            _ => {
                let offset = U256::from(head_len + tail.len());
                head.extend_from_slice(B256::from(offset).as_slice());
                tail.extend_from_slice(&token.tail());
            }
        }
    }

    head.extend_from_slice(&tail);
    head
}

/// First four bytes of the keccak256 of a canonical function signature.
pub fn function_selector(signature: &str) -> [u8; 4] {
    let hash = keccak256(signature.as_bytes());
    [hash[0], hash[1], hash[2], hash[3]]
}

/// Selector followed by the encoded arguments.
pub fn encode_call(signature: &str, tokens: &[AbiToken]) -> Bytes {
    let mut data = function_selector(signature).to_vec();
    data.extend_from_slice(&encode(tokens));
    Bytes::from(data)
}

fn word_at(data: &[u8], index: usize) -> Result<B256, ContractError> {
    let start = index * WORD;
    data.get(start..start + WORD)
        .map(B256::from_slice)
        .ok_or_else(|| ContractError::Decode(format!("Return data too short for word {index}")))
}

pub(crate) fn decode_uint(data: &[u8]) -> Result<U256, ContractError> {
    Ok(U256::from_be_bytes(word_at(data, 0)?.0))
}

pub(crate) fn decode_address(data: &[u8]) -> Result<Address, ContractError> {
    let word = word_at(data, 0)?;
    if word[..12].iter().any(|b| *b != 0) {
        return Err(ContractError::Decode(
            "Address word has dirty upper bytes".to_string(),
        ));
    }
    Ok(Address::from_word(word))
}

/// Decodes a single dynamic `bytes` return value.
pub(crate) fn decode_bytes(data: &[u8]) -> Result<Vec<u8>, ContractError> {
    let offset: usize = U256::from_be_bytes(word_at(data, 0)?.0)
        .try_into()
        .map_err(|_| ContractError::Decode("Offset out of range".to_string()))?;
    let body = data
        .get(offset..)
        .ok_or_else(|| ContractError::Decode("Offset past end of data".to_string()))?;
    let len: usize = U256::from_be_bytes(word_at(body, 0)?.0)
        .try_into()
        .map_err(|_| ContractError::Decode("Length out of range".to_string()))?;
    body.get(WORD..WORD + len)
        .map(|b| b.to_vec())
        .ok_or_else(|| ContractError::Decode("Bytes length past end of data".to_string()))
}
