use alloy_primitives::{Address, Bytes, U256};

use super::abi::{AbiToken, encode_call};
use super::errors::ContractError;
use crate::utils::gen_random_array;

/// Mint entry point of the demo ERC-721 contract.
pub const SAFE_MINT_SIGNATURE: &str = "safeMint(address,uint256)";

/// Builds `safeMint(to, tokenId)` call data.
///
/// A fresh random token id is drawn when none is given.
pub fn encode_safe_mint_data(to: Address, token_id: Option<U256>) -> Result<Bytes, ContractError> {
    let token_id = match token_id {
        Some(id) => id,
        None => get_random_uint256()?,
    };

    Ok(encode_call(
        SAFE_MINT_SIGNATURE,
        &[AbiToken::Address(to), AbiToken::Uint(token_id)],
    ))
}

/// Draws a uniformly random 256-bit integer from the system CSPRNG.
pub fn get_random_uint256() -> Result<U256, ContractError> {
    let bytes: [u8; 32] = gen_random_array()?;
    Ok(uint256_from_le_bytes(&bytes))
}

/// Byte `i` contributes `bytes[i] << (8 * i)`.
fn uint256_from_le_bytes(bytes: &[u8; 32]) -> U256 {
    bytes
        .iter()
        .enumerate()
        .fold(U256::ZERO, |acc, (i, byte)| {
            acc | (U256::from(*byte) << (8 * i))
        })
}
