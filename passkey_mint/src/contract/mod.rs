mod abi;
mod errors;
mod nft;

pub use abi::{AbiToken, encode, encode_call, function_selector};
pub use errors::ContractError;
pub use nft::{SAFE_MINT_SIGNATURE, encode_safe_mint_data, get_random_uint256};

pub(crate) use abi::{decode_address, decode_bytes, decode_uint};
