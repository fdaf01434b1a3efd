//! Mint coordination
//!
//! Ties the passkey, contract and relay modules together into the
//! end-to-end flow that mints an NFT from a passkey-owned Safe.

mod errors;
mod mint;

pub use errors::CoordinationError;
pub use mint::{MintSettings, get_mint_receipt, mint_nft, mint_nft_with};
