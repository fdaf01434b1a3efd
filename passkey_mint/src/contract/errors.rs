use thiserror::Error;

use crate::utils::UtilError;

/// Errors from contract call encoding and decoding.
#[derive(Debug, Error)]
pub enum ContractError {
    /// Return data did not have the expected ABI layout
    #[error("ABI decoding error: {0}")]
    Decode(String),

    /// Error from utility operations (randomness)
    #[error("Utils error: {0}")]
    Utils(#[from] UtilError),
}
