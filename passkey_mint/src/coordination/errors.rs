//! Error types for the mint coordination layer

use thiserror::Error;

use crate::contract::ContractError;
use crate::passkey::PasskeyError;
use crate::relay::RelayError;

/// Errors that can occur while minting through a passkey-owned Safe
#[derive(Error, Debug)]
pub enum CoordinationError {
    /// Error from passkey operations
    #[error("Passkey error: {0}")]
    PasskeyError(PasskeyError),

    /// Error from call data encoding
    #[error("Contract error: {0}")]
    ContractError(ContractError),

    /// Error from building, signing or submitting the user operation
    #[error("Relay error: {0}")]
    RelayError(RelayError),
}

// Custom From implementations that automatically log errors

impl From<PasskeyError> for CoordinationError {
    fn from(err: PasskeyError) -> Self {
        let error = Self::PasskeyError(err);
        tracing::error!("{}", error);
        error
    }
}

impl From<ContractError> for CoordinationError {
    fn from(err: ContractError) -> Self {
        let error = Self::ContractError(err);
        tracing::error!("{}", error);
        error
    }
}

impl From<RelayError> for CoordinationError {
    fn from(err: RelayError) -> Self {
        let error = Self::RelayError(err);
        tracing::error!("{}", error);
        error
    }
}
