use alloy_primitives::Address;
use thiserror::Error;

use crate::contract::ContractError;
use crate::passkey::PasskeyError;

/// Errors from building, signing and submitting Safe user operations.
#[derive(Debug, Error)]
pub enum RelayError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// Error object returned by a JSON-RPC endpoint
    #[error("JSON-RPC error {code}: {message}")]
    Rpc { code: i64, message: String },

    #[error("Invalid RPC response: {0}")]
    InvalidResponse(String),

    /// The bundler does not serve the EntryPoint this crate targets
    #[error("Entry point {0} is not supported by the bundler")]
    UnsupportedEntryPoint(Address),

    #[error("Invalid Safe configuration: {0}")]
    Config(String),

    #[error("Signing error: {0}")]
    Signing(String),

    #[error("Timed out waiting for receipt of user operation {0}")]
    Timeout(String),

    #[error("Passkey error: {0}")]
    Passkey(#[from] PasskeyError),

    #[error("Contract error: {0}")]
    Contract(#[from] ContractError),

    #[error("Serde error: {0}")]
    SerdeJson(#[from] serde_json::Error),
}
