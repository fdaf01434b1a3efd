use thiserror::Error;

use crate::storage::StorageError;
use crate::utils::UtilError;

/// Errors that can occur while creating, storing or using a passkey.
#[derive(Debug, Error)]
pub enum PasskeyError {
    /// The credential container returned no credential
    #[error("{0}")]
    Creation(String),

    /// Error related to passkey configuration (e.g., unparsable ORIGIN)
    #[error("Configuration error: {0}")]
    Config(String),

    /// Error when a requested passkey is not in storage
    #[error("Not found error: {0}")]
    NotFound(String),

    /// Error validating the client data JSON produced by the authenticator
    #[error("Invalid client data: {0}")]
    ClientData(String),

    /// Error parsing the authenticator data structure
    #[error("Invalid authenticator data: {0}")]
    AuthenticatorData(String),

    /// Error in cryptographic operations (key generation, signing)
    #[error("Crypto error: {0}")]
    Crypto(String),

    /// Error with improperly formatted data
    #[error("Invalid format: {0}")]
    Format(String),

    /// Error accessing or modifying the stored passkey list
    #[error("Storage error: {0}")]
    Storage(String),

    /// Error from utility operations
    #[error("Utils error: {0}")]
    Utils(#[from] UtilError),

    /// Error from JSON serialization/deserialization
    #[error("Serde error: {0}")]
    SerdeJson(#[from] serde_json::Error),
}

impl From<StorageError> for PasskeyError {
    fn from(err: StorageError) -> Self {
        Self::Storage(err.to_string())
    }
}
