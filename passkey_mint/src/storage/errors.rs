use thiserror::Error;

/// Failure of a key/value backend.
#[derive(Debug, Error, Clone)]
pub(crate) enum StorageError {
    /// The backend could not complete a read or write
    #[error("Storage error: {0}")]
    Storage(String),
}

impl From<sqlx::Error> for StorageError {
    fn from(err: sqlx::Error) -> Self {
        tracing::error!("SQLite key/value store error: {}", err);
        Self::Storage(err.to_string())
    }
}
