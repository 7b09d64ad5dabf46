//! Server-specific error types

use thiserror::Error;

use crate::storage::StorageError;

/// Result type alias for server startup and serving
pub type ServerResult<T> = std::result::Result<T, ServerError>;

/// Errors that stop the server from starting or keep serving
#[derive(Error, Debug)]
pub enum ServerError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),
}
