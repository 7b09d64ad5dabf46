//! Error types for proofhook

use thiserror::Error;

/// Result type alias for proofhook operations
pub type Result<T> = std::result::Result<T, ProofhookError>;

/// Main error type for the shared crate
#[derive(Error, Debug)]
pub enum ProofhookError {
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Invalid extraction rule for {field}: {source}")]
    InvalidRule {
        field: &'static str,
        #[source]
        source: regex::Error,
    },
}
