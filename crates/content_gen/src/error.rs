//! Error types for content generation
use thiserror::Error;

/// Failure of a single model invocation
#[derive(Debug, Error)]
pub enum GenerationError {
    #[error("Model invocation failed: {0}")]
    Invocation(String),

    #[error("Failed to encode model request: {0}")]
    Encode(#[source] serde_json::Error),

    #[error("Malformed model response: {0}")]
    MalformedResponse(String),

    #[error("Model returned an empty completion")]
    EmptyCompletion,
}

/// Failure of the generation log table
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("Table provisioning failed: {0}")]
    Provision(String),

    #[error("Table {table} not active after {attempts} checks")]
    TableNotReady { table: String, attempts: u32 },

    #[error("Record write failed: {0}")]
    Write(String),

    #[error("Invalid record: {0}")]
    InvalidRecord(String),
}

#[derive(Debug, Error)]
pub enum ContentGenError {
    #[error("Validation error: {0}")]
    Validation(String),

    #[error(transparent)]
    Generation(#[from] GenerationError),

    #[error(transparent)]
    Store(#[from] StoreError),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, ContentGenError>;
