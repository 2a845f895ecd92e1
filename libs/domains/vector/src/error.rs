use thiserror::Error;

/// Typed classification of storage-service failures.
///
/// The storage adapter translates vendor errors into these variants at the
/// boundary, so the pipeline matches on tags instead of parsing error text.
#[derive(Debug, Error)]
pub enum StoreError {
    /// Creation hit a bucket or index that is already there.
    #[error("{resource} already exists")]
    AlreadyExists { resource: String },

    /// The index exists but is still building and cannot serve queries.
    #[error("index not ready: {0}")]
    NotReady(String),

    /// Any other transport or service failure.
    #[error("{0}")]
    Other(String),
}

#[derive(Debug, Error)]
pub enum VectorError {
    #[error("Invalid input: {0}")]
    Validation(String),

    #[error("Storage error: {0}")]
    Store(#[from] StoreError),

    #[error("Embedding error: {0}")]
    Embedding(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

pub type VectorResult<T> = Result<T, VectorError>;

impl From<reqwest::Error> for VectorError {
    fn from(err: reqwest::Error) -> Self {
        VectorError::Embedding(err.to_string())
    }
}

impl From<serde_json::Error> for VectorError {
    fn from(err: serde_json::Error) -> Self {
        VectorError::Internal(format!("JSON error: {}", err))
    }
}
