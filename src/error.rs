//! Errors surfaced by peer queries

/// Result alias for fallible query operations
pub type Result<T> = std::result::Result<T, QueryError>;

#[derive(Debug, thiserror::Error)]
pub enum QueryError {
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    #[error("Failed to read snapshot: {0}")]
    SnapshotIo(#[from] std::io::Error),

    #[error("Malformed snapshot: {0}")]
    MalformedSnapshot(#[from] serde_json::Error),
}
