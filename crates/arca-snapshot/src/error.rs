/// Errors from snapshot store operations.
#[derive(Debug, thiserror::Error)]
pub enum SnapshotError {
    /// A network/timeout class failure talking to the snapshot backend.
    #[error("transient snapshot store error: {0}")]
    Transient(String),

    /// Serialization failure while deriving the snapshot id.
    #[error("serialization error: {0}")]
    Serialization(String),
}

/// Result alias for snapshot operations.
pub type SnapshotResult<T> = Result<T, SnapshotError>;
