use arca_types::{ObjectId, ObjectKind};

/// Errors from object store operations.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// A network/timeout class failure talking to the backend. Retriable.
    #[error("transient store error during {op}: {reason}")]
    Transient { op: &'static str, reason: String },

    /// A bulk write landed for some objects and failed for others.
    ///
    /// The written prefix is safe to keep: writes are idempotent upserts,
    /// so a retried session re-confirms rather than re-sends them.
    #[error("partial write of {kind} batch: {written} written, {failed} failed")]
    PartialWrite {
        kind: ObjectKind,
        written: usize,
        failed: usize,
    },

    /// Serialization or deserialization failure.
    #[error("serialization error: {0}")]
    Serialization(String),

    /// An object was submitted under the wrong kind bucket.
    #[error("object {id} does not match expected kind {expected}")]
    KindMismatch { id: ObjectId, expected: ObjectKind },

    /// Attempted to store an object with the null ID.
    #[error("cannot store object with null ID")]
    NullObjectId,

    /// I/O error from the underlying storage backend.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl StoreError {
    /// Whether retrying the same call can plausibly succeed.
    pub fn is_transient(&self) -> bool {
        matches!(self, Self::Transient { .. } | Self::Io(_))
    }
}

/// Result alias for store operations.
pub type StoreResult<T> = Result<T, StoreError>;
