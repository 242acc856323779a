use arca_extid::ExtIdError;
use arca_snapshot::SnapshotError;
use arca_store::StoreError;
use arca_types::{ObjectId, ObjectRef};

/// A fault in the source object graph itself.
///
/// Structural errors are fatal to the session and never retried: re-reading
/// a broken repository will not unbreak it.
#[derive(Debug, thiserror::Error)]
pub enum StructuralError {
    /// The reference graph contains a cycle (must be a DAG).
    #[error("reference cycle detected at {0}")]
    Cycle(ObjectRef),

    /// The reader cannot materialize a referenced object.
    #[error("cannot materialize referenced object {0}")]
    Unresolvable(ObjectRef),

    /// A materialized object hashed to a different id than advertised.
    #[error("object {reference} materialized with id {actual}")]
    IdentityMismatch {
        reference: ObjectRef,
        actual: ObjectId,
    },

    /// The object exists but its content is malformed.
    #[error("malformed object {reference}: {reason}")]
    Malformed {
        reference: ObjectRef,
        reason: String,
    },
}

/// Errors from the loading engine.
///
/// Everything funnels into the session's single terminal `Failed` status; a
/// session is binary — fully succeeded or failed — with the cause kept for
/// the caller's retry decision.
#[derive(Debug, thiserror::Error)]
pub enum LoaderError {
    #[error(transparent)]
    Structural(#[from] StructuralError),

    #[error(transparent)]
    Store(#[from] StoreError),

    #[error(transparent)]
    ExtId(#[from] ExtIdError),

    #[error(transparent)]
    Snapshot(#[from] SnapshotError),
}

impl LoaderError {
    /// Whether a fresh session against the same roots can plausibly succeed.
    pub fn is_retriable(&self) -> bool {
        !matches!(self, Self::Structural(_))
    }
}

/// Result alias for loader operations.
pub type LoaderResult<T> = Result<T, LoaderError>;
