use arca_types::{ObjectId, ObjectKind};

use crate::error::StoreResult;
use crate::object::Object;

/// Content-addressed archival object store.
///
/// All implementations must satisfy these invariants:
/// - `add` is an idempotent upsert: re-sending an object that already exists
///   is a no-op, never an error. This is what makes retried and concurrent
///   load sessions safe without any locking.
/// - `missing` answers against live store state, so one worker's writes are
///   visible to another worker's pruning checks.
/// - Objects are immutable once written (content addressing guarantees the
///   same id always maps to the same content).
/// - All I/O errors are propagated, never silently ignored.
pub trait ObjectStore: Send + Sync {
    /// Of `ids`, return the subset not yet stored under `kind`.
    ///
    /// The result order is unspecified. An empty result means every id is
    /// already persisted (together with its whole reachable subgraph, per
    /// the topological persistence invariant).
    fn missing(&self, kind: ObjectKind, ids: &[ObjectId]) -> StoreResult<Vec<ObjectId>>;

    /// Bulk-write objects of one kind. Returns how many were newly written
    /// (already-present objects are skipped and not counted).
    fn add(&self, kind: ObjectKind, objects: &[Object]) -> StoreResult<usize>;
}

impl<S: ObjectStore + ?Sized> ObjectStore for &S {
    fn missing(&self, kind: ObjectKind, ids: &[ObjectId]) -> StoreResult<Vec<ObjectId>> {
        (**self).missing(kind, ids)
    }

    fn add(&self, kind: ObjectKind, objects: &[Object]) -> StoreResult<usize> {
        (**self).add(kind, objects)
    }
}

impl<S: ObjectStore + ?Sized> ObjectStore for std::sync::Arc<S> {
    fn missing(&self, kind: ObjectKind, ids: &[ObjectId]) -> StoreResult<Vec<ObjectId>> {
        (**self).missing(kind, ids)
    }

    fn add(&self, kind: ObjectKind, objects: &[Object]) -> StoreResult<usize> {
        (**self).add(kind, objects)
    }
}
