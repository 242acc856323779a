use arca_types::{ObjectId, Origin};

use crate::error::SnapshotResult;
use crate::types::Snapshot;

/// Storage backend for per-origin snapshots.
///
/// Snapshots are immutable; `put` keys them by content id and records which
/// one is the latest for an origin. Concurrent `put` of identical content is
/// harmless (same id, same bytes); concurrent `put` of different content is
/// last-write-wins on the "latest" pointer, which is acceptable because each
/// snapshot is internally consistent on its own.
pub trait SnapshotStore: Send + Sync {
    /// The most recent snapshot of an origin, if any.
    fn latest(&self, origin: &Origin) -> SnapshotResult<Option<Snapshot>>;

    /// Persist a snapshot as the latest for an origin. Returns its id.
    fn put(&self, origin: &Origin, snapshot: &Snapshot) -> SnapshotResult<ObjectId>;
}

impl<S: SnapshotStore + ?Sized> SnapshotStore for &S {
    fn latest(&self, origin: &Origin) -> SnapshotResult<Option<Snapshot>> {
        (**self).latest(origin)
    }

    fn put(&self, origin: &Origin, snapshot: &Snapshot) -> SnapshotResult<ObjectId> {
        (**self).put(origin, snapshot)
    }
}

impl<S: SnapshotStore + ?Sized> SnapshotStore for std::sync::Arc<S> {
    fn latest(&self, origin: &Origin) -> SnapshotResult<Option<Snapshot>> {
        (**self).latest(origin)
    }

    fn put(&self, origin: &Origin, snapshot: &Snapshot) -> SnapshotResult<ObjectId> {
        (**self).put(origin, snapshot)
    }
}
