use tracing::debug;

use arca_types::{ObjectId, ObjectKind};

use crate::error::StoreResult;
use crate::object::Object;
use crate::traits::ObjectStore;

/// Store wrapper that pre-filters writes through a `missing` query.
///
/// Mirrors the have/seen exchange of bulk archival backends: first send the
/// ids, learn which the backend does not know, then upload only those. Wrap
/// a remote store with this when the payloads are large relative to an id
/// round-trip; for local stores the extra query is pure overhead.
pub struct FilteringStore<S> {
    inner: S,
}

impl<S: ObjectStore> FilteringStore<S> {
    pub fn new(inner: S) -> Self {
        Self { inner }
    }

    /// The wrapped store.
    pub fn into_inner(self) -> S {
        self.inner
    }
}

impl<S: ObjectStore> ObjectStore for FilteringStore<S> {
    fn missing(&self, kind: ObjectKind, ids: &[ObjectId]) -> StoreResult<Vec<ObjectId>> {
        self.inner.missing(kind, ids)
    }

    fn add(&self, kind: ObjectKind, objects: &[Object]) -> StoreResult<usize> {
        if objects.is_empty() {
            return Ok(0);
        }
        let ids = objects
            .iter()
            .map(|o| o.compute_id())
            .collect::<StoreResult<Vec<ObjectId>>>()?;
        let unknown: std::collections::HashSet<ObjectId> =
            self.inner.missing(kind, &ids)?.into_iter().collect();
        if unknown.is_empty() {
            debug!(kind = %kind, batch = objects.len(), "batch fully known, skipping upload");
            return Ok(0);
        }
        let to_send: Vec<Object> = objects
            .iter()
            .zip(ids.iter())
            .filter(|(_, id)| unknown.contains(id))
            .map(|(o, _)| o.clone())
            .collect();
        debug!(
            kind = %kind,
            batch = objects.len(),
            sending = to_send.len(),
            "filtered batch before upload"
        );
        self.inner.add(kind, &to_send)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::memory::InMemoryObjectStore;
    use crate::object::Blob;
    use std::sync::atomic::{AtomicUsize, Ordering};

    fn blob(content: &[u8]) -> Object {
        Object::Blob(Blob::new(content.to_vec()))
    }

    /// Counts objects that actually reach `add`.
    struct CountingStore {
        inner: InMemoryObjectStore,
        uploaded: AtomicUsize,
    }

    impl CountingStore {
        fn new() -> Self {
            Self {
                inner: InMemoryObjectStore::new(),
                uploaded: AtomicUsize::new(0),
            }
        }
    }

    impl ObjectStore for CountingStore {
        fn missing(&self, kind: ObjectKind, ids: &[ObjectId]) -> StoreResult<Vec<ObjectId>> {
            self.inner.missing(kind, ids)
        }

        fn add(&self, kind: ObjectKind, objects: &[Object]) -> StoreResult<usize> {
            self.uploaded.fetch_add(objects.len(), Ordering::SeqCst);
            self.inner.add(kind, objects)
        }
    }

    #[test]
    fn known_objects_are_not_resent() {
        let counting = CountingStore::new();
        counting.add(ObjectKind::Blob, &[blob(b"old")]).unwrap();
        counting.uploaded.store(0, Ordering::SeqCst);

        let store = FilteringStore::new(counting);
        let new = store
            .add(ObjectKind::Blob, &[blob(b"old"), blob(b"new")])
            .unwrap();
        assert_eq!(new, 1);
        // Only the unknown blob crossed the wire.
        assert_eq!(store.into_inner().uploaded.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn fully_known_batch_skips_upload_entirely() {
        let counting = CountingStore::new();
        counting.add(ObjectKind::Blob, &[blob(b"a")]).unwrap();
        counting.uploaded.store(0, Ordering::SeqCst);

        let store = FilteringStore::new(counting);
        assert_eq!(store.add(ObjectKind::Blob, &[blob(b"a")]).unwrap(), 0);
        assert_eq!(store.into_inner().uploaded.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn empty_batch_is_a_noop() {
        let store = FilteringStore::new(InMemoryObjectStore::new());
        assert_eq!(store.add(ObjectKind::Blob, &[]).unwrap(), 0);
    }
}
