use std::collections::HashMap;
use std::sync::RwLock;

use tracing::debug;

use arca_types::{ObjectId, ObjectKind};

use crate::error::{StoreError, StoreResult};
use crate::object::Object;
use crate::traits::ObjectStore;

/// In-memory, HashMap-based object store.
///
/// Intended for tests and embedding. Objects are held behind a `RwLock` for
/// safe concurrent access from multiple load sessions. Stored values are the
/// canonical encodings keyed by content id.
pub struct InMemoryObjectStore {
    objects: RwLock<HashMap<ObjectId, StoredEntry>>,
}

struct StoredEntry {
    kind: ObjectKind,
    bytes: Vec<u8>,
}

impl InMemoryObjectStore {
    /// Create a new empty in-memory store.
    pub fn new() -> Self {
        Self {
            objects: RwLock::new(HashMap::new()),
        }
    }

    /// Number of objects currently stored.
    pub fn len(&self) -> usize {
        self.objects.read().expect("lock poisoned").len()
    }

    /// Returns `true` if the store is empty.
    pub fn is_empty(&self) -> bool {
        self.objects.read().expect("lock poisoned").is_empty()
    }

    /// Number of stored objects of one kind.
    pub fn count_kind(&self, kind: ObjectKind) -> usize {
        self.objects
            .read()
            .expect("lock poisoned")
            .values()
            .filter(|e| e.kind == kind)
            .count()
    }

    /// Whether one id is present (any kind).
    pub fn contains(&self, id: &ObjectId) -> bool {
        self.objects.read().expect("lock poisoned").contains_key(id)
    }

    /// Total bytes across all stored objects.
    pub fn total_bytes(&self) -> u64 {
        self.objects
            .read()
            .expect("lock poisoned")
            .values()
            .map(|e| e.bytes.len() as u64)
            .sum()
    }
}

impl Default for InMemoryObjectStore {
    fn default() -> Self {
        Self::new()
    }
}

impl ObjectStore for InMemoryObjectStore {
    fn missing(&self, _kind: ObjectKind, ids: &[ObjectId]) -> StoreResult<Vec<ObjectId>> {
        let map = self.objects.read().expect("lock poisoned");
        Ok(ids
            .iter()
            .filter(|id| !map.contains_key(id))
            .copied()
            .collect())
    }

    fn add(&self, kind: ObjectKind, objects: &[Object]) -> StoreResult<usize> {
        let mut map = self.objects.write().expect("lock poisoned");
        let mut new = 0usize;
        for obj in objects {
            if obj.kind() != kind {
                return Err(StoreError::KindMismatch {
                    id: obj.compute_id()?,
                    expected: kind,
                });
            }
            let id = obj.compute_id()?;
            if id.is_null() {
                return Err(StoreError::NullObjectId);
            }
            // Idempotent upsert: identical content always maps to the same
            // id, so an existing entry is simply kept.
            if !map.contains_key(&id) {
                let bytes = obj.canonical_bytes()?;
                map.insert(id, StoredEntry { kind, bytes });
                new += 1;
            }
        }
        debug!(kind = %kind, batch = objects.len(), new, "stored batch");
        Ok(new)
    }
}

impl std::fmt::Debug for InMemoryObjectStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("InMemoryObjectStore")
            .field("object_count", &self.len())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::object::{Blob, Tree};

    fn blob(content: &[u8]) -> Object {
        Object::Blob(Blob::new(content.to_vec()))
    }

    #[test]
    fn add_and_query_missing() {
        let store = InMemoryObjectStore::new();
        let obj = blob(b"hello");
        let id = obj.compute_id().unwrap();

        let missing = store.missing(ObjectKind::Blob, &[id]).unwrap();
        assert_eq!(missing, vec![id]);

        let new = store.add(ObjectKind::Blob, &[obj]).unwrap();
        assert_eq!(new, 1);
        assert!(store.missing(ObjectKind::Blob, &[id]).unwrap().is_empty());
    }

    #[test]
    fn add_is_idempotent() {
        let store = InMemoryObjectStore::new();
        let obj = blob(b"dup");
        assert_eq!(store.add(ObjectKind::Blob, &[obj.clone()]).unwrap(), 1);
        assert_eq!(store.add(ObjectKind::Blob, &[obj]).unwrap(), 0);
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn duplicate_content_within_batch_counts_once() {
        let store = InMemoryObjectStore::new();
        let new = store
            .add(ObjectKind::Blob, &[blob(b"same"), blob(b"same")])
            .unwrap();
        assert_eq!(new, 1);
    }

    #[test]
    fn kind_mismatch_is_rejected() {
        let store = InMemoryObjectStore::new();
        let err = store.add(ObjectKind::Tree, &[blob(b"nope")]).unwrap_err();
        assert!(matches!(err, StoreError::KindMismatch { .. }));
    }

    #[test]
    fn missing_preserves_unknown_only() {
        let store = InMemoryObjectStore::new();
        let known = blob(b"known");
        let known_id = known.compute_id().unwrap();
        store.add(ObjectKind::Blob, &[known]).unwrap();

        let unknown_id = ObjectId::from_bytes(b"unknown");
        let missing = store
            .missing(ObjectKind::Blob, &[known_id, unknown_id])
            .unwrap();
        assert_eq!(missing, vec![unknown_id]);
    }

    #[test]
    fn count_kind_distinguishes_kinds() {
        let store = InMemoryObjectStore::new();
        store.add(ObjectKind::Blob, &[blob(b"a"), blob(b"b")]).unwrap();
        store
            .add(ObjectKind::Tree, &[Object::Tree(Tree::empty())])
            .unwrap();
        assert_eq!(store.count_kind(ObjectKind::Blob), 2);
        assert_eq!(store.count_kind(ObjectKind::Tree), 1);
        assert_eq!(store.count_kind(ObjectKind::Revision), 0);
    }

    #[test]
    fn concurrent_writers_are_safe() {
        use std::sync::Arc;
        use std::thread;

        let store = Arc::new(InMemoryObjectStore::new());
        let handles: Vec<_> = (0..8)
            .map(|i| {
                let store = Arc::clone(&store);
                thread::spawn(move || {
                    // Half the threads write the same shared blob.
                    let obj = if i % 2 == 0 {
                        blob(b"shared")
                    } else {
                        blob(format!("unique-{i}").as_bytes())
                    };
                    store.add(ObjectKind::Blob, &[obj]).unwrap();
                })
            })
            .collect();
        for h in handles {
            h.join().expect("thread should not panic");
        }
        // 1 shared + 4 unique.
        assert_eq!(store.len(), 5);
    }

    #[test]
    fn debug_format() {
        let store = InMemoryObjectStore::new();
        store.add(ObjectKind::Blob, &[blob(b"x")]).unwrap();
        let debug = format!("{store:?}");
        assert!(debug.contains("InMemoryObjectStore"));
        assert!(debug.contains("object_count"));
    }
}
