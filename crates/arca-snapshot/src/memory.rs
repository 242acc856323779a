use std::collections::HashMap;
use std::sync::RwLock;

use tracing::debug;

use arca_types::{ObjectId, Origin};

use crate::error::SnapshotResult;
use crate::traits::SnapshotStore;
use crate::types::Snapshot;

/// In-memory snapshot store for tests and embedding.
pub struct InMemorySnapshotStore {
    latest: RwLock<HashMap<Origin, Snapshot>>,
}

impl InMemorySnapshotStore {
    pub fn new() -> Self {
        Self {
            latest: RwLock::new(HashMap::new()),
        }
    }

    /// Number of origins with a recorded snapshot.
    pub fn len(&self) -> usize {
        self.latest.read().expect("lock poisoned").len()
    }

    pub fn is_empty(&self) -> bool {
        self.latest.read().expect("lock poisoned").is_empty()
    }
}

impl Default for InMemorySnapshotStore {
    fn default() -> Self {
        Self::new()
    }
}

impl SnapshotStore for InMemorySnapshotStore {
    fn latest(&self, origin: &Origin) -> SnapshotResult<Option<Snapshot>> {
        Ok(self
            .latest
            .read()
            .expect("lock poisoned")
            .get(origin)
            .cloned())
    }

    fn put(&self, origin: &Origin, snapshot: &Snapshot) -> SnapshotResult<ObjectId> {
        let id = snapshot.id()?;
        debug!(origin = %origin, snapshot = %id.short_hex(), branches = snapshot.len(), "recorded snapshot");
        self.latest
            .write()
            .expect("lock poisoned")
            .insert(origin.clone(), snapshot.clone());
        Ok(id)
    }
}
