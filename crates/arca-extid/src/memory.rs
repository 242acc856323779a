use std::collections::HashMap;
use std::sync::RwLock;

use tracing::debug;

use arca_types::ObjectId;

use crate::error::ExtIdResult;
use crate::traits::ExtIdIndex;
use crate::types::ExtId;

/// In-memory external identifier index for tests and embedding.
pub struct InMemoryExtIdIndex {
    entries: RwLock<HashMap<ExtId, ObjectId>>,
}

impl InMemoryExtIdIndex {
    pub fn new() -> Self {
        Self {
            entries: RwLock::new(HashMap::new()),
        }
    }

    /// Number of recorded mappings.
    pub fn len(&self) -> usize {
        self.entries.read().expect("lock poisoned").len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.read().expect("lock poisoned").is_empty()
    }
}

impl Default for InMemoryExtIdIndex {
    fn default() -> Self {
        Self::new()
    }
}

impl ExtIdIndex for InMemoryExtIdIndex {
    fn lookup(&self, ext_id: &ExtId) -> ExtIdResult<Option<ObjectId>> {
        Ok(self
            .entries
            .read()
            .expect("lock poisoned")
            .get(ext_id)
            .copied())
    }

    fn record(&self, ext_id: &ExtId, target: ObjectId) -> ExtIdResult<()> {
        debug!(ext_id = %ext_id, target = %target.short_hex(), "recorded ext id");
        self.entries
            .write()
            .expect("lock poisoned")
            .insert(ext_id.clone(), target);
        Ok(())
    }
}
