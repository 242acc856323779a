use arca_types::ObjectId;

use crate::error::ExtIdResult;
use crate::types::ExtId;

/// Mapping from source-internal identifiers to archive object ids.
///
/// Implementations must be thread-safe and support concurrent upsert
/// without external locking. `record` is last-write-wins: the mapping is a
/// pure function of content, so concurrent writers can only ever race to
/// store the same value.
pub trait ExtIdIndex: Send + Sync {
    /// Resolve one external id. `Ok(None)` means "not recorded yet".
    fn lookup(&self, ext_id: &ExtId) -> ExtIdResult<Option<ObjectId>>;

    /// Record (upsert) one mapping.
    fn record(&self, ext_id: &ExtId, target: ObjectId) -> ExtIdResult<()>;

    /// Resolve a batch, one `Option` per input in order.
    ///
    /// Default implementation calls `lookup` per id; backends may override
    /// for fewer round-trips.
    fn lookup_many(&self, ext_ids: &[ExtId]) -> ExtIdResult<Vec<Option<ObjectId>>> {
        ext_ids.iter().map(|e| self.lookup(e)).collect()
    }
}

impl<I: ExtIdIndex + ?Sized> ExtIdIndex for &I {
    fn lookup(&self, ext_id: &ExtId) -> ExtIdResult<Option<ObjectId>> {
        (**self).lookup(ext_id)
    }

    fn record(&self, ext_id: &ExtId, target: ObjectId) -> ExtIdResult<()> {
        (**self).record(ext_id, target)
    }
}

impl<I: ExtIdIndex + ?Sized> ExtIdIndex for std::sync::Arc<I> {
    fn lookup(&self, ext_id: &ExtId) -> ExtIdResult<Option<ObjectId>> {
        (**self).lookup(ext_id)
    }

    fn record(&self, ext_id: &ExtId, target: ObjectId) -> ExtIdResult<()> {
        (**self).record(ext_id, target)
    }
}
