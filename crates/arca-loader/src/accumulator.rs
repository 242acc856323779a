//! Per-kind write batching in front of the object store.
//!
//! The walker emits objects one at a time; the accumulator groups them into
//! per-kind buffers and ships each buffer as one bulk `add`. Flushing always
//! proceeds in dependency order (blobs, trees, revisions, tags): whenever a
//! kind's buffer trips its threshold, every lower-ranked buffer is drained
//! first. Combined with the walker's bottom-up emission this keeps the store
//! closed under references at every instant, even mid-session.

use tracing::debug;

use arca_store::{Object, ObjectStore};
use arca_types::ObjectKind;

use crate::config::LoaderConfig;
use crate::error::LoaderResult;

/// Counters over the accumulator's lifetime.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct FlushStats {
    /// Bulk `add` calls issued.
    pub flushes: usize,
    /// Objects handed to the store (including already-present ones).
    pub objects_sent: usize,
    /// Objects the store reported as newly written.
    pub objects_written: usize,
}

/// Bounded, dependency-ordered write buffer.
///
/// Buffers are keyed by [`ObjectKind::dependency_rank`]. A buffer flushes
/// once it holds `flush_max_objects` objects or `flush_max_bytes` payload
/// bytes, whichever trips first. Callers must invoke [`flush_all`] at the
/// end of a walk; dropping an accumulator with buffered objects loses them.
///
/// [`flush_all`]: BatchAccumulator::flush_all
pub struct BatchAccumulator<'a> {
    store: &'a dyn ObjectStore,
    max_objects: usize,
    max_bytes: u64,
    buffers: [Vec<Object>; 4],
    buffered_bytes: [u64; 4],
    stats: FlushStats,
}

impl<'a> BatchAccumulator<'a> {
    pub fn new(store: &'a dyn ObjectStore, config: &LoaderConfig) -> Self {
        Self {
            store,
            max_objects: config.flush_max_objects.max(1),
            max_bytes: config.flush_max_bytes.max(1),
            buffers: Default::default(),
            buffered_bytes: [0; 4],
            stats: FlushStats::default(),
        }
    }

    pub fn stats(&self) -> FlushStats {
        self.stats
    }

    /// Objects currently buffered across all kinds.
    pub fn buffered(&self) -> usize {
        self.buffers.iter().map(Vec::len).sum()
    }

    /// Buffer one object, flushing if its kind's thresholds trip.
    pub fn add(&mut self, object: Object) -> LoaderResult<()> {
        let rank = object.kind().dependency_rank();
        self.buffered_bytes[rank] += object.size_hint();
        self.buffers[rank].push(object);

        if self.buffers[rank].len() >= self.max_objects
            || self.buffered_bytes[rank] >= self.max_bytes
        {
            self.flush_through(rank)?;
        }
        Ok(())
    }

    /// Drain every buffer in dependency order.
    pub fn flush_all(&mut self) -> LoaderResult<()> {
        self.flush_through(3)
    }

    /// Drain the buffers of `rank` and every rank below it, lowest first.
    /// Children land in the store before the parents that reference them.
    fn flush_through(&mut self, rank: usize) -> LoaderResult<()> {
        for kind in &ObjectKind::FLUSH_ORDER[..=rank] {
            self.flush_kind(*kind)?;
        }
        Ok(())
    }

    fn flush_kind(&mut self, kind: ObjectKind) -> LoaderResult<()> {
        let rank = kind.dependency_rank();
        if self.buffers[rank].is_empty() {
            return Ok(());
        }
        let batch = std::mem::take(&mut self.buffers[rank]);
        self.buffered_bytes[rank] = 0;

        let written = self.store.add(kind, &batch)?;
        self.stats.flushes += 1;
        self.stats.objects_sent += batch.len();
        self.stats.objects_written += written;
        debug!(kind = %kind, sent = batch.len(), written, "flushed batch");
        Ok(())
    }
}
