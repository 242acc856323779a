//! One end-to-end load of an origin.
//!
//! A session ties the pieces together: resolve the prior snapshot and ExtId
//! shortcuts, walk the graph bottom-up, flush batches in dependency order,
//! then finalize a new snapshot and record the root ExtIds. The outcome is
//! binary: fully succeeded (eventful or uneventful) or failed with a cause.
//! Sessions are idempotent, so a failed one can simply be rerun; the prefix
//! flushed before the failure stays valid and prunes the retry's walk.

use std::collections::BTreeMap;
use std::fmt;

use tracing::{debug, info, warn};

use arca_extid::{ExtId, ExtIdIndex};
use arca_snapshot::{Snapshot, SnapshotBranch, SnapshotStore};
use arca_store::ObjectStore;
use arca_types::{ObjectId, ObjectRef, Origin};

use crate::accumulator::{BatchAccumulator, FlushStats};
use crate::config::LoaderConfig;
use crate::error::{LoaderError, LoaderResult};
use crate::reader::RepositoryReader;
use crate::walker::{GraphWalker, WalkStats};

/// Where a session currently is in its lifecycle.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SessionState {
    Init,
    ResolvingPrior,
    Walking,
    Flushing,
    Finalizing,
    Done,
    Failed,
}

/// Terminal outcome of a session.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SessionStatus {
    /// At least one object was newly written.
    Eventful,
    /// The walk completed but everything was already archived.
    Uneventful,
    /// The session aborted; see [`SessionReport::error`].
    Failed,
}

impl fmt::Display for SessionStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::Eventful => "eventful",
            Self::Uneventful => "uneventful",
            Self::Failed => "failed",
        };
        f.write_str(s)
    }
}

/// What a session produced, for the caller's logging and retry decision.
#[derive(Debug)]
pub struct SessionReport {
    pub status: SessionStatus,
    /// Id of the snapshot recorded (or confirmed unchanged) for the origin.
    /// `None` only when the session failed before finalizing.
    pub snapshot_id: Option<ObjectId>,
    pub walk: WalkStats,
    pub flush: FlushStats,
    /// The failure cause. `error.is_retriable()` tells the caller whether a
    /// rerun can plausibly succeed.
    pub error: Option<LoaderError>,
}

/// A single load of one origin into the archive.
///
/// The session owns no storage; every collaborator comes in by reference so
/// concurrent sessions can share the same store, index, and snapshot backend.
pub struct LoadSession<'a> {
    origin: Origin,
    reader: &'a dyn RepositoryReader,
    store: &'a dyn ObjectStore,
    ext_ids: &'a dyn ExtIdIndex,
    snapshots: &'a dyn SnapshotStore,
    config: LoaderConfig,
    state: SessionState,
}

impl<'a> LoadSession<'a> {
    pub fn new(
        origin: Origin,
        reader: &'a dyn RepositoryReader,
        store: &'a dyn ObjectStore,
        ext_ids: &'a dyn ExtIdIndex,
        snapshots: &'a dyn SnapshotStore,
        config: LoaderConfig,
    ) -> Self {
        Self {
            origin,
            reader,
            store,
            ext_ids,
            snapshots,
            config,
            state: SessionState::Init,
        }
    }

    pub fn state(&self) -> SessionState {
        self.state
    }

    /// Run the session to completion. Never panics on archive or source
    /// faults; every failure lands in the report.
    pub fn run(mut self) -> SessionReport {
        info!(origin = %self.origin, "load session started");
        let mut report = SessionReport {
            status: SessionStatus::Failed,
            snapshot_id: None,
            walk: WalkStats::default(),
            flush: FlushStats::default(),
            error: None,
        };

        match self.execute(&mut report) {
            Ok(()) => {
                self.state = SessionState::Done;
                info!(
                    origin = %self.origin,
                    status = %report.status,
                    written = report.flush.objects_written,
                    pruned = report.walk.pruned,
                    "load session finished"
                );
            }
            Err(err) => {
                self.state = SessionState::Failed;
                warn!(
                    origin = %self.origin,
                    error = %err,
                    retriable = err.is_retriable(),
                    "load session failed"
                );
                report.status = SessionStatus::Failed;
                report.error = Some(err);
            }
        }
        report
    }

    fn execute(&mut self, report: &mut SessionReport) -> LoaderResult<()> {
        self.state = SessionState::ResolvingPrior;
        let roots = self.reader.roots()?;
        let prior = self.snapshots.latest(&self.origin)?;

        // Prune seeds: targets of the prior snapshot, plus every root whose
        // source id the ExtId index already maps. Both only ever add
        // known-persisted ids; a stale miss just costs a store query.
        let mut seeds: Vec<ObjectId> = Vec::new();
        if let Some(prior) = &prior {
            seeds.extend(prior.branches().values().map(|b| b.target));
        }
        let sources: Vec<ExtId> = roots.iter().map(|r| r.source.clone()).collect();
        seeds.extend(self.ext_ids.lookup_many(&sources)?.into_iter().flatten());
        debug!(origin = %self.origin, roots = roots.len(), seeds = seeds.len(), "resolved prior state");

        self.state = SessionState::Walking;
        let mut walker = GraphWalker::new(self.reader, self.store, &self.config);
        walker.mark_persisted(seeds);
        let mut accumulator = BatchAccumulator::new(self.store, &self.config);
        let targets: Vec<ObjectRef> = roots.iter().map(|r| r.target).collect();

        let walked = walker.walk(&targets, &mut |object| accumulator.add(object));
        report.walk = walker.stats();
        report.flush = accumulator.stats();
        walked?;

        self.state = SessionState::Flushing;
        let flushed = accumulator.flush_all();
        report.flush = accumulator.stats();
        flushed?;

        self.state = SessionState::Finalizing;
        let mut branches = BTreeMap::new();
        for root in &roots {
            branches.insert(
                root.name.clone(),
                SnapshotBranch::new(root.target.kind, root.target.id),
            );
        }
        let snapshot = Snapshot::new(branches);
        let snapshot_id = match &prior {
            Some(prev) if *prev == snapshot => {
                debug!(origin = %self.origin, "snapshot unchanged");
                snapshot.id()?
            }
            _ => self.snapshots.put(&self.origin, &snapshot)?,
        };
        report.snapshot_id = Some(snapshot_id);

        // Recorded last: an ExtId must never point at an object that is not
        // yet durably stored.
        for root in &roots {
            self.ext_ids.record(&root.source, root.target.id)?;
        }

        report.status = if report.flush.objects_written > 0 {
            SessionStatus::Eventful
        } else {
            SessionStatus::Uneventful
        };
        Ok(())
    }
}

/// Convenience entry point: build and run one session.
pub fn run_session(
    origin: Origin,
    reader: &dyn RepositoryReader,
    store: &dyn ObjectStore,
    ext_ids: &dyn ExtIdIndex,
    snapshots: &dyn SnapshotStore,
    config: LoaderConfig,
) -> SessionReport {
    LoadSession::new(origin, reader, store, ext_ids, snapshots, config).run()
}
