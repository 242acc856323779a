//! Graph-traversal loading engine for the Arca archive.
//!
//! This crate is the core of the loader. It provides:
//! - The [`RepositoryReader`] boundary to whatever parses the source VCS
//! - [`GraphWalker`]: explicit-stack DAG traversal with batched
//!   already-persisted pruning and bottom-up emission
//! - [`BatchAccumulator`]: per-kind bounded write batches flushed in
//!   dependency order (blobs before trees before revisions before tags)
//! - [`LoadSession`]: one end-to-end ingestion of an origin, ending in an
//!   eventful, uneventful, or failed report
//!
//! The load-bearing invariant is topological persistence: an object is
//! written only after everything it references is written. An interrupted
//! session therefore never leaves a persisted object with a dangling child,
//! and a later session can prune any subgraph whose root is already stored.

pub mod accumulator;
pub mod config;
pub mod error;
pub mod reader;
pub mod session;
pub mod walker;

pub use accumulator::{BatchAccumulator, FlushStats};
pub use config::LoaderConfig;
pub use error::{LoaderError, LoaderResult, StructuralError};
pub use reader::{InMemoryRepository, RepositoryReader, RootRef};
pub use session::{run_session, LoadSession, SessionReport, SessionState, SessionStatus};
pub use walker::{GraphWalker, WalkStats};
