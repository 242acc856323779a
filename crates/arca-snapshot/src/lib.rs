//! Snapshots for the Arca archival loader.
//!
//! A snapshot is the immutable set of named references (branches and tags)
//! of one origin, captured atomically at the end of a successful load
//! session. Its identity is content-derived, so two sessions observing the
//! same reference state produce the same snapshot id.

pub mod error;
pub mod memory;
pub mod traits;
pub mod types;

pub use error::{SnapshotError, SnapshotResult};
pub use memory::InMemorySnapshotStore;
pub use traits::SnapshotStore;
pub use types::{Snapshot, SnapshotBranch};
