//! Content-addressed object storage boundary for the Arca archival loader.
//!
//! This crate provides:
//! - The typed object model (`Blob`, `Tree`, `Revision`, `Tag` and the
//!   closed `Object` enum) with canonical, content-derived identifiers
//! - The [`ObjectStore`] capability trait: "which of these ids are unknown"
//!   plus idempotent bulk upsert
//! - `InMemoryObjectStore` for tests and embedding
//! - Composable backends: [`FilteringStore`] (have/seen pre-filter) and
//!   [`RetryingStore`] (bounded backoff for transient failures)
//!
//! The store never takes part in traversal decisions; it answers liveness
//! queries and absorbs duplicate writes, which is what makes concurrent and
//! retried load sessions safe.

pub mod error;
pub mod filter;
pub mod memory;
pub mod object;
pub mod retry;
pub mod traits;

pub use error::{StoreError, StoreResult};
pub use filter::FilteringStore;
pub use memory::InMemoryObjectStore;
pub use object::{Blob, EntryMode, Object, Person, Revision, Tag, Tree, TreeEntry};
pub use retry::{RetryPolicy, RetryingStore};
pub use traits::ObjectStore;
