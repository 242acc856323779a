//! External identifier index for the Arca archival loader.
//!
//! An [`ExtId`] pairs an identifier scheme tag (e.g. `git-sha1`) with a
//! source-internal identifier. The index maps these to archive-native object
//! ids so a later session against the same origin can prune already-loaded
//! subtrees without re-deriving identifiers.
//!
//! The index is an optimization layer, never a correctness requirement: the
//! object store's existence check stays authoritative, and a stale or
//! missing entry only costs extra traversal.

pub mod error;
pub mod memory;
pub mod traits;
pub mod types;

pub use error::{ExtIdError, ExtIdResult};
pub use memory::InMemoryExtIdIndex;
pub use traits::ExtIdIndex;
pub use types::ExtId;
