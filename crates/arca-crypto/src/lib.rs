//! Content hashing for the Arca archival loader.
//!
//! Object identity is a BLAKE3 hash over a canonical serialization under a
//! kind-specific domain tag. The canonicalization is pinned here and must be
//! shared with any object store implementation, or deduplication breaks.

pub mod hasher;

pub use hasher::{ContentHasher, HasherError};
