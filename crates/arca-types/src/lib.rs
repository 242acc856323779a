//! Foundation types for the Arca archival loader.
//!
//! Everything here is shared by the storage, index, and loading crates:
//! content-addressed object identifiers, the closed set of object kinds,
//! kind-tagged object references, and origins (the logical source
//! repositories being archived).

pub mod error;
pub mod object;
pub mod origin;

pub use error::TypeError;
pub use object::{ObjectId, ObjectKind, ObjectRef};
pub use origin::Origin;
