use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::TypeError;

/// Content-addressed identifier for any archived object.
///
/// An `ObjectId` is the BLAKE3 hash of an object's canonical serialization
/// under a kind-specific domain tag. Identical content always produces the
/// same `ObjectId`, which is what makes objects deduplicatable across
/// origins and sessions.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ObjectId([u8; 32]);

impl ObjectId {
    /// Create an `ObjectId` from a pre-computed hash.
    pub const fn from_hash(hash: [u8; 32]) -> Self {
        Self(hash)
    }

    /// Compute an `ObjectId` directly from raw bytes (no domain separation).
    ///
    /// Real object ids come from `arca-crypto`'s domain-separated hashers;
    /// this is for synthetic ids in tests and tooling.
    pub fn from_bytes(data: &[u8]) -> Self {
        Self(*blake3::hash(data).as_bytes())
    }

    /// The null object ID (all zeros). Represents "no object".
    pub const fn null() -> Self {
        Self([0u8; 32])
    }

    /// Returns `true` if this is the null object ID.
    pub fn is_null(&self) -> bool {
        self.0 == [0u8; 32]
    }

    /// The raw 32-byte hash.
    pub fn as_bytes(&self) -> &[u8; 32] {
        &self.0
    }

    /// Hex-encoded string representation.
    pub fn to_hex(&self) -> String {
        hex::encode(self.0)
    }

    /// Short hex representation (first 8 characters).
    pub fn short_hex(&self) -> String {
        hex::encode(&self.0[..4])
    }

    /// Parse from a hex string.
    pub fn from_hex(s: &str) -> Result<Self, TypeError> {
        let bytes = hex::decode(s).map_err(|e| TypeError::InvalidHex(e.to_string()))?;
        if bytes.len() != 32 {
            return Err(TypeError::InvalidLength {
                expected: 32,
                actual: bytes.len(),
            });
        }
        let mut arr = [0u8; 32];
        arr.copy_from_slice(&bytes);
        Ok(Self(arr))
    }
}

impl fmt::Debug for ObjectId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ObjectId({})", self.short_hex())
    }
}

impl fmt::Display for ObjectId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_hex())
    }
}

impl From<[u8; 32]> for ObjectId {
    fn from(bytes: [u8; 32]) -> Self {
        Self(bytes)
    }
}

impl From<ObjectId> for [u8; 32] {
    fn from(id: ObjectId) -> Self {
        id.0
    }
}

/// The kind of an archived object. Closed set: the reference graph is
/// Tree → {Blob, Tree}, Revision → {Tree, Revision}, Tag → {Revision, Tag}.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum ObjectKind {
    /// Raw content (file contents). Leaves of the graph.
    Blob,
    /// Directory listing: named entries referencing blobs and subtrees.
    Tree,
    /// A commit: one root tree plus zero or more parent revisions.
    Revision,
    /// An annotated tag pointing at a revision or another tag.
    Tag,
}

impl ObjectKind {
    /// All kinds in dependency order: a kind only ever references kinds at
    /// the same or a lower rank. Batches are flushed in this order so no
    /// persisted object can dangle.
    pub const FLUSH_ORDER: [ObjectKind; 4] = [
        ObjectKind::Blob,
        ObjectKind::Tree,
        ObjectKind::Revision,
        ObjectKind::Tag,
    ];

    /// Position of this kind within [`Self::FLUSH_ORDER`].
    pub fn dependency_rank(&self) -> usize {
        match self {
            Self::Blob => 0,
            Self::Tree => 1,
            Self::Revision => 2,
            Self::Tag => 3,
        }
    }
}

impl fmt::Display for ObjectKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Blob => write!(f, "blob"),
            Self::Tree => write!(f, "tree"),
            Self::Revision => write!(f, "revision"),
            Self::Tag => write!(f, "tag"),
        }
    }
}

/// A kind-tagged reference to an object.
///
/// The repository reader hands these out for roots and children; carrying
/// the kind alongside the id lets the walker group existence checks per
/// kind without materializing anything.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ObjectRef {
    pub kind: ObjectKind,
    pub id: ObjectId,
}

impl ObjectRef {
    pub fn new(kind: ObjectKind, id: ObjectId) -> Self {
        Self { kind, id }
    }
}

impl fmt::Display for ObjectRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.kind, self.id.short_hex())
    }
}
