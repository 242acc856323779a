use serde::{Deserialize, Serialize};

use arca_crypto::ContentHasher;
use arca_types::{ObjectId, ObjectKind, ObjectRef};

use crate::error::{StoreError, StoreResult};

// ---------------------------------------------------------------------------
// Blob
// ---------------------------------------------------------------------------

/// Raw content object (file contents). Leaves of the object graph.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Blob {
    pub data: Vec<u8>,
}

impl Blob {
    pub fn new(data: Vec<u8>) -> Self {
        Self { data }
    }
}

// ---------------------------------------------------------------------------
// Tree
// ---------------------------------------------------------------------------

/// File mode for a tree entry.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EntryMode {
    /// Normal file (0o100644).
    Regular,
    /// Executable file (0o100755).
    Executable,
    /// Symbolic link (0o120000).
    Symlink,
    /// Subtree / directory (0o040000).
    Directory,
}

impl EntryMode {
    /// Octal mode value (for display/serialization).
    pub fn mode_bits(&self) -> u32 {
        match self {
            Self::Regular => 0o100644,
            Self::Executable => 0o100755,
            Self::Symlink => 0o120000,
            Self::Directory => 0o040000,
        }
    }

    /// The kind of object this mode points at.
    pub fn target_kind(&self) -> ObjectKind {
        match self {
            Self::Directory => ObjectKind::Tree,
            _ => ObjectKind::Blob,
        }
    }
}

impl std::fmt::Display for EntryMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:06o}", self.mode_bits())
    }
}

/// A single named entry in a tree object.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct TreeEntry {
    pub mode: EntryMode,
    pub name: String,
    pub target: ObjectId,
}

impl TreeEntry {
    pub fn new(mode: EntryMode, name: impl Into<String>, target: ObjectId) -> Self {
        Self {
            mode,
            name: name.into(),
            target,
        }
    }
}

impl PartialOrd for TreeEntry {
    fn partial_cmp(&self, other: &Self) -> Option<std::cmp::Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for TreeEntry {
    fn cmp(&self, other: &Self) -> std::cmp::Ordering {
        self.name.cmp(&other.name)
    }
}

/// Directory listing object. Entries reference blobs and subtrees.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Tree {
    /// Entries sorted by name for deterministic hashing.
    pub entries: Vec<TreeEntry>,
}

impl Tree {
    /// Create a new tree. Entries are sorted by name so the canonical
    /// encoding is a pure function of content.
    pub fn new(mut entries: Vec<TreeEntry>) -> Self {
        entries.sort();
        Self { entries }
    }

    pub fn empty() -> Self {
        Self {
            entries: Vec::new(),
        }
    }

    /// Look up an entry by name.
    pub fn get(&self, name: &str) -> Option<&TreeEntry> {
        self.entries.iter().find(|e| e.name == name)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

// ---------------------------------------------------------------------------
// Revision
// ---------------------------------------------------------------------------

/// Author or committer identity line.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Person {
    pub name: String,
    pub email: String,
}

impl Person {
    pub fn new(name: impl Into<String>, email: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            email: email.into(),
        }
    }
}

/// A commit: one root tree plus zero or more parent revisions.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Revision {
    /// Root tree of the revision.
    pub tree: ObjectId,
    /// Parent revisions, in recorded order.
    pub parents: Vec<ObjectId>,
    pub author: Person,
    pub committer: Person,
    /// Seconds since the Unix epoch, UTC.
    pub timestamp: i64,
    pub message: String,
}

// ---------------------------------------------------------------------------
// Tag
// ---------------------------------------------------------------------------

/// An annotated tag pointing at a revision or another tag.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Tag {
    pub target: ObjectId,
    /// Kind of the target: `Revision` or `Tag` (nested tags are legal).
    pub target_kind: ObjectKind,
    pub name: String,
    pub tagger: Person,
    /// Seconds since the Unix epoch, UTC.
    pub timestamp: i64,
    pub message: String,
}

// ---------------------------------------------------------------------------
// Object
// ---------------------------------------------------------------------------

/// An immutable node in the archival object graph.
///
/// Identity is content-derived: the kind's domain-separated hasher over the
/// canonical bincode encoding of the payload. See `arca-crypto` for the
/// pinned scheme.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum Object {
    Blob(Blob),
    Tree(Tree),
    Revision(Revision),
    Tag(Tag),
}

impl Object {
    pub fn kind(&self) -> ObjectKind {
        match self {
            Self::Blob(_) => ObjectKind::Blob,
            Self::Tree(_) => ObjectKind::Tree,
            Self::Revision(_) => ObjectKind::Revision,
            Self::Tag(_) => ObjectKind::Tag,
        }
    }

    /// The canonical bytes of the payload (not the enum wrapper).
    pub fn canonical_bytes(&self) -> StoreResult<Vec<u8>> {
        let bytes = match self {
            Self::Blob(b) => bincode::serialize(b),
            Self::Tree(t) => bincode::serialize(t),
            Self::Revision(r) => bincode::serialize(r),
            Self::Tag(t) => bincode::serialize(t),
        };
        bytes.map_err(|e| StoreError::Serialization(e.to_string()))
    }

    /// Compute the content-addressed identifier for this object.
    pub fn compute_id(&self) -> StoreResult<ObjectId> {
        let bytes = self.canonical_bytes()?;
        Ok(ContentHasher::for_kind(self.kind()).hash(&bytes))
    }

    /// Kind-tagged reference to this object.
    pub fn object_ref(&self) -> StoreResult<ObjectRef> {
        Ok(ObjectRef::new(self.kind(), self.compute_id()?))
    }

    /// Everything this object references, as kind-tagged refs.
    ///
    /// Blob → nothing; Tree → entry targets; Revision → root tree then
    /// parents; Tag → its target.
    pub fn references(&self) -> Vec<ObjectRef> {
        match self {
            Self::Blob(_) => Vec::new(),
            Self::Tree(tree) => tree
                .entries
                .iter()
                .map(|e| ObjectRef::new(e.mode.target_kind(), e.target))
                .collect(),
            Self::Revision(rev) => {
                let mut refs = Vec::with_capacity(1 + rev.parents.len());
                refs.push(ObjectRef::new(ObjectKind::Tree, rev.tree));
                refs.extend(
                    rev.parents
                        .iter()
                        .map(|p| ObjectRef::new(ObjectKind::Revision, *p)),
                );
                refs
            }
            Self::Tag(tag) => vec![ObjectRef::new(tag.target_kind, tag.target)],
        }
    }

    /// Approximate in-memory payload size, used for batch byte budgets.
    pub fn size_hint(&self) -> u64 {
        match self {
            Self::Blob(b) => b.data.len() as u64,
            Self::Tree(t) => t
                .entries
                .iter()
                .map(|e| e.name.len() as u64 + 40)
                .sum(),
            Self::Revision(r) => {
                r.message.len() as u64 + 32 * (1 + r.parents.len() as u64) + 128
            }
            Self::Tag(t) => t.message.len() as u64 + t.name.len() as u64 + 160,
        }
    }
}
