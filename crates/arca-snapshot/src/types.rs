use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use arca_crypto::ContentHasher;
use arca_types::{ObjectId, ObjectKind, ObjectRef};

use crate::error::{SnapshotError, SnapshotResult};

/// One named reference captured in a snapshot.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct SnapshotBranch {
    /// Kind of the target object: `Revision` for branch tips, `Tag` for
    /// annotated tags.
    pub kind: ObjectKind,
    /// Archive id of the target object.
    pub target: ObjectId,
}

impl SnapshotBranch {
    pub fn new(kind: ObjectKind, target: ObjectId) -> Self {
        Self { kind, target }
    }

    pub fn revision(target: ObjectId) -> Self {
        Self::new(ObjectKind::Revision, target)
    }

    pub fn tag(target: ObjectId) -> Self {
        Self::new(ObjectKind::Tag, target)
    }

    /// The target as a kind-tagged object reference.
    pub fn object_ref(&self) -> ObjectRef {
        ObjectRef::new(self.kind, self.target)
    }
}

/// The immutable reference state of one origin at the end of a session.
///
/// Branches live in a `BTreeMap` so the canonical encoding — and therefore
/// the snapshot id — is independent of insertion order.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Snapshot {
    branches: BTreeMap<String, SnapshotBranch>,
}

impl Snapshot {
    pub fn new(branches: BTreeMap<String, SnapshotBranch>) -> Self {
        Self { branches }
    }

    pub fn empty() -> Self {
        Self::default()
    }

    /// Content-derived identifier of this snapshot.
    pub fn id(&self) -> SnapshotResult<ObjectId> {
        let bytes = bincode::serialize(&self.branches)
            .map_err(|e| SnapshotError::Serialization(e.to_string()))?;
        Ok(ContentHasher::SNAPSHOT.hash(&bytes))
    }

    pub fn get(&self, name: &str) -> Option<&SnapshotBranch> {
        self.branches.get(name)
    }

    pub fn branches(&self) -> &BTreeMap<String, SnapshotBranch> {
        &self.branches
    }

    pub fn len(&self) -> usize {
        self.branches.len()
    }

    pub fn is_empty(&self) -> bool {
        self.branches.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn oid(byte: u8) -> ObjectId {
        ObjectId::from_hash([byte; 32])
    }

    #[test]
    fn id_is_deterministic() {
        let mut branches = BTreeMap::new();
        branches.insert("main".to_string(), SnapshotBranch::revision(oid(1)));
        let a = Snapshot::new(branches.clone());
        let b = Snapshot::new(branches);
        assert_eq!(a.id().unwrap(), b.id().unwrap());
    }

    #[test]
    fn id_is_insertion_order_independent() {
        let mut forward = BTreeMap::new();
        forward.insert("a".to_string(), SnapshotBranch::revision(oid(1)));
        forward.insert("b".to_string(), SnapshotBranch::tag(oid(2)));

        let mut reverse = BTreeMap::new();
        reverse.insert("b".to_string(), SnapshotBranch::tag(oid(2)));
        reverse.insert("a".to_string(), SnapshotBranch::revision(oid(1)));

        assert_eq!(
            Snapshot::new(forward).id().unwrap(),
            Snapshot::new(reverse).id().unwrap()
        );
    }

    #[test]
    fn different_targets_produce_different_ids() {
        let mut a = BTreeMap::new();
        a.insert("main".to_string(), SnapshotBranch::revision(oid(1)));
        let mut b = BTreeMap::new();
        b.insert("main".to_string(), SnapshotBranch::revision(oid(2)));
        assert_ne!(
            Snapshot::new(a).id().unwrap(),
            Snapshot::new(b).id().unwrap()
        );
    }

    #[test]
    fn empty_snapshot() {
        let snap = Snapshot::empty();
        assert!(snap.is_empty());
        assert_eq!(snap.len(), 0);
        assert!(!snap.id().unwrap().is_null());
    }

    #[test]
    fn branch_ref_carries_kind() {
        let branch = SnapshotBranch::tag(oid(9));
        let r = branch.object_ref();
        assert_eq!(r.kind, ObjectKind::Tag);
        assert_eq!(r.id, oid(9));
    }
}
