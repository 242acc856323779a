//! The repository reader boundary.
//!
//! Whatever parses the actual source VCS (a working copy, a wire protocol
//! dump) sits behind [`RepositoryReader`]. The loader only needs three
//! things from it: the named roots, the children of a node, and the full
//! content of a node. Everything else — authentication, transport, parsing —
//! is the reader's problem.

use std::collections::HashMap;

use arca_extid::ExtId;
use arca_store::Object;
use arca_types::{ObjectId, ObjectRef};

use crate::error::{LoaderResult, StructuralError};

/// A named root reference of the source repository.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RootRef {
    /// Reference name, e.g. `refs/heads/main` or `refs/tags/v1.0.0`.
    pub name: String,
    /// The source's own identifier for the target (for the ExtId shortcut).
    pub source: ExtId,
    /// Archive-native reference to the target object.
    pub target: ObjectRef,
}

impl RootRef {
    pub fn new(name: impl Into<String>, source: ExtId, target: ObjectRef) -> Self {
        Self {
            name: name.into(),
            source,
            target,
        }
    }
}

/// Read access to the source repository's object graph.
///
/// Must be deterministic for a given reference within one session: the same
/// `ObjectRef` always yields the same children and the same materialized
/// object. Readers are consulted only for nodes the store does not already
/// hold, so they never need to enumerate the whole repository up front.
pub trait RepositoryReader: Send + Sync {
    /// The named roots (branch tips, tags) to load.
    fn roots(&self) -> LoaderResult<Vec<RootRef>>;

    /// Direct children of a node, in the node's own recorded order.
    /// Blobs have none.
    fn children(&self, reference: &ObjectRef) -> LoaderResult<Vec<ObjectRef>>;

    /// Fetch the full content of a node.
    fn materialize(&self, reference: &ObjectRef) -> LoaderResult<Object>;
}

impl<R: RepositoryReader + ?Sized> RepositoryReader for &R {
    fn roots(&self) -> LoaderResult<Vec<RootRef>> {
        (**self).roots()
    }

    fn children(&self, reference: &ObjectRef) -> LoaderResult<Vec<ObjectRef>> {
        (**self).children(reference)
    }

    fn materialize(&self, reference: &ObjectRef) -> LoaderResult<Object> {
        (**self).materialize(reference)
    }
}

impl<R: RepositoryReader + ?Sized> RepositoryReader for std::sync::Arc<R> {
    fn roots(&self) -> LoaderResult<Vec<RootRef>> {
        (**self).roots()
    }

    fn children(&self, reference: &ObjectRef) -> LoaderResult<Vec<ObjectRef>> {
        (**self).children(reference)
    }

    fn materialize(&self, reference: &ObjectRef) -> LoaderResult<Object> {
        (**self).materialize(reference)
    }
}

/// In-memory repository for tests and synthetic graphs.
///
/// Built mutably, read immutably. The adjacency list is kept separately from
/// the objects so structural faults (cycles, unresolvable references) can be
/// injected — a content-addressed object could never encode a cycle itself.
#[derive(Default)]
pub struct InMemoryRepository {
    objects: HashMap<ObjectId, Object>,
    edges: HashMap<ObjectId, Vec<ObjectRef>>,
    roots: Vec<RootRef>,
}

impl InMemoryRepository {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert an object; its children are derived from its references.
    /// Returns the object's archive reference.
    pub fn add(&mut self, object: Object) -> LoaderResult<ObjectRef> {
        let reference = object.object_ref().map_err(crate::error::LoaderError::from)?;
        self.edges.insert(reference.id, object.references());
        self.objects.insert(reference.id, object);
        Ok(reference)
    }

    /// Declare a named root. The source ExtId is derived from the archive id
    /// unless the test needs a specific one.
    pub fn set_root(&mut self, name: impl Into<String>, target: ObjectRef) -> &mut Self {
        let source = ExtId::git_sha1(target.id.as_bytes()[..20].to_vec());
        self.roots.push(RootRef::new(name, source, target));
        self
    }

    /// Inject a raw traversal edge, bypassing content derivation. Used to
    /// simulate corrupt sources (e.g. cycles).
    pub fn insert_edge(&mut self, parent: ObjectId, child: ObjectRef) {
        self.edges.entry(parent).or_default().push(child);
    }

    /// Number of objects in the repository.
    pub fn len(&self) -> usize {
        self.objects.len()
    }

    pub fn is_empty(&self) -> bool {
        self.objects.is_empty()
    }
}

impl RepositoryReader for InMemoryRepository {
    fn roots(&self) -> LoaderResult<Vec<RootRef>> {
        Ok(self.roots.clone())
    }

    fn children(&self, reference: &ObjectRef) -> LoaderResult<Vec<ObjectRef>> {
        match self.edges.get(&reference.id) {
            Some(children) => Ok(children.clone()),
            None => Err(StructuralError::Unresolvable(*reference).into()),
        }
    }

    fn materialize(&self, reference: &ObjectRef) -> LoaderResult<Object> {
        self.objects
            .get(&reference.id)
            .cloned()
            .ok_or_else(|| StructuralError::Unresolvable(*reference).into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use arca_store::{Blob, EntryMode, Tree, TreeEntry};
    use arca_types::ObjectKind;

    #[test]
    fn add_derives_edges_from_references() {
        let mut repo = InMemoryRepository::new();
        let blob = repo.add(Object::Blob(Blob::new(b"a".to_vec()))).unwrap();
        let tree = repo
            .add(Object::Tree(Tree::new(vec![TreeEntry::new(
                EntryMode::Regular,
                "a.txt",
                blob.id,
            )])))
            .unwrap();

        let children = repo.children(&tree).unwrap();
        assert_eq!(children, vec![blob]);
        assert!(repo.children(&blob).unwrap().is_empty());
    }

    #[test]
    fn unknown_reference_is_unresolvable() {
        let repo = InMemoryRepository::new();
        let reference = ObjectRef::new(ObjectKind::Blob, ObjectId::from_bytes(b"ghost"));
        assert!(matches!(
            repo.materialize(&reference),
            Err(crate::error::LoaderError::Structural(
                StructuralError::Unresolvable(_)
            ))
        ));
        assert!(repo.children(&reference).is_err());
    }

    #[test]
    fn set_root_derives_source_ext_id() {
        let mut repo = InMemoryRepository::new();
        let blob = repo.add(Object::Blob(Blob::new(b"tip".to_vec()))).unwrap();
        repo.set_root("refs/heads/main", blob);

        let roots = repo.roots().unwrap();
        assert_eq!(roots.len(), 1);
        assert_eq!(roots[0].name, "refs/heads/main");
        assert_eq!(roots[0].source.scheme(), ExtId::GIT_SHA1);
        assert_eq!(roots[0].source.value(), &blob.id.as_bytes()[..20]);
    }

    #[test]
    fn injected_edges_extend_children() {
        let mut repo = InMemoryRepository::new();
        let a = repo.add(Object::Blob(Blob::new(b"a".to_vec()))).unwrap();
        let b = repo.add(Object::Blob(Blob::new(b"b".to_vec()))).unwrap();
        repo.insert_edge(a.id, b);
        assert_eq!(repo.children(&a).unwrap(), vec![b]);
    }
}
