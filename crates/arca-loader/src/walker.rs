//! The graph walker: dependency-ordered traversal of the source object DAG.
//!
//! Descent is top-down from the requested roots so already-persisted
//! subgraphs are pruned early (the caching benefit); objects are emitted
//! bottom-up, children strictly before parents (the robustness benefit).
//! The traversal runs on an explicit frame stack — real histories are tens
//! of thousands of revisions deep, which would exhaust the call stack.

use std::collections::{HashMap, HashSet};

use tracing::{debug, trace};

use arca_store::{Object, ObjectStore};
use arca_types::{ObjectId, ObjectKind, ObjectRef};

use crate::config::LoaderConfig;
use crate::error::{LoaderError, LoaderResult, StructuralError};
use crate::reader::RepositoryReader;

/// Counters for one walk.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct WalkStats {
    /// Nodes whose children were fetched from the reader.
    pub visited: usize,
    /// Objects handed to the emit sink.
    pub emitted: usize,
    /// Nodes skipped because they were already persisted.
    pub pruned: usize,
    /// Batched `missing` queries issued to the object store.
    pub existence_queries: usize,
}

enum Frame {
    /// First encounter: decide prune-vs-descend and expand children.
    Enter(ObjectRef),
    /// All children handled: materialize and emit.
    Exit(ObjectRef),
}

/// Depth-first, memoized walker over the source repository's object graph.
///
/// Existence checks against the object store are the only blocking point:
/// pending ids are grouped per kind and queried in batches of
/// `check_batch_size`, after which traversal resumes in its original order.
/// A node reached again while still being visited (gray) is a cycle and
/// fails the walk with [`StructuralError::Cycle`].
pub struct GraphWalker<'a> {
    reader: &'a dyn RepositoryReader,
    store: &'a dyn ObjectStore,
    check_batch_size: usize,
    /// Authoritative persisted-or-not verdicts, seeded from ExtId hits and
    /// filled by batched store queries.
    status: HashMap<ObjectId, bool>,
    /// Ids staged for the next batched existence check.
    pending: Vec<ObjectRef>,
    staged: HashSet<ObjectId>,
    /// Nodes fully handled this session (emitted or pruned).
    done: HashSet<ObjectId>,
    /// Gray set: entered but not yet emitted.
    visiting: HashSet<ObjectId>,
    stats: WalkStats,
}

impl<'a> GraphWalker<'a> {
    pub fn new(
        reader: &'a dyn RepositoryReader,
        store: &'a dyn ObjectStore,
        config: &LoaderConfig,
    ) -> Self {
        Self {
            reader,
            store,
            check_batch_size: config.check_batch_size.max(1),
            status: HashMap::new(),
            pending: Vec::new(),
            staged: HashSet::new(),
            done: HashSet::new(),
            visiting: HashSet::new(),
            stats: WalkStats::default(),
        }
    }

    /// Seed ids known to be persisted (ExtId hits, prior snapshot targets).
    /// Subgraphs below them are pruned without any store query.
    pub fn mark_persisted(&mut self, ids: impl IntoIterator<Item = ObjectId>) {
        for id in ids {
            self.status.insert(id, true);
        }
    }

    pub fn stats(&self) -> WalkStats {
        self.stats
    }

    /// Walk the graph below `roots`, passing each object that needs
    /// persisting to `emit` in topological order (children first).
    pub fn walk(
        &mut self,
        roots: &[ObjectRef],
        emit: &mut dyn FnMut(Object) -> LoaderResult<()>,
    ) -> LoaderResult<()> {
        for root in roots {
            self.stage(*root);
        }

        let mut stack: Vec<Frame> = roots.iter().rev().map(|r| Frame::Enter(*r)).collect();

        while let Some(frame) = stack.pop() {
            match frame {
                Frame::Enter(reference) => {
                    if self.done.contains(&reference.id) {
                        continue;
                    }
                    if self.visiting.contains(&reference.id) {
                        return Err(StructuralError::Cycle(reference).into());
                    }
                    if self.is_persisted(reference)? {
                        trace!(reference = %reference, "pruned persisted subgraph");
                        self.done.insert(reference.id);
                        self.stats.pruned += 1;
                        continue;
                    }

                    self.visiting.insert(reference.id);
                    stack.push(Frame::Exit(reference));

                    let children = self.reader.children(&reference)?;
                    self.stats.visited += 1;
                    for child in &children {
                        self.stage(*child);
                    }
                    if self.pending.len() >= self.check_batch_size {
                        self.resolve_pending()?;
                    }
                    // Reverse push so children are entered in recorded order.
                    for child in children.into_iter().rev() {
                        stack.push(Frame::Enter(child));
                    }
                }
                Frame::Exit(reference) => {
                    let object = self.reader.materialize(&reference)?;
                    let actual = object.compute_id().map_err(LoaderError::from)?;
                    if actual != reference.id {
                        return Err(StructuralError::IdentityMismatch { reference, actual }.into());
                    }
                    emit(object)?;
                    self.visiting.remove(&reference.id);
                    self.done.insert(reference.id);
                    self.stats.emitted += 1;
                }
            }
        }

        debug!(
            visited = self.stats.visited,
            emitted = self.stats.emitted,
            pruned = self.stats.pruned,
            queries = self.stats.existence_queries,
            "walk complete"
        );
        Ok(())
    }

    /// Queue an id for the next batched existence check, unless its verdict
    /// is already known or it is already staged.
    fn stage(&mut self, reference: ObjectRef) {
        if self.done.contains(&reference.id) || self.status.contains_key(&reference.id) {
            return;
        }
        if self.staged.insert(reference.id) {
            self.pending.push(reference);
        }
    }

    /// Persisted-or-not for one node, resolving staged checks if its verdict
    /// is not yet known. This is the walk's sole suspension point.
    fn is_persisted(&mut self, reference: ObjectRef) -> LoaderResult<bool> {
        if let Some(persisted) = self.status.get(&reference.id) {
            return Ok(*persisted);
        }
        self.stage(reference);
        self.resolve_pending()?;
        Ok(self.status.get(&reference.id).copied().unwrap_or(false))
    }

    /// Drain staged ids through per-kind batched `missing` queries.
    fn resolve_pending(&mut self) -> LoaderResult<()> {
        if self.pending.is_empty() {
            return Ok(());
        }
        let mut by_kind: [Vec<ObjectId>; 4] = Default::default();
        for reference in self.pending.drain(..) {
            by_kind[reference.kind.dependency_rank()].push(reference.id);
        }
        self.staged.clear();

        for kind in ObjectKind::FLUSH_ORDER {
            let ids = &by_kind[kind.dependency_rank()];
            for chunk in ids.chunks(self.check_batch_size) {
                let missing: HashSet<ObjectId> =
                    self.store.missing(kind, chunk)?.into_iter().collect();
                self.stats.existence_queries += 1;
                for id in chunk {
                    self.status.insert(*id, !missing.contains(id));
                }
                debug!(
                    kind = %kind,
                    checked = chunk.len(),
                    missing = missing.len(),
                    "existence check"
                );
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::reader::InMemoryRepository;
    use arca_store::{Blob, EntryMode, InMemoryObjectStore, Person, Revision, Tree, TreeEntry};
    use proptest::prelude::*;

    fn person() -> Person {
        Person::new("Ada", "ada@example.org")
    }

    fn revision(tree: ObjectRef, parents: Vec<ObjectRef>, n: i64) -> Object {
        Object::Revision(Revision {
            tree: tree.id,
            parents: parents.into_iter().map(|p| p.id).collect(),
            author: person(),
            committer: person(),
            timestamp: 1_700_000_000 + n,
            message: format!("commit {n}"),
        })
    }

    /// main → R1 (tree T1); T1 → blob "a", blob "b".
    fn basic_repo() -> (InMemoryRepository, ObjectRef, [ObjectRef; 3]) {
        let mut repo = InMemoryRepository::new();
        let b1 = repo.add(Object::Blob(Blob::new(b"a".to_vec()))).unwrap();
        let b2 = repo.add(Object::Blob(Blob::new(b"b".to_vec()))).unwrap();
        let t1 = repo
            .add(Object::Tree(Tree::new(vec![
                TreeEntry::new(EntryMode::Regular, "a", b1.id),
                TreeEntry::new(EntryMode::Regular, "b", b2.id),
            ])))
            .unwrap();
        let r1 = repo.add(revision(t1, vec![], 1)).unwrap();
        (repo, r1, [b1, b2, t1])
    }

    fn collect_walk(
        repo: &InMemoryRepository,
        store: &InMemoryObjectStore,
        config: &LoaderConfig,
        roots: &[ObjectRef],
    ) -> LoaderResult<(Vec<ObjectRef>, WalkStats)> {
        let mut walker = GraphWalker::new(repo, store, config);
        let mut emitted = Vec::new();
        walker.walk(roots, &mut |obj| {
            emitted.push(obj.object_ref()?);
            Ok(())
        })?;
        Ok((emitted, walker.stats()))
    }

    #[test]
    fn emits_children_before_parents() {
        let (repo, r1, [b1, b2, t1]) = basic_repo();
        let store = InMemoryObjectStore::new();
        let (emitted, stats) =
            collect_walk(&repo, &store, &LoaderConfig::default(), &[r1]).unwrap();

        assert_eq!(emitted, vec![b1, b2, t1, r1]);
        assert_eq!(stats.emitted, 4);
        assert_eq!(stats.pruned, 0);
    }

    #[test]
    fn shared_node_is_emitted_once() {
        let mut repo = InMemoryRepository::new();
        let shared = repo.add(Object::Blob(Blob::new(b"shared".to_vec()))).unwrap();
        let t1 = repo
            .add(Object::Tree(Tree::new(vec![TreeEntry::new(
                EntryMode::Regular,
                "x",
                shared.id,
            )])))
            .unwrap();
        let t2 = repo
            .add(Object::Tree(Tree::new(vec![TreeEntry::new(
                EntryMode::Executable,
                "y",
                shared.id,
            )])))
            .unwrap();

        let store = InMemoryObjectStore::new();
        let (emitted, _) =
            collect_walk(&repo, &store, &LoaderConfig::default(), &[t1, t2]).unwrap();
        assert_eq!(emitted, vec![shared, t1, t2]);
    }

    #[test]
    fn persisted_subgraph_is_pruned_without_descending() {
        let (repo, r1, _) = basic_repo();
        let store = InMemoryObjectStore::new();

        // First walk persists everything.
        let mut walker = GraphWalker::new(&repo, &store, &LoaderConfig::default());
        walker
            .walk(&[r1], &mut |obj| {
                store.add(obj.kind(), &[obj])?;
                Ok(())
            })
            .unwrap();

        // Second walk prunes at the root: no children fetched, nothing emitted.
        let (emitted, stats) =
            collect_walk(&repo, &store, &LoaderConfig::default(), &[r1]).unwrap();
        assert!(emitted.is_empty());
        assert_eq!(stats.visited, 0);
        assert_eq!(stats.pruned, 1);
    }

    #[test]
    fn seeded_prune_set_skips_store_queries() {
        let (repo, r1, _) = basic_repo();
        let store = InMemoryObjectStore::new();
        let mut walker = GraphWalker::new(&repo, &store, &LoaderConfig::default());
        walker.mark_persisted([r1.id]);

        let mut emitted = 0usize;
        walker
            .walk(&[r1], &mut |_| {
                emitted += 1;
                Ok(())
            })
            .unwrap();
        assert_eq!(emitted, 0);
        assert_eq!(walker.stats().existence_queries, 0);
        assert_eq!(walker.stats().pruned, 1);
    }

    #[test]
    fn existence_checks_are_batched() {
        let mut repo = InMemoryRepository::new();
        let blobs: Vec<ObjectRef> = (0u8..5)
            .map(|i| repo.add(Object::Blob(Blob::new(vec![i]))).unwrap())
            .collect();
        let tree = repo
            .add(Object::Tree(Tree::new(
                blobs
                    .iter()
                    .enumerate()
                    .map(|(i, b)| TreeEntry::new(EntryMode::Regular, format!("f{i}"), b.id))
                    .collect(),
            )))
            .unwrap();

        let store = InMemoryObjectStore::new();
        let config = LoaderConfig {
            check_batch_size: 2,
            ..LoaderConfig::default()
        };
        let (emitted, stats) = collect_walk(&repo, &store, &config, &[tree]).unwrap();

        assert_eq!(emitted.len(), 6);
        // One query resolves the root, then five staged blobs in chunks of
        // two: 2 + 2 + 1.
        assert_eq!(stats.existence_queries, 4);
    }

    #[test]
    fn cycle_is_rejected_not_looped() {
        let mut repo = InMemoryRepository::new();
        let b = repo.add(Object::Blob(Blob::new(b"x".to_vec()))).unwrap();
        let t = repo
            .add(Object::Tree(Tree::new(vec![TreeEntry::new(
                EntryMode::Regular,
                "x",
                b.id,
            )])))
            .unwrap();
        let r1 = repo.add(revision(t, vec![], 1)).unwrap();
        let r2 = repo.add(revision(t, vec![r1], 2)).unwrap();
        // Corrupt the source: r1 gains its own descendant as a child.
        repo.insert_edge(r1.id, r2);

        let store = InMemoryObjectStore::new();
        let err = collect_walk(&repo, &store, &LoaderConfig::default(), &[r2]).unwrap_err();
        assert!(matches!(
            err,
            LoaderError::Structural(StructuralError::Cycle(_))
        ));
    }

    #[test]
    fn unresolvable_child_fails_the_walk() {
        let mut repo = InMemoryRepository::new();
        let ghost = ObjectId::from_bytes(b"never materialized");
        let tree = repo
            .add(Object::Tree(Tree::new(vec![TreeEntry::new(
                EntryMode::Regular,
                "ghost",
                ghost,
            )])))
            .unwrap();

        let store = InMemoryObjectStore::new();
        let err = collect_walk(&repo, &store, &LoaderConfig::default(), &[tree]).unwrap_err();
        assert!(matches!(
            err,
            LoaderError::Structural(StructuralError::Unresolvable(_))
        ));
    }

    #[test]
    fn identity_mismatch_is_detected() {
        struct LyingReader {
            advertised: ObjectRef,
        }
        impl RepositoryReader for LyingReader {
            fn roots(&self) -> LoaderResult<Vec<crate::reader::RootRef>> {
                Ok(vec![])
            }
            fn children(&self, _reference: &ObjectRef) -> LoaderResult<Vec<ObjectRef>> {
                Ok(vec![])
            }
            fn materialize(&self, _reference: &ObjectRef) -> LoaderResult<Object> {
                // Content that does not hash to the advertised id.
                Ok(Object::Blob(Blob::new(b"tampered".to_vec())))
            }
        }

        let advertised = ObjectRef::new(ObjectKind::Blob, ObjectId::from_bytes(b"advertised"));
        let reader = LyingReader { advertised };
        let store = InMemoryObjectStore::new();
        let mut walker = GraphWalker::new(&reader, &store, &LoaderConfig::default());
        let err = walker
            .walk(&[reader.advertised], &mut |_| Ok(()))
            .unwrap_err();
        assert!(matches!(
            err,
            LoaderError::Structural(StructuralError::IdentityMismatch { .. })
        ));
    }

    #[test]
    fn deep_history_does_not_exhaust_the_stack() {
        let mut repo = InMemoryRepository::new();
        let blob = repo.add(Object::Blob(Blob::new(b"src".to_vec()))).unwrap();
        let tree = repo
            .add(Object::Tree(Tree::new(vec![TreeEntry::new(
                EntryMode::Regular,
                "src",
                blob.id,
            )])))
            .unwrap();

        let mut tip = repo.add(revision(tree, vec![], 0)).unwrap();
        for n in 1..20_000 {
            tip = repo.add(revision(tree, vec![tip], n)).unwrap();
        }

        let store = InMemoryObjectStore::new();
        let (emitted, stats) =
            collect_walk(&repo, &store, &LoaderConfig::default(), &[tip]).unwrap();
        assert_eq!(emitted.len(), 20_000 + 2);
        assert_eq!(stats.emitted, 20_000 + 2);
    }

    // -----------------------------------------------------------------
    // Property: emission order is always topological
    // -----------------------------------------------------------------

    #[derive(Clone, Debug)]
    enum Node {
        Leaf(Vec<u8>),
        Dir(Vec<Node>),
    }

    fn arb_node() -> impl Strategy<Value = Node> {
        let leaf = prop::collection::vec(any::<u8>(), 0..16).prop_map(Node::Leaf);
        leaf.prop_recursive(4, 48, 4, |inner| {
            prop::collection::vec(inner, 1..4).prop_map(Node::Dir)
        })
    }

    fn insert_node(repo: &mut InMemoryRepository, node: &Node) -> ObjectRef {
        match node {
            Node::Leaf(data) => repo.add(Object::Blob(Blob::new(data.clone()))).unwrap(),
            Node::Dir(children) => {
                let entries = children
                    .iter()
                    .enumerate()
                    .map(|(i, child)| {
                        let child_ref = insert_node(repo, child);
                        let mode = match child_ref.kind {
                            ObjectKind::Tree => EntryMode::Directory,
                            _ => EntryMode::Regular,
                        };
                        TreeEntry::new(mode, format!("e{i}"), child_ref.id)
                    })
                    .collect();
                repo.add(Object::Tree(Tree::new(entries))).unwrap()
            }
        }
    }

    proptest! {
        #[test]
        fn emission_is_topological(node in arb_node()) {
            let mut repo = InMemoryRepository::new();
            let root = insert_node(&mut repo, &node);
            let store = InMemoryObjectStore::new();
            let config = LoaderConfig { check_batch_size: 3, ..LoaderConfig::default() };

            let mut walker = GraphWalker::new(&repo, &store, &config);
            let mut emitted: Vec<Object> = Vec::new();
            walker.walk(&[root], &mut |obj| {
                emitted.push(obj);
                Ok(())
            }).unwrap();

            let mut seen: HashSet<ObjectId> = HashSet::new();
            for obj in &emitted {
                for reference in obj.references() {
                    prop_assert!(seen.contains(&reference.id));
                }
                prop_assert!(seen.insert(obj.compute_id().unwrap()));
            }
            prop_assert!(seen.contains(&root.id));
        }
    }
}
