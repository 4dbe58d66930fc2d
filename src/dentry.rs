//! # Directory Entries
//!
//! Name-to-node bindings scoped to one parent directory.
//!
//! ## Entry Table
//!
//! A [`Directory`] keeps its bound entries in insertion order, each with the
//! collation hash of its name. Lookups compare hashes first and only then ask
//! the collation policy, which may rewrite the stored name (see
//! [`CollationPolicy::compare_and_canonicalize`]).
//!
//! ## Resolution Results
//!
//! A lookup yields a [`Dentry`]: the presented name, its hash, the policy that
//! resolved it, and either [`Resolution::Bound`] or [`Resolution::Unresolved`].
//! Unresolved ("negative") results are never stored in the table; the next
//! lookup of the same name is resolved from scratch.

use parking_lot::RwLock;

use crate::{Collation, CollationPolicy, DirEntry, NodeRef};

/// Outcome of resolving a name.
#[derive(Debug, Clone)]
pub enum Resolution {
    /// No node is currently bound to the name.
    Unresolved,
    /// The name is bound to this node.
    Bound(NodeRef),
}

/// A resolved or negative directory entry handed to the host.
#[derive(Debug, Clone)]
pub struct Dentry {
    name: Vec<u8>,
    hash: u32,
    policy: CollationPolicy,
    resolution: Resolution,
}

impl Dentry {
    pub(crate) fn new(
        name: &[u8],
        hash: u32,
        policy: CollationPolicy,
        resolution: Resolution,
    ) -> Self {
        Self {
            name: name.to_vec(),
            hash,
            policy,
            resolution,
        }
    }

    /// The name as presented to the lookup.
    #[inline]
    pub fn name(&self) -> &[u8] {
        &self.name
    }

    /// Collation hash of the name.
    #[inline]
    pub fn hash(&self) -> u32 {
        self.hash
    }

    /// The collation policy attached at lookup.
    #[inline]
    pub fn policy(&self) -> CollationPolicy {
        self.policy
    }

    /// Whether and to what the name resolved.
    #[inline]
    pub fn resolution(&self) -> &Resolution {
        &self.resolution
    }

    /// The bound node, if any.
    pub fn node(&self) -> Option<&NodeRef> {
        match &self.resolution {
            Resolution::Bound(node) => Some(node),
            Resolution::Unresolved => None,
        }
    }

    /// Consume the entry, returning the bound node.
    pub fn into_node(self) -> Option<NodeRef> {
        match self.resolution {
            Resolution::Bound(node) => Some(node),
            Resolution::Unresolved => None,
        }
    }

    /// Returns `true` if nothing is bound to the name.
    #[inline]
    pub fn is_negative(&self) -> bool {
        matches!(self.resolution, Resolution::Unresolved)
    }

    /// Whether the host may release this entry as soon as it is unused.
    ///
    /// Always `true`: the namespace lives in memory, so caching an unused
    /// entry (negative ones in particular) saves no work.
    #[inline]
    pub fn delete_on_release(&self) -> bool {
        true
    }

    /// Compare another name with this entry's name under its policy.
    pub fn matches(&self, name: &[u8]) -> bool {
        self.policy.matches(&self.name, name)
    }
}

/// Entry table of a directory node.
#[derive(Debug, Default)]
pub struct Directory {
    entries: RwLock<Vec<Entry>>,
}

#[derive(Debug)]
struct Entry {
    name: Vec<u8>,
    hash: u32,
    node: NodeRef,
}

impl Directory {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    /// Number of bound entries.
    pub fn len(&self) -> usize {
        self.entries.read().len()
    }

    /// Returns `true` if no entry is bound.
    pub fn is_empty(&self) -> bool {
        self.entries.read().is_empty()
    }

    /// Find the node bound to `name`, canonicalizing the stored name.
    pub(crate) fn resolve(
        &self,
        policy: CollationPolicy,
        name: &[u8],
        hash: u32,
    ) -> Option<NodeRef> {
        let mut entries = self.entries.write();
        for entry in entries.iter_mut().filter(|e| e.hash == hash) {
            if let Collation::Equal { canonicalized } =
                policy.compare_and_canonicalize(&mut entry.name, name)
            {
                if canonicalized {
                    tracing::debug!(
                        inode = entry.node.ino(),
                        name = %String::from_utf8_lossy(name),
                        "entry name canonicalized"
                    );
                }
                return Some(NodeRef::clone(&entry.node));
            }
        }
        None
    }

    /// Find the node bound to `name` without touching the stored name.
    pub(crate) fn get(&self, policy: CollationPolicy, name: &[u8], hash: u32) -> Option<NodeRef> {
        self.entries
            .read()
            .iter()
            .find(|e| e.hash == hash && policy.matches(&e.name, name))
            .map(|e| NodeRef::clone(&e.node))
    }

    /// Bind `name` to `node`. The caller has checked that the name is free.
    pub(crate) fn insert(&self, name: &[u8], hash: u32, node: NodeRef) {
        self.entries.write().push(Entry {
            name: name.to_vec(),
            hash,
            node,
        });
    }

    /// Unbind `name`, returning the node it was bound to.
    pub(crate) fn remove(
        &self,
        policy: CollationPolicy,
        name: &[u8],
        hash: u32,
    ) -> Option<NodeRef> {
        let mut entries = self.entries.write();
        let index = entries
            .iter()
            .position(|e| e.hash == hash && policy.matches(&e.name, name))?;
        Some(entries.remove(index).node)
    }

    /// Bound child directories.
    pub(crate) fn subdirectories(&self) -> Vec<NodeRef> {
        self.entries
            .read()
            .iter()
            .filter(|e| e.node.is_dir())
            .map(|e| NodeRef::clone(&e.node))
            .collect()
    }

    /// Snapshot of the bound entries in insertion order.
    pub(crate) fn list(&self) -> Vec<DirEntry> {
        self.entries
            .read()
            .iter()
            .map(|e| DirEntry {
                name: e.name.clone(),
                inode: e.node.ino(),
                file_type: e.node.file_type(),
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::node::{InodeTable, Node, NodeSpec};
    use crate::{Codepage, ContentStore, CountingStore, Credentials, Mode};
    use std::sync::Arc;

    const CI: CollationPolicy = CollationPolicy::CaseInsensitive(Codepage::Utf8);
    const CS: CollationPolicy = CollationPolicy::CaseSensitive;

    fn file() -> NodeRef {
        let store: Arc<dyn ContentStore> = Arc::new(CountingStore::new());
        Node::allocate(
            &InodeTable::new(None),
            &store,
            NodeSpec::File,
            Mode::default_file(),
            &Credentials::ROOT,
            "test",
        )
        .unwrap()
    }

    fn bind(dir: &Directory, policy: CollationPolicy, name: &[u8]) -> NodeRef {
        let node = file();
        dir.insert(name, policy.hash(name), Arc::clone(&node));
        node
    }

    #[test]
    fn resolve_finds_bound_node() {
        let dir = Directory::new();
        let node = bind(&dir, CS, b"a.txt");
        let found = dir.resolve(CS, b"a.txt", CS.hash(b"a.txt")).unwrap();
        assert!(Arc::ptr_eq(&found, &node));
    }

    #[test]
    fn resolve_canonicalizes_under_case_insensitive() {
        let dir = Directory::new();
        bind(&dir, CI, b"Foo");
        assert!(dir.resolve(CI, b"FOO", CI.hash(b"FOO")).is_some());
        assert_eq!(dir.list()[0].name, b"FOO");
    }

    #[test]
    fn get_does_not_canonicalize() {
        let dir = Directory::new();
        bind(&dir, CI, b"Foo");
        assert!(dir.get(CI, b"fOO", CI.hash(b"fOO")).is_some());
        assert_eq!(dir.list()[0].name, b"Foo");
    }

    #[test]
    fn remove_unbinds_and_returns_node() {
        let dir = Directory::new();
        let node = bind(&dir, CS, b"x");
        bind(&dir, CS, b"y");
        let removed = dir.remove(CS, b"x", CS.hash(b"x")).unwrap();
        assert!(Arc::ptr_eq(&removed, &node));
        assert_eq!(dir.len(), 1);
        assert!(dir.remove(CS, b"x", CS.hash(b"x")).is_none());
    }

    #[test]
    fn list_keeps_insertion_order() {
        let dir = Directory::new();
        for name in [&b"c"[..], b"a", b"b"] {
            bind(&dir, CS, name);
        }
        let names: Vec<_> = dir.list().into_iter().map(|e| e.name).collect();
        assert_eq!(names, vec![b"c".to_vec(), b"a".to_vec(), b"b".to_vec()]);
    }

    #[test]
    fn subdirectories_skip_non_directories() {
        let dir = Directory::new();
        bind(&dir, CS, b"file");
        assert!(dir.subdirectories().is_empty());
    }

    #[test]
    fn negative_dentry_reports_release() {
        let dentry = Dentry::new(b"ghost", CS.hash(b"ghost"), CS, Resolution::Unresolved);
        assert!(dentry.is_negative());
        assert!(dentry.delete_on_release());
        assert!(dentry.node().is_none());
        assert!(dentry.into_node().is_none());
    }

    #[test]
    fn dentry_matches_under_attached_policy() {
        let dentry = Dentry::new(b"Name", CI.hash(b"Name"), CI, Resolution::Unresolved);
        assert!(dentry.matches(b"NAME"));
        let dentry = Dentry::new(b"Name", CS.hash(b"Name"), CS, Resolution::Unresolved);
        assert!(!dentry.matches(b"NAME"));
    }
}
