//! Flat path-indexed node store.
//!
//! One entry per live descendant of root, root included. The store is the
//! single source of truth for existence and lookup; directory child-name
//! sets are kept in lockstep by the command layer, never here.

use indexmap::IndexMap;

use crate::path::Path;
use crate::types::FsNode;

/// Authoritative mapping from absolute path to node.
#[derive(Debug, Clone, Default)]
pub struct NodeStore {
    entries: IndexMap<Path, FsNode>,
}

impl NodeStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn contains(&self, path: &Path) -> bool {
        self.entries.contains_key(path)
    }

    pub fn get(&self, path: &Path) -> Option<&FsNode> {
        self.entries.get(path)
    }

    pub fn get_mut(&mut self, path: &Path) -> Option<&mut FsNode> {
        self.entries.get_mut(path)
    }

    /// Insert or overwrite. The caller guarantees the parent invariant holds
    /// afterward.
    pub fn put(&mut self, path: Path, node: FsNode) {
        self.entries.insert(path, node);
    }

    /// Remove an entry, preserving the order of the rest.
    pub fn remove(&mut self, path: &Path) -> Option<FsNode> {
        self.entries.shift_remove(path)
    }

    /// Every stored path, in insertion order.
    pub fn paths(&self) -> impl Iterator<Item = &Path> {
        self.entries.keys()
    }

    /// Lazy view of all entries strictly below `path`. Callers snapshot this
    /// into a `Vec` before mutating so a recursive command observes one
    /// consistent view.
    pub fn descendants_of<'a>(
        &'a self,
        path: &'a Path,
    ) -> impl Iterator<Item = (&'a Path, &'a FsNode)> + 'a {
        self.entries
            .iter()
            .filter(move |(p, _)| p.depth() > path.depth() && path.is_prefix_of(p))
    }
}

// ============================================================================
// Tests
// ============================================================================
