//! File system command surface.
//!
//! [`FileSystem`] owns the node store plus the current working directory and
//! implements the full command set on top of them. Every command resolves
//! its path arguments against the cwd, validates fully, and only then
//! mutates, so a failed command leaves the store exactly as it was. The
//! recursive commands (rm, mv, merge, walk, recursive find) snapshot the
//! affected subtree before touching it; no partial effect is ever
//! observable.

use crate::path::Path;
use crate::store::NodeStore;
use crate::types::{FsError, FsNode};

/// In-memory file system: one root directory, nested files and directories,
/// and a current working directory that always names a live directory.
#[derive(Debug, Clone)]
pub struct FileSystem {
    store: NodeStore,
    cwd: Path,
}

impl FileSystem {
    /// Create a file system containing only the root directory, with the
    /// cwd at `/`.
    pub fn new() -> Self {
        let mut store = NodeStore::new();
        let root = Path::root();
        store.put(root.clone(), FsNode::dir());
        FileSystem { store, cwd: root }
    }

    /// Current working directory.
    pub fn cwd(&self) -> &Path {
        &self.cwd
    }

    /// True if the path resolves to a live entry.
    pub fn exists(&self, path_str: &str) -> bool {
        match self.pathify(path_str) {
            Ok(path) => self.store.contains(&path),
            Err(_) => false,
        }
    }

    /// Change the current working directory.
    pub fn cd(&mut self, path_str: &str) -> Result<(), FsError> {
        let path = self.pathify(path_str)?;
        self.must_be_dir(&path, "cd")?;
        self.cwd = path;
        Ok(())
    }

    /// List the child names of a directory, in creation order. `None` lists
    /// the cwd.
    pub fn ls(&self, path_str: Option<&str>) -> Result<Vec<String>, FsError> {
        let path = match path_str {
            Some(s) => self.pathify(s)?,
            None => self.cwd.clone(),
        };
        let node = self.must_be_dir(&path, "ls")?;
        Ok(node
            .children()
            .map(|c| c.iter().cloned().collect())
            .unwrap_or_default())
    }

    /// Create a directory. With `recursive`, missing ancestors are created
    /// first.
    pub fn mkdir(&mut self, path_str: &str, recursive: bool) -> Result<(), FsError> {
        let path = self.pathify(path_str)?;
        self.add_item(path, FsNode::dir(), recursive, "mkdir")
    }

    /// Create an empty file. With `recursive`, missing ancestor directories
    /// are created first.
    pub fn mkfile(&mut self, path_str: &str, recursive: bool) -> Result<(), FsError> {
        let path = self.pathify(path_str)?;
        self.add_item(path, FsNode::file(""), recursive, "mkfile")
    }

    /// Read the contents of a file.
    pub fn read(&self, path_str: &str) -> Result<String, FsError> {
        let path = self.pathify(path_str)?;
        let node = self.must_be_file(&path, "read")?;
        Ok(node.content().unwrap_or_default().to_string())
    }

    /// Replace the contents of a file wholesale. With `force`, a missing
    /// file is created first (ancestors included).
    pub fn write(&mut self, path_str: &str, content: &str, force: bool) -> Result<(), FsError> {
        let path = self.pathify(path_str)?;
        if force && !self.store.contains(&path) {
            return self.add_item(path, FsNode::file(content), true, "write");
        }
        self.must_be_file(&path, "write")?;
        if let Some(FsNode::File { content: existing }) = self.store.get_mut(&path) {
            *existing = content.to_string();
        }
        Ok(())
    }

    /// Remove an entry. A non-empty directory requires `recursive`, which
    /// removes the whole subtree in one step. Removing root is not
    /// permitted. If the cwd was inside the removed subtree, it reverts to
    /// the removed target's parent.
    pub fn rm(&mut self, path_str: &str, recursive: bool) -> Result<(), FsError> {
        let path = self.pathify(path_str)?;
        let node = self.must_exist(&path, "rm")?;
        if path.is_root() {
            return Err(FsError::NotPermitted {
                path: path.to_string(),
                operation: "rm".to_string(),
            });
        }
        if let Some(children) = node.children() {
            if !children.is_empty() && !recursive {
                return Err(FsError::NotEmpty {
                    path: path.to_string(),
                    operation: "rm".to_string(),
                });
            }
        }

        let descendants: Vec<Path> = self
            .store
            .descendants_of(&path)
            .map(|(p, _)| p.clone())
            .collect();
        for p in &descendants {
            self.store.remove(p);
        }
        self.unlink(&path);

        if path.is_prefix_of(&self.cwd) {
            if let Some(parent) = path.parent() {
                self.cwd = parent;
            }
        }
        Ok(())
    }

    /// Return the paths of entries whose name exactly matches `match_name`,
    /// among the direct children of the given directory (or the cwd for
    /// `None`), or among all descendants with `recursive`. No globbing.
    pub fn find(
        &self,
        match_name: &str,
        path_str: Option<&str>,
        recursive: bool,
    ) -> Result<Vec<Path>, FsError> {
        let path = match path_str {
            Some(s) => {
                let p = self.pathify(s)?;
                self.must_be_dir(&p, "find")?;
                p
            }
            None => self.cwd.clone(),
        };
        let mut found = Vec::new();
        self.walk_path(
            &path,
            |p, _| {
                if p.name() == Some(match_name) {
                    found.push(p.clone());
                }
                true
            },
            recursive,
        )?;
        Ok(found)
    }

    /// Move an entry so that `to_path_str` becomes its new full path. The
    /// whole subtree re-keys in one step; no other command can observe a
    /// half-moved tree. An existing destination is a conflict unless
    /// `force`, and force only displaces a file or an *empty* directory,
    /// never a populated one. Moving root, moving an entry onto itself, or
    /// into its own subtree is not permitted. If the cwd was inside the
    /// moved subtree it is rewritten with the new prefix.
    pub fn mv(&mut self, from_str: &str, to_str: &str, force: bool) -> Result<(), FsError> {
        let from = self.pathify(from_str)?;
        let to = self.pathify(to_str)?;
        self.must_exist(&from, "mv")?;
        if from.is_root() {
            return Err(FsError::NotPermitted {
                path: from.to_string(),
                operation: "mv".to_string(),
            });
        }
        if to.is_root() || from.is_prefix_of(&to) {
            return Err(FsError::NotPermitted {
                path: to.to_string(),
                operation: "mv".to_string(),
            });
        }
        if let Some(existing) = self.store.get(&to) {
            if !force {
                return Err(FsError::AlreadyExists {
                    path: to.to_string(),
                    operation: "mv".to_string(),
                });
            }
            if existing.children().is_some_and(|c| !c.is_empty()) {
                return Err(FsError::NotEmpty {
                    path: to.to_string(),
                    operation: "mv".to_string(),
                });
            }
        }
        if let Some(to_parent) = to.parent() {
            self.must_be_dir(&to_parent, "mv")?;
        }

        // Snapshot the subtree and pre-compute every new key; rebase checks
        // the depth cap, so all failures happen before the first mutation.
        let mut moved: Vec<(Path, Path)> = vec![(from.clone(), to.clone())];
        for (p, _) in self.store.descendants_of(&from) {
            moved.push((p.clone(), p.rebase(&from, &to)?));
        }
        let new_cwd = if from.is_prefix_of(&self.cwd) {
            Some(self.cwd.rebase(&from, &to)?)
        } else {
            None
        };

        if self.store.contains(&to) {
            self.unlink(&to);
        }
        let mut subtree: Vec<(Path, FsNode)> = Vec::with_capacity(moved.len());
        for (old, new) in moved {
            let node = if old == from {
                self.unlink(&old)
            } else {
                self.store.remove(&old)
            };
            if let Some(node) = node {
                subtree.push((new, node));
            }
        }
        for (new, node) in subtree {
            self.link(new, node);
        }

        if let Some(cwd) = new_cwd {
            self.cwd = cwd;
        }
        // Force-displacing an empty directory may have put a file where the
        // cwd stood; fall back to its parent.
        if !matches!(self.store.get(&self.cwd), Some(n) if n.is_directory()) {
            if let Some(parent) = self.cwd.parent() {
                self.cwd = parent;
            }
        }
        Ok(())
    }

    /// Merge the directory at `from_str` into the directory at `to_str`.
    /// Same-named directory pairs merge recursively; any other name
    /// collision (file/file, file/directory) is a conflict, detected before
    /// anything moves. On success `from` is removed entirely. If the cwd
    /// was inside `from` it is rewritten under `to`.
    pub fn merge(&mut self, from_str: &str, to_str: &str) -> Result<(), FsError> {
        let from = self.pathify(from_str)?;
        let to = self.pathify(to_str)?;
        self.must_be_dir(&from, "merge")?;
        self.must_be_dir(&to, "merge")?;
        if from.is_root() {
            return Err(FsError::NotPermitted {
                path: from.to_string(),
                operation: "merge".to_string(),
            });
        }
        if from == to || from.is_prefix_of(&to) || to.is_prefix_of(&from) {
            return Err(FsError::NotPermitted {
                path: to.to_string(),
                operation: "merge".to_string(),
            });
        }

        // Conflict pre-scan over a snapshot: every source entry either lands
        // on a free slot or on a same-named directory. Anything else aborts
        // the merge before any mutation.
        let mut plan: Vec<(Path, Path)> = Vec::new();
        for (p, node) in self.store.descendants_of(&from) {
            let dest = p.rebase(&from, &to)?;
            if let Some(existing) = self.store.get(&dest) {
                if !(node.is_directory() && existing.is_directory()) {
                    return Err(FsError::AlreadyExists {
                        path: dest.to_string(),
                        operation: "merge".to_string(),
                    });
                }
            }
            plan.push((p.clone(), dest));
        }
        // Parents must relocate before their children.
        plan.sort_by_key(|(old, _)| old.depth());
        let new_cwd = if from.is_prefix_of(&self.cwd) {
            Some(self.cwd.rebase(&from, &to)?)
        } else {
            None
        };

        let mut absorbed: Vec<Path> = Vec::new();
        for (old, new) in plan {
            if self.store.contains(&new) {
                // Same-named directory on both sides: its children move
                // individually, the source node itself is dropped below.
                absorbed.push(old);
            } else if let Some(node) = self.store.remove(&old) {
                self.link(new, node);
            }
        }
        for old in absorbed.into_iter().rev() {
            self.store.remove(&old);
        }
        self.unlink(&from);

        if let Some(cwd) = new_cwd {
            self.cwd = cwd;
        }
        Ok(())
    }

    /// Invoke `action(path, node)` on every direct child of a directory, or
    /// on every descendant with `recursive`, in depth-first pre-order with
    /// children in creation order. The action returns `false` to stop the
    /// traversal early. The action can read nodes but cannot call back into
    /// a mutating command while the walk holds the borrow.
    pub fn walk<F>(&self, path_str: &str, action: F, recursive: bool) -> Result<(), FsError>
    where
        F: FnMut(&Path, &FsNode) -> bool,
    {
        let path = self.pathify(path_str)?;
        self.must_be_dir(&path, "walk")?;
        self.walk_path(&path, action, recursive)
    }

    // ========================================================================
    // Internal helpers
    // ========================================================================

    /// Parse a path string and resolve it against the current working
    /// directory.
    fn pathify(&self, path_str: &str) -> Result<Path, FsError> {
        Path::parse(path_str)?.resolve(&self.cwd)
    }

    fn must_exist(&self, path: &Path, operation: &str) -> Result<&FsNode, FsError> {
        self.store.get(path).ok_or_else(|| FsError::NotFound {
            path: path.to_string(),
            operation: operation.to_string(),
        })
    }

    fn must_be_dir(&self, path: &Path, operation: &str) -> Result<&FsNode, FsError> {
        let node = self.must_exist(path, operation)?;
        if !node.is_directory() {
            return Err(FsError::NotDirectory {
                path: path.to_string(),
                operation: operation.to_string(),
            });
        }
        Ok(node)
    }

    fn must_be_file(&self, path: &Path, operation: &str) -> Result<&FsNode, FsError> {
        let node = self.must_exist(path, operation)?;
        if node.is_directory() {
            return Err(FsError::IsDirectory {
                path: path.to_string(),
                operation: operation.to_string(),
            });
        }
        Ok(node)
    }

    /// Insert a node and record its name in the parent's child set. Safe to
    /// call before the parent entry exists (mid-relocation); the name is
    /// then already present in the parent's carried set.
    fn link(&mut self, path: Path, node: FsNode) {
        if let (Some(parent), Some(name)) = (path.parent(), path.name()) {
            let name = name.to_string();
            if let Some(parent_node) = self.store.get_mut(&parent) {
                parent_node.add_child(&name);
            }
        }
        self.store.put(path, node);
    }

    /// Remove a node and unlink its name from the parent's child set.
    fn unlink(&mut self, path: &Path) -> Option<FsNode> {
        let node = self.store.remove(path)?;
        if let (Some(parent), Some(name)) = (path.parent(), path.name()) {
            if let Some(parent_node) = self.store.get_mut(&parent) {
                parent_node.remove_child(name);
            }
        }
        Some(node)
    }

    /// Add a new entry under an existing (or, with `recursive`, created)
    /// parent directory.
    fn add_item(
        &mut self,
        path: Path,
        node: FsNode,
        recursive: bool,
        operation: &str,
    ) -> Result<(), FsError> {
        if self.store.contains(&path) {
            return Err(FsError::AlreadyExists {
                path: path.to_string(),
                operation: operation.to_string(),
            });
        }
        // Root always exists, so a resolved path without a parent was caught
        // above; this guards the type-level possibility.
        let parent = match path.parent() {
            Some(p) => p,
            None => {
                return Err(FsError::AlreadyExists {
                    path: path.to_string(),
                    operation: operation.to_string(),
                })
            }
        };
        if !self.store.contains(&parent) {
            if !recursive {
                return Err(FsError::NotFound {
                    path: parent.to_string(),
                    operation: operation.to_string(),
                });
            }
            self.make_ancestors(&path, operation)?;
        }
        self.must_be_dir(&parent, operation)?;
        self.link(path, node);
        Ok(())
    }

    /// Create every missing ancestor directory of `path`, shallowest first.
    /// The whole chain is validated before anything is created, so a failure
    /// leaves the store untouched.
    fn make_ancestors(&mut self, path: &Path, operation: &str) -> Result<(), FsError> {
        let mut chain: Vec<Path> = Vec::new();
        let mut cursor = path.parent();
        while let Some(p) = cursor {
            if p.is_root() {
                break;
            }
            cursor = p.parent();
            chain.push(p);
        }

        let mut missing: Vec<Path> = Vec::new();
        for p in chain.into_iter().rev() {
            match self.store.get(&p) {
                Some(node) if node.is_directory() => {}
                Some(_) => {
                    return Err(FsError::NotDirectory {
                        path: p.to_string(),
                        operation: operation.to_string(),
                    })
                }
                None => missing.push(p),
            }
        }
        for p in missing {
            self.link(p, FsNode::dir());
        }
        Ok(())
    }

    /// Depth-first pre-order traversal over an explicit stack; recursion
    /// depth never depends on tree depth.
    fn walk_path<F>(&self, path: &Path, mut action: F, recursive: bool) -> Result<(), FsError>
    where
        F: FnMut(&Path, &FsNode) -> bool,
    {
        let mut stack = self.child_paths(path)?;
        stack.reverse();
        while let Some(p) = stack.pop() {
            let node = match self.store.get(&p) {
                Some(node) => node,
                None => continue,
            };
            if !action(&p, node) {
                return Ok(());
            }
            if recursive && node.is_directory() {
                let mut children = self.child_paths(&p)?;
                children.reverse();
                stack.append(&mut children);
            }
        }
        Ok(())
    }

    fn child_paths(&self, path: &Path) -> Result<Vec<Path>, FsError> {
        let mut out = Vec::new();
        if let Some(children) = self.store.get(path).and_then(FsNode::children) {
            for name in children {
                out.push(path.join(name)?);
            }
        }
        Ok(out)
    }
}

impl Default for FileSystem {
    fn default() -> Self {
        Self::new()
    }
}

// ============================================================================
// Tests
// ============================================================================
