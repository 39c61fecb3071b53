//! Core error and node types for the virtual file system.

use indexmap::IndexSet;
use thiserror::Error;

/// File system errors
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum FsError {
    #[error("ENOENT: no such file or directory, {operation} '{path}'")]
    NotFound { path: String, operation: String },

    #[error("EEXIST: path already exists, {operation} '{path}'")]
    AlreadyExists { path: String, operation: String },

    #[error("EISDIR: illegal operation on a directory, {operation} '{path}'")]
    IsDirectory { path: String, operation: String },

    #[error("ENOTDIR: not a directory, {operation} '{path}'")]
    NotDirectory { path: String, operation: String },

    #[error("ENOTEMPTY: directory not empty, {operation} '{path}'")]
    NotEmpty { path: String, operation: String },

    #[error("EINVAL: invalid path '{path}', {reason}")]
    InvalidPath { path: String, reason: String },

    #[error("EPERM: operation not permitted, {operation} '{path}'")]
    NotPermitted { path: String, operation: String },
}

/// A stored entry: a file holding content, or a directory holding the names
/// of its children. Child *nodes* live in the store, keyed by path; a
/// directory never owns its children directly, so moving a subtree re-keys
/// store entries instead of rewriting object graphs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FsNode {
    File { content: String },
    Directory { children: IndexSet<String> },
}

impl FsNode {
    pub fn file(content: impl Into<String>) -> Self {
        FsNode::File {
            content: content.into(),
        }
    }

    pub fn dir() -> Self {
        FsNode::Directory {
            children: IndexSet::new(),
        }
    }

    pub fn is_file(&self) -> bool {
        matches!(self, FsNode::File { .. })
    }

    pub fn is_directory(&self) -> bool {
        matches!(self, FsNode::Directory { .. })
    }

    /// File content; `None` for a directory.
    pub fn content(&self) -> Option<&str> {
        match self {
            FsNode::File { content } => Some(content),
            FsNode::Directory { .. } => None,
        }
    }

    /// Child names in insertion order; `None` for a file.
    pub fn children(&self) -> Option<&IndexSet<String>> {
        match self {
            FsNode::Directory { children } => Some(children),
            FsNode::File { .. } => None,
        }
    }

    /// Record a child name. No-op on a file; the store keeps name sets and
    /// entries in lockstep, never this type.
    pub fn add_child(&mut self, name: &str) {
        if let FsNode::Directory { children } = self {
            children.insert(name.to_string());
        }
    }

    /// Forget a child name. No-op on a file or an unknown name.
    pub fn remove_child(&mut self, name: &str) {
        if let FsNode::Directory { children } = self {
            children.shift_remove(name);
        }
    }
}

// ============================================================================
// Tests
// ============================================================================
