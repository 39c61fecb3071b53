//! Path parsing and resolution.
//!
//! A [`Path`] is an immutable sequence of named segments plus an
//! absolute/relative flag. Parsing drops empty segments and `.`; `..` is kept
//! as data and folded during [`Path::resolve`], where ascending past root is
//! an error. Paths are the key type of the node store, so equality and
//! hashing are structural over the segment sequence.

use std::fmt;

use crate::types::FsError;

/// Maximum number of segments a path may carry. Bounds resolution and
/// traversal depth so pathological inputs are rejected instead of exhausting
/// resources.
pub const MAX_SEGMENTS: usize = 1000;

/// A normalized, absolute-or-relative sequence of named segments.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Path {
    segments: Vec<String>,
    absolute: bool,
}

impl Path {
    /// The root path `/`.
    pub fn root() -> Self {
        Path {
            segments: Vec::new(),
            absolute: true,
        }
    }

    /// Parse a path string. Empty segments and `.` are dropped; `..` is kept
    /// and folded later by [`Path::resolve`].
    pub fn parse(text: &str) -> Result<Self, FsError> {
        if text.is_empty() {
            return Err(FsError::InvalidPath {
                path: text.to_string(),
                reason: "empty path".to_string(),
            });
        }
        let absolute = text.starts_with('/');
        let segments: Vec<String> = text
            .split('/')
            .filter(|s| !s.is_empty() && *s != ".")
            .map(str::to_string)
            .collect();
        if segments.len() > MAX_SEGMENTS {
            return Err(FsError::InvalidPath {
                path: text.to_string(),
                reason: "path too deep".to_string(),
            });
        }
        Ok(Path { segments, absolute })
    }

    /// Build a path from a caller-supplied segment list. Each segment must be
    /// a plain name: non-empty, no separator, not `.` or `..`.
    pub fn from_segments<I, S>(segments: I, absolute: bool) -> Result<Self, FsError>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut out: Vec<String> = Vec::new();
        for segment in segments {
            let segment = segment.into();
            validate_segment(&segment)?;
            out.push(segment);
        }
        if out.len() > MAX_SEGMENTS {
            return Err(FsError::InvalidPath {
                path: out.join("/"),
                reason: "path too deep".to_string(),
            });
        }
        Ok(Path {
            segments: out,
            absolute,
        })
    }

    pub fn is_absolute(&self) -> bool {
        self.absolute
    }

    /// True for the absolute path with no segments, i.e. `/`.
    pub fn is_root(&self) -> bool {
        self.absolute && self.segments.is_empty()
    }

    /// Number of segments.
    pub fn depth(&self) -> usize {
        self.segments.len()
    }

    pub fn segments(&self) -> &[String] {
        &self.segments
    }

    /// Final segment, e.g. `baz.txt` for `/foo/bar/baz.txt`. `None` for root.
    pub fn name(&self) -> Option<&str> {
        self.segments.last().map(String::as_str)
    }

    /// All segments but the last. `None` for root and for an empty relative
    /// path.
    pub fn parent(&self) -> Option<Path> {
        if self.segments.is_empty() {
            return None;
        }
        Some(Path {
            segments: self.segments[..self.segments.len() - 1].to_vec(),
            absolute: self.absolute,
        })
    }

    /// Append one validated segment.
    pub fn join(&self, name: &str) -> Result<Path, FsError> {
        validate_segment(name)?;
        if self.segments.len() + 1 > MAX_SEGMENTS {
            return Err(FsError::InvalidPath {
                path: self.to_string(),
                reason: "path too deep".to_string(),
            });
        }
        let mut segments = self.segments.clone();
        segments.push(name.to_string());
        Ok(Path {
            segments,
            absolute: self.absolute,
        })
    }

    /// Resolve against a base path, producing an absolute path with every
    /// `..` folded away. Folding `..` when the accumulated stack is empty is
    /// an error, not a no-op.
    pub fn resolve(&self, base: &Path) -> Result<Path, FsError> {
        let prefix: &[String] = if self.absolute { &[] } else { &base.segments };
        let mut stack: Vec<String> = Vec::new();
        for segment in prefix.iter().chain(self.segments.iter()) {
            if segment == ".." {
                if stack.pop().is_none() {
                    return Err(FsError::InvalidPath {
                        path: self.to_string(),
                        reason: "cannot ascend past root".to_string(),
                    });
                }
            } else {
                stack.push(segment.clone());
            }
        }
        if stack.len() > MAX_SEGMENTS {
            return Err(FsError::InvalidPath {
                path: self.to_string(),
                reason: "path too deep".to_string(),
            });
        }
        Ok(Path {
            segments: stack,
            absolute: self.absolute || base.absolute,
        })
    }

    /// True if every segment of `self` prefixes `other` (non-strict: a path
    /// is a prefix of itself).
    pub fn is_prefix_of(&self, other: &Path) -> bool {
        self.absolute == other.absolute
            && other.segments.len() >= self.segments.len()
            && other.segments[..self.segments.len()] == self.segments[..]
    }

    /// Substitute the `from` prefix of `self` with `to`. Used to re-key a
    /// subtree when it moves.
    pub fn rebase(&self, from: &Path, to: &Path) -> Result<Path, FsError> {
        if !from.is_prefix_of(self) {
            return Err(FsError::InvalidPath {
                path: self.to_string(),
                reason: format!("'{from}' is not a prefix"),
            });
        }
        let mut segments = to.segments.clone();
        segments.extend(self.segments[from.segments.len()..].iter().cloned());
        if segments.len() > MAX_SEGMENTS {
            return Err(FsError::InvalidPath {
                path: self.to_string(),
                reason: "path too deep".to_string(),
            });
        }
        Ok(Path {
            segments,
            absolute: to.absolute,
        })
    }
}

fn validate_segment(segment: &str) -> Result<(), FsError> {
    if segment.is_empty() || segment.contains('/') || segment == "." || segment == ".." {
        return Err(FsError::InvalidPath {
            path: segment.to_string(),
            reason: "invalid segment".to_string(),
        });
    }
    Ok(())
}

impl fmt::Display for Path {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.absolute {
            write!(f, "/{}", self.segments.join("/"))
        } else if self.segments.is_empty() {
            write!(f, ".")
        } else {
            write!(f, "{}", self.segments.join("/"))
        }
    }
}

// ============================================================================
// Tests
// ============================================================================
