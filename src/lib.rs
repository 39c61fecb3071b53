//! memfs - An in-memory hierarchical file system
//!
//! This library provides a virtual file system held entirely in memory:
//! a single root directory, nested directories and files, addressed by
//! slash-delimited paths and manipulated through a fixed command set
//! (mkdir, mkfile, read, write, rm, mv, merge, ls, find, walk, cd).
//!
//! All state lives in a flat lookup table mapping every resolved absolute
//! path to its node; directories record child *names* only, so recursive
//! moves and merges re-key table entries instead of chasing reference
//! graphs. A `FileSystem` is a plain value; independent instances can
//! coexist freely.

pub mod fs;
pub mod path;
pub mod store;
pub mod types;

pub use fs::FileSystem;
pub use path::Path;
pub use store::NodeStore;
pub use types::{FsError, FsNode};
