//! Filesystem access
//!
//! The walker only needs a handful of capabilities from the filesystem:
//! classify a node, list a directory's children, and read a file's size.
//! They are expressed as the [`FileSystem`] trait so the engine can run
//! against the local disk or against an in-memory tree.
//!
//! # Example
//!
//! ```no_run
//! use fs_walker::fs::{FileSystem, LocalFs, NodeKind};
//! use std::path::Path;
//!
//! let fs = LocalFs::new();
//! if fs.classify(Path::new("/tmp")).unwrap() == NodeKind::Directory {
//!     for child in fs.list_children(Path::new("/tmp")).unwrap() {
//!         match child {
//!             Ok(path) => println!("{}", path.display()),
//!             Err(e) => eprintln!("{}", e),
//!         }
//!     }
//! }
//! ```

mod local;
pub mod memory;

pub use local::LocalFs;
pub use memory::MemoryFs;

use crate::error::FsResult;
use std::path::{Path, PathBuf};

/// Type of a node as seen by the walker
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NodeKind {
    /// Directory
    Directory,
    /// Regular file
    File,
    /// Symbolic link to a directory (only the walk root is followed)
    Symlink,
    /// Device, FIFO, socket or anything else
    Other,
}

impl NodeKind {
    /// Short name for log output
    pub fn as_str(&self) -> &'static str {
        match self {
            NodeKind::Directory => "directory",
            NodeKind::File => "file",
            NodeKind::Symlink => "symlink",
            NodeKind::Other => "other",
        }
    }
}

/// Capabilities the walker needs from a filesystem
///
/// Implementations are shared by every worker thread.
pub trait FileSystem: Send + Sync {
    /// Determine the type of a node
    ///
    /// Links to files classify as the file they point to. Links to
    /// directories classify as [`NodeKind::Symlink`], and a dangling link
    /// is an error.
    fn classify(&self, node: &Path) -> FsResult<NodeKind>;

    /// List the full paths of a directory's children
    ///
    /// The outer error means the directory could not be opened at all.
    /// An entry that fails to read is returned in place, so the entries
    /// around it are not lost.
    fn list_children(&self, node: &Path) -> FsResult<Vec<FsResult<PathBuf>>>;

    /// Size in bytes of a regular file
    fn file_size(&self, node: &Path) -> FsResult<u64>;

    /// Check if the node is a directory (false if it cannot be inspected)
    fn is_directory(&self, node: &Path) -> bool {
        matches!(self.classify(node), Ok(NodeKind::Directory))
    }

    /// Check if the node is a regular file (false if it cannot be inspected)
    fn is_regular_file(&self, node: &Path) -> bool {
        matches!(self.classify(node), Ok(NodeKind::File))
    }
}
