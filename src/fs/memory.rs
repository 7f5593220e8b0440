//! In-memory filesystem
//!
//! A tree built up front and then walked read-only. Listings, single
//! listing entries and size queries can be denied per node to simulate
//! permission errors, and can be slowed down to stress the work queue's
//! termination logic.

use super::{FileSystem, NodeKind};
use crate::error::{FsError, FsResult};
use std::collections::{HashMap, HashSet};
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU64, Ordering};
use std::thread;
use std::time::Duration;

#[derive(Debug, Clone)]
enum MemNode {
    Dir { children: Vec<PathBuf> },
    File { size: u64 },
    Other,
}

/// Filesystem held entirely in memory
#[derive(Debug, Default)]
pub struct MemoryFs {
    nodes: HashMap<PathBuf, MemNode>,
    denied_listing: HashSet<PathBuf>,
    denied_entries: HashSet<PathBuf>,
    denied_size: HashSet<PathBuf>,
    list_delay: Option<Duration>,
    stat_delay: Option<Duration>,
    list_calls: AtomicU64,
}

impl MemoryFs {
    /// Create a filesystem containing only an empty root directory
    pub fn new(root: impl Into<PathBuf>) -> Self {
        let mut fs = Self::default();
        fs.nodes.insert(
            root.into(),
            MemNode::Dir {
                children: Vec::new(),
            },
        );
        fs
    }

    /// Build a uniform tree: every directory above `depth` holds
    /// `dirs_per_dir` subdirectories, and every directory holds
    /// `files_per_dir` files of `file_size` bytes.
    pub fn generate(
        root: impl Into<PathBuf>,
        depth: u32,
        dirs_per_dir: usize,
        files_per_dir: usize,
        file_size: u64,
    ) -> Self {
        let root = root.into();
        let mut fs = Self::new(root.clone());
        let mut level = vec![root];

        for d in 0..=depth {
            let mut next = Vec::new();
            for dir in &level {
                for f in 0..files_per_dir {
                    fs.insert(dir.join(format!("file_{}", f)), MemNode::File { size: file_size });
                }
                if d < depth {
                    for s in 0..dirs_per_dir {
                        let sub = dir.join(format!("dir_{}", s));
                        fs.insert(
                            sub.clone(),
                            MemNode::Dir {
                                children: Vec::new(),
                            },
                        );
                        next.push(sub);
                    }
                }
            }
            level = next;
        }

        fs
    }

    /// Add a directory (parents are created as needed)
    pub fn with_dir(mut self, path: impl Into<PathBuf>) -> Self {
        self.insert(
            path.into(),
            MemNode::Dir {
                children: Vec::new(),
            },
        );
        self
    }

    /// Add a regular file of the given size
    pub fn with_file(mut self, path: impl Into<PathBuf>, size: u64) -> Self {
        self.insert(path.into(), MemNode::File { size });
        self
    }

    /// Add a node that is neither a directory nor a regular file
    pub fn with_other(mut self, path: impl Into<PathBuf>) -> Self {
        self.insert(path.into(), MemNode::Other);
        self
    }

    /// Make listing this directory fail with permission denied
    pub fn deny_listing(mut self, path: impl Into<PathBuf>) -> Self {
        self.denied_listing.insert(path.into());
        self
    }

    /// Make this node's entry fail inside its parent's listing
    ///
    /// The rest of the parent's listing is still returned.
    pub fn deny_entry(mut self, path: impl Into<PathBuf>) -> Self {
        self.denied_entries.insert(path.into());
        self
    }

    /// Make the size query on this file fail
    pub fn deny_size(mut self, path: impl Into<PathBuf>) -> Self {
        self.denied_size.insert(path.into());
        self
    }

    /// Sleep this long inside every directory listing
    pub fn with_list_delay(mut self, delay: Duration) -> Self {
        self.list_delay = Some(delay);
        self
    }

    /// Sleep this long inside every size query
    pub fn with_stat_delay(mut self, delay: Duration) -> Self {
        self.stat_delay = Some(delay);
        self
    }

    /// Number of directory listings served so far
    pub fn list_calls(&self) -> u64 {
        self.list_calls.load(Ordering::Relaxed)
    }

    fn insert(&mut self, path: PathBuf, node: MemNode) {
        if let Some(parent) = path.parent() {
            let parent = parent.to_path_buf();
            if !self.nodes.contains_key(&parent) && parent.parent().is_some() {
                self.insert(
                    parent.clone(),
                    MemNode::Dir {
                        children: Vec::new(),
                    },
                );
            }
            if let Some(MemNode::Dir { children }) = self.nodes.get_mut(&parent) {
                if !children.contains(&path) {
                    children.push(path.clone());
                }
            }
        }

        // Re-adding a directory keeps the children it already has
        if let (Some(MemNode::Dir { .. }), MemNode::Dir { .. }) = (self.nodes.get(&path), &node) {
            return;
        }
        self.nodes.insert(path, node);
    }

    fn lookup(&self, node: &Path) -> FsResult<&MemNode> {
        self.nodes.get(node).ok_or_else(|| FsError::NotFound {
            path: node.to_path_buf(),
        })
    }
}

impl FileSystem for MemoryFs {
    fn classify(&self, node: &Path) -> FsResult<NodeKind> {
        Ok(match self.lookup(node)? {
            MemNode::Dir { .. } => NodeKind::Directory,
            MemNode::File { .. } => NodeKind::File,
            MemNode::Other => NodeKind::Other,
        })
    }

    fn list_children(&self, node: &Path) -> FsResult<Vec<FsResult<PathBuf>>> {
        self.list_calls.fetch_add(1, Ordering::Relaxed);

        if let Some(delay) = self.list_delay {
            thread::sleep(delay);
        }

        if self.denied_listing.contains(node) {
            return Err(FsError::PermissionDenied {
                path: node.to_path_buf(),
            });
        }

        match self.lookup(node)? {
            MemNode::Dir { children } => Ok(children
                .iter()
                .map(|child| {
                    if self.denied_entries.contains(child) {
                        Err(FsError::ReadDirFailed {
                            path: node.to_path_buf(),
                            reason: "Input/output error".into(),
                        })
                    } else {
                        Ok(child.clone())
                    }
                })
                .collect()),
            _ => Err(FsError::ReadDirFailed {
                path: node.to_path_buf(),
                reason: "Not a directory".into(),
            }),
        }
    }

    fn file_size(&self, node: &Path) -> FsResult<u64> {
        if let Some(delay) = self.stat_delay {
            thread::sleep(delay);
        }

        if self.denied_size.contains(node) {
            return Err(FsError::PermissionDenied {
                path: node.to_path_buf(),
            });
        }

        match self.lookup(node)? {
            MemNode::File { size } => Ok(*size),
            _ => Err(FsError::StatFailed {
                path: node.to_path_buf(),
                reason: "Not a regular file".into(),
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn children(fs: &MemoryFs, node: &str) -> Vec<PathBuf> {
        fs.list_children(Path::new(node))
            .unwrap()
            .into_iter()
            .map(|child| child.unwrap())
            .collect()
    }

    #[test]
    fn test_builder_creates_parents() {
        let fs = MemoryFs::new("/root").with_file("/root/a/b/c.txt", 7);

        assert!(fs.is_directory(Path::new("/root/a")));
        assert!(fs.is_directory(Path::new("/root/a/b")));
        assert_eq!(children(&fs, "/root"), vec![PathBuf::from("/root/a")]);
        assert_eq!(fs.file_size(Path::new("/root/a/b/c.txt")).unwrap(), 7);
    }

    #[test]
    fn test_readding_dir_keeps_children() {
        let fs = MemoryFs::new("/r")
            .with_file("/r/d/x", 1)
            .with_dir("/r/d");

        assert_eq!(children(&fs, "/r/d").len(), 1);
        assert_eq!(children(&fs, "/r").len(), 1);
    }

    #[test]
    fn test_denied_entry_keeps_siblings() {
        let fs = MemoryFs::new("/r")
            .with_file("/r/a", 1)
            .with_file("/r/b", 2)
            .with_file("/r/c", 3)
            .deny_entry("/r/b");

        let listing = fs.list_children(Path::new("/r")).unwrap();
        assert_eq!(listing.len(), 3);
        assert_eq!(listing[0], Ok(PathBuf::from("/r/a")));
        assert!(matches!(listing[1], Err(FsError::ReadDirFailed { .. })));
        assert_eq!(listing[2], Ok(PathBuf::from("/r/c")));
    }

    #[test]
    fn test_denied_nodes() {
        let fs = MemoryFs::new("/r")
            .with_dir("/r/locked")
            .with_file("/r/f", 3)
            .deny_listing("/r/locked")
            .deny_size("/r/f");

        assert!(fs.is_directory(Path::new("/r/locked")));
        assert!(matches!(
            fs.list_children(Path::new("/r/locked")),
            Err(FsError::PermissionDenied { .. })
        ));
        assert!(fs.is_regular_file(Path::new("/r/f")));
        assert!(fs.file_size(Path::new("/r/f")).is_err());
        assert_eq!(fs.list_calls(), 1);
    }

    #[test]
    fn test_generate_shape() {
        // depth 2, 3 subdirs, 2 files: 1 + 3 + 9 dirs, 13 * 2 files
        let fs = MemoryFs::generate("/g", 2, 3, 2, 100);

        let dirs = fs
            .nodes
            .values()
            .filter(|n| matches!(n, MemNode::Dir { .. }))
            .count();
        let files = fs
            .nodes
            .values()
            .filter(|n| matches!(n, MemNode::File { .. }))
            .count();

        assert_eq!(dirs, 13);
        assert_eq!(files, 26);
    }
}
