//! Local filesystem access through `std::fs`

use super::{FileSystem, NodeKind};
use crate::error::{FsError, FsResult};
use std::fs;
use std::path::{Path, PathBuf};

/// Filesystem backed by the operating system
///
/// Symlinks are resolved when classifying: a link to a file counts as a
/// [`NodeKind::File`] and a dangling link is reported as
/// [`FsError::NotFound`]. A link to a directory is reported as
/// [`NodeKind::Symlink`] so the walker can decide not to descend through
/// it, which keeps a walk finite even when links form cycles.
#[derive(Debug, Default, Clone, Copy)]
pub struct LocalFs;

impl LocalFs {
    pub fn new() -> Self {
        Self
    }
}

fn kind_of(file_type: fs::FileType) -> NodeKind {
    if file_type.is_dir() {
        NodeKind::Directory
    } else if file_type.is_file() {
        NodeKind::File
    } else {
        NodeKind::Other
    }
}

impl FileSystem for LocalFs {
    fn classify(&self, node: &Path) -> FsResult<NodeKind> {
        let file_type = fs::symlink_metadata(node)
            .map_err(|e| FsError::stat(node, e))?
            .file_type();

        if !file_type.is_symlink() {
            return Ok(kind_of(file_type));
        }

        // Dangling links surface as NotFound on the link itself
        let target = fs::metadata(node).map_err(|e| FsError::stat(node, e))?;
        Ok(match kind_of(target.file_type()) {
            NodeKind::Directory => NodeKind::Symlink,
            kind => kind,
        })
    }

    fn list_children(&self, node: &Path) -> FsResult<Vec<FsResult<PathBuf>>> {
        let entries = fs::read_dir(node)
            .map_err(|e| FsError::read_dir(node, e))?
            .map(|entry| {
                entry
                    .map(|e| e.path())
                    .map_err(|e| FsError::read_dir(node, e))
            })
            .collect();

        Ok(entries)
    }

    fn file_size(&self, node: &Path) -> FsResult<u64> {
        fs::metadata(node)
            .map(|m| m.len())
            .map_err(|e| FsError::stat(node, e))
    }
}
