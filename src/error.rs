//! Error types for fs-walker
//!
//! This module defines the error hierarchy used across the crate:
//! - Per-node filesystem errors (recoverable, reported and skipped)
//! - Configuration and CLI errors (fatal, before any worker starts)
//! - Worker thread errors
//!
//! Per-node errors never escape a worker: they are turned into a
//! [`TaskOutcome`] and the task is retired like any other.

use std::io;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Top-level error type for fs-walker
#[derive(Error, Debug)]
pub enum WalkerError {
    /// Configuration errors
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// Worker/concurrency errors
    #[error("Worker error: {0}")]
    Worker(#[from] WorkerError),
}

/// Errors raised while inspecting a single node
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum FsError {
    /// Permission denied
    #[error("Permission denied: '{path}'")]
    PermissionDenied { path: PathBuf },

    /// Node vanished or never existed
    #[error("Path not found: '{path}'")]
    NotFound { path: PathBuf },

    /// Directory listing failed
    #[error("Failed to read directory '{path}': {reason}")]
    ReadDirFailed { path: PathBuf, reason: String },

    /// Metadata or size query failed
    #[error("Failed to stat '{path}': {reason}")]
    StatFailed { path: PathBuf, reason: String },
}

impl FsError {
    /// Map an I/O error from a listing operation
    pub fn read_dir(path: &Path, err: io::Error) -> Self {
        match err.kind() {
            io::ErrorKind::PermissionDenied => FsError::PermissionDenied { path: path.into() },
            io::ErrorKind::NotFound => FsError::NotFound { path: path.into() },
            _ => FsError::ReadDirFailed {
                path: path.into(),
                reason: err.to_string(),
            },
        }
    }

    /// Map an I/O error from a metadata operation
    pub fn stat(path: &Path, err: io::Error) -> Self {
        match err.kind() {
            io::ErrorKind::PermissionDenied => FsError::PermissionDenied { path: path.into() },
            io::ErrorKind::NotFound => FsError::NotFound { path: path.into() },
            _ => FsError::StatFailed {
                path: path.into(),
                reason: err.to_string(),
            },
        }
    }

    /// Check if this error is expected on a live filesystem
    ///
    /// Recoverable errors are logged quietly; the rest are warnings.
    /// Either way the walk continues.
    pub fn is_recoverable(&self) -> bool {
        matches!(
            self,
            FsError::PermissionDenied { .. } | FsError::NotFound { .. }
        )
    }
}

/// Configuration and CLI errors
#[derive(Error, Debug)]
pub enum ConfigError {
    /// Invalid worker count
    #[error("Invalid thread count {count}: must be between 1 and {max}")]
    InvalidWorkerCount { count: usize, max: usize },

    /// Invalid exclude pattern
    #[error("Invalid exclude pattern '{pattern}': {reason}")]
    InvalidExcludePattern { pattern: String, reason: String },
}

/// Worker thread errors
#[derive(Error, Debug)]
pub enum WorkerError {
    /// Worker panicked outside of task processing
    #[error("Worker {id} panicked: {message}")]
    Panicked { id: usize, message: String },

    /// Thread could not be spawned
    #[error("Failed to spawn worker {id}: {reason}")]
    SpawnFailed { id: usize, reason: String },
}

/// Result type alias for WalkerError
pub type Result<T> = std::result::Result<T, WalkerError>;

/// Result type alias for FsError
pub type FsResult<T> = std::result::Result<T, FsError>;

/// Represents the outcome of processing a single task
#[derive(Debug)]
pub enum TaskOutcome {
    /// Directory counted and its children queued
    Directory {
        path: PathBuf,
        children: usize,
        unreadable: usize,
    },

    /// Regular file counted and sized
    File { path: PathBuf, bytes: u64 },

    /// Node not counted (directory link, special file, cancelled walk)
    Skipped { path: PathBuf, reason: String },

    /// Node could not be inspected, listed or sized
    Failed { path: PathBuf, error: FsError },

    /// Processing panicked; the task was still retired
    Panicked { path: PathBuf, message: String },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fs_error_recoverable() {
        let perm_denied = FsError::PermissionDenied {
            path: "/test".into(),
        };
        assert!(perm_denied.is_recoverable());

        let read_failed = FsError::ReadDirFailed {
            path: "/test".into(),
            reason: "I/O error".into(),
        };
        assert!(!read_failed.is_recoverable());
    }

    #[test]
    fn test_io_error_mapping() {
        let path = Path::new("/data/b");

        let err = FsError::read_dir(path, io::Error::from(io::ErrorKind::PermissionDenied));
        assert_eq!(err, FsError::PermissionDenied { path: path.into() });

        let err = FsError::stat(path, io::Error::from(io::ErrorKind::NotFound));
        assert_eq!(err, FsError::NotFound { path: path.into() });

        let err = FsError::stat(path, io::Error::other("boom"));
        assert!(matches!(err, FsError::StatFailed { .. }));
    }

    #[test]
    fn test_error_conversion() {
        let config_err = ConfigError::InvalidWorkerCount { count: 0, max: 8 };
        let walker_err: WalkerError = config_err.into();
        assert!(matches!(walker_err, WalkerError::Config(_)));
        assert!(walker_err.to_string().contains("between 1 and 8"));
    }
}
