//! Walk counters shared by all workers
//!
//! Every counter is an independent atomic. Workers never take a lock to
//! update them, so there is no ordering hazard with the queue lock.

use std::sync::atomic::{AtomicU64, Ordering};

/// Counters updated concurrently during a walk
#[derive(Debug, Default)]
pub struct AggregateStats {
    /// Directories visited (including ones whose listing failed)
    pub dirs: AtomicU64,

    /// Regular files visited
    pub files: AtomicU64,

    /// Sum of regular file sizes
    pub bytes: AtomicU64,

    /// Nodes that could not be inspected, listed or sized
    pub errors: AtomicU64,

    /// Nodes that were neither directories nor regular files
    pub skipped: AtomicU64,
}

impl AggregateStats {
    pub fn new() -> Self {
        Self::default()
    }

    pub(crate) fn record_dir(&self) {
        self.dirs.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn record_file(&self) {
        self.files.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn record_bytes(&self, bytes: u64) {
        self.bytes.fetch_add(bytes, Ordering::Relaxed);
    }

    pub(crate) fn record_error(&self) {
        self.errors.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn record_skip(&self) {
        self.skipped.fetch_add(1, Ordering::Relaxed);
    }

    /// Read all counters
    ///
    /// Each load is independent; while workers are running the values
    /// may come from slightly different instants.
    pub fn snapshot(&self) -> WalkStats {
        WalkStats {
            dirs: self.dirs.load(Ordering::Relaxed),
            files: self.files.load(Ordering::Relaxed),
            bytes: self.bytes.load(Ordering::Relaxed),
            errors: self.errors.load(Ordering::Relaxed),
            skipped: self.skipped.load(Ordering::Relaxed),
        }
    }
}

/// Plain copy of [`AggregateStats`]
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct WalkStats {
    pub dirs: u64,
    pub files: u64,
    pub bytes: u64,
    pub errors: u64,
    pub skipped: u64,
}
