//! Worker thread logic for parallel tree walking
//!
//! Each worker:
//! - Pulls tasks from the shared work queue
//! - Classifies the node and updates the shared counters
//! - Pushes one task per child when the node is a directory
//! - Retires every task exactly once, whatever happened to it

use crate::config::WalkConfig;
use crate::error::{TaskOutcome, WorkerError};
use crate::fs::{FileSystem, NodeKind};
use crate::walker::queue::{Task, TaskGuard, WorkQueue};
use crate::walker::stats::AggregateStats;
use std::any::Any;
use std::panic::{self, AssertUnwindSafe};
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use tracing::{debug, error, trace, warn};

/// A worker thread that processes tasks until the queue closes
pub struct Worker {
    /// Worker ID
    id: usize,

    /// Thread handle
    handle: Option<JoinHandle<u64>>,
}

impl Worker {
    /// Spawn a new worker thread
    pub fn spawn<F: FileSystem + 'static>(
        id: usize,
        config: Arc<WalkConfig>,
        fs: Arc<F>,
        queue: Arc<WorkQueue>,
        stats: Arc<AggregateStats>,
    ) -> Result<Self, WorkerError> {
        let handle = thread::Builder::new()
            .name(format!("walker-{}", id))
            .spawn(move || worker_loop(id, &config, fs.as_ref(), &queue, &stats))
            .map_err(|e| WorkerError::SpawnFailed {
                id,
                reason: e.to_string(),
            })?;

        Ok(Self {
            id,
            handle: Some(handle),
        })
    }

    /// Get worker ID
    pub fn id(&self) -> usize {
        self.id
    }

    /// Wait for the worker to finish, returning how many tasks it retired
    pub fn join(mut self) -> Result<u64, WorkerError> {
        match self.handle.take() {
            Some(handle) => handle.join().map_err(|payload| WorkerError::Panicked {
                id: self.id,
                message: panic_message(payload.as_ref()),
            }),
            None => Ok(0),
        }
    }
}

/// Main worker loop
fn worker_loop<F: FileSystem + ?Sized>(
    id: usize,
    config: &WalkConfig,
    fs: &F,
    queue: &WorkQueue,
    stats: &AggregateStats,
) -> u64 {
    debug!(worker = id, "Worker starting");
    let mut retired = 0u64;

    while let Some(task) = queue.pop() {
        // Retires the task on every path out of this iteration
        let _guard = TaskGuard::new(queue);

        let outcome = panic::catch_unwind(AssertUnwindSafe(|| {
            process_task(&task, config, fs, queue, stats)
        }))
        .unwrap_or_else(|payload| {
            stats.record_error();
            TaskOutcome::Panicked {
                path: task.path.clone(),
                message: panic_message(payload.as_ref()),
            }
        });

        log_outcome(id, &outcome);
        retired += 1;
    }

    debug!(worker = id, tasks = retired, "Worker shutting down");
    retired
}

/// Process a single task
///
/// Never fails: every filesystem error is recorded in `stats` and
/// returned as an outcome. Children are pushed before this returns,
/// which is what keeps the parent counted while they are discovered.
pub fn process_task<F: FileSystem + ?Sized>(
    task: &Task,
    config: &WalkConfig,
    fs: &F,
    queue: &WorkQueue,
    stats: &AggregateStats,
) -> TaskOutcome {
    let kind = match fs.classify(&task.path) {
        Ok(kind) => kind,
        Err(error) => {
            stats.record_error();
            return TaskOutcome::Failed {
                path: task.path.clone(),
                error,
            };
        }
    };

    match kind {
        NodeKind::Directory => process_directory(task, config, fs, queue, stats),
        // The root is whatever the user named, so a link there is walked
        NodeKind::Symlink if task.depth == 0 => {
            process_directory(task, config, fs, queue, stats)
        }
        NodeKind::File => {
            stats.record_file();

            match fs.file_size(&task.path) {
                Ok(bytes) => {
                    stats.record_bytes(bytes);
                    TaskOutcome::File {
                        path: task.path.clone(),
                        bytes,
                    }
                }
                Err(error) => {
                    stats.record_error();
                    TaskOutcome::Failed {
                        path: task.path.clone(),
                        error,
                    }
                }
            }
        }
        NodeKind::Symlink => {
            stats.record_skip();
            TaskOutcome::Skipped {
                path: task.path.clone(),
                reason: "symlink to directory not followed".into(),
            }
        }
        NodeKind::Other => {
            stats.record_skip();
            TaskOutcome::Skipped {
                path: task.path.clone(),
                reason: format!("{} not counted", kind.as_str()),
            }
        }
    }
}

/// Count a directory and queue its children
fn process_directory<F: FileSystem + ?Sized>(
    task: &Task,
    config: &WalkConfig,
    fs: &F,
    queue: &WorkQueue,
    stats: &AggregateStats,
) -> TaskOutcome {
    stats.record_dir();

    let entries = match fs.list_children(&task.path) {
        Ok(entries) => entries,
        Err(error) => {
            stats.record_error();
            return TaskOutcome::Failed {
                path: task.path.clone(),
                error,
            };
        }
    };

    if !config.within_depth(task.depth + 1) {
        return TaskOutcome::Directory {
            path: task.path.clone(),
            children: 0,
            unreadable: 0,
        };
    }

    let mut queued = 0;
    let mut unreadable = 0;
    for entry in entries {
        let child = match entry {
            Ok(child) => child,
            Err(error) => {
                stats.record_error();
                warn!(path = %task.path.display(), error = %error, "Directory entry unreadable");
                unreadable += 1;
                continue;
            }
        };

        if config.is_excluded(&child) {
            trace!(path = %child.display(), "Excluded");
            continue;
        }

        // A refused push means the walk was cancelled
        if !queue.push(task.child(child)) {
            return TaskOutcome::Skipped {
                path: task.path.clone(),
                reason: format!("walk cancelled after queueing {} children", queued),
            };
        }
        queued += 1;
    }

    TaskOutcome::Directory {
        path: task.path.clone(),
        children: queued,
        unreadable,
    }
}

fn log_outcome(worker: usize, outcome: &TaskOutcome) {
    match outcome {
        TaskOutcome::Directory {
            path,
            children,
            unreadable,
        } => {
            trace!(worker, path = %path.display(), children, unreadable, "Directory listed");
        }
        TaskOutcome::File { path, bytes } => {
            trace!(worker, path = %path.display(), bytes, "File counted");
        }
        TaskOutcome::Skipped { path, reason } => {
            debug!(worker, path = %path.display(), reason = %reason, "Node skipped");
        }
        TaskOutcome::Failed { path, error } if error.is_recoverable() => {
            warn!(worker, path = %path.display(), error = %error, "Node inaccessible");
        }
        TaskOutcome::Failed { path, error } => {
            error!(worker, path = %path.display(), error = %error, "Node failed");
        }
        TaskOutcome::Panicked { path, message } => {
            error!(worker, path = %path.display(), message = %message, "Task panicked");
        }
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        s.to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "unknown panic".to_string()
    }
}
