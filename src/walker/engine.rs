//! Walk engine - orchestrates the parallel tree walk
//!
//! The engine is responsible for:
//! - Setting up the work queue and shared counters
//! - Seeding the root task and spawning the worker pool
//! - Joining workers once the queue reports quiescence
//! - Cancellation and progress snapshots
//!
//! There is no monitor loop deciding when the walk is over. The queue
//! closes itself when its in-flight counter reaches zero, every worker
//! then sees `None` from `pop`, exits, and the join completes.

use crate::config::WalkConfig;
use crate::error::{Result, WalkerError};
use crate::fs::FileSystem;
use crate::walker::queue::{QueueSnapshot, Task, WorkQueue};
use crate::walker::stats::{AggregateStats, WalkStats};
use crate::walker::worker::Worker;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread;
use std::time::{Duration, Instant};
use tracing::{debug, info, warn};

/// Interval between progress callbacks
const PROGRESS_INTERVAL: Duration = Duration::from_millis(100);

/// Result of a finished walk
#[derive(Debug, Clone)]
pub struct WalkResult {
    /// Final counters
    pub stats: WalkStats,

    /// Queue counters (enqueued/dequeued/completed)
    pub queue: QueueSnapshot,

    /// Time taken for the walk
    pub duration: Duration,

    /// Whether the walk ran to quiescence (vs was cancelled)
    pub completed: bool,
}

/// Handle that stops a running walk
///
/// Cancelling force-closes the queue: queued tasks are dropped and each
/// worker stops after the task it is currently processing. A walk that
/// already finished is left as it was.
#[derive(Debug, Clone)]
pub struct CancelHandle {
    queue: Arc<WorkQueue>,
}

impl CancelHandle {
    /// Stop the walk, returning `false` if it had already finished
    pub fn cancel(&self) -> bool {
        let stopped = self.queue.close();
        if stopped {
            debug!("Walk cancelled");
        }
        stopped
    }

    /// Check if the walk was cancelled before it finished
    pub fn is_cancelled(&self) -> bool {
        self.queue.is_aborted()
    }
}

/// Coordinates the parallel tree walk
pub struct WalkEngine<F: FileSystem + 'static> {
    /// Configuration
    config: Arc<WalkConfig>,

    /// Filesystem being walked
    fs: Arc<F>,

    /// Shared work queue
    queue: Arc<WorkQueue>,

    /// Shared counters
    stats: Arc<AggregateStats>,

    /// Worker threads
    workers: Vec<Worker>,
}

impl<F: FileSystem + 'static> WalkEngine<F> {
    /// Create a new walk engine
    pub fn new(config: WalkConfig, fs: Arc<F>) -> Self {
        Self {
            config: Arc::new(config),
            fs,
            queue: Arc::new(WorkQueue::new()),
            stats: Arc::new(AggregateStats::new()),
            workers: Vec::new(),
        }
    }

    /// Get a handle that can cancel the walk from another thread
    pub fn cancel_handle(&self) -> CancelHandle {
        CancelHandle {
            queue: Arc::clone(&self.queue),
        }
    }

    /// Snapshot of the walk so far
    pub fn progress(&self, elapsed: Duration) -> WalkProgress {
        WalkProgress::sample(
            &self.stats,
            &self.queue,
            self.config.worker_count,
            elapsed,
        )
    }

    /// Run the walk to completion
    pub fn run(mut self) -> Result<WalkResult> {
        let start_time = Instant::now();

        info!(
            root = %self.config.root.display(),
            workers = self.config.worker_count,
            "Starting walk"
        );

        // Counted before any worker exists, so the queue cannot close early
        if !self.queue.push(Task::root(self.config.root.clone())) {
            debug!("Walk cancelled before start");
        }

        if let Err(e) = self.spawn_workers() {
            self.queue.close();
            self.join_workers();
            return Err(e);
        }

        self.join_workers();

        let duration = start_time.elapsed();
        let stats = self.stats.snapshot();
        let completed = !self.queue.is_aborted();

        info!(
            dirs = stats.dirs,
            files = stats.files,
            bytes = stats.bytes,
            errors = stats.errors,
            completed,
            duration_ms = duration.as_millis() as u64,
            "Walk finished"
        );

        Ok(WalkResult {
            stats,
            queue: self.queue.stats().snapshot(),
            duration,
            completed,
        })
    }

    /// Run the walk, calling `progress_callback` periodically until it ends
    pub fn run_with_progress<C>(self, progress_callback: C) -> Result<WalkResult>
    where
        C: Fn(WalkProgress) + Send + 'static,
    {
        let start = Instant::now();
        let done = Arc::new(AtomicBool::new(false));
        let stats = Arc::clone(&self.stats);
        let queue = Arc::clone(&self.queue);
        let total_workers = self.config.worker_count;

        let progress_handle = {
            let done = Arc::clone(&done);
            thread::Builder::new()
                .name("walk-progress".to_string())
                .spawn(move || {
                    while !done.load(Ordering::Relaxed) {
                        progress_callback(WalkProgress::sample(
                            &stats,
                            &queue,
                            total_workers,
                            start.elapsed(),
                        ));
                        thread::sleep(PROGRESS_INTERVAL);
                    }
                })
        };

        let result = self.run();

        done.store(true, Ordering::SeqCst);
        match progress_handle {
            Ok(handle) => {
                if handle.join().is_err() {
                    warn!("Progress thread panicked");
                }
            }
            Err(e) => warn!(error = %e, "Failed to spawn progress thread"),
        }

        result
    }

    /// Spawn worker threads
    fn spawn_workers(&mut self) -> Result<()> {
        for id in 0..self.config.worker_count {
            let worker = Worker::spawn(
                id,
                Arc::clone(&self.config),
                Arc::clone(&self.fs),
                Arc::clone(&self.queue),
                Arc::clone(&self.stats),
            )
            .map_err(WalkerError::Worker)?;

            self.workers.push(worker);
        }

        debug!(count = self.workers.len(), "Workers spawned");
        Ok(())
    }

    /// Join all worker threads
    fn join_workers(&mut self) {
        let workers = std::mem::take(&mut self.workers);
        for worker in workers {
            let id = worker.id();
            match worker.join() {
                Ok(retired) => debug!(worker = id, tasks = retired, "Worker joined"),
                Err(e) => warn!(error = %e, "Worker failed to join cleanly"),
            }
        }
    }
}

/// Progress information for display
#[derive(Debug, Clone, Default)]
pub struct WalkProgress {
    /// Directories visited
    pub dirs: u64,

    /// Files visited
    pub files: u64,

    /// Bytes found
    pub bytes: u64,

    /// Errors encountered
    pub errors: u64,

    /// Tasks waiting in the queue
    pub queue_size: usize,

    /// Tasks pushed but not yet retired
    pub in_flight: usize,

    /// Total workers
    pub total_workers: usize,

    /// Elapsed time
    pub elapsed: Duration,
}

impl WalkProgress {
    fn sample(
        stats: &AggregateStats,
        queue: &WorkQueue,
        total_workers: usize,
        elapsed: Duration,
    ) -> Self {
        let snapshot = stats.snapshot();
        Self {
            dirs: snapshot.dirs,
            files: snapshot.files,
            bytes: snapshot.bytes,
            errors: snapshot.errors,
            queue_size: queue.len(),
            in_flight: queue.in_flight(),
            total_workers,
            elapsed,
        }
    }

    /// Calculate nodes (files + dirs) per second
    pub fn nodes_per_second(&self) -> f64 {
        let secs = self.elapsed.as_secs_f64();
        if secs > 0.0 {
            (self.files + self.dirs) as f64 / secs
        } else {
            0.0
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fs::MemoryFs;

    #[test]
    fn test_walk_progress_rate() {
        let progress = WalkProgress {
            files: 1000,
            dirs: 100,
            elapsed: Duration::from_secs(10),
            ..Default::default()
        };
        assert!((progress.nodes_per_second() - 110.0).abs() < 0.1);
        assert_eq!(WalkProgress::default().nodes_per_second(), 0.0);
    }

    #[test]
    fn test_engine_small_tree() {
        let fs = MemoryFs::new("/r")
            .with_file("/r/a/1", 10)
            .with_file("/r/a/2", 20)
            .with_dir("/r/empty");

        let engine = WalkEngine::new(WalkConfig::new("/r").with_workers(3), Arc::new(fs));
        let result = engine.run().unwrap();

        assert!(result.completed);
        assert_eq!(result.stats.dirs, 3);
        assert_eq!(result.stats.files, 2);
        assert_eq!(result.stats.bytes, 30);
        assert_eq!(result.queue.enqueued, 5);
        assert_eq!(result.queue.completed, 5);
    }

    #[test]
    fn test_cancel_before_run() {
        let fs = MemoryFs::generate("/g", 3, 3, 3, 1);
        let engine = WalkEngine::new(WalkConfig::new("/g").with_workers(2), Arc::new(fs));

        let handle = engine.cancel_handle();
        handle.cancel();
        assert!(handle.is_cancelled());

        let result = engine.run().unwrap();
        assert!(!result.completed);
        assert_eq!(result.stats, WalkStats::default());
    }

    #[test]
    fn test_cancel_after_finish_keeps_completed() {
        let fs = MemoryFs::new("/r").with_file("/r/a", 1);
        let engine = WalkEngine::new(WalkConfig::new("/r").with_workers(2), Arc::new(fs));
        let handle = engine.cancel_handle();

        let result = engine.run().unwrap();
        assert!(result.completed);

        // A late interrupt finds the queue already drained
        assert!(!handle.cancel());
        assert!(!handle.is_cancelled());
    }

    #[test]
    fn test_progress_snapshot() {
        let fs = MemoryFs::new("/r");
        let engine = WalkEngine::new(WalkConfig::new("/r").with_workers(4), Arc::new(fs));

        let progress = engine.progress(Duration::from_secs(1));
        assert_eq!(progress.total_workers, 4);
        assert_eq!(progress.in_flight, 0);
        assert_eq!(progress.dirs, 0);
    }
}
