//! Work queue with quiescence detection
//!
//! Workers both consume and produce tasks: listing a directory pushes one
//! task per child. An empty queue therefore does not mean the walk is
//! over, since a worker may be about to push the children of the
//! directory it is holding.
//!
//! The queue tracks an in-flight counter instead: a task counts from the
//! moment it is pushed until the worker that popped it calls
//! [`WorkQueue::mark_task_done`]. A worker pushes every child before
//! retiring the parent, so the counter can only reach zero once no task
//! is queued and none is being processed. At that point the queue closes
//! itself and every blocked [`WorkQueue::pop`] returns `None`.

use parking_lot::{Condvar, Mutex};
use std::collections::VecDeque;
use std::path::PathBuf;
use std::sync::atomic::{AtomicU64, Ordering};

/// A node to visit
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Task {
    /// Full path to the node
    pub path: PathBuf,

    /// Depth from root (0 = root)
    pub depth: u32,
}

impl Task {
    /// Create a new task
    pub fn new(path: PathBuf, depth: u32) -> Self {
        Self { path, depth }
    }

    /// Create the root task
    pub fn root(path: PathBuf) -> Self {
        Self { path, depth: 0 }
    }

    /// Create a task for a child of this node
    pub fn child(&self, path: PathBuf) -> Self {
        Self {
            path,
            depth: self.depth + 1,
        }
    }
}

/// Statistics for the work queue
#[derive(Debug, Default)]
pub struct QueueStats {
    /// Total tasks enqueued
    pub enqueued: AtomicU64,

    /// Total tasks dequeued
    pub dequeued: AtomicU64,

    /// Total tasks retired via `mark_task_done`
    pub completed: AtomicU64,

    /// Pushes refused because the queue was closed
    pub rejected: AtomicU64,
}

impl QueueStats {
    /// Snapshot of the counters
    pub fn snapshot(&self) -> QueueSnapshot {
        QueueSnapshot {
            enqueued: self.enqueued.load(Ordering::Relaxed),
            dequeued: self.dequeued.load(Ordering::Relaxed),
            completed: self.completed.load(Ordering::Relaxed),
            rejected: self.rejected.load(Ordering::Relaxed),
        }
    }
}

/// Plain copy of [`QueueStats`]
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct QueueSnapshot {
    pub enqueued: u64,
    pub dequeued: u64,
    pub completed: u64,
    pub rejected: u64,
}

/// State guarded by the queue lock
#[derive(Debug, Default)]
struct QueueState {
    tasks: VecDeque<Task>,

    /// Tasks pushed but not yet retired
    in_flight: usize,

    closed: bool,

    /// Closed by `close` before the walk reached quiescence
    aborted: bool,
}

/// Unbounded FIFO of tasks with blocking pop and self-closing on quiescence
#[derive(Debug, Default)]
pub struct WorkQueue {
    state: Mutex<QueueState>,

    /// Signalled on push (one waiter) and on close (all waiters)
    available: Condvar,

    stats: QueueStats,
}

impl WorkQueue {
    /// Create an empty, open queue
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a task
    ///
    /// The in-flight counter is raised under the same lock that makes the
    /// task visible, so no consumer can retire it before it is counted.
    /// Returns `false` if the queue was already closed.
    pub fn push(&self, task: Task) -> bool {
        let mut state = self.state.lock();
        if state.closed {
            self.stats.rejected.fetch_add(1, Ordering::Relaxed);
            return false;
        }

        state.in_flight += 1;
        state.tasks.push_back(task);
        drop(state);

        self.stats.enqueued.fetch_add(1, Ordering::Relaxed);
        self.available.notify_one();
        true
    }

    /// Take the next task, blocking until one is available
    ///
    /// Returns `None` once the queue is closed, either because all work
    /// is done or because it was force-closed.
    pub fn pop(&self) -> Option<Task> {
        let mut state = self.state.lock();
        loop {
            if state.closed {
                return None;
            }
            if let Some(task) = state.tasks.pop_front() {
                drop(state);
                self.stats.dequeued.fetch_add(1, Ordering::Relaxed);
                return Some(task);
            }
            self.available.wait(&mut state);
        }
    }

    /// Take the next task without blocking
    pub fn try_pop(&self) -> Option<Task> {
        let mut state = self.state.lock();
        if state.closed {
            return None;
        }
        let task = state.tasks.pop_front()?;
        drop(state);
        self.stats.dequeued.fetch_add(1, Ordering::Relaxed);
        Some(task)
    }

    /// Retire a task that was popped and fully processed
    ///
    /// Must be called exactly once per popped task, after all of its
    /// children have been pushed. Closes the queue when the last
    /// in-flight task is retired.
    pub fn mark_task_done(&self) {
        let mut state = self.state.lock();
        debug_assert!(state.in_flight > 0, "in_flight underflow");
        state.in_flight = state.in_flight.saturating_sub(1);

        let quiescent = state.in_flight == 0 && !state.closed;
        if quiescent {
            state.closed = true;
        }
        drop(state);

        self.stats.completed.fetch_add(1, Ordering::Relaxed);
        if quiescent {
            self.available.notify_all();
        }
    }

    /// Force-close the queue (cancellation)
    ///
    /// Queued tasks are abandoned, further pushes are refused and every
    /// blocked consumer wakes up with `None`. Returns `false` if the queue
    /// was already closed, in which case nothing changes.
    pub fn close(&self) -> bool {
        let mut state = self.state.lock();
        if state.closed {
            return false;
        }
        state.closed = true;
        state.aborted = true;
        drop(state);
        self.available.notify_all();
        true
    }

    /// Check if the queue is closed
    pub fn is_closed(&self) -> bool {
        self.state.lock().closed
    }

    /// Check if the queue was force-closed rather than drained
    pub fn is_aborted(&self) -> bool {
        self.state.lock().aborted
    }

    /// Check if all pushed work has been retired
    pub fn is_quiescent(&self) -> bool {
        self.state.lock().in_flight == 0
    }

    /// Number of tasks waiting to be popped
    pub fn len(&self) -> usize {
        self.state.lock().tasks.len()
    }

    /// Check if no task is waiting to be popped
    ///
    /// This alone says nothing about whether the walk is finished.
    pub fn is_empty(&self) -> bool {
        self.state.lock().tasks.is_empty()
    }

    /// Number of tasks pushed but not yet retired
    pub fn in_flight(&self) -> usize {
        self.state.lock().in_flight
    }

    /// Get queue statistics
    pub fn stats(&self) -> &QueueStats {
        &self.stats
    }
}

/// RAII guard that retires one popped task when dropped
///
/// Dropping also happens during unwinding, so a panicking task cannot
/// leave the in-flight counter stuck above zero.
pub struct TaskGuard<'a> {
    queue: &'a WorkQueue,
}

impl<'a> TaskGuard<'a> {
    /// Create a guard for a task just popped from `queue`
    pub fn new(queue: &'a WorkQueue) -> Self {
        Self { queue }
    }
}

impl Drop for TaskGuard<'_> {
    fn drop(&mut self) {
        self.queue.mark_task_done();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use std::thread;
    use std::time::Duration;

    fn task(path: &str) -> Task {
        Task::root(PathBuf::from(path))
    }

    #[test]
    fn test_queue_basic() {
        let queue = WorkQueue::new();

        assert!(queue.push(task("/test")));
        assert!(!queue.is_empty());
        assert_eq!(queue.len(), 1);
        assert_eq!(queue.in_flight(), 1);

        let popped = queue.pop().unwrap();
        assert_eq!(popped.path, PathBuf::from("/test"));
        assert_eq!(popped.depth, 0);

        // Popped but not retired: still in flight
        assert!(queue.is_empty());
        assert_eq!(queue.in_flight(), 1);
        assert!(!queue.is_closed());
    }

    #[test]
    fn test_fifo_order() {
        let queue = WorkQueue::new();
        queue.push(task("/a"));
        queue.push(task("/b"));

        assert_eq!(queue.pop().unwrap().path, PathBuf::from("/a"));
        assert_eq!(queue.pop().unwrap().path, PathBuf::from("/b"));
    }

    #[test]
    fn test_child_depth() {
        let parent = Task::new(PathBuf::from("/a/b"), 2);
        let child = parent.child(PathBuf::from("/a/b/c"));
        assert_eq!(child.depth, 3);
    }

    #[test]
    fn test_closes_on_last_retire() {
        let queue = WorkQueue::new();
        queue.push(task("/root"));

        let _root = queue.pop().unwrap();
        queue.push(task("/root/a"));
        queue.push(task("/root/b"));
        queue.mark_task_done();

        // Children still in flight
        assert!(!queue.is_closed());
        assert_eq!(queue.in_flight(), 2);

        queue.pop().unwrap();
        queue.mark_task_done();
        queue.pop().unwrap();
        queue.mark_task_done();

        assert!(queue.is_closed());
        assert!(queue.is_quiescent());
        assert!(queue.pop().is_none());
    }

    #[test]
    fn test_close_after_quiescence_is_noop() {
        let queue = WorkQueue::new();
        queue.push(task("/root"));
        queue.pop().unwrap();
        queue.mark_task_done();
        assert!(queue.is_closed());

        assert!(!queue.close());
        assert!(!queue.is_aborted());
    }

    #[test]
    fn test_guard_retires_task() {
        let queue = WorkQueue::new();
        queue.push(task("/test"));

        {
            let _task = queue.pop().unwrap();
            let _guard = TaskGuard::new(&queue);
            assert!(!queue.is_quiescent());
        }

        assert!(queue.is_quiescent());
        assert!(queue.is_closed());
    }

    #[test]
    fn test_blocked_pop_wakes_on_quiescence() {
        let queue = Arc::new(WorkQueue::new());
        queue.push(task("/root"));
        let root = queue.pop().unwrap();

        let waiter = {
            let queue = Arc::clone(&queue);
            thread::spawn(move || queue.pop())
        };

        thread::sleep(Duration::from_millis(50));
        assert_eq!(root.path, PathBuf::from("/root"));
        queue.mark_task_done();

        assert!(waiter.join().unwrap().is_none());
    }

    #[test]
    fn test_blocked_pop_receives_pushed_task() {
        let queue = Arc::new(WorkQueue::new());
        queue.push(task("/root"));
        queue.pop().unwrap();

        let waiter = {
            let queue = Arc::clone(&queue);
            thread::spawn(move || queue.pop())
        };

        thread::sleep(Duration::from_millis(50));
        queue.push(task("/root/child"));

        let got = waiter.join().unwrap().unwrap();
        assert_eq!(got.path, PathBuf::from("/root/child"));
    }

    #[test]
    fn test_force_close() {
        let queue = WorkQueue::new();
        queue.push(task("/a"));
        queue.push(task("/b"));

        assert!(queue.close());

        assert!(queue.is_closed());
        assert!(queue.is_aborted());
        assert!(queue.pop().is_none());
        assert!(queue.try_pop().is_none());
        assert!(!queue.push(task("/c")));
        assert_eq!(queue.stats().snapshot().rejected, 1);
    }

    #[test]
    fn test_queue_stats() {
        let queue = WorkQueue::new();
        queue.push(task("/a"));
        queue.push(task("/b"));

        queue.pop().unwrap();
        queue.mark_task_done();
        queue.try_pop().unwrap();
        queue.mark_task_done();

        let stats = queue.stats().snapshot();
        assert_eq!(stats.enqueued, 2);
        assert_eq!(stats.dequeued, 2);
        assert_eq!(stats.completed, 2);
    }
}
