//! Thread pool implementation

use crate::core::{ClosureTask, Result, Task};
use crate::pool::shared::Shared;
use crate::pool::worker::Worker;
use parking_lot::RwLock;
use std::cmp::Ordering;
use std::sync::Arc;

/// Configuration for thread pool
#[derive(Debug, Clone)]
pub struct ThreadPoolConfig {
    /// Number of worker threads to start with (`None` = hardware concurrency)
    pub num_threads: Option<usize>,
    /// Skip the hardware-concurrency clamp on the initial thread count.
    /// Default: false
    pub force: bool,
    /// Thread name prefix
    pub thread_name_prefix: String,
}

impl Default for ThreadPoolConfig {
    fn default() -> Self {
        Self {
            num_threads: None,
            force: false,
            thread_name_prefix: "worker".to_string(),
        }
    }
}

impl ThreadPoolConfig {
    /// Create a new configuration with the specified number of threads
    ///
    /// Zero is a valid request: the pool starts with no workers and tasks
    /// queue up until [`ThreadPool::grow`] or [`ThreadPool::resize`] adds
    /// some.
    #[must_use]
    pub fn new(num_threads: usize) -> Self {
        Self {
            num_threads: Some(num_threads),
            ..Default::default()
        }
    }

    /// Allow the initial thread count to exceed the number of CPUs.
    ///
    /// Without this, construction caps the requested count at
    /// `num_cpus::get()`. Oversubscribing is mostly useful for pools whose
    /// tasks block on IO rather than compute.
    #[must_use = "builder methods return a new value and do not modify the original"]
    pub fn force(mut self, force: bool) -> Self {
        self.force = force;
        self
    }

    /// Set thread name prefix
    ///
    /// Workers are named `"{prefix}-{index}"`, which is what shows up in
    /// panic messages and debuggers.
    #[must_use = "builder methods return a new value and do not modify the original"]
    pub fn with_thread_name_prefix<S: Into<String>>(mut self, prefix: S) -> Self {
        self.thread_name_prefix = prefix.into();
        self
    }

    /// Number of workers the pool will actually start with
    ///
    /// Resolves the hardware-concurrency default and applies the clamp
    /// unless [`force`](Self::force) was set. Only construction consults
    /// this; later [`ThreadPool::grow`]/[`ThreadPool::resize`] calls take
    /// their argument literally.
    pub fn initial_threads(&self) -> usize {
        let requested = self.num_threads.unwrap_or_else(num_cpus::get);
        if self.force {
            requested
        } else {
            requested.min(num_cpus::get())
        }
    }
}

/// A dynamically resizable pool of worker threads sharing one FIFO task queue
///
/// Tasks are executed in submission order whenever a worker becomes free;
/// with a single worker this degenerates to strict FIFO execution. The pool
/// can be grown and shrunk while tasks are in flight, and dropped tasks can
/// be discarded wholesale with [`flush`](ThreadPool::flush).
///
/// # Worker identity
///
/// Each worker permanently owns the index it was spawned with. A worker stays
/// alive exactly as long as its index is below the pool's target count, so
/// shrinking always retires the most recently spawned workers and the live
/// indices are the contiguous range `0..worker_count()`.
///
/// # Panics in tasks
///
/// The pool does not catch panics. A panicking task unwinds through its
/// worker and kills that thread; the queue and the other workers are
/// unaffected, but the pool keeps counting the dead worker until it is
/// retired by [`shrink`](ThreadPool::shrink), [`resize`](ThreadPool::resize)
/// or drop. If every worker dies this way while tasks are still queued,
/// [`wait_until_drained`](ThreadPool::wait_until_drained) (and therefore
/// drop) will block until [`flush`](ThreadPool::flush) clears the queue or
/// [`grow`](ThreadPool::grow) supplies fresh workers.
///
/// # Example
///
/// ```
/// use stretchpool::prelude::*;
/// use std::sync::atomic::{AtomicUsize, Ordering};
/// use std::sync::Arc;
///
/// # fn main() -> stretchpool::Result<()> {
/// let pool = ThreadPool::with_threads(2)?;
///
/// let counter = Arc::new(AtomicUsize::new(0));
/// for _ in 0..4 {
///     let counter = Arc::clone(&counter);
///     pool.execute(move || {
///         counter.fetch_add(1, Ordering::SeqCst);
///     });
/// }
///
/// pool.wait_until_drained();
/// pool.resize(0)?;
/// assert_eq!(counter.load(Ordering::SeqCst), 4);
/// # Ok(())
/// # }
/// ```
pub struct ThreadPool {
    config: ThreadPoolConfig,
    shared: Arc<Shared>,
    /// Live workers, in spawn order. The write lock serializes
    /// grow/shrink/resize, so `workers.len()` always equals the shared
    /// target count when the lock is free.
    workers: RwLock<Vec<Worker>>,
}

impl std::fmt::Debug for ThreadPool {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ThreadPool")
            .field("config", &self.config)
            .field("workers", &self.workers.read().len())
            .field("pending_tasks", &self.shared.pending_tasks())
            .finish()
    }
}

impl ThreadPool {
    /// Create a pool with one worker per CPU
    ///
    /// # Errors
    ///
    /// Returns an error if a worker thread cannot be spawned.
    pub fn new() -> Result<Self> {
        Self::with_config(ThreadPoolConfig::default())
    }

    /// Create a pool with the specified number of threads
    ///
    /// The count is capped at the number of CPUs; use
    /// [`ThreadPoolConfig::force`] to oversubscribe.
    ///
    /// # Errors
    ///
    /// Returns an error if a worker thread cannot be spawned.
    pub fn with_threads(num_threads: usize) -> Result<Self> {
        Self::with_config(ThreadPoolConfig::new(num_threads))
    }

    /// Create a pool with custom configuration
    ///
    /// Workers start immediately; there is no separate start step.
    ///
    /// # Errors
    ///
    /// Returns an error if a worker thread cannot be spawned. Workers that
    /// did spawn are joined again when the half-built pool drops.
    pub fn with_config(config: ThreadPoolConfig) -> Result<Self> {
        let pool = Self {
            shared: Arc::new(Shared::new()),
            workers: RwLock::new(Vec::new()),
            config,
        };
        let initial = pool.config.initial_threads();
        pool.grow(initial)?;
        Ok(pool)
    }

    /// Submit a task to the pool
    ///
    /// The task is appended to the queue and one idle worker is woken.
    /// Submission never blocks and never fails; the queue is unbounded.
    pub fn submit<T: Task + 'static>(&self, task: T) {
        self.shared.push_task(Box::new(task));
    }

    /// Submit a closure as a task
    pub fn execute<F>(&self, f: F)
    where
        F: FnOnce() + Send + 'static,
    {
        self.submit(ClosureTask::new(f));
    }

    /// Spawn `additional` workers
    ///
    /// The new workers take the next consecutive indices and start serving
    /// the queue immediately. No clamping is applied here.
    ///
    /// # Errors
    ///
    /// Returns the first spawn failure. Workers spawned before the failure
    /// stay alive and the target count is rolled back to match them, so the
    /// pool remains in a consistent (if smaller than requested) state.
    pub fn grow(&self, additional: usize) -> Result<()> {
        let mut workers = self.workers.write();
        self.grow_locked(&mut workers, additional)
    }

    /// Retire `count` workers, joining their threads
    ///
    /// At most `worker_count()` workers are retired; shrinking an empty pool
    /// is a no-op. Retirement always picks the most recently spawned workers.
    /// Each retiring worker first finishes the task it is currently running,
    /// so this call can block for as long as those tasks take. Workers found
    /// dead from a task panic are reaped and logged.
    pub fn shrink(&self, count: usize) {
        let mut workers = self.workers.write();
        self.shrink_locked(&mut workers, count);
    }

    /// Grow or shrink the pool to exactly `target` workers
    ///
    /// # Errors
    ///
    /// Returns an error only when growing fails to spawn a thread; see
    /// [`grow`](Self::grow) for the partial-growth guarantees.
    pub fn resize(&self, target: usize) -> Result<()> {
        let mut workers = self.workers.write();
        let current = workers.len();
        match target.cmp(&current) {
            Ordering::Greater => self.grow_locked(&mut workers, target - current),
            Ordering::Less => {
                self.shrink_locked(&mut workers, current - target);
                Ok(())
            }
            Ordering::Equal => Ok(()),
        }
    }

    /// Block until the task queue is observed empty
    ///
    /// This is a statement about the *queue*, not about the work: tasks
    /// already claimed by workers may still be running when this returns. In
    /// particular, a worker that has just popped the final task counts as
    /// having drained the queue. Callers needing "all work finished" should
    /// follow this with [`resize(0)`](Self::resize), which joins the workers
    /// and with them the in-flight tasks.
    ///
    /// If the pool has no live workers and the queue is not empty, this
    /// blocks until another thread calls [`flush`](Self::flush) or
    /// [`grow`](Self::grow).
    pub fn wait_until_drained(&self) {
        self.shared.wait_until_drained();
    }

    /// Discard every queued task, returning how many were dropped
    ///
    /// Tasks currently executing are not touched and run to completion.
    /// Parked [`wait_until_drained`](Self::wait_until_drained) callers are
    /// woken by this call.
    pub fn flush(&self) -> usize {
        self.shared.flush()
    }

    /// Number of workers the pool currently accounts for
    ///
    /// Blocks while a grow/shrink/resize is in flight, so observers only
    /// ever see settled counts. A worker killed by a task panic is still
    /// counted until it is retired.
    pub fn worker_count(&self) -> usize {
        self.workers.read().len()
    }

    /// Number of tasks waiting in the queue (approximate)
    ///
    /// The value may be stale by the time it is used; tasks being executed
    /// right now are not included.
    pub fn pending_tasks(&self) -> usize {
        self.shared.pending_tasks()
    }

    fn grow_locked(&self, workers: &mut Vec<Worker>, additional: usize) -> Result<()> {
        if additional == 0 {
            return Ok(());
        }

        let first = workers.len();
        {
            let mut state = self.shared.state.lock();
            state.target_threads += additional;
        }
        log::debug!(
            "growing pool from {} to {} worker(s)",
            first,
            first + additional
        );

        for index in first..first + additional {
            match Worker::spawn(
                index,
                Arc::clone(&self.shared),
                &self.config.thread_name_prefix,
            ) {
                Ok(worker) => workers.push(worker),
                Err(e) => {
                    // Roll the target back to the workers that exist so the
                    // contiguous-index invariant survives the failure.
                    let mut state = self.shared.state.lock();
                    state.target_threads = workers.len();
                    return Err(e);
                }
            }
        }
        Ok(())
    }

    fn shrink_locked(&self, workers: &mut Vec<Worker>, count: usize) {
        let num_to_close = count.min(workers.len());
        if num_to_close == 0 {
            return;
        }

        {
            let mut state = self.shared.state.lock();
            state.target_threads -= num_to_close;
        }
        // Wake everyone: workers at or above the new target retire, the rest
        // go straight back to waiting.
        self.shared.work_available.notify_all();

        log::debug!(
            "shrinking pool from {} to {} worker(s)",
            workers.len(),
            workers.len() - num_to_close
        );

        // Joining back-to-front keeps the live indices contiguous at every
        // point, even if a join blocks on a long-running task.
        for _ in 0..num_to_close {
            if let Some(worker) = workers.pop() {
                let index = worker.index();
                if let Err(e) = worker.join() {
                    log::warn!("worker {} terminated abnormally: {}", index, e);
                }
            }
        }
    }
}

impl Drop for ThreadPool {
    /// Waits for the queue to drain, then retires every worker
    ///
    /// Queued tasks are run to completion before the pool goes away; joining
    /// the workers then waits out any still-executing task. Note the
    /// zero-worker caveat on [`wait_until_drained`](Self::wait_until_drained)
    /// applies here too: dropping a pool that has queued tasks but no live
    /// workers will hang unless the queue is flushed first.
    fn drop(&mut self) {
        self.shared.wait_until_drained();
        let count = self.workers.read().len();
        self.shrink(count);
    }
}
