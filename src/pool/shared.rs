//! State shared between the pool handle and its worker threads
//!
//! A single mutex guards both the task queue and the worker target count,
//! with two condition variables layered on top:
//!
//! - `work_available` wakes workers when a task arrives or the target count
//!   drops below a live worker's index
//! - `queue_drained` wakes drain waiters whenever the queue is observed empty
//!
//! Workers never store an "alive" flag. A worker owns the index it was
//! spawned with, and retires as soon as it observes `index >= target_threads`
//! between tasks. Because workers are always spawned with consecutive indices
//! and joined in reverse spawn order, the live indices form the contiguous
//! range `0..target_threads` whenever no resize is in flight.

use crate::core::BoxedTask;
use parking_lot::{Condvar, Mutex};
use std::collections::VecDeque;

/// Mutable pool state guarded by [`Shared::state`]
pub(crate) struct State {
    /// Pending tasks in submission order
    pub(crate) tasks: VecDeque<BoxedTask>,
    /// Number of workers that should be alive; workers with an index at or
    /// above this value retire at their next wakeup
    pub(crate) target_threads: usize,
}

/// Synchronization hub handed to every worker as an `Arc`
pub(crate) struct Shared {
    pub(crate) state: Mutex<State>,
    pub(crate) work_available: Condvar,
    pub(crate) queue_drained: Condvar,
}

impl Shared {
    /// Create shared state with an empty queue and a target of zero workers
    pub(crate) fn new() -> Self {
        Self {
            state: Mutex::new(State {
                tasks: VecDeque::new(),
                target_threads: 0,
            }),
            work_available: Condvar::new(),
            queue_drained: Condvar::new(),
        }
    }

    /// Append a task to the queue and wake one idle worker
    pub(crate) fn push_task(&self, task: BoxedTask) {
        let mut state = self.state.lock();
        log::trace!("queueing task '{}'", task.task_type());
        state.tasks.push_back(task);
        drop(state);
        self.work_available.notify_one();
    }

    /// Block until a task is available for worker `index`, or until the
    /// worker has been asked to retire
    ///
    /// Returns `None` exactly when `index >= target_threads`, which is the
    /// worker's signal to exit its loop. While idle the worker broadcasts
    /// `queue_drained` before every sleep, so a drain waiter that raced past
    /// the empty check cannot miss the signal.
    pub(crate) fn next_task(&self, index: usize) -> Option<BoxedTask> {
        let mut state = self.state.lock();
        while index < state.target_threads && state.tasks.is_empty() {
            self.queue_drained.notify_all();
            self.work_available.wait(&mut state);
        }
        if index >= state.target_threads {
            return None;
        }
        state.tasks.pop_front()
    }

    /// Block until the queue is observed empty
    ///
    /// Note this is a statement about the queue, not about the tasks: a task
    /// already handed to a worker may still be running when this returns.
    pub(crate) fn wait_until_drained(&self) {
        let mut state = self.state.lock();
        self.queue_drained
            .wait_while(&mut state, |s| !s.tasks.is_empty());
    }

    /// Discard every queued task, returning how many were dropped
    ///
    /// Tasks already claimed by workers are unaffected. The drained condvar
    /// is broadcast so waiters parked on a now-empty queue wake up even if no
    /// worker is around to observe it.
    pub(crate) fn flush(&self) -> usize {
        let mut state = self.state.lock();
        let discarded = state.tasks.len();
        state.tasks.clear();
        drop(state);
        if discarded > 0 {
            log::debug!("flushed {} queued task(s)", discarded);
        }
        self.queue_drained.notify_all();
        discarded
    }

    /// Number of tasks currently queued (approximate outside the lock)
    pub(crate) fn pending_tasks(&self) -> usize {
        self.state.lock().tasks.len()
    }
}
