//! Worker thread implementation

use crate::core::{PoolError, Result};
use crate::pool::shared::Shared;
use std::any::Any;
use std::sync::Arc;
use std::thread;

/// A worker thread serving the shared task queue
///
/// The spawn-order index is the worker's identity for its whole life: the
/// thread is named after it, and the retirement check in the run loop
/// compares it against the pool's target count.
#[derive(Debug)]
pub(crate) struct Worker {
    index: usize,
    thread: Option<thread::JoinHandle<()>>,
}

impl Worker {
    /// Spawn worker `index` against the shared pool state
    pub(crate) fn spawn(index: usize, shared: Arc<Shared>, name_prefix: &str) -> Result<Self> {
        let thread = thread::Builder::new()
            .name(format!("{}-{}", name_prefix, index))
            .spawn(move || Self::run(index, shared))
            .map_err(|e| PoolError::spawn_with_source(index, "Cannot create worker thread", e))?;

        Ok(Self {
            index,
            thread: Some(thread),
        })
    }

    /// Get the worker's spawn-order index
    pub(crate) fn index(&self) -> usize {
        self.index
    }

    /// Join the worker thread, surfacing a panic that killed it
    pub(crate) fn join(mut self) -> Result<()> {
        if let Some(thread) = self.thread.take() {
            thread
                .join()
                .map_err(|payload| PoolError::worker_panic(self.index, panic_message(&payload)))?;
        }
        Ok(())
    }

    /// Main worker loop: pull tasks until asked to retire
    ///
    /// Task panics are not caught here. A panicking task unwinds through this
    /// frame and takes the thread down with it; the pool only learns about it
    /// when the worker is eventually joined.
    fn run(index: usize, shared: Arc<Shared>) {
        log::debug!("worker {} started", index);
        while let Some(task) = shared.next_task(index) {
            task.run();
        }
        log::debug!("worker {} retiring", index);
    }
}

impl Drop for Worker {
    fn drop(&mut self) {
        // Normal teardown joins through `join()`, which takes the handle.
        // Reaching here with a live handle means the owner was dropped
        // without retiring this worker first.
        if let Some(thread) = self.thread.take() {
            if thread.is_finished() {
                if let Err(payload) = thread.join() {
                    log::warn!(
                        "worker {} panicked: {}",
                        self.index,
                        panic_message(&payload)
                    );
                }
            } else {
                log::warn!(
                    "worker {} dropped while still running; detaching its thread",
                    self.index
                );
            }
        }
    }
}

/// Render a `JoinHandle` panic payload as text
fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        (*s).to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "Unknown panic".to_string()
    }
}
