//! # Stretchpool
//!
//! A dynamically resizable worker thread pool sharing a single FIFO task queue.
//!
//! ## Features
//!
//! - **Elastic sizing**: Grow, shrink, or resize the pool while tasks are in flight
//! - **FIFO queue**: Tasks start in submission order as workers become free
//! - **Queue control**: Block until the queue drains, or flush it wholesale
//! - **Indexed workers**: Named threads with stable spawn-order identities
//! - **Thread safety**: Built on parking_lot mutexes and condition variables
//! - **Graceful teardown**: Dropping the pool drains the queue and joins every worker
//!
//! ## Quick Start
//!
//! ```rust
//! use stretchpool::prelude::*;
//!
//! # fn main() -> Result<()> {
//! // Workers start immediately; there is no separate start step.
//! let pool = ThreadPool::with_threads(4)?;
//!
//! for i in 0..10 {
//!     pool.execute(move || {
//!         println!("Task {} executing", i);
//!     });
//! }
//!
//! // Block until the queue has been emptied.
//! pool.wait_until_drained();
//! # Ok(())
//! # }
//! ```
//!
//! ## Resizing at Runtime
//!
//! ```rust
//! use stretchpool::prelude::*;
//!
//! # fn main() -> Result<()> {
//! let pool = ThreadPool::with_threads(2)?;
//!
//! pool.grow(2)?;      // add two workers
//! pool.shrink(3);     // retire the three newest workers
//! pool.resize(4)?;    // converge on exactly four
//! # Ok(())
//! # }
//! ```
//!
//! Shrinking always retires the most recently spawned workers first: each
//! worker owns its spawn-order index for life and exits once the pool's
//! target count drops to that index or below, so the live indices are always
//! the contiguous range `0..worker_count()`.
//!
//! ## Thread Pool Configuration
//!
//! Construction caps the initial thread count at the number of CPUs unless
//! `force` is set. Later `grow`/`resize` calls are taken literally.
//!
//! ```rust
//! use stretchpool::prelude::*;
//!
//! # fn main() -> Result<()> {
//! let config = ThreadPoolConfig::new(16)
//!     .force(true)
//!     .with_thread_name_prefix("io-worker");
//!
//! let pool = ThreadPool::with_config(config)?;
//! assert_eq!(pool.worker_count(), 16);
//! # Ok(())
//! # }
//! ```
//!
//! ## Custom Tasks
//!
//! ```rust
//! use stretchpool::prelude::*;
//!
//! struct MyTask {
//!     data: String,
//! }
//!
//! impl Task for MyTask {
//!     fn run(self: Box<Self>) {
//!         println!("Processing: {}", self.data);
//!     }
//!
//!     fn task_type(&self) -> &str {
//!         "MyTask"
//!     }
//! }
//!
//! # fn main() -> Result<()> {
//! # let pool = ThreadPool::with_threads(2)?;
//! pool.submit(MyTask {
//!     data: "test".to_string(),
//! });
//! # pool.wait_until_drained();
//! # Ok(())
//! # }
//! ```
//!
//! ## Drained Does Not Mean Finished
//!
//! [`ThreadPool::wait_until_drained`] returns as soon as the queue is
//! observed empty. The tasks most recently handed to workers may still be
//! executing at that moment. When "all submitted work has completed" is the
//! requirement, drain first and then resize to zero, which joins the workers
//! and with them their in-flight tasks:
//!
//! ```rust
//! use stretchpool::prelude::*;
//! use std::sync::atomic::{AtomicUsize, Ordering};
//! use std::sync::Arc;
//!
//! # fn main() -> Result<()> {
//! let pool = ThreadPool::with_threads(2)?;
//! let done = Arc::new(AtomicUsize::new(0));
//! for _ in 0..8 {
//!     let done = Arc::clone(&done);
//!     pool.execute(move || {
//!         done.fetch_add(1, Ordering::SeqCst);
//!     });
//! }
//!
//! pool.wait_until_drained();
//! pool.resize(0)?;
//! assert_eq!(done.load(Ordering::SeqCst), 8);
//! # Ok(())
//! # }
//! ```
//!
//! ## Panicking Tasks Kill Their Worker
//!
//! The pool never wraps task execution in `catch_unwind`. A panic unwinds
//! through the worker's stack and terminates that thread; the queue and the
//! remaining workers carry on. The dead worker stays in the pool's books
//! until it is retired by a shrink, a resize, or drop, at which point the
//! join observes the panic and logs it.
//!
//! The dangerous corner case is a pool whose workers have *all* died while
//! tasks are still queued: [`ThreadPool::wait_until_drained`] and drop will
//! then block until someone calls [`ThreadPool::flush`] or
//! [`ThreadPool::grow`]. The same applies to a pool constructed with zero
//! workers and a non-empty queue.

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod core;
pub mod pool;
pub mod prelude;

pub use crate::core::{BoxedTask, ClosureTask, PoolError, Result, Task};
pub use crate::pool::{ThreadPool, ThreadPoolConfig};
