//! Dynamic resizing example
//!
//! Demonstrates growing and shrinking the pool while work is in flight, plus
//! flushing a backlog nobody is around to serve.
//!
//! Run with: cargo run --example dynamic_resize

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::thread;
use std::time::Duration;
use stretchpool::prelude::*;

fn main() -> Result<()> {
    env_logger::init();

    println!("=== Stretchpool - Dynamic Resize Example ===\n");

    // Start with no workers at all: tasks just accumulate.
    let config = ThreadPoolConfig::new(0)
        .force(true)
        .with_thread_name_prefix("elastic");
    let pool = ThreadPool::with_config(config)?;

    let completed = Arc::new(AtomicUsize::new(0));

    println!("1. Queueing 50 tasks on a pool with no workers:");
    for _ in 0..50 {
        let completed = Arc::clone(&completed);
        pool.execute(move || {
            thread::sleep(Duration::from_millis(10));
            completed.fetch_add(1, Ordering::SeqCst);
        });
    }
    println!(
        "   {} workers, {} tasks pending",
        pool.worker_count(),
        pool.pending_tasks()
    );

    println!("\n2. Growing to 4 workers; the backlog starts moving:");
    pool.grow(4)?;
    thread::sleep(Duration::from_millis(60));
    println!(
        "   {} workers, {} tasks pending, {} completed",
        pool.worker_count(),
        pool.pending_tasks(),
        completed.load(Ordering::SeqCst)
    );

    println!("\n3. Shrinking to 1 worker mid-stream:");
    pool.resize(1)?;
    println!(
        "   {} workers, {} tasks pending, {} completed",
        pool.worker_count(),
        pool.pending_tasks(),
        completed.load(Ordering::SeqCst)
    );

    println!("\n4. Draining the remainder on the single worker...");
    pool.wait_until_drained();
    pool.resize(0)?;
    println!("   All {} tasks completed", completed.load(Ordering::SeqCst));

    println!("\n5. Queueing tasks with no workers again, then flushing:");
    for _ in 0..10 {
        pool.execute(|| println!("   This task will never run"));
    }
    let discarded = pool.flush();
    println!("   Flushed {} queued tasks without running them", discarded);

    println!("\n=== Example completed successfully! ===");

    Ok(())
}
