//! Basic thread pool usage example
//!
//! Demonstrates pool creation, task submission, draining, and teardown.
//!
//! Run with: cargo run --example basic_usage

use std::thread;
use std::time::Duration;
use stretchpool::prelude::*;

fn main() -> Result<()> {
    env_logger::init();

    println!("=== Stretchpool - Basic Usage Example ===\n");

    // Create a thread pool with 4 worker threads (clamped to the CPU count)
    let pool = ThreadPool::with_threads(4)?;
    println!("1. Created thread pool with {} workers", pool.worker_count());

    println!("\n2. Submitting simple tasks:");
    for i in 0..10 {
        pool.execute(move || {
            println!(
                "  Task {} executing on {}",
                i,
                thread::current().name().unwrap_or("unnamed")
            );
            thread::sleep(Duration::from_millis(50));
        });
    }
    println!("   Submitted 10 tasks");

    println!("\n3. Waiting for the queue to drain...");
    pool.wait_until_drained();
    println!("   Queue is empty ({} tasks pending)", pool.pending_tasks());

    // Submit a custom task type
    println!("\n4. Submitting a custom task:");
    struct GreetTask {
        name: String,
    }

    impl Task for GreetTask {
        fn run(self: Box<Self>) {
            println!("  Hello from {}!", self.name);
        }

        fn task_type(&self) -> &str {
            "GreetTask"
        }
    }

    pool.submit(GreetTask {
        name: "a custom task".to_string(),
    });
    pool.wait_until_drained();

    // Dropping the pool drains the queue and joins every worker
    println!("\n5. Dropping the pool...");
    drop(pool);

    println!("\n=== Example completed successfully! ===");

    Ok(())
}
