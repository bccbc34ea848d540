//! Integration tests for pool lifecycle: draining, flushing, resizing under
//! load, and worker loss through task panics

use crossbeam_channel::bounded;
use parking_lot::Mutex;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Arc;
use std::thread;
use std::time::Duration;
use stretchpool::prelude::*;

fn forced_pool(num_threads: usize) -> ThreadPool {
    ThreadPool::with_config(ThreadPoolConfig::new(num_threads).force(true))
        .expect("Failed to create pool")
}

#[test]
fn test_tasks_survive_resize_storm() {
    // Resize aggressively while a stream of tasks is being submitted; no
    // task may be lost and the count must settle where the last resize put it.
    let pool = Arc::new(forced_pool(2));
    let counter = Arc::new(AtomicUsize::new(0));

    let resizer = {
        let pool = Arc::clone(&pool);
        thread::spawn(move || {
            for target in [5, 1, 4, 0, 3, 2] {
                pool.resize(target).expect("Failed to resize pool");
            }
        })
    };

    for _ in 0..500 {
        let counter = Arc::clone(&counter);
        pool.execute(move || {
            counter.fetch_add(1, Ordering::SeqCst);
        });
    }

    resizer.join().expect("Resizer thread panicked");
    assert_eq!(pool.worker_count(), 2);

    pool.wait_until_drained();
    pool.resize(0).expect("Failed to resize pool");
    assert_eq!(counter.load(Ordering::SeqCst), 500);
}

#[test]
fn test_shrink_waits_for_running_task() {
    // A retiring worker finishes its current task before it can be joined,
    // so shrink must block until the task's gate is released.
    let pool = forced_pool(1);

    let (started_tx, started_rx) = bounded::<()>(0);
    let (release_tx, release_rx) = bounded::<()>(0);
    let finished = Arc::new(AtomicBool::new(false));

    let finished_clone = Arc::clone(&finished);
    pool.execute(move || {
        started_tx.send(()).expect("Failed to signal start");
        release_rx.recv().expect("Failed to receive release");
        finished_clone.store(true, Ordering::SeqCst);
    });

    started_rx
        .recv_timeout(Duration::from_secs(5))
        .expect("Task should have started");

    let pool = Arc::new(pool);
    let (done_tx, done_rx) = bounded::<()>(0);
    let shrinker = {
        let pool = Arc::clone(&pool);
        thread::spawn(move || {
            pool.shrink(1);
            done_tx.send(()).expect("Failed to signal shrink done");
        })
    };

    // The worker is parked inside the task, so the shrink cannot finish yet.
    assert!(
        done_rx.recv_timeout(Duration::from_millis(200)).is_err(),
        "Shrink should block while the task is still running"
    );
    assert!(!finished.load(Ordering::SeqCst));

    release_tx.send(()).expect("Failed to release task");
    done_rx
        .recv_timeout(Duration::from_secs(5))
        .expect("Shrink should finish once the task completes");
    shrinker.join().expect("Shrinker thread panicked");

    assert!(finished.load(Ordering::SeqCst));
    assert_eq!(pool.worker_count(), 0);
}

#[test]
fn test_resize_down_retires_only_the_newest_worker() {
    // With both workers parked inside gated tasks, resize(1) must pick the
    // highest index, wait for that worker's task to finish, and leave the
    // other worker serving the queue.
    let pool = Arc::new(forced_pool(2));

    let (started_tx, started_rx) = bounded::<()>(0);
    let (release_tx, release_rx) = bounded::<()>(0);
    let completed = Arc::new(AtomicUsize::new(0));

    for _ in 0..2 {
        let started_tx = started_tx.clone();
        let release_rx = release_rx.clone();
        let completed = Arc::clone(&completed);
        pool.execute(move || {
            started_tx.send(()).expect("Failed to signal start");
            release_rx.recv().expect("Failed to receive release");
            completed.fetch_add(1, Ordering::SeqCst);
        });
    }
    for _ in 0..2 {
        started_rx
            .recv_timeout(Duration::from_secs(5))
            .expect("Both tasks should have started");
    }

    let (done_tx, done_rx) = bounded::<()>(0);
    let resizer = {
        let pool = Arc::clone(&pool);
        thread::spawn(move || {
            pool.resize(1).expect("Failed to resize pool");
            done_tx.send(()).expect("Failed to signal resize done");
        })
    };

    // The retiring worker only re-checks its exit condition between tasks,
    // so the resize stays blocked on its join.
    assert!(
        done_rx.recv_timeout(Duration::from_millis(200)).is_err(),
        "Resize should block while the retiring worker is mid-task"
    );

    release_tx.send(()).expect("Failed to release first task");
    release_tx.send(()).expect("Failed to release second task");
    done_rx
        .recv_timeout(Duration::from_secs(5))
        .expect("Resize should finish once the tasks complete");
    resizer.join().expect("Resizer thread panicked");
    assert_eq!(pool.worker_count(), 1);

    // The survivor keeps serving the same queue.
    let counter = Arc::new(AtomicUsize::new(0));
    let counter_clone = Arc::clone(&counter);
    pool.execute(move || {
        counter_clone.fetch_add(1, Ordering::SeqCst);
    });
    pool.wait_until_drained();
    pool.resize(0).expect("Failed to resize pool");

    assert_eq!(completed.load(Ordering::SeqCst), 2);
    assert_eq!(counter.load(Ordering::SeqCst), 1);
}

#[test]
fn test_drained_signal_can_fire_before_last_task_finishes() {
    // wait_until_drained only promises an empty queue. A task that has been
    // popped but not finished is invisible to it.
    let pool = forced_pool(1);

    let (started_tx, started_rx) = bounded::<()>(0);
    let (release_tx, release_rx) = bounded::<()>(0);
    let finished = Arc::new(AtomicBool::new(false));

    let finished_clone = Arc::clone(&finished);
    pool.execute(move || {
        started_tx.send(()).expect("Failed to signal start");
        release_rx.recv().expect("Failed to receive release");
        finished_clone.store(true, Ordering::SeqCst);
    });

    // Once the task has started it is out of the queue, so the drain wait
    // returns immediately even though the task is still blocked.
    started_rx
        .recv_timeout(Duration::from_secs(5))
        .expect("Task should have started");
    pool.wait_until_drained();
    assert!(
        !finished.load(Ordering::SeqCst),
        "Drained fired with the task still running, as specified"
    );

    release_tx.send(()).expect("Failed to release task");
    pool.wait_until_drained();
    pool.resize(0).expect("Failed to resize pool");
    assert!(finished.load(Ordering::SeqCst));
}

#[test]
fn test_flush_discards_only_queued_work() {
    // Flush drops tasks still in the queue but cannot recall the one the
    // worker is already running.
    let pool = forced_pool(1);

    let (started_tx, started_rx) = bounded::<()>(0);
    let (release_tx, release_rx) = bounded::<()>(0);
    let in_flight_ran = Arc::new(AtomicBool::new(false));
    let queued_ran = Arc::new(AtomicUsize::new(0));

    let in_flight_clone = Arc::clone(&in_flight_ran);
    pool.execute(move || {
        started_tx.send(()).expect("Failed to signal start");
        release_rx.recv().expect("Failed to receive release");
        in_flight_clone.store(true, Ordering::SeqCst);
    });

    started_rx
        .recv_timeout(Duration::from_secs(5))
        .expect("Task should have started");

    // These pile up behind the gated task.
    for _ in 0..5 {
        let queued_ran = Arc::clone(&queued_ran);
        pool.execute(move || {
            queued_ran.fetch_add(1, Ordering::SeqCst);
        });
    }
    assert_eq!(pool.pending_tasks(), 5);

    assert_eq!(pool.flush(), 5);
    assert_eq!(pool.pending_tasks(), 0);

    release_tx.send(()).expect("Failed to release task");
    pool.wait_until_drained();
    pool.resize(0).expect("Failed to resize pool");

    assert!(in_flight_ran.load(Ordering::SeqCst));
    assert_eq!(queued_ran.load(Ordering::SeqCst), 0);
}

#[test]
fn test_panicking_task_kills_worker_and_pool_recovers() {
    // No catch_unwind anywhere: the panic takes the worker thread down. The
    // pool keeps the corpse on its books until retirement, and growing
    // brings in a fresh worker under the next index.
    let counter = Arc::new(AtomicUsize::new(0));
    let worker_name = Arc::new(Mutex::new(None));

    {
        let pool = ThreadPool::with_config(
            ThreadPoolConfig::new(1)
                .force(true)
                .with_thread_name_prefix("doomed"),
        )
        .expect("Failed to create pool");

        let (started_tx, started_rx) = bounded::<()>(0);
        pool.execute(move || {
            started_tx.send(()).expect("Failed to signal start");
            panic!("deliberate test panic");
        });

        started_rx
            .recv_timeout(Duration::from_secs(5))
            .expect("Panicking task should have started");

        // The task was popped before it panicked, so the queue is clean.
        assert_eq!(pool.pending_tasks(), 0);
        assert_eq!(pool.flush(), 0);

        // The dead worker still counts until it is retired.
        pool.grow(1).expect("Failed to grow pool");
        assert_eq!(pool.worker_count(), 2);

        // Only the replacement (index 1) can serve this.
        let counter_clone = Arc::clone(&counter);
        let worker_name_clone = Arc::clone(&worker_name);
        pool.execute(move || {
            counter_clone.fetch_add(1, Ordering::SeqCst);
            *worker_name_clone.lock() = thread::current().name().map(str::to_string);
        });

        // Drop drains, then joins both workers; the corpse's join observes
        // the panic and must not propagate it.
    }

    assert_eq!(counter.load(Ordering::SeqCst), 1);
    assert_eq!(worker_name.lock().as_deref(), Some("doomed-1"));
}

#[test]
fn test_drop_with_zero_workers_after_flush() {
    // A zero-worker pool with queued tasks would hang in drop; flushing
    // first makes teardown safe.
    let counter = Arc::new(AtomicUsize::new(0));

    {
        let pool = forced_pool(0);
        for _ in 0..3 {
            let counter = Arc::clone(&counter);
            pool.execute(move || {
                counter.fetch_add(1, Ordering::SeqCst);
            });
        }
        assert_eq!(pool.flush(), 3);
    }

    assert_eq!(counter.load(Ordering::SeqCst), 0);
}

#[test]
fn test_destruction_completes_pending_work() {
    // Dropping the pool must run everything still queued at that point.
    let counter = Arc::new(AtomicUsize::new(0));

    {
        let pool = forced_pool(3);
        for _ in 0..200 {
            let counter = Arc::clone(&counter);
            pool.execute(move || {
                thread::sleep(Duration::from_micros(100));
                counter.fetch_add(1, Ordering::SeqCst);
            });
        }
    }

    assert_eq!(counter.load(Ordering::SeqCst), 200);
}

#[test]
fn test_multiple_drain_waiters_all_wake() {
    let pool = Arc::new(forced_pool(1));

    let counter = Arc::new(AtomicUsize::new(0));
    for _ in 0..50 {
        let counter = Arc::clone(&counter);
        pool.execute(move || {
            counter.fetch_add(1, Ordering::SeqCst);
        });
    }

    let waiters: Vec<_> = (0..2)
        .map(|_| {
            let pool = Arc::clone(&pool);
            thread::spawn(move || pool.wait_until_drained())
        })
        .collect();

    for waiter in waiters {
        waiter.join().expect("Drain waiter panicked");
    }
    assert_eq!(pool.pending_tasks(), 0);
}

#[test]
fn test_task_can_submit_followup_tasks() {
    // Submitting from inside a task must not deadlock; the follow-up goes
    // through the same queue.
    let pool = Arc::new(forced_pool(2));
    let counter = Arc::new(AtomicUsize::new(0));
    let (submitted_tx, submitted_rx) = bounded::<()>(0);

    {
        let pool_clone = Arc::clone(&pool);
        let counter_clone = Arc::clone(&counter);
        pool.execute(move || {
            counter_clone.fetch_add(1, Ordering::SeqCst);

            let counter_inner = Arc::clone(&counter_clone);
            pool_clone.execute(move || {
                counter_inner.fetch_add(1, Ordering::SeqCst);
            });
            submitted_tx.send(()).expect("Failed to signal submission");
        });
    }

    // Only start draining once the follow-up is in the queue; before that
    // the drain could trivially observe an empty queue.
    submitted_rx
        .recv_timeout(Duration::from_secs(5))
        .expect("Follow-up task should have been submitted");
    pool.wait_until_drained();
    pool.resize(0).expect("Failed to resize pool");

    assert_eq!(counter.load(Ordering::SeqCst), 2);
}

#[test]
fn test_high_volume_through_small_pool() {
    let pool = forced_pool(4);
    let counter = Arc::new(AtomicUsize::new(0));

    for _ in 0..1000 {
        let counter = Arc::clone(&counter);
        pool.execute(move || {
            counter.fetch_add(1, Ordering::SeqCst);
        });
    }

    pool.wait_until_drained();
    pool.resize(0).expect("Failed to resize pool");
    assert_eq!(counter.load(Ordering::SeqCst), 1000);
}
