//! End-to-end tests for pool behavior: result fidelity, backpressure,
//! elastic scaling bounds, and shutdown guarantees.

use rand::Rng;
use std::sync::mpsc;
use std::sync::Arc;
use std::thread;
use std::time::{Duration, Instant};
use task_pool::prelude::*;

struct RangeSum {
    begin: u64,
    end: u64,
    delay: Duration,
}

impl RangeSum {
    fn new(begin: u64, end: u64) -> Self {
        Self {
            begin,
            end,
            delay: Duration::ZERO,
        }
    }

    fn with_delay(begin: u64, end: u64, delay: Duration) -> Self {
        Self { begin, end, delay }
    }
}

impl Task for RangeSum {
    fn run(&mut self) -> ValueBox {
        if !self.delay.is_zero() {
            thread::sleep(self.delay);
        }
        ValueBox::new((self.begin..=self.end).sum::<u64>())
    }

    fn task_type(&self) -> &str {
        "RangeSum"
    }
}

/// Block a single-worker pool and fill its queue, returning the release
/// sender and the handles of the queued tasks.
fn occupy_single_worker(pool: &ThreadPool, queue_fill: usize) -> (mpsc::Sender<()>, Vec<TaskHandle>) {
    let (started_tx, started_rx) = mpsc::channel();
    let (done_tx, done_rx) = mpsc::channel::<()>();

    let mut handles = vec![pool
        .execute(move || {
            started_tx.send(()).unwrap();
            let _ = done_rx.recv();
            0u64
        })
        .expect("failed to submit blocking task")];

    started_rx
        .recv_timeout(Duration::from_secs(5))
        .expect("blocking task should start within 5 seconds");

    for i in 0..queue_fill {
        handles.push(
            pool.execute(move || i as u64)
                .expect("failed to fill queue"),
        );
    }

    (done_tx, handles)
}

#[test]
fn fixed_pool_returns_each_tasks_value() {
    let pool = ThreadPool::new().expect("failed to create pool");
    pool.start(4).expect("failed to start pool");

    let mut rng = rand::thread_rng();
    let inputs: Vec<(u64, u64)> = (0..64)
        .map(|_| {
            let begin = rng.gen_range(1..10_000u64);
            (begin, begin + rng.gen_range(0..5_000u64))
        })
        .collect();

    let handles: Vec<(u64, TaskHandle)> = inputs
        .iter()
        .map(|&(begin, end)| {
            let expected: u64 = (begin..=end).sum();
            let handle = pool
                .submit(RangeSum::new(begin, end))
                .expect("failed to submit task");
            (expected, handle)
        })
        .collect();

    for (expected, handle) in handles {
        assert!(handle.is_valid());
        assert_eq!(handle.get().take::<u64>().unwrap(), expected);
    }

    pool.shutdown().expect("failed to shutdown pool");
}

#[test]
fn elastic_scenario_six_summation_ranges() {
    let config = PoolConfig::new()
        .with_mode(PoolMode::Elastic)
        .with_max_threads(10);
    let pool = ThreadPool::with_config(config).expect("failed to create pool");
    pool.start(4).expect("failed to start pool");

    let ranges = [
        (1u64, 1000u64),
        (1001, 2000),
        (2001, 3000),
        (3001, 4000),
        (4001, 5000),
        (5001, 6000),
    ];
    let expected = [500_500u64, 1_500_500, 2_500_500, 3_500_500, 4_500_500, 5_500_500];

    let handles: Vec<TaskHandle> = ranges
        .iter()
        .map(|&(begin, end)| {
            pool.submit(RangeSum::with_delay(begin, end, Duration::from_millis(50)))
                .expect("failed to submit task")
        })
        .collect();

    for (handle, expected) in handles.into_iter().zip(expected) {
        assert_eq!(handle.get().take::<u64>().unwrap(), expected);
    }

    pool.shutdown().expect("failed to shutdown pool");
}

#[test]
fn rejected_submission_leaves_queue_unchanged() {
    let config = PoolConfig::new()
        .with_queue_capacity(1)
        .with_submit_timeout(Duration::from_millis(100));
    let pool = ThreadPool::with_config(config).expect("failed to create pool");
    pool.start(1).expect("failed to start pool");

    let (release, handles) = occupy_single_worker(&pool, 1);
    assert_eq!(pool.queued_tasks(), 1);

    let start = Instant::now();
    let rejected = pool.execute(|| 0u64).expect("submit should not error");
    let elapsed = start.elapsed();

    assert!(!rejected.is_valid());
    assert!(rejected.get().is_empty());
    assert_eq!(pool.queued_tasks(), 1, "queue must be unchanged by rejection");
    assert!(
        elapsed >= Duration::from_millis(80),
        "should have waited near the timeout, waited {:?}",
        elapsed
    );

    release.send(()).unwrap();
    for handle in handles {
        assert!(!handle.get().is_empty());
    }
    pool.shutdown().expect("failed to shutdown pool");
}

#[test]
fn elastic_growth_stays_within_bounds() {
    let config = PoolConfig::new()
        .with_mode(PoolMode::Elastic)
        .with_max_threads(4)
        .with_poll_interval(Duration::from_millis(50));
    let pool = ThreadPool::with_config(config).expect("failed to create pool");
    pool.start(2).expect("failed to start pool");

    let handles: Vec<TaskHandle> = (0..16)
        .map(|i| {
            pool.submit(RangeSum::with_delay(1, 100, Duration::from_millis(100)))
                .unwrap_or_else(|e| panic!("submit {} failed: {}", i, e))
        })
        .collect();

    // The backlog exceeds the idle count, so the pool should reach its cap,
    // and must never leave [initial, max]
    let mut saw_growth = false;
    let deadline = Instant::now() + Duration::from_secs(5);
    while Instant::now() < deadline {
        let current = pool.current_threads();
        assert!((2..=4).contains(&current), "thread count {} out of bounds", current);
        if current == 4 {
            saw_growth = true;
            break;
        }
        thread::sleep(Duration::from_millis(10));
    }
    assert!(saw_growth, "pool never grew to max_threads under backlog");

    for handle in handles {
        assert_eq!(handle.get().take::<u64>().unwrap(), 5050);
    }
    pool.shutdown().expect("failed to shutdown pool");
}

#[test]
fn elastic_workers_retire_back_to_initial() {
    let config = PoolConfig::new()
        .with_mode(PoolMode::Elastic)
        .with_max_threads(6)
        .with_idle_timeout(Duration::from_millis(200))
        .with_poll_interval(Duration::from_millis(50));
    let pool = ThreadPool::with_config(config).expect("failed to create pool");
    pool.start(2).expect("failed to start pool");

    // Force growth with a burst of slow tasks
    let handles: Vec<TaskHandle> = (0..12)
        .map(|_| {
            pool.submit(RangeSum::with_delay(1, 10, Duration::from_millis(80)))
                .expect("failed to submit task")
        })
        .collect();
    for handle in handles {
        assert_eq!(handle.get().take::<u64>().unwrap(), 55);
    }
    assert!(pool.current_threads() > 2, "burst should have grown the pool");

    // After sustained idleness surplus workers retire, but never below the
    // initial count
    let deadline = Instant::now() + Duration::from_secs(5);
    loop {
        let current = pool.current_threads();
        assert!(current >= 2, "thread count {} fell below initial", current);
        if current == 2 {
            break;
        }
        assert!(Instant::now() < deadline, "pool did not shrink back to initial");
        thread::sleep(Duration::from_millis(25));
    }

    // Stable at the floor
    thread::sleep(Duration::from_millis(400));
    assert_eq!(pool.current_threads(), 2);

    pool.shutdown().expect("failed to shutdown pool");
}

#[test]
fn typed_extraction_mismatch_is_deterministic() {
    let pool = ThreadPool::new().expect("failed to create pool");
    pool.start(2).expect("failed to start pool");

    for _ in 0..10 {
        let handle = pool.execute(|| 42u64).expect("failed to submit task");
        let err = handle.get().take::<String>().unwrap_err();
        assert!(matches!(err, PoolError::TypeMismatch { .. }));
    }

    let handle = pool
        .execute(|| "typed".to_string())
        .expect("failed to submit task");
    assert_eq!(handle.get().take::<String>().unwrap(), "typed");

    pool.shutdown().expect("failed to shutdown pool");
}

#[test]
fn shutdown_drains_pending_tasks_and_terminates() {
    let pool = ThreadPool::new().expect("failed to create pool");
    pool.start(2).expect("failed to start pool");

    let handles: Vec<TaskHandle> = (0..20)
        .map(|_| {
            pool.submit(RangeSum::with_delay(1, 10, Duration::from_millis(20)))
                .expect("failed to submit task")
        })
        .collect();

    pool.shutdown().expect("failed to shutdown pool");
    assert!(!pool.is_running());
    assert_eq!(pool.current_threads(), 0);
    assert_eq!(pool.queued_tasks(), 0);

    // Every accepted task ran before the workers exited
    for handle in handles {
        assert_eq!(handle.get().take::<u64>().unwrap(), 55);
    }
}

#[test]
fn drop_with_pending_tasks_terminates() {
    let handle = {
        let pool = ThreadPool::with_mode(PoolMode::Elastic).expect("failed to create pool");
        pool.start(2).expect("failed to start pool");
        pool.submit(RangeSum::with_delay(1, 100, Duration::from_millis(30)))
            .expect("failed to submit task")
        // Pool dropped here; drop drains and joins
    };
    assert_eq!(handle.get().take::<u64>().unwrap(), 5050);
}

#[test]
fn submit_blocked_on_full_queue_errors_when_shutdown_begins() {
    let config = PoolConfig::new()
        .with_queue_capacity(1)
        .with_submit_timeout(Duration::from_secs(5));
    let pool = Arc::new(ThreadPool::with_config(config).expect("failed to create pool"));
    pool.start(1).expect("failed to start pool");

    let (release, handles) = occupy_single_worker(&pool, 1);

    // Producer blocks waiting for queue space
    let producer = {
        let pool = Arc::clone(&pool);
        thread::spawn(move || pool.execute(|| 9u64))
    };
    thread::sleep(Duration::from_millis(100));
    assert!(!producer.is_finished());

    // Shutdown begins while the producer is blocked; the producer must not
    // enqueue a task no worker will run
    let shutdowner = {
        let pool = Arc::clone(&pool);
        thread::spawn(move || pool.shutdown())
    };
    thread::sleep(Duration::from_millis(50));

    let result = producer.join().expect("producer panicked");
    assert!(matches!(result, Err(PoolError::NotRunning { .. })));

    release.send(()).unwrap();
    shutdowner
        .join()
        .expect("shutdown thread panicked")
        .expect("failed to shutdown pool");

    assert_eq!(pool.queued_tasks(), 0, "no task may remain queued after shutdown");
    for handle in handles {
        assert!(!handle.get().is_empty());
    }
}

#[test]
fn concurrent_shutdown_waits_for_workers_to_exit() {
    let pool = Arc::new(ThreadPool::new().expect("failed to create pool"));
    pool.start(1).expect("failed to start pool");

    // Keep the single worker busy so shutdown cannot finish joining it
    let (release, handles) = occupy_single_worker(&pool, 0);

    let first = {
        let pool = Arc::clone(&pool);
        thread::spawn(move || pool.shutdown())
    };
    thread::sleep(Duration::from_millis(100));
    assert!(!first.is_finished());

    let second = {
        let pool = Arc::clone(&pool);
        thread::spawn(move || pool.shutdown())
    };
    thread::sleep(Duration::from_millis(100));
    assert!(
        !second.is_finished(),
        "a late shutdown caller must wait until the workers have exited"
    );

    release.send(()).unwrap();
    first
        .join()
        .expect("first shutdown thread panicked")
        .expect("failed to shutdown pool");
    second
        .join()
        .expect("second shutdown thread panicked")
        .expect("late shutdown caller failed");

    assert!(!pool.is_running());
    assert_eq!(pool.current_threads(), 0);
    for handle in handles {
        assert!(!handle.get().is_empty());
    }
}

#[test]
fn submissions_resume_after_queue_drains() {
    let config = PoolConfig::new()
        .with_queue_capacity(2)
        .with_submit_timeout(Duration::from_millis(500));
    let pool = ThreadPool::with_config(config).expect("failed to create pool");
    pool.start(1).expect("failed to start pool");

    let (release, handles) = occupy_single_worker(&pool, 2);

    // Release the worker while a submitter is waiting for space; the
    // submission should be accepted within the wait window
    let releaser = thread::spawn(move || {
        thread::sleep(Duration::from_millis(100));
        release.send(()).unwrap();
    });

    let late = pool.execute(|| 77u64).expect("submit should not error");
    assert!(late.is_valid(), "submission should succeed once space frees up");
    assert_eq!(late.get().take::<u64>().unwrap(), 77);

    releaser.join().expect("releaser panicked");
    for handle in handles {
        assert!(!handle.get().is_empty());
    }
    pool.shutdown().expect("failed to shutdown pool");
}
