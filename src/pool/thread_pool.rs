//! Thread pool implementation

use crate::core::{BoxedTask, ClosureTask, PoolError, Result, ResultSlot, Task, TaskHandle, ValueBox};
use crate::pool::worker::Worker;
use log::{debug, error, info, warn};
use parking_lot::{Condvar, Mutex, MutexGuard};
use std::any::Any;
use std::collections::{HashMap, VecDeque};
use std::panic::{catch_unwind, AssertUnwindSafe};
use std::sync::atomic::{AtomicU64, AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

/// Operating mode of the pool
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PoolMode {
    /// Constant worker count for the pool's entire lifetime
    Fixed,
    /// Grow workers under load up to a maximum, shrink back toward the
    /// initial count after sustained idleness
    Elastic,
}

/// Configuration for the task pool
///
/// All settings are fixed once [`ThreadPool::start`] runs; build the
/// configuration up front and pass it to [`ThreadPool::with_config`].
#[derive(Clone, Debug)]
pub struct PoolConfig {
    /// Operating mode. Default: [`PoolMode::Fixed`]
    pub mode: PoolMode,
    /// Maximum number of queued tasks. Default: 1024
    pub queue_capacity: usize,
    /// Upper bound on worker count in `Elastic` mode. Default: 10
    pub max_threads: usize,
    /// Idle duration after which a surplus elastic worker retires.
    /// Default: 60s
    pub idle_timeout: Duration,
    /// Maximum time a submission waits for queue space before being
    /// rejected. Default: 1s
    pub submit_timeout: Duration,
    /// Wait slice for elastic workers between idle-timeout checks.
    /// Default: 1s
    ///
    /// Shorter slices detect expired idle timeouts sooner at the cost of
    /// more wakeups.
    pub poll_interval: Duration,
    /// Thread name prefix. Default: "pool-worker"
    pub thread_name_prefix: String,
}

impl Default for PoolConfig {
    fn default() -> Self {
        Self {
            mode: PoolMode::Fixed,
            queue_capacity: 1024,
            max_threads: 10,
            idle_timeout: Duration::from_secs(60),
            submit_timeout: Duration::from_secs(1),
            poll_interval: Duration::from_secs(1),
            thread_name_prefix: "pool-worker".to_string(),
        }
    }
}

impl PoolConfig {
    /// Create a configuration with default settings
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the operating mode
    #[must_use = "builder methods return a new value and do not modify the original"]
    pub fn with_mode(mut self, mode: PoolMode) -> Self {
        self.mode = mode;
        self
    }

    /// Set the task queue capacity
    #[must_use = "builder methods return a new value and do not modify the original"]
    pub fn with_queue_capacity(mut self, capacity: usize) -> Self {
        self.queue_capacity = capacity;
        self
    }

    /// Set the elastic-mode worker count upper bound
    #[must_use = "builder methods return a new value and do not modify the original"]
    pub fn with_max_threads(mut self, max_threads: usize) -> Self {
        self.max_threads = max_threads;
        self
    }

    /// Set the elastic worker idle timeout
    #[must_use = "builder methods return a new value and do not modify the original"]
    pub fn with_idle_timeout(mut self, timeout: Duration) -> Self {
        self.idle_timeout = timeout;
        self
    }

    /// Set the bounded submission wait
    #[must_use = "builder methods return a new value and do not modify the original"]
    pub fn with_submit_timeout(mut self, timeout: Duration) -> Self {
        self.submit_timeout = timeout;
        self
    }

    /// Set the elastic wait slice.
    ///
    /// # Panics
    ///
    /// Panics if interval is zero.
    #[must_use = "builder methods return a new value and do not modify the original"]
    pub fn with_poll_interval(mut self, interval: Duration) -> Self {
        assert!(!interval.is_zero(), "poll interval must be non-zero");
        self.poll_interval = interval;
        self
    }

    /// Set thread name prefix
    #[must_use = "builder methods return a new value and do not modify the original"]
    pub fn with_thread_name_prefix<S: Into<String>>(mut self, prefix: S) -> Self {
        self.thread_name_prefix = prefix.into();
        self
    }

    /// Validate configuration
    pub fn validate(&self) -> Result<()> {
        if self.queue_capacity == 0 {
            return Err(PoolError::invalid_config(
                "queue_capacity",
                "Queue capacity must be greater than 0",
            ));
        }
        if self.max_threads == 0 {
            return Err(PoolError::invalid_config(
                "max_threads",
                "Maximum thread count must be greater than 0",
            ));
        }
        Ok(())
    }
}

/// Lifecycle of the pool, advanced one way only.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Lifecycle {
    NotStarted,
    Running,
    ShuttingDown,
    Stopped,
}

/// A task queued for execution, paired with the delivery side of the
/// handle returned to its producer.
struct QueuedTask {
    task: BoxedTask,
    slot: ResultSlot,
}

impl QueuedTask {
    /// Run the task with panic isolation and deliver its result.
    ///
    /// A panicking task delivers an empty [`ValueBox`] so the paired
    /// handle's `get` never blocks forever.
    fn execute(mut self) {
        let task_type = self.task.task_type().to_string();
        match catch_unwind(AssertUnwindSafe(|| self.task.run())) {
            Ok(value) => self.slot.deliver(value),
            Err(panic_info) => {
                error!("task '{}' panicked: {}", task_type, panic_message(&panic_info));
                self.slot.deliver(ValueBox::empty());
            }
        }
    }
}

fn panic_message(panic_info: &(dyn Any + Send)) -> String {
    if let Some(s) = panic_info.downcast_ref::<&str>() {
        s.to_string()
    } else if let Some(s) = panic_info.downcast_ref::<String>() {
        s.clone()
    } else {
        "Unknown panic".to_string()
    }
}

/// State guarded by the single pool mutex.
///
/// Every mutation of the queue, the counters, and the worker registry
/// happens under this lock, keeping the shutdown bookkeeping consistent
/// with concurrent dequeue and retirement.
struct PoolShared {
    lifecycle: Lifecycle,
    queue: VecDeque<QueuedTask>,
    workers: HashMap<usize, Worker>,
    /// Handles of elastic workers that retired before shutdown; joined
    /// alongside the registry during shutdown.
    retired: Vec<Worker>,
    initial_threads: usize,
    current_threads: usize,
    idle_threads: usize,
}

struct PoolCore {
    config: PoolConfig,
    shared: Mutex<PoolShared>,
    /// Consumer wakeup: tasks are available
    not_empty: Condvar,
    /// Producer wakeup: queue space is available
    not_full: Condvar,
}

/// A worker pool executing heterogeneous tasks with one-shot result handles
///
/// # Operating Modes
///
/// In [`PoolMode::Fixed`] the worker count set by [`start`](Self::start)
/// never changes. In [`PoolMode::Elastic`] the pool spawns extra workers
/// while queued tasks outnumber idle workers (bounded by
/// [`PoolConfig::max_threads`]) and retires surplus workers that stay idle
/// longer than [`PoolConfig::idle_timeout`], never dropping below the
/// initial count.
///
/// # Backpressure
///
/// The task queue is bounded. A submission waits up to
/// [`PoolConfig::submit_timeout`] for space; if the queue stays full the
/// submission is rejected and the returned [`TaskHandle`] is invalid. This
/// is an expected, recoverable condition, not an error.
///
/// # Shutdown
///
/// [`shutdown`](Self::shutdown) (also run on drop) wakes every worker,
/// lets them drain the remaining queue, and joins each thread before
/// returning, so no worker outlives the pool.
pub struct ThreadPool {
    core: Arc<PoolCore>,
    next_worker_id: AtomicUsize,
    total_tasks_submitted: AtomicU64,
}

impl std::fmt::Debug for ThreadPool {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ThreadPool")
            .field("config", &self.core.config)
            .field("running", &self.is_running())
            .field(
                "total_tasks_submitted",
                &self.total_tasks_submitted.load(Ordering::Relaxed),
            )
            .finish()
    }
}

impl ThreadPool {
    /// Create a pool with default configuration (fixed mode)
    pub fn new() -> Result<Self> {
        Self::with_config(PoolConfig::default())
    }

    /// Create a pool with the given operating mode and default settings
    pub fn with_mode(mode: PoolMode) -> Result<Self> {
        Self::with_config(PoolConfig::new().with_mode(mode))
    }

    /// Create a pool with custom configuration
    pub fn with_config(config: PoolConfig) -> Result<Self> {
        config.validate()?;

        Ok(Self {
            core: Arc::new(PoolCore {
                config,
                shared: Mutex::new(PoolShared {
                    lifecycle: Lifecycle::NotStarted,
                    queue: VecDeque::new(),
                    workers: HashMap::new(),
                    retired: Vec::new(),
                    initial_threads: 0,
                    current_threads: 0,
                    idle_threads: 0,
                }),
                not_empty: Condvar::new(),
                not_full: Condvar::new(),
            }),
            next_worker_id: AtomicUsize::new(0),
            total_tasks_submitted: AtomicU64::new(0),
        })
    }

    /// Start the pool with the given number of initial workers.
    ///
    /// Passing `0` uses one worker per CPU. In `Elastic` mode this count is
    /// also the floor the pool shrinks back to.
    ///
    /// # Errors
    ///
    /// - [`PoolError::AlreadyRunning`] if the pool was started before
    /// - [`PoolError::InvalidConfig`] if the initial count exceeds
    ///   `max_threads` in `Elastic` mode
    /// - [`PoolError::Spawn`] if a worker thread cannot be created
    pub fn start(&self, initial_threads: usize) -> Result<()> {
        let initial = if initial_threads == 0 {
            num_cpus::get()
        } else {
            initial_threads
        };

        if self.core.config.mode == PoolMode::Elastic && initial > self.core.config.max_threads {
            return Err(PoolError::invalid_config(
                "initial_threads",
                "Initial thread count exceeds max_threads",
            ));
        }

        let mut shared = self.core.shared.lock();
        if shared.lifecycle != Lifecycle::NotStarted {
            return Err(PoolError::already_running(
                &self.core.config.thread_name_prefix,
                shared.current_threads,
            ));
        }

        shared.lifecycle = Lifecycle::Running;
        shared.initial_threads = initial;
        for _ in 0..initial {
            let id = self.next_worker_id.fetch_add(1, Ordering::Relaxed);
            match Self::spawn_worker(&self.core, id) {
                Ok(worker) => {
                    shared.workers.insert(id, worker);
                    shared.current_threads += 1;
                    shared.idle_threads += 1;
                }
                Err(e) => {
                    self.rollback_failed_start(shared);
                    return Err(e);
                }
            }
        }

        info!(
            "pool '{}' started with {} workers in {:?} mode",
            self.core.config.thread_name_prefix, initial, self.core.config.mode
        );
        Ok(())
    }

    /// Undo a partial start: return the pool to its pre-start state, then
    /// stop and join the workers spawned so far.
    ///
    /// Restoring `NotStarted` first makes the already-running workers exit
    /// their dispatch loops, and leaves the pool startable again.
    fn rollback_failed_start(&self, mut shared: MutexGuard<'_, PoolShared>) {
        shared.lifecycle = Lifecycle::NotStarted;
        shared.initial_threads = 0;
        shared.current_threads = 0;
        shared.idle_threads = 0;
        let workers: Vec<Worker> = std::mem::take(&mut shared.workers).into_values().collect();
        self.core.not_empty.notify_all();
        drop(shared);

        for worker in workers {
            if let Err(e) = worker.join() {
                error!("failed to join worker while undoing partial start: {}", e);
            }
        }
    }

    fn spawn_worker(core: &Arc<PoolCore>, id: usize) -> Result<Worker> {
        let dispatch_core = Arc::clone(core);
        Worker::spawn(id, &core.config.thread_name_prefix, move || {
            dispatch(dispatch_core, id)
        })
    }

    /// Submit a task, receiving a one-shot handle to its eventual result.
    ///
    /// Waits up to [`PoolConfig::submit_timeout`] for queue space. If the
    /// queue stays full the submission is rejected: the returned handle is
    /// invalid and its [`get`](TaskHandle::get) yields an empty value
    /// immediately. The queue is left unchanged and the caller may resubmit.
    ///
    /// # Errors
    ///
    /// [`PoolError::NotRunning`] if the pool has not been started, has been
    /// shut down, or begins shutting down while the submission is waiting
    /// for queue space.
    pub fn submit<T: Task + 'static>(&self, task: T) -> Result<TaskHandle> {
        self.submit_boxed(Box::new(task))
    }

    fn submit_boxed(&self, task: BoxedTask) -> Result<TaskHandle> {
        let core = &self.core;
        let mut shared = core.shared.lock();
        if shared.lifecycle != Lifecycle::Running {
            return Err(PoolError::not_running(&core.config.thread_name_prefix));
        }

        // Bounded wait for queue space
        let deadline = Instant::now() + core.config.submit_timeout;
        while shared.queue.len() >= core.config.queue_capacity {
            let timed_out = core.not_full.wait_until(&mut shared, deadline).timed_out();
            // Shutdown can begin while this producer is blocked; a task
            // enqueued now would never be run
            if shared.lifecycle != Lifecycle::Running {
                return Err(PoolError::not_running(&core.config.thread_name_prefix));
            }
            if timed_out && shared.queue.len() >= core.config.queue_capacity {
                warn!(
                    "task queue still full after {:?}, rejecting submission",
                    core.config.submit_timeout
                );
                return Ok(TaskHandle::rejected());
            }
        }

        let (handle, slot) = TaskHandle::accepted();
        shared.queue.push_back(QueuedTask { task, slot });
        core.not_empty.notify_all();

        if core.config.mode == PoolMode::Elastic
            && shared.queue.len() > shared.idle_threads
            && shared.current_threads < core.config.max_threads
        {
            let id = self.next_worker_id.fetch_add(1, Ordering::Relaxed);
            match Self::spawn_worker(core, id) {
                Ok(worker) => {
                    shared.workers.insert(id, worker);
                    shared.current_threads += 1;
                    shared.idle_threads += 1;
                    info!(
                        "spawned elastic worker {} ({} threads now)",
                        id, shared.current_threads
                    );
                }
                // Growth is opportunistic; the submission already succeeded
                Err(e) => error!("failed to grow pool: {}", e),
            }
        }

        self.total_tasks_submitted.fetch_add(1, Ordering::Relaxed);
        Ok(handle)
    }

    /// Submit a closure as a task
    pub fn execute<F, T>(&self, f: F) -> Result<TaskHandle>
    where
        F: FnOnce() -> T + Send + 'static,
        T: Send + 'static,
    {
        self.submit(ClosureTask::new(f))
    }

    /// Get the operating mode
    pub fn mode(&self) -> PoolMode {
        self.core.config.mode
    }

    /// Check if the pool is running
    pub fn is_running(&self) -> bool {
        self.core.shared.lock().lifecycle == Lifecycle::Running
    }

    /// Get the number of tasks currently queued
    pub fn queued_tasks(&self) -> usize {
        self.core.shared.lock().queue.len()
    }

    /// Get the current worker thread count
    pub fn current_threads(&self) -> usize {
        self.core.shared.lock().current_threads
    }

    /// Get the number of idle worker threads
    pub fn idle_threads(&self) -> usize {
        self.core.shared.lock().idle_threads
    }

    /// Get total number of tasks submitted (accepted submissions only)
    pub fn total_tasks_submitted(&self) -> u64 {
        self.total_tasks_submitted.load(Ordering::Relaxed)
    }

    /// Shut down the pool and wait for every worker thread to finish.
    ///
    /// 1. Stops accepting new submissions
    /// 2. Wakes all waiting workers and producers
    /// 3. Workers drain the remaining queue, then exit
    /// 4. Joins every registered and retired worker thread
    ///
    /// Idempotent: a call racing an in-progress shutdown waits until the
    /// workers have exited, then returns.
    pub fn shutdown(&self) -> Result<()> {
        let workers = {
            let mut shared = self.core.shared.lock();
            match shared.lifecycle {
                Lifecycle::NotStarted | Lifecycle::Stopped => return Ok(()),
                Lifecycle::ShuttingDown => {
                    // Another caller is draining; do not report completion
                    // until the workers are actually gone
                    while shared.lifecycle == Lifecycle::ShuttingDown {
                        self.core.not_full.wait(&mut shared);
                    }
                    return Ok(());
                }
                Lifecycle::Running => {}
            }
            shared.lifecycle = Lifecycle::ShuttingDown;
            self.core.not_empty.notify_all();
            self.core.not_full.notify_all();

            let mut workers: Vec<Worker> =
                std::mem::take(&mut shared.workers).into_values().collect();
            workers.extend(shared.retired.drain(..));
            workers
        };

        // Join every worker even if one of them panicked, so the pool
        // always reaches `Stopped` and late callers are released
        let mut join_error = None;
        for worker in workers {
            if let Err(e) = worker.join() {
                error!("worker failed to join during shutdown: {}", e);
                join_error.get_or_insert(e);
            }
        }

        let mut shared = self.core.shared.lock();
        shared.lifecycle = Lifecycle::Stopped;
        shared.current_threads = 0;
        shared.idle_threads = 0;
        // Wakes producers blocked on queue space and shutdown callers
        // waiting for `Stopped`
        self.core.not_full.notify_all();
        drop(shared);

        info!("pool '{}' shut down", self.core.config.thread_name_prefix);
        match join_error {
            Some(e) => Err(e),
            None => Ok(()),
        }
    }
}

impl Drop for ThreadPool {
    fn drop(&mut self) {
        if let Err(e) = self.shutdown() {
            error!(
                "failed to shut down pool '{}' during drop: {}",
                self.core.config.thread_name_prefix, e
            );
        }
    }
}

/// Dispatch loop run by each worker, parameterized by its ID.
fn dispatch(core: Arc<PoolCore>, worker_id: usize) {
    debug!("worker {} started", worker_id);
    let mut last_active = Instant::now();

    loop {
        let entry = {
            let mut shared = core.shared.lock();
            loop {
                if let Some(entry) = shared.queue.pop_front() {
                    shared.idle_threads -= 1;
                    if !shared.queue.is_empty() {
                        core.not_empty.notify_all();
                    }
                    core.not_full.notify_all();
                    break entry;
                }

                if shared.lifecycle != Lifecycle::Running {
                    debug!("worker {} exiting on shutdown", worker_id);
                    return;
                }

                match core.config.mode {
                    PoolMode::Fixed => core.not_empty.wait(&mut shared),
                    PoolMode::Elastic => {
                        let timed_out = core
                            .not_empty
                            .wait_for(&mut shared, core.config.poll_interval)
                            .timed_out();
                        if timed_out
                            && last_active.elapsed() >= core.config.idle_timeout
                            && shared.current_threads > shared.initial_threads
                        {
                            // Surplus worker: move own handle to the retired
                            // list for shutdown to join, then terminate
                            if let Some(worker) = shared.workers.remove(&worker_id) {
                                shared.retired.push(worker);
                            }
                            shared.current_threads -= 1;
                            shared.idle_threads -= 1;
                            info!(
                                "worker {} retired after idle timeout ({} threads left)",
                                worker_id, shared.current_threads
                            );
                            return;
                        }
                    }
                }
            }
        };

        // Run the task outside the lock
        entry.execute();

        let mut shared = core.shared.lock();
        shared.idle_threads += 1;
        drop(shared);
        last_active = Instant::now();
    }
}
