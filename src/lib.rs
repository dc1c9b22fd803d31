//! # Task Pool
//!
//! A bounded worker pool that runs heterogeneous tasks on managed threads and
//! hands each producer a one-shot handle to the task's typed result.
//!
//! ## Features
//!
//! - **Two operating modes**: `Fixed` keeps a constant worker count; `Elastic`
//!   grows under load up to a maximum and shrinks back after sustained idleness
//! - **Bounded queue with backpressure**: submissions wait a bounded time for
//!   queue space and are rejected (not crashed) when the queue stays full
//! - **One-shot result handles**: `get()` blocks until the task's value is
//!   delivered, with runtime-checked typed extraction
//! - **Graceful shutdown**: the pool drains queued tasks and joins every
//!   worker thread before returning
//!
//! ## Quick Start
//!
//! ```rust
//! use task_pool::prelude::*;
//!
//! # fn main() -> Result<()> {
//! let pool = ThreadPool::new()?;
//! pool.start(4)?;
//!
//! // Submit work and collect handles
//! let handles: Vec<TaskHandle> = (0..10u64)
//!     .map(|i| pool.execute(move || i * i))
//!     .collect::<Result<_>>()?;
//!
//! // Retrieve results (blocking until each is ready)
//! for (i, handle) in handles.into_iter().enumerate() {
//!     assert_eq!(handle.get().take::<u64>()?, (i as u64) * (i as u64));
//! }
//!
//! pool.shutdown()?;
//! # Ok(())
//! # }
//! ```
//!
//! ## Elastic Mode
//!
//! ```rust
//! use task_pool::prelude::*;
//! use std::time::Duration;
//!
//! # fn main() -> Result<()> {
//! let config = PoolConfig::new()
//!     .with_mode(PoolMode::Elastic)
//!     .with_max_threads(10)
//!     .with_idle_timeout(Duration::from_secs(60));
//!
//! let pool = ThreadPool::with_config(config)?;
//! pool.start(4)?;
//!
//! let handle = pool.execute(|| (1..=1000u64).sum::<u64>())?;
//! assert_eq!(handle.get().take::<u64>()?, 500_500);
//! # pool.shutdown()?;
//! # Ok(())
//! # }
//! ```
//!
//! ## Custom Tasks
//!
//! ```rust
//! use task_pool::prelude::*;
//!
//! struct RangeSum {
//!     begin: u64,
//!     end: u64,
//! }
//!
//! impl Task for RangeSum {
//!     fn run(&mut self) -> ValueBox {
//!         ValueBox::new((self.begin..=self.end).sum::<u64>())
//!     }
//!
//!     fn task_type(&self) -> &str {
//!         "RangeSum"
//!     }
//! }
//!
//! # fn main() -> Result<()> {
//! # let pool = ThreadPool::new()?;
//! # pool.start(2)?;
//! let handle = pool.submit(RangeSum { begin: 1, end: 100 })?;
//! assert_eq!(handle.get().take::<u64>()?, 5050);
//! # pool.shutdown()?;
//! # Ok(())
//! # }
//! ```
//!
//! ## Backpressure
//!
//! When the queue is full, `submit` waits up to the configured submission
//! timeout and then returns a *rejected* handle instead of failing:
//!
//! ```rust
//! use task_pool::prelude::*;
//!
//! # fn main() -> Result<()> {
//! # let pool = ThreadPool::new()?;
//! # pool.start(2)?;
//! let handle = pool.execute(|| "work")?;
//! if handle.is_valid() {
//!     let result = handle.get();
//!     // ...
//! } else {
//!     // Queue stayed full for the whole wait; resubmit if desired
//! }
//! # pool.shutdown()?;
//! # Ok(())
//! # }
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod core;
pub mod pool;
pub mod prelude;

pub use crate::core::{
    BoxedTask, ClosureTask, CountingSignal, PoolError, Result, Task, TaskHandle, ValueBox,
};
pub use crate::pool::{PoolConfig, PoolMode, ThreadPool};
