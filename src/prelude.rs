//! Convenient re-exports for common types and traits

pub use crate::core::{
    BoxedTask, ClosureTask, CountingSignal, PoolError, Result, Task, TaskHandle, ValueBox,
};
pub use crate::pool::{PoolConfig, PoolMode, ThreadPool};
