//! Core types and traits for the task pool

pub mod error;
pub mod handle;
pub mod signal;
pub mod task;
pub mod value;

pub use error::{PoolError, Result};
pub use handle::TaskHandle;
pub use signal::CountingSignal;
pub use task::{BoxedTask, ClosureTask, Task};
pub use value::ValueBox;

pub(crate) use handle::ResultSlot;
