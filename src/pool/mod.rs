//! Worker pool orchestration: configuration, dispatch, and thread lifecycle

pub mod thread_pool;
pub mod worker;

pub use thread_pool::{PoolConfig, PoolMode, ThreadPool};
pub use worker::Worker;
