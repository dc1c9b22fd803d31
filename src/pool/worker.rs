//! Worker thread implementation

use crate::core::{PoolError, Result};
use std::thread;

/// A managed execution thread that repeatedly dequeues and runs tasks.
///
/// Worker IDs are assigned by the pool from a monotonically increasing
/// counter and never reused. The backing thread handle stays joinable and
/// is retained in the pool's registry until shutdown joins it, so no
/// worker thread outlives the pool.
#[derive(Debug)]
pub struct Worker {
    id: usize,
    thread: Option<thread::JoinHandle<()>>,
}

impl Worker {
    /// Spawn a named worker thread running the pool's dispatch loop.
    pub(crate) fn spawn<F>(id: usize, name_prefix: &str, dispatch: F) -> Result<Self>
    where
        F: FnOnce() + Send + 'static,
    {
        let thread = thread::Builder::new()
            .name(format!("{}-{}", name_prefix, id))
            .spawn(dispatch)
            .map_err(|e| PoolError::spawn_with_source(id, "cannot create thread", e))?;

        Ok(Self {
            id,
            thread: Some(thread),
        })
    }

    /// Get worker ID
    pub fn id(&self) -> usize {
        self.id
    }

    /// Join the worker thread
    pub(crate) fn join(mut self) -> Result<()> {
        if let Some(thread) = self.thread.take() {
            thread
                .join()
                .map_err(|_| PoolError::join(self.id, "worker panicked"))?;
        }
        Ok(())
    }
}
