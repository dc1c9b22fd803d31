//! Task trait and related types

use crate::core::value::ValueBox;
use std::fmt;
use std::marker::PhantomData;

/// A trait representing a unit of work producing one typed result.
pub trait Task: Send {
    /// Run the task to completion and return its result.
    ///
    /// The computation may block or take arbitrary time; the pool executes
    /// it outside the queue lock.
    fn run(&mut self) -> ValueBox;

    /// Get the task's type name for debugging and logging
    fn task_type(&self) -> &str {
        "Task"
    }
}

impl fmt::Debug for dyn Task {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Task({})", self.task_type())
    }
}

/// A boxed task that can be sent across threads
pub type BoxedTask = Box<dyn Task>;

/// Helper to create a task from a closure
pub struct ClosureTask<F, T>
where
    F: FnOnce() -> T + Send,
    T: Send + 'static,
{
    closure: Option<F>,
    name: String,
    _result: PhantomData<fn() -> T>,
}

impl<F, T> ClosureTask<F, T>
where
    F: FnOnce() -> T + Send,
    T: Send + 'static,
{
    /// Create a new closure task
    pub fn new(closure: F) -> Self {
        Self {
            closure: Some(closure),
            name: "ClosureTask".to_string(),
            _result: PhantomData,
        }
    }

    /// Create a new closure task with a custom name
    pub fn with_name<S: Into<String>>(closure: F, name: S) -> Self {
        Self {
            closure: Some(closure),
            name: name.into(),
            _result: PhantomData,
        }
    }
}

impl<F, T> Task for ClosureTask<F, T>
where
    F: FnOnce() -> T + Send,
    T: Send + 'static,
{
    fn run(&mut self) -> ValueBox {
        match self.closure.take() {
            Some(closure) => ValueBox::new(closure()),
            None => {
                // A task is run at most once by the dispatch loop
                log::error!("task '{}' run twice, returning empty value", self.name);
                ValueBox::empty()
            }
        }
    }

    fn task_type(&self) -> &str {
        &self.name
    }
}
