//! One-shot result handle bridging a submitted task to its eventual value

use crate::core::signal::CountingSignal;
use crate::core::value::ValueBox;
use parking_lot::Mutex;
use std::fmt;
use std::sync::Arc;

/// Shared slot between a [`TaskHandle`] and the worker delivering into it.
struct Slot {
    ready: CountingSignal,
    value: Mutex<Option<ValueBox>>,
}

/// A one-shot handle through which a producer retrieves a task's result.
///
/// A handle is created for every submission attempt. A *valid* handle is
/// paired with an enqueued task; [`get`](Self::get) blocks until a worker
/// has executed the task and delivered its value. A *rejected* handle marks
/// a submission that was refused under backpressure; its `get` returns an
/// empty [`ValueBox`] immediately.
///
/// The handle is move-only and `get` consumes it, so the single-use
/// contract is enforced at compile time.
pub struct TaskHandle {
    slot: Arc<Slot>,
    valid: bool,
}

impl TaskHandle {
    /// Create a valid handle plus the delivery side the pool retains.
    pub(crate) fn accepted() -> (TaskHandle, ResultSlot) {
        let slot = Arc::new(Slot {
            ready: CountingSignal::new(),
            value: Mutex::new(None),
        });
        let handle = TaskHandle {
            slot: Arc::clone(&slot),
            valid: true,
        };
        (handle, ResultSlot { slot })
    }

    /// Create a handle marking a rejected submission.
    pub(crate) fn rejected() -> TaskHandle {
        TaskHandle {
            slot: Arc::new(Slot {
                ready: CountingSignal::new(),
                value: Mutex::new(None),
            }),
            valid: false,
        }
    }

    /// Whether the submission behind this handle was accepted.
    pub fn is_valid(&self) -> bool {
        self.valid
    }

    /// Retrieve the task's result, blocking until it has been delivered.
    ///
    /// Returns an empty [`ValueBox`] immediately if the handle is rejected.
    pub fn get(self) -> ValueBox {
        if !self.valid {
            return ValueBox::empty();
        }
        self.slot.ready.acquire();
        self.slot.value.lock().take().unwrap_or_else(ValueBox::empty)
    }
}

impl fmt::Debug for TaskHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TaskHandle")
            .field("valid", &self.valid)
            .finish()
    }
}

/// Delivery side of a [`TaskHandle`], held by the pool until the paired
/// task has executed.
///
/// Delivery happens exactly once, performed by the worker that ran the
/// task; the task itself never holds a reference to its handle.
pub(crate) struct ResultSlot {
    slot: Arc<Slot>,
}

impl ResultSlot {
    /// Store the value and wake the handle's owner.
    pub(crate) fn deliver(self, value: ValueBox) {
        *self.slot.value.lock() = Some(value);
        self.slot.ready.release();
    }
}
