//! Type-erased value container with checked extraction

use crate::core::error::{PoolError, Result};
use std::any::Any;
use std::fmt;

/// A container holding a single value of statically unknown type.
///
/// The box records the concrete type at construction and only releases the
/// value to a caller asking for that exact type. It is move-only: a value
/// enters exactly once and leaves exactly once.
///
/// # Example
///
/// ```rust
/// use task_pool::ValueBox;
///
/// let boxed = ValueBox::new(42u64);
/// assert_eq!(boxed.take::<u64>().unwrap(), 42);
///
/// let boxed = ValueBox::new("hello".to_string());
/// assert!(boxed.take::<u64>().is_err());
/// ```
pub struct ValueBox {
    value: Option<Box<dyn Any + Send>>,
    type_name: &'static str,
}

impl ValueBox {
    /// Store a value, remembering its type identity.
    pub fn new<T: Any + Send>(value: T) -> Self {
        Self {
            value: Some(Box::new(value)),
            type_name: std::any::type_name::<T>(),
        }
    }

    /// Create a box holding no value.
    ///
    /// This is the neutral result carried by rejected submissions and by
    /// tasks that panicked before producing a value.
    pub fn empty() -> Self {
        Self {
            value: None,
            type_name: "<empty>",
        }
    }

    /// Whether the box holds a value.
    pub fn is_empty(&self) -> bool {
        self.value.is_none()
    }

    /// Name of the stored type, for diagnostics.
    pub fn stored_type(&self) -> &'static str {
        self.type_name
    }

    /// Extract the stored value, consuming the box.
    ///
    /// # Errors
    ///
    /// - [`PoolError::EmptyValue`] if the box holds no value
    /// - [`PoolError::TypeMismatch`] if `T` differs from the stored type
    pub fn take<T: Any>(mut self) -> Result<T> {
        let boxed = self.value.take().ok_or(PoolError::EmptyValue)?;
        match boxed.downcast::<T>() {
            Ok(value) => Ok(*value),
            Err(_) => Err(PoolError::type_mismatch(
                std::any::type_name::<T>(),
                self.type_name,
            )),
        }
    }
}

impl fmt::Debug for ValueBox {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ValueBox")
            .field("stored_type", &self.type_name)
            .field("is_empty", &self.is_empty())
            .finish()
    }
}
