//! Error types for the task pool

/// Result type for task pool operations
pub type Result<T> = std::result::Result<T, PoolError>;

/// Errors that can occur in the task pool
#[derive(Debug, thiserror::Error)]
#[non_exhaustive]
pub enum PoolError {
    /// Pool has already been started
    #[error("Pool '{pool_name}' is already running with {worker_count} workers")]
    AlreadyRunning {
        /// Name of the pool
        pool_name: String,
        /// Number of worker threads
        worker_count: usize,
    },

    /// Pool is not running
    #[error("Pool '{pool_name}' is not running")]
    NotRunning {
        /// Name of the pool
        pool_name: String,
    },

    /// Failed to spawn a worker thread
    #[error("Failed to spawn worker thread #{worker_id}: {message}")]
    Spawn {
        /// ID of the worker that failed to spawn
        worker_id: usize,
        /// Error message
        message: String,
        /// Source IO error
        #[source]
        source: Option<std::io::Error>,
    },

    /// Failed to join a worker thread
    #[error("Failed to join worker thread #{worker_id}: {message}")]
    Join {
        /// ID of the worker that failed to join
        worker_id: usize,
        /// Error message
        message: String,
    },

    /// Invalid configuration with parameter
    #[error("Invalid configuration for '{parameter}': {message}")]
    InvalidConfig {
        /// Configuration parameter name
        parameter: String,
        /// Error message
        message: String,
    },

    /// Value extraction requested a type different from the one stored
    #[error("Type mismatch: expected '{expected}', box holds '{actual}'")]
    TypeMismatch {
        /// Type the caller asked for
        expected: &'static str,
        /// Type actually stored in the box
        actual: &'static str,
    },

    /// Value extraction on an empty box
    #[error("Value box is empty")]
    EmptyValue,
}

impl PoolError {
    /// Create an already running error
    pub fn already_running(pool_name: impl Into<String>, worker_count: usize) -> Self {
        PoolError::AlreadyRunning {
            pool_name: pool_name.into(),
            worker_count,
        }
    }

    /// Create a not running error
    pub fn not_running(pool_name: impl Into<String>) -> Self {
        PoolError::NotRunning {
            pool_name: pool_name.into(),
        }
    }

    /// Create a spawn error
    pub fn spawn(worker_id: usize, message: impl Into<String>) -> Self {
        PoolError::Spawn {
            worker_id,
            message: message.into(),
            source: None,
        }
    }

    /// Create a spawn error with source
    pub fn spawn_with_source(
        worker_id: usize,
        message: impl Into<String>,
        source: std::io::Error,
    ) -> Self {
        PoolError::Spawn {
            worker_id,
            message: message.into(),
            source: Some(source),
        }
    }

    /// Create a join error
    pub fn join(worker_id: usize, message: impl Into<String>) -> Self {
        PoolError::Join {
            worker_id,
            message: message.into(),
        }
    }

    /// Create an invalid config error
    pub fn invalid_config(parameter: impl Into<String>, message: impl Into<String>) -> Self {
        PoolError::InvalidConfig {
            parameter: parameter.into(),
            message: message.into(),
        }
    }

    /// Create a type mismatch error
    pub fn type_mismatch(expected: &'static str, actual: &'static str) -> Self {
        PoolError::TypeMismatch { expected, actual }
    }
}
