//! Error types for the thread pool

/// Result type for thread pool operations
pub type Result<T> = std::result::Result<T, PoolError>;

/// Errors that can occur in the thread pool
#[derive(Debug, thiserror::Error)]
#[non_exhaustive]
pub enum PoolError {
    /// Failed to spawn a worker thread with details
    #[error("Failed to spawn worker thread #{index}: {message}")]
    SpawnError {
        /// Index of the worker that failed to spawn
        index: usize,
        /// Error message
        message: String,
        /// Source IO error
        #[source]
        source: Option<std::io::Error>,
    },

    /// Worker panic observed while joining the thread
    #[error("Worker thread #{index} panicked: {message}")]
    WorkerPanic {
        /// Index of the panicked worker
        index: usize,
        /// Panic message
        message: String,
    },
}

impl PoolError {
    /// Create a spawn error
    pub fn spawn(index: usize, message: impl Into<String>) -> Self {
        PoolError::SpawnError {
            index,
            message: message.into(),
            source: None,
        }
    }

    /// Create a spawn error with source
    pub fn spawn_with_source(
        index: usize,
        message: impl Into<String>,
        source: std::io::Error,
    ) -> Self {
        PoolError::SpawnError {
            index,
            message: message.into(),
            source: Some(source),
        }
    }

    /// Create a worker panic error
    pub fn worker_panic(index: usize, message: impl Into<String>) -> Self {
        PoolError::WorkerPanic {
            index,
            message: message.into(),
        }
    }
}
