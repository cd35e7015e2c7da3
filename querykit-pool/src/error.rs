//! Errors reported by the worker pool.

use thiserror::Error;

/// Boxed error returned by an operation.
pub type BoxError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// Result type for pool calls.
pub type PoolResult<T> = Result<T, PoolError>;

/// Errors surfaced by [`WorkerPool`](crate::WorkerPool).
///
/// `Stopped` is a pool-state error returned synchronously by `submit`; the
/// other variants describe operation failures and are collected by `wait`.
#[derive(Error, Debug)]
pub enum PoolError {
    /// The pool no longer accepts work.
    #[error("pool stopped, cannot submit new jobs")]
    Stopped,

    /// An operation returned an error.
    #[error("operation failed in worker {worker}: {source}")]
    Operation {
        /// Worker that ran the operation.
        worker: usize,
        /// The operation's own error.
        #[source]
        source: BoxError,
    },

    /// An operation panicked.
    #[error("operation panicked in worker {worker}: {message}")]
    Panicked {
        /// Worker that ran the operation.
        worker: usize,
        /// Panic payload, when it was a string.
        message: String,
    },
}

impl PoolError {
    /// Check if this is the pool-state error from a late `submit`.
    pub fn is_stopped(&self) -> bool {
        matches!(self, Self::Stopped)
    }

    /// Check if this error came from running an operation.
    pub fn is_operation_failure(&self) -> bool {
        matches!(self, Self::Operation { .. } | Self::Panicked { .. })
    }

    /// The worker that observed the failure, if any.
    pub fn worker(&self) -> Option<usize> {
        match self {
            Self::Operation { worker, .. } | Self::Panicked { worker, .. } => Some(*worker),
            Self::Stopped => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_stopped_is_distinct() {
        let err = PoolError::Stopped;
        assert!(err.is_stopped());
        assert!(!err.is_operation_failure());
        assert_eq!(err.worker(), None);
    }

    #[test]
    fn test_operation_error_keeps_source() {
        let err = PoolError::Operation {
            worker: 3,
            source: "row 7 rejected".into(),
        };
        assert!(err.is_operation_failure());
        assert_eq!(err.worker(), Some(3));
        assert_eq!(err.to_string(), "operation failed in worker 3: row 7 rejected");
        assert!(std::error::Error::source(&err).is_some());
    }
}
