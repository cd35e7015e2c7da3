//! Pool sizing.

use serde::{Deserialize, Serialize};

/// Default number of workers.
pub const DEFAULT_WORKERS: usize = 5;

/// Configuration for a [`WorkerPool`](crate::WorkerPool).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct PoolConfig {
    /// Number of concurrent workers.
    #[serde(default = "default_workers")]
    pub workers: usize,

    /// Job queue capacity. `None` sizes the queue to the batch.
    #[serde(default)]
    pub queue_capacity: Option<usize>,
}

impl Default for PoolConfig {
    fn default() -> Self {
        Self {
            workers: DEFAULT_WORKERS,
            queue_capacity: None,
        }
    }
}

fn default_workers() -> usize {
    DEFAULT_WORKERS
}

impl PoolConfig {
    /// Create a config with explicit sizes.
    pub fn new(workers: usize, queue_capacity: usize) -> Self {
        Self {
            workers,
            queue_capacity: Some(queue_capacity),
        }
    }

    /// Set the worker count.
    #[must_use]
    pub fn with_workers(mut self, workers: usize) -> Self {
        self.workers = workers;
        self
    }

    /// Set the queue capacity.
    #[must_use]
    pub fn with_queue_capacity(mut self, capacity: usize) -> Self {
        self.queue_capacity = Some(capacity);
        self
    }

    /// Worker count, never below one.
    pub fn effective_workers(&self) -> usize {
        self.workers.max(1)
    }

    /// Queue capacity for a batch of `records`, never below one.
    pub fn effective_capacity(&self, records: usize) -> usize {
        self.queue_capacity.unwrap_or(records).max(1)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = PoolConfig::default();
        assert_eq!(config.effective_workers(), 5);
        assert_eq!(config.effective_capacity(40), 40);
    }

    #[test]
    fn test_zero_sizes_are_clamped() {
        let config = PoolConfig::new(0, 0);
        assert_eq!(config.effective_workers(), 1);
        assert_eq!(config.effective_capacity(10), 1);
        assert_eq!(PoolConfig::default().effective_capacity(0), 1);
    }
}
