//! Fail-fast worker pool.
//!
//! A [`WorkerPool`] runs operations on a fixed number of workers fed from one
//! bounded FIFO queue. The first failed operation stops the pool: no further
//! job is handed to a worker, queued jobs are abandoned, and jobs already
//! running finish. [`WorkerPool::wait`] returns every error that was observed.
//!
//! ```rust
//! use querykit_pool::WorkerPool;
//!
//! # #[tokio::main(flavor = "current_thread")]
//! # async fn main() {
//! let mut pool = WorkerPool::new(2, 8);
//! pool.start();
//!
//! for id in 0..4 {
//!     pool.submit(async move {
//!         if id == 99 {
//!             return Err("unreachable");
//!         }
//!         Ok(())
//!     })
//!     .await
//!     .unwrap();
//! }
//!
//! let errors = pool.wait().await;
//! assert!(errors.is_empty());
//! # }
//! ```
//!
//! There is no timeout: an operation that never completes keeps its worker,
//! and therefore `wait`, blocked.

use std::future::Future;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use parking_lot::Mutex;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, warn};

use crate::config::PoolConfig;
use crate::error::{BoxError, PoolError, PoolResult};
use crate::operation::{Operation, operation};
use crate::worker::{SharedJobs, Worker, WorkerCounters};

/// Lifecycle of a pool.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PoolState {
    /// Built but no worker launched.
    Created,
    /// Workers are accepting jobs.
    Running,
    /// Stop was broadcast, some workers are still finishing.
    Stopping,
    /// Stop was broadcast and every worker has exited.
    Stopped,
}

/// State reachable from workers, the watcher and submitters.
struct Shared {
    jobs_tx: Mutex<Option<mpsc::Sender<Operation>>>,
    stop: CancellationToken,
    stopping: AtomicBool,
    errors: Mutex<Vec<PoolError>>,
}

impl Shared {
    /// Broadcast stop and close the queue, once.
    fn stop(&self) {
        if self.stopping.swap(true, Ordering::SeqCst) {
            return;
        }
        self.stop.cancel();
        self.close_queue();
        info!("Worker pool stopping");
    }

    fn close_queue(&self) {
        self.jobs_tx.lock().take();
    }
}

/// A fixed set of workers sharing one bounded job queue.
pub struct WorkerPool {
    workers: usize,
    shared: Arc<Shared>,
    jobs_rx: SharedJobs,
    errors_tx: Option<mpsc::Sender<PoolError>>,
    errors_rx: Option<mpsc::Receiver<PoolError>>,
    handles: Vec<JoinHandle<()>>,
    watcher: Option<JoinHandle<()>>,
    counters: Arc<WorkerCounters>,
}

impl WorkerPool {
    /// Create a pool with `worker_count` workers and a queue of
    /// `queue_capacity` jobs. Zero sizes are raised to one.
    pub fn new(worker_count: usize, queue_capacity: usize) -> Self {
        Self::with_config(&PoolConfig::new(worker_count, queue_capacity), queue_capacity)
    }

    /// Create a pool from configuration, sizing an unset queue to `records`.
    pub fn with_config(config: &PoolConfig, records: usize) -> Self {
        let workers = config.effective_workers();
        let capacity = config.effective_capacity(records);

        let (jobs_tx, jobs_rx) = mpsc::channel(capacity);
        let (errors_tx, errors_rx) = mpsc::channel(workers);

        debug!(workers, capacity, "Created worker pool");

        Self {
            workers,
            shared: Arc::new(Shared {
                jobs_tx: Mutex::new(Some(jobs_tx)),
                stop: CancellationToken::new(),
                stopping: AtomicBool::new(false),
                errors: Mutex::new(Vec::new()),
            }),
            jobs_rx: Arc::new(tokio::sync::Mutex::new(jobs_rx)),
            errors_tx: Some(errors_tx),
            errors_rx: Some(errors_rx),
            handles: Vec::with_capacity(workers),
            watcher: None,
            counters: Arc::new(WorkerCounters::default()),
        }
    }

    /// Launch the workers and the error watcher.
    ///
    /// Must be called from within a Tokio runtime. Calling it again does
    /// nothing.
    pub fn start(&mut self) {
        let (Some(errors_tx), Some(mut errors_rx)) = (self.errors_tx.as_ref(), self.errors_rx.take())
        else {
            return;
        };

        for id in 0..self.workers {
            let worker = Worker::new(
                id,
                Arc::clone(&self.jobs_rx),
                errors_tx.clone(),
                self.shared.stop.clone(),
                Arc::clone(&self.counters),
            );
            self.handles.push(worker.spawn());
        }

        let shared = Arc::clone(&self.shared);
        self.watcher = Some(tokio::spawn(async move {
            while let Some(err) = errors_rx.recv().await {
                warn!(error = %err, "Operation failed");
                shared.errors.lock().push(err);
                shared.stop();
            }
        }));

        info!(workers = self.workers, "Worker pool started");
    }

    /// Queue an operation.
    ///
    /// Waits while the queue is full. Returns [`PoolError::Stopped`] if the
    /// pool stops before or while waiting.
    pub async fn submit<F, E>(&self, op: F) -> PoolResult<()>
    where
        F: Future<Output = Result<(), E>> + Send + 'static,
        E: Into<BoxError>,
    {
        self.submit_operation(operation(op)).await
    }

    /// Queue an already boxed operation.
    pub async fn submit_operation(&self, op: Operation) -> PoolResult<()> {
        if self.shared.stop.is_cancelled() {
            return Err(PoolError::Stopped);
        }
        let Some(sender) = self.shared.jobs_tx.lock().clone() else {
            return Err(PoolError::Stopped);
        };

        tokio::select! {
            biased;
            _ = self.shared.stop.cancelled() => Err(PoolError::Stopped),
            sent = sender.send(op) => sent.map_err(|_| PoolError::Stopped),
        }
    }

    /// Broadcast stop and close the queue. Idempotent.
    pub fn stop(&self) {
        self.shared.stop();
    }

    /// Check if stop has been broadcast.
    pub fn is_stopped(&self) -> bool {
        self.shared.stop.is_cancelled()
    }

    /// Resolve once stop has been broadcast.
    pub async fn stopped(&self) {
        self.shared.stop.cancelled().await;
    }

    /// Current lifecycle state.
    pub fn state(&self) -> PoolState {
        let started = self.errors_rx.is_none();
        let active = self.counters.active.load(Ordering::SeqCst);
        match (started, self.is_stopped(), active) {
            (false, false, _) => PoolState::Created,
            (_, false, _) => PoolState::Running,
            (_, true, 0) => PoolState::Stopped,
            (_, true, _) => PoolState::Stopping,
        }
    }

    /// Number of configured workers.
    pub fn worker_count(&self) -> usize {
        self.workers
    }

    /// Number of operations that finished successfully so far.
    pub fn completed(&self) -> u64 {
        self.counters.completed.load(Ordering::SeqCst)
    }

    /// Close the queue, wait for every worker to exit, and return all
    /// errors in the order they were observed.
    ///
    /// Without a failure, workers first drain the jobs still queued. A pool
    /// that was never started is started here so queued jobs still run.
    pub async fn wait(mut self) -> Vec<PoolError> {
        if self.errors_rx.is_some() {
            self.start();
        }
        self.shared.close_queue();
        self.errors_tx.take();

        for handle in self.handles.drain(..) {
            if let Err(err) = handle.await {
                error!(error = %err, "Worker task ended abnormally");
            }
        }
        if let Some(watcher) = self.watcher.take() {
            if let Err(err) = watcher.await {
                error!(error = %err, "Error watcher ended abnormally");
            }
        }

        let errors = std::mem::take(&mut *self.shared.errors.lock());
        info!(
            completed = self.completed(),
            failed = errors.len(),
            "Worker pool finished"
        );
        errors
    }
}

impl Drop for WorkerPool {
    fn drop(&mut self) {
        // a pool dropped without `wait` must not leave workers parked
        self.shared.stop.cancel();
        self.shared.close_queue();
    }
}

impl std::fmt::Debug for WorkerPool {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("WorkerPool")
            .field("workers", &self.workers)
            .field("state", &self.state())
            .field("completed", &self.completed())
            .finish()
    }
}
