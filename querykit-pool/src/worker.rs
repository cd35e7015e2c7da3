//! A single executor pulling operations from the shared queue.

use std::any::Any;
use std::panic::AssertUnwindSafe;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, AtomicUsize, Ordering};

use futures::FutureExt;
use tokio::sync::{Mutex, mpsc};
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{debug, trace};

use crate::error::PoolError;
use crate::operation::Operation;

/// Receiving end of the job queue, shared by every worker.
pub(crate) type SharedJobs = Arc<Mutex<mpsc::Receiver<Operation>>>;

/// Counters shared between the workers and the pool.
#[derive(Debug, Default)]
pub(crate) struct WorkerCounters {
    pub(crate) completed: AtomicU64,
    pub(crate) active: AtomicUsize,
}

pub(crate) struct Worker {
    id: usize,
    jobs: SharedJobs,
    errors: mpsc::Sender<PoolError>,
    stop: CancellationToken,
    counters: Arc<WorkerCounters>,
}

impl Worker {
    pub(crate) fn new(
        id: usize,
        jobs: SharedJobs,
        errors: mpsc::Sender<PoolError>,
        stop: CancellationToken,
        counters: Arc<WorkerCounters>,
    ) -> Self {
        Self {
            id,
            jobs,
            errors,
            stop,
            counters,
        }
    }

    pub(crate) fn spawn(self) -> JoinHandle<()> {
        self.counters.active.fetch_add(1, Ordering::SeqCst);
        tokio::spawn(self.run())
    }

    async fn run(self) {
        loop {
            let next = tokio::select! {
                biased;
                _ = self.stop.cancelled() => {
                    debug!(worker = self.id, "Worker stopped");
                    break;
                }
                job = self.next_job() => job,
            };

            let Some(job) = next else {
                trace!(worker = self.id, "Job queue closed");
                break;
            };

            // Once delivered, an operation runs to completion.
            let failure = match AssertUnwindSafe(job).catch_unwind().await {
                Ok(Ok(())) => {
                    self.counters.completed.fetch_add(1, Ordering::SeqCst);
                    None
                }
                Ok(Err(source)) => Some(PoolError::Operation {
                    worker: self.id,
                    source,
                }),
                Err(payload) => Some(PoolError::Panicked {
                    worker: self.id,
                    message: panic_message(payload.as_ref()),
                }),
            };

            if let Some(err) = failure {
                debug!(worker = self.id, error = %err, "Worker exiting after failure");
                // capacity covers one error per worker
                let _ = self.errors.send(err).await;
                break;
            }
        }
        self.counters.active.fetch_sub(1, Ordering::SeqCst);
    }

    async fn next_job(&self) -> Option<Operation> {
        let mut jobs = self.jobs.lock().await;
        jobs.recv().await
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        (*s).to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "non-string panic payload".to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_panic_message() {
        let payload: Box<dyn Any + Send> = Box::new("boom");
        assert_eq!(panic_message(payload.as_ref()), "boom");

        let payload: Box<dyn Any + Send> = Box::new(String::from("owned boom"));
        assert_eq!(panic_message(payload.as_ref()), "owned boom");

        let payload: Box<dyn Any + Send> = Box::new(7_u8);
        assert_eq!(panic_message(payload.as_ref()), "non-string panic payload");
    }
}
