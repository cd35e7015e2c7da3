//! # querykit-pool
//!
//! A bounded, fail-fast worker pool for running many independent writes.
//!
//! - A fixed number of workers pull [`Operation`]s from one bounded queue
//! - The first failed operation stops dispatch pool-wide
//! - Operations already running are never interrupted
//! - [`WorkerPool::wait`] returns every error observed, in order
//!
//! ```rust
//! use std::sync::Arc;
//! use std::sync::atomic::{AtomicUsize, Ordering};
//! use querykit_pool::{BoxError, WorkerPool};
//!
//! # #[tokio::main(flavor = "current_thread")]
//! # async fn main() {
//! let written = Arc::new(AtomicUsize::new(0));
//! let mut pool = WorkerPool::new(4, 16);
//! pool.start();
//!
//! for _ in 0..16 {
//!     let written = Arc::clone(&written);
//!     pool.submit(async move {
//!         written.fetch_add(1, Ordering::SeqCst);
//!         Ok::<_, BoxError>(())
//!     })
//!     .await
//!     .unwrap();
//! }
//!
//! assert!(pool.wait().await.is_empty());
//! assert_eq!(written.load(Ordering::SeqCst), 16);
//! # }
//! ```

pub mod config;
pub mod error;
pub mod operation;
pub mod pool;
mod worker;

pub use config::{DEFAULT_WORKERS, PoolConfig};
pub use error::{BoxError, PoolError, PoolResult};
pub use operation::{Operation, operation};
pub use pool::{PoolState, WorkerPool};
