//! Batch writes against a store collaborator.
//!
//! [`update_batch`] writes one record per pool operation, concurrently, and
//! stops at the first failure. [`create_batch`] inserts records in fixed-size
//! chunks, sequentially, and also stops at the first failure. Neither rolls
//! back records already written; transactions belong to the collaborator.

use std::sync::Arc;

use async_trait::async_trait;
use querykit_pool::{BoxError, PoolConfig, WorkerPool};
use tracing::{debug, warn};

use crate::config::BatchConfig;
use crate::error::{KitError, KitResult};

/// Records per insert when no chunk size is given.
pub const DEFAULT_CHUNK_SIZE: usize = 5;

/// Writes a single record.
#[async_trait]
pub trait RecordUpdater<R>: Send + Sync + 'static
where
    R: Send + 'static,
{
    /// Update one record, keyed however the store sees fit.
    async fn update(&self, record: R) -> Result<(), BoxError>;
}

/// Inserts a chunk of records into a table.
#[async_trait]
pub trait BatchInserter<R>: Send + Sync
where
    R: Sync,
{
    async fn insert_chunk(&self, table: &str, records: &[R]) -> Result<(), BoxError>;
}

/// Update every record with the default pool sizing.
pub async fn update_batch<R, U>(updater: Arc<U>, records: Vec<R>) -> KitResult<()>
where
    R: Send + 'static,
    U: RecordUpdater<R>,
{
    update_batch_with(updater, records, &PoolConfig::default()).await
}

/// Update every record on a worker pool sized by `config`.
///
/// An unset queue capacity is sized to the batch. Submission stops as soon
/// as the pool refuses work; the first recorded failure is returned.
pub async fn update_batch_with<R, U>(
    updater: Arc<U>,
    records: Vec<R>,
    config: &PoolConfig,
) -> KitResult<()>
where
    R: Send + 'static,
    U: RecordUpdater<R>,
{
    if records.is_empty() {
        return Ok(());
    }

    let total = records.len();
    let mut pool = WorkerPool::with_config(config, total);
    pool.start();

    let mut refused = None;
    for record in records {
        let updater = Arc::clone(&updater);
        if let Err(err) = pool.submit(async move { updater.update(record).await }).await {
            debug!(error = %err, "Batch submission refused");
            pool.stop();
            refused = Some(err);
            break;
        }
    }

    let mut errors = pool.wait().await.into_iter();
    match (errors.next(), refused) {
        (Some(first), _) => {
            let failed = 1 + errors.count();
            warn!(total, failed, "Batch update failed");
            Err(KitError::BatchUpdate {
                failed,
                source: first,
            })
        }
        (None, Some(err)) => Err(KitError::Pool(err)),
        (None, None) => {
            debug!(total, "Batch update finished");
            Ok(())
        }
    }
}

/// Insert `records` into `table` using the `[batch]` config section.
pub async fn create_batch_with<R, I>(
    inserter: &I,
    table: &str,
    records: &[R],
    config: &BatchConfig,
) -> KitResult<()>
where
    R: Sync,
    I: BatchInserter<R> + ?Sized,
{
    create_batch(inserter, table, records, Some(config.chunk_size)).await
}

/// Insert `records` into `table`, `chunk_size` at a time.
///
/// `None` uses [`DEFAULT_CHUNK_SIZE`]; zero is raised to one. Chunks are
/// inserted in order and the first failing chunk aborts the rest.
pub async fn create_batch<R, I>(
    inserter: &I,
    table: &str,
    records: &[R],
    chunk_size: Option<usize>,
) -> KitResult<()>
where
    R: Sync,
    I: BatchInserter<R> + ?Sized,
{
    if records.is_empty() {
        return Ok(());
    }

    let size = chunk_size.unwrap_or(DEFAULT_CHUNK_SIZE).max(1);
    for (chunk, records) in records.chunks(size).enumerate() {
        inserter
            .insert_chunk(table, records)
            .await
            .map_err(|source| {
                warn!(table, chunk, error = %source, "Batch insert failed");
                KitError::BatchInsert { chunk, source }
            })?;
    }

    debug!(table, records = records.len(), size, "Batch insert finished");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use parking_lot::Mutex;

    #[derive(Default)]
    struct Recorder {
        chunks: Mutex<Vec<Vec<u32>>>,
        fail_on: Option<usize>,
    }

    #[async_trait]
    impl BatchInserter<u32> for Recorder {
        async fn insert_chunk(&self, _table: &str, records: &[u32]) -> Result<(), BoxError> {
            let mut chunks = self.chunks.lock();
            if self.fail_on == Some(chunks.len()) {
                return Err("duplicate key".into());
            }
            chunks.push(records.to_vec());
            Ok(())
        }
    }

    #[tokio::test]
    async fn test_create_batch_default_chunks() {
        let recorder = Recorder::default();
        let records: Vec<u32> = (0..12).collect();
        create_batch(&recorder, "items", &records, None).await.unwrap();

        let sizes: Vec<usize> = recorder.chunks.lock().iter().map(Vec::len).collect();
        assert_eq!(sizes, vec![5, 5, 2]);
    }

    #[tokio::test]
    async fn test_create_batch_stops_at_failed_chunk() {
        let recorder = Recorder {
            fail_on: Some(1),
            ..Default::default()
        };
        let records: Vec<u32> = (0..9).collect();
        let err = create_batch(&recorder, "items", &records, Some(3)).await.unwrap_err();

        assert!(matches!(err, KitError::BatchInsert { chunk: 1, .. }));
        assert_eq!(recorder.chunks.lock().len(), 1);
    }

    #[tokio::test]
    async fn test_create_batch_with_config_chunk_size() {
        let recorder = Recorder::default();
        let records: Vec<u32> = (0..7).collect();
        let config = BatchConfig { chunk_size: 4 };
        create_batch_with(&recorder, "items", &records, &config).await.unwrap();

        let sizes: Vec<usize> = recorder.chunks.lock().iter().map(Vec::len).collect();
        assert_eq!(sizes, vec![4, 3]);
    }

    #[tokio::test]
    async fn test_create_batch_empty_is_noop() {
        let recorder = Recorder {
            fail_on: Some(0),
            ..Default::default()
        };
        create_batch(&recorder, "items", &[] as &[u32], Some(0)).await.unwrap();
    }
}
