//! Background soft-delete pipeline.
//!
//! Callers push [`DeleteRequest`]s into a bounded queue and return
//! immediately. A single worker owns the tombstone mutation: it groups
//! requests into batches of up to `batch_size` and applies each batch with one
//! [`UrlRepository::delete_batch`] call. When the queue closes, the partial
//! batch is flushed before the worker exits.
//!
//! Delivery is best effort. A batch that fails is logged and dropped.

use std::sync::Arc;

use metrics::counter;
use tokio::sync::mpsc;
use tokio::task::{JoinError, JoinHandle};
use tracing::{debug, error, info};

use crate::domain::delete_request::DeleteRequest;
use crate::domain::repositories::UrlRepository;
use crate::error::StorageError;

/// Requests accumulated before a flush.
pub const DEFAULT_BATCH_SIZE: usize = 1000;

/// Requests buffered before producers start waiting.
pub const DEFAULT_QUEUE_CAPACITY: usize = 10_000;

/// Consumes `rx` until every sender is dropped.
///
/// Requests are applied in the order they were enqueued.
pub async fn drain<R>(repository: &R, mut rx: mpsc::Receiver<DeleteRequest>, batch_size: usize)
where
    R: UrlRepository + ?Sized,
{
    let batch_size = batch_size.max(1);
    let mut batch = Vec::with_capacity(batch_size.min(DEFAULT_BATCH_SIZE));

    while let Some(request) = rx.recv().await {
        if request.is_empty() {
            continue;
        }

        batch.push(request);

        if batch.len() >= batch_size {
            flush(repository, std::mem::take(&mut batch)).await;
        }
    }

    if !batch.is_empty() {
        flush(repository, batch).await;
    }

    debug!("Delete queue closed, worker exiting");
}

async fn flush<R>(repository: &R, batch: Vec<DeleteRequest>)
where
    R: UrlRepository + ?Sized,
{
    let requests = batch.len();

    match repository.delete_batch(batch).await {
        Ok(flipped) => {
            counter!("delete_batches_flushed_total").increment(1);
            counter!("urls_tombstoned_total").increment(flipped);
            debug!(requests, flipped, "Delete batch applied");
        }
        Err(e) => {
            counter!("delete_batches_failed_total").increment(1);
            error!(requests, error = %e, "Delete batch failed, dropping it");
        }
    }
}

/// Producer handle of the delete pipeline.
///
/// Cheap to clone; one clone per request handler is fine. The pipeline only
/// finishes draining once every clone has been dropped.
#[derive(Debug, Clone)]
pub struct DeleteQueue {
    tx: mpsc::Sender<DeleteRequest>,
}

impl DeleteQueue {
    /// Enqueues a request, waiting for room when the queue is full.
    ///
    /// # Errors
    ///
    /// Returns [`StorageError::QueueClosed`] if the worker has stopped.
    pub async fn enqueue(&self, request: DeleteRequest) -> Result<(), StorageError> {
        self.tx
            .send(request)
            .await
            .map_err(|_| StorageError::QueueClosed)
    }

    /// Shorthand for enqueueing `codes` on behalf of `user_id`.
    pub async fn delete_urls(&self, user_id: &str, codes: Vec<i64>) -> Result<(), StorageError> {
        self.enqueue(DeleteRequest::new(user_id, codes)).await
    }
}

/// The delete queue together with its worker task.
pub struct DeletePipeline {
    queue: DeleteQueue,
    worker: JoinHandle<()>,
}

impl DeletePipeline {
    /// Starts the worker for `repository` on the current Tokio runtime.
    pub fn spawn<R>(repository: Arc<R>, capacity: usize, batch_size: usize) -> Self
    where
        R: UrlRepository + ?Sized + 'static,
    {
        let (tx, rx) = mpsc::channel(capacity.max(1));

        let worker = tokio::spawn(async move {
            repository.delete_for_user(rx, batch_size).await;
        });
        info!(capacity, batch_size, "Delete worker started");

        Self {
            queue: DeleteQueue { tx },
            worker,
        }
    }

    /// Returns a producer handle.
    pub fn queue(&self) -> DeleteQueue {
        self.queue.clone()
    }

    /// Closes the queue and waits for the final flush.
    ///
    /// Producers must have dropped their [`DeleteQueue`] clones, otherwise the
    /// queue stays open and this waits for them.
    ///
    /// # Errors
    ///
    /// Returns the [`JoinError`] if the worker panicked.
    pub async fn shutdown(self) -> Result<(), JoinError> {
        drop(self.queue);
        self.worker.await?;
        info!("Delete worker stopped");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::repositories::MockUrlRepository;
    use std::time::Duration;

    fn request(user: &str, code: i64) -> DeleteRequest {
        DeleteRequest::new(user, vec![code])
    }

    async fn run_with(mock: MockUrlRepository, requests: Vec<DeleteRequest>, batch_size: usize) {
        let (tx, rx) = mpsc::channel(requests.len().max(1));
        for r in requests {
            tx.send(r).await.unwrap();
        }
        drop(tx);

        drain(&mock, rx, batch_size).await;
    }

    #[tokio::test]
    async fn test_flushes_full_batches_and_remainder() {
        let mut mock = MockUrlRepository::new();

        mock.expect_delete_batch()
            .withf(|batch| batch.len() == 3)
            .times(1)
            .returning(|batch| Ok(batch.len() as u64));
        mock.expect_delete_batch()
            .withf(|batch| batch.len() == 1)
            .times(1)
            .returning(|_| Ok(1));

        let requests = (1..=4).map(|code| request("user-1", code)).collect();
        run_with(mock, requests, 3).await;
    }

    #[tokio::test]
    async fn test_partial_batch_flushed_once_on_close() {
        let mut mock = MockUrlRepository::new();

        mock.expect_delete_batch()
            .withf(|batch| {
                batch.iter().map(|r| r.codes[0]).collect::<Vec<_>>() == vec![10, 11, 12]
            })
            .times(1)
            .returning(|_| Ok(3));

        let requests = vec![
            request("user-1", 10),
            request("user-2", 11),
            request("user-1", 12),
        ];
        run_with(mock, requests, DEFAULT_BATCH_SIZE).await;
    }

    #[tokio::test]
    async fn test_no_flush_when_nothing_queued() {
        let mut mock = MockUrlRepository::new();
        mock.expect_delete_batch().times(0);

        run_with(mock, Vec::new(), 10).await;
    }

    #[tokio::test]
    async fn test_empty_requests_are_skipped() {
        let mut mock = MockUrlRepository::new();
        mock.expect_delete_batch()
            .withf(|batch| batch.len() == 1)
            .times(1)
            .returning(|_| Ok(1));

        let requests = vec![DeleteRequest::new("user-1", vec![]), request("user-1", 1)];
        run_with(mock, requests, 10).await;
    }

    #[tokio::test]
    async fn test_failed_batch_is_dropped_and_worker_continues() {
        let mut mock = MockUrlRepository::new();

        mock.expect_delete_batch()
            .withf(|batch| batch[0].codes == vec![1])
            .times(1)
            .returning(|_| Err(StorageError::unavailable("connection reset")));
        mock.expect_delete_batch()
            .withf(|batch| batch[0].codes == vec![2])
            .times(1)
            .returning(|_| Ok(1));

        let requests = vec![request("user-1", 1), request("user-1", 2)];
        run_with(mock, requests, 1).await;
    }

    #[tokio::test]
    async fn test_zero_batch_size_treated_as_one() {
        let mut mock = MockUrlRepository::new();
        mock.expect_delete_batch()
            .withf(|batch| batch.len() == 1)
            .times(2)
            .returning(|_| Ok(1));

        let requests = vec![request("user-1", 1), request("user-1", 2)];
        run_with(mock, requests, 0).await;
    }

    #[tokio::test(start_paused = true)]
    async fn test_enqueue_waits_when_full() {
        let (tx, _rx) = mpsc::channel(1);
        let queue = DeleteQueue { tx };

        queue.delete_urls("user-1", vec![1]).await.unwrap();

        let blocked =
            tokio::time::timeout(Duration::from_secs(30), queue.delete_urls("user-1", vec![2]))
                .await;
        assert!(blocked.is_err(), "second enqueue should wait for capacity");
    }

    #[tokio::test]
    async fn test_enqueue_after_worker_gone() {
        let (tx, rx) = mpsc::channel(1);
        drop(rx);
        let queue = DeleteQueue { tx };

        let result = queue.delete_urls("user-1", vec![1]).await;
        assert!(matches!(result, Err(StorageError::QueueClosed)));
    }

    #[tokio::test]
    async fn test_pipeline_shutdown_joins_worker() {
        let mut mock = MockUrlRepository::new();
        mock.expect_delete_for_user()
            .times(1)
            .returning(|_, _| ());

        let pipeline = DeletePipeline::spawn(Arc::new(mock), 4, 2);
        let queue = pipeline.queue();
        drop(queue);

        pipeline.shutdown().await.unwrap();
    }
}
