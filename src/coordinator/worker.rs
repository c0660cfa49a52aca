//! Page worker — pulls page indices, fetches each with retry, reports the outcome.

use std::sync::Arc;

use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;

use crate::error::Error;
use crate::fetcher::{PageFetcher, PageRequest};
use crate::retry::{RetryPolicy, fetch_with_retry};

/// Everything one worker task owns
pub(super) struct WorkerParams<T, F: ?Sized> {
    pub(super) worker_id: usize,
    pub(super) pages: async_channel::Receiver<u64>,
    pub(super) results: mpsc::Sender<Vec<T>>,
    pub(super) errors: mpsc::Sender<Error>,
    pub(super) fetcher: Arc<F>,
    pub(super) cancel: CancellationToken,
    pub(super) page_size: u64,
    pub(super) policy: RetryPolicy,
}

/// Run one worker until the page queue is drained and closed.
///
/// A page that exhausts its retries is reported once on `errors` and the worker
/// stops pulling. Other workers are not told; they finish the page they hold.
pub(super) async fn run_worker<T, F>(params: WorkerParams<T, F>)
where
    T: Send + 'static,
    F: PageFetcher<T> + ?Sized,
{
    let WorkerParams {
        worker_id,
        pages,
        results,
        errors,
        fetcher,
        cancel,
        page_size,
        policy,
    } = params;
    let fetcher: &F = &fetcher;
    let mut fetched = 0usize;

    while let Ok(page) = pages.recv().await {
        let request = PageRequest::new(page, page_size);

        match fetch_with_retry(&policy, || fetcher.fetch_page(&cancel, request)).await {
            Ok(body) => {
                fetched += 1;
                tracing::debug!(
                    worker_id,
                    page,
                    items = body.items().len(),
                    "Page fetched"
                );
                // Receiver gone means the coordinator already returned
                if results.send(body.into_items()).await.is_err() {
                    tracing::debug!(worker_id, page, "Result dropped, coordinator finished");
                    return;
                }
            }
            Err(exhausted) => {
                tracing::error!(
                    worker_id,
                    page,
                    attempts = exhausted.attempts,
                    error = %exhausted.last_error,
                    "Page failed after all retry attempts"
                );
                let _ = errors
                    .send(Error::PageExhaustedRetries {
                        page,
                        attempts: exhausted.attempts,
                        source: exhausted.last_error,
                    })
                    .await;
                return;
            }
        }
    }

    tracing::debug!(worker_id, pages = fetched, "Page queue drained, worker exiting");
}
