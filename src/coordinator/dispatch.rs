//! Fan-out of the remaining pages onto a fixed worker pool.
//!
//! All three channels are sized to the number of remaining pages, so neither a
//! worker nor the finalizer can block on a send after the merge loop has stopped
//! reading.

use std::ops::RangeInclusive;
use std::sync::Arc;

use futures::future::join_all;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

use crate::config::FetchConfig;
use crate::error::Error;
use crate::fetcher::PageFetcher;

use super::worker::{WorkerParams, run_worker};

/// Receiving ends of a running fan-out, consumed by the merge loop.
pub(super) struct Dispatch<T> {
    pub(super) results: mpsc::Receiver<Vec<T>>,
    pub(super) errors: mpsc::Receiver<Error>,
    _queue: PageQueue,
}

/// Handle on the page queue that empties it when dropped.
///
/// Once the merge loop returns, pages nobody has pulled yet are discarded so
/// idle workers exit at their next pull instead of fetching for no reader.
pub(super) struct PageQueue(async_channel::Receiver<u64>);

impl Drop for PageQueue {
    fn drop(&mut self) {
        let mut abandoned = 0usize;
        while self.0.try_recv().is_ok() {
            abandoned += 1;
        }
        if abandoned > 0 {
            tracing::debug!(abandoned, "Discarded pages not yet dispatched");
        }
    }
}

/// Queue `pages`, start `worker_count` workers and the finalizer.
pub(super) fn dispatch<T, F>(
    config: &FetchConfig,
    cancel: &CancellationToken,
    fetcher: Arc<F>,
    pages: RangeInclusive<u64>,
) -> Dispatch<T>
where
    T: Send + 'static,
    F: PageFetcher<T> + ?Sized + 'static,
{
    let capacity = page_count(&pages);
    let (page_tx, page_rx) = async_channel::bounded(capacity);
    let (result_tx, result_rx) = mpsc::channel(capacity);
    let (error_tx, error_rx) = mpsc::channel(capacity);

    feed_pages(&page_tx, pages);

    let policy = config.retry_policy();
    let handles: Vec<JoinHandle<()>> = (0..config.worker_count)
        .map(|worker_id| {
            tokio::spawn(run_worker(WorkerParams {
                worker_id,
                pages: page_rx.clone(),
                results: result_tx.clone(),
                errors: error_tx.clone(),
                fetcher: Arc::clone(&fetcher),
                cancel: cancel.clone(),
                page_size: config.max_page_size,
                policy,
            }))
        })
        .collect();

    tracing::debug!(
        workers = handles.len(),
        pages = capacity,
        "Dispatched remaining pages"
    );

    // Result channel closes once the last worker drops its sender
    drop(result_tx);
    tokio::spawn(finalize(handles, error_tx));

    Dispatch {
        results: result_rx,
        errors: error_rx,
        _queue: PageQueue(page_rx),
    }
}

fn page_count(pages: &RangeInclusive<u64>) -> usize {
    let count = pages.end().saturating_sub(*pages.start()).saturating_add(1);
    usize::try_from(count).unwrap_or(usize::MAX).max(1)
}

/// Queue every page index, then close the queue.
///
/// The queue is sized to hold every page, so this never waits.
fn feed_pages(queue: &async_channel::Sender<u64>, pages: RangeInclusive<u64>) {
    for page in pages {
        if let Err(e) = queue.try_send(page) {
            tracing::error!(page, error = %e, "Failed to queue page");
            break;
        }
    }
    queue.close();
}

/// Wait for every worker, then report any that died without reporting.
///
/// Dropping `errors` here is what closes the error channel, strictly after all
/// workers have finished.
async fn finalize(handles: Vec<JoinHandle<()>>, errors: mpsc::Sender<Error>) {
    for (worker_id, joined) in join_all(handles).await.into_iter().enumerate() {
        if let Err(e) = joined {
            tracing::error!(worker_id, error = %e, "Page worker panicked");
            let _ = errors.try_send(Error::WorkerPanicked {
                message: e.to_string(),
            });
        }
    }
}

#[allow(clippy::unwrap_used, clippy::expect_used)]
#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn dropping_page_queue_discards_unpulled_pages() {
        let (tx, rx) = async_channel::bounded(8);
        feed_pages(&tx, 2..=6);

        let worker_side = rx.clone();
        assert_eq!(worker_side.try_recv().unwrap(), 2);

        drop(PageQueue(rx));

        assert!(worker_side.is_empty());
        assert!(worker_side.try_recv().is_err());
    }

    #[test]
    fn page_count_covers_range() {
        assert_eq!(page_count(&(2..=5)), 4);
        assert_eq!(page_count(&(7..=7)), 1);
    }
}
