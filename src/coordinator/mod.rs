//! Bulk fetch coordinator — probes the first page, fans the rest out over a
//! worker pool and merges the results.
//!
//! Split into focused submodules:
//! - [`probe`] - Unretried first-page fetch and remaining-page plan
//! - [`dispatch`] - Page queue, worker pool, finalizer
//! - [`worker`] - Per-page fetch with fixed-interval retry
//! - [`merge`] - Select loop folding batches into the aggregate

mod dispatch;
mod merge;
mod probe;
mod worker;


use std::sync::Arc;
use std::time::Instant;

use tokio_util::sync::CancellationToken;

use crate::config::FetchConfig;
use crate::error::{Error, Result};
use crate::fetcher::PageFetcher;
use crate::types::FetchOutcome;

/// Reusable coordinator holding a validated [`FetchConfig`]
///
/// Holds no state between calls; every [`fetch_all`](BulkFetcher::fetch_all)
/// starts and tears down its own workers.
#[derive(Clone, Debug)]
pub struct BulkFetcher {
    config: FetchConfig,
}

impl BulkFetcher {
    /// Create a coordinator, rejecting an invalid configuration up front
    pub fn new(config: FetchConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self { config })
    }

    /// The configuration in use
    pub fn config(&self) -> &FetchConfig {
        &self.config
    }

    /// Retrieve every page from `fetcher`; see [`fetch_all`]
    pub async fn fetch_all<T, F>(
        &self,
        cancel: &CancellationToken,
        fetcher: F,
    ) -> Result<FetchOutcome<T>>
    where
        T: Send + 'static,
        F: PageFetcher<T> + 'static,
    {
        fetch_all(&self.config, cancel, fetcher).await
    }
}

/// Retrieve every page of a paginated source and merge the items
///
/// 1. Fetches `start_page` once, without retry, to learn the total item count.
///    A failure here returns [`Error::Probe`] with no items.
/// 2. If the total fits in one page, returns the probe items. A total needing
///    more than `max_pages` pages fails with [`Error::InvalidTotal`].
/// 3. Otherwise queues the remaining pages for `worker_count` workers, each
///    retrying a failed page up to `max_retries` times with a fixed
///    `retry_interval` pause.
/// 4. Merges batches behind the probe items as they arrive. The first page to
///    exhaust its retries ends the fetch with [`FetchOutcome::Partial`];
///    cancellation of `cancel` ends it with [`Error::Cancelled`] and no items.
///
/// Items from pages after the first are in arrival order, not page order.
/// Must be called from within a Tokio runtime.
///
/// # Example
///
/// ```no_run
/// use bulk_fetch::{BoxError, FetchConfig, Page, PageRequest, fetch_all, page_fn};
/// use tokio_util::sync::CancellationToken;
///
/// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let fetcher = page_fn(|_cancel, request: PageRequest| async move {
///     // Call the remote source here
///     let items: Vec<u64> = (0..request.page_size).collect();
///     Ok::<_, BoxError>(Page::new(460, items))
/// });
///
/// let outcome = fetch_all(&FetchConfig::default(), &CancellationToken::new(), fetcher).await?;
/// let (items, error) = outcome.into_parts();
/// if let Some(error) = error {
///     eprintln!("kept {} items before: {error}", items.len());
/// }
/// # Ok(())
/// # }
/// ```
pub async fn fetch_all<T, F>(
    config: &FetchConfig,
    cancel: &CancellationToken,
    fetcher: F,
) -> Result<FetchOutcome<T>>
where
    T: Send + 'static,
    F: PageFetcher<T> + 'static,
{
    if let Err(error) = config.validate() {
        tracing::debug!(error = %error, "Rejected fetch configuration");
        return Err(error);
    }
    let started = Instant::now();

    let first = probe::probe(config, cancel, &fetcher).await?;
    let Some(pages) = probe::remaining_pages(config, first.total) else {
        tracing::debug!(
            total = first.total,
            items = first.items.len(),
            "Probe page holds every item"
        );
        return Ok(FetchOutcome::Complete(first.items));
    };

    let planned = first.total.div_ceil(config.max_page_size);
    if planned > config.max_pages {
        tracing::error!(
            page = config.start_page,
            total = first.total,
            planned_pages = planned,
            max_pages = config.max_pages,
            "Probe page reported an implausible total"
        );
        return Err(Error::InvalidTotal {
            page: config.start_page,
            total: first.total,
            max_pages: config.max_pages,
        });
    }

    tracing::debug!(
        total = first.total,
        first_page = *pages.start(),
        last_page = *pages.end(),
        workers = config.worker_count,
        "Fetching remaining pages"
    );

    let mut dispatch = dispatch::dispatch(config, cancel, Arc::new(fetcher), pages);
    let outcome = merge::merge(first.items, &mut dispatch, cancel).await;

    match &outcome {
        Ok(FetchOutcome::Complete(items)) => tracing::info!(
            total = first.total,
            items = items.len(),
            elapsed_ms = started.elapsed().as_millis(),
            "Bulk fetch complete"
        ),
        Ok(FetchOutcome::Partial { items, error }) => tracing::warn!(
            total = first.total,
            items = items.len(),
            error = %error,
            "Bulk fetch stopped early, returning partial results"
        ),
        Err(Error::Cancelled) => tracing::info!(
            elapsed_ms = started.elapsed().as_millis(),
            "Bulk fetch cancelled"
        ),
        Err(error) => tracing::debug!(error = %error, "Bulk fetch failed"),
    }

    outcome
}
