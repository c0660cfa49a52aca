//! Probe fetch of the first page and the remaining-page plan derived from it.

use std::ops::RangeInclusive;

use tokio_util::sync::CancellationToken;

use crate::config::FetchConfig;
use crate::error::{Error, Result};
use crate::fetcher::{PageFetcher, PageRequest};

/// What the probe page told us about the query.
pub(super) struct ProbeResult<T> {
    pub(super) total: u64,
    pub(super) items: Vec<T>,
}

/// Fetch the start page once, without retry.
///
/// Races the fetch against `cancel` so a hung probe still returns promptly.
pub(super) async fn probe<T, F>(
    config: &FetchConfig,
    cancel: &CancellationToken,
    fetcher: &F,
) -> Result<ProbeResult<T>>
where
    F: PageFetcher<T> + ?Sized,
{
    let request = PageRequest::new(config.start_page, config.max_page_size);

    tokio::select! {
        biased;
        _ = cancel.cancelled() => {
            tracing::debug!(page = request.page, "Probe cancelled");
            Err(Error::Cancelled)
        }
        result = fetcher.fetch_page(cancel, request) => match result {
            Ok(page) => {
                tracing::debug!(
                    page = request.page,
                    total = page.total(),
                    items = page.items().len(),
                    "Probe page fetched"
                );
                Ok(ProbeResult {
                    total: page.total(),
                    items: page.into_items(),
                })
            }
            Err(source) => {
                tracing::error!(page = request.page, error = %source, "Probe fetch failed");
                Err(Error::Probe {
                    page: request.page,
                    source,
                })
            }
        }
    }
}

/// Pages still to fetch after the probe, or `None` if the probe covered everything.
///
/// With `n = ceil(total / max_page_size)` pages in total, the remaining pages
/// are the `n - 1` indices following `start_page`.
pub(super) fn remaining_pages(config: &FetchConfig, total: u64) -> Option<RangeInclusive<u64>> {
    if total <= config.max_page_size {
        return None;
    }
    let total_pages = total.div_ceil(config.max_page_size);
    let first = config.start_page.saturating_add(1);
    let last = config.start_page.saturating_add(total_pages - 1);
    Some(first..=last)
}
