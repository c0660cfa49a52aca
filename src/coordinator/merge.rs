//! Merge loop — folds worker batches into the aggregate behind the probe page.

use tokio_util::sync::CancellationToken;

use crate::error::{Error, Result};
use crate::types::FetchOutcome;

use super::dispatch::Dispatch;

/// Collect batches until every worker is done, a page fails, or `cancel` fires.
///
/// `items` arrives holding the probe page. Batches are appended in arrival
/// order, which is not page order. A fatal page error keeps what was merged so
/// far; cancellation discards it.
pub(super) async fn merge<T>(
    mut items: Vec<T>,
    dispatch: &mut Dispatch<T>,
    cancel: &CancellationToken,
) -> Result<FetchOutcome<T>> {
    loop {
        tokio::select! {
            _ = cancel.cancelled() => {
                tracing::debug!(merged = items.len(), "Cancelled while merging, dropping partial results");
                return Err(Error::Cancelled);
            }
            Some(error) = dispatch.errors.recv() => {
                return Ok(FetchOutcome::Partial { items, error });
            }
            batch = dispatch.results.recv() => match batch {
                Some(batch) => items.extend(batch),
                None => break,
            },
        }
    }

    // Every worker has exited; the error channel closes once the finalizer has
    // checked them all, and carries anything they left behind.
    tokio::select! {
        _ = cancel.cancelled() => Err(Error::Cancelled),
        error = dispatch.errors.recv() => Ok(match error {
            Some(error) => FetchOutcome::Partial { items, error },
            None => FetchOutcome::Complete(items),
        }),
    }
}
