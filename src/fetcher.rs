//! Page fetcher contract consumed by the coordinator.
//!
//! The transport that performs a single page fetch lives outside this crate.
//! Callers implement [`PageFetcher`] for their client, or wrap an async closure
//! with [`page_fn`].

use std::future::Future;
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tokio_util::sync::CancellationToken;

use crate::error::BoxError;

/// One page request issued by the coordinator
///
/// Serializes as `{"page": 2, "page_size": 100}` so it can be encoded straight
/// into a query string or request body.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PageRequest {
    /// Page index
    pub page: u64,
    /// Requested page size
    pub page_size: u64,
}

impl PageRequest {
    /// Create a request for `page` with `page_size` items
    pub fn new(page: u64, page_size: u64) -> Self {
        Self { page, page_size }
    }
}

/// One page of results plus the total item count of the whole query
///
/// Deserializes from the common `{"total": 460, "items": [...]}` list envelope.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Page<T> {
    /// Total number of items across all pages
    pub total: u64,
    /// Items on this page, in source order
    #[serde(default = "Vec::new")]
    pub items: Vec<T>,
}

impl<T> Page<T> {
    /// Create a page
    pub fn new(total: u64, items: Vec<T>) -> Self {
        Self { total, items }
    }

    /// Total number of items across all pages
    pub fn total(&self) -> u64 {
        self.total
    }

    /// Items on this page
    pub fn items(&self) -> &[T] {
        &self.items
    }

    /// Consume the page, returning its items
    pub fn into_items(self) -> Vec<T> {
        self.items
    }
}

/// Fetches a single page from the remote source
///
/// `cancel` is the caller's token; fetchers may watch it to abort a slow request.
/// The coordinator itself only observes it between pages and while merging.
#[async_trait::async_trait]
pub trait PageFetcher<T>: Send + Sync {
    /// Fetch one page. `request.page` and `request.page_size` are chosen by the coordinator.
    async fn fetch_page(
        &self,
        cancel: &CancellationToken,
        request: PageRequest,
    ) -> Result<Page<T>, BoxError>;
}

#[async_trait::async_trait]
impl<T, F> PageFetcher<T> for Arc<F>
where
    F: PageFetcher<T> + ?Sized,
    T: Send,
{
    async fn fetch_page(
        &self,
        cancel: &CancellationToken,
        request: PageRequest,
    ) -> Result<Page<T>, BoxError> {
        (**self).fetch_page(cancel, request).await
    }
}

/// [`PageFetcher`] backed by an async closure, created by [`page_fn`]
#[derive(Clone)]
pub struct FnFetcher<F> {
    f: F,
}

/// Adapt an async closure into a [`PageFetcher`]
///
/// ```
/// use bulk_fetch::{BoxError, Page, PageRequest, page_fn};
///
/// let fetcher = page_fn(|_cancel, request: PageRequest| async move {
///     let items: Vec<u64> = (0..request.page_size).collect();
///     Ok::<_, BoxError>(Page::new(1_000, items))
/// });
/// # let _ = fetcher;
/// ```
pub fn page_fn<F, Fut, T>(f: F) -> FnFetcher<F>
where
    F: Fn(CancellationToken, PageRequest) -> Fut + Send + Sync,
    Fut: Future<Output = Result<Page<T>, BoxError>> + Send,
{
    FnFetcher { f }
}

#[async_trait::async_trait]
impl<F, Fut, T> PageFetcher<T> for FnFetcher<F>
where
    F: Fn(CancellationToken, PageRequest) -> Fut + Send + Sync,
    Fut: Future<Output = Result<Page<T>, BoxError>> + Send,
    T: Send,
{
    async fn fetch_page(
        &self,
        cancel: &CancellationToken,
        request: PageRequest,
    ) -> Result<Page<T>, BoxError> {
        (self.f)(cancel.clone(), request).await
    }
}

#[allow(clippy::unwrap_used, clippy::expect_used)]
#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn page_deserializes_from_list_envelope() {
        let page: Page<String> =
            serde_json::from_str(r#"{"total": 460, "items": ["a", "b"]}"#).unwrap();

        assert_eq!(page.total(), 460);
        assert_eq!(page.items(), ["a".to_string(), "b".to_string()]);
    }

    #[test]
    fn page_without_items_is_empty() {
        let page: Page<u32> = serde_json::from_str(r#"{"total": 0}"#).unwrap();
        assert!(page.into_items().is_empty());
    }

    #[test]
    fn request_serializes_as_query_fields() {
        let json = serde_json::to_value(PageRequest::new(3, 100)).unwrap();
        assert_eq!(json, serde_json::json!({"page": 3, "page_size": 100}));
    }

    #[tokio::test]
    async fn page_fn_forwards_request_and_token() {
        let fetcher = page_fn(|cancel, request: PageRequest| async move {
            assert!(!cancel.is_cancelled());
            Ok::<_, BoxError>(Page::new(10, vec![request.page, request.page_size]))
        });

        let page = fetcher
            .fetch_page(&CancellationToken::new(), PageRequest::new(2, 5))
            .await
            .unwrap();

        assert_eq!(page.items(), [2, 5]);
    }
}
