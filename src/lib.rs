//! # bulk-fetch
//!
//! Resumable bulk-fetch engine for paginated remote data sources.
//!
//! Given a [`PageFetcher`] that retrieves one page of a query, [`fetch_all`]
//! probes the first page to learn the total item count, fans the remaining
//! pages out across a bounded worker pool, retries failed pages at a fixed
//! interval, and merges everything into one collection.
//!
//! ## Outcomes
//!
//! - `Ok(FetchOutcome::Complete(items))` - every page was retrieved
//! - `Ok(FetchOutcome::Partial { items, error })` - a page exhausted its
//!   retries; items merged before that point are kept
//! - `Err(Error::Cancelled)` - the caller's token fired; no items are returned
//! - `Err(Error::Probe { .. })`, `Err(Error::InvalidTotal { .. })` or
//!   `Err(Error::Config { .. })` - no items are returned
//!
//! ## Quick Start
//!
//! ```no_run
//! use bulk_fetch::{BoxError, BulkFetcher, FetchConfig, Page, PageRequest, page_fn};
//! use tokio_util::sync::CancellationToken;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let bulk = BulkFetcher::new(FetchConfig::default().with_worker_count(8))?;
//!
//!     let fetcher = page_fn(|_cancel, request: PageRequest| async move {
//!         // Issue the real request here, e.g. GET /users?page=..&page_size=..
//!         let users: Vec<String> = Vec::new();
//!         Ok::<_, BoxError>(Page::new(0, users))
//!     });
//!
//!     let users = bulk
//!         .fetch_all(&CancellationToken::new(), fetcher)
//!         .await?
//!         .into_result()?;
//!     println!("fetched {} users", users.len());
//!     Ok(())
//! }
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::unwrap_used)]
#![warn(clippy::expect_used)]

/// Configuration types
pub mod config;
/// Bulk fetch coordinator
pub mod coordinator;
/// Error types
pub mod error;
/// Page fetcher contract
pub mod fetcher;
/// Fixed-interval retry
pub mod retry;
/// Fetch outcome types
pub mod types;

// Re-export commonly used types
pub use config::FetchConfig;
pub use coordinator::{BulkFetcher, fetch_all};
pub use error::{BoxError, Error, Result};
pub use fetcher::{FnFetcher, Page, PageFetcher, PageRequest, page_fn};
pub use types::FetchOutcome;
