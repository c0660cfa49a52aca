//! Configuration types for bulk-fetch

use crate::error::{Error, Result};
use crate::retry::RetryPolicy;
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Tunables for one bulk fetch
///
/// Immutable once a fetch starts. Every field has a default, so a config can be
/// deserialized from a partial document:
///
/// ```
/// use bulk_fetch::FetchConfig;
///
/// let config = FetchConfig::default()
///     .with_max_page_size(250)
///     .with_worker_count(8);
/// assert_eq!(config.max_retries, 3);
/// assert!(config.validate().is_ok());
/// ```
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct FetchConfig {
    /// Fetch attempts per non-probe page before the whole fetch fails (default: 3)
    ///
    /// A value of 0 still makes one attempt.
    #[serde(default = "default_max_retries")]
    pub max_retries: u32,

    /// Fixed pause after a failed attempt (default: 5 seconds)
    ///
    /// Serialized as whole milliseconds under `retry_interval_ms`.
    #[serde(
        rename = "retry_interval_ms",
        default = "default_retry_interval",
        with = "millis_serde"
    )]
    pub retry_interval: Duration,

    /// Page size requested from the source (default: 100)
    #[serde(default = "default_max_page_size")]
    pub max_page_size: u64,

    /// Index of the first page (default: 1)
    #[serde(default = "default_start_page")]
    pub start_page: u64,

    /// Number of concurrent page workers (default: 5)
    #[serde(default = "default_worker_count")]
    pub worker_count: usize,

    /// Upper bound on the number of pages one fetch may plan (default: 1,000,000)
    ///
    /// A source reporting a total that needs more pages is rejected with
    /// [`Error::InvalidTotal`] before any queue is allocated.
    #[serde(default = "default_max_pages")]
    pub max_pages: u64,
}

impl Default for FetchConfig {
    fn default() -> Self {
        Self {
            max_retries: default_max_retries(),
            retry_interval: default_retry_interval(),
            max_page_size: default_max_page_size(),
            start_page: default_start_page(),
            worker_count: default_worker_count(),
            max_pages: default_max_pages(),
        }
    }
}

impl FetchConfig {
    /// Set the number of attempts per page
    pub fn with_max_retries(mut self, max_retries: u32) -> Self {
        self.max_retries = max_retries;
        self
    }

    /// Set the fixed pause between attempts
    pub fn with_retry_interval(mut self, retry_interval: Duration) -> Self {
        self.retry_interval = retry_interval;
        self
    }

    /// Set the page size requested from the source
    pub fn with_max_page_size(mut self, max_page_size: u64) -> Self {
        self.max_page_size = max_page_size;
        self
    }

    /// Set the index of the first page
    pub fn with_start_page(mut self, start_page: u64) -> Self {
        self.start_page = start_page;
        self
    }

    /// Set the number of concurrent page workers
    pub fn with_worker_count(mut self, worker_count: usize) -> Self {
        self.worker_count = worker_count;
        self
    }

    /// Set the upper bound on planned pages
    pub fn with_max_pages(mut self, max_pages: u64) -> Self {
        self.max_pages = max_pages;
        self
    }

    /// Reject configurations the coordinator cannot run with
    pub fn validate(&self) -> Result<()> {
        if self.worker_count == 0 {
            return Err(Error::config(
                "worker_count",
                "worker_count must be greater than 0",
            ));
        }
        if self.max_page_size == 0 {
            return Err(Error::config(
                "max_page_size",
                "max_page_size must be greater than 0",
            ));
        }
        if self.max_pages == 0 {
            return Err(Error::config("max_pages", "max_pages must be greater than 0"));
        }
        Ok(())
    }

    /// Retry policy applied to every non-probe page
    pub(crate) fn retry_policy(&self) -> RetryPolicy {
        RetryPolicy {
            max_attempts: self.max_retries.max(1),
            interval: self.retry_interval,
        }
    }
}

fn default_max_retries() -> u32 {
    3
}

fn default_retry_interval() -> Duration {
    Duration::from_secs(5)
}

fn default_max_page_size() -> u64 {
    100
}

fn default_start_page() -> u64 {
    1
}

fn default_worker_count() -> usize {
    5
}

fn default_max_pages() -> u64 {
    1_000_000
}

// Durations are written as whole milliseconds
mod millis_serde {
    use serde::{Deserialize, Deserializer, Serializer};
    use std::time::Duration;

    pub fn serialize<S>(duration: &Duration, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        let millis = u64::try_from(duration.as_millis()).unwrap_or(u64::MAX);
        serializer.serialize_u64(millis)
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Duration, D::Error>
    where
        D: Deserializer<'de>,
    {
        Ok(Duration::from_millis(u64::deserialize(deserializer)?))
    }
}
