//! Error types for bulk-fetch
//!
//! Every fatal condition the coordinator can surface is a variant of [`Error`]:
//! - invalid configuration, rejected before any fetch happens
//! - a failed probe (first page) fetch, which is never retried
//! - a probe page reporting a total that needs more pages than allowed
//! - a page that failed on every attempt of its retry budget
//! - cancellation of the caller's token
//!
//! Errors raised by a [`PageFetcher`](crate::fetcher::PageFetcher) are boxed into
//! [`BoxError`] and kept as the `source` of the wrapping variant.

use thiserror::Error;

/// Result type alias for bulk-fetch operations
pub type Result<T> = std::result::Result<T, Error>;

/// Type-erased error returned by page fetchers
pub type BoxError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// Main error type for bulk-fetch
#[derive(Debug, Error)]
pub enum Error {
    /// Configuration error with context about which setting is invalid
    #[error("configuration error: {message}")]
    Config {
        /// Human-readable error message describing the configuration issue
        message: String,
        /// The configuration key that caused the error (e.g., "worker_count")
        key: Option<String>,
    },

    /// The probe fetch of the first page failed
    #[error("failed to get probe page {page}: {source}")]
    Probe {
        /// The page index the probe requested
        page: u64,
        /// The error returned by the fetcher
        #[source]
        source: BoxError,
    },

    /// The probe page reported a total that needs more than `max_pages` pages
    #[error("probe page {page} reported {total} items, more than {max_pages} pages allow")]
    InvalidTotal {
        /// The page index the probe requested
        page: u64,
        /// The total item count the source reported
        total: u64,
        /// The configured page limit
        max_pages: u64,
    },

    /// A page failed on every attempt of its retry budget
    #[error("failed to get page {page} after {attempts} attempts: {source}")]
    PageExhaustedRetries {
        /// The page that could not be fetched
        page: u64,
        /// Number of fetch attempts made for the page
        attempts: u32,
        /// The error returned by the last attempt
        #[source]
        source: BoxError,
    },

    /// The caller's cancellation token fired before the fetch completed
    #[error("bulk fetch cancelled")]
    Cancelled,

    /// A worker task panicked or was aborted before reporting its pages
    #[error("page worker failed: {message}")]
    WorkerPanicked {
        /// Description of the join failure
        message: String,
    },
}

impl Error {
    /// Shorthand for a configuration error tied to a specific key
    pub(crate) fn config(key: &str, message: impl Into<String>) -> Self {
        Error::Config {
            message: message.into(),
            key: Some(key.to_string()),
        }
    }

    /// Stable, machine-readable code for this error
    pub fn error_code(&self) -> &'static str {
        match self {
            Error::Config { .. } => "config_error",
            Error::Probe { .. } => "probe_failed",
            Error::InvalidTotal { .. } => "invalid_total",
            Error::PageExhaustedRetries { .. } => "page_exhausted_retries",
            Error::Cancelled => "cancelled",
            Error::WorkerPanicked { .. } => "worker_panicked",
        }
    }

    /// The page this error refers to, if any
    pub fn page(&self) -> Option<u64> {
        match self {
            Error::Probe { page, .. }
            | Error::InvalidTotal { page, .. }
            | Error::PageExhaustedRetries { page, .. } => Some(*page),
            _ => None,
        }
    }

    /// Returns true if the error was caused by cancellation
    pub fn is_cancelled(&self) -> bool {
        matches!(self, Error::Cancelled)
    }
}

#[allow(clippy::unwrap_used, clippy::expect_used)]
#[cfg(test)]
mod tests {
    use super::*;
    use std::error::Error as _;

    fn upstream(msg: &str) -> BoxError {
        Box::new(std::io::Error::other(msg.to_string()))
    }

    #[test]
    fn error_codes_are_stable() {
        let cases = vec![
            (Error::config("worker_count", "must be > 0"), "config_error"),
            (
                Error::Probe {
                    page: 1,
                    source: upstream("boom"),
                },
                "probe_failed",
            ),
            (
                Error::InvalidTotal {
                    page: 1,
                    total: u64::MAX,
                    max_pages: 10,
                },
                "invalid_total",
            ),
            (
                Error::PageExhaustedRetries {
                    page: 4,
                    attempts: 3,
                    source: upstream("boom"),
                },
                "page_exhausted_retries",
            ),
            (Error::Cancelled, "cancelled"),
            (
                Error::WorkerPanicked {
                    message: "task panicked".into(),
                },
                "worker_panicked",
            ),
        ];

        for (err, code) in cases {
            assert_eq!(err.error_code(), code, "wrong code for {err}");
        }
    }

    #[test]
    fn exhausted_retries_message_names_page_and_attempts() {
        let err = Error::PageExhaustedRetries {
            page: 7,
            attempts: 3,
            source: upstream("connection reset"),
        };

        assert_eq!(
            err.to_string(),
            "failed to get page 7 after 3 attempts: connection reset"
        );
        assert_eq!(err.page(), Some(7));
        assert_eq!(err.source().unwrap().to_string(), "connection reset");
    }

    #[test]
    fn probe_error_keeps_page() {
        let err = Error::Probe {
            page: 1,
            source: upstream("unreachable"),
        };
        assert_eq!(err.page(), Some(1));
        assert!(!err.is_cancelled());
        assert!(err.to_string().contains("probe page 1"));
    }

    #[test]
    fn invalid_total_names_total_and_limit() {
        let err = Error::InvalidTotal {
            page: 0,
            total: 5_000,
            max_pages: 10,
        };
        assert_eq!(err.page(), Some(0));
        assert_eq!(
            err.to_string(),
            "probe page 0 reported 5000 items, more than 10 pages allow"
        );
    }

    #[test]
    fn config_error_keeps_key() {
        match Error::config("max_page_size", "must be greater than 0") {
            Error::Config { key, message } => {
                assert_eq!(key.as_deref(), Some("max_page_size"));
                assert_eq!(message, "must be greater than 0");
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn cancelled_has_no_page() {
        assert!(Error::Cancelled.is_cancelled());
        assert_eq!(Error::Cancelled.page(), None);
    }
}
