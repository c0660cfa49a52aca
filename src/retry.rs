//! Fixed-interval retry for page fetches
//!
//! Every failure is treated as transient: the operation is re-run after a fixed
//! pause until it succeeds or the attempt budget runs out. There is no jitter
//! and no backoff growth.
//!
//! # Example
//!
//! ```no_run
//! use bulk_fetch::retry::{RetryPolicy, fetch_with_retry};
//! use std::time::Duration;
//!
//! # async fn example() {
//! let policy = RetryPolicy {
//!     max_attempts: 3,
//!     interval: Duration::from_secs(1),
//! };
//! let result = fetch_with_retry(&policy, || async {
//!     Ok::<_, std::io::Error>(42)
//! })
//! .await;
//! assert!(result.is_ok());
//! # }
//! ```

use std::future::Future;
use std::time::Duration;

/// Attempt budget and pause used between attempts
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Total attempts, including the first one
    pub max_attempts: u32,
    /// Fixed pause after each failed attempt that will be retried
    pub interval: Duration,
}

/// The operation failed on every attempt
#[derive(Debug)]
pub struct RetryExhausted<E> {
    /// Number of attempts made
    pub attempts: u32,
    /// Error returned by the final attempt
    pub last_error: E,
}

/// Execute an async operation, retrying every failure at a fixed interval
///
/// The sleep is a plain timer and is not interrupted by cancellation; callers
/// that need to stop early must race the returned future themselves.
///
/// A policy with `max_attempts == 0` still runs the operation once.
pub async fn fetch_with_retry<F, Fut, T, E>(
    policy: &RetryPolicy,
    mut operation: F,
) -> Result<T, RetryExhausted<E>>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, E>>,
    E: std::fmt::Display,
{
    let max_attempts = policy.max_attempts.max(1);
    let mut attempt = 0;

    loop {
        attempt += 1;
        match operation().await {
            Ok(result) => {
                if attempt > 1 {
                    tracing::info!(attempts = attempt, "Operation succeeded after retry");
                }
                return Ok(result);
            }
            Err(e) if attempt < max_attempts => {
                tracing::warn!(
                    error = %e,
                    attempt = attempt,
                    max_attempts = max_attempts,
                    delay_ms = policy.interval.as_millis(),
                    "Operation failed, retrying"
                );
                tokio::time::sleep(policy.interval).await;
            }
            Err(e) => {
                tracing::error!(
                    error = %e,
                    attempts = attempt,
                    "Operation failed after all retry attempts exhausted"
                );
                return Err(RetryExhausted {
                    attempts: attempt,
                    last_error: e,
                });
            }
        }
    }
}

// unwrap/expect are acceptable in tests for concise failure-on-error assertions
#[allow(clippy::unwrap_used, clippy::expect_used)]
#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use std::sync::atomic::{AtomicU32, Ordering};

    #[derive(Debug)]
    struct Flaky;

    impl std::fmt::Display for Flaky {
        fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
            write!(f, "flaky upstream")
        }
    }

    fn policy(max_attempts: u32, interval_ms: u64) -> RetryPolicy {
        RetryPolicy {
            max_attempts,
            interval: Duration::from_millis(interval_ms),
        }
    }

    #[tokio::test]
    async fn test_success_no_retry() {
        let counter = Arc::new(AtomicU32::new(0));
        let counter_clone = counter.clone();

        let result = fetch_with_retry(&policy(3, 10), || {
            let counter = counter_clone.clone();
            async move {
                counter.fetch_add(1, Ordering::SeqCst);
                Ok::<_, Flaky>(42)
            }
        })
        .await;

        assert_eq!(result.unwrap(), 42);
        assert_eq!(counter.load(Ordering::SeqCst), 1, "should only call once");
    }

    #[tokio::test]
    async fn test_retry_then_succeed() {
        let counter = Arc::new(AtomicU32::new(0));
        let counter_clone = counter.clone();

        let result = fetch_with_retry(&policy(3, 5), || {
            let counter = counter_clone.clone();
            async move {
                let count = counter.fetch_add(1, Ordering::SeqCst);
                if count < 2 { Err(Flaky) } else { Ok(42) }
            }
        })
        .await;

        assert_eq!(result.unwrap(), 42);
        assert_eq!(
            counter.load(Ordering::SeqCst),
            3,
            "should fail twice before success"
        );
    }

    #[tokio::test]
    async fn test_retry_exhausted_calls_exactly_max_attempts() {
        let counter = Arc::new(AtomicU32::new(0));
        let counter_clone = counter.clone();

        let result = fetch_with_retry(&policy(4, 1), || {
            let counter = counter_clone.clone();
            async move {
                counter.fetch_add(1, Ordering::SeqCst);
                Err::<i32, _>(Flaky)
            }
        })
        .await;

        let exhausted = result.unwrap_err();
        assert_eq!(exhausted.attempts, 4);
        assert_eq!(exhausted.last_error.to_string(), "flaky upstream");
        assert_eq!(counter.load(Ordering::SeqCst), 4);
    }

    #[tokio::test]
    async fn test_zero_attempts_runs_once() {
        let counter = Arc::new(AtomicU32::new(0));
        let counter_clone = counter.clone();

        let result = fetch_with_retry(&policy(0, 1), || {
            let counter = counter_clone.clone();
            async move {
                counter.fetch_add(1, Ordering::SeqCst);
                Err::<i32, _>(Flaky)
            }
        })
        .await;

        assert_eq!(result.unwrap_err().attempts, 1);
        assert_eq!(counter.load(Ordering::SeqCst), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_fixed_interval_between_attempts() {
        let start = tokio::time::Instant::now();

        let _ = fetch_with_retry(&policy(3, 1000), || async { Err::<i32, _>(Flaky) }).await;

        // Two pauses for three attempts, none after the final failure
        let elapsed = start.elapsed();
        assert!(elapsed >= Duration::from_secs(2), "waited {:?}", elapsed);
        assert!(elapsed < Duration::from_secs(3), "waited {:?}", elapsed);
    }
}
