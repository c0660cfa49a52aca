//! Core types for bulk-fetch

use crate::error::{Error, Result};

/// Result of a bulk fetch that got past the probe page
///
/// Probe failures, cancellation, and invalid configuration are returned as
/// `Err` from the fetch call instead; see [`crate::Error`].
#[derive(Debug)]
pub enum FetchOutcome<T> {
    /// Every page was retrieved
    Complete(Vec<T>),
    /// A page exhausted its retries; everything merged before that is kept
    Partial {
        /// Items merged before the failure, probe page first
        items: Vec<T>,
        /// The fatal page error
        error: Error,
    },
}

impl<T> FetchOutcome<T> {
    /// Returns true if every page was retrieved
    pub fn is_complete(&self) -> bool {
        matches!(self, FetchOutcome::Complete(_))
    }

    /// Items retrieved, complete or not
    pub fn items(&self) -> &[T] {
        match self {
            FetchOutcome::Complete(items) | FetchOutcome::Partial { items, .. } => items,
        }
    }

    /// Number of items retrieved
    pub fn len(&self) -> usize {
        self.items().len()
    }

    /// Returns true if no items were retrieved
    pub fn is_empty(&self) -> bool {
        self.items().is_empty()
    }

    /// The fatal page error, if the fetch was partial
    pub fn error(&self) -> Option<&Error> {
        match self {
            FetchOutcome::Complete(_) => None,
            FetchOutcome::Partial { error, .. } => Some(error),
        }
    }

    /// Split into the retrieved items and the fatal error, if any
    pub fn into_parts(self) -> (Vec<T>, Option<Error>) {
        match self {
            FetchOutcome::Complete(items) => (items, None),
            FetchOutcome::Partial { items, error } => (items, Some(error)),
        }
    }

    /// Strict conversion: partial results become an error and their items are dropped
    pub fn into_result(self) -> Result<Vec<T>> {
        match self {
            FetchOutcome::Complete(items) => Ok(items),
            FetchOutcome::Partial { error, .. } => Err(error),
        }
    }
}
