//! Error types for dataset acquisition and querying.

use std::path::PathBuf;
use std::time::Duration;
use thiserror::Error;

/// Errors surfaced by the data provider and the comparison queries.
///
/// Only `DataUnavailable` (and I/O failures reading cache metadata) ever leave
/// [`crate::provider::DataProvider`]; the fetch-side variants
/// are recovered internally by falling back to the cached copy.
#[derive(Debug, Error)]
pub enum DataError {
    /// The remote request did not complete within the configured timeout.
    #[error("request timed out after {0:?}")]
    FetchTimeout(Duration),

    /// Connection, TLS, redirect or body-read failure.
    #[error("network error: {0}")]
    FetchTransport(String),

    /// The remote answered with a non-success status.
    #[error("request failed with HTTP {0}")]
    HttpStatus(u16),

    /// The remote answered 2xx but the body is not the expected CSV.
    #[error("unexpected payload: {0}")]
    InvalidPayload(String),

    /// Remote fetch failed and there is no readable cached copy to fall back on.
    #[error("no data available: remote fetch failed ({cause}) and no usable cache at {}", path.display())]
    DataUnavailable { path: PathBuf, cause: String },

    #[error("I/O error at {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("could not parse dataset: {0}")]
    Parse(#[from] csv::Error),

    /// Too many entities selected for a side-by-side comparison.
    #[error("at most {max} entities can be compared, got {got}")]
    TooManyEntities { max: usize, got: usize },
}

impl DataError {
    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        DataError::Io {
            path: path.into(),
            source,
        }
    }

    /// True for failures that the provider recovers from by reading the cache.
    pub fn is_fetch_failure(&self) -> bool {
        matches!(
            self,
            DataError::FetchTimeout(_)
                | DataError::FetchTransport(_)
                | DataError::HttpStatus(_)
                | DataError::InvalidPayload(_)
        )
    }
}

/// Result alias used throughout the crate.
pub type Result<T> = std::result::Result<T, DataError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fetch_failures_are_classified() {
        assert!(DataError::HttpStatus(503).is_fetch_failure());
        assert!(DataError::FetchTimeout(Duration::from_secs(30)).is_fetch_failure());
        assert!(DataError::InvalidPayload("html".into()).is_fetch_failure());
        let unavailable = DataError::DataUnavailable {
            path: PathBuf::from("/tmp/x.csv"),
            cause: "HTTP 404".into(),
        };
        assert!(!unavailable.is_fetch_failure());
        assert!(unavailable.to_string().contains("/tmp/x.csv"));
    }
}
