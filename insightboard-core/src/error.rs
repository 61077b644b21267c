//! Error types for insightboard-core

use thiserror::Error;

/// Main error type for the insightboard-core library
#[derive(Error, Debug)]
pub enum Error {
    /// The record source could not return records
    #[error("record source error: {0}")]
    Source(#[from] SourceError),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON parsing error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Configuration error
    #[error("configuration error: {0}")]
    Config(String),
}

/// Failure to fetch interaction records.
///
/// Every variant is surfaced to the caller unchanged; the metrics engine
/// never recovers from a failed fetch or computes a partial view.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SourceError {
    /// Transport failure (DNS, connect, timeout)
    #[error("request failed: {0}")]
    Request(String),

    /// Backend rejected the query (auth, bad filter, missing table)
    #[error("API error ({status}): {message}")]
    Api { status: u16, message: String },

    /// Payload could not be decoded into interaction records
    #[error("malformed response: {0}")]
    Decode(String),

    /// Snapshot file could not be read
    #[error("snapshot {path}: {message}")]
    Snapshot { path: String, message: String },

    /// Source refused to serve records
    #[error("source unavailable: {0}")]
    Unavailable(String),
}

/// Result type alias for insightboard-core
pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_source_error_wraps_unchanged() {
        let source = SourceError::Api {
            status: 401,
            message: "invalid JWT".to_string(),
        };
        let err: Error = source.clone().into();
        match err {
            Error::Source(inner) => assert_eq!(inner, source),
            other => panic!("unexpected error: {other}"),
        }
    }
}
