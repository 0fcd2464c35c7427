use blob_fetch::FetchError;
use thiserror::Error;

/// Closed set of failure kinds for the ingestion pipeline. Every variant
/// carries the underlying failure as its source so callers can branch on
/// kind and still walk the cause chain.
#[derive(Debug, Error)]
pub enum IngestError {
    #[error("config file not found: {path}")]
    ConfigNotFound {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to parse config file: {path}")]
    ConfigParse {
        path: String,
        #[source]
        source: figment::Error,
    },
    #[error("object not found in bucket {bucket}: {key}")]
    ObjectNotFound {
        bucket: String,
        key: String,
        #[source]
        source: object_store::Error,
    },
    #[error("object store request failed")]
    Transport(#[source] object_store::Error),
    #[error("input is not parseable as CSV: {path}")]
    DataFormat {
        path: String,
        #[source]
        source: csv::Error,
    },
    #[error("i/o failure on {path}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },
}

impl IngestError {
    pub fn from_fetch(err: FetchError, bucket: &str) -> Self {
        match err {
            FetchError::NotFound { key, source } => IngestError::ObjectNotFound {
                bucket: bucket.to_string(),
                key,
                source,
            },
            FetchError::Transport(source) => IngestError::Transport(source),
            FetchError::Io { path, source } => IngestError::Io { path, source },
        }
    }
}
