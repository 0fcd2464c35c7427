use std::{env, path::Path as FsPath, sync::Arc};

use bytes::BytesMut;
use futures::StreamExt;
use object_store::{aws::AmazonS3Builder, path::Path, ObjectStore};
use thiserror::Error;
use tracing::{info, warn};

/// Number of listing keys included in diagnostic log output.
const LISTING_SAMPLE_LIMIT: usize = 50;

#[derive(Debug, Error)]
pub enum FetchError {
    #[error("object not found or inaccessible: {key}")]
    NotFound {
        key: String,
        #[source]
        source: object_store::Error,
    },
    #[error("object store request failed")]
    Transport(#[from] object_store::Error),
    #[error("failed to write {path}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },
}

/// Downloads a single object from a bucket, falling back to a
/// normalized-key search of the prefix listing when the requested key
/// does not exist verbatim.
pub struct BlobFetcher {
    store: Arc<dyn ObjectStore>,
}

impl BlobFetcher {
    pub fn new_s3(bucket: &str) -> Result<Self, FetchError> {
        let mut builder = AmazonS3Builder::from_env().with_bucket_name(bucket);

        // For supporting localstack/minio for testing
        if let Ok(val) = env::var("AWS_ENDPOINT_URL") {
            builder = builder.with_endpoint(val.clone());
            if val.starts_with("http://") {
                builder = builder.with_allow_http(true);
            }
        }
        Ok(Self {
            store: Arc::new(builder.build()?),
        })
    }

    pub fn from_store(store: Arc<dyn ObjectStore>) -> Self {
        Self { store }
    }

    /// Resolves `key` and downloads it to `destination`, overwriting any
    /// existing file. A metadata-only head request probes for the exact
    /// key first; only when that fails is the prefix listing consulted.
    pub async fn fetch(&self, key: &str, destination: &FsPath) -> Result<(), FetchError> {
        match self.store.head(&Path::from(key)).await {
            Ok(_) => {
                self.download(key, destination).await?;
                info!(key, destination = %destination.display(), "downloaded exact key");
                Ok(())
            }
            Err(head_err) => {
                warn!(key, error = %head_err, "existence probe failed, searching prefix listing");
                let prefix = key_prefix(key);
                let keys = self.list_keys(prefix.as_deref()).await?;
                let sample = &keys[..keys.len().min(LISTING_SAMPLE_LIMIT)];
                info!(
                    prefix = prefix.as_deref().unwrap_or(""),
                    count = keys.len(),
                    ?sample,
                    "objects found under prefix"
                );
                match resolve_key(key, &keys) {
                    Some(matched) => {
                        let matched = matched.to_string();
                        info!(requested = key, matched, "downloading matched key");
                        self.download(&matched, destination).await?;
                        info!(key = matched, destination = %destination.display(), "downloaded matched key");
                        Ok(())
                    }
                    None => Err(FetchError::NotFound {
                        key: key.to_string(),
                        source: head_err,
                    }),
                }
            }
        }
    }

    async fn list_keys(&self, prefix: Option<&str>) -> Result<Vec<String>, FetchError> {
        let prefix = prefix.map(Path::from);
        let mut listing = self.store.list(prefix.as_ref());
        let mut keys = Vec::new();
        while let Some(meta) = listing.next().await {
            keys.push(meta?.location.to_string());
        }
        Ok(keys)
    }

    async fn download(&self, key: &str, destination: &FsPath) -> Result<(), FetchError> {
        let get_result = self.store.get(&Path::from(key)).await?;
        let mut stream = get_result.into_stream();
        let mut bytes = BytesMut::new();
        while let Some(chunk) = stream.next().await {
            bytes.extend_from_slice(&chunk?);
        }
        if let Some(parent) = destination.parent() {
            tokio::fs::create_dir_all(parent)
                .await
                .map_err(|source| io_error(parent, source))?;
        }
        tokio::fs::write(destination, &bytes)
            .await
            .map_err(|source| io_error(destination, source))
    }
}

fn io_error(path: &FsPath, source: std::io::Error) -> FetchError {
    FetchError::Io {
        path: path.display().to_string(),
        source,
    }
}

/// Directory component of `key`, used as the listing prefix. Keys without
/// a directory component list the whole bucket.
fn key_prefix(key: &str) -> Option<String> {
    key.rsplit_once('/').map(|(dir, _)| dir.to_string())
}

/// Candidate spellings for `requested`, tried in order against the listing:
/// case-insensitive exact match, then underscores replaced by spaces, then
/// spaces replaced by underscores.
fn match_candidates(requested: &str) -> [String; 3] {
    [
        requested.to_lowercase(),
        requested.replace('_', " ").to_lowercase(),
        requested.replace(' ', "_").to_lowercase(),
    ]
}

/// Finds the listing key equivalent to `requested` under the normalization
/// rules. Each rule scans the full listing before the next is tried; within
/// a rule the first hit in listing order wins, so the result under
/// duplicate or near-duplicate keys depends on the store's listing order.
pub fn resolve_key<'a>(requested: &str, listing: &'a [String]) -> Option<&'a str> {
    for candidate in match_candidates(requested) {
        if let Some(hit) = listing.iter().find(|key| key.to_lowercase() == candidate) {
            return Some(hit.as_str());
        }
    }
    None
}
