use blob_fetch::BlobFetcher;
use tracing::{error, info};

use crate::{config::Config, error::IngestError, splitter};

/// One-shot ingestion pipeline: resolve and download the configured
/// object, then split it into train/test partitions on disk.
pub struct DataIngestion {
    config: Config,
    fetcher: BlobFetcher,
}

impl DataIngestion {
    pub fn new(config: Config) -> Result<Self, IngestError> {
        let fetcher = BlobFetcher::new_s3(&config.data_ingestion.bucket_name)
            .map_err(|err| IngestError::from_fetch(err, &config.data_ingestion.bucket_name))?;
        Self::with_fetcher(config, fetcher)
    }

    #[cfg(test)]
    pub fn with_store(
        config: Config,
        store: std::sync::Arc<dyn object_store::ObjectStore>,
    ) -> Result<Self, IngestError> {
        Self::with_fetcher(config, BlobFetcher::from_store(store))
    }

    fn with_fetcher(config: Config, fetcher: BlobFetcher) -> Result<Self, IngestError> {
        std::fs::create_dir_all(&config.paths.raw_dir).map_err(|source| IngestError::Io {
            path: config.paths.raw_dir.display().to_string(),
            source,
        })?;
        info!(
            bucket = config.data_ingestion.bucket_name,
            file = config.data_ingestion.bucket_file_name,
            "data ingestion initialized"
        );
        Ok(Self { config, fetcher })
    }

    /// Runs the pipeline once. Failures are logged here and returned to the
    /// caller; the completion line is emitted on every exit path.
    pub async fn run(&self) -> Result<(), IngestError> {
        info!("starting data ingestion process");
        let result = self.run_steps().await;
        if let Err(err) = &result {
            error!(error = %err, "data ingestion failed");
        }
        info!("data ingestion completed");
        result
    }

    async fn run_steps(&self) -> Result<(), IngestError> {
        self.download().await?;
        self.split()?;
        info!("data ingestion completed successfully");
        Ok(())
    }

    async fn download(&self) -> Result<(), IngestError> {
        let ingestion = &self.config.data_ingestion;
        self.fetcher
            .fetch(&ingestion.bucket_file_name, &self.config.paths.raw_file)
            .await
            .map_err(|err| IngestError::from_fetch(err, &ingestion.bucket_name))
    }

    fn split(&self) -> Result<(), IngestError> {
        let paths = &self.config.paths;
        splitter::split(
            &paths.raw_file,
            self.config.data_ingestion.train_ratio,
            &paths.train_file,
            &paths.test_file,
        )
    }
}
