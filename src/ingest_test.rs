#[cfg(test)]
mod tests {
    use std::{collections::HashSet, sync::Arc};

    use anyhow::Result;
    use bytes::Bytes;
    use object_store::{memory::InMemory, path::Path, ObjectStore, PutPayload};
    use tempfile::TempDir;

    use crate::{
        config::{Config, DataPaths, IngestionConfig},
        error::IngestError,
        service::DataIngestion,
    };

    fn hundred_row_csv() -> String {
        let mut csv = String::from("id,value\n");
        for i in 0..100 {
            csv.push_str(&format!("{i},v{i}\n"));
        }
        csv
    }

    fn test_config(dir: &TempDir, key: &str, ratio: f64) -> Config {
        let raw_dir = dir.path().join("raw");
        Config {
            data_ingestion: IngestionConfig {
                bucket_name: "b".to_string(),
                bucket_file_name: key.to_string(),
                train_ratio: ratio,
            },
            paths: DataPaths {
                raw_file: raw_dir.join("raw.csv"),
                train_file: raw_dir.join("train.csv"),
                test_file: raw_dir.join("test.csv"),
                raw_dir,
            },
            structured_logging: false,
        }
    }

    async fn store_with(key: &str, body: String) -> Result<Arc<dyn ObjectStore>> {
        let store: Arc<dyn ObjectStore> = Arc::new(InMemory::new());
        store
            .put(&Path::from(key), PutPayload::from(Bytes::from(body)))
            .await?;
        Ok(store)
    }

    fn indices(contents: &str) -> Vec<usize> {
        contents
            .lines()
            .skip(1)
            .map(|line| line.split(',').next().unwrap().parse().unwrap())
            .collect()
    }

    #[tokio::test]
    async fn ingests_via_case_insensitive_fallback() -> Result<()> {
        // store holds "Data.csv" while the config requests "data.csv"
        let store = store_with("Data.csv", hundred_row_csv()).await?;
        let dir = TempDir::new()?;
        let config = test_config(&dir, "data.csv", 0.8);

        let ingestion = DataIngestion::with_store(config.clone(), store)?;
        ingestion.run().await?;

        let train = indices(&std::fs::read_to_string(&config.paths.train_file)?);
        let test = indices(&std::fs::read_to_string(&config.paths.test_file)?);
        assert_eq!(train.len(), 80);
        assert_eq!(test.len(), 20);

        let all: HashSet<usize> = train.iter().chain(test.iter()).copied().collect();
        assert_eq!(all, (0..100).collect());
        Ok(())
    }

    #[tokio::test]
    async fn ingests_an_exact_key() -> Result<()> {
        let store = store_with("data.csv", hundred_row_csv()).await?;
        let dir = TempDir::new()?;
        let config = test_config(&dir, "data.csv", 0.5);

        DataIngestion::with_store(config.clone(), store)?.run().await?;

        assert!(config.paths.raw_file.exists());
        assert!(config.paths.train_file.exists());
        assert!(config.paths.test_file.exists());
        Ok(())
    }

    #[tokio::test]
    async fn missing_object_fails_the_run_with_object_not_found() -> Result<()> {
        let store = store_with("unrelated.csv", "x\n1\n".to_string()).await?;
        let dir = TempDir::new()?;
        let config = test_config(&dir, "data.csv", 0.8);

        let err = DataIngestion::with_store(config, store)?
            .run()
            .await
            .unwrap_err();
        match err {
            IngestError::ObjectNotFound { bucket, key, .. } => {
                assert_eq!(bucket, "b");
                assert_eq!(key, "data.csv");
            }
            other => panic!("expected ObjectNotFound, got {other:?}"),
        }
        Ok(())
    }

    #[tokio::test]
    async fn repeated_runs_produce_identical_partitions() -> Result<()> {
        let body = hundred_row_csv();
        let first_dir = TempDir::new()?;
        let second_dir = TempDir::new()?;

        for dir in [&first_dir, &second_dir] {
            let store = store_with("data.csv", body.clone()).await?;
            let config = test_config(dir, "data.csv", 0.8);
            DataIngestion::with_store(config, store)?.run().await?;
        }

        assert_eq!(
            std::fs::read(first_dir.path().join("raw/train.csv"))?,
            std::fs::read(second_dir.path().join("raw/train.csv"))?
        );
        assert_eq!(
            std::fs::read(first_dir.path().join("raw/test.csv"))?,
            std::fs::read(second_dir.path().join("raw/test.csv"))?
        );
        Ok(())
    }

    #[tokio::test]
    async fn non_csv_object_fails_the_split() -> Result<()> {
        // ragged rows cannot be parsed as tabular CSV
        let store = store_with("data.csv", "a,b\n1,2\n3,4,5\n".to_string()).await?;
        let dir = TempDir::new()?;
        let config = test_config(&dir, "data.csv", 0.8);

        let err = DataIngestion::with_store(config, store)?
            .run()
            .await
            .unwrap_err();
        assert!(matches!(err, IngestError::DataFormat { .. }));
        Ok(())
    }
}
