use std::path::{Path, PathBuf};

use figment::{
    providers::{Format, Yaml},
    Figment,
};
use serde::{Deserialize, Serialize};

use crate::error::IngestError;

pub const DEFAULT_CONFIG_PATH: &str = "config/config.yaml";

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    pub data_ingestion: IngestionConfig,
    #[serde(default)]
    pub paths: DataPaths,
    #[serde(default)]
    pub structured_logging: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IngestionConfig {
    pub bucket_name: String,
    pub bucket_file_name: String,
    pub train_ratio: f64,
}

/// On-disk layout for ingestion artifacts. Passed into components
/// explicitly rather than read from ambient globals.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DataPaths {
    pub raw_dir: PathBuf,
    pub raw_file: PathBuf,
    pub train_file: PathBuf,
    pub test_file: PathBuf,
}

impl Default for DataPaths {
    fn default() -> Self {
        let raw_dir = PathBuf::from("artifacts/raw");
        DataPaths {
            raw_file: raw_dir.join("raw.csv"),
            train_file: raw_dir.join("train.csv"),
            test_file: raw_dir.join("test.csv"),
            raw_dir,
        }
    }
}

impl Config {
    pub fn from_path(path: &Path) -> Result<Config, IngestError> {
        let config_str = std::fs::read_to_string(path).map_err(|source| {
            if source.kind() == std::io::ErrorKind::NotFound {
                IngestError::ConfigNotFound {
                    path: path.display().to_string(),
                    source,
                }
            } else {
                IngestError::Io {
                    path: path.display().to_string(),
                    source,
                }
            }
        })?;
        let config: Config = Figment::new()
            .merge(Yaml::string(&config_str))
            .extract()
            .map_err(|source| IngestError::ConfigParse {
                path: path.display().to_string(),
                source,
            })?;
        config
            .validate()
            .map_err(|source| IngestError::ConfigParse {
                path: path.display().to_string(),
                source,
            })?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), figment::Error> {
        let ratio = self.data_ingestion.train_ratio;
        if !(ratio > 0.0 && ratio < 1.0) {
            return Err(figment::Error::from(format!(
                "train_ratio must be in (0, 1), got {ratio}"
            )));
        }
        if self.data_ingestion.bucket_name.is_empty() {
            return Err(figment::Error::from("bucket_name must not be empty".to_string()));
        }
        Ok(())
    }
}
