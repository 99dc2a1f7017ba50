//! Data file locations

use serde::Deserialize;
use std::path::{Path, PathBuf};

use super::error::ValidationError;

#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
pub struct StorageConfig {
    /// Directory for archived sessions
    #[serde(default = "default_data_dir")]
    pub data_dir: PathBuf,

    /// Topic catalog file
    #[serde(default = "default_topics_file")]
    pub topics_file: PathBuf,
}

impl StorageConfig {
    pub fn sessions_dir(&self) -> &Path {
        &self.data_dir
    }

    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.data_dir.as_os_str().is_empty() {
            return Err(ValidationError::MissingRequired("STORAGE__DATA_DIR"));
        }
        if self.topics_file.as_os_str().is_empty() {
            return Err(ValidationError::MissingRequired("STORAGE__TOPICS_FILE"));
        }
        Ok(())
    }
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            data_dir: default_data_dir(),
            topics_file: default_topics_file(),
        }
    }
}

fn default_data_dir() -> PathBuf {
    PathBuf::from("data")
}

fn default_topics_file() -> PathBuf {
    PathBuf::from("data/topics.json")
}
