//! Filesystem archive for finalized sessions.

use async_trait::async_trait;
use sha2::{Digest, Sha256};
use std::path::{Path, PathBuf};
use tokio::fs;

use crate::domain::session::FinalizedSession;
use crate::ports::{SessionArchive, StorageError, StorageRef};

/// Writes each finalized session as pretty JSON to
/// `{base_dir}/session_{YYYYmmdd_HHMMSS}_{session_id}.json`.
pub struct FsSessionArchive {
    base_dir: PathBuf,
}

impl FsSessionArchive {
    pub fn new(base_dir: impl AsRef<Path>) -> Self {
        Self {
            base_dir: base_dir.as_ref().to_path_buf(),
        }
    }

    pub fn base_dir(&self) -> &Path {
        &self.base_dir
    }

    fn file_path(&self, record: &FinalizedSession) -> PathBuf {
        self.base_dir.join(format!(
            "session_{}_{}.json",
            record.finalized_at.file_stamp(),
            record.session_id
        ))
    }

    fn compute_checksum(bytes: &[u8]) -> String {
        let mut hasher = Sha256::new();
        hasher.update(bytes);
        format!("{:x}", hasher.finalize())
    }
}

#[async_trait]
impl SessionArchive for FsSessionArchive {
    async fn save(&self, record: &FinalizedSession) -> Result<StorageRef, StorageError> {
        let bytes = serde_json::to_vec_pretty(record)
            .map_err(|e| StorageError::Serialization(e.to_string()))?;

        fs::create_dir_all(&self.base_dir)
            .await
            .map_err(|e| StorageError::IoError(format!("Failed to create directory: {}", e)))?;

        let file_path = self.file_path(record);

        // Write to a temporary file, then rename into place
        let temp_path = file_path.with_extension("json.tmp");
        fs::write(&temp_path, &bytes).await.map_err(|e| {
            StorageError::IoError(format!("Failed to write temporary file: {}", e))
        })?;
        fs::rename(&temp_path, &file_path)
            .await
            .map_err(|e| StorageError::IoError(format!("Failed to rename file: {}", e)))?;

        tracing::info!(
            session_id = %record.session_id,
            path = %file_path.display(),
            bytes = bytes.len(),
            "Archived finalized session"
        );

        Ok(StorageRef {
            location: file_path.to_string_lossy().into_owned(),
            checksum: Self::compute_checksum(&bytes),
            size_bytes: bytes.len() as u64,
        })
    }

    async fn load(&self, reference: &StorageRef) -> Result<FinalizedSession, StorageError> {
        let bytes = fs::read(&reference.location).await.map_err(|e| {
            if e.kind() == std::io::ErrorKind::NotFound {
                StorageError::NotFound(reference.location.clone())
            } else {
                StorageError::IoError(format!("Failed to read file: {}", e))
            }
        })?;

        let actual = Self::compute_checksum(&bytes);
        if actual != reference.checksum {
            return Err(StorageError::ChecksumMismatch {
                expected: reference.checksum.clone(),
                actual,
            });
        }

        serde_json::from_slice(&bytes).map_err(|e| StorageError::Serialization(e.to_string()))
    }
}
