//! In-memory session archive for tests and headless runs.

use async_trait::async_trait;
use sha2::{Digest, Sha256};
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;

use crate::domain::session::FinalizedSession;
use crate::ports::{SessionArchive, StorageError, StorageRef};

/// Keeps archived records in a map keyed by `memory://{session_id}`.
///
/// `fail_next_saves` makes the next N saves fail, for exercising the
/// archive-failure path.
#[derive(Debug, Clone, Default)]
pub struct InMemorySessionArchive {
    records: Arc<RwLock<HashMap<String, (FinalizedSession, String)>>>,
    failures: Arc<RwLock<usize>>,
}

impl InMemorySessionArchive {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn fail_next_saves(&self, count: usize) {
        *self.failures.write().await = count;
    }

    pub async fn len(&self) -> usize {
        self.records.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.records.read().await.is_empty()
    }

    pub async fn records(&self) -> Vec<FinalizedSession> {
        self.records
            .read()
            .await
            .values()
            .map(|(record, _)| record.clone())
            .collect()
    }
}

#[async_trait]
impl SessionArchive for InMemorySessionArchive {
    async fn save(&self, record: &FinalizedSession) -> Result<StorageRef, StorageError> {
        {
            let mut failures = self.failures.write().await;
            if *failures > 0 {
                *failures -= 1;
                return Err(StorageError::IoError("injected failure".to_string()));
            }
        }

        let bytes =
            serde_json::to_vec(record).map_err(|e| StorageError::Serialization(e.to_string()))?;
        let checksum = format!("{:x}", Sha256::digest(&bytes));
        let location = format!("memory://{}", record.session_id);

        self.records
            .write()
            .await
            .insert(location.clone(), (record.clone(), checksum.clone()));

        Ok(StorageRef {
            location,
            checksum,
            size_bytes: bytes.len() as u64,
        })
    }

    async fn load(&self, reference: &StorageRef) -> Result<FinalizedSession, StorageError> {
        let records = self.records.read().await;
        let (record, checksum) = records
            .get(&reference.location)
            .ok_or_else(|| StorageError::NotFound(reference.location.clone()))?;

        if *checksum != reference.checksum {
            return Err(StorageError::ChecksumMismatch {
                expected: reference.checksum.clone(),
                actual: checksum.clone(),
            });
        }
        Ok(record.clone())
    }
}
