//! Session Archive Port - durable storage of finalized sessions.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::domain::session::FinalizedSession;

/// Errors that can occur while archiving
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StorageError {
    /// Record not found
    NotFound(String),
    /// IO error
    IoError(String),
    /// Record could not be encoded or decoded
    Serialization(String),
    /// Checksum mismatch
    ChecksumMismatch { expected: String, actual: String },
}

impl std::fmt::Display for StorageError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::NotFound(msg) => write!(f, "Record not found: {}", msg),
            Self::IoError(msg) => write!(f, "IO error: {}", msg),
            Self::Serialization(msg) => write!(f, "Serialization error: {}", msg),
            Self::ChecksumMismatch { expected, actual } => {
                write!(f, "Checksum mismatch: expected {}, got {}", expected, actual)
            }
        }
    }
}

impl std::error::Error for StorageError {}

/// Where an archived record lives.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StorageRef {
    /// Adapter-specific location (file path, key)
    pub location: String,
    /// SHA-256 of the stored bytes, hex encoded
    pub checksum: String,
    pub size_bytes: u64,
}

/// Accepts finalized sessions for durable storage
#[async_trait]
pub trait SessionArchive: Send + Sync {
    /// Store one finalized session
    async fn save(&self, record: &FinalizedSession) -> Result<StorageRef, StorageError>;

    /// Read a stored session back, verifying its checksum
    async fn load(&self, reference: &StorageRef) -> Result<FinalizedSession, StorageError>;
}
