//! Topic Catalog Port - read-only lookup of topic descriptors.

use async_trait::async_trait;
use std::sync::Arc;

use crate::domain::foundation::TopicId;
use crate::domain::topic::TopicContext;

/// Errors that can occur while reading a catalog.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CatalogError {
    /// Catalog source could not be read
    Unavailable(String),
    /// Catalog source is not in the expected format
    Malformed(String),
}

impl std::fmt::Display for CatalogError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Unavailable(msg) => write!(f, "Topic catalog unavailable: {}", msg),
            Self::Malformed(msg) => write!(f, "Topic catalog malformed: {}", msg),
        }
    }
}

impl std::error::Error for CatalogError {}

/// Supplies topic descriptors by identifier. Never mutated by the core.
#[async_trait]
pub trait TopicCatalog: Send + Sync {
    /// Look up one topic
    async fn get(&self, id: &TopicId) -> Result<Option<Arc<TopicContext>>, CatalogError>;

    /// All topics, in catalog order
    async fn list(&self) -> Result<Vec<Arc<TopicContext>>, CatalogError>;
}
