//! Topic catalog read from a JSON file.
//!
//! The file holds an array of `{id, title, description, questions}` objects.
//! Entries that fail validation are skipped with a warning; a missing file
//! is an empty catalog.

use async_trait::async_trait;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use crate::domain::foundation::TopicId;
use crate::domain::topic::{TopicContext, TopicRecord};
use crate::ports::{CatalogError, TopicCatalog};

/// Catalog loaded once from `topics.json`.
#[derive(Debug, Clone)]
pub struct JsonTopicCatalog {
    path: PathBuf,
    topics: Vec<Arc<TopicContext>>,
}

impl JsonTopicCatalog {
    /// Reads and validates the catalog file.
    pub async fn load(path: impl AsRef<Path>) -> Result<Self, CatalogError> {
        let path = path.as_ref().to_path_buf();

        let raw = match tokio::fs::read_to_string(&path).await {
            Ok(raw) => raw,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                tracing::warn!(path = %path.display(), "Topic catalog not found, using empty catalog");
                return Ok(Self {
                    path,
                    topics: Vec::new(),
                });
            }
            Err(e) => {
                return Err(CatalogError::Unavailable(format!(
                    "{}: {}",
                    path.display(),
                    e
                )))
            }
        };

        let topics = Self::parse(&raw)?;
        tracing::info!(path = %path.display(), topics = topics.len(), "Loaded topic catalog");
        Ok(Self { path, topics })
    }

    /// Parses catalog JSON, skipping invalid or duplicate entries.
    pub fn parse(raw: &str) -> Result<Vec<Arc<TopicContext>>, CatalogError> {
        let entries: Vec<serde_json::Value> =
            serde_json::from_str(raw).map_err(|e| CatalogError::Malformed(e.to_string()))?;

        let mut topics: Vec<Arc<TopicContext>> = Vec::with_capacity(entries.len());
        for (index, entry) in entries.into_iter().enumerate() {
            let record: TopicRecord = match serde_json::from_value(entry) {
                Ok(record) => record,
                Err(e) => {
                    tracing::warn!(index, error = %e, "Skipping unreadable topic entry");
                    continue;
                }
            };
            let id = record.id.clone();
            match TopicContext::try_from(record) {
                Ok(topic) if topics.iter().any(|t| t.id() == topic.id()) => {
                    tracing::warn!(index, topic_id = %id, "Skipping duplicate topic id");
                }
                Ok(topic) => topics.push(Arc::new(topic)),
                Err(e) => {
                    tracing::warn!(index, topic_id = %id, error = %e, "Skipping invalid topic");
                }
            }
        }
        Ok(topics)
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

#[async_trait]
impl TopicCatalog for JsonTopicCatalog {
    async fn get(&self, id: &TopicId) -> Result<Option<Arc<TopicContext>>, CatalogError> {
        Ok(self.topics.iter().find(|t| t.id() == id).cloned())
    }

    async fn list(&self) -> Result<Vec<Arc<TopicContext>>, CatalogError> {
        Ok(self.topics.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    const CATALOG: &str = r#"[
        {"id": "ubi", "title": "Universal Basic Income", "description": "A guaranteed payment",
         "questions": ["UBI reduces poverty", "UBI is affordable"]},
        {"id": "", "title": "No id"},
        {"id": "blank", "title": "   "},
        {"id": "dupes", "title": "Dupes", "questions": ["Same", "Same"]},
        {"title": "Missing id"},
        {"id": "ubi", "title": "Second UBI"},
        {"id": "remote", "title": "Remote work"}
    ]"#;

    #[test]
    fn parse_skips_invalid_entries() {
        let topics = JsonTopicCatalog::parse(CATALOG).unwrap();
        let ids: Vec<&str> = topics.iter().map(|t| t.id().as_str()).collect();
        assert_eq!(ids, vec!["ubi", "remote"]);
        assert_eq!(topics[0].questions().len(), 2);
        assert!(topics[1].questions().is_empty());
    }

    #[test]
    fn parse_rejects_non_array() {
        assert!(matches!(
            JsonTopicCatalog::parse(r#"{"id": "x"}"#),
            Err(CatalogError::Malformed(_))
        ));
    }

    #[tokio::test]
    async fn load_reads_file() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("topics.json");
        std::fs::write(&path, CATALOG).unwrap();

        let catalog = JsonTopicCatalog::load(&path).await.unwrap();
        let topic = catalog
            .get(&TopicId::new("ubi").unwrap())
            .await
            .unwrap()
            .unwrap();
        assert_eq!(topic.title(), "Universal Basic Income");
        assert_eq!(catalog.list().await.unwrap().len(), 2);
    }

    #[tokio::test]
    async fn unknown_id_is_none() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("topics.json");
        std::fs::write(&path, CATALOG).unwrap();

        let catalog = JsonTopicCatalog::load(&path).await.unwrap();
        assert!(catalog
            .get(&TopicId::new("nope").unwrap())
            .await
            .unwrap()
            .is_none());
    }

    #[tokio::test]
    async fn missing_file_is_empty_catalog() {
        let dir = TempDir::new().unwrap();
        let catalog = JsonTopicCatalog::load(dir.path().join("absent.json"))
            .await
            .unwrap();
        assert!(catalog.list().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn corrupt_file_is_malformed() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("topics.json");
        std::fs::write(&path, "not json").unwrap();

        assert!(matches!(
            JsonTopicCatalog::load(&path).await,
            Err(CatalogError::Malformed(_))
        ));
    }
}
