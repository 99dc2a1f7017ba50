//! In-memory topic catalog.

use async_trait::async_trait;
use std::sync::Arc;

use crate::domain::foundation::TopicId;
use crate::domain::topic::TopicContext;
use crate::ports::{CatalogError, TopicCatalog};

/// Fixed set of topics held in memory, in insertion order.
#[derive(Debug, Clone, Default)]
pub struct InMemoryTopicCatalog {
    topics: Vec<Arc<TopicContext>>,
}

impl InMemoryTopicCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a topic, replacing any existing topic with the same id.
    pub fn with_topic(mut self, topic: TopicContext) -> Self {
        self.topics.retain(|t| t.id() != topic.id());
        self.topics.push(Arc::new(topic));
        self
    }
}

#[async_trait]
impl TopicCatalog for InMemoryTopicCatalog {
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

    fn topic(id: &str, title: &str) -> TopicContext {
        TopicContext::new(TopicId::new(id).unwrap(), title, "", vec![]).unwrap()
    }

    #[tokio::test]
    async fn finds_by_id() {
        let catalog = InMemoryTopicCatalog::new()
            .with_topic(topic("a", "Alpha"))
            .with_topic(topic("b", "Beta"));

        let found = catalog.get(&TopicId::new("b").unwrap()).await.unwrap();
        assert_eq!(found.unwrap().title(), "Beta");
        assert_eq!(catalog.list().await.unwrap().len(), 2);
    }

    #[tokio::test]
    async fn same_id_replaces() {
        let catalog = InMemoryTopicCatalog::new()
            .with_topic(topic("a", "Alpha"))
            .with_topic(topic("a", "Again"));

        let all = catalog.list().await.unwrap();
        assert_eq!(all.len(), 1);
        assert_eq!(all[0].title(), "Again");
    }
}
