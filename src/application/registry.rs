//! Registry of live sessions.
//!
//! Each session sits behind its own async mutex, so events for one session
//! run strictly one after another while independent sessions proceed
//! concurrently. The map lock is only held long enough to find the entry.
//!
//! A session leaves the map once its finalized record is archived; only
//! its id is remembered, so later events are still refused as finalized.

use std::collections::{HashMap, HashSet};
use std::sync::Arc;
use tokio::sync::{Mutex, RwLock};

use crate::domain::foundation::{SessionId, TopicId};
use crate::domain::session::{SessionError, SessionEvent, SessionStatus};
use crate::ports::{StorageRef, TopicCatalog};

use super::{ArchiveStatus, SessionOrchestrator, SessionOutcome, SessionServices};

type SessionHandle = Arc<Mutex<SessionOrchestrator>>;

pub struct SessionRegistry {
    services: SessionServices,
    catalog: Arc<dyn TopicCatalog>,
    sessions: RwLock<HashMap<SessionId, SessionHandle>>,
    archived: RwLock<HashSet<SessionId>>,
}

impl SessionRegistry {
    pub fn new(services: SessionServices, catalog: Arc<dyn TopicCatalog>) -> Self {
        Self {
            services,
            catalog,
            sessions: RwLock::new(HashMap::new()),
            archived: RwLock::new(HashSet::new()),
        }
    }

    /// Opens a session on a catalog topic.
    pub async fn open(&self, topic_id: &TopicId) -> Result<SessionId, SessionError> {
        let topic = self
            .catalog
            .get(topic_id)
            .await
            .map_err(|e| SessionError::infrastructure(e.to_string()))?
            .ok_or_else(|| SessionError::TopicNotFound(topic_id.clone()))?;

        let orchestrator = SessionOrchestrator::new(topic, self.services.clone());
        let id = orchestrator.id();
        self.sessions
            .write()
            .await
            .insert(id, Arc::new(Mutex::new(orchestrator)));

        tracing::info!(session_id = %id, topic_id = %topic_id, "Session opened");
        Ok(id)
    }

    /// Applies an event to one session, waiting for any event already
    /// running on that session.
    pub async fn dispatch(
        &self,
        id: &SessionId,
        event: SessionEvent,
    ) -> Result<SessionOutcome, SessionError> {
        let handle = self.handle(id).await?;
        let mut orchestrator = handle.lock().await;
        let outcome = orchestrator.apply(event).await?;

        if let SessionOutcome::Finalized {
            archive: ArchiveStatus::Stored { .. },
            ..
        } = &outcome
        {
            self.evict(id).await;
        }
        Ok(outcome)
    }

    /// Re-attempts archiving a finalized session whose first save failed.
    pub async fn retry_archive(&self, id: &SessionId) -> Result<StorageRef, SessionError> {
        let handle = self.handle(id).await?;
        let mut orchestrator = handle.lock().await;
        let reference = orchestrator.retry_archive().await?;
        self.evict(id).await;
        Ok(reference)
    }

    pub async fn status(&self, id: &SessionId) -> Result<SessionStatus, SessionError> {
        match self.handle(id).await {
            Ok(handle) => Ok(handle.lock().await.status()),
            Err(SessionError::Finalized) => Ok(SessionStatus::Finalized),
            Err(err) => Err(err),
        }
    }

    /// Drops a session. Returns false when it was not registered.
    pub async fn close(&self, id: &SessionId) -> bool {
        let forgotten = self.archived.write().await.remove(id);
        let removed = self.sessions.write().await.remove(id).is_some() || forgotten;
        if removed {
            tracing::info!(session_id = %id, "Session closed");
        }
        removed
    }

    /// Sessions still held in memory; archived ones are not counted.
    pub async fn len(&self) -> usize {
        self.sessions.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.sessions.read().await.is_empty()
    }

    async fn handle(&self, id: &SessionId) -> Result<SessionHandle, SessionError> {
        if let Some(handle) = self.sessions.read().await.get(id).cloned() {
            return Ok(handle);
        }
        if self.archived.read().await.contains(id) {
            return Err(SessionError::Finalized);
        }
        Err(SessionError::NotFound(*id))
    }

    /// The id is recorded before the entry goes, so a concurrent lookup
    /// always sees one or the other.
    async fn evict(&self, id: &SessionId) {
        self.archived.write().await.insert(*id);
        self.sessions.write().await.remove(id);
        tracing::debug!(session_id = %id, "Archived session evicted");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::generation::ScriptedGeneration;
    use crate::adapters::storage::InMemorySessionArchive;
    use crate::adapters::topics::InMemoryTopicCatalog;
    use crate::application::ConversationSettings;
    use crate::domain::survey::{SurveyAnswers, SurveyRating};
    use crate::domain::topic::TopicContext;
    use std::time::Duration;

    fn registry(gen: ScriptedGeneration) -> SessionRegistry {
        let topic = TopicContext::new(TopicId::new("ubi").unwrap(), "UBI", "", vec![]).unwrap();
        let services = SessionServices::new(
            Arc::new(gen),
            Arc::new(InMemorySessionArchive::new()),
            ConversationSettings::default(),
        );
        SessionRegistry::new(services, Arc::new(InMemoryTopicCatalog::new().with_topic(topic)))
    }

    fn pre_survey() -> SessionEvent {
        SessionEvent::PreSurveySubmitted {
            answers: SurveyAnswers::new().with("Q1", SurveyRating::new(8).unwrap()),
            target_stance: None,
        }
    }

    #[tokio::test]
    async fn open_unknown_topic_fails() {
        let reg = registry(ScriptedGeneration::new());
        let err = reg.open(&TopicId::new("nope").unwrap()).await.unwrap_err();
        assert!(matches!(err, SessionError::TopicNotFound(_)));
        assert!(reg.is_empty().await);
    }

    #[tokio::test]
    async fn dispatch_to_unknown_session_fails() {
        let reg = registry(ScriptedGeneration::new());
        let id = SessionId::new();
        assert_eq!(
            reg.dispatch(&id, pre_survey()).await.unwrap_err(),
            SessionError::NotFound(id)
        );
    }

    #[tokio::test]
    async fn sessions_are_independent() {
        let reg = registry(ScriptedGeneration::new());
        let a = reg.open(&TopicId::new("ubi").unwrap()).await.unwrap();
        let b = reg.open(&TopicId::new("ubi").unwrap()).await.unwrap();

        reg.dispatch(&a, pre_survey()).await.unwrap();

        assert_eq!(reg.status(&a).await.unwrap(), SessionStatus::Surveyed);
        assert_eq!(reg.status(&b).await.unwrap(), SessionStatus::NotStarted);
        assert_eq!(reg.len().await, 2);
    }

    #[tokio::test]
    async fn events_on_one_session_are_serialised() {
        let gen = ScriptedGeneration::new().with_delay(Duration::from_millis(20));
        let reg = Arc::new(registry(gen));
        let id = reg.open(&TopicId::new("ubi").unwrap()).await.unwrap();
        reg.dispatch(&id, pre_survey()).await.unwrap();

        let mut tasks = Vec::new();
        for i in 0..4 {
            let reg = Arc::clone(&reg);
            tasks.push(tokio::spawn(async move {
                reg.dispatch(&id, SessionEvent::UserMessage { content: format!("message {}", i) })
                    .await
            }));
        }
        let mut turns = Vec::new();
        for task in tasks {
            match task.await.unwrap().unwrap() {
                SessionOutcome::Replied { turn, .. } => turns.push(turn),
                other => panic!("unexpected outcome {:?}", other),
            }
        }
        turns.sort_unstable();
        assert_eq!(turns, vec![1, 2, 3, 4]);

        let handle = reg.handle(&id).await.unwrap();
        assert_eq!(handle.lock().await.session().history().len(), 9);
    }

    async fn finalize(reg: &SessionRegistry, id: &SessionId) -> SessionOutcome {
        reg.dispatch(id, pre_survey()).await.unwrap();
        reg.dispatch(id, SessionEvent::UserMessage { content: "hi".into() })
            .await
            .unwrap();
        reg.dispatch(id, SessionEvent::EndConversation).await.unwrap();
        reg.dispatch(
            id,
            SessionEvent::PostSurveySubmitted {
                answers: SurveyAnswers::new().with("Q1", SurveyRating::new(5).unwrap()),
            },
        )
        .await
        .unwrap()
    }

    #[tokio::test]
    async fn archived_session_is_evicted_but_stays_finalized() {
        let reg = registry(ScriptedGeneration::new());
        let id = reg.open(&TopicId::new("ubi").unwrap()).await.unwrap();
        let other = reg.open(&TopicId::new("ubi").unwrap()).await.unwrap();

        let outcome = finalize(&reg, &id).await;
        assert!(matches!(
            outcome,
            SessionOutcome::Finalized { archive: ArchiveStatus::Stored { .. }, .. }
        ));

        assert_eq!(reg.len().await, 1);
        assert!(reg.handle(&other).await.is_ok());
        assert_eq!(reg.status(&id).await.unwrap(), SessionStatus::Finalized);
        assert_eq!(
            reg.dispatch(&id, SessionEvent::EndConversation).await.unwrap_err(),
            SessionError::Finalized
        );
    }

    #[tokio::test]
    async fn failed_archive_keeps_session_until_retry_succeeds() {
        let archive = InMemorySessionArchive::new();
        archive.fail_next_saves(1).await;
        let topic = TopicContext::new(TopicId::new("ubi").unwrap(), "UBI", "", vec![]).unwrap();
        let services = SessionServices::new(
            Arc::new(ScriptedGeneration::new()),
            Arc::new(archive.clone()),
            ConversationSettings::default(),
        );
        let reg = SessionRegistry::new(
            services,
            Arc::new(InMemoryTopicCatalog::new().with_topic(topic)),
        );
        let id = reg.open(&TopicId::new("ubi").unwrap()).await.unwrap();

        let outcome = finalize(&reg, &id).await;
        assert!(matches!(
            outcome,
            SessionOutcome::Finalized { archive: ArchiveStatus::Failed { .. }, .. }
        ));
        assert_eq!(reg.len().await, 1);

        reg.retry_archive(&id).await.unwrap();
        assert!(reg.is_empty().await);
        assert_eq!(archive.len().await, 1);
        assert_eq!(reg.status(&id).await.unwrap(), SessionStatus::Finalized);
    }

    #[tokio::test]
    async fn close_removes_session() {
        let reg = registry(ScriptedGeneration::new());
        let id = reg.open(&TopicId::new("ubi").unwrap()).await.unwrap();
        assert!(reg.close(&id).await);
        assert!(!reg.close(&id).await);
    }
}
