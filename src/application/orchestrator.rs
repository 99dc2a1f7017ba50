//! Session Orchestrator - drives one session through its lifecycle.
//!
//! `NotStarted -> Surveyed -> InChat -> SurveyedPost -> Finalized`
//!
//! Each event runs to completion before the next is accepted (`&mut self`).
//! Generation failures never surface here; they arrive as fallback
//! profiles and replies. Out-of-order events come back as `SessionError`
//! and leave the session unchanged.

use serde::Serialize;
use std::sync::Arc;

use crate::domain::conversation::{Message, Stage, StageSelector};
use crate::domain::foundation::SessionId;
use crate::domain::profile::{Profile, Stance};
use crate::domain::session::{FinalizedSession, Session, SessionError, SessionEvent, SessionStatus};
use crate::domain::survey::SurveyAnswers;
use crate::domain::topic::TopicContext;
use crate::ports::StorageRef;

use super::reply_planner::TurnContext;
use super::{
    MessageProfiler, ProfileSource, ReplyPlanner, ReplySource, SessionServices, SurveyProfiler,
};

/// Outcome of archiving a finalized session.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum ArchiveStatus {
    Stored { reference: StorageRef },
    Failed { reason: String },
}

/// Structured result of one event.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum SessionOutcome {
    Seeded {
        session_id: SessionId,
        target_stance: Stance,
        survey_average: f64,
        profile: Profile,
        profile_source: ProfileSource,
        stage: Stage,
        opening: String,
        reply_source: ReplySource,
    },
    Replied {
        session_id: SessionId,
        turn: usize,
        profile: Profile,
        profile_source: ProfileSource,
        stage: Stage,
        reply: String,
        reply_source: ReplySource,
    },
    ConversationEnded {
        session_id: SessionId,
        turns: usize,
    },
    Finalized {
        record: Box<FinalizedSession>,
        archive: ArchiveStatus,
    },
}

impl SessionOutcome {
    pub fn session_id(&self) -> SessionId {
        match self {
            SessionOutcome::Seeded { session_id, .. }
            | SessionOutcome::Replied { session_id, .. }
            | SessionOutcome::ConversationEnded { session_id, .. } => *session_id,
            SessionOutcome::Finalized { record, .. } => record.session_id,
        }
    }
}

/// Target stance: explicit > configured > opposite of the survey stance,
/// with `Pro` when the survey is not polarised. Non-polar requests are ignored.
pub fn resolve_target(explicit: Option<Stance>, configured: Option<Stance>, survey: Stance) -> Stance {
    explicit
        .filter(Stance::is_polar)
        .or_else(|| configured.filter(Stance::is_polar))
        .unwrap_or_else(|| {
            if survey.is_polar() {
                survey.opposite()
            } else {
                Stance::Pro
            }
        })
}

/// Owns one live session and its per-session service handles.
pub struct SessionOrchestrator {
    session: Session,
    services: SessionServices,
    survey_profiler: SurveyProfiler,
    message_profiler: MessageProfiler,
    planner: ReplyPlanner,
    selector: StageSelector,
    record: Option<FinalizedSession>,
    archived: Option<StorageRef>,
}

impl SessionOrchestrator {
    pub fn new(topic: Arc<TopicContext>, services: SessionServices) -> Self {
        Self::with_id(SessionId::new(), topic, services)
    }

    pub fn with_id(id: SessionId, topic: Arc<TopicContext>, services: SessionServices) -> Self {
        Self {
            session: Session::new(id, topic),
            survey_profiler: services.survey_profiler(),
            message_profiler: services.message_profiler(),
            planner: services.reply_planner(),
            selector: services.stage_selector(),
            services,
            record: None,
            archived: None,
        }
    }

    pub fn id(&self) -> SessionId {
        *self.session.id()
    }

    pub fn session(&self) -> &Session {
        &self.session
    }

    pub fn status(&self) -> SessionStatus {
        self.session.status()
    }

    /// The record handed to persistence, once finalized.
    pub fn finalized_record(&self) -> Option<&FinalizedSession> {
        self.record.as_ref()
    }

    /// Where the record was archived, if archiving has succeeded.
    pub fn archive_ref(&self) -> Option<&StorageRef> {
        self.archived.as_ref()
    }

    /// Dispatches one of the four events.
    pub async fn apply(&mut self, event: SessionEvent) -> Result<SessionOutcome, SessionError> {
        let kind = event.kind();
        let result = match event {
            SessionEvent::PreSurveySubmitted {
                answers,
                target_stance,
            } => self.submit_pre_survey(answers, target_stance).await,
            SessionEvent::UserMessage { content } => self.handle_user_message(&content).await,
            SessionEvent::EndConversation => self.end_conversation(),
            SessionEvent::PostSurveySubmitted { answers } => self.submit_post_survey(answers).await,
        };

        if let Err(err) = &result {
            tracing::warn!(
                session_id = %self.id(),
                event = kind,
                status = %self.status(),
                error = %err,
                "Event rejected"
            );
        }
        result
    }

    /// NotStarted -> Surveyed: classify the survey, resolve the target and
    /// seed the history with the opening.
    pub async fn submit_pre_survey(
        &mut self,
        answers: SurveyAnswers,
        target_stance: Option<Stance>,
    ) -> Result<SessionOutcome, SessionError> {
        self.session
            .ensure_can(SessionStatus::Surveyed, "pre_survey_submitted")?;

        let id = self.id();
        let survey = self
            .survey_profiler
            .profile(id, self.session.topic(), &answers)
            .await;
        let profile = survey.derived.profile.clone();
        let target = resolve_target(
            target_stance,
            self.services.settings.target_stance,
            profile.stance(),
        );

        let opening = self
            .planner
            .plan_opening(id, self.session.topic(), &profile, target, survey.average)
            .await;

        let message = Message::assistant(opening.text.clone())?;
        self.session
            .seed(answers, target, profile.clone(), message)?;

        tracing::info!(
            session_id = %id,
            status = %self.status(),
            target = target.label(),
            profile_fallback = survey.derived.source.is_fallback(),
            opening_fallback = opening.source.is_fallback(),
            "Session seeded"
        );

        Ok(SessionOutcome::Seeded {
            session_id: id,
            target_stance: target,
            survey_average: survey.average,
            profile,
            profile_source: survey.derived.source,
            stage: Stage::Rapport,
            opening: opening.text,
            reply_source: opening.source,
        })
    }

    /// Surveyed/InChat -> InChat: re-profile, select the stage, plan the
    /// reply, then commit the message and the reply together. A turn that is
    /// dropped before it completes leaves the session as it was.
    pub async fn handle_user_message(&mut self, content: &str) -> Result<SessionOutcome, SessionError> {
        self.session.ensure_can(SessionStatus::InChat, "user_message")?;
        let pending = self.session.begin_turn(Message::user(content)?)?;
        let turn = pending.turn();

        let id = self.id();
        let target = self.session.target();
        let derived = self
            .message_profiler
            .profile(id, self.session.topic(), pending.history(), pending.latest())
            .await;
        let stage = self.selector.select(turn, &derived.profile, target);

        let reply = self
            .planner
            .plan_reply(TurnContext {
                session_id: id,
                topic: self.session.topic(),
                stage,
                profile: &derived.profile,
                target,
                history: pending.history(),
                latest: pending.latest(),
            })
            .await;

        let message = Message::assistant(reply.text.clone())?;
        let turn = self
            .session
            .complete_turn(pending, derived.profile.clone(), stage, message)?;

        tracing::info!(
            session_id = %id,
            turn,
            stage = %stage,
            stance = derived.profile.stance().label(),
            readiness = derived.profile.change_readiness().value(),
            reply_fallback = reply.source.is_fallback(),
            "Turn completed"
        );

        Ok(SessionOutcome::Replied {
            session_id: id,
            turn,
            profile: derived.profile,
            profile_source: derived.source,
            stage,
            reply: reply.text,
            reply_source: reply.source,
        })
    }

    /// InChat -> SurveyedPost. No core computation.
    pub fn end_conversation(&mut self) -> Result<SessionOutcome, SessionError> {
        self.session.end_conversation()?;
        tracing::info!(
            session_id = %self.id(),
            turns = self.session.turn_count(),
            "Conversation ended"
        );
        Ok(SessionOutcome::ConversationEnded {
            session_id: self.id(),
            turns: self.session.turn_count(),
        })
    }

    /// SurveyedPost -> Finalized, then hands the record to the archive. An
    /// archive failure is reported in the outcome and the record is kept
    /// for `retry_archive`.
    pub async fn submit_post_survey(
        &mut self,
        answers: SurveyAnswers,
    ) -> Result<SessionOutcome, SessionError> {
        let record = self.session.finalize(answers)?;
        tracing::info!(
            session_id = %record.session_id,
            pre_average = record.pre_average,
            post_average = record.post_average,
            shift = record.stance_shift,
            "Session finalized"
        );
        self.record = Some(record.clone());

        let archive = match self.services.archive.save(&record).await {
            Ok(reference) => {
                self.archived = Some(reference.clone());
                ArchiveStatus::Stored { reference }
            }
            Err(err) => {
                tracing::warn!(
                    session_id = %record.session_id,
                    error = %err,
                    "Archiving failed, finalized session kept in memory"
                );
                ArchiveStatus::Failed {
                    reason: err.to_string(),
                }
            }
        };

        Ok(SessionOutcome::Finalized {
            record: Box::new(record),
            archive,
        })
    }

    /// Archives the finalized record again after an earlier failure. Returns
    /// the existing reference when already stored.
    pub async fn retry_archive(&mut self) -> Result<StorageRef, SessionError> {
        if let Some(reference) = &self.archived {
            return Ok(reference.clone());
        }
        let record = self
            .record
            .as_ref()
            .ok_or_else(|| SessionError::invalid_transition(self.session.status(), "retry_archive"))?;

        let reference = self
            .services
            .archive
            .save(record)
            .await
            .map_err(|e| SessionError::infrastructure(e.to_string()))?;

        tracing::info!(session_id = %record.session_id, location = %reference.location, "Archive retry succeeded");
        self.archived = Some(reference.clone());
        Ok(reference)
    }
}
