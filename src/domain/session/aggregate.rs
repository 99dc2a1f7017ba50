//! Session aggregate.
//!
//! A session owns one conversation about one topic: the surveys, the
//! history, the current profile and the last computed stage. Every
//! mutation checks the lifecycle first, so an out-of-order event leaves
//! the session untouched.

use std::sync::Arc;

use crate::domain::conversation::{History, Message, Stage};
use crate::domain::foundation::{SessionId, StateMachine, Timestamp};
use crate::domain::profile::{Profile, Stance};
use crate::domain::survey::SurveyAnswers;
use crate::domain::topic::TopicContext;

use super::{FinalizedSession, SessionError, SessionStatus};

/// Live session state.
///
/// # Invariants
///
/// - `profile` is present in every status after `NotStarted`
/// - `history` only grows
/// - once `Finalized`, nothing changes
#[derive(Debug, Clone)]
pub struct Session {
    id: SessionId,
    topic: Arc<TopicContext>,
    status: SessionStatus,
    target: Stance,
    pre_survey: Option<SurveyAnswers>,
    post_survey: Option<SurveyAnswers>,
    history: History,
    profile: Option<Profile>,
    stage: Option<Stage>,
    created_at: Timestamp,
    updated_at: Timestamp,
}

/// A counterpart message validated against the lifecycle but not yet
/// part of the session.
#[derive(Debug, Clone)]
pub struct PendingTurn {
    message: Message,
    history: History,
}

impl PendingTurn {
    /// History including the pending message.
    pub fn history(&self) -> &History {
        &self.history
    }

    pub fn latest(&self) -> &str {
        self.message.content()
    }

    /// Turn number this message will have once committed.
    pub fn turn(&self) -> usize {
        self.history.turn_count()
    }
}

impl Session {
    pub fn new(id: SessionId, topic: Arc<TopicContext>) -> Self {
        let now = Timestamp::now();
        Self {
            id,
            topic,
            status: SessionStatus::NotStarted,
            target: Stance::Unknown,
            pre_survey: None,
            post_survey: None,
            history: History::new(),
            profile: None,
            stage: None,
            created_at: now,
            updated_at: now,
        }
    }

    pub fn id(&self) -> &SessionId {
        &self.id
    }

    pub fn topic(&self) -> &TopicContext {
        &self.topic
    }

    pub fn status(&self) -> SessionStatus {
        self.status
    }

    pub fn target(&self) -> Stance {
        self.target
    }

    pub fn pre_survey(&self) -> Option<&SurveyAnswers> {
        self.pre_survey.as_ref()
    }

    pub fn post_survey(&self) -> Option<&SurveyAnswers> {
        self.post_survey.as_ref()
    }

    pub fn history(&self) -> &History {
        &self.history
    }

    pub fn profile(&self) -> Option<&Profile> {
        self.profile.as_ref()
    }

    /// Stage computed on the most recent turn.
    pub fn stage(&self) -> Option<Stage> {
        self.stage
    }

    pub fn turn_count(&self) -> usize {
        self.history.turn_count()
    }

    pub fn created_at(&self) -> &Timestamp {
        &self.created_at
    }

    pub fn updated_at(&self) -> &Timestamp {
        &self.updated_at
    }

    pub fn is_finalized(&self) -> bool {
        self.status == SessionStatus::Finalized
    }

    /// Checks that `event` may move the session to `next`.
    pub fn ensure_can(&self, next: SessionStatus, event: &'static str) -> Result<(), SessionError> {
        if self.is_finalized() {
            return Err(SessionError::Finalized);
        }
        if !self.status.can_transition_to(&next) {
            return Err(SessionError::invalid_transition(self.status, event));
        }
        Ok(())
    }

    /// NotStarted -> Surveyed: stores the survey, seeds the profile and
    /// records the opening utterance.
    pub fn seed(
        &mut self,
        answers: SurveyAnswers,
        target: Stance,
        profile: Profile,
        opening: Message,
    ) -> Result<(), SessionError> {
        self.ensure_can(SessionStatus::Surveyed, "pre_survey_submitted")?;
        self.pre_survey = Some(answers);
        self.target = target;
        self.profile = Some(profile);
        self.stage = Some(Stage::Rapport);
        self.history.push(opening);
        self.transition(SessionStatus::Surveyed);
        Ok(())
    }

    /// Checks that a counterpart message may start a turn and returns the
    /// history as it will read once the turn commits. Nothing is recorded
    /// until `complete_turn`, so an abandoned turn leaves no trace.
    pub fn begin_turn(&self, message: Message) -> Result<PendingTurn, SessionError> {
        self.ensure_can(SessionStatus::InChat, "user_message")?;
        if self.profile.is_none() {
            return Err(SessionError::ProfileNotSeeded);
        }
        let mut history = self.history.clone();
        history.push(message.clone());
        Ok(PendingTurn { message, history })
    }

    /// Commits a turn: the counterpart message and the reply are appended
    /// together and the new profile replaces the old one wholesale. Returns
    /// the new turn count.
    pub fn complete_turn(
        &mut self,
        pending: PendingTurn,
        profile: Profile,
        stage: Stage,
        reply: Message,
    ) -> Result<usize, SessionError> {
        self.ensure_can(SessionStatus::InChat, "user_message")?;
        if pending.history.len() != self.history.len() + 1 {
            return Err(SessionError::invalid_transition(self.status, "user_message"));
        }
        self.history.push(pending.message);
        self.history.push(reply);
        self.profile = Some(profile);
        self.stage = Some(stage);
        self.transition(SessionStatus::InChat);
        Ok(self.history.turn_count())
    }

    /// InChat -> SurveyedPost.
    pub fn end_conversation(&mut self) -> Result<(), SessionError> {
        self.ensure_can(SessionStatus::SurveyedPost, "end_conversation")?;
        self.transition(SessionStatus::SurveyedPost);
        Ok(())
    }

    /// SurveyedPost -> Finalized. Returns the immutable record handed to
    /// persistence.
    pub fn finalize(&mut self, answers: SurveyAnswers) -> Result<FinalizedSession, SessionError> {
        self.ensure_can(SessionStatus::Finalized, "post_survey_submitted")?;
        let profile = self.profile.clone().ok_or(SessionError::ProfileNotSeeded)?;
        self.post_survey = Some(answers.clone());
        self.transition(SessionStatus::Finalized);

        Ok(FinalizedSession::new(
            self.id,
            &self.topic,
            self.target,
            self.pre_survey.clone().unwrap_or_default(),
            answers,
            self.history.clone(),
            profile,
            self.created_at,
            self.updated_at,
        ))
    }

    fn transition(&mut self, next: SessionStatus) {
        self.status = next;
        self.updated_at = Timestamp::now();
    }
}
