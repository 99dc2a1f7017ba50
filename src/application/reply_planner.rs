//! Reply Planner - turns a stage into a policy and the policy into an
//! utterance.
//!
//! Every generated utterance is shaped to the policy's length limits. The
//! opening is additionally checked by the content guard. Any failure is
//! replaced by a fixed fallback and reported through `ReplySource`.

use serde::{Deserialize, Serialize};
use std::sync::Arc;

use crate::domain::conversation::{
    shape_reply, ContentGuard, ContextWindow, History, ReplyLimits, ReplyPolicy, Stage,
};
use crate::domain::foundation::SessionId;
use crate::domain::profile::{Profile, Stance};
use crate::domain::topic::TopicContext;
use crate::ports::GenerationService;

use super::prompts;

/// Opening used when generation fails or the generated opening breaks the
/// content guard. Mentions no topic, facts or figures.
pub const FALLBACK_OPENING: &str =
    "Thanks for sharing where you stand. What matters most to you when you think about this?";

/// Policy-neutral reply used when generation fails.
pub const FALLBACK_REPLY: &str = "I see. Tell me more about your perspective.";

/// Where an utterance came from.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ReplySource {
    Generated,
    Fallback { reason: String },
}

impl ReplySource {
    pub fn fallback(reason: impl Into<String>) -> Self {
        ReplySource::Fallback {
            reason: reason.into(),
        }
    }

    pub fn is_fallback(&self) -> bool {
        matches!(self, ReplySource::Fallback { .. })
    }
}

/// An utterance, the policy that gated it and its provenance.
#[derive(Debug, Clone, PartialEq)]
pub struct PlannedReply {
    pub text: String,
    pub policy: ReplyPolicy,
    pub source: ReplySource,
}

/// Everything the planner needs for one in-chat turn.
#[derive(Debug, Clone, Copy)]
pub struct TurnContext<'a> {
    pub session_id: SessionId,
    pub topic: &'a TopicContext,
    pub stage: Stage,
    pub profile: &'a Profile,
    pub target: Stance,
    pub history: &'a History,
    pub latest: &'a str,
}

#[derive(Clone)]
pub struct ReplyPlanner {
    generation: Arc<dyn GenerationService>,
    limits: ReplyLimits,
    window: ContextWindow,
    guard: ContentGuard,
}

impl ReplyPlanner {
    pub fn new(
        generation: Arc<dyn GenerationService>,
        limits: ReplyLimits,
        window: ContextWindow,
    ) -> Self {
        Self {
            generation,
            limits,
            window,
            guard: ContentGuard::new(),
        }
    }

    pub fn limits(&self) -> &ReplyLimits {
        &self.limits
    }

    /// First utterance of a session, seeded only by the survey profile and
    /// average. Always rapport content, never facts or figures.
    pub async fn plan_opening(
        &self,
        session_id: SessionId,
        topic: &TopicContext,
        profile: &Profile,
        target: Stance,
        survey_average: f64,
    ) -> PlannedReply {
        let policy = ReplyPolicy::opening(profile, target, self.limits);
        let prompt = prompts::opening(session_id, topic, profile, survey_average, &policy);

        let shaped = match self.generation.generate(prompt).await {
            Ok(text) => shape_reply(&text, &self.limits).ok_or("empty_after_shaping"),
            Err(err) => {
                tracing::warn!(session_id = %session_id, reason = err.reason(), error = %err, "Opening generation failed");
                Err(err.reason())
            }
        };

        let checked = shaped.and_then(|text| match self.guard.check(&text) {
            Ok(()) => Ok(text),
            Err(violation) => {
                tracing::warn!(
                    session_id = %session_id,
                    violation = %violation,
                    "Generated opening broke the content guard"
                );
                Err("content_guard")
            }
        });

        match checked {
            Ok(text) => PlannedReply {
                text,
                policy,
                source: ReplySource::Generated,
            },
            Err(reason) => PlannedReply {
                text: FALLBACK_OPENING.to_string(),
                policy,
                source: ReplySource::fallback(reason),
            },
        }
    }

    /// Reply to the counterpart's latest message under the stage policy.
    pub async fn plan_reply(&self, turn: TurnContext<'_>) -> PlannedReply {
        let policy = ReplyPolicy::for_stage(turn.stage, turn.profile, turn.target, self.limits);

        let window = self.window.window(turn.history);
        tracing::debug!(
            session_id = %turn.session_id,
            stage = %turn.stage,
            advocate = policy.advocate.label(),
            sent = window.messages.len(),
            omitted = window.omitted,
            tokens = window.estimated_tokens,
            "Planning reply"
        );

        let prompt = prompts::reply(
            turn.session_id,
            turn.topic,
            turn.profile,
            turn.target,
            &policy,
            &window,
            turn.latest,
        );

        let shaped = match self.generation.generate(prompt).await {
            Ok(text) => shape_reply(&text, &self.limits).ok_or("empty_after_shaping"),
            Err(err) => {
                tracing::warn!(
                    session_id = %turn.session_id,
                    stage = %turn.stage,
                    reason = err.reason(),
                    error = %err,
                    "Reply generation failed"
                );
                Err(err.reason())
            }
        };

        match shaped {
            Ok(text) => PlannedReply {
                text,
                policy,
                source: ReplySource::Generated,
            },
            Err(reason) => PlannedReply {
                text: FALLBACK_REPLY.to_string(),
                policy,
                source: ReplySource::fallback(reason),
            },
        }
    }
}
