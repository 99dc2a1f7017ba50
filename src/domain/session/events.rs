//! The four events that drive a session.

use serde::{Deserialize, Serialize};

use crate::domain::profile::Stance;
use crate::domain::survey::SurveyAnswers;

/// Input event from the UI layer (or any headless driver).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum SessionEvent {
    PreSurveySubmitted {
        answers: SurveyAnswers,
        /// Overrides the configured or derived target stance.
        #[serde(default, skip_serializing_if = "Option::is_none")]
        target_stance: Option<Stance>,
    },
    UserMessage {
        content: String,
    },
    EndConversation,
    PostSurveySubmitted {
        answers: SurveyAnswers,
    },
}

impl SessionEvent {
    pub fn kind(&self) -> &'static str {
        match self {
            SessionEvent::PreSurveySubmitted { .. } => "pre_survey_submitted",
            SessionEvent::UserMessage { .. } => "user_message",
            SessionEvent::EndConversation => "end_conversation",
            SessionEvent::PostSurveySubmitted { .. } => "post_survey_submitted",
        }
    }
}
