//! Session lifecycle status.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::domain::foundation::StateMachine;

/// Where a session is in its lifecycle.
///
/// ```text
/// NotStarted -> Surveyed -> InChat -> SurveyedPost -> Finalized
///                              ^--'
/// ```
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SessionStatus {
    #[default]
    NotStarted,
    /// Pre-survey in, profile seeded, opening sent.
    Surveyed,
    InChat,
    /// Conversation ended, waiting for the post-survey.
    SurveyedPost,
    /// Immutable.
    Finalized,
}

impl SessionStatus {
    pub fn label(&self) -> &'static str {
        match self {
            SessionStatus::NotStarted => "not_started",
            SessionStatus::Surveyed => "surveyed",
            SessionStatus::InChat => "in_chat",
            SessionStatus::SurveyedPost => "surveyed_post",
            SessionStatus::Finalized => "finalized",
        }
    }

    /// True while user messages are accepted.
    pub fn accepts_messages(&self) -> bool {
        matches!(self, SessionStatus::Surveyed | SessionStatus::InChat)
    }
}

impl fmt::Display for SessionStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.label())
    }
}

impl StateMachine for SessionStatus {
    fn can_transition_to(&self, target: &Self) -> bool {
        use SessionStatus::*;
        matches!(
            (self, target),
            (NotStarted, Surveyed)
                | (Surveyed, InChat)
                | (InChat, InChat)
                | (InChat, SurveyedPost)
                | (SurveyedPost, Finalized)
        )
    }

    fn valid_transitions(&self) -> Vec<Self> {
        use SessionStatus::*;
        match self {
            NotStarted => vec![Surveyed],
            Surveyed => vec![InChat],
            InChat => vec![InChat, SurveyedPost],
            SurveyedPost => vec![Finalized],
            Finalized => vec![],
        }
    }
}
