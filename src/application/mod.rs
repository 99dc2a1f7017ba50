//! Application layer - the conversation engine.
//!
//! - `SurveyProfiler` / `MessageProfiler` - derive profiles, recovering to defaults
//! - `ReplyPlanner` - stage policy and utterance, with fixed fallbacks
//! - `SessionOrchestrator` - one session's lifecycle and turn loop
//! - `SessionRegistry` - many sessions, one event at a time per session

mod message_profiler;
mod orchestrator;
pub mod prompts;
mod registry;
mod reply_planner;
mod services;
mod survey_profiler;

pub use message_profiler::{DerivedProfile, MessageProfiler, ProfileSource};
pub use orchestrator::{resolve_target, ArchiveStatus, SessionOrchestrator, SessionOutcome};
pub use registry::SessionRegistry;
pub use reply_planner::{
    PlannedReply, ReplyPlanner, ReplySource, TurnContext, FALLBACK_OPENING, FALLBACK_REPLY,
};
pub use services::{ConversationSettings, SessionServices};
pub use survey_profiler::{SurveyProfile, SurveyProfiler};

pub use crate::domain::session::SessionError;
