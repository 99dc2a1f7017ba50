//! Conversation domain module.
//!
//! Messages and the append-only history, the stage selector, the reply
//! policy each stage implies, and the text-level checks applied to what
//! goes to and comes back from the generation service.

mod content_guard;
mod context;
mod message;
mod policy;
mod sanitizer;
mod stage;

pub use content_guard::{ContentGuard, GuardViolation, CITATION_MARKERS};
pub use context::{ContextWindow, Window, WindowLimits};
pub use message::{History, Message, Role};
pub use policy::{advocate_for, ReplyLimits, ReplyPolicy, Tactic};
pub use sanitizer::{
    shape_reply, ExtractionError, JsonExtractor, ResponseSanitizer, SanitizationError,
    MAX_RESPONSE_LENGTH,
};
pub use stage::{Stage, StageSelector, StageThresholds};
