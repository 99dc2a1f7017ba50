//! Generation Service Port - the two call shapes the core uses.
//!
//! `classify` turns a prompt into a JSON object (profiling), `generate`
//! turns a prompt into reply text. Both return an explicit `Result`; the
//! callers recover every failure to a typed default.

use async_trait::async_trait;
use thiserror::Error;

use super::AIError;
use crate::domain::foundation::SessionId;

/// A prompt for the generation service.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Prompt {
    /// Standing instructions.
    pub system: String,
    /// The task itself.
    pub user: String,
    pub session_id: Option<SessionId>,
}

impl Prompt {
    pub fn new(system: impl Into<String>, user: impl Into<String>) -> Self {
        Self {
            system: system.into(),
            user: user.into(),
            session_id: None,
        }
    }

    pub fn for_session(mut self, session_id: SessionId) -> Self {
        self.session_id = Some(session_id);
        self
    }

    /// Rough size in characters, for logging.
    pub fn len(&self) -> usize {
        self.system.len() + self.user.len()
    }

    pub fn is_empty(&self) -> bool {
        self.system.is_empty() && self.user.is_empty()
    }
}

/// Typed failure of a generation call.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum GenerationError {
    #[error("generation timed out after {after_secs}s")]
    Timeout { after_secs: u64 },

    #[error("provider error: {0}")]
    Provider(#[from] AIError),

    #[error("malformed output: {0}")]
    MalformedOutput(String),

    #[error("empty output")]
    EmptyOutput,
}

impl GenerationError {
    /// Short machine label used in logs and fallback reasons.
    pub fn reason(&self) -> &'static str {
        match self {
            GenerationError::Timeout { .. } => "timeout",
            GenerationError::Provider(_) => "provider_error",
            GenerationError::MalformedOutput(_) => "malformed_output",
            GenerationError::EmptyOutput => "empty_output",
        }
    }
}

/// Port for the language-generation collaborator.
#[async_trait]
pub trait GenerationService: Send + Sync {
    /// Produce a JSON object from the prompt. Anything other than an object
    /// is a `MalformedOutput` failure.
    async fn classify(&self, prompt: Prompt) -> Result<serde_json::Value, GenerationError>;

    /// Produce reply text from the prompt. Blank text is `EmptyOutput`.
    async fn generate(&self, prompt: Prompt) -> Result<String, GenerationError>;
}
