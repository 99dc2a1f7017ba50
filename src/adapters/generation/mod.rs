//! Generation Service Adapters.
//!
//! - `LlmGenerationService` - Generation over an `AIProvider`, with timeout and JSON extraction
//! - `ScriptedGeneration` - Queued results for tests

mod llm_generation;
mod scripted;

pub use llm_generation::{GenerationSettings, LlmGenerationService};
pub use scripted::ScriptedGeneration;
