//! Adapters - Implementations of port interfaces.
//!
//! Adapters connect the core to external systems:
//! - `ai` - LLM providers (OpenAI, mock)
//! - `generation` - `GenerationService` over a provider, plus a scripted double
//! - `topics` - Topic catalogs (JSON file, in-memory)
//! - `storage` - Session archives (filesystem, in-memory)

pub mod ai;
pub mod generation;
pub mod storage;
pub mod topics;

pub use ai::{MockAIProvider, OpenAIConfig, OpenAIProvider};
pub use generation::{GenerationSettings, LlmGenerationService, ScriptedGeneration};
pub use storage::{FsSessionArchive, InMemorySessionArchive};
pub use topics::{InMemoryTopicCatalog, JsonTopicCatalog};
