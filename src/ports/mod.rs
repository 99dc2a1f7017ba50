//! Ports - Interfaces for external dependencies.
//!
//! Following hexagonal architecture, ports define the contracts between
//! the core and its collaborators. Adapters implement these ports.
//!
//! - `AIProvider` - Raw LLM chat completions
//! - `GenerationService` - `classify` / `generate`, the two calls the core makes
//! - `TopicCatalog` - Read-only topic lookup
//! - `SessionArchive` - Durable storage of finalized sessions

mod ai_provider;
mod generation;
mod session_archive;
mod topic_catalog;

pub use ai_provider::{
    AIError, AIProvider, CompletionRequest, CompletionResponse, FinishReason, Message,
    MessageRole, RequestMetadata, RequestPurpose, TokenUsage,
};
pub use generation::{GenerationError, GenerationService, Prompt};
pub use session_archive::{SessionArchive, StorageError, StorageRef};
pub use topic_catalog::{CatalogError, TopicCatalog};
