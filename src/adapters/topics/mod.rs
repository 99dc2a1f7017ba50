//! Topic catalog adapters.

mod in_memory;
mod json_catalog;

pub use in_memory::InMemoryTopicCatalog;
pub use json_catalog::JsonTopicCatalog;
