//! Topic Context: the read-only descriptor of a discussion subject.

mod context;

pub use context::{TopicContext, TopicRecord};
