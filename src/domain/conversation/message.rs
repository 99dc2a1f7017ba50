//! Messages and the append-only conversation history.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::domain::foundation::{Timestamp, ValidationError};

/// Who said it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    /// The counterpart.
    User,
    /// The influencer.
    Assistant,
}

impl Role {
    pub fn label(&self) -> &'static str {
        match self {
            Role::User => "User",
            Role::Assistant => "Assistant",
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.label())
    }
}

/// An immutable utterance.
///
/// # Invariants
///
/// - `content` is non-blank (validated at construction)
/// - `created_at` is set at construction and never changes
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Message {
    role: Role,
    content: String,
    #[serde(default)]
    created_at: Timestamp,
}

impl Message {
    /// Creates a message, rejecting blank content.
    pub fn new(role: Role, content: impl Into<String>) -> Result<Self, ValidationError> {
        let content = content.into();
        if content.trim().is_empty() {
            return Err(ValidationError::empty_field("content"));
        }
        Ok(Self {
            role,
            content,
            created_at: Timestamp::now(),
        })
    }

    pub fn user(content: impl Into<String>) -> Result<Self, ValidationError> {
        Self::new(Role::User, content)
    }

    pub fn assistant(content: impl Into<String>) -> Result<Self, ValidationError> {
        Self::new(Role::Assistant, content)
    }

    pub fn role(&self) -> Role {
        self.role
    }

    pub fn content(&self) -> &str {
        &self.content
    }

    pub fn created_at(&self) -> &Timestamp {
        &self.created_at
    }

    pub fn is_user(&self) -> bool {
        self.role == Role::User
    }

    /// Rough token estimate (~4 characters per token plus role overhead).
    pub fn estimate_tokens(&self) -> usize {
        self.content.len() / 4 + 4
    }
}

/// Ordered, append-only sequence of messages.
///
/// Insertion order defines the turn count and the context window; the
/// history is never reordered or pruned.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct History(Vec<Message>);

impl History {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, message: Message) {
        self.0.push(message);
    }

    pub fn messages(&self) -> &[Message] {
        &self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Number of counterpart messages so far.
    pub fn turn_count(&self) -> usize {
        self.0.iter().filter(|m| m.is_user()).count()
    }

    pub fn last(&self) -> Option<&Message> {
        self.0.last()
    }

    pub fn last_user_message(&self) -> Option<&Message> {
        self.0.iter().rev().find(|m| m.is_user())
    }

    /// Messages said by `role`, oldest first.
    pub fn by_role(&self, role: Role) -> impl Iterator<Item = &Message> {
        self.0.iter().filter(move |m| m.role == role)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    mod message {
        use super::*;

        #[test]
        fn rejects_blank_content() {
            assert!(Message::user("").is_err());
            assert!(Message::assistant("  \n").is_err());
        }

        #[test]
        fn keeps_content_verbatim() {
            let msg = Message::user("  I like meat ").unwrap();
            assert_eq!(msg.content(), "  I like meat ");
            assert_eq!(msg.role(), Role::User);
        }

        #[test]
        fn estimates_tokens_with_overhead() {
            let msg = Message::user("abcdefgh").unwrap();
            assert_eq!(msg.estimate_tokens(), 6);
        }

        #[test]
        fn serializes_role_in_snake_case() {
            let msg = Message::assistant("hi").unwrap();
            let json = serde_json::to_value(&msg).unwrap();
            assert_eq!(json["role"], "assistant");
            assert_eq!(json["content"], "hi");
        }

        #[test]
        fn deserializes_without_timestamp() {
            let msg: Message = serde_json::from_str(r#"{"role":"user","content":"x"}"#).unwrap();
            assert!(msg.is_user());
        }
    }

    mod history {
        use super::*;

        fn sample() -> History {
            let mut history = History::new();
            history.push(Message::assistant("Hello").unwrap());
            history.push(Message::user("one").unwrap());
            history.push(Message::assistant("reply").unwrap());
            history.push(Message::user("two").unwrap());
            history
        }

        #[test]
        fn turn_count_counts_user_messages() {
            assert_eq!(History::new().turn_count(), 0);
            assert_eq!(sample().turn_count(), 2);
        }

        #[test]
        fn preserves_insertion_order() {
            let history = sample();
            let contents: Vec<_> = history.messages().iter().map(|m| m.content()).collect();
            assert_eq!(contents, ["Hello", "one", "reply", "two"]);
        }

        #[test]
        fn finds_last_user_message() {
            let mut history = sample();
            history.push(Message::assistant("after").unwrap());
            assert_eq!(history.last_user_message().unwrap().content(), "two");
            assert_eq!(history.last().unwrap().content(), "after");
        }

        #[test]
        fn filters_by_role() {
            assert_eq!(sample().by_role(Role::Assistant).count(), 2);
        }
    }
}
