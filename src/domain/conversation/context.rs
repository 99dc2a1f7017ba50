//! Context window over the conversation history.
//!
//! Chooses the most recent suffix of the history that fits a message count
//! and token budget before it is sent to the generation service. The
//! history itself is left untouched.

use super::{History, Message};

/// Limits for the windowed history.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WindowLimits {
    pub max_messages: usize,
    pub token_budget: usize,
}

impl Default for WindowLimits {
    fn default() -> Self {
        Self {
            max_messages: 20,
            token_budget: 4_000,
        }
    }
}

/// The part of a history that will be sent.
#[derive(Debug, Clone, Copy)]
pub struct Window<'a> {
    pub messages: &'a [Message],
    /// Older messages left out.
    pub omitted: usize,
    pub estimated_tokens: usize,
}

impl Window<'_> {
    pub fn was_truncated(&self) -> bool {
        self.omitted > 0
    }

    /// Plain transcript, one `Role: content` line per message, preceded by
    /// a marker when older messages were left out.
    pub fn transcript(&self) -> String {
        let mut lines = Vec::with_capacity(self.messages.len() + 1);
        if self.omitted > 0 {
            lines.push(format!("[{} earlier messages omitted]", self.omitted));
        }
        for message in self.messages {
            lines.push(format!("{}: {}", message.role(), message.content().trim()));
        }
        lines.join("\n")
    }
}

/// Picks the window for a history.
#[derive(Debug, Clone, Copy, Default)]
pub struct ContextWindow {
    limits: WindowLimits,
}

impl ContextWindow {
    pub fn new(limits: WindowLimits) -> Self {
        Self { limits }
    }

    pub fn limits(&self) -> &WindowLimits {
        &self.limits
    }

    /// Works backward from the newest message. The newest message is always
    /// included, even when it alone exceeds the token budget.
    pub fn window<'a>(&self, history: &'a History) -> Window<'a> {
        let all = history.messages();
        let mut tokens = 0;
        let mut start = all.len();

        for (i, message) in all.iter().enumerate().rev() {
            if all.len() - i > self.limits.max_messages.max(1) {
                break;
            }
            let cost = message.estimate_tokens();
            if tokens + cost > self.limits.token_budget && start < all.len() {
                break;
            }
            tokens += cost;
            start = i;
        }

        Window {
            messages: &all[start..],
            omitted: start,
            estimated_tokens: tokens,
        }
    }
}
