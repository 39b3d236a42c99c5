//! The append-only chat transcript.

use helm_core::types::{ChatMessage, ChatRole};

/// A linear message transcript.
///
/// User messages are appended whole. Assistant text accumulates by
/// fragment: the first fragment after a user message opens a new
/// assistant message, later fragments append to it. Nothing is ever
/// edited after the streaming reply that produced it finishes.
#[derive(Debug, Default)]
pub struct Transcript {
    messages: Vec<ChatMessage>,
}

impl Transcript {
    /// Empty transcript.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// All messages, oldest first.
    #[must_use]
    pub fn messages(&self) -> &[ChatMessage] {
        &self.messages
    }

    /// Echo the operator's message.
    pub fn push_user(&mut self, text: impl Into<String>) {
        self.messages.push(ChatMessage::new(ChatRole::User, text));
    }

    /// Append a whole assistant message.
    pub fn push_assistant(&mut self, text: impl Into<String>) {
        self.messages
            .push(ChatMessage::new(ChatRole::Assistant, text));
    }

    /// Append a streamed fragment to the most recent assistant message,
    /// opening a new one if the transcript does not end with one.
    pub fn append_assistant_fragment(&mut self, fragment: &str) {
        match self.messages.last_mut() {
            Some(last) if last.role == ChatRole::Assistant => last.content.push_str(fragment),
            _ => self.push_assistant(fragment),
        }
    }

    /// Absorb a failure as an error-flavored assistant message.
    pub fn push_error(&mut self, message: &str) {
        self.push_assistant(format!("Error: {message}"));
    }

    /// Wipe the transcript.
    pub fn clear(&mut self) {
        self.messages.clear();
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────
