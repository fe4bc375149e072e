//! Linear chat history

use crate::models::{Message, Role};

use super::relay::GREETING;

/// Append-only conversation, opened by the assistant's greeting
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChatSession {
    messages: Vec<Message>,
}

impl Default for ChatSession {
    fn default() -> Self {
        Self::new()
    }
}

impl ChatSession {
    #[must_use]
    pub fn new() -> Self {
        Self {
            messages: vec![Message::assistant(GREETING)],
        }
    }

    #[must_use]
    pub fn messages(&self) -> &[Message] {
        &self.messages
    }

    pub(crate) fn push(&mut self, message: Message) {
        self.messages.push(message);
    }

    /// Extend the in-progress assistant reply
    pub(crate) fn append_to_reply(&mut self, token: &str) {
        if let Some(last) = self.messages.last_mut()
            && last.role == Role::Assistant
        {
            last.content.push_str(token);
        }
    }

    /// Record a failed reply with exactly one apology
    ///
    /// An empty reply is replaced by the apology; a partial one is kept and
    /// followed by it.
    pub(crate) fn fail_reply(&mut self, apology: &str) {
        match self.messages.last_mut() {
            Some(last) if last.role == Role::Assistant && last.content.is_empty() => {
                last.content.push_str(apology);
            }
            _ => self.messages.push(Message::assistant(apology)),
        }
    }
}
