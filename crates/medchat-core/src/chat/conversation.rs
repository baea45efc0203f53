//! Conversation history for one query

use crate::types::{ChatMessage, MessageRole};

/// Append-only turn history, seeded with the caller's query.
///
/// Nothing carries over between queries; the whole history is resent on
/// every model invocation.
#[derive(Debug, Clone)]
pub struct ConversationState {
    turns: Vec<ChatMessage>,
}

impl ConversationState {
    /// Start a conversation holding exactly one user turn
    pub fn new(query: impl Into<String>) -> Self {
        Self {
            turns: vec![ChatMessage::user(query)],
        }
    }

    pub fn push(&mut self, turn: ChatMessage) {
        self.turns.push(turn);
    }

    pub fn turns(&self) -> &[ChatMessage] {
        &self.turns
    }

    pub fn len(&self) -> usize {
        self.turns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.turns.is_empty()
    }

    pub fn last(&self) -> Option<&ChatMessage> {
        self.turns.last()
    }

    /// Roles in order, handy for checking the turn cycle
    pub fn roles(&self) -> Vec<MessageRole> {
        self.turns.iter().map(|t| t.role).collect()
    }

    /// Owned copy for a model request
    pub fn to_messages(&self) -> Vec<ChatMessage> {
        self.turns.clone()
    }
}
