// Chat message records and transcript guards

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Author of a chat turn
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    User,
    /// Older clients label the assistant as "model"
    #[serde(alias = "model")]
    Assistant,
}

/// One turn of a conversation
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatMessage {
    pub role: Role,
    pub content: String,
}

impl ChatMessage {
    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: Role::User,
            content: content.into(),
        }
    }

    pub fn assistant(content: impl Into<String>) -> Self {
        Self {
            role: Role::Assistant,
            content: content.into(),
        }
    }

    pub fn is_user(&self) -> bool {
        self.role == Role::User
    }
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConversationError {
    #[error("At least {required} user messages are required for analysis (found {found})")]
    InsufficientUserMessages { required: usize, found: usize },

    #[error("Conversation has no messages")]
    Empty,
}

/// Number of user-authored turns
pub fn user_message_count(messages: &[ChatMessage]) -> usize {
    messages.iter().filter(|m| m.is_user()).count()
}

/// Reject conversations with fewer than `min` user turns
pub fn require_user_messages(messages: &[ChatMessage], min: usize) -> Result<(), ConversationError> {
    let found = user_message_count(messages);
    if found < min {
        return Err(ConversationError::InsufficientUserMessages {
            required: min,
            found,
        });
    }
    Ok(())
}
