//! The dream companion's conversation: message history, the completion
//! backend and a background worker so requests never block a frame.

pub mod backend;
pub mod conversation;
pub mod worker;

use serde::{Deserialize, Serialize};

pub use backend::{ChatBackend, GroqBackend};
pub use conversation::{ChatReply, DreamConversation};
pub use worker::{ChatEvent, ChatWorker};

#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    System,
    User,
    Assistant,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatMessage {
    pub role: Role,
    pub content: String,
}

impl ChatMessage {
    pub fn system(content: impl Into<String>) -> Self {
        Self { role: Role::System, content: content.into() }
    }

    pub fn user(content: impl Into<String>) -> Self {
        Self { role: Role::User, content: content.into() }
    }

    pub fn assistant(content: impl Into<String>) -> Self {
        Self { role: Role::Assistant, content: content.into() }
    }
}
