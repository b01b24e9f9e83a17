use serde::Serialize;

use crate::dream::parser::now_millis;
use crate::error::ChatError;

use super::{ChatBackend, ChatMessage, Role};

pub const SYSTEM_PROMPT: &str = "You are a mystical dream interpreter and companion living in a virtual voxel room. You have a deep understanding of dreams, psychology, symbolism, and the subconscious mind.

Your personality:
- Mystical and enchanting, but warm and friendly
- You speak poetically but clearly
- You're genuinely curious about dreams and their meanings
- You offer insights without being prescriptive
- You ask follow-up questions to understand dreams deeper
- You sometimes reference symbolism, archetypes, and emotions

Your responses should be:
- Conversational and engaging (2-4 sentences usually)
- Thoughtful and insightful
- Encouraging of further exploration
- Sometimes playful or mysterious
- Always supportive and non-judgmental

You can discuss dreams, their meanings, emotions, symbolism, or just chat about the dream experience itself.";

pub const GREETING: &str =
    "Welcome, dreamer... I sense you've entered the dream space. Tell me, what visions dance through your mind?";
pub const RESET_GREETING: &str = "The dream space resets... I'm here when you're ready to explore new visions.";
/// Used when a completion comes back without content.
pub const FALLBACK_RESPONSE: &str = "I sense the dream fading... tell me more.";

/// History length that triggers trimming, system prompt included.
pub const MAX_HISTORY: usize = 22;
/// Non-system messages kept after trimming.
pub const KEEP_RECENT: usize = 20;

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ChatReply {
    pub response: String,
    pub timestamp: u64,
}

#[derive(Clone, Debug, Serialize)]
pub struct ConversationExport<'a> {
    pub timestamp: u64,
    pub messages: Vec<&'a ChatMessage>,
}

pub fn analysis_prompt(dream_text: &str) -> String {
    format!("I just had this dream: \"{dream_text}\"\n\nWhat insights can you share about this dream?")
}

/// Conversation state. The backend is passed in per request so the
/// history can live on the UI thread while requests run on a worker.
#[derive(Clone, Debug, Default)]
pub struct DreamConversation {
    messages: Vec<ChatMessage>,
    initialized: bool,
    awaiting: bool,
}

impl DreamConversation {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed the history with the system prompt and greeting.
    pub fn initialize(&mut self) {
        self.messages = vec![ChatMessage::system(SYSTEM_PROMPT), ChatMessage::assistant(GREETING)];
        self.initialized = true;
        self.awaiting = false;
        log::info!("dream companion ready");
    }

    pub fn is_initialized(&self) -> bool {
        self.initialized
    }

    /// True between `begin` and the matching `finish` or `abandon`.
    pub fn is_awaiting_reply(&self) -> bool {
        self.awaiting
    }

    /// Append the user's turn and return the history to send. Only one turn
    /// may be open at a time so replies stay paired with their questions.
    pub fn begin(&mut self, text: &str) -> Result<Vec<ChatMessage>, ChatError> {
        if !self.initialized {
            return Err(ChatError::NotInitialized);
        }
        if self.awaiting {
            return Err(ChatError::Busy);
        }
        self.messages.push(ChatMessage::user(text));
        self.awaiting = true;
        Ok(self.messages.clone())
    }

    /// Close the open turn without a reply. The user's turn stays recorded.
    pub fn abandon(&mut self) {
        self.awaiting = false;
    }

    /// Record the assistant's turn for a completed request.
    pub fn finish(&mut self, content: Option<String>) -> ChatReply {
        let response = content.filter(|c| !c.trim().is_empty()).unwrap_or_else(|| FALLBACK_RESPONSE.to_string());
        self.messages.push(ChatMessage::assistant(response.clone()));
        self.awaiting = false;
        self.trim();
        ChatReply { response, timestamp: now_millis() }
    }

    fn trim(&mut self) {
        if self.messages.len() > MAX_HISTORY {
            let tail = self.messages.split_off(self.messages.len() - KEEP_RECENT);
            self.messages.truncate(1);
            self.messages.extend(tail);
        }
    }

    /// Blocking round trip through `backend`.
    pub fn send_message(&mut self, backend: &dyn ChatBackend, text: &str) -> Result<ChatReply, ChatError> {
        let messages = self.begin(text)?;
        match backend.complete(&messages) {
            Ok(content) => Ok(self.finish(content)),
            Err(e) => {
                log::error!("chat request failed: {e}");
                self.abandon();
                Err(e)
            }
        }
    }

    pub fn analyze_dream(&mut self, backend: &dyn ChatBackend, dream_text: &str) -> Result<ChatReply, ChatError> {
        self.send_message(backend, &analysis_prompt(dream_text))
    }

    pub fn reset(&mut self) {
        self.messages = vec![ChatMessage::system(SYSTEM_PROMPT), ChatMessage::assistant(RESET_GREETING)];
        self.awaiting = false;
    }

    /// Everything except the system prompt.
    pub fn history(&self) -> Vec<&ChatMessage> {
        self.messages.iter().filter(|m| m.role != Role::System).collect()
    }

    /// Full history, system prompt included, as sent to the backend.
    pub fn messages(&self) -> &[ChatMessage] {
        &self.messages
    }

    pub fn export(&self) -> ConversationExport<'_> {
        ConversationExport { timestamp: now_millis(), messages: self.history() }
    }
}
