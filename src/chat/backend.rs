use std::time::Duration;

use reqwest::blocking::Client;
use serde::{Deserialize, Serialize};

use crate::config::ChatConfig;
use crate::error::ChatError;

use super::ChatMessage;

/// Something that turns a message history into the next assistant turn.
/// `Ok(None)` means the service answered without any content.
pub trait ChatBackend: Send {
    fn complete(&self, messages: &[ChatMessage]) -> Result<Option<String>, ChatError>;
}

#[derive(Debug, Serialize)]
pub struct CompletionRequest<'a> {
    pub model: &'a str,
    pub messages: &'a [ChatMessage],
    pub temperature: f32,
    pub max_tokens: u32,
    pub top_p: f32,
    pub stream: bool,
}

#[derive(Debug, Deserialize)]
struct CompletionResponse {
    #[serde(default)]
    choices: Vec<Choice>,
}

#[derive(Debug, Deserialize)]
struct Choice {
    message: Option<ResponseMessage>,
}

#[derive(Debug, Deserialize)]
struct ResponseMessage {
    content: Option<String>,
}

/// Content of the first choice of an OpenAI-style completion body.
pub fn parse_completion(body: &str) -> Result<Option<String>, ChatError> {
    let response: CompletionResponse =
        serde_json::from_str(body).map_err(|e| ChatError::Malformed(e.to_string()))?;
    Ok(response
        .choices
        .into_iter()
        .next()
        .and_then(|c| c.message)
        .and_then(|m| m.content)
        .filter(|c| !c.is_empty()))
}

/// Groq's OpenAI-compatible chat completions endpoint.
pub struct GroqBackend {
    client: Client,
    config: ChatConfig,
    api_key: String,
}

impl GroqBackend {
    pub fn new(config: &ChatConfig) -> Result<Self, ChatError> {
        let api_key = config
            .api_key
            .as_deref()
            .map(str::trim)
            .filter(|k| !k.is_empty())
            .ok_or(ChatError::MissingApiKey)?
            .to_string();
        let client = Client::builder().timeout(Duration::from_secs(config.timeout_secs)).build()?;
        Ok(Self { client, config: config.clone(), api_key })
    }

    pub fn request<'a>(&'a self, messages: &'a [ChatMessage]) -> CompletionRequest<'a> {
        CompletionRequest {
            model: &self.config.model,
            messages,
            temperature: self.config.temperature,
            max_tokens: self.config.max_tokens,
            top_p: self.config.top_p,
            stream: false,
        }
    }
}

impl ChatBackend for GroqBackend {
    fn complete(&self, messages: &[ChatMessage]) -> Result<Option<String>, ChatError> {
        log::debug!("chat request: {} messages to {}", messages.len(), self.config.model);
        let response = self
            .client
            .post(&self.config.endpoint)
            .bearer_auth(&self.api_key)
            .json(&self.request(messages))
            .send()?;

        let status = response.status();
        let body = response.text()?;
        if !status.is_success() {
            return Err(ChatError::Status { status: status.as_u16(), body });
        }
        parse_completion(&body)
    }
}
