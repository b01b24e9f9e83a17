use thiserror::Error;

/// Failures of the dream history store.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("dream store io: {0}")]
    Io(#[from] std::io::Error),
    #[error("dream store json: {0}")]
    Json(#[from] serde_json::Error),
    #[error("import payload must be a JSON array of dreams")]
    NotAnArray,
}

/// Failures of the chat completion client.
#[derive(Debug, Error)]
pub enum ChatError {
    #[error("AI system not initialized.")]
    NotInitialized,
    #[error("still waiting for the previous reply.")]
    Busy,
    #[error("API key is required")]
    MissingApiKey,
    #[error("http {status}: {body}")]
    Status { status: u16, body: String },
    #[error("{0}")]
    Transport(String),
    #[error("malformed completion response: {0}")]
    Malformed(String),
}

impl ChatError {
    /// The line shown in the chat log when a request fails.
    pub fn user_message(&self) -> String {
        let raw = self.to_string();
        let auth = matches!(self, ChatError::Status { status: 401, .. })
            || matches!(self, ChatError::MissingApiKey)
            || raw.contains("API key");
        if auth {
            "Authentication failed. Please try again.".to_string()
        } else if matches!(self, ChatError::Status { status: 429, .. }) || raw.contains("rate_limit") {
            "Too many requests. Please wait a moment and try again.".to_string()
        } else {
            format!("Connection error: {raw}")
        }
    }
}

impl From<reqwest::Error> for ChatError {
    fn from(e: reqwest::Error) -> Self {
        match e.status() {
            Some(status) => ChatError::Status { status: status.as_u16(), body: e.to_string() },
            None => ChatError::Transport(e.to_string()),
        }
    }
}

/// Failures while loading `AppConfig`.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("config io: {0}")]
    Io(#[from] std::io::Error),
    #[error("config json: {0}")]
    Json(#[from] serde_json::Error),
    #[error("invalid value for {key}: {value}")]
    Invalid { key: String, value: String },
}

/// Failures while turning synthesized PCM into playable sounds.
#[derive(Debug, Error)]
pub enum AudioError {
    #[error("wav encode: {0}")]
    Encode(#[from] std::io::Error),
    #[error("sound decode: {0}")]
    Decode(String),
    #[error("audio output unavailable")]
    Unavailable,
}

/// GPU bring-up failures; the app cannot run without a renderer.
#[derive(Debug, Error)]
pub enum RenderError {
    #[error("create surface: {0}")]
    Surface(#[from] wgpu::CreateSurfaceError),
    #[error("no suitable GPU adapter: {0}")]
    Adapter(#[from] wgpu::RequestAdapterError),
    #[error("create device: {0}")]
    Device(#[from] wgpu::RequestDeviceError),
    #[error("surface reports no supported formats")]
    NoSurfaceFormat,
}

/// Failures of the text-to-speech backend.
#[derive(Debug, Error)]
pub enum VoiceError {
    #[error("speech command {program}: {source}")]
    Spawn { program: String, source: std::io::Error },
}
