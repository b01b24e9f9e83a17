//! Application configuration: JSON file first, environment second.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;
use crate::window::WindowConfig;

/// Default config file looked up in the working directory.
pub const DEFAULT_CONFIG_FILE: &str = "dreamroom.json";

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub window: WindowConfig,
    pub chat: ChatConfig,
    pub audio: AudioConfig,
    pub voice: VoiceConfig,
    pub memory: MemoryConfig,
    /// Show frame timing in the window title.
    pub debug: bool,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ChatConfig {
    pub endpoint: String,
    pub model: String,
    pub temperature: f32,
    pub max_tokens: u32,
    pub top_p: f32,
    pub timeout_secs: u64,
    /// Never written back out; normally supplied through the environment.
    #[serde(skip_serializing)]
    pub api_key: Option<String>,
}

impl Default for ChatConfig {
    fn default() -> Self {
        Self {
            endpoint: "https://api.groq.com/openai/v1/chat/completions".to_string(),
            model: "llama-3.3-70b-versatile".to_string(),
            temperature: 0.8,
            max_tokens: 300,
            top_p: 0.9,
            timeout_secs: 30,
            api_key: None,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AudioConfig {
    pub master_volume: f32,
    pub music_volume: f32,
    pub music_enabled: bool,
}

impl Default for AudioConfig {
    fn default() -> Self {
        Self { master_volume: 1.0, music_volume: 0.2, music_enabled: true }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct VoiceConfig {
    pub enabled: bool,
    /// Speech command; `None` probes `espeak-ng`, `espeak` and `say`.
    pub command: Option<String>,
    pub rate: f32,
    pub pitch: f32,
}

impl Default for VoiceConfig {
    fn default() -> Self {
        Self { enabled: true, command: None, rate: 0.9, pitch: 1.1 }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MemoryConfig {
    pub path: PathBuf,
    pub max_dreams: usize,
    /// Number of most recent dreams that shape the emotional influence.
    pub influence_window: usize,
    /// Weight multiplier per step back in time; 1.0 is a plain average.
    pub recency_decay: f32,
}

impl Default for MemoryConfig {
    fn default() -> Self {
        Self {
            path: PathBuf::from("dreamroom_memory.json"),
            max_dreams: 50,
            influence_window: 5,
            recency_decay: 0.8,
        }
    }
}

impl AppConfig {
    /// Load `path` if it exists, otherwise start from defaults, then apply
    /// process environment overrides.
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        let path = path.unwrap_or_else(|| Path::new(DEFAULT_CONFIG_FILE));
        let mut config = if path.exists() {
            log::info!("loading config from {}", path.display());
            Self::from_json(&std::fs::read_to_string(path)?)?
        } else {
            log::debug!("no config at {}, using defaults", path.display());
            Self::default()
        };
        config.apply_env(|key| std::env::var(key).ok())?;
        Ok(config)
    }

    pub fn from_json(text: &str) -> Result<Self, ConfigError> {
        Ok(serde_json::from_str(text)?)
    }

    /// Apply `DREAMROOM_*` / `GROQ_API_KEY` overrides through `lookup`.
    pub fn apply_env<F>(&mut self, lookup: F) -> Result<(), ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let key = lookup("DREAMROOM_API_KEY").or_else(|| lookup("GROQ_API_KEY"));
        if let Some(key) = key.filter(|k| !k.trim().is_empty()) {
            self.chat.api_key = Some(key.trim().to_string());
        }
        if let Some(model) = lookup("DREAMROOM_MODEL") {
            self.chat.model = model;
        }
        if let Some(endpoint) = lookup("DREAMROOM_ENDPOINT") {
            self.chat.endpoint = endpoint;
        }
        if let Some(path) = lookup("DREAMROOM_MEMORY_PATH") {
            self.memory.path = PathBuf::from(path);
        }
        if let Some(v) = lookup("DREAMROOM_VOICE") {
            self.voice.enabled = parse_flag("DREAMROOM_VOICE", &v)?;
        }
        if let Some(v) = lookup("DREAMROOM_MUSIC") {
            self.audio.music_enabled = parse_flag("DREAMROOM_MUSIC", &v)?;
        }
        Ok(())
    }
}

fn parse_flag(key: &str, value: &str) -> Result<bool, ConfigError> {
    match value.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "on" | "yes" => Ok(true),
        "0" | "false" | "off" | "no" => Ok(false),
        _ => Err(ConfigError::Invalid { key: key.to_string(), value: value.to_string() }),
    }
}
