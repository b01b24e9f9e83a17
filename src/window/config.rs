use serde::{Deserialize, Serialize};

// ── WindowMode ────────────────────────────────────────────────────────────────

/// Controls how the OS window is presented.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum WindowMode {
    /// Standard decorated window at the configured resolution.
    Windowed,
    /// Exclusive hardware fullscreen at the configured resolution.
    Fullscreen,
    /// Borderless window sized to match the monitor's native resolution.
    Borderless,
}

// ── WindowConfig ──────────────────────────────────────────────────────────────

/// Window section of the app config.
///
/// `width`/`height` are the requested inner size in physical pixels; the
/// renderer follows whatever size the OS actually grants.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct WindowConfig {
    pub title: String,
    pub width: u32,
    pub height: u32,
    pub mode: WindowMode,
    pub resizable: bool,
    /// Fixed update rate of the simulation loop.
    pub ups: u32,
}

impl Default for WindowConfig {
    fn default() -> Self {
        Self {
            title: "Dreamroom".to_string(),
            width: 1280,
            height: 720,
            mode: WindowMode::Windowed,
            resizable: true,
            ups: 60,
        }
    }
}
