//! The application scenes: a short loading card, then the living room.

mod living_room;
mod loading;

pub use living_room::LivingRoomScene;
pub use loading::{LOADING_MS, LoadingScene};

/// Where F9 writes the current cartoon frame.
pub const SVG_DUMP_FILE: &str = "cartoon_frame.svg";

pub const WELCOME_LINE: &str = "Welcome to the dream space. I'm here to explore your dreams with you.";
pub const CONNECTION_LOST: &str = "The dream connection flickers... ";
/// Shown when no chat key is configured.
pub const OFFLINE_LINE: &str =
    "The companion is silent. Set GROQ_API_KEY to talk, dreams will still take shape.";

/// Delay before the ambient music starts.
pub const MUSIC_DELAY_MS: f32 = 500.0;
/// Chance that a keystroke plays the typing blip.
pub const TYPING_SOUND_CHANCE: f32 = 0.2;
