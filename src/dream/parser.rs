//! Keyword scoring of free-text dream descriptions.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::rng::Rng;

// ── Tags ─────────────────────────────────────────────────────────────────────

/// Emotions in table order. Ties and palette lookups resolve in this order.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Emotion {
    Fear,
    Joy,
    Sadness,
    Wonder,
    Anxiety,
    Peace,
}

impl Emotion {
    pub const ALL: [Emotion; 6] = [
        Emotion::Fear,
        Emotion::Joy,
        Emotion::Sadness,
        Emotion::Wonder,
        Emotion::Anxiety,
        Emotion::Peace,
    ];

    pub fn name(self) -> &'static str {
        match self {
            Emotion::Fear => "fear",
            Emotion::Joy => "joy",
            Emotion::Sadness => "sadness",
            Emotion::Wonder => "wonder",
            Emotion::Anxiety => "anxiety",
            Emotion::Peace => "peace",
        }
    }

    /// Capitalised label for history listings.
    pub fn label(self) -> &'static str {
        match self {
            Emotion::Fear => "Fear",
            Emotion::Joy => "Joy",
            Emotion::Sadness => "Sadness",
            Emotion::Wonder => "Wonder",
            Emotion::Anxiety => "Anxiety",
            Emotion::Peace => "Peace",
        }
    }

    pub fn from_name(name: &str) -> Option<Emotion> {
        Emotion::ALL.into_iter().find(|e| e.name() == name)
    }

    fn keywords(self) -> &'static [&'static str] {
        match self {
            Emotion::Fear => &[
                "afraid", "scary", "terrified", "nightmare", "dark", "shadow", "chase",
                "running", "escape", "panic", "danger",
            ],
            Emotion::Joy => &[
                "happy", "laughing", "joy", "bright", "light", "dancing", "flying",
                "floating", "freedom", "smile", "bliss",
            ],
            Emotion::Sadness => &[
                "sad", "crying", "tears", "alone", "lost", "empty", "gray", "rain",
                "melancholy", "grief",
            ],
            Emotion::Wonder => &[
                "amazing", "beautiful", "surreal", "magical", "wonder", "awe", "strange",
                "mysterious", "dream", "ethereal",
            ],
            Emotion::Anxiety => &[
                "worry", "stress", "late", "falling", "unprepared", "confused", "chaos",
                "overwhelmed", "dizzy",
            ],
            Emotion::Peace => &[
                "calm", "peaceful", "serene", "quiet", "gentle", "soft", "warm", "comfort",
                "safe", "still",
            ],
        }
    }

    fn narrations(self) -> &'static [&'static str; 4] {
        match self {
            Emotion::Fear => &[
                "The shadows whisper your name...",
                "Reality fractures at the edges...",
                "Something watches from beyond the dream...",
                "The darkness remembers you...",
            ],
            Emotion::Joy => &[
                "Light dances in impossible patterns...",
                "The universe smiles with you...",
                "Your dream sings with color...",
                "Euphoria crystallizes into form...",
            ],
            Emotion::Sadness => &[
                "Memories dissolve like rain...",
                "The dream mourns with you...",
                "Echoes of what was linger...",
                "Tears become stars...",
            ],
            Emotion::Wonder => &[
                "Reality bends to your imagination...",
                "The impossible becomes tangible...",
                "Magic flows through the dreamspace...",
                "Mysteries unfold before you...",
            ],
            Emotion::Anxiety => &[
                "Time fractures and reforms...",
                "The dream shifts beneath your feet...",
                "Uncertainty manifests in waves...",
                "Everything changes, nothing stays...",
            ],
            Emotion::Peace => &[
                "Serenity flows through the space...",
                "The dream breathes with calm...",
                "Stillness holds infinite depth...",
                "Tranquility becomes visible...",
            ],
        }
    }

    /// Four-colour palette, darkest to lightest accent.
    pub fn palette(self) -> [u32; 4] {
        match self {
            Emotion::Fear => [0x1a0033, 0x4a0066, 0x8b00ff, 0x000000],
            Emotion::Joy => [0xffeb3b, 0xff9800, 0xff5722, 0xffc107],
            Emotion::Sadness => [0x263238, 0x455a64, 0x607d8b, 0x90a4ae],
            Emotion::Wonder => [0x8b5cf6, 0x6366f1, 0xec4899, 0xa78bfa],
            Emotion::Anxiety => [0xff1744, 0xf50057, 0xd500f9, 0x651fff],
            Emotion::Peace => [0x4caf50, 0x81c784, 0xaed581, 0xc5e1a5],
        }
    }
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DreamColor {
    Purple,
    Blue,
    Red,
    Green,
    Yellow,
    Pink,
    Black,
    White,
}

impl DreamColor {
    pub const ALL: [DreamColor; 8] = [
        DreamColor::Purple,
        DreamColor::Blue,
        DreamColor::Red,
        DreamColor::Green,
        DreamColor::Yellow,
        DreamColor::Pink,
        DreamColor::Black,
        DreamColor::White,
    ];

    fn keywords(self) -> &'static [&'static str] {
        match self {
            DreamColor::Purple => &["purple", "violet", "lavender", "lilac", "amethyst"],
            DreamColor::Blue => &["blue", "azure", "cyan", "sapphire", "ocean", "sky"],
            DreamColor::Red => &["red", "crimson", "scarlet", "blood", "ruby"],
            DreamColor::Green => &["green", "emerald", "jade", "forest", "nature"],
            DreamColor::Yellow => &["yellow", "gold", "golden", "sun", "amber"],
            DreamColor::Pink => &["pink", "rose", "magenta", "fuchsia"],
            DreamColor::Black => &["black", "dark", "shadow", "night", "void"],
            DreamColor::White => &["white", "bright", "light", "glow", "pale"],
        }
    }

    /// Display colour used when the visualizer tints objects.
    pub fn hex(self) -> u32 {
        match self {
            DreamColor::Purple => 0x8b5cf6,
            DreamColor::Blue => 0x4a90e2,
            DreamColor::Red => 0xff1744,
            DreamColor::Green => 0x4caf50,
            DreamColor::Yellow => 0xffeb3b,
            DreamColor::Pink => 0xec4899,
            DreamColor::Black => 0x1a1a2e,
            DreamColor::White => 0xffffff,
        }
    }
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ObjectCategory {
    Nature,
    Sky,
    Water,
    Abstract,
    Creatures,
    Human,
    Architecture,
}

impl ObjectCategory {
    pub const ALL: [ObjectCategory; 7] = [
        ObjectCategory::Nature,
        ObjectCategory::Sky,
        ObjectCategory::Water,
        ObjectCategory::Abstract,
        ObjectCategory::Creatures,
        ObjectCategory::Human,
        ObjectCategory::Architecture,
    ];

    fn keywords(self) -> &'static [&'static str] {
        match self {
            ObjectCategory::Nature => &[
                "tree", "flower", "garden", "forest", "plant", "leaf", "vine", "grass",
                "mountain", "river",
            ],
            ObjectCategory::Sky => &["sky", "cloud", "star", "moon", "sun", "space", "cosmos", "heaven"],
            ObjectCategory::Water => &["water", "ocean", "sea", "lake", "river", "rain", "wave", "pool"],
            ObjectCategory::Abstract => &[
                "shape", "form", "pattern", "geometric", "spiral", "circle", "sphere", "cube",
            ],
            ObjectCategory::Creatures => &[
                "bird", "fish", "animal", "creature", "dragon", "butterfly", "cat", "dog", "wolf",
            ],
            ObjectCategory::Human => &[
                "person", "people", "face", "hand", "eye", "figure", "silhouette", "shadow",
            ],
            ObjectCategory::Architecture => &[
                "building", "house", "door", "window", "wall", "tower", "stairs", "room",
            ],
        }
    }
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Movement {
    Floating,
    Flying,
    Falling,
    Running,
    Walking,
    Morphing,
}

impl Movement {
    pub const ALL: [Movement; 6] = [
        Movement::Floating,
        Movement::Flying,
        Movement::Falling,
        Movement::Running,
        Movement::Walking,
        Movement::Morphing,
    ];

    fn keywords(self) -> &'static [&'static str] {
        match self {
            Movement::Floating => &["float", "floating", "drift", "hover", "suspended"],
            Movement::Flying => &["fly", "flying", "soar", "glide", "wings"],
            Movement::Falling => &["fall", "falling", "drop", "plunge", "descend"],
            Movement::Running => &["run", "running", "chase", "escape", "sprint"],
            Movement::Walking => &["walk", "walking", "wander", "stroll"],
            Movement::Morphing => &["change", "transform", "shift", "morph", "become", "melt", "dissolve"],
        }
    }
}

const INTENSITY_WORDS: [&str; 7] =
    ["very", "extremely", "intense", "overwhelming", "vivid", "powerful", "strong"];

const BASE_INTENSITY: f32 = 0.5;
const INTENSITY_STEP: f32 = 0.1;

/// Minimum word count (exclusive) for input to count as a dream description.
pub const DREAM_MIN_WORDS: usize = 5;

/// Normalised emotion weights; only emotions that matched are present.
pub type EmotionScores = BTreeMap<Emotion, f32>;

/// Distinct matched keywords per object category; only non-zero entries.
pub type ObjectCounts = BTreeMap<ObjectCategory, u32>;

// ── ParsedDream ──────────────────────────────────────────────────────────────

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ParsedDream {
    pub text: String,
    /// Milliseconds since the Unix epoch.
    pub timestamp: u64,
    pub emotions: EmotionScores,
    pub colors: Vec<DreamColor>,
    pub objects: ObjectCounts,
    pub movements: Vec<Movement>,
    pub intensity: f32,
    pub dominant_emotion: Emotion,
    pub word_count: usize,
    pub ai_narration: String,
}

impl ParsedDream {
    /// Long enough to be treated as a dream rather than small talk.
    pub fn is_dream_description(&self) -> bool {
        self.word_count > DREAM_MIN_WORDS
    }

    pub fn palette(&self) -> [u32; 4] {
        emotional_palette(&self.emotions)
    }
}

// ── Parsing ──────────────────────────────────────────────────────────────────

/// Analyse `text` using the wall clock for the timestamp.
pub fn parse(text: &str, rng: &mut Rng) -> ParsedDream {
    parse_at(text, now_millis(), rng)
}

/// Analyse `text` with an explicit timestamp.
pub fn parse_at(text: &str, timestamp: u64, rng: &mut Rng) -> ParsedDream {
    let lower = text.to_lowercase();
    let emotions = detect_emotions(&lower);
    let dominant = dominant_emotion(&emotions);
    let narration = dominant.narrations()[rng.index(4)].to_string();

    ParsedDream {
        text: text.to_string(),
        timestamp,
        colors: detect_colors(&lower),
        objects: detect_objects(&lower),
        movements: detect_movements(&lower),
        intensity: calculate_intensity(&lower),
        dominant_emotion: dominant,
        word_count: lower.split_whitespace().count(),
        ai_narration: narration,
        emotions,
    }
}

/// Whole-word keyword occurrences per emotion, normalised to sum to 1.
pub fn detect_emotions(text: &str) -> EmotionScores {
    let lower = text.to_lowercase();
    let mut raw: Vec<(Emotion, u32)> = Vec::new();
    let mut total = 0u32;
    for emotion in Emotion::ALL {
        let score: u32 = emotion
            .keywords()
            .iter()
            .map(|kw| count_whole_words(&lower, kw))
            .sum();
        if score > 0 {
            raw.push((emotion, score));
            total += score;
        }
    }
    raw.into_iter()
        .map(|(e, s)| (e, s as f32 / total as f32))
        .collect()
}

/// Colours whose keywords appear anywhere in the text, in table order.
pub fn detect_colors(text: &str) -> Vec<DreamColor> {
    let lower = text.to_lowercase();
    DreamColor::ALL
        .into_iter()
        .filter(|c| c.keywords().iter().any(|kw| lower.contains(kw)))
        .collect()
}

pub fn detect_objects(text: &str) -> ObjectCounts {
    let lower = text.to_lowercase();
    ObjectCategory::ALL
        .into_iter()
        .filter_map(|cat| {
            let count = cat.keywords().iter().filter(|kw| lower.contains(*kw)).count() as u32;
            (count > 0).then_some((cat, count))
        })
        .collect()
}

pub fn detect_movements(text: &str) -> Vec<Movement> {
    let lower = text.to_lowercase();
    Movement::ALL
        .into_iter()
        .filter(|m| m.keywords().iter().any(|kw| lower.contains(kw)))
        .collect()
}

/// 0.5 baseline plus 0.1 per distinct intensifier, capped at 1.0.
pub fn calculate_intensity(text: &str) -> f32 {
    let lower = text.to_lowercase();
    let hits = INTENSITY_WORDS.iter().filter(|w| lower.contains(*w)).count();
    (BASE_INTENSITY + INTENSITY_STEP * hits as f32).min(1.0)
}

/// Highest score wins; earlier emotions win ties; `Wonder` when nothing matched.
pub fn dominant_emotion(scores: &EmotionScores) -> Emotion {
    let mut dominant = Emotion::Wonder;
    let mut max = 0.0f32;
    for (&emotion, &score) in scores {
        if score > max {
            max = score;
            dominant = emotion;
        }
    }
    dominant
}

pub fn emotional_palette(scores: &EmotionScores) -> [u32; 4] {
    dominant_emotion(scores).palette()
}

/// Count non-overlapping occurrences of `word` bounded by non-word chars.
fn count_whole_words(text: &str, word: &str) -> u32 {
    let bytes = text.as_bytes();
    let mut count = 0;
    let mut start = 0;
    while let Some(pos) = text[start..].find(word) {
        let begin = start + pos;
        let end = begin + word.len();
        let before_ok = begin == 0 || !is_word_byte(bytes[begin - 1]);
        let after_ok = end == bytes.len() || !is_word_byte(bytes[end]);
        if before_ok && after_ok {
            count += 1;
            start = end;
        } else {
            start = begin + 1;
        }
        while start < text.len() && !text.is_char_boundary(start) {
            start += 1;
        }
    }
    count
}

fn is_word_byte(b: u8) -> bool {
    b.is_ascii_alphanumeric() || b == b'_'
}

pub(crate) fn now_millis() -> u64 {
    std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .map(|d| d.as_millis() as u64)
        .unwrap_or(0)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn whole_word_counting_respects_boundaries() {
        assert_eq!(count_whole_words("dark darkness dark", "dark"), 2);
        assert_eq!(count_whole_words("the_dark dark.", "dark"), 1);
        assert_eq!(count_whole_words("", "dark"), 0);
    }

    #[test]
    fn whole_word_counting_skips_multibyte_text() {
        assert_eq!(count_whole_words("é dark éé dark", "dark"), 2);
    }
}
