//! Dream history: newest first, capped, persisted as JSON, and folded into
//! an emotional influence that colours the next session.

use std::path::PathBuf;
use std::sync::{Arc, Mutex};

use serde::{Deserialize, Serialize};

use crate::config::MemoryConfig;
use crate::dream::parser::{now_millis, DreamColor, Emotion, EmotionScores, ParsedDream};
use crate::error::StoreError;

/// Characters kept by [`preview`] before the ellipsis.
pub const PREVIEW_LEN: usize = 100;

// ── Records ──────────────────────────────────────────────────────────────────

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StoredDream {
    pub id: u64,
    pub timestamp: u64,
    pub text: String,
    #[serde(default)]
    pub emotions: EmotionScores,
    pub dominant_emotion: Emotion,
    #[serde(default)]
    pub colors: Vec<DreamColor>,
    pub intensity: f32,
    #[serde(default)]
    pub ai_narration: String,
}

#[derive(Clone, Debug, PartialEq)]
pub struct TrailEntry {
    pub emotion: Emotion,
    pub timestamp: u64,
    pub intensity: f32,
}

/// How recent dreams bend the next session.
#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EmotionalInfluence {
    pub intensity: f32,
    pub dominant_emotion: Emotion,
    /// Hue rotation in degrees.
    pub color_shift: f32,
    pub time_distortion: f32,
    pub dream_count: usize,
}

impl Default for EmotionalInfluence {
    fn default() -> Self {
        Self {
            intensity: 0.5,
            dominant_emotion: Emotion::Wonder,
            color_shift: 0.0,
            time_distortion: 1.0,
            dream_count: 0,
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct FormattedDream {
    pub dream: StoredDream,
    pub formatted_date: String,
    pub preview: String,
    pub emotion_label: &'static str,
}

#[derive(Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct PersistedHistory {
    dreams: Vec<StoredDream>,
    #[serde(default)]
    last_updated: u64,
}

// ── Storage backends ─────────────────────────────────────────────────────────

/// Key-value slot holding the serialized history.
pub trait DreamStore: Send {
    fn load(&self) -> Result<Option<String>, StoreError>;
    fn save(&mut self, contents: &str) -> Result<(), StoreError>;
}

/// JSON file on disk.
pub struct FileStore {
    path: PathBuf,
}

impl FileStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

impl DreamStore for FileStore {
    fn load(&self) -> Result<Option<String>, StoreError> {
        match std::fs::read_to_string(&self.path) {
            Ok(text) => Ok(Some(text)),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    fn save(&mut self, contents: &str) -> Result<(), StoreError> {
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(&self.path, contents)?;
        Ok(())
    }
}

/// Process-local store. Clones share the same slot.
#[derive(Clone, Default)]
pub struct MemoryStore {
    slot: Arc<Mutex<Option<String>>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_contents(contents: &str) -> Self {
        Self { slot: Arc::new(Mutex::new(Some(contents.to_string()))) }
    }

    pub fn contents(&self) -> Option<String> {
        self.slot.lock().unwrap_or_else(|e| e.into_inner()).clone()
    }
}

impl DreamStore for MemoryStore {
    fn load(&self) -> Result<Option<String>, StoreError> {
        Ok(self.contents())
    }

    fn save(&mut self, contents: &str) -> Result<(), StoreError> {
        *self.slot.lock().unwrap_or_else(|e| e.into_inner()) = Some(contents.to_string());
        Ok(())
    }
}

// ── DreamMemory ──────────────────────────────────────────────────────────────

pub struct DreamMemory {
    store: Box<dyn DreamStore>,
    dreams: Vec<StoredDream>,
    trail: Vec<TrailEntry>,
    max_dreams: usize,
    influence_window: usize,
    recency_decay: f32,
}

impl DreamMemory {
    /// Load history from `store`. An unreadable store starts empty.
    pub fn new(store: Box<dyn DreamStore>, config: &MemoryConfig) -> Self {
        let dreams = match load_history(store.as_ref()) {
            Ok(d) => d,
            Err(e) => {
                log::error!("error loading dreams: {e}");
                Vec::new()
            }
        };
        log::info!("dream memory holds {} dreams", dreams.len());
        Self {
            store,
            dreams,
            trail: Vec::new(),
            max_dreams: config.max_dreams.max(1),
            influence_window: config.influence_window.max(1),
            recency_decay: config.recency_decay.clamp(0.0, 1.0),
        }
    }

    pub fn in_memory() -> Self {
        Self::new(Box::new(MemoryStore::new()), &MemoryConfig::default())
    }

    pub fn max_dreams(&self) -> usize {
        self.max_dreams
    }

    pub fn store_dream(&mut self, dream: &ParsedDream) -> StoredDream {
        self.store_dream_at(dream, now_millis())
    }

    /// Record `dream` as seen at `now_ms`. Ids stay unique and increasing
    /// even when several dreams land in the same millisecond.
    pub fn store_dream_at(&mut self, dream: &ParsedDream, now_ms: u64) -> StoredDream {
        let id = match self.dreams.iter().map(|d| d.id).max() {
            Some(latest) if latest >= now_ms => latest + 1,
            _ => now_ms,
        };
        let stored = StoredDream {
            id,
            timestamp: now_ms,
            text: dream.text.clone(),
            emotions: dream.emotions.clone(),
            dominant_emotion: dream.dominant_emotion,
            colors: dream.colors.clone(),
            intensity: dream.intensity,
            ai_narration: dream.ai_narration.clone(),
        };
        self.dreams.insert(0, stored.clone());
        self.dreams.truncate(self.max_dreams);

        self.trail.push(TrailEntry {
            emotion: dream.dominant_emotion,
            timestamp: now_ms,
            intensity: dream.intensity,
        });
        if self.trail.len() > self.max_dreams {
            let excess = self.trail.len() - self.max_dreams;
            self.trail.drain(..excess);
        }

        self.persist();
        stored
    }

    /// Newest first.
    pub fn all_dreams(&self) -> &[StoredDream] {
        &self.dreams
    }

    pub fn dreams_by_emotion(&self, emotion: Emotion) -> Vec<&StoredDream> {
        self.dreams.iter().filter(|d| d.dominant_emotion == emotion).collect()
    }

    pub fn recent_dreams(&self, count: usize) -> &[StoredDream] {
        &self.dreams[..count.min(self.dreams.len())]
    }

    /// Dominant emotions of dreams stored this session, oldest first.
    pub fn emotional_trail(&self) -> &[TrailEntry] {
        &self.trail
    }

    pub fn overall_dominant_emotion(&self) -> Emotion {
        let mut counts = [0usize; 6];
        for d in &self.dreams {
            counts[d.dominant_emotion as usize] += 1;
        }
        most_common(&counts.map(|c| c as f32), &self.dreams)
    }

    /// Recency-weighted summary of the most recent dreams. The i-th newest
    /// dream weighs `recency_decay^i`.
    pub fn emotional_influence(&self) -> EmotionalInfluence {
        let recent = self.recent_dreams(self.influence_window);
        if recent.is_empty() {
            return EmotionalInfluence::default();
        }

        let mut weight = 1.0f32;
        let mut total_weight = 0.0f32;
        let mut weighted_intensity = 0.0f32;
        let mut emotion_weights = [0.0f32; 6];
        for dream in recent {
            weighted_intensity += dream.intensity * weight;
            emotion_weights[dream.dominant_emotion as usize] += weight;
            total_weight += weight;
            weight *= self.recency_decay;
        }
        let intensity = if total_weight > 0.0 {
            weighted_intensity / total_weight
        } else {
            recent[0].intensity
        };

        EmotionalInfluence {
            intensity,
            dominant_emotion: most_common(&emotion_weights, recent),
            color_shift: recent.len() as f32 * 5.0,
            time_distortion: 1.0 + intensity * 0.5,
            dream_count: recent.len(),
        }
    }

    pub fn formatted_dreams(&self) -> Vec<FormattedDream> {
        self.formatted_dreams_at(now_millis())
    }

    pub fn formatted_dreams_at(&self, now_ms: u64) -> Vec<FormattedDream> {
        self.dreams
            .iter()
            .map(|d| FormattedDream {
                formatted_date: format_relative_date(d.timestamp, now_ms),
                preview: preview(&d.text, PREVIEW_LEN),
                emotion_label: d.dominant_emotion.label(),
                dream: d.clone(),
            })
            .collect()
    }

    pub fn clear_all(&mut self) {
        self.dreams.clear();
        self.trail.clear();
        self.persist();
    }

    /// Returns `true` when a dream with `id` existed.
    pub fn delete_dream(&mut self, id: u64) -> bool {
        let before = self.dreams.len();
        self.dreams.retain(|d| d.id != id);
        let removed = self.dreams.len() != before;
        if removed {
            self.persist();
        }
        removed
    }

    /// Pretty-printed JSON array of the history.
    pub fn export_dreams(&self) -> Result<String, StoreError> {
        Ok(serde_json::to_string_pretty(&self.dreams)?)
    }

    /// Replace the history with a JSON array of dreams. Returns how many
    /// were kept after the cap.
    pub fn import_dreams(&mut self, json: &str) -> Result<usize, StoreError> {
        let value: serde_json::Value = serde_json::from_str(json)?;
        if !value.is_array() {
            return Err(StoreError::NotAnArray);
        }
        let mut dreams: Vec<StoredDream> = serde_json::from_value(value)?;
        dreams.truncate(self.max_dreams);
        self.dreams = dreams;
        self.save()?;
        Ok(self.dreams.len())
    }

    pub fn save(&mut self) -> Result<(), StoreError> {
        let data = PersistedHistory { dreams: self.dreams.clone(), last_updated: now_millis() };
        let text = serde_json::to_string(&data)?;
        self.store.save(&text)
    }

    fn persist(&mut self) {
        if let Err(e) = self.save() {
            log::error!("error saving dreams: {e}");
        }
    }
}

fn load_history(store: &dyn DreamStore) -> Result<Vec<StoredDream>, StoreError> {
    match store.load()? {
        Some(text) if !text.trim().is_empty() => {
            let data: PersistedHistory = serde_json::from_str(&text)?;
            Ok(data.dreams)
        }
        _ => Ok(Vec::new()),
    }
}

/// Highest weight wins, table order breaks ties, `Wonder` when all zero.
/// Heaviest emotion. Ties go to the one seen first in `dreams` (newest first).
fn most_common(weights: &[f32; 6], dreams: &[StoredDream]) -> Emotion {
    let mut dominant = Emotion::Wonder;
    let mut max = 0.0f32;
    let mut seen = [false; 6];
    for dream in dreams {
        let slot = dream.dominant_emotion as usize;
        if std::mem::replace(&mut seen[slot], true) {
            continue;
        }
        if weights[slot] > max {
            max = weights[slot];
            dominant = dream.dominant_emotion;
        }
    }
    dominant
}

// ── Formatting ───────────────────────────────────────────────────────────────

const MINUTE_MS: u64 = 60_000;
const HOUR_MS: u64 = 3_600_000;
const DAY_MS: u64 = 86_400_000;
const MONTHS: [&str; 12] =
    ["Jan", "Feb", "Mar", "Apr", "May", "Jun", "Jul", "Aug", "Sep", "Oct", "Nov", "Dec"];

/// "Just now", "3 minutes ago", ..., "Mar 4" or "Mar 4, 2023" (UTC) beyond a week.
pub fn format_relative_date(timestamp: u64, now_ms: u64) -> String {
    let diff = now_ms.saturating_sub(timestamp);
    let mins = diff / MINUTE_MS;
    let hours = diff / HOUR_MS;
    let days = diff / DAY_MS;

    if mins < 1 {
        return "Just now".to_string();
    }
    if mins < 60 {
        return format!("{mins} minute{} ago", plural(mins));
    }
    if hours < 24 {
        return format!("{hours} hour{} ago", plural(hours));
    }
    if days < 7 {
        return format!("{days} day{} ago", plural(days));
    }

    let (year, month, day) = civil_from_days((timestamp / DAY_MS) as i64);
    let (now_year, _, _) = civil_from_days((now_ms / DAY_MS) as i64);
    let month = MONTHS[(month - 1) as usize];
    if year == now_year {
        format!("{month} {day}")
    } else {
        format!("{month} {day}, {year}")
    }
}

fn plural(n: u64) -> &'static str {
    if n > 1 { "s" } else { "" }
}

/// Days since 1970-01-01 to (year, month 1..=12, day 1..=31).
fn civil_from_days(days: i64) -> (i64, u32, u32) {
    let z = days + 719_468;
    let era = z.div_euclid(146_097);
    let doe = z.rem_euclid(146_097);
    let yoe = (doe - doe / 1460 + doe / 36_524 - doe / 146_096) / 365;
    let doy = doe - (365 * yoe + yoe / 4 - yoe / 100);
    let mp = (5 * doy + 2) / 153;
    let day = (doy - (153 * mp + 2) / 5 + 1) as u32;
    let month = (if mp < 10 { mp + 3 } else { mp - 9 }) as u32;
    let year = yoe + era * 400 + i64::from(month <= 2);
    (year, month, day)
}

/// First `max_len` characters followed by "..." when the text is longer.
pub fn preview(text: &str, max_len: usize) -> String {
    match text.char_indices().nth(max_len) {
        Some((cut, _)) => format!("{}...", &text[..cut]),
        None => text.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn civil_epoch_is_1970_01_01() {
        assert_eq!(civil_from_days(0), (1970, 1, 1));
    }

    #[test]
    fn civil_leap_day() {
        // 2024-02-29 is day 19782.
        assert_eq!(civil_from_days(19_782), (2024, 2, 29));
    }
}
