use dreamroom::config::MemoryConfig;
use dreamroom::dream::memory::{format_relative_date, preview, PREVIEW_LEN};
use dreamroom::dream::parser::parse_at;
use dreamroom::dream::{DreamMemory, DreamStore, Emotion, FileStore, MemoryStore, ParsedDream};
use dreamroom::error::StoreError;
use dreamroom::rng::Rng;

const MINUTE: u64 = 60_000;
const HOUR: u64 = 60 * MINUTE;
const DAY: u64 = 24 * HOUR;
/// 2024-03-10T12:00:00Z
const NOW: u64 = 1_710_072_000_000;

fn dream(text: &str) -> ParsedDream {
    parse_at(text, 0, &mut Rng::new(11))
}

fn with_intensity(emotion_text: &str, intensity: f32) -> ParsedDream {
    let mut d = dream(emotion_text);
    d.intensity = intensity;
    d
}

fn memory_with(store: MemoryStore, config: MemoryConfig) -> DreamMemory {
    DreamMemory::new(Box::new(store), &config)
}

// ── Storing ──────────────────────────────────────────────────────────────────

#[test]
fn newest_dream_comes_first() {
    let mut memory = DreamMemory::in_memory();
    memory.store_dream_at(&dream("first calm dream"), 1_000);
    memory.store_dream_at(&dream("second happy dream"), 2_000);
    let texts: Vec<&str> = memory.all_dreams().iter().map(|d| d.text.as_str()).collect();
    assert_eq!(texts, vec!["second happy dream", "first calm dream"]);
}

#[test]
fn ids_stay_unique_within_one_millisecond() {
    let mut memory = DreamMemory::in_memory();
    let a = memory.store_dream_at(&dream("a"), 5_000);
    let b = memory.store_dream_at(&dream("b"), 5_000);
    let c = memory.store_dream_at(&dream("c"), 4_000);
    assert_eq!(a.id, 5_000);
    assert_eq!(b.id, 5_001);
    assert_eq!(c.id, 5_002);
}

#[test]
fn history_is_capped() {
    let config = MemoryConfig { max_dreams: 3, ..MemoryConfig::default() };
    let mut memory = memory_with(MemoryStore::new(), config);
    for i in 0..5 {
        memory.store_dream_at(&dream(&format!("dream {i}")), i * 10);
    }
    assert_eq!(memory.all_dreams().len(), 3);
    assert_eq!(memory.all_dreams()[0].text, "dream 4");
    assert_eq!(memory.all_dreams()[2].text, "dream 2");
    assert_eq!(memory.emotional_trail().len(), 3);
}

#[test]
fn stored_dream_copies_analysis() {
    let mut memory = DreamMemory::in_memory();
    let parsed = dream("a scary dark forest");
    let stored = memory.store_dream_at(&parsed, 77);
    assert_eq!(stored.timestamp, 77);
    assert_eq!(stored.dominant_emotion, Emotion::Fear);
    assert_eq!(stored.emotions, parsed.emotions);
    assert_eq!(stored.ai_narration, parsed.ai_narration);
}

#[test]
fn dreams_filter_by_emotion() {
    let mut memory = DreamMemory::in_memory();
    memory.store_dream_at(&dream("so happy"), 1);
    memory.store_dream_at(&dream("terrified"), 2);
    memory.store_dream_at(&dream("laughing"), 3);
    assert_eq!(memory.dreams_by_emotion(Emotion::Joy).len(), 2);
    assert_eq!(memory.dreams_by_emotion(Emotion::Peace).len(), 0);
    assert_eq!(memory.overall_dominant_emotion(), Emotion::Joy);
}

#[test]
fn dominant_emotion_ties_go_to_the_newest() {
    let mut memory = DreamMemory::in_memory();
    memory.store_dream_at(&dream("terrified"), 1);
    memory.store_dream_at(&dream("so happy"), 2);
    assert_eq!(memory.overall_dominant_emotion(), Emotion::Joy);

    let mut memory = DreamMemory::in_memory();
    memory.store_dream_at(&dream("so happy"), 1);
    memory.store_dream_at(&dream("terrified"), 2);
    assert_eq!(memory.overall_dominant_emotion(), Emotion::Fear);
}

#[test]
fn recent_dreams_clamps_to_history() {
    let mut memory = DreamMemory::in_memory();
    memory.store_dream_at(&dream("one"), 1);
    assert_eq!(memory.recent_dreams(5).len(), 1);
    assert!(DreamMemory::in_memory().recent_dreams(3).is_empty());
}

#[test]
fn delete_and_clear() {
    let mut memory = DreamMemory::in_memory();
    let kept = memory.store_dream_at(&dream("keep"), 1);
    let gone = memory.store_dream_at(&dream("drop"), 2);
    assert!(memory.delete_dream(gone.id));
    assert!(!memory.delete_dream(gone.id));
    assert_eq!(memory.all_dreams()[0].id, kept.id);
    memory.clear_all();
    assert!(memory.all_dreams().is_empty());
    assert!(memory.emotional_trail().is_empty());
}

// ── Influence ────────────────────────────────────────────────────────────────

#[test]
fn empty_history_has_neutral_influence() {
    let influence = DreamMemory::in_memory().emotional_influence();
    assert_eq!(influence.dream_count, 0);
    assert_eq!(influence.dominant_emotion, Emotion::Wonder);
    assert!((influence.intensity - 0.5).abs() < 1e-6);
    assert!((influence.time_distortion - 1.0).abs() < 1e-6);
}

#[test]
fn influence_weights_recent_dreams_more() {
    let mut memory = DreamMemory::in_memory();
    memory.store_dream_at(&with_intensity("calm", 0.5), 1);
    memory.store_dream_at(&with_intensity("terrified", 1.0), 2);
    let influence = memory.emotional_influence();
    // Newest weighs 1.0, the older 0.8.
    let expected = (1.0 * 1.0 + 0.5 * 0.8) / 1.8;
    assert!((influence.intensity - expected).abs() < 1e-5);
    assert_eq!(influence.dominant_emotion, Emotion::Fear);
    assert_eq!(influence.dream_count, 2);
    assert!((influence.color_shift - 10.0).abs() < 1e-6);
    assert!((influence.time_distortion - (1.0 + expected * 0.5)).abs() < 1e-5);
}

#[test]
fn influence_only_reads_the_window() {
    let config = MemoryConfig { influence_window: 2, ..MemoryConfig::default() };
    let mut memory = memory_with(MemoryStore::new(), config);
    for i in 0..4 {
        memory.store_dream_at(&dream("calm"), i);
    }
    assert_eq!(memory.emotional_influence().dream_count, 2);
}

// ── Persistence ──────────────────────────────────────────────────────────────

#[test]
fn history_survives_a_restart() {
    let store = MemoryStore::new();
    {
        let mut memory = memory_with(store.clone(), MemoryConfig::default());
        memory.store_dream_at(&dream("a gentle river"), 42);
    }
    let memory = memory_with(store.clone(), MemoryConfig::default());
    assert_eq!(memory.all_dreams().len(), 1);
    assert_eq!(memory.all_dreams()[0].text, "a gentle river");
    assert!(store.contents().is_some_and(|c| c.contains("lastUpdated")));
}

#[test]
fn corrupt_store_starts_empty() {
    let memory = memory_with(MemoryStore::with_contents("{not json"), MemoryConfig::default());
    assert!(memory.all_dreams().is_empty());
}

#[test]
fn export_then_import_replaces_history() {
    let mut source = DreamMemory::in_memory();
    source.store_dream_at(&dream("stars over water"), 1);
    source.store_dream_at(&dream("falling through clouds"), 2);
    let json = source.export_dreams().unwrap();

    let mut target = DreamMemory::in_memory();
    target.store_dream_at(&dream("old"), 0);
    assert_eq!(target.import_dreams(&json).unwrap(), 2);
    assert_eq!(target.all_dreams()[0].text, "falling through clouds");
}

#[test]
fn ids_stay_unique_after_unsorted_import() {
    let mut source = DreamMemory::in_memory();
    source.store_dream_at(&dream("early"), 1_000);
    source.store_dream_at(&dream("late"), 9_000);
    let mut entries: Vec<serde_json::Value> = serde_json::from_str(&source.export_dreams().unwrap()).unwrap();
    entries.reverse();

    let mut memory = DreamMemory::in_memory();
    memory.import_dreams(&serde_json::to_string(&entries).unwrap()).unwrap();
    assert_eq!(memory.all_dreams()[0].text, "early");

    let fresh = memory.store_dream_at(&dream("new"), 9_000);
    assert_eq!(fresh.id, 9_001);
    assert!(memory.delete_dream(fresh.id));
    assert_eq!(memory.all_dreams().len(), 2);
}

#[test]
fn import_rejects_non_arrays() {
    let mut memory = DreamMemory::in_memory();
    assert!(matches!(memory.import_dreams("{\"dreams\": []}"), Err(StoreError::NotAnArray)));
    assert!(matches!(memory.import_dreams("nope"), Err(StoreError::Json(_))));
}

#[test]
fn file_store_round_trip() {
    let dir = std::env::temp_dir().join(format!("dreamroom-memory-{}", std::process::id()));
    let path = dir.join("nested").join("dreams.json");
    let mut store = FileStore::new(&path);
    assert_eq!(store.load().unwrap(), None);
    store.save("{\"dreams\": []}").unwrap();
    assert_eq!(store.load().unwrap().as_deref(), Some("{\"dreams\": []}"));
    let _ = std::fs::remove_dir_all(&dir);
}

// ── Formatting ───────────────────────────────────────────────────────────────

#[test]
fn relative_dates() {
    assert_eq!(format_relative_date(NOW - 30_000, NOW), "Just now");
    assert_eq!(format_relative_date(NOW - MINUTE, NOW), "1 minute ago");
    assert_eq!(format_relative_date(NOW - 5 * MINUTE, NOW), "5 minutes ago");
    assert_eq!(format_relative_date(NOW - 3 * HOUR, NOW), "3 hours ago");
    assert_eq!(format_relative_date(NOW - DAY, NOW), "1 day ago");
    assert_eq!(format_relative_date(NOW - 6 * DAY, NOW), "6 days ago");
}

#[test]
fn old_dates_show_month_and_day() {
    assert_eq!(format_relative_date(NOW - 9 * DAY, NOW), "Mar 1");
    assert_eq!(format_relative_date(NOW - 365 * DAY, NOW), "Mar 11, 2023");
}

#[test]
fn future_timestamps_read_as_now() {
    assert_eq!(format_relative_date(NOW + HOUR, NOW), "Just now");
}

#[test]
fn preview_truncates_on_characters() {
    assert_eq!(preview("short", PREVIEW_LEN), "short");
    assert_eq!(preview("abcdef", 3), "abc...");
    assert_eq!(preview("ééééé", 2), "éé...");
    assert_eq!(preview("exact", 5), "exact");
}

#[test]
fn formatted_dreams_carry_labels() {
    let mut memory = DreamMemory::in_memory();
    memory.store_dream_at(&dream("quiet and calm"), NOW - 2 * HOUR);
    let formatted = memory.formatted_dreams_at(NOW);
    assert_eq!(formatted.len(), 1);
    assert_eq!(formatted[0].formatted_date, "2 hours ago");
    assert_eq!(formatted[0].emotion_label, "Peace");
    assert_eq!(formatted[0].preview, "quiet and calm");
}
