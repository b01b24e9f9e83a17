use dreamroom::dream::parser::{
    calculate_intensity, detect_colors, detect_emotions, detect_movements, detect_objects, dominant_emotion,
    emotional_palette, parse_at, EmotionScores,
};
use dreamroom::dream::{DreamColor, Emotion, Movement, ObjectCategory};
use dreamroom::rng::Rng;

fn approx(a: f32, b: f32) -> bool {
    (a - b).abs() < 1e-5
}

// ── Emotions ─────────────────────────────────────────────────────────────────

#[test]
fn emotions_normalise_to_one() {
    let scores = detect_emotions("I was afraid of the dark, then happy and calm");
    let total: f32 = scores.values().sum();
    assert!(approx(total, 1.0), "sum was {total}");
    assert!(approx(scores[&Emotion::Fear], 0.5));
    assert!(approx(scores[&Emotion::Joy], 0.25));
    assert!(approx(scores[&Emotion::Peace], 0.25));
}

#[test]
fn emotions_count_whole_words_only() {
    // "darkness" and "lightning" must not count as "dark" / "light".
    let scores = detect_emotions("darkness and lightning");
    assert!(scores.is_empty());
}

#[test]
fn emotions_count_repeats() {
    let scores = detect_emotions("sad sad sad happy");
    assert!(approx(scores[&Emotion::Sadness], 0.75));
    assert!(approx(scores[&Emotion::Joy], 0.25));
}

#[test]
fn emotions_are_case_insensitive() {
    let scores = detect_emotions("TERRIFIED");
    assert_eq!(scores.len(), 1);
    assert!(approx(scores[&Emotion::Fear], 1.0));
}

#[test]
fn no_emotion_keywords_means_wonder() {
    assert_eq!(dominant_emotion(&EmotionScores::new()), Emotion::Wonder);
    assert_eq!(emotional_palette(&EmotionScores::new()), Emotion::Wonder.palette());
}

#[test]
fn ties_go_to_the_earlier_emotion() {
    let scores = detect_emotions("happy and afraid");
    assert_eq!(dominant_emotion(&scores), Emotion::Fear);
}

#[test]
fn emotion_names_round_trip() {
    for e in Emotion::ALL {
        assert_eq!(Emotion::from_name(e.name()), Some(e));
    }
    assert_eq!(Emotion::from_name("boredom"), None);
    assert_eq!(Emotion::Anxiety.label(), "Anxiety");
}

// ── Colours, objects, movements ──────────────────────────────────────────────

#[test]
fn colours_match_substrings_in_table_order() {
    let colors = detect_colors("A golden light over the violet ocean");
    assert_eq!(colors, vec![DreamColor::Purple, DreamColor::Blue, DreamColor::Yellow, DreamColor::White]);
}

#[test]
fn colours_empty_for_plain_text() {
    assert!(detect_colors("nothing here").is_empty());
}

#[test]
fn objects_count_distinct_keywords() {
    let objects = detect_objects("a tree by the river, a flower in the garden");
    assert_eq!(objects.get(&ObjectCategory::Nature), Some(&4));
    // "river" is both nature and water.
    assert_eq!(objects.get(&ObjectCategory::Water), Some(&1));
    assert_eq!(objects.get(&ObjectCategory::Sky), None);
}

#[test]
fn objects_use_substring_matching() {
    // "catalog" contains "cat".
    let objects = detect_objects("a catalog");
    assert_eq!(objects.get(&ObjectCategory::Creatures), Some(&1));
}

#[test]
fn movements_detected_in_table_order() {
    let movements = detect_movements("I was running then started flying and falling");
    assert_eq!(movements, vec![Movement::Flying, Movement::Falling, Movement::Running]);
}

// ── Intensity ────────────────────────────────────────────────────────────────

#[test]
fn intensity_baseline_is_half() {
    assert!(approx(calculate_intensity("a quiet evening"), 0.5));
}

#[test]
fn intensity_counts_distinct_intensifiers() {
    assert!(approx(calculate_intensity("very very vivid"), 0.7));
}

#[test]
fn intensity_caps_at_one() {
    let text = "very extremely intense overwhelming vivid powerful strong";
    assert!(approx(calculate_intensity(text), 1.0));
}

// ── parse_at ─────────────────────────────────────────────────────────────────

#[test]
fn parse_fills_every_field() {
    let mut rng = Rng::new(7);
    let dream = parse_at("I was flying over a golden ocean, so happy and free", 1234, &mut rng);
    assert_eq!(dream.timestamp, 1234);
    assert_eq!(dream.word_count, 11);
    assert_eq!(dream.dominant_emotion, Emotion::Joy);
    assert!(dream.colors.contains(&DreamColor::Yellow));
    assert!(dream.objects.contains_key(&ObjectCategory::Water));
    assert!(dream.movements.contains(&Movement::Flying));
    assert!(!dream.ai_narration.is_empty());
    assert!(dream.is_dream_description());
    assert_eq!(dream.palette(), Emotion::Joy.palette());
}

#[test]
fn short_text_is_not_a_dream() {
    let mut rng = Rng::new(1);
    assert!(!parse_at("hello there friend", 0, &mut rng).is_dream_description());
    // Exactly five words is still small talk.
    assert!(!parse_at("one two three four five", 0, &mut rng).is_dream_description());
    assert!(parse_at("one two three four five six", 0, &mut rng).is_dream_description());
}

#[test]
fn narration_is_deterministic_for_a_seed() {
    let a = parse_at("a scary dark shadow", 0, &mut Rng::new(42));
    let b = parse_at("a scary dark shadow", 0, &mut Rng::new(42));
    assert_eq!(a.ai_narration, b.ai_narration);
}

#[test]
fn parsed_dream_serializes_camel_case() {
    let dream = parse_at("calm", 5, &mut Rng::new(3));
    let json = serde_json::to_string(&dream).unwrap();
    assert!(json.contains("\"dominantEmotion\":\"peace\""));
    assert!(json.contains("\"wordCount\":1"));
    assert!(json.contains("\"aiNarration\""));
}
