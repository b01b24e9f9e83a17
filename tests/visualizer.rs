use glam::Vec3;

use dreamroom::dream::parser::parse_at;
use dreamroom::dream::visualizer::{
    catmull_rom, emotion_color, wave_height, Visual, PARTICLE_COUNT, STAR_COUNT, SWARM_SIZE, WATER_GRID,
};
use dreamroom::dream::{DreamVisualizer, Emotion, ParsedDream};
use dreamroom::engine::{Color, Fog};
use dreamroom::rng::Rng;

fn dream(text: &str) -> ParsedDream {
    parse_at(text, 0, &mut Rng::new(5))
}

const EVERYTHING: &str = "a tree under the moon over the ocean with a spiral and a bird";

// ── Splines and waves ────────────────────────────────────────────────────────

#[test]
fn catmull_rom_passes_through_control_points() {
    let points = [Vec3::ZERO, Vec3::new(1.0, 2.0, 0.0), Vec3::new(0.0, 4.0, 1.0), Vec3::new(-1.0, 6.0, 0.0)];
    assert!(catmull_rom(&points, 0.0).abs_diff_eq(points[0], 1e-5));
    assert!(catmull_rom(&points, 1.0 / 3.0).abs_diff_eq(points[1], 1e-5));
    assert!(catmull_rom(&points, 1.0).abs_diff_eq(points[3], 1e-5));
}

#[test]
fn catmull_rom_degenerate_inputs() {
    assert_eq!(catmull_rom(&[], 0.5), Vec3::ZERO);
    assert_eq!(catmull_rom(&[Vec3::ONE], 0.5), Vec3::ONE);
    let line = [Vec3::ZERO, Vec3::X];
    assert!(catmull_rom(&line, 2.0).abs_diff_eq(Vec3::X, 1e-5));
}

#[test]
fn wave_height_is_bounded() {
    for i in 0..50 {
        let h = wave_height(i as f32 * 0.3, -(i as f32) * 0.2, i as f32);
        assert!(h.abs() <= 0.2 + 1e-6);
    }
}

// ── Visualize ────────────────────────────────────────────────────────────────

#[test]
fn every_category_gets_its_visual() {
    let mut viz = DreamVisualizer::new();
    let summary = viz.visualize(&dream(EVERYTHING), &mut Rng::new(9));

    assert_eq!(viz.ids_of("ambience").len(), 1);
    assert_eq!(viz.ids_of("sky").len(), STAR_COUNT + 2);
    assert_eq!(viz.ids_of("water").len(), 1);
    assert_eq!(viz.ids_of("creatures").len(), 1);
    assert_eq!(viz.ids_of("particles").len(), 1);
    // Baseline intensity 0.5 gives 3 + 2 shapes.
    assert_eq!(viz.ids_of("abstract").len(), 5);
    let vines = viz.ids_of("nature").len();
    assert!((5..=9).contains(&vines), "{vines} vines");

    assert_eq!(summary.object_count, viz.objects().len() + 1);
    assert_eq!(summary.particle_count, 1);
    assert_eq!(summary.detected_objects, dream(EVERYTHING).objects);
}

#[test]
fn text_fragments_use_long_words_only() {
    let mut viz = DreamVisualizer::new();
    viz.visualize(&dream(EVERYTHING), &mut Rng::new(2));
    let words: Vec<&str> = viz
        .objects()
        .iter()
        .filter_map(|o| match &o.visual {
            Visual::Text { word, .. } => Some(word.as_str()),
            _ => None,
        })
        .collect();
    assert_eq!(words.len(), 8);
    assert!(words.iter().all(|w| w.chars().count() > 3));
    assert!(words.contains(&"spiral"));
}

#[test]
fn text_fragments_are_capped() {
    let text = "alpha bravo charlie delta echoes foxtrot golfing hotel india juliet kilos";
    let mut viz = DreamVisualizer::new();
    viz.visualize(&dream(text), &mut Rng::new(4));
    assert_eq!(viz.ids_of("text").len(), 8);
}

#[test]
fn nothing_recognised_falls_back_to_shapes() {
    let mut viz = DreamVisualizer::new();
    viz.visualize(&dream("hello"), &mut Rng::new(1));
    assert_eq!(viz.ids_of("abstract").len(), 5);
    assert!(viz.ids_of("sky").is_empty());
}

#[test]
fn intense_dreams_make_more_shapes() {
    let mut viz = DreamVisualizer::new();
    viz.visualize(&dream("a very vivid powerful spiral"), &mut Rng::new(1));
    // Intensity 0.8 gives 3 + 4.
    assert_eq!(viz.ids_of("abstract").len(), 7);
}

#[test]
fn fog_and_light_follow_the_emotion() {
    let mut viz = DreamVisualizer::new();
    let parsed = dream("I was terrified of the spiral");
    viz.visualize(&parsed, &mut Rng::new(3));
    let mood = Color::from_hex(emotion_color(Emotion::Fear));
    assert_eq!(viz.fog(), Some(Fog::Exp2 { color: mood, density: 0.015 * parsed.intensity }));
    let light = viz.light().copied().unwrap();
    assert_eq!(light.color, mood);
    assert_eq!(light.position, Vec3::new(0.0, 5.0, 0.0));
    assert!((light.intensity - parsed.intensity * 2.0).abs() < 1e-6);
}

#[test]
fn visualize_replaces_previous_dream() {
    let mut viz = DreamVisualizer::new();
    viz.visualize(&dream(EVERYTHING), &mut Rng::new(1));
    let first_ids: Vec<_> = viz.objects().iter().map(|o| o.id).collect();
    viz.visualize(&dream("hello"), &mut Rng::new(1));
    assert!(viz.ids_of("sky").is_empty());
    assert!(viz.objects().iter().all(|o| !first_ids.contains(&o.id)));
}

#[test]
fn clear_and_remove() {
    let mut viz = DreamVisualizer::new();
    viz.visualize(&dream(EVERYTHING), &mut Rng::new(1));
    let water = viz.ids_of("water")[0];
    viz.remove(water);
    assert!(viz.ids_of("water").is_empty());

    viz.clear();
    assert!(!viz.is_active());
    assert_eq!(viz.fog(), None);
    assert!(viz.light().is_none());
}

// ── Animation ────────────────────────────────────────────────────────────────

#[test]
fn water_heights_follow_the_wave() {
    let mut viz = DreamVisualizer::new();
    viz.visualize(&dream("calm water"), &mut Rng::new(1));
    viz.update(1000.0);
    let heights = viz
        .objects()
        .iter()
        .find_map(|o| match &o.visual {
            Visual::Water { heights } => Some(heights.clone()),
            _ => None,
        })
        .unwrap();
    assert_eq!(heights.len(), WATER_GRID * WATER_GRID);
    assert!((heights[0] - wave_height(-6.0, 6.0, 1.0)).abs() < 1e-5);
}

#[test]
fn swarm_stays_inside_its_box() {
    let mut viz = DreamVisualizer::new();
    viz.visualize(&dream("a bird"), &mut Rng::new(8));
    for _ in 0..2000 {
        viz.update(100.0);
    }
    for obj in viz.objects() {
        if let Visual::Swarm { points, .. } = &obj.visual {
            assert_eq!(points.len(), SWARM_SIZE);
            for p in points {
                assert!((-6.0..=6.0).contains(&p.x) && (0.0..=6.0).contains(&p.y) && (-6.0..=6.0).contains(&p.z));
            }
        }
    }
}

#[test]
fn particles_fill_the_room() {
    let mut viz = DreamVisualizer::new();
    viz.visualize(&dream("hello"), &mut Rng::new(6));
    let count = viz
        .objects()
        .iter()
        .find_map(|o| match &o.visual {
            Visual::Particles { points, .. } => Some(points.len()),
            _ => None,
        });
    assert_eq!(count, Some(PARTICLE_COUNT));
}

#[test]
fn star_opacity_twinkles_within_range() {
    let mut viz = DreamVisualizer::new();
    viz.visualize(&dream("a star"), &mut Rng::new(6));
    for step in 0..20 {
        viz.update(step as f32 * 37.0);
        for obj in viz.objects() {
            if let Visual::Star { .. } = obj.visual {
                assert!((0.2..=0.8).contains(&obj.opacity));
            }
        }
    }
}
