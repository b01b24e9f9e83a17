//! Turns a parsed dream into drifting 3D visuals around the room.
//!
//! Everything here is plain data advanced by `update`; `draw` queues the
//! current state on the engine, with temporal effects layered on top.

use std::f32::consts::{FRAC_PI_2, TAU};

use glam::{EulerRot, Mat4, Quat, Vec2, Vec3};

use crate::dream::parser::{DreamColor, Emotion, ObjectCategory, ObjectCounts, ParsedDream};
use crate::dream::temporal::TemporalEffects;
use crate::dream::ObjectId;
use crate::engine::{Color, Engine, Fog, PointLight};
use crate::renderer::mesh::MeshKind;
use crate::rng::Rng;
use crate::world::Material;

/// Milliseconds per animation frame the per-frame increments were tuned for.
const FRAME_MS: f32 = 1000.0 / 60.0;

pub const MAX_TEXT_FRAGMENTS: usize = 8;
pub const STAR_COUNT: usize = 30;
pub const SWARM_SIZE: usize = 30;
pub const PARTICLE_COUNT: usize = 100;
/// Water grid resolution in vertices per side.
pub const WATER_GRID: usize = 33;
const WATER_SIZE: f32 = 12.0;
const VINE_SEGMENTS: usize = 20;
const TEXT_COLOR: u32 = 0x8b5cf6;
const FALLBACK_COLOR: u32 = 0x8b5cf6;

/// Fog and ambience colour for a dominant emotion.
pub fn emotion_color(emotion: Emotion) -> u32 {
    match emotion {
        Emotion::Fear => 0x4a0066,
        Emotion::Joy => 0xffeb3b,
        Emotion::Sadness => 0x607d8b,
        Emotion::Wonder => 0x8b5cf6,
        Emotion::Anxiety => 0xff1744,
        Emotion::Peace => 0x4caf50,
    }
}

/// Uniform Catmull-Rom spline through `points`, ends clamped.
pub fn catmull_rom(points: &[Vec3], t: f32) -> Vec3 {
    match points.len() {
        0 => return Vec3::ZERO,
        1 => return points[0],
        _ => {}
    }
    let segments = (points.len() - 1) as f32;
    let scaled = t.clamp(0.0, 1.0) * segments;
    let i = (scaled.floor() as usize).min(points.len() - 2);
    let u = scaled - i as f32;
    let at = |k: isize| points[k.clamp(0, points.len() as isize - 1) as usize];
    let (p0, p1, p2, p3) = (at(i as isize - 1), at(i as isize), at(i as isize + 1), at(i as isize + 2));
    let u2 = u * u;
    let u3 = u2 * u;
    0.5 * (2.0 * p1
        + (p2 - p0) * u
        + (2.0 * p0 - 5.0 * p1 + 4.0 * p2 - p3) * u2
        + (3.0 * p1 - p0 - 3.0 * p2 + p3) * u3)
}

/// Wave height at grid-local `(x, y)` for visualizer time `t` seconds.
pub fn wave_height(x: f32, y: f32, t: f32) -> f32 {
    (x * 2.0 + t).sin() * 0.1 + (y * 2.0 + t * 0.7).cos() * 0.1
}

#[derive(Clone, Debug, PartialEq)]
pub enum Visual {
    /// Huge translucent sphere tinting the whole room.
    Ambience { yaw: f32 },
    /// A word from the dream, floating as a camera-facing label.
    Text { word: String, float_speed: f32, float_offset: f32, roll: f32 },
    /// Thin tube along a spline, drawn as oriented segments.
    Vine { path: Vec<Vec3>, sway: f32 },
    Star { twinkle_speed: f32, twinkle_offset: f32 },
    Moon { yaw: f32 },
    MoonGlow { scale: f32 },
    /// Wireframe grid whose heights ripple.
    Water { heights: Vec<f32> },
    Shape {
        mesh: MeshKind,
        size: f32,
        wireframe: bool,
        morph_speed: f32,
        rotate_speed: f32,
        float_speed: f32,
        rotation: Vec3,
        scale: f32,
    },
    Swarm { points: Vec<Vec3>, velocities: Vec<Vec3> },
    Particles { points: Vec<Vec3>, yaw: f32, size: f32 },
}

#[derive(Clone, Debug, PartialEq)]
pub struct DreamObject {
    pub id: ObjectId,
    pub position: Vec3,
    pub color: Color,
    pub opacity: f32,
    pub visual: Visual,
}

impl DreamObject {
    pub fn category(&self) -> &'static str {
        match self.visual {
            Visual::Ambience { .. } => "ambience",
            Visual::Text { .. } => "text",
            Visual::Vine { .. } => "nature",
            Visual::Star { .. } | Visual::Moon { .. } | Visual::MoonGlow { .. } => "sky",
            Visual::Water { .. } => "water",
            Visual::Shape { .. } => "abstract",
            Visual::Swarm { .. } => "creatures",
            Visual::Particles { .. } => "particles",
        }
    }
}

/// What `visualize` produced.
#[derive(Clone, Debug, PartialEq)]
pub struct VisualizationSummary {
    /// Visuals plus the dream light.
    pub object_count: usize,
    pub particle_count: usize,
    pub detected_objects: ObjectCounts,
}

#[derive(Default)]
pub struct DreamVisualizer {
    /// Seconds since creation.
    time: f32,
    objects: Vec<DreamObject>,
    fog: Option<Fog>,
    light: Option<PointLight>,
    next_id: u32,
}

impl DreamVisualizer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn objects(&self) -> &[DreamObject] {
        &self.objects
    }

    pub fn is_active(&self) -> bool {
        !self.objects.is_empty()
    }

    /// Exp2 fog in the emotion colour, while a dream is shown.
    pub fn fog(&self) -> Option<Fog> {
        self.fog
    }

    pub fn light(&self) -> Option<&PointLight> {
        self.light.as_ref()
    }

    pub fn ids_of(&self, category: &str) -> Vec<ObjectId> {
        self.objects.iter().filter(|o| o.category() == category).map(|o| o.id).collect()
    }

    pub fn remove(&mut self, id: ObjectId) {
        self.objects.retain(|o| o.id != id);
    }

    fn push(&mut self, position: Vec3, color: Color, opacity: f32, visual: Visual) {
        let id = ObjectId(self.next_id);
        self.next_id += 1;
        self.objects.push(DreamObject { id, position, color, opacity, visual });
    }

    /// Replace the current visuals with ones built from `dream`.
    pub fn visualize(&mut self, dream: &ParsedDream, rng: &mut Rng) -> VisualizationSummary {
        self.clear();
        let mood = Color::from_hex(emotion_color(dream.dominant_emotion));
        let intensity = dream.intensity;

        self.add_ambience(mood, intensity);
        self.add_text_fragments(&dream.text, rng);

        let has = |c: ObjectCategory| dream.objects.get(&c).copied().unwrap_or(0) > 0;
        if has(ObjectCategory::Nature) {
            self.add_vines(&dream.colors, rng);
        }
        if has(ObjectCategory::Sky) {
            self.add_sky(&dream.colors, rng);
        }
        if has(ObjectCategory::Water) {
            self.add_water();
        }
        if has(ObjectCategory::Abstract) {
            self.add_shapes(&dream.colors, intensity, rng);
        }
        if has(ObjectCategory::Creatures) {
            self.add_swarm(rng);
        }
        if dream.objects.is_empty() {
            self.add_shapes(&dream.colors, intensity, rng);
        }

        self.add_particles(mood, rng);
        self.light = Some(PointLight {
            position: Vec3::new(0.0, 5.0, 0.0),
            color: mood,
            intensity: intensity * 2.0,
            range: 20.0,
        });

        let summary = VisualizationSummary {
            object_count: self.objects.len() + 1,
            particle_count: self.objects.iter().filter(|o| o.category() == "particles").count(),
            detected_objects: dream.objects.clone(),
        };
        log::info!(
            "visualized dream: {} objects, emotion {}",
            summary.object_count,
            dream.dominant_emotion.name()
        );
        summary
    }

    fn add_ambience(&mut self, mood: Color, intensity: f32) {
        self.fog = Some(Fog::Exp2 { color: mood, density: 0.015 * intensity });
        self.push(Vec3::new(0.0, 3.0, 0.0), mood, 0.1 * intensity, Visual::Ambience { yaw: 0.0 });
    }

    fn add_text_fragments(&mut self, text: &str, rng: &mut Rng) {
        let mut words: Vec<&str> = text.split(' ').filter(|w| w.chars().count() > 3).collect();
        for i in (1..words.len()).rev() {
            let j = rng.index(i + 1);
            words.swap(i, j);
        }
        words.truncate(MAX_TEXT_FRAGMENTS);

        let n = words.len();
        for (index, word) in words.into_iter().enumerate() {
            let angle = index as f32 / n as f32 * TAU;
            let radius = rng.range(5.0, 8.0);
            let position = Vec3::new(angle.cos() * radius, rng.range(2.0, 6.0), angle.sin() * radius);
            let visual = Visual::Text {
                word: word.to_string(),
                float_speed: rng.range(0.0005, 0.0015),
                float_offset: rng.range(0.0, TAU),
                roll: 0.0,
            };
            self.push(position, Color::from_hex(TEXT_COLOR), 0.6, visual);
        }
    }

    fn add_vines(&mut self, colors: &[DreamColor], rng: &mut Rng) {
        let color = Color::from_hex(colors.first().map_or(0x4ecdc4, |c| c.hex()));
        let count = 5 + rng.index(5);
        for _ in 0..count {
            let controls: Vec<Vec3> = [0.0, 2.0, 4.0, 6.0]
                .iter()
                .map(|y| Vec3::new(rng.range(-2.0, 2.0), *y, rng.range(-2.0, 2.0)))
                .collect();
            let path = (0..=VINE_SEGMENTS)
                .map(|i| catmull_rom(&controls, i as f32 / VINE_SEGMENTS as f32))
                .collect();
            self.push(Vec3::ZERO, color, 0.7, Visual::Vine { path, sway: 0.0 });
        }
    }

    fn add_sky(&mut self, colors: &[DreamColor], rng: &mut Rng) {
        for _ in 0..STAR_COUNT {
            let color = rng.pick(colors).map_or(Color::WHITE, |c| Color::from_hex(c.hex()));
            let position = Vec3::new(rng.range(-8.0, 8.0), rng.range(3.0, 7.0), rng.range(-8.0, 8.0));
            let visual = Visual::Star {
                twinkle_speed: rng.range(0.5, 2.0),
                twinkle_offset: rng.range(0.0, TAU),
            };
            self.push(position, color, 0.8, visual);
        }

        let moon_color = Color::from_hex(colors.first().map_or(0xffffcc, |c| c.hex()));
        let at = Vec3::new(5.0, 6.0, -5.0);
        self.push(at, moon_color, 0.7, Visual::Moon { yaw: 0.0 });
        self.push(at, moon_color, 0.2, Visual::MoonGlow { scale: 1.0 });
    }

    fn add_water(&mut self) {
        let heights = vec![0.0; WATER_GRID * WATER_GRID];
        self.push(Vec3::new(0.0, 0.1, 0.0), Color::from_hex(0x4a90e2), 0.3, Visual::Water { heights });
    }

    fn add_shapes(&mut self, colors: &[DreamColor], intensity: f32, rng: &mut Rng) {
        const SHAPES: [(MeshKind, f32); 4] = [
            (MeshKind::Sphere, 0.5),
            (MeshKind::Cube, 0.7),
            (MeshKind::Torus, 1.0),
            (MeshKind::Octahedron, 0.5),
        ];
        let count = 3 + (intensity * 5.0).floor() as usize;
        for _ in 0..count {
            let (mesh, size) = SHAPES[rng.index(SHAPES.len())];
            let color = Color::from_hex(rng.pick(colors).map_or(FALLBACK_COLOR, |c| c.hex()));
            let wireframe = rng.chance(0.5);
            let position = Vec3::new(rng.range(-6.0, 6.0), rng.range(1.0, 6.0), rng.range(-6.0, 6.0));
            let visual = Visual::Shape {
                mesh,
                size,
                wireframe,
                morph_speed: rng.range(0.001, 0.004),
                rotate_speed: rng.range(0.01, 0.03),
                float_speed: rng.range(0.0003, 0.001),
                rotation: Vec3::ZERO,
                scale: 1.0,
            };
            self.push(position, color, 0.7, visual);
        }
    }

    fn add_swarm(&mut self, rng: &mut Rng) {
        let mut points = Vec::with_capacity(SWARM_SIZE);
        let mut velocities = Vec::with_capacity(SWARM_SIZE);
        for _ in 0..SWARM_SIZE {
            points.push(Vec3::new(rng.range(-6.0, 6.0), rng.range(0.0, 6.0), rng.range(-6.0, 6.0)));
            velocities.push(Vec3::new(rng.centered(0.01), rng.centered(0.01), rng.centered(0.01)));
        }
        self.push(Vec3::ZERO, Color::from_hex(0xec4899), 0.6, Visual::Swarm { points, velocities });
    }

    fn add_particles(&mut self, mood: Color, rng: &mut Rng) {
        let points = (0..PARTICLE_COUNT)
            .map(|_| Vec3::new(rng.range(-10.0, 10.0), rng.range(0.0, 8.0), rng.range(-10.0, 10.0)))
            .collect();
        self.push(Vec3::ZERO, mood, 0.5, Visual::Particles { points, yaw: 0.0, size: 0.1 });
    }

    /// Advance animations by `dt_ms` milliseconds.
    pub fn update(&mut self, dt_ms: f32) {
        self.time += dt_ms * 0.001;
        let t = self.time;
        // Per-frame increments are scaled to the actual step.
        let f = dt_ms / FRAME_MS;

        for obj in &mut self.objects {
            match &mut obj.visual {
                Visual::Text { float_speed, float_offset, roll, .. } => {
                    obj.position.y += (t * *float_speed * 1000.0 + *float_offset).sin() * 0.01 * f;
                    *roll = (t * 0.5).sin() * 0.1;
                    obj.opacity = 0.4 + (t * 2.0).sin() * 0.2;
                }
                Visual::Shape { rotate_speed, float_speed, morph_speed, rotation, scale, .. } => {
                    rotation.x += *rotate_speed * f;
                    rotation.y += *rotate_speed * 1.5 * f;
                    obj.position.y += (t * *float_speed * 1000.0).sin() * 0.01 * f;
                    *scale = 1.0 + (t * *morph_speed * 1000.0).sin() * 0.3;
                }
                Visual::Star { twinkle_speed, twinkle_offset } => {
                    obj.opacity = 0.5 + (t * *twinkle_speed + *twinkle_offset).sin() * 0.3;
                }
                Visual::Moon { yaw } => *yaw += 0.001 * f,
                Visual::MoonGlow { scale } => {
                    *scale = 1.0 + (t * 0.5).sin() * 0.1;
                    obj.opacity = 0.1 + (t * 0.5).sin() * 0.1;
                }
                Visual::Water { heights } => {
                    let step = WATER_SIZE / (WATER_GRID - 1) as f32;
                    for (i, h) in heights.iter_mut().enumerate() {
                        let x = (i % WATER_GRID) as f32 * step - WATER_SIZE * 0.5;
                        let y = WATER_SIZE * 0.5 - (i / WATER_GRID) as f32 * step;
                        *h = wave_height(x, y, t);
                    }
                }
                Visual::Ambience { yaw } => {
                    *yaw += 0.0005 * f;
                    obj.opacity = 0.05 + (t * 0.5).sin() * 0.05;
                }
                Visual::Vine { sway, .. } => *sway = (t * 0.5).sin() * 0.1,
                Visual::Swarm { points, velocities } => {
                    for (p, v) in points.iter_mut().zip(velocities.iter_mut()) {
                        *p += *v * f;
                        for axis in 0..3 {
                            let (lo, hi) = if axis == 1 { (0.0, 6.0) } else { (-6.0, 6.0) };
                            if p[axis] < lo || p[axis] > hi {
                                v[axis] = -v[axis];
                                p[axis] = p[axis].clamp(lo, hi);
                            }
                        }
                    }
                }
                Visual::Particles { yaw, .. } => *yaw += 0.0003 * f,
            }
        }
    }

    /// Remove every visual, the dream fog and the dream light.
    pub fn clear(&mut self) {
        self.objects.clear();
        self.fog = None;
        self.light = None;
    }

    /// Queue all visuals. Temporal decay, drift and phasing apply on top.
    pub fn draw(&self, engine: &mut Engine, temporal: &TemporalEffects) {
        let chaotic = temporal.state().is_chaotic;
        for obj in &self.objects {
            let shift = temporal.shift_of(obj.id);
            let opacity = temporal.opacity_of(obj.id).map_or(obj.opacity, |o| o.min(obj.opacity));
            let position = obj.position + shift.position;

            match &obj.visual {
                Visual::Ambience { yaw } => {
                    let transform = Mat4::from_scale_rotation_translation(
                        Vec3::splat(15.0),
                        Quat::from_rotation_y(*yaw),
                        position,
                    );
                    engine.draw_mesh(MeshKind::Sphere, transform, &Material::basic(obj.color).with_opacity(opacity));
                }
                Visual::Text { word, roll, .. } => {
                    let mut alpha = opacity;
                    if chaotic {
                        let (phase, visible) = temporal.phase(0.003);
                        if !visible {
                            continue;
                        }
                        alpha *= phase;
                    }
                    if let Some(texture) = engine.label_texture(word, obj.color) {
                        engine.draw_billboard(texture, position, Vec2::new(2.0, 0.5), *roll, Color::WHITE.with_alpha(alpha));
                    }
                }
                Visual::Vine { path, sway } => {
                    let material = Material { color: obj.color, opacity, ..Default::default() }
                        .with_emissive(Color::from_hex(0x2a7a6f), 0.3);
                    let rotation = Quat::from_rotation_z(*sway);
                    for pair in path.windows(2) {
                        let (a, b) = (rotation * pair[0], rotation * pair[1]);
                        let length = a.distance(b);
                        if length <= f32::EPSILON {
                            continue;
                        }
                        let facing = Quat::from_rotation_arc(Vec3::Z, (b - a) / length);
                        let transform = Mat4::from_scale_rotation_translation(
                            Vec3::new(0.1, 0.1, length),
                            facing,
                            (a + b) * 0.5 + position,
                        );
                        engine.draw_mesh(MeshKind::Cube, transform, &material);
                    }
                }
                Visual::Star { .. } => {
                    let transform = Mat4::from_scale_rotation_translation(Vec3::splat(0.15), Quat::IDENTITY, position);
                    engine.draw_mesh(MeshKind::Sphere, transform, &Material::basic(obj.color).with_opacity(opacity));
                }
                Visual::Moon { yaw } => {
                    let transform = Mat4::from_rotation_translation(Quat::from_rotation_y(*yaw), position);
                    let material = Material {
                        color: obj.color,
                        emissive: obj.color,
                        emissive_intensity: 0.5,
                        opacity,
                        ..Default::default()
                    };
                    engine.draw_mesh(MeshKind::Sphere, transform, &material);
                }
                Visual::MoonGlow { scale } => {
                    let transform = Mat4::from_scale_rotation_translation(Vec3::splat(1.5 * scale), Quat::IDENTITY, position);
                    engine.draw_mesh(MeshKind::Sphere, transform, &Material::basic(obj.color).with_opacity(opacity));
                }
                Visual::Water { heights } => {
                    self.draw_water(engine, position, heights, obj.color.with_alpha(opacity));
                }
                Visual::Shape { mesh, size, wireframe, rotation, scale, .. } => {
                    let rotation = Quat::from_euler(EulerRot::XYZ, rotation.x, rotation.y + shift.yaw, rotation.z);
                    let transform = Mat4::from_scale_rotation_translation(Vec3::splat(size * scale), rotation, position);
                    if *wireframe {
                        engine.draw_wireframe(*mesh, transform, obj.color.with_alpha(opacity));
                    } else {
                        let material = Material {
                            color: obj.color,
                            emissive: obj.color,
                            emissive_intensity: 0.3,
                            opacity,
                            ..Default::default()
                        };
                        engine.draw_mesh(*mesh, transform, &material);
                    }
                }
                Visual::Swarm { points, .. } => {
                    let color = obj.color.with_alpha(opacity);
                    for p in points {
                        engine.draw_particle(*p + position, 0.15, color);
                    }
                }
                Visual::Particles { points, yaw, size } => {
                    let rotation = Quat::from_rotation_y(*yaw);
                    let color = obj.color.with_alpha(opacity);
                    for p in points {
                        engine.draw_particle(rotation * *p + position, *size, color);
                    }
                }
            }
        }

        for anchor in temporal.anchors() {
            let transform = Mat4::from_scale_rotation_translation(Vec3::splat(0.3 * anchor.scale), Quat::IDENTITY, anchor.position);
            engine.draw_wireframe(MeshKind::Sphere, transform, Color::from_hex(0x00ffff).with_alpha(anchor.opacity));
        }
        for ripple in temporal.ripples() {
            if ripple.radius <= 0.0 {
                continue;
            }
            let transform = Mat4::from_scale_rotation_translation(Vec3::splat(ripple.radius), Quat::IDENTITY, ripple.origin);
            let material = Material::basic(Color::from_hex(0x8b5cf6)).with_opacity(ripple.opacity);
            engine.draw_mesh(MeshKind::Ring, transform, &material);
        }
    }

    fn draw_water(&self, engine: &mut Engine, origin: Vec3, heights: &[f32], color: Color) {
        let step = WATER_SIZE / (WATER_GRID - 1) as f32;
        // The grid lies flat: local y runs along world -z, height along +y.
        let point = |col: usize, row: usize| {
            let x = col as f32 * step - WATER_SIZE * 0.5;
            let y = WATER_SIZE * 0.5 - row as f32 * step;
            let h = heights.get(row * WATER_GRID + col).copied().unwrap_or(0.0);
            origin + Quat::from_rotation_x(-FRAC_PI_2) * Vec3::new(x, y, h)
        };
        for row in 0..WATER_GRID {
            for col in 0..WATER_GRID {
                if col + 1 < WATER_GRID {
                    engine.draw_line(point(col, row), point(col + 1, row), color);
                }
                if row + 1 < WATER_GRID {
                    engine.draw_line(point(col, row), point(col, row + 1), color);
                }
            }
        }
    }
}
