//! Time that misbehaves: a global reality-stability scalar, per-object decay
//! and drift, anchors, ripples and short timed overrides of the time scale.

use glam::Vec3;

use crate::dream::memory::EmotionalInfluence;
use crate::dream::ObjectId;
use crate::engine::Color;
use crate::rng::Rng;

/// Stability at or below which chaos mode holds reality.
pub const CHAOS_STABILITY: f32 = 0.3;
/// Influence intensity above which chaos mode is forced.
pub const CHAOS_INTENSITY: f32 = 0.7;
/// Below this stability the camera shakes and the fog drifts in hue.
pub const UNSTABLE_BELOW: f32 = 0.7;

const RIPPLE_MAX_RADIUS: f32 = 10.0;

#[derive(Clone, Debug)]
struct Decaying {
    id: ObjectId,
    rate: f32,
    original_opacity: f32,
    decay_time: f32,
    opacity: f32,
}

#[derive(Clone, Debug)]
struct Shifting {
    id: ObjectId,
    speed: f32,
    offset: Vec3,
    yaw: f32,
}

/// A point where reality pulses gently instead of drifting.
#[derive(Clone, Debug, PartialEq)]
pub struct TemporalAnchor {
    pub position: Vec3,
    pub pulse_speed: f32,
    pub scale: f32,
    pub opacity: f32,
}

/// Expanding flat ring that fades out.
#[derive(Clone, Debug, PartialEq)]
pub struct TimeRipple {
    pub origin: Vec3,
    pub strength: f32,
    pub radius: f32,
    pub opacity: f32,
    created_at: f64,
}

#[derive(Clone, Copy, Debug)]
struct TimeOverride {
    scale: f32,
    remaining_ms: f32,
    restore: f32,
}

/// Per-object displacement layered on top of the object's own animation.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct ShiftOffset {
    pub position: Vec3,
    pub yaw: f32,
}

/// Side effects of one `update` the caller applies to camera, fog and scene.
#[derive(Clone, Debug, Default)]
pub struct TemporalFrame {
    pub camera_shake: Vec3,
    /// Colour the fog should drift toward, with the per-frame lerp factor.
    pub fog_aberration: Option<(Color, f32)>,
    /// Decaying objects that faded out completely this frame.
    pub expired: Vec<ObjectId>,
}

#[derive(Clone, Debug, PartialEq)]
pub struct TemporalState {
    pub time: f64,
    pub time_scale: f32,
    pub reality_stability: f32,
    pub is_stable: bool,
    pub is_chaotic: bool,
    pub decaying_object_count: usize,
    pub shifting_object_count: usize,
}

pub struct TemporalEffects {
    /// Scaled milliseconds. f64 so long sessions keep frame resolution.
    time: f64,
    base_time_scale: f32,
    reality_stability: f32,
    override_: Option<TimeOverride>,
    decaying: Vec<Decaying>,
    shifting: Vec<Shifting>,
    anchors: Vec<TemporalAnchor>,
    ripples: Vec<TimeRipple>,
}

impl Default for TemporalEffects {
    fn default() -> Self {
        Self::new()
    }
}

impl TemporalEffects {
    pub fn new() -> Self {
        Self {
            time: 0.0,
            base_time_scale: 1.0,
            reality_stability: 1.0,
            override_: None,
            decaying: Vec::new(),
            shifting: Vec::new(),
            anchors: Vec::new(),
            ripples: Vec::new(),
        }
    }

    pub fn time(&self) -> f64 {
        self.time
    }

    /// Effective scale, including any active freeze/accelerate/reverse.
    pub fn time_scale(&self) -> f32 {
        self.override_.map_or(self.base_time_scale, |o| o.scale)
    }

    pub fn reality_stability(&self) -> f32 {
        self.reality_stability
    }

    pub fn apply_influence(&mut self, influence: &EmotionalInfluence) {
        self.base_time_scale = if influence.time_distortion != 0.0 {
            influence.time_distortion
        } else {
            1.0
        };
        self.reality_stability = (1.0 - influence.intensity * 0.5).max(CHAOS_STABILITY);
        if influence.intensity > CHAOS_INTENSITY {
            self.enable_chaos_mode();
        }
        log::debug!(
            "temporal influence: scale {:.2}, stability {:.2}",
            self.base_time_scale,
            self.reality_stability
        );
    }

    pub fn enable_chaos_mode(&mut self) {
        log::info!("reality destabilizes");
        self.reality_stability = CHAOS_STABILITY;
    }

    /// Fade `id` out at `rate` per millisecond, from `opacity`.
    pub fn add_decaying(&mut self, id: ObjectId, rate: f32, opacity: f32) {
        self.decaying.retain(|d| d.id != id);
        self.decaying.push(Decaying {
            id,
            rate,
            original_opacity: opacity,
            decay_time: 0.0,
            opacity,
        });
    }

    pub fn add_shifting(&mut self, id: ObjectId, speed: f32) {
        self.shifting.retain(|s| s.id != id);
        self.shifting.push(Shifting { id, speed, offset: Vec3::ZERO, yaw: 0.0 });
    }

    /// Stop tracking `id` for decay and drift.
    pub fn release(&mut self, id: ObjectId) {
        self.decaying.retain(|d| d.id != id);
        self.shifting.retain(|s| s.id != id);
    }

    pub fn create_anchor(&mut self, position: Vec3) -> &TemporalAnchor {
        self.anchors.push(TemporalAnchor { position, pulse_speed: 0.002, scale: 1.0, opacity: 0.3 });
        &self.anchors[self.anchors.len() - 1]
    }

    pub fn create_ripple(&mut self, origin: Vec3, strength: f32) {
        self.ripples.push(TimeRipple {
            origin,
            strength,
            radius: 0.0,
            opacity: 0.5,
            created_at: self.time,
        });
    }

    pub fn anchors(&self) -> &[TemporalAnchor] {
        &self.anchors
    }

    pub fn ripples(&self) -> &[TimeRipple] {
        &self.ripples
    }

    /// Current opacity of a decaying object, `None` when not decaying.
    pub fn opacity_of(&self, id: ObjectId) -> Option<f32> {
        self.decaying.iter().find(|d| d.id == id).map(|d| d.opacity)
    }

    pub fn shift_of(&self, id: ObjectId) -> ShiftOffset {
        self.shifting
            .iter()
            .find(|s| s.id == id)
            .map(|s| ShiftOffset { position: s.offset, yaw: s.yaw })
            .unwrap_or_default()
    }

    /// Opacity and visibility of an object blinking in and out of existence.
    pub fn phase(&self, phase_speed: f32) -> (f32, bool) {
        let phase = self.wave(phase_speed) * 0.5 + 0.5;
        (phase * 0.8 + 0.2, phase > 0.1)
    }

    /// Intensity multiplier and colour for lights caught in unstable time.
    pub fn distorted_light(&self) -> (f32, Color) {
        let intensity = 0.5 + self.wave(0.001) * 0.5;
        let hue = (self.time * 0.0001 * f64::from(1.0 - self.reality_stability)).rem_euclid(1.0) as f32;
        (intensity, Color::from_hsl(hue, 0.5, 0.5))
    }

    fn wave(&self, speed: f32) -> f32 {
        (self.time * f64::from(speed)).sin() as f32
    }

    /// Advance by `dt_ms` real milliseconds.
    pub fn update(&mut self, dt_ms: f32, rng: &mut Rng) -> TemporalFrame {
        self.tick_override(dt_ms);
        self.time += f64::from(dt_ms * self.time_scale());
        let mut frame = TemporalFrame::default();

        for d in &mut self.decaying {
            d.decay_time += dt_ms * d.rate;
            d.opacity = d.original_opacity * (1.0 - d.decay_time);
            if d.opacity <= 0.0 {
                d.opacity = 0.0;
                frame.expired.push(d.id);
            }
        }
        self.decaying.retain(|d| d.opacity > 0.0);

        let instability = 1.0 - self.reality_stability;
        for s in &mut self.shifting {
            let t = self.time * f64::from(s.speed);
            let shift = t.sin() as f32 * instability;
            s.offset = Vec3::new(
                shift * 2.0,
                (t * 1.3).cos() as f32 * shift,
                (t * 0.7).sin() as f32 * shift * 2.0,
            );
            s.yaw = shift * std::f32::consts::PI;
        }

        for a in &mut self.anchors {
            let pulse = (self.time * f64::from(a.pulse_speed)).sin() as f32 * 0.5 + 0.5;
            a.scale = 1.0 + pulse * 0.3;
            a.opacity = 0.2 + pulse * 0.3;
        }

        for r in &mut self.ripples {
            let age = ((self.time - r.created_at) * 0.001) as f32;
            r.radius = (age * 5.0).clamp(0.0, RIPPLE_MAX_RADIUS);
            r.opacity = (0.5 - age * 0.1).clamp(0.0, 0.5);
        }
        self.ripples.retain(|r| r.opacity > 0.0);

        if self.reality_stability < UNSTABLE_BELOW {
            let hue = (self.time * 0.001).rem_euclid(1.0) as f32;
            frame.fog_aberration = Some((Color::from_hsl(hue, instability, 0.5), 0.01));
            let shake = instability * 0.05;
            frame.camera_shake = Vec3::new(
                rng.centered(shake * 0.5),
                rng.centered(shake * 0.5),
                rng.centered(shake * 0.5),
            );
        }

        frame
    }

    fn tick_override(&mut self, dt_ms: f32) {
        if let Some(o) = self.override_.as_mut() {
            o.remaining_ms -= dt_ms;
            if o.remaining_ms <= 0.0 {
                self.base_time_scale = o.restore;
                self.override_ = None;
            }
        }
    }

    fn set_override(&mut self, scale: f32, duration_ms: f32, restore: f32) {
        self.override_ = Some(TimeOverride { scale, remaining_ms: duration_ms, restore });
    }

    /// Time almost stops for `duration_ms`.
    pub fn freeze_time(&mut self, duration_ms: f32) {
        let restore = self.base_time_scale;
        self.set_override(0.01, duration_ms, restore);
    }

    pub fn accelerate_time(&mut self, multiplier: f32, duration_ms: f32) {
        let restore = self.base_time_scale;
        self.set_override(self.time_scale() * multiplier, duration_ms, restore);
    }

    /// Runs time backwards, then settles at normal speed.
    pub fn reverse_time(&mut self, duration_ms: f32) {
        self.set_override(-1.0, duration_ms, 1.0);
    }

    pub fn reset(&mut self) {
        self.time = 0.0;
        self.base_time_scale = 1.0;
        self.reality_stability = 1.0;
        self.override_ = None;
        self.decaying.clear();
        self.shifting.clear();
        self.anchors.clear();
        self.ripples.clear();
    }

    pub fn state(&self) -> TemporalState {
        TemporalState {
            time: self.time,
            time_scale: self.time_scale(),
            reality_stability: self.reality_stability,
            is_stable: self.reality_stability > UNSTABLE_BELOW,
            is_chaotic: self.reality_stability < 0.5,
            decaying_object_count: self.decaying.len(),
            shifting_object_count: self.shifting.len(),
        }
    }
}
