//! Procedural PCM synthesis: oscillators, the ambient music moods, UI
//! blips, emotion soundscapes and interaction sounds. Everything renders
//! to mono `f32` buffers at [`SAMPLE_RATE`].

use std::f32::consts::TAU;

use crate::dream::parser::Emotion;
use crate::rng::Rng;

pub const SAMPLE_RATE: u32 = 44_100;

/// Ambient loops last this long; every mood's LFO completes whole cycles in it.
pub const AMBIENT_LOOP_SECS: f32 = 20.0;
pub const SOUNDSCAPE_LOOP_SECS: f32 = 2.0;

fn sample_count(secs: f32) -> usize {
    (secs * SAMPLE_RATE as f32).round() as usize
}

// ── Oscillators ─────────────────────────────────────────────────────────

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Waveform {
    Sine,
    Square,
    Sawtooth,
    Triangle,
}

impl Waveform {
    /// Value at `phase` in cycles; only the fractional part matters.
    pub fn sample(self, phase: f32) -> f32 {
        let p = phase.rem_euclid(1.0);
        match self {
            Waveform::Sine => (p * TAU).sin(),
            Waveform::Square => {
                if p < 0.5 {
                    1.0
                } else {
                    -1.0
                }
            }
            Waveform::Sawtooth => 2.0 * p - 1.0,
            Waveform::Triangle => 1.0 - 4.0 * (p - 0.5).abs(),
        }
    }
}

/// Phase-accumulating oscillator, so frequency changes stay click-free.
#[derive(Clone, Debug)]
pub struct Oscillator {
    pub waveform: Waveform,
    phase: f32,
}

impl Oscillator {
    pub fn new(waveform: Waveform) -> Self {
        Self { waveform, phase: 0.0 }
    }

    pub fn next(&mut self, frequency: f32) -> f32 {
        let value = self.waveform.sample(self.phase);
        self.phase = (self.phase + frequency / SAMPLE_RATE as f32).fract();
        value
    }
}

/// `from * (to / from)^(t / duration)`, held at `to` past the end.
pub fn exp_ramp(from: f32, to: f32, t: f32, duration: f32) -> f32 {
    if t >= duration {
        return to;
    }
    from * (to / from).powf(t / duration)
}

// ── Ambient music ───────────────────────────────────────────────────────

#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, Default)]
pub enum Mood {
    #[default]
    Calm,
    Mysterious,
    Ethereal,
    Intense,
    Dreamy,
}

#[derive(Copy, Clone, Debug, PartialEq)]
pub struct MoodConfig {
    pub bass: f32,
    pub pad: f32,
    pub shimmer: f32,
    pub lfo_speed: f32,
    /// Pad vibrato depth in Hz.
    pub lfo_depth: f32,
}

impl Mood {
    pub const ALL: [Mood; 5] = [Mood::Calm, Mood::Mysterious, Mood::Ethereal, Mood::Intense, Mood::Dreamy];

    pub fn name(self) -> &'static str {
        match self {
            Mood::Calm => "calm",
            Mood::Mysterious => "mysterious",
            Mood::Ethereal => "ethereal",
            Mood::Intense => "intense",
            Mood::Dreamy => "dreamy",
        }
    }

    /// Unknown names fall back to calm.
    pub fn from_name(name: &str) -> Mood {
        Mood::ALL.into_iter().find(|m| m.name() == name).unwrap_or_default()
    }

    pub fn for_emotion(emotion: Emotion) -> Mood {
        match emotion {
            Emotion::Fear => Mood::Mysterious,
            Emotion::Joy => Mood::Ethereal,
            Emotion::Sadness => Mood::Calm,
            Emotion::Wonder => Mood::Dreamy,
            Emotion::Anxiety => Mood::Intense,
            Emotion::Peace => Mood::Calm,
        }
    }

    pub fn config(self) -> MoodConfig {
        let (bass, pad, shimmer, lfo_speed, lfo_depth) = match self {
            Mood::Calm => (55.0, 220.0, 880.0, 0.2, 5.0),
            Mood::Mysterious => (49.0, 196.0, 784.0, 0.3, 10.0),
            Mood::Ethereal => (65.41, 261.63, 1046.5, 0.15, 15.0),
            Mood::Intense => (46.25, 185.0, 740.0, 0.5, 20.0),
            Mood::Dreamy => (58.27, 233.08, 932.33, 0.1, 8.0),
        };
        MoodConfig { bass, pad, shimmer, lfo_speed, lfo_depth }
    }
}

/// Nudge `freq` so it completes a whole number of cycles in `secs`.
fn loopable(freq: f32, secs: f32) -> f32 {
    (freq * secs).round().max(1.0) / secs
}

/// One seamless loop of the three-voice drone for `mood` at `volume`:
/// sine bass at 0.3, LFO-modulated triangle pad at 0.2, sine shimmer at 0.1.
pub fn ambient_loop(mood: Mood, volume: f32, secs: f32) -> Vec<f32> {
    let cfg = mood.config();
    let bass = loopable(cfg.bass, secs);
    let pad = loopable(cfg.pad, secs);
    let shimmer = loopable(cfg.shimmer, secs);
    let lfo = loopable(cfg.lfo_speed, secs);

    let mut bass_osc = Oscillator::new(Waveform::Sine);
    let mut pad_osc = Oscillator::new(Waveform::Triangle);
    let mut shimmer_osc = Oscillator::new(Waveform::Sine);
    let mut lfo_osc = Oscillator::new(Waveform::Sine);

    (0..sample_count(secs))
        .map(|_| {
            let vibrato = lfo_osc.next(lfo) * cfg.lfo_depth;
            bass_osc.next(bass) * volume * 0.3
                + pad_osc.next(pad + vibrato) * volume * 0.2
                + shimmer_osc.next(shimmer) * volume * 0.1
        })
        .collect()
}

// ── UI blips ────────────────────────────────────────────────────────────

/// Rising 800 to 1200 Hz chirp, 0.2 s.
pub fn notification(sfx_volume: f32) -> Vec<f32> {
    let mut osc = Oscillator::new(Waveform::Sine);
    (0..sample_count(0.2))
        .map(|i| {
            let t = i as f32 / SAMPLE_RATE as f32;
            osc.next(exp_ramp(800.0, 1200.0, t, 0.1)) * exp_ramp(sfx_volume * 0.3, 0.001, t, 0.2)
        })
        .collect()
}

/// Two-step 600/800 Hz ping, 0.15 s.
pub fn message(sfx_volume: f32) -> Vec<f32> {
    let mut osc = Oscillator::new(Waveform::Sine);
    (0..sample_count(0.15))
        .map(|i| {
            let t = i as f32 / SAMPLE_RATE as f32;
            let freq = if t < 0.05 { 600.0 } else { 800.0 };
            osc.next(freq) * exp_ramp(sfx_volume * 0.2, 0.001, t, 0.15)
        })
        .collect()
}

/// Short square tick between 200 and 300 Hz, 0.05 s.
pub fn typing(sfx_volume: f32, rng: &mut Rng) -> Vec<f32> {
    let freq = 200.0 + rng.next_f32() * 100.0;
    let mut osc = Oscillator::new(Waveform::Square);
    (0..sample_count(0.05))
        .map(|i| {
            let t = i as f32 / SAMPLE_RATE as f32;
            osc.next(freq) * exp_ramp(sfx_volume * 0.05, 0.001, t, 0.05)
        })
        .collect()
}

// ── Soundscapes ─────────────────────────────────────────────────────────

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum FilterKind {
    Lowpass,
    Highpass,
    Bandpass,
}

/// Direct form I biquad with RBJ cookbook coefficients.
#[derive(Clone, Debug)]
pub struct Biquad {
    b: [f32; 3],
    a: [f32; 2],
    x: [f32; 2],
    y: [f32; 2],
}

impl Biquad {
    pub fn new(kind: FilterKind, cutoff: f32, q: f32) -> Self {
        let w0 = TAU * cutoff / SAMPLE_RATE as f32;
        let (sin, cos) = w0.sin_cos();
        let alpha = sin / (2.0 * q);
        let (b0, b1, b2) = match kind {
            FilterKind::Lowpass => ((1.0 - cos) / 2.0, 1.0 - cos, (1.0 - cos) / 2.0),
            FilterKind::Highpass => ((1.0 + cos) / 2.0, -(1.0 + cos), (1.0 + cos) / 2.0),
            FilterKind::Bandpass => (alpha, 0.0, -alpha),
        };
        let a0 = 1.0 + alpha;
        Self {
            b: [b0 / a0, b1 / a0, b2 / a0],
            a: [-2.0 * cos / a0, (1.0 - alpha) / a0],
            x: [0.0; 2],
            y: [0.0; 2],
        }
    }

    pub fn process(&mut self, input: f32) -> f32 {
        let out = self.b[0] * input + self.b[1] * self.x[0] + self.b[2] * self.x[1]
            - self.a[0] * self.y[0]
            - self.a[1] * self.y[1];
        self.x = [input, self.x[0]];
        self.y = [out, self.y[0]];
        out
    }
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Soundscape {
    Dark,
    Bright,
    Melancholic,
    Ethereal,
    Tense,
    Ambient,
}

#[derive(Copy, Clone, Debug, PartialEq)]
pub struct SoundscapeConfig {
    pub waveform: Waveform,
    pub frequency: f32,
    pub filter: FilterKind,
    pub cutoff: f32,
}

impl Soundscape {
    pub fn for_emotion(emotion: Emotion) -> Soundscape {
        match emotion {
            Emotion::Fear => Soundscape::Dark,
            Emotion::Joy => Soundscape::Bright,
            Emotion::Sadness => Soundscape::Melancholic,
            Emotion::Wonder => Soundscape::Ethereal,
            Emotion::Anxiety => Soundscape::Tense,
            Emotion::Peace => Soundscape::Ambient,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            Soundscape::Dark => "dark",
            Soundscape::Bright => "bright",
            Soundscape::Melancholic => "melancholic",
            Soundscape::Ethereal => "ethereal",
            Soundscape::Tense => "tense",
            Soundscape::Ambient => "ambient",
        }
    }

    pub fn config(self) -> SoundscapeConfig {
        use FilterKind::*;
        let (waveform, frequency, filter, cutoff) = match self {
            Soundscape::Dark => (Waveform::Sawtooth, 55.0, Lowpass, 200.0),
            Soundscape::Bright => (Waveform::Sine, 440.0, Highpass, 2000.0),
            Soundscape::Melancholic => (Waveform::Triangle, 220.0, Bandpass, 500.0),
            Soundscape::Ethereal => (Waveform::Sine, 330.0, Lowpass, 1000.0),
            Soundscape::Tense => (Waveform::Square, 110.0, Highpass, 300.0),
            Soundscape::Ambient => (Waveform::Sine, 165.0, Lowpass, 800.0),
        };
        SoundscapeConfig { waveform, frequency, filter, cutoff }
    }
}

/// Filtered single-oscillator bed at `intensity * 0.1`. One loop of
/// `secs`, rendered after a second of warm-up so the filter has settled.
pub fn soundscape(kind: Soundscape, intensity: f32, secs: f32) -> Vec<f32> {
    let cfg = kind.config();
    let freq = loopable(cfg.frequency, secs);
    let gain = intensity.clamp(0.0, 1.0) * 0.1;
    let mut osc = Oscillator::new(cfg.waveform);
    let mut filter = Biquad::new(cfg.filter, cfg.cutoff, 1.0);

    let warmup = sample_count(1.0);
    let mut out = Vec::with_capacity(sample_count(secs));
    for i in 0..warmup + sample_count(secs) {
        let v = filter.process(osc.next(freq)) * gain;
        if i >= warmup {
            out.push(v);
        }
    }
    out
}

// ── Interaction sounds ──────────────────────────────────────────────────

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Interaction {
    Click,
    Hover,
    Whoosh,
    Chime,
    Pulse,
}

impl Interaction {
    /// Frequency in Hz and length in seconds.
    pub fn params(self) -> (f32, f32) {
        match self {
            Interaction::Click => (800.0, 0.05),
            Interaction::Hover => (600.0, 0.03),
            Interaction::Whoosh => (400.0, 0.2),
            Interaction::Chime => (1000.0, 0.3),
            Interaction::Pulse => (220.0, 0.15),
        }
    }
}

pub fn interaction(kind: Interaction) -> Vec<f32> {
    let (freq, secs) = kind.params();
    let mut osc = Oscillator::new(Waveform::Sine);
    (0..sample_count(secs))
        .map(|i| {
            let t = i as f32 / SAMPLE_RATE as f32;
            osc.next(freq) * exp_ramp(0.2, 0.01, t, secs)
        })
        .collect()
}

/// The narrator's keystroke: 400 to 600 Hz square, 20 ms.
pub fn voice_typing(rng: &mut Rng) -> Vec<f32> {
    let freq = 400.0 + rng.next_f32() * 200.0;
    let mut osc = Oscillator::new(Waveform::Square);
    (0..sample_count(0.02))
        .map(|i| {
            let t = i as f32 / SAMPLE_RATE as f32;
            osc.next(freq) * exp_ramp(0.05, 0.01, t, 0.02)
        })
        .collect()
}
