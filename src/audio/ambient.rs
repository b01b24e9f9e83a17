//! Background drone and UI sounds for the chat.

use crate::config::AudioConfig;
use crate::dream::parser::Emotion;
use crate::rng::Rng;

use super::synth::{self, Mood};
use super::{AudioContext, SoundConfig};

pub const SFX_VOLUME: f32 = 0.4;
const MUSIC_FADE_SECS: f32 = 0.5;

const NOTIFICATION: &str = "ui/notification";
const MESSAGE: &str = "ui/message";

pub fn music_sound_name(mood: Mood) -> String {
    format!("music/{}", mood.name())
}

pub struct AmbientMusic {
    mood: Mood,
    enabled: bool,
    sfx_volume: f32,
}

impl AmbientMusic {
    pub fn new(config: &AudioConfig) -> Self {
        Self { mood: Mood::Calm, enabled: config.music_enabled, sfx_volume: SFX_VOLUME }
    }

    pub fn mood(&self) -> Mood {
        self.mood
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    fn ensure(ctx: &mut AudioContext, name: &str, render: impl FnOnce() -> Vec<f32>) -> bool {
        if ctx.has_sound(name) {
            return true;
        }
        match ctx.register(name, &render()) {
            Ok(()) => true,
            Err(e) => {
                log::warn!("could not prepare {name}: {e}");
                false
            }
        }
    }

    /// Crossfade to the drone for `mood`. Does nothing while music is
    /// switched off, apart from remembering the mood.
    pub fn play(&mut self, ctx: &mut AudioContext, mood: Mood) {
        self.mood = mood;
        if !self.enabled || !ctx.is_available() {
            return;
        }
        let name = music_sound_name(mood);
        if Self::ensure(ctx, &name, || synth::ambient_loop(mood, 1.0, synth::AMBIENT_LOOP_SECS)) {
            ctx.play_music(&name, MUSIC_FADE_SECS);
            log::info!("playing {} ambient music", mood.name());
        }
    }

    pub fn play_for_emotion(&mut self, ctx: &mut AudioContext, emotion: Emotion) {
        self.play(ctx, Mood::for_emotion(emotion));
    }

    pub fn stop(&mut self, ctx: &mut AudioContext) {
        ctx.stop_music(MUSIC_FADE_SECS);
    }

    /// Returns whether music is now on.
    pub fn toggle(&mut self, ctx: &mut AudioContext) -> bool {
        self.enabled = !self.enabled;
        if self.enabled {
            let mood = self.mood;
            self.play(ctx, mood);
        } else {
            self.stop(ctx);
        }
        self.enabled
    }

    pub fn notification(&self, ctx: &mut AudioContext) {
        let volume = self.sfx_volume;
        if Self::ensure(ctx, NOTIFICATION, || synth::notification(volume)) {
            ctx.play(NOTIFICATION, SoundConfig::default());
        }
    }

    pub fn message(&self, ctx: &mut AudioContext) {
        let volume = self.sfx_volume;
        if Self::ensure(ctx, MESSAGE, || synth::message(volume)) {
            ctx.play(MESSAGE, SoundConfig::default());
        }
    }

    pub fn typing(&self, ctx: &mut AudioContext, rng: &mut Rng) {
        if !ctx.is_available() {
            return;
        }
        if let Err(e) = ctx.play_samples(&synth::typing(self.sfx_volume, rng), SoundConfig::default()) {
            log::debug!("typing sound: {e}");
        }
    }
}
