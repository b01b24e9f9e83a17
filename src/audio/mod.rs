pub mod ambient;
pub mod synth;
pub mod voice;
pub mod wav;

use std::collections::HashMap;
use std::io::Cursor;
use std::time::Duration;

use kira::{
    manager::{AudioManager, AudioManagerSettings, backend::DefaultBackend},
    sound::{PlaybackRate, static_sound::{StaticSoundData, StaticSoundHandle, StaticSoundSettings}},
    tween::Tween,
    Volume,
};

use crate::error::AudioError;
use crate::rng::Rng;

pub use ambient::AmbientMusic;
pub use synth::{Interaction, Mood, Soundscape};
pub use voice::{CommandBackend, NullBackend, SpeechBackend, VoiceOfTheMachine};

/// Loop channel used by the background music.
pub const MUSIC: &str = "music";

/// Configuration for playing a sound with variation.
#[derive(Debug, Clone, Copy)]
pub struct SoundConfig {
    pub volume: f32,
    pub pitch: f32,
    /// Random pitch variation range (e.g. 0.1 = +/- 10%)
    pub pitch_variation: f32,
    /// Random volume variation range
    pub volume_variation: f32,
}

impl Default for SoundConfig {
    fn default() -> Self {
        Self { volume: 1.0, pitch: 1.0, pitch_variation: 0.0, volume_variation: 0.0 }
    }
}

impl SoundConfig {
    pub fn at_volume(volume: f32) -> Self {
        Self { volume, ..Default::default() }
    }
}

fn tween(secs: f32) -> Tween {
    Tween { duration: Duration::from_secs_f32(secs.max(0.0)), ..Default::default() }
}

/// Decode synthesized PCM into a kira sound through an in-memory WAV file.
pub fn sound_from_samples(samples: &[f32]) -> Result<StaticSoundData, AudioError> {
    let bytes = wav::encode_mono(samples, synth::SAMPLE_RATE)?;
    StaticSoundData::from_cursor(Cursor::new(bytes)).map_err(|e| AudioError::Decode(e.to_string()))
}

struct ActiveLoop {
    handle: StaticSoundHandle,
    sound: String,
}

pub struct AudioContext {
    /// `None` when audio hardware is unavailable (headless / CI / no audio device).
    manager: Option<AudioManager>,
    sounds: HashMap<String, StaticSoundData>,
    loops: HashMap<&'static str, ActiveLoop>,
    last_music: Option<String>,
    master_volume: f32,
    music_volume: f32,
    rng: Rng,
}

impl AudioContext {
    pub fn new(master_volume: f32) -> Self {
        let manager = match AudioManager::<DefaultBackend>::new(AudioManagerSettings::default()) {
            Ok(m) => Some(m),
            Err(e) => {
                log::warn!("failed to initialize audio manager: {e}; audio disabled");
                None
            }
        };
        let mut ctx = Self::with_manager(manager);
        ctx.set_master_volume(master_volume);
        ctx
    }

    /// A context that never touches an output device.
    pub fn disabled() -> Self {
        Self::with_manager(None)
    }

    fn with_manager(manager: Option<AudioManager>) -> Self {
        Self {
            manager,
            sounds: HashMap::new(),
            loops: HashMap::new(),
            last_music: None,
            master_volume: 1.0,
            music_volume: 0.2,
            rng: Rng::from_time(),
        }
    }

    /// Returns true if audio hardware is available.
    pub fn is_available(&self) -> bool { self.manager.is_some() }

    /// Cache `samples` under `name`, replacing any previous sound.
    pub fn register(&mut self, name: &str, samples: &[f32]) -> Result<(), AudioError> {
        let sound = sound_from_samples(samples)?;
        self.sounds.insert(name.to_string(), sound);
        Ok(())
    }

    pub fn has_sound(&self, name: &str) -> bool {
        self.sounds.contains_key(name)
    }

    fn settings_for(&mut self, config: SoundConfig) -> StaticSoundSettings {
        let mut settings = StaticSoundSettings::new();
        let p_offset = self.rng.centered(config.pitch_variation);
        let v_offset = self.rng.centered(config.volume_variation);
        settings.playback_rate = PlaybackRate::Factor((config.pitch + p_offset) as f64).into();
        settings.volume = Volume::Amplitude((config.volume + v_offset).clamp(0.0, 2.0) as f64).into();
        settings
    }

    /// Play a cached sound once with optional config.
    pub fn play(&mut self, name: &str, config: SoundConfig) {
        if self.manager.is_none() {
            return;
        }
        let Some(data) = self.sounds.get(name).cloned() else {
            log::debug!("no sound named {name:?}");
            return;
        };
        let settings = self.settings_for(config);
        if let Some(manager) = self.manager.as_mut() {
            if let Err(e) = manager.play(data.with_settings(settings)) {
                log::warn!("failed to play {name:?}: {e}");
            }
        }
    }

    /// Play a one-off buffer without caching it.
    pub fn play_samples(&mut self, samples: &[f32], config: SoundConfig) -> Result<(), AudioError> {
        if self.manager.is_none() {
            return Ok(());
        }
        let data = sound_from_samples(samples)?;
        let settings = self.settings_for(config);
        let manager = self.manager.as_mut().ok_or(AudioError::Unavailable)?;
        manager.play(data.with_settings(settings)).map_err(|e| AudioError::Decode(e.to_string()))?;
        Ok(())
    }

    /// Loop the cached sound `name` on `channel`, fading out whatever the
    /// channel was playing.
    pub fn play_loop(&mut self, channel: &'static str, name: &str, volume: f32, fade_in_secs: f32) {
        self.stop_loop(channel, 0.5);
        let Some(manager) = self.manager.as_mut() else { return; };
        let Some(data) = self.sounds.get(name) else {
            log::debug!("no sound named {name:?}");
            return;
        };

        let mut settings = StaticSoundSettings::new().loop_region(0.0..);
        settings.volume = Volume::Amplitude(0.0).into();

        match manager.play(data.clone().with_settings(settings)) {
            Ok(mut handle) => {
                let _ = handle.set_volume(Volume::Amplitude(volume as f64), tween(fade_in_secs));
                self.loops.insert(channel, ActiveLoop { handle, sound: name.to_string() });
            }
            Err(e) => log::warn!("failed to loop {name:?} on {channel}: {e}"),
        }
    }

    pub fn stop_loop(&mut self, channel: &'static str, fade_out_secs: f32) {
        if let Some(mut active) = self.loops.remove(channel) {
            let _ = active.handle.stop(tween(fade_out_secs));
        }
    }

    pub fn set_loop_volume(&mut self, channel: &'static str, volume: f32, secs: f32) {
        if let Some(active) = self.loops.get_mut(channel) {
            let _ = active.handle.set_volume(Volume::Amplitude(volume as f64), tween(secs));
        }
    }

    pub fn is_looping(&self, channel: &'static str) -> bool {
        self.loops.contains_key(channel)
    }

    /// Name of the sound looping on `channel`.
    pub fn looping_sound(&self, channel: &'static str) -> Option<&str> {
        self.loops.get(channel).map(|l| l.sound.as_str())
    }

    /// Play background music that loops indefinitely at the music volume.
    pub fn play_music(&mut self, name: &str, fade_in_secs: f32) {
        self.last_music = Some(name.to_string());
        let volume = self.music_volume;
        self.play_loop(MUSIC, name, volume, fade_in_secs);
    }

    pub fn stop_music(&mut self, fade_out_secs: f32) {
        self.stop_loop(MUSIC, fade_out_secs);
    }

    pub fn is_music_playing(&self) -> bool {
        self.is_looping(MUSIC)
    }

    /// Stop the music, or resume the last track. Returns whether music is
    /// now playing.
    pub fn toggle_music(&mut self) -> bool {
        if self.is_music_playing() {
            self.stop_music(0.5);
        } else if let Some(name) = self.last_music.clone() {
            self.play_music(&name, 1.0);
        }
        self.is_music_playing()
    }

    pub fn master_volume(&self) -> f32 { self.master_volume }

    pub fn set_master_volume(&mut self, volume: f32) {
        self.master_volume = volume.clamp(0.0, 1.0);
        if let Some(manager) = self.manager.as_mut() {
            let _ = manager.main_track().set_volume(Volume::Amplitude(self.master_volume as f64), Tween::default());
        }
    }

    pub fn music_volume(&self) -> f32 { self.music_volume }

    pub fn set_music_volume(&mut self, volume: f32) {
        self.music_volume = volume.clamp(0.0, 1.0);
        let volume = self.music_volume;
        self.set_loop_volume(MUSIC, volume, 0.3);
    }
}

impl Default for AudioContext {
    fn default() -> Self { Self::new(1.0) }
}
