//! The narrator: text-to-speech through an external command, emotion
//! soundscapes, interaction sounds and the short text reactions shown in
//! the chat log.

use std::path::PathBuf;
use std::process::{Child, Command, Stdio};

use crate::config::VoiceConfig;
use crate::dream::parser::Emotion;
use crate::error::VoiceError;
use crate::rng::Rng;

use super::synth::{self, Interaction, Soundscape};
use super::{AudioContext, SoundConfig};

/// Loop channel used by the emotion soundscape.
pub const SOUNDSCAPE: &str = "soundscape";
pub const NARRATION_VOLUME: f32 = 0.7;

/// Words per minute at rate 1.0.
const BASE_WPM: f32 = 175.0;

#[derive(Clone, Debug, PartialEq)]
pub struct Utterance {
    pub text: String,
    /// 1.0 is normal speed.
    pub rate: f32,
    /// 1.0 is the default voice pitch.
    pub pitch: f32,
    pub volume: f32,
}

pub trait SpeechBackend {
    fn name(&self) -> &str;
    /// Start speaking, cutting off anything still in progress.
    fn speak(&mut self, utterance: &Utterance) -> Result<(), VoiceError>;
    fn stop(&mut self);
    fn is_speaking(&mut self) -> bool;
}

/// Logs what would have been said.
#[derive(Debug, Default)]
pub struct NullBackend;

impl SpeechBackend for NullBackend {
    fn name(&self) -> &str {
        "none"
    }

    fn speak(&mut self, utterance: &Utterance) -> Result<(), VoiceError> {
        log::info!("machine would say: {}", utterance.text);
        Ok(())
    }

    fn stop(&mut self) {}

    fn is_speaking(&mut self) -> bool {
        false
    }
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
enum Dialect {
    Espeak,
    Say,
}

/// Runs `espeak-ng`, `espeak` or macOS `say` as a child process.
#[derive(Debug)]
pub struct CommandBackend {
    program: String,
    dialect: Dialect,
    child: Option<Child>,
}

const CANDIDATES: [&str; 3] = ["espeak-ng", "espeak", "say"];

fn on_path(program: &str) -> Option<PathBuf> {
    let paths = std::env::var_os("PATH")?;
    std::env::split_paths(&paths).map(|dir| dir.join(program)).find(|p| p.is_file())
}

impl CommandBackend {
    pub fn new(program: &str) -> Self {
        let stem = program.rsplit('/').next().unwrap_or(program);
        let dialect = if stem == "say" { Dialect::Say } else { Dialect::Espeak };
        Self { program: program.to_string(), dialect, child: None }
    }

    /// `preferred` when given, otherwise the first known speech command
    /// found on `PATH`.
    pub fn probe(preferred: Option<&str>) -> Option<Self> {
        if let Some(program) = preferred {
            return Some(Self::new(program));
        }
        CANDIDATES.iter().find(|p| on_path(p).is_some()).map(|p| Self::new(p))
    }

    /// Command line for `utterance`, without the program name.
    pub fn args(&self, utterance: &Utterance) -> Vec<String> {
        let wpm = (BASE_WPM * utterance.rate).round().max(80.0) as u32;
        match self.dialect {
            Dialect::Espeak => {
                let pitch = (50.0 * utterance.pitch).round().clamp(0.0, 99.0) as u32;
                let amplitude = (100.0 * utterance.volume).round().clamp(0.0, 200.0) as u32;
                vec![
                    "-s".into(),
                    wpm.to_string(),
                    "-p".into(),
                    pitch.to_string(),
                    "-a".into(),
                    amplitude.to_string(),
                    "--".into(),
                    utterance.text.clone(),
                ]
            }
            Dialect::Say => vec!["-r".into(), wpm.to_string(), "--".into(), utterance.text.clone()],
        }
    }
}

impl SpeechBackend for CommandBackend {
    fn name(&self) -> &str {
        &self.program
    }

    fn speak(&mut self, utterance: &Utterance) -> Result<(), VoiceError> {
        self.stop();
        let child = Command::new(&self.program)
            .args(self.args(utterance))
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .spawn()
            .map_err(|source| VoiceError::Spawn { program: self.program.clone(), source })?;
        self.child = Some(child);
        Ok(())
    }

    fn stop(&mut self) {
        if let Some(mut child) = self.child.take() {
            let _ = child.kill();
            let _ = child.wait();
        }
    }

    fn is_speaking(&mut self) -> bool {
        match self.child.as_mut().map(|c| c.try_wait()) {
            Some(Ok(None)) => true,
            Some(_) => {
                self.child = None;
                false
            }
            None => false,
        }
    }
}

impl Drop for CommandBackend {
    fn drop(&mut self) {
        self.stop();
    }
}

pub fn emotion_rate(emotion: Emotion) -> f32 {
    match emotion {
        Emotion::Fear => 1.3,
        Emotion::Joy => 1.1,
        Emotion::Sadness => 0.8,
        Emotion::Wonder => 0.9,
        Emotion::Anxiety => 1.4,
        Emotion::Peace => 0.7,
    }
}

pub fn emotion_pitch(emotion: Emotion) -> f32 {
    match emotion {
        Emotion::Fear => 0.7,
        Emotion::Joy => 1.3,
        Emotion::Sadness => 0.8,
        Emotion::Wonder => 1.0,
        Emotion::Anxiety => 1.2,
        Emotion::Peace => 0.9,
    }
}

pub const WHISPERS: [&str; 10] = [
    "The dream remembers...",
    "Reality shifts at the edges...",
    "What is real?",
    "Time flows backwards here...",
    "The machine dreams too...",
    "Your thoughts become tangible...",
    "Nothing is permanent...",
    "Everything changes...",
    "The void listens...",
    "Dreams within dreams...",
];

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Action {
    DreamEntered,
    DreamVisualized,
    HistoryOpened,
    TimeShifted,
}

impl Action {
    pub fn reactions(self) -> &'static [&'static str; 4] {
        match self {
            Action::DreamEntered => &[
                "Processing your subconscious...",
                "Decoding dream patterns...",
                "Your dream takes form...",
                "Reality bends to your vision...",
            ],
            Action::DreamVisualized => &[
                "The dream manifests...",
                "Watch it come alive...",
                "Your imagination materializes...",
                "The space transforms...",
            ],
            Action::HistoryOpened => &[
                "Revisiting past dreams...",
                "Your emotional archive...",
                "Memories preserved in data...",
                "The trail of your subconscious...",
            ],
            Action::TimeShifted => &[
                "Time distorts...",
                "Reality becomes unstable...",
                "The temporal fabric tears...",
                "Nothing stays fixed...",
            ],
        }
    }
}

pub struct VoiceOfTheMachine {
    backend: Box<dyn SpeechBackend>,
    enabled: bool,
    base_rate: f32,
    base_pitch: f32,
    current_narration: Option<String>,
    soundscape: Option<Soundscape>,
}

impl VoiceOfTheMachine {
    pub fn new(backend: Box<dyn SpeechBackend>, config: &VoiceConfig) -> Self {
        Self {
            backend,
            enabled: config.enabled,
            base_rate: config.rate,
            base_pitch: config.pitch,
            current_narration: None,
            soundscape: None,
        }
    }

    /// Picks a command backend when one is available, otherwise logs only.
    pub fn from_config(config: &VoiceConfig) -> Self {
        let backend: Box<dyn SpeechBackend> = match CommandBackend::probe(config.command.as_deref()) {
            Some(cmd) => {
                log::info!("speech via {}", cmd.name());
                Box::new(cmd)
            }
            None => {
                log::info!("no speech command found; narration is text only");
                Box::new(NullBackend)
            }
        };
        Self::new(backend, config)
    }

    pub fn backend_name(&self) -> &str {
        self.backend.name()
    }

    fn utter(&mut self, text: &str, rate: f32, pitch: f32, volume: f32) {
        if !self.enabled || text.trim().is_empty() {
            return;
        }
        let utterance = Utterance { text: text.to_string(), rate, pitch, volume };
        match self.backend.speak(&utterance) {
            Ok(()) => {
                log::debug!("machine speaks: {text}");
                self.current_narration = Some(text.to_string());
            }
            Err(e) => log::warn!("{e}"),
        }
    }

    /// Narrate with the rate and pitch of `emotion`.
    pub fn speak(&mut self, text: &str, emotion: Emotion) {
        self.utter(text, emotion_rate(emotion), emotion_pitch(emotion), NARRATION_VOLUME);
    }

    /// Speak a chat reply in the companion's default voice.
    pub fn say(&mut self, text: &str) {
        let (rate, pitch) = (self.base_rate, self.base_pitch);
        self.utter(text, rate, pitch, super::ambient::SFX_VOLUME);
    }

    pub fn is_speaking(&mut self) -> bool {
        self.backend.is_speaking()
    }

    pub fn stop_speaking(&mut self) {
        self.backend.stop();
    }

    pub fn current_narration(&self) -> Option<&str> {
        self.current_narration.as_deref()
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    /// Returns whether the voice is now on.
    pub fn toggle_voice(&mut self) -> bool {
        self.enabled = !self.enabled;
        if !self.enabled {
            self.stop_speaking();
        }
        self.enabled
    }

    pub fn soundscape(&self) -> Option<Soundscape> {
        self.soundscape
    }

    /// Replace the running soundscape with the one for `emotion`.
    pub fn create_soundscape(&mut self, ctx: &mut AudioContext, emotion: Emotion, intensity: f32) {
        self.stop_soundscape(ctx);
        let kind = Soundscape::for_emotion(emotion);
        self.soundscape = Some(kind);
        let name = format!("soundscape/{}", kind.name());
        if !ctx.has_sound(&name) {
            // Rendered at full intensity; the loop volume carries the intensity.
            if let Err(e) = ctx.register(&name, &synth::soundscape(kind, 1.0, synth::SOUNDSCAPE_LOOP_SECS)) {
                log::warn!("could not prepare {name}: {e}");
                return;
            }
        }
        ctx.play_loop(SOUNDSCAPE, &name, intensity.clamp(0.0, 1.0), 1.0);
        log::info!("{} soundscape for {}", kind.name(), emotion.name());
    }

    /// Ramp the running soundscape toward `intensity`, switching beds when
    /// the emotion calls for a different one.
    pub fn update_soundscape(&mut self, ctx: &mut AudioContext, intensity: f32, emotion: Emotion) {
        let Some(current) = self.soundscape else { return; };
        if current != Soundscape::for_emotion(emotion) {
            self.create_soundscape(ctx, emotion, intensity);
        } else {
            ctx.set_loop_volume(SOUNDSCAPE, intensity.clamp(0.0, 1.0), 0.5);
        }
    }

    pub fn stop_soundscape(&mut self, ctx: &mut AudioContext) {
        if self.soundscape.take().is_some() {
            ctx.stop_loop(SOUNDSCAPE, 0.5);
        }
    }

    pub fn interaction(&self, ctx: &mut AudioContext, kind: Interaction) {
        let name = format!("fx/{kind:?}");
        if !ctx.has_sound(&name) {
            if let Err(e) = ctx.register(&name, &synth::interaction(kind)) {
                log::warn!("could not prepare {name}: {e}");
                return;
            }
        }
        ctx.play(&name, SoundConfig::default());
    }

    pub fn typing(&self, ctx: &mut AudioContext, rng: &mut Rng) {
        if !ctx.is_available() {
            return;
        }
        if let Err(e) = ctx.play_samples(&synth::voice_typing(rng), SoundConfig::default()) {
            log::debug!("typing sound: {e}");
        }
    }

    pub fn whisper(rng: &mut Rng) -> &'static str {
        WHISPERS[rng.index(WHISPERS.len())]
    }

    pub fn react(action: Action, rng: &mut Rng) -> &'static str {
        let lines = action.reactions();
        lines[rng.index(lines.len())]
    }
}

impl Drop for VoiceOfTheMachine {
    fn drop(&mut self) {
        self.stop_speaking();
    }
}
