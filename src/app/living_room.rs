use glam::Vec3;

use crate::audio::voice::Action;
use crate::audio::{AmbientMusic, Interaction, Mood, VoiceOfTheMachine};
use crate::cartoon::CartoonEpisode;
use crate::chat::conversation::RESET_GREETING;
use crate::chat::worker::RequestId;
use crate::chat::{ChatEvent, ChatWorker, DreamConversation, GroqBackend};
use crate::config::AppConfig;
use crate::dream::parser::{self, ParsedDream};
use crate::dream::{DreamMemory, DreamVisualizer, FileStore, TemporalEffects};
use crate::engine::{Color, Engine, Fog};
use crate::error::ChatError;
use crate::input::{Hotkeys, KeyCode, LineEdit};
use crate::renderer::TextureId;
use crate::rng::Rng;
use crate::scene::{Scene, SceneAction};
use crate::ui::{Hud, Speaker};
use crate::world::furniture::rug_texture;
use crate::world::lighting::{BACKGROUND, room_fog, room_lighting};
use crate::world::LivingRoom;

use super::{CONNECTION_LOST, MUSIC_DELAY_MS, OFFLINE_LINE, SVG_DUMP_FILE, TYPING_SOUND_CHANCE, WELCOME_LINE};

/// Text objects start fading once reality is this unstable.
const DECAY_BELOW_STABILITY: f32 = 0.5;
const TEXT_DECAY_RATE: f32 = 0.0001;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Command {
    Send,
    ToggleMusic,
    ToggleVoice,
    History,
    NewDream,
    Freeze,
    Accelerate,
    Reverse,
    DumpSvg,
    Quit,
}

fn hotkeys() -> Hotkeys<Command> {
    Hotkeys::new()
        .bind(KeyCode::Enter, Command::Send)
        .bind(KeyCode::NumpadEnter, Command::Send)
        .bind(KeyCode::F2, Command::ToggleMusic)
        .bind(KeyCode::F3, Command::ToggleVoice)
        .bind(KeyCode::F4, Command::History)
        .bind(KeyCode::F5, Command::NewDream)
        .bind(KeyCode::F6, Command::Freeze)
        .bind(KeyCode::F7, Command::Accelerate)
        .bind(KeyCode::F8, Command::Reverse)
        .bind(KeyCode::F9, Command::DumpSvg)
        .bind(KeyCode::Escape, Command::Quit)
}

/// The room, the TV cartoon, the dream visuals and the companion chat.
pub struct LivingRoomScene {
    config: AppConfig,
    hotkeys: Hotkeys<Command>,
    rng: Rng,

    room: LivingRoom,
    episode: CartoonEpisode,
    screen: Option<TextureId>,
    rug: Option<TextureId>,

    visualizer: DreamVisualizer,
    temporal: TemporalEffects,
    memory: DreamMemory,
    fog: Fog,

    conversation: DreamConversation,
    worker: Option<ChatWorker>,
    pending: Vec<RequestId>,

    music: AmbientMusic,
    voice: VoiceOfTheMachine,
    music_delay_ms: Option<f32>,

    hud: Hud,
}

impl LivingRoomScene {
    pub fn new(config: AppConfig) -> Self {
        let memory = DreamMemory::new(Box::new(FileStore::new(config.memory.path.clone())), &config.memory);
        let music = AmbientMusic::new(&config.audio);
        let voice = VoiceOfTheMachine::from_config(&config.voice);
        Self {
            hotkeys: hotkeys(),
            rng: Rng::from_time(),
            room: LivingRoom::new(),
            episode: CartoonEpisode::new(),
            screen: None,
            rug: None,
            visualizer: DreamVisualizer::new(),
            temporal: TemporalEffects::new(),
            memory,
            fog: room_fog(),
            conversation: DreamConversation::new(),
            worker: None,
            pending: Vec::new(),
            music,
            voice,
            music_delay_ms: Some(MUSIC_DELAY_MS),
            hud: Hud::new(config.window.width, config.window.height),
            config,
        }
    }

    fn connect(&mut self) {
        match GroqBackend::new(&self.config.chat) {
            Ok(backend) => {
                self.conversation.initialize();
                self.worker = Some(ChatWorker::spawn(Box::new(backend)));
                if let Some(greeting) = self.conversation.history().first() {
                    self.hud.push(Speaker::Companion, greeting.content.clone());
                }
            }
            Err(e) => {
                log::warn!("chat disabled: {e}");
                self.hud.push(Speaker::System, OFFLINE_LINE);
            }
        }
    }

    // ── Dreams ──────────────────────────────────────────────────────────────

    fn submit(&mut self, engine: &mut Engine, text: String) {
        self.music.notification(&mut engine.audio);
        self.hud.push(Speaker::User, text.clone());

        let dream = parser::parse(&text, &mut self.rng);
        if dream.is_dream_description() {
            self.show_dream(engine, &dream);
        }

        let sent = self.conversation.begin(&text).and_then(|messages| {
            let submitted = match self.worker.as_mut() {
                Some(worker) => worker.submit(messages),
                None => Err(ChatError::NotInitialized),
            };
            if submitted.is_err() {
                self.conversation.abandon();
            }
            submitted
        });
        match sent {
            Ok(id) => {
                self.pending.push(id);
                self.hud.set_thinking(true);
            }
            Err(e) => {
                log::debug!("no chat turn: {e}");
                if self.conversation.is_initialized() {
                    self.hud.push(Speaker::System, format!("{CONNECTION_LOST}{}", e.user_message()));
                }
            }
        }
    }

    fn show_dream(&mut self, engine: &mut Engine, dream: &ParsedDream) {
        for obj in self.visualizer.objects() {
            self.temporal.release(obj.id);
        }
        let summary = self.visualizer.visualize(dream, &mut self.rng);
        log::info!(
            "dream visualized: {} objects, {} particle systems, {:?}",
            summary.object_count,
            summary.particle_count,
            dream.dominant_emotion
        );
        self.memory.store_dream(dream);

        self.music.play_for_emotion(&mut engine.audio, dream.dominant_emotion);
        if self.voice.soundscape().is_some() {
            self.voice.update_soundscape(&mut engine.audio, dream.intensity, dream.dominant_emotion);
        } else {
            self.voice.create_soundscape(&mut engine.audio, dream.dominant_emotion, dream.intensity);
        }
        self.voice.interaction(&mut engine.audio, Interaction::Whoosh);
        self.voice.speak(&dream.ai_narration, dream.dominant_emotion);
        self.hud.push(Speaker::System, dream.ai_narration.clone());

        if let Some(fog) = self.visualizer.fog() {
            self.fog = fog;
        }
        self.temporal.apply_influence(&self.memory.emotional_influence());
        self.bind_temporal(dream.intensity);
    }

    fn bind_temporal(&mut self, intensity: f32) {
        self.temporal.create_ripple(Vec3::ZERO, intensity);
        if let Some(position) = self.visualizer.light().map(|l| l.position) {
            self.temporal.create_anchor(position);
        }
        for id in self.visualizer.ids_of("abstract") {
            let speed = 0.001 + self.rng.range(0.0, 0.002);
            self.temporal.add_shifting(id, speed);
        }
        if self.temporal.reality_stability() < DECAY_BELOW_STABILITY {
            for id in self.visualizer.ids_of("text") {
                self.temporal.add_decaying(id, TEXT_DECAY_RATE, 1.0);
            }
        }
    }

    fn new_dream(&mut self, engine: &mut Engine) {
        self.visualizer.clear();
        self.temporal.reset();
        self.temporal.apply_influence(&self.memory.emotional_influence());
        self.fog = room_fog();
        engine.camera.jitter = Vec3::ZERO;
        self.voice.stop_soundscape(&mut engine.audio);
        self.music.play(&mut engine.audio, Mood::Dreamy);

        if self.conversation.is_initialized() {
            self.conversation.reset();
        }
        self.pending.clear();
        self.hud.set_thinking(false);
        self.hud.chat.clear();
        self.hud.push(Speaker::Companion, RESET_GREETING);
    }

    // ── Chat ────────────────────────────────────────────────────────────────

    fn poll_chat(&mut self, engine: &mut Engine) {
        let Some(worker) = self.worker.as_mut() else { return };
        for event in worker.poll() {
            match event {
                ChatEvent::Reply { id, content } => {
                    if !self.forget(id) {
                        continue;
                    }
                    let reply = self.conversation.finish(content);
                    self.hud.push(Speaker::Companion, reply.response.clone());
                    self.music.message(&mut engine.audio);
                    self.voice.say(&reply.response);
                }
                ChatEvent::Failed { id, error } => {
                    if !self.forget(id) {
                        continue;
                    }
                    self.conversation.abandon();
                    log::error!("chat request {id} failed: {error}");
                    self.hud.push(Speaker::System, format!("{CONNECTION_LOST}{}", error.user_message()));
                }
            }
        }
        self.hud.set_thinking(!self.pending.is_empty());
    }

    /// Drop `id` from the pending list. False for replies to a reset chat.
    fn forget(&mut self, id: RequestId) -> bool {
        let before = self.pending.len();
        self.pending.retain(|p| *p != id);
        self.pending.len() != before
    }

    // ── Input ───────────────────────────────────────────────────────────────

    fn handle_typing(&mut self, engine: &mut Engine) {
        for edit in engine.input.line_edits() {
            match edit {
                LineEdit::Insert(ch) => {
                    if self.hud.type_char(ch) && self.rng.chance(TYPING_SOUND_CHANCE) {
                        self.music.typing(&mut engine.audio, &mut self.rng);
                    }
                }
                LineEdit::Erase => self.hud.backspace(),
            }
        }
    }

    fn time_shift(&mut self, command: Command) {
        match command {
            Command::Freeze => self.temporal.freeze_time(2000.0),
            Command::Accelerate => self.temporal.accelerate_time(3.0, 3000.0),
            Command::Reverse => self.temporal.reverse_time(2000.0),
            _ => return,
        }
        let line = VoiceOfTheMachine::react(Action::TimeShifted, &mut self.rng);
        self.hud.push(Speaker::System, line);
        self.voice.say(line);
    }

    fn toggle_history(&mut self, engine: &mut Engine) {
        if self.hud.is_history_open() {
            self.hud.close_history();
            return;
        }
        self.hud.open_history(&self.memory.formatted_dreams());
        self.voice.interaction(&mut engine.audio, Interaction::Chime);
        let line = VoiceOfTheMachine::react(Action::HistoryOpened, &mut self.rng);
        self.hud.push(Speaker::System, line);
    }

    fn dump_svg(&mut self) {
        match std::fs::write(SVG_DUMP_FILE, self.episode.to_svg()) {
            Ok(()) => {
                log::info!("cartoon frame written to {SVG_DUMP_FILE}");
                self.hud.push(Speaker::System, format!("Cartoon frame saved to {SVG_DUMP_FILE}"));
            }
            Err(e) => log::error!("could not write {SVG_DUMP_FILE}: {e}"),
        }
    }

    // ── Per-frame effects ───────────────────────────────────────────────────

    fn tick_effects(&mut self, engine: &mut Engine) {
        let dt_ms = engine.dt_ms();

        self.episode.update(dt_ms);
        if let (Some(id), Some(frame)) = (self.screen, self.episode.frame_bytes()) {
            engine.upload_texture(id, frame);
        }

        self.visualizer.update(dt_ms);
        let frame = self.temporal.update(dt_ms, &mut self.rng);
        for id in &frame.expired {
            self.visualizer.remove(*id);
        }
        engine.camera.jitter = frame.camera_shake;
        if let Some((color, t)) = frame.fog_aberration {
            let base = self.fog.color().unwrap_or(Color::from_hex(BACKGROUND));
            self.fog = self.fog.with_color(base.lerp(color, t));
        }
        engine.set_fog(self.fog);

        let mut lighting = room_lighting();
        if let Some(light) = self.visualizer.light() {
            let mut light = *light;
            if !self.temporal.state().is_stable {
                let (scale, color) = self.temporal.distorted_light();
                light.intensity *= scale;
                light.color = color;
            }
            lighting.points.push(light);
        }
        engine.set_lighting(lighting);

        if let Some(delay) = self.music_delay_ms.as_mut() {
            *delay -= dt_ms;
            if *delay <= 0.0 {
                self.music_delay_ms = None;
                self.music.play(&mut engine.audio, Mood::Dreamy);
            }
        }
    }

    fn refresh_status(&mut self) {
        let state = self.temporal.state();
        let mut status = format!(
            "TV: {} | stability {:.0}% | time x{:.1} | dreams {}",
            self.episode.scene_name(),
            state.reality_stability * 100.0,
            state.time_scale,
            self.memory.all_dreams().len()
        );
        if !self.music.is_enabled() {
            status.push_str(" | music off");
        }
        if !self.voice.is_enabled() {
            status.push_str(" | voice off");
        }
        if self.hud.status() != status {
            self.hud.set_status(status);
        }
    }
}

impl Scene for LivingRoomScene {
    fn name(&self) -> &'static str {
        "living room"
    }

    fn on_enter(&mut self, engine: &mut Engine) {
        engine.set_background(Color::from_hex(BACKGROUND));
        engine.set_lighting(room_lighting());
        engine.set_fog(self.fog);
        engine.camera_controls = true;
        engine.set_window_title(&self.config.window.title);
        engine.audio.set_music_volume(self.config.audio.music_volume);

        let screen = engine.create_texture(self.episode.size().0, self.episode.size().1);
        if let Some(frame) = self.episode.frame_bytes() {
            engine.upload_texture(screen, frame);
        }
        self.screen = Some(screen);
        if let Some(pixmap) = rug_texture() {
            let id = engine.create_texture(pixmap.width(), pixmap.height());
            engine.upload_texture(id, pixmap.data());
            self.rug = Some(id);
        }

        let influence = self.memory.emotional_influence();
        self.temporal.apply_influence(&influence);
        if influence.dream_count > 0 {
            log::info!(
                "{} remembered dreams, mostly {}",
                influence.dream_count,
                influence.dominant_emotion.name()
            );
        }

        self.connect();
        self.voice.say(WELCOME_LINE);
        log::info!("living room ready, {} voxels", self.room.voxel_count());
    }

    fn on_exit(&mut self, engine: &mut Engine) {
        self.voice.stop_speaking();
        self.voice.stop_soundscape(&mut engine.audio);
        self.music.stop(&mut engine.audio);
        for id in [self.screen.take(), self.rug.take()].into_iter().flatten() {
            engine.destroy_texture(id);
        }
        engine.set_overlay(None);
    }

    fn update(&mut self, engine: &mut Engine) -> SceneAction {
        let (mx, my) = (engine.mouse_pos()[0], engine.mouse_pos()[1]);
        let over_hud = self.hud.hit(mx, my);
        engine.camera_controls = !over_hud;
        engine.input.mouse_consumed = over_hud;

        self.handle_typing(engine);
        let pressed = self.hotkeys.triggered(&engine.input);
        for command in pressed {
            match command {
                // The typed line stays in the input box until the reply lands.
                Command::Send if self.conversation.is_awaiting_reply() => {}
                Command::Send => {
                    if let Some(text) = self.hud.take_input() {
                        self.submit(engine, text);
                    }
                }
                Command::ToggleMusic => {
                    let on = self.music.toggle(&mut engine.audio);
                    self.hud.push(Speaker::System, if on { "Music on." } else { "Music off." });
                }
                Command::ToggleVoice => {
                    let on = self.voice.toggle_voice();
                    self.hud.push(Speaker::System, if on { "Voice on." } else { "Voice off." });
                }
                Command::History => self.toggle_history(engine),
                Command::NewDream => self.new_dream(engine),
                Command::Freeze | Command::Accelerate | Command::Reverse => self.time_shift(command),
                Command::DumpSvg => self.dump_svg(),
                Command::Quit => return SceneAction::Quit,
            }
        }

        self.poll_chat(engine);
        self.tick_effects(engine);
        self.hud.tick(engine.dt_ms());
        self.refresh_status();
        SceneAction::None
    }

    fn draw(&mut self, engine: &mut Engine) {
        self.room.draw(engine, self.screen, self.rug);
        self.visualizer.draw(engine, &self.temporal);
        self.hud.draw(engine);
    }
}
