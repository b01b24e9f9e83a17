use std::cell::RefCell;
use std::rc::Rc;

use dreamroom::audio::synth::{
    self, ambient_loop, exp_ramp, interaction, soundscape, Biquad, FilterKind, Oscillator, Waveform, SAMPLE_RATE,
};
use dreamroom::audio::voice::{Action, Utterance, NARRATION_VOLUME, WHISPERS};
use dreamroom::audio::wav::{encode_mono, HEADER_LEN};
use dreamroom::audio::{
    sound_from_samples, AmbientMusic, AudioContext, CommandBackend, Interaction, Mood, Soundscape, SpeechBackend,
    VoiceOfTheMachine,
};
use dreamroom::config::{AudioConfig, VoiceConfig};
use dreamroom::dream::parser::Emotion;
use dreamroom::error::VoiceError;
use dreamroom::rng::Rng;

fn approx(a: f32, b: f32) -> bool {
    (a - b).abs() < 1e-4
}

fn peak(samples: &[f32]) -> f32 {
    samples.iter().fold(0.0f32, |m, s| m.max(s.abs()))
}

// ── Oscillators ──────────────────────────────────────────────────────────────

#[test]
fn waveform_shapes() {
    assert!(approx(Waveform::Sine.sample(0.25), 1.0));
    assert!(approx(Waveform::Sine.sample(0.0), 0.0));
    assert_eq!(Waveform::Square.sample(0.25), 1.0);
    assert_eq!(Waveform::Square.sample(0.75), -1.0);
    assert!(approx(Waveform::Sawtooth.sample(0.0), -1.0));
    assert!(approx(Waveform::Sawtooth.sample(0.5), 0.0));
    assert!(approx(Waveform::Triangle.sample(0.0), -1.0));
    assert!(approx(Waveform::Triangle.sample(0.5), 1.0));
}

#[test]
fn waveforms_wrap_phase() {
    for w in [Waveform::Sine, Waveform::Square, Waveform::Sawtooth, Waveform::Triangle] {
        assert!(approx(w.sample(1.25), w.sample(0.25)), "{w:?}");
        assert!(approx(w.sample(-0.75), w.sample(0.25)), "{w:?}");
    }
}

#[test]
fn oscillator_advances_by_frequency() {
    let mut osc = Oscillator::new(Waveform::Sawtooth);
    let quarter = SAMPLE_RATE as f32 / 4.0;
    assert!(approx(osc.next(quarter), -1.0));
    assert!(approx(osc.next(quarter), -0.5));
    assert!(approx(osc.next(quarter), 0.0));
}

#[test]
fn exponential_ramp() {
    assert!(approx(exp_ramp(800.0, 1200.0, 0.0, 0.1), 800.0));
    assert!((exp_ramp(800.0, 1200.0, 0.05, 0.1) - (800.0f32 * 1200.0).sqrt()).abs() < 0.1);
    assert_eq!(exp_ramp(800.0, 1200.0, 0.5, 0.1), 1200.0);
}

// ── Ambient music ────────────────────────────────────────────────────────────

#[test]
fn mood_names_round_trip() {
    for mood in Mood::ALL {
        assert_eq!(Mood::from_name(mood.name()), mood);
    }
    assert_eq!(Mood::from_name("polka"), Mood::Calm);
}

#[test]
fn moods_for_emotions() {
    assert_eq!(Mood::for_emotion(Emotion::Fear), Mood::Mysterious);
    assert_eq!(Mood::for_emotion(Emotion::Joy), Mood::Ethereal);
    assert_eq!(Mood::for_emotion(Emotion::Sadness), Mood::Calm);
    assert_eq!(Mood::for_emotion(Emotion::Wonder), Mood::Dreamy);
    assert_eq!(Mood::for_emotion(Emotion::Anxiety), Mood::Intense);
    assert_eq!(Mood::for_emotion(Emotion::Peace), Mood::Calm);
}

#[test]
fn mood_voices() {
    let calm = Mood::Calm.config();
    assert_eq!((calm.bass, calm.pad, calm.shimmer), (55.0, 220.0, 880.0));
    let intense = Mood::Intense.config();
    assert_eq!((intense.lfo_speed, intense.lfo_depth), (0.5, 20.0));
}

#[test]
fn ambient_loop_length_and_level() {
    let samples = ambient_loop(Mood::Dreamy, 1.0, 2.0);
    assert_eq!(samples.len(), 2 * SAMPLE_RATE as usize);
    assert!(peak(&samples) <= 0.6 + 1e-3);
    assert!(peak(&ambient_loop(Mood::Dreamy, 0.5, 2.0)) <= 0.3 + 1e-3);
}

#[test]
fn ambient_loop_is_seamless() {
    for mood in Mood::ALL {
        let samples = ambient_loop(mood, 1.0, 2.0);
        let (first, last) = (samples[0], samples[samples.len() - 1]);
        assert!((first - last).abs() < 0.05, "{}: {first} vs {last}", mood.name());
    }
}

// ── UI blips ─────────────────────────────────────────────────────────────────

#[test]
fn blip_lengths() {
    assert_eq!(synth::notification(0.4).len(), 8820);
    assert_eq!(synth::message(0.4).len(), 6615);
    assert_eq!(synth::typing(0.4, &mut Rng::new(1)).len(), 2205);
    assert_eq!(synth::voice_typing(&mut Rng::new(1)).len(), 882);
}

#[test]
fn blips_stay_under_their_gain() {
    assert!(peak(&synth::notification(0.4)) <= 0.4 * 0.3 + 1e-4);
    assert!(peak(&synth::message(0.4)) <= 0.4 * 0.2 + 1e-4);
    assert!(peak(&synth::typing(0.4, &mut Rng::new(3))) <= 0.4 * 0.05 + 1e-4);
}

#[test]
fn typing_tick_is_seeded() {
    assert_eq!(synth::typing(0.4, &mut Rng::new(9)), synth::typing(0.4, &mut Rng::new(9)));
}

#[test]
fn interaction_sounds() {
    assert_eq!(Interaction::Chime.params(), (1000.0, 0.3));
    assert_eq!(interaction(Interaction::Click).len(), 2205);
    assert_eq!(interaction(Interaction::Chime).len(), 13230);
    let whoosh = interaction(Interaction::Whoosh);
    assert!(peak(&whoosh) <= 0.2 + 1e-4);
    // Decays toward the tail.
    let head = peak(&whoosh[..whoosh.len() / 4]);
    let tail = peak(&whoosh[whoosh.len() * 3 / 4..]);
    assert!(tail < head);
}

// ── Filters and soundscapes ──────────────────────────────────────────────────

#[test]
fn biquad_dc_response() {
    let mut low = Biquad::new(FilterKind::Lowpass, 500.0, 1.0);
    let mut high = Biquad::new(FilterKind::Highpass, 500.0, 1.0);
    let (mut l, mut h) = (0.0, 0.0);
    for _ in 0..10_000 {
        l = low.process(1.0);
        h = high.process(1.0);
    }
    assert!((l - 1.0).abs() < 1e-3);
    assert!(h.abs() < 1e-3);
}

#[test]
fn soundscapes_for_emotions() {
    let expected = [
        (Emotion::Fear, Soundscape::Dark),
        (Emotion::Joy, Soundscape::Bright),
        (Emotion::Sadness, Soundscape::Melancholic),
        (Emotion::Wonder, Soundscape::Ethereal),
        (Emotion::Anxiety, Soundscape::Tense),
        (Emotion::Peace, Soundscape::Ambient),
    ];
    for (emotion, kind) in expected {
        assert_eq!(Soundscape::for_emotion(emotion), kind);
    }
    let dark = Soundscape::Dark.config();
    assert_eq!((dark.waveform, dark.frequency, dark.filter, dark.cutoff), (Waveform::Sawtooth, 55.0, FilterKind::Lowpass, 200.0));
}

#[test]
fn soundscape_gain_follows_intensity() {
    let silent = soundscape(Soundscape::Ambient, 0.0, 0.5);
    assert_eq!(silent.len(), SAMPLE_RATE as usize / 2);
    assert!(silent.iter().all(|s| *s == 0.0));

    let full = soundscape(Soundscape::Ambient, 1.0, 0.5);
    let clamped = soundscape(Soundscape::Ambient, 3.0, 0.5);
    assert_eq!(full, clamped);
    assert!(peak(&full) > 0.0 && peak(&full) <= 0.12);
}

// ── WAV encoding ─────────────────────────────────────────────────────────────

#[test]
fn wav_header_and_samples() {
    let bytes = encode_mono(&[0.0, 1.0, -1.0, 2.0], 44_100).unwrap();
    assert_eq!(bytes.len(), HEADER_LEN + 8);
    assert_eq!(&bytes[0..4], b"RIFF");
    assert_eq!(u32::from_le_bytes(bytes[4..8].try_into().unwrap()), 44);
    assert_eq!(&bytes[8..16], b"WAVEfmt ");
    assert_eq!(u16::from_le_bytes([bytes[22], bytes[23]]), 1);
    assert_eq!(u32::from_le_bytes(bytes[24..28].try_into().unwrap()), 44_100);
    assert_eq!(u32::from_le_bytes(bytes[28..32].try_into().unwrap()), 88_200);
    assert_eq!(&bytes[36..40], b"data");
    assert_eq!(u32::from_le_bytes(bytes[40..44].try_into().unwrap()), 8);

    let pcm: Vec<i16> = bytes[44..].chunks(2).map(|c| i16::from_le_bytes([c[0], c[1]])).collect();
    assert_eq!(pcm, vec![0, i16::MAX, -i16::MAX, i16::MAX]);
}

#[test]
fn synthesized_pcm_decodes() {
    let data = sound_from_samples(&synth::notification(0.4)).unwrap();
    assert_eq!(data.sample_rate, SAMPLE_RATE);
    assert_eq!(data.frames.len(), 8820);
}

// ── Audio context without a device ───────────────────────────────────────────

#[test]
fn disabled_context_caches_but_stays_silent() {
    let mut ctx = AudioContext::disabled();
    assert!(!ctx.is_available());
    ctx.register("blip", &synth::message(0.4)).unwrap();
    assert!(ctx.has_sound("blip"));

    ctx.play("blip", Default::default());
    ctx.play_music("blip", 1.0);
    assert!(!ctx.is_music_playing());
    assert!(!ctx.toggle_music());
    assert_eq!(ctx.looping_sound(dreamroom::audio::MUSIC), None);
}

#[test]
fn context_volumes_clamp() {
    let mut ctx = AudioContext::disabled();
    ctx.set_music_volume(1.5);
    assert_eq!(ctx.music_volume(), 1.0);
    ctx.set_master_volume(-0.2);
    assert_eq!(ctx.master_volume(), 0.0);
}

#[test]
fn ambient_music_remembers_mood_while_silent() {
    let mut ctx = AudioContext::disabled();
    let mut music = AmbientMusic::new(&AudioConfig::default());
    assert!(music.is_enabled());
    music.play_for_emotion(&mut ctx, Emotion::Anxiety);
    assert_eq!(music.mood(), Mood::Intense);
    assert!(!music.toggle(&mut ctx));
    assert!(music.toggle(&mut ctx));
    assert_eq!(music.mood(), Mood::Intense);
}

// ── Voice ────────────────────────────────────────────────────────────────────

#[derive(Clone, Default)]
struct Recorder {
    spoken: Rc<RefCell<Vec<Utterance>>>,
    stops: Rc<RefCell<usize>>,
}

impl SpeechBackend for Recorder {
    fn name(&self) -> &str {
        "recorder"
    }

    fn speak(&mut self, utterance: &Utterance) -> Result<(), VoiceError> {
        self.spoken.borrow_mut().push(utterance.clone());
        Ok(())
    }

    fn stop(&mut self) {
        *self.stops.borrow_mut() += 1;
    }

    fn is_speaking(&mut self) -> bool {
        !self.spoken.borrow().is_empty()
    }
}

fn voice() -> (VoiceOfTheMachine, Recorder) {
    let recorder = Recorder::default();
    (VoiceOfTheMachine::new(Box::new(recorder.clone()), &VoiceConfig::default()), recorder)
}

#[test]
fn narration_uses_emotion_prosody() {
    let (mut v, rec) = voice();
    v.speak("The dream manifests...", Emotion::Fear);
    let spoken = rec.spoken.borrow();
    assert_eq!(spoken[0].text, "The dream manifests...");
    assert_eq!((spoken[0].rate, spoken[0].pitch, spoken[0].volume), (1.3, 0.7, NARRATION_VOLUME));
    assert_eq!(v.current_narration(), Some("The dream manifests..."));
}

#[test]
fn replies_use_the_configured_voice() {
    let (mut v, rec) = voice();
    v.say("Tell me more.");
    let spoken = rec.spoken.borrow();
    assert_eq!((spoken[0].rate, spoken[0].pitch), (0.9, 1.1));
}

#[test]
fn blank_and_disabled_speech_is_skipped() {
    let (mut v, rec) = voice();
    v.say("   ");
    assert!(!v.toggle_voice());
    v.say("hello");
    assert!(rec.spoken.borrow().is_empty());
    assert!(*rec.stops.borrow() >= 1);
    assert!(v.toggle_voice());
    v.say("hello");
    assert_eq!(rec.spoken.borrow().len(), 1);
}

#[test]
fn soundscape_follows_emotion() {
    let (mut v, _) = voice();
    let mut ctx = AudioContext::disabled();
    v.create_soundscape(&mut ctx, Emotion::Joy, 0.5);
    assert_eq!(v.soundscape(), Some(Soundscape::Bright));
    v.update_soundscape(&mut ctx, 0.9, Emotion::Joy);
    assert_eq!(v.soundscape(), Some(Soundscape::Bright));
    v.update_soundscape(&mut ctx, 0.9, Emotion::Fear);
    assert_eq!(v.soundscape(), Some(Soundscape::Dark));
    v.stop_soundscape(&mut ctx);
    assert_eq!(v.soundscape(), None);
    // Without a running bed there is nothing to update.
    v.update_soundscape(&mut ctx, 0.9, Emotion::Peace);
    assert_eq!(v.soundscape(), None);
}

#[test]
fn reactions_and_whispers() {
    let mut rng = Rng::new(42);
    for action in [Action::DreamEntered, Action::DreamVisualized, Action::HistoryOpened, Action::TimeShifted] {
        let line = VoiceOfTheMachine::react(action, &mut rng);
        assert!(action.reactions().contains(&line));
    }
    assert!(WHISPERS.contains(&VoiceOfTheMachine::whisper(&mut rng)));
}

#[test]
fn espeak_command_line() {
    let backend = CommandBackend::new("espeak-ng");
    let utterance = Utterance { text: "hello".into(), rate: 1.0, pitch: 1.0, volume: 0.7 };
    assert_eq!(backend.args(&utterance), vec!["-s", "175", "-p", "50", "-a", "70", "--", "hello"]);

    let extreme = Utterance { text: "x".into(), rate: 0.1, pitch: 3.0, volume: 5.0 };
    assert_eq!(backend.args(&extreme), vec!["-s", "80", "-p", "99", "-a", "200", "--", "x"]);
}

#[test]
fn say_command_line() {
    let backend = CommandBackend::new("/usr/bin/say");
    let utterance = Utterance { text: "hi".into(), rate: 2.0, pitch: 1.0, volume: 1.0 };
    assert_eq!(backend.args(&utterance), vec!["-r", "350", "--", "hi"]);
}

#[test]
fn preferred_command_skips_probing() {
    let backend = CommandBackend::probe(Some("my-tts")).unwrap();
    assert_eq!(backend.name(), "my-tts");
}

#[test]
fn missing_command_reports_spawn_error() {
    let mut backend = CommandBackend::new("dreamroom-no-such-tts-binary");
    let utterance = Utterance { text: "hi".into(), rate: 1.0, pitch: 1.0, volume: 1.0 };
    assert!(matches!(backend.speak(&utterance), Err(VoiceError::Spawn { .. })));
    assert!(!backend.is_speaking());
}
