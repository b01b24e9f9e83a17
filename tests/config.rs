use std::collections::HashMap;
use std::path::PathBuf;

use dreamroom::config::AppConfig;
use dreamroom::error::ConfigError;

fn env(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
    let map: HashMap<String, String> = pairs.iter().map(|(k, v)| (k.to_string(), v.to_string())).collect();
    move |key| map.get(key).cloned()
}

// ── Defaults and files ───────────────────────────────────────────────────────

#[test]
fn defaults() {
    let c = AppConfig::default();
    assert_eq!(c.chat.model, "llama-3.3-70b-versatile");
    assert_eq!(c.chat.api_key, None);
    assert_eq!(c.memory.max_dreams, 50);
    assert_eq!(c.memory.influence_window, 5);
    assert_eq!(c.memory.path, PathBuf::from("dreamroom_memory.json"));
    assert!(c.voice.enabled);
    assert!(c.audio.music_enabled);
    assert!(!c.debug);
}

#[test]
fn partial_json_fills_defaults() {
    let c = AppConfig::from_json(r#"{ "chat": { "model": "llama-3.1-8b-instant" }, "debug": true }"#).unwrap();
    assert_eq!(c.chat.model, "llama-3.1-8b-instant");
    assert_eq!(c.chat.max_tokens, 300);
    assert!(c.debug);
    assert_eq!(c.memory, AppConfig::default().memory);
}

#[test]
fn bad_json_is_an_error() {
    assert!(matches!(AppConfig::from_json("{ nope"), Err(ConfigError::Json(_))));
}

#[test]
fn api_key_is_never_written_out() {
    let mut c = AppConfig::default();
    c.chat.api_key = Some("secret".into());
    let json = serde_json::to_string(&c).unwrap();
    assert!(!json.contains("secret"));
    assert!(!json.contains("api_key"));
}

#[test]
fn missing_file_uses_defaults() {
    let path = std::env::temp_dir().join(format!("dreamroom-missing-{}.json", std::process::id()));
    let c = AppConfig::load(Some(&path)).unwrap();
    assert_eq!(c.window, AppConfig::default().window);
}

#[test]
fn file_is_read() {
    let path = std::env::temp_dir().join(format!("dreamroom-config-{}.json", std::process::id()));
    std::fs::write(&path, r#"{ "memory": { "max_dreams": 7 } }"#).unwrap();
    let c = AppConfig::load(Some(&path));
    let _ = std::fs::remove_file(&path);
    assert_eq!(c.unwrap().memory.max_dreams, 7);
}

// ── Environment ──────────────────────────────────────────────────────────────

#[test]
fn groq_key_from_env() {
    let mut c = AppConfig::default();
    c.apply_env(env(&[("GROQ_API_KEY", "  gsk_test  ")])).unwrap();
    assert_eq!(c.chat.api_key.as_deref(), Some("gsk_test"));
}

#[test]
fn dreamroom_key_wins() {
    let mut c = AppConfig::default();
    c.apply_env(env(&[("GROQ_API_KEY", "groq"), ("DREAMROOM_API_KEY", "own")])).unwrap();
    assert_eq!(c.chat.api_key.as_deref(), Some("own"));
}

#[test]
fn blank_key_is_ignored() {
    let mut c = AppConfig::default();
    c.chat.api_key = Some("from-file".into());
    c.apply_env(env(&[("GROQ_API_KEY", "   ")])).unwrap();
    assert_eq!(c.chat.api_key.as_deref(), Some("from-file"));
}

#[test]
fn overrides_apply() {
    let mut c = AppConfig::default();
    c.apply_env(env(&[
        ("DREAMROOM_MODEL", "m"),
        ("DREAMROOM_ENDPOINT", "http://localhost:9000/v1/chat/completions"),
        ("DREAMROOM_MEMORY_PATH", "/tmp/dreams.json"),
        ("DREAMROOM_VOICE", "off"),
        ("DREAMROOM_MUSIC", "YES"),
    ]))
    .unwrap();
    assert_eq!(c.chat.model, "m");
    assert_eq!(c.chat.endpoint, "http://localhost:9000/v1/chat/completions");
    assert_eq!(c.memory.path, PathBuf::from("/tmp/dreams.json"));
    assert!(!c.voice.enabled);
    assert!(c.audio.music_enabled);
}

#[test]
fn invalid_flag_names_the_variable() {
    let mut c = AppConfig::default();
    let err = c.apply_env(env(&[("DREAMROOM_VOICE", "maybe")])).unwrap_err();
    match err {
        ConfigError::Invalid { key, value } => {
            assert_eq!(key, "DREAMROOM_VOICE");
            assert_eq!(value, "maybe");
        }
        other => panic!("unexpected error {other:?}"),
    }
}
