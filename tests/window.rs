use dreamroom::window::*;
use winit::window::Fullscreen;

// ── Config ───────────────────────────────────────────────────────────────────

#[test]
fn default_is_1280x720_windowed() {
    let cfg = WindowConfig::default();
    assert_eq!((cfg.width, cfg.height), (1280, 720));
    assert_eq!(cfg.mode, WindowMode::Windowed);
    assert_eq!(cfg.title, "Dreamroom");
    assert_eq!(cfg.ups, 60);
    assert!(cfg.resizable);
}

#[test]
fn mode_deserializes_lowercase() {
    let cfg: WindowConfig = serde_json::from_str(r#"{"mode": "borderless", "width": 640}"#).unwrap();
    assert_eq!(cfg.mode, WindowMode::Borderless);
    assert_eq!(cfg.width, 640);
    assert_eq!(cfg.height, 720);
    assert!(serde_json::from_str::<WindowConfig>(r#"{"mode": "Borderless"}"#).is_err());
}

// ── Attributes ───────────────────────────────────────────────────────────────

#[test]
fn attributes_follow_config() {
    let cfg = WindowConfig { title: "dreams".into(), resizable: false, ..WindowConfig::default() };
    let attrs = window_attributes(&cfg);
    assert_eq!(attrs.title, "dreams");
    assert!(!attrs.resizable);
    assert!(attrs.fullscreen.is_none());
}

#[test]
fn borderless_starts_fullscreen() {
    let cfg = WindowConfig { mode: WindowMode::Borderless, ..WindowConfig::default() };
    assert!(matches!(window_attributes(&cfg).fullscreen, Some(Fullscreen::Borderless(None))));
    // Exclusive fullscreen is applied once a monitor is known.
    let cfg = WindowConfig { mode: WindowMode::Fullscreen, ..WindowConfig::default() };
    assert!(window_attributes(&cfg).fullscreen.is_none());
}

// ── Video mode choice ────────────────────────────────────────────────────────

#[test]
fn closest_mode_by_area() {
    let modes = [(640, 480), (1280, 720), (1920, 1080), (2560, 1440)];
    assert_eq!(closest_by_area(&modes, (1280, 720)), Some(1));
    assert_eq!(closest_by_area(&modes, (1600, 900)), Some(1));
    assert_eq!(closest_by_area(&modes, (1800, 1000)), Some(2));
    assert_eq!(closest_by_area(&modes, (8000, 8000)), Some(3));
}

#[test]
fn no_modes_no_choice() {
    assert_eq!(closest_by_area(&[], (1280, 720)), None);
}
