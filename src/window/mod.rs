pub mod config;

pub use config::{WindowConfig, WindowMode};

use winit::dpi::PhysicalSize;
use winit::window::{Fullscreen, Window, WindowAttributes};

/// Smallest inner size the chat panel and history list still fit in.
pub const MIN_SIZE: (u32, u32) = (640, 360);

/// Attributes for creating the room's window from `config`.
pub fn window_attributes(config: &WindowConfig) -> WindowAttributes {
    let (min_w, min_h) = MIN_SIZE;
    let attributes = Window::default_attributes()
        .with_title(&config.title)
        .with_inner_size(PhysicalSize::new(config.width.max(min_w), config.height.max(min_h)))
        .with_min_inner_size(PhysicalSize::new(min_w, min_h))
        .with_resizable(config.resizable);
    match config.mode {
        WindowMode::Borderless => attributes.with_fullscreen(Some(Fullscreen::Borderless(None))),
        // Exclusive mode needs a monitor handle, see `enter_fullscreen`.
        WindowMode::Windowed | WindowMode::Fullscreen => attributes,
    }
}

/// Index of the size closest in pixel area to `target`.
pub fn closest_by_area(sizes: &[(u32, u32)], target: (u32, u32)) -> Option<usize> {
    let area = |(w, h): (u32, u32)| w as u64 * h as u64;
    let target = area(target);
    sizes
        .iter()
        .enumerate()
        .min_by_key(|(_, s)| area(**s).abs_diff(target))
        .map(|(i, _)| i)
}

/// Switch a freshly created window to exclusive fullscreen when asked for,
/// using the current monitor's video mode nearest the configured size.
/// Falls back to borderless without a monitor or video modes.
pub fn enter_fullscreen(window: &Window, config: &WindowConfig) {
    if config.mode != WindowMode::Fullscreen {
        return;
    }
    let fullscreen = match window.current_monitor() {
        Some(monitor) => {
            let modes: Vec<_> = monitor.video_modes().collect();
            let sizes: Vec<(u32, u32)> = modes.iter().map(|m| (m.size().width, m.size().height)).collect();
            match closest_by_area(&sizes, (config.width, config.height)) {
                Some(i) => {
                    log::info!("fullscreen at {}x{}", sizes[i].0, sizes[i].1);
                    Fullscreen::Exclusive(modes[i].clone())
                }
                None => Fullscreen::Borderless(Some(monitor)),
            }
        }
        None => Fullscreen::Borderless(None),
    };
    window.set_fullscreen(Some(fullscreen));
}
