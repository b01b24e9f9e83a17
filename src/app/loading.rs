use tiny_skia::{Pixmap, Rect, Transform};

use crate::config::AppConfig;
use crate::engine::{Color, Engine};
use crate::font;
use crate::renderer::TextureId;
use crate::scene::{Scene, SceneAction};
use crate::world::lighting::BACKGROUND;

use super::LivingRoomScene;

pub const LOADING_MS: f32 = 1000.0;

const TITLE: &str = "DREAMROOM";
const SUBTITLE: &str = "Entering the dream space...";
const INK: Color = Color([0.30, 0.24, 0.20, 1.0]);
const BAR_EMPTY: Color = Color([0.85, 0.76, 0.66, 1.0]);
const BAR_FILL: Color = Color([0.55, 0.36, 0.96, 1.0]);

/// Title card with a progress bar, shown while the room settles.
pub struct LoadingScene {
    config: Option<AppConfig>,
    elapsed_ms: f32,
    texture: Option<(TextureId, u32, u32)>,
}

impl LoadingScene {
    pub fn new(config: AppConfig) -> Self {
        Self { config: Some(config), elapsed_ms: 0.0, texture: None }
    }

    pub fn progress(&self) -> f32 {
        (self.elapsed_ms / LOADING_MS).clamp(0.0, 1.0)
    }

    fn paint(&self, width: u32, height: u32) -> Option<Pixmap> {
        let mut pixmap = Pixmap::new(width, height)?;
        let bg = Color::from_hex(BACKGROUND).to_rgba8();
        pixmap.fill(tiny_skia::Color::from_rgba8(bg[0], bg[1], bg[2], bg[3]));

        let (w, h) = (width as f32, height as f32);
        let title_scale = (w / 160.0).floor().clamp(2.0, 8.0);
        let title_w = font::text_width(TITLE, title_scale);
        font::draw_text(&mut pixmap, TITLE, (w - title_w) * 0.5, h * 0.35, title_scale, INK);

        let sub_scale = (title_scale * 0.4).floor().max(1.0);
        let sub_w = font::text_width(SUBTITLE, sub_scale);
        let sub_y = h * 0.35 + font::line_height(title_scale) + 12.0;
        font::draw_text(&mut pixmap, SUBTITLE, (w - sub_w) * 0.5, sub_y, sub_scale, INK);

        let bar_w = w * 0.4;
        let bar_x = (w - bar_w) * 0.5;
        let bar_y = sub_y + font::line_height(sub_scale) + 16.0;
        fill(&mut pixmap, bar_x, bar_y, bar_w, 8.0, BAR_EMPTY);
        fill(&mut pixmap, bar_x, bar_y, bar_w * self.progress(), 8.0, BAR_FILL);
        Some(pixmap)
    }
}

fn fill(pixmap: &mut Pixmap, x: f32, y: f32, w: f32, h: f32, color: Color) {
    if let Some(rect) = Rect::from_xywh(x, y, w, h) {
        pixmap.fill_rect(rect, &font::paint_for(color), Transform::identity(), None);
    }
}

impl Scene for LoadingScene {
    fn name(&self) -> &'static str {
        "loading"
    }

    fn on_enter(&mut self, engine: &mut Engine) {
        engine.set_background(Color::from_hex(BACKGROUND));
        engine.camera_controls = false;
        log::info!("loading dream space");
    }

    fn on_exit(&mut self, engine: &mut Engine) {
        if let Some((id, _, _)) = self.texture.take() {
            engine.destroy_texture(id);
        }
        engine.set_overlay(None);
        engine.camera_controls = true;
    }

    fn update(&mut self, engine: &mut Engine) -> SceneAction {
        self.elapsed_ms += engine.dt_ms();
        if self.elapsed_ms < LOADING_MS {
            return SceneAction::None;
        }
        match self.config.take() {
            Some(config) => SceneAction::Switch(Box::new(LivingRoomScene::new(config))),
            None => SceneAction::None,
        }
    }

    fn draw(&mut self, engine: &mut Engine) {
        let (w, h) = engine.screen_size();
        let Some(pixmap) = self.paint(w.max(1), h.max(1)) else { return };
        let id = match self.texture {
            Some((id, tw, th)) if (tw, th) == (pixmap.width(), pixmap.height()) => id,
            stale => {
                if let Some((old, _, _)) = stale {
                    engine.destroy_texture(old);
                }
                let id = engine.create_texture(pixmap.width(), pixmap.height());
                self.texture = Some((id, pixmap.width(), pixmap.height()));
                id
            }
        };
        engine.upload_texture(id, pixmap.data());
        engine.set_overlay(Some(id));
    }
}
