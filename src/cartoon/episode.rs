use tiny_skia::Pixmap;

use super::drawing::Drawing;
use super::raster::{self, CANVAS_HEIGHT, CANVAS_WIDTH};
use super::scenes::{CartoonScene, Chase, Hiding, Reaction, Trap};

/// Looping cat-and-mouse episode. Keeps the current frame both as a display
/// list and as a rasterized pixmap ready for texture upload.
pub struct CartoonEpisode {
    scenes: Vec<Box<dyn CartoonScene>>,
    duration: f32,
    /// Milliseconds since the episode started. Kept in f64 so frame steps
    /// still register after days of uptime.
    total_time: f64,
    current: usize,
    scene_time: f32,
    drawing: Drawing,
    pixmap: Option<Pixmap>,
}

impl Default for CartoonEpisode {
    fn default() -> Self {
        Self::new()
    }
}

impl CartoonEpisode {
    pub fn new() -> Self {
        let scenes: Vec<Box<dyn CartoonScene>> = vec![Box::new(Chase), Box::new(Hiding), Box::new(Trap), Box::new(Reaction)];
        let duration = scenes.iter().map(|s| s.duration()).sum();
        let pixmap = Pixmap::new(CANVAS_WIDTH, CANVAS_HEIGHT);
        if pixmap.is_none() {
            log::error!("could not allocate {CANVAS_WIDTH}x{CANVAS_HEIGHT} cartoon canvas");
        }
        let mut episode = Self {
            scenes,
            duration,
            total_time: 0.0,
            current: 0,
            scene_time: 0.0,
            drawing: Drawing::new(CANVAS_WIDTH, CANVAS_HEIGHT),
            pixmap,
        };
        episode.redraw();
        episode
    }

    /// Advance the clock by `dt_ms` and redraw the active scene.
    pub fn update(&mut self, dt_ms: f32) {
        self.total_time += f64::from(dt_ms.max(0.0));
        self.redraw();
    }

    fn redraw(&mut self) {
        let (index, scene_time) = self.locate(self.total_time);
        if index != self.current {
            log::debug!("cartoon scene -> {}", self.scenes[index].name());
            self.current = index;
        }
        self.scene_time = scene_time;

        self.drawing.clear();
        let looped = self.total_time.rem_euclid(f64::from(self.duration)) as f32;
        self.scenes[index].render(&mut self.drawing, looped, scene_time);
        if let Some(pixmap) = self.pixmap.as_mut() {
            raster::render_into(&self.drawing, pixmap);
        }
    }

    /// Scene index and local time for an absolute episode time.
    pub fn locate(&self, time: f64) -> (usize, f32) {
        let looped = time.rem_euclid(f64::from(self.duration)) as f32;
        let mut start = 0.0;
        for (i, scene) in self.scenes.iter().enumerate() {
            if looped < start + scene.duration() {
                return (i, looped - start);
            }
            start += scene.duration();
        }
        let last = self.scenes.len() - 1;
        (last, looped - (start - self.scenes[last].duration()))
    }

    pub fn duration(&self) -> f32 {
        self.duration
    }

    pub fn total_time(&self) -> f64 {
        self.total_time
    }

    pub fn scene_time(&self) -> f32 {
        self.scene_time
    }

    pub fn current_scene_index(&self) -> usize {
        self.current
    }

    pub fn scene_name(&self) -> &'static str {
        self.scenes[self.current].name()
    }

    pub fn scene_count(&self) -> usize {
        self.scenes.len()
    }

    pub fn drawing(&self) -> &Drawing {
        &self.drawing
    }

    pub fn pixmap(&self) -> Option<&Pixmap> {
        self.pixmap.as_ref()
    }

    /// Premultiplied RGBA8 bytes of the current frame.
    pub fn frame_bytes(&self) -> Option<&[u8]> {
        self.pixmap.as_ref().map(|p| p.data())
    }

    pub fn size(&self) -> (u32, u32) {
        (CANVAS_WIDTH, CANVAS_HEIGHT)
    }

    pub fn to_svg(&self) -> String {
        self.drawing.to_svg()
    }
}
