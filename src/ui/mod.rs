// ── UI types & pure helpers ──────────────────────────────────────────────────

use std::collections::VecDeque;

use tiny_skia::{Pixmap, Rect, Transform};

use crate::dream::memory::FormattedDream;
use crate::engine::{Color, Engine};
use crate::font::{self, ADVANCE, GLYPH_H};
use crate::renderer::TextureId;

/// Word-wrap `text` so every returned line is at most `max_cols` characters.
/// Words are split on whitespace; a word longer than `max_cols` is broken
/// into `max_cols`-sized pieces.
pub fn word_wrap(text: &str, max_cols: usize) -> Vec<String> {
    if max_cols == 0 { return vec![]; }
    let mut lines: Vec<String> = Vec::new();
    let mut current: Vec<char> = Vec::new();
    for word in text.split_whitespace() {
        let len = word.chars().count();
        let space = if current.is_empty() { 0 } else { 1 };
        if !current.is_empty() && current.len() + space + len > max_cols {
            lines.push(current.drain(..).collect());
        }
        if !current.is_empty() { current.push(' '); }
        current.extend(word.chars());
        while current.len() > max_cols {
            lines.push(current.drain(..max_cols).collect());
        }
    }
    if !current.is_empty() { lines.push(current.into_iter().collect()); }
    lines
}

/// Returns `true` if pixel point `(px, py)` falls inside the rectangle
/// defined by origin `(rx, ry)` and size `(rw, rh)` using half-open intervals.
pub fn rect_contains(rx: f32, ry: f32, rw: f32, rh: f32, px: f32, py: f32) -> bool {
    px >= rx && px < rx + rw && py >= ry && py < ry + rh
}

// ── Palette ───────────────────────────────────────────────────────────────────

pub const PANEL_BG: Color = Color([0.06, 0.04, 0.12, 0.78]);
pub const PANEL_BORDER: Color = Color([0.55, 0.36, 0.96, 0.9]);
pub const USER_TEXT: Color = Color([0.95, 0.93, 0.88, 1.0]);
pub const COMPANION_TEXT: Color = Color([0.78, 0.70, 1.00, 1.0]);
pub const SYSTEM_TEXT: Color = Color([0.55, 0.52, 0.62, 1.0]);
pub const STATUS_TEXT: Color = Color([0.30, 0.24, 0.20, 1.0]);

/// Integer text scale of the HUD: 5x7 glyphs drawn at 2x.
pub const TEXT_SCALE: f32 = 2.0;
pub const MAX_CHAT_LINES: usize = 200;
pub const MAX_INPUT_CHARS: usize = 500;

const PAD: f32 = 12.0;
const CHAT_WIDTH: f32 = 440.0;

fn char_w() -> f32 { ADVANCE as f32 * TEXT_SCALE }
fn line_h() -> f32 { font::line_height(TEXT_SCALE) }

// ── Chat log ──────────────────────────────────────────────────────────────────

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Speaker {
    User,
    Companion,
    System,
}

impl Speaker {
    pub fn color(self) -> Color {
        match self {
            Speaker::User => USER_TEXT,
            Speaker::Companion => COMPANION_TEXT,
            Speaker::System => SYSTEM_TEXT,
        }
    }

    fn prefix(self) -> &'static str {
        match self {
            Speaker::User => "You: ",
            Speaker::Companion => "",
            Speaker::System => "* ",
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct ChatLine {
    pub speaker: Speaker,
    pub text: String,
}

#[derive(Clone, Debug, Default)]
pub struct ChatLog {
    lines: VecDeque<ChatLine>,
}

impl ChatLog {
    pub fn push(&mut self, speaker: Speaker, text: impl Into<String>) {
        if self.lines.len() >= MAX_CHAT_LINES {
            self.lines.pop_front();
        }
        self.lines.push_back(ChatLine { speaker, text: text.into() });
    }

    pub fn lines(&self) -> impl Iterator<Item = &ChatLine> {
        self.lines.iter()
    }

    pub fn len(&self) -> usize { self.lines.len() }
    pub fn is_empty(&self) -> bool { self.lines.is_empty() }
    pub fn clear(&mut self) { self.lines.clear(); }

    pub fn last(&self) -> Option<&ChatLine> {
        self.lines.back()
    }

    /// The newest wrapped rows that fit in `max_rows`, oldest first.
    pub fn visible_rows(&self, max_cols: usize, max_rows: usize) -> Vec<(String, Color)> {
        let mut rows: Vec<(String, Color)> = Vec::new();
        for line in self.lines.iter().rev() {
            let text = format!("{}{}", line.speaker.prefix(), line.text);
            let wrapped = word_wrap(&text, max_cols);
            for row in wrapped.into_iter().rev() {
                rows.push((row, line.speaker.color()));
            }
            // Blank spacer between messages.
            rows.push((String::new(), SYSTEM_TEXT));
            if rows.len() >= max_rows {
                break;
            }
        }
        rows.truncate(max_rows);
        rows.reverse();
        while rows.first().is_some_and(|(r, _)| r.is_empty()) {
            rows.remove(0);
        }
        rows
    }
}

// ── Input line ────────────────────────────────────────────────────────────────

#[derive(Clone, Debug, Default, PartialEq)]
pub struct InputLine {
    text: String,
}

impl InputLine {
    /// Returns false when the line is full.
    pub fn push(&mut self, ch: char) -> bool {
        if ch.is_control() || self.text.chars().count() >= MAX_INPUT_CHARS {
            return false;
        }
        self.text.push(ch);
        true
    }

    pub fn backspace(&mut self) -> bool {
        self.text.pop().is_some()
    }

    /// Trimmed contents, leaving the line empty. `None` if only whitespace.
    pub fn take(&mut self) -> Option<String> {
        let text = std::mem::take(&mut self.text);
        let trimmed = text.trim();
        (!trimmed.is_empty()).then(|| trimmed.to_string())
    }

    pub fn as_str(&self) -> &str { &self.text }
    pub fn is_empty(&self) -> bool { self.text.is_empty() }
}

// ── History panel ─────────────────────────────────────────────────────────────

#[derive(Clone, Debug, PartialEq)]
pub struct HistoryRow {
    pub heading: String,
    pub preview: String,
    pub color: Color,
}

impl From<&FormattedDream> for HistoryRow {
    fn from(f: &FormattedDream) -> Self {
        Self {
            heading: format!("{}  {}", f.formatted_date, f.emotion_label),
            preview: f.preview.clone(),
            color: Color::from_hex(f.dream.dominant_emotion.palette()[0]),
        }
    }
}

// ── HUD ───────────────────────────────────────────────────────────────────────

/// Screen overlay: chat panel on the right, status and key hints along the
/// bottom, and the dream history panel when open. Painted on the CPU into a
/// window-sized pixmap and uploaded only when something changed.
pub struct Hud {
    pub chat: ChatLog,
    pub input: InputLine,
    status: String,
    hints: String,
    thinking: bool,
    cursor_on: bool,
    cursor_ms: f32,
    history: Option<Vec<HistoryRow>>,
    size: (u32, u32),
    pixmap: Option<Pixmap>,
    texture: Option<TextureId>,
    texture_size: (u32, u32),
    dirty: bool,
}

pub const KEY_HINTS: &str =
    "Enter send  F2 music  F3 voice  F4 history  F5 new dream  F6 freeze  F7 fast  F8 reverse  F9 svg  Esc quit";

impl Hud {
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            chat: ChatLog::default(),
            input: InputLine::default(),
            status: String::new(),
            hints: KEY_HINTS.to_string(),
            thinking: false,
            cursor_on: true,
            cursor_ms: 0.0,
            history: None,
            size: (width.max(1), height.max(1)),
            pixmap: None,
            texture: None,
            texture_size: (0, 0),
            dirty: true,
        }
    }

    pub fn mark_dirty(&mut self) { self.dirty = true; }
    pub fn is_dirty(&self) -> bool { self.dirty }

    pub fn resize(&mut self, width: u32, height: u32) {
        let size = (width.max(1), height.max(1));
        if size != self.size {
            self.size = size;
            self.dirty = true;
        }
    }

    pub fn size(&self) -> (u32, u32) { self.size }

    pub fn push(&mut self, speaker: Speaker, text: impl Into<String>) {
        self.chat.push(speaker, text);
        self.dirty = true;
    }

    pub fn set_status(&mut self, status: impl Into<String>) {
        let status = status.into();
        if status != self.status {
            self.status = status;
            self.dirty = true;
        }
    }

    pub fn status(&self) -> &str { &self.status }

    pub fn set_thinking(&mut self, thinking: bool) {
        if thinking != self.thinking {
            self.thinking = thinking;
            self.dirty = true;
        }
    }

    pub fn type_char(&mut self, ch: char) -> bool {
        let typed = self.input.push(ch);
        self.dirty |= typed;
        typed
    }

    pub fn backspace(&mut self) {
        self.dirty |= self.input.backspace();
    }

    pub fn take_input(&mut self) -> Option<String> {
        self.dirty = true;
        self.input.take()
    }

    /// Cursor blink.
    pub fn tick(&mut self, dt_ms: f32) {
        self.cursor_ms += dt_ms;
        if self.cursor_ms >= 500.0 {
            self.cursor_ms = 0.0;
            self.cursor_on = !self.cursor_on;
            self.dirty = true;
        }
    }

    pub fn open_history(&mut self, dreams: &[FormattedDream]) {
        self.history = Some(dreams.iter().map(HistoryRow::from).collect());
        self.dirty = true;
    }

    pub fn close_history(&mut self) {
        if self.history.take().is_some() {
            self.dirty = true;
        }
    }

    pub fn is_history_open(&self) -> bool { self.history.is_some() }

    pub fn history_rows(&self) -> Option<&[HistoryRow]> {
        self.history.as_deref()
    }

    /// Chat panel rectangle `(x, y, w, h)` in window pixels.
    pub fn chat_rect(&self) -> (f32, f32, f32, f32) {
        let (w, h) = (self.size.0 as f32, self.size.1 as f32);
        let width = CHAT_WIDTH.min(w - 2.0 * PAD).max(0.0);
        (w - width - PAD, PAD, width, (h - 2.0 * PAD - line_h() * 1.5).max(0.0))
    }

    pub fn history_rect(&self) -> (f32, f32, f32, f32) {
        let (w, h) = (self.size.0 as f32, self.size.1 as f32);
        let (cx, _, _, _) = self.chat_rect();
        let width = (cx - 2.0 * PAD).max(0.0).min(640.0);
        (PAD, PAD, width, (h * 0.7).max(0.0))
    }

    /// True when `(x, y)` lands on a panel, so clicks there leave the camera alone.
    pub fn hit(&self, x: f32, y: f32) -> bool {
        let (cx, cy, cw, ch) = self.chat_rect();
        if rect_contains(cx, cy, cw, ch, x, y) {
            return true;
        }
        let (hx, hy, hw, hh) = self.history_rect();
        self.history.is_some() && rect_contains(hx, hy, hw, hh, x, y)
    }

    /// Repaint into the CPU pixmap if anything changed.
    pub fn paint(&mut self) -> Option<&Pixmap> {
        let needs_new = self.pixmap.as_ref().is_none_or(|p| (p.width(), p.height()) != self.size);
        if needs_new {
            self.pixmap = Pixmap::new(self.size.0, self.size.1);
            self.dirty = true;
        }
        if self.dirty {
            let mut pixmap = self.pixmap.take()?;
            pixmap.fill(tiny_skia::Color::TRANSPARENT);
            self.paint_chat(&mut pixmap);
            self.paint_status(&mut pixmap);
            if self.history.is_some() {
                self.paint_history(&mut pixmap);
            }
            self.pixmap = Some(pixmap);
            self.dirty = false;
        }
        self.pixmap.as_ref()
    }

    fn paint_chat(&self, pixmap: &mut Pixmap) {
        let (x, y, w, h) = self.chat_rect();
        panel(pixmap, x, y, w, h);

        let max_cols = ((w - 2.0 * PAD) / char_w()).floor().max(1.0) as usize;
        let input_rows = 2usize;
        let body_h = h - 2.0 * PAD - line_h() * (input_rows as f32 + 0.5);
        let max_rows = (body_h / line_h()).floor().max(0.0) as usize;

        for (i, (row, color)) in self.chat.visible_rows(max_cols, max_rows).iter().enumerate() {
            font::draw_text(pixmap, row, x + PAD, y + PAD + i as f32 * line_h(), TEXT_SCALE, *color);
        }

        // Input area, showing the tail of long input.
        let input_top = y + h - PAD - line_h() * input_rows as f32;
        fill(pixmap, x + PAD, input_top - line_h() * 0.5, w - 2.0 * PAD, 1.0, PANEL_BORDER);
        let text = if self.thinking {
            "The dream companion is thinking...".to_string()
        } else {
            let cursor = if self.cursor_on { "_" } else { " " };
            format!("> {}{cursor}", self.input.as_str())
        };
        let rows = word_wrap(&text, max_cols);
        let start = rows.len().saturating_sub(input_rows);
        for (i, row) in rows[start..].iter().enumerate() {
            let color = if self.thinking { SYSTEM_TEXT } else { USER_TEXT };
            font::draw_text(pixmap, row, x + PAD, input_top + i as f32 * line_h(), TEXT_SCALE, color);
        }
    }

    fn paint_status(&self, pixmap: &mut Pixmap) {
        let h = self.size.1 as f32;
        let y = h - PAD - GLYPH_H as f32 * TEXT_SCALE;
        let line = if self.status.is_empty() { self.hints.clone() } else { format!("{}  |  {}", self.status, self.hints) };
        font::draw_text(pixmap, &line, PAD, y, TEXT_SCALE, STATUS_TEXT);
    }

    fn paint_history(&self, pixmap: &mut Pixmap) {
        let Some(rows) = self.history.as_ref() else { return };
        let (x, y, w, h) = self.history_rect();
        panel(pixmap, x, y, w, h);
        let max_cols = ((w - 2.0 * PAD) / char_w()).floor().max(1.0) as usize;

        let mut cy = y + PAD;
        font::draw_text(pixmap, "Dream history", x + PAD, cy, TEXT_SCALE, PANEL_BORDER);
        cy += line_h() * 1.5;

        if rows.is_empty() {
            font::draw_text(pixmap, "No dreams yet.", x + PAD, cy, TEXT_SCALE, SYSTEM_TEXT);
            return;
        }
        for row in rows {
            if cy + line_h() * 2.0 > y + h - PAD {
                break;
            }
            fill(pixmap, x + PAD, cy + 2.0, 6.0, 10.0, row.color);
            font::draw_text(pixmap, &row.heading, x + PAD + 12.0, cy, TEXT_SCALE, row.color);
            cy += line_h();
            for line in word_wrap(&row.preview, max_cols).into_iter().take(2) {
                font::draw_text(pixmap, &line, x + PAD, cy, TEXT_SCALE, USER_TEXT);
                cy += line_h();
            }
            cy += line_h() * 0.5;
        }
    }

    /// Upload the overlay if it changed and queue it for this frame.
    pub fn draw(&mut self, engine: &mut Engine) {
        let (w, h) = engine.screen_size();
        self.resize(w, h);
        let changed = self.dirty || self.pixmap.is_none();
        if self.paint().is_none() {
            return;
        }
        let size = self.size;
        if self.texture_size != size {
            if let Some(old) = self.texture.take() {
                engine.destroy_texture(old);
            }
        }
        let Some(pixmap) = self.pixmap.as_ref() else { return };
        let id = match self.texture {
            Some(id) if !changed => id,
            Some(id) => {
                engine.upload_texture(id, pixmap.data());
                id
            }
            None => {
                let id = engine.create_texture(size.0, size.1);
                engine.upload_texture(id, pixmap.data());
                self.texture = Some(id);
                self.texture_size = size;
                id
            }
        };
        engine.set_overlay(Some(id));
    }
}

fn fill(pixmap: &mut Pixmap, x: f32, y: f32, w: f32, h: f32, color: Color) {
    if let Some(rect) = Rect::from_xywh(x, y, w, h) {
        pixmap.fill_rect(rect, &font::paint_for(color), Transform::identity(), None);
    }
}

fn panel(pixmap: &mut Pixmap, x: f32, y: f32, w: f32, h: f32) {
    fill(pixmap, x, y, w, h, PANEL_BG);
    fill(pixmap, x, y, w, 2.0, PANEL_BORDER);
    fill(pixmap, x, y + h - 2.0, w, 2.0, PANEL_BORDER);
    fill(pixmap, x, y, 2.0, h, PANEL_BORDER);
    fill(pixmap, x + w - 2.0, y, 2.0, h, PANEL_BORDER);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn visible_rows_keep_newest_and_drop_leading_spacer() {
        let mut log = ChatLog::default();
        for i in 0..10 {
            log.push(Speaker::User, format!("message {i}"));
        }
        let rows = log.visible_rows(40, 4);
        assert_eq!(rows.len(), 3);
        assert_eq!(rows.last().map(|(r, _)| r.as_str()), Some("You: message 9"));
        assert!(!rows[0].0.is_empty());
    }

    #[test]
    fn paint_clears_dirty_flag() {
        let mut hud = Hud::new(320, 240);
        assert!(hud.is_dirty());
        assert!(hud.paint().is_some());
        assert!(!hud.is_dirty());
        hud.set_status("calm");
        assert!(hud.is_dirty());
    }
}
