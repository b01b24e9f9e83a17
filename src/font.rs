//! Built-in 5x7 bitmap font for the HUD, labels and cartoon captions.
//!
//! Glyphs are column-major: one byte per column, bit 0 is the top row.
//! Only printable ASCII is covered; anything else renders as `?`.

use tiny_skia::{Paint, Pixmap, Rect, Transform};

use crate::engine::Color;

pub const GLYPH_W: u32 = 5;
pub const GLYPH_H: u32 = 7;
/// Horizontal advance per character in font pixels (glyph plus one column gap).
pub const ADVANCE: u32 = 6;
/// Vertical advance per line in font pixels.
pub const LINE_HEIGHT: u32 = 9;

const FIRST: u8 = b' ';

#[rustfmt::skip]
const GLYPHS: [[u8; 5]; 95] = [
    [0x00,0x00,0x00,0x00,0x00], [0x00,0x00,0x5f,0x00,0x00], [0x00,0x07,0x00,0x07,0x00], [0x14,0x7f,0x14,0x7f,0x14],
    [0x24,0x2a,0x7f,0x2a,0x12], [0x23,0x13,0x08,0x64,0x62], [0x36,0x49,0x55,0x22,0x50], [0x00,0x05,0x03,0x00,0x00],
    [0x00,0x1c,0x22,0x41,0x00], [0x00,0x41,0x22,0x1c,0x00], [0x14,0x08,0x3e,0x08,0x14], [0x08,0x08,0x3e,0x08,0x08],
    [0x00,0x50,0x30,0x00,0x00], [0x08,0x08,0x08,0x08,0x08], [0x00,0x60,0x60,0x00,0x00], [0x20,0x10,0x08,0x04,0x02],
    // 0-9
    [0x3e,0x51,0x49,0x45,0x3e], [0x00,0x42,0x7f,0x40,0x00], [0x42,0x61,0x51,0x49,0x46], [0x21,0x41,0x45,0x4b,0x31],
    [0x18,0x14,0x12,0x7f,0x10], [0x27,0x45,0x45,0x45,0x39], [0x3c,0x4a,0x49,0x49,0x30], [0x01,0x71,0x09,0x05,0x03],
    [0x36,0x49,0x49,0x49,0x36], [0x06,0x49,0x49,0x29,0x1e],
    [0x00,0x36,0x36,0x00,0x00], [0x00,0x56,0x36,0x00,0x00], [0x08,0x14,0x22,0x41,0x00], [0x14,0x14,0x14,0x14,0x14],
    [0x00,0x41,0x22,0x14,0x08], [0x02,0x01,0x51,0x09,0x06], [0x32,0x49,0x79,0x41,0x3e],
    // A-Z
    [0x7e,0x11,0x11,0x11,0x7e], [0x7f,0x49,0x49,0x49,0x36], [0x3e,0x41,0x41,0x41,0x22], [0x7f,0x41,0x41,0x22,0x1c],
    [0x7f,0x49,0x49,0x49,0x41], [0x7f,0x09,0x09,0x09,0x01], [0x3e,0x41,0x49,0x49,0x7a], [0x7f,0x08,0x08,0x08,0x7f],
    [0x00,0x41,0x7f,0x41,0x00], [0x20,0x40,0x41,0x3f,0x01], [0x7f,0x08,0x14,0x22,0x41], [0x7f,0x40,0x40,0x40,0x40],
    [0x7f,0x02,0x0c,0x02,0x7f], [0x7f,0x04,0x08,0x10,0x7f], [0x3e,0x41,0x41,0x41,0x3e], [0x7f,0x09,0x09,0x09,0x06],
    [0x3e,0x41,0x51,0x21,0x5e], [0x7f,0x09,0x19,0x29,0x46], [0x46,0x49,0x49,0x49,0x31], [0x01,0x01,0x7f,0x01,0x01],
    [0x3f,0x40,0x40,0x40,0x3f], [0x1f,0x20,0x40,0x20,0x1f], [0x3f,0x40,0x38,0x40,0x3f], [0x63,0x14,0x08,0x14,0x63],
    [0x07,0x08,0x70,0x08,0x07], [0x61,0x51,0x49,0x45,0x43],
    [0x00,0x7f,0x41,0x41,0x00], [0x02,0x04,0x08,0x10,0x20], [0x00,0x41,0x41,0x7f,0x00], [0x04,0x02,0x01,0x02,0x04],
    [0x40,0x40,0x40,0x40,0x40], [0x00,0x01,0x02,0x04,0x00],
    // a-z
    [0x20,0x54,0x54,0x54,0x78], [0x7f,0x48,0x44,0x44,0x38], [0x38,0x44,0x44,0x44,0x20], [0x38,0x44,0x44,0x48,0x7f],
    [0x38,0x54,0x54,0x54,0x18], [0x08,0x7e,0x09,0x01,0x02], [0x0c,0x52,0x52,0x52,0x3e], [0x7f,0x08,0x04,0x04,0x78],
    [0x00,0x44,0x7d,0x40,0x00], [0x20,0x40,0x44,0x3d,0x00], [0x7f,0x10,0x28,0x44,0x00], [0x00,0x41,0x7f,0x40,0x00],
    [0x7c,0x04,0x18,0x04,0x78], [0x7c,0x08,0x04,0x04,0x78], [0x38,0x44,0x44,0x44,0x38], [0x7c,0x14,0x14,0x14,0x08],
    [0x08,0x14,0x14,0x18,0x7c], [0x7c,0x08,0x04,0x04,0x08], [0x48,0x54,0x54,0x54,0x20], [0x04,0x3f,0x44,0x40,0x20],
    [0x3c,0x40,0x40,0x20,0x7c], [0x1c,0x20,0x40,0x20,0x1c], [0x3c,0x40,0x30,0x40,0x3c], [0x44,0x28,0x10,0x28,0x44],
    [0x0c,0x50,0x50,0x50,0x3c], [0x44,0x64,0x54,0x4c,0x44],
    [0x00,0x08,0x36,0x41,0x00], [0x00,0x00,0x7f,0x00,0x00], [0x00,0x41,0x36,0x08,0x00], [0x10,0x08,0x08,0x10,0x08],
];

/// Column bitmap for `ch`.
pub fn glyph(ch: char) -> [u8; 5] {
    let code = ch as u32;
    if (FIRST as u32..FIRST as u32 + GLYPHS.len() as u32).contains(&code) {
        GLYPHS[(code - FIRST as u32) as usize]
    } else {
        GLYPHS[(b'?' - FIRST) as usize]
    }
}

/// Rendered width in pixels of a single line at `scale`.
pub fn text_width(text: &str, scale: f32) -> f32 {
    let n = text.chars().count() as u32;
    if n == 0 {
        return 0.0;
    }
    (n * ADVANCE - 1) as f32 * scale
}

pub fn line_height(scale: f32) -> f32 {
    LINE_HEIGHT as f32 * scale
}

pub(crate) fn paint_for(color: Color) -> Paint<'static> {
    let [r, g, b, a] = color.to_rgba8();
    let mut paint = Paint::default();
    paint.set_color_rgba8(r, g, b, a);
    paint.anti_alias = false;
    paint
}

/// Draw one line of text with its top-left corner at `(x, y)`.
pub fn draw_text(pixmap: &mut Pixmap, text: &str, x: f32, y: f32, scale: f32, color: Color) {
    draw_text_transformed(pixmap, text, x, y, scale, color, Transform::identity());
}

/// Like [`draw_text`], with the pixel rects mapped through `transform`.
pub fn draw_text_transformed(
    pixmap: &mut Pixmap,
    text: &str,
    x: f32,
    y: f32,
    scale: f32,
    color: Color,
    transform: Transform,
) {
    let paint = paint_for(color);
    let mut pen = x;
    for ch in text.chars() {
        for (col, bits) in glyph(ch).iter().enumerate() {
            for row in 0..GLYPH_H {
                if bits & (1 << row) == 0 {
                    continue;
                }
                let px = pen + col as f32 * scale;
                let py = y + row as f32 * scale;
                if let Some(rect) = Rect::from_xywh(px, py, scale, scale) {
                    pixmap.fill_rect(rect, &paint, transform, None);
                }
            }
        }
        pen += ADVANCE as f32 * scale;
    }
}

/// Transparent `width` x `height` canvas with `text` centred, scaled to fit.
pub fn render_label(text: &str, width: u32, height: u32, color: Color) -> Option<Pixmap> {
    let mut pixmap = Pixmap::new(width, height)?;
    let natural = text_width(text, 1.0).max(1.0);
    let scale = (width as f32 * 0.9 / natural)
        .min(height as f32 * 0.8 / GLYPH_H as f32)
        .max(1.0)
        .floor();
    let x = (width as f32 - text_width(text, scale)) * 0.5;
    let y = (height as f32 - GLYPH_H as f32 * scale) * 0.5;
    draw_text(&mut pixmap, text, x, y, scale, color);
    Some(pixmap)
}
