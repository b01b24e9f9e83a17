//! Paints a `Drawing` into a `tiny_skia::Pixmap`, the bridge between the
//! cartoon's vector frames and the TV texture.

use tiny_skia::{FillRule, LineCap, Paint, Path, PathBuilder, Pixmap, Rect, Stroke, Transform};

use crate::engine::Color;
use crate::font;

use super::drawing::{Drawing, Element, Group, Node, PathCmd, Shape, TextAnchor};

/// Width and height of the cartoon canvas.
pub const CANVAS_WIDTH: u32 = 1024;
pub const CANVAS_HEIGHT: u32 = 576;

/// Fresh pixmap with `drawing` painted on it.
pub fn rasterize(drawing: &Drawing) -> Option<Pixmap> {
    let mut pixmap = Pixmap::new(drawing.width, drawing.height)?;
    render_into(drawing, &mut pixmap);
    Some(pixmap)
}

/// Clear `pixmap` and paint `drawing` over it.
pub fn render_into(drawing: &Drawing, pixmap: &mut Pixmap) {
    pixmap.fill(tiny_skia::Color::TRANSPARENT);
    for node in &drawing.children {
        render_node(pixmap, node, Transform::identity(), 1.0);
    }
}

fn group_transform(parent: Transform, group: &Group) -> Transform {
    let t = &group.transform;
    let mut transform = parent.pre_translate(t.translate.0, t.translate.1);
    if t.rotate != 0.0 {
        transform = transform.pre_concat(Transform::from_rotate_at(t.rotate, t.rotate_center.0, t.rotate_center.1));
    }
    transform.pre_scale(t.scale, t.scale)
}

fn render_node(pixmap: &mut Pixmap, node: &Node, transform: Transform, opacity: f32) {
    match node {
        Node::Group(group) => {
            let transform = group_transform(transform, group);
            let opacity = opacity * group.opacity;
            for child in &group.children {
                render_node(pixmap, child, transform, opacity);
            }
        }
        Node::Element(element) => render_element(pixmap, element, transform, opacity),
    }
}

fn paint(color: Color, opacity: f32) -> Paint<'static> {
    let [r, g, b, a] = color.with_alpha(color.alpha() * opacity).to_rgba8();
    let mut paint = Paint::default();
    paint.set_color_rgba8(r, g, b, a);
    paint.anti_alias = true;
    paint
}

fn polygon_path(points: &[(f32, f32)], close: bool) -> Option<Path> {
    let (first, rest) = points.split_first()?;
    let mut pb = PathBuilder::new();
    pb.move_to(first.0, first.1);
    for (x, y) in rest {
        pb.line_to(*x, *y);
    }
    if close {
        pb.close();
    }
    pb.finish()
}

fn shape_path(shape: &Shape) -> Option<Path> {
    match shape {
        Shape::Rect { x, y, width, height } => Rect::from_xywh(*x, *y, *width, *height).map(PathBuilder::from_rect),
        Shape::Circle { cx, cy, r } => PathBuilder::from_circle(*cx, *cy, *r),
        Shape::Ellipse { cx, cy, rx, ry } => {
            Rect::from_xywh(cx - rx, cy - ry, rx * 2.0, ry * 2.0).and_then(PathBuilder::from_oval)
        }
        Shape::Line { x1, y1, x2, y2 } => polygon_path(&[(*x1, *y1), (*x2, *y2)], false),
        Shape::Polyline(points) => polygon_path(points, false),
        Shape::Polygon(points) => polygon_path(points, true),
        Shape::Path(cmds) => {
            let mut pb = PathBuilder::new();
            for cmd in cmds {
                match *cmd {
                    PathCmd::MoveTo(x, y) => pb.move_to(x, y),
                    PathCmd::LineTo(x, y) => pb.line_to(x, y),
                    PathCmd::QuadTo(cx, cy, x, y) => pb.quad_to(cx, cy, x, y),
                    PathCmd::Close => pb.close(),
                }
            }
            pb.finish()
        }
        Shape::Text { .. } => None,
    }
}

fn render_element(pixmap: &mut Pixmap, element: &Element, transform: Transform, opacity: f32) {
    let style = &element.style;
    let opacity = opacity * style.opacity;

    if let Shape::Text { x, y, size, content, anchor } = &element.shape {
        if let Some(fill) = style.fill {
            // Bitmap glyphs are 7 rows tall; cap height is roughly 0.7 of the font size.
            let scale = (size * 0.7 / font::GLYPH_H as f32).max(1.0);
            let width = font::text_width(content, scale);
            let left = match anchor {
                TextAnchor::Start => *x,
                TextAnchor::Middle => x - width * 0.5,
            };
            let top = y - font::GLYPH_H as f32 * scale;
            font::draw_text_transformed(pixmap, content, left, top, scale, fill.with_alpha(fill.alpha() * opacity), transform);
        }
        return;
    }

    let Some(path) = shape_path(&element.shape) else {
        return;
    };
    if let Some(fill) = style.fill {
        pixmap.fill_path(&path, &paint(fill, opacity), FillRule::Winding, transform, None);
    }
    if let Some(color) = style.stroke {
        let stroke = Stroke {
            width: style.stroke_width,
            line_cap: if style.round_cap { LineCap::Round } else { LineCap::Butt },
            ..Default::default()
        };
        pixmap.stroke_path(&path, &paint(color, opacity), &stroke, transform, None);
    }
}
