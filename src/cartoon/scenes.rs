//! The four time-indexed scenes of the episode. Each one redraws the whole
//! frame from its local `scene_time`.

use std::f32::consts::TAU;

use super::characters::{cat, mouse, CatPose};
use super::drawing::{Drawing, Element, Group};

pub trait CartoonScene {
    fn name(&self) -> &'static str;
    /// Length of the scene in milliseconds.
    fn duration(&self) -> f32;
    fn background(&self) -> u32;
    /// Draw the frame at `scene_time` ms into the scene; `time` is the
    /// position within the whole loop.
    fn render(&self, drawing: &mut Drawing, time: f32, scene_time: f32);
}

// ── Chase ───────────────────────────────────────────────────────────────

pub struct Chase;

impl Chase {
    fn speed_lines(drawing: &mut Drawing, x: f32, y: f32) {
        for i in 0..3 {
            let i = i as f32;
            drawing.add(
                Element::line(x - 60.0 - i * 20.0, y - 20.0 + i * 10.0, x - 40.0 - i * 20.0, y - 20.0 + i * 10.0)
                    .stroke(0xcccccc, 3.0)
                    .round_cap(),
            );
        }
    }
}

impl CartoonScene for Chase {
    fn name(&self) -> &'static str {
        "chase"
    }

    fn duration(&self) -> f32 {
        5000.0
    }

    fn background(&self) -> u32 {
        0x87ceeb
    }

    fn render(&self, drawing: &mut Drawing, _time: f32, scene_time: f32) {
        drawing.background(self.background());

        let progress = scene_time / self.duration();
        let bob = (scene_time * 0.01).sin() * 10.0;
        let mouse_x = 100.0 + progress * 800.0;
        let cat_x = mouse_x - 150.0;
        let y = 400.0;

        drawing.add(mouse(mouse_x, y + bob, 1.0));
        drawing.add(cat(cat_x, y + bob, 1.0, CatPose::Idle));

        Self::speed_lines(drawing, mouse_x, y);
        Self::speed_lines(drawing, cat_x, y);
    }
}

// ── Hiding ──────────────────────────────────────────────────────────────

pub struct Hiding;

impl Hiding {
    const CHEESE: (f32, f32) = (400.0, 350.0);

    fn cheese(drawing: &mut Drawing) {
        let (x, y) = Self::CHEESE;
        drawing.add(
            Element::polygon(&[(x - 60.0, y), (x + 60.0, y), (x + 40.0, y - 80.0), (x - 40.0, y - 80.0)])
                .fill(0xffd700)
                .stroke(0x000000, 3.0),
        );
        for (dx, dy, r) in [(-20.0, -40.0, 12.0), (10.0, -50.0, 15.0), (30.0, -30.0, 10.0), (-30.0, -20.0, 8.0)] {
            drawing.add(Element::circle(x + dx, y + dy, r).fill(0xdaa520));
        }
        drawing.add(Element::ellipse(x, y, 25.0, 30.0).fill(0x333333));
    }
}

impl CartoonScene for Hiding {
    fn name(&self) -> &'static str {
        "hiding"
    }

    fn duration(&self) -> f32 {
        5000.0
    }

    fn background(&self) -> u32 {
        0xf0e68c
    }

    fn render(&self, drawing: &mut Drawing, _time: f32, scene_time: f32) {
        drawing.background(self.background());
        Self::cheese(drawing);

        if scene_time > 2000.0 {
            let peek = ((scene_time - 2000.0) / 500.0).min(1.0);
            drawing.add(mouse(Self::CHEESE.0 + peek * 30.0, 380.0, 0.6));
        }

        let progress = scene_time / self.duration();
        let cat_x = 150.0 + (progress * TAU).sin() * 50.0;
        drawing.add(cat(cat_x, 400.0, 1.0, CatPose::Idle));

        if scene_time > 1000.0 {
            drawing.add(Element::text(cat_x, 280.0, 48.0, "?").fill(0x2c3e50));
        }
    }
}

// ── Trap ────────────────────────────────────────────────────────────────

pub struct Trap;

impl Trap {
    const BUCKET: (f32, f32) = (600.0, 200.0);

    fn bucket(drawing: &mut Drawing, sprung: bool) {
        let (x, y) = Self::BUCKET;
        let rope_end = if sprung { 350.0 } else { y + 50.0 };
        drawing.add(Element::line(x, y, x, rope_end).stroke(0x8b4513, 4.0));
        drawing.add(Element::rect(x - 25.0, rope_end, 50.0, 40.0).fill(0x708090).stroke(0x000000, 3.0));

        if sprung {
            for i in 0..8 {
                let angle = i as f32 / 8.0 * TAU;
                drawing.add(
                    Element::ellipse(x + angle.cos() * 40.0, 380.0 + angle.sin() * 30.0, 8.0, 12.0)
                        .fill(0x4da6ff)
                        .opacity(0.7),
                );
            }
        }
    }
}

impl CartoonScene for Trap {
    fn name(&self) -> &'static str {
        "trap"
    }

    fn duration(&self) -> f32 {
        6000.0
    }

    fn background(&self) -> u32 {
        0x98d8c8
    }

    fn render(&self, drawing: &mut Drawing, _time: f32, scene_time: f32) {
        drawing.background(self.background());

        if scene_time < 2000.0 {
            drawing.add(mouse(300.0, 400.0, 0.8));
            Self::bucket(drawing, false);
        } else if scene_time < 4000.0 {
            let walk = (scene_time - 2000.0) / 2000.0;
            drawing.add(cat(100.0 + walk * 450.0, 400.0, 1.0, CatPose::Idle));
            Self::bucket(drawing, false);
            drawing.add(mouse(800.0, 400.0, 0.6));
        } else {
            drawing.add(cat(600.0, 400.0, 1.0, CatPose::Dizzy));
            Self::bucket(drawing, true);
            drawing.add(mouse(850.0, 400.0, 0.7));
            drawing.add(Element::text(600.0, 280.0, 52.0, "!").fill(0xe74c3c));
        }
    }
}

// ── Reaction ────────────────────────────────────────────────────────────

pub struct Reaction;

/// Five-pointed star centred on `(cx, cy)` with outer radius `r`.
pub fn star(cx: f32, cy: f32, r: f32) -> Element {
    let points: Vec<(f32, f32)> = (0..10)
        .map(|i| {
            let radius = if i % 2 == 0 { r } else { r * 0.45 };
            let angle = -TAU / 4.0 + i as f32 * TAU / 10.0;
            (cx + angle.cos() * radius, cy + angle.sin() * radius)
        })
        .collect();
    Element::polygon(&points)
}

/// Heart with its notch at `(cx, cy)`, `size` wide.
pub fn heart(cx: f32, cy: f32, size: f32) -> Element {
    let s = size / 2.0;
    Element::path(&format!(
        "M {cx} {} Q {} {} {} {} Q {} {} {cx} {} Q {} {} {} {} Q {} {} {cx} {} Z",
        cy + s * 0.2,
        cx - s * 0.1,
        cy - s * 0.9,
        cx - s,
        cy - s * 0.3,
        cx - s * 1.1,
        cy + s * 0.5,
        cy + s * 1.2,
        cx + s * 1.1,
        cy + s * 0.5,
        cx + s,
        cy - s * 0.3,
        cx + s * 0.1,
        cy - s * 0.9,
        cy + s * 0.2,
    ))
}

impl CartoonScene for Reaction {
    fn name(&self) -> &'static str {
        "reaction"
    }

    fn duration(&self) -> f32 {
        4000.0
    }

    fn background(&self) -> u32 {
        0xffa07a
    }

    fn render(&self, drawing: &mut Drawing, _time: f32, scene_time: f32) {
        drawing.background(self.background());

        drawing.add(cat(300.0, 350.0, 1.0, CatPose::Dizzy));

        let rotation = (scene_time * 0.2) % 360.0;
        for (sx, sy) in [(260.0, 230.0), (300.0, 200.0), (340.0, 230.0)] {
            let mut g = Group::new().rotated(rotation, sx, sy - 12.0);
            g.add(star(sx, sy - 12.0, 14.0).fill(0xffd700));
            drawing.add(g);
        }

        drawing.add(mouse(700.0, 350.0, 0.9));
        drawing.add(heart(692.0, 268.0, 24.0).fill(0xe74c3c));

        if scene_time > 2000.0 {
            let opacity = ((scene_time - 2000.0) / 1000.0).min(1.0);
            drawing.add(Element::text(514.0, 152.0, 64.0, "THE END").fill(0x95a5a6).opacity(opacity * 0.5).centered());
            drawing.add(Element::text(512.0, 150.0, 64.0, "THE END").fill(0x2c3e50).opacity(opacity).centered());
        }
    }
}
