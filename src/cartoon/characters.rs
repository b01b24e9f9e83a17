//! The cartoon's two actors, built in local coordinates around their
//! body origin and placed with a translate/scale group.

use super::drawing::{Element, Group};

const OUTLINE: u32 = 0x000000;

#[derive(Copy, Clone, Debug, PartialEq, Eq, Default)]
pub enum CatPose {
    #[default]
    Idle,
    /// Crossed-out eyes, used after the bucket lands.
    Dizzy,
}

pub fn cat(x: f32, y: f32, scale: f32, pose: CatPose) -> Group {
    let mut g = Group::at(x, y, scale);

    g.add(Element::rect(-20.0, 0.0, 40.0, 50.0).fill(0x8b7355).stroke(OUTLINE, 2.0));
    g.add(Element::circle(0.0, -10.0, 25.0).fill(0xa0826d).stroke(OUTLINE, 2.0));

    g.add(Element::polygon(&[(-18.0, -28.0), (-25.0, -45.0), (-12.0, -35.0)]).fill(0x8b7355).stroke(OUTLINE, 2.0));
    g.add(Element::polygon(&[(18.0, -28.0), (25.0, -45.0), (12.0, -35.0)]).fill(0x8b7355).stroke(OUTLINE, 2.0));

    match pose {
        CatPose::Idle => {
            g.add(Element::circle(-10.0, -15.0, 5.0).fill(0x2c3e50));
            g.add(Element::circle(10.0, -15.0, 5.0).fill(0x2c3e50));
        }
        CatPose::Dizzy => {
            for cx in [-10.0, 10.0] {
                g.add(Element::line(cx - 4.0, -19.0, cx + 4.0, -11.0).stroke(0x2c3e50, 2.5).round_cap());
                g.add(Element::line(cx + 4.0, -19.0, cx - 4.0, -11.0).stroke(0x2c3e50, 2.5).round_cap());
            }
        }
    }

    g.add(Element::polygon(&[(0.0, -5.0), (-3.0, 0.0), (3.0, 0.0)]).fill(0xe74c3c));

    for (y1, y2) in [(-10.0, -12.0), (-5.0, -5.0), (0.0, 2.0)] {
        g.add(Element::path(&format!("M -25 {y1} L -45 {y2}")).stroke(OUTLINE, 2.0));
        g.add(Element::path(&format!("M 25 {y1} L 45 {y2}")).stroke(OUTLINE, 2.0));
    }

    g.add(Element::path("M 20 40 Q 50 30 55 10 Q 58 -5 52 -10").stroke(0x8b7355, 5.0).round_cap());

    g.add(Element::rect(-15.0, 50.0, 10.0, 25.0).fill(0xa0826d).stroke(OUTLINE, 2.0));
    g.add(Element::rect(5.0, 50.0, 10.0, 25.0).fill(0xa0826d).stroke(OUTLINE, 2.0));
    g
}

pub fn mouse(x: f32, y: f32, scale: f32) -> Group {
    let mut g = Group::at(x, y, scale);

    g.add(Element::ellipse(0.0, 10.0, 18.0, 25.0).fill(0x8b7765).stroke(OUTLINE, 2.0));
    g.add(Element::circle(0.0, -15.0, 18.0).fill(0xa0867d).stroke(OUTLINE, 2.0));

    for cx in [-15.0, 15.0] {
        g.add(Element::circle(cx, -25.0, 10.0).fill(0xd4a89a).stroke(OUTLINE, 2.0));
        g.add(Element::circle(cx, -25.0, 6.0).fill(0xe8c4b8));
    }

    g.add(Element::circle(-6.0, -18.0, 4.0).fill(0x2c3e50));
    g.add(Element::circle(6.0, -18.0, 4.0).fill(0x2c3e50));
    g.add(Element::circle(0.0, -10.0, 3.0).fill(0xe74c3c));

    for (y1, y2) in [(-12.0, -14.0), (-10.0, -10.0)] {
        g.add(Element::path(&format!("M -18 {y1} L -30 {y2}")).stroke(OUTLINE, 1.5));
        g.add(Element::path(&format!("M 18 {y1} L 30 {y2}")).stroke(OUTLINE, 1.5));
    }

    g.add(Element::circle(-10.0, 30.0, 4.0).fill(0xd4a89a).stroke(OUTLINE, 2.0));
    g.add(Element::circle(10.0, 30.0, 4.0).fill(0xd4a89a).stroke(OUTLINE, 2.0));

    g.add(Element::path("M 15 20 Q 35 15 40 5 Q 43 -2 40 -8").stroke(0x8b7765, 3.0).round_cap());
    g
}
