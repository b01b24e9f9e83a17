use glam::Vec3;

use crate::engine::{Color, DirectionalLight, Fog, Lighting, PointLight};

pub const BACKGROUND: u32 = 0xf5e6d3;
pub const EXPOSURE: f32 = 1.2;

/// Index of the TV glow in `room_lighting().points`.
pub const TV_GLOW: usize = 2;

/// Warm evening rig: ambient fill, two ceiling bulbs, a soft sun and the
/// blue glow of the television.
pub fn room_lighting() -> Lighting {
    let bulb = |position: Vec3| PointLight {
        position,
        color: Color::from_hex(0xffe4b5),
        intensity: 0.8,
        range: 20.0,
    };
    Lighting {
        ambient: Color::from_hex(0xffcc99),
        ambient_intensity: 0.4,
        directional: Some(DirectionalLight {
            from: Vec3::new(5.0, 10.0, 5.0),
            color: Color::from_hex(0xfff5e6),
            intensity: 0.3,
        }),
        points: vec![
            bulb(Vec3::new(-3.0, 5.5, 0.0)),
            bulb(Vec3::new(3.0, 5.5, 2.0)),
            PointLight {
                position: Vec3::new(0.0, 2.5, -5.8),
                color: Color::from_hex(0x6699ff),
                intensity: 0.3,
                range: 8.0,
            },
        ],
        exposure: EXPOSURE,
    }
}

pub fn room_fog() -> Fog {
    Fog::Linear { color: Color::from_hex(BACKGROUND), near: 10.0, far: 50.0 }
}
