// ── Living-room furniture ────────────────────────────────────────────────────
//
// Grid coordinates below are in voxel units; `VoxelBuilder` scales them by
// the active voxel size.

use std::f32::consts::FRAC_PI_2;

use glam::{IVec3, Mat4, Quat, Vec3};
use tiny_skia::{Paint, PathBuilder, Pixmap, Rect, Stroke, Transform};

use crate::engine::{Color, Engine};
use crate::renderer::mesh::MeshKind;
use crate::renderer::TextureId;

use super::{Material, VoxelBuilder, VoxelModel};

pub const BOOK_COLORS: [u32; 6] = [0xff6b6b, 0x4ecdc4, 0xffe66d, 0x95e1d3, 0xf38181, 0xaa96da];

pub const TV_SCREEN_POSITION: Vec3 = Vec3::new(0.0, 2.5, -5.8);
pub const TV_SCREEN_SIZE: (f32, f32) = (3.0, 1.7);
pub const RUG_TEXTURE_SIZE: u32 = 128;

fn v(x: i32, y: i32, z: i32) -> IVec3 {
    IVec3::new(x, y, z)
}

/// A flat panel drawn with the plane mesh.
#[derive(Copy, Clone, Debug)]
pub struct Panel {
    pub transform: Mat4,
    pub material: Material,
}

impl Panel {
    /// `width` x `height` plane centred at `position`, rotated by `rotation`
    /// from its default +Z facing.
    pub fn new(width: f32, height: f32, rotation: Quat, position: Vec3, material: Material) -> Self {
        Self {
            transform: Mat4::from_scale_rotation_translation(Vec3::new(width, height, 1.0), rotation, position),
            material,
        }
    }
}

pub fn room() -> Vec<Panel> {
    let floor = Material::voxel(0xd4a574);
    let wall = Material::voxel(0xe8dcc4);
    let ceiling = Material::voxel(0xf5f5dc);
    vec![
        Panel::new(20.0, 16.0, Quat::from_rotation_x(-FRAC_PI_2), Vec3::ZERO, floor),
        Panel::new(20.0, 8.0, Quat::IDENTITY, Vec3::new(0.0, 4.0, -8.0), wall),
        Panel::new(16.0, 8.0, Quat::from_rotation_y(FRAC_PI_2), Vec3::new(-10.0, 4.0, 0.0), wall),
        Panel::new(16.0, 8.0, Quat::from_rotation_y(-FRAC_PI_2), Vec3::new(10.0, 4.0, 0.0), wall),
        Panel::new(20.0, 16.0, Quat::from_rotation_x(FRAC_PI_2), Vec3::new(0.0, 8.0, 0.0), ceiling),
    ]
}

pub fn sofa() -> VoxelModel {
    let fabric = Material::fabric(0xb8a89a);
    let cushion = Material::fabric(0xa89888);
    let mut b = VoxelBuilder::new();
    b.add_box(v(-3, 0, -1), v(3, 1, 1), fabric)
        .add_box(v(-3, 1, -1), v(3, 3, -1), fabric)
        .add_box(v(-3, 0, -1), v(-3, 2, 1), fabric)
        .add_box(v(3, 0, -1), v(3, 2, 1), fabric)
        .set_size(0.4);
    for x in [-2, 0, 2] {
        b.add_block(v(x, 2, 0), cushion);
    }
    b.build().at(Vec3::new(-4.0, 0.5, 3.0))
}

pub fn coffee_table() -> VoxelModel {
    let wood = Material::wood();
    let mut b = VoxelBuilder::new();
    for (x, z) in [(-2, -1), (2, -1), (-2, 1), (2, 1)] {
        b.add_box(v(x, 0, z), v(x, 1, z), wood);
    }
    b.add_box(v(-3, 2, -2), v(3, 2, 2), wood);
    b.build().at(Vec3::new(0.0, 0.5, 0.0))
}

pub fn bookshelf() -> VoxelModel {
    let wood = Material::wood();
    let mut b = VoxelBuilder::new();
    b.add_box(v(-2, 0, 0), v(-2, 8, 0), wood)
        .add_box(v(2, 0, 0), v(2, 8, 0), wood)
        .add_box(v(-2, 8, 0), v(2, 8, 0), wood);
    for y in [0, 3, 6] {
        b.add_box(v(-2, y, 0), v(2, y, 0), wood);
    }

    b.set_size(0.4);
    // (books on the shelf, first colour index, bottom row, top row)
    for (count, first, y0, y1) in [(4, 0, 1, 2), (3, 2, 4, 5), (4, 4, 7, 7)] {
        for i in 0..count {
            let color = BOOK_COLORS[(i + first) as usize % BOOK_COLORS.len()];
            b.add_box(v(-1 + i, y0, 0), v(-1 + i, y1, 0), Material::voxel(color));
        }
    }
    b.build().at(Vec3::new(6.0, 0.5, -4.0)).rotated(FRAC_PI_2)
}

pub fn plant() -> VoxelModel {
    let pot = Material::voxel(0x8B4513);
    let soil = Material::voxel(0x3d2817);
    let leaf = Material::voxel(0x2d8659);
    let stem = Material::voxel(0x4a7c59);
    let mut b = VoxelBuilder::new();
    b.add_box(v(-1, 0, -1), v(1, 1, 1), pot);
    b.set_size(0.4).add_box(v(-1, 2, -1), v(1, 2, 1), soil);
    b.reset_size().add_box(v(0, 2, 0), v(0, 4, 0), stem);
    for at in [v(-1, 4, 0), v(1, 4, 0), v(0, 4, -1), v(0, 4, 1), v(0, 5, 0)] {
        b.add_block(at, leaf);
    }
    b.set_size(0.4).add_block(v(-1, 5, -1), leaf).add_block(v(1, 5, 1), leaf);
    b.build().at(Vec3::new(-6.0, 0.5, -4.0))
}

/// Checkered rug pattern with a dark border, premultiplied RGBA.
pub fn rug_texture() -> Option<Pixmap> {
    let size = RUG_TEXTURE_SIZE;
    let mut pixmap = Pixmap::new(size, size)?;
    pixmap.fill(tiny_skia::Color::from_rgba8(0x8B, 0x45, 0x13, 0xff));

    let mut paint = Paint::default();
    paint.set_color_rgba8(0xA0, 0x52, 0x2D, 0xff);
    for i in (0..size).step_by(16) {
        for j in (0..size).step_by(16) {
            if (i + j) % 32 == 0 {
                if let Some(rect) = Rect::from_xywh(i as f32, j as f32, 16.0, 16.0) {
                    pixmap.fill_rect(rect, &paint, Transform::identity(), None);
                }
            }
        }
    }

    paint.set_color_rgba8(0x6B, 0x34, 0x10, 0xff);
    let border = Rect::from_xywh(4.0, 4.0, 120.0, 120.0)?;
    let path = PathBuilder::from_rect(border);
    let stroke = Stroke { width: 8.0, ..Default::default() };
    pixmap.stroke_path(&path, &paint, &stroke, Transform::identity(), None);
    Some(pixmap)
}

/// Rug placement: 6 x 4 on the floor, just above it.
pub fn rug_transform() -> Mat4 {
    Mat4::from_scale_rotation_translation(
        Vec3::new(6.0, 4.0, 1.0),
        Quat::from_rotation_x(-FRAC_PI_2),
        Vec3::new(0.0, 0.05, 0.0),
    )
}

/// TV stand, screen frame and the screen panel the cartoon plays on.
#[derive(Clone, Debug)]
pub struct TvUnit {
    pub stand: VoxelModel,
    pub frame: VoxelModel,
    pub screen: Panel,
}

impl TvUnit {
    pub fn new() -> Self {
        let wood = Material::wood();
        let mut b = VoxelBuilder::new();
        b.add_box(v(-3, 0, 0), v(3, 0, 1), wood)
            .add_box(v(-3, 1, 0), v(3, 1, 1), wood)
            .add_box(v(-3, 0, 0), v(-2, 0, 1), wood)
            .add_box(v(2, 0, 0), v(3, 0, 1), wood);
        let stand = b.build().at(Vec3::new(0.0, 0.5, -5.5));

        let rim = Material::voxel(0x1a1a1a);
        let mut f = VoxelBuilder::with_size(0.3);
        f.add_box(v(-3, 3, 0), v(3, 3, 0), rim)
            .add_box(v(-3, 1, 0), v(3, 1, 0), rim)
            .add_box(v(-3, 1, 0), v(-3, 3, 0), rim)
            .add_box(v(3, 1, 0), v(3, 3, 0), rim);
        let frame = f.build().at(Vec3::new(0.0, 0.5, -5.9));

        let glass = Material {
            color: Color::BLACK,
            emissive: Color::from_hex(0x222222),
            emissive_intensity: 0.8,
            roughness: 0.3,
            metalness: 0.5,
            ..Default::default()
        };
        let (w, h) = TV_SCREEN_SIZE;
        let screen = Panel::new(w, h, Quat::IDENTITY, TV_SCREEN_POSITION, glass);
        Self { stand, frame, screen }
    }

    /// Cartoon quad, a hair in front of the dark glass.
    pub fn picture_transform(&self) -> Mat4 {
        Mat4::from_translation(Vec3::new(0.0, 0.0, 0.01)) * self.screen.transform
    }
}

impl Default for TvUnit {
    fn default() -> Self {
        Self::new()
    }
}

pub fn ceiling_light(position: Vec3) -> VoxelModel {
    let mut b = VoxelBuilder::with_size(0.3);
    b.add_box(v(-1, 0, -1), v(1, 0, 1), Material::voxel(0x8B8680));
    b.set_size(0.4).add_block(v(0, -1, 0), Material::emissive(0xffe4b5, 2.0));
    b.build().at(position)
}

pub fn wall_frame(color: u32) -> VoxelModel {
    let wood = Material::voxel(0x654321);
    let mut b = VoxelBuilder::with_size(0.2);
    b.add_box(v(-2, -2, 0), v(2, -2, 0), wood)
        .add_box(v(-2, 2, 0), v(2, 2, 0), wood)
        .add_box(v(-2, -2, 0), v(-2, 2, 0), wood)
        .add_box(v(2, -2, 0), v(2, 2, 0), wood);
    b.set_size(0.15).add_box(v(-1, -1, 0), v(1, 1, 0), Material::voxel(color));
    b.build()
}

/// Every static piece of the living room.
pub struct LivingRoom {
    pub panels: Vec<Panel>,
    pub models: Vec<VoxelModel>,
    pub tv: TvUnit,
    pub rug: Mat4,
}

impl Default for LivingRoom {
    fn default() -> Self {
        Self::new()
    }
}

impl LivingRoom {
    pub fn new() -> Self {
        let tv = TvUnit::new();
        let models = vec![
            sofa(),
            coffee_table(),
            bookshelf(),
            plant(),
            tv.stand.clone(),
            tv.frame.clone(),
            ceiling_light(Vec3::new(-3.0, 6.0, 0.0)),
            ceiling_light(Vec3::new(3.0, 6.0, 2.0)),
            wall_frame(0xff6b6b).at(Vec3::new(-7.0, 4.0, -7.8)),
            wall_frame(0x4ecdc4).at(Vec3::new(7.0, 4.0, -7.8)),
            wall_frame(0xffe66d).at(Vec3::new(-9.8, 4.0, 2.0)).rotated(FRAC_PI_2),
        ];
        Self { panels: room(), models, tv, rug: rug_transform() }
    }

    pub fn voxel_count(&self) -> usize {
        self.models.iter().map(|m| m.voxels.len()).sum()
    }

    /// Queue the room. `screen` shows on the TV, `rug` on the floor.
    pub fn draw(&self, engine: &mut Engine, screen: Option<TextureId>, rug: Option<TextureId>) {
        for panel in &self.panels {
            engine.draw_mesh(MeshKind::Plane, panel.transform, &panel.material);
        }
        for model in &self.models {
            model.draw(engine);
        }
        engine.draw_mesh(MeshKind::Plane, self.tv.screen.transform, &self.tv.screen.material);
        if let Some(texture) = screen {
            engine.draw_quad(texture, self.tv.picture_transform(), Color::WHITE);
        }
        if let Some(texture) = rug {
            // Unlit quad; darkened to sit with the lit floor.
            engine.draw_quad(texture, self.rug, Color::rgba(0.85, 0.85, 0.85, 1.0));
        }
    }
}
