use std::f32::consts::FRAC_PI_2;

use dreamroom::engine::{Color, Fog};
use dreamroom::world::furniture::{
    coffee_table, rug_texture, room, sofa, wall_frame, RUG_TEXTURE_SIZE, TV_SCREEN_POSITION,
};
use dreamroom::world::lighting::{room_fog, room_lighting, BACKGROUND, TV_GLOW};
use dreamroom::world::voxel::DEFAULT_VOXEL_SIZE;
use dreamroom::world::{LivingRoom, Material, TvUnit, VoxelBuilder};
use glam::{IVec3, Vec3};

fn close(a: Vec3, b: Vec3) -> bool {
    (a - b).length() < 1e-4
}

fn pixel(data: &[u8], width: u32, x: u32, y: u32) -> [u8; 4] {
    let i = ((y * width + x) * 4) as usize;
    [data[i], data[i + 1], data[i + 2], data[i + 3]]
}

// ── Voxel builder ────────────────────────────────────────────────────────────

#[test]
fn blocks_scale_with_active_size() {
    let mut b = VoxelBuilder::new();
    b.add_block(IVec3::new(2, 0, 0), Material::wood());
    b.set_size(0.2).add_block(IVec3::new(2, 0, 0), Material::wood());
    b.reset_size().add_block(IVec3::new(0, 1, 0), Material::wood());

    let model = b.build();
    assert_eq!(model.voxels.len(), 3);
    assert_eq!(model.voxels[0].size, DEFAULT_VOXEL_SIZE);
    assert!(close(model.voxels[0].position, Vec3::new(1.0, 0.0, 0.0)));
    assert!(close(model.voxels[1].position, Vec3::new(0.4, 0.0, 0.0)));
    assert_eq!(model.voxels[2].size, DEFAULT_VOXEL_SIZE);
}

#[test]
fn boxes_are_inclusive_in_any_corner_order() {
    let mut b = VoxelBuilder::new();
    b.add_box(IVec3::new(1, 1, 1), IVec3::new(-1, -1, -1), Material::wood());
    assert_eq!(b.len(), 27);
    b.clear();
    assert!(b.is_empty());
    b.add_hollow_box(IVec3::new(-1, -1, -1), IVec3::new(1, 1, 1), Material::wood());
    assert_eq!(b.len(), 26);
}

#[test]
fn flat_hollow_box_keeps_every_cell() {
    let mut b = VoxelBuilder::new();
    b.add_hollow_box(IVec3::new(0, 0, 0), IVec3::new(3, 3, 0), Material::wood());
    assert_eq!(b.len(), 16);
}

#[test]
fn lines_terminate_on_uneven_slopes() {
    let mut b = VoxelBuilder::with_size(1.0);
    b.add_line(IVec3::ZERO, IVec3::new(3, 1, 0), Material::wood());
    let positions: Vec<Vec3> = b.build().voxels.iter().map(|v| v.position).collect();
    assert_eq!(
        positions,
        vec![Vec3::new(0.0, 0.0, 0.0), Vec3::new(1.0, 1.0, 0.0), Vec3::new(2.0, 1.0, 0.0), Vec3::new(3.0, 1.0, 0.0)]
    );

    b.clear().add_line(IVec3::new(2, 2, 2), IVec3::new(2, 2, 2), Material::wood());
    assert_eq!(b.len(), 1);
    b.clear().add_line(IVec3::new(0, 5, 0), IVec3::new(0, 0, 0), Material::wood());
    assert_eq!(b.len(), 6);
}

#[test]
fn model_placement_rotates_about_y() {
    let mut b = VoxelBuilder::new();
    b.add_block(IVec3::new(2, 0, 0), Material::wood());
    let model = b.build().at(Vec3::new(0.0, 0.0, 5.0)).rotated(FRAC_PI_2);
    let (transform, material) = model.instances().next().unwrap();
    assert!(close(transform.transform_point3(Vec3::ZERO), Vec3::new(0.0, 0.0, 4.0)));
    assert_eq!(*material, Material::wood());
}

// ── Materials ────────────────────────────────────────────────────────────────

#[test]
fn material_presets() {
    let glow = Material::emissive(0xffe4b5, 2.0);
    assert_eq!(glow.emissive, glow.color);
    assert_eq!(glow.emissive_intensity, 2.0);
    assert!(!glow.unlit);

    let glass = Material::glass();
    assert!(glass.opacity < 1.0);
    assert_eq!(Material::voxel(0x123456).color, Color::from_hex(0x123456));
}

// ── Furniture ────────────────────────────────────────────────────────────────

#[test]
fn furniture_block_counts() {
    assert_eq!(sofa().voxels.len(), 84);
    assert_eq!(coffee_table().voxels.len(), 43);
    assert_eq!(wall_frame(0xff6b6b).voxels.len(), 20 + 9);
}

#[test]
fn room_shell_and_contents() {
    assert_eq!(room().len(), 5);
    let living = LivingRoom::new();
    assert_eq!(living.models.len(), 11);
    assert_eq!(living.voxel_count(), living.models.iter().map(|m| m.voxels.len()).sum::<usize>());
    assert!(living.voxel_count() > 200);
}

#[test]
fn tv_picture_sits_in_front_of_the_glass() {
    let tv = TvUnit::new();
    let glass = tv.screen.transform.transform_point3(Vec3::ZERO);
    let picture = tv.picture_transform().transform_point3(Vec3::ZERO);
    assert!(close(glass, TV_SCREEN_POSITION));
    assert!(picture.z > glass.z);
    assert!(close(picture - glass, Vec3::new(0.0, 0.0, 0.01)));
}

#[test]
fn rug_pattern() {
    let rug = rug_texture().unwrap();
    assert_eq!((rug.width(), rug.height()), (RUG_TEXTURE_SIZE, RUG_TEXTURE_SIZE));
    let data = rug.data();
    assert_eq!(pixel(data, RUG_TEXTURE_SIZE, 2, 2), [0x6b, 0x34, 0x10, 0xff]);
    assert_eq!(pixel(data, RUG_TEXTURE_SIZE, 20, 20), [0xa0, 0x52, 0x2d, 0xff]);
    assert_eq!(pixel(data, RUG_TEXTURE_SIZE, 40, 24), [0x8b, 0x45, 0x13, 0xff]);
}

// ── Lighting ─────────────────────────────────────────────────────────────────

#[test]
fn tv_glow_matches_the_screen() {
    let lighting = room_lighting();
    assert_eq!(lighting.points.len(), 3);
    assert_eq!(lighting.points[TV_GLOW].position, TV_SCREEN_POSITION);
    assert_eq!(lighting.points[TV_GLOW].color, Color::from_hex(0x6699ff));
    assert!(lighting.directional.is_some());
}

#[test]
fn room_fog_fades_to_background() {
    match room_fog() {
        Fog::Linear { color, near, far } => {
            assert_eq!(color, Color::from_hex(BACKGROUND));
            assert_eq!((near, far), (10.0, 50.0));
        }
        other => panic!("unexpected fog {other:?}"),
    }
}
