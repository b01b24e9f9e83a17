use glam::{IVec3, Mat4, Quat, Vec3};

use crate::engine::Engine;
use crate::renderer::mesh::MeshKind;

use super::Material;

pub const DEFAULT_VOXEL_SIZE: f32 = 0.5;

/// One cube: centred at `position`, edge length `size`.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct Voxel {
    pub position: Vec3,
    pub size: f32,
    pub material: Material,
}

/// Accumulates cube placements on an integer grid.
///
/// Grid coordinates are multiplied by the voxel size in effect when the
/// block is added, so blocks of different sizes share one origin.
#[derive(Clone, Debug)]
pub struct VoxelBuilder {
    voxels: Vec<Voxel>,
    default_size: f32,
    size: f32,
}

impl Default for VoxelBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl VoxelBuilder {
    pub fn new() -> Self {
        Self::with_size(DEFAULT_VOXEL_SIZE)
    }

    pub fn with_size(size: f32) -> Self {
        Self { voxels: Vec::new(), default_size: size, size }
    }

    /// Voxel size for the blocks added after this call.
    pub fn set_size(&mut self, size: f32) -> &mut Self {
        self.size = size;
        self
    }

    pub fn reset_size(&mut self) -> &mut Self {
        self.size = self.default_size;
        self
    }

    pub fn len(&self) -> usize {
        self.voxels.len()
    }

    pub fn is_empty(&self) -> bool {
        self.voxels.is_empty()
    }

    pub fn add_block(&mut self, at: IVec3, material: Material) -> &mut Self {
        self.voxels.push(Voxel {
            position: at.as_vec3() * self.size,
            size: self.size,
            material,
        });
        self
    }

    /// Blocks from `from` to `to` inclusive. Each axis steps toward its end
    /// and then holds, so non-diagonal slopes still terminate.
    pub fn add_line(&mut self, from: IVec3, to: IVec3, material: Material) -> &mut Self {
        let step = (to - from).signum();
        let mut at = from;
        loop {
            self.add_block(at, material);
            if at == to {
                break;
            }
            for axis in 0..3 {
                if at[axis] != to[axis] {
                    at[axis] += step[axis];
                }
            }
        }
        self
    }

    /// Filled box over the inclusive range between two corners.
    pub fn add_box(&mut self, a: IVec3, b: IVec3, material: Material) -> &mut Self {
        self.fill(a, b, material, |_| true)
    }

    /// Only the cells on the faces of the box.
    pub fn add_hollow_box(&mut self, a: IVec3, b: IVec3, material: Material) -> &mut Self {
        let (lo, hi) = (a.min(b), a.max(b));
        self.fill(a, b, material, |p| {
            (0..3).any(|axis| p[axis] == lo[axis] || p[axis] == hi[axis])
        })
    }

    fn fill<F>(&mut self, a: IVec3, b: IVec3, material: Material, keep: F) -> &mut Self
    where
        F: Fn(IVec3) -> bool,
    {
        let (lo, hi) = (a.min(b), a.max(b));
        for x in lo.x..=hi.x {
            for y in lo.y..=hi.y {
                for z in lo.z..=hi.z {
                    let p = IVec3::new(x, y, z);
                    if keep(p) {
                        self.add_block(p, material);
                    }
                }
            }
        }
        self
    }

    /// Snapshot of the current blocks as a placeable model.
    pub fn build(&self) -> VoxelModel {
        VoxelModel { voxels: self.voxels.clone(), position: Vec3::ZERO, yaw: 0.0 }
    }

    pub fn clear(&mut self) -> &mut Self {
        self.voxels.clear();
        self
    }
}

/// A built group of voxels with its own placement in the room.
#[derive(Clone, Debug, Default)]
pub struct VoxelModel {
    pub voxels: Vec<Voxel>,
    pub position: Vec3,
    /// Rotation about +Y, radians.
    pub yaw: f32,
}

impl VoxelModel {
    pub fn at(mut self, position: Vec3) -> Self {
        self.position = position;
        self
    }

    pub fn rotated(mut self, yaw: f32) -> Self {
        self.yaw = yaw;
        self
    }

    pub fn transform(&self) -> Mat4 {
        Mat4::from_rotation_translation(Quat::from_rotation_y(self.yaw), self.position)
    }

    /// World transform and material of every block.
    pub fn instances(&self) -> impl Iterator<Item = (Mat4, &Material)> + '_ {
        let parent = self.transform();
        self.voxels.iter().map(move |v| {
            let local = Mat4::from_scale_rotation_translation(Vec3::splat(v.size), Quat::IDENTITY, v.position);
            (parent * local, &v.material)
        })
    }

    pub fn draw(&self, engine: &mut Engine) {
        for (transform, material) in self.instances() {
            engine.draw_mesh(MeshKind::Cube, transform, material);
        }
    }
}
