//! The living room: voxel builder, materials, furniture and light rig.

pub mod furniture;
pub mod lighting;
pub mod materials;
pub mod voxel;

pub use furniture::{LivingRoom, Panel, TvUnit};
pub use materials::Material;
pub use voxel::{Voxel, VoxelBuilder, VoxelModel};
