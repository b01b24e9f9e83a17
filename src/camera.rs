use glam::{Mat4, Vec3};

/// Camera uniform uploaded to the GPU: the combined view-projection matrix.
#[repr(C)]
#[derive(Copy, Clone, bytemuck::Pod, bytemuck::Zeroable)]
pub struct CameraUniform {
    /// Column-major 4×4 view-projection matrix sent to the vertex shader.
    pub view_proj: [[f32; 4]; 4],
}

impl CameraUniform {
    pub fn from_matrix(m: Mat4) -> Self {
        Self { view_proj: m.to_cols_array_2d() }
    }

    /// Plain orthographic projection (no camera transform).
    /// Maps pixel coords [0..w] × [0..h] directly to clip space.
    /// Used for the overlay pass so that the HUD is always screen-fixed.
    pub fn identity_ortho(width: f32, height: f32) -> Self {
        let sx = 2.0 / width;
        let sy = -2.0 / height;
        Self {
            view_proj: [
                [sx,   0.0,  0.0, 0.0], // col0
                [0.0,  sy,   0.0, 0.0], // col1
                [0.0,  0.0,  1.0, 0.0], // col2
                [-1.0, 1.0,  0.0, 1.0], // col3
            ],
        }
    }
}

pub const MIN_POLAR: f32 = std::f32::consts::PI / 8.0;
pub const MAX_POLAR: f32 = std::f32::consts::FRAC_PI_2 + 0.2;
pub const MIN_DISTANCE: f32 = 5.0;
pub const MAX_DISTANCE: f32 = 30.0;

/// Perspective camera orbiting a target point with damped rotation and zoom.
///
/// `azimuth` is measured around +Y from +Z toward +X; `polar` is the angle
/// from +Y, so `polar = π/2` looks horizontally.
#[derive(Clone, Debug)]
pub struct OrbitCamera {
    pub target: Vec3,
    pub azimuth: f32,
    pub polar: f32,
    pub distance: f32,
    /// Vertical field of view in degrees.
    pub fov: f32,
    pub near: f32,
    pub far: f32,
    /// Fraction of the orbit velocity lost per 60 Hz frame.
    pub damping: f32,
    /// Per-frame displacement added to the eye (temporal shake).
    pub jitter: Vec3,
    azimuth_velocity: f32,
    polar_velocity: f32,
    zoom_velocity: f32,
}

impl Default for OrbitCamera {
    fn default() -> Self {
        Self::looking_at(Vec3::new(8.0, 6.0, 12.0), Vec3::new(0.0, 2.0, 0.0))
    }
}

impl OrbitCamera {
    /// Camera at `eye` orbiting `target`, with limits applied.
    pub fn looking_at(eye: Vec3, target: Vec3) -> Self {
        let offset = eye - target;
        let distance = offset.length().max(f32::EPSILON);
        let mut camera = Self {
            target,
            azimuth: offset.x.atan2(offset.z),
            polar: (offset.y / distance).clamp(-1.0, 1.0).acos(),
            distance,
            fov: 60.0,
            near: 0.1,
            far: 1000.0,
            damping: 0.05,
            jitter: Vec3::ZERO,
            azimuth_velocity: 0.0,
            polar_velocity: 0.0,
            zoom_velocity: 0.0,
        };
        camera.clamp();
        camera
    }

    pub fn eye(&self) -> Vec3 {
        let (sp, cp) = self.polar.sin_cos();
        let (sa, ca) = self.azimuth.sin_cos();
        self.target + Vec3::new(sp * sa, cp, sp * ca) * self.distance + self.jitter
    }

    /// Queue an orbit by the given angles (radians), applied with damping.
    pub fn rotate(&mut self, d_azimuth: f32, d_polar: f32) {
        self.azimuth_velocity += d_azimuth;
        self.polar_velocity += d_polar;
    }

    /// Positive `steps` move closer.
    pub fn zoom(&mut self, steps: f32) {
        self.zoom_velocity -= steps * 0.5;
    }

    /// Apply queued motion for `dt` seconds and bleed off velocity.
    pub fn tick(&mut self, dt: f32) {
        let frames = (dt * 60.0).max(0.0);
        // Velocity left after `frames` steps of per-frame damping; the rest is applied.
        let keep = if self.damping > 0.0 { (1.0 - self.damping).clamp(0.0, 1.0).powf(frames) } else { 0.0 };
        let applied = 1.0 - keep;

        self.azimuth += self.azimuth_velocity * applied;
        self.polar += self.polar_velocity * applied;
        self.distance += self.zoom_velocity * applied;
        self.azimuth_velocity *= keep;
        self.polar_velocity *= keep;
        self.zoom_velocity *= keep;
        self.clamp();
    }

    fn clamp(&mut self) {
        self.polar = self.polar.clamp(MIN_POLAR, MAX_POLAR);
        self.distance = self.distance.clamp(MIN_DISTANCE, MAX_DISTANCE);
    }

    pub fn view(&self) -> Mat4 {
        Mat4::look_at_rh(self.eye(), self.target + self.jitter, Vec3::Y)
    }

    pub fn projection(&self, aspect: f32) -> Mat4 {
        Mat4::perspective_rh(self.fov.to_radians(), aspect.max(1e-3), self.near, self.far)
    }

    pub fn view_proj(&self, aspect: f32) -> Mat4 {
        self.projection(aspect) * self.view()
    }

    /// World-space right and up vectors of the view plane.
    pub fn billboard_axes(&self) -> (Vec3, Vec3) {
        let forward = (self.target - self.eye()).normalize_or_zero();
        let right = forward.cross(Vec3::Y).normalize_or(Vec3::X);
        let up = right.cross(forward).normalize_or(Vec3::Y);
        (right, up)
    }

    pub fn uniform(&self, aspect: f32) -> CameraUniform {
        CameraUniform::from_matrix(self.view_proj(aspect))
    }
}
