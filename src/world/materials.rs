use crate::engine::Color;

/// Surface description for the lit mesh pipeline.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct Material {
    pub color: Color,
    pub opacity: f32,
    pub emissive: Color,
    pub emissive_intensity: f32,
    pub roughness: f32,
    pub metalness: f32,
    /// Skip lighting and fog shading; the colour is drawn as-is.
    pub unlit: bool,
}

impl Default for Material {
    fn default() -> Self {
        Self {
            color: Color::WHITE,
            opacity: 1.0,
            emissive: Color::BLACK,
            emissive_intensity: 0.0,
            roughness: 0.8,
            metalness: 0.0,
            unlit: false,
        }
    }
}

impl Material {
    /// Matte block material used by most furniture.
    pub fn voxel(color: u32) -> Self {
        Self { color: Color::from_hex(color), roughness: 0.8, metalness: 0.1, ..Default::default() }
    }

    /// Glows in its own colour, independent of scene lights.
    pub fn emissive(color: u32, intensity: f32) -> Self {
        let color = Color::from_hex(color);
        Self {
            color,
            emissive: color,
            emissive_intensity: intensity,
            roughness: 0.5,
            ..Default::default()
        }
    }

    pub fn wood() -> Self {
        Self { color: Color::from_hex(0x8B4513), roughness: 0.9, ..Default::default() }
    }

    pub fn fabric(color: u32) -> Self {
        Self { color: Color::from_hex(color), roughness: 1.0, ..Default::default() }
    }

    pub fn glass() -> Self {
        Self { color: Color::WHITE, roughness: 0.1, opacity: 0.5, ..Default::default() }
    }

    /// Flat colour for dream visuals (`MeshBasicMaterial` style).
    pub fn basic(color: Color) -> Self {
        Self { color: color.with_alpha(1.0), opacity: color.alpha(), unlit: true, ..Default::default() }
    }

    pub fn with_opacity(mut self, opacity: f32) -> Self {
        self.opacity = opacity.clamp(0.0, 1.0);
        self
    }

    pub fn with_emissive(mut self, color: Color, intensity: f32) -> Self {
        self.emissive = color;
        self.emissive_intensity = intensity;
        self
    }

    pub fn with_roughness(mut self, roughness: f32) -> Self {
        self.roughness = roughness;
        self
    }

    pub fn with_metalness(mut self, metalness: f32) -> Self {
        self.metalness = metalness;
        self
    }
}
