use glam::{Mat4, Vec3};

use crate::engine::{Fog, Lighting, MAX_POINT_LIGHTS};

use super::mesh::MeshVertex;

/// Per-instance data for the lit mesh pipeline.
#[repr(C)]
#[derive(Copy, Clone, Debug, bytemuck::Pod, bytemuck::Zeroable)]
pub struct InstanceRaw {
    pub model: [[f32; 4]; 4],
    /// Linear RGB + opacity.
    pub color: [f32; 4],
    /// Linear emissive RGB, already multiplied by intensity.
    pub emissive: [f32; 4],
    /// `[roughness, metalness, unlit, _]`.
    pub params: [f32; 4],
}

impl InstanceRaw {
    const ATTRIBS: [wgpu::VertexAttribute; 7] = wgpu::vertex_attr_array![
        2 => Float32x4, // model col0
        3 => Float32x4, // model col1
        4 => Float32x4, // model col2
        5 => Float32x4, // model col3
        6 => Float32x4, // color
        7 => Float32x4, // emissive
        8 => Float32x4, // params
    ];

    pub fn layout() -> wgpu::VertexBufferLayout<'static> {
        wgpu::VertexBufferLayout {
            array_stride: std::mem::size_of::<InstanceRaw>() as wgpu::BufferAddress,
            step_mode: wgpu::VertexStepMode::Instance,
            attributes: &Self::ATTRIBS,
        }
    }
}

#[repr(C)]
#[derive(Copy, Clone, Debug, Default, bytemuck::Pod, bytemuck::Zeroable)]
pub struct PointLightRaw {
    /// xyz position, w range.
    pub position: [f32; 4],
    /// Linear RGB times intensity.
    pub color: [f32; 4],
}

/// Everything the lit shader needs besides the instances.
#[repr(C)]
#[derive(Copy, Clone, Debug, bytemuck::Pod, bytemuck::Zeroable)]
pub struct SceneUniform {
    pub view_proj: [[f32; 4]; 4],
    pub camera_pos: [f32; 4],
    pub ambient: [f32; 4],
    /// Direction toward the directional light.
    pub sun_dir: [f32; 4],
    pub sun_color: [f32; 4],
    /// Linear RGB, w = mode (0 none, 1 linear, 2 exp2).
    pub fog_color: [f32; 4],
    /// `[near, far, density, exposure]`.
    pub fog_params: [f32; 4],
    pub light_count: [u32; 4],
    pub points: [PointLightRaw; MAX_POINT_LIGHTS],
}

impl SceneUniform {
    pub fn new(view_proj: Mat4, eye: Vec3, lighting: &Lighting, fog: &Fog) -> Self {
        let lin = |c: crate::engine::Color, k: f32| {
            let l = c.to_linear();
            [l[0] * k, l[1] * k, l[2] * k, 1.0]
        };

        let (sun_dir, sun_color) = match lighting.directional {
            Some(d) => {
                let dir = d.from.normalize_or(Vec3::Y);
                ([dir.x, dir.y, dir.z, 0.0], lin(d.color, d.intensity))
            }
            None => ([0.0, 1.0, 0.0, 0.0], [0.0; 4]),
        };

        let (fog_color, fog_params) = match *fog {
            Fog::None => ([0.0; 4], [0.0, 1.0, 0.0, lighting.exposure]),
            Fog::Linear { color, near, far } => {
                let c = color.to_linear();
                ([c[0], c[1], c[2], 1.0], [near, far.max(near + 1e-3), 0.0, lighting.exposure])
            }
            Fog::Exp2 { color, density } => {
                let c = color.to_linear();
                ([c[0], c[1], c[2], 2.0], [0.0, 1.0, density, lighting.exposure])
            }
        };

        let mut points = [PointLightRaw::default(); MAX_POINT_LIGHTS];
        let count = lighting.points.len().min(MAX_POINT_LIGHTS);
        for (slot, light) in points.iter_mut().zip(&lighting.points) {
            let p = light.position;
            *slot = PointLightRaw {
                position: [p.x, p.y, p.z, light.range.max(1e-3)],
                color: lin(light.color, light.intensity),
            };
        }

        Self {
            view_proj: view_proj.to_cols_array_2d(),
            camera_pos: [eye.x, eye.y, eye.z, 1.0],
            ambient: lin(lighting.ambient, lighting.ambient_intensity),
            sun_dir,
            sun_color,
            fog_color,
            fog_params,
            light_count: [count as u32, 0, 0, 0],
            points,
        }
    }
}

pub struct MeshPipeline {
    pub opaque: wgpu::RenderPipeline,
    /// Alpha-blended, depth-tested without depth writes.
    pub transparent: wgpu::RenderPipeline,
    pub scene_bind_group_layout: wgpu::BindGroupLayout,
}

pub fn create_mesh_pipeline(
    device: &wgpu::Device,
    surface_format: wgpu::TextureFormat,
    depth_format: wgpu::TextureFormat,
) -> MeshPipeline {
    let source = format!("{}\n{}", include_str!("shaders/scene.wgsl"), include_str!("shaders/mesh.wgsl"));
    let shader = device.create_shader_module(wgpu::ShaderModuleDescriptor {
        label: Some("mesh_shader"),
        source: wgpu::ShaderSource::Wgsl(source.into()),
    });

    let scene_bind_group_layout =
        device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("scene_bgl"),
            entries: &[wgpu::BindGroupLayoutEntry {
                binding: 0,
                visibility: wgpu::ShaderStages::VERTEX | wgpu::ShaderStages::FRAGMENT,
                ty: wgpu::BindingType::Buffer {
                    ty: wgpu::BufferBindingType::Uniform,
                    has_dynamic_offset: false,
                    min_binding_size: None,
                },
                count: None,
            }],
        });

    let pipeline_layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
        label: Some("mesh_pipeline_layout"),
        bind_group_layouts: &[&scene_bind_group_layout],
        ..Default::default()
    });

    let build = |label: &str, blend: wgpu::BlendState, depth_write: bool| {
        device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
            label: Some(label),
            layout: Some(&pipeline_layout),
            vertex: wgpu::VertexState {
                module: &shader,
                entry_point: Some("vs_main"),
                buffers: &[MeshVertex::layout(), InstanceRaw::layout()],
                compilation_options: Default::default(),
            },
            fragment: Some(wgpu::FragmentState {
                module: &shader,
                entry_point: Some("fs_main"),
                targets: &[Some(wgpu::ColorTargetState {
                    format: surface_format,
                    blend: Some(blend),
                    write_mask: wgpu::ColorWrites::ALL,
                })],
                compilation_options: Default::default(),
            }),
            primitive: wgpu::PrimitiveState {
                topology: wgpu::PrimitiveTopology::TriangleList,
                // Walls, rings and the ambience sphere are seen from both sides.
                cull_mode: None,
                ..Default::default()
            },
            depth_stencil: Some(wgpu::DepthStencilState {
                format: depth_format,
                depth_write_enabled: depth_write,
                depth_compare: wgpu::CompareFunction::LessEqual,
                stencil: wgpu::StencilState::default(),
                bias: wgpu::DepthBiasState::default(),
            }),
            multisample: wgpu::MultisampleState::default(),
            multiview_mask: None,
            cache: None,
        })
    };

    MeshPipeline {
        opaque: build("mesh_opaque_pipeline", wgpu::BlendState::REPLACE, true),
        transparent: build("mesh_transparent_pipeline", wgpu::BlendState::ALPHA_BLENDING, false),
        scene_bind_group_layout,
    }
}
