pub mod mesh;
pub mod mesh_pipeline;
pub mod particle_pipeline;
pub mod texture_pipeline;

use std::sync::Arc;

use wgpu::util::DeviceExt;
use winit::dpi::PhysicalSize;
use winit::window::Window;

use mesh::{MeshKind, MeshLibrary};
use mesh_pipeline::{InstanceRaw, MeshPipeline, SceneUniform, create_mesh_pipeline};
use particle_pipeline::{ColorVertex, ParticlePipeline, create_particle_pipeline};
use texture_pipeline::{DynamicTexture, TexturePipeline, TexturedVertex, create_texture_pipeline};

use crate::camera::CameraUniform;
use crate::engine::Color;
use crate::error::RenderError;

const DEPTH_FORMAT: wgpu::TextureFormat = wgpu::TextureFormat::Depth32Float;

/// Handle to a texture created with `Renderer::create_texture`.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub struct TextureId(pub usize);

/// Everything queued for one frame.
#[derive(Default)]
pub struct FrameData {
    pub opaque: Vec<(MeshKind, InstanceRaw)>,
    /// Instances with their squared distance from the eye.
    pub transparent: Vec<(MeshKind, InstanceRaw, f32)>,
    pub lines: Vec<ColorVertex>,
    pub particles: Vec<ColorVertex>,
    pub quads: Vec<(TextureId, [TexturedVertex; 6])>,
    pub overlay: Option<TextureId>,
}

impl FrameData {
    pub fn clear(&mut self) {
        self.opaque.clear();
        self.transparent.clear();
        self.lines.clear();
        self.particles.clear();
        self.quads.clear();
        self.overlay = None;
    }
}

struct GpuMesh {
    vertex_buffer: wgpu::Buffer,
    index_buffer: wgpu::Buffer,
    index_count: u32,
}

/// FNV-1a 64-bit hash, used to detect unchanged texture uploads.
pub(crate) fn fnv1a_64(data: &[u8]) -> u64 {
    data.iter().fold(14695981039346656037u64, |h, &b| {
        h.wrapping_mul(1099511628211) ^ b as u64
    })
}

/// Sort key grouping opaque instances by mesh so each mesh is one draw call.
fn group_by_mesh(instances: &mut [(MeshKind, InstanceRaw)]) -> Vec<(MeshKind, std::ops::Range<u32>)> {
    instances.sort_by_key(|(kind, _)| *kind);
    let mut ranges: Vec<(MeshKind, std::ops::Range<u32>)> = Vec::new();
    for (i, (kind, _)) in instances.iter().enumerate() {
        let i = i as u32;
        match ranges.last_mut() {
            Some((k, range)) if k == kind => range.end = i + 1,
            _ => ranges.push((*kind, i..i + 1)),
        }
    }
    ranges
}

pub struct Renderer {
    pub window: Arc<Window>,
    surface: wgpu::Surface<'static>,
    pub(crate) device: wgpu::Device,
    pub(crate) queue: wgpu::Queue,
    config: wgpu::SurfaceConfiguration,
    depth_view: wgpu::TextureView,
    mesh_pipeline: MeshPipeline,
    particle_pipeline: ParticlePipeline,
    texture_pipeline: TexturePipeline,
    meshes: MeshLibrary,
    gpu_meshes: Vec<GpuMesh>,
    scene_buffer: wgpu::Buffer,
    scene_bind_group: wgpu::BindGroup,
    /// Static orthographic projection (no camera), used by the overlay pass.
    projection_buffer: wgpu::Buffer,
    projection_bind_group: wgpu::BindGroup,
    /// Camera view-projection buffer for the unlit world passes.
    camera_buffer: wgpu::Buffer,
    camera_bind_group: wgpu::BindGroup,
    textures: Vec<Option<DynamicTexture>>,
}

fn create_depth_view(device: &wgpu::Device, config: &wgpu::SurfaceConfiguration) -> wgpu::TextureView {
    let texture = device.create_texture(&wgpu::TextureDescriptor {
        label: Some("depth_texture"),
        size: wgpu::Extent3d {
            width: config.width,
            height: config.height,
            depth_or_array_layers: 1,
        },
        mip_level_count: 1,
        sample_count: 1,
        dimension: wgpu::TextureDimension::D2,
        format: DEPTH_FORMAT,
        usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
        view_formats: &[],
    });
    texture.create_view(&wgpu::TextureViewDescriptor::default())
}

impl Renderer {
    pub async fn new(window: Arc<Window>) -> Result<Self, RenderError> {
        let size = window.inner_size();

        let instance = wgpu::Instance::default();
        let surface = instance.create_surface(Arc::clone(&window))?;

        let adapter = instance
            .request_adapter(&wgpu::RequestAdapterOptions {
                compatible_surface: Some(&surface),
                ..Default::default()
            })
            .await?;

        let (device, queue) = adapter.request_device(&wgpu::DeviceDescriptor::default()).await?;

        let caps = surface.get_capabilities(&adapter);
        // Shaders output linear colour and rely on an sRGB target.
        let format = caps
            .formats
            .iter()
            .copied()
            .find(|f| f.is_srgb())
            .or_else(|| caps.formats.first().copied())
            .ok_or(RenderError::NoSurfaceFormat)?;
        let alpha_mode = caps
            .alpha_modes
            .first()
            .copied()
            .unwrap_or(wgpu::CompositeAlphaMode::Auto);

        let config = wgpu::SurfaceConfiguration {
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
            format,
            width: size.width.max(1),
            height: size.height.max(1),
            present_mode: wgpu::PresentMode::AutoVsync,
            alpha_mode,
            view_formats: vec![],
            desired_maximum_frame_latency: 2,
        };
        surface.configure(&device, &config);
        log::info!("renderer ready: {:?}, {}x{}", format, config.width, config.height);

        let depth_view = create_depth_view(&device, &config);
        let mesh_pipeline = create_mesh_pipeline(&device, format, DEPTH_FORMAT);
        let texture_pipeline = create_texture_pipeline(&device, format, DEPTH_FORMAT);
        let particle_pipeline = create_particle_pipeline(
            &device,
            format,
            DEPTH_FORMAT,
            &texture_pipeline.camera_bind_group_layout,
        );

        let meshes = MeshLibrary::new();
        let gpu_meshes = MeshKind::ALL
            .iter()
            .map(|kind| {
                let data = meshes.get(*kind);
                GpuMesh {
                    vertex_buffer: device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
                        label: Some("mesh_vertex_buffer"),
                        contents: bytemuck::cast_slice(&data.vertices),
                        usage: wgpu::BufferUsages::VERTEX,
                    }),
                    index_buffer: device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
                        label: Some("mesh_index_buffer"),
                        contents: bytemuck::cast_slice(&data.indices),
                        usage: wgpu::BufferUsages::INDEX,
                    }),
                    index_count: data.indices.len() as u32,
                }
            })
            .collect();

        let scene_buffer = device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("scene_buffer"),
            size: std::mem::size_of::<SceneUniform>() as u64,
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
            mapped_at_creation: false,
        });
        let scene_bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("scene_bg"),
            layout: &mesh_pipeline.scene_bind_group_layout,
            entries: &[wgpu::BindGroupEntry {
                binding: 0,
                resource: scene_buffer.as_entire_binding(),
            }],
        });

        // ── Static overlay projection buffer (no camera transform) ────────
        let proj = CameraUniform::identity_ortho(config.width as f32, config.height as f32);
        let projection_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("projection_buffer"),
            contents: bytemuck::cast_slice(&[proj]),
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
        });
        let projection_bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("projection_bg"),
            layout: &texture_pipeline.camera_bind_group_layout,
            entries: &[wgpu::BindGroupEntry {
                binding: 0,
                resource: projection_buffer.as_entire_binding(),
            }],
        });

        // ── Camera view-projection buffer (world passes) ──────────────────
        let camera_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("camera_buffer"),
            contents: bytemuck::cast_slice(&[proj]),
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
        });
        let camera_bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("camera_bg"),
            layout: &texture_pipeline.camera_bind_group_layout,
            entries: &[wgpu::BindGroupEntry {
                binding: 0,
                resource: camera_buffer.as_entire_binding(),
            }],
        });

        Ok(Self {
            window,
            surface,
            device,
            queue,
            config,
            depth_view,
            mesh_pipeline,
            particle_pipeline,
            texture_pipeline,
            meshes,
            gpu_meshes,
            scene_buffer,
            scene_bind_group,
            projection_buffer,
            projection_bind_group,
            camera_buffer,
            camera_bind_group,
            textures: Vec::new(),
        })
    }

    pub fn resize(&mut self, new_size: PhysicalSize<u32>) {
        if new_size.width == 0 || new_size.height == 0 {
            return;
        }
        self.config.width = new_size.width;
        self.config.height = new_size.height;
        self.surface.configure(&self.device, &self.config);
        self.depth_view = create_depth_view(&self.device, &self.config);

        // Keep the overlay projection up-to-date with the window size.
        let proj = CameraUniform::identity_ortho(new_size.width as f32, new_size.height as f32);
        self.queue
            .write_buffer(&self.projection_buffer, 0, bytemuck::cast_slice(&[proj]));
    }

    pub fn mesh_library(&self) -> &MeshLibrary {
        &self.meshes
    }

    // ── Textures ─────────────────────────────────────────────────────────

    /// Allocate a texture, reusing a freed slot when one exists.
    pub fn create_texture(&mut self, width: u32, height: u32) -> TextureId {
        let texture = DynamicTexture::new(
            &self.device,
            &self.texture_pipeline.texture_bind_group_layout,
            width,
            height,
        );
        match self.textures.iter().position(Option::is_none) {
            Some(slot) => {
                self.textures[slot] = Some(texture);
                TextureId(slot)
            }
            None => {
                self.textures.push(Some(texture));
                TextureId(self.textures.len() - 1)
            }
        }
    }

    pub fn upload_texture(&mut self, id: TextureId, rgba: &[u8]) {
        match self.textures.get_mut(id.0).and_then(Option::as_mut) {
            Some(texture) => texture.upload(&self.queue, rgba),
            None => log::warn!("upload to unknown texture {:?}", id),
        }
    }

    pub fn destroy_texture(&mut self, id: TextureId) {
        if let Some(slot) = self.textures.get_mut(id.0) {
            *slot = None;
        }
    }

    fn texture(&self, id: TextureId) -> Option<&DynamicTexture> {
        self.textures.get(id.0).and_then(Option::as_ref)
    }

    /// Render one frame.
    ///
    /// Draw order within the single render pass:
    /// 1. opaque meshes, instanced per mesh kind        [scene]
    /// 2. world quads (TV, rug, floating words)         [camera]
    /// 3. transparent meshes, far to near               [scene]
    /// 4. wireframe lines                               [camera]
    /// 5. additive particles                            [camera]
    /// 6. overlay (HUD), always on top                  [screen]
    pub fn render(
        &mut self,
        frame: &FrameData,
        scene: &SceneUniform,
        background: Color,
    ) -> Result<(), wgpu::SurfaceError> {
        let surface_texture = self.surface.get_current_texture()?;
        let view = surface_texture
            .texture
            .create_view(&wgpu::TextureViewDescriptor::default());

        self.queue.write_buffer(&self.scene_buffer, 0, bytemuck::bytes_of(scene));
        let camera = CameraUniform { view_proj: scene.view_proj };
        self.queue.write_buffer(&self.camera_buffer, 0, bytemuck::bytes_of(&camera));

        let mut opaque = frame.opaque.clone();
        let opaque_groups = group_by_mesh(&mut opaque);
        let opaque_instances: Vec<InstanceRaw> = opaque.iter().map(|(_, i)| *i).collect();

        let mut transparent = frame.transparent.clone();
        transparent.sort_by(|a, b| b.2.total_cmp(&a.2));
        let transparent_instances: Vec<InstanceRaw> = transparent.iter().map(|(_, i, _)| *i).collect();

        let instance_buffer = |label: &str, data: &[InstanceRaw]| {
            self.device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
                label: Some(label),
                contents: bytemuck::cast_slice(data),
                usage: wgpu::BufferUsages::VERTEX,
            })
        };
        let opaque_buffer = (!opaque_instances.is_empty())
            .then(|| instance_buffer("opaque_instance_buffer", &opaque_instances));
        let transparent_buffer = (!transparent_instances.is_empty())
            .then(|| instance_buffer("transparent_instance_buffer", &transparent_instances));

        let quad_vertices: Vec<TexturedVertex> = frame.quads.iter().flat_map(|(_, v)| v.iter().copied()).collect();
        let quad_buffer = (!quad_vertices.is_empty()).then(|| {
            self.device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
                label: Some("quad_vertex_buffer"),
                contents: bytemuck::cast_slice(&quad_vertices),
                usage: wgpu::BufferUsages::VERTEX,
            })
        });

        let color_buffer = |label: &str, data: &[ColorVertex]| {
            (!data.is_empty()).then(|| {
                self.device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
                    label: Some(label),
                    contents: bytemuck::cast_slice(data),
                    usage: wgpu::BufferUsages::VERTEX,
                })
            })
        };
        let line_buffer = color_buffer("line_vertex_buffer", &frame.lines);
        let particle_buffer = color_buffer("particle_vertex_buffer", &frame.particles);

        let overlay_buffer = frame.overlay.and_then(|id| self.texture(id)).map(|_| {
            let (w, h) = (self.config.width as f32, self.config.height as f32);
            let v = |x: f32, y: f32, u: f32, t: f32| TexturedVertex {
                position: [x, y, 0.0],
                uv: [u, t],
                color: [1.0; 4],
            };
            let verts = [
                v(0.0, 0.0, 0.0, 0.0),
                v(0.0, h, 0.0, 1.0),
                v(w, 0.0, 1.0, 0.0),
                v(w, 0.0, 1.0, 0.0),
                v(0.0, h, 0.0, 1.0),
                v(w, h, 1.0, 1.0),
            ];
            self.device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
                label: Some("overlay_vertex_buffer"),
                contents: bytemuck::cast_slice(&verts),
                usage: wgpu::BufferUsages::VERTEX,
            })
        });

        let mut encoder = self
            .device
            .create_command_encoder(&wgpu::CommandEncoderDescriptor { label: None });

        {
            let [r, g, b, _] = background.to_linear();
            let mut pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
                label: Some("main_pass"),
                color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                    view: &view,
                    resolve_target: None,
                    depth_slice: None,
                    ops: wgpu::Operations {
                        load: wgpu::LoadOp::Clear(wgpu::Color {
                            r: r as f64,
                            g: g as f64,
                            b: b as f64,
                            a: 1.0,
                        }),
                        store: wgpu::StoreOp::Store,
                    },
                })],
                depth_stencil_attachment: Some(wgpu::RenderPassDepthStencilAttachment {
                    view: &self.depth_view,
                    depth_ops: Some(wgpu::Operations {
                        load: wgpu::LoadOp::Clear(1.0),
                        store: wgpu::StoreOp::Store,
                    }),
                    stencil_ops: None,
                }),
                timestamp_writes: None,
                occlusion_query_set: None,
                multiview_mask: None,
            });

            // ── Pass 1: opaque meshes [scene] ─────────────────────────────
            if let Some(buf) = &opaque_buffer {
                pass.set_pipeline(&self.mesh_pipeline.opaque);
                pass.set_bind_group(0, &self.scene_bind_group, &[]);
                pass.set_vertex_buffer(1, buf.slice(..));
                for (kind, range) in &opaque_groups {
                    let mesh = &self.gpu_meshes[kind.index()];
                    pass.set_vertex_buffer(0, mesh.vertex_buffer.slice(..));
                    pass.set_index_buffer(mesh.index_buffer.slice(..), wgpu::IndexFormat::Uint32);
                    pass.draw_indexed(0..mesh.index_count, 0, range.clone());
                }
            }

            // ── Pass 2: world quads [camera] ──────────────────────────────
            if let Some(buf) = &quad_buffer {
                pass.set_pipeline(&self.texture_pipeline.world_pipeline);
                pass.set_bind_group(0, &self.camera_bind_group, &[]);
                pass.set_vertex_buffer(0, buf.slice(..));
                for (i, (id, _)) in frame.quads.iter().enumerate() {
                    if let Some(texture) = self.texture(*id) {
                        let start = (i * 6) as u32;
                        pass.set_bind_group(1, &texture.bind_group, &[]);
                        pass.draw(start..start + 6, 0..1);
                    }
                }
            }

            // ── Pass 3: transparent meshes, back to front [scene] ─────────
            if let Some(buf) = &transparent_buffer {
                pass.set_pipeline(&self.mesh_pipeline.transparent);
                pass.set_bind_group(0, &self.scene_bind_group, &[]);
                pass.set_vertex_buffer(1, buf.slice(..));
                for (i, (kind, _, _)) in transparent.iter().enumerate() {
                    let mesh = &self.gpu_meshes[kind.index()];
                    let i = i as u32;
                    pass.set_vertex_buffer(0, mesh.vertex_buffer.slice(..));
                    pass.set_index_buffer(mesh.index_buffer.slice(..), wgpu::IndexFormat::Uint32);
                    pass.draw_indexed(0..mesh.index_count, 0, i..i + 1);
                }
            }

            // ── Pass 4: lines [camera] ────────────────────────────────────
            if let Some(buf) = &line_buffer {
                pass.set_pipeline(&self.particle_pipeline.line_pipeline);
                pass.set_bind_group(0, &self.camera_bind_group, &[]);
                pass.set_vertex_buffer(0, buf.slice(..));
                pass.draw(0..frame.lines.len() as u32, 0..1);
            }

            // ── Pass 5: particles [camera] ────────────────────────────────
            if let Some(buf) = &particle_buffer {
                pass.set_pipeline(&self.particle_pipeline.particle_pipeline);
                pass.set_bind_group(0, &self.camera_bind_group, &[]);
                pass.set_vertex_buffer(0, buf.slice(..));
                pass.draw(0..frame.particles.len() as u32, 0..1);
            }

            // ── Pass 6: overlay [screen] ──────────────────────────────────
            if let (Some(buf), Some(texture)) = (&overlay_buffer, frame.overlay.and_then(|id| self.texture(id))) {
                pass.set_pipeline(&self.texture_pipeline.overlay_pipeline);
                pass.set_bind_group(0, &self.projection_bind_group, &[]);
                pass.set_bind_group(1, &texture.bind_group, &[]);
                pass.set_vertex_buffer(0, buf.slice(..));
                pass.draw(0..6, 0..1);
            }
        }

        self.queue.submit(std::iter::once(encoder.finish()));
        surface_texture.present();
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn instance() -> InstanceRaw {
        InstanceRaw { model: [[0.0; 4]; 4], color: [1.0; 4], emissive: [0.0; 4], params: [0.0; 4] }
    }

    #[test]
    fn grouping_merges_same_mesh_into_one_range() {
        let mut items = vec![
            (MeshKind::Sphere, instance()),
            (MeshKind::Cube, instance()),
            (MeshKind::Sphere, instance()),
            (MeshKind::Cube, instance()),
            (MeshKind::Torus, instance()),
        ];
        let groups = group_by_mesh(&mut items);
        assert_eq!(groups, vec![
            (MeshKind::Cube, 0..2),
            (MeshKind::Sphere, 2..4),
            (MeshKind::Torus, 4..5),
        ]);
    }

    #[test]
    fn fnv_differs_for_different_bytes() {
        assert_ne!(fnv1a_64(&[1, 2, 3]), fnv1a_64(&[3, 2, 1]));
        assert_eq!(fnv1a_64(&[]), 14695981039346656037);
    }
}
