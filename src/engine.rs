use std::collections::{HashMap, VecDeque};
use std::sync::Arc;
use std::time::Instant;

use glam::{Mat4, Vec2, Vec3};
use winit::application::ApplicationHandler;
use winit::event::{ElementState, KeyEvent, MouseButton, WindowEvent};
use winit::event_loop::{ActiveEventLoop, EventLoop};
pub use winit::keyboard::KeyCode;
use winit::keyboard::PhysicalKey;
use winit::window::WindowId;

use crate::audio::AudioContext;
use crate::camera::OrbitCamera;
use crate::input::InputState;
use crate::renderer::mesh::MeshKind;
use crate::renderer::mesh_pipeline::InstanceRaw;
use crate::renderer::particle_pipeline::ColorVertex;
use crate::renderer::texture_pipeline::TexturedVertex;
use crate::renderer::{FrameData, Renderer, TextureId};
use crate::window::{WindowConfig, enter_fullscreen, window_attributes};
use crate::world::Material;

/// Point lights beyond this count are ignored by the mesh shader.
pub const MAX_POINT_LIGHTS: usize = 8;

// ── Color ──────────────────────────────────────────────────────────────────

/// sRGB colour with straight alpha.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct Color(pub [f32; 4]);

impl Color {
    pub const WHITE: Self = Self([1.0, 1.0, 1.0, 1.0]);
    pub const BLACK: Self = Self([0.0, 0.0, 0.0, 1.0]);
    pub const GRAY: Self = Self([0.6, 0.6, 0.6, 1.0]);
    pub const DARK_GRAY: Self = Self([0.2, 0.2, 0.2, 1.0]);
    pub const TRANSPARENT: Self = Self([0.0, 0.0, 0.0, 0.0]);

    pub const fn rgba(r: f32, g: f32, b: f32, a: f32) -> Self {
        Self([r, g, b, a])
    }

    /// `0xRRGGBB`, opaque.
    pub fn from_hex(hex: u32) -> Self {
        let r = ((hex >> 16) & 0xff) as f32 / 255.0;
        let g = ((hex >> 8) & 0xff) as f32 / 255.0;
        let b = (hex & 0xff) as f32 / 255.0;
        Self([r, g, b, 1.0])
    }

    /// Parses `#rrggbb` or `rrggbb`.
    pub fn parse_hex(s: &str) -> Option<Self> {
        let digits = s.strip_prefix('#').unwrap_or(s);
        if digits.len() != 6 {
            return None;
        }
        u32::from_str_radix(digits, 16).ok().map(Self::from_hex)
    }

    pub fn to_hex_string(&self) -> String {
        let [r, g, b, _] = self.to_rgba8();
        format!("#{r:02x}{g:02x}{b:02x}")
    }

    /// Hue, saturation and lightness all in `[0, 1]`.
    pub fn from_hsl(h: f32, s: f32, l: f32) -> Self {
        if s <= 0.0 {
            return Self([l, l, l, 1.0]);
        }
        let q = if l < 0.5 { l * (1.0 + s) } else { l + s - l * s };
        let p = 2.0 * l - q;
        let channel = |t: f32| {
            let t = t.rem_euclid(1.0);
            if t < 1.0 / 6.0 {
                p + (q - p) * 6.0 * t
            } else if t < 0.5 {
                q
            } else if t < 2.0 / 3.0 {
                p + (q - p) * (2.0 / 3.0 - t) * 6.0
            } else {
                p
            }
        };
        Self([channel(h + 1.0 / 3.0), channel(h), channel(h - 1.0 / 3.0), 1.0])
    }

    pub fn with_alpha(self, a: f32) -> Self {
        Self([self.0[0], self.0[1], self.0[2], a])
    }

    pub fn alpha(&self) -> f32 {
        self.0[3]
    }

    pub fn lerp(self, other: Self, t: f32) -> Self {
        let mut out = [0.0; 4];
        for (i, o) in out.iter_mut().enumerate() {
            *o = self.0[i] + (other.0[i] - self.0[i]) * t;
        }
        Self(out)
    }

    /// Multiply the RGB channels, keeping alpha.
    pub fn scaled(self, k: f32) -> Self {
        Self([self.0[0] * k, self.0[1] * k, self.0[2] * k, self.0[3]])
    }

    pub fn to_rgba8(&self) -> [u8; 4] {
        self.0.map(|c| (c.clamp(0.0, 1.0) * 255.0).round() as u8)
    }

    /// Linear-light RGB with alpha untouched, for the GPU.
    pub fn to_linear(&self) -> [f32; 4] {
        let f = |c: f32| {
            if c <= 0.04045 { c / 12.92 } else { ((c + 0.055) / 1.055).powf(2.4) }
        };
        [f(self.0[0]), f(self.0[1]), f(self.0[2]), self.0[3]]
    }
}

// ── Lighting & fog ─────────────────────────────────────────────────────────

#[derive(Copy, Clone, Debug, PartialEq)]
pub struct PointLight {
    pub position: Vec3,
    pub color: Color,
    pub intensity: f32,
    /// Distance at which the light reaches zero.
    pub range: f32,
}

#[derive(Copy, Clone, Debug, PartialEq)]
pub struct DirectionalLight {
    /// Position the light shines from, toward the origin.
    pub from: Vec3,
    pub color: Color,
    pub intensity: f32,
}

#[derive(Clone, Debug, PartialEq)]
pub struct Lighting {
    pub ambient: Color,
    pub ambient_intensity: f32,
    pub directional: Option<DirectionalLight>,
    pub points: Vec<PointLight>,
    /// Tone-mapping exposure.
    pub exposure: f32,
}

impl Default for Lighting {
    fn default() -> Self {
        Self {
            ambient: Color::WHITE,
            ambient_intensity: 0.5,
            directional: None,
            points: Vec::new(),
            exposure: 1.0,
        }
    }
}

#[derive(Copy, Clone, Debug, PartialEq)]
pub enum Fog {
    None,
    Linear { color: Color, near: f32, far: f32 },
    Exp2 { color: Color, density: f32 },
}

impl Fog {
    pub fn color(&self) -> Option<Color> {
        match *self {
            Fog::None => None,
            Fog::Linear { color, .. } | Fog::Exp2 { color, .. } => Some(color),
        }
    }

    pub fn with_color(self, color: Color) -> Self {
        match self {
            Fog::None => Fog::None,
            Fog::Linear { near, far, .. } => Fog::Linear { color, near, far },
            Fog::Exp2 { density, .. } => Fog::Exp2 { color, density },
        }
    }
}

// ── Game trait ──────────────────────────────────────────────────────────────

pub trait Game {
    fn on_enter(&mut self, _engine: &mut Engine) {}
    fn update(&mut self, engine: &mut Engine);
    fn render(&mut self, engine: &mut Engine);
}

// ── Engine ──────────────────────────────────────────────────────────────────

pub struct Engine {
    /// GPU renderer: surface, pipelines, mesh library and dynamic textures.
    pub renderer: Renderer,
    pub camera: OrbitCamera,
    /// When false, mouse drag and wheel leave the camera alone.
    pub camera_controls: bool,
    pub input: InputState,
    pub audio: AudioContext,
    dt: f32,
    tick: u64,
    frame: FrameData,
    lighting: Lighting,
    fog: Fog,
    background: Color,
    labels: HashMap<(String, [u8; 4]), TextureId>,
    pub(crate) quit_requested: bool,
    debug: bool,
    /// Rolling buffer of recent frame times for the debug title line.
    pub(crate) frame_times: VecDeque<f32>,
    title: String,
}

impl Engine {
    pub fn builder() -> EngineBuilder {
        EngineBuilder::default()
    }

    fn from_builder(renderer: Renderer, config: &EngineBuilder) -> Self {
        Self {
            renderer,
            camera: OrbitCamera::default(),
            camera_controls: true,
            input: InputState::new(),
            audio: AudioContext::new(config.master_volume),
            dt: 0.0,
            tick: 0,
            frame: FrameData::default(),
            lighting: Lighting::default(),
            fog: Fog::None,
            background: Color::BLACK,
            labels: HashMap::new(),
            quit_requested: false,
            debug: config.debug,
            frame_times: VecDeque::with_capacity(60),
            title: config.window.title.clone(),
        }
    }

    // ── Accessors ──────────────────────────────────────────────────────────

    /// Fixed update step in seconds.
    pub fn dt(&self) -> f32 { self.dt }
    /// Fixed update step in milliseconds.
    pub fn dt_ms(&self) -> f32 { self.dt * 1000.0 }
    pub fn tick(&self) -> u64 { self.tick }

    pub fn screen_size(&self) -> (u32, u32) {
        let size = self.renderer.window.inner_size();
        (size.width.max(1), size.height.max(1))
    }

    pub fn is_key_held(&self, key: KeyCode) -> bool { self.input.is_key_held(key) }
    pub fn is_key_pressed(&self, key: KeyCode) -> bool { self.input.is_key_pressed(key) }
    pub fn is_mouse_held(&self, button: MouseButton) -> bool { self.input.is_mouse_held(button) }
    pub fn mouse_pos(&self) -> [f32; 2] { self.input.mouse_pos }

    pub fn lighting(&self) -> &Lighting { &self.lighting }
    pub fn fog(&self) -> Fog { self.fog }

    /// Signal that the application should exit after the current tick.
    pub fn request_quit(&mut self) {
        self.quit_requested = true;
    }

    pub fn set_window_title(&mut self, title: &str) {
        self.title = title.to_string();
        self.renderer.window.set_title(title);
    }

    // ── Scene state ────────────────────────────────────────────────────────

    pub fn set_lighting(&mut self, lighting: Lighting) {
        self.lighting = lighting;
    }

    pub fn set_fog(&mut self, fog: Fog) {
        self.fog = fog;
    }

    pub fn set_background(&mut self, color: Color) {
        self.background = color;
    }

    // ── Textures ───────────────────────────────────────────────────────────

    pub fn create_texture(&mut self, width: u32, height: u32) -> TextureId {
        self.renderer.create_texture(width, height)
    }

    /// Replace the contents of `id` with premultiplied RGBA8 pixels.
    pub fn upload_texture(&mut self, id: TextureId, rgba: &[u8]) {
        self.renderer.upload_texture(id, rgba);
    }

    pub fn destroy_texture(&mut self, id: TextureId) {
        self.renderer.destroy_texture(id);
    }

    /// Texture with `text` rendered in `color` on a transparent 512x128 canvas.
    pub fn label_texture(&mut self, text: &str, color: Color) -> Option<TextureId> {
        let key = (text.to_string(), color.to_rgba8());
        if let Some(id) = self.labels.get(&key) {
            return Some(*id);
        }
        let pixmap = crate::font::render_label(text, 512, 128, color)?;
        let id = self.renderer.create_texture(pixmap.width(), pixmap.height());
        self.renderer.upload_texture(id, pixmap.data());
        self.labels.insert(key, id);
        Some(id)
    }

    /// Release every cached label texture.
    pub fn clear_labels(&mut self) {
        for (_, id) in self.labels.drain() {
            self.renderer.destroy_texture(id);
        }
    }

    /// Full-screen texture drawn over the 3D scene this frame.
    pub fn set_overlay(&mut self, texture: Option<TextureId>) {
        self.frame.overlay = texture;
    }

    // ── Drawing ────────────────────────────────────────────────────────────

    pub fn draw_mesh(&mut self, mesh: MeshKind, transform: Mat4, material: &Material) {
        let color = material.color.with_alpha(material.opacity);
        let emissive = material.emissive.scaled(material.emissive_intensity);
        let instance = InstanceRaw {
            model: transform.to_cols_array_2d(),
            color: color.to_linear(),
            emissive: emissive.to_linear(),
            params: [material.roughness, material.metalness, if material.unlit { 1.0 } else { 0.0 }, 0.0],
        };
        if material.opacity < 1.0 {
            let center = transform.transform_point3(Vec3::ZERO);
            let depth = center.distance_squared(self.camera.eye());
            self.frame.transparent.push((mesh, instance, depth));
        } else {
            self.frame.opaque.push((mesh, instance));
        }
    }

    /// Draw the edges of `mesh` as lines.
    pub fn draw_wireframe(&mut self, mesh: MeshKind, transform: Mat4, color: Color) {
        let c = color.to_linear();
        let library = self.renderer.mesh_library();
        let data = library.get(mesh);
        for [a, b] in &data.edges {
            let pa = transform.transform_point3(Vec3::from(data.vertices[*a as usize].position));
            let pb = transform.transform_point3(Vec3::from(data.vertices[*b as usize].position));
            self.frame.lines.push(ColorVertex { position: pa.into(), color: c });
            self.frame.lines.push(ColorVertex { position: pb.into(), color: c });
        }
    }

    pub fn draw_line(&mut self, from: Vec3, to: Vec3, color: Color) {
        let c = color.to_linear();
        self.frame.lines.push(ColorVertex { position: from.into(), color: c });
        self.frame.lines.push(ColorVertex { position: to.into(), color: c });
    }

    /// Camera-facing additive point of world size `size`.
    pub fn draw_particle(&mut self, position: Vec3, size: f32, color: Color) {
        let (right, up) = self.camera.billboard_axes();
        let h = size * 0.5;
        let c = color.to_linear();
        let corner = |dx: f32, dy: f32| ColorVertex {
            position: (position + right * dx * h + up * dy * h).into(),
            color: c,
        };
        let (tl, tr, bl, br) = (corner(-1.0, 1.0), corner(1.0, 1.0), corner(-1.0, -1.0), corner(1.0, -1.0));
        self.frame.particles.extend_from_slice(&[tl, bl, tr, tr, bl, br]);
    }

    /// Camera-facing textured quad, rotated by `roll` radians in screen plane.
    pub fn draw_billboard(&mut self, texture: TextureId, center: Vec3, size: Vec2, roll: f32, tint: Color) {
        let (right, up) = self.camera.billboard_axes();
        let (s, c) = roll.sin_cos();
        let r = (right * c + up * s) * size.x * 0.5;
        let u = (up * c - right * s) * size.y * 0.5;
        self.push_quad(texture, [center - r + u, center + r + u, center - r - u, center + r - u], tint);
    }

    /// Unit quad in the local XY plane (facing +Z), centred on the origin.
    pub fn draw_quad(&mut self, texture: TextureId, transform: Mat4, tint: Color) {
        let p = |x: f32, y: f32| transform.transform_point3(Vec3::new(x, y, 0.0));
        self.push_quad(texture, [p(-0.5, 0.5), p(0.5, 0.5), p(-0.5, -0.5), p(0.5, -0.5)], tint);
    }

    fn push_quad(&mut self, texture: TextureId, [tl, tr, bl, br]: [Vec3; 4], tint: Color) {
        let c = tint.to_linear();
        let v = |p: Vec3, uv: [f32; 2]| TexturedVertex { position: p.into(), uv, color: c };
        let verts = [
            v(tl, [0.0, 0.0]),
            v(bl, [0.0, 1.0]),
            v(tr, [1.0, 0.0]),
            v(tr, [1.0, 0.0]),
            v(bl, [0.0, 1.0]),
            v(br, [1.0, 1.0]),
        ];
        self.frame.quads.push((texture, verts));
    }

    // ── Internal ───────────────────────────────────────────────────────────

    /// Orbit controls and camera damping for one rendered frame.
    pub(crate) fn tick_camera(&mut self, elapsed: f32) {
        if self.camera_controls {
            if let Some([dx, dy]) = self.input.orbit_drag() {
                self.camera.rotate(-dx * 0.005, -dy * 0.005);
            }
            if !self.input.mouse_consumed && self.input.mouse_wheel != 0.0 {
                self.camera.zoom(self.input.mouse_wheel);
            }
        }
        self.camera.tick(elapsed);
    }

    fn record_frame_time(&mut self, elapsed: f32) {
        if !self.debug {
            return;
        }
        if self.frame_times.len() >= 60 {
            self.frame_times.pop_front();
        }
        self.frame_times.push_back(elapsed);
        if self.tick % 30 == 0 {
            let avg = self.frame_times.iter().sum::<f32>() / self.frame_times.len() as f32;
            let fps = if avg > 0.0 { 1.0 / avg } else { 0.0 };
            let line = format!("{} | FPS: {:.1} | FT: {:.2}ms", self.title, fps, avg * 1000.0);
            self.renderer.window.set_title(&line);
        }
    }

    fn render_frame(&mut self) {
        let (w, h) = self.screen_size();
        let aspect = w as f32 / h as f32;
        let scene = crate::renderer::mesh_pipeline::SceneUniform::new(
            self.camera.view_proj(aspect),
            self.camera.eye(),
            &self.lighting,
            &self.fog,
        );
        let frame = std::mem::take(&mut self.frame);
        match self.renderer.render(&frame, &scene, self.background) {
            Ok(()) => {}
            Err(wgpu::SurfaceError::Lost) => {
                let size = self.renderer.window.inner_size();
                self.renderer.resize(size);
            }
            Err(e) => log::error!("render error: {e}"),
        }
        // Keep the allocations for the next frame.
        self.frame = frame;
        self.frame.clear();
    }
}

// ── EngineBuilder ───────────────────────────────────────────────────────────

pub struct EngineBuilder {
    window: WindowConfig,
    debug: bool,
    master_volume: f32,
}

impl Default for EngineBuilder {
    fn default() -> Self {
        Self { window: WindowConfig::default(), debug: false, master_volume: 1.0 }
    }
}

impl EngineBuilder {
    pub fn with_title(mut self, title: &str) -> Self { self.window.title = title.into(); self }
    pub fn with_size(mut self, width: u32, height: u32) -> Self { self.window.width = width; self.window.height = height; self }
    pub fn with_ups(mut self, ups: u32) -> Self { self.window.ups = ups; self }
    pub fn with_window(mut self, window: WindowConfig) -> Self { self.window = window; self }
    pub fn with_debug(mut self, debug: bool) -> Self { self.debug = debug; self }
    pub fn with_master_volume(mut self, volume: f32) -> Self { self.master_volume = volume; self }

    pub fn run(self, game: impl Game + 'static) -> Result<(), winit::error::EventLoopError> {
        let event_loop = EventLoop::new()?;
        let fixed_dt = 1.0 / self.window.ups.max(1) as f32;
        let mut app = App {
            config: self,
            game: Box::new(game),
            engine: None,
            last_instant: None,
            last_cursor: None,
            accumulator: 0.0,
            fixed_dt,
        };
        event_loop.run_app(&mut app)
    }
}

// ── App (winit ApplicationHandler) ──────────────────────────────────────────

struct App {
    config: EngineBuilder,
    game: Box<dyn Game>,
    engine: Option<Engine>,
    last_instant: Option<Instant>,
    last_cursor: Option<[f32; 2]>,
    accumulator: f32,
    fixed_dt: f32,
}

impl ApplicationHandler for App {
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        if self.engine.is_some() {
            return;
        }
        let window_config = &self.config.window;
        let window = match event_loop.create_window(window_attributes(window_config)) {
            Ok(w) => Arc::new(w),
            Err(e) => {
                log::error!("failed to create window: {e}");
                event_loop.exit();
                return;
            }
        };
        enter_fullscreen(&window, window_config);

        let renderer = match pollster::block_on(Renderer::new(window)) {
            Ok(r) => r,
            Err(e) => {
                log::error!("failed to initialise the renderer: {e}");
                event_loop.exit();
                return;
            }
        };

        let mut engine = Engine::from_builder(renderer, &self.config);
        self.game.on_enter(&mut engine);
        self.engine = Some(engine);
    }

    fn about_to_wait(&mut self, _event_loop: &ActiveEventLoop) {
        if let Some(engine) = self.engine.as_ref() {
            engine.renderer.window.request_redraw();
        }
    }

    fn window_event(&mut self, event_loop: &ActiveEventLoop, _id: WindowId, event: WindowEvent) {
        let Some(engine) = self.engine.as_mut() else { return };

        match event {
            WindowEvent::CloseRequested => event_loop.exit(),

            WindowEvent::Resized(size) => {
                engine.renderer.resize(size);
            }

            WindowEvent::CursorMoved { position, .. } => {
                let pos = [position.x as f32, position.y as f32];
                if let Some([lx, ly]) = self.last_cursor {
                    engine.input.mouse_delta[0] += pos[0] - lx;
                    engine.input.mouse_delta[1] += pos[1] - ly;
                }
                self.last_cursor = Some(pos);
                engine.input.mouse_pos = pos;
            }

            WindowEvent::MouseInput { button, state, .. } => {
                match state {
                    ElementState::Pressed => {
                        if engine.input.mouse_held.insert(button) {
                            engine.input.mouse_pressed.insert(button);
                        }
                    }
                    ElementState::Released => {
                        engine.input.mouse_held.remove(&button);
                    }
                }
            }

            WindowEvent::MouseWheel { delta, .. } => {
                use winit::event::MouseScrollDelta;
                match delta {
                    MouseScrollDelta::LineDelta(_, y) => engine.input.mouse_wheel = y,
                    MouseScrollDelta::PixelDelta(pos) => engine.input.mouse_wheel = (pos.y / 100.0) as f32,
                }
            }

            WindowEvent::RedrawRequested => {
                let now = Instant::now();
                let elapsed = match self.last_instant {
                    Some(prev) => now.duration_since(prev).as_secs_f32().min(0.25),
                    None => self.fixed_dt,
                };
                self.last_instant = Some(now);
                self.accumulator += elapsed;

                while self.accumulator >= self.fixed_dt {
                    engine.dt = self.fixed_dt;
                    engine.tick += 1;
                    self.game.update(engine);
                    if engine.quit_requested {
                        event_loop.exit();
                        return;
                    }
                    self.accumulator -= self.fixed_dt;
                    // Edge-triggered input belongs to the first tick only.
                    engine.input.clear_pressed();
                }

                engine.tick_camera(elapsed);
                engine.record_frame_time(elapsed);

                self.game.render(engine);
                engine.render_frame();

                // End of frame cleanup
                engine.input.clear_motion();
            }

            WindowEvent::KeyboardInput {
                event:
                    KeyEvent {
                        physical_key: PhysicalKey::Code(code),
                        state,
                        ref text,
                        ..
                    },
                ..
            } => match state {
                ElementState::Pressed => {
                    if engine.input.keys_held.insert(code) {
                        engine.input.keys_pressed.insert(code);
                    }
                    // Key repeat still counts for editing keys.
                    engine.input.keys_repeated.insert(code);

                    // Capture printable characters for the chat input line.
                    if let Some(t) = text {
                        for ch in t.chars() {
                            if !ch.is_control() {
                                engine.input.chars_typed.push(ch);
                            }
                        }
                    }
                }
                ElementState::Released => {
                    engine.input.keys_held.remove(&code);
                }
            },

            _ => {}
        }
    }
}
