// ── Procedural mesh library (pure, GPU-free) ─────────────────────────────────
//
// Every shape the room and the dream visuals need, generated once at start-up.
// Each mesh carries an edge list so it can also be drawn as a wireframe.

use std::f32::consts::{PI, TAU};

#[repr(C)]
#[derive(Copy, Clone, Debug, PartialEq, bytemuck::Pod, bytemuck::Zeroable)]
pub struct MeshVertex {
    pub position: [f32; 3],
    pub normal: [f32; 3],
}

impl MeshVertex {
    const ATTRIBS: [wgpu::VertexAttribute; 2] = wgpu::vertex_attr_array![
        0 => Float32x3, // position
        1 => Float32x3, // normal
    ];

    pub fn layout() -> wgpu::VertexBufferLayout<'static> {
        wgpu::VertexBufferLayout {
            array_stride: std::mem::size_of::<MeshVertex>() as wgpu::BufferAddress,
            step_mode: wgpu::VertexStepMode::Vertex,
            attributes: &Self::ATTRIBS,
        }
    }
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum MeshKind {
    /// Unit cube centred on the origin.
    Cube,
    /// Unit-radius UV sphere.
    Sphere,
    /// Torus with major radius 0.4 and tube radius 0.15, around +Z.
    Torus,
    /// Regular octahedron with unit circumradius.
    Octahedron,
    /// Flat annulus in the XZ plane, inner radius 0.05, outer radius 1.
    Ring,
    /// Unit quad in the XY plane facing +Z.
    Plane,
}

impl MeshKind {
    pub const ALL: [MeshKind; 6] = [
        MeshKind::Cube,
        MeshKind::Sphere,
        MeshKind::Torus,
        MeshKind::Octahedron,
        MeshKind::Ring,
        MeshKind::Plane,
    ];

    pub fn index(self) -> usize {
        self as usize
    }
}

#[derive(Clone, Debug, Default)]
pub struct MeshData {
    pub vertices: Vec<MeshVertex>,
    pub indices: Vec<u32>,
    /// Vertex index pairs for wireframe drawing.
    pub edges: Vec<[u32; 2]>,
}

impl MeshData {
    fn push(&mut self, position: [f32; 3], normal: [f32; 3]) -> u32 {
        self.vertices.push(MeshVertex { position, normal });
        (self.vertices.len() - 1) as u32
    }

    /// Tessellated parametric surface over a `(cols+1) × (rows+1)` grid.
    fn grid<F>(cols: u32, rows: u32, mut point: F) -> Self
    where
        F: FnMut(f32, f32) -> ([f32; 3], [f32; 3]),
    {
        let mut mesh = Self::default();
        for r in 0..=rows {
            for c in 0..=cols {
                let (p, n) = point(c as f32 / cols as f32, r as f32 / rows as f32);
                mesh.push(p, n);
            }
        }
        let stride = cols + 1;
        for r in 0..rows {
            for c in 0..cols {
                let a = r * stride + c;
                let b = a + 1;
                let d = a + stride;
                let e = d + 1;
                mesh.indices.extend_from_slice(&[a, d, b, b, d, e]);
                mesh.edges.push([a, b]);
                mesh.edges.push([a, d]);
            }
        }
        mesh
    }
}

pub fn build(kind: MeshKind) -> MeshData {
    match kind {
        MeshKind::Cube => cube(),
        MeshKind::Sphere => sphere(24, 16),
        MeshKind::Torus => torus(0.4, 0.15, 32, 16),
        MeshKind::Octahedron => octahedron(),
        MeshKind::Ring => ring(0.05, 1.0, 32),
        MeshKind::Plane => plane(),
    }
}

fn cube() -> MeshData {
    let mut mesh = MeshData::default();
    // (normal, u axis, v axis) per face
    let faces: [([f32; 3], [f32; 3], [f32; 3]); 6] = [
        ([1.0, 0.0, 0.0], [0.0, 0.0, -1.0], [0.0, 1.0, 0.0]),
        ([-1.0, 0.0, 0.0], [0.0, 0.0, 1.0], [0.0, 1.0, 0.0]),
        ([0.0, 1.0, 0.0], [1.0, 0.0, 0.0], [0.0, 0.0, -1.0]),
        ([0.0, -1.0, 0.0], [1.0, 0.0, 0.0], [0.0, 0.0, 1.0]),
        ([0.0, 0.0, 1.0], [1.0, 0.0, 0.0], [0.0, 1.0, 0.0]),
        ([0.0, 0.0, -1.0], [-1.0, 0.0, 0.0], [0.0, 1.0, 0.0]),
    ];
    for (n, u, v) in faces {
        let corner = |su: f32, sv: f32| {
            [
                0.5 * (n[0] + su * u[0] + sv * v[0]),
                0.5 * (n[1] + su * u[1] + sv * v[1]),
                0.5 * (n[2] + su * u[2] + sv * v[2]),
            ]
        };
        let a = mesh.push(corner(-1.0, -1.0), n);
        let b = mesh.push(corner(1.0, -1.0), n);
        let c = mesh.push(corner(1.0, 1.0), n);
        let d = mesh.push(corner(-1.0, 1.0), n);
        mesh.indices.extend_from_slice(&[a, b, c, a, c, d]);
        mesh.edges.extend_from_slice(&[[a, b], [b, c], [c, d], [d, a]]);
    }
    mesh
}

fn sphere(segments: u32, rings: u32) -> MeshData {
    MeshData::grid(segments, rings, |u, v| {
        let theta = u * TAU;
        let phi = v * PI;
        let n = [phi.sin() * theta.cos(), phi.cos(), phi.sin() * theta.sin()];
        (n, n)
    })
}

fn torus(major: f32, minor: f32, segments: u32, sides: u32) -> MeshData {
    MeshData::grid(segments, sides, |u, v| {
        let theta = u * TAU;
        let phi = v * TAU;
        let (st, ct) = theta.sin_cos();
        let (sp, cp) = phi.sin_cos();
        let ring = major + minor * cp;
        ([ring * ct, ring * st, minor * sp], [cp * ct, cp * st, sp])
    })
}

fn octahedron() -> MeshData {
    let mut mesh = MeshData::default();
    let tips: [[f32; 3]; 6] = [
        [1.0, 0.0, 0.0],
        [-1.0, 0.0, 0.0],
        [0.0, 1.0, 0.0],
        [0.0, -1.0, 0.0],
        [0.0, 0.0, 1.0],
        [0.0, 0.0, -1.0],
    ];
    let faces = [
        (0, 2, 4), (4, 2, 1), (1, 2, 5), (5, 2, 0),
        (4, 3, 0), (1, 3, 4), (5, 3, 1), (0, 3, 5),
    ];
    for (i, j, k) in faces {
        let (a, b, c) = (tips[i], tips[j], tips[k]);
        let s = 1.0 / 3f32.sqrt();
        let n = [(a[0] + b[0] + c[0]) * s, (a[1] + b[1] + c[1]) * s, (a[2] + b[2] + c[2]) * s];
        let ia = mesh.push(a, n);
        let ib = mesh.push(b, n);
        let ic = mesh.push(c, n);
        mesh.indices.extend_from_slice(&[ia, ib, ic]);
    }
    // Each of the 12 edges once, on the first face that owns it.
    let mut seen: Vec<(usize, usize)> = Vec::new();
    for (f, (i, j, k)) in faces.iter().enumerate() {
        let base = (f * 3) as u32;
        for (x, y, ix, iy) in [(*i, *j, 0, 1), (*j, *k, 1, 2), (*k, *i, 2, 0)] {
            let key = (x.min(y), x.max(y));
            if !seen.contains(&key) {
                seen.push(key);
                mesh.edges.push([base + ix, base + iy]);
            }
        }
    }
    mesh
}

fn ring(inner: f32, outer: f32, segments: u32) -> MeshData {
    let mut mesh = MeshData::default();
    let up = [0.0, 1.0, 0.0];
    for s in 0..=segments {
        let t = s as f32 / segments as f32 * TAU;
        let (sin, cos) = t.sin_cos();
        mesh.push([cos * inner, 0.0, sin * inner], up);
        mesh.push([cos * outer, 0.0, sin * outer], up);
    }
    for s in 0..segments {
        let a = s * 2;
        let (b, c, d) = (a + 1, a + 2, a + 3);
        mesh.indices.extend_from_slice(&[a, c, b, b, c, d]);
        mesh.edges.push([b, d]);
        mesh.edges.push([a, c]);
    }
    mesh
}

fn plane() -> MeshData {
    let mut mesh = MeshData::default();
    let n = [0.0, 0.0, 1.0];
    let a = mesh.push([-0.5, -0.5, 0.0], n);
    let b = mesh.push([0.5, -0.5, 0.0], n);
    let c = mesh.push([0.5, 0.5, 0.0], n);
    let d = mesh.push([-0.5, 0.5, 0.0], n);
    mesh.indices.extend_from_slice(&[a, b, c, a, c, d]);
    mesh.edges.extend_from_slice(&[[a, b], [b, c], [c, d], [d, a]]);
    mesh
}

/// CPU copies of every mesh, indexed by `MeshKind`.
pub struct MeshLibrary {
    meshes: Vec<MeshData>,
}

impl Default for MeshLibrary {
    fn default() -> Self {
        Self::new()
    }
}

impl MeshLibrary {
    pub fn new() -> Self {
        Self { meshes: MeshKind::ALL.iter().map(|k| build(*k)).collect() }
    }

    pub fn get(&self, kind: MeshKind) -> &MeshData {
        &self.meshes[kind.index()]
    }
}
