use bytemuck::{Pod, Zeroable};

use crate::coords::{Rect, Vec2};

/// Vertex of a light mesh, in the light's local space.
///
/// The shape-light shader places a vertex at
/// `position + extrude * falloff_distance + falloff_offset * falloff`.
#[repr(C)]
#[derive(Debug, Copy, Clone, PartialEq, Pod, Zeroable)]
pub struct LightVertex {
    pub position: [f32; 2],
    /// Outward direction of the falloff ring; zero for interior vertices.
    pub extrude: [f32; 2],
    /// 0 at the lit core, 1 at the outer edge of the falloff ring.
    pub falloff: f32,
    /// Cookie texture coordinate.
    pub uv: [f32; 2],
}

impl LightVertex {
    #[inline]
    pub const fn new(position: [f32; 2], extrude: [f32; 2], falloff: f32, uv: [f32; 2]) -> Self {
        Self { position, extrude, falloff, uv }
    }
}

/// Triangle mesh of a shaped light.
#[derive(Debug, Clone, PartialEq)]
pub struct LightMesh {
    pub vertices: Vec<LightVertex>,
    pub indices: Vec<u32>,
}

impl LightMesh {
    /// Regular polygon of `sides` (at least 3) with circumradius `radius`.
    pub fn parametric(sides: u32, radius: f32) -> Self {
        let sides = sides.max(3);
        let outline: Vec<Vec2> = (0..sides)
            .map(|i| {
                let a = std::f32::consts::TAU * i as f32 / sides as f32;
                Vec2::new(a.cos() * radius, a.sin() * radius)
            })
            .collect();
        Self::freeform(&outline)
    }

    /// Convex polygon given counter-clockwise, fan-triangulated from its
    /// centroid and wrapped in a falloff ring.
    ///
    /// Fewer than three points yield an empty mesh.
    pub fn freeform(outline: &[Vec2]) -> Self {
        let n = outline.len();
        if n < 3 {
            return Self { vertices: Vec::new(), indices: Vec::new() };
        }

        let centroid = outline.iter().fold(Vec2::zero(), |acc, &p| acc + p) / n as f32;
        let bounds = Rect::from_points(outline.iter().copied()).unwrap_or_default();
        let uv = |p: Vec2| {
            let s = bounds.size;
            [
                if s.x > 0.0 { (p.x - bounds.origin.x) / s.x } else { 0.5 },
                if s.y > 0.0 { 1.0 - (p.y - bounds.origin.y) / s.y } else { 0.5 },
            ]
        };

        // 0: centroid, 1..=n: inner ring, n+1..=2n: falloff ring
        let mut vertices = Vec::with_capacity(2 * n + 1);
        vertices.push(LightVertex::new(centroid.to_array(), [0.0; 2], 0.0, uv(centroid)));
        for &p in outline {
            vertices.push(LightVertex::new(p.to_array(), [0.0; 2], 0.0, uv(p)));
        }
        for i in 0..n {
            let prev = outline[(i + n - 1) % n];
            let next = outline[(i + 1) % n];
            let normal = vertex_normal(prev, outline[i], next);
            vertices.push(LightVertex::new(outline[i].to_array(), normal.to_array(), 1.0, uv(outline[i])));
        }

        let mut indices = Vec::with_capacity(9 * n);
        for i in 0..n {
            let a = (1 + i) as u32;
            let b = (1 + (i + 1) % n) as u32;
            let oa = (1 + n + i) as u32;
            let ob = (1 + n + (i + 1) % n) as u32;
            indices.extend_from_slice(&[0, a, b]);
            indices.extend_from_slice(&[a, oa, ob, a, ob, b]);
        }

        Self { vertices, indices }
    }

    /// Axis-aligned quad centered on the origin, UVs spanning the cookie.
    pub fn sprite_quad(size: Vec2) -> Self {
        let (hx, hy) = (size.x * 0.5, size.y * 0.5);
        let vertices = vec![
            LightVertex::new([-hx, -hy], [0.0; 2], 0.0, [0.0, 1.0]),
            LightVertex::new([hx, -hy], [0.0; 2], 0.0, [1.0, 1.0]),
            LightVertex::new([hx, hy], [0.0; 2], 0.0, [1.0, 0.0]),
            LightVertex::new([-hx, hy], [0.0; 2], 0.0, [0.0, 0.0]),
        ];
        Self { vertices, indices: vec![0, 1, 2, 0, 2, 3] }
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.indices.is_empty()
    }

    /// Local-space bounds once the falloff ring is extruded by
    /// `falloff_distance` and shifted by `falloff_offset`.
    pub fn local_bounds(&self, falloff_distance: f32, falloff_offset: Vec2) -> Option<Rect> {
        Rect::from_points(self.vertices.iter().map(|v| {
            let p = Vec2::new(v.position[0], v.position[1]);
            let e = Vec2::new(v.extrude[0], v.extrude[1]);
            p + e * falloff_distance + falloff_offset * v.falloff
        }))
    }
}

/// Unit outward normal at `cur`, averaged from its two edges (CCW winding).
fn vertex_normal(prev: Vec2, cur: Vec2, next: Vec2) -> Vec2 {
    let edge_normal = |a: Vec2, b: Vec2| {
        let d = b - a;
        let len = (d.x * d.x + d.y * d.y).sqrt();
        if len > 0.0 { Vec2::new(d.y / len, -d.x / len) } else { Vec2::zero() }
    };
    let n = edge_normal(prev, cur) + edge_normal(cur, next);
    let len = (n.x * n.x + n.y * n.y).sqrt();
    if len > 0.0 { n / len } else { Vec2::zero() }
}
