use glam::{Vec2, Vec3};
#[cfg(feature = "threading")]
use rayon::prelude::*;

use crate::displacement::displace;
use crate::params::SurfaceParameters;

/// Reference grid: a 2 × 2 plane with 512 × 512 segments.
pub const REFERENCE_SEGMENTS: usize = 512;

/// A regular grid over the base plane, centred on the origin.
/// Vertices are row-major with the top row (y = +height/2, v = 1) first.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PlaneGrid {
    pub width: f32,
    pub height: f32,
    pub segments_x: usize,
    pub segments_y: usize,
}

impl Default for PlaneGrid {
    fn default() -> Self {
        Self::new(2.0, 2.0, REFERENCE_SEGMENTS, REFERENCE_SEGMENTS)
    }
}

impl PlaneGrid {
    /// Segment counts are clamped to at least 1.
    pub fn new(width: f32, height: f32, segments_x: usize, segments_y: usize) -> Self {
        Self { width, height, segments_x: segments_x.max(1), segments_y: segments_y.max(1) }
    }

    #[inline]
    pub fn columns(&self) -> usize {
        self.segments_x + 1
    }

    #[inline]
    pub fn rows(&self) -> usize {
        self.segments_y + 1
    }

    pub fn vertex_count(&self) -> usize {
        self.columns() * self.rows()
    }

    /// Base-plane position and UV of vertex `(row, col)`.
    pub fn vertex(&self, row: usize, col: usize) -> (Vec2, Vec2) {
        let u = col as f32 / self.segments_x as f32;
        let t = row as f32 / self.segments_y as f32;
        let position = Vec2::new(u * self.width - self.width * 0.5, self.height * 0.5 - t * self.height);
        (position, Vec2::new(u, 1.0 - t))
    }

    /// Triangle list, two counter-clockwise triangles per quad.
    pub fn indices(&self) -> Vec<u32> {
        let cols = self.columns() as u32;
        let mut out = Vec::with_capacity(self.segments_x * self.segments_y * 6);
        for iy in 0..self.segments_y as u32 {
            for ix in 0..self.segments_x as u32 {
                let a = ix + cols * iy;
                let b = ix + cols * (iy + 1);
                let c = (ix + 1) + cols * (iy + 1);
                let d = (ix + 1) + cols * iy;
                out.extend_from_slice(&[a, b, d, b, c, d]);
            }
        }
        out
    }
}

/// Displaced surface for one frame.
#[derive(Debug, Clone, PartialEq)]
pub struct SurfaceMesh {
    pub positions: Vec<Vec3>,
    pub normals: Vec<Vec3>,
    pub uvs: Vec<Vec2>,
    pub elevations: Vec<f32>,
    pub columns: usize,
    pub rows: usize,
}

impl SurfaceMesh {
    pub fn min_elevation(&self) -> f32 {
        self.elevations.iter().cloned().fold(f32::INFINITY, f32::min)
    }

    pub fn max_elevation(&self) -> f32 {
        self.elevations.iter().cloned().fold(f32::NEG_INFINITY, f32::max)
    }
}

/// Displace every grid vertex at `params.time`.
///
/// Each vertex is independent; with the `threading` feature rows are
/// evaluated in parallel and the result is identical.
pub fn evaluate_surface(grid: &PlaneGrid, params: &SurfaceParameters) -> SurfaceMesh {
    let cols = grid.columns();
    let rows = grid.rows();

    let eval_row = |row: usize| -> Vec<(Vec3, Vec3, Vec2, f32)> {
        (0..cols)
            .map(|col| {
                let (base, uv) = grid.vertex(row, col);
                let v = displace(base, params.time, &params.waves);
                (v.position, v.normal, uv, v.elevation)
            })
            .collect()
    };

    #[cfg(feature = "threading")]
    let evaluated: Vec<_> = (0..rows).into_par_iter().flat_map_iter(eval_row).collect();
    #[cfg(not(feature = "threading"))]
    let evaluated: Vec<_> = (0..rows).flat_map(eval_row).collect();

    let mut mesh = SurfaceMesh {
        positions: Vec::with_capacity(evaluated.len()),
        normals: Vec::with_capacity(evaluated.len()),
        uvs: Vec::with_capacity(evaluated.len()),
        elevations: Vec::with_capacity(evaluated.len()),
        columns: cols,
        rows,
    };
    for (p, n, uv, h) in evaluated {
        mesh.positions.push(p);
        mesh.normals.push(n);
        mesh.uvs.push(uv);
        mesh.elevations.push(h);
    }
    mesh
}
