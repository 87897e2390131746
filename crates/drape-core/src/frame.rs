//! CPU frame rendering: a fixed top-down orthographic view of the plane.
//!
//! Every pixel centre maps to one plane point. The displacement and normal
//! are evaluated analytically there, the fragment is shaded, and the result
//! is composited over the background with straight-alpha blending.
use glam::{Vec2, Vec3};
#[cfg(feature = "threading")]
use rayon::prelude::*;

use crate::color::{encode_srgb8, parse_hex};
use crate::displacement::displace;
use crate::error::ColorError;
use crate::params::SurfaceParameters;
use crate::shading::{Fragment, SurfaceShader};

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FrameSettings {
    pub width: usize,
    pub height: usize,
    /// Extent of the plane covered by the frame (reference 2 × 2).
    pub plane_size: Vec2,
    /// Eye height above z = 0.
    pub camera_height: f32,
    /// Linear background color.
    pub background: Vec3,
}

impl Default for FrameSettings {
    fn default() -> Self {
        Self {
            width: 512,
            height: 512,
            plane_size: Vec2::new(2.0, 2.0),
            camera_height: 1.65,
            background: Vec3::ZERO,
        }
    }
}

impl FrameSettings {
    pub fn with_size(width: usize, height: usize) -> Self {
        Self { width, height, ..Self::default() }
    }

    pub fn with_background_hex(mut self, hex: &str) -> Result<Self, ColorError> {
        self.background = parse_hex(hex)?;
        Ok(self)
    }

    /// Fragment inputs at pixel `(row, col)` for the given parameters.
    pub fn fragment(&self, params: &SurfaceParameters, row: usize, col: usize) -> Fragment {
        let u = (col as f32 + 0.5) / self.width as f32;
        let v = 1.0 - (row as f32 + 0.5) / self.height as f32;
        let base = (Vec2::new(u, v) - Vec2::splat(0.5)) * self.plane_size;
        let vertex = displace(base, params.time, &params.waves);
        Fragment {
            uv: Vec2::new(u, v),
            normal: vertex.normal,
            world_position: vertex.position,
            view_dir: Vec3::Z,
            view_distance: (self.camera_height - vertex.elevation).abs(),
        }
    }
}

/// Row-major RGBA8 pixels, sRGB-encoded, row 0 at the top.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FrameBuffer {
    pub pixels: Vec<u8>,
    pub width: usize,
    pub height: usize,
}

impl FrameBuffer {
    #[inline]
    pub fn get(&self, row: usize, col: usize) -> [u8; 4] {
        let i = (row * self.width + col) * 4;
        [self.pixels[i], self.pixels[i + 1], self.pixels[i + 2], self.pixels[i + 3]]
    }
}

/// Render one frame at `params.time`.
pub fn render_frame(
    shader: &SurfaceShader,
    params: &SurfaceParameters,
    settings: &FrameSettings,
) -> FrameBuffer {
    let (w, h) = (settings.width, settings.height);
    let mut pixels = vec![0u8; w * h * 4];
    if w == 0 || h == 0 {
        return FrameBuffer { pixels, width: w, height: h };
    }

    let shade_row = |(row, out): (usize, &mut [u8])| {
        for col in 0..w {
            let frag = settings.fragment(params, row, col);
            let c = shader.shade(params, &frag);
            let rgb = settings.background.lerp(c.truncate(), c.w);
            let [r, g, b] = encode_srgb8(rgb);
            out[col * 4..col * 4 + 4].copy_from_slice(&[r, g, b, 255]);
        }
    };

    #[cfg(feature = "threading")]
    pixels.par_chunks_mut(w * 4).enumerate().for_each(shade_row);
    #[cfg(not(feature = "threading"))]
    pixels.chunks_mut(w * 4).enumerate().for_each(shade_row);

    FrameBuffer { pixels, width: w, height: h }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn quiet() -> SurfaceParameters {
        let mut p = SurfaceParameters::fabric();
        p.appearance.grain_strength = 0.0;
        p
    }

    #[test]
    fn frame_has_requested_size() {
        let f = render_frame(&SurfaceShader::new(), &quiet(), &FrameSettings::with_size(32, 16));
        assert_eq!(f.pixels.len(), 32 * 16 * 4);
        assert_eq!((f.width, f.height), (32, 16));
    }

    #[test]
    fn corners_outside_border_show_background() {
        let settings = FrameSettings::with_size(32, 32).with_background_hex("#336699").unwrap();
        let f = render_frame(&SurfaceShader::new(), &quiet(), &settings);
        assert_eq!(f.get(0, 0), [0x33, 0x66, 0x99, 255]);
        assert_eq!(f.get(31, 31), [0x33, 0x66, 0x99, 255]);
    }

    #[test]
    fn centre_is_covered_by_the_surface() {
        let f = render_frame(&SurfaceShader::new(), &quiet(), &FrameSettings::with_size(32, 32));
        let [r, g, b, _] = f.get(16, 16);
        assert!(r as u32 + g as u32 + b as u32 > 0);
    }

    #[test]
    fn rendering_is_deterministic() {
        let shader = SurfaceShader::new();
        let p = SurfaceParameters::fabric().at_time(3.0);
        let s = FrameSettings::with_size(24, 24);
        assert_eq!(render_frame(&shader, &p, &s), render_frame(&shader, &p, &s));
    }

    #[test]
    fn pixel_centres_map_to_plane_and_uv() {
        let s = FrameSettings::with_size(2, 2);
        let f = s.fragment(&quiet(), 0, 0);
        assert_eq!(f.uv, Vec2::new(0.25, 0.75));
        assert_eq!(f.world_position.truncate(), Vec2::new(-0.5, 0.5));
    }
}
