//! Wave displacement of the base plane.
//!
//! ```text
//! big(x, y, t)   = sin(x·fx + t·s) · sin(y·fy + t·s) · A
//! ripple_i       = sin((x + y)·f·i + t·s_r·i) · (a / i)        i = 1..=N
//! h(x, y, t)     = (big + Σ ripple_i) · stiffness + drape
//! ```
//!
//! The plane lies in z = 0 and is displaced along +z. Normals come from the
//! analytic partial derivatives of `h`, so every caller (vertex grid, frame
//! renderer, bindings) produces identical shading normals.
use glam::{Vec2, Vec3};

use crate::params::WaveParams;

/// Large-wave term alone, before stiffness and drape.
#[inline]
pub fn big_wave(x: f32, y: f32, time: f32, w: &WaveParams) -> f32 {
    let phase = time * w.big_wave_speed;
    (x * w.big_wave_frequency.x + phase).sin()
        * (y * w.big_wave_frequency.y + phase).sin()
        * w.big_wave_elevation
}

/// One ripple octave, `i ≥ 1`.
#[inline]
fn ripple_octave(x: f32, y: f32, time: f32, w: &WaveParams, i: u32) -> f32 {
    let k = i as f32;
    ((x + y) * w.small_wave_frequency * k + time * w.small_wave_speed * k).sin()
        * (w.small_wave_elevation / k)
}

/// Sum of all ripple octaves. Exactly 0 when `small_wave_iterations == 0`.
pub fn ripple(x: f32, y: f32, time: f32, w: &WaveParams) -> f32 {
    (1..=w.small_wave_iterations).map(|i| ripple_octave(x, y, time, w, i)).sum()
}

/// Elevation `h` at plane point `(x, y)`.
///
/// Ripple octaves are accumulated onto the large wave directly, so with zero
/// iterations the result is bit-identical to `big_wave · stiffness + drape`.
pub fn elevation(x: f32, y: f32, time: f32, w: &WaveParams) -> f32 {
    let mut h = big_wave(x, y, time, w);
    for i in 1..=w.small_wave_iterations {
        h += ripple_octave(x, y, time, w, i);
    }
    h * w.stiffness + w.drape
}

/// Analytic `(∂h/∂x, ∂h/∂y)`.
pub fn elevation_gradient(x: f32, y: f32, time: f32, w: &WaveParams) -> Vec2 {
    let phase = time * w.big_wave_speed;
    let ax = x * w.big_wave_frequency.x + phase;
    let ay = y * w.big_wave_frequency.y + phase;
    let mut dx = w.big_wave_elevation * w.big_wave_frequency.x * ax.cos() * ay.sin();
    let mut dy = w.big_wave_elevation * w.big_wave_frequency.y * ax.sin() * ay.cos();

    // d/dx and d/dy of each octave coincide: (a / i) · f·i · cos(...) = a·f·cos(...)
    for i in 1..=w.small_wave_iterations {
        let k = i as f32;
        let arg = (x + y) * w.small_wave_frequency * k + time * w.small_wave_speed * k;
        let d = w.small_wave_elevation * w.small_wave_frequency * arg.cos();
        dx += d;
        dy += d;
    }
    Vec2::new(dx, dy) * w.stiffness
}

/// Unit normal: `∂p/∂x × ∂p/∂y` with `p = (x, y, h)`, i.e. `(−hx, −hy, 1)`.
pub fn surface_normal(x: f32, y: f32, time: f32, w: &WaveParams) -> Vec3 {
    let g = elevation_gradient(x, y, time, w);
    let tx = Vec3::new(1.0, 0.0, g.x);
    let ty = Vec3::new(0.0, 1.0, g.y);
    tx.cross(ty).normalize_or(Vec3::Z)
}

/// A base-plane point after displacement.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DisplacedVertex {
    pub position: Vec3,
    pub normal: Vec3,
    pub elevation: f32,
}

pub fn displace(base: Vec2, time: f32, w: &WaveParams) -> DisplacedVertex {
    let h = elevation(base.x, base.y, time, w);
    DisplacedVertex {
        position: Vec3::new(base.x, base.y, h),
        normal: surface_normal(base.x, base.y, time, w),
        elevation: h,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    fn waves() -> WaveParams {
        WaveParams::default()
    }

    #[test]
    fn elevation_is_deterministic() {
        let w = waves();
        for &(x, y, t) in &[(0.3, -0.7, 1.25), (-1.0, 1.0, 100.0), (0.0, 0.5, 0.0)] {
            assert_eq!(elevation(x, y, t, &w).to_bits(), elevation(x, y, t, &w).to_bits());
        }
    }

    #[test]
    fn zero_iterations_match_big_wave_bitwise() {
        let mut w = waves();
        w.small_wave_iterations = 0;
        w.stiffness = 1.3;
        w.drape = 0.02;
        for &(x, y, t) in &[(0.3, -0.7, 1.25), (-0.91, 0.44, 7.5), (0.0, 0.0, 3.0)] {
            let expected = big_wave(x, y, t, &w) * w.stiffness + w.drape;
            assert_eq!(elevation(x, y, t, &w).to_bits(), expected.to_bits());
        }
        assert_eq!(ripple(0.4, 0.1, 2.0, &w), 0.0);
    }

    #[test]
    fn origin_at_time_zero_sits_at_drape() {
        let mut w = waves();
        w.drape = 0.125;
        assert_eq!(elevation(0.0, 0.0, 0.0, &w), 0.125);
    }

    #[test]
    fn zero_stiffness_flattens_to_drape() {
        let mut w = waves();
        w.stiffness = 0.0;
        w.drape = 0.05;
        for &(x, y) in &[(0.2, 0.9), (-0.6, 0.1)] {
            assert_eq!(elevation(x, y, 4.0, &w), 0.05);
            assert_eq!(surface_normal(x, y, 4.0, &w), Vec3::Z);
        }
    }

    #[test]
    fn ripple_amplitude_falls_off_with_octave() {
        let mut w = waves();
        w.big_wave_elevation = 0.0;
        w.small_wave_iterations = 3;
        w.small_wave_elevation = 0.3;
        // Octave i is bounded by a / i, so the sum is bounded by a · H(3).
        let bound = 0.3 * (1.0 + 0.5 + 1.0 / 3.0);
        for i in 0..200 {
            let x = i as f32 * 0.01 - 1.0;
            assert!(ripple(x, 0.2, 0.7, &w).abs() <= bound + 1e-6);
        }
        assert_abs_diff_eq!(ripple_octave(0.1, 0.2, 0.0, &w, 2), (0.3f32 * 2.0 * 3.0).sin() * 0.15, epsilon = 1e-6);
    }

    #[test]
    fn analytic_gradient_matches_central_difference() {
        let mut w = waves();
        w.small_wave_iterations = 4;
        let eps = 1e-3;
        for &(x, y, t) in &[(0.3, -0.7, 1.25), (-0.2, 0.45, 9.0)] {
            let g = elevation_gradient(x, y, t, &w);
            let fx = (elevation(x + eps, y, t, &w) - elevation(x - eps, y, t, &w)) / (2.0 * eps);
            let fy = (elevation(x, y + eps, t, &w) - elevation(x, y - eps, t, &w)) / (2.0 * eps);
            assert_abs_diff_eq!(g.x, fx, epsilon = 2e-2);
            assert_abs_diff_eq!(g.y, fy, epsilon = 2e-2);
        }
    }

    #[test]
    fn big_wave_is_periodic_in_time() {
        let w = waves();
        let period = 2.0 * std::f32::consts::PI / w.big_wave_speed;
        let a = big_wave(0.37, -0.52, 1.0, &w);
        let b = big_wave(0.37, -0.52, 1.0 + period, &w);
        assert_abs_diff_eq!(a, b, epsilon = 1e-4);
    }

    #[test]
    fn elevation_with_ripples_is_periodic_for_matching_speeds() {
        let mut w = waves();
        w.big_wave_speed = 0.5;
        w.small_wave_speed = 0.5;
        w.small_wave_iterations = 3;
        // Octave i repeats after 2π / (0.5·i), which divides 2π / 0.5.
        let period = 2.0 * std::f32::consts::PI / 0.5;
        for &(x, y) in &[(0.37, -0.52), (-0.9, 0.8), (0.0, 0.0)] {
            for &t in &[0.0f32, 1.0, 2.75] {
                let a = elevation(x, y, t, &w);
                let b = elevation(x, y, t + period, &w);
                assert_abs_diff_eq!(a, b, epsilon = 1e-4);
            }
        }
    }

    #[test]
    fn ripple_sum_repeats_with_small_wave_period() {
        let mut w = waves();
        w.small_wave_speed = 0.4;
        w.small_wave_iterations = 5;
        let period = 2.0 * std::f32::consts::PI / w.small_wave_speed;
        assert_abs_diff_eq!(ripple(0.2, -0.3, 1.5, &w), ripple(0.2, -0.3, 1.5 + period, &w), epsilon = 1e-4);
    }

    #[test]
    fn flat_plane_normal_points_up() {
        let mut w = waves();
        w.big_wave_elevation = 0.0;
        w.small_wave_elevation = 0.0;
        let v = displace(Vec2::new(0.4, -0.4), 2.0, &w);
        assert_eq!(v.normal, Vec3::Z);
        assert_eq!(v.position, Vec3::new(0.4, -0.4, 0.0));
    }
}
