//! Seven-zone radial color blend in UV space.
//!
//! Weights are compactly supported inverse-distance (Franke–Little) weights:
//!
//! ```text
//! w_i = ((r − d_i)⁺ / (r · d_i))²
//! ```
//!
//! They vanish smoothly at `d_i = r` and dominate as `d_i → 0`, so the blend
//! is continuous everywhere and returns `colors[i]` exactly at center `i`.
//! A UV covered by no zone takes the nearest center's color.
use glam::{Vec2, Vec3};

use crate::params::{ColorZones, ZONE_COUNT};

/// Normalised zone weights at `uv`, or `None` if no zone covers it.
/// The returned weights sum to 1.
pub fn zone_weights(uv: Vec2, zones: &ColorZones) -> Option<[f32; ZONE_COUNT]> {
    let r = zones.color_radius;
    let mut weights = [0.0f32; ZONE_COUNT];
    if !(r > 0.0) {
        return None;
    }

    let dist: [f32; ZONE_COUNT] = std::array::from_fn(|i| uv.distance(zones.color_centers[i]));

    // Exact hit: the first coincident center takes everything.
    if let Some(hit) = dist.iter().position(|&d| d == 0.0) {
        weights[hit] = 1.0;
        return Some(weights);
    }

    // Scale by the nearest covering distance so no term overflows when a
    // center is extremely close.
    let d_min = dist.iter().copied().filter(|&d| d < r).fold(f32::INFINITY, f32::min);
    if !d_min.is_finite() {
        return None;
    }

    let mut total = 0.0f32;
    for (w, &d) in weights.iter_mut().zip(&dist) {
        if d < r {
            let s = (r - d) * d_min / (r * d);
            *w = s * s;
            total += *w;
        }
    }
    if !(total > 0.0) {
        return None;
    }
    for w in &mut weights {
        *w /= total;
    }
    Some(weights)
}

/// Index of the nearest center; ties go to the lower index.
pub fn nearest_zone(uv: Vec2, zones: &ColorZones) -> usize {
    let mut best = 0;
    let mut best_d = f32::INFINITY;
    for (i, c) in zones.color_centers.iter().enumerate() {
        let d = uv.distance_squared(*c);
        if d < best_d {
            best = i;
            best_d = d;
        }
    }
    best
}

/// Blended base color at `uv`.
pub fn blend_zones(uv: Vec2, zones: &ColorZones) -> Vec3 {
    match zone_weights(uv, zones) {
        Some(weights) => {
            if let Some(i) = weights.iter().position(|&w| w == 1.0) {
                return zones.colors[i];
            }
            weights
                .iter()
                .zip(&zones.colors)
                .fold(Vec3::ZERO, |acc, (&w, &c)| acc + c * w)
        }
        None => zones.colors[nearest_zone(uv, zones)],
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn zones() -> ColorZones {
        ColorZones::default()
    }

    #[test]
    fn center_returns_its_color_exactly() {
        let z = zones();
        for i in 0..ZONE_COUNT {
            assert_eq!(blend_zones(z.color_centers[i], &z), z.colors[i], "zone {i}");
        }
    }

    #[test]
    fn weights_sum_to_one_where_covered() {
        let z = zones();
        for r in 0..=20 {
            for c in 0..=20 {
                let uv = Vec2::new(c as f32 / 20.0, r as f32 / 20.0);
                if let Some(w) = zone_weights(uv, &z) {
                    let sum: f32 = w.iter().sum();
                    assert!((sum - 1.0).abs() < 1e-5, "sum {sum} at {uv}");
                }
            }
        }
    }

    #[test]
    fn uncovered_uv_falls_back_to_nearest_zone() {
        let mut z = zones();
        z.color_radius = 0.05;
        let uv = Vec2::new(0.5, 0.35);
        assert!(zone_weights(uv, &z).is_none());
        assert_eq!(blend_zones(uv, &z), z.colors[nearest_zone(uv, &z)]);
    }

    #[test]
    fn non_positive_radius_uses_nearest_zone() {
        let mut z = zones();
        z.color_radius = 0.0;
        assert_eq!(blend_zones(Vec2::new(0.11, 0.1), &z), z.colors[0]);
    }

    #[test]
    fn blend_is_continuous_across_zone_edges() {
        let z = zones();
        let step = 1e-3;
        let mut prev = blend_zones(Vec2::new(0.0, 0.3), &z);
        for i in 1..=1000 {
            let uv = Vec2::new(i as f32 * step, 0.3);
            let cur = blend_zones(uv, &z);
            assert!((cur - prev).abs().max_element() < 0.05, "jump at {uv}");
            prev = cur;
        }
    }

    #[test]
    fn near_center_approaches_center_color() {
        let z = zones();
        let c = blend_zones(z.color_centers[4] + Vec2::splat(1e-5), &z);
        assert!((c - z.colors[4]).abs().max_element() < 1e-3);
    }
}
