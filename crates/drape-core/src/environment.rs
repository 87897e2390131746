//! Procedural equirectangular environment maps.
//!
//! Each preset is a horizontal multi-stop gradient overlaid with faint grey
//! disks, generated deterministically from a fixed seed. Texel values are
//! stored as-is (display-referred), matching a canvas-backed texture.
use std::f32::consts::PI;
use std::str::FromStr;

use glam::{Vec2, Vec3, Vec4};
use log::debug;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::{Deserialize, Serialize};

use crate::error::ParamError;
use crate::texture::Texture;

/// Reference environment map resolution (2:1 equirectangular).
pub const ENV_WIDTH: usize = 1024;
pub const ENV_HEIGHT: usize = 512;

const DISK_COUNT: usize = 50;
const DISK_ALPHA: f32 = 0.1;
const ENV_SEED: u64 = 0xE4_71_20_4D;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum EnvironmentPreset {
    #[default]
    None,
    Studio,
    Forest,
    City,
    Sunset,
    Beach,
    Mountain,
    Desert,
    Ocean,
    Night,
    Indoor,
    Warehouse,
    Arctic,
    Tropical,
}

impl EnvironmentPreset {
    pub const ALL: [EnvironmentPreset; 14] = [
        Self::None,
        Self::Studio,
        Self::Forest,
        Self::City,
        Self::Sunset,
        Self::Beach,
        Self::Mountain,
        Self::Desert,
        Self::Ocean,
        Self::Night,
        Self::Indoor,
        Self::Warehouse,
        Self::Arctic,
        Self::Tropical,
    ];

    pub fn name(self) -> &'static str {
        match self {
            Self::None => "none",
            Self::Studio => "studio",
            Self::Forest => "forest",
            Self::City => "city",
            Self::Sunset => "sunset",
            Self::Beach => "beach",
            Self::Mountain => "mountain",
            Self::Desert => "desert",
            Self::Ocean => "ocean",
            Self::Night => "night",
            Self::Indoor => "indoor",
            Self::Warehouse => "warehouse",
            Self::Arctic => "arctic",
            Self::Tropical => "tropical",
        }
    }

    /// Gradient stops `(offset, 0xrrggbb)` left to right.
    pub fn stops(self) -> &'static [(f32, u32)] {
        match self {
            Self::None => &[],
            Self::Studio => &[(0.0, 0x606060), (0.5, 0x808080), (1.0, 0x606060)],
            Self::Forest => &[(0.0, 0x1a4d1a), (0.3, 0x2d6b2d), (0.7, 0x4a8f4a), (1.0, 0x1a4d1a)],
            Self::City => &[(0.0, 0x2c3e50), (0.4, 0x34495e), (0.6, 0x7f8c8d), (1.0, 0x2c3e50)],
            Self::Sunset => &[(0.0, 0xe74c3c), (0.3, 0xf39c12), (0.7, 0xf1c40f), (1.0, 0xe74c3c)],
            Self::Beach => &[(0.0, 0xf4d03f), (0.4, 0x85c1e9), (0.8, 0x3498db), (1.0, 0xf4d03f)],
            Self::Mountain => &[(0.0, 0x34495e), (0.3, 0x7f8c8d), (0.7, 0x95a5a6), (1.0, 0x34495e)],
            Self::Desert => &[(0.0, 0xf39c12), (0.4, 0xe67e22), (0.8, 0xd35400), (1.0, 0xf39c12)],
            Self::Ocean => &[(0.0, 0x1b4f72), (0.3, 0x2e86c1), (0.7, 0x5dade2), (1.0, 0x1b4f72)],
            Self::Night => &[(0.0, 0x1a1a2e), (0.4, 0x16213e), (0.8, 0x0f3460), (1.0, 0x1a1a2e)],
            Self::Indoor => &[(0.0, 0xecf0f1), (0.5, 0xbdc3c7), (1.0, 0xecf0f1)],
            Self::Warehouse => &[(0.0, 0x34495e), (0.3, 0x2c3e50), (0.7, 0x1b2631), (1.0, 0x34495e)],
            Self::Arctic => &[(0.0, 0xd5dbdb), (0.4, 0xa9cce3), (0.8, 0x85c1e9), (1.0, 0xd5dbdb)],
            Self::Tropical => &[(0.0, 0x27ae60), (0.3, 0x2ecc71), (0.7, 0x58d68d), (1.0, 0x27ae60)],
        }
    }

    /// Generate at the reference resolution. `None` has no texture.
    pub fn generate_default(self) -> Option<Texture> {
        self.generate(ENV_WIDTH, ENV_HEIGHT, ENV_SEED)
    }

    /// Generate the preset texture at `width × height`.
    ///
    /// Disk radii scale with width (20–120 texels at the 1024 reference).
    pub fn generate(self, width: usize, height: usize, seed: u64) -> Option<Texture> {
        if self == Self::None || width == 0 || height == 0 {
            return None;
        }
        debug!("generating {} environment map {width}x{height}", self.name());

        let stops = self.stops();
        let column: Vec<Vec3> = (0..width)
            .map(|c| gradient_at(stops, (c as f32 + 0.5) / width as f32))
            .collect();
        let mut tex = Texture::from_fn(width, height, |_, c| column[c].extend(1.0)).ok()?;

        let scale = width as f32 / ENV_WIDTH as f32;
        let mut rng = StdRng::seed_from_u64(seed ^ self as u64);
        for _ in 0..DISK_COUNT {
            let cx = rng.gen::<f32>() * width as f32;
            let cy = rng.gen::<f32>() * height as f32;
            let radius = (rng.gen::<f32>() * 100.0 + 20.0) * scale;
            let tint = Vec3::new(
                (rng.gen::<f32>() * 50.0 + 100.0) / 255.0,
                (rng.gen::<f32>() * 50.0 + 100.0) / 255.0,
                (rng.gen::<f32>() * 50.0 + 100.0) / 255.0,
            );
            paint_disk(&mut tex, Vec2::new(cx, cy), radius, tint);
        }
        Some(tex)
    }
}

impl FromStr for EnvironmentPreset {
    type Err = ParamError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let lower = s.to_ascii_lowercase();
        Self::ALL
            .into_iter()
            .find(|p| p.name() == lower)
            .ok_or_else(|| ParamError::InvalidValue {
                key: "environmentPreset".into(),
                reason: format!("unknown environment `{s}`"),
            })
    }
}

/// Piecewise-linear gradient lookup in display space.
fn gradient_at(stops: &[(f32, u32)], t: f32) -> Vec3 {
    let unpack = |rgb: u32| {
        Vec3::new(
            ((rgb >> 16) & 0xff) as f32,
            ((rgb >> 8) & 0xff) as f32,
            (rgb & 0xff) as f32,
        ) / 255.0
    };
    match stops {
        [] => Vec3::ONE,
        [(_, only)] => unpack(*only),
        _ => {
            for pair in stops.windows(2) {
                let (t0, c0) = pair[0];
                let (t1, c1) = pair[1];
                if t <= t1 {
                    let f = if t1 > t0 { ((t - t0) / (t1 - t0)).clamp(0.0, 1.0) } else { 1.0 };
                    return unpack(c0).lerp(unpack(c1), f);
                }
            }
            unpack(stops[stops.len() - 1].1)
        }
    }
}

/// Alpha-blend a filled disk over the texture, clipped to its bounds.
fn paint_disk(tex: &mut Texture, centre: Vec2, radius: f32, tint: Vec3) {
    let r0 = ((centre.y - radius).floor().max(0.0)) as usize;
    let r1 = ((centre.y + radius).ceil() as usize).min(tex.height);
    let c0 = ((centre.x - radius).floor().max(0.0)) as usize;
    let c1 = ((centre.x + radius).ceil() as usize).min(tex.width);
    let r2 = radius * radius;
    for r in r0..r1 {
        for c in c0..c1 {
            let p = Vec2::new(c as f32 + 0.5, r as f32 + 0.5);
            if p.distance_squared(centre) <= r2 {
                let under = tex.get(r, c);
                let over = under.truncate().lerp(tint, DISK_ALPHA);
                tex.set(r, c, Vec4::new(over.x, over.y, over.z, under.w));
            }
        }
    }
}

/// Map a world direction (z-up) to equirectangular UV.
/// Azimuth wraps along u; the zenith is at v = 1.
pub fn direction_to_equirect(dir: Vec3) -> Vec2 {
    let d = dir.normalize_or(Vec3::Z);
    let u = d.y.atan2(d.x) / (2.0 * PI) + 0.5;
    let v = 1.0 - d.z.clamp(-1.0, 1.0).acos() / PI;
    Vec2::new(u, v)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn none_has_no_texture() {
        assert!(EnvironmentPreset::None.generate(64, 32, 1).is_none());
    }

    #[test]
    fn generation_is_deterministic() {
        let a = EnvironmentPreset::Sunset.generate(64, 32, 7).unwrap();
        let b = EnvironmentPreset::Sunset.generate(64, 32, 7).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn gradient_hits_stop_colors() {
        let stops = EnvironmentPreset::Studio.stops();
        let edge = gradient_at(stops, 0.0);
        let mid = gradient_at(stops, 0.5);
        assert!((edge.x - 0x60 as f32 / 255.0).abs() < 1e-6);
        assert!((mid.x - 0x80 as f32 / 255.0).abs() < 1e-6);
    }

    #[test]
    fn disks_stay_close_to_gradient() {
        let tex = EnvironmentPreset::Night.generate(128, 64, 3).unwrap();
        // At most a handful of 10% overlays: texels stay within the gradient's
        // neighbourhood and remain valid colors.
        for t in &tex.data {
            assert!(t.min_element() >= 0.0 && t.max_element() <= 1.0);
            assert_eq!(t.w, 1.0);
        }
    }

    #[test]
    fn names_parse_back() {
        for p in EnvironmentPreset::ALL {
            assert_eq!(p.name().parse::<EnvironmentPreset>().unwrap(), p);
        }
        assert!("volcano".parse::<EnvironmentPreset>().is_err());
    }

    #[test]
    fn zenith_maps_to_top_row() {
        let uv = direction_to_equirect(Vec3::Z);
        assert!((uv.y - 1.0).abs() < 1e-6);
        let uv = direction_to_equirect(-Vec3::Z);
        assert!(uv.y.abs() < 1e-6);
    }
}
