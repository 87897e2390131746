//! Film-grain overlay from 2D Perlin noise.
use glam::Vec2;
use noise::{NoiseFn, Perlin};

const GRAIN_SEED: u32 = 0x6EA1_2024;

/// Fixed-seed grain field. Construct once and share across fragments.
pub struct Grain {
    noise: Perlin,
}

impl Grain {
    pub fn new() -> Self {
        Self { noise: Perlin::new(GRAIN_SEED) }
    }

    /// Signed grain in roughly [−1, 1] at `uv · scale`.
    pub fn sample(&self, uv: Vec2, scale: f32) -> f32 {
        let p = uv * scale;
        self.noise.get([p.x as f64, p.y as f64]) as f32
    }
}

impl Default for Grain {
    fn default() -> Self {
        Self::new()
    }
}
