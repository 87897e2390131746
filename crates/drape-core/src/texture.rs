use glam::{Vec2, Vec4};

use crate::color::srgb_to_linear;
use crate::error::TextureError;

/// A 2D RGBA texture, row-major with row 0 at the top of the image.
/// Channels are stored as f32 in [0, 1].
#[derive(Debug, Clone, PartialEq)]
pub struct Texture {
    pub data: Vec<Vec4>,
    pub width: usize,
    pub height: usize,
}

impl Texture {
    /// Create a texture filled with a single value.
    pub fn new(width: usize, height: usize, fill: Vec4) -> Result<Self, TextureError> {
        if width == 0 || height == 0 {
            return Err(TextureError::EmptyDimensions { width, height });
        }
        Ok(Self { data: vec![fill; width * height], width, height })
    }

    /// Build a texture by evaluating `f(row, col)` for every texel.
    pub fn from_fn(
        width: usize,
        height: usize,
        mut f: impl FnMut(usize, usize) -> Vec4,
    ) -> Result<Self, TextureError> {
        if width == 0 || height == 0 {
            return Err(TextureError::EmptyDimensions { width, height });
        }
        let mut data = Vec::with_capacity(width * height);
        for r in 0..height {
            for c in 0..width {
                data.push(f(r, c));
            }
        }
        Ok(Self { data, width, height })
    }

    /// Wrap raw RGBA8 bytes without any color-space conversion.
    /// Use for data maps (normal, AO/roughness/metalness).
    pub fn from_rgba8(width: usize, height: usize, bytes: &[u8]) -> Result<Self, TextureError> {
        Self::decode(width, height, bytes, |v| v)
    }

    /// Wrap sRGB-encoded RGBA8 bytes, linearising the color channels.
    /// Use for color maps (diffuse).
    pub fn from_srgba8(width: usize, height: usize, bytes: &[u8]) -> Result<Self, TextureError> {
        Self::decode(width, height, bytes, srgb_to_linear)
    }

    fn decode(
        width: usize,
        height: usize,
        bytes: &[u8],
        transfer: fn(f32) -> f32,
    ) -> Result<Self, TextureError> {
        if width == 0 || height == 0 {
            return Err(TextureError::EmptyDimensions { width, height });
        }
        let expected = width * height * 4;
        if bytes.len() != expected {
            return Err(TextureError::ByteLength { width, height, expected, actual: bytes.len() });
        }
        let data = bytes
            .chunks_exact(4)
            .map(|px| {
                Vec4::new(
                    transfer(px[0] as f32 / 255.0),
                    transfer(px[1] as f32 / 255.0),
                    transfer(px[2] as f32 / 255.0),
                    px[3] as f32 / 255.0,
                )
            })
            .collect();
        Ok(Self { data, width, height })
    }

    #[inline]
    pub fn get(&self, row: usize, col: usize) -> Vec4 {
        self.data[row * self.width + col]
    }

    #[inline]
    pub fn set(&mut self, row: usize, col: usize, val: Vec4) {
        self.data[row * self.width + col] = val;
    }

    /// Bilinear sample at `uv` with repeat wrapping on both axes.
    ///
    /// `v = 0` is the bottom row and `v = 1` the top row; texel centres sit at
    /// half-integer positions, so `uv = ((c + 0.5) / w, 1 − (r + 0.5) / h)`
    /// returns texel `(r, c)` exactly.
    pub fn sample(&self, uv: Vec2) -> Vec4 {
        let fx = uv.x * self.width as f32 - 0.5;
        let fy = (1.0 - uv.y) * self.height as f32 - 0.5;

        let x0f = fx.floor();
        let y0f = fy.floor();
        let tx = fx - x0f;
        let ty = fy - y0f;

        let x0 = wrap(x0f as i64, self.width);
        let y0 = wrap(y0f as i64, self.height);
        let x1 = (x0 + 1) % self.width;
        let y1 = (y0 + 1) % self.height;

        let v00 = self.get(y0, x0);
        let v10 = self.get(y0, x1);
        let v01 = self.get(y1, x0);
        let v11 = self.get(y1, x1);

        v00 * (1.0 - tx) * (1.0 - ty)
            + v10 * tx * (1.0 - ty)
            + v01 * (1.0 - tx) * ty
            + v11 * tx * ty
    }
}

#[inline]
fn wrap(i: i64, n: usize) -> usize {
    i.rem_euclid(n as i64) as usize
}

#[cfg(test)]
mod tests {
    use super::*;

    fn checker() -> Texture {
        Texture::from_fn(4, 4, |r, c| {
            let v = ((r + c) % 2) as f32;
            Vec4::new(v, v, v, 1.0)
        })
        .unwrap()
    }

    #[test]
    fn sample_texel_centres_return_exact_values() {
        let mut tex = Texture::new(4, 4, Vec4::ZERO).unwrap();
        tex.set(0, 0, Vec4::splat(10.0));
        tex.set(0, 3, Vec4::splat(20.0));
        tex.set(3, 0, Vec4::splat(30.0));
        tex.set(3, 3, Vec4::splat(40.0));

        let centre = |r: usize, c: usize| Vec2::new((c as f32 + 0.5) / 4.0, 1.0 - (r as f32 + 0.5) / 4.0);
        assert!((tex.sample(centre(0, 0)).x - 10.0).abs() < 1e-5);
        assert!((tex.sample(centre(0, 3)).x - 20.0).abs() < 1e-5);
        assert!((tex.sample(centre(3, 0)).x - 30.0).abs() < 1e-5);
        assert!((tex.sample(centre(3, 3)).x - 40.0).abs() < 1e-5);
    }

    #[test]
    fn sampling_repeats_outside_unit_square() {
        let tex = checker();
        let uv = Vec2::new(0.3, 0.6);
        let a = tex.sample(uv);
        let b = tex.sample(uv + Vec2::new(1.0, -2.0));
        assert!((a - b).abs().max_element() < 1e-5);
    }

    #[test]
    fn rgba8_length_mismatch_is_rejected() {
        let err = Texture::from_rgba8(2, 2, &[0u8; 15]).unwrap_err();
        assert_eq!(
            err,
            TextureError::ByteLength { width: 2, height: 2, expected: 16, actual: 15 }
        );
        assert!(Texture::from_rgba8(0, 2, &[]).is_err());
    }

    #[test]
    fn srgb_bytes_are_linearised() {
        let tex = Texture::from_srgba8(1, 1, &[128, 128, 128, 255]).unwrap();
        let raw = Texture::from_rgba8(1, 1, &[128, 128, 128, 255]).unwrap();
        assert!(tex.get(0, 0).x < raw.get(0, 0).x);
        assert_eq!(tex.get(0, 0).w, 1.0);
    }
}
