//! Hex color parsing and sRGB transfer functions.
//!
//! Colors inside the evaluator are linear RGB `Vec3`s. Hex strings coming
//! from the control surface are sRGB and are linearised on the way in; frame
//! output is sRGB-encoded on the way out.
use glam::{Vec3, Vec4};

use crate::error::ColorError;

#[inline]
pub fn srgb_to_linear(c: f32) -> f32 {
    if c <= 0.04045 {
        c / 12.92
    } else {
        ((c + 0.055) / 1.055).powf(2.4)
    }
}

#[inline]
pub fn linear_to_srgb(c: f32) -> f32 {
    if c <= 0.003_130_8 {
        c * 12.92
    } else {
        1.055 * c.powf(1.0 / 2.4) - 0.055
    }
}

/// Parse `#rrggbb` (leading `#` optional) into a linear RGB color.
pub fn parse_hex(hex: &str) -> Result<Vec3, ColorError> {
    let digits = hex.trim().trim_start_matches('#');
    if digits.len() != 6 || !digits.chars().all(|c| c.is_ascii_hexdigit()) {
        return Err(ColorError::InvalidHex(hex.to_string()));
    }
    let channel = |i: usize| -> Result<f32, ColorError> {
        u8::from_str_radix(&digits[i..i + 2], 16)
            .map(|v| srgb_to_linear(v as f32 / 255.0))
            .map_err(|_| ColorError::InvalidHex(hex.to_string()))
    };
    Ok(Vec3::new(channel(0)?, channel(2)?, channel(4)?))
}

/// Format a linear RGB color as an sRGB `#rrggbb` string.
pub fn to_hex(color: Vec3) -> String {
    let [r, g, b] = encode_srgb8(color);
    format!("#{r:02x}{g:02x}{b:02x}")
}

/// Linear RGB → 8-bit sRGB, clamped.
pub fn encode_srgb8(color: Vec3) -> [u8; 3] {
    let q = |c: f32| (linear_to_srgb(c.clamp(0.0, 1.0)) * 255.0).round() as u8;
    [q(color.x), q(color.y), q(color.z)]
}

/// Linear RGBA → 8-bit sRGB with linear alpha.
pub fn encode_srgba8(color: Vec4) -> [u8; 4] {
    let [r, g, b] = encode_srgb8(color.truncate());
    [r, g, b, (color.w.clamp(0.0, 1.0) * 255.0).round() as u8]
}

/// Serde adapters storing linear colors as sRGB hex strings.
pub mod serde_hex {
    use glam::Vec3;
    use serde::{de::Error as _, Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(color: &Vec3, s: S) -> Result<S::Ok, S::Error> {
        s.serialize_str(&super::to_hex(*color))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(d: D) -> Result<Vec3, D::Error> {
        let hex = String::deserialize(d)?;
        super::parse_hex(&hex).map_err(D::Error::custom)
    }

    /// Same encoding for a fixed-size palette.
    pub mod array {
        use glam::Vec3;
        use serde::{de::Error as _, ser::SerializeTuple, Deserialize, Deserializer, Serializer};

        pub fn serialize<S: Serializer, const N: usize>(
            colors: &[Vec3; N],
            s: S,
        ) -> Result<S::Ok, S::Error> {
            let mut tup = s.serialize_tuple(N)?;
            for c in colors {
                tup.serialize_element(&super::super::to_hex(*c))?;
            }
            tup.end()
        }

        pub fn deserialize<'de, D: Deserializer<'de>, const N: usize>(
            d: D,
        ) -> Result<[Vec3; N], D::Error> {
            let hexes = Vec::<String>::deserialize(d)?;
            if hexes.len() != N {
                return Err(D::Error::invalid_length(hexes.len(), &"one color per zone"));
            }
            let mut out = [Vec3::ZERO; N];
            for (slot, hex) in out.iter_mut().zip(&hexes) {
                *slot = super::super::parse_hex(hex).map_err(D::Error::custom)?;
            }
            Ok(out)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hex_roundtrips_through_linear() {
        for hex in ["#d95959", "#c651ff", "#4e9fff", "#000000", "#ffffff"] {
            let c = parse_hex(hex).unwrap();
            assert_eq!(to_hex(c), hex);
        }
    }

    #[test]
    fn hex_without_hash_is_accepted() {
        assert_eq!(parse_hex("ffffff").unwrap(), Vec3::ONE);
    }

    #[test]
    fn malformed_hex_is_rejected() {
        assert!(parse_hex("#fff").is_err());
        assert!(parse_hex("#gg0000").is_err());
        assert!(parse_hex("").is_err());
    }

    #[test]
    fn mid_grey_linearises_below_half() {
        let c = parse_hex("#808080").unwrap();
        assert!(c.x > 0.2 && c.x < 0.23, "got {}", c.x);
    }
}
