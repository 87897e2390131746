//! Optional PBR texture compositing.
//!
//! Three independently gated slots: diffuse color, tangent-space normal, and
//! a packed AO (R) / roughness (G) / metalness (B) map. A slot contributes
//! only while its gate is set AND a texture is present; otherwise the
//! procedural default is used for that channel.
use std::sync::Arc;

use glam::{Vec2, Vec3, Vec4};
use log::warn;
use serde::{Deserialize, Serialize};

use crate::error::TextureError;
use crate::params::DebugMode;
use crate::texture::Texture;

/// One optional texture with its `use` gate and strength multiplier.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct TextureSlot {
    #[serde(skip)]
    texture: Option<Arc<Texture>>,
    enabled: bool,
    pub strength: f32,
}

impl Default for TextureSlot {
    fn default() -> Self {
        Self { texture: None, enabled: false, strength: 1.0 }
    }
}

impl TextureSlot {
    /// Install the outcome of a texture load. On success the gate is set; on
    /// failure the slot is emptied and the gate cleared so the procedural
    /// fallback stays active.
    pub fn attach(&mut self, name: &str, loaded: Result<Texture, TextureError>) -> Result<(), TextureError> {
        match loaded {
            Ok(tex) => {
                self.texture = Some(Arc::new(tex));
                self.enabled = true;
                Ok(())
            }
            Err(e) => {
                warn!("{name} texture unavailable, keeping procedural fallback: {e}");
                self.texture = None;
                self.enabled = false;
                Err(e)
            }
        }
    }

    pub fn detach(&mut self) {
        self.texture = None;
        self.enabled = false;
    }

    /// The gate as last written. It has no effect while no texture is present.
    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    pub fn set_enabled(&mut self, enabled: bool) {
        self.enabled = enabled;
    }

    pub fn has_texture(&self) -> bool {
        self.texture.is_some()
    }

    /// Take over `other`'s texture, keeping this slot's gate and strength.
    pub fn adopt_texture_from(&mut self, other: &TextureSlot) {
        self.texture = other.texture.clone();
    }

    /// The texture to sample, if the slot is live.
    pub fn active(&self) -> Option<&Texture> {
        if self.enabled {
            self.texture.as_deref()
        } else {
            None
        }
    }
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct PbrMaps {
    #[serde(rename = "diffuseMap")]
    pub diffuse: TextureSlot,
    #[serde(rename = "normalMap")]
    pub normal: TextureSlot,
    #[serde(rename = "aoRoughMetalMap")]
    pub ao_rough_metal: TextureSlot,
}

impl PbrMaps {
    pub fn clear(&mut self) {
        self.diffuse.detach();
        self.normal.detach();
        self.ao_rough_metal.detach();
    }

    /// Carry loaded textures over from `other`; gates and strengths stay.
    pub fn adopt_textures_from(&mut self, other: &PbrMaps) {
        self.diffuse.adopt_texture_from(&other.diffuse);
        self.normal.adopt_texture_from(&other.normal);
        self.ao_rough_metal.adopt_texture_from(&other.ao_rough_metal);
    }
}

/// Per-fragment surface inputs after texture compositing.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PbrSample {
    pub color: Vec3,
    pub normal: Vec3,
    pub ao: f32,
    pub roughness: f32,
    pub metalness: f32,
}

/// Composite the gated textures over the procedural color and geometric
/// normal at `uv`.
pub fn sample_pbr(maps: &PbrMaps, uv: Vec2, procedural: Vec3, normal: Vec3) -> PbrSample {
    let mut out = PbrSample { color: procedural, normal, ao: 1.0, roughness: 0.0, metalness: 0.0 };

    if let Some(tex) = maps.diffuse.active() {
        let s = maps.diffuse.strength.clamp(0.0, 1.0);
        out.color = procedural.lerp(tex.sample(uv).truncate(), s);
    }

    if let Some(tex) = maps.normal.active() {
        let t = tex.sample(uv).truncate() * 2.0 - Vec3::ONE;
        let tangent = Vec3::Y.cross(normal).normalize_or(Vec3::X);
        let bitangent = normal.cross(tangent);
        let mapped = (tangent * t.x + bitangent * t.y + normal * t.z).normalize_or(normal);
        out.normal = normal.lerp(mapped, maps.normal.strength.clamp(0.0, 1.0)).normalize_or(normal);
    }

    if let Some(tex) = maps.ao_rough_metal.active() {
        let s = maps.ao_rough_metal.strength.clamp(0.0, 1.0);
        let arm = tex.sample(uv);
        out.ao = 1.0 + (arm.x - 1.0) * s;
        out.roughness = arm.y * s;
        out.metalness = arm.z * s;
    }

    out
}

/// Raw channel view for `debug`. `None` when debug output is off.
pub fn debug_output(sample: &PbrSample, debug: DebugMode) -> Option<Vec4> {
    let grey = |v: f32| Vec4::new(v, v, v, 1.0);
    match debug {
        DebugMode::Off => None,
        DebugMode::ShowAo => Some(grey(sample.ao)),
        DebugMode::ShowRoughness => Some(grey(sample.roughness)),
        DebugMode::ShowMetalness => Some(grey(sample.metalness)),
        DebugMode::ShowNormal => Some((sample.normal * 0.5 + Vec3::splat(0.5)).extend(1.0)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn solid(rgba: [u8; 4]) -> Texture {
        Texture::from_rgba8(2, 2, &rgba.repeat(4)).unwrap()
    }

    #[test]
    fn absent_textures_yield_procedural_defaults() {
        let maps = PbrMaps::default();
        let s = sample_pbr(&maps, Vec2::splat(0.5), Vec3::new(0.2, 0.4, 0.6), Vec3::Z);
        assert_eq!(s.color, Vec3::new(0.2, 0.4, 0.6));
        assert_eq!(s.normal, Vec3::Z);
        assert_eq!((s.ao, s.roughness, s.metalness), (1.0, 0.0, 0.0));
    }

    #[test]
    fn gate_without_texture_is_inert() {
        let mut maps = PbrMaps::default();
        maps.diffuse.set_enabled(true);
        let s = sample_pbr(&maps, Vec2::splat(0.5), Vec3::X, Vec3::Z);
        assert_eq!(s.color, Vec3::X);
    }

    #[test]
    fn disabled_gate_ignores_attached_texture() {
        let mut maps = PbrMaps::default();
        maps.diffuse.attach("diffuse", Ok(solid([0, 255, 0, 255]))).unwrap();
        maps.diffuse.set_enabled(false);
        let s = sample_pbr(&maps, Vec2::splat(0.5), Vec3::X, Vec3::Z);
        assert_eq!(s.color, Vec3::X);
    }

    #[test]
    fn failed_load_clears_the_gate() {
        let mut slot = TextureSlot::default();
        slot.attach("normal", Ok(solid([128, 128, 255, 255]))).unwrap();
        assert!(slot.is_enabled());
        let err = slot.attach("normal", Texture::from_rgba8(2, 2, &[0; 3]));
        assert!(err.is_err());
        assert!(!slot.is_enabled());
        assert!(!slot.has_texture());
    }

    #[test]
    fn adopted_texture_keeps_own_gate_and_strength() {
        let mut loaded = PbrMaps::default();
        loaded.diffuse.attach("diffuse", Ok(solid([0, 255, 0, 255]))).unwrap();

        let mut snapshot = PbrMaps::default();
        snapshot.diffuse.strength = 0.25;
        snapshot.adopt_textures_from(&loaded);
        assert!(snapshot.diffuse.has_texture());
        assert!(!snapshot.diffuse.is_enabled());
        assert_eq!(snapshot.diffuse.strength, 0.25);
        assert!(!snapshot.normal.has_texture());
    }

    #[test]
    fn arm_channels_are_unpacked() {
        let mut maps = PbrMaps::default();
        maps.ao_rough_metal.attach("arm", Ok(solid([51, 204, 255, 255]))).unwrap();
        let s = sample_pbr(&maps, Vec2::splat(0.5), Vec3::ONE, Vec3::Z);
        assert!((s.ao - 0.2).abs() < 1e-3);
        assert!((s.roughness - 0.8).abs() < 1e-3);
        assert!((s.metalness - 1.0).abs() < 1e-3);
    }

    #[test]
    fn flat_normal_map_keeps_geometric_normal() {
        let mut maps = PbrMaps::default();
        maps.normal.attach("normal", Ok(solid([128, 128, 255, 255]))).unwrap();
        let s = sample_pbr(&maps, Vec2::splat(0.5), Vec3::ONE, Vec3::Z);
        assert!(s.normal.distance(Vec3::Z) < 1e-2);
    }

    #[test]
    fn debug_normal_is_remapped_to_unit_range() {
        let s = sample_pbr(&PbrMaps::default(), Vec2::ZERO, Vec3::ZERO, Vec3::Z);
        assert_eq!(debug_output(&s, DebugMode::ShowNormal), Some(Vec4::new(0.5, 0.5, 1.0, 1.0)));
        assert_eq!(debug_output(&s, DebugMode::Off), None);
    }
}
