//! Surface parameter model.
//!
//! `SurfaceParameters` is the complete, externally owned configuration read by
//! every vertex and fragment evaluation. It serialises to a flat camelCase
//! JSON document; texture payloads are not serialised.

pub mod keys;
pub mod presets;

use std::sync::Arc;

use glam::{Vec2, Vec3};
use serde::{Deserialize, Serialize};

use crate::color::serde_hex;
use crate::environment::EnvironmentPreset;
use crate::error::ParamError;
use crate::pbr::PbrMaps;
use crate::texture::Texture;

pub use keys::ParamValue;

/// Number of radial color zones. Fixed.
pub const ZONE_COUNT: usize = 7;

/// Upper bound on ripple octaves accepted from a control surface or snapshot.
pub const MAX_SMALL_WAVE_ITERATIONS: u32 = 5;

// ── Displacement ─────────────────────────────────────────────────────────────

/// Large wave + layered ripple displacement.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct WaveParams {
    pub big_wave_elevation: f32,
    /// Angular frequency along x and y of the plane.
    pub big_wave_frequency: Vec2,
    pub big_wave_speed: f32,
    pub small_wave_elevation: f32,
    pub small_wave_frequency: f32,
    pub small_wave_speed: f32,
    /// Ripple octave count. 0 disables ripples.
    pub small_wave_iterations: u32,
    /// Scales the combined wave height.
    pub stiffness: f32,
    /// Constant offset added after scaling.
    pub drape: f32,
}

impl Default for WaveParams {
    fn default() -> Self {
        Self {
            big_wave_elevation: 0.2,
            big_wave_frequency: Vec2::new(3.75, 3.75),
            big_wave_speed: 0.15,
            small_wave_elevation: 0.15,
            small_wave_frequency: 3.0,
            small_wave_speed: 0.15,
            small_wave_iterations: 2,
            stiffness: 1.0,
            drape: 0.0,
        }
    }
}

// ── Color zones ──────────────────────────────────────────────────────────────

/// Seven radial color zones in UV space.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ColorZones {
    #[serde(with = "serde_hex::array")]
    pub colors: [Vec3; ZONE_COUNT],
    pub color_centers: [Vec2; ZONE_COUNT],
    pub color_radius: f32,
}

impl Default for ColorZones {
    fn default() -> Self {
        Self {
            colors: presets::fabric_palette(),
            color_centers: [
                Vec2::new(0.1, 0.1),
                Vec2::new(0.8, 0.2),
                Vec2::new(0.85, 0.5),
                Vec2::new(0.25, 0.5),
                Vec2::new(0.6, 0.6),
                Vec2::new(0.4, 0.9),
                Vec2::new(0.85, 0.85),
            ],
            color_radius: 0.45,
        }
    }
}

// ── Compositing ──────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Appearance {
    pub opacity: f32,
    /// Circular mask radius as a fraction of the half-extent in UV.
    pub border_radius: f32,
    pub depth_darkening: f32,
    pub grain_strength: f32,
    pub grain_scale: f32,
}

impl Default for Appearance {
    fn default() -> Self {
        Self {
            opacity: 0.9,
            border_radius: 0.9,
            depth_darkening: 0.5,
            grain_strength: 0.3,
            grain_scale: 10.0,
        }
    }
}

// ── Lighting ─────────────────────────────────────────────────────────────────

/// Phong point light. World space is z-up; the flat plane lies in z = 0.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct PointLight {
    #[serde(rename = "lightPosition")]
    pub position: Vec3,
    #[serde(rename = "lightColor", with = "serde_hex")]
    pub color: Vec3,
    #[serde(rename = "lightIntensity")]
    pub intensity: f32,
    pub specular_strength: f32,
    pub shininess: f32,
}

impl Default for PointLight {
    fn default() -> Self {
        Self {
            position: Vec3::new(0.0, 0.0, 15.0),
            color: Vec3::ONE,
            intensity: 1.0,
            specular_strength: 0.5,
            shininess: 32.0,
        }
    }
}

/// Environment ambient source. An absent map falls back to flat white.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct EnvironmentLight {
    #[serde(skip)]
    pub map: Option<Arc<Texture>>,
    #[serde(rename = "environmentPreset")]
    pub preset: EnvironmentPreset,
    #[serde(rename = "environmentIntensity")]
    pub intensity: f32,
}

impl Default for EnvironmentLight {
    fn default() -> Self {
        Self { map: None, preset: EnvironmentPreset::None, intensity: 1.0 }
    }
}

impl EnvironmentLight {
    /// Switch to a named preset, regenerating its texture.
    pub fn select_preset(&mut self, preset: EnvironmentPreset) {
        self.preset = preset;
        self.map = preset.generate_default().map(Arc::new);
    }

    /// Install an externally loaded map. The preset becomes `None`.
    pub fn set_custom_map(&mut self, map: Texture) {
        self.preset = EnvironmentPreset::None;
        self.map = Some(Arc::new(map));
    }

    /// Regenerate the preset texture if it is missing (e.g. after
    /// deserialising a snapshot, which never carries texture data).
    pub fn ensure_map(&mut self) {
        if self.map.is_none() && self.preset != EnvironmentPreset::None {
            self.map = self.preset.generate_default().map(Arc::new);
        }
    }
}

/// Which lighting path is active. The two paths are never summed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum LightSource {
    #[default]
    PointLight,
    Environment,
}

/// The active lighting path together with its configuration.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum LightingMode<'a> {
    PointLight(&'a PointLight),
    Environment(&'a EnvironmentLight),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Lighting {
    pub brightness: f32,
    #[serde(with = "serde_hex")]
    pub ambient_color: Vec3,
    pub ambient_strength: f32,
    pub light_source: LightSource,
    #[serde(flatten)]
    pub point: PointLight,
    #[serde(flatten)]
    pub environment: EnvironmentLight,
}

impl Default for Lighting {
    fn default() -> Self {
        Self {
            brightness: 1.0,
            ambient_color: presets::rgb(presets::AMBIENT_RGB),
            ambient_strength: 0.3,
            light_source: LightSource::PointLight,
            point: PointLight::default(),
            environment: EnvironmentLight::default(),
        }
    }
}

impl Lighting {
    /// Borrow the configuration of the active lighting path only.
    pub fn mode(&self) -> LightingMode<'_> {
        match self.light_source {
            LightSource::PointLight => LightingMode::PointLight(&self.point),
            LightSource::Environment => LightingMode::Environment(&self.environment),
        }
    }

    pub fn use_environment_lighting(&self) -> bool {
        self.light_source == LightSource::Environment
    }

    pub fn set_environment_lighting(&mut self, enabled: bool) {
        self.light_source = if enabled { LightSource::Environment } else { LightSource::PointLight };
    }
}

// ── Debug output ─────────────────────────────────────────────────────────────

/// Raw channel inspection. Anything but `Off` bypasses compositing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum DebugMode {
    #[default]
    Off,
    ShowAo,
    ShowRoughness,
    ShowMetalness,
    ShowNormal,
}

impl std::str::FromStr for DebugMode {
    type Err = ParamError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().replace(['_', '-', ' '], "").as_str() {
            "off" | "none" => Ok(Self::Off),
            "showao" | "ao" => Ok(Self::ShowAo),
            "showroughness" | "roughness" => Ok(Self::ShowRoughness),
            "showmetalness" | "metalness" => Ok(Self::ShowMetalness),
            "shownormal" | "normal" => Ok(Self::ShowNormal),
            _ => Err(ParamError::InvalidValue {
                key: "debugMode".into(),
                reason: format!("unknown debug mode `{s}`"),
            }),
        }
    }
}

// ── Full parameter set ───────────────────────────────────────────────────────

/// Everything one evaluation pass reads. `Default` is the fabric preset.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct SurfaceParameters {
    /// Elapsed seconds; the only animation driver.
    pub time: f32,
    #[serde(flatten)]
    pub waves: WaveParams,
    #[serde(flatten)]
    pub zones: ColorZones,
    #[serde(flatten)]
    pub appearance: Appearance,
    #[serde(flatten)]
    pub lighting: Lighting,
    #[serde(flatten)]
    pub pbr: PbrMaps,
    pub debug_mode: DebugMode,
}

impl Default for SurfaceParameters {
    fn default() -> Self {
        Self::fabric()
    }
}

impl SurfaceParameters {
    /// Parse a JSON snapshot. Missing keys keep fabric defaults; the
    /// environment preset texture is regenerated when one is named.
    pub fn from_json(json: &str) -> Result<Self, ParamError> {
        let mut params: Self =
            serde_json::from_str(json).map_err(|e| ParamError::Json(e.to_string()))?;
        if params.waves.small_wave_iterations > MAX_SMALL_WAVE_ITERATIONS {
            return Err(ParamError::InvalidValue {
                key: "smallWaveIterations".into(),
                reason: format!(
                    "{} exceeds the maximum of {MAX_SMALL_WAVE_ITERATIONS}",
                    params.waves.small_wave_iterations
                ),
            });
        }
        params.lighting.environment.ensure_map();
        Ok(params)
    }

    pub fn to_json(&self) -> Result<String, ParamError> {
        serde_json::to_string_pretty(self).map_err(|e| ParamError::Json(e.to_string()))
    }

    /// Carry texture data over from `prev`, which a JSON snapshot cannot hold.
    /// Gates, strengths and the environment preset come from `self`. A
    /// custom environment map survives while the preset is unchanged.
    pub fn adopt_assets_from(&mut self, prev: &SurfaceParameters) {
        self.pbr.adopt_textures_from(&prev.pbr);
        let env = &mut self.lighting.environment;
        if env.preset == prev.lighting.environment.preset {
            env.map = prev.lighting.environment.map.clone();
        }
    }

    /// Copy of these parameters at a different time.
    pub fn at_time(&self, time: f32) -> Self {
        Self { time, ..self.clone() }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_is_fabric_with_point_light() {
        let p = SurfaceParameters::default();
        assert_eq!(p, SurfaceParameters::fabric());
        assert!(matches!(p.lighting.mode(), LightingMode::PointLight(_)));
    }

    #[test]
    fn toggling_environment_switches_mode() {
        let mut lighting = Lighting::default();
        lighting.set_environment_lighting(true);
        assert!(matches!(lighting.mode(), LightingMode::Environment(_)));
        lighting.set_environment_lighting(false);
        assert!(matches!(lighting.mode(), LightingMode::PointLight(_)));
    }

    #[test]
    fn json_snapshot_is_flat_camel_case() {
        let json = SurfaceParameters::fabric().to_json().unwrap();
        let v: serde_json::Value = serde_json::from_str(&json).unwrap();
        assert!((v["bigWaveElevation"].as_f64().unwrap() - 0.2).abs() < 1e-6);
        assert_eq!(v["colors"][0], "#d95959");
        assert_eq!(v["lightSource"], "pointLight");
        assert_eq!(v["debugMode"], "off");
        assert!(v.get("lightPosition").is_some());
        assert!(v.get("environmentIntensity").is_some());
    }

    #[test]
    fn json_roundtrip_preserves_scalars() {
        let mut p = SurfaceParameters::fabric();
        p.waves.small_wave_iterations = 5;
        p.appearance.opacity = 0.25;
        p.debug_mode = DebugMode::ShowNormal;
        let back = SurfaceParameters::from_json(&p.to_json().unwrap()).unwrap();
        assert_eq!(back.waves, p.waves);
        assert_eq!(back.appearance, p.appearance);
        assert_eq!(back.debug_mode, DebugMode::ShowNormal);
        assert_eq!(back.zones.color_centers, p.zones.color_centers);
    }

    #[test]
    fn partial_json_keeps_defaults() {
        let p = SurfaceParameters::from_json(r#"{ "stiffness": 0.0, "drape": 0.25 }"#).unwrap();
        assert_eq!(p.waves.stiffness, 0.0);
        assert_eq!(p.waves.drape, 0.25);
        assert_eq!(p.zones, ColorZones::default());
    }

    #[test]
    fn snapshot_keeps_its_gates_and_adopts_loaded_textures() {
        let mut live = SurfaceParameters::water();
        live.pbr.diffuse.attach("diffuseMap", Texture::new(1, 1, glam::Vec4::ONE)).unwrap();
        live.lighting.environment.set_custom_map(Texture::new(2, 1, glam::Vec4::ONE).unwrap());

        let mut next =
            SurfaceParameters::from_json(r#"{ "diffuseMap": { "enabled": false, "strength": 0.25 } }"#).unwrap();
        next.adopt_assets_from(&live);
        assert!(next.pbr.diffuse.has_texture());
        assert!(!next.pbr.diffuse.is_enabled());
        assert_eq!(next.pbr.diffuse.strength, 0.25);
        assert_eq!(next.lighting.environment.map.as_ref().map(|m| m.width), Some(2));
    }

    #[test]
    fn snapshot_naming_another_preset_replaces_custom_map() {
        let mut live = SurfaceParameters::fabric();
        live.lighting.environment.set_custom_map(Texture::new(2, 1, glam::Vec4::ONE).unwrap());

        let mut next = SurfaceParameters::from_json(r#"{ "environmentPreset": "sunset" }"#).unwrap();
        next.adopt_assets_from(&live);
        assert_eq!(next.lighting.environment.preset, EnvironmentPreset::Sunset);
        assert_ne!(next.lighting.environment.map.as_ref().map(|m| m.width), Some(2));
        assert!(next.lighting.environment.map.is_some());
    }

    #[test]
    fn snapshot_rejects_runaway_iterations() {
        let err = SurfaceParameters::from_json(r#"{ "smallWaveIterations": 4000000000 }"#);
        assert!(matches!(err, Err(ParamError::InvalidValue { .. })));
        assert!(SurfaceParameters::from_json(r#"{ "smallWaveIterations": 5 }"#).is_ok());
    }

    #[test]
    fn malformed_json_is_an_error() {
        assert!(matches!(
            SurfaceParameters::from_json("{ not json"),
            Err(ParamError::Json(_))
        ));
        assert!(SurfaceParameters::from_json(r##"{ "colors": ["#ffffff"] }"##).is_err());
    }

    #[test]
    fn debug_mode_parses_loosely() {
        assert_eq!("ShowNormal".parse::<DebugMode>().unwrap(), DebugMode::ShowNormal);
        assert_eq!("show_ao".parse::<DebugMode>().unwrap(), DebugMode::ShowAo);
        assert!("sparkle".parse::<DebugMode>().is_err());
    }
}
