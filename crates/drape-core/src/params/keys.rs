//! Key-based access to `SurfaceParameters`.
//!
//! A control panel translates each widget change into `set(key, value)`.
//! Keys are camelCase; zone entries are addressed as `colors.N` and
//! `colorCenters.N` with `N` in 0..7, vector components as `name.x`.
use glam::{Vec2, Vec3};
use serde::{Deserialize, Serialize};

use super::{DebugMode, SurfaceParameters, MAX_SMALL_WAVE_ITERATIONS, ZONE_COUNT};
use crate::color::{parse_hex, to_hex};
use crate::environment::EnvironmentPreset;
use crate::error::ParamError;

/// A loosely typed value coming from, or going to, a control surface.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ParamValue {
    Bool(bool),
    Number(f32),
    Vec2([f32; 2]),
    Vec3([f32; 3]),
    Text(String),
}

impl From<f32> for ParamValue {
    fn from(v: f32) -> Self {
        Self::Number(v)
    }
}

impl From<f64> for ParamValue {
    fn from(v: f64) -> Self {
        Self::Number(v as f32)
    }
}

impl From<bool> for ParamValue {
    fn from(v: bool) -> Self {
        Self::Bool(v)
    }
}

impl From<Vec2> for ParamValue {
    fn from(v: Vec2) -> Self {
        Self::Vec2(v.to_array())
    }
}

impl From<Vec3> for ParamValue {
    fn from(v: Vec3) -> Self {
        Self::Vec3(v.to_array())
    }
}

impl From<&str> for ParamValue {
    fn from(v: &str) -> Self {
        Self::Text(v.to_string())
    }
}

/// Axis selector for component keys such as `lightPosition.y`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Axis {
    X,
    Y,
    Z,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ParamKey {
    Time,
    BigWaveElevation,
    BigWaveFrequency(Option<Axis>),
    BigWaveSpeed,
    SmallWaveElevation,
    SmallWaveFrequency,
    SmallWaveSpeed,
    SmallWaveIterations,
    Stiffness,
    Drape,
    Color(usize),
    ColorCenter(usize, Option<Axis>),
    ColorRadius,
    Opacity,
    BorderRadius,
    DepthDarkening,
    GrainStrength,
    GrainScale,
    Brightness,
    AmbientColor,
    AmbientStrength,
    LightPosition(Option<Axis>),
    LightColor,
    LightIntensity,
    SpecularStrength,
    Shininess,
    UseEnvironmentLighting,
    EnvironmentIntensity,
    EnvironmentPreset,
    UseDiffuseTexture,
    DiffuseStrength,
    UseNormalTexture,
    NormalStrength,
    UseAoRoughMetalTexture,
    AoRoughMetalStrength,
    DebugMode,
}

/// Every accepted key, for listing in control surfaces and help output.
pub const KEYS: &[&str] = &[
    "time",
    "bigWaveElevation",
    "bigWaveFrequency",
    "bigWaveSpeed",
    "smallWaveElevation",
    "smallWaveFrequency",
    "smallWaveSpeed",
    "smallWaveIterations",
    "stiffness",
    "drape",
    "colors.N",
    "colorCenters.N",
    "colorRadius",
    "opacity",
    "borderRadius",
    "depthDarkening",
    "grainStrength",
    "grainScale",
    "brightness",
    "ambientColor",
    "ambientStrength",
    "lightPosition",
    "lightColor",
    "lightIntensity",
    "specularStrength",
    "shininess",
    "useEnvironmentLighting",
    "environmentIntensity",
    "environmentPreset",
    "useDiffuseTexture",
    "diffuseStrength",
    "useNormalTexture",
    "normalStrength",
    "useAoRoughMetalTexture",
    "aoRoughMetalStrength",
    "debugMode",
];

impl ParamKey {
    fn parse(key: &str) -> Result<Self, ParamError> {
        let unknown = || ParamError::UnknownKey(key.to_string());
        let mut parts = key.split('.');
        let head = parts.next().unwrap_or_default();
        let rest: Vec<&str> = parts.collect();

        let axis = |s: &str| match s {
            "x" => Some(Axis::X),
            "y" => Some(Axis::Y),
            "z" => Some(Axis::Z),
            _ => None,
        };
        let zone = |s: &str| -> Result<usize, ParamError> {
            let i: usize = s.parse().map_err(|_| unknown())?;
            if i >= ZONE_COUNT {
                return Err(ParamError::ZoneIndex(i));
            }
            Ok(i)
        };

        let parsed = match (head, rest.as_slice()) {
            ("bigWaveFrequency", []) => Self::BigWaveFrequency(None),
            ("bigWaveFrequency", [a]) => match axis(*a) {
                Some(Axis::Z) | None => return Err(unknown()),
                some => Self::BigWaveFrequency(some),
            },
            ("lightPosition", []) => Self::LightPosition(None),
            ("lightPosition", [a]) => Self::LightPosition(Some(axis(*a).ok_or_else(unknown)?)),
            ("colors", [i]) => Self::Color(zone(*i)?),
            ("colorCenters", [i]) => Self::ColorCenter(zone(*i)?, None),
            ("colorCenters", [i, a]) => match axis(*a) {
                Some(Axis::Z) | None => return Err(unknown()),
                some => Self::ColorCenter(zone(*i)?, some),
            },
            (name, []) => match name {
                "time" => Self::Time,
                "bigWaveElevation" => Self::BigWaveElevation,
                "bigWaveSpeed" => Self::BigWaveSpeed,
                "smallWaveElevation" => Self::SmallWaveElevation,
                "smallWaveFrequency" => Self::SmallWaveFrequency,
                "smallWaveSpeed" => Self::SmallWaveSpeed,
                "smallWaveIterations" => Self::SmallWaveIterations,
                "stiffness" => Self::Stiffness,
                "drape" => Self::Drape,
                "colorRadius" => Self::ColorRadius,
                "opacity" => Self::Opacity,
                "borderRadius" => Self::BorderRadius,
                "depthDarkening" => Self::DepthDarkening,
                "grainStrength" => Self::GrainStrength,
                "grainScale" => Self::GrainScale,
                "brightness" => Self::Brightness,
                "ambientColor" => Self::AmbientColor,
                "ambientStrength" => Self::AmbientStrength,
                "lightColor" => Self::LightColor,
                "lightIntensity" => Self::LightIntensity,
                "specularStrength" => Self::SpecularStrength,
                "shininess" => Self::Shininess,
                "useEnvironmentLighting" => Self::UseEnvironmentLighting,
                "environmentIntensity" => Self::EnvironmentIntensity,
                "environmentPreset" => Self::EnvironmentPreset,
                "useDiffuseTexture" => Self::UseDiffuseTexture,
                "diffuseStrength" => Self::DiffuseStrength,
                "useNormalTexture" => Self::UseNormalTexture,
                "normalStrength" => Self::NormalStrength,
                "useAoRoughMetalTexture" => Self::UseAoRoughMetalTexture,
                "aoRoughMetalStrength" => Self::AoRoughMetalStrength,
                "debugMode" => Self::DebugMode,
                _ => return Err(unknown()),
            },
            _ => return Err(unknown()),
        };
        Ok(parsed)
    }
}

// ── Value coercion ───────────────────────────────────────────────────────────

fn wrong(key: &str, expected: &'static str) -> ParamError {
    ParamError::WrongKind { key: key.to_string(), expected }
}

fn number(key: &str, v: &ParamValue) -> Result<f32, ParamError> {
    match v {
        ParamValue::Number(n) => Ok(*n),
        _ => Err(wrong(key, "a number")),
    }
}

fn flag(key: &str, v: &ParamValue) -> Result<bool, ParamError> {
    match v {
        ParamValue::Bool(b) => Ok(*b),
        ParamValue::Number(n) => Ok(*n != 0.0),
        _ => Err(wrong(key, "a boolean")),
    }
}

fn vec2(key: &str, v: &ParamValue) -> Result<Vec2, ParamError> {
    match v {
        ParamValue::Vec2(a) => Ok(Vec2::from_array(*a)),
        _ => Err(wrong(key, "a [x, y] pair")),
    }
}

fn vec3(key: &str, v: &ParamValue) -> Result<Vec3, ParamError> {
    match v {
        ParamValue::Vec3(a) => Ok(Vec3::from_array(*a)),
        _ => Err(wrong(key, "an [x, y, z] triple")),
    }
}

/// Colors are accepted as `#rrggbb` strings or linear `[r, g, b]` triples.
fn color(key: &str, v: &ParamValue) -> Result<Vec3, ParamError> {
    match v {
        ParamValue::Text(hex) => Ok(parse_hex(hex)?),
        ParamValue::Vec3(a) => Ok(Vec3::from_array(*a)),
        _ => Err(wrong(key, "a #rrggbb color")),
    }
}

fn iterations(key: &str, v: &ParamValue) -> Result<u32, ParamError> {
    let n = number(key, v)?;
    if n < 0.0 || n.fract() != 0.0 || !n.is_finite() {
        return Err(ParamError::InvalidValue {
            key: key.to_string(),
            reason: format!("{n} is not a non-negative integer"),
        });
    }
    if n > MAX_SMALL_WAVE_ITERATIONS as f32 {
        return Err(ParamError::InvalidValue {
            key: key.to_string(),
            reason: format!("{n} exceeds the maximum of {MAX_SMALL_WAVE_ITERATIONS}"),
        });
    }
    Ok(n as u32)
}

fn set_axis2(target: &mut Vec2, axis: Option<Axis>, key: &str, v: &ParamValue) -> Result<(), ParamError> {
    match axis {
        None => *target = vec2(key, v)?,
        Some(Axis::X) => target.x = number(key, v)?,
        Some(Axis::Y) => target.y = number(key, v)?,
        Some(Axis::Z) => return Err(ParamError::UnknownKey(key.to_string())),
    }
    Ok(())
}

fn get_axis2(v: Vec2, axis: Option<Axis>) -> ParamValue {
    match axis {
        None => v.into(),
        Some(Axis::X) => v.x.into(),
        Some(_) => v.y.into(),
    }
}

// ── Public interface ─────────────────────────────────────────────────────────

impl SurfaceParameters {
    /// Write one parameter. The value takes effect on the next evaluation.
    pub fn set(&mut self, key: &str, value: impl Into<ParamValue>) -> Result<(), ParamError> {
        let v = value.into();
        let w = &mut self.waves;
        let a = &mut self.appearance;
        let l = &mut self.lighting;
        match ParamKey::parse(key)? {
            ParamKey::Time => self.time = number(key, &v)?,
            ParamKey::BigWaveElevation => w.big_wave_elevation = number(key, &v)?,
            ParamKey::BigWaveFrequency(axis) => set_axis2(&mut w.big_wave_frequency, axis, key, &v)?,
            ParamKey::BigWaveSpeed => w.big_wave_speed = number(key, &v)?,
            ParamKey::SmallWaveElevation => w.small_wave_elevation = number(key, &v)?,
            ParamKey::SmallWaveFrequency => w.small_wave_frequency = number(key, &v)?,
            ParamKey::SmallWaveSpeed => w.small_wave_speed = number(key, &v)?,
            ParamKey::SmallWaveIterations => w.small_wave_iterations = iterations(key, &v)?,
            ParamKey::Stiffness => w.stiffness = number(key, &v)?,
            ParamKey::Drape => w.drape = number(key, &v)?,
            ParamKey::Color(i) => self.zones.colors[i] = color(key, &v)?,
            ParamKey::ColorCenter(i, axis) => {
                set_axis2(&mut self.zones.color_centers[i], axis, key, &v)?
            }
            ParamKey::ColorRadius => self.zones.color_radius = number(key, &v)?,
            ParamKey::Opacity => a.opacity = number(key, &v)?,
            ParamKey::BorderRadius => a.border_radius = number(key, &v)?,
            ParamKey::DepthDarkening => a.depth_darkening = number(key, &v)?,
            ParamKey::GrainStrength => a.grain_strength = number(key, &v)?,
            ParamKey::GrainScale => a.grain_scale = number(key, &v)?,
            ParamKey::Brightness => l.brightness = number(key, &v)?,
            ParamKey::AmbientColor => l.ambient_color = color(key, &v)?,
            ParamKey::AmbientStrength => l.ambient_strength = number(key, &v)?,
            ParamKey::LightPosition(axis) => match axis {
                None => l.point.position = vec3(key, &v)?,
                Some(Axis::X) => l.point.position.x = number(key, &v)?,
                Some(Axis::Y) => l.point.position.y = number(key, &v)?,
                Some(Axis::Z) => l.point.position.z = number(key, &v)?,
            },
            ParamKey::LightColor => l.point.color = color(key, &v)?,
            ParamKey::LightIntensity => l.point.intensity = number(key, &v)?,
            ParamKey::SpecularStrength => l.point.specular_strength = number(key, &v)?,
            ParamKey::Shininess => l.point.shininess = number(key, &v)?,
            ParamKey::UseEnvironmentLighting => l.set_environment_lighting(flag(key, &v)?),
            ParamKey::EnvironmentIntensity => l.environment.intensity = number(key, &v)?,
            ParamKey::EnvironmentPreset => match &v {
                ParamValue::Text(name) => {
                    let preset: EnvironmentPreset = name.parse()?;
                    self.select_environment(preset);
                }
                _ => return Err(wrong(key, "a preset name")),
            },
            ParamKey::UseDiffuseTexture => self.pbr.diffuse.set_enabled(flag(key, &v)?),
            ParamKey::DiffuseStrength => self.pbr.diffuse.strength = number(key, &v)?,
            ParamKey::UseNormalTexture => self.pbr.normal.set_enabled(flag(key, &v)?),
            ParamKey::NormalStrength => self.pbr.normal.strength = number(key, &v)?,
            ParamKey::UseAoRoughMetalTexture => self.pbr.ao_rough_metal.set_enabled(flag(key, &v)?),
            ParamKey::AoRoughMetalStrength => self.pbr.ao_rough_metal.strength = number(key, &v)?,
            ParamKey::DebugMode => match &v {
                ParamValue::Text(name) => self.debug_mode = name.parse::<DebugMode>()?,
                _ => return Err(wrong(key, "a debug mode name")),
            },
        }
        Ok(())
    }

    /// Read one parameter. Colors are returned as `#rrggbb` strings.
    pub fn get(&self, key: &str) -> Result<ParamValue, ParamError> {
        let w = &self.waves;
        let a = &self.appearance;
        let l = &self.lighting;
        let value = match ParamKey::parse(key)? {
            ParamKey::Time => self.time.into(),
            ParamKey::BigWaveElevation => w.big_wave_elevation.into(),
            ParamKey::BigWaveFrequency(axis) => get_axis2(w.big_wave_frequency, axis),
            ParamKey::BigWaveSpeed => w.big_wave_speed.into(),
            ParamKey::SmallWaveElevation => w.small_wave_elevation.into(),
            ParamKey::SmallWaveFrequency => w.small_wave_frequency.into(),
            ParamKey::SmallWaveSpeed => w.small_wave_speed.into(),
            ParamKey::SmallWaveIterations => ParamValue::Number(w.small_wave_iterations as f32),
            ParamKey::Stiffness => w.stiffness.into(),
            ParamKey::Drape => w.drape.into(),
            ParamKey::Color(i) => ParamValue::Text(to_hex(self.zones.colors[i])),
            ParamKey::ColorCenter(i, axis) => get_axis2(self.zones.color_centers[i], axis),
            ParamKey::ColorRadius => self.zones.color_radius.into(),
            ParamKey::Opacity => a.opacity.into(),
            ParamKey::BorderRadius => a.border_radius.into(),
            ParamKey::DepthDarkening => a.depth_darkening.into(),
            ParamKey::GrainStrength => a.grain_strength.into(),
            ParamKey::GrainScale => a.grain_scale.into(),
            ParamKey::Brightness => l.brightness.into(),
            ParamKey::AmbientColor => ParamValue::Text(to_hex(l.ambient_color)),
            ParamKey::AmbientStrength => l.ambient_strength.into(),
            ParamKey::LightPosition(axis) => match axis {
                None => l.point.position.into(),
                Some(Axis::X) => l.point.position.x.into(),
                Some(Axis::Y) => l.point.position.y.into(),
                Some(Axis::Z) => l.point.position.z.into(),
            },
            ParamKey::LightColor => ParamValue::Text(to_hex(l.point.color)),
            ParamKey::LightIntensity => l.point.intensity.into(),
            ParamKey::SpecularStrength => l.point.specular_strength.into(),
            ParamKey::Shininess => l.point.shininess.into(),
            ParamKey::UseEnvironmentLighting => l.use_environment_lighting().into(),
            ParamKey::EnvironmentIntensity => l.environment.intensity.into(),
            ParamKey::EnvironmentPreset => ParamValue::Text(l.environment.preset.name().to_string()),
            ParamKey::UseDiffuseTexture => self.pbr.diffuse.is_enabled().into(),
            ParamKey::DiffuseStrength => self.pbr.diffuse.strength.into(),
            ParamKey::UseNormalTexture => self.pbr.normal.is_enabled().into(),
            ParamKey::NormalStrength => self.pbr.normal.strength.into(),
            ParamKey::UseAoRoughMetalTexture => self.pbr.ao_rough_metal.is_enabled().into(),
            ParamKey::AoRoughMetalStrength => self.pbr.ao_rough_metal.strength.into(),
            ParamKey::DebugMode => {
                let v = serde_json::to_value(self.debug_mode)
                    .map_err(|e| ParamError::Json(e.to_string()))?;
                ParamValue::Text(v.as_str().unwrap_or("off").to_string())
            }
        };
        Ok(value)
    }
}
