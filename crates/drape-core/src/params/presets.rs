//! Scene presets and the control panel's group resets.
//!
//! The reset groups restore the values the fabric scene's reset buttons
//! apply, which are not the same as its start-up values.
use glam::{Vec2, Vec3};
use log::debug;

use super::{
    Appearance, ColorZones, DebugMode, LightSource, Lighting, PointLight, SurfaceParameters,
    WaveParams, ZONE_COUNT,
};
use crate::color::srgb_to_linear;
use crate::environment::EnvironmentPreset;
use crate::pbr::PbrMaps;

pub const AMBIENT_RGB: u32 = 0xfebebe;

const FABRIC_PALETTE: [u32; ZONE_COUNT] =
    [0xd95959, 0xc651ff, 0x4e9fff, 0xff6bd0, 0x7ab8a8, 0xfbff00, 0x00ff88];

const WATER_PALETTE: [u32; ZONE_COUNT] =
    [0x0b3d91, 0x1565c0, 0x1e88e5, 0x26c6da, 0x4dd0e1, 0x80deea, 0xe0f7fa];

/// `0xrrggbb` sRGB → linear RGB.
pub fn rgb(packed: u32) -> Vec3 {
    let ch = |shift: u32| srgb_to_linear(((packed >> shift) & 0xff) as f32 / 255.0);
    Vec3::new(ch(16), ch(8), ch(0))
}

pub fn fabric_palette() -> [Vec3; ZONE_COUNT] {
    FABRIC_PALETTE.map(rgb)
}

pub fn water_palette() -> [Vec3; ZONE_COUNT] {
    WATER_PALETTE.map(rgb)
}

impl SurfaceParameters {
    /// Start-up values of the fabric scene.
    pub fn fabric() -> Self {
        Self {
            time: 0.0,
            waves: WaveParams::default(),
            zones: ColorZones::default(),
            appearance: Appearance::default(),
            lighting: Lighting::default(),
            pbr: PbrMaps::default(),
            debug_mode: DebugMode::Off,
        }
    }

    /// Start-up values of the water scene: calmer, denser ripples, a cool
    /// palette, environment lighting and light grain. PBR gates start off
    /// until textures are attached.
    pub fn water() -> Self {
        let mut p = Self::fabric();
        p.waves = WaveParams {
            big_wave_elevation: 0.08,
            big_wave_frequency: Vec2::new(1.5, 1.5),
            big_wave_speed: 0.3,
            small_wave_elevation: 0.05,
            small_wave_frequency: 6.0,
            small_wave_speed: 0.4,
            small_wave_iterations: 4,
            stiffness: 1.0,
            drape: 0.0,
        };
        p.zones.colors = water_palette();
        p.zones.color_radius = 0.6;
        p.appearance = Appearance {
            opacity: 0.95,
            border_radius: 1.0,
            depth_darkening: 0.3,
            grain_strength: 0.05,
            grain_scale: 80.0,
        };
        p.lighting.ambient_color = rgb(0xbfe6ff);
        p.lighting.ambient_strength = 0.4;
        p.lighting.light_source = LightSource::Environment;
        p.lighting.environment.intensity = 1.2;
        p
    }

    /// Named preset lookup used by the binaries and bindings.
    pub fn preset(name: &str) -> Option<Self> {
        let params = match name.to_ascii_lowercase().as_str() {
            "fabric" => Self::fabric(),
            "water" => Self::water(),
            _ => return None,
        };
        debug!("applied {name} preset");
        Some(params)
    }

    pub fn reset_movement(&mut self) {
        debug!("reset movement");
        self.waves = WaveParams {
            big_wave_elevation: 0.2,
            big_wave_frequency: Vec2::new(4.0, 1.5),
            big_wave_speed: 0.5,
            small_wave_elevation: 0.15,
            small_wave_frequency: 3.0,
            small_wave_speed: 0.15,
            small_wave_iterations: 4,
            stiffness: 1.0,
            drape: 0.05,
        };
    }

    pub fn reset_appearance(&mut self) {
        debug!("reset appearance");
        self.appearance.opacity = 0.85;
        self.appearance.border_radius = 1.0;
        self.zones.color_radius = 0.6;
        self.appearance.depth_darkening = 0.3;
    }

    pub fn reset_lighting(&mut self) {
        debug!("reset lighting");
        self.lighting.brightness = 1.0;
        self.lighting.ambient_strength = 0.3;
        self.lighting.ambient_color = rgb(AMBIENT_RGB);
        // z-up scene: a y-up position (x, y, z) becomes (x, −z, y).
        self.lighting.point = PointLight {
            position: Vec3::new(2.0, -2.0, 2.0),
            ..PointLight::default()
        };
    }

    pub fn reset_colors(&mut self) {
        debug!("reset colors");
        self.zones.colors = fabric_palette();
    }

    pub fn reset_color_centers(&mut self) {
        debug!("reset color centers");
        self.zones.color_centers = [
            Vec2::new(0.1, 0.1),
            Vec2::new(0.5, 0.1),
            Vec2::new(0.9, 0.1),
            Vec2::new(0.25, 0.5),
            Vec2::new(0.75, 0.5),
            Vec2::new(0.3, 0.9),
            Vec2::new(0.7, 0.9),
        ];
    }

    /// Select an environment preset for the environment lighting path.
    pub fn select_environment(&mut self, preset: EnvironmentPreset) {
        debug!("environment preset {preset:?}");
        self.lighting.environment.select_preset(preset);
    }
}
