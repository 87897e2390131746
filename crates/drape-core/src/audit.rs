//! Property audit: checks the surface invariants for one parameter set on a
//! fixed set of sample points and reports each check by name.
use std::f32::consts::TAU;

use glam::{Vec2, Vec3};
use log::{debug, warn};
use serde::Serialize;

use crate::displacement::{big_wave, elevation, ripple};
use crate::lighting::{light_surface, AppliedLight, SpecularResponse};
use crate::params::{DebugMode, Lighting, SurfaceParameters, ZONE_COUNT};
use crate::shading::{Fragment, SurfaceShader};
use crate::zones::{blend_zones, zone_weights};

const SAMPLE_POINTS: [(f32, f32); 6] =
    [(0.0, 0.0), (0.3, -0.7), (-0.91, 0.44), (1.0, 1.0), (-1.0, -0.25), (0.123, 0.987)];
const SAMPLE_TIMES: [f32; 4] = [0.0, 0.5, 7.25, 120.0];

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CheckResult {
    pub name: &'static str,
    pub passed: bool,
    pub detail: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct AuditReport {
    pub checks: Vec<CheckResult>,
}

impl AuditReport {
    pub fn passed(&self) -> bool {
        self.checks.iter().all(|c| c.passed)
    }

    pub fn failures(&self) -> impl Iterator<Item = &CheckResult> {
        self.checks.iter().filter(|c| !c.passed)
    }

    fn push(&mut self, name: &'static str, failure: Option<String>) {
        let passed = failure.is_none();
        let detail = failure.unwrap_or_else(|| "ok".to_string());
        if passed {
            debug!("audit {name}: ok");
        } else {
            warn!("audit {name}: {detail}");
        }
        self.checks.push(CheckResult { name, passed, detail });
    }
}

/// Run every check against `params`.
pub fn run_property_audit(params: &SurfaceParameters) -> AuditReport {
    let mut report = AuditReport::default();
    report.push("determinism", check_determinism(params));
    report.push("zero_iterations_bit_exact", check_zero_iterations(params));
    report.push("time_periodicity", check_periodicity(params));
    report.push("continuity", check_continuity(params));
    report.push("zone_center_exact", check_zone_centers(params));
    report.push("zone_weights_normalized", check_weight_sum(params));
    report.push("lighting_exclusive", check_lighting_exclusive(params));
    report.push("debug_normal_without_textures", check_debug_normal(params));
    report.push("origin_at_drape", check_origin(params));
    report
}

// ── Checks ───────────────────────────────────────────────────────────────────
// Each returns `None` on success or a description of the first violation.

fn check_determinism(p: &SurfaceParameters) -> Option<String> {
    for &(x, y) in &SAMPLE_POINTS {
        for &t in &SAMPLE_TIMES {
            let a = elevation(x, y, t, &p.waves);
            let b = elevation(x, y, t, &p.waves);
            if a.to_bits() != b.to_bits() {
                return Some(format!("elevation({x}, {y}, {t}) gave {a} then {b}"));
            }
        }
    }
    None
}

fn check_zero_iterations(p: &SurfaceParameters) -> Option<String> {
    let mut waves = p.waves;
    waves.small_wave_iterations = 0;
    for &(x, y) in &SAMPLE_POINTS {
        for &t in &SAMPLE_TIMES {
            let h = elevation(x, y, t, &waves);
            let expected = big_wave(x, y, t, &waves) * waves.stiffness + waves.drape;
            if h.to_bits() != expected.to_bits() {
                return Some(format!("({x}, {y}, {t}): {h} != large-wave term {expected}"));
            }
        }
    }
    None
}

/// The large wave repeats after `2π / bigWaveSpeed`, the ripple sum after
/// `2π / smallWaveSpeed`.
fn check_periodicity(p: &SurfaceParameters) -> Option<String> {
    let mut waves = p.waves;
    waves.small_wave_iterations = 0;
    if waves.big_wave_speed != 0.0 {
        let period = TAU / waves.big_wave_speed.abs();
        let tol = 1e-3 * (1.0 + waves.big_wave_elevation.abs() * waves.stiffness.abs());
        for &(x, y) in &SAMPLE_POINTS {
            let a = elevation(x, y, 1.0, &waves);
            let b = elevation(x, y, 1.0 + period, &waves);
            if (a - b).abs() > tol {
                return Some(format!("({x}, {y}): {a} vs {b} one large-wave period later"));
            }
        }
    }

    let w = &p.waves;
    if w.small_wave_speed != 0.0 && w.small_wave_iterations > 0 {
        let period = TAU / w.small_wave_speed.abs();
        let tol = 1e-3 * (1.0 + w.small_wave_elevation.abs() * w.small_wave_iterations as f32);
        for &(x, y) in &SAMPLE_POINTS {
            let a = ripple(x, y, 1.0, w);
            let b = ripple(x, y, 1.0 + period, w);
            if (a - b).abs() > tol {
                return Some(format!("({x}, {y}): ripple {a} vs {b} one ripple period later"));
            }
        }
    }
    None
}

/// Neighbouring samples one small step apart never jump by more than the
/// gradient bound allows.
fn check_continuity(p: &SurfaceParameters) -> Option<String> {
    let w = &p.waves;
    let step = 1e-4f32;
    let slope = w.big_wave_elevation.abs() * w.big_wave_frequency.abs().max_element()
        + w.small_wave_elevation.abs() * w.small_wave_frequency.abs() * w.small_wave_iterations as f32;
    let bound = 2.0 * step * slope * w.stiffness.abs() + 1e-4;
    for &(x, y) in &SAMPLE_POINTS {
        let h = elevation(x, y, p.time, w);
        let hx = elevation(x + step, y, p.time, w);
        let hy = elevation(x, y + step, p.time, w);
        if (hx - h).abs() > bound || (hy - h).abs() > bound {
            return Some(format!("jump at ({x}, {y}) exceeds {bound}"));
        }
    }
    None
}

fn check_zone_centers(p: &SurfaceParameters) -> Option<String> {
    let z = &p.zones;
    for i in 0..ZONE_COUNT {
        let center = z.color_centers[i];
        // A duplicated center belongs to its first occurrence.
        if z.color_centers[..i].contains(&center) {
            continue;
        }
        let c = blend_zones(center, z);
        if c != z.colors[i] {
            return Some(format!("center {i} at {center} blended to {c}, expected {}", z.colors[i]));
        }
    }
    None
}

fn check_weight_sum(p: &SurfaceParameters) -> Option<String> {
    for r in 0..=16 {
        for c in 0..=16 {
            let uv = Vec2::new(c as f32 / 16.0, r as f32 / 16.0);
            if let Some(w) = zone_weights(uv, &p.zones) {
                let sum: f32 = w.iter().sum();
                if (sum - 1.0).abs() > 1e-4 {
                    return Some(format!("weights at {uv} sum to {sum}"));
                }
            }
        }
    }
    None
}

/// The point path must not see environment intensity and vice versa.
fn check_lighting_exclusive(p: &SurfaceParameters) -> Option<String> {
    let response = SpecularResponse::default();
    let eval = |lighting: &Lighting| {
        light_surface(lighting, Vec3::Z, Vec3::ZERO, Vec3::Z, &response)
    };

    let mut lighting = p.lighting.clone();
    lighting.set_environment_lighting(false);
    let before = eval(&lighting);
    lighting.environment.intensity += 10.0;
    if before.applied != AppliedLight::PointLight || before != eval(&lighting) {
        return Some("point-light path reacted to environment intensity".into());
    }

    let mut lighting = p.lighting.clone();
    lighting.set_environment_lighting(true);
    let before = eval(&lighting);
    lighting.point.intensity += 10.0;
    if before.applied != AppliedLight::Environment || before != eval(&lighting) {
        return Some("environment path reacted to point-light intensity".into());
    }
    None
}

fn check_debug_normal(p: &SurfaceParameters) -> Option<String> {
    let mut params = p.clone();
    params.pbr.clear();
    params.debug_mode = DebugMode::ShowNormal;
    let shader = SurfaceShader::new();
    let frag = Fragment {
        uv: Vec2::splat(0.5),
        normal: Vec3::Z,
        world_position: Vec3::ZERO,
        view_dir: Vec3::Z,
        view_distance: 1.65,
    };
    let c = shader.shade(&params, &frag);
    if !c.is_finite() {
        return Some(format!("debug normal produced {c}"));
    }
    let expected = Vec3::new(0.5, 0.5, 1.0);
    if (c.truncate() - expected).abs().max_element() > 1e-5 {
        return Some(format!("flat normal displayed as {c}, expected {expected}"));
    }
    None
}

fn check_origin(p: &SurfaceParameters) -> Option<String> {
    let h = elevation(0.0, 0.0, 0.0, &p.waves);
    if h != p.waves.drape {
        return Some(format!("elevation at origin is {h}, drape is {}", p.waves.drape));
    }
    None
}
