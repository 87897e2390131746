//! Ambient + one of two mutually exclusive lighting paths.
//!
//! Point light (Phong):
//!   diffuse  = max(0, n·l) · color · intensity
//!   specular = max(0, r·v)^shininess · specular_strength · color
//! Environment:
//!   env = sample(map, n) · intensity   (flat white when no map is loaded)
//!
//! Exactly one path is evaluated, chosen by `Lighting::mode()`.
use glam::Vec3;

use crate::environment::direction_to_equirect;
use crate::params::{EnvironmentLight, Lighting, LightingMode, PointLight};

/// Surface response that modulates the specular lobe.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SpecularResponse {
    /// 0 keeps full specular, 1 removes it.
    pub roughness: f32,
    /// 0 keeps the light's color, 1 tints the highlight by `base_color`.
    pub metalness: f32,
    pub base_color: Vec3,
}

impl Default for SpecularResponse {
    fn default() -> Self {
        Self { roughness: 0.0, metalness: 0.0, base_color: Vec3::ONE }
    }
}

/// Which path produced a `LightTerms`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AppliedLight {
    PointLight,
    Environment,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LightTerms {
    pub ambient: Vec3,
    /// Diffuse + specular of the point light, or the environment term.
    pub direct: Vec3,
    pub applied: AppliedLight,
}

impl LightTerms {
    pub fn total(&self) -> Vec3 {
        self.ambient + self.direct
    }
}

pub fn ambient_term(lighting: &Lighting) -> Vec3 {
    lighting.ambient_color * lighting.ambient_strength
}

/// Phong diffuse + specular at `world_pos` for a unit `normal` and unit
/// `view_dir` (surface → eye).
pub fn phong(
    light: &PointLight,
    normal: Vec3,
    world_pos: Vec3,
    view_dir: Vec3,
    response: &SpecularResponse,
) -> Vec3 {
    let light_dir = (light.position - world_pos).normalize_or(Vec3::Z);
    let diffuse = normal.dot(light_dir).max(0.0) * light.color * light.intensity;

    let reflect_dir = reflect(-light_dir, normal);
    let lobe = reflect_dir.dot(view_dir).max(0.0).powf(light.shininess);
    let tint = light.color.lerp(light.color * response.base_color, response.metalness);
    let specular = lobe * light.specular_strength * tint * (1.0 - response.roughness);

    diffuse + specular
}

/// Environment radiance along the surface normal.
pub fn environment_term(env: &EnvironmentLight, normal: Vec3) -> Vec3 {
    let radiance = match &env.map {
        Some(map) => map.sample(direction_to_equirect(normal)).truncate(),
        None => Vec3::ONE,
    };
    radiance * env.intensity
}

/// Evaluate ambient plus the active lighting path.
pub fn light_surface(
    lighting: &Lighting,
    normal: Vec3,
    world_pos: Vec3,
    view_dir: Vec3,
    response: &SpecularResponse,
) -> LightTerms {
    let ambient = ambient_term(lighting);
    match lighting.mode() {
        LightingMode::PointLight(light) => LightTerms {
            ambient,
            direct: phong(light, normal, world_pos, view_dir, response),
            applied: AppliedLight::PointLight,
        },
        LightingMode::Environment(env) => LightTerms {
            ambient,
            direct: environment_term(env, normal),
            applied: AppliedLight::Environment,
        },
    }
}

/// GLSL `reflect`: `i − 2·(n·i)·n`.
#[inline]
pub fn reflect(incident: Vec3, normal: Vec3) -> Vec3 {
    incident - 2.0 * normal.dot(incident) * normal
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn overhead_light() -> PointLight {
        PointLight { position: Vec3::new(0.0, 0.0, 10.0), ..PointLight::default() }
    }

    #[test]
    fn light_straight_above_gives_full_diffuse_and_peak_specular() {
        let light = overhead_light();
        let c = phong(&light, Vec3::Z, Vec3::ZERO, Vec3::Z, &SpecularResponse::default());
        // diffuse 1 + specular 0.5
        assert_relative_eq!(c.x, 1.5, epsilon = 1e-5);
    }

    #[test]
    fn light_below_surface_contributes_nothing() {
        let light = PointLight { position: Vec3::new(0.0, 0.0, -10.0), ..PointLight::default() };
        let c = phong(&light, Vec3::Z, Vec3::ZERO, Vec3::Z, &SpecularResponse::default());
        assert_eq!(c, Vec3::ZERO);
    }

    #[test]
    fn full_roughness_removes_specular() {
        let light = overhead_light();
        let rough = SpecularResponse { roughness: 1.0, ..SpecularResponse::default() };
        let c = phong(&light, Vec3::Z, Vec3::ZERO, Vec3::Z, &rough);
        assert_relative_eq!(c.x, 1.0, epsilon = 1e-5);
    }

    #[test]
    fn environment_without_map_is_flat_intensity() {
        let env = EnvironmentLight { intensity: 0.7, ..EnvironmentLight::default() };
        assert_eq!(environment_term(&env, Vec3::new(0.3, 0.2, 0.9)), Vec3::splat(0.7));
    }

    #[test]
    fn paths_are_mutually_exclusive() {
        let mut lighting = Lighting::default();
        lighting.environment.intensity = 100.0;
        let point = light_surface(&lighting, Vec3::Z, Vec3::ZERO, Vec3::Z, &SpecularResponse::default());
        assert_eq!(point.applied, AppliedLight::PointLight);
        assert!(point.direct.x < 2.0, "environment intensity leaked into point path");

        lighting.set_environment_lighting(true);
        lighting.point.intensity = 100.0;
        let env = light_surface(&lighting, Vec3::Z, Vec3::ZERO, Vec3::Z, &SpecularResponse::default());
        assert_eq!(env.applied, AppliedLight::Environment);
        assert_eq!(env.direct, Vec3::splat(100.0));
    }

    #[test]
    fn reflect_mirrors_about_normal() {
        let r = reflect(Vec3::new(1.0, 0.0, -1.0), Vec3::Z);
        assert_eq!(r, Vec3::new(1.0, 0.0, 1.0));
    }
}
