//! Per-fragment shading.
//!
//! Order of operations for one fragment:
//!   1. zone blend → procedural base color
//!   2. PBR compositing (color, normal, AO/roughness/metalness)
//!   3. debug short-circuit
//!   4. base · brightness · (ambient + active light) · AO
//!   5. depth darkening
//!   6. border mask (alpha)
//!   7. grain
//!   8. alpha = opacity · mask
use glam::{Vec2, Vec3, Vec4};

use crate::grain::Grain;
use crate::lighting::{light_surface, SpecularResponse};
use crate::params::{Appearance, SurfaceParameters};
use crate::pbr::{debug_output, sample_pbr};
use crate::zones::blend_zones;

/// Distance at which depth darkening reaches full strength.
pub const DEPTH_FALLOFF_DISTANCE: f32 = 4.0;
/// Width of the soft inner edge of the border mask, in UV.
pub const BORDER_EDGE: f32 = 0.005;

/// Interpolated inputs of one fragment.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Fragment {
    pub uv: Vec2,
    pub normal: Vec3,
    pub world_position: Vec3,
    /// Unit vector from the surface towards the eye.
    pub view_dir: Vec3,
    /// Distance from the eye to `world_position`.
    pub view_distance: f32,
}

/// Stateless apart from the shared grain field; one instance serves any
/// number of fragments, frames and parameter sets.
#[derive(Default)]
pub struct SurfaceShader {
    grain: Grain,
}

impl SurfaceShader {
    pub fn new() -> Self {
        Self { grain: Grain::new() }
    }

    /// Procedural base color at `uv` (zone blend only).
    pub fn base_color(&self, params: &SurfaceParameters, uv: Vec2) -> Vec3 {
        blend_zones(uv, &params.zones)
    }

    /// Final straight-alpha linear RGBA for a fragment.
    pub fn shade(&self, params: &SurfaceParameters, frag: &Fragment) -> Vec4 {
        // Double-sided: face the normal towards the eye.
        let mut normal = frag.normal.normalize_or(Vec3::Z);
        if normal.dot(frag.view_dir) < 0.0 {
            normal = -normal;
        }

        let procedural = self.base_color(params, frag.uv);
        let surface = sample_pbr(&params.pbr, frag.uv, procedural, normal);

        if let Some(debug) = debug_output(&surface, params.debug_mode) {
            return debug;
        }

        let response = SpecularResponse {
            roughness: surface.roughness,
            metalness: surface.metalness,
            base_color: surface.color,
        };
        let light = light_surface(
            &params.lighting,
            surface.normal,
            frag.world_position,
            frag.view_dir,
            &response,
        );

        let mut rgb = surface.color * params.lighting.brightness * light.total() * surface.ao;
        rgb *= depth_factor(frag.view_distance, params.appearance.depth_darkening);

        let mask = border_mask(frag.uv, params.appearance.border_radius);
        rgb += Vec3::splat(self.grain_term(frag.uv, &params.appearance));

        let rgb = rgb.clamp(Vec3::ZERO, Vec3::ONE);
        rgb.extend((params.appearance.opacity * mask).clamp(0.0, 1.0))
    }

    fn grain_term(&self, uv: Vec2, appearance: &Appearance) -> f32 {
        if appearance.grain_strength == 0.0 {
            return 0.0;
        }
        self.grain.sample(uv, appearance.grain_scale) * appearance.grain_strength
    }
}

/// `1 − depth_darkening · clamp(distance / DEPTH_FALLOFF_DISTANCE, 0, 1)`.
pub fn depth_factor(distance: f32, depth_darkening: f32) -> f32 {
    1.0 - depth_darkening * (distance / DEPTH_FALLOFF_DISTANCE).clamp(0.0, 1.0)
}

/// Circular coverage around the UV center: 1 inside, 0 at and beyond
/// `border_radius · 0.5`, with a smooth inner edge of `BORDER_EDGE`.
pub fn border_mask(uv: Vec2, border_radius: f32) -> f32 {
    let radius = border_radius * 0.5;
    let d = uv.distance(Vec2::splat(0.5));
    if d >= radius {
        return 0.0;
    }
    1.0 - smoothstep(radius - BORDER_EDGE, radius, d)
}

#[inline]
fn smoothstep(edge0: f32, edge1: f32, x: f32) -> f32 {
    let t = ((x - edge0) / (edge1 - edge0)).clamp(0.0, 1.0);
    t * t * (3.0 - 2.0 * t)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::params::{DebugMode, LightSource};

    fn frag_at(uv: Vec2) -> Fragment {
        Fragment {
            uv,
            normal: Vec3::Z,
            world_position: Vec3::new(uv.x * 2.0 - 1.0, uv.y * 2.0 - 1.0, 0.0),
            view_dir: Vec3::Z,
            view_distance: 1.65,
        }
    }

    fn quiet() -> SurfaceParameters {
        let mut p = SurfaceParameters::fabric();
        p.appearance.grain_strength = 0.0;
        p
    }

    #[test]
    fn base_color_at_first_center_is_first_color() {
        let p = SurfaceParameters::fabric();
        let shader = SurfaceShader::new();
        assert_eq!(shader.base_color(&p, Vec2::new(0.1, 0.1)), p.zones.colors[0]);
    }

    #[test]
    fn outside_border_is_fully_transparent() {
        let shader = SurfaceShader::new();
        let p = quiet();
        let c = shader.shade(&p, &frag_at(Vec2::new(0.02, 0.02)));
        assert_eq!(c.w, 0.0);
    }

    #[test]
    fn inside_border_alpha_is_opacity() {
        let shader = SurfaceShader::new();
        let p = quiet();
        let c = shader.shade(&p, &frag_at(Vec2::splat(0.5)));
        assert!((c.w - p.appearance.opacity).abs() < 1e-6);
    }

    #[test]
    fn depth_darkening_dims_distant_fragments() {
        assert_eq!(depth_factor(0.0, 0.5), 1.0);
        assert_eq!(depth_factor(8.0, 0.5), 0.5);
        assert!(depth_factor(2.0, 0.5) > depth_factor(3.0, 0.5));
    }

    #[test]
    fn debug_normal_without_textures_renders_geometric_normal() {
        let shader = SurfaceShader::new();
        let mut p = quiet();
        p.pbr.clear();
        p.debug_mode = DebugMode::ShowNormal;
        let c = shader.shade(&p, &frag_at(Vec2::new(0.3, 0.6)));
        assert_eq!(c, Vec4::new(0.5, 0.5, 1.0, 1.0));
    }

    #[test]
    fn back_facing_normal_is_flipped_towards_viewer() {
        let shader = SurfaceShader::new();
        let mut p = quiet();
        p.debug_mode = DebugMode::ShowNormal;
        let mut f = frag_at(Vec2::splat(0.5));
        f.normal = -Vec3::Z;
        assert_eq!(shader.shade(&p, &f), Vec4::new(0.5, 0.5, 1.0, 1.0));
    }

    #[test]
    fn inactive_path_settings_do_not_change_output() {
        let shader = SurfaceShader::new();
        let f = frag_at(Vec2::new(0.45, 0.55));

        let mut p = quiet();
        let before = shader.shade(&p, &f);
        p.lighting.environment.intensity = 9.0;
        assert_eq!(shader.shade(&p, &f), before);

        p.lighting.light_source = LightSource::Environment;
        let before = shader.shade(&p, &f);
        p.lighting.point.intensity = 9.0;
        p.lighting.point.specular_strength = 9.0;
        assert_eq!(shader.shade(&p, &f), before);
    }

    #[test]
    fn grain_perturbs_color_but_not_alpha() {
        let shader = SurfaceShader::new();
        let mut p = quiet();
        p.lighting.brightness = 0.2;
        let uv = Vec2::new(0.437, 0.512);
        let plain = shader.shade(&p, &frag_at(uv));
        p.appearance.grain_strength = 0.3;
        p.appearance.grain_scale = 17.0;
        let grainy = shader.shade(&p, &frag_at(uv));
        assert_eq!(plain.w, grainy.w);
        assert_ne!(plain.truncate(), grainy.truncate());
    }
}
