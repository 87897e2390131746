use std::fmt::Display;

use drape_core::audit::run_property_audit;
use drape_core::environment::EnvironmentPreset;
use drape_core::frame::{render_frame, FrameSettings};
use drape_core::grid::{evaluate_surface, PlaneGrid, REFERENCE_SEGMENTS};
use drape_core::params::keys::KEYS;
use drape_core::pbr::TextureSlot;
use drape_core::{ParamValue, SurfaceParameters, SurfaceShader, Texture};
use js_sys::{Array, Float32Array, Uint32Array, Uint8ClampedArray};
use wasm_bindgen::prelude::*;

#[wasm_bindgen(start)]
pub fn init() {
    console_error_panic_hook::set_once();
}

fn js_err(context: &str, e: impl Display) -> JsValue {
    JsValue::from_str(&format!("{context}: {e}"))
}

/// One surface instance driven from JavaScript.
///
/// The host owns the animation clock and calls `set_time` before reading
/// geometry or rendering; everything else is a parameter write.
#[wasm_bindgen]
pub struct SurfaceEngine {
    params: SurfaceParameters,
    shader: SurfaceShader,
    grid: PlaneGrid,
    background: [f32; 3],
}

#[wasm_bindgen]
impl SurfaceEngine {
    /// `variant` is `"fabric"` or `"water"`.
    #[wasm_bindgen(constructor)]
    pub fn new(variant: &str) -> Result<SurfaceEngine, JsValue> {
        let params = SurfaceParameters::preset(variant)
            .ok_or_else(|| JsValue::from_str(&format!("Unknown variant: {variant}")))?;
        log::info!("SurfaceEngine created ({variant})");
        Ok(Self {
            params,
            shader: SurfaceShader::new(),
            grid: PlaneGrid::default(),
            background: [0.0; 3],
        })
    }

    // ── Parameters ───────────────────────────────────────────────────────

    #[wasm_bindgen(js_name = setParam)]
    pub fn set_param(&mut self, key: &str, value: JsValue) -> Result<(), JsValue> {
        let value: ParamValue =
            serde_wasm_bindgen::from_value(value).map_err(|e| js_err("Invalid value", e))?;
        self.params.set(key, value).map_err(|e| js_err("setParam", e))
    }

    #[wasm_bindgen(js_name = getParam)]
    pub fn get_param(&self, key: &str) -> Result<JsValue, JsValue> {
        let value = self.params.get(key).map_err(|e| js_err("getParam", e))?;
        serde_wasm_bindgen::to_value(&value).map_err(|e| js_err("getParam", e))
    }

    #[wasm_bindgen(js_name = paramKeys)]
    pub fn param_keys() -> Array {
        KEYS.iter().map(|k| JsValue::from_str(k)).collect()
    }

    #[wasm_bindgen(js_name = paramsJson)]
    pub fn params_json(&self) -> Result<String, JsValue> {
        self.params.to_json().map_err(|e| js_err("paramsJson", e))
    }

    /// Replace every parameter from a JSON snapshot. Loaded textures are kept;
    /// their gates and strengths come from the snapshot.
    #[wasm_bindgen(js_name = loadParamsJson)]
    pub fn load_params_json(&mut self, json: &str) -> Result<(), JsValue> {
        let mut next = SurfaceParameters::from_json(json).map_err(|e| js_err("Invalid params", e))?;
        next.adopt_assets_from(&self.params);
        self.params = next;
        Ok(())
    }

    /// `"movement"`, `"appearance"`, `"lighting"`, `"colors"` or `"colorCenters"`.
    pub fn reset(&mut self, group: &str) -> Result<(), JsValue> {
        match group {
            "movement" => self.params.reset_movement(),
            "appearance" => self.params.reset_appearance(),
            "lighting" => {
                self.params.reset_lighting();
                self.background = [0.0; 3];
            }
            "colors" => self.params.reset_colors(),
            "colorCenters" => self.params.reset_color_centers(),
            other => return Err(JsValue::from_str(&format!("Unknown reset group: {other}"))),
        }
        Ok(())
    }

    #[wasm_bindgen(js_name = setTime)]
    pub fn set_time(&mut self, seconds: f32) {
        self.params.time = seconds;
    }

    #[wasm_bindgen(js_name = setBackground)]
    pub fn set_background(&mut self, hex: &str) -> Result<(), JsValue> {
        let c = drape_core::color::parse_hex(hex).map_err(|e| js_err("setBackground", e))?;
        self.background = c.to_array();
        Ok(())
    }

    // ── Textures ─────────────────────────────────────────────────────────

    /// Attach RGBA8 pixels to `"diffuseMap"`, `"normalMap"` or
    /// `"aoRoughMetalMap"`. The diffuse map is sRGB-encoded, the others are
    /// linear data. A rejected upload leaves the slot empty and its gate off.
    #[wasm_bindgen(js_name = loadTexture)]
    pub fn load_texture(&mut self, slot: &str, width: usize, height: usize, rgba: &[u8]) -> Result<(), JsValue> {
        let decoded = if slot == "diffuseMap" {
            Texture::from_srgba8(width, height, rgba)
        } else {
            Texture::from_rgba8(width, height, rgba)
        };
        self.slot_mut(slot)?.attach(slot, decoded).map_err(|e| js_err("loadTexture", e))
    }

    #[wasm_bindgen(js_name = clearTexture)]
    pub fn clear_texture(&mut self, slot: &str) -> Result<(), JsValue> {
        self.slot_mut(slot)?.detach();
        Ok(())
    }

    #[wasm_bindgen(js_name = setEnvironmentPreset)]
    pub fn set_environment_preset(&mut self, name: &str) -> Result<(), JsValue> {
        let preset: EnvironmentPreset = name.parse().map_err(|e| js_err("setEnvironmentPreset", e))?;
        self.params.select_environment(preset);
        Ok(())
    }

    /// Use an uploaded sRGB equirectangular image as the environment.
    #[wasm_bindgen(js_name = loadEnvironmentMap)]
    pub fn load_environment_map(&mut self, width: usize, height: usize, rgba: &[u8]) -> Result<(), JsValue> {
        let map = Texture::from_srgba8(width, height, rgba).map_err(|e| js_err("loadEnvironmentMap", e))?;
        self.params.lighting.environment.set_custom_map(map);
        Ok(())
    }

    // ── Geometry ─────────────────────────────────────────────────────────

    /// Square grid resolution; the reference is 512.
    #[wasm_bindgen(js_name = setSegments)]
    pub fn set_segments(&mut self, segments: usize) {
        self.grid = PlaneGrid::new(2.0, 2.0, segments, segments);
    }

    #[wasm_bindgen(js_name = defaultSegments)]
    pub fn default_segments() -> usize {
        REFERENCE_SEGMENTS
    }

    /// Displaced positions, xyz per vertex.
    pub fn positions(&self) -> Float32Array {
        let mesh = evaluate_surface(&self.grid, &self.params);
        let flat: Vec<f32> = mesh.positions.iter().flat_map(|p| p.to_array()).collect();
        Float32Array::from(&flat[..])
    }

    /// Unit normals, xyz per vertex.
    pub fn normals(&self) -> Float32Array {
        let mesh = evaluate_surface(&self.grid, &self.params);
        let flat: Vec<f32> = mesh.normals.iter().flat_map(|n| n.to_array()).collect();
        Float32Array::from(&flat[..])
    }

    pub fn uvs(&self) -> Float32Array {
        let uvs: Vec<f32> = (0..self.grid.rows())
            .flat_map(|row| (0..self.grid.columns()).map(move |col| (row, col)))
            .flat_map(|(row, col)| self.grid.vertex(row, col).1.to_array())
            .collect();
        Float32Array::from(&uvs[..])
    }

    pub fn indices(&self) -> Uint32Array {
        Uint32Array::from(&self.grid.indices()[..])
    }

    // ── Output ───────────────────────────────────────────────────────────

    /// Render the current state into RGBA8 pixels (row 0 at the top).
    #[wasm_bindgen(js_name = renderFrame)]
    pub fn render_frame(&self, width: usize, height: usize) -> Uint8ClampedArray {
        let settings = FrameSettings {
            background: self.background.into(),
            ..FrameSettings::with_size(width, height)
        };
        let frame = render_frame(&self.shader, &self.params, &settings);
        Uint8ClampedArray::from(&frame.pixels[..])
    }

    /// Named pass/fail results of the surface property checks.
    pub fn audit(&self) -> Result<JsValue, JsValue> {
        let report = run_property_audit(&self.params);
        serde_wasm_bindgen::to_value(&report).map_err(|e| js_err("audit", e))
    }
}

impl SurfaceEngine {
    fn slot_mut(&mut self, slot: &str) -> Result<&mut TextureSlot, JsValue> {
        let pbr = &mut self.params.pbr;
        match slot {
            "diffuseMap" => Ok(&mut pbr.diffuse),
            "normalMap" => Ok(&mut pbr.normal),
            "aoRoughMetalMap" => Ok(&mut pbr.ao_rough_metal),
            other => Err(JsValue::from_str(&format!("Unknown texture slot: {other}"))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wasm_bindgen_test::*;

    #[wasm_bindgen_test]
    fn unknown_variant_is_rejected() {
        assert!(SurfaceEngine::new("velvet").is_err());
    }

    #[wasm_bindgen_test]
    fn set_then_get_round_trips_through_js() {
        let mut engine = SurfaceEngine::new("fabric").unwrap();
        engine.set_param("drape", JsValue::from_f64(0.25)).unwrap();
        let v: ParamValue = serde_wasm_bindgen::from_value(engine.get_param("drape").unwrap()).unwrap();
        assert_eq!(v, ParamValue::Number(0.25));
    }

    #[wasm_bindgen_test]
    fn bad_texture_upload_leaves_gate_off() {
        let mut engine = SurfaceEngine::new("water").unwrap();
        assert!(engine.load_texture("normalMap", 2, 2, &[0u8; 3]).is_err());
        assert_eq!(engine.params.get("useNormalTexture").unwrap(), ParamValue::Bool(false));
    }

    #[wasm_bindgen_test]
    fn snapshot_gate_overrides_loaded_texture_gate() {
        let mut engine = SurfaceEngine::new("water").unwrap();
        engine.load_texture("diffuseMap", 1, 1, &[255, 255, 255, 255]).unwrap();
        engine
            .load_params_json(r#"{ "diffuseMap": { "enabled": false, "strength": 0.25 } }"#)
            .unwrap();
        assert!(engine.params.pbr.diffuse.has_texture());
        assert_eq!(engine.params.get("useDiffuseTexture").unwrap(), ParamValue::Bool(false));
        assert_eq!(engine.params.get("diffuseStrength").unwrap(), ParamValue::Number(0.25));
    }

    #[wasm_bindgen_test]
    fn lighting_reset_restores_black_background() {
        let mut engine = SurfaceEngine::new("fabric").unwrap();
        engine.set_background("#336699").unwrap();
        engine.reset("lighting").unwrap();
        assert_eq!(engine.background, [0.0; 3]);
    }

    #[wasm_bindgen_test]
    fn frame_and_mesh_sizes() {
        let mut engine = SurfaceEngine::new("fabric").unwrap();
        engine.set_segments(4);
        assert_eq!(engine.positions().length(), 25 * 3);
        assert_eq!(engine.indices().length(), 4 * 4 * 6);
        assert_eq!(engine.render_frame(8, 4).length(), 8 * 4 * 4);
    }
}
