//! Diagnostic visualizer: writes PNG debug images of one surface state.
//! Not part of the library; no tests.

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::Parser;
use drape_core::color::encode_srgb8;
use drape_core::environment::EnvironmentPreset;
use drape_core::frame::{render_frame, FrameSettings};
use drape_core::grid::{evaluate_surface, PlaneGrid};
use drape_core::pbr::TextureSlot;
use drape_core::zones::blend_zones;
use drape_core::{DebugMode, SurfaceParameters, SurfaceShader, Texture};
use glam::{Vec2, Vec3};
use log::{info, warn};

#[derive(Parser, Debug)]
#[command(name = "visualize", about = "Write PNG diagnostics of a drape surface")]
struct Args {
    /// Built-in preset (fabric | water).
    #[arg(short, long, default_value = "fabric")]
    preset: String,

    /// Parameter snapshot JSON; overrides --preset.
    #[arg(long)]
    params: Option<PathBuf>,

    /// Animation time in seconds.
    #[arg(short, long, default_value_t = 0.0)]
    time: f32,

    /// Output edge length in pixels.
    #[arg(short, long, default_value_t = 512)]
    size: usize,

    #[arg(short, long, default_value = "data/debug")]
    out: PathBuf,

    /// Background color behind the masked surface.
    #[arg(long, default_value = "#000000")]
    background: String,

    /// Environment preset name, e.g. `sunset`.
    #[arg(long)]
    environment: Option<String>,

    #[arg(long)]
    diffuse: Option<PathBuf>,
    #[arg(long)]
    normal: Option<PathBuf>,
    /// Packed AO (R) / roughness (G) / metalness (B) map.
    #[arg(long)]
    arm: Option<PathBuf>,
}

// ── Helpers ───────────────────────────────────────────────────────────────────

fn gray(v: f32) -> [u8; 3] {
    let c = (v.clamp(0.0, 1.0) * 255.0) as u8;
    [c, c, c]
}

fn rgb(v: Vec3) -> [u8; 3] {
    let v = v.clamp(Vec3::ZERO, Vec3::ONE) * 255.0;
    [v.x as u8, v.y as u8, v.z as u8]
}

fn save(out_dir: &Path, name: &str, size: usize, mut pixel: impl FnMut(usize, usize) -> [u8; 3]) -> Result<()> {
    let mut img = image::RgbImage::new(size as u32, size as u32);
    for r in 0..size {
        for c in 0..size {
            img.put_pixel(c as u32, r as u32, image::Rgb(pixel(r, c)));
        }
    }
    let path = out_dir.join(name);
    img.save(&path).with_context(|| format!("failed to save {}", path.display()))?;
    println!("Wrote {}", path.display());
    Ok(())
}

fn save_rgba(out_dir: &Path, name: &str, width: usize, height: usize, pixels: Vec<u8>) -> Result<()> {
    let img = image::RgbaImage::from_raw(width as u32, height as u32, pixels)
        .with_context(|| format!("{name}: pixel buffer does not match {width}x{height}"))?;
    let path = out_dir.join(name);
    img.save(&path).with_context(|| format!("failed to save {}", path.display()))?;
    println!("Wrote {}", path.display());
    Ok(())
}

/// Decode an image file and hand it to `slot`. Failures are logged and leave
/// the slot's gate unset.
fn load_into(slot: &mut TextureSlot, name: &str, path: &Path, srgb: bool) {
    let decoded = image::open(path)
        .map_err(|e| anyhow::anyhow!("{}: {e}", path.display()))
        .map(|img| {
            let rgba = img.to_rgba8();
            let (w, h) = (rgba.width() as usize, rgba.height() as usize);
            if srgb {
                Texture::from_srgba8(w, h, rgba.as_raw())
            } else {
                Texture::from_rgba8(w, h, rgba.as_raw())
            }
        });
    match decoded {
        Ok(tex) => {
            if slot.attach(name, tex).is_ok() {
                info!("Loaded {name} from {}", path.display());
            }
        }
        Err(e) => {
            warn!("{name} not loaded: {e}");
            slot.detach();
        }
    }
}

// ── Entry point ───────────────────────────────────────────────────────────────

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    let args = Args::parse();

    let mut params = match &args.params {
        Some(path) => {
            let json = fs::read_to_string(path).with_context(|| format!("reading {}", path.display()))?;
            SurfaceParameters::from_json(&json)?
        }
        None => SurfaceParameters::preset(&args.preset)
            .with_context(|| format!("unknown preset `{}`", args.preset))?,
    };
    params.time = args.time;

    if let Some(name) = &args.environment {
        let preset: EnvironmentPreset = name.parse()?;
        params.select_environment(preset);
    }
    if let Some(path) = &args.diffuse {
        load_into(&mut params.pbr.diffuse, "diffuseMap", path, true);
    }
    if let Some(path) = &args.normal {
        load_into(&mut params.pbr.normal, "normalMap", path, false);
    }
    if let Some(path) = &args.arm {
        load_into(&mut params.pbr.ao_rough_metal, "aoRoughMetalMap", path, false);
    }

    let out_dir = args.out.as_path();
    fs::create_dir_all(out_dir).with_context(|| format!("cannot create {}", out_dir.display()))?;
    let n = args.size.max(2);

    // ── 1. elevation.png & 2. normals.png ────────────────────────────────────
    println!("Evaluating surface ({n}×{n})…");
    let mesh = evaluate_surface(&PlaneGrid::new(2.0, 2.0, n - 1, n - 1), &params);
    let (lo, hi) = (mesh.min_elevation(), mesh.max_elevation());
    let range = (hi - lo).max(1e-6);
    info!("Elevation range [{lo:.4}, {hi:.4}]");
    save(out_dir, "elevation.png", n, |r, c| gray((mesh.elevations[r * n + c] - lo) / range))?;
    save(out_dir, "normals.png", n, |r, c| rgb(mesh.normals[r * n + c] * 0.5 + Vec3::splat(0.5)))?;

    // ── 3. zones.png ─────────────────────────────────────────────────────────
    save(out_dir, "zones.png", n, |r, c| {
        let uv = Vec2::new((c as f32 + 0.5) / n as f32, 1.0 - (r as f32 + 0.5) / n as f32);
        encode_srgb8(blend_zones(uv, &params.zones))
    })?;

    // ── 4. frame.png ─────────────────────────────────────────────────────────
    let shader = SurfaceShader::new();
    let settings = FrameSettings::with_size(n, n).with_background_hex(&args.background)?;
    println!("Rendering frame at t={}…", params.time);
    let frame = render_frame(&shader, &params, &settings);
    save_rgba(out_dir, "frame.png", n, n, frame.pixels)?;

    // ── 5. debug_*.png ───────────────────────────────────────────────────────
    for (mode, name) in [
        (DebugMode::ShowAo, "debug_ao.png"),
        (DebugMode::ShowRoughness, "debug_roughness.png"),
        (DebugMode::ShowMetalness, "debug_metalness.png"),
        (DebugMode::ShowNormal, "debug_normal.png"),
    ] {
        let debug = SurfaceParameters { debug_mode: mode, ..params.clone() };
        let frame = render_frame(&shader, &debug, &settings);
        save_rgba(out_dir, name, n, n, frame.pixels)?;
    }

    // ── 6. environment.png ───────────────────────────────────────────────────
    match &params.lighting.environment.map {
        Some(map) => {
            let mut img = image::RgbImage::new(map.width as u32, map.height as u32);
            for r in 0..map.height {
                for c in 0..map.width {
                    img.put_pixel(c as u32, r as u32, image::Rgb(encode_srgb8(map.get(r, c).truncate())));
                }
            }
            let path = out_dir.join("environment.png");
            img.save(&path).with_context(|| format!("failed to save {}", path.display()))?;
            println!("Wrote {}", path.display());
        }
        None => info!("No environment map loaded; skipping environment.png"),
    }

    Ok(())
}
