/// Offline runner for the surface property battery.
///
/// Audits a parameter snapshot (or a built-in preset) and exits non-zero
/// when any check fails.

use anyhow::{bail, Context, Result};
use clap::Parser;
use drape_core::audit::{run_property_audit, AuditReport};
use drape_core::SurfaceParameters;
use log::info;

#[derive(Parser, Debug)]
#[command(name = "drape-test", about = "Surface property battery runner")]
struct Args {
    /// Path to a parameter snapshot JSON file to audit.
    #[arg(short, long)]
    input: Option<String>,

    /// Built-in preset to audit when no input is given.
    #[arg(short, long, default_value = "fabric")]
    preset: String,

    /// Audit every built-in preset, every reset group and a sweep of times.
    #[arg(long)]
    batch: bool,

    /// Print the reports as JSON instead of text.
    #[arg(long)]
    json: bool,
}

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    let args = Args::parse();

    let cases = if args.batch {
        batch_cases()
    } else if let Some(path) = &args.input {
        let json = std::fs::read_to_string(path).with_context(|| format!("reading {path}"))?;
        let params = SurfaceParameters::from_json(&json).with_context(|| format!("parsing {path}"))?;
        vec![(path.clone(), params)]
    } else {
        let params = SurfaceParameters::preset(&args.preset)
            .with_context(|| format!("unknown preset `{}` (fabric | water)", args.preset))?;
        vec![(args.preset.clone(), params)]
    };

    let mut failed = Vec::new();
    let mut reports = Vec::new();
    for (name, params) in &cases {
        info!("Auditing {name}");
        let report = run_property_audit(params);
        if !report.passed() {
            failed.push(name.clone());
        }
        if !args.json {
            print_report(name, &report);
        }
        reports.push(serde_json::json!({ "case": name, "report": report }));
    }

    if args.json {
        println!("{}", serde_json::to_string_pretty(&reports)?);
    }

    if !failed.is_empty() {
        bail!("{} of {} cases failed: {}", failed.len(), cases.len(), failed.join(", "));
    }
    eprintln!("All {} cases passed.", cases.len());
    Ok(())
}

fn batch_cases() -> Vec<(String, SurfaceParameters)> {
    let mut cases = Vec::new();
    for preset in ["fabric", "water"] {
        let Some(base) = SurfaceParameters::preset(preset) else { continue };
        for t in [0.0f32, 1.0, 12.5, 600.0] {
            cases.push((format!("{preset}@t={t}"), base.at_time(t)));
        }

        let resets: [(&str, fn(&mut SurfaceParameters)); 5] = [
            ("movement", SurfaceParameters::reset_movement),
            ("appearance", SurfaceParameters::reset_appearance),
            ("lighting", SurfaceParameters::reset_lighting),
            ("colors", SurfaceParameters::reset_colors),
            ("colorCenters", SurfaceParameters::reset_color_centers),
        ];
        for (group, reset) in resets {
            let mut p = base.clone();
            reset(&mut p);
            cases.push((format!("{preset}+reset:{group}"), p));
        }

        let mut flat = base.clone();
        flat.waves.small_wave_iterations = 0;
        cases.push((format!("{preset}+no-ripples"), flat));
    }
    cases
}

fn print_report(name: &str, report: &AuditReport) {
    println!("── {name}");
    for check in &report.checks {
        let mark = if check.passed { "PASS" } else { "FAIL" };
        println!("  {mark}  {:<32} {}", check.name, check.detail);
    }
}
