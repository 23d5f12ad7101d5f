//! vectrace-bench: CLI tool for vectorization parameter experimentation
//! and diagnostics.
//!
//! Vectorizes the color layers of an already-quantized image with
//! configurable parameters, printing detailed per-stage diagnostics for
//! every layer. Useful for:
//!
//! - Tuning simplification tolerance, area threshold and smoothing
//! - Comparing contour tracers (`marching-squares` vs `border-following`)
//! - Measuring per-stage durations to identify bottlenecks
//!
//! # Usage
//!
//! ```text
//! cargo run --release --bin vectrace-bench -- [OPTIONS] <IMAGE_PATH>
//! ```
//!
//! Set `RUST_LOG` (e.g. `RUST_LOG=vectrace=debug`) for pipeline logs.

#![allow(clippy::print_stdout, clippy::print_stderr)]

use std::collections::HashMap;
use std::path::PathBuf;
use std::process::ExitCode;
use std::time::{Duration, Instant};

use clap::{Parser, ValueEnum};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};
use vectrace_pipeline::diagnostics::{Clock, LayerDiagnostics, vectorize_mask_with_diagnostics};
use vectrace_pipeline::{
    ContourTracerKind, Mask, RasterLayer, Rgb, VectorizeConfig, VectorizedLayer, vectorize_outline,
};

/// Vectorization parameter experimentation and diagnostics for vectrace.
///
/// Traces each palette color of a quantized image into closed paths and
/// prints per-stage timing and count diagnostics.
#[derive(Parser)]
#[command(name = "vectrace-bench", version)]
struct Cli {
    /// Path to the input image (PNG, JPEG, BMP, WebP).
    image_path: PathBuf,

    /// Palette colors as comma-separated hex (e.g. "#000000,#ff0000").
    ///
    /// When omitted, the most frequent opaque colors are used.
    #[arg(long, value_delimiter = ',', value_parser = parse_color)]
    colors: Vec<Rgb>,

    /// Number of most frequent colors to vectorize when `--colors` is not given.
    #[arg(long, default_value_t = 8, value_parser = clap::builder::RangedU64ValueParser::<usize>::new().range(1..))]
    max_colors: usize,

    /// Per-channel color matching tolerance.
    #[arg(long, default_value_t = 0)]
    tolerance: u8,

    /// Douglas-Peucker simplification tolerance in pixels.
    #[arg(long, default_value_t = VectorizeConfig::DEFAULT_SIMPLIFY_TOLERANCE)]
    simplify_tolerance: f64,

    /// Minimum enclosed area in square pixels.
    #[arg(long, default_value_t = VectorizeConfig::DEFAULT_MIN_AREA)]
    min_area: f64,

    /// Disable Chaikin smoothing.
    #[arg(long)]
    no_smoothing: bool,

    /// Chaikin smoothing iterations.
    #[arg(long, default_value_t = VectorizeConfig::DEFAULT_SMOOTH_ITERATIONS)]
    smooth_iterations: u32,

    /// Contour tracing algorithm.
    #[arg(long, value_enum, default_value_t = Tracer::MarchingSquares)]
    tracer: Tracer,

    /// Pixels per millimetre; output coordinates are in millimetres.
    #[arg(long, default_value_t = 10.0)]
    px_per_mm: f64,

    /// Also emit an outline layer per color with this band thickness in pixels.
    #[arg(long)]
    outline_thickness: Option<u32>,

    /// Write SVG output to file.
    #[arg(long)]
    svg: Option<PathBuf>,

    /// Number of runs for averaging.
    #[arg(long, default_value_t = 1, value_parser = clap::builder::RangedU64ValueParser::<usize>::new().range(1..))]
    runs: usize,

    /// Output diagnostics as JSON instead of human-readable report.
    #[arg(long)]
    json: bool,

    /// Full vectorize config as a JSON string.
    ///
    /// When provided, all other vectorize parameter flags are ignored.
    /// Missing fields take their defaults.
    #[arg(long)]
    config_json: Option<String>,
}

/// Contour tracer selection.
#[derive(Clone, Copy, ValueEnum)]
enum Tracer {
    /// Marching squares along cell edges.
    MarchingSquares,
    /// Suzuki-Abe border following through pixel centers.
    BorderFollowing,
}

/// Parse `#rrggbb` (the `#` is optional).
fn parse_color(s: &str) -> Result<Rgb, String> {
    let hex = s.trim().trim_start_matches('#');
    if hex.len() != 6 || !hex.is_ascii() {
        return Err(format!("expected a color like #ff8000, got {s:?}"));
    }
    let channel = |i: usize| {
        u8::from_str_radix(&hex[i..i + 2], 16)
            .map_err(|e| format!("invalid color {s:?}: {e}"))
    };
    Ok(Rgb::new(channel(0)?, channel(2)?, channel(4)?))
}

/// Build a [`VectorizeConfig`] from CLI arguments.
///
/// If `--config-json` is provided, the JSON is parsed directly and all
/// individual parameter flags are ignored. Otherwise, a config is
/// assembled from the individual flags.
fn config_from_cli(cli: &Cli) -> Result<VectorizeConfig, String> {
    let config = if let Some(ref json) = cli.config_json {
        serde_json::from_str(json).map_err(|e| format!("Error parsing --config-json: {e}"))?
    } else {
        VectorizeConfig {
            simplify_tolerance: cli.simplify_tolerance,
            min_area: cli.min_area,
            smoothing: !cli.no_smoothing,
            smooth_iterations: cli.smooth_iterations,
            contour_tracer: match cli.tracer {
                Tracer::MarchingSquares => ContourTracerKind::MarchingSquares,
                Tracer::BorderFollowing => ContourTracerKind::BorderFollowing,
            },
        }
    };
    config.validate().map_err(|e| e.to_string())?;
    Ok(config)
}

/// The `limit` most frequent opaque colors, most frequent first.
///
/// Ties are broken by color value so the order is deterministic.
fn dominant_colors(image: &vectrace_pipeline::types::RgbaImage, limit: usize) -> Vec<Rgb> {
    let mut counts: HashMap<Rgb, usize> = HashMap::new();
    for px in image.pixels() {
        let [r, g, b, a] = px.0;
        if a > vectrace_pipeline::mask::ALPHA_THRESHOLD {
            *counts.entry(Rgb::new(r, g, b)).or_default() += 1;
        }
    }
    let mut ranked: Vec<(Rgb, usize)> = counts.into_iter().collect();
    ranked.sort_by(|a, b| {
        b.1.cmp(&a.1)
            .then_with(|| (a.0.r, a.0.g, a.0.b).cmp(&(b.0.r, b.0.g, b.0.b)))
    });
    ranked.into_iter().take(limit).map(|(c, _)| c).collect()
}

fn init_tracing() {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "vectrace=info".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_tracing();

    let config = match config_from_cli(&cli) {
        Ok(c) => c,
        Err(msg) => {
            eprintln!("{msg}");
            return ExitCode::FAILURE;
        }
    };

    if !(cli.px_per_mm.is_finite() && cli.px_per_mm > 0.0) {
        eprintln!("--px-per-mm must be finite and > 0, got {}", cli.px_per_mm);
        return ExitCode::FAILURE;
    }
    let scale = 1.0 / cli.px_per_mm;

    let image = match image::open(&cli.image_path) {
        Ok(img) => img.to_rgba8(),
        Err(e) => {
            eprintln!("Error reading {}: {e}", cli.image_path.display());
            return ExitCode::FAILURE;
        }
    };
    let raster = RasterLayer::from_rgba_image(&image);

    let palette = if cli.colors.is_empty() {
        dominant_colors(&image, cli.max_colors)
    } else {
        cli.colors.clone()
    };

    eprintln!(
        "Image: {} ({}x{})",
        cli.image_path.display(),
        image.width(),
        image.height(),
    );
    eprintln!(
        "Palette: {}",
        palette
            .iter()
            .map(|c| c.to_hex())
            .collect::<Vec<_>>()
            .join(", ")
    );
    eprintln!("Config: {config:#?}");
    eprintln!("Runs: {}", cli.runs);
    eprintln!();

    let mut all_runs: Vec<Vec<LayerDiagnostics>> = Vec::with_capacity(cli.runs);
    let mut layers: Vec<VectorizedLayer> = Vec::new();

    for run in 0..cli.runs {
        if cli.runs > 1 {
            eprintln!("--- Run {}/{} ---", run + 1, cli.runs);
        }

        let mut run_diagnostics = Vec::with_capacity(palette.len());
        let mut run_layers = Vec::with_capacity(palette.len());
        for &color in &palette {
            let result = Mask::from_raster(&raster, color, cli.tolerance).and_then(|mask| {
                vectorize_mask_with_diagnostics(&mask, color, &config, scale, &StdClock)
            });
            match result {
                Ok((layer, diagnostics)) => {
                    if cli.json {
                        match serde_json::to_string_pretty(&diagnostics) {
                            Ok(json) => println!("{json}"),
                            Err(e) => {
                                eprintln!("Error serializing diagnostics: {e}");
                                return ExitCode::FAILURE;
                            }
                        }
                    } else {
                        println!("{}\n", diagnostics.report());
                    }
                    run_layers.push(layer);
                    run_diagnostics.push(diagnostics);
                }
                Err(e) => {
                    eprintln!("Vectorization error for {}: {e}", color.to_hex());
                    return ExitCode::FAILURE;
                }
            }
        }

        if run == 0 {
            layers = run_layers;
        }
        all_runs.push(run_diagnostics);
    }

    if cli.runs > 1 {
        print_multi_run_summary(&all_runs);
    }

    if let Some(ref svg_path) = cli.svg {
        let outlines = match cli.outline_thickness {
            Some(thickness) => {
                match palette
                    .iter()
                    .map(|&c| {
                        vectorize_outline(&raster, c, cli.tolerance, thickness, &config, scale)
                    })
                    .collect::<Result<Vec<_>, _>>()
                {
                    Ok(o) => o,
                    Err(e) => {
                        eprintln!("Outline error: {e}");
                        return ExitCode::FAILURE;
                    }
                }
            }
            None => Vec::new(),
        };

        let title = cli
            .image_path
            .file_stem()
            .and_then(|s| s.to_str())
            .unwrap_or("bench");
        let desc = format!(
            "tolerance={} px_per_mm={} colors={}",
            cli.tolerance,
            cli.px_per_mm,
            palette.len()
        );
        let config_json = serde_json::to_string(&config).ok();
        let metadata = vectrace_export::SvgMetadata {
            title: Some(title),
            description: Some(&desc),
            config_json: config_json.as_deref(),
        };

        let svg_layers: Vec<vectrace_export::SvgLayer<'_>> = layers
            .iter()
            .map(vectrace_export::SvgLayer::fill)
            .chain(
                outlines
                    .iter()
                    .map(|o| vectrace_export::SvgLayer::stroke(o, scale)),
            )
            .collect();
        let svg = vectrace_export::to_svg(&svg_layers, raster.dimensions(), scale, &metadata);
        match std::fs::write(svg_path, &svg) {
            Ok(()) => {
                tracing::info!(
                    path = %svg_path.display(),
                    bytes = svg.len(),
                    layers = svg_layers.len(),
                    "SVG written"
                );
            }
            Err(e) => {
                eprintln!("Error writing SVG to {}: {e}", svg_path.display());
                return ExitCode::FAILURE;
            }
        }
    }

    ExitCode::SUCCESS
}

/// [`Clock`] implementation backed by [`std::time::Instant`].
struct StdClock;

impl Clock for StdClock {
    type Instant = Instant;

    fn now(&self) -> Instant {
        Instant::now()
    }

    fn elapsed(&self, since: &Instant) -> Duration {
        since.elapsed()
    }
}

/// Print per-color duration statistics across multiple runs.
#[allow(clippy::cast_precision_loss)]
fn print_multi_run_summary(all_runs: &[Vec<LayerDiagnostics>]) {
    println!();
    println!("Summary ({} runs)\n{}", all_runs.len(), "=".repeat(60));

    let Some(first) = all_runs.first() else {
        println!("Warning: no diagnostics to summarize");
        return;
    };

    println!(
        "{:<10} {:>12} {:>12} {:>12} {:>8}",
        "Color", "Min (ms)", "Mean (ms)", "Max (ms)", "Paths"
    );
    println!("{}", "-".repeat(58));

    for (i, layer) in first.iter().enumerate() {
        let durations: Vec<f64> = all_runs
            .iter()
            .filter_map(|run| run.get(i))
            .map(|d| d.total_duration.as_secs_f64() * 1000.0)
            .collect();
        let min = durations.iter().copied().reduce(f64::min).unwrap_or(0.0);
        let max = durations.iter().copied().reduce(f64::max).unwrap_or(0.0);
        let mean = durations.iter().sum::<f64>() / durations.len().max(1) as f64;
        println!(
            "{:<10} {min:>12.3} {mean:>12.3} {max:>12.3} {:>8}",
            layer.color.to_hex(),
            layer.summary.path_count,
        );
    }
}
