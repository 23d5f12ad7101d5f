//! Layer diagnostics: timing, counts, and other metrics for each stage.
//!
//! These diagnostics are permanent instrumentation intended for
//! parameter tuning. [`vectorize_mask_with_diagnostics`] produces the
//! same layer as [`vectorize_mask`](crate::layer::vectorize_mask) and
//! records what every stage did along the way.
//!
//! The crate does no I/O, so time is read through the caller-supplied
//! [`Clock`]. Durations are serialized as fractional seconds (`f64`)
//! for JSON compatibility, since `std::time::Duration` does not
//! implement serde traits.

use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::contour::ContourTracer;
use crate::filter::{filter_by_area, filter_degenerate};
use crate::layer::serialize;
use crate::mask::Mask;
use crate::simplify::simplify_paths;
use crate::smooth::smooth_paths;
use crate::types::{
    PipelineError, Polyline, Rgb, VectorizeConfig, VectorizedLayer, validate_scale,
};

/// Time source for stage measurements.
pub trait Clock {
    /// An opaque point in time.
    type Instant;

    /// The current instant.
    fn now(&self) -> Self::Instant;

    /// Time elapsed since `since`.
    fn elapsed(&self, since: &Self::Instant) -> Duration;
}

/// Serde support for `std::time::Duration` as fractional seconds.
mod duration_serde {
    use std::time::Duration;

    use serde::{Deserialize, Deserializer, Serialize, Serializer};

    /// Serialize a `Duration` as fractional seconds (`f64`).
    pub fn serialize<S: Serializer>(duration: &Duration, serializer: S) -> Result<S::Ok, S::Error> {
        duration.as_secs_f64().serialize(serializer)
    }

    /// Deserialize a `Duration` from fractional seconds (`f64`).
    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Duration, D::Error> {
        let secs = f64::deserialize(deserializer)?;
        Duration::try_from_secs_f64(secs).map_err(|_| {
            serde::de::Error::custom(
                "duration seconds must be finite, non-negative, and representable as a Duration",
            )
        })
    }
}

/// Diagnostics collected from vectorizing one layer.
///
/// Smoothing is skipped when disabled, in which case its field is `None`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LayerDiagnostics {
    /// The layer's color.
    pub color: Rgb,
    /// Stage 1: contour tracing.
    pub contour_tracing: StageDiagnostics,
    /// Stage 2: Douglas-Peucker simplification.
    pub simplification: StageDiagnostics,
    /// Stage 3: Chaikin smoothing (only when smoothing is enabled).
    pub smoothing: Option<StageDiagnostics>,
    /// Stage 4: area filter.
    pub area_filter: StageDiagnostics,
    /// Stage 5: path descriptor serialization.
    pub serialization: StageDiagnostics,
    /// Total duration across all stages (seconds).
    #[serde(with = "duration_serde")]
    pub total_duration: Duration,
    /// Summary counts across all stages.
    pub summary: LayerSummary,
}

/// Diagnostics for a single stage.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StageDiagnostics {
    /// Duration of this stage (seconds).
    #[serde(with = "duration_serde")]
    pub duration: Duration,
    /// Stage-specific metrics.
    pub metrics: StageMetrics,
}

/// Stage-specific metrics.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum StageMetrics {
    /// Contour tracing metrics.
    ContourTracing {
        /// Number of contours found.
        contour_count: usize,
        /// Total number of points across all contours.
        total_point_count: usize,
        /// Minimum points in any single contour.
        min_contour_points: usize,
        /// Maximum points in any single contour.
        max_contour_points: usize,
        /// Mean points per contour.
        mean_contour_points: f64,
    },
    /// Path simplification metrics.
    Simplification {
        /// Douglas-Peucker tolerance in cells.
        tolerance: f64,
        /// Number of polylines simplified.
        polyline_count: usize,
        /// Total points before simplification.
        points_before: usize,
        /// Total points after simplification.
        points_after: usize,
        /// Reduction ratio: `1.0 - (after / before)`.
        reduction_ratio: f64,
    },
    /// Chaikin smoothing metrics.
    Smoothing {
        /// Number of corner-cutting rounds.
        iterations: u32,
        /// Total points before smoothing.
        points_before: usize,
        /// Total points after smoothing.
        points_after: usize,
    },
    /// Area filter metrics.
    AreaFilter {
        /// Minimum enclosed area in square cells.
        min_area: f64,
        /// Paths entering the filter.
        paths_before: usize,
        /// Paths that survived.
        paths_after: usize,
    },
    /// Serialization metrics.
    Serialization {
        /// Output units per cell.
        scale: f64,
        /// Number of path descriptors written.
        path_count: usize,
        /// Total length of all descriptors in bytes.
        total_bytes: usize,
    },
}

/// High-level summary counts for one layer.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LayerSummary {
    /// Mask width in cells.
    pub width: u32,
    /// Mask height in cells.
    pub height: u32,
    /// Number of set cells in the mask.
    pub cell_count: usize,
    /// Number of contours found.
    pub contour_count: usize,
    /// Number of paths in the output.
    pub path_count: usize,
    /// Total points across all output paths.
    pub final_point_count: usize,
}

/// Vectorize a mask like [`vectorize_mask`](crate::layer::vectorize_mask),
/// timing each stage with `clock`.
///
/// # Errors
///
/// Returns [`PipelineError::InvalidConfig`] if `config` or `scale` is
/// out of range.
pub fn vectorize_mask_with_diagnostics<C: Clock>(
    mask: &Mask,
    color: Rgb,
    config: &VectorizeConfig,
    scale: f64,
    clock: &C,
) -> Result<(VectorizedLayer, LayerDiagnostics), PipelineError> {
    config.validate()?;
    validate_scale(scale)?;

    let start = clock.now();

    let t = clock.now();
    let contours = config.contour_tracer.trace(mask);
    let stats = contour_stats(&contours);
    let contour_tracing = StageDiagnostics {
        duration: clock.elapsed(&t),
        metrics: StageMetrics::ContourTracing {
            contour_count: contours.len(),
            total_point_count: stats.total,
            min_contour_points: stats.min,
            max_contour_points: stats.max,
            mean_contour_points: stats.mean,
        },
    };

    let t = clock.now();
    let simplified = simplify_paths(&contours, config.simplify_tolerance);
    let points_before = stats.total;
    let points_after = total_points(&simplified);
    #[allow(clippy::cast_precision_loss)]
    let reduction_ratio = if points_before > 0 {
        1.0 - (points_after as f64 / points_before as f64)
    } else {
        0.0
    };
    let simplification = StageDiagnostics {
        duration: clock.elapsed(&t),
        metrics: StageMetrics::Simplification {
            tolerance: config.simplify_tolerance,
            polyline_count: simplified.len(),
            points_before,
            points_after,
            reduction_ratio,
        },
    };

    let (shaped, smoothing) = match config.effective_smooth_iterations() {
        0 => (simplified, None),
        iterations => {
            let t = clock.now();
            let smoothed = smooth_paths(&simplified, iterations);
            let stage = StageDiagnostics {
                duration: clock.elapsed(&t),
                metrics: StageMetrics::Smoothing {
                    iterations,
                    points_before: points_after,
                    points_after: total_points(&smoothed),
                },
            };
            (smoothed, Some(stage))
        }
    };

    let t = clock.now();
    let kept = filter_by_area(&filter_degenerate(&shaped), config.min_area);
    let area_filter = StageDiagnostics {
        duration: clock.elapsed(&t),
        metrics: StageMetrics::AreaFilter {
            min_area: config.min_area,
            paths_before: shaped.len(),
            paths_after: kept.len(),
        },
    };

    let t = clock.now();
    let layer = serialize(color, &kept, scale);
    let serialization = StageDiagnostics {
        duration: clock.elapsed(&t),
        metrics: StageMetrics::Serialization {
            scale,
            path_count: layer.path_count,
            total_bytes: layer.paths.iter().map(String::len).sum(),
        },
    };

    let summary = LayerSummary {
        width: mask.width(),
        height: mask.height(),
        cell_count: mask.count(),
        contour_count: contours.len(),
        path_count: layer.path_count,
        final_point_count: total_points(&layer.polylines),
    };

    let diagnostics = LayerDiagnostics {
        color,
        contour_tracing,
        simplification,
        smoothing,
        area_filter,
        serialization,
        total_duration: clock.elapsed(&start),
        summary,
    };
    Ok((layer, diagnostics))
}

impl LayerDiagnostics {
    /// Format diagnostics as a human-readable report.
    #[must_use]
    pub fn report(&self) -> String {
        let mut lines = Vec::new();

        lines.push(format!(
            "Layer {} Diagnostics\n{}",
            self.color.to_hex(),
            "=".repeat(60)
        ));
        lines.push(format!(
            "Mask: {}x{} ({} set cells)",
            self.summary.width, self.summary.height, self.summary.cell_count,
        ));
        lines.push(format!(
            "Total duration: {:.3}ms",
            duration_ms(self.total_duration),
        ));
        lines.push(String::new());

        lines.push(format!(
            "{:<24} {:>10} {:>10}  {}",
            "Stage", "Duration", "% Total", "Details"
        ));
        lines.push("-".repeat(80));

        let total_ms = duration_ms(self.total_duration);

        let mut stages = vec![
            ("Contour Tracing", &self.contour_tracing),
            ("Simplification", &self.simplification),
        ];
        if let Some(ref s) = self.smoothing {
            stages.push(("Smoothing", s));
        }
        stages.push(("Area Filter", &self.area_filter));
        stages.push(("Serialization", &self.serialization));

        for (name, diag) in &stages {
            let ms = duration_ms(diag.duration);
            let pct = if total_ms > 0.0 {
                ms / total_ms * 100.0
            } else {
                0.0
            };
            let details = format_metrics(&diag.metrics);
            lines.push(format!("{name:<24} {ms:>8.3}ms {pct:>9.1}%  {details}"));
        }

        lines.push(String::new());
        lines.push(format!(
            "Contours: {}  |  Paths: {}  |  Final points: {}",
            self.summary.contour_count, self.summary.path_count, self.summary.final_point_count,
        ));

        lines.join("\n")
    }
}

/// Convert a `Duration` to milliseconds as `f64`.
fn duration_ms(d: Duration) -> f64 {
    d.as_secs_f64() * 1000.0
}

/// Format stage metrics into a compact detail string.
fn format_metrics(metrics: &StageMetrics) -> String {
    match metrics {
        StageMetrics::ContourTracing {
            contour_count,
            total_point_count,
            min_contour_points,
            max_contour_points,
            mean_contour_points,
        } => {
            format!(
                "{contour_count} contours, {total_point_count} pts (min={min_contour_points} max={max_contour_points} mean={mean_contour_points:.1})",
            )
        }
        StageMetrics::Simplification {
            tolerance,
            points_before,
            points_after,
            reduction_ratio,
            ..
        } => {
            format!(
                "tol={tolerance:.2} {points_before}->{points_after} pts ({:.1}% reduction)",
                reduction_ratio * 100.0,
            )
        }
        StageMetrics::Smoothing {
            iterations,
            points_before,
            points_after,
        } => format!("x{iterations} {points_before}->{points_after} pts"),
        StageMetrics::AreaFilter {
            min_area,
            paths_before,
            paths_after,
        } => format!("min={min_area:.2} {paths_before}->{paths_after} paths"),
        StageMetrics::Serialization {
            scale,
            path_count,
            total_bytes,
        } => format!("scale={scale} {path_count} paths, {total_bytes} bytes"),
    }
}

/// Statistics for a set of contour polylines.
struct ContourStats {
    total: usize,
    min: usize,
    max: usize,
    mean: f64,
}

fn contour_stats(contours: &[Polyline]) -> ContourStats {
    let total = total_points(contours);
    let min = contours.iter().map(Polyline::len).min().unwrap_or(0);
    let max = contours.iter().map(Polyline::len).max().unwrap_or(0);
    #[allow(clippy::cast_precision_loss)]
    let mean = if contours.is_empty() {
        0.0
    } else {
        total as f64 / contours.len() as f64
    };
    ContourStats {
        total,
        min,
        max,
        mean,
    }
}

/// Total points across a slice of polylines.
fn total_points(polylines: &[Polyline]) -> usize {
    polylines.iter().map(Polyline::len).sum()
}
