//! Per-color vectorization: mask -> contours -> simplified, smoothed,
//! filtered and serialized paths.
//!
//! Every entry point validates the configuration and scale before doing
//! any work, so callers get [`PipelineError::InvalidConfig`] rather than
//! silently clamped output.

use rayon::prelude::*;

use crate::contour::ContourTracer;
use crate::filter::{filter_by_area, filter_degenerate};
use crate::mask::Mask;
use crate::outline::outline_mask;
use crate::path_data::path_data;
use crate::simplify::simplify_paths;
use crate::smooth::smooth_paths;
use crate::types::{
    PipelineError, Polyline, RasterLayer, Rgb, VectorizeConfig, VectorizedLayer, validate_scale,
};

/// Vectorize an already-built mask.
///
/// Runs contour tracing, simplification, optional smoothing and the
/// area filter, then serializes each surviving path with coordinates
/// multiplied by `scale`.
///
/// # Errors
///
/// Returns [`PipelineError::InvalidConfig`] if `config` or `scale` is
/// out of range.
pub fn vectorize_mask(
    mask: &Mask,
    color: Rgb,
    config: &VectorizeConfig,
    scale: f64,
) -> Result<VectorizedLayer, PipelineError> {
    config.validate()?;
    validate_scale(scale)?;

    let contours = config.contour_tracer.trace(mask);
    let shaped = shape(&contours, config);
    let kept = filter_by_area(&filter_degenerate(&shaped), config.min_area);

    tracing::debug!(
        color = %color.to_hex(),
        cells = mask.count(),
        contours = contours.len(),
        paths = kept.len(),
        "vectorized layer"
    );
    Ok(serialize(color, &kept, scale))
}

/// Build the mask for `color` from a raster and vectorize it.
///
/// The settings are checked before the mask is built, so a bad config
/// fails without scanning the raster.
///
/// # Errors
///
/// Returns [`PipelineError::BufferSizeMismatch`] if the raster buffer
/// does not match its dimensions, or [`PipelineError::InvalidConfig`] if
/// `config` or `scale` is out of range.
pub fn vectorize_layer(
    raster: &RasterLayer<'_>,
    color: Rgb,
    tolerance: u8,
    config: &VectorizeConfig,
    scale: f64,
) -> Result<VectorizedLayer, PipelineError> {
    config.validate()?;
    validate_scale(scale)?;
    let mask = Mask::from_raster(raster, color, tolerance)?;
    vectorize_mask(&mask, color, config, scale)
}

/// Vectorize the outline band of `color`: the cells within `thickness`
/// of the region's edge.
///
/// Outline rings are filtered by point count (more than two) instead of
/// area, since a thin band can enclose very little area.
///
/// # Errors
///
/// Same as [`vectorize_layer`].
pub fn vectorize_outline(
    raster: &RasterLayer<'_>,
    color: Rgb,
    tolerance: u8,
    thickness: u32,
    config: &VectorizeConfig,
    scale: f64,
) -> Result<VectorizedLayer, PipelineError> {
    config.validate()?;
    validate_scale(scale)?;

    let mask = Mask::from_raster(raster, color, tolerance)?;
    let outline = outline_mask(&mask, thickness);
    let contours = config.contour_tracer.trace(&outline);
    let kept = filter_degenerate(&shape(&contours, config));

    tracing::debug!(
        color = %color.to_hex(),
        thickness,
        band_cells = outline.count(),
        contours = contours.len(),
        paths = kept.len(),
        "vectorized outline"
    );
    Ok(serialize(color, &kept, scale))
}

/// Vectorize every palette color of a raster, in parallel.
///
/// Layers are returned in palette order. Each worker builds its own mask
/// and shares nothing else but the read-only raster.
///
/// # Errors
///
/// Returns the first error encountered; see [`vectorize_layer`].
pub fn vectorize_layers(
    raster: &RasterLayer<'_>,
    palette: &[Rgb],
    tolerance: u8,
    config: &VectorizeConfig,
    scale: f64,
) -> Result<Vec<VectorizedLayer>, PipelineError> {
    config.validate()?;
    validate_scale(scale)?;

    let layers = palette
        .par_iter()
        .map(|&color| vectorize_layer(raster, color, tolerance, config, scale))
        .collect::<Result<Vec<_>, _>>()?;

    tracing::debug!(
        colors = palette.len(),
        paths = layers.iter().map(|l| l.path_count).sum::<usize>(),
        "vectorized palette"
    );
    Ok(layers)
}

/// Simplify, then smooth if enabled.
fn shape(contours: &[Polyline], config: &VectorizeConfig) -> Vec<Polyline> {
    let simplified = simplify_paths(contours, config.simplify_tolerance);
    match config.effective_smooth_iterations() {
        0 => simplified,
        iterations => smooth_paths(&simplified, iterations),
    }
}

pub(crate) fn serialize(color: Rgb, polylines: &[Polyline], scale: f64) -> VectorizedLayer {
    let paths = polylines.iter().map(|pl| path_data(pl, scale)).collect();
    let scaled = polylines.iter().map(|pl| pl.scaled(scale)).collect();
    VectorizedLayer::new(color, paths, scaled)
}
