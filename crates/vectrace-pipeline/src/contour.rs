//! Contour tracing: extract closed boundary polylines from a [`Mask`].
//!
//! This module defines the [`ContourTracer`] trait for pluggable contour
//! tracing algorithms and the [`ContourTracerKind`] enum for selecting
//! which algorithm to use at runtime.
//!
//! # Strategy pattern
//!
//! Different tracers produce different geometry from the same mask.
//! [`MarchingSquares`](ContourTracerKind::MarchingSquares) walks cell
//! edges and reports corners on the integer grid, so a lone cell becomes
//! a unit square. [`BorderFollowing`](ContourTracerKind::BorderFollowing)
//! reports boundary pixel centers (offset by half a cell), so a lone cell
//! degenerates and solid shapes lose half a cell on every side. Every
//! later stage is coordinate-agnostic and accepts either.

use serde::{Deserialize, Serialize};

use crate::mask::Mask;
use crate::marching_squares;
use crate::types::{Point, Polyline};

/// Upper bound on contours collected from one mask.
///
/// Pathological inputs (dithered noise) can produce one contour per
/// pixel. Tracing stops once this many contours have been collected.
pub const MAX_CONTOURS: usize = 10_000;

/// Selects which contour tracing algorithm to use.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum ContourTracerKind {
    /// Marching squares along cell edges (see [`crate::marching_squares`]).
    ///
    /// Every boundary, including holes, is traced exactly once. Cells
    /// that touch only at a corner belong to separate contours.
    #[default]
    MarchingSquares,

    /// Suzuki-Abe border following via `imageproc::contours::find_contours`.
    ///
    /// Points sit at boundary pixel centers. Kept for comparison with
    /// the marching squares tracer.
    BorderFollowing,
}

/// Trait for contour tracing strategies.
///
/// Input: a binary mask.
/// Output: a set of closed polylines, one per boundary component, in
/// discovery order. Contours with 2 or fewer points are never returned.
/// No winding order is guaranteed.
pub trait ContourTracer {
    /// Trace contours in the given mask.
    fn trace(&self, mask: &Mask) -> Vec<Polyline>;
}

impl ContourTracer for ContourTracerKind {
    fn trace(&self, mask: &Mask) -> Vec<Polyline> {
        match *self {
            Self::MarchingSquares => marching_squares::trace(mask),
            Self::BorderFollowing => trace_border_following(mask),
        }
    }
}

/// Suzuki-Abe border following via `imageproc::contours::find_contours`.
///
/// Converts `imageproc` contour points (integer pixel indices) into
/// pixel-center [`Point`]s.
fn trace_border_following(mask: &Mask) -> Vec<Polyline> {
    let contours: Vec<imageproc::contours::Contour<u32>> =
        imageproc::contours::find_contours(&mask.to_gray_image());

    let mut out: Vec<Polyline> = contours
        .into_iter()
        .filter(|c| c.points.len() > 2)
        .map(|c| {
            let points = c
                .points
                .into_iter()
                .map(|p| Point::new(f64::from(p.x) + 0.5, f64::from(p.y) + 0.5))
                .collect();
            Polyline::new(points)
        })
        .collect();

    if out.len() > MAX_CONTOURS {
        tracing::warn!(
            found = out.len(),
            limit = MAX_CONTOURS,
            "contour limit reached, dropping the remainder"
        );
        out.truncate(MAX_CONTOURS);
    }
    out
}
