//! vectrace-pipeline: Pure raster-to-vector contour engine (sans-IO).
//!
//! Converts one color of a quantized raster into closed vector paths
//! through:
//! mask -> contour tracing -> simplification -> smoothing ->
//! area filter -> path descriptors.
//!
//! An alternate outline pass erodes the mask and traces the band of
//! cells along each region's edge, for stroke-style output.
//!
//! This crate has **no I/O dependencies** -- it operates on in-memory
//! byte slices and returns structured data. Decoding images and writing
//! SVG files happen in `vectrace-export` and `vectrace-bench`.

pub mod contour;
pub mod diagnostics;
pub mod filter;
pub mod layer;
pub mod marching_squares;
pub mod mask;
pub mod outline;
pub mod path_data;
pub mod simplify;
pub mod smooth;
pub mod types;

pub use contour::{ContourTracer, ContourTracerKind, MAX_CONTOURS};
pub use layer::{vectorize_layer, vectorize_layers, vectorize_mask, vectorize_outline};
pub use mask::Mask;
pub use types::{
    Dimensions, PipelineError, PixelFormat, Point, Polyline, RasterLayer, Rgb, VectorizeConfig,
    VectorizedLayer,
};
