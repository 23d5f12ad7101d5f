//! Shared types for the vectrace contour vectorization engine.

use serde::{Deserialize, Serialize};

use crate::contour::ContourTracerKind;

/// Re-export `GrayImage` so downstream crates can reference mask
/// rasters without depending on `image` directly.
pub use image::GrayImage;

/// Re-export `RgbaImage` so downstream crates can hand decoded images
/// to the mask builder without depending on `image` directly.
pub use image::RgbaImage;

/// A 2D point in mask-cell coordinates.
///
/// Contours produced by the marching squares tracer sit on cell corners,
/// so a cell at column `x`, row `y` spans `x..x + 1` by `y..y + 1`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Point {
    /// Horizontal position (cells from left edge).
    pub x: f64,
    /// Vertical position (cells from top edge).
    pub y: f64,
}

impl Point {
    /// Create a new point.
    #[must_use]
    pub const fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    /// The point a fraction `t` of the way from `self` to `other`.
    #[must_use]
    pub fn lerp(self, other: Self, t: f64) -> Self {
        Self::new(
            t.mul_add(other.x - self.x, self.x),
            t.mul_add(other.y - self.y, self.y),
        )
    }
}

/// A sequence of connected points.
///
/// Contours and paths are both stored as polylines. They are implicitly
/// closed: the last point connects back to the first, and the first
/// point is not repeated at the end.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Polyline(Vec<Point>);

impl Polyline {
    /// Create a new polyline from a vector of points.
    #[must_use]
    pub const fn new(points: Vec<Point>) -> Self {
        Self(points)
    }

    /// Returns `true` if the polyline has no points.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Returns the number of points in the polyline.
    #[must_use]
    pub const fn len(&self) -> usize {
        self.0.len()
    }

    /// Returns a slice of all points.
    #[must_use]
    pub fn points(&self) -> &[Point] {
        &self.0
    }

    /// Consumes the polyline and returns the underlying vector of points.
    #[must_use]
    pub fn into_points(self) -> Vec<Point> {
        self.0
    }

    /// Signed area of the closed polygon via the shoelace formula.
    ///
    /// The last point is treated as connected to the first. With the
    /// y axis pointing down, a visually clockwise ring has positive area.
    /// Fewer than 3 points enclose nothing and yield 0.
    #[must_use]
    pub fn signed_area(&self) -> f64 {
        let points = &self.0;
        if points.len() < 3 {
            return 0.0;
        }
        let mut twice_area = 0.0;
        for (i, a) in points.iter().enumerate() {
            let b = points[(i + 1) % points.len()];
            twice_area += a.x.mul_add(b.y, -(b.x * a.y));
        }
        twice_area / 2.0
    }

    /// Absolute enclosed area, used for artifact filtering.
    #[must_use]
    pub fn area(&self) -> f64 {
        self.signed_area().abs()
    }

    /// Multiply every coordinate by `scale`.
    #[must_use = "returns the scaled polyline"]
    pub fn scaled(&self, scale: f64) -> Self {
        Self(
            self.0
                .iter()
                .map(|p| Point::new(p.x * scale, p.y * scale))
                .collect(),
        )
    }
}

/// An 8-bit-per-channel color.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Rgb {
    /// Red channel.
    pub r: u8,
    /// Green channel.
    pub g: u8,
    /// Blue channel.
    pub b: u8,
}

impl Rgb {
    /// Create a new color.
    #[must_use]
    pub const fn new(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }

    /// Largest absolute per-channel difference (Chebyshev distance).
    #[must_use]
    pub const fn max_channel_delta(self, other: Self) -> u8 {
        let dr = self.r.abs_diff(other.r);
        let dg = self.g.abs_diff(other.g);
        let db = self.b.abs_diff(other.b);
        let m = if dr > dg { dr } else { dg };
        if m > db { m } else { db }
    }

    /// CSS hex notation, e.g. `#ff8000`.
    #[must_use]
    pub fn to_hex(self) -> String {
        format!("#{:02x}{:02x}{:02x}", self.r, self.g, self.b)
    }
}

/// Image dimensions in pixels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Dimensions {
    /// Width in pixels.
    pub width: u32,
    /// Height in pixels.
    pub height: u32,
}

/// Channel layout of a [`RasterLayer`] buffer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum PixelFormat {
    /// Three bytes per pixel: red, green, blue.
    #[default]
    Rgb8,
    /// Four bytes per pixel: red, green, blue, alpha.
    ///
    /// Pixels with alpha at or below [`crate::mask::ALPHA_THRESHOLD`]
    /// never match a target color.
    Rgba8,
}

impl PixelFormat {
    /// Bytes per pixel for this layout.
    #[must_use]
    pub const fn channels(self) -> usize {
        match self {
            Self::Rgb8 => 3,
            Self::Rgba8 => 4,
        }
    }
}

/// A borrowed raster layer: dimensions plus a flat row-major channel buffer.
#[derive(Debug, Clone, Copy)]
pub struct RasterLayer<'a> {
    /// Width in pixels.
    pub width: u32,
    /// Height in pixels.
    pub height: u32,
    /// Pixel data, `width * height * format.channels()` bytes.
    pub data: &'a [u8],
    /// Channel layout of `data`.
    pub format: PixelFormat,
}

impl<'a> RasterLayer<'a> {
    /// Wrap a flat RGB buffer.
    #[must_use]
    pub const fn rgb(width: u32, height: u32, data: &'a [u8]) -> Self {
        Self {
            width,
            height,
            data,
            format: PixelFormat::Rgb8,
        }
    }

    /// Wrap a flat RGBA buffer.
    #[must_use]
    pub const fn rgba(width: u32, height: u32, data: &'a [u8]) -> Self {
        Self {
            width,
            height,
            data,
            format: PixelFormat::Rgba8,
        }
    }

    /// Borrow a decoded RGBA image.
    #[must_use]
    pub fn from_rgba_image(image: &'a RgbaImage) -> Self {
        Self::rgba(image.width(), image.height(), image.as_raw())
    }

    /// Layer dimensions.
    #[must_use]
    pub const fn dimensions(&self) -> Dimensions {
        Dimensions {
            width: self.width,
            height: self.height,
        }
    }
}

/// Configuration for vectorizing one color layer.
///
/// All parameters have defaults matching the reference behavior of the
/// vectorizer. Call [`validate`](Self::validate) (done automatically by
/// every entry point in [`crate::layer`]) to reject out-of-range values.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct VectorizeConfig {
    /// Douglas-Peucker tolerance in mask cells. Must be finite and `>= 0`.
    /// A tolerance of 0 still removes exactly collinear points.
    pub simplify_tolerance: f64,

    /// Paths enclosing less than this many square cells are dropped.
    /// Must be finite and `>= 0`.
    pub min_area: f64,

    /// Whether to apply Chaikin corner-cutting after simplification.
    pub smoothing: bool,

    /// Number of Chaikin iterations. Each iteration doubles the point
    /// count, so values above [`Self::MAX_SMOOTH_ITERATIONS`] are rejected.
    pub smooth_iterations: u32,

    /// Which contour tracing algorithm to use.
    pub contour_tracer: ContourTracerKind,
}

impl VectorizeConfig {
    /// Default Douglas-Peucker tolerance in cells.
    pub const DEFAULT_SIMPLIFY_TOLERANCE: f64 = 0.5;
    /// Default minimum enclosed area in square cells.
    pub const DEFAULT_MIN_AREA: f64 = 4.0;
    /// Smoothing is on by default.
    pub const DEFAULT_SMOOTHING: bool = true;
    /// Default number of Chaikin iterations.
    pub const DEFAULT_SMOOTH_ITERATIONS: u32 = 1;
    /// Upper bound on Chaikin iterations (256x point growth).
    pub const MAX_SMOOTH_ITERATIONS: u32 = 8;

    /// Check every field against its documented range.
    ///
    /// # Errors
    ///
    /// Returns [`PipelineError::InvalidConfig`] naming the first offending
    /// field. Values are never clamped.
    pub fn validate(&self) -> Result<(), PipelineError> {
        if !self.simplify_tolerance.is_finite() || self.simplify_tolerance < 0.0 {
            return Err(PipelineError::InvalidConfig(format!(
                "simplify_tolerance must be finite and >= 0, got {}",
                self.simplify_tolerance
            )));
        }
        if !self.min_area.is_finite() || self.min_area < 0.0 {
            return Err(PipelineError::InvalidConfig(format!(
                "min_area must be finite and >= 0, got {}",
                self.min_area
            )));
        }
        if self.smooth_iterations > Self::MAX_SMOOTH_ITERATIONS {
            return Err(PipelineError::InvalidConfig(format!(
                "smooth_iterations must be at most {}, got {}",
                Self::MAX_SMOOTH_ITERATIONS,
                self.smooth_iterations
            )));
        }
        Ok(())
    }

    /// Number of Chaikin iterations actually applied (0 when smoothing
    /// is disabled).
    #[must_use]
    pub const fn effective_smooth_iterations(&self) -> u32 {
        if self.smoothing {
            self.smooth_iterations
        } else {
            0
        }
    }
}

impl Default for VectorizeConfig {
    fn default() -> Self {
        Self {
            simplify_tolerance: Self::DEFAULT_SIMPLIFY_TOLERANCE,
            min_area: Self::DEFAULT_MIN_AREA,
            smoothing: Self::DEFAULT_SMOOTHING,
            smooth_iterations: Self::DEFAULT_SMOOTH_ITERATIONS,
            contour_tracer: ContourTracerKind::default(),
        }
    }
}

/// Check a serialization scale factor.
///
/// # Errors
///
/// Returns [`PipelineError::InvalidConfig`] unless `scale` is finite and
/// strictly positive.
pub fn validate_scale(scale: f64) -> Result<(), PipelineError> {
    if scale.is_finite() && scale > 0.0 {
        Ok(())
    } else {
        Err(PipelineError::InvalidConfig(format!(
            "scale must be finite and > 0, got {scale}"
        )))
    }
}

/// Vectorized output for one color.
///
/// `paths` holds serialized closed path descriptors (`M x y L x y ... Z`)
/// ready for embedding in an SVG `d` attribute. `polylines` holds the
/// same geometry, already scaled, for exporters that want coordinates.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VectorizedLayer {
    /// The layer's color.
    pub color: Rgb,
    /// Serialized closed path descriptors, in discovery order.
    pub paths: Vec<String>,
    /// Number of paths (always `paths.len()`).
    pub path_count: usize,
    /// Scaled path geometry, parallel to `paths`.
    pub polylines: Vec<Polyline>,
}

impl VectorizedLayer {
    /// Build a layer from scaled polylines and their descriptors.
    #[must_use]
    pub fn new(color: Rgb, paths: Vec<String>, polylines: Vec<Polyline>) -> Self {
        Self {
            color,
            path_count: paths.len(),
            paths,
            polylines,
        }
    }

    /// Returns `true` if no path survived filtering.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.paths.is_empty()
    }
}

/// Errors that can occur while vectorizing a layer.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error, Serialize, Deserialize)]
pub enum PipelineError {
    /// The raster buffer length does not match its declared dimensions.
    #[error("raster buffer has {actual} bytes, expected {expected}")]
    BufferSizeMismatch {
        /// `width * height * channels`.
        expected: usize,
        /// Length of the buffer that was supplied.
        actual: usize,
    },

    /// The raster dimensions do not fit in memory on this platform.
    #[error("raster dimensions {width}x{height} are too large")]
    DimensionsTooLarge {
        /// Declared width.
        width: u32,
        /// Declared height.
        height: u32,
    },

    /// Vectorization configuration is invalid.
    #[error("invalid vectorize configuration: {0}")]
    InvalidConfig(String),
}
