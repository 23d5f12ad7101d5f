//! Binary occupancy masks and the mask builder.
//!
//! A [`Mask`] marks which pixels of a raster layer belong to one target
//! color. It is step 1 of vectorization: every later stage works on
//! the mask alone and never looks at color data again.
//!
//! Reads outside the grid return `false` rather than failing, so the
//! contour tracer and the erosion filter can sample neighbors of border
//! cells without special cases.

use image::{GrayImage, Luma};

use crate::types::{Dimensions, PipelineError, PixelFormat, RasterLayer, Rgb, RgbaImage};

/// RGBA pixels with alpha at or below this value never match a color.
pub const ALPHA_THRESHOLD: u8 = 128;

/// A fixed-size grid of set/unset cells, stored row-major.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Mask {
    width: u32,
    height: u32,
    cells: Vec<bool>,
}

impl Mask {
    /// Create an all-unset mask.
    ///
    /// # Errors
    ///
    /// Returns [`PipelineError::DimensionsTooLarge`] if `width * height`
    /// does not fit in `usize`.
    pub fn new(width: u32, height: u32) -> Result<Self, PipelineError> {
        let len = cell_count(width, height)?;
        Ok(Self {
            width,
            height,
            cells: vec![false; len],
        })
    }

    /// Create a mask whose cell `(x, y)` is `f(x, y)`.
    ///
    /// # Errors
    ///
    /// Returns [`PipelineError::DimensionsTooLarge`] if `width * height`
    /// does not fit in `usize`.
    pub fn from_fn(
        width: u32,
        height: u32,
        mut f: impl FnMut(u32, u32) -> bool,
    ) -> Result<Self, PipelineError> {
        let len = cell_count(width, height)?;
        let mut cells = Vec::with_capacity(len);
        for y in 0..height {
            for x in 0..width {
                cells.push(f(x, y));
            }
        }
        Ok(Self {
            width,
            height,
            cells,
        })
    }

    /// Build the mask of pixels within `tolerance` of `target`.
    ///
    /// A pixel matches when each of its three color channels differs
    /// from the target by at most `tolerance` (per-channel absolute
    /// difference, not Euclidean distance). For RGBA layers, pixels with
    /// alpha at or below [`ALPHA_THRESHOLD`] never match.
    ///
    /// # Errors
    ///
    /// Returns [`PipelineError::BufferSizeMismatch`] if the buffer length
    /// is not exactly `width * height * channels`. The buffer is never
    /// truncated or padded.
    pub fn from_raster(
        layer: &RasterLayer<'_>,
        target: Rgb,
        tolerance: u8,
    ) -> Result<Self, PipelineError> {
        let channels = layer.format.channels();
        let len = cell_count(layer.width, layer.height)?;
        let expected = len
            .checked_mul(channels)
            .ok_or(PipelineError::DimensionsTooLarge {
                width: layer.width,
                height: layer.height,
            })?;
        if layer.data.len() != expected {
            return Err(PipelineError::BufferSizeMismatch {
                expected,
                actual: layer.data.len(),
            });
        }

        let cells = layer
            .data
            .chunks_exact(channels)
            .map(|px| {
                let opaque = match layer.format {
                    PixelFormat::Rgb8 => true,
                    PixelFormat::Rgba8 => px[3] > ALPHA_THRESHOLD,
                };
                opaque && Rgb::new(px[0], px[1], px[2]).max_channel_delta(target) <= tolerance
            })
            .collect();

        Ok(Self {
            width: layer.width,
            height: layer.height,
            cells,
        })
    }

    /// [`from_raster`](Self::from_raster) for a flat RGB buffer.
    ///
    /// # Errors
    ///
    /// See [`from_raster`](Self::from_raster).
    pub fn from_rgb(
        width: u32,
        height: u32,
        data: &[u8],
        target: Rgb,
        tolerance: u8,
    ) -> Result<Self, PipelineError> {
        Self::from_raster(&RasterLayer::rgb(width, height, data), target, tolerance)
    }

    /// [`from_raster`](Self::from_raster) for a flat RGBA buffer.
    ///
    /// # Errors
    ///
    /// See [`from_raster`](Self::from_raster).
    pub fn from_rgba(
        width: u32,
        height: u32,
        data: &[u8],
        target: Rgb,
        tolerance: u8,
    ) -> Result<Self, PipelineError> {
        Self::from_raster(&RasterLayer::rgba(width, height, data), target, tolerance)
    }

    /// [`from_raster`](Self::from_raster) for a decoded RGBA image.
    ///
    /// # Errors
    ///
    /// See [`from_raster`](Self::from_raster).
    pub fn from_rgba_image(
        image: &RgbaImage,
        target: Rgb,
        tolerance: u8,
    ) -> Result<Self, PipelineError> {
        Self::from_raster(&RasterLayer::from_rgba_image(image), target, tolerance)
    }

    /// Width in cells.
    #[must_use]
    pub const fn width(&self) -> u32 {
        self.width
    }

    /// Height in cells.
    #[must_use]
    pub const fn height(&self) -> u32 {
        self.height
    }

    /// Width and height in cells.
    #[must_use]
    pub const fn dimensions(&self) -> Dimensions {
        Dimensions {
            width: self.width,
            height: self.height,
        }
    }

    /// Whether cell `(x, y)` is set. Coordinates outside the grid read
    /// as unset.
    #[must_use]
    pub fn get(&self, x: i64, y: i64) -> bool {
        self.index(x, y).is_some_and(|i| self.cells[i])
    }

    /// Set or clear cell `(x, y)`. Coordinates outside the grid are
    /// ignored.
    pub fn set(&mut self, x: u32, y: u32, value: bool) {
        if let Some(i) = self.index(i64::from(x), i64::from(y)) {
            self.cells[i] = value;
        }
    }

    /// Number of set cells.
    #[must_use]
    pub fn count(&self) -> usize {
        self.cells.iter().filter(|&&c| c).count()
    }

    /// Returns `true` if no cell is set.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        !self.cells.iter().any(|&c| c)
    }

    /// Returns `true` if every cell set here is also set in `other`.
    #[must_use]
    pub fn is_subset_of(&self, other: &Self) -> bool {
        self.set_cells().all(|(x, y)| other.get(x, y))
    }

    /// Returns `true` if no cell is set in both masks.
    #[must_use]
    pub fn is_disjoint_from(&self, other: &Self) -> bool {
        !self.set_cells().any(|(x, y)| other.get(x, y))
    }

    /// Cells set here but not in `other`.
    ///
    /// Cells of `other` outside its own grid read as unset, so masks of
    /// different sizes never fail.
    #[must_use = "returns the difference mask"]
    pub fn difference(&self, other: &Self) -> Self {
        let mut out = self.clone();
        for (x, y) in self.set_cells() {
            if other.get(x, y)
                && let (Ok(ux), Ok(uy)) = (u32::try_from(x), u32::try_from(y))
            {
                out.set(ux, uy, false);
            }
        }
        out
    }

    /// Render as a grayscale image: set cells are 255, unset cells 0.
    #[must_use]
    pub fn to_gray_image(&self) -> GrayImage {
        GrayImage::from_fn(self.width, self.height, |x, y| {
            Luma([if self.get(i64::from(x), i64::from(y)) {
                255
            } else {
                0
            }])
        })
    }

    /// Row-major cell slice.
    pub(crate) fn cells(&self) -> &[bool] {
        &self.cells
    }

    /// Build a mask of the same size from a row-major cell vector.
    pub(crate) fn with_cells(&self, cells: Vec<bool>) -> Self {
        debug_assert_eq!(cells.len(), self.cells.len());
        Self {
            width: self.width,
            height: self.height,
            cells,
        }
    }

    fn index(&self, x: i64, y: i64) -> Option<usize> {
        if x < 0 || y < 0 || x >= i64::from(self.width) || y >= i64::from(self.height) {
            return None;
        }
        let x = usize::try_from(x).ok()?;
        let y = usize::try_from(y).ok()?;
        Some(y * self.width as usize + x)
    }

    /// Coordinates of every set cell, row-major.
    fn set_cells(&self) -> impl Iterator<Item = (i64, i64)> + '_ {
        let width = i64::from(self.width.max(1));
        self.cells.iter().enumerate().filter(|(_, c)| **c).map(move |(i, _)| {
            #[allow(clippy::cast_possible_wrap)]
            let i = i as i64;
            (i % width, i / width)
        })
    }
}

/// `width * height`, or an error if it overflows `usize`.
fn cell_count(width: u32, height: u32) -> Result<usize, PipelineError> {
    usize::try_from(u64::from(width) * u64::from(height))
        .map_err(|_| PipelineError::DimensionsTooLarge { width, height })
}
