//! Morphological outline generation.
//!
//! An outline of thickness `r` is the set of mask cells that do not
//! survive erosion by a square structuring element of radius `r`, i.e.
//! the band of cells within Chebyshev distance `r` of an unset cell.
//! Cells outside the mask read as unset, so the band also runs along the
//! image border wherever the mask touches it.

use crate::mask::Mask;

/// Erode `mask` by a square of Chebyshev radius `radius`.
///
/// A cell survives iff every cell within distance `radius` of it is set.
/// Separable: a row pass followed by a column pass, each tracking the
/// length of the current run of set cells, so the cost does not depend
/// on `radius`. `radius == 0` returns a copy.
#[must_use = "returns the eroded mask"]
pub fn erode(mask: &Mask, radius: u32) -> Mask {
    if radius == 0 {
        return mask.clone();
    }

    let width = mask.width() as usize;
    let height = mask.height() as usize;
    let radius = radius as usize;

    let mut rows = vec![false; mask.cells().len()];
    for y in 0..height {
        erode_line(mask.cells(), &mut rows, y * width, 1, width, radius);
    }

    let mut cols = vec![false; rows.len()];
    for x in 0..width {
        erode_line(&rows, &mut cols, x, width, height, radius);
    }

    mask.with_cells(cols)
}

/// Cells of `mask` within `radius` of an unset cell.
///
/// The result is disjoint from `erode(mask, radius)` and their union is
/// `mask`.
#[must_use = "returns the outline mask"]
pub fn outline_mask(mask: &Mask, radius: u32) -> Mask {
    mask.difference(&erode(mask, radius))
}

/// One-dimensional erosion of the line `start, start + step, ...` of
/// `len` cells. Cells whose window leaves the line stay unset in `dst`.
fn erode_line(
    src: &[bool],
    dst: &mut [bool],
    start: usize,
    step: usize,
    len: usize,
    radius: usize,
) {
    let span = radius.saturating_mul(2).saturating_add(1);
    let mut run = 0_usize;
    for j in 0..len {
        run = if src[start + j * step] { run + 1 } else { 0 };
        if j >= radius {
            dst[start + (j - radius) * step] = run >= span;
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn naive_erode(mask: &Mask, radius: u32) -> Mask {
        let r = i64::from(radius);
        Mask::from_fn(mask.width(), mask.height(), |x, y| {
            let (x, y) = (i64::from(x), i64::from(y));
            (-r..=r).all(|dy| (-r..=r).all(|dx| mask.get(x + dx, y + dy)))
        })
        .unwrap()
    }

    /// Deterministic blobby test pattern.
    fn pattern(width: u32, height: u32) -> Mask {
        Mask::from_fn(width, height, |x, y| {
            let hash = (x * 7 + y * 13 + (x * y) % 5) % 11;
            hash < 8 || ((3..9).contains(&x) && (2..10).contains(&y))
        })
        .unwrap()
    }

    fn full(width: u32, height: u32) -> Mask {
        Mask::from_fn(width, height, |_, _| true).unwrap()
    }

    #[test]
    fn radius_zero_is_copy() {
        let mask = pattern(12, 9);
        assert_eq!(erode(&mask, 0), mask);
        assert!(outline_mask(&mask, 0).is_empty());
    }

    #[test]
    fn matches_naive_erosion() {
        let mask = pattern(17, 13);
        for radius in 0..=4 {
            assert_eq!(
                erode(&mask, radius),
                naive_erode(&mask, radius),
                "radius={radius}"
            );
        }
    }

    #[test]
    fn border_cells_never_survive() {
        let eroded = erode(&full(10, 10), 1);
        assert_eq!(eroded.count(), 64);
        assert!(!eroded.get(0, 5));
        assert!(!eroded.get(9, 5));
        assert!(eroded.get(1, 1));

        assert_eq!(erode(&full(10, 10), 2).count(), 36);
    }

    #[test]
    fn radius_wider_than_mask_erodes_everything() {
        assert!(erode(&full(6, 40), 3).is_empty());
        assert!(erode(&full(40, 6), 3).is_empty());
        assert!(erode(&full(4, 4), u32::MAX).is_empty());
    }

    #[test]
    fn eroded_is_subset_and_outline_is_disjoint() {
        let mask = pattern(20, 15);
        for radius in 1..=3 {
            let eroded = erode(&mask, radius);
            let outline = outline_mask(&mask, radius);
            assert!(eroded.is_subset_of(&mask));
            assert!(outline.is_subset_of(&mask));
            assert!(outline.is_disjoint_from(&eroded));
            assert_eq!(outline.count() + eroded.count(), mask.count());
        }
    }

    #[test]
    fn outline_of_full_mask_is_frame() {
        let outline = outline_mask(&full(10, 10), 2);
        assert_eq!(outline.count(), 100 - 36);
        assert!(outline.get(0, 0));
        assert!(outline.get(1, 5));
        assert!(!outline.get(2, 2));
    }

    #[test]
    fn empty_mask_has_empty_outline() {
        let mask = Mask::new(8, 8).unwrap();
        assert!(erode(&mask, 2).is_empty());
        assert!(outline_mask(&mask, 2).is_empty());
    }
}
