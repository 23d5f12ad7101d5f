//! Artifact removal by enclosed area.

use crate::types::Polyline;

/// Keep the polylines whose absolute shoelace area is at least `min_area`.
///
/// Order is preserved. Applying the filter twice with the same threshold
/// gives the same result as applying it once.
#[must_use = "returns the surviving polylines"]
pub fn filter_by_area(polylines: &[Polyline], min_area: f64) -> Vec<Polyline> {
    polylines
        .iter()
        .filter(|pl| pl.area() >= min_area)
        .cloned()
        .collect()
}

/// Keep the polylines with more than two points.
///
/// A segment encloses nothing, so this runs ahead of the area filter
/// even when `min_area` is 0. Outline rings use it alone, since a thin
/// band can enclose little area while still being a meaningful stroke.
#[must_use = "returns the surviving polylines"]
pub fn filter_degenerate(polylines: &[Polyline]) -> Vec<Polyline> {
    polylines.iter().filter(|pl| pl.len() > 2).cloned().collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::Point;

    fn square(side: f64) -> Polyline {
        Polyline::new(vec![
            Point::new(0.0, 0.0),
            Point::new(side, 0.0),
            Point::new(side, side),
            Point::new(0.0, side),
        ])
    }

    #[test]
    fn keeps_paths_at_or_above_threshold() {
        let paths = vec![square(1.0), square(2.0), square(3.0)];
        let kept = filter_by_area(&paths, 4.0);
        assert_eq!(kept, vec![square(2.0), square(3.0)]);
    }

    #[test]
    fn zero_threshold_keeps_degenerate_paths() {
        let line = Polyline::new(vec![Point::new(0.0, 0.0), Point::new(5.0, 0.0)]);
        assert_eq!(filter_by_area(&[line.clone()], 0.0), vec![line]);
    }

    #[test]
    fn negative_winding_is_measured_by_magnitude() {
        let hole = Polyline::new(square(3.0).into_points().into_iter().rev().collect());
        assert!(hole.signed_area() < 0.0);
        assert_eq!(filter_by_area(&[hole.clone()], 9.0), vec![hole]);
    }

    #[test]
    fn filter_is_idempotent() {
        let paths = vec![square(0.5), square(2.0), square(1.5), square(10.0)];
        let once = filter_by_area(&paths, 2.25);
        let twice = filter_by_area(&once, 2.25);
        assert_eq!(once, twice);
        assert_eq!(once.len(), 3);
    }

    #[test]
    fn degenerate_filter_drops_short_paths() {
        let line = Polyline::new(vec![Point::new(0.0, 0.0), Point::new(5.0, 0.0)]);
        let kept = filter_degenerate(&[line, square(0.1)]);
        assert_eq!(kept, vec![square(0.1)]);
    }
}
