//! Chaikin corner-cutting for closed polylines.
//!
//! Each iteration replaces every edge `p0 -> p1`, including the closing
//! edge from the last point back to the first, with the two points at
//! 1/4 and 3/4 along it. Corners are cut and the point count doubles.

use crate::types::{Point, Polyline};

/// Fraction along each edge of the first emitted point.
const NEAR: f64 = 0.25;
/// Fraction along each edge of the second emitted point.
const FAR: f64 = 0.75;

/// Smooth a closed polyline with `iterations` rounds of Chaikin
/// corner-cutting.
///
/// Polylines with fewer than 3 points, and `iterations == 0`, are
/// returned unchanged.
#[must_use = "returns the smoothed polyline"]
pub fn smooth(polyline: &Polyline, iterations: u32) -> Polyline {
    if polyline.len() < 3 || iterations == 0 {
        return polyline.clone();
    }

    let mut points = polyline.points().to_vec();
    for _ in 0..iterations {
        points = chaikin_step(&points);
    }
    Polyline::new(points)
}

/// Smooth multiple polylines, applying [`smooth`] to each independently.
#[must_use = "returns the smoothed polylines"]
pub fn smooth_paths(polylines: &[Polyline], iterations: u32) -> Vec<Polyline> {
    polylines.iter().map(|pl| smooth(pl, iterations)).collect()
}

fn chaikin_step(points: &[Point]) -> Vec<Point> {
    let mut out = Vec::with_capacity(points.len() * 2);
    let next = points.iter().skip(1).chain(points.first());
    for (&p0, &p1) in points.iter().zip(next) {
        out.push(p0.lerp(p1, NEAR));
        out.push(p0.lerp(p1, FAR));
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    fn square(side: f64) -> Polyline {
        Polyline::new(vec![
            Point::new(0.0, 0.0),
            Point::new(side, 0.0),
            Point::new(side, side),
            Point::new(0.0, side),
        ])
    }

    #[test]
    fn short_polylines_pass_through() {
        let two = Polyline::new(vec![Point::new(0.0, 0.0), Point::new(1.0, 1.0)]);
        assert_eq!(smooth(&two, 3), two);
        let empty = Polyline::new(vec![]);
        assert!(smooth(&empty, 1).is_empty());
    }

    #[test]
    fn zero_iterations_is_identity() {
        let sq = square(10.0);
        assert_eq!(smooth(&sq, 0), sq);
    }

    #[test]
    fn one_iteration_cuts_square_corners() {
        let result = smooth(&square(10.0), 1);
        assert_eq!(
            result.points(),
            &[
                Point::new(2.5, 0.0),
                Point::new(7.5, 0.0),
                Point::new(10.0, 2.5),
                Point::new(10.0, 7.5),
                Point::new(7.5, 10.0),
                Point::new(2.5, 10.0),
                Point::new(0.0, 7.5),
                Point::new(0.0, 2.5),
            ]
        );
        // Four corner triangles with legs of 2.5 are removed.
        assert!((result.area() - 87.5).abs() < 1e-9);
    }

    #[test]
    fn point_count_doubles_per_iteration() {
        let sq = square(4.0);
        for iterations in 1..=4 {
            assert_eq!(smooth(&sq, iterations).len(), 4 << iterations);
        }
    }

    #[test]
    fn convex_area_shrinks_but_stays_close() {
        let sq = square(100.0);
        let mut previous = sq.area();
        for iterations in 1..=3 {
            let area = smooth(&sq, iterations).area();
            assert!(area < previous);
            assert!(area > 0.75 * sq.area(), "iterations={iterations} area={area}");
            previous = area;
        }
    }

    #[test]
    fn smoothing_preserves_winding() {
        let sq = square(10.0);
        let reversed = Polyline::new(sq.points().iter().rev().copied().collect());
        assert!(smooth(&sq, 2).signed_area() > 0.0);
        assert!(smooth(&reversed, 2).signed_area() < 0.0);
    }

    #[test]
    fn smooth_paths_applies_to_each() {
        let paths = vec![square(1.0), square(2.0)];
        let result = smooth_paths(&paths, 1);
        assert_eq!(result.len(), 2);
        assert!(result.iter().all(|p| p.len() == 8));
    }
}
