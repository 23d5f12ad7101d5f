//! Path simplification using the Ramer-Douglas-Peucker algorithm.
//!
//! Reduces point count in traced contours by removing points that are
//! within a given tolerance of the chord between their retained
//! neighbors. Implemented from scratch with an explicit work stack so
//! very long contours cannot exhaust the call stack.
//!
//! This is step 3 of vectorization, between contour tracing and
//! smoothing.

use crate::types::{Point, Polyline};

/// Simplify a single polyline using the Ramer-Douglas-Peucker algorithm.
///
/// The first and last points are always kept. An interior point is kept
/// when its perpendicular distance from the chord of the current span
/// exceeds `tolerance`; when several points tie for the largest
/// distance, the earliest one splits the span. A tolerance of 0.0 keeps
/// every point that is not exactly collinear with its span.
///
/// Polylines with fewer than 3 points are returned unchanged.
#[must_use = "returns the simplified polyline"]
pub fn simplify(polyline: &Polyline, tolerance: f64) -> Polyline {
    let points = polyline.points();
    if points.len() < 3 {
        return polyline.clone();
    }

    let mut kept = vec![false; points.len()];
    kept[0] = true;
    kept[points.len() - 1] = true;

    let mut spans = vec![(0, points.len() - 1)];
    while let Some((start, end)) = spans.pop() {
        if end <= start + 1 {
            continue;
        }
        let (max_idx, max_dist) = farthest_point(points, start, end);
        if max_dist > tolerance {
            kept[max_idx] = true;
            spans.push((max_idx, end));
            spans.push((start, max_idx));
        }
    }

    let simplified: Vec<Point> = points
        .iter()
        .zip(&kept)
        .filter(|&(_, k)| *k)
        .map(|(&p, _)| p)
        .collect();

    Polyline::new(simplified)
}

/// Simplify multiple polylines, applying RDP to each independently.
#[must_use = "returns the simplified polylines"]
pub fn simplify_paths(polylines: &[Polyline], tolerance: f64) -> Vec<Polyline> {
    polylines.iter().map(|pl| simplify(pl, tolerance)).collect()
}

/// Index and distance of the interior point of `start..=end` farthest
/// from the chord `points[start]`-`points[end]`. Ties keep the first.
fn farthest_point(points: &[Point], start: usize, end: usize) -> (usize, f64) {
    let mut max_dist = 0.0;
    let mut max_idx = start;

    for (i, &p) in points.iter().enumerate().take(end).skip(start + 1) {
        let d = perpendicular_distance(p, points[start], points[end]);
        if d > max_dist {
            max_dist = d;
            max_idx = i;
        }
    }
    (max_idx, max_dist)
}

/// Perpendicular distance from point `p` to the line defined by `a` and `b`.
///
/// Uses the formula: |cross(b-a, p-a)| / |b-a|.
/// When `a` and `b` coincide the distance is defined as 0, which
/// collapses the span and guarantees termination.
fn perpendicular_distance(p: Point, a: Point, b: Point) -> f64 {
    let dx = b.x - a.x;
    let dy = b.y - a.y;
    let length_sq = dx.mul_add(dx, dy * dy);

    if length_sq == 0.0 {
        return 0.0;
    }

    let cross = dx.mul_add(a.y - p.y, -(dy * (a.x - p.x)));
    cross.abs() / length_sq.sqrt()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_polyline_unchanged() {
        let pl = Polyline::new(vec![]);
        let result = simplify(&pl, 1.0);
        assert!(result.is_empty());
    }

    #[test]
    fn two_points_unchanged() {
        let pl = Polyline::new(vec![Point::new(0.0, 0.0), Point::new(10.0, 0.0)]);
        let result = simplify(&pl, 1.0);
        assert_eq!(result, pl);
    }

    #[test]
    fn horizontal_run_collapses_to_endpoints() {
        let pl = Polyline::new((0..=10).map(|i| Point::new(f64::from(i), 0.0)).collect());
        let result = simplify(&pl, 0.5);
        assert!(result.len() < pl.len());
        assert_eq!(
            result.points(),
            &[Point::new(0.0, 0.0), Point::new(10.0, 0.0)]
        );
    }

    #[test]
    fn zero_tolerance_removes_only_exactly_collinear_points() {
        let pl = Polyline::new(vec![
            Point::new(0.0, 0.0),
            Point::new(1.0, 0.0),
            Point::new(2.0, 0.0),
            Point::new(3.0, 0.05),
            Point::new(4.0, 0.0),
        ]);
        let result = simplify(&pl, 0.0);
        assert_eq!(
            result.points(),
            &[
                Point::new(0.0, 0.0),
                Point::new(2.0, 0.0),
                Point::new(3.0, 0.05),
                Point::new(4.0, 0.0),
            ]
        );
    }

    #[test]
    fn off_line_point_is_preserved() {
        let pl = Polyline::new(vec![
            Point::new(0.0, 0.0),
            Point::new(5.0, 10.0),
            Point::new(10.0, 0.0),
        ]);
        let result = simplify(&pl, 0.5);
        assert_eq!(result, pl);
    }

    #[test]
    fn zigzag_retains_peaks() {
        let pl = Polyline::new(vec![
            Point::new(0.0, 0.0),
            Point::new(2.0, 5.0),
            Point::new(4.0, 0.0),
            Point::new(6.0, 5.0),
            Point::new(8.0, 0.0),
        ]);
        assert_eq!(simplify(&pl, 1.0).len(), 5);
        assert_eq!(simplify(&pl, 10.0).len(), 2);
    }

    #[test]
    fn ties_split_at_first_farthest_point() {
        // Both interior points are 1.0 from the chord; the first one splits,
        // and the second is then exactly on the new chord's far side.
        let pl = Polyline::new(vec![
            Point::new(0.0, 0.0),
            Point::new(1.0, 1.0),
            Point::new(2.0, 1.0),
            Point::new(3.0, 0.0),
        ]);
        let (idx, dist) = farthest_point(pl.points(), 0, 3);
        assert_eq!(idx, 1);
        assert!((dist - 1.0).abs() < 1e-12);
    }

    #[test]
    fn closed_ring_with_coincident_endpoints_terminates() {
        // First and last points coincide: the chord is degenerate, every
        // distance is 0, and the ring collapses to its endpoints.
        let pl = Polyline::new(vec![
            Point::new(0.0, 0.0),
            Point::new(4.0, 0.0),
            Point::new(4.0, 4.0),
            Point::new(0.0, 0.0),
        ]);
        assert_eq!(simplify(&pl, 0.5).len(), 2);
    }

    #[test]
    fn alternating_staircase_keeps_every_point() {
        // Every span of this shape has a point far from its chord, so the
        // work stack grows to the full length of the input.
        let points: Vec<Point> = (0..5_000)
            .map(|i| {
                let x = f64::from(i);
                Point::new(x, if i % 2 == 0 { 0.0 } else { 1.0 })
            })
            .collect();
        let pl = Polyline::new(points);
        assert_eq!(simplify(&pl, 0.1).len(), pl.len());
    }

    #[test]
    fn simplify_paths_applies_to_each() {
        let polylines = vec![
            Polyline::new(vec![
                Point::new(0.0, 0.0),
                Point::new(1.0, 1.0),
                Point::new(2.0, 2.0),
            ]),
            Polyline::new(vec![
                Point::new(0.0, 0.0),
                Point::new(1.0, 5.0),
                Point::new(2.0, 0.0),
            ]),
        ];
        let results = simplify_paths(&polylines, 0.5);
        assert_eq!(results.len(), 2);
        assert_eq!(results[0].len(), 2);
        assert_eq!(results[1].len(), 3);
    }

    #[test]
    fn perpendicular_distance_diagonal_segment() {
        let d = perpendicular_distance(
            Point::new(2.0, -1.0),
            Point::new(0.0, 0.0),
            Point::new(4.0, 2.0),
        );
        let expected = 8.0 / 20.0_f64.sqrt();
        assert!((d - expected).abs() < 1e-10, "got {d}, expected {expected}");
    }

    #[test]
    fn perpendicular_distance_coincident_endpoints_is_zero() {
        let d = perpendicular_distance(
            Point::new(3.0, 4.0),
            Point::new(1.0, 1.0),
            Point::new(1.0, 1.0),
        );
        assert!(d.abs() < f64::EPSILON);
    }
}
