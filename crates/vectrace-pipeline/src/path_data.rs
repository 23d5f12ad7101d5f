//! Serialization of polylines into SVG path descriptors.
//!
//! A closed polyline becomes `M x y L x y ... Z`, with every coordinate
//! multiplied by a scale factor and written with exactly three
//! fractional digits.

use crate::types::Polyline;

/// Serialize a polyline as a closed path descriptor.
///
/// The first point is emitted as `M{x} {y}`, each following point as
/// ` L{x} {y}`, and the path ends with ` Z`. An empty polyline yields an
/// empty string.
#[must_use]
pub fn path_data(polyline: &Polyline, scale: f64) -> String {
    let Some((first, rest)) = polyline.points().split_first() else {
        return String::new();
    };

    let mut d = format!(
        "M{} {}",
        coordinate(first.x * scale),
        coordinate(first.y * scale)
    );
    for p in rest {
        d.push_str(" L");
        d.push_str(&coordinate(p.x * scale));
        d.push(' ');
        d.push_str(&coordinate(p.y * scale));
    }
    d.push_str(" Z");
    d
}

/// Format one coordinate with three fractional digits.
///
/// Values that round to zero are written without a sign.
fn coordinate(value: f64) -> String {
    let formatted = format!("{value:.3}");
    match formatted.strip_prefix('-') {
        Some(magnitude) if magnitude.bytes().all(|b| b == b'0' || b == b'.') => {
            magnitude.to_owned()
        }
        _ => formatted,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::Point;

    #[test]
    fn empty_polyline_is_empty_string() {
        assert_eq!(path_data(&Polyline::new(vec![]), 1.0), "");
    }

    #[test]
    fn single_point_is_move_then_close() {
        let pl = Polyline::new(vec![Point::new(1.0, 2.0)]);
        assert_eq!(path_data(&pl, 1.0), "M1.000 2.000 Z");
    }

    #[test]
    fn unit_scale_keeps_coordinates() {
        let pl = Polyline::new(vec![
            Point::new(1.0, 2.0),
            Point::new(3.0, 2.0),
            Point::new(3.0, 5.0),
        ]);
        assert_eq!(path_data(&pl, 1.0), "M1.000 2.000 L3.000 2.000 L3.000 5.000 Z");
    }

    #[test]
    fn scale_multiplies_coordinates() {
        let pl = Polyline::new(vec![
            Point::new(0.0, 0.0),
            Point::new(2.0, 0.0),
            Point::new(2.0, 2.0),
            Point::new(0.0, 2.0),
        ]);
        assert_eq!(
            path_data(&pl, 0.1),
            "M0.000 0.000 L0.200 0.000 L0.200 0.200 L0.000 0.200 Z"
        );
    }

    #[test]
    fn rounds_to_three_digits() {
        let pl = Polyline::new(vec![Point::new(1.0 / 3.0, 2.0 / 3.0)]);
        assert_eq!(path_data(&pl, 1.0), "M0.333 0.667 Z");
    }

    #[test]
    fn negative_zero_is_unsigned() {
        assert_eq!(coordinate(-0.0), "0.000");
        assert_eq!(coordinate(-0.0001), "0.000");
        assert_eq!(coordinate(-0.5), "-0.500");
        assert_eq!(coordinate(-10.0), "-10.000");
    }
}
