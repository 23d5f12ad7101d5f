//! Marching squares boundary tracing at grid-line precision.
//!
//! The tracer walks the lattice of cell corners. A lattice vertex
//! `(x, y)` is where four cells meet: top-left `(x-1, y-1)`, top-right
//! `(x, y-1)`, bottom-right `(x, y)` and bottom-left `(x-1, y)`. Their
//! occupancy forms a 4-bit configuration code:
//!
//! ```text
//!   TL=1 | TR=2
//!   -----+-----
//!   BL=8 | BR=4
//! ```
//!
//! Codes 0 and 15 have no boundary. Every other code has one boundary
//! edge leaving the vertex, except the two saddles (5 and 10) which have
//! two. The walk keeps set cells on its right-hand side, so with the y
//! axis pointing down outer boundaries run clockwise and holes run
//! counter-clockwise.
//!
//! # Saddles
//!
//! At a saddle the exit is chosen from the direction of arrival: the walk
//! turns to stay on the cell it was already following. Cells that touch
//! only at a corner therefore end up on separate contours (4-connected
//! foreground). This is a fixed choice; high-frequency dithered input
//! resolves the same way everywhere.
//!
//! # Termination
//!
//! Walked edges are recorded per vertex and direction in a grid that
//! lives for one sweep of the mask. A trace stops when it is about to
//! walk an edge a second time, which is how a closed loop ends and also
//! how a malformed walk is cut short. A trace additionally stops if the
//! configuration offers no exit, or after as many steps as the lattice
//! has edges.

use crate::contour::MAX_CONTOURS;
use crate::mask::Mask;
use crate::types::{Point, Polyline};

/// Travel direction between adjacent lattice vertices (y axis down).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Direction {
    Right,
    Down,
    Left,
    Up,
}

impl Direction {
    const fn delta(self) -> (i64, i64) {
        match self {
            Self::Right => (1, 0),
            Self::Down => (0, 1),
            Self::Left => (-1, 0),
            Self::Up => (0, -1),
        }
    }

    const fn bit(self) -> u8 {
        match self {
            Self::Right => 1,
            Self::Down => 2,
            Self::Left => 4,
            Self::Up => 8,
        }
    }
}

/// What the movement table says about a configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Exit {
    /// No boundary passes through (codes 0 and 15).
    Closed,
    /// Exactly one boundary edge leaves the vertex.
    Go(Direction),
    /// Two boundary edges leave the vertex; resolved by arrival direction.
    Saddle,
}

/// Movement table indexed by configuration code.
const EXITS: [Exit; 16] = [
    Exit::Closed,              // 0
    Exit::Go(Direction::Left), // 1  TL
    Exit::Go(Direction::Up),   // 2  TR
    Exit::Go(Direction::Left), // 3  TL TR
    Exit::Go(Direction::Right), // 4  BR
    Exit::Saddle,              // 5  TL BR
    Exit::Go(Direction::Up),   // 6  TR BR
    Exit::Go(Direction::Left), // 7  TL TR BR
    Exit::Go(Direction::Down), // 8  BL
    Exit::Go(Direction::Down), // 9  TL BL
    Exit::Saddle,              // 10 TR BL
    Exit::Go(Direction::Down), // 11 TL TR BL
    Exit::Go(Direction::Right), // 12 BR BL
    Exit::Go(Direction::Right), // 13 TL BR BL
    Exit::Go(Direction::Up),   // 14 TR BR BL
    Exit::Closed,              // 15
];

/// Configuration code of lattice vertex `(x, y)`.
///
/// Cells outside the mask read as unset, so vertices on the outer border
/// of the grid are classified like any other.
#[must_use]
pub fn configuration(mask: &Mask, x: i64, y: i64) -> u8 {
    u8::from(mask.get(x - 1, y - 1))
        | u8::from(mask.get(x, y - 1)) << 1
        | u8::from(mask.get(x, y)) << 2
        | u8::from(mask.get(x - 1, y)) << 3
}

/// Exit direction for `code` given the direction the walk arrived in.
fn exit_for(code: u8, arrived: Direction) -> Option<Direction> {
    match EXITS[usize::from(code & 0x0f)] {
        Exit::Closed => None,
        Exit::Go(d) => Some(d),
        Exit::Saddle if code == 5 => Some(if arrived == Direction::Up {
            Direction::Right
        } else {
            Direction::Left
        }),
        Exit::Saddle => Some(if arrived == Direction::Right {
            Direction::Down
        } else {
            Direction::Up
        }),
    }
}

/// Every boundary edge leaving a vertex with this configuration.
const fn seed_exits(code: u8) -> &'static [Direction] {
    match code {
        5 => &[Direction::Right, Direction::Left],
        10 => &[Direction::Up, Direction::Down],
        1 | 3 | 7 => &[Direction::Left],
        2 | 6 | 14 => &[Direction::Up],
        4 | 12 | 13 => &[Direction::Right],
        8 | 9 | 11 => &[Direction::Down],
        _ => &[],
    }
}

/// Directed lattice edges already walked during one sweep.
struct WalkedEdges {
    stride: i64,
    rows: i64,
    bits: Vec<u8>,
}

impl WalkedEdges {
    fn new(mask: &Mask) -> Option<Self> {
        let stride = i64::from(mask.width()) + 1;
        let rows = i64::from(mask.height()) + 1;
        let len = usize::try_from(stride.checked_mul(rows)?).ok()?;
        Some(Self {
            stride,
            rows,
            bits: vec![0; len],
        })
    }

    fn index(&self, x: i64, y: i64) -> Option<usize> {
        if x < 0 || y < 0 || x >= self.stride || y >= self.rows {
            return None;
        }
        usize::try_from(y * self.stride + x).ok()
    }

    fn contains(&self, x: i64, y: i64, dir: Direction) -> bool {
        self.index(x, y)
            .is_some_and(|i| self.bits[i] & dir.bit() != 0)
    }

    /// Record an edge. Returns `false` if it was already walked or lies
    /// outside the lattice.
    fn insert(&mut self, x: i64, y: i64, dir: Direction) -> bool {
        let Some(i) = self.index(x, y) else {
            return false;
        };
        if self.bits[i] & dir.bit() != 0 {
            return false;
        }
        self.bits[i] |= dir.bit();
        true
    }
}

/// Trace every boundary of `mask` once, in row-major discovery order.
///
/// Each contour lists only the vertices where the walk changes
/// direction, so a solid rectangle yields exactly its four corners.
/// Contours with 2 or fewer points are dropped; at most
/// [`MAX_CONTOURS`] are returned.
#[must_use]
pub fn trace(mask: &Mask) -> Vec<Polyline> {
    let Some(mut walked) = WalkedEdges::new(mask) else {
        tracing::warn!(
            width = mask.width(),
            height = mask.height(),
            "mask too large to trace"
        );
        return Vec::new();
    };

    let width = i64::from(mask.width());
    let height = i64::from(mask.height());
    let step_limit = edge_count(width, height);
    let mut contours = Vec::new();

    for y in 0..=height {
        for x in 0..=width {
            for &first in seed_exits(configuration(mask, x, y)) {
                if walked.contains(x, y, first) {
                    continue;
                }
                let contour = trace_from(mask, &mut walked, (x, y), first, step_limit);
                if contour.len() <= 2 {
                    continue;
                }
                tracing::trace!(x, y, points = contour.len(), "traced contour");
                contours.push(contour);
                if contours.len() >= MAX_CONTOURS {
                    tracing::warn!(limit = MAX_CONTOURS, "contour limit reached");
                    return contours;
                }
            }
        }
    }
    contours
}

/// Walk one boundary starting with edge `first` out of `start`.
fn trace_from(
    mask: &Mask,
    walked: &mut WalkedEdges,
    start: (i64, i64),
    first: Direction,
    step_limit: usize,
) -> Polyline {
    let (mut x, mut y) = start;
    let mut steps: Vec<(i64, i64, Direction)> = Vec::new();
    let mut next = Some(first);

    while let Some(dir) = next {
        if !walked.insert(x, y, dir) {
            break;
        }
        steps.push((x, y, dir));
        if steps.len() > step_limit {
            tracing::warn!(x = start.0, y = start.1, "trace exceeded step limit");
            break;
        }
        let (dx, dy) = dir.delta();
        x += dx;
        y += dy;
        next = exit_for(configuration(mask, x, y), dir);
    }

    corners(&steps)
}

/// Keep the vertices where the outgoing direction differs from the
/// incoming one. The first vertex's incoming direction is the last
/// step's outgoing direction.
fn corners(steps: &[(i64, i64, Direction)]) -> Polyline {
    let Some(&(_, _, last_dir)) = steps.last() else {
        return Polyline::new(Vec::new());
    };
    let mut incoming = last_dir;
    let mut points = Vec::new();
    for &(x, y, dir) in steps {
        if dir != incoming {
            #[allow(clippy::cast_precision_loss)]
            points.push(Point::new(x as f64, y as f64));
        }
        incoming = dir;
    }
    Polyline::new(points)
}

/// Number of unit edges in the lattice of a `width x height` grid.
fn edge_count(width: i64, height: i64) -> usize {
    let edges = 2 * width * height + width + height;
    usize::try_from(edges).unwrap_or(usize::MAX)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn mask_from_rows(rows: &[&str]) -> Mask {
        let height = u32::try_from(rows.len()).unwrap();
        let width = u32::try_from(rows.first().map_or(0, |r| r.len())).unwrap();
        Mask::from_fn(width, height, |x, y| {
            rows[y as usize].as_bytes()[x as usize] == b'#'
        })
        .unwrap()
    }

    fn pts(points: &[(f64, f64)]) -> Vec<Point> {
        points.iter().map(|&(x, y)| Point::new(x, y)).collect()
    }

    #[test]
    fn configuration_bit_order() {
        let mask = mask_from_rows(&["#.", ".."]);
        // Vertex (1, 1): TL = (0, 0) is the only set corner.
        assert_eq!(configuration(&mask, 1, 1), 1);
        // Vertex (0, 0): (0, 0) is its bottom-right corner.
        assert_eq!(configuration(&mask, 0, 0), 4);
        // Vertex (1, 0): bottom-left.
        assert_eq!(configuration(&mask, 1, 0), 8);
        // Vertex (0, 1): top-right.
        assert_eq!(configuration(&mask, 0, 1), 2);
    }

    #[test]
    fn table_exits_keep_set_cells_on_the_right() {
        // An exit is a boundary edge: the cell on its right is set and the
        // cell on its left is not.
        for code in 1u8..15 {
            let tl = code & 1 != 0;
            let tr = code & 2 != 0;
            let br = code & 4 != 0;
            let bl = code & 8 != 0;
            for &dir in seed_exits(code) {
                let ok = match dir {
                    Direction::Right => br && !tr,
                    Direction::Down => bl && !br,
                    Direction::Left => tl && !bl,
                    Direction::Up => tr && !tl,
                };
                assert!(ok, "code {code} exit {dir:?}");
            }
            if let Exit::Go(dir) = EXITS[usize::from(code)] {
                assert_eq!(seed_exits(code), &[dir]);
            }
        }
    }

    #[test]
    fn empty_mask_has_no_contours() {
        let mask = mask_from_rows(&["....", "....", "...."]);
        assert!(trace(&mask).is_empty());
    }

    #[test]
    fn full_two_by_two_is_its_four_corners() {
        let mask = mask_from_rows(&["##", "##"]);
        let contours = trace(&mask);
        assert_eq!(contours.len(), 1);
        assert_eq!(
            contours[0].points(),
            pts(&[(0.0, 0.0), (2.0, 0.0), (2.0, 2.0), (0.0, 2.0)]).as_slice()
        );
        assert!((contours[0].area() - 4.0).abs() < 1e-12);
    }

    #[test]
    fn single_cell_is_unit_square() {
        let mask = mask_from_rows(&["...", ".#.", "..."]);
        let contours = trace(&mask);
        assert_eq!(contours.len(), 1);
        assert_eq!(
            contours[0].points(),
            pts(&[(1.0, 1.0), (2.0, 1.0), (2.0, 2.0), (1.0, 2.0)]).as_slice()
        );
    }

    #[test]
    fn two_disjoint_cells_give_two_unit_contours() {
        let mask = mask_from_rows(&["#...", "....", "...#"]);
        let contours = trace(&mask);
        assert_eq!(contours.len(), 2);
        for c in &contours {
            assert!((c.area() - 1.0).abs() < 1e-12);
        }
    }

    #[test]
    fn diagonal_neighbors_are_separate_contours() {
        let mask = mask_from_rows(&["#.", ".#"]);
        let contours = trace(&mask);
        assert_eq!(contours.len(), 2);
        for c in &contours {
            assert_eq!(c.len(), 4);
            assert!((c.area() - 1.0).abs() < 1e-12);
        }
    }

    #[test]
    fn anti_diagonal_neighbors_are_separate_contours() {
        let mask = mask_from_rows(&[".#", "#."]);
        let contours = trace(&mask);
        assert_eq!(contours.len(), 2);
        for c in &contours {
            assert!((c.area() - 1.0).abs() < 1e-12);
        }
    }

    #[test]
    fn ring_has_outer_and_hole_contours() {
        let mask = mask_from_rows(&["#####", "#...#", "#...#", "#####"]);
        let contours = trace(&mask);
        assert_eq!(contours.len(), 2);
        let mut areas: Vec<f64> = contours.iter().map(Polyline::area).collect();
        areas.sort_by(f64::total_cmp);
        assert!((areas[0] - 6.0).abs() < 1e-12);
        assert!((areas[1] - 20.0).abs() < 1e-12);
        // Outer boundary and hole wind in opposite directions.
        assert!(contours[0].signed_area() * contours[1].signed_area() < 0.0);
    }

    #[test]
    fn concave_shape_area_matches_cell_count() {
        let mask = mask_from_rows(&["###.", "#...", "###.", "..##"]);
        let contours = trace(&mask);
        assert_eq!(contours.len(), 1);
        assert!((contours[0].area() - mask.count() as f64).abs() < 1e-12);
    }

    #[test]
    fn checkerboard_traces_every_cell_once() {
        let mask = mask_from_rows(&["#.#.", ".#.#", "#.#.", ".#.#"]);
        let contours = trace(&mask);
        assert_eq!(contours.len(), 8);
        let total: f64 = contours.iter().map(Polyline::area).sum();
        assert!((total - 8.0).abs() < 1e-12);
    }

    #[test]
    fn full_mask_touching_every_border() {
        let mask = Mask::from_fn(7, 3, |_, _| true).unwrap();
        let contours = trace(&mask);
        assert_eq!(contours.len(), 1);
        assert!((contours[0].area() - 21.0).abs() < 1e-12);
    }

    #[test]
    fn contours_are_never_degenerate() {
        let mask = mask_from_rows(&["#.#", "##.", ".##"]);
        for c in trace(&mask) {
            assert!(c.len() > 2);
        }
    }

    #[test]
    fn total_signed_area_equals_cell_count() {
        // Outer boundaries count positive and holes negative, so the sum
        // of signed areas is the number of set cells for any mask.
        let mask = mask_from_rows(&[
            "##.#####",
            "#..#...#",
            "##.#.#.#",
            "...#...#",
            "#.######",
        ]);
        let total: f64 = trace(&mask).iter().map(Polyline::signed_area).sum();
        assert!((total - mask.count() as f64).abs() < 1e-9, "got {total}");
    }

    #[test]
    fn checkerboard_stops_at_contour_limit() {
        // Every set cell of a checkerboard is its own contour, far more
        // than the limit allows.
        let mask = Mask::from_fn(300, 300, |x, y| (x + y) % 2 == 0).unwrap();
        let contours = trace(&mask);
        assert_eq!(contours.len(), MAX_CONTOURS);
        assert!(contours.iter().all(|c| c.len() == 4));
    }
}
