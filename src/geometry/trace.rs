//! Outline tracing: pixel grid to closed rectilinear contours.
//!
//! Every boundary edge of the foreground area is collected once (edges
//! shared by two foreground cells cancel), oriented so the filled area
//! lies to the right of the travel direction in authoring space (y
//! down). After the baseline flip into font space this yields clockwise
//! outer contours and counter-clockwise holes, the TrueType fill
//! convention. Edges are stitched into loops and collinear vertices
//! merged, so each contour carries the minimum number of vertices.
//!
//! Determinism: loops start at their topmost-leftmost corner and are
//! emitted in row-major order of that corner; where four cells meet in a
//! checkerboard the walk prefers the right turn, keeping diagonally
//! touching regions separate. Tracing the same grid twice yields
//! byte-identical contours.

use crate::design::PixelGrid;
use crate::geometry::{Contour, Point};
use std::collections::BTreeMap;

/// Edge directions, indexed so that `(d + 1) % 4` is the right turn in
/// authoring space: east, south, west, north.
const DELTAS: [(i32, i32); 4] = [(1, 0), (0, 1), (-1, 0), (0, -1)];

/// Trace a pixel grid into closed contours in authoring coordinates
/// (unit = one pixel, origin top-left, y down).
///
/// A grid with no foreground pixels yields a single degenerate one-point
/// contour at the origin: the downstream glyph formats require every
/// glyph to own at least one drawing instruction.
pub fn trace_outline(grid: &PixelGrid) -> Vec<Contour> {
    // Pending edges keyed by start corner in row-major order; the value
    // holds the directions of unconsumed edges starting there.
    let mut pending: BTreeMap<(i32, i32), Vec<usize>> = BTreeMap::new();
    let mut add_edge = |x: i32, y: i32, dir: usize| {
        pending.entry((y, x)).or_default().push(dir);
    };

    let fg = |x: i32, y: i32| {
        x >= 0
            && y >= 0
            && (x as u32) < grid.width()
            && (y as u32) < grid.height()
            && grid.is_foreground(x as u32, y as u32)
    };

    for y in 0..grid.height() as i32 {
        for x in 0..grid.width() as i32 {
            if !fg(x, y) {
                continue;
            }
            if !fg(x, y - 1) {
                add_edge(x, y, 0); // top edge, eastbound
            }
            if !fg(x + 1, y) {
                add_edge(x + 1, y, 1); // right edge, southbound
            }
            if !fg(x, y + 1) {
                add_edge(x + 1, y + 1, 2); // bottom edge, westbound
            }
            if !fg(x - 1, y) {
                add_edge(x, y + 1, 3); // left edge, northbound
            }
        }
    }

    for dirs in pending.values_mut() {
        dirs.sort_unstable();
    }

    let mut contours = Vec::new();
    loop {
        let Some((&(start_y, start_x), _)) =
            pending.iter().find(|(_, dirs)| !dirs.is_empty())
        else {
            break;
        };
        let start = (start_x, start_y);
        let mut dir = take_dir(&mut pending, start, None)
            .expect("a pending start corner must hold at least one edge");
        let mut points = vec![Point::new(start.0, start.1)];
        let mut current = start;
        loop {
            let (dx, dy) = DELTAS[dir];
            current = (current.0 + dx, current.1 + dy);
            if current == start {
                break;
            }
            points.push(Point::new(current.0, current.1));
            dir = take_dir(&mut pending, current, Some(dir))
                .expect("boundary edges always close into loops");
        }
        contours.push(Contour {
            points: merge_collinear(points),
        });
    }

    if contours.is_empty() {
        contours.push(Contour {
            points: vec![Point::new(0, 0)],
        });
    }
    contours
}

/// Consume one edge starting at `corner`. With an incoming direction the
/// right turn is preferred, then straight, then the left turn; a fresh
/// loop takes the lowest direction index.
fn take_dir(
    pending: &mut BTreeMap<(i32, i32), Vec<usize>>,
    corner: (i32, i32),
    incoming: Option<usize>,
) -> Option<usize> {
    let dirs = pending.get_mut(&(corner.1, corner.0))?;
    let choice = match incoming {
        Some(d) => [(d + 1) % 4, d, (d + 3) % 4]
            .into_iter()
            .find(|candidate| dirs.contains(candidate))?,
        None => *dirs.first()?,
    };
    dirs.retain(|&d| d != choice);
    Some(choice)
}

/// Drop every vertex whose incoming and outgoing segments share a
/// direction, including across the implicit closing segment.
fn merge_collinear(points: Vec<Point>) -> Vec<Point> {
    let n = points.len();
    if n < 3 {
        return points;
    }
    let step = |from: Point, to: Point| ((to.x - from.x).signum(), (to.y - from.y).signum());
    (0..n)
        .filter(|&i| {
            let prev = points[(i + n - 1) % n];
            let next = points[(i + 1) % n];
            step(prev, points[i]) != step(points[i], next)
        })
        .map(|i| points[i])
        .collect()
}
