//! Integer contour geometry shared by the tracer, the coordinate
//! transform and the two glyph drawing protocols.

pub mod trace;
pub mod transform;

/// A 2-D integer point. Kept as a plain hashable pair so outlines can
/// participate in content-addressed caching.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Point {
    pub x: i32,
    pub y: i32,
}

impl Point {
    pub const fn new(x: i32, y: i32) -> Point {
        Point { x, y }
    }
}

/// A closed polygon contour. The closing segment from the last point
/// back to the first is implicit and never duplicated.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Contour {
    pub points: Vec<Point>,
}

/// Axis-aligned bounding box, inclusive on all sides.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Bounds {
    pub x_min: i32,
    pub y_min: i32,
    pub x_max: i32,
    pub y_max: i32,
}

impl Bounds {
    pub fn of_point(p: Point) -> Bounds {
        Bounds {
            x_min: p.x,
            y_min: p.y,
            x_max: p.x,
            y_max: p.y,
        }
    }

    pub fn include(&mut self, p: Point) {
        self.x_min = self.x_min.min(p.x);
        self.y_min = self.y_min.min(p.y);
        self.x_max = self.x_max.max(p.x);
        self.y_max = self.y_max.max(p.y);
    }
}

/// Bounding box over every vertex of every contour. `None` only for an
/// empty contour list, which the tracer never produces.
pub fn bounds(contours: &[Contour]) -> Option<Bounds> {
    let mut all = contours.iter().flat_map(|c| c.points.iter().copied());
    let mut bounds = Bounds::of_point(all.next()?);
    for p in all {
        bounds.include(p);
    }
    Some(bounds)
}
