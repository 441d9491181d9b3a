//! Authoring-space to font-space coordinate transform.
//!
//! Authoring space has its origin at the top-left with y increasing
//! downward, in pixel units. Font space has its origin on the baseline
//! with y increasing upward, in design units. The vertical origin offset
//! is the size mode's baseline offset from the canvas top.

use crate::geometry::{Contour, Point};

/// Map a single authoring-space point into font space.
pub fn point_to_font_space(p: Point, origin_y_px: u32, em_dot_size: u32) -> Point {
    let s = em_dot_size as i32;
    Point::new(p.x * s, (origin_y_px as i32 - p.y) * s)
}

/// Map every vertex of every contour into font space.
pub fn to_font_space(contours: &[Contour], origin_y_px: u32, em_dot_size: u32) -> Vec<Contour> {
    contours
        .iter()
        .map(|contour| Contour {
            points: contour
                .points
                .iter()
                .map(|&p| point_to_font_space(p, origin_y_px, em_dot_size))
                .collect(),
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn flips_y_about_the_baseline_and_scales() {
        // Baseline 8 pixels from the top, 100 units per pixel.
        assert_eq!(
            point_to_font_space(Point::new(0, 0), 8, 100),
            Point::new(0, 800)
        );
        assert_eq!(
            point_to_font_space(Point::new(3, 8), 8, 100),
            Point::new(300, 0)
        );
        // Below the baseline lands at negative y.
        assert_eq!(
            point_to_font_space(Point::new(5, 10), 8, 100),
            Point::new(500, -200)
        );
    }

    #[test]
    fn transforms_whole_contours() {
        let contours = vec![Contour {
            points: vec![Point::new(0, 0), Point::new(1, 0), Point::new(1, 1)],
        }];
        let transformed = to_font_space(&contours, 10, 100);
        assert_eq!(
            transformed[0].points,
            vec![
                Point::new(0, 1000),
                Point::new(100, 1000),
                Point::new(100, 900)
            ]
        );
    }
}
