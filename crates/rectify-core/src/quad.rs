//! Point, Quad - Planar geometry primitives
//!
//! A [`Quad`] is an ordered set of four corners interpreted as the image of
//! the unit square corners `(0,0), (1,0), (1,1), (0,1)` under a projective
//! map. Corner order is significant: it determines which edges are
//! adjacent, so every operation here preserves it.

use serde::{Deserialize, Serialize};
use std::ops::{Index, IndexMut};

/// A 2D point with floating-point coordinates
///
/// Used both in source-pixel space and destination-pixel space; no unit
/// conversion is ever performed on it.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Point {
    /// X coordinate
    pub x: f64,
    /// Y coordinate
    pub y: f64,
}

impl Point {
    /// Create a new point
    pub const fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    /// Euclidean distance to another point.
    pub fn distance(&self, other: &Point) -> f64 {
        (self.x - other.x).hypot(self.y - other.y)
    }
}

impl From<(f64, f64)> for Point {
    fn from((x, y): (f64, f64)) -> Self {
        Self { x, y }
    }
}

impl From<[f64; 2]> for Point {
    fn from([x, y]: [f64; 2]) -> Self {
        Self { x, y }
    }
}

/// Ordered quadrilateral `[p0, p1, p2, p3]`
///
/// `p0..p3` are the images of the unit square corners `(0,0)`, `(1,0)`,
/// `(1,1)` and `(0,1)` respectively.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Quad {
    corners: [Point; 4],
}

impl Quad {
    /// Create a quad from its four corners, in unit-square order.
    pub const fn new(corners: [Point; 4]) -> Self {
        Self { corners }
    }

    /// Create an axis-aligned rectangle with top-left `(x0, y0)` and
    /// bottom-right `(x1, y1)`.
    pub const fn rectangle(x0: f64, y0: f64, x1: f64, y1: f64) -> Self {
        Self {
            corners: [
                Point::new(x0, y0),
                Point::new(x1, y0),
                Point::new(x1, y1),
                Point::new(x0, y1),
            ],
        }
    }

    /// The default corner set for an image of `width x height` pixels:
    /// a rectangle spanning the middle half of the frame on each axis.
    ///
    /// Positions are whole pixels (integer division).
    pub fn centered_for_size(width: u32, height: u32) -> Self {
        let x0 = (width / 4) as f64;
        let y0 = (height / 4) as f64;
        let x1 = (3 * width / 4) as f64;
        let y1 = (3 * height / 4) as f64;
        Self::rectangle(x0, y0, x1, y1)
    }

    /// Build from `[[x, y]; 4]` coordinate data.
    pub fn from_coords(coords: [[f64; 2]; 4]) -> Self {
        Self {
            corners: coords.map(Point::from),
        }
    }

    /// Export as `[[x, y]; 4]` coordinate data.
    pub fn to_coords(&self) -> [[f64; 2]; 4] {
        self.corners.map(|p| [p.x, p.y])
    }

    /// The corners, in unit-square order.
    #[inline]
    pub fn corners(&self) -> &[Point; 4] {
        &self.corners
    }

    /// Returns `true` when `p0 - p1 + p2 - p3` is exactly zero, i.e. the
    /// opposite edges are parallel and of equal length.
    pub fn is_parallelogram(&self) -> bool {
        let [p0, p1, p2, p3] = self.corners;
        p0.x - p1.x + p2.x - p3.x == 0.0 && p0.y - p1.y + p2.y - p3.y == 0.0
    }

    /// Move corner `index` to `point` and drag its two neighbours so the
    /// quad stays an axis-aligned rectangle.
    ///
    /// Corner 0 moves corner 3's x and corner 1's y, corner 1 moves corner
    /// 2's x and corner 0's y, and so on around the quad.
    ///
    /// # Panics
    ///
    /// Panics if `index >= 4`.
    pub fn set_rectangle_corner(&mut self, index: usize, point: Point) {
        self.corners[index] = point;
        let (same_x, same_y) = match index {
            0 => (3, 1),
            1 => (2, 0),
            2 => (1, 3),
            _ => (0, 2),
        };
        self.corners[same_x].x = point.x;
        self.corners[same_y].y = point.y;
    }

    /// Axis-aligned bounding box as `(x_min, y_min, x_max, y_max)`.
    pub fn bounding_box(&self) -> (f64, f64, f64, f64) {
        self.corners.iter().fold(
            (f64::INFINITY, f64::INFINITY, f64::NEG_INFINITY, f64::NEG_INFINITY),
            |(x0, y0, x1, y1), p| (x0.min(p.x), y0.min(p.y), x1.max(p.x), y1.max(p.y)),
        )
    }
}

impl From<[Point; 4]> for Quad {
    fn from(corners: [Point; 4]) -> Self {
        Self { corners }
    }
}

impl Index<usize> for Quad {
    type Output = Point;

    fn index(&self, index: usize) -> &Point {
        &self.corners[index]
    }
}

impl IndexMut<usize> for Quad {
    fn index_mut(&mut self, index: usize) -> &mut Point {
        &mut self.corners[index]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rectangle_order() {
        let q = Quad::rectangle(50.0, 25.0, 150.0, 75.0);
        assert_eq!(q[0], Point::new(50.0, 25.0));
        assert_eq!(q[1], Point::new(150.0, 25.0));
        assert_eq!(q[2], Point::new(150.0, 75.0));
        assert_eq!(q[3], Point::new(50.0, 75.0));
        assert!(q.is_parallelogram());
    }

    #[test]
    fn test_centered_for_size_uses_integer_division() {
        let q = Quad::centered_for_size(201, 99);
        assert_eq!(q[0], Point::new(50.0, 24.0));
        assert_eq!(q[2], Point::new(150.0, 74.0));
    }

    #[test]
    fn test_trapezoid_not_parallelogram() {
        let q = Quad::new([
            Point::new(10.0, 0.0),
            Point::new(90.0, 0.0),
            Point::new(100.0, 50.0),
            Point::new(0.0, 50.0),
        ]);
        assert!(!q.is_parallelogram());
    }

    #[test]
    fn test_coords_roundtrip() {
        let coords = [[1.0, 2.0], [3.0, 4.0], [5.0, 6.0], [7.0, 8.0]];
        assert_eq!(Quad::from_coords(coords).to_coords(), coords);
    }

    #[test]
    fn test_set_rectangle_corner() {
        let mut q = Quad::rectangle(0.0, 0.0, 10.0, 10.0);
        q.set_rectangle_corner(2, Point::new(20.0, 30.0));
        assert_eq!(q, Quad::rectangle(0.0, 0.0, 20.0, 30.0));

        q.set_rectangle_corner(0, Point::new(5.0, 6.0));
        assert_eq!(q, Quad::rectangle(5.0, 6.0, 20.0, 30.0));
    }

    #[test]
    fn test_bounding_box() {
        let q = Quad::new([
            Point::new(3.0, 1.0),
            Point::new(9.0, -2.0),
            Point::new(7.0, 8.0),
            Point::new(-1.0, 4.0),
        ]);
        assert_eq!(q.bounding_box(), (-1.0, -2.0, 9.0, 8.0));
    }
}
