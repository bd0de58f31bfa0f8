//! Screen-space geometry: points, angles, and rotated-box math.
//!
//! Everything lives in one global pixel space. Rotations are in degrees,
//! clockwise on screen (y grows downward), pivoting on a node's origin the way
//! the rendering host applies them.

#[cfg(test)]
#[path = "geom_test.rs"]
mod geom_test;

use serde::{Deserialize, Serialize};

/// A point in stage-local pixel coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    #[must_use]
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    /// Euclidean distance to `other`.
    #[must_use]
    pub fn distance_to(self, other: Point) -> f64 {
        (other.x - self.x).hypot(other.y - self.y)
    }

    /// Direction from `self` to `other` in degrees, in `(-180, 180]`.
    #[must_use]
    pub fn angle_to_deg(self, other: Point) -> f64 {
        (other.y - self.y).atan2(other.x - self.x).to_degrees()
    }

    /// Express `self` in the local frame of a node at `origin` rotated by `rotation_deg`.
    #[must_use]
    pub fn to_local(self, origin: Point, rotation_deg: f64) -> Point {
        let (sin, cos) = (-rotation_deg.to_radians()).sin_cos();
        let dx = self.x - origin.x;
        let dy = self.y - origin.y;
        Point::new(dx * cos - dy * sin, dx * sin + dy * cos)
    }

    /// Map a point from a node's local frame back to stage coordinates.
    #[must_use]
    pub fn to_stage(self, origin: Point, rotation_deg: f64) -> Point {
        let (sin, cos) = rotation_deg.to_radians().sin_cos();
        Point::new(
            origin.x + self.x * cos - self.y * sin,
            origin.y + self.x * sin + self.y * cos,
        )
    }
}

/// Axis-aligned box spanned by two corners, normalized so width and height are non-negative.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Bounds {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

impl Bounds {
    /// Normalize the box between two drag corners, independent of drag direction.
    #[must_use]
    pub fn from_corners(a: Point, b: Point) -> Self {
        Self {
            x: a.x.min(b.x),
            y: a.y.min(b.y),
            width: (b.x - a.x).abs(),
            height: (b.y - a.y).abs(),
        }
    }
}

/// Whether `p` lies inside a `width` × `height` box whose top-left corner is
/// `origin` and which is rotated about that corner.
#[must_use]
pub fn rotated_box_contains(p: Point, origin: Point, width: f64, height: f64, rotation_deg: f64) -> bool {
    let local = p.to_local(origin, rotation_deg);
    (0.0..=width).contains(&local.x) && (0.0..=height).contains(&local.y)
}

/// Distance from `p` to the segment `a`–`b`.
#[must_use]
pub fn distance_to_segment(p: Point, a: Point, b: Point) -> f64 {
    let dx = b.x - a.x;
    let dy = b.y - a.y;
    let len_sq = dx * dx + dy * dy;
    if len_sq <= f64::EPSILON {
        return p.distance_to(a);
    }
    let t = (((p.x - a.x) * dx + (p.y - a.y) * dy) / len_sq).clamp(0.0, 1.0);
    p.distance_to(Point::new(a.x + t * dx, a.y + t * dy))
}

/// Whether `p` lies inside (or on the edge of) triangle `a`, `b`, `c`.
#[must_use]
pub fn triangle_contains(p: Point, a: Point, b: Point, c: Point) -> bool {
    let cross = |u: Point, v: Point, w: Point| (v.x - u.x) * (w.y - u.y) - (v.y - u.y) * (w.x - u.x);
    let d1 = cross(a, b, p);
    let d2 = cross(b, c, p);
    let d3 = cross(c, a, p);
    let has_neg = d1 < 0.0 || d2 < 0.0 || d3 < 0.0;
    let has_pos = d1 > 0.0 || d2 > 0.0 || d3 > 0.0;
    !(has_neg && has_pos)
}
