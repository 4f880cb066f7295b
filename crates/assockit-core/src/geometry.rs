//! 2-D geometry primitives used for shape bounds and connector routes.

use serde::{Deserialize, Serialize};
use std::ops::{Add, Sub};

/// Represents a 2D point with X and Y coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    /// Creates a new point with the given X and Y coordinates.
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    /// Calculates the distance to another point.
    pub fn distance_to(&self, other: &Point) -> f64 {
        self.squared_distance_to(other).sqrt()
    }

    /// Squared distance to another point, avoiding the square root.
    pub fn squared_distance_to(&self, other: &Point) -> f64 {
        (self.x - other.x).powi(2) + (self.y - other.y).powi(2)
    }

    /// Point halfway between `self` and `other`.
    pub fn midpoint(&self, other: &Point) -> Point {
        Point::new((self.x + other.x) / 2.0, (self.y + other.y) / 2.0)
    }

    /// Returns a copy moved by `(dx, dy)`.
    pub fn translated(&self, dx: f64, dy: f64) -> Point {
        Point::new(self.x + dx, self.y + dy)
    }
}

impl Add for Point {
    type Output = Point;

    fn add(self, rhs: Point) -> Point {
        Point::new(self.x + rhs.x, self.y + rhs.y)
    }
}

impl Sub for Point {
    type Output = Point;

    fn sub(self, rhs: Point) -> Point {
        Point::new(self.x - rhs.x, self.y - rhs.y)
    }
}

/// An axis-aligned rectangle defined by its top-left corner and dimensions.
///
/// The Y axis grows downwards, so `top() <= bottom()` for a normalized rect.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Rect {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

impl Rect {
    pub fn new(x: f64, y: f64, width: f64, height: f64) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    /// Builds a normalized rectangle spanning two arbitrary corners.
    pub fn from_corners(a: Point, b: Point) -> Self {
        let min_x = a.x.min(b.x);
        let min_y = a.y.min(b.y);
        Self::new(min_x, min_y, (a.x - b.x).abs(), (a.y - b.y).abs())
    }

    pub fn left(&self) -> f64 {
        self.x
    }

    pub fn top(&self) -> f64 {
        self.y
    }

    pub fn right(&self) -> f64 {
        self.x + self.width
    }

    pub fn bottom(&self) -> f64 {
        self.y + self.height
    }

    pub fn top_left(&self) -> Point {
        Point::new(self.left(), self.top())
    }

    pub fn top_right(&self) -> Point {
        Point::new(self.right(), self.top())
    }

    pub fn bottom_left(&self) -> Point {
        Point::new(self.left(), self.bottom())
    }

    pub fn bottom_right(&self) -> Point {
        Point::new(self.right(), self.bottom())
    }

    pub fn center(&self) -> Point {
        Point::new(self.x + self.width / 2.0, self.y + self.height / 2.0)
    }

    /// True when the rectangle has no area.
    pub fn is_empty(&self) -> bool {
        self.width <= 0.0 || self.height <= 0.0
    }

    /// Returns a copy grown by `margin` on every side.
    pub fn inflated(&self, margin: f64) -> Rect {
        Rect::new(
            self.x - margin,
            self.y - margin,
            self.width + 2.0 * margin,
            self.height + 2.0 * margin,
        )
    }

    /// Returns a copy moved by `(dx, dy)`.
    pub fn translated(&self, dx: f64, dy: f64) -> Rect {
        Rect::new(self.x + dx, self.y + dy, self.width, self.height)
    }

    pub fn contains_point(&self, point: &Point, tolerance: f64) -> bool {
        point.x >= self.left() - tolerance
            && point.x <= self.right() + tolerance
            && point.y >= self.top() - tolerance
            && point.y <= self.bottom() + tolerance
    }
}

/// Squared distance from `p` to the closed segment `a`-`b`.
pub fn squared_distance_to_segment(p: &Point, a: &Point, b: &Point) -> f64 {
    let l2 = a.squared_distance_to(b);
    if l2 == 0.0 {
        return p.squared_distance_to(a);
    }
    let t = ((p.x - a.x) * (b.x - a.x) + (p.y - a.y) * (b.y - a.y)) / l2;
    let t = t.clamp(0.0, 1.0);
    let proj = Point::new(a.x + t * (b.x - a.x), a.y + t * (b.y - a.y));
    p.squared_distance_to(&proj)
}

/// Intersection point of the closed segments `a1`-`a2` and `b1`-`b2`.
///
/// Returns `None` for parallel segments and for intersections of the
/// supporting lines that fall outside either segment.
pub fn segment_intersection(a1: &Point, a2: &Point, b1: &Point, b2: &Point) -> Option<Point> {
    let r = *a2 - *a1;
    let s = *b2 - *b1;
    let denom = r.x * s.y - r.y * s.x;
    if denom.abs() < f64::EPSILON {
        return None;
    }
    let qp = *b1 - *a1;
    let t = (qp.x * s.y - qp.y * s.x) / denom;
    let u = (qp.x * r.y - qp.y * r.x) / denom;
    if (0.0..=1.0).contains(&t) && (0.0..=1.0).contains(&u) {
        Some(Point::new(a1.x + t * r.x, a1.y + t * r.y))
    } else {
        None
    }
}
