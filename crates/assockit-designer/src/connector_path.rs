//! Connector path: the ordered waypoints of one association line.
//!
//! Points are stored in the connector's local coordinate system. Every
//! structural change rebuilds the cached lyon polyline, the stroked hit-test
//! outline and its bounding rectangle, and bumps [`ConnectorPath::geometry_revision`].

use lyon::math::point;
use lyon::path::{Path, Winding};

use assockit_core::geometry::{squared_distance_to_segment, Point, Rect};
use assockit_core::{PathError, PathStyle};

/// Distance under which a candidate position counts as lying on a segment.
const ON_SEGMENT_EPSILON: f64 = 1e-6;

/// An ordered, mutable list of waypoints with cached hit-test geometry.
#[derive(Debug, Clone)]
pub struct ConnectorPath {
    points: Vec<Point>,
    style: PathStyle,
    polyline: Path,
    hit_shape: Path,
    bounding_rect: Rect,
    revision: u64,
}

impl Default for ConnectorPath {
    fn default() -> Self {
        Self::new(PathStyle::default())
    }
}

impl PartialEq for ConnectorPath {
    fn eq(&self, other: &Self) -> bool {
        self.points == other.points
    }
}

impl ConnectorPath {
    /// Creates an empty path rendered with `style`.
    pub fn new(style: PathStyle) -> Self {
        Self {
            points: Vec::new(),
            style,
            polyline: Path::new(),
            hit_shape: Path::new(),
            bounding_rect: Rect::default(),
            revision: 0,
        }
    }

    /// Creates a path holding `points` in order.
    pub fn from_points(points: Vec<Point>, style: PathStyle) -> Self {
        let mut path = Self::new(style);
        path.points = points;
        path.update_geometry();
        path
    }

    pub fn style(&self) -> &PathStyle {
        &self.style
    }

    /// Replaces the rendering parameters and rebuilds the hit-test outline.
    pub fn set_style(&mut self, style: PathStyle) {
        if self.style == style {
            return;
        }
        self.style = style;
        self.update_geometry();
    }

    pub fn count(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    pub fn points(&self) -> &[Point] {
        &self.points
    }

    /// Returns the point at `index`.
    pub fn point_at(&self, index: usize) -> Result<Point, PathError> {
        self.points
            .get(index)
            .copied()
            .ok_or(PathError::IndexOutOfRange {
                index,
                len: self.points.len(),
            })
    }

    /// Replaces the point at `index`. Writing an identical value leaves the
    /// cached geometry untouched.
    pub fn set_point(&mut self, index: usize, point: Point) -> Result<(), PathError> {
        let len = self.points.len();
        let slot = self
            .points
            .get_mut(index)
            .ok_or(PathError::IndexOutOfRange { index, len })?;
        if *slot == point {
            return Ok(());
        }
        *slot = point;
        self.update_geometry();
        Ok(())
    }

    /// Inserts `point` before `index`; `index == count()` appends.
    pub fn insert_point(&mut self, index: usize, point: Point) -> Result<(), PathError> {
        if index > self.points.len() {
            return Err(PathError::IndexOutOfRange {
                index,
                len: self.points.len(),
            });
        }
        self.points.insert(index, point);
        self.update_geometry();
        Ok(())
    }

    /// Removes and returns the point at `index`.
    pub fn remove_point(&mut self, index: usize) -> Result<Point, PathError> {
        if index >= self.points.len() {
            return Err(PathError::IndexOutOfRange {
                index,
                len: self.points.len(),
            });
        }
        let removed = self.points.remove(index);
        self.update_geometry();
        Ok(removed)
    }

    /// Removes a waypoint that is neither the first nor the last point.
    ///
    /// Returns `Ok(false)` without touching the path when `index` addresses
    /// an endpoint.
    pub fn remove_interior_point(&mut self, index: usize) -> Result<bool, PathError> {
        if index == 0 || index + 1 == self.points.len() {
            tracing::debug!("Refusing to remove endpoint {} of connector path", index);
            return Ok(false);
        }
        self.remove_point(index).map(|_| true)
    }

    /// Swaps in a whole new point list.
    pub(crate) fn replace_points(&mut self, points: Vec<Point>) {
        self.points = points;
        self.update_geometry();
    }

    /// Removes every point.
    pub fn clear(&mut self) {
        if self.points.is_empty() {
            return;
        }
        self.points.clear();
        self.update_geometry();
    }

    /// Drops every point equal to its predecessor in one forward pass and
    /// returns how many were removed.
    pub fn remove_duplicate_adjacent_points(&mut self) -> usize {
        let before = self.points.len();
        self.points.dedup();
        let removed = before - self.points.len();
        if removed > 0 {
            self.update_geometry();
        }
        removed
    }

    /// Index of the first point within `tolerance` of `point`. A negative
    /// tolerance matches nothing.
    pub fn closest_point_index(&self, point: &Point, tolerance: f64) -> Option<usize> {
        if !(tolerance >= 0.0) {
            return None;
        }
        let limit = tolerance * tolerance;
        self.points
            .iter()
            .position(|p| p.squared_distance_to(point) <= limit)
    }

    /// True when `point` equals the first or the last point.
    pub fn is_endpoint(&self, point: &Point) -> bool {
        match (self.points.first(), self.points.last()) {
            (Some(first), Some(last)) => first == point || last == point,
            _ => false,
        }
    }

    /// True when `index` addresses the first or the last point.
    pub fn is_endpoint_index(&self, index: usize) -> bool {
        !self.points.is_empty() && (index == 0 || index + 1 == self.points.len())
    }

    /// True when segment `index` touches an endpoint of the path.
    pub fn is_end_segment_index(&self, index: usize) -> bool {
        let segments = self.points.len().saturating_sub(1);
        segments > 0 && (index == 0 || index + 1 == segments)
    }

    pub fn start_point(&self) -> Option<Point> {
        self.points.first().copied()
    }

    pub fn end_point(&self) -> Option<Point> {
        self.points.last().copied()
    }

    /// Makes `start` and `end` the path's first two points.
    ///
    /// An empty path receives both points and a single-point path gets
    /// `end` appended. Longer paths have indices 0 and 1 overwritten; use
    /// [`ConnectorPath::set_terminal_points`] to move the ends of a routed path.
    pub fn set_endpoints(&mut self, start: Point, end: Point) {
        match self.points.len() {
            0 => {
                self.points.push(start);
                self.points.push(end);
            }
            1 => {
                self.points[0] = start;
                self.points.push(end);
            }
            _ => {
                if self.points[0] == start && self.points[1] == end {
                    return;
                }
                self.points[0] = start;
                self.points[1] = end;
            }
        }
        self.update_geometry();
    }

    /// Moves the first and the last point, keeping interior waypoints.
    pub fn set_terminal_points(&mut self, start: Point, end: Point) {
        let len = self.points.len();
        if len < 2 {
            self.set_endpoints(start, end);
            return;
        }
        if self.points[0] == start && self.points[len - 1] == end {
            return;
        }
        self.points[0] = start;
        self.points[len - 1] = end;
        self.update_geometry();
    }

    /// Index at which `position` can be inserted so that it splits the
    /// segment it lies on.
    pub fn find_insertable_segment_index(&self, position: &Point) -> Option<usize> {
        let limit = ON_SEGMENT_EPSILON * ON_SEGMENT_EPSILON;
        self.points
            .windows(2)
            .position(|seg| squared_distance_to_segment(position, &seg[0], &seg[1]) <= limit)
            .map(|segment| segment + 1)
    }

    /// Index of the first segment whose `delta` wide stroke covers `point`.
    pub fn segment_index(&self, point: &Point, delta: f64) -> Option<usize> {
        let half = delta / 2.0;
        let limit = half * half;
        self.points
            .windows(2)
            .position(|seg| squared_distance_to_segment(point, &seg[0], &seg[1]) <= limit)
    }

    /// Hit test against the stroked outline of the path.
    pub fn contains(&self, point: &Point) -> bool {
        if !self.bounding_rect.contains_point(point, 0.0) {
            return false;
        }
        let half = self.style.stroke_width() / 2.0;
        let dot = self.style.selected_point_diameter / 2.0 + half;
        self.points
            .iter()
            .any(|p| p.squared_distance_to(point) <= dot * dot)
            || self.segment_index(point, self.style.stroke_width()).is_some()
    }

    /// Counter bumped on every change of the cached geometry.
    pub fn geometry_revision(&self) -> u64 {
        self.revision
    }

    /// Cached bounding rectangle of the hit-test outline.
    pub fn bounding_rect(&self) -> Rect {
        self.bounding_rect
    }

    /// Polyline through every waypoint.
    pub fn polyline(&self) -> &Path {
        &self.polyline
    }

    /// Outline used for hit-testing: a stroked band around every segment
    /// plus a handle around every waypoint.
    pub fn hit_shape(&self) -> &Path {
        &self.hit_shape
    }

    fn update_geometry(&mut self) {
        self.revision += 1;
        self.polyline = build_polyline(&self.points);
        self.hit_shape = build_hit_shape(&self.points, &self.style);
        self.bounding_rect = if self.points.is_empty() {
            Rect::default()
        } else {
            let bb = lyon::algorithms::aabb::bounding_box(self.hit_shape.iter());
            Rect::from_corners(
                Point::new(bb.min.x as f64, bb.min.y as f64),
                Point::new(bb.max.x as f64, bb.max.y as f64),
            )
        };
    }
}

fn build_polyline(points: &[Point]) -> Path {
    let mut builder = Path::builder();
    if let Some((first, rest)) = points.split_first() {
        builder.begin(point(first.x as f32, first.y as f32));
        for p in rest {
            builder.line_to(point(p.x as f32, p.y as f32));
        }
        builder.end(false);
    }
    builder.build()
}

fn build_hit_shape(points: &[Point], style: &PathStyle) -> Path {
    let half = style.stroke_width() / 2.0;
    let mut builder = Path::builder();

    for seg in points.windows(2) {
        let (a, b) = (seg[0], seg[1]);
        let length = a.distance_to(&b);
        if length == 0.0 {
            continue;
        }
        // Normal scaled to half the stroke, tangent extension for square caps.
        let nx = -(b.y - a.y) / length * half;
        let ny = (b.x - a.x) / length * half;
        let tx = (b.x - a.x) / length * half;
        let ty = (b.y - a.y) / length * half;

        builder.begin(point((a.x - tx + nx) as f32, (a.y - ty + ny) as f32));
        builder.line_to(point((b.x + tx + nx) as f32, (b.y + ty + ny) as f32));
        builder.line_to(point((b.x + tx - nx) as f32, (b.y + ty - ny) as f32));
        builder.line_to(point((a.x - tx - nx) as f32, (a.y - ty - ny) as f32));
        builder.end(true);
    }

    let radius = (style.selected_point_diameter / 2.0 + half) as f32;
    for p in points {
        builder.add_circle(point(p.x as f32, p.y as f32), radius, Winding::Positive);
    }

    builder.build()
}
