//! Boundary regions of a shape and the association roles attached to them.
//!
//! A shape's boundary is split into eight compass regions: the four edges and
//! the four corners. Every connector end that touches a shape is assigned one
//! region. A [`RegionPair`] records where a connector lands on one shape: a
//! single region for an ordinary connector, or two regions (one per end) for
//! a self-loop.

use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::fmt;
use std::ops::{Index, IndexMut};
use std::str::FromStr;

use crate::geometry::{Point, Rect};

/// Compass region on a shape's boundary.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Region {
    /// Not yet assigned
    #[default]
    None,
    West,
    North,
    East,
    South,
    NorthWest,
    NorthEast,
    SouthEast,
    SouthWest,
}

impl Region {
    /// Every assignable region: the four edges first, then the corners.
    pub const ALL: [Region; 8] = [
        Region::West,
        Region::North,
        Region::East,
        Region::South,
        Region::NorthWest,
        Region::NorthEast,
        Region::SouthEast,
        Region::SouthWest,
    ];

    /// The four edge regions.
    pub const EDGES: [Region; 4] = [Region::West, Region::North, Region::East, Region::South];

    /// Stable numeric value, `None` is 0 and the assignable regions follow
    /// the order of [`Region::ALL`] starting at 1.
    pub fn ordinal(self) -> u32 {
        match self {
            Region::None => 0,
            Region::West => 1,
            Region::North => 2,
            Region::East => 3,
            Region::South => 4,
            Region::NorthWest => 5,
            Region::NorthEast => 6,
            Region::SouthEast => 7,
            Region::SouthWest => 8,
        }
    }

    pub fn is_none(self) -> bool {
        self == Region::None
    }

    pub fn is_edge(self) -> bool {
        matches!(
            self,
            Region::West | Region::North | Region::East | Region::South
        )
    }

    pub fn is_corner(self) -> bool {
        matches!(
            self,
            Region::NorthWest | Region::NorthEast | Region::SouthEast | Region::SouthWest
        )
    }

    /// True when connectors on this region are ordered by their x coordinate.
    ///
    /// North and South edges run horizontally; every other region is ordered
    /// by y.
    pub fn is_x_basis(self) -> bool {
        matches!(self, Region::North | Region::South)
    }

    /// The corner point for a corner region.
    pub fn corner_of(self, rect: &Rect) -> Option<Point> {
        match self {
            Region::NorthWest => Some(rect.top_left()),
            Region::NorthEast => Some(rect.top_right()),
            Region::SouthEast => Some(rect.bottom_right()),
            Region::SouthWest => Some(rect.bottom_left()),
            _ => None,
        }
    }

    /// The start and end points of an edge region, in increasing order of
    /// the edge's free coordinate. Corner regions collapse to their corner.
    pub fn span_of(self, rect: &Rect) -> Option<(Point, Point)> {
        match self {
            Region::West => Some((rect.top_left(), rect.bottom_left())),
            Region::North => Some((rect.top_left(), rect.top_right())),
            Region::East => Some((rect.top_right(), rect.bottom_right())),
            Region::South => Some((rect.bottom_left(), rect.bottom_right())),
            Region::None => None,
            corner => corner.corner_of(rect).map(|p| (p, p)),
        }
    }

    /// Point at `fraction` (0.0..=1.0) along the region's span.
    pub fn point_along(self, rect: &Rect, fraction: f64) -> Option<Point> {
        let (start, end) = self.span_of(rect)?;
        Some(Point::new(
            start.x + fraction * (end.x - start.x),
            start.y + fraction * (end.y - start.y),
        ))
    }
}

impl fmt::Display for Region {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Region::None => "none",
            Region::West => "west",
            Region::North => "north",
            Region::East => "east",
            Region::South => "south",
            Region::NorthWest => "northwest",
            Region::NorthEast => "northeast",
            Region::SouthEast => "southeast",
            Region::SouthWest => "southwest",
        };
        write!(f, "{}", name)
    }
}

impl FromStr for Region {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "none" | "" => Ok(Region::None),
            "west" | "w" => Ok(Region::West),
            "north" | "n" => Ok(Region::North),
            "east" | "e" => Ok(Region::East),
            "south" | "s" => Ok(Region::South),
            "northwest" | "nw" => Ok(Region::NorthWest),
            "northeast" | "ne" => Ok(Region::NorthEast),
            "southeast" | "se" => Ok(Region::SouthEast),
            "southwest" | "sw" => Ok(Region::SouthWest),
            _ => Err(format!("Unknown region: {}", s)),
        }
    }
}

/// One of the two ends of an association.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Role {
    A,
    B,
}

impl Role {
    pub fn other(self) -> Role {
        match self {
            Role::A => Role::B,
            Role::B => Role::A,
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Role::A => write!(f, "A"),
            Role::B => write!(f, "B"),
        }
    }
}

/// The regions a connector occupies on a single shape.
///
/// `second == Region::None` marks a connector touching the shape once. For a
/// self-loop, `first` holds the region of the role A end and `second` the
/// region of the role B end.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct RegionPair {
    pub first: Region,
    pub second: Region,
}

impl RegionPair {
    pub fn new(first: Region, second: Region) -> Self {
        Self { first, second }
    }

    /// Pair for a connector touching the shape at one region.
    pub fn single(region: Region) -> Self {
        Self::new(region, Region::None)
    }

    /// Pair for a self-loop with both ends on `region`.
    pub fn self_loop(region: Region) -> Self {
        Self::new(region, region)
    }

    /// Sentinel returned for unregistered connectors.
    pub fn invalid() -> Self {
        Self::new(Region::None, Region::None)
    }

    pub fn is_valid(&self) -> bool {
        !self.first.is_none()
    }

    /// Ordering key, `100 * first + second`.
    pub fn key(&self) -> u32 {
        100 * self.first.ordinal() + self.second.ordinal()
    }

    pub fn is_single(&self) -> bool {
        self.is_valid() && self.second.is_none()
    }

    pub fn is_self_loop(&self) -> bool {
        self.is_valid() && self.first == self.second
    }

    /// Both ends set but on different regions of the same shape.
    pub fn is_cross(&self) -> bool {
        self.is_valid() && !self.second.is_none() && self.first != self.second
    }
}

impl PartialOrd for RegionPair {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for RegionPair {
    fn cmp(&self, other: &Self) -> Ordering {
        self.key().cmp(&other.key())
    }
}

impl Index<Role> for RegionPair {
    type Output = Region;

    fn index(&self, role: Role) -> &Region {
        match role {
            Role::A => &self.first,
            Role::B => &self.second,
        }
    }
}

impl IndexMut<Role> for RegionPair {
    fn index_mut(&mut self, role: Role) -> &mut Region {
        match role {
            Role::A => &mut self.first,
            Role::B => &mut self.second,
        }
    }
}

impl fmt::Display for RegionPair {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.first, self.second)
    }
}

/// A pair of points addressed by association role.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct PointPair {
    pub first: Point,
    pub second: Point,
}

impl PointPair {
    pub fn new(first: Point, second: Point) -> Self {
        Self { first, second }
    }
}

impl Index<Role> for PointPair {
    type Output = Point;

    fn index(&self, role: Role) -> &Point {
        match role {
            Role::A => &self.first,
            Role::B => &self.second,
        }
    }
}

impl IndexMut<Role> for PointPair {
    fn index_mut(&mut self, role: Role) -> &mut Point {
        match role {
            Role::A => &mut self.first,
            Role::B => &mut self.second,
        }
    }
}
