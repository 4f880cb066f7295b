//! Region detection for connector ends.
//!
//! A connector end belongs to the region of its shape's rectangle crossed by
//! the line leaving the shape centre towards the connector's first waypoint
//! (or towards the other shape's centre for a straight connector).

use assockit_core::geometry::{segment_intersection, Point, Rect};
use assockit_core::{Region, RegionPair};

/// Region of `rect` crossed by the segment `from`-`to`.
///
/// Edges are tested for a bounded intersection; hitting two adjacent edges
/// yields the corner between them. Returns [`Region::None`] when the segment
/// crosses no edge.
pub fn intersected_region(rect: &Rect, from: &Point, to: &Point) -> Region {
    let crosses = |region: Region| -> bool {
        match region.span_of(rect) {
            Some((start, end)) if region.is_edge() => {
                segment_intersection(from, to, &start, &end).is_some()
            }
            _ => false,
        }
    };

    let west = crosses(Region::West);
    let north = crosses(Region::North);
    let east = crosses(Region::East);
    let south = crosses(Region::South);

    let hit = |region: Region| -> bool {
        match region {
            Region::West => west,
            Region::North => north,
            Region::East => east,
            Region::South => south,
            Region::NorthWest => north && west,
            Region::NorthEast => north && east,
            Region::SouthEast => south && east,
            Region::SouthWest => south && west,
            Region::None => false,
        }
    };

    Region::ALL
        .iter()
        .copied()
        .filter(|region| hit(*region))
        .last()
        .unwrap_or(Region::None)
}

/// Regions occupied by the two ends of a connector, `first` on the role A
/// shape and `second` on the role B shape.
///
/// `points` are the connector's waypoints in scene coordinates. Returns
/// [`RegionPair::invalid`] while the path is too short to have ends (two
/// points, or four for a self-association). An end whose line crosses no
/// edge falls back to North.
pub fn determine_regions(
    a_rect: &Rect,
    b_rect: &Rect,
    points: &[Point],
    is_self: bool,
) -> RegionPair {
    let count = points.len();
    if (is_self && count < 4) || count < 2 {
        return RegionPair::invalid();
    }

    let a_center = a_rect.center();
    let b_center = b_rect.center();
    let (mut a_line, mut b_line) = ((a_center, b_center), (a_center, b_center));
    if count > 2 {
        a_line.1 = points[1];
        b_line.0 = points[count - 2];
    }

    let settle = |region: Region| {
        if region.is_none() {
            Region::North
        } else {
            region
        }
    };

    RegionPair::new(
        settle(intersected_region(a_rect, &a_line.0, &a_line.1)),
        settle(intersected_region(b_rect, &b_line.0, &b_line.1)),
    )
}

/// Four points of a fresh self-loop on `rect`: it leaves and re-enters at a
/// quarter and three quarters of the top edge and rises `min_height` above
/// the shape. When there is not enough room above the origin, the loop
/// hangs below the bottom edge instead.
pub fn initial_self_loop(rect: &Rect, min_height: f64) -> [Point; 4] {
    let left = rect.left() + 0.25 * rect.width;
    let right = rect.left() + 0.75 * rect.width;
    let draw_above = rect.top() >= min_height;
    let (y, offset) = if draw_above {
        (rect.top(), -min_height)
    } else {
        (rect.bottom(), min_height)
    };

    [
        Point::new(left, y),
        Point::new(left, y + offset),
        Point::new(right, y + offset),
        Point::new(right, y),
    ]
}
