//! Region space manager.
//!
//! One [`RegionSpaceManager`] exists per shape. It remembers which region
//! pair every attached connector occupies on that shape and distributes the
//! connector ends along the shape boundary when asked to arrange a pair.
//!
//! The manager never owns shapes or connectors. Everything it needs is
//! looked up through a [`ConnectorScene`] at the time of the call, so a
//! connector deleted from the scene simply stops being positioned.

use std::collections::{BTreeMap, HashSet};

use assockit_core::geometry::{Point, Rect};
use assockit_core::{
    ConnectorId, LayoutOptions, PointPair, Region, RegionPair, Role, ShapeId, TieBreak,
};

use crate::connector_path::ConnectorPath;

/// Access to the shapes and connectors a manager arranges.
pub trait ConnectorScene {
    /// Bounding rectangle of a shape in scene coordinates.
    fn shape_rect(&self, shape: ShapeId) -> Option<Rect>;

    /// The shapes at the role A and role B ends of a connector.
    fn connector_shapes(&self, connector: ConnectorId) -> Option<(ShapeId, ShapeId)>;

    fn connector_path(&self, connector: ConnectorId) -> Option<&ConnectorPath>;

    fn connector_path_mut(&mut self, connector: ConnectorId) -> Option<&mut ConnectorPath>;

    /// Maps a point of the connector's path into scene coordinates.
    fn map_to_scene(&self, connector: ConnectorId, point: Point) -> Point;

    /// Maps a scene point into the connector's path coordinates.
    fn map_from_scene(&self, connector: ConnectorId, point: Point) -> Point;

    /// Human readable name used in diagnostics.
    fn connector_name(&self, connector: ConnectorId) -> String;

    /// Which end of `connector` is attached to `shape`. Role A wins for
    /// self-associations.
    fn role_for_shape(&self, connector: ConnectorId, shape: ShapeId) -> Option<Role> {
        let (a, b) = self.connector_shapes(connector)?;
        if a == shape {
            Some(Role::A)
        } else if b == shape {
            Some(Role::B)
        } else {
            None
        }
    }

    /// True when both ends attach to the same shape.
    fn is_self(&self, connector: ConnectorId) -> bool {
        matches!(self.connector_shapes(connector), Some((a, b)) if a == b)
    }
}

/// Path index of the end that belongs to `role`.
pub fn end_index(role: Role, count: usize) -> usize {
    match role {
        Role::A => 0,
        Role::B => count.saturating_sub(1),
    }
}

/// A connector waiting for its anchor during one arrangement pass.
#[derive(Debug, Clone, Copy)]
struct Slot {
    connector: ConnectorId,
    distance: f64,
    end_index: usize,
}

/// A computed anchor, in scene coordinates, not yet written to its path.
#[derive(Debug, Clone, Copy)]
struct Placement {
    connector: ConnectorId,
    end_index: usize,
    anchor: Point,
}

/// Keeps track of the connectors attached to one shape and lays out their
/// ends along the shape's boundary regions.
#[derive(Debug, Clone)]
pub struct RegionSpaceManager {
    shape: ShapeId,
    buckets: BTreeMap<RegionPair, Vec<ConnectorId>>,
    registered: HashSet<ConnectorId>,
    options: LayoutOptions,
}

impl RegionSpaceManager {
    pub fn new(shape: ShapeId) -> Self {
        Self::with_options(shape, LayoutOptions::default())
    }

    pub fn with_options(shape: ShapeId, options: LayoutOptions) -> Self {
        Self {
            shape,
            buckets: BTreeMap::new(),
            registered: HashSet::new(),
            options,
        }
    }

    /// The shape served by this manager.
    pub fn shape(&self) -> ShapeId {
        self.shape
    }

    pub fn options(&self) -> &LayoutOptions {
        &self.options
    }

    pub fn set_options(&mut self, options: LayoutOptions) {
        self.options = options;
    }

    /// Registers `connector` under `regions`.
    ///
    /// Invalid pairs are ignored. Registering a connector twice keeps the
    /// first registration. No anchor is moved until [`arrange`](Self::arrange).
    pub fn register(&mut self, connector: ConnectorId, regions: RegionPair) {
        if !regions.is_valid() {
            return;
        }
        if self.registered.contains(&connector) {
            tracing::debug!(
                "Connector {} is already registered on shape {}",
                connector,
                self.shape
            );
            return;
        }
        self.buckets.entry(regions).or_default().push(connector);
        self.registered.insert(connector);
    }

    /// Removes `connector` and returns the pair it occupied, or
    /// [`RegionPair::invalid`] when it was not registered.
    pub fn unregister(&mut self, connector: ConnectorId) -> RegionPair {
        if !self.registered.remove(&connector) {
            tracing::debug!(
                "Connector {} is not registered on shape {}",
                connector,
                self.shape
            );
            return RegionPair::invalid();
        }

        let regions = self.regions_of(connector);
        if let Some(bucket) = self.buckets.get_mut(&regions) {
            bucket.retain(|c| *c != connector);
            if bucket.is_empty() {
                self.buckets.remove(&regions);
            }
        }
        regions
    }

    /// The pair currently holding `connector`.
    pub fn regions_of(&self, connector: ConnectorId) -> RegionPair {
        self.buckets
            .iter()
            .find(|(_, bucket)| bucket.contains(&connector))
            .map(|(regions, _)| *regions)
            .unwrap_or_else(RegionPair::invalid)
    }

    pub fn is_registered(&self, connector: ConnectorId) -> bool {
        self.registered.contains(&connector)
    }

    /// Every registered connector, ordered by identifier.
    pub fn all_connectors(&self) -> Vec<ConnectorId> {
        let mut all: Vec<ConnectorId> = self.registered.iter().copied().collect();
        all.sort();
        all
    }

    /// Connectors of one pair in their current order.
    pub fn connectors_in(&self, regions: RegionPair) -> &[ConnectorId] {
        self.buckets
            .get(&regions)
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    /// Pairs with at least one connector, in key order.
    pub fn region_pairs(&self) -> Vec<RegionPair> {
        self.buckets.keys().copied().collect()
    }

    pub fn len(&self) -> usize {
        self.registered.len()
    }

    pub fn is_empty(&self) -> bool {
        self.registered.is_empty()
    }

    /// Points standing in for the direction from which `connector`
    /// approaches the shape, in scene coordinates.
    ///
    /// A routed line uses the waypoint next to its end on this shape, a
    /// straight line uses the centre of the shape at its other end; both
    /// slots carry that point. A self-association reports the waypoints
    /// next to each of its ends.
    pub fn reference_points<S>(&self, connector: ConnectorId, scene: &S) -> Option<PointPair>
    where
        S: ConnectorScene + ?Sized,
    {
        let path = scene.connector_path(connector)?;
        let count = path.count();

        if scene.is_self(connector) {
            if count < 4 {
                tracing::debug!(
                    "Self-association {} has only {} points",
                    scene.connector_name(connector),
                    count
                );
                return None;
            }
            let first = path.point_at(1).ok()?;
            let second = path.point_at(count - 2).ok()?;
            return Some(PointPair::new(
                scene.map_to_scene(connector, first),
                scene.map_to_scene(connector, second),
            ));
        }

        let role = scene.role_for_shape(connector, self.shape)?;
        let reference = match count {
            0 | 1 => {
                tracing::debug!(
                    "Connector {} has no end points yet",
                    scene.connector_name(connector)
                );
                return None;
            }
            2 => {
                let (a, b) = scene.connector_shapes(connector)?;
                let other = match role {
                    Role::A => b,
                    Role::B => a,
                };
                scene.shape_rect(other)?.center()
            }
            _ => {
                let index = match role {
                    Role::A => 1,
                    Role::B => count - 2,
                };
                scene.map_to_scene(connector, path.point_at(index).ok()?)
            }
        };
        Some(PointPair::new(reference, reference))
    }

    /// Recomputes the anchors of every connector registered under `regions`.
    ///
    /// Connectors of other pairs are left alone.
    pub fn arrange<S>(&mut self, regions: RegionPair, scene: &mut S)
    where
        S: ConnectorScene + ?Sized,
    {
        if !regions.is_valid() {
            return;
        }
        let Some(rect) = scene.shape_rect(self.shape) else {
            tracing::warn!("Shape {} has no geometry, skipping arrangement", self.shape);
            return;
        };
        let bucket = self.connectors_in(regions).to_vec();
        if bucket.is_empty() {
            return;
        }

        let placements = if regions.is_single() {
            let (order, placements) = self.layout_single(regions.first, &bucket, &rect, &*scene);
            self.buckets.insert(regions, order);
            placements
        } else if regions.is_self_loop() {
            self.layout_self_loops(regions.first, &bucket, &rect, &*scene)
        } else {
            self.layout_cross(regions, &bucket, &rect, &*scene)
        };

        tracing::debug!(
            "Arranged {} connector ends on {} of shape {}",
            placements.len(),
            regions,
            self.shape
        );
        apply(placements, scene);
    }

    /// Arranges every pair: single regions first so that cross-region
    /// connectors see their neighbours' final anchors.
    pub fn arrange_all_regions<S>(&mut self, scene: &mut S)
    where
        S: ConnectorScene + ?Sized,
    {
        let (singles, others): (Vec<_>, Vec<_>) = self
            .region_pairs()
            .into_iter()
            .partition(RegionPair::is_single);
        for regions in singles.into_iter().chain(others) {
            self.arrange(regions, scene);
        }
    }

    /// Orders `bucket` along `region` and spreads the ends over equal slots.
    fn layout_single<S>(
        &self,
        region: Region,
        bucket: &[ConnectorId],
        rect: &Rect,
        scene: &S,
    ) -> (Vec<ConnectorId>, Vec<Placement>)
    where
        S: ConnectorScene + ?Sized,
    {
        let (sorted, unresolved) = self.sorted_slots(region, bucket, scene);

        let x_basis = region.is_x_basis();
        let total = if x_basis { rect.width } else { rect.height };
        let slot_size = total / sorted.len().max(1) as f64;
        let mut pos = 0.5 * slot_size + if x_basis { rect.left() } else { rect.top() };

        let mut placements = Vec::with_capacity(sorted.len());
        for slot in &sorted {
            let anchor = match region {
                Region::North => Point::new(pos, rect.top()),
                Region::South => Point::new(pos, rect.bottom()),
                Region::West => Point::new(rect.left(), pos),
                Region::East => Point::new(rect.right(), pos),
                corner => match corner.corner_of(rect) {
                    Some(p) => p,
                    None => continue,
                },
            };
            placements.push(Placement {
                connector: slot.connector,
                end_index: slot.end_index,
                anchor,
            });
            pos += slot_size;
        }

        let order = sorted
            .iter()
            .map(|s| s.connector)
            .chain(unresolved)
            .collect();
        (order, placements)
    }

    /// Both ends of each self-loop at a quarter and three quarters of the
    /// edge; corners pin both ends to the corner.
    fn layout_self_loops<S>(
        &self,
        region: Region,
        bucket: &[ConnectorId],
        rect: &Rect,
        scene: &S,
    ) -> Vec<Placement>
    where
        S: ConnectorScene + ?Sized,
    {
        let (Some(start), Some(end)) = (region.point_along(rect, 0.25), region.point_along(rect, 0.75))
        else {
            return Vec::new();
        };

        let mut placements = Vec::with_capacity(bucket.len() * 2);
        for &connector in bucket {
            let Some(path) = scene.connector_path(connector) else {
                continue;
            };
            let count = path.count();
            if count < 2 {
                tracing::debug!(
                    "Self-association {} has no end points yet",
                    scene.connector_name(connector)
                );
                continue;
            }
            placements.push(Placement {
                connector,
                end_index: end_index(Role::A, count),
                anchor: start,
            });
            placements.push(Placement {
                connector,
                end_index: end_index(Role::B, count),
                anchor: end,
            });
        }
        placements
    }

    /// Each end of a connector spanning two regions goes halfway between its
    /// neighbours in the single-region bucket of that end's region.
    fn layout_cross<S>(
        &self,
        regions: RegionPair,
        bucket: &[ConnectorId],
        rect: &Rect,
        scene: &S,
    ) -> Vec<Placement>
    where
        S: ConnectorScene + ?Sized,
    {
        let mut placements = Vec::with_capacity(bucket.len() * 2);
        for &connector in bucket {
            let Some(references) = self.reference_points(connector, scene) else {
                continue;
            };
            let Some(count) = scene.connector_path(connector).map(ConnectorPath::count) else {
                continue;
            };

            for role in [Role::A, Role::B] {
                let region = regions[role];
                if let Some(anchor) = self.between_neighbours(region, references[role], rect, scene)
                {
                    placements.push(Placement {
                        connector,
                        end_index: end_index(role, count),
                        anchor,
                    });
                }
            }
        }
        placements
    }

    /// Midpoint of the anchors placed just before and just after `reference`
    /// on `region`. A missing neighbour is replaced by the end of the span
    /// on that side.
    fn between_neighbours<S>(
        &self,
        region: Region,
        reference: Point,
        rect: &Rect,
        scene: &S,
    ) -> Option<Point>
    where
        S: ConnectorScene + ?Sized,
    {
        let (span_start, span_end) = region.span_of(rect)?;
        let distance = coordinate(region, &reference);
        let single = RegionPair::single(region);
        let (sorted, _) = self.sorted_slots(region, self.connectors_in(single), scene);

        let split = sorted.partition_point(|slot| slot.distance <= distance);
        let previous = split
            .checked_sub(1)
            .and_then(|i| sorted.get(i))
            .and_then(|slot| placed_anchor(slot, scene))
            .unwrap_or(span_start);
        let next = sorted
            .get(split)
            .and_then(|slot| placed_anchor(slot, scene))
            .unwrap_or(span_end);

        Some(previous.midpoint(&next))
    }

    /// Builds the ordered slot list for `bucket` with a linear scan and
    /// insert. Connectors without a usable reference are returned
    /// separately, in their original order.
    fn sorted_slots<S>(
        &self,
        region: Region,
        bucket: &[ConnectorId],
        scene: &S,
    ) -> (Vec<Slot>, Vec<ConnectorId>)
    where
        S: ConnectorScene + ?Sized,
    {
        let mut sorted: Vec<Slot> = Vec::with_capacity(bucket.len());
        let mut unresolved = Vec::new();

        for &connector in bucket {
            let resolved = self.reference_points(connector, scene).and_then(|refs| {
                let role = scene.role_for_shape(connector, self.shape)?;
                let count = scene.connector_path(connector)?.count();
                Some(Slot {
                    connector,
                    distance: coordinate(region, &refs[role]),
                    end_index: end_index(role, count),
                })
            });
            let Some(slot) = resolved else {
                unresolved.push(connector);
                continue;
            };

            let mut i = 0;
            while i < sorted.len() && self.goes_before(&sorted[i], &slot) {
                i += 1;
            }
            sorted.insert(i, slot);
        }

        (sorted, unresolved)
    }

    /// True when `placed` stays ahead of `incoming`. Equal distances keep
    /// encounter order unless ties are broken by identifier.
    fn goes_before(&self, placed: &Slot, incoming: &Slot) -> bool {
        if placed.distance != incoming.distance {
            return placed.distance < incoming.distance;
        }
        match self.options.tie_break {
            TieBreak::EncounterOrder => true,
            TieBreak::ConnectorId => placed.connector < incoming.connector,
        }
    }
}

/// Coordinate that varies along `region`.
fn coordinate(region: Region, point: &Point) -> f64 {
    if region.is_x_basis() {
        point.x
    } else {
        point.y
    }
}

/// Current anchor of a slot's end, in scene coordinates.
fn placed_anchor<S>(slot: &Slot, scene: &S) -> Option<Point>
where
    S: ConnectorScene + ?Sized,
{
    let local = scene
        .connector_path(slot.connector)?
        .point_at(slot.end_index)
        .ok()?;
    Some(scene.map_to_scene(slot.connector, local))
}

fn apply<S>(placements: Vec<Placement>, scene: &mut S)
where
    S: ConnectorScene + ?Sized,
{
    for placement in placements {
        let local = scene.map_from_scene(placement.connector, placement.anchor);
        let Some(path) = scene.connector_path_mut(placement.connector) else {
            continue;
        };
        if let Err(e) = path.set_point(placement.end_index, local) {
            tracing::warn!("Failed to move end of connector {}: {}", placement.connector, e);
        }
    }
}
