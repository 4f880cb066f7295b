//! Diagram scene: shapes, connectors and one space manager per shape.
//!
//! [`Diagram`] owns every entity. Space managers only hold identifiers and
//! reach shapes and connectors through the [`Scene`], which implements
//! [`ConnectorScene`].

use std::collections::{BTreeMap, BTreeSet, HashMap};

use chrono::{DateTime, Utc};

use assockit_core::geometry::{Point, Rect};
use assockit_core::{ConnectorId, LayoutOptions, PathStyle, RegionPair, Role, ShapeId};

use crate::connector_path::ConnectorPath;
use crate::error::{DiagramError, DiagramResult};
use crate::routing::{determine_regions, initial_self_loop};
use crate::space_manager::{ConnectorScene, RegionSpaceManager};

const SHAPE_KIND: &str = "shape";
const CONNECTOR_KIND: &str = "connector";

/// A box-like diagram element connectors attach to.
#[derive(Debug, Clone, PartialEq)]
pub struct Shape {
    pub id: ShapeId,
    pub name: String,
    /// Bounds in scene coordinates
    pub rect: Rect,
}

impl Shape {
    pub fn new(id: ShapeId, name: impl Into<String>, rect: Rect) -> Self {
        Self {
            id,
            name: name.into(),
            rect,
        }
    }
}

/// An association line between two shapes, possibly the same one.
#[derive(Debug, Clone)]
pub struct Connector {
    pub id: ConnectorId,
    pub name: String,
    pub shape_a: ShapeId,
    pub shape_b: ShapeId,
    /// Scene position of the path's local origin
    pub origin: Point,
    pub path: ConnectorPath,
}

impl Connector {
    pub fn new(
        id: ConnectorId,
        name: impl Into<String>,
        shape_a: ShapeId,
        shape_b: ShapeId,
        style: PathStyle,
    ) -> Self {
        Self {
            id,
            name: name.into(),
            shape_a,
            shape_b,
            origin: Point::default(),
            path: ConnectorPath::new(style),
        }
    }

    pub fn is_self(&self) -> bool {
        self.shape_a == self.shape_b
    }

    pub fn shape_for_role(&self, role: Role) -> ShapeId {
        match role {
            Role::A => self.shape_a,
            Role::B => self.shape_b,
        }
    }

    pub fn map_to_scene(&self, point: Point) -> Point {
        point + self.origin
    }

    pub fn map_from_scene(&self, point: Point) -> Point {
        point - self.origin
    }

    /// Waypoints in scene coordinates.
    pub fn scene_points(&self) -> Vec<Point> {
        self.path
            .points()
            .iter()
            .map(|p| self.map_to_scene(*p))
            .collect()
    }
}

/// Entity storage shared with the space managers.
#[derive(Debug, Clone, Default)]
pub struct Scene {
    shapes: BTreeMap<ShapeId, Shape>,
    connectors: BTreeMap<ConnectorId, Connector>,
}

impl Scene {
    pub fn shape(&self, id: ShapeId) -> Option<&Shape> {
        self.shapes.get(&id)
    }

    pub fn connector(&self, id: ConnectorId) -> Option<&Connector> {
        self.connectors.get(&id)
    }

    pub fn shapes(&self) -> impl Iterator<Item = &Shape> {
        self.shapes.values()
    }

    pub fn connectors(&self) -> impl Iterator<Item = &Connector> {
        self.connectors.values()
    }
}

impl ConnectorScene for Scene {
    fn shape_rect(&self, shape: ShapeId) -> Option<Rect> {
        self.shapes.get(&shape).map(|s| s.rect)
    }

    fn connector_shapes(&self, connector: ConnectorId) -> Option<(ShapeId, ShapeId)> {
        self.connectors
            .get(&connector)
            .map(|c| (c.shape_a, c.shape_b))
    }

    fn connector_path(&self, connector: ConnectorId) -> Option<&ConnectorPath> {
        self.connectors.get(&connector).map(|c| &c.path)
    }

    fn connector_path_mut(&mut self, connector: ConnectorId) -> Option<&mut ConnectorPath> {
        self.connectors.get_mut(&connector).map(|c| &mut c.path)
    }

    fn map_to_scene(&self, connector: ConnectorId, point: Point) -> Point {
        self.connectors
            .get(&connector)
            .map_or(point, |c| c.map_to_scene(point))
    }

    fn map_from_scene(&self, connector: ConnectorId, point: Point) -> Point {
        self.connectors
            .get(&connector)
            .map_or(point, |c| c.map_from_scene(point))
    }

    fn connector_name(&self, connector: ConnectorId) -> String {
        match self.connectors.get(&connector) {
            Some(c) if !c.name.is_empty() => c.name.clone(),
            _ => format!("#{}", connector),
        }
    }
}

/// A diagram of shapes joined by connectors whose ends are kept spread
/// along the shape boundaries.
#[derive(Debug, Clone)]
pub struct Diagram {
    pub name: String,
    pub created: DateTime<Utc>,
    pub modified: DateTime<Utc>,
    scene: Scene,
    managers: HashMap<ShapeId, RegionSpaceManager>,
    style: PathStyle,
    layout: LayoutOptions,
    next_shape_id: u64,
    next_connector_id: u64,
}

impl Diagram {
    pub fn new(name: impl Into<String>) -> Self {
        Self::with_options(name, PathStyle::default(), LayoutOptions::default())
    }

    pub fn with_options(name: impl Into<String>, style: PathStyle, layout: LayoutOptions) -> Self {
        let now = Utc::now();
        Self {
            name: name.into(),
            created: now,
            modified: now,
            scene: Scene::default(),
            managers: HashMap::new(),
            style,
            layout,
            next_shape_id: 1,
            next_connector_id: 1,
        }
    }

    pub fn scene(&self) -> &Scene {
        &self.scene
    }

    pub fn style(&self) -> &PathStyle {
        &self.style
    }

    pub fn layout(&self) -> &LayoutOptions {
        &self.layout
    }

    pub fn shape(&self, id: ShapeId) -> Option<&Shape> {
        self.scene.shape(id)
    }

    pub fn connector(&self, id: ConnectorId) -> Option<&Connector> {
        self.scene.connector(id)
    }

    /// Space manager of a shape.
    pub fn manager(&self, shape: ShapeId) -> Option<&RegionSpaceManager> {
        self.managers.get(&shape)
    }

    pub fn shape_count(&self) -> usize {
        self.scene.shapes.len()
    }

    pub fn connector_count(&self) -> usize {
        self.scene.connectors.len()
    }

    /// Connectors attached to `shape`, ordered by identifier.
    pub fn connectors_of(&self, shape: ShapeId) -> Vec<ConnectorId> {
        self.scene
            .connectors
            .values()
            .filter(|c| c.shape_a == shape || c.shape_b == shape)
            .map(|c| c.id)
            .collect()
    }

    pub fn add_shape(&mut self, name: impl Into<String>, rect: Rect) -> DiagramResult<ShapeId> {
        let id = ShapeId(self.next_shape_id);
        self.insert_shape(Shape::new(id, name, rect))?;
        self.touch();
        Ok(id)
    }

    /// Inserts a shape with a caller-chosen identifier.
    ///
    /// Fails when no identifier would be left for the next new shape.
    pub(crate) fn insert_shape(&mut self, shape: Shape) -> DiagramResult<()> {
        let id = shape.id;
        self.next_shape_id = self.next_shape_id.max(successor(SHAPE_KIND, id.0)?);
        self.managers
            .insert(id, RegionSpaceManager::with_options(id, self.layout));
        self.scene.shapes.insert(id, shape);
        Ok(())
    }

    /// Removes a shape together with every connector attached to it.
    pub fn remove_shape(&mut self, id: ShapeId) -> DiagramResult<Shape> {
        if !self.scene.shapes.contains_key(&id) {
            return Err(DiagramError::UnknownShape(id));
        }
        for connector in self.connectors_of(id) {
            self.remove_connector(connector)?;
        }
        self.managers.remove(&id);
        let shape = self
            .scene
            .shapes
            .remove(&id)
            .ok_or(DiagramError::UnknownShape(id))?;
        self.touch();
        Ok(shape)
    }

    /// Connects two shapes and lays out the new connector's ends.
    pub fn add_connector(
        &mut self,
        name: impl Into<String>,
        shape_a: ShapeId,
        shape_b: ShapeId,
    ) -> DiagramResult<ConnectorId> {
        for shape in [shape_a, shape_b] {
            if !self.scene.shapes.contains_key(&shape) {
                return Err(DiagramError::UnknownShape(shape));
            }
        }

        let id = ConnectorId(self.next_connector_id);
        self.next_connector_id = successor(CONNECTOR_KIND, id.0)?;
        let connector = Connector::new(id, name, shape_a, shape_b, self.style);
        tracing::debug!("Adding connector {} between {} and {}", id, shape_a, shape_b);
        self.scene.connectors.insert(id, connector);

        self.calculate_end_points(id)?;
        self.touch();
        Ok(id)
    }

    /// Inserts a connector with its stored path and registers it under the
    /// regions its path currently occupies. No end point is moved.
    pub(crate) fn insert_connector(&mut self, connector: Connector) -> DiagramResult<()> {
        for shape in [connector.shape_a, connector.shape_b] {
            if !self.scene.shapes.contains_key(&shape) {
                return Err(DiagramError::UnknownShape(shape));
            }
        }
        let id = connector.id;
        self.next_connector_id = self.next_connector_id.max(successor(CONNECTOR_KIND, id.0)?);
        self.scene.connectors.insert(id, connector);

        let (shape_a, shape_b, is_self) = self.ends_of(id)?;
        let regions = self.detect_regions(id)?;
        if !regions.is_valid() {
            tracing::debug!("Connector {} has too few points to register", id);
            return Ok(());
        }
        if is_self {
            self.manager_mut(shape_a)?.register(id, regions);
        } else {
            self.manager_mut(shape_a)?
                .register(id, RegionPair::single(regions.first));
            self.manager_mut(shape_b)?
                .register(id, RegionPair::single(regions.second));
        }
        Ok(())
    }

    /// Removes a connector and closes the gap it leaves on its shapes.
    pub fn remove_connector(&mut self, id: ConnectorId) -> DiagramResult<Connector> {
        let connector = self
            .scene
            .connectors
            .remove(&id)
            .ok_or(DiagramError::UnknownConnector(id))?;

        let mut shapes = vec![connector.shape_a];
        if !connector.is_self() {
            shapes.push(connector.shape_b);
        }
        for shape in shapes {
            if let Some(manager) = self.managers.get_mut(&shape) {
                let previous = manager.unregister(id);
                self.arrange_pairs(shape, [previous]);
            }
        }

        self.touch();
        Ok(connector)
    }

    /// Moves a shape and re-anchors its connectors.
    pub fn move_shape(&mut self, id: ShapeId, dx: f64, dy: f64) -> DiagramResult<()> {
        let shape = self
            .scene
            .shapes
            .get_mut(&id)
            .ok_or(DiagramError::UnknownShape(id))?;
        shape.rect = shape.rect.translated(dx, dy);
        self.relayout_shape(id)
    }

    /// Gives a shape new bounds and re-anchors its connectors.
    pub fn resize_shape(&mut self, id: ShapeId, rect: Rect) -> DiagramResult<()> {
        let shape = self
            .scene
            .shapes
            .get_mut(&id)
            .ok_or(DiagramError::UnknownShape(id))?;
        shape.rect = rect;
        self.relayout_shape(id)
    }

    /// Re-detects the regions of a connector's ends, moves its
    /// registrations and arranges every affected region pair once.
    pub fn calculate_end_points(&mut self, id: ConnectorId) -> DiagramResult<()> {
        let (shape_a, shape_b, is_self) = self.ends_of(id)?;
        self.ensure_initial_points(id)?;

        let regions = self.detect_regions(id)?;
        let previous_a = self.manager_mut(shape_a)?.unregister(id);

        if is_self {
            self.manager_mut(shape_a)?.register(id, regions);
            self.arrange_pairs(shape_a, [previous_a, regions]);
        } else {
            let previous_b = self.manager_mut(shape_b)?.unregister(id);
            let new_a = RegionPair::single(regions.first);
            let new_b = RegionPair::single(regions.second);
            self.manager_mut(shape_a)?.register(id, new_a);
            self.manager_mut(shape_b)?.register(id, new_b);
            self.arrange_pairs(shape_a, [previous_a, new_a]);
            self.arrange_pairs(shape_b, [previous_b, new_b]);
        }

        tracing::debug!("Connector {} now occupies {}", id, regions);
        Ok(())
    }

    /// Recomputes the end points of every connector, returning how many were
    /// processed.
    pub fn relayout(&mut self) -> DiagramResult<usize> {
        let ids: Vec<ConnectorId> = self.scene.connectors.keys().copied().collect();
        for id in &ids {
            self.calculate_end_points(*id)?;
        }
        self.touch();
        tracing::info!("Relaid out {} connectors of '{}'", ids.len(), self.name);
        Ok(ids.len())
    }

    /// Arranges every region pair of one shape.
    pub fn arrange_all_regions(&mut self, shape: ShapeId) -> DiagramResult<()> {
        let manager = self
            .managers
            .get_mut(&shape)
            .ok_or(DiagramError::UnknownShape(shape))?;
        manager.arrange_all_regions(&mut self.scene);
        Ok(())
    }

    fn relayout_shape(&mut self, id: ShapeId) -> DiagramResult<()> {
        for connector in self.connectors_of(id) {
            self.calculate_end_points(connector)?;
        }
        self.touch();
        Ok(())
    }

    /// Arranges `pairs` on `shape`, single regions first, then every
    /// cross-region pair since those sit between single-region neighbours.
    fn arrange_pairs(&mut self, shape: ShapeId, pairs: impl IntoIterator<Item = RegionPair>) {
        let Some(manager) = self.managers.get_mut(&shape) else {
            return;
        };
        let mut pending: BTreeSet<RegionPair> =
            pairs.into_iter().filter(RegionPair::is_valid).collect();
        pending.extend(
            manager
                .region_pairs()
                .into_iter()
                .filter(RegionPair::is_cross),
        );

        let (singles, others): (Vec<_>, Vec<_>) =
            pending.into_iter().partition(RegionPair::is_single);
        for regions in singles.into_iter().chain(others) {
            manager.arrange(regions, &mut self.scene);
        }
    }

    /// Gives a connector the minimum number of points it needs to have ends:
    /// two for an ordinary connector, four for a self-association.
    fn ensure_initial_points(&mut self, id: ConnectorId) -> DiagramResult<()> {
        let connector = self
            .scene
            .connectors
            .get(&id)
            .ok_or(DiagramError::UnknownConnector(id))?;
        let a_rect = self.shape_rect(connector.shape_a)?;
        let b_rect = self.shape_rect(connector.shape_b)?;
        let count = connector.path.count();

        if connector.is_self() && count < 4 {
            let local: Vec<Point> = initial_self_loop(&a_rect, self.layout.self_loop_min_height)
                .iter()
                .map(|p| connector.map_from_scene(*p))
                .collect();
            let path = &mut self.connector_mut(id)?.path;
            for index in count..local.len() {
                path.insert_point(index, Point::default())?;
            }
            for (index, point) in local.into_iter().enumerate() {
                path.set_point(index, point)?;
            }
        } else if !connector.is_self() && count < 2 {
            let start = connector.map_from_scene(a_rect.center());
            let end = connector.map_from_scene(b_rect.center());
            self.connector_mut(id)?.path.set_endpoints(start, end);
        }
        Ok(())
    }

    fn detect_regions(&self, id: ConnectorId) -> DiagramResult<RegionPair> {
        let connector = self
            .scene
            .connectors
            .get(&id)
            .ok_or(DiagramError::UnknownConnector(id))?;
        Ok(determine_regions(
            &self.shape_rect(connector.shape_a)?,
            &self.shape_rect(connector.shape_b)?,
            &connector.scene_points(),
            connector.is_self(),
        ))
    }

    fn ends_of(&self, id: ConnectorId) -> DiagramResult<(ShapeId, ShapeId, bool)> {
        self.scene
            .connectors
            .get(&id)
            .map(|c| (c.shape_a, c.shape_b, c.is_self()))
            .ok_or(DiagramError::UnknownConnector(id))
    }

    fn shape_rect(&self, id: ShapeId) -> DiagramResult<Rect> {
        self.scene
            .shape_rect(id)
            .ok_or(DiagramError::UnknownShape(id))
    }

    fn connector_mut(&mut self, id: ConnectorId) -> DiagramResult<&mut Connector> {
        self.scene
            .connectors
            .get_mut(&id)
            .ok_or(DiagramError::UnknownConnector(id))
    }

    fn manager_mut(&mut self, shape: ShapeId) -> DiagramResult<&mut RegionSpaceManager> {
        self.managers
            .get_mut(&shape)
            .ok_or(DiagramError::UnknownShape(shape))
    }

    fn touch(&mut self) {
        self.modified = Utc::now();
    }
}

/// Identifier handed out after `id`.
fn successor(kind: &'static str, id: u64) -> DiagramResult<u64> {
    id.checked_add(1)
        .ok_or(DiagramError::IdentifiersExhausted { kind, id })
}
