use std::collections::HashMap;

use assockit_core::geometry::{Point, Rect};
use assockit_core::{ConnectorId, PathStyle, Region, RegionPair, Role, ShapeId};
use assockit_designer::{ConnectorPath, ConnectorScene, RegionSpaceManager};

const HOST: ShapeId = ShapeId(1);

/// A 100x40 host shape at the origin and connectors resolved by id.
struct TestScene {
    shapes: HashMap<ShapeId, Rect>,
    connectors: HashMap<ConnectorId, (ShapeId, ShapeId, ConnectorPath)>,
    /// Scene offset of every connector's local coordinates
    origin: Point,
}

impl TestScene {
    fn new() -> Self {
        let mut shapes = HashMap::new();
        shapes.insert(HOST, Rect::new(0.0, 0.0, 100.0, 40.0));
        Self {
            shapes,
            connectors: HashMap::new(),
            origin: Point::default(),
        }
    }

    /// A straight connector from the host to a small shape centred on `remote`.
    fn straight(&mut self, id: u64, remote: Point) -> ConnectorId {
        let shape = ShapeId(1000 + id);
        self.shapes
            .insert(shape, Rect::new(remote.x - 5.0, remote.y - 5.0, 10.0, 10.0));
        let path = ConnectorPath::from_points(vec![Point::default(), remote], PathStyle::default());
        self.connectors.insert(ConnectorId(id), (HOST, shape, path));
        ConnectorId(id)
    }

    /// A self-association on the host with the given waypoints.
    fn self_loop(&mut self, id: u64, points: &[(f64, f64)]) -> ConnectorId {
        let path = ConnectorPath::from_points(
            points.iter().map(|&(x, y)| Point::new(x, y)).collect(),
            PathStyle::default(),
        );
        self.connectors.insert(ConnectorId(id), (HOST, HOST, path));
        ConnectorId(id)
    }

    fn end(&self, connector: ConnectorId, role: Role) -> Point {
        let path = self.connector_path(connector).unwrap();
        let index = match role {
            Role::A => 0,
            Role::B => path.count() - 1,
        };
        self.map_to_scene(connector, path.point_at(index).unwrap())
    }
}

impl ConnectorScene for TestScene {
    fn shape_rect(&self, shape: ShapeId) -> Option<Rect> {
        self.shapes.get(&shape).copied()
    }

    fn connector_shapes(&self, connector: ConnectorId) -> Option<(ShapeId, ShapeId)> {
        self.connectors.get(&connector).map(|(a, b, _)| (*a, *b))
    }

    fn connector_path(&self, connector: ConnectorId) -> Option<&ConnectorPath> {
        self.connectors.get(&connector).map(|(_, _, p)| p)
    }

    fn connector_path_mut(&mut self, connector: ConnectorId) -> Option<&mut ConnectorPath> {
        self.connectors.get_mut(&connector).map(|(_, _, p)| p)
    }

    fn map_to_scene(&self, _connector: ConnectorId, point: Point) -> Point {
        point + self.origin
    }

    fn map_from_scene(&self, _connector: ConnectorId, point: Point) -> Point {
        point - self.origin
    }

    fn connector_name(&self, connector: ConnectorId) -> String {
        format!("assoc-{}", connector)
    }
}

fn assert_close(actual: Point, expected: (f64, f64)) {
    assert!(
        (actual.x - expected.0).abs() < 1e-3 && (actual.y - expected.1).abs() < 1e-3,
        "expected ({}, {}), got ({}, {})",
        expected.0,
        expected.1,
        actual.x,
        actual.y
    );
}

#[test]
fn test_register_then_regions_of() {
    let mut manager = RegionSpaceManager::new(HOST);
    let pairs = [
        RegionPair::single(Region::North),
        RegionPair::single(Region::SouthWest),
        RegionPair::self_loop(Region::East),
        RegionPair::new(Region::North, Region::West),
    ];
    for (i, pair) in pairs.iter().enumerate() {
        let c = ConnectorId(i as u64);
        manager.register(c, *pair);
        assert_eq!(manager.regions_of(c), *pair);
        assert!(manager.is_registered(c));
    }
    assert_eq!(manager.len(), pairs.len());
}

#[test]
fn test_unregister_returns_registered_pair() {
    let mut manager = RegionSpaceManager::new(HOST);
    let c = ConnectorId(3);
    manager.register(c, RegionPair::single(Region::West));

    assert_eq!(manager.unregister(c), RegionPair::single(Region::West));
    assert!(!manager.is_registered(c));
    assert_eq!(manager.regions_of(c), RegionPair::invalid());
}

#[test]
fn test_unregister_unknown_returns_sentinel() {
    let mut manager = RegionSpaceManager::new(HOST);
    let result = manager.unregister(ConnectorId(42));
    assert_eq!(result, RegionPair::invalid());
    assert!(!result.is_valid());
}

#[test]
fn test_register_is_idempotent() {
    let mut manager = RegionSpaceManager::new(HOST);
    let c = ConnectorId(1);
    manager.register(c, RegionPair::single(Region::North));
    manager.register(c, RegionPair::single(Region::South));
    manager.register(c, RegionPair::single(Region::North));

    assert_eq!(manager.regions_of(c), RegionPair::single(Region::North));
    assert_eq!(manager.connectors_in(RegionPair::single(Region::North)), &[c]);
    assert!(manager
        .connectors_in(RegionPair::single(Region::South))
        .is_empty());
    assert_eq!(manager.all_connectors(), vec![c]);
}

#[test]
fn test_invalid_pair_is_silently_ignored() {
    let mut manager = RegionSpaceManager::new(HOST);
    manager.register(ConnectorId(1), RegionPair::new(Region::None, Region::East));
    assert!(manager.is_empty());

    let mut scene = TestScene::new();
    manager.arrange(RegionPair::invalid(), &mut scene);
}

#[test]
fn test_all_connectors_sorted() {
    let mut manager = RegionSpaceManager::new(HOST);
    for id in [5, 1, 3] {
        manager.register(ConnectorId(id), RegionPair::single(Region::East));
    }
    assert_eq!(
        manager.all_connectors(),
        vec![ConnectorId(1), ConnectorId(3), ConnectorId(5)]
    );
}

#[test]
fn test_three_connectors_on_north() {
    let mut scene = TestScene::new();
    let c90 = scene.straight(1, Point::new(90.0, -100.0));
    let c10 = scene.straight(2, Point::new(10.0, -100.0));
    let c50 = scene.straight(3, Point::new(50.0, -100.0));

    let north = RegionPair::single(Region::North);
    let mut manager = RegionSpaceManager::new(HOST);
    for c in [c90, c10, c50] {
        manager.register(c, north);
    }
    manager.arrange(north, &mut scene);

    assert_close(scene.end(c10, Role::A), (16.667, 0.0));
    assert_close(scene.end(c50, Role::A), (50.0, 0.0));
    assert_close(scene.end(c90, Role::A), (83.333, 0.0));
    assert_eq!(manager.connectors_in(north), &[c10, c50, c90]);
}

#[test]
fn test_single_connector_sits_at_edge_midpoint() {
    let mut scene = TestScene::new();
    let north = scene.straight(1, Point::new(70.0, -80.0));
    let east = scene.straight(2, Point::new(300.0, 5.0));

    let mut manager = RegionSpaceManager::new(HOST);
    manager.register(north, RegionPair::single(Region::North));
    manager.register(east, RegionPair::single(Region::East));
    manager.arrange_all_regions(&mut scene);

    assert_close(scene.end(north, Role::A), (50.0, 0.0));
    assert_close(scene.end(east, Role::A), (100.0, 20.0));
}

#[test]
fn test_anchors_are_monotonic_along_edge() {
    let mut scene = TestScene::new();
    let references = [33.0, -12.0, 87.0, 5.0, 61.0, 140.0];
    let mut manager = RegionSpaceManager::new(HOST);
    let west = RegionPair::single(Region::West);
    for (i, y) in references.iter().enumerate() {
        let c = scene.straight(i as u64 + 1, Point::new(-200.0, *y));
        manager.register(c, west);
    }
    manager.arrange(west, &mut scene);

    let order = manager.connectors_in(west).to_vec();
    let ends: Vec<Point> = order.iter().map(|c| scene.end(*c, Role::A)).collect();
    for pair in ends.windows(2) {
        assert!(pair[0].y < pair[1].y);
        assert_eq!(pair[0].x, 0.0);
    }

    let mut sorted = references.to_vec();
    sorted.sort_by(|a, b| a.partial_cmp(b).unwrap());
    let arranged: Vec<f64> = order
        .iter()
        .map(|c| {
            let path = scene.connector_path(*c).unwrap();
            path.point_at(1).unwrap().y
        })
        .collect();
    assert_eq!(arranged, sorted);
}

#[test]
fn test_ties_preserve_registration_order() {
    let mut scene = TestScene::new();
    let first = scene.straight(7, Point::new(50.0, -100.0));
    let second = scene.straight(2, Point::new(50.0, -300.0));
    let third = scene.straight(4, Point::new(50.0, -200.0));

    let north = RegionPair::single(Region::North);
    let mut manager = RegionSpaceManager::new(HOST);
    for c in [first, second, third] {
        manager.register(c, north);
    }
    manager.arrange(north, &mut scene);
    assert_eq!(manager.connectors_in(north), &[first, second, third]);

    // A second pass keeps the order reached by the first one.
    manager.arrange(north, &mut scene);
    assert_eq!(manager.connectors_in(north), &[first, second, third]);
}

#[test]
fn test_self_loop_on_north() {
    let mut scene = TestScene::new();
    let c = scene.self_loop(1, &[(20.0, 0.0), (20.0, -30.0), (80.0, -30.0), (80.0, 0.0)]);
    let mut manager = RegionSpaceManager::new(HOST);
    manager.register(c, RegionPair::self_loop(Region::North));
    manager.arrange(RegionPair::self_loop(Region::North), &mut scene);

    assert_close(scene.end(c, Role::A), (25.0, 0.0));
    assert_close(scene.end(c, Role::B), (75.0, 0.0));
    let path = scene.connector_path(c).unwrap();
    assert_eq!(path.point_at(1), Ok(Point::new(20.0, -30.0)));
}

#[test]
fn test_self_loop_on_east_edge() {
    let mut scene = TestScene::new();
    let c = scene.self_loop(1, &[(100.0, 0.0), (130.0, 0.0), (130.0, 40.0), (100.0, 40.0)]);
    let mut manager = RegionSpaceManager::new(HOST);
    manager.register(c, RegionPair::self_loop(Region::East));
    manager.arrange(RegionPair::self_loop(Region::East), &mut scene);

    assert_close(scene.end(c, Role::A), (100.0, 10.0));
    assert_close(scene.end(c, Role::B), (100.0, 30.0));
}

#[test]
fn test_self_loop_in_corner() {
    let mut scene = TestScene::new();
    let c = scene.self_loop(1, &[(0.0, 0.0), (-20.0, 0.0), (-20.0, -20.0), (0.0, -20.0)]);
    let mut manager = RegionSpaceManager::new(HOST);
    manager.register(c, RegionPair::self_loop(Region::NorthWest));
    manager.arrange(RegionPair::self_loop(Region::NorthWest), &mut scene);

    assert_close(scene.end(c, Role::A), (0.0, 0.0));
    assert_close(scene.end(c, Role::B), (0.0, 0.0));
}

#[test]
fn test_cross_region_sits_between_neighbours() {
    let mut scene = TestScene::new();
    let north = scene.straight(1, Point::new(20.0, -100.0));
    let cross = scene.self_loop(
        2,
        &[(90.0, 0.0), (80.0, -30.0), (130.0, 30.0), (100.0, 30.0)],
    );

    let mut manager = RegionSpaceManager::new(HOST);
    manager.register(north, RegionPair::single(Region::North));
    let pair = RegionPair::new(Region::North, Region::East);
    manager.register(cross, pair);
    manager.arrange_all_regions(&mut scene);

    assert_close(scene.end(north, Role::A), (50.0, 0.0));
    // Between the north neighbour and the north-east corner.
    assert_close(scene.end(cross, Role::A), (75.0, 0.0));
    // No east neighbours: halfway along the east edge.
    assert_close(scene.end(cross, Role::B), (100.0, 20.0));
}

#[test]
fn test_cross_region_before_first_neighbour_uses_span_start() {
    let mut scene = TestScene::new();
    let north = scene.straight(1, Point::new(60.0, -100.0));
    let cross = scene.self_loop(
        2,
        &[(10.0, 0.0), (5.0, -30.0), (-30.0, 30.0), (0.0, 30.0)],
    );

    let mut manager = RegionSpaceManager::new(HOST);
    manager.register(north, RegionPair::single(Region::North));
    manager.register(cross, RegionPair::new(Region::North, Region::West));
    manager.arrange_all_regions(&mut scene);

    assert_close(scene.end(cross, Role::A), (25.0, 0.0));
    assert_close(scene.end(cross, Role::B), (0.0, 20.0));
}

#[test]
fn test_arrange_writes_in_connector_coordinates() {
    let mut scene = TestScene::new();
    scene.origin = Point::new(10.0, 10.0);
    let c = scene.straight(1, Point::new(50.0, -100.0));

    let mut manager = RegionSpaceManager::new(HOST);
    manager.register(c, RegionPair::single(Region::North));
    manager.arrange(RegionPair::single(Region::North), &mut scene);

    let local = scene.connector_path(c).unwrap().point_at(0).unwrap();
    assert_eq!(local, Point::new(40.0, -10.0));
    assert_close(scene.end(c, Role::A), (50.0, 0.0));
}

#[test]
fn test_reference_points() {
    let mut scene = TestScene::new();
    let straight = scene.straight(1, Point::new(30.0, -100.0));
    let routed = scene.straight(2, Point::new(300.0, 300.0));
    scene
        .connector_path_mut(routed)
        .unwrap()
        .insert_point(1, Point::new(70.0, -50.0))
        .unwrap();
    let looped = scene.self_loop(3, &[(20.0, 0.0), (20.0, -30.0), (80.0, -30.0), (80.0, 0.0)]);

    let manager = RegionSpaceManager::new(HOST);

    let refs = manager.reference_points(straight, &scene).unwrap();
    assert_eq!(refs[Role::A], Point::new(30.0, -100.0));

    let refs = manager.reference_points(routed, &scene).unwrap();
    assert_eq!(refs[Role::A], Point::new(70.0, -50.0));

    let refs = manager.reference_points(looped, &scene).unwrap();
    assert_eq!(refs[Role::A], Point::new(20.0, -30.0));
    assert_eq!(refs[Role::B], Point::new(80.0, -30.0));

    assert!(manager.reference_points(ConnectorId(99), &scene).is_none());
}

#[test]
fn test_arrange_skips_deleted_connectors() {
    let mut scene = TestScene::new();
    let kept = scene.straight(1, Point::new(10.0, -100.0));
    let gone = scene.straight(2, Point::new(90.0, -100.0));

    let north = RegionPair::single(Region::North);
    let mut manager = RegionSpaceManager::new(HOST);
    manager.register(kept, north);
    manager.register(gone, north);
    scene.connectors.remove(&gone);

    manager.arrange(north, &mut scene);
    assert_close(scene.end(kept, Role::A), (50.0, 0.0));
    assert_eq!(manager.connectors_in(north), &[kept, gone]);
}
