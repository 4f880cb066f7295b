use assockit_core::geometry::{Point, Rect};
use assockit_core::{LayoutOptions, PathStyle, PersistenceError, Region, RegionPair, ShapeId};
use assockit_designer::{ConnectorPath, Diagram, DiagramError};
use tempfile::TempDir;

#[test]
fn test_linepath_round_trip() {
    let points = vec![
        Point::new(16.666666666666668, 0.0),
        Point::new(-3.25, 1e-7),
        Point::new(1234.5, -98.75),
        Point::new(16.666666666666668, 0.0),
    ];
    let original = ConnectorPath::from_points(points.clone(), PathStyle::default());
    let xml = original.to_xml().unwrap();

    let loaded = ConnectorPath::from_xml(&xml, PathStyle::default()).unwrap();
    assert_eq!(loaded.points(), points.as_slice());
    assert_eq!(loaded, original);
}

#[test]
fn test_empty_path_round_trip() {
    let xml = ConnectorPath::default().to_xml().unwrap();
    let loaded = ConnectorPath::from_xml(&xml, PathStyle::default()).unwrap();
    assert!(loaded.is_empty());
}

#[test]
fn test_load_replaces_existing_points() {
    let doc = roxmltree::Document::parse(
        r#"<connector><linepath><point x="1" y="2"/></linepath></connector>"#,
    )
    .unwrap();
    let linepath = doc.root_element().first_element_child().unwrap();

    let mut path = ConnectorPath::from_points(
        vec![Point::new(9.0, 9.0), Point::new(8.0, 8.0)],
        PathStyle::default(),
    );
    let revision = path.geometry_revision();
    path.load_from_persisted(linepath).unwrap();

    assert_eq!(path.points(), &[Point::new(1.0, 2.0)]);
    assert!(path.geometry_revision() > revision);
}

fn sample_diagram() -> Diagram {
    let mut diagram = Diagram::new("Orders & Items");
    let order = diagram.add_shape("Order", Rect::new(0.0, 100.0, 100.0, 40.0)).unwrap();
    let item = diagram.add_shape("Item <T>", Rect::new(300.0, 100.0, 80.0, 40.0)).unwrap();
    let customer = diagram.add_shape("Customer", Rect::new(0.0, 300.0, 100.0, 40.0)).unwrap();
    diagram.add_connector("items", order, item).unwrap();
    diagram.add_connector("buyer", order, customer).unwrap();
    diagram.add_connector("parent", order, order).unwrap();
    diagram
}

#[test]
fn test_diagram_round_trip() {
    let diagram = sample_diagram();
    let xml = diagram.to_xml().unwrap();
    let loaded = Diagram::from_xml(&xml, PathStyle::default(), LayoutOptions::default()).unwrap();

    assert_eq!(loaded.name, "Orders & Items");
    assert_eq!(loaded.created, diagram.created);
    assert_eq!(loaded.modified, diagram.modified);
    assert_eq!(loaded.shape_count(), 3);
    assert_eq!(loaded.connector_count(), 3);

    for shape in diagram.scene().shapes() {
        assert_eq!(loaded.shape(shape.id), Some(shape));
    }
    for connector in diagram.scene().connectors() {
        let other = loaded.connector(connector.id).unwrap();
        assert_eq!(other.name, connector.name);
        assert_eq!(other.shape_a, connector.shape_a);
        assert_eq!(other.shape_b, connector.shape_b);
        assert_eq!(other.path.points(), connector.path.points());
    }
}

#[test]
fn test_loaded_diagram_registers_connectors() {
    let diagram = sample_diagram();
    let xml = diagram.to_xml().unwrap();
    let loaded = Diagram::from_xml(&xml, PathStyle::default(), LayoutOptions::default()).unwrap();

    for shape in diagram.scene().shapes() {
        let original = diagram.manager(shape.id).unwrap();
        let restored = loaded.manager(shape.id).unwrap();
        assert_eq!(restored.all_connectors(), original.all_connectors());
        for c in original.all_connectors() {
            assert_eq!(restored.regions_of(c), original.regions_of(c));
        }
    }

    let order = diagram.scene().shapes().next().unwrap().id;
    let manager = loaded.manager(order).unwrap();
    assert!(manager
        .region_pairs()
        .contains(&RegionPair::self_loop(Region::North)));
}

#[test]
fn test_relayout_after_load_keeps_points() {
    let diagram = sample_diagram();
    let xml = diagram.to_xml().unwrap();
    let mut loaded =
        Diagram::from_xml(&xml, PathStyle::default(), LayoutOptions::default()).unwrap();
    loaded.relayout().unwrap();

    for connector in diagram.scene().connectors() {
        let other = loaded.connector(connector.id).unwrap();
        assert_eq!(other.path.points(), connector.path.points());
    }
}

#[test]
fn test_new_ids_continue_after_loaded_ones() {
    let diagram = sample_diagram();
    let xml = diagram.to_xml().unwrap();
    let mut loaded =
        Diagram::from_xml(&xml, PathStyle::default(), LayoutOptions::default()).unwrap();

    let shape = loaded.add_shape("Extra", Rect::new(600.0, 100.0, 50.0, 50.0)).unwrap();
    assert!(diagram.shape(shape).is_none());
    let existing = diagram.scene().shapes().next().unwrap().id;
    let c = loaded.add_connector("extra", existing, shape).unwrap();
    assert!(diagram.connector(c).is_none());
}

#[test]
fn test_largest_shape_id_is_rejected() {
    let xml = r#"<diagram name="d">
        <shape id="18446744073709551615" name="A" x="0" y="0" width="10" height="10"/>
      </diagram>"#;
    let err = Diagram::from_xml(xml, PathStyle::default(), LayoutOptions::default()).unwrap_err();
    assert!(matches!(
        err,
        DiagramError::IdentifiersExhausted {
            kind: "shape",
            id: u64::MAX
        }
    ));
}

#[test]
fn test_largest_connector_id_is_rejected() {
    let xml = r#"<diagram name="d">
        <shape id="1" name="A" x="0" y="0" width="10" height="10"/>
        <shape id="2" name="B" x="50" y="0" width="10" height="10"/>
        <connector id="18446744073709551615" name="ab" shape_a="1" shape_b="2">
          <linepath><point x="10" y="5"/><point x="50" y="5"/></linepath>
        </connector>
      </diagram>"#;
    let err = Diagram::from_xml(xml, PathStyle::default(), LayoutOptions::default()).unwrap_err();
    assert!(matches!(
        err,
        DiagramError::IdentifiersExhausted {
            kind: "connector",
            ..
        }
    ));
}

#[test]
fn test_add_shape_after_last_free_id_fails() {
    let xml = r#"<diagram name="d">
        <shape id="18446744073709551614" name="A" x="0" y="0" width="10" height="10"/>
      </diagram>"#;
    let mut loaded =
        Diagram::from_xml(xml, PathStyle::default(), LayoutOptions::default()).unwrap();
    assert!(loaded.shape(ShapeId(u64::MAX - 1)).is_some());

    let err = loaded
        .add_shape("B", Rect::new(50.0, 0.0, 10.0, 10.0))
        .unwrap_err();
    assert!(matches!(err, DiagramError::IdentifiersExhausted { .. }));
    assert_eq!(loaded.shape_count(), 1);
}

#[test]
fn test_save_and_load_file() {
    let dir = TempDir::new().unwrap();
    let file = dir.path().join("orders.xml");

    let diagram = sample_diagram();
    diagram.save_to_file(&file).unwrap();
    let loaded =
        Diagram::load_from_file(&file, PathStyle::default(), LayoutOptions::default()).unwrap();
    assert_eq!(loaded.connector_count(), 3);
}

#[test]
fn test_missing_file_is_io_error() {
    let dir = TempDir::new().unwrap();
    let err = Diagram::load_from_file(
        &dir.path().join("absent.xml"),
        PathStyle::default(),
        LayoutOptions::default(),
    )
    .unwrap_err();
    assert!(matches!(err, DiagramError::Io(_)));
}

#[test]
fn test_unknown_shape_reference() {
    let xml = r#"<diagram name="broken">
        <shape id="1" name="A" x="0" y="0" width="10" height="10"/>
        <connector id="1" name="dangling" shape_a="1" shape_b="7">
          <linepath><point x="5" y="5"/><point x="50" y="50"/></linepath>
        </connector>
      </diagram>"#;
    let err = Diagram::from_xml(xml, PathStyle::default(), LayoutOptions::default()).unwrap_err();
    assert!(matches!(
        err,
        DiagramError::Persistence(PersistenceError::UnknownReference { .. })
    ));
}

#[test]
fn test_wrong_root_element() {
    let err = Diagram::from_xml("<linepath/>", PathStyle::default(), LayoutOptions::default())
        .unwrap_err();
    assert!(matches!(
        err,
        DiagramError::Persistence(PersistenceError::MissingElement { .. })
    ));
}

#[test]
fn test_connector_without_linepath_loads_empty() {
    let xml = r#"<diagram name="bare">
        <shape id="1" name="A" x="0" y="0" width="10" height="10"/>
        <shape id="2" name="B" x="50" y="0" width="10" height="10"/>
        <connector id="3" name="ab" shape_a="1" shape_b="2"/>
      </diagram>"#;
    let loaded = Diagram::from_xml(xml, PathStyle::default(), LayoutOptions::default()).unwrap();
    let connector = loaded.connector(assockit_core::ConnectorId(3)).unwrap();
    assert!(connector.path.is_empty());
    assert!(!loaded
        .manager(assockit_core::ShapeId(1))
        .unwrap()
        .is_registered(connector.id));
}
