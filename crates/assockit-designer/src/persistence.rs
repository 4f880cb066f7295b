//! XML persistence for connector paths and whole diagrams.
//!
//! A connector path is stored as
//!
//! ```xml
//! <linepath>
//!   <point x="10" y="0"/>
//!   <point x="10" y="-30"/>
//! </linepath>
//! ```
//!
//! and a diagram document wraps shapes and connectors:
//!
//! ```xml
//! <diagram name="classes" created="..." modified="...">
//!   <shape id="1" name="Order" x="0" y="0" width="100" height="40"/>
//!   <connector id="1" name="items" shape_a="1" shape_b="2" x="0" y="0">
//!     <linepath>...</linepath>
//!   </connector>
//! </diagram>
//! ```
//!
//! Documents are written with `quick-xml` and read with `roxmltree`.
//! Coordinates that fail to parse load as 0.

use std::io::Write;
use std::path::Path;

use chrono::{DateTime, Utc};
use quick_xml::events::{BytesDecl, BytesEnd, BytesStart, Event};
use quick_xml::Writer;
use roxmltree::{Document, Node};

use assockit_core::geometry::{Point, Rect};
use assockit_core::{ConnectorId, LayoutOptions, PathStyle, PersistenceError, ShapeId};

use crate::connector_path::ConnectorPath;
use crate::diagram::{Connector, Diagram, Shape};
use crate::error::{DiagramError, DiagramResult};

pub const LINEPATH_TAG: &str = "linepath";
pub const POINT_TAG: &str = "point";
pub const DIAGRAM_TAG: &str = "diagram";
pub const SHAPE_TAG: &str = "shape";
pub const CONNECTOR_TAG: &str = "connector";

impl ConnectorPath {
    /// Writes the points as a `<linepath>` element.
    pub fn save_to_persisted<W: Write>(
        &self,
        writer: &mut Writer<W>,
    ) -> Result<(), PersistenceError> {
        if self.is_empty() {
            return write_event(writer, Event::Empty(BytesStart::new(LINEPATH_TAG)));
        }

        write_event(writer, Event::Start(BytesStart::new(LINEPATH_TAG)))?;
        for p in self.points() {
            let mut elem = BytesStart::new(POINT_TAG);
            elem.push_attribute(("x", p.x.to_string().as_str()));
            elem.push_attribute(("y", p.y.to_string().as_str()));
            write_event(writer, Event::Empty(elem))?;
        }
        write_event(writer, Event::End(BytesEnd::new(LINEPATH_TAG)))
    }

    /// Replaces the points with the `<point>` children of a `<linepath>`
    /// element, in document order.
    pub fn load_from_persisted(&mut self, element: Node<'_, '_>) -> Result<(), PersistenceError> {
        if !element.has_tag_name(LINEPATH_TAG) {
            return Err(PersistenceError::MissingElement {
                element: LINEPATH_TAG.to_string(),
            });
        }
        let points = element
            .children()
            .filter(|node| node.has_tag_name(POINT_TAG))
            .map(|node| Point::new(coordinate(node, "x"), coordinate(node, "y")))
            .collect();
        self.replace_points(points);
        Ok(())
    }

    /// Serializes the path as a standalone `<linepath>` document.
    pub fn to_xml(&self) -> Result<String, PersistenceError> {
        let mut writer = Writer::new_with_indent(Vec::new(), b' ', 2);
        self.save_to_persisted(&mut writer)?;
        into_string(writer)
    }

    /// Parses a standalone `<linepath>` document.
    pub fn from_xml(xml: &str, style: PathStyle) -> Result<Self, PersistenceError> {
        let doc = Document::parse(xml).map_err(malformed)?;
        let mut path = ConnectorPath::new(style);
        path.load_from_persisted(doc.root_element())?;
        Ok(path)
    }
}

impl Diagram {
    /// Serializes the diagram document.
    pub fn to_xml(&self) -> DiagramResult<String> {
        let mut writer = Writer::new_with_indent(Vec::new(), b' ', 2);
        write_event(
            &mut writer,
            Event::Decl(BytesDecl::new("1.0", Some("UTF-8"), None)),
        )?;

        let mut root = BytesStart::new(DIAGRAM_TAG);
        root.push_attribute(("name", self.name.as_str()));
        root.push_attribute(("created", self.created.to_rfc3339().as_str()));
        root.push_attribute(("modified", self.modified.to_rfc3339().as_str()));
        write_event(&mut writer, Event::Start(root))?;

        for shape in self.scene().shapes() {
            write_shape(&mut writer, shape)?;
        }
        for connector in self.scene().connectors() {
            write_connector(&mut writer, connector)?;
        }

        write_event(&mut writer, Event::End(BytesEnd::new(DIAGRAM_TAG)))?;
        Ok(into_string(writer)?)
    }

    /// Parses a diagram document. Connectors keep their stored paths and
    /// are registered under the regions those paths occupy.
    pub fn from_xml(xml: &str, style: PathStyle, layout: LayoutOptions) -> DiagramResult<Self> {
        let doc = Document::parse(xml).map_err(malformed)?;
        let root = doc.root_element();
        if !root.has_tag_name(DIAGRAM_TAG) {
            return Err(PersistenceError::MissingElement {
                element: DIAGRAM_TAG.to_string(),
            }
            .into());
        }

        let mut diagram = Diagram::with_options(root.attribute("name").unwrap_or(""), style, layout);

        for node in root.children().filter(|n| n.has_tag_name(SHAPE_TAG)) {
            let id = ShapeId(identifier(node, SHAPE_TAG)?);
            let rect = Rect::new(
                coordinate(node, "x"),
                coordinate(node, "y"),
                coordinate(node, "width"),
                coordinate(node, "height"),
            );
            diagram.insert_shape(Shape::new(id, node.attribute("name").unwrap_or(""), rect))?;
        }

        for node in root.children().filter(|n| n.has_tag_name(CONNECTOR_TAG)) {
            let connector = read_connector(node, style)?;
            let id = connector.id;
            diagram
                .insert_connector(connector)
                .map_err(|err| match err {
                    DiagramError::UnknownShape(shape) => {
                        DiagramError::Persistence(PersistenceError::UnknownReference {
                            kind: SHAPE_TAG.to_string(),
                            reference: shape.to_string(),
                        })
                    }
                    other => other,
                })?;
            tracing::debug!("Loaded connector {}", id);
        }

        // Timestamps last, inserting entities does not touch them.
        diagram.created = timestamp(root, "created").unwrap_or(diagram.created);
        diagram.modified = timestamp(root, "modified").unwrap_or(diagram.modified);
        Ok(diagram)
    }

    pub fn save_to_file(&self, path: &Path) -> DiagramResult<()> {
        let xml = self.to_xml()?;
        std::fs::write(path, xml)?;
        tracing::info!("Saved diagram '{}' to {}", self.name, path.display());
        Ok(())
    }

    pub fn load_from_file(path: &Path, style: PathStyle, layout: LayoutOptions) -> DiagramResult<Self> {
        let xml = std::fs::read_to_string(path)?;
        let diagram = Self::from_xml(&xml, style, layout)?;
        tracing::info!(
            "Loaded diagram '{}' from {} ({} shapes, {} connectors)",
            diagram.name,
            path.display(),
            diagram.shape_count(),
            diagram.connector_count()
        );
        Ok(diagram)
    }
}

fn write_shape<W: Write>(writer: &mut Writer<W>, shape: &Shape) -> Result<(), PersistenceError> {
    let mut elem = BytesStart::new(SHAPE_TAG);
    elem.push_attribute(("id", shape.id.to_string().as_str()));
    elem.push_attribute(("name", shape.name.as_str()));
    elem.push_attribute(("x", shape.rect.x.to_string().as_str()));
    elem.push_attribute(("y", shape.rect.y.to_string().as_str()));
    elem.push_attribute(("width", shape.rect.width.to_string().as_str()));
    elem.push_attribute(("height", shape.rect.height.to_string().as_str()));
    write_event(writer, Event::Empty(elem))
}

fn write_connector<W: Write>(
    writer: &mut Writer<W>,
    connector: &Connector,
) -> Result<(), PersistenceError> {
    let mut elem = BytesStart::new(CONNECTOR_TAG);
    elem.push_attribute(("id", connector.id.to_string().as_str()));
    elem.push_attribute(("name", connector.name.as_str()));
    elem.push_attribute(("shape_a", connector.shape_a.to_string().as_str()));
    elem.push_attribute(("shape_b", connector.shape_b.to_string().as_str()));
    elem.push_attribute(("x", connector.origin.x.to_string().as_str()));
    elem.push_attribute(("y", connector.origin.y.to_string().as_str()));
    write_event(writer, Event::Start(elem))?;
    connector.path.save_to_persisted(writer)?;
    write_event(writer, Event::End(BytesEnd::new(CONNECTOR_TAG)))
}

fn read_connector(node: Node<'_, '_>, style: PathStyle) -> DiagramResult<Connector> {
    let id = ConnectorId(identifier(node, CONNECTOR_TAG)?);
    let shape_a = ShapeId(reference(node, "shape_a")?);
    let shape_b = ShapeId(reference(node, "shape_b")?);

    let mut connector = Connector::new(id, node.attribute("name").unwrap_or(""), shape_a, shape_b, style);
    connector.origin = Point::new(coordinate(node, "x"), coordinate(node, "y"));
    if let Some(linepath) = node.children().find(|n| n.has_tag_name(LINEPATH_TAG)) {
        connector.path.load_from_persisted(linepath)?;
    }
    Ok(connector)
}

fn identifier(node: Node<'_, '_>, kind: &str) -> Result<u64, PersistenceError> {
    node.attribute("id")
        .and_then(|v| v.trim().parse().ok())
        .ok_or_else(|| PersistenceError::MalformedXml {
            reason: format!("<{}> without a numeric id", kind),
        })
}

fn reference(node: Node<'_, '_>, attribute: &str) -> Result<u64, PersistenceError> {
    let value = node.attribute(attribute).unwrap_or("");
    value
        .trim()
        .parse()
        .map_err(|_| PersistenceError::UnknownReference {
            kind: SHAPE_TAG.to_string(),
            reference: value.to_string(),
        })
}

/// Numeric attribute, 0 when missing or not a number.
fn coordinate(node: Node<'_, '_>, attribute: &str) -> f64 {
    node.attribute(attribute)
        .and_then(|v| v.trim().parse::<f64>().ok())
        .filter(|v| v.is_finite())
        .unwrap_or(0.0)
}

fn timestamp(node: Node<'_, '_>, attribute: &str) -> Option<DateTime<Utc>> {
    node.attribute(attribute)
        .and_then(|v| DateTime::parse_from_rfc3339(v).ok())
        .map(|t| t.with_timezone(&Utc))
}

fn write_event<W: Write>(writer: &mut Writer<W>, event: Event<'_>) -> Result<(), PersistenceError> {
    writer
        .write_event(event)
        .map_err(|err| PersistenceError::WriteFailed {
            reason: err.to_string(),
        })
}

fn into_string(writer: Writer<Vec<u8>>) -> Result<String, PersistenceError> {
    String::from_utf8(writer.into_inner()).map_err(|err| PersistenceError::WriteFailed {
        reason: err.to_string(),
    })
}

fn malformed(err: roxmltree::Error) -> PersistenceError {
    PersistenceError::MalformedXml {
        reason: err.to_string(),
    }
}
