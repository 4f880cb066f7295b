//! # AssocKit Designer
//!
//! Association line layout for UML-style diagrams.
//!
//! ## Core Components
//!
//! - **ConnectorPath**: the ordered waypoints of one connector, with point
//!   editing, picking queries and cached hit-test geometry
//! - **RegionSpaceManager**: per-shape registry of connector ends that
//!   spreads them along the shape's compass regions
//! - **Routing**: detection of the region a connector end lands on
//! - **Diagram**: owns shapes, connectors and their managers, and persists
//!   them as XML documents
//!
//! ## Architecture
//!
//! ```text
//! Diagram
//!   ├── Scene (shapes + connectors, implements ConnectorScene)
//!   │     └── Connector ── ConnectorPath
//!   └── RegionSpaceManager (one per shape, holds ids only)
//! ```
//!
//! ## Usage
//!
//! ```rust
//! use assockit_core::geometry::{Point, Rect};
//! use assockit_designer::Diagram;
//!
//! let mut diagram = Diagram::new("classes");
//! let order = diagram.add_shape("Order", Rect::new(0.0, 0.0, 100.0, 40.0)).unwrap();
//! let item = diagram.add_shape("Item", Rect::new(0.0, 200.0, 100.0, 40.0)).unwrap();
//! let line = diagram.add_connector("items", order, item).unwrap();
//!
//! let path = &diagram.connector(line).unwrap().path;
//! assert_eq!(path.start_point(), Some(Point::new(50.0, 40.0)));
//! ```

pub mod connector_path;
pub mod diagram;
pub mod error;
pub mod persistence;
pub mod routing;
pub mod space_manager;

pub use connector_path::ConnectorPath;
pub use diagram::{Connector, Diagram, Scene, Shape};
pub use error::{DiagramError, DiagramResult};
pub use routing::{determine_regions, initial_self_loop, intersected_region};
pub use space_manager::{end_index, ConnectorScene, RegionSpaceManager};
