//! # AssocKit Core
//!
//! Core types shared by the AssocKit crates:
//! - 2-D geometry primitives ([`Point`], [`Rect`])
//! - Handles for diagram entities ([`ShapeId`], [`ConnectorId`])
//! - Boundary regions of a shape ([`Region`], [`RegionPair`]) and association roles ([`Role`])
//! - Tunable path and layout parameters ([`PathStyle`], [`LayoutOptions`])
//! - Error types for path editing and persistence

pub mod error;
pub mod geometry;
pub mod ids;
pub mod options;
pub mod region;

pub use error::{PathError, PersistenceError};
pub use geometry::{Point, Rect};
pub use ids::{ConnectorId, ShapeId};
pub use options::{LayoutOptions, PathStyle, TieBreak};
pub use region::{PointPair, Region, RegionPair, Role};
