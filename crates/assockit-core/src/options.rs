//! Tunable parameters shared by connector paths and the layout engine.
//!
//! These are plain data; `assockit-settings` loads them from configuration
//! files and validates them.

use serde::{Deserialize, Serialize};

/// Geometry parameters of a rendered connector path.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PathStyle {
    /// Radius used for fuzzy point and segment picking
    pub hit_delta: f64,
    /// Diameter of the handles drawn on waypoints
    pub selected_point_diameter: f64,
    /// Line width of the connector
    pub pen_width: f64,
}

impl Default for PathStyle {
    fn default() -> Self {
        Self {
            hit_delta: 5.0,
            selected_point_diameter: 8.0,
            pen_width: 1.0,
        }
    }
}

impl PathStyle {
    /// Width of the stroke used for hit-testing: the larger of the pick
    /// radius and the pen, plus a two unit margin.
    pub fn stroke_width(&self) -> f64 {
        self.hit_delta.max(self.pen_width) + 2.0
    }
}

/// Secondary ordering applied when two connectors share a reference coordinate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TieBreak {
    /// Keep the order in which connectors were registered or last arranged
    #[default]
    EncounterOrder,
    /// Order ties by ascending connector identifier
    ConnectorId,
}

/// Parameters of the region layout engine.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LayoutOptions {
    /// Height of the loop drawn for a new self-association
    pub self_loop_min_height: f64,
    /// Ordering of connectors with equal reference coordinates
    pub tie_break: TieBreak,
}

impl Default for LayoutOptions {
    fn default() -> Self {
        Self {
            self_loop_min_height: 30.0,
            tie_break: TieBreak::EncounterOrder,
        }
    }
}
