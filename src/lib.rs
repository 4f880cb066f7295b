//! # AssocKit
//!
//! Connector end-point layout for diagram editors. Associations between
//! shapes attach to one of nine regions of each shape (four edges, four
//! corners) and the connectors sharing a region are spread evenly along it,
//! ordered so that their lines do not cross.
//!
//! ## Architecture
//!
//! AssocKit is organized as a workspace with multiple crates:
//!
//! 1. **assockit-core** - Geometry, identifiers, regions, options, errors
//! 2. **assockit-designer** - Connector paths, region space managers, diagrams, XML persistence
//! 3. **assockit-settings** - Configuration files and validation
//! 4. **assockit** - The `assockit` relayout tool that integrates all crates

pub mod relayout;

pub use assockit_core::{
    ConnectorId, LayoutOptions, PathError, PathStyle, PersistenceError, Point, PointPair, Rect,
    Region, RegionPair, Role, ShapeId, TieBreak,
};

pub use assockit_designer::{
    determine_regions, initial_self_loop, intersected_region, Connector, ConnectorPath,
    ConnectorScene, Diagram, DiagramError, DiagramResult, RegionSpaceManager, Scene, Shape,
};

pub use assockit_settings::{Config, ConfigError, LoggingSettings, SettingsError};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Build date (set at compile time)
pub const BUILD_DATE: &str = env!("BUILD_DATE");

/// Initialize logging
///
/// `RUST_LOG` takes precedence; otherwise `default_level` (usually the
/// configured [`LoggingSettings::level`]) is used. Output goes to stderr so
/// that it never mixes with diagram output.
pub fn init_logging(default_level: &str) -> anyhow::Result<()> {
    use tracing_subscriber::fmt;
    use tracing_subscriber::prelude::*;
    use tracing_subscriber::EnvFilter;

    let env_filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(default_level))
        .map_err(|e| anyhow::anyhow!("invalid log level '{}': {}", default_level, e))?;

    let fmt_layer = fmt::layer()
        .with_writer(std::io::stderr)
        .with_target(true)
        .with_level(true)
        .with_line_number(true);

    tracing_subscriber::registry()
        .with(env_filter)
        .with(fmt_layer)
        .try_init()
        .map_err(|e| anyhow::anyhow!("failed to install log subscriber: {}", e))?;

    Ok(())
}
