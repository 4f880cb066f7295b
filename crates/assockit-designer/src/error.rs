//! Error types for diagram editing.

use thiserror::Error;

use assockit_core::{ConnectorId, PathError, PersistenceError, ShapeId};

/// Errors raised while editing or persisting a [`Diagram`](crate::Diagram).
#[derive(Error, Debug)]
pub enum DiagramError {
    /// The shape is not part of the diagram.
    #[error("Unknown shape {0}")]
    UnknownShape(ShapeId),

    /// The connector is not part of the diagram.
    #[error("Unknown connector {0}")]
    UnknownConnector(ConnectorId),

    /// An identifier leaves no room for the next one of its kind.
    #[error("No {kind} identifier left after {id}")]
    IdentifiersExhausted { kind: &'static str, id: u64 },

    /// A connector path rejected an index.
    #[error(transparent)]
    Path(#[from] PathError),

    /// The diagram document could not be read or written.
    #[error(transparent)]
    Persistence(#[from] PersistenceError),

    /// I/O error while accessing a diagram file.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type alias for diagram operations.
pub type DiagramResult<T> = Result<T, DiagramError>;
