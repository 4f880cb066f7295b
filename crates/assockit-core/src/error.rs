//! Error handling for AssocKit
//!
//! Provides error types for the layers of the library:
//! - Path errors (point index contract violations)
//! - Persistence errors (XML documents and point lists)
//!
//! All error types use `thiserror` for ergonomic error handling.

use thiserror::Error;

/// Connector path error type
///
/// Raised when a caller violates the index contract of a connector path.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum PathError {
    /// Point index outside `[0, len)` (or `[0, len]` for insertion)
    #[error("Point index {index} out of range for path with {len} points")]
    IndexOutOfRange {
        /// The requested index.
        index: usize,
        /// The number of points in the path.
        len: usize,
    },
}

/// Persistence error type
///
/// Represents errors related to reading and writing diagram documents.
#[derive(Error, Debug, Clone)]
pub enum PersistenceError {
    /// The document is not well-formed XML
    #[error("Malformed XML: {reason}")]
    MalformedXml {
        /// The parser message.
        reason: String,
    },

    /// A required element is missing
    #[error("Missing element <{element}>")]
    MissingElement {
        /// The expected element name.
        element: String,
    },

    /// An element refers to an unknown entity
    #[error("Unknown {kind} reference '{reference}'")]
    UnknownReference {
        /// The kind of entity (shape, connector).
        kind: String,
        /// The reference that could not be resolved.
        reference: String,
    },

    /// Writing the document failed
    #[error("Failed to write document: {reason}")]
    WriteFailed {
        /// The writer message.
        reason: String,
    },
}
