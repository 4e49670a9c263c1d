//! Error types for docstruct library.

use thiserror::Error;

/// Result type alias for docstruct operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Error types that can occur during document structuring.
///
/// Parsing and rendering never fail on malformed markdown; the worst case
/// is that unrecognized syntax becomes ordinary paragraph text. Only the
/// CSV export entry points and the strict element constructors surface
/// caller-visible failures.
#[derive(Error, Debug)]
pub enum Error {
    /// A table, list, or other structure that could not be parsed.
    ///
    /// Internal processing degrades such input to a lower-fidelity block
    /// instead of aborting the document.
    #[error("Malformed input: {0}")]
    MalformedInput(String),

    /// Requested table index does not exist.
    #[error("Table index {index} is out of range (document has {count} table(s))")]
    TableIndexOutOfRange {
        /// The requested zero-based index.
        index: usize,
        /// Number of tables actually found.
        count: usize,
    },

    /// The document contains no tables.
    #[error("No tables found in the document content")]
    NoTablesFound,

    /// An element type label from the recognition stage is not recognized.
    ///
    /// The lenient path treats such elements as plain paragraphs.
    #[error("Unsupported element type: {0}")]
    UnsupportedElement(String),

    /// Error during rendering (HTML, JSON, CSV).
    #[error("Rendering error: {0}")]
    Render(String),
}
