//! Layout reconstruction for positioned page elements.
//!
//! This module turns the unordered element stream produced by an upstream
//! recognition stage (layout detector, table-structure model, OCR) into
//! ordered markdown-like blocks: elements are grouped into reading-order
//! lines and paragraphs, classified, merged with reconstructed table
//! grids, and emitted as markdown text for the markdown parser.

mod element;
mod options;
mod reconstructor;
mod table_grid;

pub use element::{
    BoundingBox, ElementType, PageElements, PositionedElement, TableCellPrediction, TableRegion,
    TableStructure,
};
pub use options::LayoutOptions;
pub use reconstructor::{reconstruct_pages, LayoutReconstructor};
pub use table_grid::build_grid;
