//! Rendering module for deriving output formats.
//!
//! HTML is compiled directly from markdown text; JSON and CSV are
//! derived from the document model.

mod csv;
mod html;
mod json;

pub use csv::TableExporter;
pub use html::{render_fragment, to_html};
pub use json::{to_json, JsonFormat};
