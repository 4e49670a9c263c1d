//! # docstruct
//!
//! Document structuring engine for LLM-ready text.
//!
//! This library converts either raw markdown text or a stream of
//! positioned content elements (from an upstream OCR/layout recognition
//! stage) into a canonical hierarchical document model, and derives
//! Markdown, HTML, JSON, and CSV output from it deterministically.
//!
//! ## Quick Start
//!
//! ```
//! use docstruct::{convert_markdown, JsonFormat};
//!
//! fn main() -> docstruct::Result<()> {
//!     let result = convert_markdown("# Report\n\n| A | B |\n|---|---|\n| 1 | 2 |");
//!
//!     let html = result.to_html();
//!     assert!(html.contains("<table>"));
//!
//!     let json = result.to_json(JsonFormat::Pretty)?;
//!     assert!(json.contains("\"document\""));
//!
//!     let csv = result.to_csv(0)?;
//!     assert_eq!(csv, "A,B\n1,2\n");
//!
//!     Ok(())
//! }
//! ```
//!
//! ## Features
//!
//! - **Layout reconstruction**: reading-order grouping and block
//!   classification of positioned page elements, with table grids
//!   rebuilt from cell predictions
//! - **Markdown parsing**: headers, lists, fenced code, GFM pipe
//!   tables, links, images, blockquotes into a section tree
//! - **Multiple output formats**: Markdown, standalone HTML, JSON, CSV
//! - **Degrade, never abort**: malformed elements and tables are
//!   skipped or downgraded; only CSV export surfaces errors
//! - **Parallel batches**: pages fan out over Rayon and come back in
//!   input order

pub mod error;
pub mod layout;
pub mod model;
pub mod parser;
pub mod render;

// Re-export commonly used types
pub use error::{Error, Result};
pub use layout::{
    BoundingBox, ElementType, LayoutOptions, LayoutReconstructor, PageElements, PositionedElement,
    TableCellPrediction, TableRegion, TableStructure,
};
pub use model::{
    CodeBlock, ContentBlock, DocumentMetadata, DocumentModel, DocumentSection, ImageRef, LinkRef,
    ListBlock, ListItem, TableBlock,
};
pub use parser::{parse_markdown, MarkdownParser};
pub use render::{to_html, to_json, JsonFormat, TableExporter};

/// Convert markdown text into a result that can be exported to every
/// supported output format.
///
/// The document model is built exactly once, here; the returned result
/// is immutable and every export method is a pure derivation.
///
/// # Example
///
/// ```
/// let result = docstruct::convert_markdown("# Title\n\nBody text.");
/// assert_eq!(result.document().metadata.total_sections, 1);
/// ```
pub fn convert_markdown(text: impl Into<String>) -> ConversionResult {
    ConversionResult::new(text)
}

/// Reconstruct one page of positioned elements into markdown and wrap it
/// for export, using default layout thresholds.
///
/// # Example
///
/// ```
/// use docstruct::{reconstruct_page, PageElements};
///
/// let result = reconstruct_page(&PageElements::new(800.0, 1000.0));
/// assert!(result.to_markdown().is_empty());
/// ```
pub fn reconstruct_page(page: &PageElements) -> ConversionResult {
    let markdown = LayoutReconstructor::new().reconstruct_page(page);
    ConversionResult::new(markdown)
}

/// Reconstruct a page with custom layout thresholds.
pub fn reconstruct_page_with_options(page: &PageElements, options: LayoutOptions) -> ConversionResult {
    let markdown = LayoutReconstructor::with_options(options).reconstruct_page(page);
    ConversionResult::new(markdown)
}

/// Result of one conversion: the markdown content plus the document
/// model built from it.
///
/// Export methods never mutate the result, so it can be shared freely
/// across threads.
pub struct ConversionResult {
    content: String,
    document: DocumentModel,
}

impl ConversionResult {
    /// Build a result from markdown content, parsing the document model
    /// once.
    pub fn new(content: impl Into<String>) -> Self {
        let content = content.into();
        let document = parser::parse_markdown(&content);
        Self { content, document }
    }

    /// The markdown content.
    pub fn to_markdown(&self) -> &str {
        &self.content
    }

    /// Render as a standalone HTML document.
    pub fn to_html(&self) -> String {
        render::to_html(&self.content)
    }

    /// Serialize the document model as JSON.
    pub fn to_json(&self, format: JsonFormat) -> Result<String> {
        render::to_json(&self.document, format)
    }

    /// Export the table at `index` as CSV.
    pub fn to_csv(&self, table_index: usize) -> Result<String> {
        TableExporter::new(&self.document, &self.content).export_table(table_index)
    }

    /// Export every table as CSV, with separators between tables.
    pub fn to_csv_all(&self) -> Result<String> {
        TableExporter::new(&self.document, &self.content).export_all_tables()
    }

    /// The underlying document model.
    pub fn document(&self) -> &DocumentModel {
        &self.document
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_convert_markdown_roundtrip() {
        let result = convert_markdown("# Title\n\nHello world.");
        assert_eq!(result.to_markdown(), "# Title\n\nHello world.");
        assert_eq!(result.document().sections[0].title, "Title");
    }

    #[test]
    fn test_conversion_result_html() {
        let result = convert_markdown("# Title");
        let html = result.to_html();
        assert!(html.contains("<h1>Title</h1>"));
        assert!(html.starts_with("<!DOCTYPE html>"));
    }

    #[test]
    fn test_conversion_result_json() {
        let result = convert_markdown("# Title");
        let json = result.to_json(JsonFormat::Compact).unwrap();
        assert!(json.starts_with("{\"document\":"));
    }

    #[test]
    fn test_conversion_result_csv() {
        let result = convert_markdown("| A | B |\n|---|---|\n| 1 | 2 |");
        assert_eq!(result.to_csv(0).unwrap(), "A,B\n1,2\n");
        assert!(matches!(result.to_csv(5), Err(Error::TableIndexOutOfRange { .. })));
    }

    #[test]
    fn test_empty_markdown_empty_model() {
        let result = convert_markdown("");
        assert!(result.document().is_empty());
        assert_eq!(result.document().metadata.total_sections, 0);
    }

    #[test]
    fn test_reconstruct_page_to_model() {
        let mut page = PageElements::new(800.0, 1000.0);
        page.add_element(PositionedElement::new(
            "OVERVIEW",
            BoundingBox::new(10.0, 300.0, 200.0, 315.0),
            ElementType::Paragraph,
            0.9,
        ));
        page.add_element(PositionedElement::new(
            "A longer paragraph of body text with plenty of words.",
            BoundingBox::new(10.0, 400.0, 600.0, 415.0),
            ElementType::Paragraph,
            0.9,
        ));

        let result = reconstruct_page(&page);
        let model = result.document();
        assert_eq!(model.sections[0].title, "OVERVIEW");
        assert!(!model.sections[0].content.is_empty());
    }
}
