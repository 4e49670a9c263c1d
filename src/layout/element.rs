//! Positioned element types from the recognition stage.

use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};

/// An axis-aligned rectangle in page pixel coordinates (y grows downward).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BoundingBox {
    /// Left edge
    pub x0: f32,
    /// Top edge
    pub y0: f32,
    /// Right edge
    pub x1: f32,
    /// Bottom edge
    pub y1: f32,
}

impl BoundingBox {
    /// Create a bounding box from its corner coordinates.
    pub fn new(x0: f32, y0: f32, x1: f32, y1: f32) -> Self {
        Self { x0, y0, x1, y1 }
    }

    /// Box width.
    pub fn width(&self) -> f32 {
        self.x1 - self.x0
    }

    /// Box height.
    pub fn height(&self) -> f32 {
        self.y1 - self.y0
    }

    /// Vertical center.
    pub fn center_y(&self) -> f32 {
        (self.y0 + self.y1) / 2.0
    }

    /// Check that the box has positive area and finite coordinates.
    pub fn is_valid(&self) -> bool {
        [self.x0, self.y0, self.x1, self.y1]
            .iter()
            .all(|v| v.is_finite())
            && self.x1 > self.x0
            && self.y1 > self.y0
    }
}

/// Element type predicted by the layout model.
///
/// A closed set with exhaustive match dispatch; the recognition stage's
/// free-form `type_label` strings are mapped onto it at the boundary.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ElementType {
    /// A document or section heading
    Heading,
    /// A list item
    ListItem,
    /// A table region
    Table,
    /// Regular text
    Paragraph,
}

impl ElementType {
    /// Strictly parse a recognition-stage label.
    ///
    /// Returns `Error::UnsupportedElement` for labels outside the known
    /// vocabulary; most callers want [`ElementType::from_label`] instead.
    pub fn parse(label: &str) -> Result<Self> {
        let normalized = label.trim().to_ascii_lowercase().replace([' ', '-'], "_");
        match normalized.as_str() {
            "title" | "section_header" | "subtitle_level_1" => Ok(ElementType::Heading),
            "list_item" => Ok(ElementType::ListItem),
            "table" | "document_index" => Ok(ElementType::Table),
            "text" | "paragraph" | "caption" | "footnote" | "page_header" | "page_footer" => {
                Ok(ElementType::Paragraph)
            }
            _ => Err(Error::UnsupportedElement(label.to_string())),
        }
    }

    /// Leniently map a recognition-stage label, degrading unknown labels
    /// to `Paragraph`.
    pub fn from_label(label: &str) -> Self {
        match Self::parse(label) {
            Ok(kind) => kind,
            Err(_) => {
                log::debug!("unrecognized element label {:?}, treating as paragraph", label);
                ElementType::Paragraph
            }
        }
    }
}

/// A positioned text element on one page.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PositionedElement {
    /// Extracted text content
    pub text: String,

    /// Location on the page
    pub bbox: BoundingBox,

    /// Element type (mapped from the upstream `type_label`)
    pub kind: ElementType,

    /// Recognition confidence in [0, 1]
    pub confidence: f32,
}

impl PositionedElement {
    /// Create an element with an already-resolved type.
    pub fn new(
        text: impl Into<String>,
        bbox: BoundingBox,
        kind: ElementType,
        confidence: f32,
    ) -> Self {
        Self {
            text: text.into(),
            bbox,
            kind,
            confidence,
        }
    }

    /// Create an element from the upstream prediction contract, mapping
    /// the free-form `type_label` leniently.
    pub fn from_prediction(
        text: impl Into<String>,
        bbox: BoundingBox,
        type_label: &str,
        confidence: f32,
    ) -> Self {
        Self::new(text, bbox, ElementType::from_label(type_label), confidence)
    }
}

/// One cell prediction from the table-structure model.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TableCellPrediction {
    /// Grid row index of the cell's top-left corner
    pub start_row_offset_idx: usize,

    /// Grid column index of the cell's top-left corner
    pub start_col_offset_idx: usize,

    /// Cell location within the table region
    pub bbox: BoundingBox,

    /// Extracted cell text
    pub text: String,
}

/// Predicted grid structure for one table region.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TableStructure {
    /// Number of grid rows
    pub num_rows: usize,

    /// Number of grid columns
    pub num_cols: usize,

    /// Cell predictions (unordered)
    pub cells: Vec<TableCellPrediction>,
}

/// A detected table region on a page.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TableRegion {
    /// Region location on the page
    pub bbox: BoundingBox,

    /// Raw text of the whole region (the degrade fallback)
    pub text: String,

    /// Grid structure, absent when structure prediction failed
    pub structure: Option<TableStructure>,
}

impl TableRegion {
    /// Create a region with a predicted structure.
    pub fn structured(bbox: BoundingBox, text: impl Into<String>, structure: TableStructure) -> Self {
        Self {
            bbox,
            text: text.into(),
            structure: Some(structure),
        }
    }

    /// Create a region whose structure prediction failed.
    pub fn unstructured(bbox: BoundingBox, text: impl Into<String>) -> Self {
        Self {
            bbox,
            text: text.into(),
            structure: None,
        }
    }
}

/// All recognized content for a single page.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PageElements {
    /// Page width in pixels
    pub width: f32,

    /// Page height in pixels
    pub height: f32,

    /// Text elements (unordered)
    pub elements: Vec<PositionedElement>,

    /// Table regions (unordered)
    pub tables: Vec<TableRegion>,
}

impl PageElements {
    /// Create an empty page of the given pixel dimensions.
    pub fn new(width: f32, height: f32) -> Self {
        Self {
            width,
            height,
            elements: Vec::new(),
            tables: Vec::new(),
        }
    }

    /// Add a text element.
    pub fn add_element(&mut self, element: PositionedElement) {
        self.elements.push(element);
    }

    /// Add a table region.
    pub fn add_table(&mut self, table: TableRegion) {
        self.tables.push(table);
    }

    /// Check whether the page carries any content.
    pub fn is_empty(&self) -> bool {
        self.elements.is_empty() && self.tables.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bbox_geometry() {
        let bbox = BoundingBox::new(10.0, 20.0, 110.0, 40.0);
        assert_eq!(bbox.width(), 100.0);
        assert_eq!(bbox.height(), 20.0);
        assert_eq!(bbox.center_y(), 30.0);
        assert!(bbox.is_valid());
    }

    #[test]
    fn test_bbox_invalid() {
        assert!(!BoundingBox::new(10.0, 20.0, 5.0, 40.0).is_valid());
        assert!(!BoundingBox::new(0.0, f32::NAN, 1.0, 1.0).is_valid());
    }

    #[test]
    fn test_element_type_parse() {
        assert_eq!(ElementType::parse("Section Header").ok(), Some(ElementType::Heading));
        assert_eq!(ElementType::parse("list_item").ok(), Some(ElementType::ListItem));
        assert_eq!(ElementType::parse("document_index").ok(), Some(ElementType::Table));
        assert!(ElementType::parse("pie_chart").is_err());
    }

    #[test]
    fn test_element_type_lenient_fallback() {
        assert_eq!(ElementType::from_label("pie_chart"), ElementType::Paragraph);
        assert_eq!(ElementType::from_label("title"), ElementType::Heading);
    }

    #[test]
    fn test_from_prediction() {
        let el = PositionedElement::from_prediction(
            "Summary",
            BoundingBox::new(0.0, 0.0, 50.0, 12.0),
            "section-header",
            0.93,
        );
        assert_eq!(el.kind, ElementType::Heading);
    }
}
