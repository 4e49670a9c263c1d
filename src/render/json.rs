//! JSON rendering for the document model.
//!
//! Output follows the document contract: `{"document": {"sections":
//! [...], "metadata": {...}}}`, where each section groups its content
//! blocks by kind and omits empty groups.

use serde::Serialize;

use crate::error::{Error, Result};
use crate::model::{
    CodeBlock, ContentBlock, DocumentMetadata, DocumentModel, DocumentSection, ImageRef, LinkRef,
    ListBlock, TableBlock,
};

/// JSON output format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum JsonFormat {
    /// Pretty-printed JSON with indentation
    #[default]
    Pretty,
    /// Compact JSON without extra whitespace
    Compact,
}

/// Convert a document model to its JSON representation.
pub fn to_json(model: &DocumentModel, format: JsonFormat) -> Result<String> {
    let view = DocumentView {
        document: ModelView {
            sections: model.sections.iter().map(SectionView::from).collect(),
            metadata: &model.metadata,
        },
    };

    let result = match format {
        JsonFormat::Pretty => serde_json::to_string_pretty(&view),
        JsonFormat::Compact => serde_json::to_string(&view),
    };

    result.map_err(|e| Error::Render(format!("JSON serialization error: {}", e)))
}

#[derive(Serialize)]
struct DocumentView<'a> {
    document: ModelView<'a>,
}

#[derive(Serialize)]
struct ModelView<'a> {
    sections: Vec<SectionView<'a>>,
    metadata: &'a DocumentMetadata,
}

#[derive(Serialize)]
struct SectionView<'a> {
    title: &'a str,
    level: u8,
    #[serde(rename = "type")]
    kind: &'static str,
    content: ContentView<'a>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    subsections: Vec<SectionView<'a>>,
}

impl<'a> From<&'a DocumentSection> for SectionView<'a> {
    fn from(section: &'a DocumentSection) -> Self {
        Self {
            title: &section.title,
            level: section.level,
            kind: "section",
            content: ContentView::from_blocks(&section.content),
            subsections: section.subsections.iter().map(SectionView::from).collect(),
        }
    }
}

/// Content blocks grouped by kind; empty groups are omitted.
#[derive(Serialize, Default)]
struct ContentView<'a> {
    #[serde(skip_serializing_if = "Vec::is_empty")]
    paragraphs: Vec<&'a str>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    lists: Vec<&'a ListBlock>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    code_blocks: Vec<&'a CodeBlock>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    tables: Vec<&'a TableBlock>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    images: Vec<&'a ImageRef>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    links: Vec<&'a LinkRef>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    blockquotes: Vec<&'a str>,
}

impl<'a> ContentView<'a> {
    fn from_blocks(blocks: &'a [ContentBlock]) -> Self {
        let mut view = Self::default();
        for block in blocks {
            match block {
                ContentBlock::Paragraph { text } => view.paragraphs.push(text.as_str()),
                ContentBlock::List(list) => view.lists.push(list),
                ContentBlock::Code(code) => view.code_blocks.push(code),
                ContentBlock::Table(table) => view.tables.push(table),
                ContentBlock::Image(image) => view.images.push(image),
                ContentBlock::Link(link) => view.links.push(link),
                ContentBlock::Blockquote { text } => view.blockquotes.push(text.as_str()),
            }
        }
        view
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::parse_markdown;

    #[test]
    fn test_json_contract_shape() {
        let model = parse_markdown("# Title\n\nSome text.\n\n- item");
        let json = to_json(&model, JsonFormat::Compact).unwrap();
        let value: serde_json::Value = serde_json::from_str(&json).unwrap();

        let document = &value["document"];
        assert_eq!(document["metadata"]["total_sections"], 1);
        let section = &document["sections"][0];
        assert_eq!(section["title"], "Title");
        assert_eq!(section["level"], 1);
        assert_eq!(section["type"], "section");
        assert_eq!(section["content"]["paragraphs"][0], "Some text.");
        assert_eq!(section["content"]["lists"][0]["items"][0]["text"], "item");
    }

    #[test]
    fn test_empty_groups_omitted() {
        let model = parse_markdown("# Title\n\nOnly text here.");
        let json = to_json(&model, JsonFormat::Compact).unwrap();
        let value: serde_json::Value = serde_json::from_str(&json).unwrap();

        let content = &value["document"]["sections"][0]["content"];
        assert!(content.get("tables").is_none());
        assert!(content.get("lists").is_none());
        assert!(content.get("code_blocks").is_none());
    }

    #[test]
    fn test_subsections_nested() {
        let model = parse_markdown("# A\n## B");
        let json = to_json(&model, JsonFormat::Compact).unwrap();
        let value: serde_json::Value = serde_json::from_str(&json).unwrap();

        let a = &value["document"]["sections"][0];
        assert_eq!(a["subsections"][0]["title"], "B");
        // leaf sections omit the subsections key entirely
        assert!(a["subsections"][0].get("subsections").is_none());
    }

    #[test]
    fn test_pretty_vs_compact() {
        let model = parse_markdown("# A");
        let pretty = to_json(&model, JsonFormat::Pretty).unwrap();
        let compact = to_json(&model, JsonFormat::Compact).unwrap();
        assert!(pretty.contains('\n'));
        assert!(!compact.contains('\n'));
    }
}
