//! Markdown to document model parsing.
//!
//! Header lines drive a stack-based hierarchy builder: a header of level
//! `L` pops the section stack while its top has level >= `L`, then
//! becomes a child of the new top (or a new top-level section). The
//! hierarchy is assembled over an arena of nodes with child indices and
//! materialized bottom-up, so no parent back-pointers are needed.

use once_cell::sync::Lazy;
use regex::Regex;

use super::content::extract_content;
use crate::model::{ContentBlock, DocumentMetadata, DocumentModel, DocumentSection};

static HEADER: Lazy<Regex> = Lazy::new(|| Regex::new(r"^(#{1,6})\s+(.+)$").unwrap());

/// Parse markdown text into a document model.
pub fn parse_markdown(text: &str) -> DocumentModel {
    MarkdownParser::new().parse(text)
}

/// Markdown parser producing a [`DocumentModel`].
///
/// The parser is stateless across calls; parsing never fails on
/// malformed markdown, which at worst ends up as paragraph text.
#[derive(Debug, Default)]
pub struct MarkdownParser;

impl MarkdownParser {
    /// Create a new parser.
    pub fn new() -> Self {
        Self
    }

    /// Parse markdown text into a document model.
    pub fn parse(&self, text: &str) -> DocumentModel {
        if text.trim().is_empty() {
            return DocumentModel::empty();
        }

        let flat = split_sections(text);
        let metadata = aggregate_metadata(&flat);
        let sections = build_hierarchy(flat);

        DocumentModel { sections, metadata }
    }
}

/// A section before hierarchy assembly.
struct FlatSection {
    title: String,
    level: u8,
    content: Vec<ContentBlock>,
}

/// Split markdown into flat sections at header lines.
///
/// Content before the first header becomes a synthetic level-1 "Content"
/// section when non-empty.
fn split_sections(text: &str) -> Vec<FlatSection> {
    let mut sections: Vec<FlatSection> = Vec::new();
    let mut current: Option<(String, u8)> = None;
    let mut buffer: Vec<&str> = Vec::new();

    for line in text.lines() {
        let line = line.trim_end();

        if let Some(caps) = HEADER.captures(line) {
            flush_section(&mut sections, current.take(), &buffer);
            buffer.clear();

            let level = caps[1].len() as u8;
            let title = caps[2].trim().to_string();
            current = Some((title, level));
        } else if !line.trim().is_empty() || !buffer.is_empty() {
            // keep interior blank lines, skip leading ones
            buffer.push(line);
        }
    }
    flush_section(&mut sections, current, &buffer);

    sections
}

fn flush_section(
    sections: &mut Vec<FlatSection>,
    current: Option<(String, u8)>,
    buffer: &[&str],
) {
    let content = buffer.join("\n");
    match current {
        Some((title, level)) => sections.push(FlatSection {
            title,
            level,
            content: extract_content(&content),
        }),
        None if !content.trim().is_empty() => sections.push(FlatSection {
            title: "Content".to_string(),
            level: 1,
            content: extract_content(&content),
        }),
        None => {}
    }
}

/// Aggregate document metadata over the flat section list.
fn aggregate_metadata(sections: &[FlatSection]) -> DocumentMetadata {
    let has = |pred: fn(&ContentBlock) -> bool| {
        sections.iter().any(|s| s.content.iter().any(pred))
    };

    DocumentMetadata {
        total_sections: sections.len(),
        max_heading_level: sections.iter().map(|s| s.level).max().unwrap_or(0),
        has_tables: has(|b| matches!(b, ContentBlock::Table(_))),
        has_code_blocks: has(|b| matches!(b, ContentBlock::Code(_))),
        has_lists: has(|b| matches!(b, ContentBlock::List(_))),
        has_images: has(|b| matches!(b, ContentBlock::Image(_))),
    }
}

/// Assemble the section tree from the flat list.
///
/// First pass records child indices per node with the level stack; the
/// second pass materializes sections in reverse index order, so every
/// node's children (which always come later in document order) are
/// already built when their parent collects them.
fn build_hierarchy(flat: Vec<FlatSection>) -> Vec<DocumentSection> {
    let mut children: Vec<Vec<usize>> = vec![Vec::new(); flat.len()];
    let mut roots: Vec<usize> = Vec::new();
    let mut stack: Vec<(usize, u8)> = Vec::new();

    for (idx, section) in flat.iter().enumerate() {
        while stack
            .last()
            .map(|&(_, level)| level >= section.level)
            .unwrap_or(false)
        {
            stack.pop();
        }
        match stack.last() {
            Some(&(parent, _)) => children[parent].push(idx),
            None => roots.push(idx),
        }
        stack.push((idx, section.level));
    }

    let mut slots: Vec<Option<DocumentSection>> = flat
        .into_iter()
        .map(|s| Some(DocumentSection::with_content(s.title, s.level, s.content)))
        .collect();

    for idx in (0..children.len()).rev() {
        let subs: Vec<DocumentSection> = children[idx]
            .iter()
            .filter_map(|&child| slots[child].take())
            .collect();
        if let Some(section) = slots[idx].as_mut() {
            section.subsections = subs;
        }
    }

    roots.iter().filter_map(|&root| slots[root].take()).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_input() {
        let model = parse_markdown("");
        assert!(model.sections.is_empty());
        assert_eq!(model.metadata.total_sections, 0);

        let model = parse_markdown("   \n\t\n");
        assert!(model.sections.is_empty());
        assert_eq!(model.metadata.total_sections, 0);
    }

    #[test]
    fn test_single_section() {
        let model = parse_markdown("# Title\n\nSome paragraph text.");
        assert_eq!(model.sections.len(), 1);
        assert_eq!(model.sections[0].title, "Title");
        assert_eq!(model.sections[0].level, 1);
        assert_eq!(model.metadata.total_sections, 1);
        assert_eq!(model.metadata.max_heading_level, 1);
    }

    #[test]
    fn test_preamble_becomes_content_section() {
        let model = parse_markdown("Intro before any header.\n\n# First");
        assert_eq!(model.sections.len(), 2);
        assert_eq!(model.sections[0].title, "Content");
        assert_eq!(model.sections[0].level, 1);
        assert_eq!(model.sections[1].title, "First");
    }

    #[test]
    fn test_hierarchy_one_two_three_two_one() {
        let model = parse_markdown("# A\n## B\n### C\n## D\n# E");

        assert_eq!(model.sections.len(), 2);
        let a = &model.sections[0];
        assert_eq!(a.title, "A");
        assert_eq!(a.subsections.len(), 2);
        assert_eq!(a.subsections[0].title, "B");
        assert_eq!(a.subsections[0].subsections.len(), 1);
        assert_eq!(a.subsections[0].subsections[0].title, "C");
        assert_eq!(a.subsections[1].title, "D");
        assert!(model.sections[1].subsections.is_empty());
        assert_eq!(model.metadata.total_sections, 5);
        assert_eq!(model.metadata.max_heading_level, 3);
    }

    #[test]
    fn test_total_sections_equals_flattened_tree() {
        let model = parse_markdown("# A\n### Deep\n## Mid\n# B\n## C");
        assert_eq!(model.metadata.total_sections, model.section_count());
    }

    #[test]
    fn test_skipped_level_still_nests() {
        let model = parse_markdown("# Top\n### Jumped");
        assert_eq!(model.sections.len(), 1);
        assert_eq!(model.sections[0].subsections[0].title, "Jumped");
        assert_eq!(model.sections[0].subsections[0].level, 3);
    }

    #[test]
    fn test_metadata_flags() {
        let md = "# S\n\n- item\n\n```rust\ncode\n```\n\n| H |\n|---|\n| v |\n\n![img](a.png)";
        let model = parse_markdown(md);
        let meta = &model.metadata;
        assert!(meta.has_lists);
        assert!(meta.has_code_blocks);
        assert!(meta.has_tables);
        assert!(meta.has_images);
    }

    #[test]
    fn test_metadata_flags_absent() {
        let model = parse_markdown("# S\n\nJust text.");
        let meta = &model.metadata;
        assert!(!meta.has_lists);
        assert!(!meta.has_code_blocks);
        assert!(!meta.has_tables);
        assert!(!meta.has_images);
    }

    #[test]
    fn test_section_content_attached() {
        let model = parse_markdown("# A\n\nAlpha text.\n\n## B\n\nBeta text.");
        let a = &model.sections[0];
        assert_eq!(
            a.content,
            vec![ContentBlock::Paragraph {
                text: "Alpha text.".into()
            }]
        );
        assert_eq!(
            a.subsections[0].content,
            vec![ContentBlock::Paragraph {
                text: "Beta text.".into()
            }]
        );
    }
}
