//! Section tree types.

use super::{ContentBlock, TableBlock};
use serde::{Deserialize, Serialize};

/// A titled section of the document.
///
/// Sections form a tree: each section exclusively owns its subsections,
/// and every subsection has a strictly greater heading level than its
/// parent.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DocumentSection {
    /// Section title (header text)
    pub title: String,

    /// Heading level, clamped to 1-6
    pub level: u8,

    /// Content blocks in document order
    pub content: Vec<ContentBlock>,

    /// Child sections in document order
    pub subsections: Vec<DocumentSection>,
}

impl DocumentSection {
    /// Create a new section with no content.
    pub fn new(title: impl Into<String>, level: u8) -> Self {
        Self {
            title: title.into(),
            level: level.clamp(1, 6),
            content: Vec::new(),
            subsections: Vec::new(),
        }
    }

    /// Create a section with content blocks.
    pub fn with_content(title: impl Into<String>, level: u8, content: Vec<ContentBlock>) -> Self {
        Self {
            content,
            ..Self::new(title, level)
        }
    }

    /// Add a content block.
    pub fn add_block(&mut self, block: ContentBlock) {
        self.content.push(block);
    }

    /// Add a subsection.
    pub fn add_subsection(&mut self, section: DocumentSection) {
        self.subsections.push(section);
    }

    /// Total number of sections in this subtree (including self).
    pub fn subtree_count(&self) -> usize {
        1 + self
            .subsections
            .iter()
            .map(|s| s.subtree_count())
            .sum::<usize>()
    }

    /// Collect every table in this subtree, pre-order.
    pub fn collect_tables<'a>(&'a self, out: &mut Vec<&'a TableBlock>) {
        for block in &self.content {
            if let Some(table) = block.as_table() {
                out.push(table);
            }
        }
        for sub in &self.subsections {
            sub.collect_tables(out);
        }
    }

    /// Check whether any block in this subtree satisfies a predicate.
    pub fn any_block(&self, pred: &dyn Fn(&ContentBlock) -> bool) -> bool {
        self.content.iter().any(|b| pred(b))
            || self.subsections.iter().any(|s| s.any_block(pred))
    }
}
