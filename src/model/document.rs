//! Document-level types.

use super::{ContentBlock, DocumentSection, TableBlock};
use serde::{Deserialize, Serialize};

/// The canonical hierarchical document representation.
///
/// Built once per conversion call and immutable thereafter; no shared
/// mutable state persists across calls.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DocumentModel {
    /// Top-level sections in document order
    pub sections: Vec<DocumentSection>,

    /// Aggregate document metadata
    pub metadata: DocumentMetadata,
}

impl DocumentModel {
    /// Create an empty model.
    pub fn empty() -> Self {
        Self {
            sections: Vec::new(),
            metadata: DocumentMetadata::default(),
        }
    }

    /// Check if the document has any sections.
    pub fn is_empty(&self) -> bool {
        self.sections.is_empty()
    }

    /// Number of sections obtained by flattening the section tree.
    pub fn section_count(&self) -> usize {
        self.sections.iter().map(|s| s.subtree_count()).sum()
    }

    /// Collect every table in the document, pre-order across sections.
    pub fn tables(&self) -> Vec<&TableBlock> {
        let mut out = Vec::new();
        for section in &self.sections {
            section.collect_tables(&mut out);
        }
        out
    }

    /// Check whether any block in the document satisfies a predicate.
    pub fn any_block(&self, pred: &dyn Fn(&ContentBlock) -> bool) -> bool {
        self.sections.iter().any(|s| s.any_block(pred))
    }
}

impl Default for DocumentModel {
    fn default() -> Self {
        Self::empty()
    }
}

/// Aggregate metadata over the whole document.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DocumentMetadata {
    /// Total number of sections (flat count over the whole tree)
    pub total_sections: usize,

    /// Maximum heading level observed (0 for an empty document)
    pub max_heading_level: u8,

    /// Whether any section contains a table
    pub has_tables: bool,

    /// Whether any section contains a code block
    pub has_code_blocks: bool,

    /// Whether any section contains a list
    pub has_lists: bool,

    /// Whether any section contains an image
    pub has_images: bool,
}
