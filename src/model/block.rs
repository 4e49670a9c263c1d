//! Content block types.

use serde::{Deserialize, Serialize};

/// A typed content block within a section.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ContentBlock {
    /// A paragraph of plain text (inline markers already stripped)
    Paragraph {
        /// Paragraph text
        text: String,
    },

    /// An ordered or unordered list
    List(ListBlock),

    /// A fenced code block
    Code(CodeBlock),

    /// A pipe table
    Table(TableBlock),

    /// An image reference
    Image(ImageRef),

    /// A hyperlink
    Link(LinkRef),

    /// A blockquote line
    Blockquote {
        /// Quoted text with the marker stripped
        text: String,
    },
}

impl ContentBlock {
    /// Check if this block is a table.
    pub fn is_table(&self) -> bool {
        matches!(self, ContentBlock::Table(_))
    }

    /// Get the table payload if this block is one.
    pub fn as_table(&self) -> Option<&TableBlock> {
        match self {
            ContentBlock::Table(t) => Some(t),
            _ => None,
        }
    }
}

/// A list of items with a single marker kind.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ListBlock {
    /// Whether the list is numbered
    pub ordered: bool,

    /// Items in document order
    pub items: Vec<ListItem>,
}

impl ListBlock {
    /// Create a new empty list.
    pub fn new(ordered: bool) -> Self {
        Self {
            ordered,
            items: Vec::new(),
        }
    }

    /// Append an item.
    pub fn push(&mut self, text: impl Into<String>, level: usize) {
        self.items.push(ListItem {
            text: text.into(),
            level,
        });
    }

    /// Check if the list has no items.
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}

/// A single list item.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ListItem {
    /// Item text with inline markers stripped
    pub text: String,

    /// Nesting level (0 = top level, from leading-whitespace depth)
    pub level: usize,
}

/// A fenced code block.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CodeBlock {
    /// Language tag ("text" when the fence had none)
    pub language: String,

    /// Code content, kept verbatim
    pub code: String,
}

impl CodeBlock {
    /// Create a code block, defaulting the language to "text".
    pub fn new(language: Option<&str>, code: impl Into<String>) -> Self {
        Self {
            language: language.filter(|l| !l.is_empty()).unwrap_or("text").to_string(),
            code: code.into(),
        }
    }
}

/// A table with a header row and body rows.
///
/// Every row is padded or truncated to the header's column count at
/// construction time, so consumers can rely on a rectangular shape.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TableBlock {
    /// Header cells
    pub headers: Vec<String>,

    /// Body rows, each exactly `columns` cells wide
    pub rows: Vec<Vec<String>>,

    /// Column count (equals `headers.len()`)
    pub columns: usize,
}

impl TableBlock {
    /// Create a table, normalizing every row to the header width.
    pub fn new(headers: Vec<String>, rows: Vec<Vec<String>>) -> Self {
        let columns = headers.len();
        let rows = rows
            .into_iter()
            .map(|row| normalize_row(row, columns))
            .collect();
        Self {
            headers,
            rows,
            columns,
        }
    }

    /// Total number of rows including the header.
    pub fn row_count(&self) -> usize {
        self.rows.len() + 1
    }

    /// Check whether the table carries any body rows.
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

/// Pad with empty cells or truncate so the row is exactly `columns` wide.
fn normalize_row(mut row: Vec<String>, columns: usize) -> Vec<String> {
    row.truncate(columns);
    while row.len() < columns {
        row.push(String::new());
    }
    row
}

/// An image reference extracted from `![alt](url)` syntax.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ImageRef {
    /// Alternative text (may be empty)
    pub alt_text: String,

    /// Image URL or path
    pub url: String,
}

/// A hyperlink extracted from `[text](url)` syntax.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LinkRef {
    /// Link text
    pub text: String,

    /// Link target
    pub url: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_table_rows_padded_to_header_width() {
        let table = TableBlock::new(
            vec!["A".into(), "B".into(), "C".into()],
            vec![vec!["1".into()], vec!["1".into(), "2".into(), "3".into(), "4".into()]],
        );

        assert_eq!(table.columns, 3);
        assert_eq!(table.rows[0], vec!["1", "", ""]);
        assert_eq!(table.rows[1], vec!["1", "2", "3"]);
    }

    #[test]
    fn test_code_block_language_default() {
        let block = CodeBlock::new(None, "let x = 1;");
        assert_eq!(block.language, "text");

        let block = CodeBlock::new(Some("rust"), "let x = 1;");
        assert_eq!(block.language, "rust");
    }

    #[test]
    fn test_list_push() {
        let mut list = ListBlock::new(false);
        assert!(list.is_empty());

        list.push("first", 0);
        list.push("nested", 1);
        assert_eq!(list.items.len(), 2);
        assert_eq!(list.items[1].level, 1);
    }

    #[test]
    fn test_block_as_table() {
        let block = ContentBlock::Table(TableBlock::new(vec!["H".into()], vec![]));
        assert!(block.is_table());
        assert!(block.as_table().is_some());

        let block = ContentBlock::Paragraph { text: "text".into() };
        assert!(block.as_table().is_none());
    }
}
