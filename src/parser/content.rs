//! Per-section content extraction.
//!
//! Applied to the text strictly between one header and the next, this
//! module extracts typed content blocks with independent pattern passes:
//! block structures first (code, tables, lists, blockquotes), then the
//! inline extractions (images, links) that apply regardless of how the
//! surrounding text was classified.

use once_cell::sync::Lazy;
use regex::Regex;

use crate::model::{CodeBlock, ContentBlock, ImageRef, LinkRef, ListBlock, TableBlock};

static UNORDERED_ITEM: Lazy<Regex> = Lazy::new(|| Regex::new(r"^(\s*)[*\-+]\s+(.+)$").unwrap());
static ORDERED_ITEM: Lazy<Regex> = Lazy::new(|| Regex::new(r"^(\s*)\d+\.\s+(.+)$").unwrap());
static CODE_BLOCK: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?s)```(\w+)?\n(.*?)```").unwrap());
static TABLE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\|(.+)\|[ \t]*\n\|[-\s|:]+\|[ \t]*\n((?:\|.+\|[ \t]*\n?)*)").unwrap());
static TABLE_LINE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\|.*\|").unwrap());
static IMAGE: Lazy<Regex> = Lazy::new(|| Regex::new(r"!\[([^\]]*)\]\(([^)]+)\)").unwrap());
static LINK: Lazy<Regex> = Lazy::new(|| Regex::new(r"\[([^\]]+)\]\(([^)]+)\)").unwrap());
static BLOCKQUOTE: Lazy<Regex> = Lazy::new(|| Regex::new(r"^>\s+(.+)$").unwrap());
static BOLD: Lazy<Regex> = Lazy::new(|| Regex::new(r"\*\*(.+?)\*\*").unwrap());
static ITALIC: Lazy<Regex> = Lazy::new(|| Regex::new(r"\*(.+?)\*").unwrap());
static INLINE_CODE: Lazy<Regex> = Lazy::new(|| Regex::new(r"`([^`]+)`").unwrap());

/// Extract all content blocks from one section's text.
///
/// Blocks are returned grouped by kind in a fixed extraction order:
/// paragraphs, lists, code blocks, tables, images, links, blockquotes.
pub fn extract_content(content: &str) -> Vec<ContentBlock> {
    if content.trim().is_empty() {
        return Vec::new();
    }

    let mut blocks = Vec::new();

    for text in extract_paragraphs(content) {
        blocks.push(ContentBlock::Paragraph { text });
    }
    for list in extract_lists(content) {
        blocks.push(ContentBlock::List(list));
    }
    for code in extract_code_blocks(content) {
        blocks.push(ContentBlock::Code(code));
    }
    for table in extract_tables(content) {
        blocks.push(ContentBlock::Table(table));
    }
    for image in extract_images(content) {
        blocks.push(ContentBlock::Image(image));
    }
    for link in extract_links(content) {
        blocks.push(ContentBlock::Link(link));
    }
    for quote in extract_blockquotes(content) {
        blocks.push(ContentBlock::Blockquote { text: quote });
    }

    blocks
}

/// Extract plain paragraphs: strip every recognized block structure, then
/// split the remainder on blank lines.
fn extract_paragraphs(content: &str) -> Vec<String> {
    let without_code = CODE_BLOCK.replace_all(content, "");
    let without_tables = TABLE_LINE.replace_all(&without_code, "");

    // Stripped lines are blanked, not removed, so that text separated by
    // a list or quote does not fuse into one paragraph.
    let clean: String = without_tables
        .lines()
        .map(|line| {
            if UNORDERED_ITEM.is_match(line)
                || ORDERED_ITEM.is_match(line)
                || BLOCKQUOTE.is_match(line)
            {
                ""
            } else {
                line
            }
        })
        .collect::<Vec<_>>()
        .join("\n");

    clean
        .split("\n\n")
        .map(str::trim)
        .filter(|para| !para.is_empty() && !para.starts_with('#'))
        .map(clean_inline_formatting)
        .collect()
}

/// Extract lists with a line scan.
///
/// A change of marker kind, or a non-blank non-list line, closes the
/// current list; indentation depth is leading-whitespace length / 2.
fn extract_lists(content: &str) -> Vec<ListBlock> {
    let mut lists: Vec<ListBlock> = Vec::new();
    let mut current: Option<ListBlock> = None;

    for line in content.lines() {
        let line = line.trim_end();

        let item = if let Some(caps) = UNORDERED_ITEM.captures(line) {
            Some((false, caps[1].len() / 2, clean_inline_formatting(&caps[2])))
        } else if let Some(caps) = ORDERED_ITEM.captures(line) {
            Some((true, caps[1].len() / 2, clean_inline_formatting(&caps[2])))
        } else {
            None
        };

        match item {
            Some((ordered, level, text)) => {
                let continues = current
                    .as_ref()
                    .map(|list| list.ordered == ordered)
                    .unwrap_or(false);
                if !continues {
                    if let Some(done) = current.take() {
                        lists.push(done);
                    }
                    current = Some(ListBlock::new(ordered));
                }
                if let Some(list) = current.as_mut() {
                    list.push(text, level);
                }
            }
            None => {
                if !line.trim().is_empty() {
                    if let Some(done) = current.take() {
                        lists.push(done);
                    }
                }
            }
        }
    }

    if let Some(done) = current {
        lists.push(done);
    }
    lists
}

/// Extract fenced code blocks; content is kept verbatim apart from edge
/// trimming, and a missing language tag defaults to "text".
fn extract_code_blocks(content: &str) -> Vec<CodeBlock> {
    CODE_BLOCK
        .captures_iter(content)
        .map(|caps| {
            let language = caps.get(1).map(|m| m.as_str());
            let code = caps[2].trim().to_string();
            CodeBlock::new(language, code)
        })
        .collect()
}

/// Extract GFM pipe tables: a header row, a separator row, and zero or
/// more body rows.
pub(crate) fn extract_tables(content: &str) -> Vec<TableBlock> {
    TABLE
        .captures_iter(content)
        .filter_map(|caps| {
            let headers = split_cells(&caps[1]);
            let rows: Vec<Vec<String>> = caps[2]
                .lines()
                .filter(|line| !line.trim().is_empty() && line.contains('|'))
                .map(split_cells)
                .filter(|cells| !cells.is_empty())
                .collect();

            if headers.is_empty() || rows.is_empty() {
                None
            } else {
                Some(TableBlock::new(headers, rows))
            }
        })
        .collect()
}

fn split_cells(row: impl AsRef<str>) -> Vec<String> {
    row.as_ref()
        .split('|')
        .map(str::trim)
        .filter(|cell| !cell.is_empty())
        .map(str::to_string)
        .collect()
}

fn extract_images(content: &str) -> Vec<ImageRef> {
    IMAGE
        .captures_iter(content)
        .map(|caps| ImageRef {
            alt_text: caps[1].to_string(),
            url: caps[2].to_string(),
        })
        .collect()
}

fn extract_links(content: &str) -> Vec<LinkRef> {
    LINK.captures_iter(content)
        .map(|caps| LinkRef {
            text: caps[1].to_string(),
            url: caps[2].to_string(),
        })
        .collect()
}

fn extract_blockquotes(content: &str) -> Vec<String> {
    content
        .lines()
        .filter_map(|line| BLOCKQUOTE.captures(line))
        .map(|caps| caps[1].trim().to_string())
        .collect()
}

/// Strip bold, italic, and inline-code markers, keeping the inner text.
fn clean_inline_formatting(text: &str) -> String {
    let text = BOLD.replace_all(text, "$1");
    let text = ITALIC.replace_all(&text, "$1");
    let text = INLINE_CODE.replace_all(&text, "$1");
    text.trim().to_string()
}
