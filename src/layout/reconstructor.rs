//! Reading-order reconstruction of positioned page elements.
//!
//! Elements are filtered by confidence, sorted into reading order,
//! grouped into lines and paragraphs, classified, merged with
//! reconstructed table grids, and emitted as markdown text.

use once_cell::sync::Lazy;
use rayon::prelude::*;
use regex::Regex;
use unicode_normalization::UnicodeNormalization;

use super::element::{BoundingBox, ElementType, PageElements, PositionedElement};
use super::options::LayoutOptions;
use super::table_grid;

static ORDERED_MARKER: Lazy<Regex> = Lazy::new(|| Regex::new(r"^\d+\.").unwrap());
static BULLET_MARKER: Lazy<Regex> = Lazy::new(|| Regex::new(r"^[\u{2022}\u{00b7}\u{25aa}\u{25ab}\u{25e6}\u{2023}\u{2043}]").unwrap());
static DASH_MARKER: Lazy<Regex> = Lazy::new(|| Regex::new(r"^[-*+]").unwrap());
static LETTER_MARKER: Lazy<Regex> = Lazy::new(|| Regex::new(r"^[a-zA-Z]\.").unwrap());
static MULTI_SPACE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\s{2,}").unwrap());
static MARKER_PREFIX: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^([\u{2022}\u{00b7}\u{25aa}\u{25ab}\u{25e6}\u{2023}\u{2043}]|[-*+]|[a-zA-Z]\.)\s*").unwrap());

/// Reconstructs ordered markdown-like blocks from one page of positioned
/// elements.
///
/// Every operation is pure and synchronous. A single malformed element or
/// table never aborts the page; it is skipped or degraded and processing
/// continues.
pub struct LayoutReconstructor {
    options: LayoutOptions,
}

impl LayoutReconstructor {
    /// Create a reconstructor with default thresholds.
    pub fn new() -> Self {
        Self::with_options(LayoutOptions::default())
    }

    /// Create a reconstructor with custom thresholds.
    pub fn with_options(options: LayoutOptions) -> Self {
        Self { options }
    }

    /// Get the active options.
    pub fn options(&self) -> &LayoutOptions {
        &self.options
    }

    /// Reconstruct one page into markdown text.
    pub fn reconstruct_page(&self, page: &PageElements) -> String {
        let elements = self.filter_elements(&page.elements);
        log::debug!(
            "layout: {} of {} elements kept after confidence filter",
            elements.len(),
            page.elements.len()
        );

        let page_avg_height = average_height(&elements);
        let lines = self.group_into_lines(elements);
        let paragraphs = self.group_into_paragraphs(lines, page_avg_height);

        let mut blocks: Vec<PageBlock> = paragraphs
            .into_iter()
            .filter(|p| !p.text().trim().is_empty())
            .map(|p| {
                let kind = self.classify(&p, page, page_avg_height);
                let bbox = p.bbox();
                PageBlock {
                    y: bbox.y0,
                    x: bbox.x0,
                    payload: Payload::Text {
                        kind,
                        text: p.text(),
                    },
                }
            })
            .collect();

        for region in &page.tables {
            if let Some(markdown) = table_grid::region_to_markdown(region) {
                blocks.push(PageBlock {
                    y: region.bbox.y0,
                    x: region.bbox.x0,
                    payload: Payload::Table(markdown),
                });
            }
        }

        blocks.sort_by(|a, b| {
            (a.y, a.x)
                .partial_cmp(&(b.y, b.x))
                .unwrap_or(std::cmp::Ordering::Equal)
        });

        emit_markdown(blocks)
    }

    /// Drop low-confidence, empty, or geometrically invalid elements and
    /// normalize their text to NFC, preserving input order.
    fn filter_elements(&self, elements: &[PositionedElement]) -> Vec<PositionedElement> {
        let mut kept: Vec<PositionedElement> = elements
            .iter()
            .filter(|el| el.confidence >= self.options.confidence_threshold && el.bbox.is_valid())
            .filter_map(|el| {
                let text: String = el.text.nfc().collect();
                if text.trim().is_empty() {
                    None
                } else {
                    Some(PositionedElement::new(text, el.bbox, el.kind, el.confidence))
                }
            })
            .collect();

        kept.sort_by(|a, b| {
            (a.bbox.y0, a.bbox.x0)
                .partial_cmp(&(b.bbox.y0, b.bbox.x0))
                .unwrap_or(std::cmp::Ordering::Equal)
        });
        kept
    }

    /// Group reading-order elements into lines.
    ///
    /// An element joins the current line while its vertical offset from
    /// the running line average stays within `line_height_factor` times
    /// the line's average element height.
    fn group_into_lines(&self, elements: Vec<PositionedElement>) -> Vec<Line> {
        let mut lines: Vec<Line> = Vec::new();

        for el in elements {
            let joins = lines
                .last()
                .map(|line| {
                    let threshold = self.options.line_height_factor * line.avg_height().max(1.0);
                    (el.bbox.center_y() - line.avg_center_y()).abs() <= threshold
                })
                .unwrap_or(false);

            if joins {
                if let Some(line) = lines.last_mut() {
                    line.elements.push(el);
                }
            } else {
                lines.push(Line { elements: vec![el] });
            }
        }

        for line in &mut lines {
            line.elements.sort_by(|a, b| {
                a.bbox
                    .x0
                    .partial_cmp(&b.bbox.x0)
                    .unwrap_or(std::cmp::Ordering::Equal)
            });
        }
        lines
    }

    /// Merge consecutive lines into paragraphs while the vertical gap
    /// stays within the paragraph threshold and the dominant element kind
    /// does not change.
    ///
    /// Lines that open with a list marker or look like a table row always
    /// start their own paragraph; merging them would destroy the per-row
    /// and per-item structure the classifier needs.
    fn group_into_paragraphs(&self, lines: Vec<Line>, avg_line_height: f32) -> Vec<Paragraph> {
        let threshold = self
            .options
            .paragraph_gap_px
            .max(avg_line_height * self.options.paragraph_gap_factor);

        let mut paragraphs: Vec<Paragraph> = Vec::new();
        for line in lines {
            let text = line.text();
            let standalone = looks_like_table_row(&text, self.options.column_min_words)
                || starts_with_list_marker(&text);

            if !standalone {
                if let Some(par) = paragraphs.last_mut() {
                    let gap = line.top() - par.bottom();
                    if gap <= threshold
                        && line.dominant_kind() == par.dominant_kind()
                        && !looks_like_table_row(&par.text(), self.options.column_min_words)
                    {
                        par.lines.push(line);
                        continue;
                    }
                }
            }
            paragraphs.push(Paragraph { lines: vec![line] });
        }
        paragraphs
    }

    /// Classify one paragraph as heading, list item, table row, or text.
    ///
    /// A structural upstream label wins; generic text falls through to
    /// the geometry and marker heuristics.
    fn classify(&self, para: &Paragraph, page: &PageElements, page_avg_height: f32) -> BlockKind {
        match para.dominant_kind() {
            ElementType::Heading => {
                return BlockKind::Heading(self.heading_level(para, page, page_avg_height))
            }
            ElementType::ListItem => return BlockKind::ListItem,
            ElementType::Table => return BlockKind::TableRow,
            ElementType::Paragraph => {}
        }

        let text = para.text();
        let trimmed = text.trim();
        let words = trimmed.split_whitespace().count();

        let in_header_zone = page.height > 0.0
            && para.top() < page.height * self.options.header_zone_ratio
            && para.avg_height() > page_avg_height;
        let is_large = para.avg_height() > page_avg_height * self.options.heading_height_factor;

        if words > 0
            && words <= self.options.heading_max_words
            && (trimmed.ends_with('.') || is_uppercase(trimmed) || in_header_zone || is_large)
        {
            return BlockKind::Heading(self.heading_level(para, page, page_avg_height));
        }

        if starts_with_list_marker(trimmed) {
            return BlockKind::ListItem;
        }

        if looks_like_table_row(trimmed, self.options.column_min_words) {
            return BlockKind::TableRow;
        }

        BlockKind::Text
    }

    /// Heading level from geometry: 1 in the top page zone, 2 for
    /// oversized text elsewhere, 3 otherwise.
    fn heading_level(&self, para: &Paragraph, page: &PageElements, page_avg_height: f32) -> u8 {
        if page.height > 0.0 && para.top() < page.height * self.options.header_zone_ratio {
            1
        } else if para.avg_height() > page_avg_height * self.options.heading_height_factor {
            2
        } else {
            3
        }
    }
}

impl Default for LayoutReconstructor {
    fn default() -> Self {
        Self::new()
    }
}

/// Reconstruct a batch of pages in parallel, preserving input order.
///
/// Each page is an independent, stateless conversion, so pages are
/// fanned out over the rayon pool and collected back in order.
pub fn reconstruct_pages(pages: &[PageElements], options: LayoutOptions) -> Vec<String> {
    let reconstructor = LayoutReconstructor::with_options(options);
    pages
        .par_iter()
        .map(|page| reconstructor.reconstruct_page(page))
        .collect()
}

/// A reading-order line of elements sharing a baseline band.
#[derive(Debug, Clone)]
struct Line {
    elements: Vec<PositionedElement>,
}

impl Line {
    fn avg_height(&self) -> f32 {
        average_height(&self.elements)
    }

    fn avg_center_y(&self) -> f32 {
        if self.elements.is_empty() {
            return 0.0;
        }
        self.elements.iter().map(|e| e.bbox.center_y()).sum::<f32>() / self.elements.len() as f32
    }

    fn top(&self) -> f32 {
        self.elements
            .iter()
            .map(|e| e.bbox.y0)
            .fold(f32::INFINITY, f32::min)
    }

    fn bottom(&self) -> f32 {
        self.elements
            .iter()
            .map(|e| e.bbox.y1)
            .fold(f32::NEG_INFINITY, f32::max)
    }

    fn dominant_kind(&self) -> ElementType {
        dominant_kind(self.elements.iter().map(|e| e.kind))
    }

    fn text(&self) -> String {
        self.elements
            .iter()
            .map(|e| e.text.trim())
            .collect::<Vec<_>>()
            .join(" ")
    }
}

/// A paragraph of consecutive lines.
#[derive(Debug, Clone)]
struct Paragraph {
    lines: Vec<Line>,
}

impl Paragraph {
    fn text(&self) -> String {
        self.lines
            .iter()
            .map(|l| l.text())
            .collect::<Vec<_>>()
            .join(" ")
    }

    fn top(&self) -> f32 {
        self.lines
            .iter()
            .map(|l| l.top())
            .fold(f32::INFINITY, f32::min)
    }

    fn bottom(&self) -> f32 {
        self.lines
            .iter()
            .map(|l| l.bottom())
            .fold(f32::NEG_INFINITY, f32::max)
    }

    fn avg_height(&self) -> f32 {
        let elements: Vec<&PositionedElement> =
            self.lines.iter().flat_map(|l| &l.elements).collect();
        if elements.is_empty() {
            return 0.0;
        }
        elements.iter().map(|e| e.bbox.height()).sum::<f32>() / elements.len() as f32
    }

    fn dominant_kind(&self) -> ElementType {
        dominant_kind(self.lines.iter().flat_map(|l| &l.elements).map(|e| e.kind))
    }

    fn bbox(&self) -> BoundingBox {
        let mut bbox = BoundingBox::new(f32::INFINITY, f32::INFINITY, f32::NEG_INFINITY, f32::NEG_INFINITY);
        for el in self.lines.iter().flat_map(|l| &l.elements) {
            bbox.x0 = bbox.x0.min(el.bbox.x0);
            bbox.y0 = bbox.y0.min(el.bbox.y0);
            bbox.x1 = bbox.x1.max(el.bbox.x1);
            bbox.y1 = bbox.y1.max(el.bbox.y1);
        }
        bbox
    }
}

/// Classified block kind for markdown emission.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum BlockKind {
    Heading(u8),
    ListItem,
    TableRow,
    Text,
}

struct PageBlock {
    y: f32,
    x: f32,
    payload: Payload,
}

enum Payload {
    Text { kind: BlockKind, text: String },
    Table(String),
}

fn average_height(elements: &[PositionedElement]) -> f32 {
    if elements.is_empty() {
        return 12.0;
    }
    elements.iter().map(|e| e.bbox.height()).sum::<f32>() / elements.len() as f32
}

fn is_uppercase(text: &str) -> bool {
    let mut has_letter = false;
    for c in text.chars().filter(|c| c.is_alphabetic()) {
        has_letter = true;
        if !c.is_uppercase() {
            return false;
        }
    }
    has_letter
}

fn starts_with_list_marker(text: &str) -> bool {
    let trimmed = text.trim_start();
    ORDERED_MARKER.is_match(trimmed)
        || BULLET_MARKER.is_match(trimmed)
        || DASH_MARKER.is_match(trimmed)
        || LETTER_MARKER.is_match(trimmed)
}

fn looks_like_table_row(text: &str, min_words: usize) -> bool {
    let trimmed = text.trim();
    if trimmed.contains('|') || trimmed.contains('\t') {
        return true;
    }
    MULTI_SPACE.split(trimmed).filter(|c| !c.is_empty()).count() >= min_words
}

/// Pick the strict-majority structural kind, defaulting to paragraph.
fn dominant_kind(kinds: impl Iterator<Item = ElementType>) -> ElementType {
    let mut heading = 0usize;
    let mut list = 0usize;
    let mut table = 0usize;
    let mut other = 0usize;
    for kind in kinds {
        match kind {
            ElementType::Heading => heading += 1,
            ElementType::ListItem => list += 1,
            ElementType::Table => table += 1,
            ElementType::Paragraph => other += 1,
        }
    }
    if heading > list + table + other {
        ElementType::Heading
    } else if list > heading + table + other {
        ElementType::ListItem
    } else if table > heading + list + other {
        ElementType::Table
    } else {
        ElementType::Paragraph
    }
}

/// Serialize ordered blocks to markdown, collecting consecutive table
/// rows into one pipe table.
fn emit_markdown(blocks: Vec<PageBlock>) -> String {
    let mut out: Vec<String> = Vec::new();
    let mut pending_rows: Vec<String> = Vec::new();

    for block in blocks {
        match block.payload {
            Payload::Text {
                kind: BlockKind::TableRow,
                text,
            } => pending_rows.push(text),
            Payload::Text { kind, text } => {
                flush_table_rows(&mut out, &mut pending_rows);
                match kind {
                    BlockKind::Heading(level) => {
                        let level = level.clamp(1, 6) as usize;
                        out.push(format!("{} {}", "#".repeat(level), text.trim()));
                        out.push(String::new());
                    }
                    BlockKind::ListItem => {
                        out.push(format_list_item(text.trim()));
                    }
                    BlockKind::Text | BlockKind::TableRow => {
                        out.push(text.trim().to_string());
                        out.push(String::new());
                    }
                }
            }
            Payload::Table(markdown) => {
                flush_table_rows(&mut out, &mut pending_rows);
                out.push(markdown);
                out.push(String::new());
            }
        }
    }
    flush_table_rows(&mut out, &mut pending_rows);

    out.join("\n").trim().to_string()
}

/// Ordered items already carry valid markdown syntax; everything else is
/// normalized to a dash marker.
fn format_list_item(text: &str) -> String {
    if ORDERED_MARKER.is_match(text) {
        text.to_string()
    } else {
        format!("- {}", MARKER_PREFIX.replace(text, ""))
    }
}

/// Emit accumulated table rows as one pipe table with the first row as
/// header, padding or truncating body rows to the header width.
fn flush_table_rows(out: &mut Vec<String>, pending: &mut Vec<String>) {
    if pending.is_empty() {
        return;
    }
    let rows: Vec<Vec<String>> = pending.drain(..).map(|r| split_row_cells(&r)).collect();
    let width = rows[0].len().max(1);

    out.push(format!("| {} |", rows[0].join(" | ")));
    out.push(format!("|{}|", vec!["---"; width].join("|")));
    for row in &rows[1..] {
        let mut cells = row.clone();
        cells.truncate(width);
        while cells.len() < width {
            cells.push(String::new());
        }
        out.push(format!("| {} |", cells.join(" | ")));
    }
    out.push(String::new());
}

/// Split a classified table-row paragraph into cells on pipes, tabs, or
/// runs of two or more spaces.
fn split_row_cells(text: &str) -> Vec<String> {
    let text = text.trim();
    let cells: Vec<String> = if text.contains('|') {
        text.split('|')
            .map(|c| c.trim().to_string())
            .filter(|c| !c.is_empty())
            .collect()
    } else if text.contains('\t') {
        text.split('\t').map(|c| c.trim().to_string()).collect()
    } else {
        MULTI_SPACE
            .split(text)
            .filter(|c| !c.is_empty())
            .map(|c| c.trim().to_string())
            .collect()
    };

    if cells.is_empty() {
        vec![text.to_string()]
    } else {
        cells
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::layout::{TableCellPrediction, TableRegion, TableStructure};

    fn element(text: &str, x: f32, y: f32, w: f32, h: f32, conf: f32) -> PositionedElement {
        PositionedElement::new(
            text,
            BoundingBox::new(x, y, x + w, y + h),
            ElementType::Paragraph,
            conf,
        )
    }

    fn page_with(elements: Vec<PositionedElement>) -> PageElements {
        PageElements {
            width: 800.0,
            height: 1000.0,
            elements,
            tables: Vec::new(),
        }
    }

    #[test]
    fn test_low_confidence_elements_dropped() {
        let page = page_with(vec![
            element("kept", 0.0, 500.0, 100.0, 12.0, 0.9),
            element("dropped", 0.0, 530.0, 100.0, 12.0, 0.3),
        ]);

        let md = LayoutReconstructor::new().reconstruct_page(&page);
        assert!(md.contains("kept"));
        assert!(!md.contains("dropped"));
    }

    #[test]
    fn test_reading_order_sorts_by_y_then_x() {
        let page = page_with(vec![
            element("second", 0.0, 600.0, 100.0, 12.0, 0.9),
            element("first", 0.0, 400.0, 100.0, 12.0, 0.9),
        ]);

        let md = LayoutReconstructor::new().reconstruct_page(&page);
        let first_pos = md.find("first").unwrap();
        let second_pos = md.find("second").unwrap();
        assert!(first_pos < second_pos);
    }

    #[test]
    fn test_same_line_elements_join_left_to_right() {
        let page = page_with(vec![
            element("world", 200.0, 500.0, 80.0, 12.0, 0.9),
            element("hello", 10.0, 501.0, 80.0, 12.0, 0.9),
        ]);

        let md = LayoutReconstructor::new().reconstruct_page(&page);
        assert!(md.contains("hello world"));
    }

    #[test]
    fn test_paragraph_split_on_large_gap() {
        let page = page_with(vec![
            element("alpha beta gamma delta epsilon zeta", 0.0, 400.0, 300.0, 12.0, 0.9),
            element("eta theta iota kappa lambda mu", 0.0, 600.0, 300.0, 12.0, 0.9),
        ]);

        let md = LayoutReconstructor::new().reconstruct_page(&page);
        assert!(md.contains("alpha beta gamma delta epsilon zeta\n\neta theta iota kappa lambda mu"));
    }

    #[test]
    fn test_upstream_heading_label_wins() {
        let mut page = page_with(vec![]);
        page.add_element(PositionedElement::new(
            "Quarterly Results Overview Apply Now Test",
            BoundingBox::new(0.0, 500.0, 200.0, 512.0),
            ElementType::Heading,
            0.95,
        ));

        let md = LayoutReconstructor::new().reconstruct_page(&page);
        assert!(md.starts_with("###"), "expected heading, got: {}", md);
    }

    #[test]
    fn test_uppercase_short_paragraph_is_heading() {
        let page = page_with(vec![element("EXECUTIVE SUMMARY", 0.0, 500.0, 200.0, 12.0, 0.9)]);

        let md = LayoutReconstructor::new().reconstruct_page(&page);
        assert!(md.starts_with('#'), "expected heading, got: {}", md);
    }

    #[test]
    fn test_top_zone_large_text_is_level_one() {
        let page = page_with(vec![
            element("Annual Report", 0.0, 20.0, 300.0, 30.0, 0.9),
            element("body text follows here with several more words", 0.0, 400.0, 400.0, 12.0, 0.9),
        ]);

        let md = LayoutReconstructor::new().reconstruct_page(&page);
        assert!(md.starts_with("# Annual Report"), "got: {}", md);
    }

    #[test]
    fn test_bullet_marker_becomes_list_item() {
        let page = page_with(vec![element(
            "\u{2022} first bullet point entry here and more",
            0.0,
            500.0,
            200.0,
            12.0,
            0.9,
        )]);

        let md = LayoutReconstructor::new().reconstruct_page(&page);
        assert!(md.starts_with("- first bullet point"), "got: {}", md);
    }

    #[test]
    fn test_ordered_marker_kept_verbatim() {
        let page = page_with(vec![element(
            "2. second step of the procedure described",
            0.0,
            500.0,
            200.0,
            12.0,
            0.9,
        )]);

        let md = LayoutReconstructor::new().reconstruct_page(&page);
        assert!(md.starts_with("2. second step"), "got: {}", md);
    }

    #[test]
    fn test_consecutive_table_rows_form_pipe_table() {
        let page = page_with(vec![
            element("Name  Age  City  Country", 0.0, 500.0, 300.0, 12.0, 0.9),
            element("Alice  30  Paris  France", 0.0, 520.0, 300.0, 12.0, 0.9),
        ]);

        let md = LayoutReconstructor::new().reconstruct_page(&page);
        let lines: Vec<&str> = md.lines().collect();
        assert_eq!(lines[0], "| Name | Age | City | Country |");
        assert_eq!(lines[1], "|---|---|---|---|");
        assert_eq!(lines[2], "| Alice | 30 | Paris | France |");
    }

    #[test]
    fn test_table_region_merged_in_reading_order() {
        let mut page = page_with(vec![
            element("intro paragraph with enough words to stay text", 0.0, 100.0, 400.0, 12.0, 0.9),
            element("closing paragraph with enough words to stay text", 0.0, 700.0, 400.0, 12.0, 0.9),
        ]);
        page.add_table(TableRegion::structured(
            BoundingBox::new(0.0, 300.0, 400.0, 500.0),
            "",
            TableStructure {
                num_rows: 1,
                num_cols: 2,
                cells: vec![
                    TableCellPrediction {
                        start_row_offset_idx: 0,
                        start_col_offset_idx: 0,
                        bbox: BoundingBox::new(0.0, 0.0, 1.0, 1.0),
                        text: "H1".into(),
                    },
                    TableCellPrediction {
                        start_row_offset_idx: 0,
                        start_col_offset_idx: 1,
                        bbox: BoundingBox::new(1.0, 0.0, 2.0, 1.0),
                        text: "H2".into(),
                    },
                ],
            },
        ));

        let md = LayoutReconstructor::new().reconstruct_page(&page);
        let intro = md.find("intro").unwrap();
        let table = md.find("| H1 | H2 |").unwrap();
        let closing = md.find("closing").unwrap();
        assert!(intro < table && table < closing, "got: {}", md);
    }

    #[test]
    fn test_failed_table_structure_degrades() {
        let mut page = page_with(vec![]);
        page.add_table(TableRegion::unstructured(
            BoundingBox::new(0.0, 100.0, 400.0, 200.0),
            "totals 1 2 3",
        ));

        let md = LayoutReconstructor::new().reconstruct_page(&page);
        assert_eq!(md, "**Table:** totals 1 2 3");
    }

    #[test]
    fn test_empty_page_yields_empty_string() {
        let md = LayoutReconstructor::new().reconstruct_page(&PageElements::new(800.0, 1000.0));
        assert_eq!(md, "");
    }

    #[test]
    fn test_reconstruct_pages_preserves_order() {
        let pages: Vec<PageElements> = (0..4)
            .map(|i| {
                page_with(vec![element(
                    &format!("page {} content with enough words to be text", i),
                    0.0,
                    500.0,
                    300.0,
                    12.0,
                    0.9,
                )])
            })
            .collect();

        let results = reconstruct_pages(&pages, LayoutOptions::default());
        assert_eq!(results.len(), 4);
        for (i, md) in results.iter().enumerate() {
            assert!(md.contains(&format!("page {} content", i)));
        }
    }
}
