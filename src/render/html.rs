//! Markdown to HTML rendering.
//!
//! A small independent compiler that works on markdown text directly,
//! without going through the document model, since upstream content is
//! not guaranteed to satisfy the model's section-based assumptions.
//!
//! The transformation passes run in the fixed order of [`PASSES`]:
//! later passes assume earlier ones have already consumed their syntax,
//! so the precedence is enforced by the pass table itself.

use once_cell::sync::Lazy;
use regex::{Captures, Regex};

static FENCED_CODE: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?s)```(\w+)?\n(.*?)\n```").unwrap());
static TABLE_SEPARATOR: Lazy<Regex> = Lazy::new(|| Regex::new(r"^\s*\|[\s\-:|]+\|\s*$").unwrap());
static HORIZONTAL_RULE: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?m)^---+$").unwrap());
static HEADER: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?m)^(#{1,6})\s+(.+)$").unwrap());
static UNORDERED_ITEM: Lazy<Regex> = Lazy::new(|| Regex::new(r"^\s*[-*+]\s+").unwrap());
static ORDERED_ITEM: Lazy<Regex> = Lazy::new(|| Regex::new(r"^\s*\d+\.\s+").unwrap());
static BOLD_ITALIC: Lazy<Regex> = Lazy::new(|| Regex::new(r"\*\*\*(.+?)\*\*\*").unwrap());
static BOLD: Lazy<Regex> = Lazy::new(|| Regex::new(r"\*\*(.+?)\*\*").unwrap());
static ITALIC: Lazy<Regex> = Lazy::new(|| Regex::new(r"\*(.+?)\*").unwrap());
static STRIKETHROUGH: Lazy<Regex> = Lazy::new(|| Regex::new(r"~~(.+?)~~").unwrap());
static INLINE_CODE: Lazy<Regex> = Lazy::new(|| Regex::new(r"`([^`]+)`").unwrap());
static LINK: Lazy<Regex> = Lazy::new(|| Regex::new(r"\[([^\]]+)\]\(([^)]+)\)").unwrap());
static IMAGE: Lazy<Regex> = Lazy::new(|| Regex::new(r"!\[([^\]]*)\]\(([^)]+)\)").unwrap());
static BLOCK_TAG: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^<(h[1-6]|p|div|blockquote|pre|table|ul|ol|li|hr)").unwrap());

/// The fixed transformation pipeline, applied first to last.
const PASSES: &[fn(&str) -> String] = &[
    process_code_blocks,
    process_tables,
    process_horizontal_rules,
    process_blockquotes,
    process_headers,
    process_lists,
    process_inline_elements,
    process_paragraphs,
];

/// Convert markdown to a complete standalone HTML document.
pub fn to_html(markdown: &str) -> String {
    wrap_shell(&render_fragment(markdown))
}

/// Convert markdown to an HTML fragment (no document shell).
pub fn render_fragment(markdown: &str) -> String {
    let mut html = markdown.to_string();
    for pass in PASSES {
        html = pass(&html);
    }
    html
}

/// Fenced code blocks, then indented (4-space / tab) code blocks.
fn process_code_blocks(text: &str) -> String {
    let text = FENCED_CODE.replace_all(text, |caps: &Captures| {
        let lang_class = caps
            .get(1)
            .map(|lang| format!(" class=\"language-{}\"", lang.as_str()))
            .unwrap_or_default();
        format!(
            "<pre><code{}>{}</code></pre>",
            lang_class,
            escape_html(&caps[2])
        )
    });

    let mut result_lines: Vec<String> = Vec::new();
    let mut code_lines: Vec<String> = Vec::new();

    for line in text.lines() {
        if line.starts_with("    ") || line.starts_with('\t') {
            code_lines.push(line.trim_start().to_string());
        } else {
            flush_indented_code(&mut result_lines, &mut code_lines);
            result_lines.push(line.to_string());
        }
    }
    flush_indented_code(&mut result_lines, &mut code_lines);

    result_lines.join("\n")
}

fn flush_indented_code(out: &mut Vec<String>, code_lines: &mut Vec<String>) {
    if !code_lines.is_empty() {
        let code = code_lines.join("\n");
        out.push(format!("<pre><code>{}</code></pre>", escape_html(&code)));
        code_lines.clear();
    }
}

/// GFM pipe tables: header row, discarded separator row, body rows.
fn process_tables(text: &str) -> String {
    let lines: Vec<&str> = text.lines().collect();
    let mut out: Vec<String> = Vec::new();
    let mut i = 0;

    while i < lines.len() {
        let line = lines[i];
        let is_table_start = line.contains('|')
            && i + 1 < lines.len()
            && TABLE_SEPARATOR.is_match(lines[i + 1]);

        if is_table_start {
            let mut table_lines = vec![line];
            let mut j = i + 1;
            while j < lines.len() && lines[j].contains('|') {
                table_lines.push(lines[j]);
                j += 1;
            }
            out.push(table_to_html(&table_lines));
            i = j;
        } else {
            out.push(line.to_string());
            i += 1;
        }
    }

    out.join("\n")
}

/// Convert collected table lines to an HTML table.
///
/// Row 1 is the header, row 2 (the separator) is discarded, and every
/// body row is padded or truncated to the header's cell count.
fn table_to_html(table_lines: &[&str]) -> String {
    let headers = split_table_cells(table_lines[0]);
    let width = headers.len();

    let mut parts = vec!["<table>".to_string(), "<thead><tr>".to_string()];
    for cell in &headers {
        parts.push(format!("<th>{}</th>", escape_html(cell)));
    }
    parts.push("</tr></thead>".to_string());

    parts.push("<tbody>".to_string());
    for line in table_lines.iter().skip(2) {
        let mut cells = split_table_cells(line);
        cells.truncate(width);
        while cells.len() < width {
            cells.push(String::new());
        }
        parts.push("<tr>".to_string());
        for cell in &cells {
            parts.push(format!("<td>{}</td>", escape_html(cell)));
        }
        parts.push("</tr>".to_string());
    }
    parts.push("</tbody>".to_string());
    parts.push("</table>".to_string());

    parts.join("\n")
}

/// Cells between the outer pipes of one table row.
fn split_table_cells(line: &str) -> Vec<String> {
    let parts: Vec<&str> = line.split('|').collect();
    if parts.len() < 3 {
        return vec![line.trim().to_string()];
    }
    parts[1..parts.len() - 1]
        .iter()
        .map(|cell| cell.trim().to_string())
        .collect()
}

fn process_horizontal_rules(text: &str) -> String {
    HORIZONTAL_RULE.replace_all(text, "<hr>").into_owned()
}

/// Multi-line blockquotes, tolerating embedded blank lines.
fn process_blockquotes(text: &str) -> String {
    let lines: Vec<&str> = text.lines().collect();
    let mut out: Vec<String> = Vec::new();
    let mut i = 0;

    while i < lines.len() {
        if let Some(stripped) = lines[i].strip_prefix("> ") {
            let mut quote_lines = vec![stripped.to_string()];
            let mut j = i + 1;
            while j < lines.len() && (lines[j].starts_with("> ") || lines[j].trim().is_empty()) {
                quote_lines.push(
                    lines[j]
                        .strip_prefix("> ")
                        .unwrap_or("")
                        .to_string(),
                );
                j += 1;
            }
            let content = process_inline_elements(&quote_lines.join("\n"));
            out.push(format!("<blockquote>{}</blockquote>", content));
            i = j;
        } else {
            out.push(lines[i].to_string());
            i += 1;
        }
    }

    out.join("\n")
}

fn process_headers(text: &str) -> String {
    HEADER
        .replace_all(text, |caps: &Captures| {
            let level = caps[1].len();
            format!("<h{}>{}</h{}>", level, escape_html(&caps[2]), level)
        })
        .into_owned()
}

/// Ordered and unordered lists; each item's content goes through the
/// inline pass.
fn process_lists(text: &str) -> String {
    let lines: Vec<&str> = text.lines().collect();
    let mut out: Vec<String> = Vec::new();
    let mut i = 0;

    while i < lines.len() {
        let marker = if UNORDERED_ITEM.is_match(lines[i]) {
            Some((&*UNORDERED_ITEM, "ul"))
        } else if ORDERED_ITEM.is_match(lines[i]) {
            Some((&*ORDERED_ITEM, "ol"))
        } else {
            None
        };

        match marker {
            Some((pattern, tag)) => {
                let mut item_lines: Vec<&str> = Vec::new();
                let mut j = i;
                while j < lines.len()
                    && (pattern.is_match(lines[j]) || lines[j].trim().is_empty())
                {
                    item_lines.push(lines[j]);
                    j += 1;
                }
                out.push(list_to_html(&item_lines, pattern, tag));
                i = j;
            }
            None => {
                out.push(lines[i].to_string());
                i += 1;
            }
        }
    }

    out.join("\n")
}

fn list_to_html(item_lines: &[&str], pattern: &Regex, tag: &str) -> String {
    let mut parts = vec![format!("<{}>", tag)];
    for line in item_lines {
        if line.trim().is_empty() {
            continue;
        }
        let content = pattern.replace(line, "");
        parts.push(format!("<li>{}</li>", process_inline_elements(&content)));
    }
    parts.push(format!("</{}>", tag));
    parts.join("\n")
}

/// Inline elements in collision-safe precedence: bold-italic before bold
/// before italic, then strikethrough, inline code, links, images.
fn process_inline_elements(text: &str) -> String {
    let text = BOLD_ITALIC.replace_all(text, "<strong><em>${1}</em></strong>");
    let text = BOLD.replace_all(&text, "<strong>${1}</strong>");
    let text = ITALIC.replace_all(&text, "<em>${1}</em>");
    let text = STRIKETHROUGH.replace_all(&text, "<del>${1}</del>");
    let text = INLINE_CODE.replace_all(&text, "<code>${1}</code>");
    let text = LINK.replace_all(&text, "<a href=\"${2}\">${1}</a>");
    let text = IMAGE.replace_all(&text, "<img src=\"${2}\" alt=\"${1}\">");
    text.into_owned()
}

/// Wrap runs of consecutive plain lines in `<p>` tags; a blank line or
/// an already-rendered block tag flushes the accumulator.
fn process_paragraphs(text: &str) -> String {
    let mut out: Vec<String> = Vec::new();
    let mut paragraph: Vec<&str> = Vec::new();

    for line in text.lines() {
        if line.trim().is_empty() {
            flush_paragraph(&mut out, &mut paragraph);
        } else if BLOCK_TAG.is_match(line.trim_start()) {
            flush_paragraph(&mut out, &mut paragraph);
            out.push(line.to_string());
        } else {
            paragraph.push(line);
        }
    }
    flush_paragraph(&mut out, &mut paragraph);

    out.join("\n")
}

fn flush_paragraph(out: &mut Vec<String>, paragraph: &mut Vec<&str>) {
    if !paragraph.is_empty() {
        out.push(format!("<p>{}</p>", paragraph.join(" ")));
        paragraph.clear();
    }
}

/// Escape HTML special characters.
fn escape_html(text: &str) -> String {
    text.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&#39;")
}

/// Embed a rendered fragment in a standalone document shell.
///
/// The shell content is cosmetic and not part of the output contract.
fn wrap_shell(content: &str) -> String {
    format!(
        r#"<!DOCTYPE html>
<html lang="en">
<head>
<meta charset="UTF-8">
<meta name="viewport" content="width=device-width, initial-scale=1.0">
<title>Converted Document</title>
<style>
body {{
    font-family: -apple-system, BlinkMacSystemFont, 'Segoe UI', Roboto, sans-serif;
    line-height: 1.6;
    color: #1f2129;
    max-width: 960px;
    margin: 0 auto;
    padding: 2rem;
}}
h1, h2, h3, h4, h5, h6 {{ line-height: 1.3; margin-top: 2rem; margin-bottom: 1rem; }}
code {{
    background-color: #f6f8fa;
    padding: 0.2rem 0.4rem;
    border-radius: 4px;
    font-family: 'SF Mono', Monaco, Consolas, 'Courier New', monospace;
    font-size: 0.9em;
}}
pre {{ background-color: #f6f8fa; border-radius: 8px; padding: 1rem; overflow-x: auto; }}
pre code {{ background: none; padding: 0; }}
table {{ border-collapse: collapse; width: 100%; margin: 1.5rem 0; }}
th, td {{ border: 1px solid #d0d7de; padding: 0.5rem 0.75rem; text-align: left; }}
th {{ background-color: #f6f8fa; }}
blockquote {{
    border-left: 4px solid #d0d7de;
    margin: 1.5rem 0;
    padding: 0.5rem 1rem;
    color: #57606a;
}}
img {{ max-width: 100%; height: auto; }}
hr {{ border: none; height: 1px; background-color: #d0d7de; margin: 2rem 0; }}
</style>
</head>
<body>
<div class="content">
{}
</div>
</body>
</html>"#,
        content
    )
}
