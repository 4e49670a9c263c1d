//! CSV export of document tables.

use crate::error::{Error, Result};
use crate::model::{DocumentModel, TableBlock};
use crate::parser::extract_tables;

/// Exports the tables of a document as CSV.
///
/// Tables are collected from the model in document order (pre-order over
/// sections and subsections). When the model yields none, for example
/// when the input never parsed into sections, the raw markdown is
/// re-scanned with the same pipe-table detection before giving up.
pub struct TableExporter {
    tables: Vec<TableBlock>,
}

impl TableExporter {
    /// Collect tables from a model, falling back to a direct markdown
    /// scan when the model has none.
    pub fn new(model: &DocumentModel, raw_markdown: &str) -> Self {
        let mut tables: Vec<TableBlock> = model.tables().into_iter().cloned().collect();
        if tables.is_empty() {
            log::debug!("no tables in model, scanning raw markdown directly");
            tables = extract_tables(raw_markdown);
        }
        Self { tables }
    }

    /// Collect tables from a model only.
    pub fn from_model(model: &DocumentModel) -> Self {
        Self {
            tables: model.tables().into_iter().cloned().collect(),
        }
    }

    /// Number of tables available for export.
    pub fn table_count(&self) -> usize {
        self.tables.len()
    }

    /// Export the table at `index` as CSV: header row, then data rows,
    /// one record per line.
    pub fn export_table(&self, index: usize) -> Result<String> {
        if self.tables.is_empty() {
            return Err(Error::NoTablesFound);
        }
        let table = self.tables.get(index).ok_or(Error::TableIndexOutOfRange {
            index,
            count: self.tables.len(),
        })?;

        let mut out = String::new();
        write_table(&mut out, table);
        Ok(out)
    }

    /// Export every table, separated by a blank record, a `=== Table N ===`
    /// marker, and another blank record. Separators appear between tables
    /// only, never before the first or after the last.
    pub fn export_all_tables(&self) -> Result<String> {
        if self.tables.is_empty() {
            return Err(Error::NoTablesFound);
        }

        let mut out = String::new();
        for (i, table) in self.tables.iter().enumerate() {
            if i > 0 {
                out.push('\n');
                out.push_str(&format!("=== Table {} ===\n", i + 1));
                out.push('\n');
            }
            write_table(&mut out, table);
        }
        Ok(out)
    }
}

fn write_table(out: &mut String, table: &TableBlock) {
    write_record(out, &table.headers);
    for row in &table.rows {
        write_record(out, row);
    }
}

fn write_record(out: &mut String, cells: &[String]) {
    let escaped: Vec<String> = cells.iter().map(|c| escape_field(c)).collect();
    out.push_str(&escaped.join(","));
    out.push('\n');
}

/// Quote a field when it contains a delimiter, quote, or line break,
/// doubling embedded quotes.
fn escape_field(field: &str) -> String {
    if field.contains(',') || field.contains('"') || field.contains('\n') || field.contains('\r') {
        format!("\"{}\"", field.replace('"', "\"\""))
    } else {
        field.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::parse_markdown;

    fn exporter_for(markdown: &str) -> TableExporter {
        let model = parse_markdown(markdown);
        TableExporter::new(&model, markdown)
    }

    #[test]
    fn test_single_table_export() {
        let exporter = exporter_for("| A | B |\n|---|---|\n| 1 | 2 |");
        assert_eq!(exporter.table_count(), 1);
        assert_eq!(exporter.export_table(0).unwrap(), "A,B\n1,2\n");
    }

    #[test]
    fn test_no_tables_error() {
        let exporter = exporter_for("# Just a heading\n\nAnd text.");
        assert!(matches!(exporter.export_table(0), Err(Error::NoTablesFound)));
        assert!(matches!(exporter.export_all_tables(), Err(Error::NoTablesFound)));
    }

    #[test]
    fn test_index_out_of_range() {
        let exporter = exporter_for("| A |\n|---|\n| 1 |");
        match exporter.export_table(3) {
            Err(Error::TableIndexOutOfRange { index, count }) => {
                assert_eq!(index, 3);
                assert_eq!(count, 1);
            }
            other => panic!("expected out-of-range error, got {:?}", other),
        }
    }

    #[test]
    fn test_separator_only_between_tables() {
        let markdown = "# S\n\n| A |\n|---|\n| 1 |\n\n| B |\n|---|\n| 2 |\n";
        let exporter = exporter_for(markdown);
        assert_eq!(exporter.table_count(), 2);

        let csv = exporter.export_all_tables().unwrap();
        assert_eq!(csv, "A\n1\n\n=== Table 2 ===\n\nB\n2\n");
        assert_eq!(csv.matches("=== Table").count(), 1);
        assert!(!csv.starts_with('\n'));
        assert!(!csv.ends_with("\n\n"));
    }

    #[test]
    fn test_fields_with_commas_quoted() {
        let exporter = exporter_for("| Name | Location |\n|---|---|\n| Smith, J. | Paris |");
        let csv = exporter.export_table(0).unwrap();
        assert_eq!(csv, "Name,Location\n\"Smith, J.\",Paris\n");
    }

    #[test]
    fn test_fields_with_quotes_doubled() {
        assert_eq!(escape_field("say \"hi\""), "\"say \"\"hi\"\"\"");
        assert_eq!(escape_field("plain"), "plain");
    }

    #[test]
    fn test_markdown_fallback_scan() {
        // table inside a code fence is invisible to the section parser's
        // paragraph content but still present in raw text; simulate a
        // model without tables by exporting from bare pipe rows that the
        // parser sees only through the fallback scan
        let model = DocumentModel::empty();
        let exporter = TableExporter::new(&model, "| X | Y |\n|---|---|\n| 9 | 8 |");
        assert_eq!(exporter.table_count(), 1);
        assert_eq!(exporter.export_table(0).unwrap(), "X,Y\n9,8\n");
    }

    #[test]
    fn test_row_width_matches_header() {
        let exporter = exporter_for("| A | B | C |\n|---|---|---|\n| 1 |\n");
        let csv = exporter.export_table(0).unwrap();
        assert_eq!(csv, "A,B,C\n1,,\n");
    }
}
