//! Table grid reconstruction from cell predictions.

use super::element::{TableRegion, TableStructure};
use crate::error::{Error, Result};

/// Build a `num_rows x num_cols` grid of cell texts.
///
/// Each prediction writes its text at its start offsets; predictions
/// whose offsets fall outside the grid are silently dropped.
pub fn build_grid(structure: &TableStructure) -> Result<Vec<Vec<String>>> {
    if structure.num_rows == 0 || structure.num_cols == 0 {
        return Err(Error::MalformedInput(format!(
            "table structure has degenerate shape {}x{}",
            structure.num_rows, structure.num_cols
        )));
    }

    let mut grid = vec![vec![String::new(); structure.num_cols]; structure.num_rows];
    let mut dropped = 0usize;

    for cell in &structure.cells {
        let row = cell.start_row_offset_idx;
        let col = cell.start_col_offset_idx;
        if row < structure.num_rows && col < structure.num_cols {
            grid[row][col] = cell.text.clone();
        } else {
            dropped += 1;
        }
    }

    if dropped > 0 {
        log::debug!("table grid: dropped {} out-of-range cell prediction(s)", dropped);
    }

    Ok(grid)
}

/// Render a table region as markdown.
///
/// Structured regions become a pipe table whose header is the first
/// non-empty grid row; regions without a usable structure degrade to a
/// single bolded text block. This path never fails.
pub fn region_to_markdown(region: &TableRegion) -> Option<String> {
    match &region.structure {
        Some(structure) => match build_grid(structure) {
            Ok(grid) => grid_to_markdown(&grid),
            Err(e) => {
                log::warn!("table structure unusable ({}), degrading to simple table", e);
                simple_table(&region.text)
            }
        },
        None => simple_table(&region.text),
    }
}

fn simple_table(text: &str) -> Option<String> {
    let text = text.trim();
    if text.is_empty() {
        None
    } else {
        Some(format!("**Table:** {}", text))
    }
}

/// Render a grid as a pipe table, using the first non-empty row as header.
fn grid_to_markdown(grid: &[Vec<String>]) -> Option<String> {
    let header_index = grid
        .iter()
        .position(|row| row.iter().any(|cell| !cell.trim().is_empty()))?;
    let header = &grid[header_index];

    let mut lines = Vec::with_capacity(grid.len() + 1);
    lines.push(format_row(header));
    lines.push(format!("|{}|", vec!["---"; header.len()].join("|")));
    for row in &grid[header_index + 1..] {
        lines.push(format_row(row));
    }

    Some(lines.join("\n"))
}

fn format_row(cells: &[String]) -> String {
    let trimmed: Vec<&str> = cells.iter().map(|c| c.trim()).collect();
    format!("| {} |", trimmed.join(" | "))
}
