//! Plain-text rendering of summary tables.

use dialstat_core::analytics::{SummaryTable, ViewRunResult};

/// Render a table with left-aligned key columns and right-aligned metrics.
pub fn text_table(table: &SummaryTable) -> String {
    let headers = table.headers();
    let rows = table.rendered_rows();
    let keys = table.dimensions.len();

    let mut widths: Vec<usize> = headers.iter().map(|h| h.chars().count()).collect();
    for row in &rows {
        for (i, cell) in row.iter().enumerate() {
            if let Some(width) = widths.get_mut(i) {
                *width = (*width).max(cell.chars().count());
            }
        }
    }

    let line = |cells: &[String]| -> String {
        cells
            .iter()
            .zip(&widths)
            .enumerate()
            .map(|(i, (cell, width))| {
                if i < keys {
                    format!("{:<width$}", cell, width = *width)
                } else {
                    format!("{:>width$}", cell, width = *width)
                }
            })
            .collect::<Vec<_>>()
            .join("  ")
            .trim_end()
            .to_string()
    };

    let header_cells: Vec<String> = headers.iter().map(|h| h.to_string()).collect();
    let rule: String = "-".repeat(widths.iter().sum::<usize>() + 2 * widths.len().saturating_sub(1));

    let mut out = String::new();
    out.push_str(&format!("{} ({})\n", table.title, table.subset.as_str()));
    out.push_str(&line(&header_cells));
    out.push('\n');
    out.push_str(&rule);
    out.push('\n');
    for (i, row) in rows.iter().enumerate() {
        if i + 1 == rows.len() {
            out.push_str(&rule);
            out.push('\n');
        }
        out.push_str(&line(row));
        out.push('\n');
    }
    out
}

/// One-line note for a view that produced no table.
pub fn failure_line(result: &ViewRunResult) -> String {
    format!(
        "{}: {}",
        result.view,
        result.error_message.as_deref().unwrap_or("failed")
    )
}
