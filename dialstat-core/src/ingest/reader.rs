//! CSV loading into a [`RawTable`].
//!
//! Rows that the CSV reader cannot decode are skipped with a warning; the
//! rest of the file still loads.

use super::{RawRow, RawTable};
use crate::error::Result;
use std::io::Read;
use std::path::Path;

/// Read a dialer export from a CSV file.
pub fn read_csv(path: &Path) -> Result<RawTable> {
    let file = std::fs::File::open(path)?;
    let table = read_csv_from(file)?;
    tracing::info!(
        path = %path.display(),
        rows = table.len(),
        columns = table.columns().len(),
        "Loaded disposition export"
    );
    Ok(table)
}

/// Read CSV data from any reader. The first record is the header row.
pub fn read_csv_from<R: Read>(input: R) -> Result<RawTable> {
    // Rows may be shorter or longer than the header.
    let mut reader = csv::ReaderBuilder::new()
        .flexible(true)
        .trim(csv::Trim::Headers)
        .from_reader(input);

    let columns: Vec<String> = reader
        .headers()?
        .iter()
        .map(|h| h.trim_start_matches('\u{feff}').to_string())
        .collect();

    let mut table = RawTable::new(columns.clone());
    let mut skipped = 0usize;

    for (index, result) in reader.records().enumerate() {
        let record = match result {
            Ok(record) => record,
            Err(e) => {
                skipped += 1;
                tracing::warn!(row = index + 1, error = %e, "Skipping unreadable CSV row");
                continue;
            }
        };

        let row: RawRow = columns
            .iter()
            .cloned()
            .zip(record.iter().map(str::to_string))
            .collect();
        table.push_row(row);
    }

    if skipped > 0 {
        tracing::warn!(skipped, "Some CSV rows could not be read");
    }

    Ok(table)
}
