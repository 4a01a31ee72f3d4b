//! Ingestion layer: raw tabular rows to typed call records
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────┐     ┌──────────────────┐     ┌─────────────────┐
//! │  Dialer export  │ ──► │     RawTable     │ ──► │ NormalizedBatch │
//! │    (CSV file)   │     │ (header → text)  │     │  (CallRecords)  │
//! └─────────────────┘     └──────────────────┘     └─────────────────┘
//!        reader::read_csv          normalize(table, contract)
//! ```
//!
//! Normalization is driven by a [`ColumnContract`]: the columns a view
//! consumes and whether it needs dates or times. A missing contract column
//! is the only hard failure. Everything else fails soft:
//!
//! - Unparseable dates drop the row only when the contract needs dates
//! - Unparseable times drop the row only when the contract needs times
//! - Unparseable amounts and talk times become zero
//!
//! Each recovered problem is counted in the [`NormalizeReport`].

mod fields;
pub mod reader;

pub use fields::{parse_amount, parse_date, parse_duration_secs, parse_time};
pub use reader::{read_csv, read_csv_from};

use crate::error::{Error, Result};
use crate::types::{CallRecord, CallStatus, Column, Disposition, RemarkType};
use serde::Serialize;
use std::collections::{BTreeSet, HashMap};

/// One input row: header text to raw cell text.
pub type RawRow = HashMap<String, String>;

/// Tabular input as handed over by the file-loading layer.
#[derive(Debug, Clone, Default)]
pub struct RawTable {
    columns: Vec<String>,
    rows: Vec<RawRow>,
}

impl RawTable {
    /// Create an empty table with the given headers.
    pub fn new(columns: Vec<String>) -> Self {
        Self {
            columns,
            rows: Vec::new(),
        }
    }

    /// Build a table from headers and positional rows.
    ///
    /// Short rows leave their trailing columns absent.
    pub fn from_rows<H, R, C>(headers: &[H], rows: R) -> Self
    where
        H: AsRef<str>,
        R: IntoIterator<Item = Vec<C>>,
        C: Into<String>,
    {
        let columns: Vec<String> = headers.iter().map(|h| h.as_ref().to_string()).collect();
        let mut table = RawTable::new(columns);
        for row in rows {
            let fields = table
                .columns
                .iter()
                .cloned()
                .zip(row.into_iter().map(Into::into))
                .collect();
            table.rows.push(fields);
        }
        table
    }

    pub fn push_row(&mut self, row: RawRow) {
        self.rows.push(row);
    }

    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    pub fn rows(&self) -> &[RawRow] {
        &self.rows
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Find the input header that names `column`, if any.
    pub fn header_for(&self, column: Column) -> Option<&str> {
        self.columns
            .iter()
            .find(|h| column.matches_header(h))
            .map(String::as_str)
    }
}

/// Columns and parse requirements of one summary view.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ColumnContract {
    /// Label used in schema errors (usually the view name)
    pub context: String,
    pub required: BTreeSet<Column>,
    /// Drop rows whose date cannot be parsed
    pub requires_date: bool,
    /// Drop rows whose time cannot be parsed
    pub requires_time: bool,
}

impl ColumnContract {
    pub fn new(context: impl Into<String>) -> Self {
        Self {
            context: context.into(),
            ..Default::default()
        }
    }

    pub fn require(mut self, column: Column) -> Self {
        self.required.insert(column);
        if column == Column::Date {
            self.requires_date = true;
        }
        if column == Column::Time {
            self.requires_time = true;
        }
        self
    }

    pub fn require_all(self, columns: impl IntoIterator<Item = Column>) -> Self {
        columns.into_iter().fold(self, ColumnContract::require)
    }

    /// Required columns the table does not provide.
    pub fn missing_from(&self, table: &RawTable) -> Vec<Column> {
        self.required
            .iter()
            .copied()
            .filter(|c| table.header_for(*c).is_none())
            .collect()
    }
}

/// Counts of what normalization kept, dropped and defaulted.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct NormalizeReport {
    pub rows_seen: usize,
    pub rows_kept: usize,
    pub dropped_bad_date: usize,
    pub dropped_bad_time: usize,
    /// Promise or balance cells that could not be read and became zero
    pub amounts_defaulted: usize,
    pub talk_times_defaulted: usize,
}

impl NormalizeReport {
    pub fn has_warnings(&self) -> bool {
        self.dropped_bad_date > 0
            || self.dropped_bad_time > 0
            || self.amounts_defaulted > 0
            || self.talk_times_defaulted > 0
    }
}

/// Records produced by [`normalize`], in input order.
#[derive(Debug, Clone, Default)]
pub struct NormalizedBatch {
    pub records: Vec<CallRecord>,
    pub report: NormalizeReport,
}

/// Parse a raw table into call records under the given contract.
///
/// Fails with [`Error::Schema`] naming every missing required column.
pub fn normalize(table: &RawTable, contract: &ColumnContract) -> Result<NormalizedBatch> {
    let missing = contract.missing_from(table);
    if !missing.is_empty() {
        tracing::warn!(
            context = %contract.context,
            missing = missing.len(),
            "Input is missing required columns"
        );
        return Err(Error::Schema {
            context: contract.context.clone(),
            missing,
        });
    }

    let headers: HashMap<Column, &str> = Column::ALL
        .iter()
        .filter_map(|c| table.header_for(*c).map(|h| (*c, h)))
        .collect();

    let mut report = NormalizeReport {
        rows_seen: table.len(),
        ..Default::default()
    };
    let mut records = Vec::with_capacity(table.len());

    for row in table.rows() {
        let cell = |column: Column| -> &str {
            headers
                .get(&column)
                .and_then(|h| row.get(*h))
                .map(|v| v.trim())
                .unwrap_or("")
        };

        let date = parse_date(cell(Column::Date));
        if date.is_none() && contract.requires_date {
            report.dropped_bad_date += 1;
            continue;
        }

        let time = parse_time(cell(Column::Time));
        if time.is_none() && contract.requires_time {
            report.dropped_bad_time += 1;
            continue;
        }

        let mut amount = |column: Column| match parse_amount(cell(column)) {
            Some(value) => value,
            None => {
                report.amounts_defaulted += 1;
                rust_decimal::Decimal::ZERO
            }
        };
        let promise_amount = amount(Column::PtpAmount);
        let balance = amount(Column::Balance);

        let talk_time_secs = match parse_duration_secs(cell(Column::TalkTime)) {
            Some(secs) => secs,
            None => {
                report.talk_times_defaulted += 1;
                0
            }
        };

        records.push(CallRecord {
            account_id: cell(Column::AccountNo).to_string(),
            date,
            time,
            call_status: CallStatus::classify(cell(Column::CallStatus)),
            disposition: Disposition::new(cell(Column::Status)),
            remark_type: RemarkType::classify(cell(Column::RemarkType)),
            remark_by: cell(Column::RemarkBy).to_string(),
            remark_text: cell(Column::Remark).to_string(),
            promise_amount,
            balance,
            service_no: cell(Column::ServiceNo).to_string(),
            card_no: cell(Column::CardNo).to_string(),
            client: cell(Column::Client).to_string(),
            talk_time_secs,
            debtor: cell(Column::Debtor).to_string(),
        });
    }

    report.rows_kept = records.len();

    if report.has_warnings() {
        tracing::warn!(
            context = %contract.context,
            dropped_bad_date = report.dropped_bad_date,
            dropped_bad_time = report.dropped_bad_time,
            amounts_defaulted = report.amounts_defaulted,
            talk_times_defaulted = report.talk_times_defaulted,
            "Recovered from unparseable fields"
        );
    }

    tracing::debug!(
        context = %contract.context,
        rows_seen = report.rows_seen,
        rows_kept = report.rows_kept,
        "Normalized input rows"
    );

    Ok(NormalizedBatch { records, report })
}
