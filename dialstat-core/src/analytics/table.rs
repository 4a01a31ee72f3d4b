//! Summary tables: grouped rows, the Total row, sorting and rendered cells.

use super::aggregate::{GroupedMetrics, Metrics, RecordSubset};
use super::dimensions::{Dimension, DimensionValue};
use super::metrics_registry::{ColumnKind, MetricColumn};
use super::rates::Rates;
use crate::error::{Error, Result};
use crate::format::{format_amount, format_duration, format_rate};
use rust_decimal::Decimal;
use serde::{Serialize, Serializer};
use std::cmp::Ordering;
use std::fmt;

/// Label of the Total row's first key cell.
pub const TOTAL_LABEL: &str = "Total";

/// One key cell of a row.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum KeyCell {
    Value(DimensionValue),
    Total,
    Blank,
}

impl fmt::Display for KeyCell {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            KeyCell::Value(value) => value.fmt(f),
            KeyCell::Total => f.write_str(TOTAL_LABEL),
            KeyCell::Blank => Ok(()),
        }
    }
}

impl Serialize for KeyCell {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

/// A rendered or sortable cell value.
#[derive(Debug, Clone, PartialEq)]
pub enum Cell {
    Text(String),
    Count(u64),
    Amount(Decimal),
    Rate(Option<f64>),
    Duration(u64),
    Blank,
}

impl Cell {
    /// Ascending order for sorting; `None` rates compare as missing.
    fn compare(&self, other: &Cell) -> Ordering {
        match (self, other) {
            (Cell::Count(a), Cell::Count(b)) | (Cell::Duration(a), Cell::Duration(b)) => a.cmp(b),
            (Cell::Amount(a), Cell::Amount(b)) => a.cmp(b),
            (Cell::Rate(Some(a)), Cell::Rate(Some(b))) => a.total_cmp(b),
            (Cell::Text(a), Cell::Text(b)) => a.cmp(b),
            _ => Ordering::Equal,
        }
    }

    fn is_missing(&self) -> bool {
        matches!(self, Cell::Rate(None) | Cell::Blank)
    }
}

impl fmt::Display for Cell {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Cell::Text(text) => f.write_str(text),
            Cell::Count(n) => write!(f, "{}", n),
            Cell::Amount(amount) => f.write_str(&format_amount(*amount)),
            Cell::Rate(rate) => f.write_str(&format_rate(*rate)),
            Cell::Duration(secs) => f.write_str(&format_duration(*secs)),
            Cell::Blank => Ok(()),
        }
    }
}

/// One row of a summary table.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SummaryRow {
    pub keys: Vec<KeyCell>,
    pub metrics: Metrics,
    pub rates: Rates,
}

impl SummaryRow {
    fn from_group(group: GroupedMetrics) -> Self {
        let rates = Rates::from_metrics(&group.metrics);
        Self {
            keys: group.keys.into_iter().map(KeyCell::Value).collect(),
            metrics: group.metrics,
            rates,
        }
    }

    pub fn is_total(&self) -> bool {
        self.keys.first() == Some(&KeyCell::Total)
    }

    /// Value of a metric column in this row.
    pub fn value(&self, column: MetricColumn) -> Cell {
        let m = &self.metrics;
        let r = &self.rates;
        match column {
            MetricColumn::AccountsTotal => Cell::Count(m.accounts_total),
            MetricColumn::TotalDialed => Cell::Count(m.total_dialed),
            MetricColumn::PenetrationRate => Cell::Rate(r.penetration_rate),
            MetricColumn::ConnectedAccounts => Cell::Count(m.connected_accounts),
            MetricColumn::Connected => Cell::Count(m.connected),
            MetricColumn::ConnectedRate => Cell::Rate(r.connected_rate),
            MetricColumn::Rpc => Cell::Count(m.rpc),
            MetricColumn::PtpAccounts => Cell::Count(m.ptp_accounts),
            MetricColumn::PtpRate => Cell::Rate(r.ptp_rate),
            MetricColumn::PtpAmount => Cell::Amount(m.ptp_amount),
            MetricColumn::BalanceAmount => Cell::Amount(m.balance_amount),
            MetricColumn::AgentDrops => Cell::Count(m.agent_drops),
            MetricColumn::SystemDrops => Cell::Count(m.system_drops),
            MetricColumn::CallDropRatio => Cell::Rate(r.call_drop_ratio),
            MetricColumn::SystemDropRatio => Cell::Rate(r.system_drop_ratio),
            MetricColumn::TalkTime => Cell::Duration(m.talk_time_secs),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum SortDirection {
    Asc,
    Desc,
}

/// Reorders non-Total rows by one metric column.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct SortSpec {
    pub column: MetricColumn,
    pub direction: SortDirection,
}

impl SortSpec {
    pub fn new(column: MetricColumn, direction: SortDirection) -> Self {
        Self { column, direction }
    }
}

impl std::str::FromStr for SortSpec {
    type Err = Error;

    /// `COLUMN[:asc|desc]`, descending when no direction is given.
    fn from_str(s: &str) -> Result<Self> {
        let (column, direction) = match s.rsplit_once(':') {
            Some((column, direction)) => (column, Some(direction)),
            None => (s, None),
        };
        let direction = match direction.map(|d| d.trim().to_lowercase()) {
            None => SortDirection::Desc,
            Some(d) if d == "desc" => SortDirection::Desc,
            Some(d) if d == "asc" => SortDirection::Asc,
            Some(other) => {
                return Err(Error::InvalidArgument(format!(
                    "unknown sort direction: {} (expected asc or desc)",
                    other
                )))
            }
        };
        Ok(Self::new(column.parse()?, direction))
    }
}

/// A finished summary: grouped rows followed by exactly one Total row.
#[derive(Debug, Clone, Serialize)]
pub struct SummaryTable {
    pub view: String,
    pub title: String,
    pub subset: RecordSubset,
    pub dimensions: Vec<Dimension>,
    pub columns: Vec<MetricColumn>,
    rows: Vec<SummaryRow>,
    total: SummaryRow,
}

impl SummaryTable {
    /// Build a table from aggregated groups and append the Total row.
    ///
    /// Total counts and sums are column sums over the rows; Total rates are
    /// recomputed from those sums.
    pub fn from_groups(
        view: impl Into<String>,
        title: impl Into<String>,
        subset: RecordSubset,
        dimensions: Vec<Dimension>,
        columns: Vec<MetricColumn>,
        groups: Vec<GroupedMetrics>,
    ) -> Self {
        let rows: Vec<SummaryRow> = groups.into_iter().map(SummaryRow::from_group).collect();

        let metrics = Metrics::sum(rows.iter().map(|r| &r.metrics));
        let keys = (0..dimensions.len())
            .map(|i| if i == 0 { KeyCell::Total } else { KeyCell::Blank })
            .collect();
        let total = SummaryRow {
            keys,
            rates: Rates::from_metrics(&metrics),
            metrics,
        };

        Self {
            view: view.into(),
            title: title.into(),
            subset,
            dimensions,
            columns,
            rows,
            total,
        }
    }

    /// Grouped rows, without the Total row.
    pub fn rows(&self) -> &[SummaryRow] {
        &self.rows
    }

    pub fn total(&self) -> &SummaryRow {
        &self.total
    }

    /// Every row including Total, which is always last.
    pub fn iter(&self) -> impl Iterator<Item = &SummaryRow> {
        self.rows.iter().chain(std::iter::once(&self.total))
    }

    pub fn len(&self) -> usize {
        self.rows.len() + 1
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn headers(&self) -> Vec<&'static str> {
        self.dimensions
            .iter()
            .map(Dimension::header)
            .chain(self.columns.iter().map(MetricColumn::header))
            .collect()
    }

    /// Kind of each metric column, aligned with the tail of `headers()`.
    pub fn column_kinds(&self) -> Vec<ColumnKind> {
        self.columns.iter().map(MetricColumn::kind).collect()
    }

    /// Stable reorder of the grouped rows; ties keep key order and rows
    /// with an undefined rate go last in either direction.
    pub fn sorted_by(mut self, sort: SortSpec) -> Self {
        self.rows.sort_by(|a, b| {
            let (a, b) = (a.value(sort.column), b.value(sort.column));
            match (a.is_missing(), b.is_missing()) {
                (true, true) => Ordering::Equal,
                (true, false) => Ordering::Greater,
                (false, true) => Ordering::Less,
                (false, false) => match sort.direction {
                    SortDirection::Asc => a.compare(&b),
                    SortDirection::Desc => b.compare(&a),
                },
            }
        });
        self
    }

    /// Cells of one row in header order.
    pub fn render_row(&self, row: &SummaryRow) -> Vec<Cell> {
        row.keys
            .iter()
            .map(|k| match k {
                KeyCell::Blank => Cell::Blank,
                other => Cell::Text(other.to_string()),
            })
            .chain(self.columns.iter().map(|c| row.value(*c)))
            .collect()
    }

    /// Every row, Total last, as display strings.
    pub fn rendered_rows(&self) -> Vec<Vec<String>> {
        self.iter()
            .map(|row| self.render_row(row).iter().map(Cell::to_string).collect())
            .collect()
    }

    /// `{view, title, subset, columns, rows}` with rendered cells.
    pub fn to_json(&self) -> serde_json::Value {
        serde_json::json!({
            "view": self.view,
            "title": self.title,
            "subset": self.subset.as_str(),
            "columns": self.headers(),
            "rows": self.rendered_rows(),
        })
    }
}
