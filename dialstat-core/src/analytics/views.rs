//! Named summary views.
//!
//! A view is a dimension list, a record subset and an optional sort. Each
//! view also knows which input columns it consumes, so a file lacking a
//! column fails only the views that need it.

use super::aggregate::{aggregate, RecordSubset};
use super::dimensions::{Classifiers, CycleSource, Dimension};
use super::metrics_registry::{columns_for_view, MetricColumn};
use super::table::{SortSpec, SummaryTable};
use crate::error::{Error, Result};
use crate::filter::ExclusionPipeline;
use crate::ingest::ColumnContract;
use crate::types::{CallRecord, Column};
use serde::Serialize;

/// Columns every view reads.
const BASE_COLUMNS: [Column; 7] = [
    Column::AccountNo,
    Column::CallStatus,
    Column::Status,
    Column::RemarkType,
    Column::RemarkBy,
    Column::PtpAmount,
    Column::Balance,
];

/// Built-in summary views.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum ViewKind {
    Hourly,
    Collector,
    Cycle,
    BalanceTier,
    Overall,
    Client,
    TalkTime,
}

impl ViewKind {
    pub const ALL: [ViewKind; 7] = [
        ViewKind::Hourly,
        ViewKind::Collector,
        ViewKind::Cycle,
        ViewKind::BalanceTier,
        ViewKind::Overall,
        ViewKind::Client,
        ViewKind::TalkTime,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            ViewKind::Hourly => "hourly",
            ViewKind::Collector => "collector",
            ViewKind::Cycle => "cycle",
            ViewKind::BalanceTier => "balance-tier",
            ViewKind::Overall => "overall",
            ViewKind::Client => "client",
            ViewKind::TalkTime => "talk-time",
        }
    }

    pub fn title(&self) -> &'static str {
        match self {
            ViewKind::Hourly => "Hourly Summary",
            ViewKind::Collector => "Collector Summary",
            ViewKind::Cycle => "Cycle Summary",
            ViewKind::BalanceTier => "Balance Tier Summary",
            ViewKind::Overall => "Overall Summary",
            ViewKind::Client => "Client Summary",
            ViewKind::TalkTime => "Talk Time Summary",
        }
    }

    pub fn description(&self) -> &'static str {
        match self {
            ViewKind::Hourly => "Attempts per hour of the calling day (06:00 to 21:00)",
            ViewKind::Collector => "Per collector per day, with agent and system drops",
            ViewKind::Cycle => "Per dialing cycle per day",
            ViewKind::BalanceTier => "Per outstanding-balance tier",
            ViewKind::Overall => "Whole-floor totals per day",
            ViewKind::Client => "Per client",
            ViewKind::TalkTime => "Talk time per collector",
        }
    }

    pub fn default_dimensions(&self) -> Vec<Dimension> {
        match self {
            ViewKind::Hourly => vec![Dimension::TimeBucket],
            ViewKind::Collector => vec![Dimension::Date, Dimension::Collector],
            ViewKind::Cycle => vec![Dimension::Date, Dimension::Cycle],
            ViewKind::BalanceTier => vec![Dimension::BalanceTier],
            ViewKind::Overall => vec![Dimension::Date],
            ViewKind::Client => vec![Dimension::Client],
            ViewKind::TalkTime => vec![Dimension::Collector],
        }
    }

    /// Columns this view reads beyond the base set and its dimensions.
    fn extra_columns(&self) -> &'static [Column] {
        match self {
            ViewKind::Client => &[],
            ViewKind::TalkTime => &[Column::Date, Column::TalkTime],
            _ => &[Column::Date],
        }
    }
}

impl std::str::FromStr for ViewKind {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        let wanted = s.trim().to_lowercase().replace('_', "-");
        ViewKind::ALL
            .into_iter()
            .find(|v| v.name() == wanted)
            .ok_or_else(|| Error::UnknownView(s.trim().to_string()))
    }
}

impl std::fmt::Display for ViewKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

/// One requested summary.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ViewSpec {
    pub kind: ViewKind,
    pub dimensions: Vec<Dimension>,
    pub subset: RecordSubset,
    pub sort: Option<SortSpec>,
}

impl ViewSpec {
    pub fn new(kind: ViewKind) -> Self {
        Self {
            kind,
            dimensions: kind.default_dimensions(),
            subset: RecordSubset::All,
            sort: None,
        }
    }

    /// Replace the grouping, e.g. Date × Cycle × TimeBucket.
    pub fn with_dimensions(mut self, dimensions: Vec<Dimension>) -> Result<Self> {
        if dimensions.is_empty() {
            return Err(Error::InvalidArgument(format!(
                "view {} needs at least one dimension",
                self.kind
            )));
        }
        self.dimensions = dimensions;
        Ok(self)
    }

    pub fn with_subset(mut self, subset: RecordSubset) -> Self {
        self.subset = subset;
        self
    }

    pub fn with_sort(mut self, sort: Option<SortSpec>) -> Self {
        self.sort = sort;
        self
    }

    pub fn name(&self) -> &'static str {
        self.kind.name()
    }

    pub fn columns(&self) -> &'static [MetricColumn] {
        columns_for_view(self.kind)
    }

    /// Input columns this view needs under the given exclusion pipeline.
    pub fn contract(&self, pipeline: &ExclusionPipeline, cycle_source: CycleSource) -> ColumnContract {
        ColumnContract::new(self.name())
            .require_all(BASE_COLUMNS)
            .require_all(self.kind.extra_columns().iter().copied())
            .require_all(self.dimensions.iter().map(|d| d.source_column(cycle_source)))
            .require_all(pipeline.required_columns())
    }

    /// Group filtered records and build the finished table.
    pub fn summarize(&self, survivors: &[&CallRecord], classifiers: &Classifiers) -> SummaryTable {
        let index = classifiers.index(survivors);
        let groups = aggregate(&index, &self.dimensions, self.subset);
        let table = SummaryTable::from_groups(
            self.name(),
            self.kind.title(),
            self.subset,
            self.dimensions.clone(),
            self.columns().to_vec(),
            groups,
        );
        match self.sort {
            Some(sort) => table.sorted_by(sort),
            None => table,
        }
    }
}

/// Every built-in view, for `--list-views`.
pub fn list_views() -> Vec<ViewKind> {
    ViewKind::ALL.to_vec()
}
