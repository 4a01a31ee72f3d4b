//! Report engine
//!
//! Runs summary views over one raw input table. Every view normalizes the
//! table under its own column contract, so a file that lacks a column fails
//! only the views that read it.
//!
//! ```text
//! RawTable ──normalize(contract)──▶ CallRecords ──ExclusionPipeline──▶ survivors
//!                                                                        │
//!            SummaryTable ◀──Total row── aggregate ◀──Classifiers────────┘
//! ```
//!
//! ## Usage
//!
//! ```rust,ignore
//! use dialstat_core::analytics::{ReportEngine, ViewKind, ViewSpec};
//!
//! let engine = ReportEngine::from_config(&config)?;
//! let table = dialstat_core::ingest::read_csv(path)?;
//! for result in engine.run_all(&[ViewSpec::new(ViewKind::Hourly)], &table) {
//!     println!("{}: {}", result.view, result.status.as_str());
//! }
//! ```

use super::aggregate::RecordSubset;
use super::dimensions::{BalanceTiers, Classifiers};
use super::table::{SortSpec, SummaryTable};
use super::views::ViewSpec;
use crate::config::Config;
use crate::error::{Error, Result};
use crate::filter::{ExclusionPipeline, FilterReport};
use crate::ingest::{normalize, NormalizeReport, RawTable};
use chrono::{DateTime, Utc};
use std::time::Instant;

/// Status of a view run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ViewRunStatus {
    /// Table produced
    Success,
    /// Input lacks a column the view needs
    SchemaError,
}

impl ViewRunStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            ViewRunStatus::Success => "success",
            ViewRunStatus::SchemaError => "schema_error",
        }
    }
}

/// Result of running one view.
#[derive(Debug, Clone)]
pub struct ViewRunResult {
    pub view: String,
    pub started_at: DateTime<Utc>,
    pub duration_ms: i64,
    pub status: ViewRunStatus,
    /// Error message if the run failed
    pub error_message: Option<String>,
    /// Grouped rows produced, not counting Total
    pub rows_produced: usize,
    pub normalize_report: NormalizeReport,
    pub filter_report: FilterReport,
    /// The finished table when the run succeeded
    pub table: Option<SummaryTable>,
}

impl ViewRunResult {
    pub fn is_success(&self) -> bool {
        self.status == ViewRunStatus::Success
    }
}

/// Engine holding the exclusion pipeline and classifier settings shared
/// by every view.
#[derive(Debug, Clone, Default)]
pub struct ReportEngine {
    pipeline: ExclusionPipeline,
    classifiers: Classifiers,
}

impl ReportEngine {
    pub fn new(pipeline: ExclusionPipeline, classifiers: Classifiers) -> Self {
        Self {
            pipeline,
            classifiers,
        }
    }

    pub fn from_config(config: &Config) -> Result<Self> {
        let pipeline = ExclusionPipeline::from_config(&config.filters)?;
        let tiers = BalanceTiers::new(config.dimensions.balance_tiers.clone())?;
        Ok(Self::new(
            pipeline,
            Classifiers::new(config.dimensions.cycle_source, tiers),
        ))
    }

    pub fn pipeline(&self) -> &ExclusionPipeline {
        &self.pipeline
    }

    pub fn classifiers(&self) -> &Classifiers {
        &self.classifiers
    }

    /// Normalize, filter and summarize in one call.
    ///
    /// Fails only with [`Error::Schema`].
    pub fn summarize(&self, spec: &ViewSpec, table: &RawTable) -> Result<SummaryTable> {
        self.execute(spec, table).map(|(table, _, _)| table)
    }

    fn execute(
        &self,
        spec: &ViewSpec,
        table: &RawTable,
    ) -> Result<(SummaryTable, NormalizeReport, FilterReport)> {
        let contract = spec.contract(&self.pipeline, self.classifiers.cycle_source);
        let batch = normalize(table, &contract)?;

        if batch.report.has_warnings() {
            tracing::warn!(
                view = spec.name(),
                dropped_bad_date = batch.report.dropped_bad_date,
                dropped_bad_time = batch.report.dropped_bad_time,
                amounts_defaulted = batch.report.amounts_defaulted,
                talk_times_defaulted = batch.report.talk_times_defaulted,
                "Some rows could not be fully parsed"
            );
        }

        let outcome = self.pipeline.apply(&batch.records);
        let summary = spec.summarize(&outcome.kept, &self.classifiers);
        Ok((summary, batch.report, outcome.report))
    }

    /// Run one view, recording timing and outcome.
    pub fn run_view(&self, spec: &ViewSpec, table: &RawTable) -> ViewRunResult {
        let started_at = Utc::now();
        let start = Instant::now();

        tracing::debug!(
            view = spec.name(),
            dimensions = ?spec.dimensions,
            subset = spec.subset.as_str(),
            rows = table.len(),
            "Running view"
        );

        match self.execute(spec, table) {
            Ok((summary, normalize_report, filter_report)) => {
                let duration_ms = start.elapsed().as_millis() as i64;
                let rows_produced = summary.rows().len();

                tracing::info!(
                    view = spec.name(),
                    rows = rows_produced,
                    kept = filter_report.kept,
                    removed = filter_report.total_removed(),
                    duration_ms,
                    "View completed successfully"
                );

                ViewRunResult {
                    view: spec.name().to_string(),
                    started_at,
                    duration_ms,
                    status: ViewRunStatus::Success,
                    error_message: None,
                    rows_produced,
                    normalize_report,
                    filter_report,
                    table: Some(summary),
                }
            }
            Err(e) => {
                let duration_ms = start.elapsed().as_millis() as i64;

                tracing::warn!(view = spec.name(), error = %e, "View failed");

                ViewRunResult {
                    view: spec.name().to_string(),
                    started_at,
                    duration_ms,
                    status: ViewRunStatus::SchemaError,
                    error_message: Some(e.to_string()),
                    rows_produced: 0,
                    normalize_report: NormalizeReport {
                        rows_seen: table.len(),
                        ..Default::default()
                    },
                    filter_report: FilterReport::default(),
                    table: None,
                }
            }
        }
    }

    /// Run every view. A failing view never stops the others.
    pub fn run_all(&self, specs: &[ViewSpec], table: &RawTable) -> Vec<ViewRunResult> {
        specs.iter().map(|spec| self.run_view(spec, table)).collect()
    }
}

/// Parse view names into specs sharing one subset and sort.
pub fn parse_views(
    names: &[String],
    subset: RecordSubset,
    sort: Option<SortSpec>,
) -> Result<Vec<ViewSpec>> {
    if names.is_empty() {
        return Err(Error::InvalidArgument("no views requested".to_string()));
    }
    names
        .iter()
        .map(|name| {
            Ok(ViewSpec::new(name.parse()?)
                .with_subset(subset)
                .with_sort(sort))
        })
        .collect()
}
