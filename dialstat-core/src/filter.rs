//! Record exclusion pipeline.
//!
//! Stages run in a fixed order and a record survives only if no enabled
//! stage removes it. Removals are attributed to the first stage that
//! matches, so per-stage counts add up to the number of removed records.
//! Running the pipeline over its own survivors removes nothing.

use crate::config::FilterConfig;
use crate::error::Result;
use crate::types::{CallRecord, CallStatus, Column};
use chrono::{Datelike, Weekday};
use serde::Serialize;
use std::collections::BTreeMap;

/// One exclusion rule.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ExclusionStage {
    /// Disposition contains "ABORT"
    AbortStatus,
    /// Remark contains a configured phrase
    RemarkPhrase,
    /// Account or debtor looks like a placeholder lead
    PlaceholderLead,
    /// Remark By is an excluded agent
    ExcludedAgent,
    /// Call status is OTHERS
    OthersStatus,
    /// Call date falls on the excluded weekday
    ExcludedWeekday,
}

impl ExclusionStage {
    /// Evaluation order.
    pub const ORDER: [ExclusionStage; 6] = [
        ExclusionStage::AbortStatus,
        ExclusionStage::RemarkPhrase,
        ExclusionStage::PlaceholderLead,
        ExclusionStage::ExcludedAgent,
        ExclusionStage::OthersStatus,
        ExclusionStage::ExcludedWeekday,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            ExclusionStage::AbortStatus => "abort_status",
            ExclusionStage::RemarkPhrase => "remark_phrase",
            ExclusionStage::PlaceholderLead => "placeholder_lead",
            ExclusionStage::ExcludedAgent => "excluded_agent",
            ExclusionStage::OthersStatus => "others_status",
            ExclusionStage::ExcludedWeekday => "excluded_weekday",
        }
    }
}

/// Ordered, composable exclusion stages.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ExclusionPipeline {
    abort: bool,
    phrases: Vec<String>,
    placeholders: Vec<String>,
    agents: Vec<String>,
    others: bool,
    weekday: Option<Weekday>,
}

/// Uppercased, trimmed, non-blank patterns.
fn patterns<S: AsRef<str>>(items: impl IntoIterator<Item = S>) -> Vec<String> {
    items
        .into_iter()
        .map(|s| s.as_ref().trim().to_uppercase())
        .filter(|s| !s.is_empty())
        .collect()
}

impl ExclusionPipeline {
    /// A pipeline with no stages enabled.
    pub fn new() -> Self {
        Self::default()
    }

    /// Build the pipeline described by `[filters]`.
    pub fn from_config(config: &FilterConfig) -> Result<Self> {
        let mut pipeline = Self::new()
            .with_phrases(&config.excluded_phrases)
            .with_placeholders(&config.placeholder_patterns)
            .with_agents(&config.excluded_agents);
        pipeline.abort = config.exclude_abort;
        pipeline.others = config.exclude_others;
        pipeline.weekday = config.weekday()?;

        tracing::debug!(
            stages = ?pipeline.stages(),
            "Built exclusion pipeline"
        );
        Ok(pipeline)
    }

    pub fn with_abort(mut self) -> Self {
        self.abort = true;
        self
    }

    pub fn with_phrases<S: AsRef<str>>(mut self, phrases: impl IntoIterator<Item = S>) -> Self {
        self.phrases = patterns(phrases);
        self
    }

    pub fn with_placeholders<S: AsRef<str>>(
        mut self,
        placeholders: impl IntoIterator<Item = S>,
    ) -> Self {
        self.placeholders = patterns(placeholders);
        self
    }

    pub fn with_agents<S: AsRef<str>>(mut self, agents: impl IntoIterator<Item = S>) -> Self {
        self.agents = patterns(agents);
        self
    }

    pub fn with_others(mut self) -> Self {
        self.others = true;
        self
    }

    pub fn with_weekday(mut self, weekday: Weekday) -> Self {
        self.weekday = Some(weekday);
        self
    }

    /// Enabled stages in evaluation order.
    pub fn stages(&self) -> Vec<ExclusionStage> {
        ExclusionStage::ORDER
            .into_iter()
            .filter(|stage| self.is_enabled(*stage))
            .collect()
    }

    pub fn is_enabled(&self, stage: ExclusionStage) -> bool {
        match stage {
            ExclusionStage::AbortStatus => self.abort,
            ExclusionStage::RemarkPhrase => !self.phrases.is_empty(),
            ExclusionStage::PlaceholderLead => !self.placeholders.is_empty(),
            ExclusionStage::ExcludedAgent => !self.agents.is_empty(),
            ExclusionStage::OthersStatus => self.others,
            ExclusionStage::ExcludedWeekday => self.weekday.is_some(),
        }
    }

    /// Input columns the enabled stages read beyond the base record.
    pub fn required_columns(&self) -> Vec<Column> {
        if self.is_enabled(ExclusionStage::RemarkPhrase) {
            vec![Column::Remark]
        } else {
            Vec::new()
        }
    }

    fn matches(&self, stage: ExclusionStage, record: &CallRecord) -> bool {
        match stage {
            ExclusionStage::AbortStatus => record.disposition.markers.abort,
            ExclusionStage::RemarkPhrase => {
                let remark = record.remark_text.to_uppercase();
                self.phrases.iter().any(|p| remark.contains(p.as_str()))
            }
            ExclusionStage::PlaceholderLead => {
                let account = record.account_id.to_uppercase();
                let debtor = record.debtor.to_uppercase();
                self.placeholders
                    .iter()
                    .any(|p| account.contains(p.as_str()) || debtor.contains(p.as_str()))
            }
            ExclusionStage::ExcludedAgent => {
                let agent = record.remark_by.trim().to_uppercase();
                self.agents.iter().any(|a| *a == agent)
            }
            ExclusionStage::OthersStatus => record.call_status == CallStatus::Others,
            ExclusionStage::ExcludedWeekday => match (record.date, self.weekday) {
                (Some(date), Some(weekday)) => date.weekday() == weekday,
                _ => false,
            },
        }
    }

    /// First enabled stage that removes `record`, if any.
    pub fn first_exclusion(&self, record: &CallRecord) -> Option<ExclusionStage> {
        ExclusionStage::ORDER
            .into_iter()
            .find(|stage| self.is_enabled(*stage) && self.matches(*stage, record))
    }

    /// Split records into borrowed survivors and a removal report.
    pub fn apply<'a, I>(&self, records: I) -> FilterOutcome<'a>
    where
        I: IntoIterator<Item = &'a CallRecord>,
    {
        let mut kept = Vec::new();
        let mut report = FilterReport::default();

        for record in records {
            report.input += 1;
            match self.first_exclusion(record) {
                Some(stage) => *report.removed.entry(stage).or_insert(0) += 1,
                None => kept.push(record),
            }
        }
        report.kept = kept.len();

        tracing::debug!(
            input = report.input,
            kept = report.kept,
            removed = report.total_removed(),
            "Applied exclusion pipeline"
        );

        FilterOutcome { kept, report }
    }
}

/// Per-stage removal counts.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct FilterReport {
    pub input: usize,
    pub kept: usize,
    pub removed: BTreeMap<ExclusionStage, usize>,
}

impl FilterReport {
    pub fn removed_by(&self, stage: ExclusionStage) -> usize {
        self.removed.get(&stage).copied().unwrap_or(0)
    }

    pub fn total_removed(&self) -> usize {
        self.removed.values().sum()
    }
}

/// Survivors of the pipeline, in input order.
#[derive(Debug, Clone)]
pub struct FilterOutcome<'a> {
    pub kept: Vec<&'a CallRecord>,
    pub report: FilterReport,
}
