//! Grouping and per-group metric aggregation.

use super::dimensions::{Dimension, DimensionIndex, DimensionValue};
use super::predicates::{
    is_agent_drop, is_connected, is_promise_to_pay, is_right_party_contact, is_system_drop,
};
use crate::error::{Error, Result};
use crate::types::{CallRecord, RemarkType};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashSet};

/// Count and sum metrics of one group.
///
/// Unique-account counts (`accounts_total`, `connected_accounts`,
/// `ptp_accounts`) count an account once per group however many attempts it
/// had. Raw counts (`total_dialed`, `connected`, `rpc`, drops) count every
/// attempt.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Metrics {
    pub accounts_total: u64,
    pub total_dialed: u64,
    pub connected_accounts: u64,
    pub connected: u64,
    pub rpc: u64,
    pub ptp_accounts: u64,
    pub ptp_amount: Decimal,
    /// Balances of records with a promised amount above zero
    pub balance_amount: Decimal,
    pub agent_drops: u64,
    pub system_drops: u64,
    pub talk_time_secs: u64,
}

impl Metrics {
    /// Add another group's counts and sums column by column.
    pub fn accumulate(&mut self, other: &Metrics) {
        self.accounts_total += other.accounts_total;
        self.total_dialed += other.total_dialed;
        self.connected_accounts += other.connected_accounts;
        self.connected += other.connected;
        self.rpc += other.rpc;
        self.ptp_accounts += other.ptp_accounts;
        self.ptp_amount += other.ptp_amount;
        self.balance_amount += other.balance_amount;
        self.agent_drops += other.agent_drops;
        self.system_drops += other.system_drops;
        self.talk_time_secs += other.talk_time_secs;
    }

    /// Column-wise sum of many groups.
    pub fn sum<'a>(metrics: impl IntoIterator<Item = &'a Metrics>) -> Metrics {
        let mut total = Metrics::default();
        for m in metrics {
            total.accumulate(m);
        }
        total
    }
}

/// Which records a view looks at.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum RecordSubset {
    #[default]
    All,
    /// Predictive and follow-up dialing
    Predictive,
    /// Manually placed outgoing calls
    Manual,
}

impl RecordSubset {
    pub fn includes(&self, record: &CallRecord) -> bool {
        match self {
            RecordSubset::All => true,
            RecordSubset::Predictive => matches!(
                record.remark_type,
                RemarkType::Predictive | RemarkType::FollowUp
            ),
            RecordSubset::Manual => record.remark_type == RemarkType::Outgoing,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            RecordSubset::All => "all",
            RecordSubset::Predictive => "predictive",
            RecordSubset::Manual => "manual",
        }
    }
}

impl std::str::FromStr for RecordSubset {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_lowercase().as_str() {
            "all" | "" => Ok(RecordSubset::All),
            "predictive" => Ok(RecordSubset::Predictive),
            "manual" | "outgoing" => Ok(RecordSubset::Manual),
            other => Err(Error::InvalidArgument(format!(
                "unknown record subset: {} (expected all, predictive or manual)",
                other
            ))),
        }
    }
}

/// Metrics of one distinct key combination.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GroupedMetrics {
    pub keys: Vec<DimensionValue>,
    pub metrics: Metrics,
}

#[derive(Default)]
struct GroupAccumulator<'a> {
    accounts: HashSet<&'a str>,
    connected_accounts: HashSet<&'a str>,
    ptp_accounts: HashSet<&'a str>,
    metrics: Metrics,
}

impl<'a> GroupAccumulator<'a> {
    fn observe(&mut self, record: &'a CallRecord) {
        let account = record.account_id.trim();
        self.accounts.insert(account);
        self.metrics.total_dialed += 1;
        self.metrics.talk_time_secs += u64::from(record.talk_time_secs);

        if is_connected(record) {
            self.connected_accounts.insert(account);
            self.metrics.connected += 1;
        }
        if is_right_party_contact(record) {
            self.metrics.rpc += 1;
        }
        if is_promise_to_pay(record) {
            self.ptp_accounts.insert(account);
            self.metrics.ptp_amount += record.promise_amount;
        }
        if record.has_promise() {
            self.metrics.balance_amount += record.balance;
        }
        if is_agent_drop(record) {
            self.metrics.agent_drops += 1;
        }
        if is_system_drop(record) {
            self.metrics.system_drops += 1;
        }
    }

    fn finish(self) -> Metrics {
        Metrics {
            accounts_total: self.accounts.len() as u64,
            connected_accounts: self.connected_accounts.len() as u64,
            ptp_accounts: self.ptp_accounts.len() as u64,
            ..self.metrics
        }
    }
}

/// Group annotated records by `dimensions` and aggregate each group.
///
/// Records outside `subset`, or without a usable value for any requested
/// dimension, are skipped. Only groups with at least one record appear;
/// rows come back ordered by key. An empty dimension list yields a single
/// group over every included record.
pub fn aggregate(
    index: &DimensionIndex<'_>,
    dimensions: &[Dimension],
    subset: RecordSubset,
) -> Vec<GroupedMetrics> {
    let mut groups: BTreeMap<Vec<DimensionValue>, GroupAccumulator<'_>> = BTreeMap::new();
    let mut skipped = 0usize;

    for (record, annotations) in index.iter() {
        if !subset.includes(record) {
            continue;
        }

        let keys: Option<Vec<DimensionValue>> = dimensions
            .iter()
            .map(|d| DimensionIndex::value_of(*d, record, annotations))
            .collect();

        match keys {
            Some(keys) => groups.entry(keys).or_default().observe(record),
            None => skipped += 1,
        }
    }

    tracing::debug!(
        dimensions = ?dimensions,
        subset = subset.as_str(),
        groups = groups.len(),
        skipped,
        "Aggregated records"
    );

    groups
        .into_iter()
        .map(|(keys, acc)| GroupedMetrics {
            keys,
            metrics: acc.finish(),
        })
        .collect()
}
