//! Dimension classifiers
//!
//! Pure functions from a [`CallRecord`] to the keys summaries group by:
//! time-of-day bucket, dialing cycle and balance tier, plus the plain
//! date, collector and client fields.
//!
//! Derived values live in a [`DimensionIndex`] next to the records; the
//! records themselves are never touched.

use crate::error::{Error, Result};
use crate::format::format_whole;
use crate::types::{CallRecord, Column};
use chrono::{NaiveDate, NaiveTime, Timelike};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::fmt;

// ============================================
// Time buckets
// ============================================

const BUCKET_LABELS: [&str; 15] = [
    "06:00-07:00 AM",
    "07:01-08:00 AM",
    "08:01-09:00 AM",
    "09:01-10:00 AM",
    "10:01-11:00 AM",
    "11:01-12:00 PM",
    "12:01-01:00 PM",
    "01:01-02:00 PM",
    "02:01-03:00 PM",
    "03:01-04:00 PM",
    "04:01-05:00 PM",
    "05:01-06:00 PM",
    "06:01-07:00 PM",
    "07:01-08:00 PM",
    "08:01-09:00 PM",
];

const FIRST_MINUTE: u32 = 6 * 60;
const END_MINUTE: u32 = 21 * 60;

/// Hour-of-day bucket of a call.
///
/// Buckets are looked up by minute of day, seconds ignored. The first bucket
/// runs 06:00 through 07:00; every later bucket starts one minute past the
/// hour and ends on the next hour, so 09:00 belongs to `08:01-09:00 AM` and
/// 09:01 to `09:01-10:00 AM`. Anything before 06:00 or from 21:00 on is
/// [`TimeBucket::OutsideRange`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub enum TimeBucket {
    /// Index 0..15 into the fixed bucket list
    Slot(u8),
    OutsideRange,
}

impl TimeBucket {
    pub const COUNT: usize = BUCKET_LABELS.len();

    pub fn classify(time: NaiveTime) -> Self {
        let minute = time.hour() * 60 + time.minute();
        if !(FIRST_MINUTE..END_MINUTE).contains(&minute) {
            return TimeBucket::OutsideRange;
        }
        if minute <= FIRST_MINUTE + 60 {
            return TimeBucket::Slot(0);
        }
        TimeBucket::Slot(((minute - FIRST_MINUTE - 1) / 60) as u8)
    }

    /// All in-range buckets in time-of-day order.
    pub fn all() -> impl Iterator<Item = TimeBucket> {
        (0..Self::COUNT as u8).map(TimeBucket::Slot)
    }

    pub fn label(&self) -> &'static str {
        match self {
            TimeBucket::Slot(i) => BUCKET_LABELS.get(*i as usize).copied().unwrap_or("Outside Range"),
            TimeBucket::OutsideRange => "Outside Range",
        }
    }

    pub fn is_in_range(&self) -> bool {
        matches!(self, TimeBucket::Slot(_))
    }
}

impl fmt::Display for TimeBucket {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

// ============================================
// Cycles
// ============================================

/// Which identifier a cycle code is extracted from.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum CycleSource {
    /// Leading digits of `Service No.`
    #[default]
    ServiceNumber,
    /// First two characters of `Card No.`
    CardNumber,
}

impl CycleSource {
    pub fn column(&self) -> Column {
        match self {
            CycleSource::ServiceNumber => Column::ServiceNo,
            CycleSource::CardNumber => Column::CardNo,
        }
    }
}

/// Dialing cycle of an account.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub enum Cycle {
    Code(String),
    /// No usable code; excluded from cycle-grouped summaries
    Unknown,
}

impl Cycle {
    pub fn label(&self) -> &str {
        match self {
            Cycle::Code(code) => code,
            Cycle::Unknown => "Unknown",
        }
    }
}

impl Ord for Cycle {
    fn cmp(&self, other: &Self) -> Ordering {
        match (self, other) {
            (Cycle::Code(a), Cycle::Code(b)) => match (a.parse::<u64>(), b.parse::<u64>()) {
                (Ok(x), Ok(y)) => x.cmp(&y).then_with(|| a.cmp(b)),
                _ => a.cmp(b),
            },
            (Cycle::Code(_), Cycle::Unknown) => Ordering::Less,
            (Cycle::Unknown, Cycle::Code(_)) => Ordering::Greater,
            (Cycle::Unknown, Cycle::Unknown) => Ordering::Equal,
        }
    }
}

impl PartialOrd for Cycle {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl fmt::Display for Cycle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Extract the cycle code of a record.
///
/// Service numbers contribute their leading run of ASCII digits; card
/// numbers their first two characters. Anything that yields no code is
/// [`Cycle::Unknown`].
pub fn derive_cycle(record: &CallRecord, source: CycleSource) -> Cycle {
    let code: String = match source {
        CycleSource::ServiceNumber => record
            .service_no
            .trim()
            .chars()
            .take_while(|c| c.is_ascii_digit())
            .collect(),
        CycleSource::CardNumber => {
            let card = record.card_no.trim();
            if card.chars().count() < 2 {
                String::new()
            } else {
                card.chars().take(2).collect()
            }
        }
    };

    if code.is_empty() {
        Cycle::Unknown
    } else {
        Cycle::Code(code)
    }
}

// ============================================
// Balance tiers
// ============================================

/// Closed balance range `[min, max]`; no `max` means open-ended.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TierBounds {
    pub min: Decimal,
    #[serde(default)]
    pub max: Option<Decimal>,
    /// Display label; derived from the bounds when absent
    #[serde(default)]
    pub label: Option<String>,
}

impl TierBounds {
    pub fn new(min: Decimal, max: Option<Decimal>) -> Self {
        Self {
            min,
            max,
            label: None,
        }
    }

    pub fn contains(&self, amount: Decimal) -> bool {
        amount >= self.min && self.max.map_or(true, |max| amount <= max)
    }

    pub fn display_label(&self) -> String {
        if let Some(label) = &self.label {
            return label.clone();
        }
        match self.max {
            Some(max) => format!("{} - {}", format_whole(self.min), format_whole(max)),
            None => format!("{}+", format_whole(self.min)),
        }
    }
}

/// Balance tier a record falls in; ordered by configured position.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub struct BalanceTier {
    pub index: usize,
    pub label: String,
}

impl fmt::Display for BalanceTier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.label)
    }
}

/// Validated, non-overlapping set of balance tiers.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BalanceTiers {
    tiers: Vec<TierBounds>,
}

impl BalanceTiers {
    /// Validate tier bounds: each range is non-inverted and no two overlap.
    pub fn new(tiers: Vec<TierBounds>) -> Result<Self> {
        for (i, tier) in tiers.iter().enumerate() {
            if let Some(max) = tier.max {
                if max < tier.min {
                    return Err(Error::Config(format!(
                        "balance tier {} has max {} below min {}",
                        i + 1,
                        max,
                        tier.min
                    )));
                }
            }
        }

        let mut sorted: Vec<&TierBounds> = tiers.iter().collect();
        sorted.sort_by(|a, b| a.min.cmp(&b.min));
        for pair in sorted.windows(2) {
            let (low, high) = (pair[0], pair[1]);
            let overlaps = low.max.map_or(true, |max| max >= high.min);
            if overlaps {
                return Err(Error::Config(format!(
                    "balance tiers '{}' and '{}' overlap",
                    low.display_label(),
                    high.display_label()
                )));
            }
        }

        Ok(Self { tiers })
    }

    pub fn bounds(&self) -> &[TierBounds] {
        &self.tiers
    }

    pub fn classify(&self, balance: Decimal) -> Option<BalanceTier> {
        self.tiers
            .iter()
            .position(|t| t.contains(balance))
            .map(|index| BalanceTier {
                index,
                label: self.tiers[index].display_label(),
            })
    }
}

impl Default for BalanceTiers {
    fn default() -> Self {
        Self {
            tiers: crate::config::DimensionConfig::default().balance_tiers,
        }
    }
}

// ============================================
// Grouping dimensions
// ============================================

/// A key a summary can be grouped by.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Dimension {
    Date,
    Collector,
    Cycle,
    TimeBucket,
    BalanceTier,
    Client,
}

impl Dimension {
    /// Column header used for this dimension in output tables.
    pub fn header(&self) -> &'static str {
        match self {
            Dimension::Date => "Date",
            Dimension::Collector => "Collector",
            Dimension::Cycle => "Cycle",
            Dimension::TimeBucket => "Time Range",
            Dimension::BalanceTier => "Balance Tier",
            Dimension::Client => "Client",
        }
    }

    /// Input column this dimension is derived from.
    pub fn source_column(&self, cycle_source: CycleSource) -> Column {
        match self {
            Dimension::Date => Column::Date,
            Dimension::Collector => Column::RemarkBy,
            Dimension::Cycle => cycle_source.column(),
            Dimension::TimeBucket => Column::Time,
            Dimension::BalanceTier => Column::Balance,
            Dimension::Client => Column::Client,
        }
    }
}

impl std::str::FromStr for Dimension {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_lowercase().replace('_', "-").as_str() {
            "date" => Ok(Dimension::Date),
            "collector" | "agent" => Ok(Dimension::Collector),
            "cycle" => Ok(Dimension::Cycle),
            "time-bucket" | "time" | "hour" => Ok(Dimension::TimeBucket),
            "balance-tier" | "tier" => Ok(Dimension::BalanceTier),
            "client" => Ok(Dimension::Client),
            other => Err(Error::InvalidArgument(format!("unknown dimension: {}", other))),
        }
    }
}

/// Value of one dimension for one record.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(untagged)]
pub enum DimensionValue {
    Date(NaiveDate),
    Collector(String),
    Cycle(Cycle),
    TimeBucket(TimeBucket),
    BalanceTier(BalanceTier),
    Client(String),
}

impl fmt::Display for DimensionValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DimensionValue::Date(date) => write!(f, "{}", date.format("%Y-%m-%d")),
            DimensionValue::Collector(name) | DimensionValue::Client(name) => f.write_str(name),
            DimensionValue::Cycle(cycle) => cycle.fmt(f),
            DimensionValue::TimeBucket(bucket) => bucket.fmt(f),
            DimensionValue::BalanceTier(tier) => tier.fmt(f),
        }
    }
}

// ============================================
// Side index
// ============================================

/// Derived dimensions of one record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Annotations {
    /// `None` when the record has no parseable time
    pub time_bucket: Option<TimeBucket>,
    pub cycle: Cycle,
    pub balance_tier: Option<BalanceTier>,
}

/// Classifier settings shared by every view.
#[derive(Debug, Clone, Default)]
pub struct Classifiers {
    pub cycle_source: CycleSource,
    pub balance_tiers: BalanceTiers,
}

impl Classifiers {
    pub fn new(cycle_source: CycleSource, balance_tiers: BalanceTiers) -> Self {
        Self {
            cycle_source,
            balance_tiers,
        }
    }

    pub fn annotate(&self, record: &CallRecord) -> Annotations {
        Annotations {
            time_bucket: record.time.map(TimeBucket::classify),
            cycle: derive_cycle(record, self.cycle_source),
            balance_tier: self.balance_tiers.classify(record.balance),
        }
    }

    /// Annotate every record, keeping input order.
    pub fn index<'a>(&self, records: &[&'a CallRecord]) -> DimensionIndex<'a> {
        DimensionIndex {
            entries: records
                .iter()
                .map(|r| (*r, self.annotate(r)))
                .collect(),
        }
    }
}

/// Records paired with their derived dimensions.
#[derive(Debug, Clone, Default)]
pub struct DimensionIndex<'a> {
    entries: Vec<(&'a CallRecord, Annotations)>,
}

impl<'a> DimensionIndex<'a> {
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&'a CallRecord, &Annotations)> + '_ {
        self.entries.iter().map(|(r, a)| (*r, a))
    }

    /// Value of `dimension` for an entry, or `None` when the record has no
    /// usable value (no date, outside the bucket range, unknown cycle, no
    /// tier, blank collector or client).
    pub fn value_of(
        dimension: Dimension,
        record: &CallRecord,
        annotations: &Annotations,
    ) -> Option<DimensionValue> {
        match dimension {
            Dimension::Date => record.date.map(DimensionValue::Date),
            Dimension::Collector => non_blank(record.collector()).map(DimensionValue::Collector),
            Dimension::Cycle => match &annotations.cycle {
                Cycle::Code(_) => Some(DimensionValue::Cycle(annotations.cycle.clone())),
                Cycle::Unknown => None,
            },
            Dimension::TimeBucket => annotations
                .time_bucket
                .filter(TimeBucket::is_in_range)
                .map(DimensionValue::TimeBucket),
            Dimension::BalanceTier => annotations
                .balance_tier
                .clone()
                .map(DimensionValue::BalanceTier),
            Dimension::Client => non_blank(record.client.trim()).map(DimensionValue::Client),
        }
    }
}

fn non_blank(text: &str) -> Option<String> {
    if text.is_empty() {
        None
    } else {
        Some(text.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn at(h: u32, m: u32, s: u32) -> NaiveTime {
        NaiveTime::from_hms_opt(h, m, s).unwrap()
    }

    #[test]
    fn test_bucket_boundaries() {
        assert_eq!(TimeBucket::classify(at(9, 0, 0)).label(), "08:01-09:00 AM");
        assert_eq!(TimeBucket::classify(at(9, 1, 0)).label(), "09:01-10:00 AM");
        assert_eq!(TimeBucket::classify(at(5, 59, 0)), TimeBucket::OutsideRange);
        assert_eq!(TimeBucket::classify(at(6, 0, 0)).label(), "06:00-07:00 AM");
        assert_eq!(TimeBucket::classify(at(7, 0, 59)).label(), "06:00-07:00 AM");
        assert_eq!(TimeBucket::classify(at(7, 1, 0)).label(), "07:01-08:00 AM");
        assert_eq!(TimeBucket::classify(at(12, 0, 0)).label(), "11:01-12:00 PM");
        assert_eq!(TimeBucket::classify(at(12, 30, 0)).label(), "12:01-01:00 PM");
        assert_eq!(TimeBucket::classify(at(20, 59, 59)).label(), "08:01-09:00 PM");
        assert_eq!(TimeBucket::classify(at(21, 0, 0)), TimeBucket::OutsideRange);
        assert_eq!(TimeBucket::classify(at(23, 15, 0)), TimeBucket::OutsideRange);
    }

    #[test]
    fn test_buckets_are_contiguous() {
        // Every minute from 06:00 to 20:59 lands in exactly one in-range bucket,
        // and bucket indices never decrease.
        let mut previous = 0u8;
        for minute in FIRST_MINUTE..END_MINUTE {
            let time = at(minute / 60, minute % 60, 0);
            match TimeBucket::classify(time) {
                TimeBucket::Slot(i) => {
                    assert!(i >= previous);
                    assert!((i as usize) < TimeBucket::COUNT);
                    previous = i;
                }
                TimeBucket::OutsideRange => panic!("{time} fell outside the range"),
            }
        }
        assert_eq!(TimeBucket::all().count(), 15);
    }

    fn with_service(code: &str) -> CallRecord {
        CallRecord {
            service_no: code.to_string(),
            card_no: code.to_string(),
            ..Default::default()
        }
    }

    #[test]
    fn test_derive_cycle_from_service_number() {
        let source = CycleSource::ServiceNumber;
        assert_eq!(
            derive_cycle(&with_service("21-00981"), source),
            Cycle::Code("21".to_string())
        );
        assert_eq!(
            derive_cycle(&with_service(" 05ABC"), source),
            Cycle::Code("05".to_string())
        );
        assert_eq!(derive_cycle(&with_service("ABC"), source), Cycle::Unknown);
        assert_eq!(derive_cycle(&with_service(""), source), Cycle::Unknown);
    }

    #[test]
    fn test_derive_cycle_from_card_number() {
        let source = CycleSource::CardNumber;
        assert_eq!(
            derive_cycle(&with_service("C7123456"), source),
            Cycle::Code("C7".to_string())
        );
        assert_eq!(derive_cycle(&with_service("9"), source), Cycle::Unknown);
    }

    #[test]
    fn test_cycle_ordering_is_numeric() {
        let mut cycles = vec![
            Cycle::Unknown,
            Cycle::Code("10".to_string()),
            Cycle::Code("2".to_string()),
        ];
        cycles.sort();
        assert_eq!(
            cycles,
            vec![
                Cycle::Code("2".to_string()),
                Cycle::Code("10".to_string()),
                Cycle::Unknown
            ]
        );
    }

    #[test]
    fn test_default_balance_tiers() {
        let tiers = BalanceTiers::default();
        let tier = |amount: i64| tiers.classify(Decimal::new(amount, 0)).map(|t| t.index);

        assert_eq!(tier(5_999), None);
        assert_eq!(tier(6_000), Some(0));
        assert_eq!(tier(49_999), Some(0));
        assert_eq!(tier(50_000), Some(1));
        assert_eq!(tier(75_000), Some(1));
        assert_eq!(tier(99_999), Some(1));
        assert_eq!(tier(100_000), Some(2));
        assert_eq!(tier(2_500_000), Some(2));

        let labels: Vec<String> = tiers.bounds().iter().map(|t| t.display_label()).collect();
        assert_eq!(labels, vec!["6,000 - 49,999", "50,000 - 99,999", "100,000+"]);
    }

    #[test]
    fn test_invalid_tiers() {
        let inverted = vec![TierBounds::new(Decimal::new(10, 0), Some(Decimal::new(5, 0)))];
        assert!(BalanceTiers::new(inverted).is_err());

        let open_then_more = vec![
            TierBounds::new(Decimal::new(0, 0), None),
            TierBounds::new(Decimal::new(100, 0), Some(Decimal::new(200, 0))),
        ];
        assert!(BalanceTiers::new(open_then_more).is_err());

        let touching = vec![
            TierBounds::new(Decimal::new(0, 0), Some(Decimal::new(100, 0))),
            TierBounds::new(Decimal::new(100, 0), None),
        ];
        assert!(BalanceTiers::new(touching).is_err());
    }

    #[test]
    fn test_dimension_values_skip_unusable_records() {
        let classifiers = Classifiers::default();
        let record = CallRecord {
            time: Some(at(5, 30, 0)),
            service_no: "n/a".to_string(),
            balance: Decimal::new(100, 0),
            ..Default::default()
        };
        let ann = classifiers.annotate(&record);

        for dimension in [
            Dimension::Date,
            Dimension::Collector,
            Dimension::Cycle,
            Dimension::TimeBucket,
            Dimension::BalanceTier,
            Dimension::Client,
        ] {
            assert_eq!(DimensionIndex::value_of(dimension, &record, &ann), None);
        }
    }

    #[test]
    fn test_parse_dimension_names() {
        assert_eq!("time_bucket".parse::<Dimension>().unwrap(), Dimension::TimeBucket);
        assert_eq!("Balance-Tier".parse::<Dimension>().unwrap(), Dimension::BalanceTier);
        assert!("weather".parse::<Dimension>().is_err());
    }
}
