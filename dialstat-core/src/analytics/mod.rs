//! Summary analytics for dialstat
//!
//! Turns filtered call records into summary tables:
//! - Dimension classifiers (time bucket, cycle, balance tier)
//! - Metric predicates and per-group aggregation
//! - Rate derivation with undefined-rate handling
//! - Summary tables with a Total row and optional sorting
//! - Named views and the column registry
//!
//! See [`engine`] for running views over a raw input table.

pub mod aggregate;
pub mod dimensions;
pub mod engine;
pub mod metrics_registry;
pub mod predicates;
pub mod rates;
pub mod table;
pub mod views;

// Engine exports
pub use engine::{parse_views, ReportEngine, ViewRunResult, ViewRunStatus};

pub use aggregate::{aggregate, GroupedMetrics, Metrics, RecordSubset};
pub use dimensions::{
    derive_cycle, Annotations, BalanceTier, BalanceTiers, Classifiers, Cycle, CycleSource,
    Dimension, DimensionIndex, DimensionValue, TierBounds, TimeBucket,
};
pub use metrics_registry::{columns_for_view, ColumnDescriptor, ColumnKind, MetricColumn};
pub use rates::Rates;
pub use table::{Cell, KeyCell, SortDirection, SortSpec, SummaryRow, SummaryTable};
pub use views::{list_views, ViewKind, ViewSpec};
