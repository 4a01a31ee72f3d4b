//! # dialstat-core
//!
//! Core library for dialstat - call-center disposition summaries.
//!
//! This library provides:
//! - Domain types for call records and disposition markers
//! - CSV ingest and record normalization
//! - The record exclusion pipeline
//! - Grouping, metrics, rates and summary tables
//! - Configuration management
//! - Logging infrastructure
//!
//! ## Example
//!
//! ```rust,no_run
//! use dialstat_core::analytics::{ReportEngine, ViewKind, ViewSpec};
//! use dialstat_core::{ingest, Config};
//!
//! let config = Config::load().expect("failed to load config");
//! let engine = ReportEngine::from_config(&config).expect("invalid config");
//!
//! let table = ingest::read_csv("dispositions.csv".as_ref()).expect("failed to read input");
//! let summary = engine
//!     .summarize(&ViewSpec::new(ViewKind::Collector), &table)
//!     .expect("missing columns");
//! println!("{}", summary.to_json());
//! ```

// Re-export commonly used items at the crate root
pub use config::Config;
pub use error::{Error, Result};
pub use filter::{ExclusionPipeline, ExclusionStage, FilterReport};
pub use ingest::{normalize, ColumnContract, NormalizeReport, RawTable};
pub use types::*;

// Public modules
pub mod analytics;
pub mod config;
pub mod error;
pub mod filter;
pub mod format;
pub mod ingest;
pub mod logging;
pub mod types;
