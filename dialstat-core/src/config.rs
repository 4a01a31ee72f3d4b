//! dialstat settings
//!
//! Read from `$XDG_CONFIG_HOME/dialstat/config.toml`; every table is optional.
//! Daily log files go to `$XDG_STATE_HOME/dialstat/`.
//!
//! ```toml
//! [filters]
//! excluded_agents = ["TRAINEE01", "QA-MONITOR"]
//! excluded_phrases = ["Broken Promise", "New files imported"]
//! placeholder_patterns = ["DEFAULT_LEAD_"]
//! exclude_weekday = "Sunday"
//!
//! [dimensions]
//! cycle_source = "service-number"
//! balance_tiers = [
//!     { min = "6000", max = "49999" },
//!     { min = "50000", max = "99999" },
//!     { min = "100000" },
//! ]
//!
//! [report]
//! views = ["hourly", "collector"]
//! subset = "predictive"
//! sort = "ptp_amount:desc"
//! ```

use crate::analytics::dimensions::{CycleSource, TierBounds};
use crate::error::{Error, Result};
use chrono::Weekday;
use rust_decimal::Decimal;
use serde::Deserialize;
use std::path::{Path, PathBuf};

/// `$HOME`, falling back to the platform home lookup, then `.`.
fn home() -> PathBuf {
    std::env::var_os("HOME")
        .map(PathBuf::from)
        .or_else(dirs::home_dir)
        .unwrap_or_else(|| PathBuf::from("."))
}

/// XDG base directory `var`, or `$HOME/<fallback>` when unset or empty.
fn xdg_dir(var: &str, fallback: &str) -> PathBuf {
    match std::env::var_os(var) {
        Some(dir) if !dir.is_empty() => PathBuf::from(dir),
        _ => home().join(fallback),
    }
}

const XDG_DIRS: [(&str, &str); 2] = [
    ("XDG_CONFIG_HOME", ".config"),
    ("XDG_STATE_HOME", ".local/state"),
];

/// Main configuration struct
#[derive(Debug, Deserialize, Default, Clone)]
pub struct Config {
    /// Record exclusion rules applied before every summary
    #[serde(default)]
    pub filters: FilterConfig,

    /// Cycle and balance tier classification
    #[serde(default)]
    pub dimensions: DimensionConfig,

    /// Default views and ordering for the CLI
    #[serde(default)]
    pub report: ReportConfig,

    /// Logging configuration
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Exclusion lists and stage toggles.
///
/// There is exactly one list per concept; every view uses the same lists.
#[derive(Debug, Deserialize, Clone)]
pub struct FilterConfig {
    /// Drop dispositions containing "ABORT"
    #[serde(default = "default_true")]
    pub exclude_abort: bool,

    /// Drop rows whose `Call Status` is OTHERS
    #[serde(default = "default_true")]
    pub exclude_others: bool,

    /// `Remark By` values whose rows are dropped (case-insensitive)
    #[serde(default)]
    pub excluded_agents: Vec<String>,

    /// Remark phrases whose rows are dropped (case-insensitive substring)
    #[serde(default)]
    pub excluded_phrases: Vec<String>,

    /// Account or debtor patterns marking placeholder leads
    #[serde(default)]
    pub placeholder_patterns: Vec<String>,

    /// Weekday whose rows are dropped (e.g. "Sunday")
    #[serde(default)]
    pub exclude_weekday: Option<String>,
}

impl Default for FilterConfig {
    fn default() -> Self {
        Self {
            exclude_abort: true,
            exclude_others: true,
            excluded_agents: vec![],
            excluded_phrases: vec![],
            placeholder_patterns: vec![],
            exclude_weekday: None,
        }
    }
}

impl FilterConfig {
    /// Parse the configured excluded weekday.
    pub fn weekday(&self) -> Result<Option<Weekday>> {
        match self.exclude_weekday.as_deref().map(str::trim) {
            None | Some("") => Ok(None),
            Some(name) => name.parse::<Weekday>().map(Some).map_err(|_| {
                Error::Config(format!("filters.exclude_weekday: unknown weekday '{}'", name))
            }),
        }
    }
}

fn default_true() -> bool {
    true
}

/// Dimension classifier settings.
#[derive(Debug, Deserialize, Clone)]
pub struct DimensionConfig {
    /// Balance tiers, in display order
    #[serde(default = "default_balance_tiers")]
    pub balance_tiers: Vec<TierBounds>,

    /// Which identifier the cycle code is extracted from
    #[serde(default)]
    pub cycle_source: CycleSource,
}

impl Default for DimensionConfig {
    fn default() -> Self {
        Self {
            balance_tiers: default_balance_tiers(),
            cycle_source: CycleSource::default(),
        }
    }
}

fn default_balance_tiers() -> Vec<TierBounds> {
    vec![
        TierBounds::new(Decimal::new(6_000, 0), Some(Decimal::new(49_999, 0))),
        TierBounds::new(Decimal::new(50_000, 0), Some(Decimal::new(99_999, 0))),
        TierBounds::new(Decimal::new(100_000, 0), None),
    ]
}

/// Report defaults used when the CLI is not given explicit views.
#[derive(Debug, Deserialize, Clone)]
pub struct ReportConfig {
    /// View names to produce
    #[serde(default = "default_views")]
    pub views: Vec<String>,

    /// Record subset: all, predictive or manual
    #[serde(default = "default_subset")]
    pub subset: String,

    /// Optional sort, `column[:asc|desc]`
    #[serde(default)]
    pub sort: Option<String>,
}

impl Default for ReportConfig {
    fn default() -> Self {
        Self {
            views: default_views(),
            subset: default_subset(),
            sort: None,
        }
    }
}

fn default_views() -> Vec<String> {
    ["hourly", "collector", "cycle", "balance-tier", "overall"]
        .iter()
        .map(|v| v.to_string())
        .collect()
}

fn default_subset() -> String {
    "all".to_string()
}

/// Logging configuration
#[derive(Debug, Deserialize, Clone)]
pub struct LoggingConfig {
    /// Log level (trace, debug, info, warn, error)
    #[serde(default = "default_log_level")]
    pub level: String,

    /// Maximum number of log files to keep
    #[serde(default = "default_max_log_files")]
    pub max_files: usize,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            max_files: default_max_log_files(),
        }
    }
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_max_log_files() -> usize {
    5
}

impl Config {
    /// Load `config.toml` from the XDG config directory; defaults when absent.
    pub fn load() -> Result<Self> {
        let path = Self::config_path();
        if path.is_file() {
            return Self::load_from(&path);
        }
        tracing::info!(path = %path.display(), "no config file, using defaults");
        Ok(Config::default())
    }

    /// Load and validate a config file at `path`.
    pub fn load_from(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path)
            .map_err(|e| Error::Config(format!("cannot read {}: {}", path.display(), e)))?;
        let config: Config = toml::from_str(&text)
            .map_err(|e| Error::Config(format!("invalid {}: {}", path.display(), e)))?;
        config.validate()?;
        Ok(config)
    }

    /// Check cross-field rules that serde cannot express.
    pub fn validate(&self) -> Result<()> {
        self.filters.weekday()?;
        crate::analytics::dimensions::BalanceTiers::new(self.dimensions.balance_tiers.clone())?;
        if self.logging.max_files == 0 {
            return Err(Error::Config(
                "logging.max_files must be at least 1".to_string(),
            ));
        }
        Ok(())
    }

    /// `$XDG_CONFIG_HOME/dialstat/config.toml`
    pub fn config_path() -> PathBuf {
        let (var, fallback) = XDG_DIRS[0];
        xdg_dir(var, fallback).join("dialstat").join("config.toml")
    }

    /// `$XDG_STATE_HOME/dialstat/`, where daily log files live.
    pub fn state_dir() -> PathBuf {
        let (var, fallback) = XDG_DIRS[1];
        xdg_dir(var, fallback).join("dialstat")
    }

    /// Pin unset XDG variables to their `$HOME` defaults for this process.
    pub fn ensure_xdg_env() {
        for (var, fallback) in XDG_DIRS {
            if std::env::var_os(var).map_or(true, |v| v.is_empty()) {
                std::env::set_var(var, home().join(fallback));
            }
        }
    }
}
