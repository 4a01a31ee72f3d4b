//! Rate derivation from aggregated counts.
//!
//! A rate whose denominator is zero is undefined (`None`) and renders as a
//! blank cell, never as `0%`. Rates are kept exact; rounding happens only
//! when a cell is rendered.

use super::aggregate::Metrics;
use serde::Serialize;

/// `numerator / denominator * 100`, or `None` when the denominator is zero.
pub fn percentage(numerator: u64, denominator: u64) -> Option<f64> {
    if denominator == 0 {
        None
    } else {
        Some(numerator as f64 / denominator as f64 * 100.0)
    }
}

/// Derived rates of one row.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct Rates {
    /// Attempts per unique account
    pub penetration_rate: Option<f64>,
    /// Connected attempts per attempt
    pub connected_rate: Option<f64>,
    /// PTP accounts per connected account
    pub ptp_rate: Option<f64>,
    /// Collector-side drops per connected account
    pub call_drop_ratio: Option<f64>,
    /// Dialer-side drops per connected account
    pub system_drop_ratio: Option<f64>,
}

impl Rates {
    pub fn from_metrics(m: &Metrics) -> Self {
        Self {
            penetration_rate: percentage(m.total_dialed, m.accounts_total),
            connected_rate: percentage(m.connected, m.total_dialed),
            ptp_rate: percentage(m.ptp_accounts, m.connected_accounts),
            call_drop_ratio: percentage(m.agent_drops, m.connected_accounts),
            system_drop_ratio: percentage(m.system_drops, m.connected_accounts),
        }
    }
}
