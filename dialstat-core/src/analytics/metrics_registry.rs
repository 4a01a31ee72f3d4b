//! Column registry for discovery and documentation.
//!
//! Every summary view has a fixed, documented column order. Exported
//! spreadsheets depend on it, so new columns are appended, never inserted.

use super::views::ViewKind;
use crate::error::{Error, Result};
use serde::Serialize;

/// Kind of value a metric column holds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ColumnKind {
    Count,
    Amount,
    Rate,
    Duration,
}

impl ColumnKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ColumnKind::Count => "count",
            ColumnKind::Amount => "amount",
            ColumnKind::Rate => "rate",
            ColumnKind::Duration => "duration",
        }
    }
}

/// A metric column of a summary table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum MetricColumn {
    AccountsTotal,
    TotalDialed,
    PenetrationRate,
    ConnectedAccounts,
    Connected,
    ConnectedRate,
    Rpc,
    PtpAccounts,
    PtpRate,
    PtpAmount,
    BalanceAmount,
    AgentDrops,
    SystemDrops,
    CallDropRatio,
    SystemDropRatio,
    TalkTime,
}

impl MetricColumn {
    pub fn descriptor(&self) -> &'static ColumnDescriptor {
        COLUMNS
            .iter()
            .find(|d| d.column == *self)
            .unwrap_or(&COLUMNS[0])
    }

    pub fn header(&self) -> &'static str {
        self.descriptor().header
    }

    pub fn slug(&self) -> &'static str {
        self.descriptor().slug
    }

    pub fn kind(&self) -> ColumnKind {
        self.descriptor().kind
    }
}

impl std::str::FromStr for MetricColumn {
    type Err = Error;

    /// Accepts the slug (`ptp_amount`) or the header (`PTP Amount`).
    fn from_str(s: &str) -> Result<Self> {
        let wanted = s.trim().to_lowercase().replace(['-', ' '], "_");
        COLUMNS
            .iter()
            .find(|d| d.slug == wanted || d.header.to_lowercase().replace(' ', "_") == wanted)
            .map(|d| d.column)
            .ok_or_else(|| Error::InvalidArgument(format!("unknown column: {}", s.trim())))
    }
}

/// Descriptor for a metric column.
#[derive(Debug, Clone, Serialize)]
pub struct ColumnDescriptor {
    pub column: MetricColumn,
    pub slug: &'static str,
    pub header: &'static str,
    pub kind: ColumnKind,
    pub description: &'static str,
}

const COLUMNS: &[ColumnDescriptor] = &[
    ColumnDescriptor {
        column: MetricColumn::AccountsTotal,
        slug: "accounts_total",
        header: "Total Accounts",
        kind: ColumnKind::Count,
        description: "Unique accounts with at least one attempt in the group.",
    },
    ColumnDescriptor {
        column: MetricColumn::TotalDialed,
        slug: "total_dialed",
        header: "Total Dialed",
        kind: ColumnKind::Count,
        description: "Every attempt in the group.",
    },
    ColumnDescriptor {
        column: MetricColumn::PenetrationRate,
        slug: "penetration_rate",
        header: "Penetration Rate",
        kind: ColumnKind::Rate,
        description: "Total dialed / total accounts.",
    },
    ColumnDescriptor {
        column: MetricColumn::ConnectedAccounts,
        slug: "connected_accounts",
        header: "Connected Accounts",
        kind: ColumnKind::Count,
        description: "Unique accounts with a CONNECTED attempt.",
    },
    ColumnDescriptor {
        column: MetricColumn::Connected,
        slug: "connected",
        header: "Connected",
        kind: ColumnKind::Count,
        description: "Attempts with call status CONNECTED.",
    },
    ColumnDescriptor {
        column: MetricColumn::ConnectedRate,
        slug: "connected_rate",
        header: "Connected Rate",
        kind: ColumnKind::Rate,
        description: "Connected attempts / total dialed.",
    },
    ColumnDescriptor {
        column: MetricColumn::Rpc,
        slug: "rpc",
        header: "Total RPC",
        kind: ColumnKind::Count,
        description: "Attempts whose disposition is a right party contact.",
    },
    ColumnDescriptor {
        column: MetricColumn::PtpAccounts,
        slug: "ptp_accounts",
        header: "Total PTP",
        kind: ColumnKind::Count,
        description: "Unique accounts with a PTP disposition and a promised amount.",
    },
    ColumnDescriptor {
        column: MetricColumn::PtpRate,
        slug: "ptp_rate",
        header: "PTP Rate",
        kind: ColumnKind::Rate,
        description: "PTP accounts / connected accounts.",
    },
    ColumnDescriptor {
        column: MetricColumn::PtpAmount,
        slug: "ptp_amount",
        header: "PTP Amount",
        kind: ColumnKind::Amount,
        description: "Sum of promised amounts on PTP attempts.",
    },
    ColumnDescriptor {
        column: MetricColumn::BalanceAmount,
        slug: "balance_amount",
        header: "Balance Amount",
        kind: ColumnKind::Amount,
        description: "Sum of outstanding balances on attempts with a promised amount.",
    },
    ColumnDescriptor {
        column: MetricColumn::AgentDrops,
        slug: "agent_drops",
        header: "Agent Drop",
        kind: ColumnKind::Count,
        description: "NEGATIVE CALLOUTS - DROP CALL dispositions by a collector.",
    },
    ColumnDescriptor {
        column: MetricColumn::SystemDrops,
        slug: "system_drops",
        header: "System Drop",
        kind: ColumnKind::Count,
        description: "DROPPED dispositions recorded by SYSTEM.",
    },
    ColumnDescriptor {
        column: MetricColumn::CallDropRatio,
        slug: "call_drop_ratio",
        header: "Call Drop Ratio",
        kind: ColumnKind::Rate,
        description: "Agent drops / connected accounts.",
    },
    ColumnDescriptor {
        column: MetricColumn::SystemDropRatio,
        slug: "system_drop_ratio",
        header: "System Drop Ratio",
        kind: ColumnKind::Rate,
        description: "System drops / connected accounts.",
    },
    ColumnDescriptor {
        column: MetricColumn::TalkTime,
        slug: "talk_time",
        header: "Talk Time",
        kind: ColumnKind::Duration,
        description: "Total talk time, HH:MM:SS.",
    },
];

use MetricColumn::*;

const HOURLY_COLUMNS: &[MetricColumn] = &[
    TotalDialed,
    Connected,
    ConnectedRate,
    ConnectedAccounts,
    Rpc,
    PtpAccounts,
    PtpRate,
    PtpAmount,
    BalanceAmount,
];

const COLLECTOR_COLUMNS: &[MetricColumn] = &[
    AccountsTotal,
    TotalDialed,
    PenetrationRate,
    ConnectedAccounts,
    Connected,
    ConnectedRate,
    PtpAccounts,
    PtpRate,
    PtpAmount,
    BalanceAmount,
    AgentDrops,
    SystemDrops,
    CallDropRatio,
];

const CYCLE_COLUMNS: &[MetricColumn] = &[
    AccountsTotal,
    TotalDialed,
    PenetrationRate,
    ConnectedAccounts,
    Connected,
    ConnectedRate,
    PtpAccounts,
    PtpRate,
    PtpAmount,
    BalanceAmount,
    SystemDrops,
    SystemDropRatio,
];

const BALANCE_TIER_COLUMNS: &[MetricColumn] = &[
    AccountsTotal,
    TotalDialed,
    ConnectedAccounts,
    PtpAccounts,
    PtpRate,
    PtpAmount,
    BalanceAmount,
];

const OVERALL_COLUMNS: &[MetricColumn] = &[
    AccountsTotal,
    TotalDialed,
    PenetrationRate,
    ConnectedAccounts,
    Connected,
    ConnectedRate,
    Rpc,
    PtpAccounts,
    PtpRate,
    PtpAmount,
    BalanceAmount,
    AgentDrops,
    SystemDrops,
    CallDropRatio,
    SystemDropRatio,
];

const CLIENT_COLUMNS: &[MetricColumn] = &[
    TotalDialed,
    AccountsTotal,
    ConnectedAccounts,
    PtpAccounts,
    PtpAmount,
];

const TALK_TIME_COLUMNS: &[MetricColumn] = &[TotalDialed, Connected, ConnectedAccounts, TalkTime];

/// Metric columns of a view, in output order.
pub fn columns_for_view(view: ViewKind) -> &'static [MetricColumn] {
    match view {
        ViewKind::Hourly => HOURLY_COLUMNS,
        ViewKind::Collector => COLLECTOR_COLUMNS,
        ViewKind::Cycle => CYCLE_COLUMNS,
        ViewKind::BalanceTier => BALANCE_TIER_COLUMNS,
        ViewKind::Overall => OVERALL_COLUMNS,
        ViewKind::Client => CLIENT_COLUMNS,
        ViewKind::TalkTime => TALK_TIME_COLUMNS,
    }
}

/// List all registered metric columns.
pub fn list_columns() -> Vec<ColumnDescriptor> {
    COLUMNS.to_vec()
}
