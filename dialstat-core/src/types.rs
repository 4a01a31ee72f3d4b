//! Core domain types for dialstat
//!
//! These types represent one normalized disposition event exported by the
//! dialer, plus the closed vocabularies its loosely typed status columns are
//! classified into.
//!
//! ## Terminology
//!
//! | Term | Definition |
//! |------|------------|
//! | **Disposition** | The outcome text a collector or the dialer records for an attempt |
//! | **Collector** | The agent named in `Remark By`; `SYSTEM` is the dialer itself |
//! | **PTP** | Promise to pay, a disposition with a promised amount above zero |
//! | **RPC** | Right party contact, the actual debtor was reached |
//! | **Cycle** | Dialing campaign batch derived from the service or card number |
//!
//! Status text is classified exactly once, when a [`CallRecord`] is built.
//! Everything downstream reads [`CallStatus`], [`DispositionMarkers`] and
//! [`RemarkType`] instead of searching strings again.

use chrono::{NaiveDate, NaiveTime};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;

/// `Remark By` value the dialer uses for its own actions.
pub const SYSTEM_AGENT: &str = "SYSTEM";

// ============================================
// Input columns
// ============================================

/// A column of the disposition export.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Column {
    AccountNo,
    Date,
    Time,
    CallStatus,
    Status,
    RemarkType,
    RemarkBy,
    Remark,
    PtpAmount,
    Balance,
    ServiceNo,
    CardNo,
    Client,
    TalkTime,
    Debtor,
}

impl Column {
    pub const ALL: [Column; 15] = [
        Column::AccountNo,
        Column::Date,
        Column::Time,
        Column::CallStatus,
        Column::Status,
        Column::RemarkType,
        Column::RemarkBy,
        Column::Remark,
        Column::PtpAmount,
        Column::Balance,
        Column::ServiceNo,
        Column::CardNo,
        Column::Client,
        Column::TalkTime,
        Column::Debtor,
    ];

    /// Header text as it appears in the export.
    pub fn header(&self) -> &'static str {
        match self {
            Column::AccountNo => "Account No.",
            Column::Date => "Date",
            Column::Time => "Time",
            Column::CallStatus => "Call Status",
            Column::Status => "Status",
            Column::RemarkType => "Remark Type",
            Column::RemarkBy => "Remark By",
            Column::Remark => "Remark",
            Column::PtpAmount => "PTP Amount",
            Column::Balance => "Balance",
            Column::ServiceNo => "Service No.",
            Column::CardNo => "Card No.",
            Column::Client => "Client",
            Column::TalkTime => "Talk Time Duration",
            Column::Debtor => "Debtor",
        }
    }

    fn aliases(&self) -> &'static [&'static str] {
        match self {
            Column::AccountNo => &["account no", "account number"],
            Column::ServiceNo => &["service no", "service number"],
            Column::CardNo => &["card no", "card number"],
            Column::TalkTime => &["talk time"],
            Column::Debtor => &["debtor name"],
            _ => &[],
        }
    }

    /// Whether an input header names this column.
    ///
    /// Comparison ignores case and surrounding whitespace, so `CLIENT`
    /// and `Client` are the same column.
    pub fn matches_header(&self, header: &str) -> bool {
        let header = header.trim().trim_start_matches('\u{feff}').to_lowercase();
        header == self.header().to_lowercase() || self.aliases().iter().any(|a| *a == header)
    }
}

impl fmt::Display for Column {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.header())
    }
}

// ============================================
// Status vocabularies
// ============================================

/// Dialer call outcome from the `Call Status` column.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CallStatus {
    Connected,
    Dropped,
    /// Dialer bookkeeping rows that never reached a line
    Others,
    #[default]
    Unrecognized,
}

impl CallStatus {
    pub fn classify(raw: &str) -> Self {
        match raw.trim().to_uppercase().as_str() {
            "CONNECTED" => CallStatus::Connected,
            "DROPPED" => CallStatus::Dropped,
            "OTHERS" => CallStatus::Others,
            _ => CallStatus::Unrecognized,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            CallStatus::Connected => "CONNECTED",
            CallStatus::Dropped => "DROPPED",
            CallStatus::Others => "OTHERS",
            CallStatus::Unrecognized => "",
        }
    }
}

/// Markers recognized in the free-text `Status` column.
///
/// A disposition can carry several markers at once (e.g. `RPC - PTP NEW`).
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DispositionMarkers {
    pub abort: bool,
    pub ptp: bool,
    pub rpc: bool,
    /// Dialer-side drop (`DROPPED`)
    pub dropped: bool,
    /// Collector-side drop (`NEGATIVE CALLOUTS - DROP CALL`)
    pub negative_drop_call: bool,
}

impl DispositionMarkers {
    pub const NEGATIVE_DROP_CALL: &'static str = "NEGATIVE CALLOUTS - DROP CALL";

    pub fn classify(status: &str) -> Self {
        // Collapse runs of whitespace so "DROP  CALL" still matches.
        let text = status
            .split_whitespace()
            .collect::<Vec<_>>()
            .join(" ")
            .to_uppercase();

        Self {
            abort: text.contains("ABORT"),
            ptp: text.contains("PTP"),
            rpc: text.contains("RPC"),
            dropped: text.contains("DROPPED"),
            negative_drop_call: text.contains(Self::NEGATIVE_DROP_CALL),
        }
    }
}

/// Disposition text together with its classified markers.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Disposition {
    pub text: String,
    pub markers: DispositionMarkers,
}

impl Disposition {
    pub fn new(text: impl Into<String>) -> Self {
        let text = text.into();
        let markers = DispositionMarkers::classify(&text);
        Self { text, markers }
    }
}

impl From<&str> for Disposition {
    fn from(text: &str) -> Self {
        Disposition::new(text)
    }
}

/// How the attempt was placed, from the `Remark Type` column.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RemarkType {
    Predictive,
    FollowUp,
    /// Manually dialed by the collector
    Outgoing,
    #[default]
    Other,
}

impl RemarkType {
    pub fn classify(raw: &str) -> Self {
        let key: String = raw
            .chars()
            .filter(|c| c.is_ascii_alphanumeric())
            .collect::<String>()
            .to_ascii_lowercase();
        match key.as_str() {
            "predictive" => RemarkType::Predictive,
            "followup" => RemarkType::FollowUp,
            "outgoing" | "manual" => RemarkType::Outgoing,
            _ => RemarkType::Other,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            RemarkType::Predictive => "Predictive",
            RemarkType::FollowUp => "Follow Up",
            RemarkType::Outgoing => "Outgoing",
            RemarkType::Other => "Other",
        }
    }
}

// ============================================
// Call record
// ============================================

/// One disposition event: a single dialed attempt against an account.
///
/// Records are never mutated after normalization. Filters select subsets by
/// reference and classifiers keep derived dimensions in a side index.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CallRecord {
    /// Account number; not unique per day, one account can be dialed repeatedly
    pub account_id: String,
    pub date: Option<NaiveDate>,
    pub time: Option<NaiveTime>,
    pub call_status: CallStatus,
    pub disposition: Disposition,
    pub remark_type: RemarkType,
    /// Collector name, or `SYSTEM`
    pub remark_by: String,
    pub remark_text: String,
    /// Zero means no promise was made
    pub promise_amount: Decimal,
    pub balance: Decimal,
    pub service_no: String,
    pub card_no: String,
    pub client: String,
    pub talk_time_secs: u32,
    pub debtor: String,
}

impl CallRecord {
    /// Whether the dialer, not a collector, recorded this disposition.
    pub fn is_system_remark(&self) -> bool {
        self.remark_by.trim().eq_ignore_ascii_case(SYSTEM_AGENT)
    }

    /// Whether a non-zero amount was promised.
    pub fn has_promise(&self) -> bool {
        self.promise_amount > Decimal::ZERO
    }

    /// Collector name with surrounding whitespace removed.
    pub fn collector(&self) -> &str {
        self.remark_by.trim()
    }
}
