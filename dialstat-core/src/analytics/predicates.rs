//! Metric predicates shared by every summary.
//!
//! All predicates are total: a record with blank status text simply
//! matches nothing.

use crate::types::{CallRecord, CallStatus};

/// The dialer reports the call as connected.
pub fn is_connected(record: &CallRecord) -> bool {
    record.call_status == CallStatus::Connected
}

/// A PTP disposition with a promised amount above zero.
///
/// PTP-looking text with a zero amount is not a promise.
pub fn is_promise_to_pay(record: &CallRecord) -> bool {
    record.disposition.markers.ptp && record.has_promise()
}

/// The actual debtor was reached.
pub fn is_right_party_contact(record: &CallRecord) -> bool {
    record.disposition.markers.rpc
}

/// Dialer-side drop recorded by `SYSTEM`.
pub fn is_system_drop(record: &CallRecord) -> bool {
    record.disposition.markers.dropped && record.is_system_remark()
}

/// Collector-side drop (`NEGATIVE CALLOUTS - DROP CALL`) recorded by a
/// collector rather than `SYSTEM`.
pub fn is_agent_drop(record: &CallRecord) -> bool {
    record.disposition.markers.negative_drop_call && !record.is_system_remark()
}
