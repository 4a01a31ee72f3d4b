//! Tolerant field parsers for dialer exports.
//!
//! Every parser returns `None` on input it cannot interpret; callers decide
//! whether that drops the row or defaults the field.

use chrono::{Datelike, NaiveDate, NaiveTime};
use rust_decimal::Decimal;
use std::str::FromStr;

// Two-digit-year formats come first: `%Y` would happily read "24" as year 24.
const DATE_FORMATS: &[&str] = &[
    "%Y-%m-%d",
    "%Y/%m/%d",
    "%m/%d/%y",
    "%m/%d/%Y",
    "%m-%d-%Y",
    "%d-%b-%y",
    "%d-%b-%Y",
    "%b %d, %Y",
];

const TIME_FORMATS: &[&str] = &[
    "%H:%M:%S",
    "%H:%M:%S%.f",
    "%H:%M",
    "%I:%M:%S %p",
    "%I:%M %p",
    "%I:%M:%S%p",
    "%I:%M%p",
];

/// Parse a calendar date, ignoring any trailing time component.
pub fn parse_date(raw: &str) -> Option<NaiveDate> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return None;
    }

    if let Some(date) = try_date_formats(trimmed) {
        return Some(date);
    }

    // Date-time values: "2024-03-05 09:15:00" or "2024-03-05T09:15:00"
    let date_part = trimmed.split([' ', 'T']).next().unwrap_or(trimmed);
    try_date_formats(date_part)
}

fn try_date_formats(text: &str) -> Option<NaiveDate> {
    // "3/5/24" parses under "%Y/%m/%d" as the year 3; skip implausible years.
    DATE_FORMATS.iter().find_map(|fmt| {
        NaiveDate::parse_from_str(text, fmt)
            .ok()
            .filter(|d| (1900..=2999).contains(&d.year()))
    })
}

/// Parse a time of day; accepts a full date-time and keeps its time part.
pub fn parse_time(raw: &str) -> Option<NaiveTime> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return None;
    }

    if let Some(time) = try_time_formats(trimmed) {
        return Some(time);
    }

    let (_, rest) = trimmed.split_once([' ', 'T'])?;
    try_time_formats(rest.trim())
}

fn try_time_formats(text: &str) -> Option<NaiveTime> {
    TIME_FORMATS
        .iter()
        .find_map(|fmt| NaiveTime::parse_from_str(text, fmt).ok())
}

/// Parse a non-negative money amount.
///
/// Blank means zero. Thousands separators and a leading currency marker are
/// stripped. Negative or malformed amounts return `None`.
pub fn parse_amount(raw: &str) -> Option<Decimal> {
    let trimmed = raw.trim();
    if trimmed.is_empty() || trimmed == "-" {
        return Some(Decimal::ZERO);
    }

    let cleaned: String = trimmed
        .trim_start_matches("PHP")
        .trim_start_matches(['$', '₱'])
        .chars()
        .filter(|c| *c != ',' && !c.is_whitespace())
        .collect();

    let amount = Decimal::from_str(&cleaned)
        .or_else(|_| Decimal::from_scientific(&cleaned))
        .ok()?;

    if amount.is_sign_negative() && !amount.is_zero() {
        return None;
    }
    Some(amount)
}

/// Parse a talk time as `HH:MM:SS`, `MM:SS` or whole seconds.
///
/// Minutes and seconds must be below 60. Totals that do not fit in `u32`
/// are rejected.
pub fn parse_duration_secs(raw: &str) -> Option<u32> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Some(0);
    }

    if trimmed.contains(':') {
        let numbers: Option<Vec<u32>> = trimmed.split(':').map(|p| p.trim().parse().ok()).collect();
        return match numbers?.as_slice() {
            [h, m, s] if *m < 60 && *s < 60 => h.checked_mul(3600)?.checked_add(m * 60 + s),
            [m, s] if *s < 60 => m.checked_mul(60)?.checked_add(*s),
            _ => None,
        };
    }

    let secs: f64 = trimmed.parse().ok()?;
    let secs = secs.round();
    if secs.is_finite() && (0.0..=u32::MAX as f64).contains(&secs) {
        Some(secs as u32)
    } else {
        None
    }
}
