//! Formatting helpers shared by table rendering and the CLI.

use rust_decimal::{Decimal, RoundingStrategy};

/// Round a percentage to the nearest whole number, halves away from zero.
pub fn round_percent(rate: f64) -> i64 {
    rate.round() as i64
}

/// Format an optional rate as a whole percent, or blank when undefined.
pub fn format_rate(rate: Option<f64>) -> String {
    match rate {
        Some(rate) => format!("{}%", round_percent(rate)),
        None => String::new(),
    }
}

/// Format a money amount with thousands separators and two decimals.
pub fn format_amount(amount: Decimal) -> String {
    let rounded = amount.round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero);
    let text = format!("{:.2}", rounded);
    let (sign, digits) = match text.strip_prefix('-') {
        Some(rest) => ("-", rest),
        None => ("", text.as_str()),
    };
    let (int_part, frac_part) = digits.split_once('.').unwrap_or((digits, "00"));
    format!("{}{}.{}", sign, group_thousands(int_part), frac_part)
}

/// Format a whole amount with thousands separators (e.g. "100,000").
pub fn format_whole(amount: Decimal) -> String {
    let rounded = amount.round_dp_with_strategy(0, RoundingStrategy::MidpointAwayFromZero);
    let text = rounded.trunc().to_string();
    match text.strip_prefix('-') {
        Some(rest) => format!("-{}", group_thousands(rest)),
        None => group_thousands(&text),
    }
}

/// Format a number of seconds as `HH:MM:SS`.
pub fn format_duration(total_secs: u64) -> String {
    let hours = total_secs / 3600;
    let minutes = (total_secs % 3600) / 60;
    let seconds = total_secs % 60;
    format!("{:02}:{:02}:{:02}", hours, minutes, seconds)
}

fn group_thousands(digits: &str) -> String {
    let mut out = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(ch);
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_rate() {
        assert_eq!(format_rate(None), "");
        assert_eq!(format_rate(Some(100.0)), "100%");
        assert_eq!(format_rate(Some(66.666)), "67%");
        assert_eq!(format_rate(Some(12.5)), "13%");
        assert_eq!(format_rate(Some(0.0)), "0%");
    }

    #[test]
    fn test_format_amount() {
        assert_eq!(format_amount(Decimal::new(500, 0)), "500.00");
        assert_eq!(format_amount(Decimal::new(123456789, 2)), "1,234,567.89");
        assert_eq!(format_amount(Decimal::new(1000000, 0)), "1,000,000.00");
        assert_eq!(format_amount(Decimal::new(-15005, 1)), "-1,500.50");
        assert_eq!(format_amount(Decimal::ZERO), "0.00");
    }

    #[test]
    fn test_format_whole() {
        assert_eq!(format_whole(Decimal::new(6000, 0)), "6,000");
        assert_eq!(format_whole(Decimal::new(49999, 0)), "49,999");
        assert_eq!(format_whole(Decimal::new(100000, 0)), "100,000");
        assert_eq!(format_whole(Decimal::new(999, 0)), "999");
    }

    #[test]
    fn test_format_duration() {
        assert_eq!(format_duration(0), "00:00:00");
        assert_eq!(format_duration(205), "00:03:25");
        assert_eq!(format_duration(3661), "01:01:01");
        assert_eq!(format_duration(90000), "25:00:00");
    }
}
