// Utility helpers for parsing and basic statistics.
//
// This module centralizes all the "dirty" CSV/number/date handling so the
// rest of the code can assume clean, typed values.
use crate::types::Period;
use chrono::{Datelike, NaiveDate, NaiveDateTime};
use num_format::{Locale, ToFormattedString};

/// Parse a string-like value into `f64` while being forgiving about
/// formatting issues that are common in CSV exports (commas, spaces, text).
///
/// - Accepts `Option<&str>` so callers can pass through optional fields.
/// - Trims whitespace.
/// - Rejects values that contain alphabetic characters.
/// - Strips thousands separators like `","` before parsing.
/// - Returns `None` for anything that cannot be safely parsed.
pub fn parse_f64_safe(s: Option<&str>) -> Option<f64> {
    let s = s?.trim();
    if s.is_empty() {
        return None;
    }
    if s.chars().any(|c| c.is_ascii_alphabetic()) {
        return None;
    }
    let s = s.replace(",", "");
    s.parse::<f64>().ok()
}

/// Parse a non-negative whole count. Exports from dataframe tools often write
/// integers as `120.0`, so integral floats are accepted; negatives and
/// fractional values are not.
pub fn parse_count_safe(s: Option<&str>) -> Option<u64> {
    let v = parse_f64_safe(s)?;
    if !v.is_finite() || v < 0.0 || v.fract() != 0.0 || v > u64::MAX as f64 {
        return None;
    }
    Some(v as u64)
}

/// Coerce a period column into a calendar month. Day and time components,
/// when present, are dropped.
pub fn parse_period_safe(s: Option<&str>) -> Option<Period> {
    let s = s?.trim();
    if s.is_empty() {
        return None;
    }
    let date = NaiveDate::parse_from_str(s, "%Y-%m-%d")
        .or_else(|_| NaiveDate::parse_from_str(s, "%Y/%m/%d"))
        .or_else(|_| NaiveDateTime::parse_from_str(s, "%Y-%m-%d %H:%M:%S").map(|dt| dt.date()))
        .or_else(|_| NaiveDate::parse_from_str(&format!("{}-01", s), "%Y-%m-%d"))
        .or_else(|_| NaiveDate::parse_from_str(&format!("{}/01", s), "%Y/%m/%d"))
        .ok()?;
    Some(Period {
        year: date.year(),
        month: date.month(),
    })
}

/// Arithmetic mean, or `None` for an empty slice. There is no zero default:
/// an undefined mean must stay undefined.
pub fn average(v: &[f64]) -> Option<f64> {
    if v.is_empty() {
        return None;
    }
    let sum: f64 = v.iter().copied().sum();
    Some(sum / v.len() as f64)
}

/// Round to the nearest integer, halves to even, with `-0` shown as `0`.
/// Matches how loads were rounded in the dashboard's text.
pub fn round_display(v: f64) -> f64 {
    let r = v.round_ties_even();
    if r == 0.0 {
        0.0
    } else {
        r
    }
}

/// Cut `s` to at most `max` characters, respecting UTF-8 boundaries.
pub fn truncate_chars(s: &str, max: usize) -> String {
    s.chars().take(max).collect()
}

pub fn format_number(n: f64, decimals: usize) -> String {
    // Format a floating-point value with:
    // - a fixed number of decimal places, and
    // - locale-aware thousands separators (e.g., `1,234,567.89`).
    let neg = n.is_sign_negative() && n != 0.0;
    let abs_n = n.abs();
    let s = format!("{:.*}", decimals, abs_n);
    let mut parts = s.split('.');
    let int_part = parts.next().unwrap_or("0");
    let frac_part = parts.next();
    let int_val: i64 = int_part.parse().unwrap_or(0);
    let mut res = int_val.to_formatted_string(&Locale::en);
    if let Some(frac) = frac_part {
        if decimals > 0 {
            res.push('.');
            res.push_str(frac);
        }
    } else if decimals > 0 {
        res.push('.');
        res.push_str(&"0".repeat(decimals));
    }
    if neg && res.chars().any(|c| c.is_ascii_digit() && c != '0') {
        format!("-{}", res)
    } else {
        res
    }
}

/// Render an optional feature value, showing undefined values as `NaN`
/// the way dataframe previews do.
pub fn format_optional(v: Option<f64>, decimals: usize) -> String {
    match v {
        Some(x) => format_number(x, decimals),
        None => "NaN".to_string(),
    }
}

pub fn format_int<T>(n: T) -> String
where
    T: ToFormattedString,
{
    n.to_formatted_string(&Locale::en)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn counts_accept_integral_floats_and_separators() {
        assert_eq!(parse_count_safe(Some("120")), Some(120));
        assert_eq!(parse_count_safe(Some(" 120.0 ")), Some(120));
        assert_eq!(parse_count_safe(Some("1,200")), Some(1200));
    }

    #[test]
    fn counts_reject_negative_fractional_and_text() {
        assert_eq!(parse_count_safe(Some("-3")), None);
        assert_eq!(parse_count_safe(Some("3.5")), None);
        assert_eq!(parse_count_safe(Some("n/a")), None);
        assert_eq!(parse_count_safe(None), None);
    }

    #[test]
    fn periods_are_coerced_to_calendar_months() {
        let apr = Period { year: 2024, month: 4 };
        assert_eq!(parse_period_safe(Some("2024-04")), Some(apr));
        assert_eq!(parse_period_safe(Some("2024-04-17")), Some(apr));
        assert_eq!(parse_period_safe(Some("2024/04")), Some(apr));
        assert_eq!(parse_period_safe(Some("2024-04-01 00:00:00")), Some(apr));
        assert_eq!(parse_period_safe(Some("April")), None);
        assert_eq!(apr.to_string(), "2024-04");
    }

    #[test]
    fn format_number_groups_thousands() {
        assert_eq!(format_number(1234567.891, 2), "1,234,567.89");
        assert_eq!(format_number(-12.5, 1), "-12.5");
        assert_eq!(format_number(-0.2, 0), "0");
        assert_eq!(format_optional(None, 2), "NaN");
    }

    #[test]
    fn average_of_nothing_is_undefined() {
        assert_eq!(average(&[]), None);
        assert_eq!(average(&[100.0, 110.0, 90.0]), Some(100.0));
    }

    #[test]
    fn display_rounding_is_half_even_without_negative_zero() {
        assert_eq!(round_display(110.5), 110.0);
        assert_eq!(round_display(111.5), 112.0);
        assert_eq!(round_display(104.6), 105.0);
        let r = round_display(-0.3);
        assert_eq!(r, 0.0);
        assert!(r.is_sign_positive());
        assert_eq!(format!("{}", round_display(-0.3)), "0");
        assert_eq!(round_display(-2.5), -2.0);
    }

    #[test]
    fn truncation_counts_characters() {
        assert_eq!(truncate_chars("héllo", 2), "hé");
        assert_eq!(truncate_chars("abc", 10), "abc");
    }
}
