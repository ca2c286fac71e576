// Utility helpers for parsing and presentation math.
//
// This module centralizes all the "dirty" cell/number/date handling so the
// rest of the code can assume clean, typed values. Checklist cells are
// human-entered free text, so every parser here is total: malformed input
// degrades to a fallback instead of an error.
use crate::types::ScoreRange;
use chrono::NaiveDate;
use num_format::{Locale, ToFormattedString};

/// Parse a cell value into `f64` while being forgiving about the garbage
/// that shows up in spreadsheet exports.
///
/// - Accepts `Option<&str>` so callers can pass through optional cells.
/// - Trims whitespace; blank input yields `fallback`.
/// - Returns `fallback` for anything that does not parse to a finite
///   number. Never fails.
pub fn parse_number(raw: Option<&str>, fallback: f64) -> f64 {
    let Some(s) = raw.map(str::trim).filter(|s| !s.is_empty()) else {
        return fallback;
    };
    match s.parse::<f64>() {
        Ok(v) if v.is_finite() => v,
        _ => fallback,
    }
}

/// Parse a `"min/max"` range cell. Anything that is not exactly two
/// `/`-separated parts degrades to the default `0/1` range; the malformed
/// value is logged and never propagated.
pub fn parse_score_range(raw: Option<&str>) -> ScoreRange {
    let Some(s) = raw.map(str::trim).filter(|s| !s.is_empty()) else {
        return ScoreRange::default();
    };
    if !s.contains('/') {
        return ScoreRange::default();
    }
    let parts: Vec<&str> = s.split('/').collect();
    if parts.len() != 2 {
        log::warn!("unparseable score range {:?}, using default", s);
        return ScoreRange::default();
    }
    ScoreRange {
        min: parse_number(Some(parts[0]), 0.0),
        max: parse_number(Some(parts[1]), 1.0),
    }
}

pub fn parse_date_safe(s: Option<&str>) -> Option<NaiveDate> {
    // Dates are expected in `YYYY-MM-DD` format.
    let s = s?.trim();
    if s.is_empty() {
        return None;
    }
    NaiveDate::parse_from_str(s, "%Y-%m-%d").ok()
}

/// The one percentage formula in the system, applied at every rollup
/// depth: score over max as a percent, rounded to one decimal place.
/// A zero denominator yields 0 rather than dividing.
pub fn percentage_of(score_sum: f64, max_score_sum: f64) -> f64 {
    if max_score_sum > 0.0 {
        (score_sum / max_score_sum * 100.0 * 10.0).round() / 10.0
    } else {
        0.0
    }
}

pub fn format_number(n: f64, decimals: usize) -> String {
    // Format a floating-point value with:
    // - a fixed number of decimal places, and
    // - locale-aware thousands separators (e.g., `1,234,567.89`).
    let neg = n.is_sign_negative();
    let abs_n = n.abs();
    // First, format to a plain fixed-decimal string like `1234567.89`.
    let s = format!("{:.*}", decimals, abs_n);
    let mut parts = s.split('.');
    let int_part = parts.next().unwrap_or("0");
    let frac_part = parts.next();
    // Use `num-format` to insert commas into the integer portion.
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
    if neg {
        format!("-{}", res)
    } else {
        res
    }
}

pub fn format_int<T>(n: T) -> String
where
    T: ToFormattedString,
{
    // Thin wrapper around `num-format` for integer-like values, used for
    // counts in console messages (e.g., `1,204 rows scanned`).
    n.to_formatted_string(&Locale::en)
}
