//! Watermark and report date utilities
//!
//! Distributor reports write dates in several shapes (`2023-01-31`,
//! `01-31-2023`, `January-31-2023`) and sale months as `2023-01` or
//! `01-2023`. Everything is normalized to a calendar date before comparison.
//! A value that cannot be parsed never compares as ordered with anything,
//! so every `is_*` helper returns `false` for it.

use std::cmp::Ordering;

use chrono::NaiveDate;

/// Accepted full date layouts, tried in order
const DATE_FORMATS: &[&str] = &["%Y-%m-%d", "%m-%d-%Y", "%B-%d-%Y", "%d-%B-%Y"];

/// Parse a full date (year, month, day)
pub fn parse_date(value: &str) -> Option<NaiveDate> {
    let value = value.trim();
    DATE_FORMATS
        .iter()
        .find_map(|format| NaiveDate::parse_from_str(value, format).ok())
}

/// Parse a sale month, resolving to the first day of that month
///
/// Full dates are accepted as well and keep their day.
pub fn parse_month(value: &str) -> Option<NaiveDate> {
    let value = value.trim();
    NaiveDate::parse_from_str(&format!("{}-01", value), "%Y-%m-%d")
        .or_else(|_| NaiveDate::parse_from_str(&format!("01-{}", value), "%d-%m-%Y"))
        .ok()
        .or_else(|| parse_date(value))
}

/// Parse either a full date or a sale month
pub fn parse_any(value: &str) -> Option<NaiveDate> {
    parse_date(value).or_else(|| parse_month(value))
}

/// Order two date strings, `None` when either side is unparseable
pub fn compare(a: &str, b: &str) -> Option<Ordering> {
    Some(parse_any(a)?.cmp(&parse_any(b)?))
}

/// `a >= b` as calendar dates
pub fn is_at_or_after(a: &str, b: &str) -> bool {
    matches!(compare(a, b), Some(Ordering::Greater | Ordering::Equal))
}

/// `a > b` as calendar dates
pub fn is_after(a: &str, b: &str) -> bool {
    matches!(compare(a, b), Some(Ordering::Greater))
}
