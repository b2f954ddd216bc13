//! Date parsing and formatting for content metadata.
//!
//! Frontmatter dates are either a plain `YYYY-MM-DD` or a full RFC 3339
//! timestamp. Anything else is kept as text and sorts last.

use chrono::{DateTime, FixedOffset, NaiveDate, SecondsFormat, Utc};

/// Parse a frontmatter date or timestamp.
///
/// Plain dates are taken as midnight UTC.
pub fn parse(value: &str) -> Option<DateTime<FixedOffset>> {
    let value = value.trim();

    if let Ok(ts) = DateTime::parse_from_rfc3339(value) {
        return Some(ts);
    }

    NaiveDate::parse_from_str(value, "%Y-%m-%d")
        .ok()
        .and_then(|date| date.and_hms_opt(0, 0, 0))
        .map(|dt| dt.and_utc().fixed_offset())
}

/// Today's date as `YYYY-MM-DD`.
pub fn today() -> String {
    Utc::now().format("%Y-%m-%d").to_string()
}

/// The current time as an RFC 3339 timestamp.
pub fn now() -> String {
    Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true)
}

/// The current year, for copyright lines.
pub fn year() -> String {
    Utc::now().format("%Y").to_string()
}

/// `1 January 2026`. Unparseable input is returned unchanged.
pub fn long_date(value: &str) -> String {
    parse(value)
        .map(|ts| ts.format("%-d %B %Y").to_string())
        .unwrap_or_else(|| value.to_string())
}

/// `1 Jan 2026`. Unparseable input is returned unchanged.
pub fn short_date(value: &str) -> String {
    parse(value)
        .map(|ts| ts.format("%-d %b %Y").to_string())
        .unwrap_or_else(|| value.to_string())
}

/// RFC 2822 form used by RSS `pubDate`.
pub fn rfc2822(value: &str) -> Option<String> {
    parse(value).map(|ts| ts.to_rfc2822())
}
