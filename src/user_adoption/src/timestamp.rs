//! Timestamp parsing and calendar-date truncation.
//!
//! What this module provides:
//! - [`parse_timestamp`]: Parse the textual date-time shapes found in engagement
//!   exports into a wall-clock [`NaiveDateTime`].
//! - [`truncate_to_date`]: Same, keeping only the calendar date.
//! - [`parse_date`]: Strict `YYYY-MM-DD` parsing for exported tables.
//!
//! Notes:
//! - No time zone conversion happens here. An RFC-3339 value keeps the wall
//!   clock of its own offset, so "2014-04-22T23:30:00-05:00" lands on
//!   2014-04-22 even though the same instant is 2014-04-23 in UTC.
//! - Naive values are taken as written.
//!
//! Accepted shapes:
//! - RFC-3339: "2014-04-22T03:53:30Z", "2014-04-22T03:53:30.120+02:00"
//! - "2014-04-22 03:53:30", "2014-04-22T03:53:30", either with optional fraction
//! - "2014-04-22 03:53", "2014/04/22 03:53:30", "04/22/2014 03:53:30", "04/22/2014 03:53"
//! - Bare dates: "2014-04-22", "04/22/2014" (midnight)

use anyhow::{Context, bail};
use chrono::{DateTime, NaiveDate, NaiveDateTime};

/// Naive date-time layouts tried in order after RFC-3339.
const DATETIME_FORMATS: &[&str] = &[
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%d %H:%M",
    "%Y/%m/%d %H:%M:%S",
    "%m/%d/%Y %H:%M:%S",
    "%m/%d/%Y %H:%M",
];

/// Date-only layouts, read as midnight.
const DATE_FORMATS: &[&str] = &["%Y-%m-%d", "%m/%d/%Y"];

/// Parse a timestamp string into its wall-clock date-time.
///
/// Example:
/// - "2014-04-22 03:53:30" -> 2014-04-22T03:53:30
/// - "2014-04-22T23:30:00-05:00" -> 2014-04-22T23:30:00
///
/// Errors:
/// - Empty input
/// - Text matching none of the accepted shapes
pub fn parse_timestamp(s: &str) -> anyhow::Result<NaiveDateTime> {
    let s = s.trim();
    if s.is_empty() {
        bail!("empty timestamp");
    }

    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Ok(dt.naive_local());
    }
    for fmt in DATETIME_FORMATS {
        if let Ok(dt) = NaiveDateTime::parse_from_str(s, fmt) {
            return Ok(dt);
        }
    }
    for fmt in DATE_FORMATS {
        if let Ok(d) = NaiveDate::parse_from_str(s, fmt) {
            return Ok(d.and_time(chrono::NaiveTime::MIN));
        }
    }
    bail!("unrecognized timestamp: {s}")
}

/// Parse a timestamp and keep only its calendar date.
pub fn truncate_to_date(s: &str) -> anyhow::Result<NaiveDate> {
    Ok(parse_timestamp(s)?.date())
}

/// Strict ISO date (`YYYY-MM-DD`), the layout the exported tables use.
pub fn parse_date(s: &str) -> anyhow::Result<NaiveDate> {
    let s = s.trim();
    NaiveDate::parse_from_str(s, "%Y-%m-%d").with_context(|| format!("bad date: {s}"))
}
