//! # Input Parsing Utilities
//!
//! Parsers for user-supplied values that clap cannot validate on its own.

use anyhow::{Result, bail};
use chrono::{DateTime, NaiveDate, Utc};

/// Parse a publication time.
///
/// Accepts RFC 3339 (`2024-03-05T12:00:00Z`, any offset) or a plain date
/// (`2024-03-05`, taken as midnight UTC). `None` means now.
pub fn parse_published_at(value: Option<&str>) -> Result<DateTime<Utc>> {
    let Some(value) = value.map(str::trim) else {
        return Ok(Utc::now());
    };
    if let Ok(parsed) = DateTime::parse_from_rfc3339(value) {
        return Ok(parsed.with_timezone(&Utc));
    }
    if let Some(midnight) = NaiveDate::parse_from_str(value, "%Y-%m-%d")
        .ok()
        .and_then(|date| date.and_hms_opt(0, 0, 0))
    {
        return Ok(midnight.and_utc());
    }
    bail!("invalid --published-at '{value}': expected RFC 3339 or YYYY-MM-DD")
}
