/*!
 * Timestamp parsing for GPX `<time>` values.
 *
 * Every timestamp is normalized to UTC so that points recorded by devices
 * using different offsets sort on a single timeline.
 */

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, SecondsFormat, Utc};
use once_cell::sync::Lazy;
use regex::Regex;

use crate::errors::TimestampError;

// @const: ISO 8601 date with optional time (seconds and fraction optional) and zone designator
static TIMESTAMP_REGEX: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^(\d{4}-\d{2}-\d{2})(?:[Tt ](\d{2}:\d{2})(:\d{2}(?:\.\d+)?)?([Zz]|[+-]\d{2}(?::?\d{2})?)?)?$").unwrap()
});

/// A UTC-normalized point in time, used as the merge sort key.
///
/// Two instants are equal when they denote the same moment, whatever offset
/// the original text used.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Instant(DateTime<Utc>);

impl Instant {
    /// Wrap an existing UTC date-time
    pub fn from_utc(datetime: DateTime<Utc>) -> Self {
        Self(datetime)
    }

    /// Current wall-clock time
    pub fn now() -> Self {
        Self(Utc::now())
    }

    /// Underlying UTC date-time
    pub fn as_datetime(&self) -> DateTime<Utc> {
        self.0
    }

    /// Format as a GPX `<time>` value (`YYYY-MM-DDTHH:MM:SS[.fff]Z`)
    pub fn to_gpx_string(&self) -> String {
        self.0.to_rfc3339_opts(SecondsFormat::AutoSi, true)
    }
}

impl fmt::Display for Instant {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_gpx_string())
    }
}

impl FromStr for Instant {
    type Err = TimestampError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        parse_timestamp(s)
    }
}

/// Parse a timestamp into an [`Instant`].
///
/// A trailing `Z` is rewritten to `+00:00` before parsing, and a timestamp
/// without any zone designator is read as UTC. Missing seconds, or a missing
/// time of day altogether, default to zero.
pub fn parse_timestamp(text: &str) -> Result<Instant, TimestampError> {
    let trimmed = text.trim();
    if trimmed.is_empty() {
        return Err(TimestampError::Empty);
    }

    let invalid = || TimestampError::Invalid { text: text.to_string() };

    let caps = TIMESTAMP_REGEX.captures(trimmed).ok_or_else(invalid)?;
    let hours_minutes = caps.get(2).map_or("00:00", |m| m.as_str());
    let seconds = caps.get(3).map_or(":00", |m| m.as_str());
    let offset = normalize_offset(caps.get(4).map(|m| m.as_str()));
    let normalized = format!("{}T{}{}{}", &caps[1], hours_minutes, seconds, offset);

    let parsed = DateTime::parse_from_rfc3339(&normalized).map_err(|_| invalid())?;
    Ok(Instant(parsed.with_timezone(&Utc)))
}

// @returns: Offset in `+HH:MM` form
fn normalize_offset(designator: Option<&str>) -> String {
    match designator {
        None | Some("Z") | Some("z") => "+00:00".to_string(),
        Some(offset) if offset.len() == 3 => format!("{}:00", offset),
        Some(offset) if offset.len() == 5 => format!("{}:{}", &offset[..3], &offset[3..]),
        Some(offset) => offset.to_string(),
    }
}
