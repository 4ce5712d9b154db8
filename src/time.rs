//! # Timestamp parsing and rendering
//!
//! AIS tables carry timestamps as text. This module turns them into UTC instants
//! ([`chrono::DateTime<Utc>`]) and renders them back as ISO-8601 strings with an explicit
//! `+00:00` offset, the form used in reports and exporters.
//!
//! Accepted inputs
//! -----------------
//! * RFC 3339 / ISO-8601 with offset: `2024-03-01T12:00:00+02:00`, `2024-03-01T10:00:00Z`
//! * Space separated with offset: `2024-03-01 12:00:00+02:00`
//! * Naive date-time (interpreted as UTC): `2024-03-01T10:00:00`, `2024-03-01 10:00:00.250`
//! * Bare date (midnight UTC): `2024-03-01`
//!
//! Anything else yields `None`; callers decide whether that is an error.
use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use serde::Serializer;

use crate::constants::Seconds;

const OFFSET_FORMATS: [&str; 2] = ["%Y-%m-%d %H:%M:%S%.f%:z", "%Y-%m-%d %H:%M:%S%.f%z"];
const NAIVE_FORMATS: [&str; 3] = [
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%dT%H:%M",
];

/// Parse a textual timestamp into a UTC instant.
///
/// Arguments
/// -----------------
/// * `raw`: the timestamp text, surrounding whitespace is ignored.
///
/// Return
/// ----------
/// * `Some(DateTime<Utc>)` when one of the accepted layouts matches; offsets are converted to UTC.
/// * `None` for empty or unparseable input.
pub fn parse_timestamp(raw: &str) -> Option<DateTime<Utc>> {
    let s = raw.trim();
    if s.is_empty() {
        return None;
    }

    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Some(dt.with_timezone(&Utc));
    }

    for fmt in OFFSET_FORMATS {
        if let Ok(dt) = DateTime::parse_from_str(s, fmt) {
            return Some(dt.with_timezone(&Utc));
        }
    }

    // trailing "Z" on an otherwise naive layout
    let naive_part = s.strip_suffix('Z').unwrap_or(s);
    for fmt in NAIVE_FORMATS {
        if let Ok(ndt) = NaiveDateTime::parse_from_str(naive_part, fmt) {
            return Some(ndt.and_utc());
        }
    }

    NaiveDate::parse_from_str(s, "%Y-%m-%d")
        .ok()
        .and_then(|d| d.and_hms_opt(0, 0, 0))
        .map(|ndt| ndt.and_utc())
}

/// ISO-8601 rendering with an explicit `+00:00` offset, e.g. `2024-01-01T00:01:00+00:00`.
pub fn iso_utc(ts: &DateTime<Utc>) -> String {
    ts.to_rfc3339()
}

/// Signed elapsed time `to - from`, in seconds.
///
/// Microsecond resolution; spans too large for it fall back to milliseconds.
pub fn elapsed_seconds(from: &DateTime<Utc>, to: &DateTime<Utc>) -> Seconds {
    let delta = *to - *from;
    match delta.num_microseconds() {
        Some(us) => us as f64 / 1e6,
        None => delta.num_milliseconds() as f64 / 1e3,
    }
}

pub(crate) fn serialize_iso<S>(ts: &DateTime<Utc>, s: S) -> Result<S::Ok, S::Error>
where
    S: Serializer,
{
    s.serialize_str(&iso_utc(ts))
}

pub(crate) fn serialize_opt_iso<S>(ts: &Option<DateTime<Utc>>, s: S) -> Result<S::Ok, S::Error>
where
    S: Serializer,
{
    match ts {
        Some(ts) => s.serialize_str(&iso_utc(ts)),
        None => s.serialize_none(),
    }
}
