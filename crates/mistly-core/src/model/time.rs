// ── Last-seen timestamps ──
//
// NAC events carry epoch seconds as floats. Reports show them in local
// time as `Mon DD, YYYY hh:mm:ss AM/PM`; statistics parse that string back.

use std::fmt::Display;

use chrono::{DateTime, Local, NaiveDateTime, TimeZone};

/// Display format for `Last Seen`.
pub const LAST_SEEN_FORMAT: &str = "%b %d, %Y %I:%M:%S %p";

/// `Last Seen` value for devices with no activity.
pub const NEVER: &str = "Never";

/// `Last Seen` value for timestamps that cannot be represented.
pub const INVALID_DATE: &str = "Invalid Date";

/// Format an epoch timestamp in the local timezone.
pub fn format_timestamp(epoch: Option<f64>) -> String {
    format_timestamp_in(epoch, &Local)
}

/// Format an epoch timestamp in `tz`.
///
/// Absent or zero → [`NEVER`]; non-finite or out of range → [`INVALID_DATE`].
pub fn format_timestamp_in<Tz>(epoch: Option<f64>, tz: &Tz) -> String
where
    Tz: TimeZone,
    Tz::Offset: Display,
{
    let Some(secs) = epoch.filter(|s| *s != 0.0) else {
        return NEVER.to_owned();
    };
    epoch_to_utc(secs).map_or_else(
        || INVALID_DATE.to_owned(),
        |utc| utc.with_timezone(tz).format(LAST_SEEN_FORMAT).to_string(),
    )
}

/// Parse a formatted `Last Seen` back into a naive local datetime.
///
/// Returns `None` for [`NEVER`], empty strings and anything else that does
/// not match [`LAST_SEEN_FORMAT`].
pub fn parse_last_seen(value: &str) -> Option<NaiveDateTime> {
    if value.is_empty() || value == NEVER {
        return None;
    }
    NaiveDateTime::parse_from_str(value, LAST_SEEN_FORMAT).ok()
}

/// Bound applied before the integer cast; chrono rejects anything past its own range.
const MAX_EPOCH_MS: f64 = 1.0e13 * 1000.0;

fn epoch_to_utc(secs: f64) -> Option<DateTime<chrono::Utc>> {
    let millis = (secs * 1000.0).round();
    if !millis.is_finite() || millis.abs() > MAX_EPOCH_MS {
        return None;
    }
    #[allow(clippy::cast_possible_truncation, clippy::as_conversions)]
    let millis = millis as i64;
    DateTime::from_timestamp_millis(millis)
}
