//! Parsing and formatting of the optional redirect activity window.

use crate::error::CoreError;
use jiff::civil::DateTime;
use jiff::tz::TimeZone;
use jiff::Timestamp;

/// Parses a date time submitted by a form, a CSV row or an API client.
///
/// Empty input means "no date". Values carrying an offset (`2024-03-01T10:30:00+02:00`)
/// are taken as is; naive values (`2024-03-01 10:30`) are read as UTC.
pub fn parse_date_time(raw: &str) -> Result<Option<Timestamp>, CoreError> {
    let raw = raw.trim();
    if raw.is_empty() {
        return Ok(None);
    }

    if let Ok(timestamp) = raw.parse::<Timestamp>() {
        return Ok(Some(timestamp));
    }

    let civil: DateTime = raw
        .parse()
        .map_err(|e| CoreError::InvalidDateTime(format!("'{raw}': {e}")))?;
    let zoned = civil
        .to_zoned(TimeZone::UTC)
        .map_err(|e| CoreError::InvalidDateTime(format!("'{raw}': {e}")))?;
    Ok(Some(zoned.timestamp()))
}

/// Parses an optional raw value, treating `None` like an empty string.
pub fn parse_optional_date_time(raw: Option<&str>) -> Result<Option<Timestamp>, CoreError> {
    raw.map(parse_date_time)
        .transpose()
        .map(Option::flatten)
}

/// `YYYY-MM-DD HH:MM` in UTC, as shown in the list and the date pickers.
pub fn format_readable(timestamp: Timestamp) -> String {
    timestamp.strftime("%Y-%m-%d %H:%M").to_string()
}

/// `YYYY-MM-DD HH:MM:SS` in UTC, used by the server rendered views.
pub fn format_seconds(timestamp: Timestamp) -> String {
    timestamp.strftime("%Y-%m-%d %H:%M:%S").to_string()
}

/// W3C date time with an explicit `+00:00` offset.
pub fn format_w3c(timestamp: Timestamp) -> String {
    timestamp.strftime("%Y-%m-%dT%H:%M:%S+00:00").to_string()
}
