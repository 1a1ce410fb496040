//! Date helpers for TVDB payloads.

use chrono::{Datelike, NaiveDate, NaiveDateTime};
use serde::{Deserialize, Deserializer};

/// Format of calendar dates such as `firstAired`.
const DATE_FORMAT: &str = "%Y-%m-%d";

/// Format of timestamps such as an actor's `lastUpdated`.
const DATE_TIME_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Error returned by [`parse_date`].
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("invalid date: {input:?}")]
pub struct DateParseError {
    input: String,
}

/// Parses a `YYYY-MM-DD` date.
///
/// Rejects partial dates, month names, impossible days and year zero.
///
/// # Errors
///
/// Returns [`DateParseError`] if `input` is not a valid calendar date.
pub fn parse_date(input: &str) -> Result<NaiveDate, DateParseError> {
    let invalid = || DateParseError {
        input: String::from(input),
    };

    let parts: Vec<&str> = input.split('-').collect();
    let [year, month, day] = parts.as_slice() else {
        return Err(invalid());
    };
    if year.len() != 4
        || ![year, month, day]
            .iter()
            .all(|part| !part.is_empty() && part.bytes().all(|b| b.is_ascii_digit()))
    {
        return Err(invalid());
    }

    let date = NaiveDate::parse_from_str(input, DATE_FORMAT).map_err(|_| invalid())?;
    if date.year() < 1 {
        return Err(invalid());
    }
    Ok(date)
}

/// Deserializes an optional `YYYY-MM-DD HH:MM:SS` timestamp.
///
/// `null` and the empty string become `None`; anything else must parse.
pub(crate) fn deserialize_optional_date_time<'de, D>(
    deserializer: D,
) -> Result<Option<NaiveDateTime>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw: Option<String> = Option::deserialize(deserializer)?;
    match raw.as_deref() {
        None | Some("") => Ok(None),
        Some(value) => NaiveDateTime::parse_from_str(value, DATE_TIME_FORMAT)
            .map(Some)
            .map_err(serde::de::Error::custom),
    }
}
