//! TVDB domain model.
//!
//! Two conversion paths exist on purpose:
//!
//! - [`Show::from_json`] is tolerant. Only `id` is required; every other
//!   field that is missing, `null`, empty or of the wrong type is left absent.
//! - [`Actor::from_json`] is strict. It goes through `serde` and fails on the
//!   first missing or malformed required field.

use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::date::{deserialize_optional_date_time, parse_date};
use crate::error::Result;

// --- Show ---

/// Airing status of a show.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub enum ShowStatus {
    /// Still airing.
    Continuing,
    /// Finished airing.
    Ended,
    /// Announced but not yet aired.
    Upcoming,
    /// Any other value the service reports.
    Other(String),
}

impl ShowStatus {
    /// Classifies a raw status string. Empty strings yield `None`.
    #[must_use]
    pub fn from_raw(raw: &str) -> Option<Self> {
        match raw.trim() {
            "" => None,
            s if s.eq_ignore_ascii_case("continuing") => Some(Self::Continuing),
            s if s.eq_ignore_ascii_case("ended") => Some(Self::Ended),
            s if s.eq_ignore_ascii_case("upcoming") => Some(Self::Upcoming),
            s => Some(Self::Other(String::from(s))),
        }
    }

    /// Returns the status as the service spells it.
    #[must_use]
    pub fn as_str(&self) -> &str {
        match self {
            Self::Continuing => "Continuing",
            Self::Ended => "Ended",
            Self::Upcoming => "Upcoming",
            Self::Other(raw) => raw,
        }
    }
}

/// A TV series, as returned by `search/series` and `series/{id}`.
///
/// Search results only fill a subset of the fields; the rest stay `None` or
/// empty.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Show {
    /// TVDB series ID.
    pub identifier: u64,
    /// Series name.
    pub name: Option<String>,
    /// URL slug.
    pub slug: Option<String>,
    /// Alternative names.
    pub aliases: Vec<String>,
    /// Banner image path.
    pub banner: Option<String>,
    /// Overview text.
    pub overview: Option<String>,
    /// First air date.
    pub first_aired: Option<NaiveDate>,
    /// Network name.
    pub network: Option<String>,
    /// Network ID.
    pub network_identifier: Option<String>,
    /// Airing status.
    pub status: Option<ShowStatus>,
    /// Episode runtime in minutes.
    pub runtime: Option<u32>,
    /// Genre names.
    pub genres: Vec<String>,
    /// Day of the week the show airs.
    pub airs_day_of_week: Option<String>,
    /// Time of day the show airs.
    pub airs_time: Option<String>,
    /// Content rating (e.g. "TV-MA").
    pub rating: Option<String>,
    /// IMDb ID.
    pub imdb_identifier: Option<String>,
    /// Zap2it ID.
    pub zap2it_identifier: Option<String>,
    /// Average user rating.
    pub site_rating: Option<f64>,
    /// Number of user ratings.
    pub site_rating_count: Option<u64>,
    /// Last time the record changed on the service.
    pub last_updated: Option<DateTime<Utc>>,
}

impl Show {
    /// Builds a show from a JSON object, skipping absent or malformed optional fields.
    ///
    /// # Errors
    ///
    /// Returns [`crate::TvdbError::Decode`] if `value` is not an object or has
    /// no integer `id`.
    pub fn from_json(value: &Value) -> Result<Self> {
        let Some(object) = value.as_object() else {
            let error: serde_json::Error = serde::de::Error::invalid_type(
                serde::de::Unexpected::Other("non-object value"),
                &"a JSON object",
            );
            return Err(error.into());
        };

        let identifier = object
            .get("id")
            .and_then(Value::as_u64)
            .ok_or_else(|| <serde_json::Error as serde::de::Error>::missing_field("id"))?;

        Ok(Self {
            identifier,
            name: text(object, "seriesName"),
            slug: text(object, "slug"),
            aliases: text_list(object, "aliases"),
            banner: text(object, "banner"),
            overview: text(object, "overview"),
            first_aired: text(object, "firstAired").and_then(|raw| parse_date(&raw).ok()),
            network: text(object, "network"),
            network_identifier: text(object, "networkId"),
            status: text(object, "status").and_then(|raw| ShowStatus::from_raw(&raw)),
            runtime: loose_u32(object, "runtime"),
            genres: text_list(object, "genre"),
            airs_day_of_week: text(object, "airsDayOfWeek"),
            airs_time: text(object, "airsTime"),
            rating: text(object, "rating"),
            imdb_identifier: text(object, "imdbId"),
            zap2it_identifier: text(object, "zap2itId"),
            site_rating: object.get("siteRating").and_then(Value::as_f64),
            site_rating_count: object.get("siteRatingCount").and_then(Value::as_u64),
            last_updated: object
                .get("lastUpdated")
                .and_then(Value::as_i64)
                .and_then(|secs| DateTime::from_timestamp(secs, 0)),
        })
    }
}

/// Returns a non-empty string field.
fn text(object: &Map<String, Value>, key: &str) -> Option<String> {
    object
        .get(key)
        .and_then(Value::as_str)
        .filter(|s| !s.is_empty())
        .map(String::from)
}

/// Returns the string elements of an array field, skipping anything else.
fn text_list(object: &Map<String, Value>, key: &str) -> Vec<String> {
    object
        .get(key)
        .and_then(Value::as_array)
        .map(|items| {
            items
                .iter()
                .filter_map(Value::as_str)
                .filter(|s| !s.is_empty())
                .map(String::from)
                .collect()
        })
        .unwrap_or_default()
}

/// Accepts either a number or a numeric string (`runtime` is sent as `"60"`).
fn loose_u32(object: &Map<String, Value>, key: &str) -> Option<u32> {
    match object.get(key)? {
        Value::Number(n) => n.as_u64().and_then(|n| u32::try_from(n).ok()),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}

// --- Actor ---

/// A cast member of a series, as returned by `series/{id}/actors`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Actor {
    /// TVDB actor ID.
    #[serde(rename = "id")]
    pub identifier: u64,
    /// ID of the series this entry belongs to.
    #[serde(rename = "seriesId")]
    pub series_identifier: u64,
    /// Actor name.
    pub name: String,
    /// Character name.
    pub role: String,
    /// Billing order.
    pub sort_order: i64,
    /// Image path.
    pub image: String,
    /// ID of the user who uploaded the image.
    pub image_author: u64,
    /// When the image was added.
    #[serde(default, deserialize_with = "deserialize_optional_date_time")]
    pub image_added: Option<NaiveDateTime>,
    /// Last time the record changed on the service.
    #[serde(default, deserialize_with = "deserialize_optional_date_time")]
    pub last_updated: Option<NaiveDateTime>,
}

impl Actor {
    /// Builds an actor from a JSON object, failing on any missing or malformed field.
    ///
    /// # Errors
    ///
    /// Returns [`crate::TvdbError::Decode`] if a required field is missing or
    /// has the wrong type.
    pub fn from_json(value: &Value) -> Result<Self> {
        Ok(Self::deserialize(value)?)
    }
}
