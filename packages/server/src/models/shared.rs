use chrono::{DateTime, NaiveDate, TimeZone, Utc};
use serde::{Deserialize, Deserializer};

use crate::error::FieldError;

/// Accepted news importance levels, in display order.
pub const IMPORTANCE_LEVELS: [&str; 3] = ["high", "medium", "low"];

/// Parse a client-supplied date/time string.
///
/// Accepts RFC 3339 timestamps and bare `YYYY-MM-DD` dates (interpreted as
/// midnight UTC). Anything else is a validation failure, never a silent
/// default.
pub fn parse_datetime(s: &str) -> Result<DateTime<Utc>, String> {
    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Ok(dt.with_timezone(&Utc));
    }
    if let Ok(date) = NaiveDate::parse_from_str(s, "%Y-%m-%d")
        && let Some(midnight) = date.and_hms_opt(0, 0, 0)
    {
        return Ok(Utc.from_utc_datetime(&midnight));
    }
    Err(format!(
        "'{s}' is not a valid date (expected RFC 3339 or YYYY-MM-DD)"
    ))
}

/// Deserialize a required date/time field via [`parse_datetime`].
pub fn flexible_datetime<'de, D>(deserializer: D) -> Result<DateTime<Utc>, D::Error>
where
    D: Deserializer<'de>,
{
    let s = String::deserialize(deserializer)?;
    parse_datetime(&s).map_err(serde::de::Error::custom)
}

/// Deserialize an optional date/time field via [`parse_datetime`].
pub fn flexible_datetime_opt<'de, D>(deserializer: D) -> Result<Option<DateTime<Utc>>, D::Error>
where
    D: Deserializer<'de>,
{
    let s: Option<String> = Option::deserialize(deserializer)?;
    s.map(|s| parse_datetime(&s).map_err(serde::de::Error::custom))
        .transpose()
}

/// Serde helper for PATCH semantics on nullable fields.
///
/// * JSON field absent  => `None`          (don't update)
/// * JSON field = null  => `Some(None)`    (set to NULL)
/// * JSON field = value => `Some(Some(v))` (set to value)
pub fn double_option<'de, D, T>(deserializer: D) -> Result<Option<Option<T>>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    Ok(Some(Option::deserialize(deserializer)?))
}

/// [`double_option`] for date/time fields parsed with [`parse_datetime`].
pub fn double_option_datetime<'de, D>(
    deserializer: D,
) -> Result<Option<Option<DateTime<Utc>>>, D::Error>
where
    D: Deserializer<'de>,
{
    flexible_datetime_opt(deserializer).map(Some)
}

pub fn require_text(errors: &mut Vec<FieldError>, field: &str, value: &str) {
    if value.trim().is_empty() {
        errors.push(FieldError::new(field, format!("{field} is required")));
    }
}

pub fn check_latitude(errors: &mut Vec<FieldError>, field: &str, value: f64) {
    if !(-90.0..=90.0).contains(&value) || !value.is_finite() {
        errors.push(FieldError::new(
            field,
            "latitude must be between -90 and 90",
        ));
    }
}

pub fn check_longitude(errors: &mut Vec<FieldError>, field: &str, value: f64) {
    if !(-180.0..=180.0).contains(&value) || !value.is_finite() {
        errors.push(FieldError::new(
            field,
            "longitude must be between -180 and 180",
        ));
    }
}

pub fn check_importance(errors: &mut Vec<FieldError>, field: &str, value: &str) {
    if !IMPORTANCE_LEVELS.contains(&value) {
        errors.push(FieldError::new(
            field,
            format!(
                "importance must be one of: {}",
                IMPORTANCE_LEVELS.join(", ")
            ),
        ));
    }
}

pub fn check_image_url(errors: &mut Vec<FieldError>, field: &str, value: &str) {
    if !(value.starts_with("http://") || value.starts_with("https://")) {
        errors.push(FieldError::new(field, "image_url must be an http(s) URL"));
    }
}

/// `end` must not precede `start` when both are present.
pub fn check_time_order(
    errors: &mut Vec<FieldError>,
    field: &str,
    start: DateTime<Utc>,
    end: Option<DateTime<Utc>>,
) {
    if let Some(end) = end
        && end < start
    {
        errors.push(FieldError::new(
            field,
            "end_time must not be before start_time",
        ));
    }
}
