//! Internal helpers for input normalization and date conversion.
//!
//! These utilities are **not** part of the public API. They centralize
//! validation so every operation enforces the same rules.

use chrono::{DateTime, NaiveDate, NaiveTime};
use serde_json::Value;
use unicode_normalization::UnicodeNormalization;
use uuid::Uuid;

use crate::{EngineError, ResultEngine};

/// Generates a fresh record id.
pub(crate) fn new_id() -> String {
    Uuid::new_v4().to_string()
}

/// Trims `value` and rejects it when empty.
pub(crate) fn normalize_required_text(value: &str, label: &str) -> ResultEngine<String> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(EngineError::Validation(format!("{label} must not be empty")));
    }
    Ok(trimmed.to_string())
}

pub(crate) fn normalize_optional_text(value: Option<&str>) -> Option<String> {
    value
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(ToString::to_string)
}

/// Case-insensitive comparison key (NFKC + lowercase).
pub(crate) fn name_key(value: &str) -> String {
    value.trim().nfkc().collect::<String>().to_lowercase()
}

/// Epoch milliseconds of midnight UTC for `date`.
///
/// Mirrors how a `YYYY-MM-DD` string is interpreted when it has no time part.
pub(crate) fn date_to_millis(date: NaiveDate) -> i64 {
    date.and_time(NaiveTime::MIN).and_utc().timestamp_millis()
}

pub(crate) fn millis_to_date(millis: i64) -> Option<NaiveDate> {
    DateTime::from_timestamp_millis(millis).map(|dt| dt.date_naive())
}

/// Parses a stored date: `YYYY-MM-DD`, optionally followed by a time part.
pub(crate) fn parse_date(value: &Value) -> Option<NaiveDate> {
    let raw = value.as_str()?.trim();
    let day = raw.get(..10).unwrap_or(raw);
    NaiveDate::parse_from_str(day, "%Y-%m-%d").ok()
}

/// Reads a stored epoch-millisecond timestamp. Zero, negative and
/// non-numeric values count as missing.
pub(crate) fn parse_timestamp(value: Option<&Value>) -> Option<i64> {
    let number = value?.as_f64()?;
    if !number.is_finite() || number <= 0.0 {
        return None;
    }
    Some(number.trunc() as i64)
}
