//! Date massaging between user input, backend payloads and display.
//!
//! The backend expects plain `YYYY-MM-DD` dates but answers with whatever its
//! serializer produced (dates, local datetimes, RFC 3339). Users type either
//! ISO dates or the Turkish `DD.MM.YYYY` form.

use crate::utils::error::{ClientError, Result};
use chrono::{DateTime, NaiveDate, NaiveDateTime};

const API_DATE_FORMAT: &str = "%Y-%m-%d";
const DISPLAY_DATE_FORMAT: &str = "%d.%m.%Y";

const DATETIME_FORMATS: &[&str] = &[
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%dT%H:%M:%S",
    "%Y-%m-%dT%H:%M",
    "%Y-%m-%d %H:%M:%S",
    "%Y-%m-%d %H:%M",
];

pub fn parse_api_date(input: &str) -> Option<NaiveDate> {
    let input = input.trim();
    if input.is_empty() {
        return None;
    }

    if let Ok(date) = NaiveDate::parse_from_str(input, API_DATE_FORMAT) {
        return Some(date);
    }
    if let Ok(date) = NaiveDate::parse_from_str(input, DISPLAY_DATE_FORMAT) {
        return Some(date);
    }
    // 帶時區的時間保留原本的日曆日期，不轉換成 UTC
    if let Ok(dt) = DateTime::parse_from_rfc3339(input) {
        return Some(dt.date_naive());
    }
    DATETIME_FORMATS
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(input, fmt).ok())
        .map(|dt| dt.date())
}

/// `"2024-01-01T10:00:00"` -> `"2024-01-01"`
pub fn format_date_for_api(input: &str) -> Result<String> {
    if input.trim().is_empty() {
        return Err(ClientError::validation("date", "Date is required"));
    }
    parse_api_date(input)
        .map(|date| date.format(API_DATE_FORMAT).to_string())
        .ok_or_else(|| {
            ClientError::validation(
                "date",
                format!(
                    "Unrecognised date '{}', use YYYY-MM-DD or DD.MM.YYYY",
                    input.trim()
                ),
            )
        })
}

pub fn format_date_for_display(date: &NaiveDate) -> String {
    date.format(DISPLAY_DATE_FORMAT).to_string()
}

pub fn format_optional_date(date: Option<&NaiveDate>) -> String {
    date.map(format_date_for_display).unwrap_or_else(|| "-".to_string())
}

/// serde helpers: accept every format `parse_api_date` knows, always write `YYYY-MM-DD`.
pub mod api_date {
    use chrono::NaiveDate;
    use serde::{de, Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(date: &NaiveDate, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&date.format(super::API_DATE_FORMAT).to_string())
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<NaiveDate, D::Error> {
        let raw = String::deserialize(deserializer)?;
        super::parse_api_date(&raw)
            .ok_or_else(|| de::Error::custom(format!("invalid date: {}", raw)))
    }
}

pub mod api_date_opt {
    use chrono::NaiveDate;
    use serde::{de, Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(
        date: &Option<NaiveDate>,
        serializer: S,
    ) -> Result<S::Ok, S::Error> {
        match date {
            Some(date) => super::api_date::serialize(date, serializer),
            None => serializer.serialize_none(),
        }
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(
        deserializer: D,
    ) -> Result<Option<NaiveDate>, D::Error> {
        match Option::<String>::deserialize(deserializer)? {
            None => Ok(None),
            Some(raw) if raw.trim().is_empty() => Ok(None),
            Some(raw) => super::parse_api_date(&raw)
                .map(Some)
                .ok_or_else(|| de::Error::custom(format!("invalid date: {}", raw))),
        }
    }
}
